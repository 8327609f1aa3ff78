//
// Copyright (c) 2026 magpie.dev (https://magpie.dev)
//
// This file is part of the Magpie Backup Platform
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <http://www.gnu.org/licenses/>.

use poem_openapi::Object;
use serde::{Deserialize, Serialize};

use crate::modules::account::{Account, AccountPlan, AccountSettings, AccountStatus, AccountUsage};
use crate::modules::membership::{AccountPermissions, MembershipRole, MembershipStatus, UserAccount};

#[derive(Clone, Debug, Eq, PartialEq, Deserialize, Serialize, Object)]
pub struct AccountResp {
    pub id: u64,
    pub parent_id: Option<u64>,
    pub owner_user_id: u64,
    pub created_by: u64,
    pub name: String,
    pub company: Option<String>,
    pub plan: AccountPlan,
    pub status: AccountStatus,
    pub level: u32,
    pub account_path: String,
    pub settings: AccountSettings,
    pub usage: AccountUsage,
    pub created_at: i64,
    pub updated_at: i64,
}

impl AccountResp {
    pub fn from_model(account: Account) -> AccountResp {
        AccountResp {
            id: account.id,
            parent_id: account.parent_id,
            owner_user_id: account.owner_user_id,
            created_by: account.created_by,
            name: account.name,
            company: account.company,
            plan: account.plan,
            status: account.status,
            level: account.level,
            account_path: account.account_path,
            settings: account.settings,
            usage: account.usage,
            created_at: account.created_at,
            updated_at: account.updated_at,
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Deserialize, Serialize, Object)]
pub struct MembershipResp {
    pub user_id: u64,
    pub account_id: u64,
    pub role: MembershipRole,
    pub status: MembershipStatus,
    pub permissions: AccountPermissions,
    pub linked_at: i64,
    pub updated_at: i64,
}

impl MembershipResp {
    pub fn from_model(link: UserAccount) -> MembershipResp {
        MembershipResp {
            user_id: link.user_id,
            account_id: link.account_id,
            role: link.role,
            status: link.status,
            permissions: link.permissions,
            linked_at: link.linked_at,
            updated_at: link.updated_at,
        }
    }
}
