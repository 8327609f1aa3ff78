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

use crate::modules::account::{AccountPlan, AccountSettings, AccountStatus};
use crate::modules::error::{code::ErrorCode, MagpieResult};
use crate::modules::membership::MembershipRole;
use crate::raise_error;
use poem_openapi::Object;
use serde::{Deserialize, Serialize};

const MAX_NAME_LENGTH: usize = 120;

fn validate_account_name(name: &str) -> MagpieResult<()> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(raise_error!(
            "Account name cannot be empty or consist only of whitespace.".into(),
            ErrorCode::InvalidParameter
        ));
    }
    if trimmed.len() > MAX_NAME_LENGTH {
        return Err(raise_error!(
            format!(
                "Account name must not exceed {} characters.",
                MAX_NAME_LENGTH
            ),
            ErrorCode::InvalidParameter
        ));
    }
    Ok(())
}

#[derive(Clone, Debug, Default, Eq, PartialEq, Deserialize, Serialize, Object)]
pub struct CreateRootAccountRequest {
    pub name: String,
    pub company: Option<String>,
}

impl CreateRootAccountRequest {
    pub fn validate(&self) -> MagpieResult<()> {
        validate_account_name(&self.name)
    }
}

#[derive(Clone, Debug, Default, Eq, PartialEq, Deserialize, Serialize, Object)]
pub struct CreateSubAccountRequest {
    pub name: String,
    pub company: Option<String>,
    /// Owner of the new sub-account. Defaults to the acting user.
    pub owner_user_id: Option<u64>,
}

impl CreateSubAccountRequest {
    pub fn validate(&self) -> MagpieResult<()> {
        validate_account_name(&self.name)?;
        if self.owner_user_id == Some(0) {
            return Err(raise_error!(
                "owner_user_id must be a valid user id.".into(),
                ErrorCode::InvalidParameter
            ));
        }
        Ok(())
    }
}

/// Partial account update; absent fields are left untouched.
#[derive(Clone, Debug, Default, Eq, PartialEq, Deserialize, Serialize, Object)]
pub struct AccountUpdateRequest {
    pub name: Option<String>,
    pub company: Option<String>,
    pub plan: Option<AccountPlan>,
    pub status: Option<AccountStatus>,
    pub settings: Option<AccountSettings>,
}

impl AccountUpdateRequest {
    pub fn validate(&self) -> MagpieResult<()> {
        if self.name.is_none()
            && self.company.is_none()
            && self.plan.is_none()
            && self.status.is_none()
            && self.settings.is_none()
        {
            return Err(raise_error!(
                "The update request does not change anything.".into(),
                ErrorCode::InvalidParameter
            ));
        }
        if let Some(name) = &self.name {
            validate_account_name(name)?;
        }
        Ok(())
    }
}

#[derive(Clone, Debug, Default, Eq, PartialEq, Deserialize, Serialize, Object)]
pub struct InviteMemberRequest {
    /// User to link to the account.
    pub user_id: u64,
    pub role: MembershipRole,
}

impl InviteMemberRequest {
    pub fn validate(&self) -> MagpieResult<()> {
        if self.user_id == 0 {
            return Err(raise_error!(
                "user_id must be a valid user id.".into(),
                ErrorCode::InvalidParameter
            ));
        }
        // Ownership is established by the creation flows, never by invite.
        if self.role == MembershipRole::Owner {
            return Err(raise_error!(
                "Members cannot be invited as Owner.".into(),
                ErrorCode::InvalidParameter
            ));
        }
        Ok(())
    }
}
