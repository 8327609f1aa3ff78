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

use crate::modules::access::AccessService;
use crate::modules::account::{Account, AccountPlan, AccountStatus, AccountStore};
use crate::modules::error::{code::ErrorCode, MagpieResult};
use crate::modules::membership::{
    AccountPermissions, MembershipRole, MembershipStatus, MembershipStore, UserAccount,
};
use crate::raise_error;
use futures::{stream, StreamExt};
use poem_openapi::Object;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// One entry in the account switcher: an account the user is linked to,
/// annotated with the user's role on it and whether it is the currently
/// selected one.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize, Object)]
pub struct AvailableAccount {
    pub account_id: u64,
    pub name: String,
    pub company: Option<String>,
    pub plan: AccountPlan,
    /// Status of the account itself, not of the membership.
    pub status: AccountStatus,
    pub level: u32,
    pub role: MembershipRole,
    /// Status of the membership link; Invited and Suspended entries are
    /// listed so clients can render them, but they cannot be switched to.
    pub membership_status: MembershipStatus,
    pub current: bool,
}

/// Everything downstream request handling needs to know about "user U acting
/// on account A". Assembled on context switch and embedded into the caller's
/// session by the API layer.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize, Object)]
pub struct AuthContext {
    pub user_id: u64,
    pub account_id: u64,
    pub account_name: String,
    pub role: MembershipRole,
    pub permissions: AccountPermissions,
    /// Materialized path of the selected account, for scope filtering.
    pub account_path: String,
    pub level: u32,
    pub available_accounts: Vec<AvailableAccount>,
}

/// Assembles [`AuthContext`] values and the per-user account list.
#[derive(Clone)]
pub struct ContextService {
    accounts: AccountStore,
    memberships: MembershipStore,
    access: AccessService,
    hydrate_concurrency: usize,
}

impl ContextService {
    pub fn new(
        accounts: AccountStore,
        memberships: MembershipStore,
        access: AccessService,
        hydrate_concurrency: usize,
    ) -> Self {
        ContextService {
            accounts,
            memberships,
            access,
            hydrate_concurrency: hydrate_concurrency.max(1),
        }
    }

    /// Switches the user onto `target_account_id` and assembles the full
    /// context. Requires an Active membership on the target; the membership
    /// state, not the requester's claim, is authoritative.
    pub async fn switch_context(
        &self,
        user_id: u64,
        target_account_id: u64,
    ) -> MagpieResult<AuthContext> {
        let membership = self.access.require_active(user_id, target_account_id).await?;
        let account = self
            .accounts
            .find(target_account_id)
            .await?
            .ok_or_else(|| {
                raise_error!(
                    format!(
                        "Account {} referenced by an active membership no longer exists.",
                        target_account_id
                    ),
                    ErrorCode::ResourceNotFound
                )
            })?;

        let pairs = self.memberships_with_accounts(user_id).await?;
        let available_accounts = pairs
            .into_iter()
            .map(|(link, entry)| AvailableAccount {
                current: entry.id == target_account_id,
                account_id: entry.id,
                name: entry.name,
                company: entry.company,
                plan: entry.plan,
                status: entry.status,
                level: entry.level,
                role: link.role,
                membership_status: link.status,
            })
            .collect();

        Ok(AuthContext {
            user_id,
            account_id: account.id,
            account_name: account.name,
            role: membership.role,
            permissions: membership.permissions,
            account_path: account.account_path,
            level: account.level,
            available_accounts,
        })
    }

    /// Every account the user is linked to, in membership scan order.
    pub async fn list_user_accounts(&self, user_id: u64) -> MagpieResult<Vec<Account>> {
        Ok(self
            .memberships_with_accounts(user_id)
            .await?
            .into_iter()
            .map(|(_, account)| account)
            .collect())
    }

    /// Joins the user's membership rows with their account records.
    ///
    /// Hydration runs at most `hydrate_concurrency` lookups in flight;
    /// `buffered` keeps the results in membership order. A membership whose
    /// account record is gone is logged and skipped rather than failing the
    /// listing, while store errors propagate.
    async fn memberships_with_accounts(
        &self,
        user_id: u64,
    ) -> MagpieResult<Vec<(UserAccount, Account)>> {
        let memberships = self.memberships.list_for_user(user_id).await?;
        let lookups = memberships.into_iter().map(|link| {
            let accounts = self.accounts.clone();
            async move {
                let found = accounts.find(link.account_id).await;
                (link, found)
            }
        });
        let hydrated: Vec<(UserAccount, MagpieResult<Option<Account>>)> = stream::iter(lookups)
            .buffered(self.hydrate_concurrency)
            .collect()
            .await;

        let mut pairs = Vec::with_capacity(hydrated.len());
        for (link, found) in hydrated {
            match found? {
                Some(account) => pairs.push((link, account)),
                None => warn!(
                    "Membership of user {} references account {} which no longer exists; skipping",
                    user_id, link.account_id
                ),
            }
        }
        Ok(pairs)
    }
}

/// Payload for the context switch endpoint.
#[derive(Clone, Debug, Default, Eq, PartialEq, Deserialize, Serialize, Object)]
pub struct SwitchContextRequest {
    pub account_id: u64,
}

#[cfg(test)]
mod context_tests;
