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

use crate::modules::database::{
    async_find_impl, filter_by_secondary_key_impl, insert_impl, update_impl, with_deadline,
    with_transaction,
};
use crate::modules::error::{code::ErrorCode, MagpieResult};
use crate::{raise_error, utc_now};
use native_db::*;
use native_model::{native_model, Model};
use poem_openapi::{Enum, Object};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize, Enum)]
pub enum MembershipRole {
    Owner,
    Admin,
    #[default]
    Member,
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize, Enum)]
pub enum MembershipStatus {
    Active,
    #[default]
    Invited,
    Suspended,
}

/// Capabilities a user holds on one specific account.
///
/// Stored denormalized per membership row; an account grants nothing to
/// users of its parent or child accounts.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize, Object)]
pub struct AccountPermissions {
    pub can_create_sub_accounts: bool,
    pub can_invite_users: bool,
    pub can_manage_integrations: bool,
    pub can_view_all_data: bool,
    pub can_manage_billing: bool,
    pub can_delete_account: bool,
    pub can_modify_settings: bool,
}

impl AccountPermissions {
    pub fn full() -> Self {
        AccountPermissions {
            can_create_sub_accounts: true,
            can_invite_users: true,
            can_manage_integrations: true,
            can_view_all_data: true,
            can_manage_billing: true,
            can_delete_account: true,
            can_modify_settings: true,
        }
    }
}

/// Link between a user and an account.
///
/// The primary key is the `user_id` and `account_id` pair, so a user holds at
/// most one membership per account. Role and permissions travel on the link,
/// not on the user, which is what lets one user act as Owner of one tenant
/// and plain Member of another.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize, Object)]
#[native_model(id = 2, version = 1)]
#[native_db(primary_key(pk -> String))]
pub struct UserAccount {
    #[secondary_key]
    pub user_id: u64,
    pub account_id: u64,
    pub role: MembershipRole,
    pub status: MembershipStatus,
    pub permissions: AccountPermissions,
    pub linked_at: i64,
    pub updated_at: i64,
}

impl UserAccount {
    fn pk(&self) -> String {
        Self::pair_key(self.user_id, self.account_id)
    }

    pub fn pair_key(user_id: u64, account_id: u64) -> String {
        format!("{}_{}", user_id, account_id)
    }

    pub fn is_active(&self) -> bool {
        matches!(self.status, MembershipStatus::Active)
    }

    /// Owner link written when a user creates their own root account.
    pub fn owner_link(user_id: u64, account_id: u64, now: i64) -> Self {
        UserAccount {
            user_id,
            account_id,
            role: MembershipRole::Owner,
            status: MembershipStatus::Active,
            permissions: AccountPermissions::full(),
            linked_at: now,
            updated_at: now,
        }
    }

    /// Admin link written for the designated owner of a new sub-account.
    pub fn admin_link(user_id: u64, account_id: u64, now: i64) -> Self {
        UserAccount {
            user_id,
            account_id,
            role: MembershipRole::Admin,
            status: MembershipStatus::Active,
            permissions: AccountPermissions::full(),
            linked_at: now,
            updated_at: now,
        }
    }

    /// Pending link written when an existing member invites another user.
    /// Admins start with the full permission set, everyone else with none.
    pub fn invited_link(user_id: u64, account_id: u64, role: MembershipRole, now: i64) -> Self {
        let permissions = match role {
            MembershipRole::Owner | MembershipRole::Admin => AccountPermissions::full(),
            MembershipRole::Member => AccountPermissions::default(),
        };
        UserAccount {
            user_id,
            account_id,
            role,
            status: MembershipStatus::Invited,
            permissions,
            linked_at: now,
            updated_at: now,
        }
    }
}

/// Persistence handle for [`UserAccount`] links.
#[derive(Clone)]
pub struct MembershipStore {
    db: Arc<Database<'static>>,
    deadline: Duration,
}

impl MembershipStore {
    pub fn new(db: Arc<Database<'static>>, deadline: Duration) -> Self {
        MembershipStore { db, deadline }
    }

    pub async fn find_pair(
        &self,
        user_id: u64,
        account_id: u64,
    ) -> MagpieResult<Option<UserAccount>> {
        with_deadline(
            self.deadline,
            async_find_impl(&self.db, UserAccount::pair_key(user_id, account_id)),
        )
        .await
    }

    /// Every membership of `user_id`, across all accounts and statuses.
    pub async fn list_for_user(&self, user_id: u64) -> MagpieResult<Vec<UserAccount>> {
        with_deadline(
            self.deadline,
            filter_by_secondary_key_impl(&self.db, UserAccountKey::user_id, user_id),
        )
        .await
    }

    /// Inserts a link only if the pair does not already exist. The existence
    /// check and the insert run in one transaction, so two racing invites
    /// for the same pair cannot both succeed.
    pub async fn insert_new(&self, link: UserAccount) -> MagpieResult<UserAccount> {
        with_deadline(
            self.deadline,
            with_transaction(&self.db, move |rw| {
                let existing: Option<UserAccount> = rw
                    .get()
                    .primary(UserAccount::pair_key(link.user_id, link.account_id))
                    .map_err(|e| raise_error!(format!("{:#?}", e), ErrorCode::InternalError))?;
                if existing.is_some() {
                    return Err(raise_error!(
                        format!(
                            "User {} is already linked to account {}.",
                            link.user_id, link.account_id
                        ),
                        ErrorCode::AlreadyExists
                    ));
                }
                rw.insert(link.clone())
                    .map_err(|e| raise_error!(format!("{:#?}", e), ErrorCode::InternalError))?;
                Ok(link)
            }),
        )
        .await
    }

    /// Applies `apply` to the current link inside a read-write transaction.
    pub async fn update_with(
        &self,
        user_id: u64,
        account_id: u64,
        apply: impl FnOnce(&UserAccount) -> MagpieResult<UserAccount> + Send + 'static,
    ) -> MagpieResult<UserAccount> {
        with_deadline(
            self.deadline,
            update_impl(
                &self.db,
                move |rw| {
                    rw.get()
                        .primary::<UserAccount>(UserAccount::pair_key(user_id, account_id))
                        .map_err(|e| raise_error!(format!("{:#?}", e), ErrorCode::InternalError))?
                        .ok_or_else(|| {
                            raise_error!(
                                format!(
                                    "User {} has no membership on account {}.",
                                    user_id, account_id
                                ),
                                ErrorCode::ResourceNotFound
                            )
                        })
                },
                apply,
            ),
        )
        .await
    }

    /// Unconditional insert, used when seeding data in tests and by flows
    /// that already hold uniqueness by construction.
    pub async fn insert(&self, link: UserAccount) -> MagpieResult<()> {
        with_deadline(self.deadline, insert_impl(&self.db, link)).await
    }
}

/// Membership update applied when an invited user accepts their invitation.
pub fn activate_invitation(link: &UserAccount) -> MagpieResult<UserAccount> {
    if link.status != MembershipStatus::Invited {
        return Err(raise_error!(
            "Only a pending invitation can be accepted.".into(),
            ErrorCode::InvalidParameter
        ));
    }
    let mut updated = link.clone();
    updated.status = MembershipStatus::Active;
    updated.updated_at = utc_now!();
    Ok(updated)
}
