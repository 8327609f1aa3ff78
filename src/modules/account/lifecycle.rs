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
use crate::modules::account::hierarchy::build_child_path;
use crate::modules::account::payload::{
    AccountUpdateRequest, CreateRootAccountRequest, CreateSubAccountRequest, InviteMemberRequest,
};
use crate::modules::account::{
    Account, AccountPlan, AccountSettings, AccountStatus, AccountStore, AccountUsage,
};
use crate::modules::database::{with_deadline, with_transaction};
use crate::modules::error::{code::ErrorCode, MagpieResult};
use crate::modules::membership::{activate_invitation, MembershipStore, UserAccount};
use crate::{id, raise_error, utc_now};
use native_db::Database;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Creates and mutates accounts and membership links.
///
/// All writes that involve more than one record run in a single serialized
/// transaction; there is no window in which an account exists without its
/// initial membership.
#[derive(Clone)]
pub struct AccountLifecycle {
    db: Arc<Database<'static>>,
    accounts: AccountStore,
    memberships: MembershipStore,
    access: AccessService,
    deadline: Duration,
}

impl AccountLifecycle {
    pub fn new(
        db: Arc<Database<'static>>,
        accounts: AccountStore,
        memberships: MembershipStore,
        access: AccessService,
        deadline: Duration,
    ) -> Self {
        AccountLifecycle {
            db,
            accounts,
            memberships,
            access,
            deadline,
        }
    }

    /// Creates a top-level tenant owned by `user_id`, together with the
    /// Owner membership link.
    pub async fn create_root_account(
        &self,
        user_id: u64,
        request: CreateRootAccountRequest,
    ) -> MagpieResult<Account> {
        request.validate()?;
        let now = utc_now!();
        let account_id = id!(64);
        let (account_path, level) = build_child_path(None, account_id);
        let account = Account {
            id: account_id,
            account_path,
            parent_id: None,
            owner_user_id: user_id,
            created_by: user_id,
            name: request.name.trim().to_string(),
            company: request.company,
            plan: AccountPlan::Starter,
            status: AccountStatus::Active,
            level,
            settings: AccountSettings::default(),
            usage: AccountUsage::default(),
            created_at: now,
            updated_at: now,
        };
        let link = UserAccount::owner_link(user_id, account_id, now);
        self.persist_account_with_link(account.clone(), link).await?;
        info!(
            "Created root account {} ('{}') for user {}",
            account_id, account.name, user_id
        );
        Ok(account)
    }

    /// Creates a sub-account under `parent_account_id`.
    ///
    /// The acting user needs an Active membership on the parent carrying the
    /// create-sub-accounts permission, the parent must allow sub-accounts
    /// and have quota left. The sub-account's owner defaults to the acting
    /// user but may be someone else; the owner receives an Active Admin link.
    pub async fn create_sub_account(
        &self,
        parent_account_id: u64,
        acting_user_id: u64,
        request: CreateSubAccountRequest,
    ) -> MagpieResult<Account> {
        let membership = self
            .access
            .require_active(acting_user_id, parent_account_id)
            .await?;
        if !membership.permissions.can_create_sub_accounts {
            return Err(raise_error!(
                "You are not allowed to create sub-accounts under this account.".into(),
                ErrorCode::AccessDenied
            ));
        }
        let parent = self.accounts.find(parent_account_id).await?.ok_or_else(|| {
            raise_error!(
                format!("Parent account with id={} not found.", parent_account_id),
                ErrorCode::ResourceNotFound
            )
        })?;
        request.validate()?;
        if !parent.settings.allow_sub_accounts {
            return Err(raise_error!(
                format!("Account {} does not allow sub-accounts.", parent.id),
                ErrorCode::QuotaExceeded
            ));
        }
        let children = self.accounts.count_children(parent.id).await?;
        if children >= parent.settings.max_sub_accounts as usize {
            return Err(raise_error!(
                format!(
                    "Account {} has reached its sub-account limit of {}.",
                    parent.id, parent.settings.max_sub_accounts
                ),
                ErrorCode::QuotaExceeded
            ));
        }

        let owner_user_id = request.owner_user_id.unwrap_or(acting_user_id);
        let now = utc_now!();
        let account_id = id!(64);
        let (account_path, level) = build_child_path(Some(&parent), account_id);
        let account = Account {
            id: account_id,
            account_path,
            parent_id: Some(parent.id),
            owner_user_id,
            created_by: acting_user_id,
            name: request.name.trim().to_string(),
            company: request.company,
            plan: AccountPlan::Starter,
            status: AccountStatus::Active,
            level,
            settings: AccountSettings::default(),
            usage: AccountUsage::default(),
            created_at: now,
            updated_at: now,
        };
        let link = UserAccount::admin_link(owner_user_id, account_id, now);
        self.persist_account_with_link(account.clone(), link).await?;
        info!(
            "Created sub-account {} ('{}') under {} at level {}, owned by user {}",
            account_id, account.name, parent.id, level, owner_user_id
        );
        Ok(account)
    }

    /// Writes an account and its initial membership link atomically.
    pub(crate) async fn persist_account_with_link(
        &self,
        account: Account,
        link: UserAccount,
    ) -> MagpieResult<()> {
        with_deadline(
            self.deadline,
            with_transaction(&self.db, move |rw| {
                rw.insert(account)
                    .map_err(|e| raise_error!(format!("{:#?}", e), ErrorCode::InternalError))?;
                rw.insert(link)
                    .map_err(|e| raise_error!(format!("{:#?}", e), ErrorCode::InternalError))?;
                Ok(())
            }),
        )
        .await
    }

    /// Applies a partial update to an account. Requires an Active membership
    /// carrying the modify-settings permission.
    pub async fn update_account(
        &self,
        account_id: u64,
        acting_user_id: u64,
        request: AccountUpdateRequest,
    ) -> MagpieResult<Account> {
        let membership = self.access.require_active(acting_user_id, account_id).await?;
        if !membership.permissions.can_modify_settings {
            return Err(raise_error!(
                "You are not allowed to modify this account.".into(),
                ErrorCode::AccessDenied
            ));
        }
        request.validate()?;
        self.accounts
            .update_with(account_id, move |current| {
                let mut updated = current.clone();
                if let Some(name) = request.name {
                    updated.name = name.trim().to_string();
                }
                if let Some(company) = request.company {
                    updated.company = Some(company);
                }
                if let Some(plan) = request.plan {
                    updated.plan = plan;
                }
                if let Some(status) = request.status {
                    updated.status = status;
                }
                if let Some(settings) = request.settings {
                    updated.settings = settings;
                }
                updated.updated_at = utc_now!();
                Ok(updated)
            })
            .await
    }

    /// Links another user to an account with a pending Invited membership.
    /// Requires an Active membership carrying the invite-users permission.
    pub async fn invite_member(
        &self,
        account_id: u64,
        acting_user_id: u64,
        request: InviteMemberRequest,
    ) -> MagpieResult<UserAccount> {
        let membership = self.access.require_active(acting_user_id, account_id).await?;
        if !membership.permissions.can_invite_users {
            return Err(raise_error!(
                "You are not allowed to invite users to this account.".into(),
                ErrorCode::AccessDenied
            ));
        }
        request.validate()?;
        // The membership row alone does not prove the account record still
        // exists, and a link must never point at nothing.
        let account = self.accounts.get(account_id).await?;
        let now = utc_now!();
        let link =
            UserAccount::invited_link(request.user_id, account.id, request.role, now);
        let link = self.memberships.insert_new(link).await?;
        info!(
            "User {} invited user {} to account {} as {:?}",
            acting_user_id, request.user_id, account_id, link.role
        );
        Ok(link)
    }

    /// Flips the caller's own Invited membership on `account_id` to Active.
    pub async fn accept_invitation(
        &self,
        account_id: u64,
        user_id: u64,
    ) -> MagpieResult<UserAccount> {
        let link = self
            .memberships
            .update_with(user_id, account_id, activate_invitation)
            .await?;
        info!("User {} accepted the invitation to account {}", user_id, account_id);
        Ok(link)
    }
}
