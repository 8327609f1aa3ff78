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
    async_find_impl, count_by_secondary_key_impl, filter_by_secondary_key_impl, insert_impl,
    update_impl, with_deadline,
};
use crate::modules::error::{code::ErrorCode, MagpieResult};
use crate::raise_error;
use native_db::*;
use native_model::{native_model, Model};
use poem_openapi::{Enum, Object};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

pub mod hierarchy;
pub mod lifecycle;
pub mod payload;
pub mod view;

#[cfg(test)]
mod hierarchy_tests;
#[cfg(test)]
mod lifecycle_tests;

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize, Enum)]
pub enum AccountPlan {
    #[default]
    Starter,
    Pro,
    Enterprise,
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize, Enum)]
pub enum AccountStatus {
    #[default]
    Active,
    Suspended,
}

/// Per-tenant quotas and policy switches.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize, Object)]
pub struct AccountSettings {
    /// Maximum number of backup sources the tenant may register.
    pub max_sources: u32,
    /// Storage quota in gigabytes.
    pub max_storage_gb: u32,
    /// Maximum number of configured backup jobs.
    pub max_backup_jobs: u32,
    /// How many days completed backups are retained.
    pub retention_days: u32,
    /// Whether every member must have two-factor authentication enabled.
    pub require_two_factor: bool,
    /// Whether backups are encrypted at rest.
    pub encryption_enabled: bool,
    /// Whether sub-accounts may be created under this account.
    pub allow_sub_accounts: bool,
    /// Maximum number of direct sub-accounts.
    pub max_sub_accounts: u32,
}

impl Default for AccountSettings {
    fn default() -> Self {
        AccountSettings {
            max_sources: 10,
            max_storage_gb: 100,
            max_backup_jobs: 20,
            retention_days: 30,
            require_two_factor: false,
            encryption_enabled: true,
            allow_sub_accounts: true,
            max_sub_accounts: 50,
        }
    }
}

/// Resource consumption counters, updated by the backup pipeline.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize, Object)]
pub struct AccountUsage {
    pub sources_count: u32,
    pub storage_used_bytes: u64,
    pub backup_jobs_count: u32,
    pub monthly_backups: u32,
    pub monthly_api_requests: u64,
}

/// A tenant in the account tree.
///
/// `account_path` is the materialized ancestry of the account: the slash
/// terminated id chain from the root down to the account itself, e.g.
/// `"17/42/99/"` for account 99 under 42 under root 17. The path is a unique
/// secondary key, so every subtree maps to one contiguous key range.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize, Object)]
#[native_model(id = 1, version = 1)]
#[native_db]
pub struct Account {
    #[primary_key]
    pub id: u64,
    #[secondary_key(unique)]
    pub account_path: String,
    #[secondary_key(optional)]
    pub parent_id: Option<u64>,
    /// User who owns this tenant.
    pub owner_user_id: u64,
    /// User who performed the creation, not necessarily the owner.
    pub created_by: u64,
    pub name: String,
    pub company: Option<String>,
    pub plan: AccountPlan,
    pub status: AccountStatus,
    /// Depth in the tree; roots sit at level 0.
    pub level: u32,
    pub settings: AccountSettings,
    pub usage: AccountUsage,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Account {
    pub fn is_active(&self) -> bool {
        matches!(self.status, AccountStatus::Active)
    }
}

/// Persistence handle for [`Account`] records.
#[derive(Clone)]
pub struct AccountStore {
    db: Arc<Database<'static>>,
    deadline: Duration,
}

impl AccountStore {
    pub fn new(db: Arc<Database<'static>>, deadline: Duration) -> Self {
        AccountStore { db, deadline }
    }

    pub async fn insert(&self, account: Account) -> MagpieResult<()> {
        with_deadline(self.deadline, insert_impl(&self.db, account)).await
    }

    pub async fn find(&self, account_id: u64) -> MagpieResult<Option<Account>> {
        with_deadline(self.deadline, async_find_impl(&self.db, account_id)).await
    }

    /// Like [`AccountStore::find`] but missing accounts become a
    /// `ResourceNotFound` error.
    pub async fn get(&self, account_id: u64) -> MagpieResult<Account> {
        self.find(account_id).await?.ok_or_else(|| {
            raise_error!(
                format!("Account with id={} not found.", account_id),
                ErrorCode::ResourceNotFound
            )
        })
    }

    /// Applies `apply` to the current record inside a read-write transaction
    /// and persists the result. The closure observes the latest committed
    /// state, so concurrent updates cannot be lost.
    pub async fn update_with(
        &self,
        account_id: u64,
        apply: impl FnOnce(&Account) -> MagpieResult<Account> + Send + 'static,
    ) -> MagpieResult<Account> {
        with_deadline(
            self.deadline,
            update_impl(
                &self.db,
                move |rw| {
                    rw.get()
                        .primary::<Account>(account_id)
                        .map_err(|e| raise_error!(format!("{:#?}", e), ErrorCode::InternalError))?
                        .ok_or_else(|| {
                            raise_error!(
                                format!("Account with id={} not found.", account_id),
                                ErrorCode::ResourceNotFound
                            )
                        })
                },
                apply,
            ),
        )
        .await
    }

    /// Every account whose materialized path starts with `prefix`, in path
    /// order. Passing an account's own path returns it together with its
    /// whole subtree.
    pub async fn scan_path_prefix(&self, prefix: String) -> MagpieResult<Vec<Account>> {
        with_deadline(
            self.deadline,
            filter_by_secondary_key_impl(&self.db, AccountKey::account_path, prefix),
        )
        .await
    }

    /// Number of direct children of `parent_id`.
    pub async fn count_children(&self, parent_id: u64) -> MagpieResult<usize> {
        with_deadline(
            self.deadline,
            count_by_secondary_key_impl::<Account>(&self.db, AccountKey::parent_id, parent_id),
        )
        .await
    }

    #[cfg(test)]
    pub(crate) async fn list_all(&self) -> MagpieResult<Vec<Account>> {
        with_deadline(
            self.deadline,
            crate::modules::database::list_all_impl(&self.db),
        )
        .await
    }
}
