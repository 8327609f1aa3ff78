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

use crate::modules::error::{code::ErrorCode, MagpieResult};
use crate::modules::membership::{MembershipStore, UserAccount};
use crate::raise_error;

/// Answers "may user U act on account A" from membership rows alone.
///
/// An account confers nothing on its ancestors or descendants: access means
/// an Active row for exactly this (user, account) pair. Infrastructure
/// failures stay errors and are never collapsed into a deny.
#[derive(Clone)]
pub struct AccessService {
    memberships: MembershipStore,
}

impl AccessService {
    pub fn new(memberships: MembershipStore) -> Self {
        AccessService { memberships }
    }

    /// Whether `user_id` holds an Active membership on `account_id`.
    pub async fn validate_access(&self, user_id: u64, account_id: u64) -> MagpieResult<bool> {
        Ok(self
            .memberships
            .find_pair(user_id, account_id)
            .await?
            .is_some_and(|link| link.is_active()))
    }

    /// The full membership row for the pair, regardless of status.
    pub async fn get_membership(
        &self,
        user_id: u64,
        account_id: u64,
    ) -> MagpieResult<Option<UserAccount>> {
        self.memberships.find_pair(user_id, account_id).await
    }

    /// The membership row when it exists and is Active, otherwise an
    /// `AccessDenied` error. The message does not distinguish a missing
    /// link from a suspended one, so callers cannot probe for account
    /// existence through it.
    pub async fn require_active(&self, user_id: u64, account_id: u64) -> MagpieResult<UserAccount> {
        match self.memberships.find_pair(user_id, account_id).await? {
            Some(link) if link.is_active() => Ok(link),
            _ => Err(raise_error!(
                "You do not have access to this account.".into(),
                ErrorCode::AccessDenied
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::database::manager::DatabaseManager;
    use crate::modules::membership::{MembershipStatus, UserAccount};
    use std::time::Duration;

    fn open_store() -> (tempfile::TempDir, MembershipStore) {
        let dir = tempfile::tempdir().unwrap();
        let manager = DatabaseManager::open_at(dir.path().join("meta.db"), None).unwrap();
        let store = MembershipStore::new(manager.meta_db().clone(), Duration::from_secs(5));
        (dir, store)
    }

    #[tokio::test]
    async fn test_active_membership_grants_access() {
        let (_dir, store) = open_store();
        store
            .insert(UserAccount::owner_link(7, 99, 1_700_000_000_000))
            .await
            .unwrap();
        let access = AccessService::new(store);

        assert!(access.validate_access(7, 99).await.unwrap());
        let link = access.require_active(7, 99).await.unwrap();
        assert_eq!(link.user_id, 7);
        assert_eq!(link.account_id, 99);
    }

    #[tokio::test]
    async fn test_missing_and_inactive_links_deny_access() {
        let (_dir, store) = open_store();
        let mut suspended = UserAccount::owner_link(7, 99, 1_700_000_000_000);
        suspended.status = MembershipStatus::Suspended;
        store.insert(suspended).await.unwrap();
        let access = AccessService::new(store);

        // No row at all.
        assert!(!access.validate_access(8, 99).await.unwrap());
        // Row exists but is not Active.
        assert!(!access.validate_access(7, 99).await.unwrap());

        let missing = access.require_active(8, 99).await.unwrap_err();
        let inactive = access.require_active(7, 99).await.unwrap_err();
        // Both denials carry the same message.
        assert_eq!(missing.to_string(), inactive.to_string());
    }

    #[tokio::test]
    async fn test_membership_scoped_to_exact_account() {
        let (_dir, store) = open_store();
        store
            .insert(UserAccount::owner_link(7, 100, 1_700_000_000_000))
            .await
            .unwrap();
        let access = AccessService::new(store);

        // Access to account 100 says nothing about account 101.
        assert!(access.validate_access(7, 100).await.unwrap());
        assert!(!access.validate_access(7, 101).await.unwrap());
    }

    #[tokio::test]
    async fn test_get_membership_returns_any_status() {
        let (_dir, store) = open_store();
        store
            .insert(UserAccount::invited_link(
                5,
                42,
                crate::modules::membership::MembershipRole::Member,
                1_700_000_000_000,
            ))
            .await
            .unwrap();
        let access = AccessService::new(store);

        let link = access.get_membership(5, 42).await.unwrap().unwrap();
        assert_eq!(link.status, MembershipStatus::Invited);
        assert!(access.get_membership(5, 43).await.unwrap().is_none());
    }
}
