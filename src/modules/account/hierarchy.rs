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

use crate::modules::account::{Account, AccountStore};
use crate::modules::error::{code::ErrorCode, MagpieResult};
use crate::raise_error;
use tracing::warn;

pub const PATH_SEPARATOR: char = '/';

/// Materialized path and depth for a new child of `parent`.
///
/// Every path ends with the separator, so a path is a prefix of exactly its
/// own subtree: account 12 yields `"12/"`, which never matches a sibling
/// `"123/"`. Passing `None` builds the path of a new root at level 0.
pub fn build_child_path(parent: Option<&Account>, child_id: u64) -> (String, u32) {
    match parent {
        Some(parent) => (
            format!("{}{}{}", parent.account_path, child_id, PATH_SEPARATOR),
            parent.level + 1,
        ),
        None => (format!("{}{}", child_id, PATH_SEPARATOR), 0),
    }
}

/// Splits a materialized path into its account id segments, root first.
/// The last segment is the id of the account owning the path.
pub fn path_segments(path: &str) -> MagpieResult<Vec<u64>> {
    path.split_terminator(PATH_SEPARATOR)
        .map(|segment| {
            segment.parse::<u64>().map_err(|_| {
                raise_error!(
                    format!("Malformed account path segment '{}'.", segment),
                    ErrorCode::InternalError
                )
            })
        })
        .collect()
}

/// Answers ancestor and descendant queries over the account tree.
///
/// Both directions are resolved from materialized paths alone: descendants
/// through a single range scan on the path index, ancestors by parsing the
/// id chain out of the account's own path. Neither requires walking
/// parent pointers record by record.
#[derive(Clone)]
pub struct HierarchyService {
    accounts: AccountStore,
}

impl HierarchyService {
    pub fn new(accounts: AccountStore) -> Self {
        HierarchyService { accounts }
    }

    /// The subtree rooted at `root_id`, root first, remaining accounts in
    /// path order. Suspended accounts are included; filtering by status is
    /// the caller's concern.
    pub async fn list_descendants(&self, root_id: u64) -> MagpieResult<Vec<Account>> {
        let root = self.accounts.get(root_id).await?;
        let matches = self
            .accounts
            .scan_path_prefix(root.account_path.clone())
            .await?;
        let mut subtree = Vec::with_capacity(matches.len());
        subtree.push(root);
        subtree.extend(matches.into_iter().filter(|account| account.id != root_id));
        Ok(subtree)
    }

    /// The chain of ancestors of `account_id`, from the root down to the
    /// direct parent. A root account has no ancestors and yields an empty
    /// list. Ancestor records missing from the store are logged and
    /// skipped; the chain itself comes from the path, which is authoritative.
    pub async fn list_ancestors(&self, account_id: u64) -> MagpieResult<Vec<Account>> {
        let account = self.accounts.get(account_id).await?;
        let segments = path_segments(&account.account_path)?;
        let mut ancestors = Vec::with_capacity(segments.len().saturating_sub(1));
        for ancestor_id in segments.iter().take(segments.len().saturating_sub(1)) {
            match self.accounts.find(*ancestor_id).await? {
                Some(ancestor) => ancestors.push(ancestor),
                None => warn!(
                    "Account {} lists ancestor {} in its path, but no such record exists; skipping",
                    account_id, ancestor_id
                ),
            }
        }
        Ok(ancestors)
    }
}
