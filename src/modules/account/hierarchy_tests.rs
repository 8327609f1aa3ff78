use std::time::Duration;

use crate::modules::account::hierarchy::{build_child_path, path_segments, HierarchyService};
use crate::modules::account::{
    Account, AccountPlan, AccountSettings, AccountStatus, AccountStore, AccountUsage,
};
use crate::modules::database::manager::DatabaseManager;
use crate::modules::error::code::ErrorCode;
use crate::modules::error::MagpieError;

fn open_store() -> (tempfile::TempDir, AccountStore) {
    let dir = tempfile::tempdir().unwrap();
    let manager = DatabaseManager::open_at(dir.path().join("meta.db"), None).unwrap();
    let store = AccountStore::new(manager.meta_db().clone(), Duration::from_secs(5));
    (dir, store)
}

fn account(id: u64, parent: Option<&Account>) -> Account {
    let (account_path, level) = build_child_path(parent, id);
    Account {
        id,
        account_path,
        parent_id: parent.map(|p| p.id),
        owner_user_id: 1,
        created_by: 1,
        name: format!("account-{}", id),
        company: None,
        plan: AccountPlan::Starter,
        status: AccountStatus::Active,
        level,
        settings: AccountSettings::default(),
        usage: AccountUsage::default(),
        created_at: 1_700_000_000_000,
        updated_at: 1_700_000_000_000,
    }
}

fn code_of(err: &MagpieError) -> ErrorCode {
    match err {
        MagpieError::Generic { code, .. } => *code,
        MagpieError::IoError { .. } => ErrorCode::IoError,
    }
}

#[test]
fn test_build_child_path_for_roots_and_children() {
    let (root_path, root_level) = build_child_path(None, 17);
    assert_eq!(root_path, "17/");
    assert_eq!(root_level, 0);

    let root = account(17, None);
    let (child_path, child_level) = build_child_path(Some(&root), 42);
    assert_eq!(child_path, "17/42/");
    assert_eq!(child_level, 1);

    let child = account(42, Some(&root));
    let (grandchild_path, grandchild_level) = build_child_path(Some(&child), 99);
    assert_eq!(grandchild_path, "17/42/99/");
    assert_eq!(grandchild_level, 2);
}

#[test]
fn test_path_level_matches_segment_count() {
    let root = account(5, None);
    let child = account(6, Some(&root));
    let grandchild = account(7, Some(&child));

    for entry in [&root, &child, &grandchild] {
        let segments = path_segments(&entry.account_path).unwrap();
        assert_eq!(segments.len() as u32, entry.level + 1);
        assert_eq!(*segments.last().unwrap(), entry.id);
    }
}

#[test]
fn test_path_segments_rejects_garbage() {
    assert_eq!(path_segments("1/2/3/").unwrap(), vec![1, 2, 3]);
    assert!(path_segments("1/x/3/").is_err());
}

#[tokio::test]
async fn test_prefix_scan_does_not_match_sibling_with_prefix_id() {
    let (_dir, store) = open_store();
    // Account ids 1 and 12: "1/" must never match "12/".
    let one = account(1, None);
    let twelve = account(12, None);
    let child_of_one = account(5, Some(&one));
    store.insert(one.clone()).await.unwrap();
    store.insert(twelve.clone()).await.unwrap();
    store.insert(child_of_one).await.unwrap();

    let matched = store.scan_path_prefix(one.account_path.clone()).await.unwrap();
    let ids: Vec<u64> = matched.iter().map(|a| a.id).collect();
    assert_eq!(ids, vec![1, 5]);
}

#[tokio::test]
async fn test_list_descendants_returns_subtree_root_first() {
    let (_dir, store) = open_store();
    let root = account(10, None);
    let left = account(11, Some(&root));
    let right = account(12, Some(&root));
    let leaf = account(13, Some(&left));
    for entry in [&root, &left, &right, &leaf] {
        store.insert(entry.clone()).await.unwrap();
    }
    let hierarchy = HierarchyService::new(store);

    let subtree = hierarchy.list_descendants(10).await.unwrap();
    let ids: Vec<u64> = subtree.iter().map(|a| a.id).collect();
    // Root first, then path order: 10/11/ < 10/11/13/ < 10/12/.
    assert_eq!(ids, vec![10, 11, 13, 12]);

    let subtree = hierarchy.list_descendants(11).await.unwrap();
    let ids: Vec<u64> = subtree.iter().map(|a| a.id).collect();
    assert_eq!(ids, vec![11, 13]);
}

#[tokio::test]
async fn test_list_descendants_of_leaf_is_just_the_leaf() {
    let (_dir, store) = open_store();
    let root = account(20, None);
    store.insert(root).await.unwrap();
    let hierarchy = HierarchyService::new(store);

    let subtree = hierarchy.list_descendants(20).await.unwrap();
    assert_eq!(subtree.len(), 1);
    assert_eq!(subtree[0].id, 20);
}

#[tokio::test]
async fn test_list_descendants_of_missing_account_fails() {
    let (_dir, store) = open_store();
    let hierarchy = HierarchyService::new(store);

    let err = hierarchy.list_descendants(404).await.unwrap_err();
    assert_eq!(code_of(&err), ErrorCode::ResourceNotFound);
}

#[tokio::test]
async fn test_list_ancestors_walks_root_first() {
    let (_dir, store) = open_store();
    let root = account(30, None);
    let mid = account(31, Some(&root));
    let leaf = account(32, Some(&mid));
    for entry in [&root, &mid, &leaf] {
        store.insert(entry.clone()).await.unwrap();
    }
    let hierarchy = HierarchyService::new(store);

    let ancestors = hierarchy.list_ancestors(32).await.unwrap();
    let ids: Vec<u64> = ancestors.iter().map(|a| a.id).collect();
    assert_eq!(ids, vec![30, 31]);

    assert!(hierarchy.list_ancestors(30).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_list_ancestors_skips_missing_records() {
    let (_dir, store) = open_store();
    let root = account(40, None);
    let mid = account(41, Some(&root));
    let leaf = account(42, Some(&mid));
    // The root record is never written; the leaf's path still names it.
    store.insert(mid).await.unwrap();
    store.insert(leaf).await.unwrap();
    let hierarchy = HierarchyService::new(store);

    let ancestors = hierarchy.list_ancestors(42).await.unwrap();
    let ids: Vec<u64> = ancestors.iter().map(|a| a.id).collect();
    assert_eq!(ids, vec![41]);
}
