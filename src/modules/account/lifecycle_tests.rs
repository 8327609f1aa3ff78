use crate::modules::account::payload::{
    AccountUpdateRequest, CreateRootAccountRequest, CreateSubAccountRequest, InviteMemberRequest,
};
use crate::modules::account::{
    Account, AccountPlan, AccountSettings, AccountStatus, AccountUsage,
};
use crate::modules::database::manager::DatabaseManager;
use crate::modules::error::code::ErrorCode;
use crate::modules::error::MagpieError;
use crate::modules::membership::{
    AccountPermissions, MembershipRole, MembershipStatus, UserAccount,
};
use crate::modules::state::AppState;
use rand::Rng;

fn open_state() -> (tempfile::TempDir, AppState) {
    let dir = tempfile::tempdir().unwrap();
    let manager = DatabaseManager::open_at(dir.path().join("meta.db"), None).unwrap();
    let state = AppState::for_tests(manager.meta_db().clone());
    (dir, state)
}

fn root_request(name: &str) -> CreateRootAccountRequest {
    CreateRootAccountRequest {
        name: name.into(),
        company: None,
    }
}

fn sub_request(name: &str) -> CreateSubAccountRequest {
    CreateSubAccountRequest {
        name: name.into(),
        company: None,
        owner_user_id: None,
    }
}

fn active_member(user_id: u64, account_id: u64) -> UserAccount {
    let mut link =
        UserAccount::invited_link(user_id, account_id, MembershipRole::Member, 1_700_000_000_000);
    link.status = MembershipStatus::Active;
    link
}

fn code_of(err: &MagpieError) -> ErrorCode {
    match err {
        MagpieError::Generic { code, .. } => *code,
        MagpieError::IoError { .. } => ErrorCode::IoError,
    }
}

#[tokio::test]
async fn test_create_root_account_writes_owner_link() {
    let (_dir, state) = open_state();

    let account = state
        .lifecycle
        .create_root_account(1, root_request("Acme Backup"))
        .await
        .unwrap();
    assert_eq!(account.parent_id, None);
    assert_eq!(account.level, 0);
    assert_eq!(account.account_path, format!("{}/", account.id));
    assert_eq!(account.owner_user_id, 1);
    assert_eq!(account.created_by, 1);
    assert_eq!(account.status, AccountStatus::Active);

    let link = state.access.require_active(1, account.id).await.unwrap();
    assert_eq!(link.role, MembershipRole::Owner);
    assert_eq!(link.permissions, AccountPermissions::full());
}

#[tokio::test]
async fn test_create_root_account_trims_and_validates_name() {
    let (_dir, state) = open_state();

    let account = state
        .lifecycle
        .create_root_account(1, root_request("  Acme  "))
        .await
        .unwrap();
    assert_eq!(account.name, "Acme");

    let err = state
        .lifecycle
        .create_root_account(1, root_request("   "))
        .await
        .unwrap_err();
    assert_eq!(code_of(&err), ErrorCode::InvalidParameter);
}

#[tokio::test]
async fn test_create_sub_account_nests_under_parent() {
    let (_dir, state) = open_state();
    let root = state
        .lifecycle
        .create_root_account(1, root_request("Root"))
        .await
        .unwrap();

    let sub = state
        .lifecycle
        .create_sub_account(root.id, 1, sub_request("Branch"))
        .await
        .unwrap();
    assert_eq!(sub.parent_id, Some(root.id));
    assert_eq!(sub.level, 1);
    assert_eq!(sub.account_path, format!("{}{}/", root.account_path, sub.id));
    assert_eq!(sub.owner_user_id, 1);

    let link = state.access.require_active(1, sub.id).await.unwrap();
    assert_eq!(link.role, MembershipRole::Admin);
}

#[tokio::test]
async fn test_sub_account_owner_may_differ_from_creator() {
    let (_dir, state) = open_state();
    let root = state
        .lifecycle
        .create_root_account(1, root_request("Root"))
        .await
        .unwrap();

    let mut request = sub_request("Delegated");
    request.owner_user_id = Some(9);
    let sub = state
        .lifecycle
        .create_sub_account(root.id, 1, request)
        .await
        .unwrap();
    assert_eq!(sub.owner_user_id, 9);
    assert_eq!(sub.created_by, 1);

    let link = state.access.require_active(9, sub.id).await.unwrap();
    assert_eq!(link.role, MembershipRole::Admin);
    // The creator holds no membership of their own on the new account.
    assert!(state.access.get_membership(1, sub.id).await.unwrap().is_none());
}

#[tokio::test]
async fn test_sub_account_creation_requires_active_link_with_permission() {
    let (_dir, state) = open_state();
    let root = state
        .lifecycle
        .create_root_account(1, root_request("Root"))
        .await
        .unwrap();

    // No membership at all.
    let err = state
        .lifecycle
        .create_sub_account(root.id, 2, sub_request("X"))
        .await
        .unwrap_err();
    assert_eq!(code_of(&err), ErrorCode::AccessDenied);

    // Invited but not yet accepted.
    state
        .memberships
        .insert(UserAccount::invited_link(
            3,
            root.id,
            MembershipRole::Admin,
            1_700_000_000_000,
        ))
        .await
        .unwrap();
    let err = state
        .lifecycle
        .create_sub_account(root.id, 3, sub_request("X"))
        .await
        .unwrap_err();
    assert_eq!(code_of(&err), ErrorCode::AccessDenied);

    // Active membership without the create permission.
    state.memberships.insert(active_member(4, root.id)).await.unwrap();
    let err = state
        .lifecycle
        .create_sub_account(root.id, 4, sub_request("X"))
        .await
        .unwrap_err();
    assert_eq!(code_of(&err), ErrorCode::AccessDenied);
}

#[tokio::test]
async fn test_sub_account_creation_fails_for_missing_parent_record() {
    let (_dir, state) = open_state();
    // A dangling membership row pointing at an account that was never written.
    state
        .memberships
        .insert(UserAccount::owner_link(6, 777, 1_700_000_000_000))
        .await
        .unwrap();

    let err = state
        .lifecycle
        .create_sub_account(777, 6, sub_request("Orphan"))
        .await
        .unwrap_err();
    assert_eq!(code_of(&err), ErrorCode::ResourceNotFound);
}

#[tokio::test]
async fn test_sub_account_quota_enforced() {
    let (_dir, state) = open_state();
    let root = state
        .lifecycle
        .create_root_account(1, root_request("Root"))
        .await
        .unwrap();

    let update = AccountUpdateRequest {
        settings: Some(AccountSettings {
            allow_sub_accounts: false,
            ..AccountSettings::default()
        }),
        ..AccountUpdateRequest::default()
    };
    state.lifecycle.update_account(root.id, 1, update).await.unwrap();
    let err = state
        .lifecycle
        .create_sub_account(root.id, 1, sub_request("Blocked"))
        .await
        .unwrap_err();
    assert_eq!(code_of(&err), ErrorCode::QuotaExceeded);

    let update = AccountUpdateRequest {
        settings: Some(AccountSettings {
            max_sub_accounts: 1,
            ..AccountSettings::default()
        }),
        ..AccountUpdateRequest::default()
    };
    state.lifecycle.update_account(root.id, 1, update).await.unwrap();
    state
        .lifecycle
        .create_sub_account(root.id, 1, sub_request("First"))
        .await
        .unwrap();
    let err = state
        .lifecycle
        .create_sub_account(root.id, 1, sub_request("Second"))
        .await
        .unwrap_err();
    assert_eq!(code_of(&err), ErrorCode::QuotaExceeded);
}

#[tokio::test]
async fn test_path_invariant_holds_across_a_random_tree() {
    let (_dir, state) = open_state();
    let root = state
        .lifecycle
        .create_root_account(1, root_request("Root"))
        .await
        .unwrap();

    let mut rng = rand::rng();
    let mut created = vec![root.clone()];
    for n in 0..12 {
        let parent = created[rng.random_range(0..created.len())].clone();
        let child = state
            .lifecycle
            .create_sub_account(parent.id, 1, sub_request(&format!("Node {}", n)))
            .await
            .unwrap();
        assert_eq!(
            child.account_path,
            format!("{}{}/", parent.account_path, child.id)
        );
        assert_eq!(child.level, parent.level + 1);
        created.push(child);
    }

    let descendants = state.hierarchy.list_descendants(root.id).await.unwrap();
    assert_eq!(descendants.len(), created.len());
    assert_eq!(descendants[0].id, root.id);
}

#[tokio::test]
async fn test_account_and_link_commit_together() {
    let (_dir, state) = open_state();
    // Occupy the (user, account) pair so the link write below must fail.
    state
        .memberships
        .insert(UserAccount::owner_link(1, 500, 1_700_000_000_000))
        .await
        .unwrap();

    let account = Account {
        id: 500,
        account_path: "500/".into(),
        parent_id: None,
        owner_user_id: 1,
        created_by: 1,
        name: "Doomed".into(),
        company: None,
        plan: AccountPlan::Starter,
        status: AccountStatus::Active,
        level: 0,
        settings: AccountSettings::default(),
        usage: AccountUsage::default(),
        created_at: 1_700_000_000_000,
        updated_at: 1_700_000_000_000,
    };
    let link = UserAccount::owner_link(1, 500, 1_700_000_000_001);
    state
        .lifecycle
        .persist_account_with_link(account, link)
        .await
        .unwrap_err();

    // The account insert from the aborted transaction must not be visible.
    assert!(state.accounts.find(500).await.unwrap().is_none());
}

#[tokio::test]
async fn test_update_account_requires_modify_permission() {
    let (_dir, state) = open_state();
    let root = state
        .lifecycle
        .create_root_account(1, root_request("Root"))
        .await
        .unwrap();
    state.memberships.insert(active_member(5, root.id)).await.unwrap();

    let update = AccountUpdateRequest {
        name: Some("Renamed".into()),
        ..AccountUpdateRequest::default()
    };
    let err = state
        .lifecycle
        .update_account(root.id, 5, update.clone())
        .await
        .unwrap_err();
    assert_eq!(code_of(&err), ErrorCode::AccessDenied);

    let updated = state.lifecycle.update_account(root.id, 1, update).await.unwrap();
    assert_eq!(updated.name, "Renamed");
    assert!(updated.updated_at >= root.updated_at);

    let err = state
        .lifecycle
        .update_account(root.id, 1, AccountUpdateRequest::default())
        .await
        .unwrap_err();
    assert_eq!(code_of(&err), ErrorCode::InvalidParameter);
}

#[tokio::test]
async fn test_invite_and_accept_flow() {
    let (_dir, state) = open_state();
    let root = state
        .lifecycle
        .create_root_account(1, root_request("Root"))
        .await
        .unwrap();

    let invite = InviteMemberRequest {
        user_id: 5,
        role: MembershipRole::Member,
    };
    let link = state
        .lifecycle
        .invite_member(root.id, 1, invite.clone())
        .await
        .unwrap();
    assert_eq!(link.status, MembershipStatus::Invited);
    assert_eq!(link.permissions, AccountPermissions::default());

    // The pair is now taken; a second invite cannot overwrite it.
    let err = state
        .lifecycle
        .invite_member(root.id, 1, invite)
        .await
        .unwrap_err();
    assert_eq!(code_of(&err), ErrorCode::AlreadyExists);

    let accepted = state.lifecycle.accept_invitation(root.id, 5).await.unwrap();
    assert_eq!(accepted.status, MembershipStatus::Active);
    assert!(state.access.validate_access(5, root.id).await.unwrap());

    let err = state.lifecycle.accept_invitation(root.id, 5).await.unwrap_err();
    assert_eq!(code_of(&err), ErrorCode::InvalidParameter);
}

#[tokio::test]
async fn test_invite_gates() {
    let (_dir, state) = open_state();
    let root = state
        .lifecycle
        .create_root_account(1, root_request("Root"))
        .await
        .unwrap();

    // Ownership can never be handed out by invitation.
    let err = state
        .lifecycle
        .invite_member(
            root.id,
            1,
            InviteMemberRequest {
                user_id: 5,
                role: MembershipRole::Owner,
            },
        )
        .await
        .unwrap_err();
    assert_eq!(code_of(&err), ErrorCode::InvalidParameter);

    // Plain members lack the invite permission.
    state.memberships.insert(active_member(5, root.id)).await.unwrap();
    let err = state
        .lifecycle
        .invite_member(
            root.id,
            5,
            InviteMemberRequest {
                user_id: 6,
                role: MembershipRole::Member,
            },
        )
        .await
        .unwrap_err();
    assert_eq!(code_of(&err), ErrorCode::AccessDenied);

    // A dangling membership row does not make the account itself exist.
    state
        .memberships
        .insert(UserAccount::owner_link(6, 777, 1_700_000_000_000))
        .await
        .unwrap();
    let err = state
        .lifecycle
        .invite_member(
            777,
            6,
            InviteMemberRequest {
                user_id: 8,
                role: MembershipRole::Member,
            },
        )
        .await
        .unwrap_err();
    assert_eq!(code_of(&err), ErrorCode::ResourceNotFound);
}

#[tokio::test]
async fn test_account_tree_end_to_end() {
    let (_dir, state) = open_state();

    let root = state
        .lifecycle
        .create_root_account(1, root_request("Tenant"))
        .await
        .unwrap();
    assert_eq!(root.level, 0);
    assert_eq!(root.account_path, format!("{}/", root.id));

    let sub = state
        .lifecycle
        .create_sub_account(root.id, 1, sub_request("Branch"))
        .await
        .unwrap();
    assert_eq!(sub.level, 1);
    assert_eq!(sub.account_path, format!("{}{}/", root.account_path, sub.id));

    assert!(state.access.validate_access(1, sub.id).await.unwrap());
    assert!(!state.access.validate_access(2, sub.id).await.unwrap());

    let ids: Vec<u64> = state
        .hierarchy
        .list_descendants(root.id)
        .await
        .unwrap()
        .iter()
        .map(|account| account.id)
        .collect();
    assert_eq!(ids, vec![root.id, sub.id]);

    // An outsider cannot grow the tree, and the failed attempt writes nothing.
    let err = state
        .lifecycle
        .create_sub_account(root.id, 2, sub_request("Intruder"))
        .await
        .unwrap_err();
    assert_eq!(code_of(&err), ErrorCode::AccessDenied);
    let after = state.hierarchy.list_descendants(root.id).await.unwrap();
    assert_eq!(after.len(), 2);
}
