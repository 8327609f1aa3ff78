use crate::modules::account::payload::{
    CreateRootAccountRequest, CreateSubAccountRequest, InviteMemberRequest,
};
use crate::modules::database::manager::DatabaseManager;
use crate::modules::error::code::ErrorCode;
use crate::modules::error::MagpieError;
use crate::modules::membership::{MembershipRole, MembershipStatus, UserAccount};
use crate::modules::state::AppState;

fn open_state() -> (tempfile::TempDir, AppState) {
    let dir = tempfile::tempdir().unwrap();
    let manager = DatabaseManager::open_at(dir.path().join("meta.db"), None).unwrap();
    let state = AppState::for_tests(manager.meta_db().clone());
    (dir, state)
}

async fn create_root(state: &AppState, user_id: u64, name: &str) -> u64 {
    state
        .lifecycle
        .create_root_account(
            user_id,
            CreateRootAccountRequest {
                name: name.into(),
                company: None,
            },
        )
        .await
        .unwrap()
        .id
}

fn code_of(err: &MagpieError) -> ErrorCode {
    match err {
        MagpieError::Generic { code, .. } => *code,
        MagpieError::IoError { .. } => ErrorCode::IoError,
    }
}

#[tokio::test]
async fn test_switch_context_builds_full_view() {
    let (_dir, state) = open_state();
    let root_id = create_root(&state, 1, "Root").await;
    let sub = state
        .lifecycle
        .create_sub_account(
            root_id,
            1,
            CreateSubAccountRequest {
                name: "Branch".into(),
                company: None,
                owner_user_id: None,
            },
        )
        .await
        .unwrap();

    let context = state.context.switch_context(1, sub.id).await.unwrap();
    assert_eq!(context.user_id, 1);
    assert_eq!(context.account_id, sub.id);
    assert_eq!(context.account_name, "Branch");
    assert_eq!(context.role, MembershipRole::Admin);
    assert_eq!(context.account_path, sub.account_path);
    assert_eq!(context.level, 1);
    assert!(context.permissions.can_view_all_data);

    // Both memberships are offered, with exactly the target marked current.
    assert_eq!(context.available_accounts.len(), 2);
    let current: Vec<_> = context
        .available_accounts
        .iter()
        .filter(|entry| entry.current)
        .collect();
    assert_eq!(current.len(), 1);
    assert_eq!(current[0].account_id, sub.id);
}

#[tokio::test]
async fn test_switch_context_requires_active_membership() {
    let (_dir, state) = open_state();
    let root_id = create_root(&state, 1, "Root").await;

    let err = state.context.switch_context(2, root_id).await.unwrap_err();
    assert_eq!(code_of(&err), ErrorCode::AccessDenied);

    state
        .memberships
        .insert(UserAccount::invited_link(
            2,
            root_id,
            MembershipRole::Member,
            1_700_000_000_000,
        ))
        .await
        .unwrap();
    let err = state.context.switch_context(2, root_id).await.unwrap_err();
    assert_eq!(code_of(&err), ErrorCode::AccessDenied);
}

#[tokio::test]
async fn test_switch_context_fails_when_account_record_is_gone() {
    let (_dir, state) = open_state();
    state
        .memberships
        .insert(UserAccount::owner_link(1, 888, 1_700_000_000_000))
        .await
        .unwrap();

    let err = state.context.switch_context(1, 888).await.unwrap_err();
    assert_eq!(code_of(&err), ErrorCode::ResourceNotFound);
}

#[tokio::test]
async fn test_pending_invitations_are_listed_but_not_switchable() {
    let (_dir, state) = open_state();
    let mine = create_root(&state, 1, "Mine").await;
    let theirs = create_root(&state, 2, "Theirs").await;
    state
        .lifecycle
        .invite_member(
            theirs,
            2,
            InviteMemberRequest {
                user_id: 1,
                role: MembershipRole::Member,
            },
        )
        .await
        .unwrap();

    let context = state.context.switch_context(1, mine).await.unwrap();
    assert_eq!(context.available_accounts.len(), 2);
    let pending = context
        .available_accounts
        .iter()
        .find(|entry| entry.account_id == theirs)
        .unwrap();
    assert_eq!(pending.membership_status, MembershipStatus::Invited);
    assert!(!pending.current);

    let err = state.context.switch_context(1, theirs).await.unwrap_err();
    assert_eq!(code_of(&err), ErrorCode::AccessDenied);
}

#[tokio::test]
async fn test_list_user_accounts_skips_vanished_records() {
    let (_dir, state) = open_state();
    let root_id = create_root(&state, 1, "Real").await;
    // Second membership points at an account that was never written.
    state
        .memberships
        .insert(UserAccount::owner_link(1, 999, 1_700_000_000_000))
        .await
        .unwrap();

    let accounts = state.context.list_user_accounts(1).await.unwrap();
    assert_eq!(accounts.len(), 1);
    assert_eq!(accounts[0].id, root_id);
}

#[tokio::test]
async fn test_list_user_accounts_empty_without_memberships() {
    let (_dir, state) = open_state();
    assert!(state.context.list_user_accounts(42).await.unwrap().is_empty());
}
