use std::sync::Arc;
use std::time::Duration;

use native_db::Database;

use crate::modules::database::insert_impl;
use crate::modules::database::manager::DatabaseManager;
use crate::modules::error::code::ErrorCode;
use crate::modules::error::MagpieError;
use crate::modules::state::AppState;
use crate::modules::token::{AccessTokenCreateRequest, AccessTokenModel, TokenService};
use crate::modules::users::payload::{ChangePasswordRequest, LoginRequest, SignupRequest};
use crate::modules::users::{User, UserStore};
use crate::utc_now;

fn open_state() -> (tempfile::TempDir, Arc<Database<'static>>, AppState) {
    let dir = tempfile::tempdir().unwrap();
    let manager = DatabaseManager::open_at(dir.path().join("meta.db"), None).unwrap();
    let db = manager.meta_db().clone();
    let state = AppState::for_tests(db.clone());
    (dir, db, state)
}

async fn signup(state: &AppState, username: &str, email: &str, password: &str) -> (User, String) {
    state
        .user_service
        .signup(SignupRequest {
            username: username.into(),
            email: email.into(),
            password: password.into(),
        })
        .await
        .unwrap()
}

fn code_of(err: &MagpieError) -> ErrorCode {
    match err {
        MagpieError::Generic { code, .. } => *code,
        MagpieError::IoError { .. } => ErrorCode::IoError,
    }
}

#[tokio::test]
async fn test_signup_issues_resolvable_session_token() {
    let (_dir, _db, state) = open_state();

    let (user, token) = signup(&state, "backup.admin", "admin@example.com", "s3cret-pass").await;
    let resolved = state.tokens.resolve_user_from_token(&token).await.unwrap();
    assert_eq!(resolved.id, user.id);
    assert_eq!(resolved.username, "backup.admin");

    // Usernames and emails stay unique across signups.
    let err = state
        .user_service
        .signup(SignupRequest {
            username: "backup.admin".into(),
            email: "other@example.com".into(),
            password: "s3cret-pass".into(),
        })
        .await
        .unwrap_err();
    assert_eq!(code_of(&err), ErrorCode::AlreadyExists);
}

#[tokio::test]
async fn test_login_rotates_the_session_token() {
    let (_dir, _db, state) = open_state();
    let (_user, first) = signup(&state, "rotate.me", "rotate@example.com", "s3cret-pass").await;

    let result = state
        .user_service
        .authenticate(LoginRequest {
            username: "rotate.me".into(),
            password: "s3cret-pass".into(),
        })
        .await
        .unwrap();
    assert!(result.success);
    let second = result.access_token.unwrap();
    assert_ne!(first, second);

    // The replaced token stops working; the fresh one resolves.
    let err = state.tokens.resolve_user_from_token(&first).await.unwrap_err();
    assert_eq!(code_of(&err), ErrorCode::PermissionDenied);
    state.tokens.resolve_user_from_token(&second).await.unwrap();

    // The email address works as a login name too.
    let result = state
        .user_service
        .authenticate(LoginRequest {
            username: "rotate@example.com".into(),
            password: "s3cret-pass".into(),
        })
        .await
        .unwrap();
    assert!(result.success);
}

#[tokio::test]
async fn test_login_failures_are_reported_in_the_result() {
    let (_dir, _db, state) = open_state();
    signup(&state, "someone", "someone@example.com", "s3cret-pass").await;

    let result = state
        .user_service
        .authenticate(LoginRequest {
            username: "nobody".into(),
            password: "whatever-pass".into(),
        })
        .await
        .unwrap();
    assert!(!result.success);
    assert!(result.access_token.is_none());
    assert!(result.error_message.is_some());

    let result = state
        .user_service
        .authenticate(LoginRequest {
            username: "someone".into(),
            password: "wrong-pass-entirely".into(),
        })
        .await
        .unwrap();
    assert!(!result.success);
    assert!(result.access_token.is_none());
}

#[tokio::test]
async fn test_webui_token_expires_after_ttl() {
    let dir = tempfile::tempdir().unwrap();
    let manager = DatabaseManager::open_at(dir.path().join("meta.db"), None).unwrap();
    let db = manager.meta_db().clone();
    let users = UserStore::new(db.clone(), Duration::from_secs(5));
    let tokens = TokenService::new(db.clone(), users, Duration::from_secs(5), 72);

    let user = User {
        id: 7,
        username: "old.session".into(),
        email: "old@example.com".into(),
        password: None,
        created_at: 0,
        updated_at: 0,
    };
    insert_impl(&db, user).await.unwrap();
    let mut aged = AccessTokenModel::new_webui_token(7);
    aged.created_at = utc_now!() - 73 * 60 * 60 * 1000;
    let aged_token = aged.token.clone();
    insert_impl(&db, aged).await.unwrap();

    let err = tokens.resolve_user_from_token(&aged_token).await.unwrap_err();
    assert_eq!(code_of(&err), ErrorCode::PermissionDenied);
}

#[tokio::test]
async fn test_api_token_lifecycle() {
    let (_dir, _db, state) = open_state();
    let (user, _session) = signup(&state, "ci.bot", "ci@example.com", "s3cret-pass").await;

    let token = state
        .tokens
        .create_api_token(
            user.id,
            AccessTokenCreateRequest {
                name: Some("ci".into()),
                expire_in: None,
            },
        )
        .await
        .unwrap();
    let listed = state.tokens.get_user_api_tokens(user.id).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].name.as_deref(), Some("ci"));
    assert_eq!(listed[0].expire_at, None);
    assert_eq!(listed[0].last_access_at, 0);

    // Using the token stamps last_access_at.
    let resolved = state.tokens.resolve_user_from_token(&token).await.unwrap();
    assert_eq!(resolved.id, user.id);
    let listed = state.tokens.get_user_api_tokens(user.id).await.unwrap();
    assert!(listed[0].last_access_at > 0);

    state.tokens.delete_user_token(user.id, &token).await.unwrap();
    assert!(state.tokens.get_user_api_tokens(user.id).await.unwrap().is_empty());
    let err = state.tokens.resolve_user_from_token(&token).await.unwrap_err();
    assert_eq!(code_of(&err), ErrorCode::PermissionDenied);
}

#[tokio::test]
async fn test_expired_api_token_is_rejected() {
    let (_dir, db, state) = open_state();
    let (user, _session) = signup(&state, "expired", "expired@example.com", "s3cret-pass").await;

    let expired = AccessTokenModel::new_api_token(
        "expired-token".into(),
        user.id,
        None,
        Some(utc_now!() - 1000),
    );
    insert_impl(&db, expired).await.unwrap();

    let err = state
        .tokens
        .resolve_user_from_token("expired-token")
        .await
        .unwrap_err();
    assert_eq!(code_of(&err), ErrorCode::PermissionDenied);

    let err = state
        .tokens
        .create_api_token(
            user.id,
            AccessTokenCreateRequest {
                name: None,
                expire_in: Some(0),
            },
        )
        .await
        .unwrap_err();
    assert_eq!(code_of(&err), ErrorCode::InvalidParameter);
}

#[tokio::test]
async fn test_token_deletion_is_scoped_to_its_owner() {
    let (_dir, _db, state) = open_state();
    let (alice, _) = signup(&state, "alice", "alice@example.com", "s3cret-pass").await;
    let (bob, _) = signup(&state, "bob", "bob@example.com", "s3cret-pass").await;

    let token = state
        .tokens
        .create_api_token(alice.id, AccessTokenCreateRequest::default())
        .await
        .unwrap();

    let err = state.tokens.delete_user_token(bob.id, &token).await.unwrap_err();
    assert_eq!(code_of(&err), ErrorCode::ResourceNotFound);
    // The token is untouched and still resolves.
    let resolved = state.tokens.resolve_user_from_token(&token).await.unwrap();
    assert_eq!(resolved.id, alice.id);
}

#[tokio::test]
async fn test_change_password_rotates_the_session() {
    let (_dir, _db, state) = open_state();
    let (user, old_session) = signup(&state, "pw.change", "pw@example.com", "old-pass-123").await;

    let err = state
        .user_service
        .change_password(
            user.id,
            ChangePasswordRequest {
                current_password: "not-the-old-pass".into(),
                new_password: "new-pass-456".into(),
            },
        )
        .await
        .unwrap_err();
    assert_eq!(code_of(&err), ErrorCode::PermissionDenied);

    let fresh = state
        .user_service
        .change_password(
            user.id,
            ChangePasswordRequest {
                current_password: "old-pass-123".into(),
                new_password: "new-pass-456".into(),
            },
        )
        .await
        .unwrap();

    // Old session and old password are both dead.
    let err = state
        .tokens
        .resolve_user_from_token(&old_session)
        .await
        .unwrap_err();
    assert_eq!(code_of(&err), ErrorCode::PermissionDenied);
    state.tokens.resolve_user_from_token(&fresh).await.unwrap();

    let result = state
        .user_service
        .authenticate(LoginRequest {
            username: "pw.change".into(),
            password: "old-pass-123".into(),
        })
        .await
        .unwrap();
    assert!(!result.success);
    let result = state
        .user_service
        .authenticate(LoginRequest {
            username: "pw.change".into(),
            password: "new-pass-456".into(),
        })
        .await
        .unwrap();
    assert!(result.success);
}
