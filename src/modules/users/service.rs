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

use crate::modules::database::{with_deadline, with_transaction};
use crate::modules::error::{code::ErrorCode, MagpieResult};
use crate::modules::token::{AccessTokenModel, TokenService};
use crate::modules::users::payload::{ChangePasswordRequest, LoginRequest, SignupRequest};
use crate::modules::users::{LoginResult, User, UserStore};
use crate::modules::utils::password::{hash_password, verify_password};
use crate::{id, raise_error, utc_now};
use tracing::{info, warn};

/// Signup and login flows on top of [`UserStore`] and [`TokenService`].
#[derive(Clone)]
pub struct UserService {
    users: UserStore,
    tokens: TokenService,
}

impl UserService {
    pub fn new(users: UserStore, tokens: TokenService) -> Self {
        UserService { users, tokens }
    }

    /// Registers a new user and issues their first web session token. The
    /// user record and the token are inserted in one transaction, so a
    /// signup either fully succeeds or leaves nothing behind.
    pub async fn signup(&self, request: SignupRequest) -> MagpieResult<(User, String)> {
        request.validate()?;
        self.users.check_username_conflict(&request.username).await?;
        self.users.check_email_conflict(&request.email).await?;

        let now = utc_now!();
        let user = User {
            id: id!(64),
            username: request.username,
            email: request.email,
            password: Some(hash_password(&request.password)?),
            created_at: now,
            updated_at: now,
        };
        let token = AccessTokenModel::new_webui_token(user.id);
        let token_str = token.token.clone();

        let inserted = user.clone();
        with_deadline(
            self.users.deadline(),
            with_transaction(self.users.database(), move |rw| {
                rw.insert(user)
                    .map_err(|e| raise_error!(format!("{:#?}", e), ErrorCode::InternalError))?;
                rw.insert(token)
                    .map_err(|e| raise_error!(format!("{:#?}", e), ErrorCode::InternalError))?;
                Ok(())
            }),
        )
        .await?;

        Ok((inserted, token_str))
    }

    /// Verifies credentials against the stored hash and rotates the web
    /// session token on success. Login failures are reported through the
    /// result payload, not as errors.
    pub async fn authenticate(&self, request: LoginRequest) -> MagpieResult<LoginResult> {
        let user = match self.users.find_by_username(&request.username).await? {
            Some(user) => Some(user),
            None => self.users.find_by_email(&request.username).await?,
        };
        let user = match user {
            Some(user) => user,
            None => {
                return Ok(LoginResult {
                    success: false,
                    error_message: Some("User or email not found.".to_string()),
                    access_token: None,
                })
            }
        };

        match user.password.as_ref() {
            Some(stored_hash) => {
                if verify_password(&request.password, stored_hash) {
                    let new_token = self.tokens.reset_webui_token(user.id).await?;
                    Ok(LoginResult {
                        success: true,
                        error_message: None,
                        access_token: Some(new_token),
                    })
                } else {
                    warn!(
                        "Login failed: incorrect password for user '{}'.",
                        user.username
                    );
                    Ok(LoginResult {
                        success: false,
                        error_message: Some("Incorrect password.".to_string()),
                        access_token: None,
                    })
                }
            }
            None => {
                warn!("Login failed: user '{}' has no password set.", user.username);
                Ok(LoginResult {
                    success: false,
                    error_message: Some(format!(
                        "User '{}' has no password set and cannot sign in with one.",
                        user.username
                    )),
                    access_token: None,
                })
            }
        }
    }

    /// Replaces the user's password after checking the current one, then
    /// rotates the web session token so older sessions stop working. Returns
    /// the fresh token for the caller's own session.
    pub async fn change_password(
        &self,
        user_id: u64,
        request: ChangePasswordRequest,
    ) -> MagpieResult<String> {
        request.validate()?;
        let user = self.users.find(user_id).await?.ok_or_else(|| {
            raise_error!(
                format!("User with id={} not found.", user_id),
                ErrorCode::ResourceNotFound
            )
        })?;
        let stored_hash = user.password.as_ref().ok_or_else(|| {
            raise_error!(
                "This user has no password set.".into(),
                ErrorCode::InvalidParameter
            )
        })?;
        if !verify_password(&request.current_password, stored_hash) {
            return Err(raise_error!(
                "The current password is incorrect.".into(),
                ErrorCode::PermissionDenied
            ));
        }
        let new_hash = hash_password(&request.new_password)?;
        self.users
            .update_with(user_id, move |current| {
                let mut updated = current.clone();
                updated.password = Some(new_hash);
                updated.updated_at = utc_now!();
                Ok(updated)
            })
            .await?;
        let token = self.tokens.reset_webui_token(user_id).await?;
        info!("User {} changed their password", user_id);
        Ok(token)
    }
}
