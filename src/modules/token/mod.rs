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
    async_find_impl, delete_impl, filter_by_secondary_key_impl, insert_impl, update_impl,
    with_deadline, with_transaction,
};
use crate::modules::error::{code::ErrorCode, MagpieResult};
use crate::modules::users::{User, UserStore};
use crate::{generate_token, raise_error, utc_now};
use native_db::*;
use native_model::{native_model, Model};
use poem_openapi::{Enum, Object};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize, Enum)]
pub enum TokenType {
    WebUI,
    Api,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize, Object)]
#[native_model(id = 4, version = 1)]
#[native_db]
pub struct AccessTokenModel {
    /// The ID of the user who owns this token
    #[secondary_key]
    pub user_id: u64,
    /// The unique token string used for authentication
    #[primary_key]
    pub token: String,
    /// An optional name of the token.
    pub name: Option<String>,
    /// Token type: WebUI or API
    pub token_type: TokenType,
    /// The timestamp (in milliseconds since epoch) when the token was created.
    pub created_at: i64,
    /// The timestamp (in milliseconds since epoch) when the token was last updated.
    pub updated_at: i64,
    /// The timestamp (in milliseconds since epoch) when the token expires.
    /// None means the token does not expire (this applies only to API tokens).
    pub expire_at: Option<i64>,
    /// The timestamp (in milliseconds since epoch) when the token was last used.
    pub last_access_at: i64,
}

impl AccessTokenModel {
    pub fn new_api_token(
        token: String,
        user_id: u64,
        name: Option<String>,
        expire_at: Option<i64>,
    ) -> Self {
        let now = utc_now!();
        Self {
            token,
            created_at: now,
            updated_at: now,
            last_access_at: Default::default(),
            name,
            user_id,
            token_type: TokenType::Api,
            expire_at,
        }
    }

    pub fn new_webui_token(user_id: u64) -> AccessTokenModel {
        let now = utc_now!();
        AccessTokenModel {
            token: generate_token!(128),
            created_at: now,
            updated_at: now,
            last_access_at: Default::default(),
            name: None,
            user_id,
            token_type: TokenType::WebUI,
            expire_at: None,
        }
    }
}

/// Payload for creating a named API token.
#[derive(Clone, Debug, Default, Eq, PartialEq, Deserialize, Serialize, Object)]
pub struct AccessTokenCreateRequest {
    pub name: Option<String>,
    /// Token lifetime in hours. None creates a non-expiring token.
    pub expire_in: Option<u64>,
}

impl AccessTokenCreateRequest {
    pub fn validate(&self) -> MagpieResult<()> {
        if self.expire_in == Some(0) {
            return Err(raise_error!(
                "expire_in must be at least one hour.".into(),
                ErrorCode::InvalidParameter
            ));
        }
        Ok(())
    }
}

/// Issues, rotates and resolves bearer tokens.
#[derive(Clone)]
pub struct TokenService {
    db: Arc<Database<'static>>,
    users: UserStore,
    deadline: Duration,
    webui_token_ttl_hours: u64,
}

impl TokenService {
    pub fn new(
        db: Arc<Database<'static>>,
        users: UserStore,
        deadline: Duration,
        webui_token_ttl_hours: u64,
    ) -> Self {
        TokenService {
            db,
            users,
            deadline,
            webui_token_ttl_hours,
        }
    }

    /// Replaces the user's web session token with a fresh one. The removal
    /// of the old token and the insert of the new one commit together.
    pub async fn reset_webui_token(&self, user_id: u64) -> MagpieResult<String> {
        let old_token = self.get_user_webui_token(user_id).await?;
        let new_token = AccessTokenModel::new_webui_token(user_id);
        let new_token_str = new_token.token.clone();

        match old_token {
            Some(old) => {
                with_deadline(
                    self.deadline,
                    with_transaction(&self.db, move |rw| {
                        rw.remove(old).map_err(|e| {
                            raise_error!(format!("{:#?}", e), ErrorCode::InternalError)
                        })?;
                        rw.insert(new_token).map_err(|e| {
                            raise_error!(format!("{:#?}", e), ErrorCode::InternalError)
                        })?;
                        Ok(())
                    }),
                )
                .await?;
            }
            None => {
                with_deadline(self.deadline, insert_impl(&self.db, new_token)).await?;
            }
        }

        Ok(new_token_str)
    }

    pub async fn get_user_webui_token(
        &self,
        user_id: u64,
    ) -> MagpieResult<Option<AccessTokenModel>> {
        let tokens: Vec<AccessTokenModel> = with_deadline(
            self.deadline,
            filter_by_secondary_key_impl(&self.db, AccessTokenModelKey::user_id, user_id),
        )
        .await?;
        Ok(tokens
            .into_iter()
            .find(|t| t.token_type == TokenType::WebUI))
    }

    pub async fn get_user_api_tokens(&self, user_id: u64) -> MagpieResult<Vec<AccessTokenModel>> {
        let tokens: Vec<AccessTokenModel> = with_deadline(
            self.deadline,
            filter_by_secondary_key_impl(&self.db, AccessTokenModelKey::user_id, user_id),
        )
        .await?;
        Ok(tokens
            .into_iter()
            .filter(|t| t.token_type == TokenType::Api)
            .collect())
    }

    /// Resolves a bearer token to its user, enforcing expiry.
    ///
    /// API token usage also stamps `last_access_at`; web session tokens age
    /// out from their creation time instead.
    pub async fn resolve_user_from_token(&self, token: &str) -> MagpieResult<User> {
        let token = token.to_string();
        let token_option: Option<AccessTokenModel> =
            with_deadline(self.deadline, async_find_impl(&self.db, token)).await?;
        let token = match token_option {
            Some(token) => token,
            None => {
                return Err(raise_error!(
                    "Permission denied: no valid access token provided.".into(),
                    ErrorCode::PermissionDenied
                ))
            }
        };

        if matches!(token.token_type, TokenType::WebUI) {
            let life = utc_now!() - token.created_at;
            let max_life = self.webui_token_ttl_hours * 60 * 60 * 1000;
            if life > (max_life as i64) {
                return Err(raise_error!(
                    "Permission denied: the web session token has expired.".into(),
                    ErrorCode::PermissionDenied
                ));
            }
        }

        if matches!(token.token_type, TokenType::Api) {
            if let Some(expire_at) = token.expire_at {
                if utc_now!() > expire_at {
                    return Err(raise_error!(
                        "Your API token has expired and is no longer valid.".into(),
                        ErrorCode::PermissionDenied
                    ));
                }
            }
            let token_key = token.token.clone();
            with_deadline(
                self.deadline,
                update_impl(
                    &self.db,
                    |rw| {
                        rw.get()
                            .primary::<AccessTokenModel>(token_key)
                            .map_err(|e| {
                                raise_error!(format!("{:#?}", e), ErrorCode::InternalError)
                            })?
                            .ok_or_else(|| {
                                raise_error!(
                                    "The access token does not exist or has been reset.".into(),
                                    ErrorCode::ResourceNotFound
                                )
                            })
                    },
                    |current| {
                        let mut updated = current.clone();
                        updated.last_access_at = utc_now!();
                        Ok(updated)
                    },
                ),
            )
            .await?;
        }

        let user = self.users.find(token.user_id).await?.ok_or_else(|| {
            raise_error!(
                "The user associated with this access token does not exist or may have been deleted."
                    .into(),
                ErrorCode::ResourceNotFound
            )
        })?;
        Ok(user)
    }

    pub async fn create_api_token(
        &self,
        user_id: u64,
        request: AccessTokenCreateRequest,
    ) -> MagpieResult<String> {
        request.validate()?;
        let expire_at = request
            .expire_in
            .map(|hours| utc_now!() + (hours as i64) * 60 * 60 * 1000);
        let token = generate_token!(128);
        let access_token =
            AccessTokenModel::new_api_token(token.clone(), user_id, request.name, expire_at);
        with_deadline(self.deadline, insert_impl(&self.db, access_token)).await?;
        Ok(token)
    }

    /// Deletes one of `user_id`'s own tokens. Tokens belonging to other
    /// users are reported as not found rather than forbidden, so the
    /// endpoint cannot be used to test whether a token string exists.
    pub async fn delete_user_token(&self, user_id: u64, token: &str) -> MagpieResult<()> {
        let token = token.to_string();
        with_deadline(
            self.deadline,
            delete_impl(&self.db, move |rw| {
                let found: Option<AccessTokenModel> = rw
                    .get()
                    .primary(token.clone())
                    .map_err(|e| raise_error!(format!("{:#?}", e), ErrorCode::InternalError))?;
                match found {
                    Some(model) if model.user_id == user_id => Ok(model),
                    _ => Err(raise_error!(
                        "The token was not found among your tokens.".into(),
                        ErrorCode::ResourceNotFound
                    )),
                }
            }),
        )
        .await
    }
}

#[cfg(test)]
mod token_tests;
