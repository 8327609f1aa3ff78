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

use crate::modules::database::{async_find_impl, secondary_find_impl, update_impl, with_deadline};
use crate::modules::error::{code::ErrorCode, MagpieResult};
use crate::raise_error;
use native_db::*;
use native_model::{native_model, Model};
use poem_openapi::Object;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

pub mod payload;
pub mod service;
pub mod view;

/// A person who can sign in. Which tenants they may touch is recorded
/// separately as membership links, never on the user itself.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize, Object)]
#[native_model(id = 3, version = 1)]
#[native_db]
pub struct User {
    #[primary_key]
    pub id: u64,
    #[secondary_key(unique)]
    pub username: String,
    #[secondary_key(unique)]
    pub email: String,
    /// PBKDF2 password hash. None for identities provisioned externally.
    pub password: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize, Object)]
pub struct LoginResult {
    pub success: bool,
    pub error_message: Option<String>,
    pub access_token: Option<String>,
}

/// Persistence handle for [`User`] records.
#[derive(Clone)]
pub struct UserStore {
    db: Arc<Database<'static>>,
    deadline: Duration,
}

impl UserStore {
    pub fn new(db: Arc<Database<'static>>, deadline: Duration) -> Self {
        UserStore { db, deadline }
    }

    pub(crate) fn database(&self) -> &Arc<Database<'static>> {
        &self.db
    }

    pub(crate) fn deadline(&self) -> Duration {
        self.deadline
    }

    pub async fn find(&self, user_id: u64) -> MagpieResult<Option<User>> {
        with_deadline(self.deadline, async_find_impl(&self.db, user_id)).await
    }

    pub async fn find_by_username(&self, username: &str) -> MagpieResult<Option<User>> {
        with_deadline(
            self.deadline,
            secondary_find_impl(&self.db, UserKey::username, username.to_string()),
        )
        .await
    }

    pub async fn find_by_email(&self, email: &str) -> MagpieResult<Option<User>> {
        with_deadline(
            self.deadline,
            secondary_find_impl(&self.db, UserKey::email, email.to_string()),
        )
        .await
    }

    /// Applies `apply` to the current record inside a read-write transaction
    /// and persists the result.
    pub async fn update_with(
        &self,
        user_id: u64,
        apply: impl FnOnce(&User) -> MagpieResult<User> + Send + 'static,
    ) -> MagpieResult<User> {
        with_deadline(
            self.deadline,
            update_impl(
                &self.db,
                move |rw| {
                    rw.get()
                        .primary::<User>(user_id)
                        .map_err(|e| raise_error!(format!("{:#?}", e), ErrorCode::InternalError))?
                        .ok_or_else(|| {
                            raise_error!(
                                format!("User with id={} not found.", user_id),
                                ErrorCode::ResourceNotFound
                            )
                        })
                },
                apply,
            ),
        )
        .await
    }

    pub async fn check_username_conflict(&self, username: &str) -> MagpieResult<()> {
        if self.find_by_username(username).await?.is_some() {
            return Err(raise_error!(
                format!("Username '{}' is already taken.", username),
                ErrorCode::AlreadyExists
            ));
        }
        Ok(())
    }

    pub async fn check_email_conflict(&self, email: &str) -> MagpieResult<()> {
        if self.find_by_email(email).await?.is_some() {
            return Err(raise_error!(
                format!("Email '{}' is already registered.", email),
                ErrorCode::AlreadyExists
            ));
        }
        Ok(())
    }
}
