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
use crate::raise_error;
use email_address::EmailAddress;
use poem_openapi::Object;
use serde::{Deserialize, Serialize};

const MIN_USERNAME_LENGTH: usize = 3;
const MAX_USERNAME_LENGTH: usize = 64;
const MIN_PASSWORD_LENGTH: usize = 8;

#[derive(Clone, Debug, Default, Eq, PartialEq, Deserialize, Serialize, Object)]
pub struct SignupRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl SignupRequest {
    pub fn validate(&self) -> MagpieResult<()> {
        let username = self.username.trim();
        if username.len() < MIN_USERNAME_LENGTH || username.len() > MAX_USERNAME_LENGTH {
            return Err(raise_error!(
                format!(
                    "Username must be between {} and {} characters.",
                    MIN_USERNAME_LENGTH, MAX_USERNAME_LENGTH
                ),
                ErrorCode::InvalidParameter
            ));
        }
        if !username
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == '.')
        {
            return Err(raise_error!(
                "Username may only contain letters, digits, '_', '-' and '.'.".into(),
                ErrorCode::InvalidParameter
            ));
        }
        if !EmailAddress::is_valid(&self.email) {
            return Err(raise_error!(
                format!("'{}' is not a valid email address.", self.email),
                ErrorCode::InvalidParameter
            ));
        }
        if self.password.len() < MIN_PASSWORD_LENGTH {
            return Err(raise_error!(
                format!(
                    "Password must be at least {} characters long.",
                    MIN_PASSWORD_LENGTH
                ),
                ErrorCode::InvalidParameter
            ));
        }
        Ok(())
    }
}

#[derive(Clone, Debug, Default, Eq, PartialEq, Deserialize, Serialize, Object)]
pub struct LoginRequest {
    /// Username or email address.
    pub username: String,
    pub password: String,
}

#[derive(Clone, Debug, Default, Eq, PartialEq, Deserialize, Serialize, Object)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

impl ChangePasswordRequest {
    pub fn validate(&self) -> MagpieResult<()> {
        if self.new_password.len() < MIN_PASSWORD_LENGTH {
            return Err(raise_error!(
                format!(
                    "Password must be at least {} characters long.",
                    MIN_PASSWORD_LENGTH
                ),
                ErrorCode::InvalidParameter
            ));
        }
        if self.new_password == self.current_password {
            return Err(raise_error!(
                "The new password must differ from the current one.".into(),
                ErrorCode::InvalidParameter
            ));
        }
        Ok(())
    }
}
