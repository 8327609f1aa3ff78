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

use crate::modules::state::AppState;
use crate::modules::users::payload::SignupRequest;
use crate::modules::users::view::UserView;
use poem::{
    error::ResponseError,
    handler,
    web::{Data, Json},
    IntoResponse, Response,
};
use serde::Serialize;
use std::sync::Arc;

#[derive(Serialize)]
pub struct SignupResult {
    pub user: UserView,
    pub access_token: String,
}

/// Signup endpoint
///
/// Registers a new user and returns the created profile together with the
/// first web session token. Validation and conflict errors carry their
/// proper status codes.
#[handler]
pub async fn signup(state: Data<&Arc<AppState>>, payload: Json<SignupRequest>) -> Response {
    match state.user_service.signup(payload.0).await {
        Ok((user, access_token)) => {
            let result = SignupResult {
                user: UserView::from_model(user),
                access_token,
            };
            match serde_json::to_string(&result) {
                Ok(json_string) => Response::builder()
                    .status(http::StatusCode::OK)
                    .content_type("application/json")
                    .body(json_string)
                    .into_response(),
                Err(_) => Response::builder()
                    .status(http::StatusCode::INTERNAL_SERVER_ERROR)
                    .body("Internal server error during response serialization.")
                    .into_response(),
            }
        }
        Err(e) => e.as_response(),
    }
}
