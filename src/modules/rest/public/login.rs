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
use crate::modules::users::payload::LoginRequest;
use poem::{
    handler,
    web::{Data, Json},
    IntoResponse, Response,
};
use std::sync::Arc;
use tracing::error;

/// Login endpoint
///
/// Accepts a plain text password and returns a fresh web session token
/// on successful authentication. Bad credentials are reported inside the
/// result payload with a 200 status.
#[handler]
pub async fn login(state: Data<&Arc<AppState>>, payload: Json<LoginRequest>) -> Response {
    match state.user_service.authenticate(payload.0).await {
        Ok(result) => match serde_json::to_string(&result) {
            Ok(json_string) => Response::builder()
                .status(http::StatusCode::OK)
                .content_type("application/json")
                .body(json_string)
                .into_response(),
            Err(_) => Response::builder()
                .status(http::StatusCode::INTERNAL_SERVER_ERROR)
                .body("Internal server error during response serialization.")
                .into_response(),
        },
        Err(e) => {
            error!("Authentication failed with system error: {:?}", e);
            Response::builder()
                .status(http::StatusCode::INTERNAL_SERVER_ERROR)
                .body("Authentication system failed.".to_string())
                .into_response()
        }
    }
}
