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

use crate::modules::error::{code::ErrorCode, ApiError};
use poem::{Body, Response};
use tracing::error;

/// Catch-all for errors that escaped the typed API responses, e.g. routing
/// failures or panics surfaced by middleware. Normalizes them into the same
/// JSON error body the API produces everywhere else.
pub async fn error_handler(err: poem::Error) -> Response {
    let status = err.status();
    error!("Unhandled HTTP error ({}): {}", status, err);
    let api_error = ApiError::new_with_error_code(&err, ErrorCode::UnhandledPoemError as u32);
    let body = Body::from_json(serde_json::json!({
        "code": api_error.code,
        "message": api_error.message,
    }))
    .unwrap_or_else(|_| Body::from_string(api_error.to_string()));
    Response::builder()
        .status(status)
        .content_type("application/json")
        .body(body)
}
