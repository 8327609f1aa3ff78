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

use std::sync::Arc;

use crate::modules::common::auth::ClientContext;
use crate::modules::rest::api::ApiTags;
use crate::modules::rest::ApiResult;
use crate::modules::state::AppState;
use crate::modules::users::payload::ChangePasswordRequest;
use crate::modules::users::view::UserView;
use crate::modules::users::LoginResult;
use poem_openapi::payload::Json;
use poem_openapi::OpenApi;

pub struct UsersApi {
    state: Arc<AppState>,
}

impl UsersApi {
    pub fn new(state: Arc<AppState>) -> Self {
        UsersApi { state }
    }
}

#[OpenApi(prefix_path = "/api/v1", tag = "ApiTags::Users")]
impl UsersApi {
    /// Get the profile of the calling user
    #[oai(
        path = "/current-user",
        method = "get",
        operation_id = "get_current_user"
    )]
    async fn get_current_user(&self, context: ClientContext) -> ApiResult<Json<UserView>> {
        Ok(Json(UserView::from_model(context.user)))
    }

    /// Change the calling user's password
    ///
    /// On success every existing web session token is invalidated; the
    /// returned token replaces the one used for this request.
    #[oai(
        path = "/current-user/password",
        method = "post",
        operation_id = "change_password"
    )]
    async fn change_password(
        &self,
        /// Password change request payload
        payload: Json<ChangePasswordRequest>,
        context: ClientContext,
    ) -> ApiResult<Json<LoginResult>> {
        let token = self
            .state
            .user_service
            .change_password(context.user.id, payload.0)
            .await?;
        Ok(Json(LoginResult {
            success: true,
            error_message: None,
            access_token: Some(token),
        }))
    }
}
