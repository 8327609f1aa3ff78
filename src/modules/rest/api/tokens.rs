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
use crate::modules::token::{AccessTokenCreateRequest, AccessTokenModel};
use poem_openapi::param::Path;
use poem_openapi::payload::Json;
use poem_openapi::OpenApi;

pub struct TokensApi {
    state: Arc<AppState>,
}

impl TokensApi {
    pub fn new(state: Arc<AppState>) -> Self {
        TokensApi { state }
    }
}

#[OpenApi(prefix_path = "/api/v1", tag = "ApiTags::Tokens")]
impl TokensApi {
    /// Create a new API access token for the calling user
    ///
    /// Returns the token string to present as a Bearer credential.
    #[oai(
        path = "/access-tokens",
        method = "post",
        operation_id = "create_access_token"
    )]
    async fn create_access_token(
        &self,
        /// Token creation request payload
        payload: Json<AccessTokenCreateRequest>,
        context: ClientContext,
    ) -> ApiResult<Json<String>> {
        let token = self
            .state
            .tokens
            .create_api_token(context.user.id, payload.0)
            .await?;
        Ok(Json(token))
    }

    /// List the calling user's API access tokens
    #[oai(
        path = "/access-tokens",
        method = "get",
        operation_id = "list_access_tokens"
    )]
    async fn list_access_tokens(
        &self,
        context: ClientContext,
    ) -> ApiResult<Json<Vec<AccessTokenModel>>> {
        let tokens = self.state.tokens.get_user_api_tokens(context.user.id).await?;
        Ok(Json(tokens))
    }

    /// Delete one of the calling user's access tokens
    #[oai(
        path = "/access-tokens/:token",
        method = "delete",
        operation_id = "remove_access_token"
    )]
    async fn remove_access_token(
        &self,
        /// The token value to delete
        token: Path<String>,
        context: ClientContext,
    ) -> ApiResult<()> {
        Ok(self
            .state
            .tokens
            .delete_user_token(context.user.id, &token.0)
            .await?)
    }
}
