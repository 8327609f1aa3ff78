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

use crate::modules::account::view::AccountResp;
use crate::modules::common::auth::ClientContext;
use crate::modules::context::{AuthContext, SwitchContextRequest};
use crate::modules::rest::api::ApiTags;
use crate::modules::rest::ApiResult;
use crate::modules::state::AppState;
use poem_openapi::payload::Json;
use poem_openapi::OpenApi;

pub struct ContextApi {
    state: Arc<AppState>,
}

impl ContextApi {
    pub fn new(state: Arc<AppState>) -> Self {
        ContextApi { state }
    }
}

#[OpenApi(prefix_path = "/api/v1", tag = "ApiTags::Context")]
impl ContextApi {
    /// List every account the calling user is linked to
    #[oai(
        path = "/my-accounts",
        method = "get",
        operation_id = "list_my_accounts"
    )]
    async fn list_my_accounts(&self, context: ClientContext) -> ApiResult<Json<Vec<AccountResp>>> {
        let accounts = self
            .state
            .context
            .list_user_accounts(context.user.id)
            .await?;
        Ok(Json(
            accounts.into_iter().map(AccountResp::from_model).collect(),
        ))
    }

    /// Switch the calling user onto another of their accounts
    ///
    /// Returns the assembled context for the target account, including the
    /// caller's role and permissions on it and the full account switcher list.
    #[oai(
        path = "/context/switch",
        method = "post",
        operation_id = "switch_context"
    )]
    async fn switch_context(
        &self,
        /// Context switch request payload
        payload: Json<SwitchContextRequest>,
        context: ClientContext,
    ) -> ApiResult<Json<AuthContext>> {
        let auth_context = self
            .state
            .context
            .switch_context(context.user.id, payload.0.account_id)
            .await?;
        Ok(Json(auth_context))
    }
}
