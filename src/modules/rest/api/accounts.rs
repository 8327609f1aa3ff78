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

use crate::modules::account::payload::{
    AccountUpdateRequest, CreateRootAccountRequest, CreateSubAccountRequest, InviteMemberRequest,
};
use crate::modules::account::view::{AccountResp, MembershipResp};
use crate::modules::common::auth::ClientContext;
use crate::modules::error::code::ErrorCode;
use crate::modules::rest::api::ApiTags;
use crate::modules::rest::ApiResult;
use crate::modules::state::AppState;
use crate::raise_error;
use poem_openapi::param::Path;
use poem_openapi::payload::Json;
use poem_openapi::OpenApi;

pub struct AccountsApi {
    state: Arc<AppState>,
}

impl AccountsApi {
    pub fn new(state: Arc<AppState>) -> Self {
        AccountsApi { state }
    }
}

#[OpenApi(prefix_path = "/api/v1", tag = "ApiTags::Accounts")]
impl AccountsApi {
    /// Create a new root account owned by the calling user
    #[oai(
        path = "/accounts",
        method = "post",
        operation_id = "create_root_account"
    )]
    async fn create_root_account(
        &self,
        /// Account creation request payload
        payload: Json<CreateRootAccountRequest>,
        context: ClientContext,
    ) -> ApiResult<Json<AccountResp>> {
        let account = self
            .state
            .lifecycle
            .create_root_account(context.user.id, payload.0)
            .await?;
        Ok(Json(AccountResp::from_model(account)))
    }

    /// Create a sub-account under an existing account
    #[oai(
        path = "/accounts/:account_id/sub-accounts",
        method = "post",
        operation_id = "create_sub_account"
    )]
    async fn create_sub_account(
        &self,
        /// The parent account ID
        account_id: Path<u64>,
        /// Sub-account creation request payload
        payload: Json<CreateSubAccountRequest>,
        context: ClientContext,
    ) -> ApiResult<Json<AccountResp>> {
        let account = self
            .state
            .lifecycle
            .create_sub_account(account_id.0, context.user.id, payload.0)
            .await?;
        Ok(Json(AccountResp::from_model(account)))
    }

    /// Get account details by account ID
    #[oai(
        path = "/accounts/:account_id",
        method = "get",
        operation_id = "get_account"
    )]
    async fn get_account(
        &self,
        /// The account ID to retrieve
        account_id: Path<u64>,
        context: ClientContext,
    ) -> ApiResult<Json<AccountResp>> {
        let account_id = account_id.0;
        self.state
            .access
            .require_active(context.user.id, account_id)
            .await?;
        let account = self.state.accounts.get(account_id).await?;
        Ok(Json(AccountResp::from_model(account)))
    }

    /// Update an existing account
    #[oai(
        path = "/accounts/:account_id",
        method = "post",
        operation_id = "update_account"
    )]
    async fn update_account(
        &self,
        /// The account ID to update
        account_id: Path<u64>,
        /// Account update request payload
        payload: Json<AccountUpdateRequest>,
        context: ClientContext,
    ) -> ApiResult<Json<AccountResp>> {
        let account = self
            .state
            .lifecycle
            .update_account(account_id.0, context.user.id, payload.0)
            .await?;
        Ok(Json(AccountResp::from_model(account)))
    }

    /// List the subtree rooted at an account, the account itself first
    #[oai(
        path = "/accounts/:account_id/hierarchy",
        method = "get",
        operation_id = "list_account_hierarchy"
    )]
    async fn list_account_hierarchy(
        &self,
        /// The account ID whose subtree to list
        account_id: Path<u64>,
        context: ClientContext,
    ) -> ApiResult<Json<Vec<AccountResp>>> {
        let account_id = account_id.0;
        let membership = self
            .state
            .access
            .require_active(context.user.id, account_id)
            .await?;
        if !membership.permissions.can_view_all_data {
            return Err(raise_error!(
                "You are not allowed to view the account hierarchy.".into(),
                ErrorCode::AccessDenied
            )
            .into());
        }
        let accounts = self.state.hierarchy.list_descendants(account_id).await?;
        Ok(Json(
            accounts.into_iter().map(AccountResp::from_model).collect(),
        ))
    }

    /// List the ancestors of an account, root first
    #[oai(
        path = "/accounts/:account_id/ancestors",
        method = "get",
        operation_id = "list_account_ancestors"
    )]
    async fn list_account_ancestors(
        &self,
        /// The account ID whose ancestor chain to list
        account_id: Path<u64>,
        context: ClientContext,
    ) -> ApiResult<Json<Vec<AccountResp>>> {
        let account_id = account_id.0;
        let membership = self
            .state
            .access
            .require_active(context.user.id, account_id)
            .await?;
        if !membership.permissions.can_view_all_data {
            return Err(raise_error!(
                "You are not allowed to view the account hierarchy.".into(),
                ErrorCode::AccessDenied
            )
            .into());
        }
        let accounts = self.state.hierarchy.list_ancestors(account_id).await?;
        Ok(Json(
            accounts.into_iter().map(AccountResp::from_model).collect(),
        ))
    }

    /// Invite a user to an account as a pending member
    #[oai(
        path = "/accounts/:account_id/invitations",
        method = "post",
        operation_id = "invite_member"
    )]
    async fn invite_member(
        &self,
        /// The account ID to invite the user to
        account_id: Path<u64>,
        /// Invitation request payload
        payload: Json<InviteMemberRequest>,
        context: ClientContext,
    ) -> ApiResult<Json<MembershipResp>> {
        let link = self
            .state
            .lifecycle
            .invite_member(account_id.0, context.user.id, payload.0)
            .await?;
        Ok(Json(MembershipResp::from_model(link)))
    }

    /// Accept a pending invitation to an account
    #[oai(
        path = "/accounts/:account_id/invitations/accept",
        method = "post",
        operation_id = "accept_invitation"
    )]
    async fn accept_invitation(
        &self,
        /// The account ID of the pending invitation
        account_id: Path<u64>,
        context: ClientContext,
    ) -> ApiResult<Json<MembershipResp>> {
        let link = self
            .state
            .lifecycle
            .accept_invitation(account_id.0, context.user.id)
            .await?;
        Ok(Json(MembershipResp::from_model(link)))
    }
}
