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

use poem_openapi::{OpenApiService, Tags};

use crate::magpie_version;
use crate::modules::state::AppState;

pub mod accounts;
pub mod context;
pub mod tokens;
pub mod users;

#[derive(Tags)]
pub enum ApiTags {
    /// Account hierarchy and lifecycle
    Accounts,
    /// Account switching for multi-account users
    Context,
    /// Access token management
    Tokens,
    /// User profile
    Users,
}

type ApiSet = (
    accounts::AccountsApi,
    context::ContextApi,
    tokens::TokensApi,
    users::UsersApi,
);

pub fn create_openapi_service(state: Arc<AppState>) -> OpenApiService<ApiSet, ()> {
    OpenApiService::new(
        (
            accounts::AccountsApi::new(state.clone()),
            context::ContextApi::new(state.clone()),
            tokens::TokensApi::new(state.clone()),
            users::UsersApi::new(state),
        ),
        "Magpie API",
        magpie_version!(),
    )
}
