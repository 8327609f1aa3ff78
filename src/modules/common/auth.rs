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

use crate::modules::{error::code::ErrorCode, state::AppState, users::User};
use poem::{
    web::{
        headers::{authorization::Bearer, Authorization, HeaderMapExt},
        RealIp,
    },
    Endpoint, FromRequest, Middleware, Request, RequestBody, Result,
};
use serde::Deserialize;
use std::{net::IpAddr, sync::Arc};

use super::create_api_error_response;

/// Token gate in front of the versioned API. Every request must carry a
/// resolvable access token; the authenticated user is attached to the
/// request as a [`ClientContext`] for handlers to extract.
pub struct ApiGuard {
    state: Arc<AppState>,
}

impl ApiGuard {
    pub fn new(state: Arc<AppState>) -> Self {
        ApiGuard { state }
    }
}

pub struct ApiGuardEndpoint<E> {
    ep: E,
    state: Arc<AppState>,
}

impl<E: Endpoint> Middleware<E> for ApiGuard {
    type Output = ApiGuardEndpoint<E>;

    fn transform(&self, ep: E) -> Self::Output {
        ApiGuardEndpoint {
            ep,
            state: self.state.clone(),
        }
    }
}

#[derive(Deserialize)]
struct Param {
    access_token: String,
}

impl<E: Endpoint> Endpoint for ApiGuardEndpoint<E> {
    type Output = E::Output;

    async fn call(&self, mut req: Request) -> Result<Self::Output> {
        let context = authorize_access(&self.state, &req).await?;
        req.set_data(Arc::new(context));
        self.ep.call(req).await
    }
}

#[derive(Clone, Debug)]
pub struct ClientContext {
    pub ip_addr: Option<IpAddr>,
    pub user: User,
}

impl<'a> FromRequest<'a> for ClientContext {
    async fn from_request(req: &'a Request, _body: &mut RequestBody) -> Result<Self> {
        let context = req.data::<Arc<ClientContext>>().ok_or_else(|| {
            create_api_error_response("Valid access token not found", ErrorCode::PermissionDenied)
        })?;
        Ok(context.as_ref().clone())
    }
}

pub async fn authorize_access(state: &AppState, req: &Request) -> Result<ClientContext> {
    let ip_addr = RealIp::from_request_without_body(req)
        .await
        .map_err(|_| {
            create_api_error_response(
                "Failed to parse client IP address",
                ErrorCode::InvalidParameter,
            )
        })?
        .0
        .ok_or_else(|| {
            create_api_error_response(
                "Failed to parse client IP address",
                ErrorCode::InvalidParameter,
            )
        })?;
    // Accept the token from the Bearer header or from an access_token query param.
    let bearer = req
        .headers()
        .typed_get::<Authorization<Bearer>>()
        .map(|auth| auth.0.token().to_string())
        .or_else(|| req.params::<Param>().ok().map(|param| param.access_token));

    let token = bearer.ok_or_else(|| {
        create_api_error_response("Valid access token not found", ErrorCode::PermissionDenied)
    })?;

    let user = state
        .tokens
        .resolve_user_from_token(&token)
        .await
        .map_err(|e| {
            create_api_error_response(&format!("{:#?}", e), ErrorCode::PermissionDenied)
        })?;

    Ok(ClientContext {
        ip_addr: Some(ip_addr),
        user,
    })
}
