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

use crate::modules::common::error::ErrorCapture;
use crate::modules::common::log::Tracing;
use crate::modules::common::tls::rustls_config;
use crate::modules::error::code::ErrorCode;
use crate::modules::error::handler::error_handler;
use crate::modules::error::MagpieResult;
use crate::modules::rest::public::login::login;
use crate::modules::rest::public::signup::signup;
use crate::modules::rest::public::status::get_status;
use crate::modules::state::AppState;
use crate::modules::{settings::cli::Settings, utils::shutdown::shutdown_signal};

use super::error::ApiErrorResponse;
use crate::modules::common::auth::ApiGuard;
use crate::modules::common::timeout::{Timeout, TIMEOUT_HEADER};
use crate::raise_error;
use api::create_openapi_service;
use http::Method;
use poem::listener::{Listener, TcpListener};
use poem::middleware::{CatchPanic, Compression};
use poem::{get, post};
use poem::{middleware::Cors, EndpointExt, Route, Server};
use std::sync::Arc;
use std::time::Duration;

pub mod api;
pub mod public;

pub type ApiResult<T, E = ApiErrorResponse> = std::result::Result<T, E>;

pub async fn start_http_server(settings: Arc<Settings>, state: Arc<AppState>) -> MagpieResult<()> {
    let listener = TcpListener::bind((
        settings.magpie_bind_ip.clone().unwrap_or("0.0.0.0".into()),
        settings.magpie_http_port as u16,
    ));

    let listener = if settings.magpie_enable_rest_https {
        listener.rustls(rustls_config(&settings)?).boxed()
    } else {
        listener.boxed()
    };

    let api_service = create_openapi_service(state.clone())
        .summary("Multi-tenant account and access control for the Magpie backup platform");

    let swagger = api_service.swagger_ui();
    let redoc = api_service.redoc();
    let scalar = api_service.scalar();
    let spec_json = api_service.spec_endpoint();
    let spec_yaml = api_service.spec_endpoint_yaml();
    let openapi_explorer = api_service.openapi_explorer();

    let open_api_route = Route::new()
        .nest_no_strip("/api/v1", api_service)
        .with(ApiGuard::new(state.clone()))
        .with(ErrorCapture)
        .with(Timeout)
        .with(Tracing);

    let cors_origins: Vec<String> = settings.magpie_cors_origins.iter().cloned().collect();

    let cors = Cors::new()
        .allow_origins_fn(move |origin| {
            tracing::debug!("CORS: Incoming Origin = {:?}", origin);
            tracing::debug!("CORS: Configured origins = {:?}", cors_origins);
            if cors_origins.is_empty() || cors_origins.iter().any(|o| o == "*") {
                return true;
            }
            cors_origins.iter().any(|o| o == origin)
        })
        .allow_credentials(true)
        .allow_methods(&[
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
            Method::HEAD,
            Method::PATCH,
        ])
        .allow_headers(vec!["Content-Type", "Authorization", TIMEOUT_HEADER])
        .expose_headers(vec!["Accept"])
        .max_age(settings.magpie_cors_max_age);

    let route = Route::new()
        .nest("/api-docs/swagger", swagger)
        .nest("/api-docs/redoc", redoc)
        .nest("/api-docs/explorer", openapi_explorer)
        .nest("/api-docs/scalar", scalar)
        .nest("/api-docs/spec.json", spec_json)
        .nest("/api-docs/spec.yaml", spec_yaml)
        .nest("/api/status", get(get_status).data(state.clone()))
        .nest("/api/login", post(login).data(state.clone()))
        .nest("/api/signup", post(signup).data(state.clone()))
        .nest_no_strip("/api/v1", open_api_route)
        .with(cors)
        .with_if(settings.magpie_http_compression_enabled, Compression::new())
        .with(CatchPanic::new());

    let server = Server::new(listener)
        .name("Magpie Service")
        .idle_timeout(Duration::from_secs(60))
        .run_with_graceful_shutdown(
            route.catch_all_error(error_handler),
            shutdown_signal(),
            Some(Duration::from_secs(5)),
        );
    println!(
        "Magpie Service is now running on port {}.",
        settings.magpie_http_port
    );
    server
        .await
        .map_err(|e| raise_error!(format!("{:#?}", e), ErrorCode::InternalError))
}
