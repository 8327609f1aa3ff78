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

use crate::modules::error::code::ErrorCode;
use poem::{Endpoint, Middleware, Request, Result};
use std::time::Duration;

use super::create_api_error_response;

/// Clients may shorten or extend the per-request deadline with this header.
/// The value is in seconds and is capped at [`MAX_TIMEOUT_SECS`].
pub const TIMEOUT_HEADER: &str = "X-Magpie-Timeout";

const DEFAULT_TIMEOUT_SECS: u64 = 30;
const MAX_TIMEOUT_SECS: u64 = 120;

pub struct Timeout;

pub struct TimeoutEndpoint<E> {
    ep: E,
}

impl<E: Endpoint> Middleware<E> for Timeout {
    type Output = TimeoutEndpoint<E>;

    fn transform(&self, ep: E) -> Self::Output {
        TimeoutEndpoint { ep }
    }
}

impl<E: Endpoint> Endpoint for TimeoutEndpoint<E> {
    type Output = E::Output;

    async fn call(&self, req: Request) -> Result<Self::Output> {
        let requested = req
            .headers()
            .get(TIMEOUT_HEADER)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.trim().parse::<u64>().ok());
        let secs = requested
            .unwrap_or(DEFAULT_TIMEOUT_SECS)
            .clamp(1, MAX_TIMEOUT_SECS);
        match tokio::time::timeout(Duration::from_secs(secs), self.ep.call(req)).await {
            Ok(result) => result,
            Err(_) => Err(create_api_error_response(
                &format!("The request did not complete within {}s.", secs),
                ErrorCode::RequestTimeout,
            )),
        }
    }
}
