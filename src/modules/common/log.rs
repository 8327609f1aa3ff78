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

use poem::{Endpoint, Middleware, Request, Result};
use std::time::Instant;
use tracing::debug;

/// Request logging for the versioned API, one line per completed call.
pub struct Tracing;

pub struct TracingEndpoint<E> {
    ep: E,
}

impl<E: Endpoint> Middleware<E> for Tracing {
    type Output = TracingEndpoint<E>;

    fn transform(&self, ep: E) -> Self::Output {
        TracingEndpoint { ep }
    }
}

impl<E: Endpoint> Endpoint for TracingEndpoint<E> {
    type Output = E::Output;

    async fn call(&self, req: Request) -> Result<Self::Output> {
        let method = req.method().clone();
        let uri = req.uri().clone();
        let start = Instant::now();
        let result = self.ep.call(req).await;
        let elapsed = start.elapsed();
        match &result {
            Ok(_) => {
                debug!(%method, %uri, elapsed = ?elapsed, "request completed");
            }
            Err(err) => {
                debug!(%method, %uri, elapsed = ?elapsed, error = %err, "request failed");
            }
        }
        result
    }
}
