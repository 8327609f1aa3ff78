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

use crate::magpie_version;
use crate::modules::state::AppState;
use poem::{
    handler,
    web::{Data, Json},
};
use serde::Serialize;
use std::sync::Arc;
use sysinfo::System;

#[derive(Serialize)]
pub struct ServerStatus {
    pub version: String,
    pub hostname: String,
    pub os: String,
    pub cpu_count: usize,
    pub total_memory_bytes: u64,
    pub used_memory_bytes: u64,
    pub uptime_seconds: u64,
}

/// Liveness endpoint with basic host information. Unauthenticated; exposes
/// nothing tenant-specific.
#[handler]
pub async fn get_status(state: Data<&Arc<AppState>>) -> Json<ServerStatus> {
    let mut sys = System::new();
    sys.refresh_memory();
    Json(ServerStatus {
        version: magpie_version!().to_string(),
        hostname: gethostname::gethostname()
            .into_string()
            .unwrap_or_else(|_| String::from("unknown")),
        os: System::long_os_version().unwrap_or_else(|| String::from("unknown")),
        cpu_count: num_cpus::get(),
        total_memory_bytes: sys.total_memory(),
        used_memory_bytes: sys.used_memory(),
        uptime_seconds: state.started_at.elapsed().as_secs(),
    })
}
