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

use std::path::Path;

use tracing_appender::{
    non_blocking::WorkerGuard,
    rolling::{RollingFileAppender, Rotation},
};
use tracing_subscriber::EnvFilter;

use crate::modules::settings::cli::Settings;

/// Installs the global tracing subscriber.
///
/// Returns the non-blocking writer guard when logging to a file; the guard
/// must stay alive for the lifetime of the process or buffered log lines
/// are lost on shutdown.
pub fn initialize_logging(settings: &Settings) -> Option<WorkerGuard> {
    let env_filter =
        EnvFilter::try_new(&settings.magpie_log_level).unwrap_or_else(|_| EnvFilter::new("info"));

    if settings.magpie_log_to_file {
        let file_appender = RollingFileAppender::builder()
            .rotation(Rotation::DAILY)
            .filename_prefix("magpie")
            .filename_suffix("log")
            .max_log_files(settings.magpie_max_server_log_files)
            .build(Path::new(&settings.magpie_root_dir).join("logs"))
            .expect("failed to initialize the rolling log file appender");
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
        let builder = tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_ansi(false)
            .with_writer(non_blocking);
        if settings.magpie_json_logs {
            builder.json().init();
        } else {
            builder.init();
        }
        Some(guard)
    } else {
        let builder = tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_ansi(settings.magpie_ansi_logs);
        if settings.magpie_json_logs {
            builder.json().init();
        } else {
            builder.init();
        }
        None
    }
}
