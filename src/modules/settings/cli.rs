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

use clap::{builder::ValueParser, Parser};
use std::{collections::HashSet, path::PathBuf};

/// Runtime configuration, resolved once at startup from CLI flags and
/// environment variables, then passed by reference to whatever needs it.
#[derive(Debug, Parser)]
#[clap(
    name = "magpie",
    about = "Multi-tenant account and access control service for the Magpie backup platform",
    version = env!("CARGO_PKG_VERSION")
)]
pub struct Settings {
    /// magpie log level (default: "info")
    #[clap(
        long,
        default_value = "info",
        env,
        help = "Set the log level for magpie"
    )]
    pub magpie_log_level: String,

    /// magpie HTTP port (default: 15810)
    #[clap(
        long,
        default_value = "15810",
        env,
        help = "Set the HTTP port for magpie"
    )]
    pub magpie_http_port: i32,

    /// The IP address that the node binds to, in IPv4 format (e.g., 192.168.1.1).
    #[clap(
        long,
        env,
        default_value = "0.0.0.0",
        help = "The IP address that the node binds to, in IPv4 format (e.g., 192.168.1.1).",
        value_parser = ValueParser::new(|s: &str| {
            if s.parse::<std::net::Ipv4Addr>().is_err() {
                return Err("The bind IP address must be a valid IPv4 address.".to_string());
            }
            Ok(s.to_string())
        })
    )]
    pub magpie_bind_ip: Option<String>,

    /// CORS allowed origins (default: "*")
    #[clap(
        long,
        default_value = "http://localhost:5173, http://localhost:15810, *",
        env,
        help = "Set the allowed CORS origins (comma-separated list, e.g., \"https://example.com, https://another.com\")",
        value_parser = ValueParser::new(|s: &str| -> Result<HashSet<String>, String> {
            let set: HashSet<String> = s.split(',')
                .map(|origin| origin.trim().to_string())
                .filter(|origin| !origin.is_empty())
                .collect();
            Ok(set)
        })
    )]
    pub magpie_cors_origins: HashSet<String>,

    /// CORS max age in seconds (default: 86400)
    #[clap(
        long,
        default_value = "86400",
        env,
        help = "Set the CORS max age in seconds"
    )]
    pub magpie_cors_max_age: i32,

    /// Enable ANSI logs (default: true)
    #[clap(long, default_value = "true", env, help = "Enable ANSI formatted logs")]
    pub magpie_ansi_logs: bool,

    /// Enable log file output (default: false)
    /// If false, logs will be printed to stdout
    #[clap(
        long,
        default_value = "false",
        env,
        help = "Enable log file output (otherwise logs go to stdout)"
    )]
    pub magpie_log_to_file: bool,

    /// Enable JSON logs (default: false)
    #[clap(
        long,
        default_value = "false",
        env,
        help = "Enable JSON formatted logs"
    )]
    pub magpie_json_logs: bool,

    /// Maximum number of log files (default: 5)
    #[clap(
        long,
        default_value = "5",
        env,
        help = "Set the maximum number of server log files"
    )]
    pub magpie_max_server_log_files: usize,

    #[clap(
        long,
        env,
        help = "Set the data directory for the magpie metadata database",
        value_parser = ValueParser::new(|s: &str| {
            let path = PathBuf::from(s);
            if !path.is_absolute() {
                return Err("Path must be an absolute directory path".to_string());
            }
            if !path.exists() {
                return Err(format!("Path {:?} does not exist", path));
            }
            if !path.is_dir() {
                return Err(format!("Path {:?} is not a directory", path));
            }
            Ok(s.to_string())
        })
    )]
    pub magpie_root_dir: String,

    #[clap(
        long,
        env,
        default_value = "134217728",
        help = "Set the cache size for the magpie metadata database in bytes"
    )]
    pub magpie_metadata_cache_size: Option<usize>,

    /// Enables or disables HTTPS for REST API endpoints.
    ///
    /// When set to `true`, the REST API will use HTTPS with a valid SSL/TLS certificate for secure communication.
    /// If no valid certificate is configured or HTTPS cannot be established, the service will fail to start.
    /// When set to `false`, the REST API will use plain HTTP without encryption.
    #[clap(
        long,
        default_value = "false",
        env,
        help = "Enables or disables HTTPS for REST API endpoints."
    )]
    pub magpie_enable_rest_https: bool,

    #[clap(
        long,
        env,
        help = "Path to the PEM encoded TLS certificate chain, required when HTTPS is enabled"
    )]
    pub magpie_tls_cert_path: Option<String>,

    #[clap(
        long,
        env,
        help = "Path to the PEM encoded TLS private key, required when HTTPS is enabled"
    )]
    pub magpie_tls_key_path: Option<String>,

    #[clap(
        long,
        default_value = "true",
        env,
        help = "Enable compression for the open api server"
    )]
    pub magpie_http_compression_enabled: bool,

    /// Upper bound on how long a single metadata store operation may run
    /// before it is abandoned and reported as a storage timeout.
    #[clap(
        long,
        default_value = "5000",
        env,
        help = "Deadline in milliseconds for individual metadata store operations"
    )]
    pub magpie_store_timeout_ms: u64,

    #[clap(
        long,
        env,
        help = "Maximum number of account records hydrated concurrently when listing memberships (default: number of CPU cores, clamped to 2..=8)",
        value_parser = clap::value_parser!(u16).range(1..)
    )]
    pub magpie_hydrate_concurrency: Option<u16>,

    #[clap(
        long,
        default_value = "72",
        env,
        help = "Set the lifetime in hours of web session tokens issued at login"
    )]
    pub magpie_webui_token_expiration_hours: u64,
}
