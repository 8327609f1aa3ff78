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

use crate::modules::error::{code::ErrorCode, MagpieResult};
use crate::modules::settings::cli::Settings;
use crate::raise_error;
use poem::listener::{RustlsCertificate, RustlsConfig};

/// Builds the TLS config for the REST listener from the configured PEM
/// certificate chain and private key. Both paths must be set when HTTPS
/// is enabled.
pub fn rustls_config(settings: &Settings) -> MagpieResult<RustlsConfig> {
    let cert_path = settings.magpie_tls_cert_path.as_deref().ok_or_else(|| {
        raise_error!(
            "HTTPS is enabled but magpie_tls_cert_path is not set.".into(),
            ErrorCode::MissingConfiguration
        )
    })?;
    let key_path = settings.magpie_tls_key_path.as_deref().ok_or_else(|| {
        raise_error!(
            "HTTPS is enabled but magpie_tls_key_path is not set.".into(),
            ErrorCode::MissingConfiguration
        )
    })?;
    let cert = std::fs::read(cert_path)?;
    let key = std::fs::read(key_path)?;
    Ok(RustlsConfig::new().fallback(RustlsCertificate::new().cert(cert).key(key)))
}
