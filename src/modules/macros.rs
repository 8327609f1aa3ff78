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

/// Current UTC time in milliseconds since the Unix epoch.
#[macro_export]
macro_rules! utc_now {
    () => {
        chrono::Utc::now().timestamp_millis()
    };
}

/// Builds a `MagpieError::Generic` carrying the callsite location.
#[macro_export]
macro_rules! raise_error {
    ($message:expr, $code:expr) => {
        $crate::modules::error::MagpieError::Generic {
            message: $message,
            location: snafu::location!(),
            code: $code,
        }
    };
}

/// Generates a random identifier with the given number of significant bits.
#[macro_export]
macro_rules! id {
    ($bits:expr) => {
        $crate::modules::utils::random_id($bits)
    };
}

/// Generates a random alphanumeric secret of the given length.
#[macro_export]
macro_rules! generate_token {
    ($length:expr) => {
        $crate::modules::utils::generate_token($length)
    };
}

#[macro_export]
macro_rules! magpie_version {
    () => {
        env!("CARGO_PKG_VERSION")
    };
}
