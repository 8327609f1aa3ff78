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

use poem::http::StatusCode;
use poem_openapi::Enum;
use serde::{Deserialize, Serialize};

/// Stable numeric error codes returned to API clients.
///
/// The numeric value is part of the public contract; new codes are appended
/// within their range and existing values are never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Enum)]
#[repr(u32)]
pub enum ErrorCode {
    // Client-side errors (10000-10999)
    InvalidParameter = 10000,
    MissingConfiguration = 10020,
    RequestTimeout = 10080,

    // Authentication and authorization errors (20000-20999)
    PermissionDenied = 20000,
    AccessDenied = 20010,

    // Resource errors (30000-30999)
    ResourceNotFound = 30000,
    AlreadyExists = 30010,
    QuotaExceeded = 30040,

    // Internal system errors (70000-70999)
    InternalError = 70000,
    StorageTimeout = 70010,
    UnhandledPoemError = 70020,
    IoError = 70030,
}

impl ErrorCode {
    pub fn status(&self) -> StatusCode {
        match self {
            ErrorCode::InvalidParameter | ErrorCode::MissingConfiguration => {
                StatusCode::BAD_REQUEST
            }
            ErrorCode::RequestTimeout => StatusCode::REQUEST_TIMEOUT,
            ErrorCode::PermissionDenied => StatusCode::UNAUTHORIZED,
            ErrorCode::AccessDenied => StatusCode::FORBIDDEN,
            ErrorCode::ResourceNotFound => StatusCode::NOT_FOUND,
            ErrorCode::AlreadyExists | ErrorCode::QuotaExceeded => StatusCode::CONFLICT,
            ErrorCode::InternalError
            | ErrorCode::StorageTimeout
            | ErrorCode::UnhandledPoemError
            | ErrorCode::IoError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
