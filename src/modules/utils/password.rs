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

use base64::{engine::general_purpose, Engine as _};
use ring::pbkdf2::{self, derive};
use ring::rand::{SecureRandom, SystemRandom};
use std::num::NonZeroU32;

use crate::modules::error::code::ErrorCode;
use crate::modules::error::MagpieResult;
use crate::raise_error;

const SALT_LEN: usize = 16;
const CREDENTIAL_LEN: usize = 32;
const PBKDF2_ITERATIONS: u32 = 100_000;

/// Derives a PBKDF2-HMAC-SHA256 credential and returns `base64(salt || dk)`.
///
/// The salt is stored in front of the derived key so the whole hash is a
/// single opaque string.
pub fn hash_password(password: &str) -> MagpieResult<String> {
    let rng = SystemRandom::new();
    let mut salt = [0u8; SALT_LEN];
    rng.fill(&mut salt).map_err(|_| {
        raise_error!(
            "Failed to generate a password salt.".into(),
            ErrorCode::InternalError
        )
    })?;
    let mut credential = [0u8; CREDENTIAL_LEN];
    derive(
        pbkdf2::PBKDF2_HMAC_SHA256,
        NonZeroU32::new(PBKDF2_ITERATIONS).unwrap(),
        &salt,
        password.as_bytes(),
        &mut credential,
    );
    let mut result = Vec::with_capacity(SALT_LEN + CREDENTIAL_LEN);
    result.extend_from_slice(&salt);
    result.extend_from_slice(&credential);
    Ok(general_purpose::URL_SAFE.encode(&result))
}

/// Constant-time verification of a password against a stored hash.
pub fn verify_password(password: &str, stored: &str) -> bool {
    let Ok(decoded) = general_purpose::URL_SAFE.decode(stored) else {
        return false;
    };
    if decoded.len() != SALT_LEN + CREDENTIAL_LEN {
        return false;
    }
    let (salt, credential) = decoded.split_at(SALT_LEN);
    pbkdf2::verify(
        pbkdf2::PBKDF2_HMAC_SHA256,
        NonZeroU32::new(PBKDF2_ITERATIONS).unwrap(),
        salt,
        password.as_bytes(),
        credential,
    )
    .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("correct horse battery staple").unwrap();
        assert!(verify_password("correct horse battery staple", &hash));
        assert!(!verify_password("correct horse battery stable", &hash));
    }

    #[test]
    fn test_verify_rejects_garbage() {
        assert!(!verify_password("anything", "not-base64!!!"));
        assert!(!verify_password("anything", ""));
    }
}
