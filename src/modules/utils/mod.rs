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

use rand::{distr::Alphanumeric, Rng};

pub mod password;
pub mod shutdown;

/// Random non-zero identifier truncated to `bits` significant bits.
///
/// Identifiers are embedded as decimal segments in account paths, so smaller
/// widths keep paths short when a deployment does not need the full range.
pub fn random_id(bits: u32) -> u64 {
    let bits = bits.clamp(1, 64);
    let mut rng = rand::rng();
    loop {
        let value = rng.random::<u64>() >> (64 - bits);
        if value != 0 {
            return value;
        }
    }
}

/// Random alphanumeric secret of the given length.
pub fn generate_token(length: usize) -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(length)
        .map(char::from)
        .collect()
}
