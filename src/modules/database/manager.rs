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

use crate::modules::account::Account;
use crate::modules::database::META_MODELS;
use crate::modules::error::{code::ErrorCode, MagpieError, MagpieResult};
use crate::modules::membership::UserAccount;
use crate::modules::settings::cli::Settings;
use crate::modules::token::AccessTokenModel;
use crate::modules::users::User;
use crate::raise_error;
use native_db::{Builder, Database};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

const META_DB_FILE: &str = "magpie_meta.db";
const DEFAULT_CACHE_SIZE: usize = 134217728;
const MIN_CACHE_SIZE: usize = 67108864;

/// Owns the handle to the metadata database.
///
/// Constructed once at startup and handed to [`crate::modules::state::AppState`];
/// nothing else opens the underlying file.
pub struct DatabaseManager {
    meta_db: Arc<Database<'static>>,
}

impl DatabaseManager {
    pub fn open(settings: &Settings) -> MagpieResult<Self> {
        let path = Path::new(&settings.magpie_root_dir).join(META_DB_FILE);
        Self::open_at(path, settings.magpie_metadata_cache_size)
    }

    /// Opens (or creates) the metadata database at an explicit path.
    pub fn open_at(path: PathBuf, cache_size: Option<usize>) -> MagpieResult<Self> {
        info!("Initializing metadata database at: {:?}", &path);
        let mut database = Builder::new()
            .set_cache_size(cache_size.unwrap_or(DEFAULT_CACHE_SIZE).max(MIN_CACHE_SIZE))
            .create(&META_MODELS, path)
            .map_err(Self::handle_database_error)?;

        let rw = database
            .rw_transaction()
            .map_err(|e| raise_error!(format!("{:#?}", e), ErrorCode::InternalError))?;
        rw.migrate::<Account>()
            .map_err(|e| raise_error!(format!("{:#?}", e), ErrorCode::InternalError))?;
        rw.migrate::<UserAccount>()
            .map_err(|e| raise_error!(format!("{:#?}", e), ErrorCode::InternalError))?;
        rw.migrate::<User>()
            .map_err(|e| raise_error!(format!("{:#?}", e), ErrorCode::InternalError))?;
        rw.migrate::<AccessTokenModel>()
            .map_err(|e| raise_error!(format!("{:#?}", e), ErrorCode::InternalError))?;
        rw.commit()
            .map_err(|e| raise_error!(format!("{:#?}", e), ErrorCode::InternalError))?;

        database
            .compact()
            .map_err(|e| raise_error!(format!("{:#?}", e), ErrorCode::InternalError))?;
        Ok(DatabaseManager {
            meta_db: Arc::new(database),
        })
    }

    /// Get a reference to the metadata database
    pub fn meta_db(&self) -> &Arc<Database<'static>> {
        &self.meta_db
    }

    fn handle_database_error(error: native_db::db_type::Error) -> MagpieError {
        raise_error!(
            format!("Failed to create database: {:?}", error),
            ErrorCode::InternalError
        )
    }
}
