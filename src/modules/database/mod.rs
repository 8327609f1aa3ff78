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
use crate::modules::error::code::ErrorCode;
use crate::modules::error::{MagpieError, MagpieResult};
use crate::modules::membership::UserAccount;
use crate::modules::token::AccessTokenModel;
use crate::modules::users::User;
use crate::raise_error;
use db_type::{KeyOptions, ToKeyDefinition};
use itertools::Itertools;
use native_db::*;
use std::future::Future;
use std::sync::{Arc, LazyLock};
use std::time::Duration;
use transaction::RwTransaction;

pub mod manager;

pub static META_MODELS: LazyLock<Models> = LazyLock::new(|| {
    let mut adapter = ModelsAdapter::new();
    adapter.register_metadata_models();
    adapter.models
});

pub struct ModelsAdapter {
    pub models: Models,
}

impl ModelsAdapter {
    pub fn new() -> Self {
        ModelsAdapter {
            models: Models::new(),
        }
    }

    pub fn register_model<T: ToInput>(&mut self) {
        self.models.define::<T>().expect("failed to define model");
    }

    // Model ids are part of the on-disk format and must never be reused,
    // even for models that get retired.
    pub fn register_metadata_models(&mut self) {
        self.register_model::<Account>();
        self.register_model::<UserAccount>();
        self.register_model::<User>();
        self.register_model::<AccessTokenModel>();
    }
}

fn internal_error(e: impl std::fmt::Debug) -> MagpieError {
    raise_error!(format!("{:#?}", e), ErrorCode::InternalError)
}

/// Bounds a store operation with a deadline.
///
/// Every store call made on behalf of a request goes through this wrapper so
/// a wedged storage layer surfaces as a `StorageTimeout` instead of hanging
/// the request indefinitely.
pub async fn with_deadline<T>(
    deadline: Duration,
    operation: impl Future<Output = MagpieResult<T>>,
) -> MagpieResult<T> {
    match tokio::time::timeout(deadline, operation).await {
        Ok(result) => result,
        Err(_) => Err(raise_error!(
            "Metadata store operation exceeded its deadline.".into(),
            ErrorCode::StorageTimeout
        )),
    }
}

pub async fn insert_impl<T: ToInput + Clone + Send + 'static>(
    database: &Arc<Database<'static>>,
    item: T,
) -> MagpieResult<()> {
    let db = database.clone();
    tokio::task::spawn_blocking(move || {
        let rw_transaction = db.rw_transaction().map_err(internal_error)?;
        rw_transaction.insert(item).map_err(internal_error)?;
        rw_transaction.commit().map_err(internal_error)?;
        Ok(())
    })
    .await
    .map_err(internal_error)?
}

pub async fn update_impl<T: ToInput + Clone + std::fmt::Debug + Send + 'static>(
    database: &Arc<Database<'static>>,
    current: impl FnOnce(&RwTransaction) -> MagpieResult<T> + Send + 'static,
    updated: impl FnOnce(&T) -> MagpieResult<T> + Send + 'static,
) -> MagpieResult<T> {
    let db = database.clone();
    tokio::task::spawn_blocking(move || {
        let rw = db.rw_transaction().map_err(internal_error)?;
        let current_item = current(&rw)?;
        let updated_item = updated(&current_item)?;
        rw.update(current_item, updated_item.clone())
            .map_err(internal_error)?;
        rw.commit().map_err(internal_error)?;
        Ok(updated_item)
    })
    .await
    .map_err(internal_error)?
}

pub async fn async_find_impl<T: ToInput + Clone + Send + 'static>(
    database: &Arc<Database<'static>>,
    key: impl ToKey + Send + 'static,
) -> MagpieResult<Option<T>> {
    let db = database.clone();
    tokio::task::spawn_blocking(move || {
        let r_transaction = db.r_transaction().map_err(internal_error)?;
        let entity: Option<T> = r_transaction.get().primary(key).map_err(internal_error)?;
        Ok(entity)
    })
    .await
    .map_err(internal_error)?
}

pub async fn secondary_find_impl<T: ToInput + Clone + Send + 'static>(
    database: &Arc<Database<'static>>,
    key_def: impl ToKeyDefinition<KeyOptions> + Send + 'static,
    key: impl ToKey + Send + 'static,
) -> MagpieResult<Option<T>> {
    let db = database.clone();
    tokio::task::spawn_blocking(move || {
        let r_transaction = db.r_transaction().map_err(internal_error)?;
        let entity: Option<T> = r_transaction
            .get()
            .secondary(key_def, key)
            .map_err(internal_error)?;
        Ok(entity)
    })
    .await
    .map_err(internal_error)?
}

/// Range scan over a secondary key, returning every record whose key starts
/// with `start_with`. Keys are stored in a B-tree, so this touches only the
/// matching key range rather than the whole table.
pub async fn filter_by_secondary_key_impl<T: ToInput + Clone + Send + 'static>(
    database: &Arc<Database<'static>>,
    key_def: impl ToKeyDefinition<KeyOptions> + Send + 'static,
    start_with: impl ToKey + Send + 'static,
) -> MagpieResult<Vec<T>> {
    let db = database.clone();
    tokio::task::spawn_blocking(move || {
        let r_transaction = db.r_transaction().map_err(internal_error)?;
        let entities: Vec<T> = r_transaction
            .scan()
            .secondary(key_def)
            .map_err(internal_error)?
            .start_with(start_with)
            .map_err(internal_error)?
            .try_collect()
            .map_err(internal_error)?;
        Ok(entities)
    })
    .await
    .map_err(internal_error)?
}

/// Counts records in a secondary key range without materializing them.
pub async fn count_by_secondary_key_impl<T: ToInput + Clone + Send + 'static>(
    database: &Arc<Database<'static>>,
    key_def: impl ToKeyDefinition<KeyOptions> + Send + 'static,
    start_with: impl ToKey + Send + 'static,
) -> MagpieResult<usize> {
    let db = database.clone();
    tokio::task::spawn_blocking(move || {
        let r_transaction = db.r_transaction().map_err(internal_error)?;
        let mut count = 0usize;
        for entity in r_transaction
            .scan()
            .secondary::<T>(key_def)
            .map_err(internal_error)?
            .start_with(start_with)
            .map_err(internal_error)?
        {
            entity.map_err(internal_error)?;
            count += 1;
        }
        Ok(count)
    })
    .await
    .map_err(internal_error)?
}

pub async fn list_all_impl<T: ToInput + Clone + Send + 'static>(
    database: &Arc<Database<'static>>,
) -> MagpieResult<Vec<T>> {
    let db = database.clone();
    tokio::task::spawn_blocking(move || {
        let r_transaction = db.r_transaction().map_err(internal_error)?;
        let entities: Vec<T> = r_transaction
            .scan()
            .primary()
            .map_err(internal_error)?
            .all()
            .map_err(internal_error)?
            .try_collect()
            .map_err(internal_error)?;
        Ok(entities)
    })
    .await
    .map_err(internal_error)?
}

pub async fn delete_impl<T: ToInput + Clone + Send + 'static>(
    database: &Arc<Database<'static>>,
    delete: impl FnOnce(&RwTransaction) -> MagpieResult<T> + Send + 'static,
) -> MagpieResult<()> {
    let db = database.clone();
    tokio::task::spawn_blocking(move || {
        let rw_transaction = db.rw_transaction().map_err(internal_error)?;
        let to_delete = delete(&rw_transaction)?;
        rw_transaction
            .remove::<T>(to_delete)
            .map_err(internal_error)?;
        rw_transaction.commit().map_err(internal_error)?;
        Ok(())
    })
    .await
    .map_err(internal_error)?
}

/// Runs `f` inside a single serialized read-write transaction.
///
/// Either every write made by the closure is committed or none of them are;
/// returning an error from the closure aborts the transaction.
pub async fn with_transaction<R: Send + 'static>(
    database: &Arc<Database<'static>>,
    f: impl FnOnce(&RwTransaction) -> MagpieResult<R> + Send + 'static,
) -> MagpieResult<R> {
    let db: Arc<Database<'_>> = database.clone();
    tokio::task::spawn_blocking(move || {
        let rw_transaction = db.rw_transaction().map_err(internal_error)?;
        let result = f(&rw_transaction)?;
        rw_transaction.commit().map_err(internal_error)?;
        Ok(result)
    })
    .await
    .map_err(internal_error)?
}
