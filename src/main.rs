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

use clap::Parser;
use mimalloc::MiMalloc;
use modules::{
    database::manager::DatabaseManager, error::MagpieResult, logger, rest::start_http_server,
    settings::cli::Settings, state::AppState,
};
use std::sync::Arc;
use tracing::info;

mod modules;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

static LOGO: &str = r#"
                              _
 _ __ ___   __ _  __ _ _ __ (_) ___
| '_ ` _ \ / _` |/ _` | '_ \| |/ _ \
| | | | | | (_| | (_| | |_) | |  __/
|_| |_| |_|\__,_|\__, | .__/|_|\___|
                 |___/|_|
"#;

#[cfg(not(test))]
#[tokio::main]
async fn main() -> MagpieResult<()> {
    let settings = Arc::new(Settings::parse());
    let _guard = logger::initialize_logging(&settings);
    info!("{}", LOGO);
    info!("Starting magpie-server");
    info!("Version:  {}", magpie_version!());
    info!("Website:  https://magpie.dev");

    let state = match initialize(&settings) {
        Ok(state) => state,
        Err(error) => {
            eprintln!("{:?}", error);
            return Err(error);
        }
    };

    start_http_server(settings, state).await?;
    Ok(())
}

/// Opens the metadata database and wires up the shared application state.
fn initialize(settings: &Settings) -> MagpieResult<Arc<AppState>> {
    let manager = DatabaseManager::open(settings)?;
    Ok(Arc::new(AppState::new(manager.meta_db().clone(), settings)))
}
