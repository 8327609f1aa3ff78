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

use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use native_db::Database;

use crate::modules::{
    access::AccessService,
    account::{hierarchy::HierarchyService, lifecycle::AccountLifecycle, AccountStore},
    context::ContextService,
    membership::MembershipStore,
    settings::cli::Settings,
    token::TokenService,
    users::{service::UserService, UserStore},
};

/// All stores and services, wired once at startup and shared behind an `Arc`.
/// Every component receives its dependencies here; nothing reaches for
/// process-wide state.
pub struct AppState {
    pub accounts: AccountStore,
    pub memberships: MembershipStore,
    pub access: AccessService,
    pub hierarchy: HierarchyService,
    pub lifecycle: AccountLifecycle,
    pub context: ContextService,
    pub users: UserStore,
    pub user_service: UserService,
    pub tokens: TokenService,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(meta_db: Arc<Database<'static>>, settings: &Settings) -> AppState {
        let deadline = Duration::from_millis(settings.magpie_store_timeout_ms);
        let hydrate_concurrency = settings
            .magpie_hydrate_concurrency
            .map(usize::from)
            .unwrap_or_else(|| num_cpus::get().clamp(2, 8));
        Self::assemble(
            meta_db,
            deadline,
            hydrate_concurrency,
            settings.magpie_webui_token_expiration_hours,
        )
    }

    fn assemble(
        meta_db: Arc<Database<'static>>,
        deadline: Duration,
        hydrate_concurrency: usize,
        webui_token_ttl_hours: u64,
    ) -> AppState {
        let accounts = AccountStore::new(meta_db.clone(), deadline);
        let memberships = MembershipStore::new(meta_db.clone(), deadline);
        let access = AccessService::new(memberships.clone());
        let hierarchy = HierarchyService::new(accounts.clone());
        let lifecycle = AccountLifecycle::new(
            meta_db.clone(),
            accounts.clone(),
            memberships.clone(),
            access.clone(),
            deadline,
        );
        let context = ContextService::new(
            accounts.clone(),
            memberships.clone(),
            access.clone(),
            hydrate_concurrency,
        );
        let users = UserStore::new(meta_db.clone(), deadline);
        let tokens = TokenService::new(meta_db, users.clone(), deadline, webui_token_ttl_hours);
        let user_service = UserService::new(users.clone(), tokens.clone());
        AppState {
            accounts,
            memberships,
            access,
            hierarchy,
            lifecycle,
            context,
            users,
            user_service,
            tokens,
            started_at: Instant::now(),
        }
    }

    #[cfg(test)]
    pub fn for_tests(meta_db: Arc<Database<'static>>) -> AppState {
        Self::assemble(meta_db, Duration::from_secs(5), 4, 72)
    }
}
