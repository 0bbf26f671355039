// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Shared application state.
//!
//! One [`AppState`] is built at startup and cloned into every handler. It
//! wires the store, the authenticator and the rate limiter together from a
//! single [`AppConfig`] snapshot.

use std::sync::Arc;

use crate::auth::{Authenticator, TokenCodec};
use crate::config::AppConfig;
use crate::ratelimit::RateLimiter;
use crate::storage::StashDb;

#[derive(Clone)]
pub struct AppState {
    db: Arc<StashDb>,
    authenticator: Arc<Authenticator>,
    rate_limiter: Arc<RateLimiter>,
    config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(config: AppConfig, db: StashDb) -> Self {
        let db = Arc::new(db);
        let tokens = TokenCodec::new(config.token_secret.as_bytes());
        let authenticator = Arc::new(Authenticator::new(
            Arc::clone(&db),
            tokens,
            config.token_ttl,
        ));
        let rate_limiter = Arc::new(RateLimiter::new(
            config.rate_limit,
            config.rate_window,
            config.rate_key_cap,
        ));
        Self {
            db,
            authenticator,
            rate_limiter,
            config: Arc::new(config),
        }
    }

    pub fn db(&self) -> &StashDb {
        &self.db
    }

    pub fn authenticator(&self) -> &Authenticator {
        &self.authenticator
    }

    pub fn rate_limiter(&self) -> &RateLimiter {
        &self.rate_limiter
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn state_wires_components_from_config() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let db = StashDb::open(&dir.path().join("test.redb")).expect("open db");
        let config = AppConfig {
            token_secret: "0123456789abcdef0123456789abcdef".to_string(),
            token_ttl: Duration::from_secs(3600),
            rate_limit: 2,
            rate_window: Duration::from_secs(3600),
            rate_key_cap: 100,
            scan_cap: 1000,
            data_dir: dir.path().to_path_buf(),
            host: "127.0.0.1".to_string(),
            port: 0,
        };

        let state = AppState::new(config, db);
        assert!(state.db().is_ready());
        assert_eq!(state.config().rate_limit, 2);

        let token = state
            .authenticator()
            .register("alice@example.com", "hunter2hunter2")
            .expect("register");
        assert!(state.authenticator().resolve_principal(&token).is_ok());

        assert!(state.rate_limiter().admit("alice"));
    }
}
