// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! This module defines environment variable names, default values and the
//! [`AppConfig`] snapshot loaded from the environment at startup. Components
//! receive their settings through [`AppConfig`] rather than reading the
//! environment themselves.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `STASH_TOKEN_SECRET` | HMAC secret for session tokens (min 32 bytes) | Required |
//! | `STASH_TOKEN_TTL_SECS` | Session token lifetime in seconds | `3600` |
//! | `STASH_RATE_LIMIT` | Requests admitted per principal per window | `100` |
//! | `STASH_RATE_WINDOW_SECS` | Rate limiter window in seconds | `3600` |
//! | `STASH_RATE_KEY_CAP` | Max principals tracked by the rate limiter | `10000` |
//! | `STASH_SCAN_CAP` | Max notes returned by unpaged listings | `1000` |
//! | `DATA_DIR` | Root directory for the embedded store | `./data` |
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `secret_stash=debug,tower_http=debug` |

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Environment variable name for the session token HMAC secret.
///
/// The secret is required and must be at least 32 bytes. It is injected into
/// the token codec at construction; nothing else reads it.
pub const TOKEN_SECRET_ENV: &str = "STASH_TOKEN_SECRET";

/// Environment variable name for the session token lifetime in seconds.
pub const TOKEN_TTL_ENV: &str = "STASH_TOKEN_TTL_SECS";

/// Environment variable name for the per-principal admission ceiling.
pub const RATE_LIMIT_ENV: &str = "STASH_RATE_LIMIT";

/// Environment variable name for the rate limiter window in seconds.
pub const RATE_WINDOW_ENV: &str = "STASH_RATE_WINDOW_SECS";

/// Environment variable name for the rate limiter key capacity.
pub const RATE_KEY_CAP_ENV: &str = "STASH_RATE_KEY_CAP";

/// Environment variable name for the unpaged listing cap.
pub const SCAN_CAP_ENV: &str = "STASH_SCAN_CAP";

/// Environment variable name for the data directory path.
///
/// The embedded store file lives under this directory. The directory is
/// created at startup if it does not exist.
pub const DATA_DIR_ENV: &str = "DATA_DIR";

/// Environment variable name for the server bind address.
pub const HOST_ENV: &str = "HOST";

/// Environment variable name for the server bind port.
pub const PORT_ENV: &str = "PORT";

/// Environment variable name for the log output format (`json` or `pretty`).
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

/// Minimum accepted length for the token secret, in bytes.
pub const MIN_SECRET_BYTES: usize = 32;

const DEFAULT_TOKEN_TTL_SECS: u64 = 3600;
const DEFAULT_RATE_LIMIT: u32 = 100;
const DEFAULT_RATE_WINDOW_SECS: u64 = 3600;
const DEFAULT_RATE_KEY_CAP: usize = 10_000;
const DEFAULT_SCAN_CAP: usize = 1000;
const DEFAULT_DATA_DIR: &str = "./data";
const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8080;

/// Configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{name} is invalid: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// Application settings snapshot, loaded once at startup.
#[derive(Clone)]
pub struct AppConfig {
    /// HMAC secret for signing and verifying session tokens.
    pub token_secret: String,
    /// Lifetime of issued session tokens.
    pub token_ttl: Duration,
    /// Requests admitted per principal within one rate limiter window.
    pub rate_limit: u32,
    /// Length of the rate limiter window.
    pub rate_window: Duration,
    /// Maximum number of principals the rate limiter tracks at once.
    pub rate_key_cap: usize,
    /// Maximum number of notes returned by an unpaged listing.
    pub scan_cap: usize,
    /// Root directory for the embedded store.
    pub data_dir: PathBuf,
    /// Server bind address.
    pub host: String,
    /// Server bind port.
    pub port: u16,
}

impl AppConfig {
    /// Loads the configuration from the environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        let token_secret =
            env::var(TOKEN_SECRET_ENV).map_err(|_| ConfigError::Missing(TOKEN_SECRET_ENV))?;
        if token_secret.len() < MIN_SECRET_BYTES {
            return Err(ConfigError::Invalid {
                name: TOKEN_SECRET_ENV,
                reason: format!("must be at least {MIN_SECRET_BYTES} bytes"),
            });
        }

        Ok(Self {
            token_secret,
            token_ttl: Duration::from_secs(parse_or(
                TOKEN_TTL_ENV,
                env::var(TOKEN_TTL_ENV).ok(),
                DEFAULT_TOKEN_TTL_SECS,
            )?),
            rate_limit: parse_or(RATE_LIMIT_ENV, env::var(RATE_LIMIT_ENV).ok(), DEFAULT_RATE_LIMIT)?,
            rate_window: Duration::from_secs(parse_or(
                RATE_WINDOW_ENV,
                env::var(RATE_WINDOW_ENV).ok(),
                DEFAULT_RATE_WINDOW_SECS,
            )?),
            rate_key_cap: parse_or(
                RATE_KEY_CAP_ENV,
                env::var(RATE_KEY_CAP_ENV).ok(),
                DEFAULT_RATE_KEY_CAP,
            )?,
            scan_cap: parse_or(SCAN_CAP_ENV, env::var(SCAN_CAP_ENV).ok(), DEFAULT_SCAN_CAP)?,
            data_dir: PathBuf::from(
                env::var(DATA_DIR_ENV).unwrap_or_else(|_| DEFAULT_DATA_DIR.to_string()),
            ),
            host: env::var(HOST_ENV).unwrap_or_else(|_| DEFAULT_HOST.to_string()),
            port: parse_or(PORT_ENV, env::var(PORT_ENV).ok(), DEFAULT_PORT)?,
        })
    }
}

/// Parses an optional raw environment value, falling back to `default` when
/// the variable is unset.
fn parse_or<T: FromStr>(name: &'static str, raw: Option<String>, default: T) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    match raw {
        Some(value) => value.parse().map_err(|e: T::Err| ConfigError::Invalid {
            name,
            reason: e.to_string(),
        }),
        None => Ok(default),
    }
}
