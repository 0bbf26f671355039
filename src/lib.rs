// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Secret Stash - Multi-Tenant Ephemeral Note Service
//!
//! This crate provides a note service where every account sees only its own
//! notes and notes can carry an absolute expiry after which they vanish from
//! listings. Sessions are stateless HMAC-signed tokens.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum)
//! - `auth` - Credential verification and session tokens
//! - `ratelimit` - Per-account request admission windows
//! - `storage` - Persistent note and account store (redb)

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod ratelimit;
pub mod state;
pub mod storage;
