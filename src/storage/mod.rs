// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Persistent Storage Module
//!
//! This module provides persistent storage on **redb**, an embedded ACID
//! key-value store. All state lives in a single database file under the
//! configured data directory; there is no external database process.
//!
//! ## Storage Layout
//!
//! ```text
//! users               user_id → Credential (JSON)
//! user_email_index    email → user_id
//! notes               owner_id/note_id → Note (JSON)
//! note_recency_index  owner_id|!created_at|note_id → note_id
//! ```
//!
//! ## Important Notes
//!
//! - Note keys embed the owner id, so lookups cannot cross tenants
//! - Index entries are written in the same transaction as their rows
//! - Expired notes are filtered on read, never reaped in the background

pub mod db;
pub mod notes;
pub mod users;

pub use db::{StashDb, StoreError, StoreResult};
pub use notes::{Note, NotePage, NoteRepository};
pub use users::{Credential, UserRepository};
