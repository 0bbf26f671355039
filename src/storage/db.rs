// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Embedded note store backed by redb (pure Rust, ACID).
//!
//! ## Table Layout
//!
//! - `users`: user_id → serialized Credential (JSON bytes)
//! - `user_email_index`: email → user_id
//! - `notes`: composite key `owner_id/note_id` → serialized Note (JSON bytes)
//! - `note_recency_index`: composite key (owner_id|!created_at|note_id) → note_id

use std::path::Path;

use redb::{Database, ReadTransaction, ReadableDatabase, TableDefinition, WriteTransaction};

// =============================================================================
// Table Definitions
// =============================================================================

/// Primary table: user_id → serialized Credential (JSON bytes).
pub(super) const USERS: TableDefinition<&str, &[u8]> = TableDefinition::new("users");

/// Index: email → user_id. One entry per registered account.
pub(super) const USER_EMAIL_INDEX: TableDefinition<&str, &str> =
    TableDefinition::new("user_email_index");

/// Primary table: `owner_id/note_id` → serialized Note (JSON bytes).
pub(super) const NOTES: TableDefinition<&str, &[u8]> = TableDefinition::new("notes");

/// Index: composite key → note_id.
/// Key format: `owner_id|!created_at_micros_be|note_id` for descending-time
/// range scans.
pub(super) const NOTE_RECENCY_INDEX: TableDefinition<&[u8], &str> =
    TableDefinition::new("note_recency_index");

// =============================================================================
// Error Type
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("redb error: {0}")]
    Redb(#[from] redb::Error),

    #[error("redb database error: {0}")]
    RedbDatabase(#[from] redb::DatabaseError),

    #[error("redb transaction error: {0}")]
    RedbTransaction(#[from] redb::TransactionError),

    #[error("redb table error: {0}")]
    RedbTable(#[from] redb::TableError),

    #[error("redb storage error: {0}")]
    RedbStorage(#[from] redb::StorageError),

    #[error("redb commit error: {0}")]
    RedbCommit(#[from] redb::CommitError),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("email already registered")]
    EmailTaken,

    #[error("not found: {0}")]
    NotFound(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

// =============================================================================
// StashDb
// =============================================================================

/// Embedded ACID store shared by the user and note repositories.
pub struct StashDb {
    db: Database,
}

impl StashDb {
    /// Open (or create) the store at the given path.
    pub fn open(path: &Path) -> StoreResult<Self> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).ok();
        }
        let db = Database::create(path)?;

        // Pre-create all tables so later read transactions don't fail
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(USERS)?;
            let _ = write_txn.open_table(USER_EMAIL_INDEX)?;
            let _ = write_txn.open_table(NOTES)?;
            let _ = write_txn.open_table(NOTE_RECENCY_INDEX)?;
        }
        write_txn.commit()?;

        Ok(Self { db })
    }

    /// Whether the store can currently serve reads. Used by the readiness
    /// probe.
    pub fn is_ready(&self) -> bool {
        self.db.begin_read().is_ok()
    }

    pub(super) fn begin_read(&self) -> StoreResult<ReadTransaction> {
        Ok(self.db.begin_read()?)
    }

    pub(super) fn begin_write(&self) -> StoreResult<WriteTransaction> {
        Ok(self.db.begin_write()?)
    }
}
