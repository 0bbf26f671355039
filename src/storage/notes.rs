// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Note persistence.
//!
//! Notes are keyed by `owner_id/note_id`, so every point lookup is scoped to
//! its owner by construction. A recency index with inverted creation
//! timestamps serves newest-first listings as bounded forward range scans.
//! Expired notes stay in the store until deleted; listings filter them
//! against the caller-supplied reference time.

use chrono::{DateTime, Utc};
use redb::ReadableTable;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::db::{StashDb, StoreError, StoreResult, NOTES, NOTE_RECENCY_INDEX};

// =============================================================================
// Note Model
// =============================================================================

/// A stored note.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Note {
    /// Unique identifier for this note.
    pub id: Uuid,
    /// The account that owns this note.
    pub owner_id: Uuid,
    /// Note title.
    pub title: String,
    /// Note body.
    pub content: String,
    /// Creation time, immutable after creation.
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
    /// Optional expiry. `None` means the note never expires.
    pub expires_at: Option<DateTime<Utc>>,
}

impl Note {
    pub fn new(
        owner_id: Uuid,
        title: String,
        content: String,
        expires_at: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner_id,
            title,
            content,
            created_at: now,
            updated_at: now,
            expires_at,
        }
    }

    /// A note is visible while it has no expiry or its expiry is strictly
    /// after `at`.
    pub fn is_visible_at(&self, at: DateTime<Utc>) -> bool {
        self.expires_at.map_or(true, |expiry| expiry > at)
    }
}

/// One page of a paged listing, together with the filtered total.
#[derive(Debug, Clone)]
pub struct NotePage {
    /// Notes on this page, newest first.
    pub notes: Vec<Note>,
    /// Total number of visible notes owned by the caller.
    pub total: usize,
}

// =============================================================================
// Index Key Helpers
// =============================================================================

/// Primary key for the notes table.
fn note_key(owner_id: Uuid, note_id: Uuid) -> String {
    format!("{owner_id}/{note_id}")
}

/// Build a composite key for the note_recency_index table.
///
/// Format: `owner_id | inverted_created_at_micros_be | note_id`
///
/// The inverted timestamp ensures newest-first ordering when scanning forward.
fn recency_key(owner_id: Uuid, created_at: DateTime<Utc>, note_id: Uuid) -> Vec<u8> {
    let owner = owner_id.to_string();
    let note = note_id.to_string();
    let mut key = Vec::with_capacity(owner.len() + 1 + 8 + 1 + note.len());
    key.extend_from_slice(owner.as_bytes());
    key.push(b'|');
    // Invert timestamp for descending order (newest first)
    key.extend_from_slice(&(!created_at.timestamp_micros() as u64).to_be_bytes());
    key.push(b'|');
    key.extend_from_slice(note.as_bytes());
    key
}

/// Build a prefix key for range scanning all notes of one owner.
fn owner_prefix(owner_id: Uuid) -> Vec<u8> {
    let owner = owner_id.to_string();
    let mut prefix = Vec::with_capacity(owner.len() + 1);
    prefix.extend_from_slice(owner.as_bytes());
    prefix.push(b'|');
    prefix
}

/// Build the upper bound for a range scan (prefix with all 0xFF bytes appended).
fn owner_prefix_end(owner_id: Uuid) -> Vec<u8> {
    let mut end = owner_prefix(owner_id);
    end.extend_from_slice(&[0xFF; 20]);
    end
}

// =============================================================================
// NoteRepository
// =============================================================================

/// Data access for the `notes` and `note_recency_index` tables.
pub struct NoteRepository<'a> {
    db: &'a StashDb,
}

impl<'a> NoteRepository<'a> {
    pub fn new(db: &'a StashDb) -> Self {
        Self { db }
    }

    /// Insert a note and its recency index entry in one transaction.
    pub fn create(&self, note: &Note) -> StoreResult<()> {
        let json = serde_json::to_vec(note)?;
        let key = note_key(note.owner_id, note.id);
        let index_key = recency_key(note.owner_id, note.created_at, note.id);
        let note_id = note.id.to_string();

        let write_txn = self.db.begin_write()?;
        {
            let mut notes = write_txn.open_table(NOTES)?;
            notes.insert(key.as_str(), json.as_slice())?;

            let mut index = write_txn.open_table(NOTE_RECENCY_INDEX)?;
            index.insert(index_key.as_slice(), note_id.as_str())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    /// Look up a single note. Returns `None` when the note does not exist or
    /// belongs to another owner.
    pub fn get(&self, owner_id: Uuid, note_id: Uuid) -> StoreResult<Option<Note>> {
        let key = note_key(owner_id, note_id);
        let read_txn = self.db.begin_read()?;
        let notes = read_txn.open_table(NOTES)?;
        match notes.get(key.as_str())? {
            Some(value) => {
                let note: Note = serde_json::from_slice(value.value())?;
                Ok(Some(note))
            }
            None => Ok(None),
        }
    }

    /// Overwrite title, content and expiry of an owned note.
    ///
    /// `created_at` and the recency index entry are left untouched. Fails
    /// with [`StoreError::NotFound`] when the note does not exist or belongs
    /// to another owner.
    pub fn update(
        &self,
        owner_id: Uuid,
        note_id: Uuid,
        title: &str,
        content: &str,
        expires_at: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> StoreResult<Note> {
        let key = note_key(owner_id, note_id);

        let write_txn = self.db.begin_write()?;
        let updated = {
            let mut notes = write_txn.open_table(NOTES)?;

            // Read existing value and deserialize before mutating
            let existing_bytes = {
                let existing = notes
                    .get(key.as_str())?
                    .ok_or_else(|| StoreError::NotFound(format!("Note {note_id}")))?;
                existing.value().to_vec()
            };

            let mut note: Note = serde_json::from_slice(&existing_bytes)?;
            note.title = title.to_string();
            note.content = content.to_string();
            note.expires_at = expires_at;
            note.updated_at = now;

            let json = serde_json::to_vec(&note)?;
            notes.insert(key.as_str(), json.as_slice())?;
            note
        };
        write_txn.commit()?;
        Ok(updated)
    }

    /// Remove an owned note and its index entry.
    ///
    /// Fails with [`StoreError::NotFound`] when the note does not exist or
    /// belongs to another owner.
    pub fn delete(&self, owner_id: Uuid, note_id: Uuid) -> StoreResult<()> {
        let key = note_key(owner_id, note_id);

        let write_txn = self.db.begin_write()?;
        {
            let mut notes = write_txn.open_table(NOTES)?;
            let removed_bytes = {
                let removed = notes
                    .remove(key.as_str())?
                    .ok_or_else(|| StoreError::NotFound(format!("Note {note_id}")))?;
                removed.value().to_vec()
            };

            let note: Note = serde_json::from_slice(&removed_bytes)?;
            let mut index = write_txn.open_table(NOTE_RECENCY_INDEX)?;
            index.remove(recency_key(owner_id, note.created_at, note.id).as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    /// Newest-first listing of the owner's visible notes.
    ///
    /// Scans at most `cap` index entries and drops notes that are expired at
    /// `now` while scanning.
    pub fn list_recent(&self, owner_id: Uuid, cap: usize, now: DateTime<Utc>) -> StoreResult<Vec<Note>> {
        let read_txn = self.db.begin_read()?;
        let index = read_txn.open_table(NOTE_RECENCY_INDEX)?;
        let notes_table = read_txn.open_table(NOTES)?;

        let prefix = owner_prefix(owner_id);
        let prefix_end = owner_prefix_end(owner_id);

        let mut results = Vec::new();
        let mut scanned = 0usize;
        for entry in index.range(prefix.as_slice()..prefix_end.as_slice())? {
            if scanned >= cap {
                break;
            }
            let entry = entry?;
            scanned += 1;

            let key = format!("{owner_id}/{}", entry.1.value());
            if let Some(value) = notes_table.get(key.as_str())? {
                let note: Note = serde_json::from_slice(value.value())?;
                if note.is_visible_at(now) {
                    results.push(note);
                }
            }
        }

        Ok(results)
    }

    /// Paged newest-first listing of the owner's visible notes.
    ///
    /// `page` is zero-based. The returned total counts every visible note of
    /// the owner, so page numbers and the total stay consistent with each
    /// other under one reference time.
    pub fn list_paged(
        &self,
        owner_id: Uuid,
        page: usize,
        size: usize,
        now: DateTime<Utc>,
    ) -> StoreResult<NotePage> {
        let read_txn = self.db.begin_read()?;
        let index = read_txn.open_table(NOTE_RECENCY_INDEX)?;
        let notes_table = read_txn.open_table(NOTES)?;

        let prefix = owner_prefix(owner_id);
        let prefix_end = owner_prefix_end(owner_id);

        let offset = page.saturating_mul(size);
        let end = offset.saturating_add(size);

        let mut notes = Vec::new();
        let mut total = 0usize;
        for entry in index.range(prefix.as_slice()..prefix_end.as_slice())? {
            let entry = entry?;

            let key = format!("{owner_id}/{}", entry.1.value());
            if let Some(value) = notes_table.get(key.as_str())? {
                let note: Note = serde_json::from_slice(value.value())?;
                if note.is_visible_at(now) {
                    if total >= offset && total < end {
                        notes.push(note);
                    }
                    total += 1;
                }
            }
        }

        Ok(NotePage { notes, total })
    }
}
