// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Credential persistence.
//!
//! One row per registered account plus an email index for login lookups.
//! Email uniqueness is enforced inside the same write transaction that
//! inserts the row, so concurrent registrations of one email cannot both
//! land.

use chrono::{DateTime, Utc};
use redb::ReadableTable;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::db::{StashDb, StoreError, StoreResult, USERS, USER_EMAIL_INDEX};

/// A stored account credential. Never leaves the storage and auth layers;
/// API responses carry tokens, not credentials.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Credential {
    /// Unique identifier, also the token subject for this account.
    pub id: Uuid,
    /// Account email, unique across the store.
    pub email: String,
    /// Argon2 password hash in PHC string format.
    pub password_hash: String,
    /// Registration time.
    pub created_at: DateTime<Utc>,
}

impl Credential {
    pub fn new(email: String, password_hash: String, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            email,
            password_hash,
            created_at: now,
        }
    }
}

/// Data access for the `users` and `user_email_index` tables.
pub struct UserRepository<'a> {
    db: &'a StashDb,
}

impl<'a> UserRepository<'a> {
    pub fn new(db: &'a StashDb) -> Self {
        Self { db }
    }

    /// Persist a new credential.
    ///
    /// Fails with [`StoreError::EmailTaken`] when the email is already
    /// registered. The uniqueness check and both inserts share one write
    /// transaction.
    pub fn create(&self, credential: &Credential) -> StoreResult<()> {
        let write_txn = self.db.begin_write()?;
        {
            let mut email_index = write_txn.open_table(USER_EMAIL_INDEX)?;
            if email_index.get(credential.email.as_str())?.is_some() {
                return Err(StoreError::EmailTaken);
            }

            let id = credential.id.to_string();
            let json = serde_json::to_vec(credential)?;

            let mut users = write_txn.open_table(USERS)?;
            users.insert(id.as_str(), json.as_slice())?;
            email_index.insert(credential.email.as_str(), id.as_str())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    /// Look up a credential by email. Emails are matched exactly as stored.
    pub fn find_by_email(&self, email: &str) -> StoreResult<Option<Credential>> {
        let read_txn = self.db.begin_read()?;
        let email_index = read_txn.open_table(USER_EMAIL_INDEX)?;

        let user_id = match email_index.get(email)? {
            Some(value) => value.value().to_string(),
            None => return Ok(None),
        };

        let users = read_txn.open_table(USERS)?;
        match users.get(user_id.as_str())? {
            Some(value) => {
                let credential: Credential = serde_json::from_slice(value.value())?;
                Ok(Some(credential))
            }
            None => Ok(None),
        }
    }

    /// Look up a credential by user id.
    pub fn find_by_id(&self, user_id: Uuid) -> StoreResult<Option<Credential>> {
        let id = user_id.to_string();
        let read_txn = self.db.begin_read()?;
        let users = read_txn.open_table(USERS)?;
        match users.get(id.as_str())? {
            Some(value) => {
                let credential: Credential = serde_json::from_slice(value.value())?;
                Ok(Some(credential))
            }
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_db() -> (StashDb, tempfile::TempDir) {
        let dir = tempfile::tempdir().expect("create temp dir");
        let db = StashDb::open(&dir.path().join("test.redb")).expect("open db");
        (db, dir)
    }

    fn credential(email: &str) -> Credential {
        Credential::new(email.to_string(), "$argon2id$fake".to_string(), Utc::now())
    }

    #[test]
    fn create_and_find_by_email() {
        let (db, _dir) = temp_db();
        let users = UserRepository::new(&db);

        let stored = credential("alice@example.com");
        users.create(&stored).unwrap();

        let found = users.find_by_email("alice@example.com").unwrap().unwrap();
        assert_eq!(found, stored);
    }

    #[test]
    fn find_by_email_is_exact() {
        let (db, _dir) = temp_db();
        let users = UserRepository::new(&db);

        users.create(&credential("alice@example.com")).unwrap();

        assert!(users.find_by_email("ALICE@example.com").unwrap().is_none());
        assert!(users.find_by_email("bob@example.com").unwrap().is_none());
    }

    #[test]
    fn duplicate_email_is_rejected_and_original_kept() {
        let (db, _dir) = temp_db();
        let users = UserRepository::new(&db);

        let first = credential("alice@example.com");
        users.create(&first).unwrap();

        let second = credential("alice@example.com");
        let result = users.create(&second);
        assert!(matches!(result, Err(StoreError::EmailTaken)));

        let found = users.find_by_email("alice@example.com").unwrap().unwrap();
        assert_eq!(found.id, first.id);
    }

    #[test]
    fn find_by_id_roundtrip() {
        let (db, _dir) = temp_db();
        let users = UserRepository::new(&db);

        let stored = credential("bob@example.com");
        users.create(&stored).unwrap();

        let found = users.find_by_id(stored.id).unwrap().unwrap();
        assert_eq!(found.email, "bob@example.com");

        assert!(users.find_by_id(Uuid::new_v4()).unwrap().is_none());
    }
}
