// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Credential verification and session issuance.
//!
//! The [`Authenticator`] owns the token codec and the store handle. Login
//! verifies a password against its stored Argon2 hash and issues a session
//! token; token resolution is purely stateless and never touches the store.

use std::sync::Arc;
use std::time::Duration;

use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::Utc;
use uuid::Uuid;

use crate::storage::{Credential, StashDb, StoreError, UserRepository};

use super::claims::Principal;
use super::token::{TokenCodec, TokenRejection};

/// Credential flow failures.
///
/// The two client-facing variants carry the exact messages returned to
/// callers. Bad-password and unknown-email logins collapse into one variant
/// so responses do not reveal which part was wrong.
#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    #[error("Email already in use")]
    DuplicateEmail,

    #[error("Invalid email/password")]
    InvalidCredentials,

    #[error("password hashing failed: {0}")]
    Hash(String),

    #[error("token issuance failed: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Registers accounts, verifies credentials and resolves bearer tokens.
pub struct Authenticator {
    db: Arc<StashDb>,
    tokens: TokenCodec,
    token_ttl: Duration,
}

impl Authenticator {
    pub fn new(db: Arc<StashDb>, tokens: TokenCodec, token_ttl: Duration) -> Self {
        Self {
            db,
            tokens,
            token_ttl,
        }
    }

    /// Register a new account and issue its first session token.
    ///
    /// Registration performs a login as a side effect, so clients receive a
    /// usable token straight away. Duplicate emails are rejected both by the
    /// pre-check here and by the store's transactional uniqueness guarantee.
    pub fn register(&self, email: &str, password: &str) -> Result<String, CredentialError> {
        let users = UserRepository::new(&self.db);
        if users.find_by_email(email)?.is_some() {
            return Err(CredentialError::DuplicateEmail);
        }

        let password_hash = hash_password(password)?;
        let credential = Credential::new(email.to_string(), password_hash, Utc::now());
        match users.create(&credential) {
            Ok(()) => {}
            Err(StoreError::EmailTaken) => return Err(CredentialError::DuplicateEmail),
            Err(e) => return Err(e.into()),
        }
        tracing::debug!(user_id = %credential.id, "registered new account");

        self.login(email, password)
    }

    /// Verify credentials and issue a session token.
    pub fn login(&self, email: &str, password: &str) -> Result<String, CredentialError> {
        let users = UserRepository::new(&self.db);
        let credential = users
            .find_by_email(email)?
            .ok_or(CredentialError::InvalidCredentials)?;

        if !verify_password(&credential.password_hash, password) {
            return Err(CredentialError::InvalidCredentials);
        }

        Ok(self.tokens.issue(credential.id, Utc::now(), self.token_ttl)?)
    }

    /// Resolve a bearer token into a request principal.
    ///
    /// Stateless: the subject is taken from the verified claims without a
    /// store lookup. A subject that is not a well-formed account id counts
    /// as a malformed token.
    pub fn resolve_principal(&self, token: &str) -> Result<Principal, TokenRejection> {
        let claims = self.tokens.verify(token)?;
        let user_id = Uuid::parse_str(&claims.sub).map_err(|_| TokenRejection::Malformed)?;
        Ok(Principal::new(user_id))
    }
}

fn hash_password(password: &str) -> Result<String, CredentialError> {
    let salt = SaltString::generate(&mut rand::thread_rng());
    let phc = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| CredentialError::Hash(e.to_string()))?
        .to_string();
    Ok(phc)
}

fn verify_password(hash: &str, password: &str) -> bool {
    if let Ok(parsed) = PasswordHash::new(hash) {
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    } else {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::claims::SessionClaims;
    use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};

    const SECRET: &[u8] = b"0123456789abcdef0123456789abcdef";

    fn test_authenticator() -> (Authenticator, Arc<StashDb>, tempfile::TempDir) {
        let dir = tempfile::tempdir().expect("create temp dir");
        let db = Arc::new(StashDb::open(&dir.path().join("test.redb")).expect("open db"));
        let auth = Authenticator::new(
            Arc::clone(&db),
            TokenCodec::new(SECRET),
            Duration::from_secs(3600),
        );
        (auth, db, dir)
    }

    #[test]
    fn register_issues_a_token_for_the_stored_account() {
        let (auth, db, _dir) = test_authenticator();

        let token = auth.register("alice@example.com", "hunter2hunter2").unwrap();
        let principal = auth.resolve_principal(&token).unwrap();

        let users = UserRepository::new(&db);
        let stored = users.find_by_email("alice@example.com").unwrap().unwrap();
        assert_eq!(principal.user_id, stored.id);
    }

    #[test]
    fn register_stores_a_hash_not_the_password() {
        let (auth, db, _dir) = test_authenticator();

        auth.register("alice@example.com", "hunter2hunter2").unwrap();

        let users = UserRepository::new(&db);
        let stored = users.find_by_email("alice@example.com").unwrap().unwrap();
        assert_ne!(stored.password_hash, "hunter2hunter2");
        assert!(stored.password_hash.starts_with("$argon2"));
    }

    #[test]
    fn duplicate_registration_is_rejected() {
        let (auth, db, _dir) = test_authenticator();

        auth.register("alice@example.com", "first-password").unwrap();
        let result = auth.register("alice@example.com", "second-password");
        assert!(matches!(result, Err(CredentialError::DuplicateEmail)));

        // First registration is untouched
        let users = UserRepository::new(&db);
        let stored = users.find_by_email("alice@example.com").unwrap().unwrap();
        assert!(verify_password(&stored.password_hash, "first-password"));
    }

    #[test]
    fn login_roundtrip_after_register() {
        let (auth, db, _dir) = test_authenticator();

        auth.register("bob@example.com", "correct horse").unwrap();
        let token = auth.login("bob@example.com", "correct horse").unwrap();
        let principal = auth.resolve_principal(&token).unwrap();

        let users = UserRepository::new(&db);
        let stored = users.find_by_email("bob@example.com").unwrap().unwrap();
        assert_eq!(principal.user_id, stored.id);
    }

    #[test]
    fn bad_password_and_unknown_email_are_indistinguishable() {
        let (auth, _db, _dir) = test_authenticator();

        auth.register("bob@example.com", "correct horse").unwrap();

        let wrong_password = auth.login("bob@example.com", "battery staple");
        let unknown_email = auth.login("nobody@example.com", "correct horse");

        let wrong_password = wrong_password.unwrap_err();
        let unknown_email = unknown_email.unwrap_err();
        assert!(matches!(wrong_password, CredentialError::InvalidCredentials));
        assert!(matches!(unknown_email, CredentialError::InvalidCredentials));
        assert_eq!(wrong_password.to_string(), unknown_email.to_string());
    }

    #[test]
    fn resolve_principal_rejects_garbage() {
        let (auth, _db, _dir) = test_authenticator();
        let result = auth.resolve_principal("not-a-token");
        assert_eq!(result, Err(TokenRejection::Malformed));
    }

    #[test]
    fn resolve_principal_rejects_non_uuid_subjects() {
        let (auth, _db, _dir) = test_authenticator();

        let claims = SessionClaims {
            sub: "service-account".to_string(),
            iat: Utc::now().timestamp(),
            exp: Utc::now().timestamp() + 3600,
        };
        let token = encode(
            &Header::new(Algorithm::HS512),
            &claims,
            &EncodingKey::from_secret(SECRET),
        )
        .unwrap();

        let result = auth.resolve_principal(&token);
        assert_eq!(result, Err(TokenRejection::Malformed));
    }

    #[test]
    fn verify_password_rejects_unparseable_hashes() {
        assert!(!verify_password("not-a-phc-string", "whatever"));
    }
}
