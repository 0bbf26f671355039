// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Session token issuance and verification.
//!
//! Tokens are JWTs signed with HMAC-SHA512 using a single secret injected at
//! construction. Verification is strict: only HS512 is accepted, expiry is
//! always checked and there is no clock-skew leeway, so a token is invalid
//! from the exact expiry instant onward.

use std::time::Duration;

use chrono::{DateTime, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;

use super::claims::SessionClaims;

/// Why a presented token failed verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TokenRejection {
    #[error("token is malformed")]
    Malformed,
    #[error("token signature is invalid")]
    BadSignature,
    #[error("token has expired")]
    Expired,
}

impl TokenRejection {
    /// Stable short name for log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            TokenRejection::Malformed => "malformed",
            TokenRejection::BadSignature => "bad_signature",
            TokenRejection::Expired => "expired",
        }
    }
}

/// Issues and verifies HS512 session tokens.
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl TokenCodec {
    /// Build a codec around the given HMAC secret.
    pub fn new(secret: &[u8]) -> Self {
        let mut validation = Validation::new(Algorithm::HS512);
        // Expiry is exact: no skew tolerance
        validation.leeway = 0;
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
        }
    }

    /// Issue a token for `subject`, valid for `ttl` from `issued_at`.
    ///
    /// The issue instant is caller-supplied so expiry behavior can be pinned
    /// in tests without waiting out real time.
    pub fn issue(
        &self,
        subject: Uuid,
        issued_at: DateTime<Utc>,
        ttl: Duration,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        let iat = issued_at.timestamp();
        let claims = SessionClaims {
            sub: subject.to_string(),
            iat,
            exp: iat + ttl.as_secs() as i64,
        };
        encode(&Header::new(Algorithm::HS512), &claims, &self.encoding_key)
    }

    /// Verify a presented token and return its claims.
    pub fn verify(&self, token: &str) -> Result<SessionClaims, TokenRejection> {
        decode::<SessionClaims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => TokenRejection::Expired,
                ErrorKind::InvalidSignature => TokenRejection::BadSignature,
                _ => TokenRejection::Malformed,
            })
    }
}
