// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Session token claims and the authenticated principal.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Claims carried by a session token.
///
/// Kept to the three registered claims the service actually uses. The
/// subject is the account id rendered as a string.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionClaims {
    /// Subject, the canonical account id.
    pub sub: String,
    /// Issued-at timestamp (Unix seconds).
    pub iat: i64,
    /// Expiration timestamp (Unix seconds).
    pub exp: i64,
}

/// Authenticated principal resolved from a verified session token.
///
/// This is the primary type used throughout the application to represent
/// the account making a request.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct Principal {
    /// Canonical account id (token `sub` claim).
    pub user_id: Uuid,

    /// Account email. Only populated on paths that already hold the
    /// credential; token resolution leaves it empty.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// Granted authority names. Empty for regular accounts.
    pub authorities: BTreeSet<String>,
}

impl Principal {
    /// Principal with no email and no granted authorities.
    pub fn new(user_id: Uuid) -> Self {
        Self {
            user_id,
            email: None,
            authorities: BTreeSet::new(),
        }
    }
}
