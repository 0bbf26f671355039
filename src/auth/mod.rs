// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! This module provides stateless session authentication for the Secret
//! Stash API.
//!
//! ## Auth Flow
//!
//! 1. Client registers or logs in with email and password
//! 2. Server verifies the credential and returns an HS512-signed session
//!    token with `sub` = account id
//! 3. Client sends `Authorization: Bearer <token>` on every request
//! 4. The admission filter resolves verifiable tokens into a [`Principal`]
//!    request extension and lets everything else pass through
//! 5. Protected handlers require a principal via the [`Auth`] extractor and
//!    reject with 401 when none is present
//!
//! ## Security
//!
//! - Tokens are signed and verified with a single secret injected at startup
//! - Only HS512 is accepted; expiry is checked with zero clock-skew leeway
//! - Token resolution is stateless, no store lookup per request
//! - Passwords are stored as Argon2 hashes, never in the clear

pub mod claims;
pub mod error;
pub mod extractor;
pub mod middleware;
pub mod service;
pub mod token;

pub use claims::{Principal, SessionClaims};
pub use error::AuthError;
pub use extractor::Auth;
pub use middleware::admission_filter;
pub use service::{Authenticator, CredentialError};
pub use token::{TokenCodec, TokenRejection};
