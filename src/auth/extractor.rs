// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Axum extractor for authenticated principals.
//!
//! Use the `Auth` extractor in handlers to require authentication:
//!
//! ```rust,ignore
//! async fn my_handler(Auth(principal): Auth) -> impl IntoResponse {
//!     // principal is the verified Principal
//! }
//! ```
//!
//! The admission filter normally resolves the principal ahead of time and
//! stashes it in the request extensions; the extractor falls back to working
//! the Authorization header itself so handlers behave the same with or
//! without the filter in front of them.

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};

use super::claims::Principal;
use super::error::AuthError;
use crate::state::AppState;

/// Extractor that rejects requests without a verified principal.
///
/// # Example
///
/// ```rust,ignore
/// async fn list_notes(
///     Auth(principal): Auth,
///     State(state): State<AppState>,
/// ) -> Result<Json<Vec<NoteResponse>>, ApiError> {
///     // principal.user_id scopes every storage call
/// }
/// ```
pub struct Auth(pub Principal);

impl FromRequestParts<AppState> for Auth {
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        // First check if the admission filter already resolved a principal
        if let Some(principal) = parts.extensions.get::<Principal>().cloned() {
            return Ok(Auth(principal));
        }

        // Extract Authorization header
        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .ok_or(AuthError::MissingAuthHeader)?
            .to_str()
            .map_err(|_| AuthError::InvalidAuthHeader)?;

        // Extract Bearer token
        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or(AuthError::InvalidAuthHeader)?;

        let principal = state.authenticator().resolve_principal(token.trim())?;
        Ok(Auth(principal))
    }
}
