// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # API Data Models
//!
//! This module defines the request and response data structures used by
//! the REST API. All types derive `Serialize`, `Deserialize`, and `ToSchema`
//! for automatic JSON handling and OpenAPI documentation.
//!
//! Wire fields are camelCase. Timestamps cross the wire as Unix epoch
//! seconds; `expiresAt` is optional and omitted when a note never expires.
//!
//! ## Model Categories
//!
//! - **Auth**: Credential submission and issued session tokens
//! - **Notes**: Note payloads and the page envelope for listings

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::storage::Note;

// =============================================================================
// Auth Models
// =============================================================================

/// Credentials submitted to both the register and login endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuthRequest {
    /// Account email address, unique per tenant.
    #[schema(example = "alice@example.com")]
    pub email: String,
    /// Account password, verified against the stored hash on login.
    pub password: String,
}

/// A freshly issued session token.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    /// Signed session token to present as `Authorization: Bearer <token>`.
    pub token: String,
    /// Token scheme, always `Bearer`.
    #[schema(example = "Bearer")]
    pub token_type: String,
}

impl AuthResponse {
    pub fn bearer(token: String) -> Self {
        Self {
            token,
            token_type: "Bearer".to_string(),
        }
    }
}

// =============================================================================
// Note Models
// =============================================================================

/// Request body for creating or fully replacing a note.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NoteRequest {
    /// Note title, must not be blank.
    pub title: String,
    /// Note body, must not be blank.
    pub content: String,
    /// Optional absolute expiry as Unix epoch seconds. Absent means the
    /// note never expires; on update, absent clears any existing expiry.
    #[serde(default)]
    pub expires_at: Option<i64>,
}

/// A note as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NoteResponse {
    /// Unique identifier for this note.
    pub id: Uuid,
    /// Note title.
    pub title: String,
    /// Note body.
    pub content: String,
    /// Creation time as Unix epoch seconds.
    pub created_at: i64,
    /// Last modification time as Unix epoch seconds.
    pub updated_at: i64,
    /// Expiry time as Unix epoch seconds, omitted for notes that never
    /// expire.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<i64>,
}

impl From<Note> for NoteResponse {
    fn from(note: Note) -> Self {
        Self {
            id: note.id,
            title: note.title,
            content: note.content,
            created_at: note.created_at.timestamp(),
            updated_at: note.updated_at.timestamp(),
            expires_at: note.expires_at.map(|at| at.timestamp()),
        }
    }
}

// =============================================================================
// Page Envelope
// =============================================================================

/// Page envelope wrapping note listings.
///
/// Unpaged listings reuse the same envelope with `page` 0 and `size` equal
/// to the number of returned notes.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PageResponse {
    /// Notes on this page, newest first.
    pub content: Vec<NoteResponse>,
    /// Zero-based page index.
    pub page: usize,
    /// Requested page size.
    pub size: usize,
    /// Total number of unexpired notes owned by the caller.
    pub total_elements: usize,
    /// Total number of pages at the requested size.
    pub total_pages: usize,
}

impl PageResponse {
    pub fn new(content: Vec<NoteResponse>, page: usize, size: usize, total: usize) -> Self {
        let total_pages = if size == 0 { 0 } else { total.div_ceil(size) };
        Self {
            content,
            page,
            size,
            total_elements: total,
            total_pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    #[test]
    fn note_response_converts_timestamps_to_epoch_seconds() {
        let now = Utc::now();
        let expiry = now + Duration::hours(2);
        let note = Note::new(
            Uuid::new_v4(),
            "groceries".to_string(),
            "milk, eggs".to_string(),
            Some(expiry),
            now,
        );

        let response = NoteResponse::from(note.clone());
        assert_eq!(response.id, note.id);
        assert_eq!(response.created_at, now.timestamp());
        assert_eq!(response.updated_at, now.timestamp());
        assert_eq!(response.expires_at, Some(expiry.timestamp()));
    }

    #[test]
    fn note_response_omits_absent_expiry() {
        let note = Note::new(
            Uuid::new_v4(),
            "keep".to_string(),
            "forever".to_string(),
            None,
            Utc::now(),
        );

        let value = serde_json::to_value(NoteResponse::from(note)).unwrap();
        assert!(value.get("expiresAt").is_none());
        assert!(value.get("createdAt").is_some());
        assert!(value.get("updatedAt").is_some());
    }

    #[test]
    fn auth_response_carries_bearer_token_type() {
        let response = AuthResponse::bearer("abc.def.ghi".to_string());
        let value = serde_json::to_value(response).unwrap();
        assert_eq!(value["token"], "abc.def.ghi");
        assert_eq!(value["tokenType"], "Bearer");
    }

    #[test]
    fn page_response_computes_total_pages() {
        let page = PageResponse::new(Vec::new(), 0, 10, 25);
        assert_eq!(page.total_pages, 3);

        let exact = PageResponse::new(Vec::new(), 1, 5, 10);
        assert_eq!(exact.total_pages, 2);

        let empty = PageResponse::new(Vec::new(), 0, 0, 0);
        assert_eq!(empty.total_pages, 0);
    }

    #[test]
    fn note_request_defaults_expiry_to_none() {
        let request: NoteRequest =
            serde_json::from_str(r#"{"title":"a","content":"b"}"#).unwrap();
        assert_eq!(request.expires_at, None);

        let with_expiry: NoteRequest =
            serde_json::from_str(r#"{"title":"a","content":"b","expiresAt":1764000000}"#).unwrap();
        assert_eq!(with_expiry.expires_at, Some(1_764_000_000));
    }
}
