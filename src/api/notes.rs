// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use utoipa::IntoParams;
use uuid::Uuid;

use crate::{
    auth::Auth,
    error::ApiError,
    models::{NoteRequest, NoteResponse, PageResponse},
    state::AppState,
    storage::{Note, NoteRepository, StoreError},
};

#[derive(Debug, Deserialize, IntoParams)]
pub struct ListQuery {
    /// Zero-based page index.
    pub page: Option<usize>,
    /// Notes per page.
    pub size: Option<usize>,
}

#[utoipa::path(
    get,
    path = "/api/notes",
    params(ListQuery),
    tag = "Notes",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, body = PageResponse),
        (status = 400, description = "Page size of zero"),
        (status = 401, description = "Missing or invalid bearer token")
    )
)]
pub async fn list_notes(
    Auth(principal): Auth,
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<PageResponse>, ApiError> {
    let repository = NoteRepository::new(state.db());
    let now = Utc::now();

    match (query.page, query.size) {
        (Some(page), Some(size)) => {
            if size == 0 {
                return Err(ApiError::bad_request("Size must be at least 1"));
            }
            let result = repository
                .list_paged(principal.user_id, page, size, now)
                .map_err(store_error)?;
            let content = result.notes.into_iter().map(NoteResponse::from).collect();
            Ok(Json(PageResponse::new(content, page, size, result.total)))
        }
        _ => {
            let notes = repository
                .list_recent(principal.user_id, state.config().scan_cap, now)
                .map_err(store_error)?;
            let total = notes.len();
            let content = notes.into_iter().map(NoteResponse::from).collect();
            Ok(Json(PageResponse::new(content, 0, total, total)))
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/notes/latest",
    tag = "Notes",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, body = [NoteResponse]),
        (status = 401, description = "Missing or invalid bearer token"),
        (status = 429, description = "Caller exhausted its request window")
    )
)]
pub async fn latest_notes(
    Auth(principal): Auth,
    State(state): State<AppState>,
) -> Result<Json<Vec<NoteResponse>>, ApiError> {
    if !state.rate_limiter().admit(&principal.user_id.to_string()) {
        return Err(ApiError::too_many_requests("Rate limit exceeded"));
    }

    let notes = NoteRepository::new(state.db())
        .list_recent(principal.user_id, state.config().scan_cap, Utc::now())
        .map_err(store_error)?;
    Ok(Json(notes.into_iter().map(NoteResponse::from).collect()))
}

#[utoipa::path(
    post,
    path = "/api/notes",
    request_body = NoteRequest,
    tag = "Notes",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, body = NoteResponse),
        (status = 400, description = "Blank title or content, or unrepresentable expiry"),
        (status = 401, description = "Missing or invalid bearer token")
    )
)]
pub async fn create_note(
    Auth(principal): Auth,
    State(state): State<AppState>,
    Json(request): Json<NoteRequest>,
) -> Result<Json<NoteResponse>, ApiError> {
    validate_note_request(&request)?;
    let expires_at = parse_expiry(request.expires_at)?;

    let note = Note::new(
        principal.user_id,
        request.title,
        request.content,
        expires_at,
        Utc::now(),
    );
    NoteRepository::new(state.db())
        .create(&note)
        .map_err(store_error)?;

    tracing::debug!(note_id = %note.id, "created note");
    Ok(Json(NoteResponse::from(note)))
}

#[utoipa::path(
    put,
    path = "/api/notes/{id}",
    request_body = NoteRequest,
    params(("id" = Uuid, Path, description = "Note ID")),
    tag = "Notes",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, body = NoteResponse),
        (status = 400, description = "Blank title or content, or unrepresentable expiry"),
        (status = 401, description = "Missing or invalid bearer token"),
        (status = 404, description = "No such note for this caller")
    )
)]
pub async fn update_note(
    Auth(principal): Auth,
    State(state): State<AppState>,
    Path(note_id): Path<Uuid>,
    Json(request): Json<NoteRequest>,
) -> Result<Json<NoteResponse>, ApiError> {
    validate_note_request(&request)?;
    let expires_at = parse_expiry(request.expires_at)?;

    let note = NoteRepository::new(state.db())
        .update(
            principal.user_id,
            note_id,
            &request.title,
            &request.content,
            expires_at,
            Utc::now(),
        )
        .map_err(store_error)?;
    Ok(Json(NoteResponse::from(note)))
}

#[utoipa::path(
    delete,
    path = "/api/notes/{id}",
    params(("id" = Uuid, Path, description = "Note ID")),
    tag = "Notes",
    security(("bearer_auth" = [])),
    responses(
        (status = 204, description = "Note deleted"),
        (status = 401, description = "Missing or invalid bearer token"),
        (status = 404, description = "No such note for this caller")
    )
)]
pub async fn delete_note(
    Auth(principal): Auth,
    State(state): State<AppState>,
    Path(note_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    NoteRepository::new(state.db())
        .delete(principal.user_id, note_id)
        .map_err(store_error)?;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// Helper Functions
// =============================================================================

fn validate_note_request(request: &NoteRequest) -> Result<(), ApiError> {
    if request.title.trim().is_empty() {
        return Err(ApiError::bad_request("Title must not be blank"));
    }
    if request.content.trim().is_empty() {
        return Err(ApiError::bad_request("Content must not be blank"));
    }
    Ok(())
}

/// Convert an epoch-second expiry into a timestamp, rejecting values chrono
/// cannot represent.
fn parse_expiry(expires_at: Option<i64>) -> Result<Option<DateTime<Utc>>, ApiError> {
    match expires_at {
        Some(seconds) => match DateTime::from_timestamp(seconds, 0) {
            Some(timestamp) => Ok(Some(timestamp)),
            None => Err(ApiError::bad_request("Expiry timestamp is out of range")),
        },
        None => Ok(None),
    }
}

fn store_error(error: StoreError) -> ApiError {
    match error {
        StoreError::NotFound(_) => ApiError::not_found("Note not found"),
        other => {
            tracing::error!(error = %other, "note store failure");
            ApiError::internal("Internal server error")
        }
    }
}
