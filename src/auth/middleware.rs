// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Request admission filter.
//!
//! Applied over the whole API subtree. When a request carries a verifiable
//! bearer token, the filter resolves it and stashes the [`Principal`] in the
//! request extensions. In every other case the request continues
//! unauthenticated: rejection is the job of the [`Auth`](super::Auth)
//! extractor on protected handlers, never of this filter. Unusable tokens
//! are logged and dropped.

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};

use crate::state::AppState;

/// Admission filter function.
///
/// # Usage
///
/// ```rust,ignore
/// let app = Router::new()
///     .route("/notes", get(list_notes))
///     .layer(axum::middleware::from_fn_with_state(
///         state.clone(),
///         admission_filter,
///     ));
/// ```
pub async fn admission_filter(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    match request.headers().get(AUTHORIZATION) {
        Some(header) => {
            let token = header
                .to_str()
                .ok()
                .and_then(|value| value.strip_prefix("Bearer "))
                .map(str::trim);

            match token {
                Some(token) => match state.authenticator().resolve_principal(token) {
                    Ok(principal) => {
                        request.extensions_mut().insert(principal);
                    }
                    Err(rejection) => {
                        tracing::warn!(
                            kind = rejection.kind(),
                            path = %request.uri().path(),
                            "discarding unusable bearer token"
                        );
                    }
                },
                None => {
                    tracing::warn!(
                        path = %request.uri().path(),
                        "authorization header is not a bearer token"
                    );
                }
            }
        }
        None => {
            tracing::debug!(
                path = %request.uri().path(),
                "request carries no authorization header"
            );
        }
    }

    next.run(request).await
}
