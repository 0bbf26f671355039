// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{extract::State, Json};

use crate::{
    auth::CredentialError,
    error::ApiError,
    models::{AuthRequest, AuthResponse},
    state::AppState,
};

#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = AuthRequest,
    tag = "Auth",
    responses(
        (status = 200, body = AuthResponse),
        (status = 400, description = "Malformed credentials or email already in use")
    )
)]
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<AuthRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    validate_credentials(&request)?;
    let token = state
        .authenticator()
        .register(&request.email, &request.password)
        .map_err(credential_error)?;
    Ok(Json(AuthResponse::bearer(token)))
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = AuthRequest,
    tag = "Auth",
    responses(
        (status = 200, body = AuthResponse),
        (status = 400, description = "Unknown email or wrong password")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<AuthRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    validate_credentials(&request)?;
    let token = state
        .authenticator()
        .login(&request.email, &request.password)
        .map_err(credential_error)?;
    Ok(Json(AuthResponse::bearer(token)))
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Validate submitted credentials before touching the store.
fn validate_credentials(request: &AuthRequest) -> Result<(), ApiError> {
    let email = request.email.as_str();
    if email.is_empty() {
        return Err(ApiError::bad_request("Email must not be blank"));
    }
    if email.chars().any(char::is_whitespace) {
        return Err(ApiError::bad_request("Email must be a valid address"));
    }
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => {}
        _ => return Err(ApiError::bad_request("Email must be a valid address")),
    }
    if request.password.trim().is_empty() {
        return Err(ApiError::bad_request("Password must not be blank"));
    }
    Ok(())
}

/// Map credential failures onto API responses.
///
/// The two expected rejections surface with their own messages; everything
/// else is logged and collapsed into a generic 500.
fn credential_error(error: CredentialError) -> ApiError {
    match error {
        CredentialError::DuplicateEmail | CredentialError::InvalidCredentials => {
            ApiError::bad_request(error.to_string())
        }
        other => {
            tracing::error!(error = %other, "credential flow failure");
            ApiError::internal("Internal server error")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::storage::StashDb;
    use axum::http::StatusCode;
    use std::time::Duration;
    use tempfile::TempDir;

    fn create_test_state() -> (AppState, TempDir) {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let db = StashDb::open(&temp_dir.path().join("test.redb")).expect("Failed to open db");
        let config = AppConfig {
            token_secret: "0123456789abcdef0123456789abcdef".to_string(),
            token_ttl: Duration::from_secs(3600),
            rate_limit: 100,
            rate_window: Duration::from_secs(3600),
            rate_key_cap: 10_000,
            scan_cap: 1000,
            data_dir: temp_dir.path().to_path_buf(),
            host: "127.0.0.1".to_string(),
            port: 0,
        };
        (AppState::new(config, db), temp_dir)
    }

    fn request(email: &str, password: &str) -> AuthRequest {
        AuthRequest {
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    #[tokio::test]
    async fn register_returns_a_usable_bearer_token() {
        let (state, _temp_dir) = create_test_state();

        let Json(response) = register(
            State(state.clone()),
            Json(request("alice@example.com", "hunter2hunter2")),
        )
        .await
        .expect("registration succeeds");

        assert_eq!(response.token_type, "Bearer");
        assert!(state.authenticator().resolve_principal(&response.token).is_ok());
    }

    #[tokio::test]
    async fn register_rejects_duplicate_email() {
        let (state, _temp_dir) = create_test_state();

        register(
            State(state.clone()),
            Json(request("alice@example.com", "hunter2hunter2")),
        )
        .await
        .expect("first registration succeeds");

        let error = register(
            State(state),
            Json(request("alice@example.com", "other-password")),
        )
        .await
        .expect_err("duplicate registration fails");

        assert_eq!(error.status, StatusCode::BAD_REQUEST);
        assert_eq!(error.message, "Email already in use");
    }

    #[tokio::test]
    async fn register_rejects_malformed_emails() {
        let (state, _temp_dir) = create_test_state();

        for email in ["", "   ", "no-at-sign", "@nodomain", "nolocal@", "has space@x"] {
            let error = register(State(state.clone()), Json(request(email, "password")))
                .await
                .expect_err("malformed email fails");
            assert_eq!(error.status, StatusCode::BAD_REQUEST, "email: {email:?}");
        }
    }

    #[tokio::test]
    async fn register_rejects_blank_passwords() {
        let (state, _temp_dir) = create_test_state();

        for password in ["", "   "] {
            let error = register(
                State(state.clone()),
                Json(request("alice@example.com", password)),
            )
            .await
            .expect_err("blank password fails");
            assert_eq!(error.status, StatusCode::BAD_REQUEST);
            assert_eq!(error.message, "Password must not be blank");
        }
    }

    #[tokio::test]
    async fn login_roundtrip_after_register() {
        let (state, _temp_dir) = create_test_state();

        register(
            State(state.clone()),
            Json(request("bob@example.com", "correct horse")),
        )
        .await
        .expect("registration succeeds");

        let Json(response) = login(
            State(state.clone()),
            Json(request("bob@example.com", "correct horse")),
        )
        .await
        .expect("login succeeds");

        assert_eq!(response.token_type, "Bearer");
        assert!(state.authenticator().resolve_principal(&response.token).is_ok());
    }

    #[tokio::test]
    async fn login_failures_share_one_generic_message() {
        let (state, _temp_dir) = create_test_state();

        register(
            State(state.clone()),
            Json(request("bob@example.com", "correct horse")),
        )
        .await
        .expect("registration succeeds");

        let wrong_password = login(
            State(state.clone()),
            Json(request("bob@example.com", "battery staple")),
        )
        .await
        .expect_err("wrong password fails");

        let unknown_email = login(
            State(state),
            Json(request("nobody@example.com", "correct horse")),
        )
        .await
        .expect_err("unknown email fails");

        assert_eq!(wrong_password.status, StatusCode::BAD_REQUEST);
        assert_eq!(unknown_email.status, StatusCode::BAD_REQUEST);
        assert_eq!(wrong_password.message, "Invalid email/password");
        assert_eq!(unknown_email.message, "Invalid email/password");
    }
}
