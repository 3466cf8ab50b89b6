// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Authentication handlers.

use axum::{extract::State, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ApiResult};
use crate::extractors::Auth;
use crate::response::AuthResponse;
use crate::state::AppState;

// =============================================================================
// Login
// =============================================================================

/// Login request body.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Login email.
    pub email: String,
    /// Password.
    pub password: String,
}

/// POST /api/v1/auth/login
///
/// Authenticates a user and returns access and refresh tokens. Every
/// rejection (wrong password, unknown account, ineligible status, zero
/// roles, store outage) renders as the same 401.
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> ApiResult<impl IntoResponse> {
    if request.email.is_empty() || request.password.is_empty() {
        return Err(ApiError::bad_request("Email and password are required"));
    }

    let session = state
        .issuer()
        .authenticate(&request.email, &request.password)
        .await?;

    tracing::info!(user_id = %session.user_id, "user logged in");

    Ok(Json(
        AuthResponse::new(session.access_token, session.expires_in)
            .with_refresh_token(session.refresh_token),
    ))
}

// =============================================================================
// Refresh Token
// =============================================================================

/// Refresh token request body.
#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    /// Refresh token.
    pub refresh_token: String,
}

/// POST /api/v1/auth/refresh
///
/// Redeems a refresh token for a fresh access token. Claims are
/// recomputed from the store, so revoked roles disappear here.
pub async fn refresh_token(
    State(state): State<AppState>,
    Json(request): Json<RefreshRequest>,
) -> ApiResult<impl IntoResponse> {
    let session = state
        .issuer()
        .refresh(&request.refresh_token)
        .await
        .map_err(|_| ApiError::unauthorized("Invalid or expired refresh token"))?;

    tracing::debug!(user_id = %session.user_id, "token refreshed");

    Ok(Json(
        AuthResponse::new(session.access_token, session.expires_in)
            .with_refresh_token(session.refresh_token),
    ))
}

// =============================================================================
// Logout
// =============================================================================

/// POST /api/v1/auth/logout
///
/// Logs out the current user. Tokens are stateless; the client discards
/// them and the short access-token lifetime bounds the remaining window.
pub async fn logout(Auth(session): Auth) -> ApiResult<impl IntoResponse> {
    tracing::info!(user_id = %session.user_id, "user logged out");

    Ok(Json(serde_json::json!({
        "success": true,
        "message": "Logged out successfully"
    })))
}

// =============================================================================
// Current User
// =============================================================================

/// Current user response.
#[derive(Debug, Serialize)]
pub struct CurrentUserResponse {
    /// User ID.
    pub user_id: String,
    /// User's email.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Role names from the session.
    pub role_names: Vec<String>,
    /// Permission names from the session.
    pub permission_names: Vec<String>,
    /// Active application paths from the session.
    pub application_paths: Vec<String>,
    /// Whether the session is elevated.
    pub elevated: bool,
}

/// GET /api/v1/auth/me
///
/// Returns the claims of the currently authenticated session.
pub async fn current_user(Auth(session): Auth) -> ApiResult<impl IntoResponse> {
    Ok(Json(CurrentUserResponse {
        user_id: session.user_id,
        email: session.email,
        role_names: session.claims.role_names,
        permission_names: session.claims.permission_names,
        application_paths: session.claims.application_paths,
        elevated: session.claims.elevated,
    }))
}
