// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Custom extractors for API handlers.

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::auth::Session;
use crate::error::ApiError;

// =============================================================================
// Auth Extractor
// =============================================================================

/// Extractor for authenticated requests.
///
/// Extracts the [`Session`] from the request extensions. Returns 401 if
/// the user is not authenticated.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(Auth(session): Auth) -> impl IntoResponse {
///     format!("Hello, {}", session.user_id)
/// }
/// ```
pub struct Auth(pub Session);

impl<S> FromRequestParts<S> for Auth
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Session>()
            .cloned()
            .filter(|session| !session.is_anonymous())
            .map(Auth)
            .ok_or_else(|| ApiError::unauthorized("Authentication required"))
    }
}

// =============================================================================
// Optional Auth Extractor
// =============================================================================

/// Extractor for optionally authenticated requests.
///
/// Yields `None` for unauthenticated requests instead of rejecting them.
pub struct OptionalAuth(pub Option<Session>);

impl<S> FromRequestParts<S> for OptionalAuth
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let session = parts
            .extensions
            .get::<Session>()
            .cloned()
            .filter(|session| !session.is_anonymous());
        Ok(OptionalAuth(session))
    }
}
