// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! API error types and handling.
//!
//! This module provides an error type that maps to HTTP status codes and
//! JSON error responses. Authentication failures are deliberately
//! collapsed into a single uniform answer at this boundary; see
//! [`ApiError::from`] for [`AuthError`].

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use warden_core::error::{AuthError, BusError, StoreError, WardenError};

/// Result type alias for API operations.
pub type ApiResult<T> = Result<T, ApiError>;

// =============================================================================
// ApiError
// =============================================================================

/// API error type with HTTP status code mapping.
///
/// This error type is designed to be returned from handlers and
/// automatically converted to appropriate HTTP responses.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Resource not found (404).
    #[error("Resource not found: {resource}")]
    NotFound {
        /// The resource that was not found.
        resource: String,
    },

    /// Bad request (400).
    #[error("Bad request: {message}")]
    BadRequest {
        /// Error message.
        message: String,
    },

    /// Unauthorized (401).
    #[error("Unauthorized: {message}")]
    Unauthorized {
        /// Error message.
        message: String,
    },

    /// Forbidden (403).
    #[error("Forbidden: {message}")]
    Forbidden {
        /// Error message.
        message: String,
        /// Missing permission names, when a permission check failed.
        missing: Vec<String>,
    },

    /// Conflict (409).
    #[error("Conflict: {message}")]
    Conflict {
        /// Error message.
        message: String,
    },

    /// Validation error (422).
    #[error("Validation error: {message}")]
    Validation {
        /// Error message.
        message: String,
    },

    /// Service unavailable (503).
    #[error("Service unavailable: {message}")]
    ServiceUnavailable {
        /// Error message.
        message: String,
    },

    /// Internal server error (500).
    #[error("Internal error: {message}")]
    Internal {
        /// Error message (for logging, not user-facing).
        message: String,
    },
}

impl ApiError {
    /// Creates a not found error.
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
        }
    }

    /// Creates a bad request error.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
        }
    }

    /// Creates an unauthorized error.
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized {
            message: message.into(),
        }
    }

    /// Creates a forbidden error.
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden {
            message: message.into(),
            missing: Vec::new(),
        }
    }

    /// Creates a forbidden error listing the missing permissions.
    pub fn forbidden_missing(message: impl Into<String>, missing: Vec<String>) -> Self {
        Self::Forbidden {
            message: message.into(),
            missing,
        }
    }

    /// Creates a conflict error.
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Creates a service unavailable error.
    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::ServiceUnavailable {
            message: message.into(),
        }
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Returns the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden { .. } => StatusCode::FORBIDDEN,
            ApiError::Conflict { .. } => StatusCode::CONFLICT,
            ApiError::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::ServiceUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

// =============================================================================
// Error Body
// =============================================================================

/// JSON body rendered for error responses.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Always `false`.
    pub success: bool,
    /// Error message.
    pub error: String,
    /// Missing permission names, for failed permission checks.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub missing: Option<Vec<String>>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let (error, missing) = match &self {
            ApiError::Forbidden { message, missing } if !missing.is_empty() => {
                (message.clone(), Some(missing.clone()))
            }
            // Internal detail stays in the logs.
            ApiError::Internal { message } => {
                tracing::error!(message = %message, "internal API error");
                ("Internal server error".to_string(), None)
            }
            other => (other.to_string(), None),
        };

        let body = ErrorBody {
            success: false,
            error,
            missing,
        };

        (status, Json(body)).into_response()
    }
}

// =============================================================================
// Conversions
// =============================================================================

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            // One uniform answer for every login-failure shape, so the
            // response cannot be used for account enumeration.
            AuthError::InvalidCredentials
            | AuthError::AccountNotEligible { .. }
            | AuthError::Store(_) => {
                tracing::info!(error_type = err.error_type(), "login rejected");
                ApiError::unauthorized("Login failed")
            }
            AuthError::TokenInvalid { .. } => {
                ApiError::unauthorized("Invalid or expired token")
            }
            AuthError::TokenCreation { message } => ApiError::internal(message),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::UserNotFound { .. } => ApiError::not_found("user"),
            StoreError::RoleNotFound { .. } => ApiError::not_found("role"),
            StoreError::PermissionNotFound { .. } => ApiError::not_found("permission"),
            StoreError::ApplicationNotFound { .. } => ApiError::not_found("application"),
            StoreError::Conflict { message } => ApiError::conflict(message),
            StoreError::Unavailable { message, .. } => ApiError::service_unavailable(message),
        }
    }
}

impl From<BusError> for ApiError {
    fn from(err: BusError) -> Self {
        ApiError::service_unavailable(err.to_string())
    }
}

impl From<WardenError> for ApiError {
    fn from(err: WardenError) -> Self {
        match err {
            WardenError::Store(e) => e.into(),
            WardenError::Bus(e) => e.into(),
            WardenError::Auth(e) => e.into(),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(ApiError::not_found("user").status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            ApiError::unauthorized("no").status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(ApiError::forbidden("no").status_code(), StatusCode::FORBIDDEN);
        assert_eq!(
            ApiError::validation("bad").status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            ApiError::service_unavailable("down").status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn test_login_failures_render_uniformly() {
        let from_password: ApiError = AuthError::InvalidCredentials.into();
        let from_status: ApiError = AuthError::not_eligible("status=banned").into();
        let from_outage: ApiError = AuthError::Store(StoreError::unavailable("down")).into();

        for err in [&from_password, &from_status, &from_outage] {
            match err {
                ApiError::Unauthorized { message } => assert_eq!(message, "Login failed"),
                other => panic!("expected Unauthorized, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_store_error_mapping() {
        let err: ApiError = StoreError::user_not_found("u1").into();
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);

        let err: ApiError = StoreError::unavailable("down").into();
        assert_eq!(err.status_code(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
