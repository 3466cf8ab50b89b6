// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Unified error hierarchy for WARDEN.
//!
//! This module defines the error type system for the access-control core:
//!
//! - Provides clear, descriptive error messages
//! - Supports error chaining for traceability
//! - Distinguishes between retryable and non-retryable errors
//! - Supports structured logging
//!
//! # Error Hierarchy
//!
//! ```text
//! WardenError (root)
//! ├── StoreError    - Access store queries and mutations
//! ├── BusError      - Event bus operations
//! └── AuthError     - Authentication and token issuance
//! ```
//!
//! The policy throughout is fail-closed: an authorization-data failure is
//! never allowed to widen privilege. The resolution layer propagates store
//! errors unchanged; only the token-issuance boundary converts them into
//! empty claims.

use thiserror::Error;

// =============================================================================
// WardenError - Root Error Type
// =============================================================================

/// The root error type for WARDEN.
///
/// All errors in WARDEN can be converted to this type, providing a unified
/// error handling interface across the entire system.
#[derive(Debug, Error)]
pub enum WardenError {
    /// Access store error.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Event bus error.
    #[error("Bus error: {0}")]
    Bus(#[from] BusError),

    /// Authentication error.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),
}

impl WardenError {
    /// Returns `true` if this error is retryable.
    pub fn is_retryable(&self) -> bool {
        match self {
            WardenError::Store(e) => e.is_retryable(),
            WardenError::Bus(e) => e.is_retryable(),
            WardenError::Auth(_) => false,
        }
    }

    /// Returns the error type as a string for logging/metrics.
    pub fn error_type(&self) -> &'static str {
        match self {
            WardenError::Store(_) => "store",
            WardenError::Bus(_) => "bus",
            WardenError::Auth(_) => "auth",
        }
    }

    /// Returns a user-friendly error message.
    ///
    /// This message is suitable for display to end users and avoids
    /// exposing internal implementation details.
    pub fn user_message(&self) -> String {
        match self {
            WardenError::Store(e) => e.user_message(),
            WardenError::Bus(_) => "내부 통신 오류가 발생했습니다".to_string(),
            WardenError::Auth(e) => e.user_message(),
        }
    }
}

// =============================================================================
// StoreError
// =============================================================================

/// Errors raised by the access store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The requested user does not exist.
    ///
    /// A missing user is an error, not an empty result; the caller decides
    /// whether to fail closed.
    #[error("User not found: {user_id}")]
    UserNotFound {
        /// The missing user ID.
        user_id: String,
    },

    /// The requested role does not exist.
    #[error("Role not found: {role_id}")]
    RoleNotFound {
        /// The missing role ID.
        role_id: String,
    },

    /// The requested permission does not exist.
    #[error("Permission not found: {permission_id}")]
    PermissionNotFound {
        /// The missing permission ID.
        permission_id: String,
    },

    /// The requested application does not exist.
    #[error("Application not found: {application_id}")]
    ApplicationNotFound {
        /// The missing application ID.
        application_id: String,
    },

    /// A uniqueness constraint was violated.
    #[error("Conflict: {message}")]
    Conflict {
        /// Error message.
        message: String,
    },

    /// The store is unreachable or an I/O failure occurred.
    #[error("Store unavailable: {message}")]
    Unavailable {
        /// Error message.
        message: String,
        /// Underlying error.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl StoreError {
    /// Creates a user not found error.
    pub fn user_not_found(user_id: impl Into<String>) -> Self {
        Self::UserNotFound {
            user_id: user_id.into(),
        }
    }

    /// Creates a role not found error.
    pub fn role_not_found(role_id: impl Into<String>) -> Self {
        Self::RoleNotFound {
            role_id: role_id.into(),
        }
    }

    /// Creates a permission not found error.
    pub fn permission_not_found(permission_id: impl Into<String>) -> Self {
        Self::PermissionNotFound {
            permission_id: permission_id.into(),
        }
    }

    /// Creates an application not found error.
    pub fn application_not_found(application_id: impl Into<String>) -> Self {
        Self::ApplicationNotFound {
            application_id: application_id.into(),
        }
    }

    /// Creates a conflict error.
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    /// Creates an unavailable error.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
            source: None,
        }
    }

    /// Creates an unavailable error with a source.
    pub fn unavailable_with<E>(message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Unavailable {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Returns `true` if this error is retryable.
    pub fn is_retryable(&self) -> bool {
        matches!(self, StoreError::Unavailable { .. })
    }

    /// Returns the error type for logging/metrics.
    pub fn error_type(&self) -> &'static str {
        match self {
            StoreError::UserNotFound { .. } => "user_not_found",
            StoreError::RoleNotFound { .. } => "role_not_found",
            StoreError::PermissionNotFound { .. } => "permission_not_found",
            StoreError::ApplicationNotFound { .. } => "application_not_found",
            StoreError::Conflict { .. } => "conflict",
            StoreError::Unavailable { .. } => "unavailable",
        }
    }

    /// Returns a user-friendly error message.
    pub fn user_message(&self) -> String {
        match self {
            StoreError::UserNotFound { .. } => "사용자를 찾을 수 없습니다".to_string(),
            StoreError::RoleNotFound { .. } => "역할을 찾을 수 없습니다".to_string(),
            StoreError::PermissionNotFound { .. } => "권한을 찾을 수 없습니다".to_string(),
            StoreError::ApplicationNotFound { .. } => {
                "애플리케이션을 찾을 수 없습니다".to_string()
            }
            StoreError::Conflict { message } => format!("중복된 항목입니다: {}", message),
            StoreError::Unavailable { .. } => "저장소에 연결할 수 없습니다".to_string(),
        }
    }
}

// =============================================================================
// BusError
// =============================================================================

/// Event bus errors.
#[derive(Debug, Error)]
pub enum BusError {
    /// Broadcast channel is closed.
    #[error("Channel is closed")]
    Closed,

    /// Subscriber lagged behind.
    #[error("Subscriber lagged by {count} events")]
    Lagged {
        /// Number of missed events.
        count: u64,
    },

    /// The bus has been shut down; no further events are accepted.
    #[error("Event bus is shut down")]
    ShutDown,
}

impl BusError {
    /// Creates a lagged error.
    pub fn lagged(count: u64) -> Self {
        Self::Lagged { count }
    }

    /// Returns `true` if this error is retryable.
    pub fn is_retryable(&self) -> bool {
        matches!(self, BusError::Lagged { .. })
    }

    /// Returns the error type for logging/metrics.
    pub fn error_type(&self) -> &'static str {
        match self {
            BusError::Closed => "closed",
            BusError::Lagged { .. } => "lagged",
            BusError::ShutDown => "shut_down",
        }
    }
}

// =============================================================================
// AuthError
// =============================================================================

/// Authentication and token issuance errors.
///
/// `InvalidCredentials` and `AccountNotEligible` are distinct in the
/// taxonomy but render identically at the HTTP boundary so login failures
/// cannot be used for account enumeration.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Unknown account or wrong password.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// The account exists but may not sign in (bad status or zero roles).
    #[error("Account not eligible: {reason}")]
    AccountNotEligible {
        /// Internal reason; never rendered to the caller.
        reason: String,
    },

    /// Token signing failed.
    #[error("Token creation failed: {message}")]
    TokenCreation {
        /// Error message.
        message: String,
    },

    /// Token validation failed (expired, malformed, bad signature, ...).
    #[error("Invalid token: {message}")]
    TokenInvalid {
        /// Error message.
        message: String,
    },

    /// Store failure during login. Renders the same as a rejected login.
    #[error("Store error during authentication: {0}")]
    Store(#[from] StoreError),
}

impl AuthError {
    /// Creates an account not eligible error.
    pub fn not_eligible(reason: impl Into<String>) -> Self {
        Self::AccountNotEligible {
            reason: reason.into(),
        }
    }

    /// Creates a token creation error.
    pub fn token_creation(message: impl Into<String>) -> Self {
        Self::TokenCreation {
            message: message.into(),
        }
    }

    /// Creates a token invalid error.
    pub fn token_invalid(message: impl Into<String>) -> Self {
        Self::TokenInvalid {
            message: message.into(),
        }
    }

    /// Returns the error type for logging/metrics.
    pub fn error_type(&self) -> &'static str {
        match self {
            AuthError::InvalidCredentials => "invalid_credentials",
            AuthError::AccountNotEligible { .. } => "account_not_eligible",
            AuthError::TokenCreation { .. } => "token_creation",
            AuthError::TokenInvalid { .. } => "token_invalid",
            AuthError::Store(_) => "store",
        }
    }

    /// Returns a user-friendly error message.
    ///
    /// All login-failure variants produce the same message so that callers
    /// cannot distinguish a wrong password from an ineligible account.
    pub fn user_message(&self) -> String {
        match self {
            AuthError::InvalidCredentials
            | AuthError::AccountNotEligible { .. }
            | AuthError::Store(_) => "로그인에 실패했습니다".to_string(),
            AuthError::TokenCreation { .. } => "토큰 발급에 실패했습니다".to_string(),
            AuthError::TokenInvalid { .. } => "유효하지 않은 토큰입니다".to_string(),
        }
    }
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// A Result type with WardenError.
pub type WardenResult<T> = Result<T, WardenError>;

/// A Result type with StoreError.
pub type StoreResult<T> = Result<T, StoreError>;

/// A Result type with BusError.
pub type BusResult<T> = Result<T, BusError>;

/// A Result type with AuthError.
pub type AuthResult<T> = Result<T, AuthError>;

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_error_retryable() {
        assert!(StoreError::unavailable("connection reset").is_retryable());
        assert!(!StoreError::user_not_found("u1").is_retryable());
        assert!(!StoreError::conflict("duplicate role name").is_retryable());
    }

    #[test]
    fn test_warden_error_conversion() {
        let store_error = StoreError::unavailable("timeout");
        let warden_error: WardenError = store_error.into();

        assert!(warden_error.is_retryable());
        assert_eq!(warden_error.error_type(), "store");
    }

    #[test]
    fn test_auth_error_messages_indistinguishable() {
        let wrong_password = AuthError::InvalidCredentials;
        let suspended = AuthError::not_eligible("status=suspended");
        let outage = AuthError::Store(StoreError::unavailable("down"));

        assert_eq!(wrong_password.user_message(), suspended.user_message());
        assert_eq!(wrong_password.user_message(), outage.user_message());
    }

    #[test]
    fn test_auth_error_types_distinct() {
        assert_eq!(AuthError::InvalidCredentials.error_type(), "invalid_credentials");
        assert_eq!(
            AuthError::not_eligible("zero roles").error_type(),
            "account_not_eligible"
        );
        assert_eq!(
            AuthError::Store(StoreError::unavailable("down")).error_type(),
            "store"
        );
    }

    #[test]
    fn test_bus_error_retryable() {
        assert!(BusError::lagged(3).is_retryable());
        assert!(!BusError::ShutDown.is_retryable());
        assert!(!BusError::Closed.is_retryable());
    }
}
