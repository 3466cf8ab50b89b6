// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! JWT claims structure.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// =============================================================================
// SessionClaims
// =============================================================================

/// The authorization data embedded in an access token.
///
/// This is a fixed, tagged shape: downstream guards get compile-time
/// field guarantees instead of duck-typed optional claims. The invariant:
/// unless resolution found at least one role, every collection is empty,
/// `elevated` is `false`, and the legacy `role` marker is absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Names of the roles the user holds.
    #[serde(default)]
    pub role_names: Vec<String>,
    /// Names of the user's effective permissions.
    #[serde(default)]
    pub permission_names: Vec<String>,
    /// Paths of the active applications the user may access.
    #[serde(default)]
    pub application_paths: Vec<String>,
    /// Whether the user holds the designated elevated role.
    #[serde(default)]
    pub elevated: bool,
    /// Legacy singular role marker for coarse checks.
    ///
    /// Only ever set when at least one role exists.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

impl SessionClaims {
    /// The all-empty claims used for fail-closed fallback.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Returns `true` if no authorization data is present.
    pub fn is_empty(&self) -> bool {
        self.role_names.is_empty()
            && self.permission_names.is_empty()
            && self.application_paths.is_empty()
            && !self.elevated
            && self.role.is_none()
    }

    /// Returns `true` if the claims carry the named role.
    pub fn has_role(&self, name: &str) -> bool {
        self.role_names.iter().any(|r| r == name)
    }

    /// Returns `true` if the claims carry the named permission.
    pub fn has_permission(&self, name: &str) -> bool {
        self.permission_names.iter().any(|p| p == name)
    }

    /// Returns `true` if the claims carry the application path.
    pub fn has_application_path(&self, path: &str) -> bool {
        self.application_paths.iter().any(|p| p == path)
    }
}

// =============================================================================
// TokenKind
// =============================================================================

/// Discriminates access tokens from refresh tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    /// Short-lived token carrying session claims.
    Access,
    /// Long-lived token used only to mint new access tokens.
    Refresh,
}

impl TokenKind {
    /// Returns the kind as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenKind::Access => "access",
            TokenKind::Refresh => "refresh",
        }
    }
}

// =============================================================================
// Claims
// =============================================================================

/// JWT claims for authentication.
///
/// These claims are embedded in the JWT token and extracted during
/// authentication.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    // =========================================================================
    // Standard JWT Claims (RFC 7519)
    // =========================================================================
    /// Subject - the user ID.
    pub sub: String,

    /// Expiration time (Unix timestamp).
    pub exp: i64,

    /// Issued at time (Unix timestamp).
    pub iat: i64,

    /// Not before time (Unix timestamp).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nbf: Option<i64>,

    /// Issuer.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,

    /// JWT ID.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jti: Option<String>,

    // =========================================================================
    // Custom Claims
    // =========================================================================
    /// Token kind.
    pub kind: TokenKind,

    /// User's email.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// Embedded authorization data.
    #[serde(flatten)]
    pub access: SessionClaims,
}

impl Claims {
    /// Creates new claims for a user.
    pub fn new(
        user_id: impl Into<String>,
        kind: TokenKind,
        access: SessionClaims,
        expires_in_secs: i64,
    ) -> Self {
        let now = Utc::now().timestamp();

        Self {
            sub: user_id.into(),
            exp: now + expires_in_secs,
            iat: now,
            nbf: Some(now),
            iss: None,
            jti: Some(Uuid::now_v7().to_string()),
            kind,
            email: None,
            access,
        }
    }

    /// Returns the user ID.
    pub fn user_id(&self) -> &str {
        &self.sub
    }

    /// Returns `true` if the token has expired.
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() > self.exp
    }

    /// Returns the expiration time as a DateTime.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.exp, 0)
    }

    /// Returns `true` if the claims carry the named role.
    pub fn has_role(&self, role: &str) -> bool {
        self.access.has_role(role)
    }

    /// Sets the issuer.
    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.iss = Some(issuer.into());
        self
    }

    /// Sets the user's email.
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_session() -> SessionClaims {
        SessionClaims {
            role_names: vec!["admin".to_string()],
            permission_names: vec!["users:read".to_string()],
            application_paths: vec!["/admin".to_string()],
            elevated: true,
            role: Some("admin".to_string()),
        }
    }

    #[test]
    fn test_claims_creation() {
        let claims = Claims::new("user123", TokenKind::Access, sample_session(), 3600);

        assert_eq!(claims.user_id(), "user123");
        assert!(claims.has_role("admin"));
        assert!(!claims.has_role("guest"));
        assert!(!claims.is_expired());
        assert_eq!(claims.kind, TokenKind::Access);
    }

    #[test]
    fn test_empty_session_claims() {
        let empty = SessionClaims::empty();

        assert!(empty.is_empty());
        assert!(!empty.elevated);
        assert!(empty.role.is_none());
        assert!(!empty.has_role("admin"));
        assert!(!empty.has_permission("users:read"));
        assert!(!empty.has_application_path("/admin"));
    }

    #[test]
    fn test_session_claims_flattened_into_token() {
        let claims = Claims::new("u1", TokenKind::Access, sample_session(), 3600);
        let json = serde_json::to_value(&claims).unwrap();

        // Flattened: no nested "access" object.
        assert!(json.get("access").is_none());
        assert_eq!(json["role_names"][0], "admin");
        assert_eq!(json["elevated"], true);
        assert_eq!(json["role"], "admin");
    }

    #[test]
    fn test_empty_claims_omit_role_marker() {
        let claims = Claims::new("u1", TokenKind::Access, SessionClaims::empty(), 3600);
        let json = serde_json::to_value(&claims).unwrap();

        assert!(json.get("role").is_none());
        assert_eq!(json["role_names"].as_array().unwrap().len(), 0);
    }

    #[test]
    fn test_claims_roundtrip() {
        let claims = Claims::new("u1", TokenKind::Refresh, SessionClaims::empty(), 60);
        let json = serde_json::to_string(&claims).unwrap();
        let back: Claims = serde_json::from_str(&json).unwrap();

        assert_eq!(back.sub, "u1");
        assert_eq!(back.kind, TokenKind::Refresh);
        assert!(back.access.is_empty());
    }
}
