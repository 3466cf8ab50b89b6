// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Per-request session.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Claims, SessionClaims};

/// The authenticated (or anonymous) session attached to a request.
///
/// Built by the auth middleware from a validated access token and read by
/// the permission-check facade and handlers. An anonymous session carries
/// the all-empty claims, so every facade check fails closed on it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// User ID (`"anonymous"` for unauthenticated requests).
    pub user_id: String,
    /// User's email, if the token carried one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Embedded authorization data.
    pub claims: SessionClaims,
    /// Request ID for tracing.
    pub request_id: Uuid,
}

impl Session {
    /// Creates a session from validated token claims.
    pub fn from_claims(claims: &Claims) -> Self {
        Self {
            user_id: claims.sub.clone(),
            email: claims.email.clone(),
            claims: claims.access.clone(),
            request_id: Uuid::now_v7(),
        }
    }

    /// Creates an anonymous session (for unauthenticated requests).
    pub fn anonymous() -> Self {
        Self {
            user_id: "anonymous".to_string(),
            email: None,
            claims: SessionClaims::empty(),
            request_id: Uuid::now_v7(),
        }
    }

    /// Returns `true` if this is an anonymous session.
    pub fn is_anonymous(&self) -> bool {
        self.user_id == "anonymous"
    }

    /// Returns the embedded claims, or `None` when anonymous.
    ///
    /// This is the shape the permission-check facade consumes: absence
    /// means "not logged in" and every predicate denies.
    pub fn access(&self) -> Option<&SessionClaims> {
        if self.is_anonymous() {
            None
        } else {
            Some(&self.claims)
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::anonymous()
    }
}

// =============================================================================
// Tests
// =============================================================================
