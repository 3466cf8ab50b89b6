// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Session issuance.
//!
//! The token-issuance boundary is where the fail-closed policy lives: a
//! resolution that yields zero roles or throws produces the all-empty
//! [`SessionClaims`], never a default role and never a partial session.
//!
//! Initial sign-in is additionally gated on account status (`active` or
//! `pending` only) and on holding at least one role; both gates are
//! independent of password correctness and render identically to the
//! caller.

use std::sync::Arc;

use argon2::password_hash::{rand_core::OsRng, SaltString};
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use serde::{Deserialize, Serialize};

use warden_access::CachedResolver;
use warden_core::error::{AuthError, AuthResult, StoreError};
use warden_core::types::UserId;
use warden_store::AccessStore;

use crate::auth::{JwtManager, SessionClaims};

// =============================================================================
// AuthPolicy
// =============================================================================

/// Issuance policy knobs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthPolicy {
    /// Role whose membership sets the `elevated` flag.
    pub elevated_role: String,
    /// Legacy `role` marker emitted for elevated users.
    pub elevated_marker: String,
    /// Legacy `role` marker emitted for ordinary users.
    pub ordinary_marker: String,
}

impl Default for AuthPolicy {
    fn default() -> Self {
        Self {
            elevated_role: "admin".to_string(),
            elevated_marker: "admin".to_string(),
            ordinary_marker: "user".to_string(),
        }
    }
}

// =============================================================================
// IssuedSession
// =============================================================================

/// The outcome of a successful login or refresh.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssuedSession {
    /// User ID.
    pub user_id: String,
    /// Signed access token.
    pub access_token: String,
    /// Signed refresh token.
    pub refresh_token: String,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
    /// The claims embedded in the access token.
    pub claims: SessionClaims,
}

// =============================================================================
// SessionIssuer
// =============================================================================

/// Issues session tokens on login and refresh.
#[derive(Clone)]
pub struct SessionIssuer {
    store: Arc<dyn AccessStore>,
    resolver: CachedResolver,
    jwt: Arc<JwtManager>,
    policy: AuthPolicy,
}

impl SessionIssuer {
    /// Creates a new issuer.
    pub fn new(
        store: Arc<dyn AccessStore>,
        resolver: CachedResolver,
        jwt: Arc<JwtManager>,
        policy: AuthPolicy,
    ) -> Self {
        Self {
            store,
            resolver,
            jwt,
            policy,
        }
    }

    /// Computes the session claims for a user, failing closed.
    ///
    /// - zero roles resolved: all-empty claims, no elevated flag, no
    ///   legacy marker;
    /// - resolution error (including an unknown user): logged without
    ///   identifying data, then the same all-empty claims.
    pub async fn issue_claims(&self, user_id: &UserId) -> SessionClaims {
        match self.resolver.resolve(user_id).await {
            Ok(access) if access.has_roles() => {
                let elevated = access.has_role(&self.policy.elevated_role);
                SessionClaims {
                    role_names: access.role_names(),
                    permission_names: access.permission_names(),
                    application_paths: access.application_paths(),
                    elevated,
                    role: Some(if elevated {
                        self.policy.elevated_marker.clone()
                    } else {
                        self.policy.ordinary_marker.clone()
                    }),
                }
            }
            Ok(_) => SessionClaims::empty(),
            Err(e) => {
                tracing::warn!(
                    error_type = e.error_type(),
                    "access resolution failed during issuance, failing closed"
                );
                SessionClaims::empty()
            }
        }
    }

    /// Authenticates a user by email and password and issues tokens.
    ///
    /// The returned error taxonomy is internal; the HTTP layer renders
    /// every variant as the same "login failed" answer.
    pub async fn authenticate(&self, email: &str, password: &str) -> AuthResult<IssuedSession> {
        let user = match self.store.find_user_by_email(email).await {
            Ok(user) => user,
            Err(StoreError::UserNotFound { .. }) => return Err(AuthError::InvalidCredentials),
            Err(e) => return Err(AuthError::Store(e)),
        };

        if !user.status.is_login_eligible() {
            return Err(AuthError::not_eligible(format!("status={}", user.status)));
        }

        verify_password(password, &user.password_hash)?;

        if !self.store.user_has_role(&user.id).await? {
            return Err(AuthError::not_eligible("zero roles"));
        }

        let claims = self.issue_claims(&user.id).await;
        let access_token =
            self.jwt
                .create_access_token(user.id.as_str(), Some(&user.email), claims.clone())?;
        let refresh_token = self.jwt.create_refresh_token(user.id.as_str())?;

        tracing::info!(user_id = %user.id, "session issued");

        Ok(IssuedSession {
            user_id: user.id.into_inner(),
            access_token,
            refresh_token,
            expires_in: self.jwt.expiration_secs(),
            claims,
        })
    }

    /// Redeems a refresh token for a fresh session.
    ///
    /// Claims are recomputed from the store: a user whose roles were
    /// revoked mid-session receives empty claims here, which is exactly
    /// the "lost access no later than the next refresh" guarantee. The
    /// refresh token itself is rotated.
    pub async fn refresh(&self, refresh_token: &str) -> AuthResult<IssuedSession> {
        let token_claims = self.jwt.validate_refresh_token(refresh_token)?;
        let user_id = UserId::new(token_claims.sub.clone());

        let claims = self.issue_claims(&user_id).await;
        let access_token =
            self.jwt
                .create_access_token(user_id.as_str(), token_claims.email.as_deref(), claims.clone())?;
        let refresh_token = self.jwt.create_refresh_token(user_id.as_str())?;

        tracing::debug!(user_id = %user_id, "session refreshed");

        Ok(IssuedSession {
            user_id: user_id.into_inner(),
            access_token,
            refresh_token,
            expires_in: self.jwt.expiration_secs(),
            claims,
        })
    }

    /// Returns the JWT manager.
    pub fn jwt(&self) -> &Arc<JwtManager> {
        &self.jwt
    }

    /// Returns the resolver.
    pub fn resolver(&self) -> &CachedResolver {
        &self.resolver
    }

    /// Returns the issuance policy.
    pub fn policy(&self) -> &AuthPolicy {
        &self.policy
    }
}

impl std::fmt::Debug for SessionIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionIssuer")
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Password helpers
// =============================================================================

/// Verifies a password against an Argon2 PHC hash.
fn verify_password(password: &str, hash: &str) -> AuthResult<()> {
    let parsed = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .map_err(|_| AuthError::InvalidCredentials)
}

/// Hashes a password with Argon2id for storage.
pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    Ok(Argon2::default()
        .hash_password(password.as_bytes(), &salt)?
        .to_string())
}

// =============================================================================
// Tests
// =============================================================================
