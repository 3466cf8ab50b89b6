// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! JWT token management.

use std::sync::Arc;
use std::time::Duration;

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use warden_core::error::{AuthError, AuthResult};

use super::{Claims, SessionClaims, TokenKind};

// =============================================================================
// JwtConfig
// =============================================================================

/// JWT configuration.
///
/// Tokens are signed with HS256.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct JwtConfig {
    /// Secret key for signing tokens.
    #[serde(skip_serializing)]
    pub secret: String,
    /// Token issuer.
    pub issuer: String,
    /// Access token expiration time in seconds.
    pub expiration_secs: i64,
    /// Refresh token expiration time in seconds.
    pub refresh_expiration_secs: i64,
    /// Clock skew tolerance in seconds.
    pub leeway_secs: u64,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: String::new(), // Must be set by user
            issuer: "warden".to_string(),
            expiration_secs: 3600,              // 1 hour
            refresh_expiration_secs: 86400 * 7, // 7 days
            leeway_secs: 60,
        }
    }
}

impl JwtConfig {
    /// Creates a new configuration with the given secret.
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            ..Default::default()
        }
    }

    /// Sets the issuer.
    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = issuer.into();
        self
    }

    /// Sets the access token expiration time.
    pub fn with_expiration(mut self, duration: Duration) -> Self {
        self.expiration_secs = duration.as_secs() as i64;
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> AuthResult<()> {
        if self.secret.is_empty() {
            return Err(AuthError::token_creation("JWT secret is not configured"));
        }
        if self.secret.len() < 32 {
            tracing::warn!("JWT secret is shorter than recommended (32 bytes)");
        }
        Ok(())
    }
}

// =============================================================================
// JwtManager
// =============================================================================

/// Manager for JWT token operations.
///
/// This is the central component for creating, validating, and decoding
/// session tokens.
#[derive(Clone)]
pub struct JwtManager {
    config: Arc<JwtConfig>,
    encoding_key: Arc<EncodingKey>,
    decoding_key: Arc<DecodingKey>,
    validation: Arc<Validation>,
}

impl JwtManager {
    /// Creates a new JWT manager with the given configuration.
    pub fn new(config: JwtConfig) -> AuthResult<Self> {
        config.validate()?;

        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());

        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&config.issuer]);
        validation.leeway = config.leeway_secs;
        validation.validate_aud = false;

        Ok(Self {
            config: Arc::new(config),
            encoding_key: Arc::new(encoding_key),
            decoding_key: Arc::new(decoding_key),
            validation: Arc::new(validation),
        })
    }

    /// Signs the given claims.
    pub fn create_token(&self, claims: &Claims) -> AuthResult<String> {
        let header = Header::new(Algorithm::HS256);

        encode(&header, claims, &self.encoding_key)
            .map_err(|e| AuthError::token_creation(format!("Failed to create token: {}", e)))
    }

    /// Creates an access token carrying the given session claims.
    pub fn create_access_token(
        &self,
        user_id: &str,
        email: Option<&str>,
        access: SessionClaims,
    ) -> AuthResult<String> {
        let mut claims = Claims::new(user_id, TokenKind::Access, access, self.config.expiration_secs)
            .with_issuer(&self.config.issuer);
        if let Some(email) = email {
            claims = claims.with_email(email);
        }

        self.create_token(&claims)
    }

    /// Creates a refresh token for a user.
    ///
    /// Refresh tokens never carry authorization data; the claims are
    /// recomputed when the token is redeemed.
    pub fn create_refresh_token(&self, user_id: &str) -> AuthResult<String> {
        let claims = Claims::new(
            user_id,
            TokenKind::Refresh,
            SessionClaims::empty(),
            self.config.refresh_expiration_secs,
        )
        .with_issuer(&self.config.issuer);

        self.create_token(&claims)
    }

    /// Validates and decodes a token of any kind.
    pub fn validate_token(&self, token: &str) -> AuthResult<Claims> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                    AuthError::token_invalid("Token has expired")
                }
                jsonwebtoken::errors::ErrorKind::InvalidToken => {
                    AuthError::token_invalid("Invalid token format")
                }
                jsonwebtoken::errors::ErrorKind::InvalidSignature => {
                    AuthError::token_invalid("Invalid token signature")
                }
                jsonwebtoken::errors::ErrorKind::InvalidIssuer => {
                    AuthError::token_invalid("Invalid token issuer")
                }
                _ => AuthError::token_invalid(format!("Token validation failed: {}", e)),
            })
    }

    /// Validates a token and requires it to be an access token.
    pub fn validate_access_token(&self, token: &str) -> AuthResult<Claims> {
        let claims = self.validate_token(token)?;
        if claims.kind != TokenKind::Access {
            return Err(AuthError::token_invalid("Not an access token"));
        }
        Ok(claims)
    }

    /// Validates a token and requires it to be a refresh token.
    pub fn validate_refresh_token(&self, token: &str) -> AuthResult<Claims> {
        let claims = self.validate_token(token)?;
        if claims.kind != TokenKind::Refresh {
            return Err(AuthError::token_invalid("Not a refresh token"));
        }
        Ok(claims)
    }

    /// Returns the access token expiration time in seconds.
    pub fn expiration_secs(&self) -> i64 {
        self.config.expiration_secs
    }

    /// Returns the refresh token expiration time in seconds.
    pub fn refresh_expiration_secs(&self) -> i64 {
        self.config.refresh_expiration_secs
    }
}

impl std::fmt::Debug for JwtManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtManager")
            .field("issuer", &self.config.issuer)
            .field("expiration_secs", &self.config.expiration_secs)
            .finish()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> JwtConfig {
        JwtConfig::new("test-secret-key-that-is-long-enough-for-testing")
    }

    fn sample_session() -> SessionClaims {
        SessionClaims {
            role_names: vec!["admin".to_string()],
            permission_names: vec!["users:read".to_string()],
            application_paths: vec![],
            elevated: true,
            role: Some("admin".to_string()),
        }
    }

    #[test]
    fn test_create_and_validate_access_token() {
        let manager = JwtManager::new(test_config()).unwrap();

        let token = manager
            .create_access_token("user123", Some("admin@example.com"), sample_session())
            .unwrap();

        let claims = manager.validate_access_token(&token).unwrap();

        assert_eq!(claims.sub, "user123");
        assert_eq!(claims.email.as_deref(), Some("admin@example.com"));
        assert!(claims.has_role("admin"));
        assert!(claims.access.elevated);
    }

    #[test]
    fn test_refresh_token_carries_no_claims() {
        let manager = JwtManager::new(test_config()).unwrap();

        let token = manager.create_refresh_token("user123").unwrap();
        let claims = manager.validate_refresh_token(&token).unwrap();

        assert_eq!(claims.kind, TokenKind::Refresh);
        assert!(claims.access.is_empty());
    }

    #[test]
    fn test_access_token_rejected_as_refresh() {
        let manager = JwtManager::new(test_config()).unwrap();

        let token = manager
            .create_access_token("user123", None, SessionClaims::empty())
            .unwrap();

        assert!(manager.validate_refresh_token(&token).is_err());
        assert!(manager.validate_access_token(&token).is_ok());
    }

    #[test]
    fn test_expired_token() {
        let manager = JwtManager::new(test_config()).unwrap();

        // Create a token with negative expiration (already expired, beyond
        // the 60s leeway).
        let claims = Claims::new("user", TokenKind::Access, SessionClaims::empty(), -3600)
            .with_issuer("warden");
        let token = manager.create_token(&claims).unwrap();

        assert!(manager.validate_token(&token).is_err());
    }

    #[test]
    fn test_wrong_secret() {
        let manager1 = JwtManager::new(JwtConfig::new("secret-one-for-testing-purposes")).unwrap();
        let manager2 = JwtManager::new(JwtConfig::new("secret-two-for-testing-purposes")).unwrap();

        let token = manager1
            .create_access_token("user", None, SessionClaims::empty())
            .unwrap();

        assert!(manager2.validate_token(&token).is_err());
    }

    #[test]
    fn test_missing_secret_rejected() {
        let config = JwtConfig::default();
        assert!(JwtManager::new(config).is_err());
    }
}
