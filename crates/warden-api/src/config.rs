// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! API server configuration.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::auth::JwtConfig;
use crate::error::{ApiError, ApiResult};
use crate::issuer::AuthPolicy;

// =============================================================================
// ApiConfig
// =============================================================================

/// Configuration for the API server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Server host address.
    pub host: IpAddr,
    /// Server port.
    pub port: u16,
    /// JWT configuration.
    pub jwt: JwtConfig,
    /// Issuance policy.
    pub auth: AuthPolicy,
    /// Broadcast capacity of the event bus.
    pub bus_capacity: usize,
    /// Capacity bound of the resolution cache.
    pub cache_capacity: usize,
    /// Request timeout.
    #[serde(with = "humantime_serde")]
    pub request_timeout: Duration,
    /// Graceful shutdown timeout.
    #[serde(with = "humantime_serde")]
    pub shutdown_timeout: Duration,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0)),
            port: 8080,
            jwt: JwtConfig::default(),
            auth: AuthPolicy::default(),
            bus_capacity: 256,
            cache_capacity: warden_core::cache::DEFAULT_CACHE_CAPACITY,
            request_timeout: Duration::from_secs(30),
            shutdown_timeout: Duration::from_secs(30),
        }
    }
}

impl ApiConfig {
    /// Creates a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the socket address to bind to.
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Sets the host address.
    pub fn with_host(mut self, host: IpAddr) -> Self {
        self.host = host;
        self
    }

    /// Sets the port.
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Sets the JWT configuration.
    pub fn with_jwt(mut self, jwt: JwtConfig) -> Self {
        self.jwt = jwt;
        self
    }

    /// Sets the issuance policy.
    pub fn with_auth(mut self, auth: AuthPolicy) -> Self {
        self.auth = auth;
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> ApiResult<()> {
        if self.jwt.secret.is_empty() {
            return Err(ApiError::validation("jwt.secret must be set"));
        }
        if self.port == 0 {
            return Err(ApiError::validation("port must be non-zero"));
        }
        if self.auth.elevated_role.is_empty() {
            return Err(ApiError::validation("auth.elevated_role must be set"));
        }
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_invalid_without_secret() {
        let config = ApiConfig::default();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_valid_config() {
        let config = ApiConfig::default()
            .with_jwt(JwtConfig::new("a-sufficiently-long-testing-secret!!"))
            .with_port(9090);

        assert!(config.validate().is_ok());
        assert_eq!(config.socket_addr().port(), 9090);
    }

    #[test]
    fn test_config_roundtrip() {
        let config = ApiConfig::default().with_port(9000);
        let json = serde_json::to_string(&config).unwrap();
        let back: ApiConfig = serde_json::from_str(&json).unwrap();

        assert_eq!(back.port, 9000);
        // Secrets never serialize.
        assert!(!json.contains("secret"));
    }
}
