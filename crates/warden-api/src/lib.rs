// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # warden-api
//!
//! HTTP API surface for the WARDEN access-control service.
//!
//! This crate provides JWT session issuance with fail-closed claims, the
//! permission-check facade used by route guards, authentication
//! middleware, and the axum server.

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod auth;
pub mod config;
pub mod error;
pub mod extractors;
pub mod facade;
pub mod handlers;
pub mod issuer;
pub mod middleware;
pub mod response;
pub mod server;
pub mod state;

// Re-export commonly used types
pub use auth::{Claims, JwtConfig, JwtManager, Session, SessionClaims, TokenKind};
pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};
pub use facade::{AccessFacade, PermissionCheck};
pub use issuer::{hash_password, AuthPolicy, IssuedSession, SessionIssuer};
pub use response::{ApiResponse, AuthResponse};
pub use server::ApiServer;
pub use state::{AppState, AppStateBuilder};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
