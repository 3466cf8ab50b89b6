// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Authentication module.
//!
//! This module provides:
//! - JWT token management and validation
//! - The fixed session-claims shape embedded in every token
//! - The per-request session type populated by the auth middleware

mod claims;
mod jwt;
mod session;

pub use claims::{Claims, SessionClaims, TokenKind};
pub use jwt::{JwtConfig, JwtManager};
pub use session::Session;
