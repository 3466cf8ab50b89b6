// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! API handlers.

mod auth;
mod system;

pub use auth::{current_user, login, logout, refresh_token, LoginRequest, RefreshRequest};
pub use system::{health, system_stats};
