// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! API middleware.

mod auth;
mod require;

pub use auth::{AuthLayer, AuthMiddleware};
pub use require::{RequireLayer, RequireMiddleware};
