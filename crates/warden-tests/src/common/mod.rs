// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Common Test Utilities
//!
//! Shared fixtures, builders, mocks, and assertion helpers for the
//! WARDEN integration tests.
//!
//! - `fixtures`: pre-seeded store scenarios matching the documented
//!   access-control properties
//! - `builders`: fluent construction of custom store scenarios
//! - `mocks`: instrumented store wrappers and recording bus listeners
//! - `assertions`: claim and permission-check assertion helpers

pub mod assertions;
pub mod builders;
pub mod fixtures;
pub mod mocks;

pub use assertions::*;
pub use builders::*;
pub use fixtures::*;
pub use mocks::*;

use std::sync::Once;
use tracing_subscriber::EnvFilter;

static INIT: Once = Once::new();

/// Initializes test logging once per process.
///
/// Controlled via `RUST_LOG`; defaults to warnings only so test output
/// stays readable.
pub fn init_test_logging() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init();
    });
}
