// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # warden-bin
//!
//! Binary entry point for the WARDEN access-control service.

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod cli;
pub mod error;
pub mod logging;
pub mod runtime;
pub mod shutdown;

pub use error::{BinError, BinResult};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
