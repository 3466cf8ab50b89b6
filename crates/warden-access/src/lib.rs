// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # warden-access
//!
//! Role resolution for WARDEN.
//!
//! This crate provides:
//!
//! - [`AccessResolver`]: computes effective roles, permissions, and
//!   active applications from the store
//! - [`CachedResolver`]: the same, memoized per user and wired to the
//!   event bus for synchronous invalidation
//! - [`AccessAdmin`]: role/permission administration that publishes the
//!   mandated change events

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod admin;
pub mod cached;
pub mod resolver;

pub use admin::AccessAdmin;
pub use cached::{CacheInvalidator, CachedResolver};
pub use resolver::AccessResolver;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
