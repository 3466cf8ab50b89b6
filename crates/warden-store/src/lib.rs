// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # warden-store
//!
//! Store ports and backends for WARDEN.
//!
//! The access store holds users, roles, permissions, applications, and
//! their join relations. This crate defines the narrow read/write ports
//! the rest of WARDEN consumes ([`AccessStore`], [`AccessStoreAdmin`])
//! and ships an in-memory reference backend ([`MemoryStore`]) for tests
//! and demos.

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod memory;
pub mod store;

pub use memory::MemoryStore;
pub use store::{AccessStore, AccessStoreAdmin, RoleGrant, UserAccessRecord};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
