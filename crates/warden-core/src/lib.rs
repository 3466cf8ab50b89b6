// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # warden-core
//!
//! Core abstractions and shared types for the WARDEN access-control
//! service.
//!
//! This crate provides the foundational pieces used across all WARDEN
//! components:
//!
//! - **Types**: identity and access entities (`UserId`, `User`, `Role`,
//!   `Permission`, `Application`, `ResolvedAccess`)
//! - **Error**: unified error hierarchy with fail-closed semantics
//! - **Event**: structured access-change events
//! - **Bus**: in-process event bus with synchronous listener fan-out
//! - **Cache**: bounded, invalidation-driven per-user resolution cache
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use warden_core::bus::AccessEventBus;
//! use warden_core::cache::ResolutionCache;
//! use warden_core::event::AccessEvent;
//! use warden_core::types::{RoleId, UserId};
//!
//! let bus = Arc::new(AccessEventBus::with_defaults());
//! let cache = Arc::new(ResolutionCache::with_defaults());
//!
//! bus.publish(AccessEvent::user_role_removed(
//!     UserId::new("u1"),
//!     RoleId::new("editor"),
//! ))?;
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![deny(unsafe_code)]

// =============================================================================
// Core Modules
// =============================================================================

pub mod error;
pub mod types;

// =============================================================================
// Event & Cache Modules
// =============================================================================

pub mod bus;
pub mod cache;
pub mod event;

// =============================================================================
// Re-exports for convenience
// =============================================================================

pub use error::*;
pub use types::*;

// Re-export event types
pub use event::{AccessEvent, AccessEventKind};

// Re-export bus types
pub use bus::{AccessEventBus, AccessEventListener, AccessEventSubscriber, BusStats, ListenerId};

// Re-export cache types
pub use cache::{CacheStats, ResolutionCache, DEFAULT_CACHE_CAPACITY};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
