// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Mock Implementations
//!
//! Instrumented wrappers for testing WARDEN components in isolation.
//!
//! ## Design Principles
//!
//! - Recording of interactions for verification
//! - Thread-safe for concurrent testing
//! - Outage injection delegated to `MemoryStore::set_unavailable`

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use warden_core::bus::AccessEventListener;
use warden_core::error::StoreResult;
use warden_core::event::{AccessEvent, AccessEventKind};
use warden_core::types::{User, UserId};
use warden_store::{AccessStore, MemoryStore, UserAccessRecord};

// =============================================================================
// CountingStore
// =============================================================================

/// Store wrapper that counts resolution round-trips.
///
/// Cache HIT/MISS behavior becomes directly observable: a HIT leaves the
/// load count unchanged, a MISS increments it.
pub struct CountingStore {
    inner: Arc<MemoryStore>,
    loads: AtomicU64,
}

impl CountingStore {
    /// Wraps a memory store.
    pub fn new(inner: Arc<MemoryStore>) -> Arc<Self> {
        Arc::new(Self {
            inner,
            loads: AtomicU64::new(0),
        })
    }

    /// Number of `load_user_access` calls so far.
    pub fn load_count(&self) -> u64 {
        self.loads.load(Ordering::Relaxed)
    }

    /// The wrapped store.
    pub fn inner(&self) -> &Arc<MemoryStore> {
        &self.inner
    }
}

#[async_trait]
impl AccessStore for CountingStore {
    async fn load_user_access(&self, user_id: &UserId) -> StoreResult<UserAccessRecord> {
        self.loads.fetch_add(1, Ordering::Relaxed);
        self.inner.load_user_access(user_id).await
    }

    async fn find_user(&self, user_id: &UserId) -> StoreResult<User> {
        self.inner.find_user(user_id).await
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<User> {
        self.inner.find_user_by_email(email).await
    }

    async fn user_has_role(&self, user_id: &UserId) -> StoreResult<bool> {
        self.inner.user_has_role(user_id).await
    }
}

// =============================================================================
// RecordingListener
// =============================================================================

/// Bus listener that records every event it sees, in order.
pub struct RecordingListener {
    events: Mutex<Vec<AccessEvent>>,
}

impl RecordingListener {
    /// Creates a new recording listener.
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            events: Mutex::new(Vec::new()),
        })
    }

    /// All recorded events.
    pub fn events(&self) -> Vec<AccessEvent> {
        self.events.lock().unwrap().clone()
    }

    /// Kinds of all recorded events, in publish order.
    pub fn kinds(&self) -> Vec<AccessEventKind> {
        self.events.lock().unwrap().iter().map(|e| e.kind).collect()
    }

    /// Number of recorded events.
    pub fn len(&self) -> usize {
        self.events.lock().unwrap().len()
    }

    /// Returns `true` if nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.events.lock().unwrap().is_empty()
    }
}

impl AccessEventListener for RecordingListener {
    fn on_event(&self, event: &AccessEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}
