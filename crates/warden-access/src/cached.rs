// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Cache-backed resolution.
//!
//! [`CachedResolver`] front-ends the [`AccessResolver`] with the
//! per-user [`ResolutionCache`] and owns the wiring that keeps the cache
//! consistent: a [`CacheInvalidator`] listener registered on the event
//! bus removes the entries for every event's affected users inside
//! `publish()`, unconditionally, whether or not any external subscriber
//! exists.
//!
//! Two concurrent resolutions racing on the same MISS both hit the store;
//! that is duplicate work, not incorrect results, and the idempotent
//! cache overwrite needs no lock around the store round-trip.

use std::sync::Arc;

use warden_core::bus::{AccessEventBus, AccessEventListener, ListenerId};
use warden_core::cache::ResolutionCache;
use warden_core::error::StoreResult;
use warden_core::event::AccessEvent;
use warden_core::types::{ResolvedAccess, UserId};
use warden_store::AccessStore;

use crate::resolver::AccessResolver;

// =============================================================================
// CacheInvalidator
// =============================================================================

/// Event-bus listener that invalidates cache entries for affected users.
pub struct CacheInvalidator {
    cache: Arc<ResolutionCache>,
}

impl CacheInvalidator {
    /// Creates an invalidator over the given cache.
    pub fn new(cache: Arc<ResolutionCache>) -> Self {
        Self { cache }
    }
}

impl AccessEventListener for CacheInvalidator {
    fn on_event(&self, event: &AccessEvent) {
        if !event.has_affected_users() {
            return;
        }

        self.cache.invalidate_many(event.affected_user_ids());
        tracing::debug!(
            kind = %event.kind,
            affected = event.affected_user_ids().len(),
            "invalidated cached resolutions"
        );
    }
}

// =============================================================================
// CachedResolver
// =============================================================================

/// Resolution service with per-user memoization.
#[derive(Clone)]
pub struct CachedResolver {
    resolver: AccessResolver,
    cache: Arc<ResolutionCache>,
}

impl CachedResolver {
    /// Creates a cached resolver.
    pub fn new(store: Arc<dyn AccessStore>, cache: Arc<ResolutionCache>) -> Self {
        Self {
            resolver: AccessResolver::new(store),
            cache,
        }
    }

    /// Registers the cache-invalidation listener on the bus.
    ///
    /// Must be called once during assembly; without it, published events
    /// no longer reach the cache and stale claims survive until eviction.
    pub fn attach_invalidation(&self, bus: &AccessEventBus) -> ListenerId {
        bus.add_listener(Arc::new(CacheInvalidator::new(self.cache.clone())))
    }

    /// Resolves a user's effective access, serving from cache when fresh.
    ///
    /// On a MISS the result is recomputed from the store and cached. All
    /// error semantics of [`AccessResolver::resolve`] apply unchanged;
    /// failed resolutions are never cached.
    pub async fn resolve(&self, user_id: &UserId) -> StoreResult<Arc<ResolvedAccess>> {
        if let Some(cached) = self.cache.get(user_id) {
            return Ok(cached);
        }

        let access = Arc::new(self.resolver.resolve(user_id).await?);
        self.cache.insert(user_id.clone(), access.clone());
        Ok(access)
    }

    /// Returns the cache.
    pub fn cache(&self) -> &Arc<ResolutionCache> {
        &self.cache
    }

    /// Returns the inner (uncached) resolver.
    pub fn resolver(&self) -> &AccessResolver {
        &self.resolver
    }
}

impl std::fmt::Debug for CachedResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CachedResolver")
            .field("cache_entries", &self.cache.len())
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};

    use async_trait::async_trait;
    use warden_core::types::{Permission, PermissionId, Role, RoleId, User};
    use warden_store::{AccessStoreAdmin, MemoryStore, UserAccessRecord};

    /// Store wrapper that counts resolution round-trips.
    struct CountingStore {
        inner: Arc<MemoryStore>,
        loads: AtomicU64,
    }

    impl CountingStore {
        fn new(inner: Arc<MemoryStore>) -> Arc<Self> {
            Arc::new(Self {
                inner,
                loads: AtomicU64::new(0),
            })
        }

        fn load_count(&self) -> u64 {
            self.loads.load(Ordering::Relaxed)
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

    async fn seeded() -> Arc<MemoryStore> {
        let store = MemoryStore::new();
        store
            .create_user(User::new("u1", "alice@example.com", "hash"))
            .await
            .unwrap();
        store.create_role(Role::new("r1", "editor")).await.unwrap();
        store
            .create_permission(Permission::new("p1", "posts:write"))
            .await
            .unwrap();
        store
            .grant_permission(&RoleId::new("r1"), &PermissionId::new("p1"))
            .await
            .unwrap();
        store
            .assign_role(&UserId::new("u1"), &RoleId::new("r1"))
            .await
            .unwrap();
        Arc::new(store)
    }

    #[tokio::test]
    async fn test_hit_serves_identical_data_without_store_access() {
        let counting = CountingStore::new(seeded().await);
        let cache = Arc::new(ResolutionCache::with_defaults());
        let resolver = CachedResolver::new(counting.clone(), cache);

        let first = resolver.resolve(&UserId::new("u1")).await.unwrap();
        let second = resolver.resolve(&UserId::new("u1")).await.unwrap();

        assert_eq!(counting.load_count(), 1);
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[tokio::test]
    async fn test_invalidate_triggers_recompute() {
        let counting = CountingStore::new(seeded().await);
        let cache = Arc::new(ResolutionCache::with_defaults());
        let resolver = CachedResolver::new(counting.clone(), cache.clone());

        resolver.resolve(&UserId::new("u1")).await.unwrap();
        cache.invalidate(&UserId::new("u1"));
        resolver.resolve(&UserId::new("u1")).await.unwrap();

        assert_eq!(counting.load_count(), 2);
    }

    #[tokio::test]
    async fn test_event_driven_invalidation_spares_unaffected_users() {
        let store = seeded().await;
        store
            .create_user(User::new("u2", "bob@example.com", "hash"))
            .await
            .unwrap();
        store
            .create_user(User::new("u3", "carol@example.com", "hash"))
            .await
            .unwrap();

        let counting = CountingStore::new(store);
        let cache = Arc::new(ResolutionCache::with_defaults());
        let resolver = CachedResolver::new(counting.clone(), cache.clone());
        let bus = AccessEventBus::with_defaults();
        resolver.attach_invalidation(&bus);

        for user in ["u1", "u2", "u3"] {
            resolver.resolve(&UserId::new(user)).await.unwrap();
        }
        assert_eq!(counting.load_count(), 3);

        bus.publish(AccessEvent::role_permission_removed(
            RoleId::new("r1"),
            PermissionId::new("p1"),
            vec![UserId::new("u1"), UserId::new("u2")],
        ))
        .unwrap();

        // u1 and u2 miss and recompute; u3 is still a hit.
        resolver.resolve(&UserId::new("u1")).await.unwrap();
        resolver.resolve(&UserId::new("u2")).await.unwrap();
        resolver.resolve(&UserId::new("u3")).await.unwrap();
        assert_eq!(counting.load_count(), 5);
    }

    #[tokio::test]
    async fn test_failed_resolution_is_not_cached() {
        let store = seeded().await;
        let counting = CountingStore::new(store.clone());
        let cache = Arc::new(ResolutionCache::with_defaults());
        let resolver = CachedResolver::new(counting.clone(), cache);

        store.set_unavailable(true);
        assert!(resolver.resolve(&UserId::new("u1")).await.is_err());

        store.set_unavailable(false);
        let access = resolver.resolve(&UserId::new("u1")).await.unwrap();
        assert!(access.has_roles());
        assert_eq!(counting.load_count(), 2);
    }

    #[tokio::test]
    async fn test_invalidation_observed_after_publish_returns() {
        let counting = CountingStore::new(seeded().await);
        let cache = Arc::new(ResolutionCache::with_defaults());
        let resolver = CachedResolver::new(counting.clone(), cache.clone());
        let bus = AccessEventBus::with_defaults();
        resolver.attach_invalidation(&bus);

        resolver.resolve(&UserId::new("u1")).await.unwrap();

        // The synchronous listener contract means the entry is gone the
        // moment publish() returns; no polling or sleeping required.
        bus.publish(AccessEvent::user_role_removed(
            UserId::new("u1"),
            RoleId::new("r1"),
        ))
        .unwrap();

        assert!(cache.get(&UserId::new("u1")).is_none());
    }
}
