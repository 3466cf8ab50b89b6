// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Per-user resolution cache.
//!
//! Memoizes [`ResolvedAccess`] per user so repeated token refreshes do not
//! traverse the store. The cache is invalidation-driven, not TTL-driven:
//! an entry is either present-and-trusted (FRESH) or absent (MISS); there
//! are no staleness states in between.
//!
//! ```text
//! MISS ──(resolve + insert)──▶ FRESH ──(invalidate)──▶ MISS
//! ```
//!
//! All operations take short `parking_lot::RwLock` critical sections with
//! no suspension points, so an event-bus listener can invalidate entries
//! synchronously inside `publish()`.
//!
//! Capacity is bounded with insertion-order eviction as a fallback against
//! unbounded growth at large user counts; the working set is expected to
//! stay far below the bound under the invalidation-driven access pattern.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::types::{ResolvedAccess, UserId};

/// Default maximum number of cached users.
pub const DEFAULT_CACHE_CAPACITY: usize = 10_000;

// =============================================================================
// Cache Statistics
// =============================================================================

/// Statistics for the resolution cache.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct CacheStats {
    /// Lookups that found a fresh entry.
    pub hits: u64,
    /// Lookups that found nothing.
    pub misses: u64,
    /// Entries removed by invalidation.
    pub invalidations: u64,
    /// Entries removed by the capacity bound.
    pub evictions: u64,
    /// Current number of cached users.
    pub entries: u64,
}

/// Atomic statistics for lock-free updates.
#[derive(Debug, Default)]
struct AtomicCacheStats {
    hits: AtomicU64,
    misses: AtomicU64,
    invalidations: AtomicU64,
    evictions: AtomicU64,
}

// =============================================================================
// ResolutionCache
// =============================================================================

/// Map state guarded by a single lock.
///
/// `order` tracks insertion order for eviction. Invalidation removes from
/// the map only; stale order entries are skipped lazily during eviction.
#[derive(Debug, Default)]
struct CacheInner {
    entries: HashMap<UserId, Arc<ResolvedAccess>>,
    order: VecDeque<UserId>,
}

/// Bounded, invalidation-driven cache of per-user resolution results.
#[derive(Debug)]
pub struct ResolutionCache {
    inner: RwLock<CacheInner>,
    capacity: usize,
    stats: AtomicCacheStats,
}

impl ResolutionCache {
    /// Creates a cache bounded to `capacity` users.
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: RwLock::new(CacheInner::default()),
            capacity: capacity.max(1),
            stats: AtomicCacheStats::default(),
        }
    }

    /// Creates a cache with the default capacity.
    pub fn with_defaults() -> Self {
        Self::new(DEFAULT_CACHE_CAPACITY)
    }

    /// Looks up the cached resolution for a user.
    ///
    /// Returns `Some` on a HIT, `None` on a MISS. The caller recomputes
    /// from the store on a MISS and stores the result with [`insert`].
    ///
    /// [`insert`]: ResolutionCache::insert
    pub fn get(&self, user_id: &UserId) -> Option<Arc<ResolvedAccess>> {
        let inner = self.inner.read();
        match inner.entries.get(user_id) {
            Some(access) => {
                self.stats.hits.fetch_add(1, Ordering::Relaxed);
                Some(access.clone())
            }
            None => {
                self.stats.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    /// Stores a resolution result.
    ///
    /// Overwriting an existing entry is idempotent: two concurrent
    /// resolutions racing on the same MISS both land on identical data,
    /// so last-write-wins is correct.
    pub fn insert(&self, user_id: UserId, access: Arc<ResolvedAccess>) {
        let mut inner = self.inner.write();

        if !inner.entries.contains_key(&user_id) {
            while inner.entries.len() >= self.capacity {
                let Some(oldest) = inner.order.pop_front() else {
                    break;
                };
                // Stale order entries (already invalidated) are skipped.
                if inner.entries.remove(&oldest).is_some() {
                    self.stats.evictions.fetch_add(1, Ordering::Relaxed);
                }
            }
            inner.order.push_back(user_id.clone());
        }

        inner.entries.insert(user_id, access);
    }

    /// Removes the cached entry for a user.
    ///
    /// The next [`get`] for this user is guaranteed a MISS.
    ///
    /// [`get`]: ResolutionCache::get
    pub fn invalidate(&self, user_id: &UserId) {
        let mut inner = self.inner.write();
        if inner.entries.remove(user_id).is_some() {
            self.stats.invalidations.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Removes the cached entries for a set of users.
    pub fn invalidate_many(&self, user_ids: &[UserId]) {
        if user_ids.is_empty() {
            return;
        }

        let mut inner = self.inner.write();
        let mut removed = 0u64;
        for user_id in user_ids {
            if inner.entries.remove(user_id).is_some() {
                removed += 1;
            }
        }
        if removed > 0 {
            self.stats.invalidations.fetch_add(removed, Ordering::Relaxed);
        }
    }

    /// Removes every entry.
    pub fn clear(&self) {
        let mut inner = self.inner.write();
        let removed = inner.entries.len() as u64;
        inner.entries.clear();
        inner.order.clear();
        self.stats.invalidations.fetch_add(removed, Ordering::Relaxed);
    }

    /// Returns the number of cached users.
    pub fn len(&self) -> usize {
        self.inner.read().entries.len()
    }

    /// Returns `true` if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.inner.read().entries.is_empty()
    }

    /// Returns the capacity bound.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns current statistics.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.stats.hits.load(Ordering::Relaxed),
            misses: self.stats.misses.load(Ordering::Relaxed),
            invalidations: self.stats.invalidations.load(Ordering::Relaxed),
            evictions: self.stats.evictions.load(Ordering::Relaxed),
            entries: self.len() as u64,
        }
    }
}

impl Default for ResolutionCache {
    fn default() -> Self {
        Self::with_defaults()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Permission, Role};

    fn sample_access() -> Arc<ResolvedAccess> {
        Arc::new(ResolvedAccess {
            roles: vec![Role::new("r1", "editor")],
            permissions: vec![Permission::new("p1", "posts:write")],
            applications: vec![],
        })
    }

    #[test]
    fn test_miss_then_hit() {
        let cache = ResolutionCache::with_defaults();
        let user = UserId::new("u1");

        assert!(cache.get(&user).is_none());

        cache.insert(user.clone(), sample_access());
        let hit = cache.get(&user).expect("expected a HIT");
        assert!(hit.has_role("editor"));

        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
    }

    #[test]
    fn test_invalidate_forces_miss() {
        let cache = ResolutionCache::with_defaults();
        let user = UserId::new("u1");

        cache.insert(user.clone(), sample_access());
        assert!(cache.get(&user).is_some());

        cache.invalidate(&user);
        assert!(cache.get(&user).is_none());
        assert_eq!(cache.stats().invalidations, 1);
    }

    #[test]
    fn test_invalidate_many_spares_unaffected() {
        let cache = ResolutionCache::with_defaults();
        let (u1, u2, u3) = (UserId::new("u1"), UserId::new("u2"), UserId::new("u3"));

        cache.insert(u1.clone(), sample_access());
        cache.insert(u2.clone(), sample_access());
        cache.insert(u3.clone(), sample_access());

        cache.invalidate_many(&[u1.clone(), u2.clone()]);

        assert!(cache.get(&u1).is_none());
        assert!(cache.get(&u2).is_none());
        assert!(cache.get(&u3).is_some());
    }

    #[test]
    fn test_invalidate_unknown_user_is_noop() {
        let cache = ResolutionCache::with_defaults();
        cache.invalidate(&UserId::new("nobody"));
        assert_eq!(cache.stats().invalidations, 0);
    }

    #[test]
    fn test_idempotent_overwrite() {
        let cache = ResolutionCache::with_defaults();
        let user = UserId::new("u1");

        cache.insert(user.clone(), sample_access());
        cache.insert(user.clone(), sample_access());

        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_capacity_bound_evicts_oldest() {
        let cache = ResolutionCache::new(2);

        cache.insert(UserId::new("u1"), sample_access());
        cache.insert(UserId::new("u2"), sample_access());
        cache.insert(UserId::new("u3"), sample_access());

        assert_eq!(cache.len(), 2);
        assert!(cache.get(&UserId::new("u1")).is_none());
        assert!(cache.get(&UserId::new("u3")).is_some());
        assert_eq!(cache.stats().evictions, 1);
    }

    #[test]
    fn test_eviction_skips_already_invalidated_entries() {
        let cache = ResolutionCache::new(2);

        cache.insert(UserId::new("u1"), sample_access());
        cache.insert(UserId::new("u2"), sample_access());
        cache.invalidate(&UserId::new("u1"));

        // u1's order slot is stale; inserting must not evict u2.
        cache.insert(UserId::new("u3"), sample_access());

        assert!(cache.get(&UserId::new("u2")).is_some());
        assert!(cache.get(&UserId::new("u3")).is_some());
        assert_eq!(cache.stats().evictions, 0);
    }

    #[test]
    fn test_clear() {
        let cache = ResolutionCache::with_defaults();
        cache.insert(UserId::new("u1"), sample_access());
        cache.insert(UserId::new("u2"), sample_access());

        cache.clear();

        assert!(cache.is_empty());
        assert_eq!(cache.stats().entries, 0);
    }
}
