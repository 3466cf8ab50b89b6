// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Application state shared across handlers.

use std::sync::Arc;

use warden_access::CachedResolver;
use warden_core::bus::AccessEventBus;
use warden_core::cache::ResolutionCache;
use warden_store::AccessStore;

use crate::auth::JwtManager;
use crate::config::ApiConfig;
use crate::error::{ApiError, ApiResult};
use crate::facade::AccessFacade;
use crate::issuer::SessionIssuer;

// =============================================================================
// AppState
// =============================================================================

/// Application state shared across all handlers.
///
/// The bus, cache, resolver, issuer, and facade are all explicitly
/// constructed here and shared via `Arc`; there are no module-level
/// singletons anywhere in WARDEN.
#[derive(Clone)]
pub struct AppState {
    /// API configuration.
    pub config: Arc<ApiConfig>,
    /// JWT manager for token operations.
    pub jwt: Arc<JwtManager>,
    /// Session issuer.
    pub issuer: Arc<SessionIssuer>,
    /// Permission check facade (fresh variants).
    pub facade: Arc<AccessFacade>,
    /// Cached resolver.
    pub resolver: CachedResolver,
    /// Event bus.
    pub bus: Arc<AccessEventBus>,
}

impl AppState {
    /// Creates a state builder.
    pub fn builder() -> AppStateBuilder {
        AppStateBuilder::new()
    }

    /// Returns the JWT manager.
    pub fn jwt(&self) -> &JwtManager {
        &self.jwt
    }

    /// Returns the session issuer.
    pub fn issuer(&self) -> &SessionIssuer {
        &self.issuer
    }

    /// Returns the permission check facade.
    pub fn facade(&self) -> &AccessFacade {
        &self.facade
    }

    /// Returns the resolution cache.
    pub fn cache(&self) -> &Arc<ResolutionCache> {
        self.resolver.cache()
    }

    /// Returns the event bus.
    pub fn bus(&self) -> &Arc<AccessEventBus> {
        &self.bus
    }
}

// =============================================================================
// AppStateBuilder
// =============================================================================

/// Builder assembling the full read-side service graph.
///
/// Given a store and a config, the builder constructs the bus, cache,
/// resolver (with its invalidation listener attached), issuer, and
/// facade in the right order.
#[derive(Default)]
pub struct AppStateBuilder {
    config: Option<ApiConfig>,
    store: Option<Arc<dyn AccessStore>>,
    bus: Option<Arc<AccessEventBus>>,
}

impl AppStateBuilder {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the configuration.
    pub fn config(mut self, config: ApiConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Sets the access store.
    pub fn store(mut self, store: Arc<dyn AccessStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Supplies an externally constructed bus (otherwise one is built
    /// from the configured capacity).
    pub fn bus(mut self, bus: Arc<AccessEventBus>) -> Self {
        self.bus = Some(bus);
        self
    }

    /// Builds the state, wiring cache invalidation to the bus.
    pub fn build(self) -> ApiResult<AppState> {
        let config = self.config.unwrap_or_default();
        config.validate()?;

        let store = self
            .store
            .ok_or_else(|| ApiError::internal("AppState requires a store"))?;

        let bus = self
            .bus
            .unwrap_or_else(|| Arc::new(AccessEventBus::new(config.bus_capacity)));
        let cache = Arc::new(ResolutionCache::new(config.cache_capacity));

        let resolver = CachedResolver::new(store.clone(), cache);
        resolver.attach_invalidation(&bus);

        let jwt = Arc::new(JwtManager::new(config.jwt.clone()).map_err(ApiError::from)?);
        let issuer = Arc::new(SessionIssuer::new(
            store,
            resolver.clone(),
            jwt.clone(),
            config.auth.clone(),
        ));
        let facade = Arc::new(AccessFacade::new(resolver.clone()));

        Ok(AppState {
            config: Arc::new(config),
            jwt,
            issuer,
            facade,
            resolver,
            bus,
        })
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::JwtConfig;
    use warden_store::MemoryStore;

    #[test]
    fn test_builder_requires_store() {
        let result = AppState::builder()
            .config(ApiConfig::default().with_jwt(JwtConfig::new("long-enough-secret-for-testing!!")))
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn test_builder_wires_invalidation_listener() {
        let state = AppState::builder()
            .config(ApiConfig::default().with_jwt(JwtConfig::new("long-enough-secret-for-testing!!")))
            .store(Arc::new(MemoryStore::new()))
            .build()
            .unwrap();

        // The cache invalidator is registered during build.
        assert_eq!(state.bus().listener_count(), 1);
    }
}
