// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Service runtime orchestration.
//!
//! Assembles the components in dependency order (store, event bus,
//! cache/resolver, issuer, HTTP server), runs until a shutdown signal,
//! then releases the bus listeners.

use std::path::Path;
use std::sync::Arc;

use tracing::{info, warn};

use warden_api::{ApiConfig, ApiServer, AppState};
use warden_core::bus::AccessEventBus;
use warden_core::types::{Application, Permission, Role, User};
use warden_store::{AccessStoreAdmin, MemoryStore};

use crate::error::{BinError, BinResult};
use crate::shutdown::ShutdownCoordinator;

// =============================================================================
// Config loading
// =============================================================================

/// Loads the configuration file, falling back to defaults when absent.
///
/// `WARDEN_JWT_SECRET` overrides the signing secret so it never needs to
/// live in the file.
pub fn load_config(path: &Path) -> BinResult<ApiConfig> {
    let mut config = if path.exists() {
        let raw = std::fs::read_to_string(path)?;
        serde_json::from_str(&raw)
            .map_err(|e| BinError::config(format!("{}: {}", path.display(), e)))?
    } else {
        warn!(path = %path.display(), "config file not found, using defaults");
        ApiConfig::default()
    };

    if let Ok(secret) = std::env::var("WARDEN_JWT_SECRET") {
        config.jwt.secret = secret;
    }

    Ok(config)
}

// =============================================================================
// ServiceRuntime
// =============================================================================

/// The main runtime that orchestrates all components.
pub struct ServiceRuntime {
    config: ApiConfig,
    shutdown: ShutdownCoordinator,
}

impl ServiceRuntime {
    /// Creates a new runtime.
    pub fn new(config: ApiConfig) -> Self {
        Self {
            config,
            shutdown: ShutdownCoordinator::new(),
        }
    }

    /// Returns the shutdown coordinator.
    pub fn shutdown(&self) -> &ShutdownCoordinator {
        &self.shutdown
    }

    /// Runs the service until shutdown is signaled.
    pub async fn run(self, seed_demo: bool) -> BinResult<()> {
        info!("starting WARDEN v{}", warden_core::VERSION);

        let store = Arc::new(MemoryStore::new());
        if seed_demo {
            seed_demo_data(&store).await?;
            info!("seeded demo data (admin@warden.local / warden-admin)");
        }

        let bus = Arc::new(AccessEventBus::new(self.config.bus_capacity));

        let state = AppState::builder()
            .config(self.config)
            .store(store)
            .bus(bus.clone())
            .build()?;

        self.shutdown.listen_for_signals();

        let server = ApiServer::new(state);
        server.run(self.shutdown.signal()).await?;

        bus.shutdown();
        info!("WARDEN stopped");
        Ok(())
    }
}

// =============================================================================
// Demo seed
// =============================================================================

/// Seeds the store with a minimal usable dataset.
async fn seed_demo_data(store: &MemoryStore) -> BinResult<()> {
    let admin_hash = warden_api::hash_password("warden-admin")
        .map_err(|e| BinError::init(format!("password hashing failed: {}", e)))?;
    let viewer_hash = warden_api::hash_password("warden-viewer")
        .map_err(|e| BinError::init(format!("password hashing failed: {}", e)))?;

    store
        .create_user(
            User::new("user-admin", "admin@warden.local", admin_hash)
                .with_display_name("Demo Admin"),
        )
        .await
        .map_err(warden_core::WardenError::from)?;
    store
        .create_user(
            User::new("user-viewer", "viewer@warden.local", viewer_hash)
                .with_display_name("Demo Viewer"),
        )
        .await
        .map_err(warden_core::WardenError::from)?;

    store
        .create_role(Role::new("role-admin", "admin").with_description("Full administration"))
        .await
        .map_err(warden_core::WardenError::from)?;
    store
        .create_role(Role::new("role-viewer", "viewer").with_description("Read-only access"))
        .await
        .map_err(warden_core::WardenError::from)?;

    for (id, name) in [
        ("perm-users-read", "users:read"),
        ("perm-users-write", "users:write"),
        ("perm-roles-read", "roles:read"),
        ("perm-roles-write", "roles:write"),
    ] {
        store
            .create_permission(Permission::new(id, name))
            .await
            .map_err(warden_core::WardenError::from)?;
    }

    store
        .create_application(Application::new("app-admin", "Admin Console", "/admin"))
        .await
        .map_err(warden_core::WardenError::from)?;

    for perm in [
        "perm-users-read",
        "perm-users-write",
        "perm-roles-read",
        "perm-roles-write",
    ] {
        store
            .grant_permission(&"role-admin".into(), &perm.into())
            .await
            .map_err(warden_core::WardenError::from)?;
    }
    store
        .grant_permission(&"role-viewer".into(), &"perm-users-read".into())
        .await
        .map_err(warden_core::WardenError::from)?;
    store
        .grant_application(&"role-admin".into(), &"app-admin".into())
        .await
        .map_err(warden_core::WardenError::from)?;

    store
        .assign_role(&"user-admin".into(), &"role-admin".into())
        .await
        .map_err(warden_core::WardenError::from)?;
    store
        .assign_role(&"user-viewer".into(), &"role-viewer".into())
        .await
        .map_err(warden_core::WardenError::from)?;

    Ok(())
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use warden_core::types::UserId;
    use warden_store::AccessStore;

    #[tokio::test]
    async fn test_seed_demo_data() {
        let store = MemoryStore::new();
        seed_demo_data(&store).await.unwrap();

        let record = store
            .load_user_access(&UserId::new("user-admin"))
            .await
            .unwrap();
        assert_eq!(record.roles.len(), 1);
        assert_eq!(record.roles[0].permissions.len(), 4);
        assert!(store.user_has_role(&UserId::new("user-viewer")).await.unwrap());
    }

    #[test]
    fn test_load_config_missing_file_defaults() {
        let config = load_config(Path::new("/nonexistent/warden.json")).unwrap();
        assert_eq!(config.port, 8080);
    }
}
