// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Role resolution service.
//!
//! Computes a user's effective access from the store in a single read:
//! role memberships are flattened to unique permissions and active
//! applications. Uniqueness is by ID: map-based dedup, last-write-wins.
//! Attributes are immutable per ID, so identical keys carry identical
//! data. Output order carries no meaning.
//!
//! This layer never swallows failures: a missing user and a store outage
//! both propagate to the caller. The fail-closed policy lives at the
//! token-issuance boundary, not here.

use std::collections::HashMap;
use std::sync::Arc;

use warden_core::error::StoreResult;
use warden_core::types::{Application, ApplicationId, Permission, PermissionId, ResolvedAccess};
use warden_core::types::UserId;
use warden_store::AccessStore;

// =============================================================================
// AccessResolver
// =============================================================================

/// Resolves a user's effective roles, permissions, and applications.
#[derive(Clone)]
pub struct AccessResolver {
    store: Arc<dyn AccessStore>,
}

impl AccessResolver {
    /// Creates a resolver over the given store.
    pub fn new(store: Arc<dyn AccessStore>) -> Self {
        Self { store }
    }

    /// Computes the effective access for a user.
    ///
    /// # Errors
    ///
    /// - [`StoreError::UserNotFound`] when the user does not exist; a
    ///   missing user is an error, not an empty result.
    /// - [`StoreError::Unavailable`] on I/O failure, unchanged.
    ///
    /// [`StoreError::UserNotFound`]: warden_core::error::StoreError::UserNotFound
    /// [`StoreError::Unavailable`]: warden_core::error::StoreError::Unavailable
    pub async fn resolve(&self, user_id: &UserId) -> StoreResult<ResolvedAccess> {
        let record = self.store.load_user_access(user_id).await?;

        let mut permissions: HashMap<PermissionId, Permission> = HashMap::new();
        let mut applications: HashMap<ApplicationId, Application> = HashMap::new();
        let mut roles = Vec::with_capacity(record.roles.len());

        for grant in record.roles {
            for permission in grant.permissions {
                permissions.insert(permission.id.clone(), permission);
            }
            for application in grant.applications {
                if application.is_active {
                    applications.insert(application.id.clone(), application);
                }
            }
            roles.push(grant.role);
        }

        tracing::debug!(
            user_id = %user_id,
            roles = roles.len(),
            permissions = permissions.len(),
            applications = applications.len(),
            "resolved user access"
        );

        Ok(ResolvedAccess {
            roles,
            permissions: permissions.into_values().collect(),
            applications: applications.into_values().collect(),
        })
    }

    /// Returns the underlying store.
    pub fn store(&self) -> &Arc<dyn AccessStore> {
        &self.store
    }
}

impl std::fmt::Debug for AccessResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessResolver").finish_non_exhaustive()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use warden_core::error::StoreError;
    use warden_core::types::{Role, User};
    use warden_store::{AccessStoreAdmin, MemoryStore};

    use warden_core::types::RoleId;

    async fn overlapping_roles_store() -> Arc<MemoryStore> {
        let store = MemoryStore::new();

        store
            .create_user(User::new("u1", "alice@example.com", "hash"))
            .await
            .unwrap();
        store.create_role(Role::new("r-admin", "admin")).await.unwrap();
        store
            .create_role(Role::new("r-auditor", "auditor"))
            .await
            .unwrap();
        store
            .create_permission(Permission::new("p-read", "users:read"))
            .await
            .unwrap();
        store
            .create_permission(Permission::new("p-delete", "users:delete"))
            .await
            .unwrap();

        store
            .grant_permission(&RoleId::new("r-admin"), &PermissionId::new("p-read"))
            .await
            .unwrap();
        store
            .grant_permission(&RoleId::new("r-admin"), &PermissionId::new("p-delete"))
            .await
            .unwrap();
        store
            .grant_permission(&RoleId::new("r-auditor"), &PermissionId::new("p-read"))
            .await
            .unwrap();

        store
            .assign_role(&UserId::new("u1"), &RoleId::new("r-admin"))
            .await
            .unwrap();
        store
            .assign_role(&UserId::new("u1"), &RoleId::new("r-auditor"))
            .await
            .unwrap();

        Arc::new(store)
    }

    #[tokio::test]
    async fn test_overlapping_permissions_dedup_by_id() {
        let store = overlapping_roles_store().await;
        let resolver = AccessResolver::new(store);

        let access = resolver.resolve(&UserId::new("u1")).await.unwrap();

        // admin grants {users:read, users:delete}, auditor grants
        // {users:read}: the union has exactly two entries.
        assert_eq!(access.roles.len(), 2);
        assert_eq!(access.permissions.len(), 2);
        assert!(access.has_permission("users:read"));
        assert!(access.has_permission("users:delete"));
    }

    #[tokio::test]
    async fn test_inactive_application_excluded() {
        let store = MemoryStore::new();
        store
            .create_user(User::new("u1", "fin@example.com", "hash"))
            .await
            .unwrap();
        store
            .create_role(Role::new("r-fin", "finance"))
            .await
            .unwrap();
        store
            .create_application(Application::new("a-billing", "Billing", "/billing").with_active(false))
            .await
            .unwrap();
        store
            .grant_application(&RoleId::new("r-fin"), &ApplicationId::new("a-billing"))
            .await
            .unwrap();
        store
            .assign_role(&UserId::new("u1"), &RoleId::new("r-fin"))
            .await
            .unwrap();

        let resolver = AccessResolver::new(Arc::new(store));
        let access = resolver.resolve(&UserId::new("u1")).await.unwrap();

        assert_eq!(access.roles.len(), 1);
        assert!(access.applications.is_empty());
        assert!(!access.has_application_path("/billing"));
    }

    #[tokio::test]
    async fn test_user_not_found_propagates() {
        let resolver = AccessResolver::new(Arc::new(MemoryStore::new()));

        let err = resolver.resolve(&UserId::new("ghost")).await.unwrap_err();
        assert!(matches!(err, StoreError::UserNotFound { .. }));
    }

    #[tokio::test]
    async fn test_store_outage_propagates() {
        let store = Arc::new(MemoryStore::new());
        store
            .create_user(User::new("u1", "alice@example.com", "hash"))
            .await
            .unwrap();
        store.set_unavailable(true);

        let resolver = AccessResolver::new(store);
        let err = resolver.resolve(&UserId::new("u1")).await.unwrap_err();
        assert!(matches!(err, StoreError::Unavailable { .. }));
    }

    #[tokio::test]
    async fn test_zero_roles_resolves_empty_not_error() {
        let store = MemoryStore::new();
        store
            .create_user(User::new("u1", "alice@example.com", "hash"))
            .await
            .unwrap();

        let resolver = AccessResolver::new(Arc::new(store));
        let access = resolver.resolve(&UserId::new("u1")).await.unwrap();

        assert!(access.is_empty());
        assert!(!access.has_roles());
    }
}
