// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Administrative mutation service.
//!
//! Thin orchestration over the write-side store port: every mutation of a
//! role, permission, or join row applies the store change and then
//! publishes the matching [`AccessEvent`] carrying the affected user IDs.
//! Because cache invalidation runs synchronously inside `publish()`, a
//! resolution that starts after any of these methods returns is
//! guaranteed to observe the change.

use std::sync::Arc;

use warden_core::bus::AccessEventBus;
use warden_core::error::WardenResult;
use warden_core::event::AccessEvent;
use warden_core::types::{Application, ApplicationId, Permission, PermissionId, Role, RoleId, UserId};
use warden_store::AccessStoreAdmin;

// =============================================================================
// AccessAdmin
// =============================================================================

/// Role/permission administration with mandatory change events.
pub struct AccessAdmin<S: AccessStoreAdmin> {
    store: Arc<S>,
    bus: Arc<AccessEventBus>,
}

impl<S: AccessStoreAdmin> AccessAdmin<S> {
    /// Creates an admin service over the given store and bus.
    pub fn new(store: Arc<S>, bus: Arc<AccessEventBus>) -> Self {
        Self { store, bus }
    }

    /// Creates a role definition.
    pub async fn create_role(&self, role: Role) -> WardenResult<()> {
        let role_id = role.id.clone();
        self.store.create_role(role).await?;
        self.bus.publish(AccessEvent::role_created(role_id))?;
        Ok(())
    }

    /// Updates a role definition.
    pub async fn update_role(&self, role: Role) -> WardenResult<()> {
        let role_id = role.id.clone();
        let affected = self.store.update_role(role).await?;
        self.bus.publish(AccessEvent::role_updated(role_id, affected))?;
        Ok(())
    }

    /// Deletes a role, cascading its join rows.
    pub async fn delete_role(&self, role_id: &RoleId) -> WardenResult<()> {
        let affected = self.store.delete_role(role_id).await?;
        tracing::info!(role_id = %role_id, affected = affected.len(), "role deleted");
        self.bus
            .publish(AccessEvent::role_deleted(role_id.clone(), affected))?;
        Ok(())
    }

    /// Creates a permission definition.
    pub async fn create_permission(&self, permission: Permission) -> WardenResult<()> {
        let permission_id = permission.id.clone();
        self.store.create_permission(permission).await?;
        self.bus
            .publish(AccessEvent::permission_created(permission_id))?;
        Ok(())
    }

    /// Updates a permission definition.
    pub async fn update_permission(&self, permission: Permission) -> WardenResult<()> {
        let permission_id = permission.id.clone();
        let affected = self.store.update_permission(permission).await?;
        self.bus
            .publish(AccessEvent::permission_updated(permission_id, affected))?;
        Ok(())
    }

    /// Deletes a permission, cascading its join rows.
    pub async fn delete_permission(&self, permission_id: &PermissionId) -> WardenResult<()> {
        let affected = self.store.delete_permission(permission_id).await?;
        self.bus
            .publish(AccessEvent::permission_deleted(permission_id.clone(), affected))?;
        Ok(())
    }

    /// Creates an application definition.
    ///
    /// No event: a fresh application has no grants, so no user's claims
    /// can be stale.
    pub async fn create_application(&self, application: Application) -> WardenResult<()> {
        self.store.create_application(application).await?;
        Ok(())
    }

    /// Enables or disables an application.
    pub async fn set_application_active(
        &self,
        application_id: &ApplicationId,
        is_active: bool,
    ) -> WardenResult<()> {
        let affected = self
            .store
            .set_application_active(application_id, is_active)
            .await?;
        self.bus
            .publish(AccessEvent::permissions_changed(affected))?;
        Ok(())
    }

    /// Assigns a role to a user.
    pub async fn assign_role(&self, user_id: &UserId, role_id: &RoleId) -> WardenResult<()> {
        self.store.assign_role(user_id, role_id).await?;
        self.bus.publish(AccessEvent::user_role_added(
            user_id.clone(),
            role_id.clone(),
        ))?;
        Ok(())
    }

    /// Removes a role from a user.
    pub async fn revoke_role(&self, user_id: &UserId, role_id: &RoleId) -> WardenResult<()> {
        self.store.revoke_role(user_id, role_id).await?;
        self.bus.publish(AccessEvent::user_role_removed(
            user_id.clone(),
            role_id.clone(),
        ))?;
        Ok(())
    }

    /// Grants a permission to a role.
    pub async fn grant_permission(
        &self,
        role_id: &RoleId,
        permission_id: &PermissionId,
    ) -> WardenResult<()> {
        let affected = self.store.grant_permission(role_id, permission_id).await?;
        self.bus.publish(AccessEvent::role_permission_added(
            role_id.clone(),
            permission_id.clone(),
            affected,
        ))?;
        Ok(())
    }

    /// Revokes a permission from a role.
    pub async fn revoke_permission(
        &self,
        role_id: &RoleId,
        permission_id: &PermissionId,
    ) -> WardenResult<()> {
        let affected = self.store.revoke_permission(role_id, permission_id).await?;
        self.bus.publish(AccessEvent::role_permission_removed(
            role_id.clone(),
            permission_id.clone(),
            affected,
        ))?;
        Ok(())
    }

    /// Grants an application to a role.
    pub async fn grant_application(
        &self,
        role_id: &RoleId,
        application_id: &ApplicationId,
    ) -> WardenResult<()> {
        let affected = self.store.grant_application(role_id, application_id).await?;
        self.bus
            .publish(AccessEvent::permissions_changed(affected))?;
        Ok(())
    }

    /// Revokes an application from a role.
    pub async fn revoke_application(
        &self,
        role_id: &RoleId,
        application_id: &ApplicationId,
    ) -> WardenResult<()> {
        let affected = self
            .store
            .revoke_application(role_id, application_id)
            .await?;
        self.bus
            .publish(AccessEvent::permissions_changed(affected))?;
        Ok(())
    }

    /// Announces that the given users' effective claims are stale.
    pub async fn notify_permissions_changed(&self, user_ids: Vec<UserId>) -> WardenResult<()> {
        self.bus.publish(AccessEvent::permissions_changed(user_ids))?;
        Ok(())
    }

    /// Returns the store.
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Returns the bus.
    pub fn bus(&self) -> &Arc<AccessEventBus> {
        &self.bus
    }
}

impl<S: AccessStoreAdmin> std::fmt::Debug for AccessAdmin<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessAdmin").finish_non_exhaustive()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use warden_core::bus::AccessEventListener;
    use warden_core::event::AccessEventKind;
    use warden_core::types::User;
    use warden_store::MemoryStore;

    struct RecordingListener {
        events: Mutex<Vec<AccessEvent>>,
    }

    impl RecordingListener {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                events: Mutex::new(Vec::new()),
            })
        }

        fn events(&self) -> Vec<AccessEvent> {
            self.events.lock().unwrap().clone()
        }
    }

    impl AccessEventListener for RecordingListener {
        fn on_event(&self, event: &AccessEvent) {
            self.events.lock().unwrap().push(event.clone());
        }
    }

    async fn admin_with_listener() -> (AccessAdmin<MemoryStore>, Arc<RecordingListener>) {
        let store = Arc::new(MemoryStore::new());
        store
            .create_user(User::new("u1", "alice@example.com", "hash"))
            .await
            .unwrap();
        store.create_role(Role::new("r1", "editor")).await.unwrap();
        store
            .create_permission(Permission::new("p1", "posts:write"))
            .await
            .unwrap();

        let bus = Arc::new(AccessEventBus::with_defaults());
        let listener = RecordingListener::new();
        bus.add_listener(listener.clone());

        (AccessAdmin::new(store, bus), listener)
    }

    #[tokio::test]
    async fn test_assign_role_publishes_event() {
        let (admin, listener) = admin_with_listener().await;

        admin
            .assign_role(&UserId::new("u1"), &RoleId::new("r1"))
            .await
            .unwrap();

        let events = listener.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind, AccessEventKind::UserRoleAdded);
        assert_eq!(events[0].affected_user_ids(), &[UserId::new("u1")]);
    }

    #[tokio::test]
    async fn test_grant_permission_event_carries_role_holders() {
        let (admin, listener) = admin_with_listener().await;
        admin
            .assign_role(&UserId::new("u1"), &RoleId::new("r1"))
            .await
            .unwrap();

        admin
            .grant_permission(&RoleId::new("r1"), &PermissionId::new("p1"))
            .await
            .unwrap();

        let events = listener.events();
        let grant = events.last().unwrap();
        assert_eq!(grant.kind, AccessEventKind::RolePermissionAdded);
        assert_eq!(grant.affected_user_ids(), &[UserId::new("u1")]);
    }

    #[tokio::test]
    async fn test_failed_mutation_publishes_nothing() {
        let (admin, listener) = admin_with_listener().await;

        // Duplicate role name: the store rejects, no event must go out.
        let result = admin.create_role(Role::new("r2", "editor")).await;
        assert!(result.is_err());
        assert!(listener.events().is_empty());
    }

    #[tokio::test]
    async fn test_delete_role_event_names_previous_holders() {
        let (admin, listener) = admin_with_listener().await;
        admin
            .assign_role(&UserId::new("u1"), &RoleId::new("r1"))
            .await
            .unwrap();

        admin.delete_role(&RoleId::new("r1")).await.unwrap();

        let deleted = listener.events().into_iter().last().unwrap();
        assert_eq!(deleted.kind, AccessEventKind::RoleDeleted);
        assert_eq!(deleted.affected_user_ids(), &[UserId::new("u1")]);
    }
}
