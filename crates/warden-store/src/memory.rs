// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! In-memory store backend.
//!
//! Reference implementation of [`AccessStore`] and [`AccessStoreAdmin`]
//! backed by plain maps. Used by the test suites and the demo binary; a
//! production deployment puts a relational database behind the same
//! traits.
//!
//! The store supports outage injection via [`MemoryStore::set_unavailable`]
//! so callers can exercise their fail-closed paths.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use warden_core::error::{StoreError, StoreResult};
use warden_core::types::{
    Application, ApplicationId, Permission, PermissionId, Role, RoleId, User, UserId,
};

use crate::store::{AccessStore, AccessStoreAdmin, RoleGrant, UserAccessRecord};

// =============================================================================
// Tables
// =============================================================================

/// Entity and join tables.
#[derive(Debug, Default)]
struct Tables {
    users: HashMap<UserId, User>,
    roles: HashMap<RoleId, Role>,
    permissions: HashMap<PermissionId, Permission>,
    applications: HashMap<ApplicationId, Application>,
    user_roles: HashSet<(UserId, RoleId)>,
    role_permissions: HashSet<(RoleId, PermissionId)>,
    role_applications: HashSet<(RoleId, ApplicationId)>,
}

impl Tables {
    fn role_ids_of(&self, user_id: &UserId) -> Vec<RoleId> {
        self.user_roles
            .iter()
            .filter(|(u, _)| u == user_id)
            .map(|(_, r)| r.clone())
            .collect()
    }

    fn users_holding_role(&self, role_id: &RoleId) -> Vec<UserId> {
        self.user_roles
            .iter()
            .filter(|(_, r)| r == role_id)
            .map(|(u, _)| u.clone())
            .collect()
    }

    fn users_holding_permission(&self, permission_id: &PermissionId) -> Vec<UserId> {
        let roles: HashSet<&RoleId> = self
            .role_permissions
            .iter()
            .filter(|(_, p)| p == permission_id)
            .map(|(r, _)| r)
            .collect();

        let mut users: Vec<UserId> = self
            .user_roles
            .iter()
            .filter(|(_, r)| roles.contains(r))
            .map(|(u, _)| u.clone())
            .collect();
        users.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        users.dedup();
        users
    }

    fn users_holding_application(&self, application_id: &ApplicationId) -> Vec<UserId> {
        let roles: HashSet<&RoleId> = self
            .role_applications
            .iter()
            .filter(|(_, a)| a == application_id)
            .map(|(r, _)| r)
            .collect();

        let mut users: Vec<UserId> = self
            .user_roles
            .iter()
            .filter(|(_, r)| roles.contains(r))
            .map(|(u, _)| u.clone())
            .collect();
        users.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        users.dedup();
        users
    }
}

// =============================================================================
// MemoryStore
// =============================================================================

/// In-memory [`AccessStore`] and [`AccessStoreAdmin`] implementation.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
    unavailable: AtomicBool,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Injects (or clears) a simulated outage.
    ///
    /// While unavailable, every trait method returns
    /// [`StoreError::Unavailable`].
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::Release);
    }

    fn check_available(&self) -> StoreResult<()> {
        if self.unavailable.load(Ordering::Acquire) {
            Err(StoreError::unavailable("simulated store outage"))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl AccessStore for MemoryStore {
    async fn load_user_access(&self, user_id: &UserId) -> StoreResult<UserAccessRecord> {
        self.check_available()?;
        let tables = self.tables.read().await;

        let user = tables
            .users
            .get(user_id)
            .cloned()
            .ok_or_else(|| StoreError::user_not_found(user_id.as_str()))?;

        let mut roles = Vec::new();
        for role_id in tables.role_ids_of(user_id) {
            let Some(role) = tables.roles.get(&role_id).cloned() else {
                continue;
            };

            let permissions = tables
                .role_permissions
                .iter()
                .filter(|(r, _)| *r == role_id)
                .filter_map(|(_, p)| tables.permissions.get(p).cloned())
                .collect();

            let applications = tables
                .role_applications
                .iter()
                .filter(|(r, _)| *r == role_id)
                .filter_map(|(_, a)| tables.applications.get(a).cloned())
                .collect();

            roles.push(RoleGrant {
                role,
                permissions,
                applications,
            });
        }

        Ok(UserAccessRecord { user, roles })
    }

    async fn find_user(&self, user_id: &UserId) -> StoreResult<User> {
        self.check_available()?;
        self.tables
            .read()
            .await
            .users
            .get(user_id)
            .cloned()
            .ok_or_else(|| StoreError::user_not_found(user_id.as_str()))
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<User> {
        self.check_available()?;
        self.tables
            .read()
            .await
            .users
            .values()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned()
            .ok_or_else(|| StoreError::user_not_found(email))
    }

    async fn user_has_role(&self, user_id: &UserId) -> StoreResult<bool> {
        self.check_available()?;
        let tables = self.tables.read().await;

        if !tables.users.contains_key(user_id) {
            return Err(StoreError::user_not_found(user_id.as_str()));
        }

        Ok(tables.user_roles.iter().any(|(u, _)| u == user_id))
    }
}

#[async_trait]
impl AccessStoreAdmin for MemoryStore {
    async fn create_user(&self, user: User) -> StoreResult<()> {
        self.check_available()?;
        let mut tables = self.tables.write().await;

        if tables
            .users
            .values()
            .any(|u| u.email.eq_ignore_ascii_case(&user.email))
        {
            return Err(StoreError::conflict(format!(
                "email already registered: {}",
                user.email
            )));
        }

        tables.users.insert(user.id.clone(), user);
        Ok(())
    }

    async fn create_role(&self, role: Role) -> StoreResult<()> {
        self.check_available()?;
        let mut tables = self.tables.write().await;

        if tables.roles.values().any(|r| r.name == role.name) {
            return Err(StoreError::conflict(format!(
                "role name already exists: {}",
                role.name
            )));
        }

        tables.roles.insert(role.id.clone(), role);
        Ok(())
    }

    async fn update_role(&self, role: Role) -> StoreResult<Vec<UserId>> {
        self.check_available()?;
        let mut tables = self.tables.write().await;

        if !tables.roles.contains_key(&role.id) {
            return Err(StoreError::role_not_found(role.id.as_str()));
        }

        let affected = tables.users_holding_role(&role.id);
        tables.roles.insert(role.id.clone(), role);
        Ok(affected)
    }

    async fn delete_role(&self, role_id: &RoleId) -> StoreResult<Vec<UserId>> {
        self.check_available()?;
        let mut tables = self.tables.write().await;

        if tables.roles.remove(role_id).is_none() {
            return Err(StoreError::role_not_found(role_id.as_str()));
        }

        let affected = tables.users_holding_role(role_id);
        tables.user_roles.retain(|(_, r)| r != role_id);
        tables.role_permissions.retain(|(r, _)| r != role_id);
        tables.role_applications.retain(|(r, _)| r != role_id);
        Ok(affected)
    }

    async fn create_permission(&self, permission: Permission) -> StoreResult<()> {
        self.check_available()?;
        let mut tables = self.tables.write().await;

        if tables.permissions.values().any(|p| p.name == permission.name) {
            return Err(StoreError::conflict(format!(
                "permission name already exists: {}",
                permission.name
            )));
        }

        tables.permissions.insert(permission.id.clone(), permission);
        Ok(())
    }

    async fn update_permission(&self, permission: Permission) -> StoreResult<Vec<UserId>> {
        self.check_available()?;
        let mut tables = self.tables.write().await;

        if !tables.permissions.contains_key(&permission.id) {
            return Err(StoreError::permission_not_found(permission.id.as_str()));
        }

        let affected = tables.users_holding_permission(&permission.id);
        tables.permissions.insert(permission.id.clone(), permission);
        Ok(affected)
    }

    async fn delete_permission(&self, permission_id: &PermissionId) -> StoreResult<Vec<UserId>> {
        self.check_available()?;
        let mut tables = self.tables.write().await;

        if tables.permissions.remove(permission_id).is_none() {
            return Err(StoreError::permission_not_found(permission_id.as_str()));
        }

        let affected = tables.users_holding_permission(permission_id);
        tables.role_permissions.retain(|(_, p)| p != permission_id);
        Ok(affected)
    }

    async fn create_application(&self, application: Application) -> StoreResult<()> {
        self.check_available()?;
        let mut tables = self.tables.write().await;
        tables
            .applications
            .insert(application.id.clone(), application);
        Ok(())
    }

    async fn set_application_active(
        &self,
        application_id: &ApplicationId,
        is_active: bool,
    ) -> StoreResult<Vec<UserId>> {
        self.check_available()?;
        let mut tables = self.tables.write().await;

        let affected = tables.users_holding_application(application_id);
        match tables.applications.get_mut(application_id) {
            Some(application) => {
                application.is_active = is_active;
                Ok(affected)
            }
            None => Err(StoreError::application_not_found(application_id.as_str())),
        }
    }

    async fn assign_role(&self, user_id: &UserId, role_id: &RoleId) -> StoreResult<()> {
        self.check_available()?;
        let mut tables = self.tables.write().await;

        if !tables.users.contains_key(user_id) {
            return Err(StoreError::user_not_found(user_id.as_str()));
        }
        if !tables.roles.contains_key(role_id) {
            return Err(StoreError::role_not_found(role_id.as_str()));
        }

        tables.user_roles.insert((user_id.clone(), role_id.clone()));
        Ok(())
    }

    async fn revoke_role(&self, user_id: &UserId, role_id: &RoleId) -> StoreResult<()> {
        self.check_available()?;
        let mut tables = self.tables.write().await;
        tables
            .user_roles
            .remove(&(user_id.clone(), role_id.clone()));
        Ok(())
    }

    async fn grant_permission(
        &self,
        role_id: &RoleId,
        permission_id: &PermissionId,
    ) -> StoreResult<Vec<UserId>> {
        self.check_available()?;
        let mut tables = self.tables.write().await;

        if !tables.roles.contains_key(role_id) {
            return Err(StoreError::role_not_found(role_id.as_str()));
        }
        if !tables.permissions.contains_key(permission_id) {
            return Err(StoreError::permission_not_found(permission_id.as_str()));
        }

        tables
            .role_permissions
            .insert((role_id.clone(), permission_id.clone()));
        Ok(tables.users_holding_role(role_id))
    }

    async fn revoke_permission(
        &self,
        role_id: &RoleId,
        permission_id: &PermissionId,
    ) -> StoreResult<Vec<UserId>> {
        self.check_available()?;
        let mut tables = self.tables.write().await;
        tables
            .role_permissions
            .remove(&(role_id.clone(), permission_id.clone()));
        Ok(tables.users_holding_role(role_id))
    }

    async fn grant_application(
        &self,
        role_id: &RoleId,
        application_id: &ApplicationId,
    ) -> StoreResult<Vec<UserId>> {
        self.check_available()?;
        let mut tables = self.tables.write().await;

        if !tables.roles.contains_key(role_id) {
            return Err(StoreError::role_not_found(role_id.as_str()));
        }
        if !tables.applications.contains_key(application_id) {
            return Err(StoreError::application_not_found(application_id.as_str()));
        }

        tables
            .role_applications
            .insert((role_id.clone(), application_id.clone()));
        Ok(tables.users_holding_role(role_id))
    }

    async fn revoke_application(
        &self,
        role_id: &RoleId,
        application_id: &ApplicationId,
    ) -> StoreResult<Vec<UserId>> {
        self.check_available()?;
        let mut tables = self.tables.write().await;
        tables
            .role_applications
            .remove(&(role_id.clone(), application_id.clone()));
        Ok(tables.users_holding_role(role_id))
    }

    async fn users_with_role(&self, role_id: &RoleId) -> StoreResult<Vec<UserId>> {
        self.check_available()?;
        Ok(self.tables.read().await.users_holding_role(role_id))
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    async fn seeded_store() -> MemoryStore {
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
            .create_application(Application::new("a1", "CMS", "/cms"))
            .await
            .unwrap();

        store
            .assign_role(&UserId::new("u1"), &RoleId::new("r1"))
            .await
            .unwrap();
        store
            .grant_permission(&RoleId::new("r1"), &PermissionId::new("p1"))
            .await
            .unwrap();
        store
            .grant_application(&RoleId::new("r1"), &ApplicationId::new("a1"))
            .await
            .unwrap();

        store
    }

    #[tokio::test]
    async fn test_load_user_access_joins_grants() {
        let store = seeded_store().await;

        let record = store.load_user_access(&UserId::new("u1")).await.unwrap();

        assert_eq!(record.user.email, "alice@example.com");
        assert_eq!(record.roles.len(), 1);
        assert_eq!(record.roles[0].role.name, "editor");
        assert_eq!(record.roles[0].permissions.len(), 1);
        assert_eq!(record.roles[0].applications.len(), 1);
    }

    #[tokio::test]
    async fn test_missing_user_is_an_error() {
        let store = MemoryStore::new();

        let err = store
            .load_user_access(&UserId::new("nobody"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::UserNotFound { .. }));
    }

    #[tokio::test]
    async fn test_find_user_by_email_case_insensitive() {
        let store = seeded_store().await;

        let user = store.find_user_by_email("Alice@Example.COM").await.unwrap();
        assert_eq!(user.id, UserId::new("u1"));
    }

    #[tokio::test]
    async fn test_user_has_role() {
        let store = seeded_store().await;

        assert!(store.user_has_role(&UserId::new("u1")).await.unwrap());

        store
            .revoke_role(&UserId::new("u1"), &RoleId::new("r1"))
            .await
            .unwrap();
        assert!(!store.user_has_role(&UserId::new("u1")).await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_role_cascades_joins() {
        let store = seeded_store().await;

        let affected = store.delete_role(&RoleId::new("r1")).await.unwrap();
        assert_eq!(affected, vec![UserId::new("u1")]);

        let record = store.load_user_access(&UserId::new("u1")).await.unwrap();
        assert!(record.roles.is_empty());
        assert!(!store.user_has_role(&UserId::new("u1")).await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_permission_cascades_joins() {
        let store = seeded_store().await;

        let affected = store
            .delete_permission(&PermissionId::new("p1"))
            .await
            .unwrap();
        assert_eq!(affected, vec![UserId::new("u1")]);

        let record = store.load_user_access(&UserId::new("u1")).await.unwrap();
        assert!(record.roles[0].permissions.is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_role_name_conflicts() {
        let store = seeded_store().await;

        let err = store
            .create_role(Role::new("r2", "editor"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict { .. }));
    }

    #[tokio::test]
    async fn test_outage_injection() {
        let store = seeded_store().await;
        store.set_unavailable(true);

        let err = store
            .load_user_access(&UserId::new("u1"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Unavailable { .. }));
        assert!(err.is_retryable());

        store.set_unavailable(false);
        assert!(store.load_user_access(&UserId::new("u1")).await.is_ok());
    }

    #[tokio::test]
    async fn test_grant_permission_reports_affected_users() {
        let store = seeded_store().await;
        store
            .create_user(User::new("u2", "bob@example.com", "hash"))
            .await
            .unwrap();
        store
            .assign_role(&UserId::new("u2"), &RoleId::new("r1"))
            .await
            .unwrap();
        store
            .create_permission(Permission::new("p2", "posts:delete"))
            .await
            .unwrap();

        let mut affected = store
            .grant_permission(&RoleId::new("r1"), &PermissionId::new("p2"))
            .await
            .unwrap();
        affected.sort_by(|a, b| a.as_str().cmp(b.as_str()));

        assert_eq!(affected, vec![UserId::new("u1"), UserId::new("u2")]);
    }
}
