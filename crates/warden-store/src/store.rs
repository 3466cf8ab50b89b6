// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Store traits and interfaces.
//!
//! The access store is an external collaborator (in production a
//! relational database); WARDEN consumes it through a deliberately narrow
//! port:
//!
//! - one read that loads a user together with every role membership and
//!   each role's permission and application grants, the single round-trip
//!   the resolver needs;
//! - two point reads used by login-time checks (existence/status, and
//!   whether the user holds at least one role row).
//!
//! Mutations live on a separate [`AccessStoreAdmin`] trait so the
//! read-side components cannot accidentally depend on write capability.
//! Every admin mutation that touches grants returns the set of user IDs
//! whose effective claims became stale, which the caller must publish on
//! the event bus.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use warden_core::error::StoreResult;
use warden_core::types::{
    Application, ApplicationId, Permission, PermissionId, Role, RoleId, User, UserId,
};

// =============================================================================
// Records
// =============================================================================

/// A role membership together with the role's grants.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleGrant {
    /// The role itself.
    pub role: Role,
    /// Permissions granted through this role.
    pub permissions: Vec<Permission>,
    /// Applications granted through this role, including inactive ones.
    ///
    /// Filtering to active applications is the resolver's job, not the
    /// store's.
    pub applications: Vec<Application>,
}

/// Everything the resolver needs about one user, in one read.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserAccessRecord {
    /// The user.
    pub user: User,
    /// The user's role memberships with their grants.
    pub roles: Vec<RoleGrant>,
}

// =============================================================================
// AccessStore
// =============================================================================

/// Read-side port over the role/permission store.
#[async_trait]
pub trait AccessStore: Send + Sync {
    /// Loads a user with all role memberships and each role's permission
    /// and application grants.
    ///
    /// A missing user is [`StoreError::UserNotFound`], never an empty
    /// record.
    ///
    /// [`StoreError::UserNotFound`]: warden_core::error::StoreError::UserNotFound
    async fn load_user_access(&self, user_id: &UserId) -> StoreResult<UserAccessRecord>;

    /// Fetches a user by ID (existence and status checks).
    async fn find_user(&self, user_id: &UserId) -> StoreResult<User>;

    /// Fetches a user by login email.
    async fn find_user_by_email(&self, email: &str) -> StoreResult<User>;

    /// Returns `true` if the user holds at least one role row.
    async fn user_has_role(&self, user_id: &UserId) -> StoreResult<bool>;
}

// =============================================================================
// AccessStoreAdmin
// =============================================================================

/// Write-side port used by the administrative CRUD layer.
///
/// Methods that change who can do what return the affected user IDs; the
/// caller is responsible for publishing the matching change event.
#[async_trait]
pub trait AccessStoreAdmin: Send + Sync {
    /// Inserts a user.
    async fn create_user(&self, user: User) -> StoreResult<()>;

    /// Creates a role definition. Role names are unique.
    async fn create_role(&self, role: Role) -> StoreResult<()>;

    /// Updates a role definition. Returns the users holding it.
    async fn update_role(&self, role: Role) -> StoreResult<Vec<UserId>>;

    /// Deletes a role, cascading all join rows. Returns the users that
    /// held it.
    async fn delete_role(&self, role_id: &RoleId) -> StoreResult<Vec<UserId>>;

    /// Creates a permission definition. Permission names are unique.
    async fn create_permission(&self, permission: Permission) -> StoreResult<()>;

    /// Updates a permission definition. Returns the users holding it
    /// through any role.
    async fn update_permission(&self, permission: Permission) -> StoreResult<Vec<UserId>>;

    /// Deletes a permission, cascading all join rows. Returns the users
    /// that held it through any role.
    async fn delete_permission(&self, permission_id: &PermissionId) -> StoreResult<Vec<UserId>>;

    /// Creates an application definition.
    async fn create_application(&self, application: Application) -> StoreResult<()>;

    /// Enables or disables an application. Returns the users holding a
    /// role that grants it.
    async fn set_application_active(
        &self,
        application_id: &ApplicationId,
        is_active: bool,
    ) -> StoreResult<Vec<UserId>>;

    /// Assigns a role to a user.
    async fn assign_role(&self, user_id: &UserId, role_id: &RoleId) -> StoreResult<()>;

    /// Removes a role from a user.
    async fn revoke_role(&self, user_id: &UserId, role_id: &RoleId) -> StoreResult<()>;

    /// Grants a permission to a role. Returns the users holding the role.
    async fn grant_permission(
        &self,
        role_id: &RoleId,
        permission_id: &PermissionId,
    ) -> StoreResult<Vec<UserId>>;

    /// Revokes a permission from a role. Returns the users holding the
    /// role.
    async fn revoke_permission(
        &self,
        role_id: &RoleId,
        permission_id: &PermissionId,
    ) -> StoreResult<Vec<UserId>>;

    /// Grants an application to a role. Returns the users holding the
    /// role.
    async fn grant_application(
        &self,
        role_id: &RoleId,
        application_id: &ApplicationId,
    ) -> StoreResult<Vec<UserId>>;

    /// Revokes an application from a role. Returns the users holding the
    /// role.
    async fn revoke_application(
        &self,
        role_id: &RoleId,
        application_id: &ApplicationId,
    ) -> StoreResult<Vec<UserId>>;

    /// Returns the users holding a role.
    async fn users_with_role(&self, role_id: &RoleId) -> StoreResult<Vec<UserId>>;
}
