// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Test Builders
//!
//! Fluent construction of custom store scenarios with sensible defaults.
//!
//! ```rust,ignore
//! let store = ScenarioBuilder::new()
//!     .user("u1", "u1@example.com")
//!     .role("r1", "editor")
//!     .permission("p1", "posts:write")
//!     .grant("r1", "p1")
//!     .member("u1", "r1")
//!     .build()
//!     .await;
//! ```

use std::sync::Arc;

use warden_core::types::{Application, Permission, Role, User, UserStatus};
use warden_store::{AccessStoreAdmin, MemoryStore};

use super::fixtures::fixture_password_hash;

// =============================================================================
// ScenarioBuilder
// =============================================================================

/// Builder for custom store scenarios.
///
/// Every user gets the shared fixture password hash; statuses default to
/// active and applications to enabled.
#[derive(Default)]
pub struct ScenarioBuilder {
    users: Vec<User>,
    roles: Vec<Role>,
    permissions: Vec<Permission>,
    applications: Vec<Application>,
    permission_grants: Vec<(String, String)>,
    application_grants: Vec<(String, String)>,
    memberships: Vec<(String, String)>,
}

impl ScenarioBuilder {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an active user.
    pub fn user(mut self, id: &str, email: &str) -> Self {
        self.users
            .push(User::new(id, email, fixture_password_hash()));
        self
    }

    /// Adds a user with the given status.
    pub fn user_with_status(mut self, id: &str, email: &str, status: UserStatus) -> Self {
        self.users
            .push(User::new(id, email, fixture_password_hash()).with_status(status));
        self
    }

    /// Adds a role.
    pub fn role(mut self, id: &str, name: &str) -> Self {
        self.roles.push(Role::new(id, name));
        self
    }

    /// Adds a permission.
    pub fn permission(mut self, id: &str, name: &str) -> Self {
        self.permissions.push(Permission::new(id, name));
        self
    }

    /// Adds an active application.
    pub fn application(mut self, id: &str, name: &str, path: &str) -> Self {
        self.applications.push(Application::new(id, name, path));
        self
    }

    /// Adds an inactive application.
    pub fn inactive_application(mut self, id: &str, name: &str, path: &str) -> Self {
        self.applications
            .push(Application::new(id, name, path).with_active(false));
        self
    }

    /// Grants a permission to a role.
    pub fn grant(mut self, role_id: &str, permission_id: &str) -> Self {
        self.permission_grants
            .push((role_id.to_string(), permission_id.to_string()));
        self
    }

    /// Grants an application to a role.
    pub fn grant_app(mut self, role_id: &str, application_id: &str) -> Self {
        self.application_grants
            .push((role_id.to_string(), application_id.to_string()));
        self
    }

    /// Assigns a role to a user.
    pub fn member(mut self, user_id: &str, role_id: &str) -> Self {
        self.memberships
            .push((user_id.to_string(), role_id.to_string()));
        self
    }

    /// Applies the scenario to a fresh store.
    pub async fn build(self) -> Arc<MemoryStore> {
        let store = MemoryStore::new();

        for user in self.users {
            store.create_user(user).await.unwrap();
        }
        for role in self.roles {
            store.create_role(role).await.unwrap();
        }
        for permission in self.permissions {
            store.create_permission(permission).await.unwrap();
        }
        for application in self.applications {
            store.create_application(application).await.unwrap();
        }
        for (role, permission) in self.permission_grants {
            store
                .grant_permission(&role.as_str().into(), &permission.as_str().into())
                .await
                .unwrap();
        }
        for (role, application) in self.application_grants {
            store
                .grant_application(&role.as_str().into(), &application.as_str().into())
                .await
                .unwrap();
        }
        for (user, role) in self.memberships {
            store
                .assign_role(&user.as_str().into(), &role.as_str().into())
                .await
                .unwrap();
        }

        Arc::new(store)
    }
}
