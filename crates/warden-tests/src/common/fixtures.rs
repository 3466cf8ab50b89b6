// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Test Fixtures
//!
//! Pre-seeded store scenarios for consistent and reproducible testing.
//!
//! The standard scenario covers every documented access-control property:
//! overlapping role permissions, an inactive application grant, a
//! suspended account, and a roleless account.

use std::sync::Arc;
use std::sync::OnceLock;

use warden_core::types::{Application, Permission, Role, User, UserId, UserStatus};
use warden_store::{AccessStoreAdmin, MemoryStore};

/// Password shared by every fixture user.
pub const FIXTURE_PASSWORD: &str = "fixture-password-123";

/// Returns the Argon2 hash of [`FIXTURE_PASSWORD`], computed once.
///
/// Hashing is deliberately slow; reusing one hash keeps the suites fast.
pub fn fixture_password_hash() -> &'static str {
    static HASH: OnceLock<String> = OnceLock::new();
    HASH.get_or_init(|| warden_api::hash_password(FIXTURE_PASSWORD).unwrap())
}

/// The standard WARDEN test scenario.
///
/// | user  | status    | roles          | notes                         |
/// |-------|-----------|----------------|-------------------------------|
/// | alice | active    | admin, auditor | overlapping `users:read`      |
/// | bob   | active    | editor         |                               |
/// | carol | active    | finance        | only grant is inactive app    |
/// | sam   | suspended | editor         | correct password still fails  |
/// | noel  | active    | (none)         | zero-role login block         |
pub struct AccessFixtures;

impl AccessFixtures {
    /// User IDs used by the standard scenario.
    pub fn alice() -> UserId {
        UserId::new("user-alice")
    }

    /// Bob: a single ordinary role.
    pub fn bob() -> UserId {
        UserId::new("user-bob")
    }

    /// Carol: only an inactive-application grant.
    pub fn carol() -> UserId {
        UserId::new("user-carol")
    }

    /// Sam: suspended.
    pub fn sam() -> UserId {
        UserId::new("user-sam")
    }

    /// Noel: zero roles.
    pub fn noel() -> UserId {
        UserId::new("user-noel")
    }

    /// Builds the standard scenario.
    pub async fn seeded_store() -> Arc<MemoryStore> {
        let store = MemoryStore::new();
        let hash = fixture_password_hash();

        // Users
        for (id, email, status) in [
            ("user-alice", "alice@example.com", UserStatus::Active),
            ("user-bob", "bob@example.com", UserStatus::Active),
            ("user-carol", "carol@example.com", UserStatus::Active),
            ("user-sam", "sam@example.com", UserStatus::Suspended),
            ("user-noel", "noel@example.com", UserStatus::Active),
        ] {
            store
                .create_user(User::new(id, email, hash).with_status(status))
                .await
                .unwrap();
        }

        // Roles
        for (id, name) in [
            ("role-admin", "admin"),
            ("role-auditor", "auditor"),
            ("role-editor", "editor"),
            ("role-finance", "finance"),
        ] {
            store.create_role(Role::new(id, name)).await.unwrap();
        }

        // Permissions
        for (id, name) in [
            ("perm-users-read", "users:read"),
            ("perm-users-delete", "users:delete"),
            ("perm-posts-write", "posts:write"),
        ] {
            store
                .create_permission(Permission::new(id, name))
                .await
                .unwrap();
        }

        // Applications
        store
            .create_application(Application::new("app-console", "Console", "/console"))
            .await
            .unwrap();
        store
            .create_application(
                Application::new("app-billing", "Billing", "/billing").with_active(false),
            )
            .await
            .unwrap();

        // Role grants: admin {users:read, users:delete}, auditor
        // {users:read}: the overlapping-permission scenario.
        for (role, perm) in [
            ("role-admin", "perm-users-read"),
            ("role-admin", "perm-users-delete"),
            ("role-auditor", "perm-users-read"),
            ("role-editor", "perm-posts-write"),
        ] {
            store
                .grant_permission(&role.into(), &perm.into())
                .await
                .unwrap();
        }
        store
            .grant_application(&"role-admin".into(), &"app-console".into())
            .await
            .unwrap();
        store
            .grant_application(&"role-finance".into(), &"app-billing".into())
            .await
            .unwrap();

        // Memberships
        for (user, role) in [
            ("user-alice", "role-admin"),
            ("user-alice", "role-auditor"),
            ("user-bob", "role-editor"),
            ("user-carol", "role-finance"),
            ("user-sam", "role-editor"),
        ] {
            store
                .assign_role(&user.into(), &role.into())
                .await
                .unwrap();
        }

        Arc::new(store)
    }
}
