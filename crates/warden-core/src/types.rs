// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Core data types for WARDEN.
//!
//! This module provides the identity and access entities shared across
//! all WARDEN components.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// Identifiers
// =============================================================================

/// A unique identifier for a user.
///
/// User IDs should be stable across sessions and unique within a deployment.
///
/// # Examples
///
/// ```
/// use warden_core::types::UserId;
///
/// let id = UserId::new("user-001");
/// assert_eq!(id.as_str(), "user-001");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    /// Creates a new user ID.
    #[inline]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the ID as a string slice.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the ID and returns the inner string.
    #[inline]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for UserId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for UserId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl AsRef<str> for UserId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A unique identifier for a role.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoleId(String);

impl RoleId {
    /// Creates a new role ID.
    #[inline]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the ID as a string slice.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the ID and returns the inner string.
    #[inline]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for RoleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for RoleId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for RoleId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl AsRef<str> for RoleId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A unique identifier for a permission.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PermissionId(String);

impl PermissionId {
    /// Creates a new permission ID.
    #[inline]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the ID as a string slice.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the ID and returns the inner string.
    #[inline]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for PermissionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for PermissionId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for PermissionId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl AsRef<str> for PermissionId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A unique identifier for an application.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApplicationId(String);

impl ApplicationId {
    /// Creates a new application ID.
    #[inline]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the ID as a string slice.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the ID and returns the inner string.
    #[inline]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for ApplicationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for ApplicationId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ApplicationId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl AsRef<str> for ApplicationId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// =============================================================================
// UserStatus
// =============================================================================

/// Lifecycle status of a user account.
///
/// Only `Active` and `Pending` accounts may sign in; every other status
/// blocks token issuance regardless of credential correctness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserStatus {
    /// Account created but not yet confirmed.
    Pending,
    /// Account in good standing.
    Active,
    /// Account temporarily suspended by an administrator.
    Suspended,
    /// Account permanently banned.
    Banned,
    /// Account soft-deleted.
    Deleted,
    /// Account deactivated (e.g. dormant).
    Inactive,
}

impl UserStatus {
    /// Returns the status name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            UserStatus::Pending => "pending",
            UserStatus::Active => "active",
            UserStatus::Suspended => "suspended",
            UserStatus::Banned => "banned",
            UserStatus::Deleted => "deleted",
            UserStatus::Inactive => "inactive",
        }
    }

    /// Parses a status from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pending" => Some(UserStatus::Pending),
            "active" => Some(UserStatus::Active),
            "suspended" => Some(UserStatus::Suspended),
            "banned" => Some(UserStatus::Banned),
            "deleted" => Some(UserStatus::Deleted),
            "inactive" => Some(UserStatus::Inactive),
            _ => None,
        }
    }

    /// Returns `true` if an account with this status may sign in.
    pub fn is_login_eligible(&self) -> bool {
        matches!(self, UserStatus::Active | UserStatus::Pending)
    }
}

impl fmt::Display for UserStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// =============================================================================
// Entities
// =============================================================================

/// A user account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// User ID.
    pub id: UserId,
    /// Login email (unique).
    pub email: String,
    /// Display name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// Argon2 PHC password hash. Never serialized.
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    /// Account status.
    pub status: UserStatus,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Creates a new active user.
    pub fn new(id: impl Into<UserId>, email: impl Into<String>, password_hash: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            email: email.into(),
            display_name: None,
            password_hash: password_hash.into(),
            status: UserStatus::Active,
            created_at: Utc::now(),
        }
    }

    /// Sets the account status.
    pub fn with_status(mut self, status: UserStatus) -> Self {
        self.status = status;
        self
    }

    /// Sets the display name.
    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }
}

/// A named grouping of permissions and applications.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    /// Role ID.
    pub id: RoleId,
    /// Role name (unique).
    pub name: String,
    /// Role description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Role {
    /// Creates a new role.
    pub fn new(id: impl Into<RoleId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: None,
        }
    }

    /// Sets the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// A named capability owned by zero or more roles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permission {
    /// Permission ID.
    pub id: PermissionId,
    /// Permission name (unique), e.g. `users:read`.
    pub name: String,
    /// Permission description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Permission {
    /// Creates a new permission.
    pub fn new(id: impl Into<PermissionId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: None,
        }
    }

    /// Sets the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// A sub-system a user may access through role membership.
///
/// An inactive application never appears in a resolved access list, even
/// when a role grant exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Application {
    /// Application ID.
    pub id: ApplicationId,
    /// Application name.
    pub name: String,
    /// Routing path, e.g. `/billing`.
    pub path: String,
    /// Whether the application is currently enabled.
    pub is_active: bool,
}

impl Application {
    /// Creates a new active application.
    pub fn new(
        id: impl Into<ApplicationId>,
        name: impl Into<String>,
        path: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            path: path.into(),
            is_active: true,
        }
    }

    /// Sets the active flag.
    pub fn with_active(mut self, is_active: bool) -> Self {
        self.is_active = is_active;
        self
    }
}

// =============================================================================
// ResolvedAccess
// =============================================================================

/// The effective access of a user, computed from the store.
///
/// All three collections are unique by ID. Applications are pre-filtered to
/// active ones. Collection order carries no meaning.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResolvedAccess {
    /// Roles the user holds.
    pub roles: Vec<Role>,
    /// Union of permissions over all held roles.
    pub permissions: Vec<Permission>,
    /// Union of active applications over all held roles.
    pub applications: Vec<Application>,
}

impl ResolvedAccess {
    /// Creates an empty access set.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Returns `true` if the user holds at least one role.
    pub fn has_roles(&self) -> bool {
        !self.roles.is_empty()
    }

    /// Returns `true` if all three collections are empty.
    pub fn is_empty(&self) -> bool {
        self.roles.is_empty() && self.permissions.is_empty() && self.applications.is_empty()
    }

    /// Returns the role names.
    pub fn role_names(&self) -> Vec<String> {
        self.roles.iter().map(|r| r.name.clone()).collect()
    }

    /// Returns the permission names.
    pub fn permission_names(&self) -> Vec<String> {
        self.permissions.iter().map(|p| p.name.clone()).collect()
    }

    /// Returns the active application paths.
    pub fn application_paths(&self) -> Vec<String> {
        self.applications.iter().map(|a| a.path.clone()).collect()
    }

    /// Returns `true` if the user holds the named role.
    pub fn has_role(&self, name: &str) -> bool {
        self.roles.iter().any(|r| r.name == name)
    }

    /// Returns `true` if the user holds the named permission.
    pub fn has_permission(&self, name: &str) -> bool {
        self.permissions.iter().any(|p| p.name == name)
    }

    /// Returns `true` if the user may access the application at `path`.
    pub fn has_application_path(&self, path: &str) -> bool {
        self.applications.iter().any(|a| a.path == path)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_id_roundtrip() {
        let id = UserId::new("user-001");
        assert_eq!(id.as_str(), "user-001");
        assert_eq!(id.to_string(), "user-001");
        assert_eq!(UserId::from("user-001"), id);
    }

    #[test]
    fn test_status_parse() {
        assert_eq!(UserStatus::parse("active"), Some(UserStatus::Active));
        assert_eq!(UserStatus::parse("BANNED"), Some(UserStatus::Banned));
        assert_eq!(UserStatus::parse("unknown"), None);
    }

    #[test]
    fn test_status_login_eligibility() {
        assert!(UserStatus::Active.is_login_eligible());
        assert!(UserStatus::Pending.is_login_eligible());
        assert!(!UserStatus::Suspended.is_login_eligible());
        assert!(!UserStatus::Banned.is_login_eligible());
        assert!(!UserStatus::Deleted.is_login_eligible());
        assert!(!UserStatus::Inactive.is_login_eligible());
    }

    #[test]
    fn test_user_password_hash_not_serialized() {
        let user = User::new("u1", "admin@example.com", "$argon2id$stub");
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("argon2id"));
    }

    #[test]
    fn test_resolved_access_accessors() {
        let access = ResolvedAccess {
            roles: vec![Role::new("r1", "editor")],
            permissions: vec![Permission::new("p1", "posts:write")],
            applications: vec![Application::new("a1", "CMS", "/cms")],
        };

        assert!(access.has_roles());
        assert!(access.has_role("editor"));
        assert!(!access.has_role("admin"));
        assert!(access.has_permission("posts:write"));
        assert!(access.has_application_path("/cms"));
        assert_eq!(access.role_names(), vec!["editor".to_string()]);
        assert_eq!(access.application_paths(), vec!["/cms".to_string()]);
    }

    #[test]
    fn test_resolved_access_empty() {
        let access = ResolvedAccess::empty();
        assert!(access.is_empty());
        assert!(!access.has_roles());
        assert!(access.role_names().is_empty());
    }
}
