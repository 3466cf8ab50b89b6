// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Access-change events.
//!
//! Every creation, update, or deletion of a role, permission, or join row
//! is announced on the event bus as an [`AccessEvent`] carrying the set of
//! user IDs whose effective claims became stale. The cache layer reacts to
//! that set; `UserPermissionsChanged` is the canonical kind other
//! subsystems should listen for.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::types::{PermissionId, RoleId, UserId};

// =============================================================================
// AccessEventKind
// =============================================================================

/// The kind of access change an event describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessEventKind {
    /// A role was assigned to a user.
    UserRoleAdded,
    /// A role was removed from a user.
    UserRoleRemoved,
    /// A permission was granted to a role.
    RolePermissionAdded,
    /// A permission was revoked from a role.
    RolePermissionRemoved,
    /// A role definition was created.
    RoleCreated,
    /// A role definition was updated.
    RoleUpdated,
    /// A role definition was deleted.
    RoleDeleted,
    /// A permission definition was created.
    PermissionCreated,
    /// A permission definition was updated.
    PermissionUpdated,
    /// A permission definition was deleted.
    PermissionDeleted,
    /// Catch-all: the effective claims of the affected users are stale.
    UserPermissionsChanged,
}

impl AccessEventKind {
    /// Returns the kind name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            AccessEventKind::UserRoleAdded => "user_role_added",
            AccessEventKind::UserRoleRemoved => "user_role_removed",
            AccessEventKind::RolePermissionAdded => "role_permission_added",
            AccessEventKind::RolePermissionRemoved => "role_permission_removed",
            AccessEventKind::RoleCreated => "role_created",
            AccessEventKind::RoleUpdated => "role_updated",
            AccessEventKind::RoleDeleted => "role_deleted",
            AccessEventKind::PermissionCreated => "permission_created",
            AccessEventKind::PermissionUpdated => "permission_updated",
            AccessEventKind::PermissionDeleted => "permission_deleted",
            AccessEventKind::UserPermissionsChanged => "user_permissions_changed",
        }
    }
}

impl fmt::Display for AccessEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// =============================================================================
// AccessEvent
// =============================================================================

/// A structured access-change event.
///
/// `affected_user_ids` may be empty for definition-only events that do not
/// yet target specific users (e.g. `RoleCreated` before any assignment).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessEvent {
    /// Unique event ID.
    pub id: Uuid,
    /// What changed.
    pub kind: AccessEventKind,
    /// The user directly involved, for user-join events.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<UserId>,
    /// The role involved, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role_id: Option<RoleId>,
    /// The permission involved, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub permission_id: Option<PermissionId>,
    /// Users whose effective claims are stale because of this change.
    #[serde(default)]
    pub affected_user_ids: Vec<UserId>,
    /// When the event was published.
    pub timestamp: DateTime<Utc>,
    /// Additional metadata.
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub metadata: serde_json::Value,
}

impl AccessEvent {
    fn base(kind: AccessEventKind) -> Self {
        Self {
            id: Uuid::now_v7(),
            kind,
            user_id: None,
            role_id: None,
            permission_id: None,
            affected_user_ids: Vec::new(),
            timestamp: Utc::now(),
            metadata: serde_json::Value::Null,
        }
    }

    /// A role was assigned to a user.
    pub fn user_role_added(user_id: UserId, role_id: RoleId) -> Self {
        let mut event = Self::base(AccessEventKind::UserRoleAdded);
        event.affected_user_ids = vec![user_id.clone()];
        event.user_id = Some(user_id);
        event.role_id = Some(role_id);
        event
    }

    /// A role was removed from a user.
    pub fn user_role_removed(user_id: UserId, role_id: RoleId) -> Self {
        let mut event = Self::base(AccessEventKind::UserRoleRemoved);
        event.affected_user_ids = vec![user_id.clone()];
        event.user_id = Some(user_id);
        event.role_id = Some(role_id);
        event
    }

    /// A permission was granted to a role held by `affected` users.
    pub fn role_permission_added(
        role_id: RoleId,
        permission_id: PermissionId,
        affected: Vec<UserId>,
    ) -> Self {
        let mut event = Self::base(AccessEventKind::RolePermissionAdded);
        event.role_id = Some(role_id);
        event.permission_id = Some(permission_id);
        event.affected_user_ids = affected;
        event
    }

    /// A permission was revoked from a role held by `affected` users.
    pub fn role_permission_removed(
        role_id: RoleId,
        permission_id: PermissionId,
        affected: Vec<UserId>,
    ) -> Self {
        let mut event = Self::base(AccessEventKind::RolePermissionRemoved);
        event.role_id = Some(role_id);
        event.permission_id = Some(permission_id);
        event.affected_user_ids = affected;
        event
    }

    /// A role definition was created.
    pub fn role_created(role_id: RoleId) -> Self {
        let mut event = Self::base(AccessEventKind::RoleCreated);
        event.role_id = Some(role_id);
        event
    }

    /// A role definition was updated.
    pub fn role_updated(role_id: RoleId, affected: Vec<UserId>) -> Self {
        let mut event = Self::base(AccessEventKind::RoleUpdated);
        event.role_id = Some(role_id);
        event.affected_user_ids = affected;
        event
    }

    /// A role definition was deleted.
    pub fn role_deleted(role_id: RoleId, affected: Vec<UserId>) -> Self {
        let mut event = Self::base(AccessEventKind::RoleDeleted);
        event.role_id = Some(role_id);
        event.affected_user_ids = affected;
        event
    }

    /// A permission definition was created.
    pub fn permission_created(permission_id: PermissionId) -> Self {
        let mut event = Self::base(AccessEventKind::PermissionCreated);
        event.permission_id = Some(permission_id);
        event
    }

    /// A permission definition was updated.
    pub fn permission_updated(permission_id: PermissionId, affected: Vec<UserId>) -> Self {
        let mut event = Self::base(AccessEventKind::PermissionUpdated);
        event.permission_id = Some(permission_id);
        event.affected_user_ids = affected;
        event
    }

    /// A permission definition was deleted.
    pub fn permission_deleted(permission_id: PermissionId, affected: Vec<UserId>) -> Self {
        let mut event = Self::base(AccessEventKind::PermissionDeleted);
        event.permission_id = Some(permission_id);
        event.affected_user_ids = affected;
        event
    }

    /// The effective claims of the given users are stale.
    pub fn permissions_changed(affected: Vec<UserId>) -> Self {
        let mut event = Self::base(AccessEventKind::UserPermissionsChanged);
        if affected.len() == 1 {
            event.user_id = Some(affected[0].clone());
        }
        event.affected_user_ids = affected;
        event
    }

    /// Attaches metadata.
    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = metadata;
        self
    }

    /// Returns the affected user IDs.
    pub fn affected_user_ids(&self) -> &[UserId] {
        &self.affected_user_ids
    }

    /// Returns `true` if this event invalidates at least one user.
    pub fn has_affected_users(&self) -> bool {
        !self.affected_user_ids.is_empty()
    }
}

// =============================================================================
// Tests
// =============================================================================
