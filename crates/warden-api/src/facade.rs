// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Permission check facade.
//!
//! Read-side predicates used by route and render guards. The free
//! functions operate purely on the claims already embedded in a session;
//! [`AccessFacade`] offers the same predicates computed fresh from the
//! store (through the cache) for callers that need authoritative answers
//! when a session's claims may be stale.
//!
//! Every predicate treats an absent session as denied: `allowed = false`
//! with `missing` listing the full requirement. Nothing here ever returns
//! an error for "not logged in", and store failures on the fresh path
//! fail closed to denial.

use serde::{Deserialize, Serialize};

use warden_access::CachedResolver;
use warden_core::types::UserId;

use crate::auth::SessionClaims;

// =============================================================================
// PermissionCheck
// =============================================================================

/// Result of a permission predicate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionCheck {
    /// Whether the requirement is satisfied.
    pub allowed: bool,
    /// Required permission names that are not present.
    pub missing: Vec<String>,
}

impl PermissionCheck {
    /// A satisfied check.
    pub fn granted() -> Self {
        Self {
            allowed: true,
            missing: Vec::new(),
        }
    }

    /// A denied check listing the gap.
    pub fn denied(missing: Vec<String>) -> Self {
        Self {
            allowed: false,
            missing,
        }
    }
}

// =============================================================================
// Claim-based predicates
// =============================================================================

fn missing_from(claims: &SessionClaims, required: &[&str]) -> Vec<String> {
    required
        .iter()
        .filter(|name| !claims.has_permission(name))
        .map(|name| name.to_string())
        .collect()
}

fn all_missing(required: &[&str]) -> Vec<String> {
    required.iter().map(|name| name.to_string()).collect()
}

/// Allowed iff every required permission name is present.
pub fn has_all_permissions(session: Option<&SessionClaims>, required: &[&str]) -> PermissionCheck {
    let Some(claims) = session else {
        return PermissionCheck::denied(all_missing(required));
    };

    let missing = missing_from(claims, required);
    if missing.is_empty() {
        PermissionCheck::granted()
    } else {
        PermissionCheck::denied(missing)
    }
}

/// Allowed iff at least one required permission name is present.
///
/// `missing` always lists the absent names, even when the check passes.
pub fn has_any_permission(session: Option<&SessionClaims>, required: &[&str]) -> PermissionCheck {
    let Some(claims) = session else {
        return PermissionCheck::denied(all_missing(required));
    };

    let missing = missing_from(claims, required);
    PermissionCheck {
        allowed: missing.len() < required.len(),
        missing,
    }
}

/// Returns `true` iff `path` appears among the active application paths.
pub fn has_application_access(session: Option<&SessionClaims>, path: &str) -> bool {
    session.is_some_and(|claims| claims.has_application_path(path))
}

/// Returns `true` iff the session carries the named role.
pub fn has_role(session: Option<&SessionClaims>, role: &str) -> bool {
    session.is_some_and(|claims| claims.has_role(role))
}

/// Returns `true` iff the session carries any of the named roles.
pub fn has_any_role(session: Option<&SessionClaims>, roles: &[&str]) -> bool {
    session.is_some_and(|claims| roles.iter().any(|role| claims.has_role(role)))
}

// =============================================================================
// AccessFacade
// =============================================================================

/// Fresh-from-the-store variants of the predicates.
///
/// Resolution goes through the cache, so the cost of "authoritative" is a
/// map lookup in the common case. Store failures deny rather than error:
/// authorization-data unavailability never widens privilege.
#[derive(Clone)]
pub struct AccessFacade {
    resolver: CachedResolver,
}

impl AccessFacade {
    /// Creates a facade over the cached resolver.
    pub fn new(resolver: CachedResolver) -> Self {
        Self { resolver }
    }

    async fn claims_for(&self, user_id: &UserId) -> Option<SessionClaims> {
        match self.resolver.resolve(user_id).await {
            Ok(access) => Some(SessionClaims {
                role_names: access.role_names(),
                permission_names: access.permission_names(),
                application_paths: access.application_paths(),
                elevated: false,
                role: None,
            }),
            Err(e) => {
                tracing::warn!(
                    error_type = e.error_type(),
                    "fresh permission check failed, denying"
                );
                None
            }
        }
    }

    /// Fresh variant of [`has_all_permissions`].
    pub async fn has_all_permissions(&self, user_id: &UserId, required: &[&str]) -> PermissionCheck {
        let claims = self.claims_for(user_id).await;
        has_all_permissions(claims.as_ref(), required)
    }

    /// Fresh variant of [`has_any_permission`].
    pub async fn has_any_permission(&self, user_id: &UserId, required: &[&str]) -> PermissionCheck {
        let claims = self.claims_for(user_id).await;
        has_any_permission(claims.as_ref(), required)
    }

    /// Fresh variant of [`has_application_access`].
    pub async fn has_application_access(&self, user_id: &UserId, path: &str) -> bool {
        let claims = self.claims_for(user_id).await;
        has_application_access(claims.as_ref(), path)
    }

    /// Fresh variant of [`has_role`].
    pub async fn has_role(&self, user_id: &UserId, role: &str) -> bool {
        let claims = self.claims_for(user_id).await;
        has_role(claims.as_ref(), role)
    }

    /// Fresh variant of [`has_any_role`].
    pub async fn has_any_role(&self, user_id: &UserId, roles: &[&str]) -> bool {
        let claims = self.claims_for(user_id).await;
        has_any_role(claims.as_ref(), roles)
    }

    /// Returns the underlying resolver.
    pub fn resolver(&self) -> &CachedResolver {
        &self.resolver
    }
}

impl std::fmt::Debug for AccessFacade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessFacade").finish_non_exhaustive()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn claims() -> SessionClaims {
        SessionClaims {
            role_names: vec!["editor".to_string(), "auditor".to_string()],
            permission_names: vec!["posts:read".to_string(), "posts:write".to_string()],
            application_paths: vec!["/cms".to_string()],
            elevated: false,
            role: Some("user".to_string()),
        }
    }

    #[test]
    fn test_has_all_permissions() {
        let claims = claims();

        let check = has_all_permissions(Some(&claims), &["posts:read", "posts:write"]);
        assert!(check.allowed);
        assert!(check.missing.is_empty());

        let check = has_all_permissions(Some(&claims), &["posts:read", "posts:delete"]);
        assert!(!check.allowed);
        assert_eq!(check.missing, vec!["posts:delete".to_string()]);
    }

    #[test]
    fn test_has_any_permission() {
        let claims = claims();

        let check = has_any_permission(Some(&claims), &["posts:delete", "posts:write"]);
        assert!(check.allowed);
        assert_eq!(check.missing, vec!["posts:delete".to_string()]);

        let check = has_any_permission(Some(&claims), &["posts:delete", "users:admin"]);
        assert!(!check.allowed);
        assert_eq!(check.missing.len(), 2);
    }

    #[test]
    fn test_absent_session_denies_with_full_missing_list() {
        let check = has_all_permissions(None, &["posts:read", "posts:write"]);
        assert!(!check.allowed);
        assert_eq!(
            check.missing,
            vec!["posts:read".to_string(), "posts:write".to_string()]
        );

        let check = has_any_permission(None, &["posts:read"]);
        assert!(!check.allowed);
        assert_eq!(check.missing, vec!["posts:read".to_string()]);

        assert!(!has_application_access(None, "/cms"));
        assert!(!has_role(None, "editor"));
        assert!(!has_any_role(None, &["editor", "auditor"]));
    }

    #[test]
    fn test_role_predicates() {
        let claims = claims();

        assert!(has_role(Some(&claims), "editor"));
        assert!(!has_role(Some(&claims), "admin"));
        assert!(has_any_role(Some(&claims), &["admin", "auditor"]));
        assert!(!has_any_role(Some(&claims), &["admin", "owner"]));
    }

    #[test]
    fn test_application_access() {
        let claims = claims();

        assert!(has_application_access(Some(&claims), "/cms"));
        assert!(!has_application_access(Some(&claims), "/billing"));
    }

    #[test]
    fn test_empty_requirements() {
        let claims = claims();

        // All of nothing is vacuously satisfied; any of nothing is not.
        assert!(has_all_permissions(Some(&claims), &[]).allowed);
        assert!(!has_any_permission(Some(&claims), &[]).allowed);
    }
}
