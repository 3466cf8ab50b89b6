// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Custom Test Assertions
//!
//! Domain-specific assertion helpers with informative failure messages.

use warden_api::{PermissionCheck, SessionClaims};
use warden_core::types::ResolvedAccess;

// =============================================================================
// SessionClaims Assertions
// =============================================================================

/// Assertion extensions for [`SessionClaims`].
pub trait SessionClaimsAssertions {
    /// Asserts the fail-closed shape: all collections empty, no elevated
    /// flag, no legacy role marker.
    fn assert_fail_closed(&self);

    /// Asserts the claims carry exactly the given role names (order
    /// ignored).
    fn assert_roles(&self, expected: &[&str]);

    /// Asserts the claims carry exactly the given permission names
    /// (order ignored).
    fn assert_permissions(&self, expected: &[&str]);
}

impl SessionClaimsAssertions for SessionClaims {
    fn assert_fail_closed(&self) {
        assert!(
            self.is_empty(),
            "expected fail-closed (all-empty) claims, got roles={:?} permissions={:?} \
             applications={:?} elevated={} role={:?}",
            self.role_names,
            self.permission_names,
            self.application_paths,
            self.elevated,
            self.role,
        );
    }

    fn assert_roles(&self, expected: &[&str]) {
        let mut actual = self.role_names.clone();
        let mut expected: Vec<String> = expected.iter().map(|s| s.to_string()).collect();
        actual.sort();
        expected.sort();
        assert_eq!(actual, expected, "role names mismatch");
    }

    fn assert_permissions(&self, expected: &[&str]) {
        let mut actual = self.permission_names.clone();
        let mut expected: Vec<String> = expected.iter().map(|s| s.to_string()).collect();
        actual.sort();
        expected.sort();
        assert_eq!(actual, expected, "permission names mismatch");
    }
}

// =============================================================================
// ResolvedAccess Assertions
// =============================================================================

/// Assertion extensions for [`ResolvedAccess`].
pub trait ResolvedAccessAssertions {
    /// Asserts resolution yielded exactly the given permission names.
    fn assert_permission_names(&self, expected: &[&str]);

    /// Asserts resolution yielded exactly the given application paths.
    fn assert_application_paths(&self, expected: &[&str]);
}

impl ResolvedAccessAssertions for ResolvedAccess {
    fn assert_permission_names(&self, expected: &[&str]) {
        let mut actual = self.permission_names();
        let mut expected: Vec<String> = expected.iter().map(|s| s.to_string()).collect();
        actual.sort();
        expected.sort();
        assert_eq!(actual, expected, "resolved permission names mismatch");
    }

    fn assert_application_paths(&self, expected: &[&str]) {
        let mut actual = self.application_paths();
        let mut expected: Vec<String> = expected.iter().map(|s| s.to_string()).collect();
        actual.sort();
        expected.sort();
        assert_eq!(actual, expected, "resolved application paths mismatch");
    }
}

// =============================================================================
// PermissionCheck Assertions
// =============================================================================

/// Assertion extensions for [`PermissionCheck`].
pub trait PermissionCheckAssertions {
    /// Asserts the check passed with nothing missing.
    fn assert_granted(&self);

    /// Asserts the check failed with exactly the given missing names.
    fn assert_denied_missing(&self, expected: &[&str]);
}

impl PermissionCheckAssertions for PermissionCheck {
    fn assert_granted(&self) {
        assert!(
            self.allowed && self.missing.is_empty(),
            "expected granted check, got allowed={} missing={:?}",
            self.allowed,
            self.missing,
        );
    }

    fn assert_denied_missing(&self, expected: &[&str]) {
        assert!(!self.allowed, "expected denied check, but it was allowed");
        let mut actual = self.missing.clone();
        let mut expected: Vec<String> = expected.iter().map(|s| s.to_string()).collect();
        actual.sort();
        expected.sort();
        assert_eq!(actual, expected, "missing permission names mismatch");
    }
}
