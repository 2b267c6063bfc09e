// crates/survey-portal-core/src/core/roles.rs
// ============================================================================
// Module: Role Claims
// Description: Closed role claim enumeration and route access requirements.
// Purpose: Decode role claims once at the gate boundary into a typed value.
// Dependencies: serde, thiserror
// ============================================================================

//! ## Overview
//! Sessions carry a role claim drawn from a fixed set. The claim arrives as an
//! untyped string inside the identity backend's user metadata; [`Role::parse`]
//! is the single decoding point and rejects anything outside the set so an
//! unknown claim can never be passed through as an implicit grant.
//!
//! Role matching is exact equality. There is no hierarchy: an `admin` is not an
//! `analyst`, and a `super_admin` is not an `admin`.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Role
// ============================================================================

/// Portal role claim.
///
/// # Invariants
/// - Closed set; serialized spellings are the backend claim values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Platform operator with access to the super-admin portal.
    SuperAdmin,
    /// Organization administrator.
    Admin,
    /// Organization analyst with read-mostly dashboards.
    Analyst,
    /// Field surveyor collecting responses.
    Surveyor,
}

impl Role {
    /// All roles in declaration order.
    pub const ALL: [Self; 4] = [Self::SuperAdmin, Self::Admin, Self::Analyst, Self::Surveyor];

    /// Returns the stable claim spelling.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SuperAdmin => "super_admin",
            Self::Admin => "admin",
            Self::Analyst => "analyst",
            Self::Surveyor => "surveyor",
        }
    }

    /// Decodes a raw claim value. Returns `None` for anything outside the set.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|role| role.as_str() == raw)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = RoleParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::parse(value).ok_or_else(|| RoleParseError(value.to_string()))
    }
}

/// Raised when a role claim is not part of the closed set.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown role claim: {0}")]
pub struct RoleParseError(pub String);

// ============================================================================
// SECTION: Route Access
// ============================================================================

/// Access requirement attached to a route prefix.
///
/// Serialized as a single string: `public`, `authenticated`, or a role name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum RouteAccess {
    /// No session required.
    Public,
    /// Any resolved role is admitted.
    Authenticated,
    /// Exactly this role is admitted.
    Role(Role),
}

impl RouteAccess {
    /// Returns true when the access requirement needs a resolved session.
    #[must_use]
    pub const fn is_protected(self) -> bool {
        !matches!(self, Self::Public)
    }

    /// Returns true when a caller holding `role` satisfies the requirement.
    ///
    /// `None` represents an anonymous caller.
    #[must_use]
    pub fn admits(self, role: Option<Role>) -> bool {
        match self {
            Self::Public => true,
            Self::Authenticated => role.is_some(),
            Self::Role(required) => role == Some(required),
        }
    }

    /// Returns the stable string form.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::Authenticated => "authenticated",
            Self::Role(role) => role.as_str(),
        }
    }
}

impl fmt::Display for RouteAccess {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for RouteAccess {
    type Error = RoleParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl FromStr for RouteAccess {
    type Err = RoleParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "public" => Ok(Self::Public),
            "authenticated" => Ok(Self::Authenticated),
            other => other.parse().map(Self::Role),
        }
    }
}

impl From<RouteAccess> for String {
    fn from(value: RouteAccess) -> Self {
        value.as_str().to_string()
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, reason = "Test-only assertions.")]

    use super::Role;
    use super::RouteAccess;

    #[test]
    fn role_parse_rejects_unknown_and_case_variants() {
        assert_eq!(Role::parse("admin"), Some(Role::Admin));
        assert_eq!(Role::parse("Admin"), None);
        assert_eq!(Role::parse("owner"), None);
        assert_eq!(Role::parse(""), None);
    }

    #[test]
    fn role_access_is_exact_not_hierarchical() {
        let analyst_only = RouteAccess::Role(Role::Analyst);
        assert!(analyst_only.admits(Some(Role::Analyst)));
        assert!(!analyst_only.admits(Some(Role::Admin)));
        assert!(!analyst_only.admits(Some(Role::SuperAdmin)));
        assert!(!analyst_only.admits(None));
    }

    #[test]
    fn route_access_round_trips_as_string() {
        let parsed: RouteAccess = serde_json::from_str("\"super_admin\"").unwrap();
        assert_eq!(parsed, RouteAccess::Role(Role::SuperAdmin));
        assert_eq!(serde_json::to_string(&RouteAccess::Authenticated).unwrap(), "\"authenticated\"");
        assert!(serde_json::from_str::<RouteAccess>("\"root\"").is_err());
    }
}
