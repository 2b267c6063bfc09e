// crates/survey-portal-core/src/core/route_policy.rs
// ============================================================================
// Module: Route Access Policy
// Description: Longest-prefix route table mapping paths to access rules.
// Purpose: Resolve the access requirement for a request path deterministically.
// Dependencies: serde, thiserror, urlencoding
// ============================================================================

//! ## Overview
//! The route policy is an explicit table of `{ prefix, access }` rules.
//! Matching is longest-prefix on path-segment boundaries: `/admin` covers
//! `/admin` and `/admin/projects` but never `/administrator`. Duplicate
//! prefixes are rejected at construction, so a path never has two candidate
//! rules of equal length. Paths no rule covers are public.
//!
//! Request paths are normalized before matching: query and fragment are
//! dropped, each segment is percent-decoded, repeated slashes collapse, and
//! `.`/`..` segments are resolved. Without this, `//admin`, `/%61dmin`, or
//! `/public/../admin` would slip past a prefix.
//!
//! A segment that decodes to `/`, `\`, NUL, or invalid UTF-8 has no single
//! reading: an upstream may route it raw, decoded per segment, or decoded and
//! re-split. Such paths are matched under every reading and the strictest
//! rule wins, protected before public and then the longest prefix.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::borrow::Cow;
use std::collections::BTreeSet;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::core::roles::RouteAccess;

// ============================================================================
// SECTION: Rules
// ============================================================================

/// A single route table entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteRule {
    /// Absolute path prefix, without a trailing slash (except `/`).
    pub prefix: String,
    /// Access requirement for paths under the prefix.
    pub access: RouteAccess,
}

impl RouteRule {
    /// Creates a rule.
    #[must_use]
    pub fn new(prefix: impl Into<String>, access: RouteAccess) -> Self {
        Self {
            prefix: prefix.into(),
            access,
        }
    }

    /// Returns true when `path` (already normalized) lies under the prefix.
    #[must_use]
    pub fn covers(&self, path: &str) -> bool {
        if self.prefix == "/" {
            return true;
        }
        path.strip_prefix(self.prefix.as_str())
            .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
    }
}

/// Errors raised when building a route policy.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PolicyError {
    /// Prefix is not an absolute, normalized path.
    #[error("route prefix {prefix:?} is invalid: {reason}")]
    InvalidPrefix {
        /// Offending prefix.
        prefix: String,
        /// Why it was rejected.
        reason: &'static str,
    },
    /// Prefix declared more than once.
    #[error("route prefix {0:?} is declared more than once")]
    DuplicatePrefix(String),
}

// ============================================================================
// SECTION: Policy
// ============================================================================

/// Longest-prefix route policy.
///
/// # Invariants
/// - Prefixes are unique and normalized.
/// - Rules are held longest prefix first, so the first cover wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoutePolicy {
    /// Rules ordered by descending prefix length.
    rules: Vec<RouteRule>,
}

impl RoutePolicy {
    /// Builds a policy from rules in any order.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError`] for relative, non-normalized, or duplicate prefixes.
    pub fn new(rules: Vec<RouteRule>) -> Result<Self, PolicyError> {
        let mut seen = BTreeSet::new();
        for rule in &rules {
            validate_prefix(&rule.prefix)?;
            if !seen.insert(rule.prefix.as_str()) {
                return Err(PolicyError::DuplicatePrefix(rule.prefix.clone()));
            }
        }
        let mut rules = rules;
        rules.sort_by(|left, right| right.prefix.len().cmp(&left.prefix.len()));
        Ok(Self {
            rules,
        })
    }

    /// Returns the rule governing `path`, if any.
    #[must_use]
    pub fn matching_rule(&self, path: &str) -> Option<&RouteRule> {
        let mut chosen: Option<&RouteRule> = None;
        for form in match_forms(path) {
            let Some(rule) = self.rules.iter().find(|rule| rule.covers(&form)) else {
                continue;
            };
            chosen = match chosen {
                Some(current) if strictness(current) >= strictness(rule) => Some(current),
                _ => Some(rule),
            };
        }
        chosen
    }

    /// Returns the access requirement for `path`; unlisted paths are public.
    #[must_use]
    pub fn access_for(&self, path: &str) -> RouteAccess {
        self.matching_rule(path).map_or(RouteAccess::Public, |rule| rule.access)
    }

    /// Returns the rules, longest prefix first.
    #[must_use]
    pub fn rules(&self) -> &[RouteRule] {
        &self.rules
    }
}

// ============================================================================
// SECTION: Path Normalization
// ============================================================================

/// Normalizes a request path for matching.
///
/// Segments are percent-decoded individually; a decoded `/` stays inside its
/// segment.
#[must_use]
pub fn normalize_path(raw: &str) -> String {
    let segments = decoded_segments(raw);
    join_segments(segments.iter().map(String::as_str))
}

/// Returns every reading of `raw` the route table must answer for.
fn match_forms(raw: &str) -> Vec<String> {
    let segments = decoded_segments(raw);
    let per_segment = join_segments(segments.iter().map(String::as_str));
    if !segments.iter().any(|segment| is_ambiguous(segment)) {
        return vec![per_segment];
    }
    let flattened: String = segments
        .join("/")
        .chars()
        .filter(|ch| *ch != '\0' && *ch != char::REPLACEMENT_CHARACTER)
        .collect();
    let resplit = join_segments(flattened.split(['/', '\\']));
    let undecoded = join_segments(strip_suffix(raw).split('/'));
    vec![per_segment, resplit, undecoded]
}

/// Drops the query and fragment.
fn strip_suffix(raw: &str) -> &str {
    raw.split(['?', '#']).next().unwrap_or_default()
}

/// Splits on `/` and percent-decodes each segment.
fn decoded_segments(raw: &str) -> Vec<String> {
    strip_suffix(raw)
        .split('/')
        .map(|segment| match urlencoding::decode_binary(segment.as_bytes()) {
            Cow::Borrowed(_) => segment.to_string(),
            Cow::Owned(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
        })
        .collect()
}

/// True when a decoded segment could be read as more than one path.
fn is_ambiguous(segment: &str) -> bool {
    segment.contains(['/', '\\', '\0', char::REPLACEMENT_CHARACTER])
}

/// Joins segments into an absolute path, resolving `.` and `..`.
fn join_segments<'a>(segments: impl Iterator<Item = &'a str>) -> String {
    let mut resolved: Vec<&str> = Vec::new();
    for segment in segments {
        match segment {
            "" | "." => {}
            ".." => {
                resolved.pop();
            }
            other => resolved.push(other),
        }
    }
    let mut normalized = String::new();
    for segment in &resolved {
        normalized.push('/');
        normalized.push_str(segment);
    }
    if normalized.is_empty() {
        normalized.push('/');
    }
    normalized
}

/// Orders rules for ambiguous paths: protected first, then longest prefix.
fn strictness(rule: &RouteRule) -> (bool, usize) {
    (rule.access.is_protected(), rule.prefix.len())
}

/// Rejects prefixes that would never match a normalized path.
fn validate_prefix(prefix: &str) -> Result<(), PolicyError> {
    let invalid = |reason| PolicyError::InvalidPrefix {
        prefix: prefix.to_string(),
        reason,
    };
    if !prefix.starts_with('/') {
        return Err(invalid("must start with '/'"));
    }
    if normalize_path(prefix) != prefix {
        return Err(invalid("must be normalized without a trailing slash"));
    }
    Ok(())
}

// ============================================================================
// SECTION: Tests
// ============================================================================
