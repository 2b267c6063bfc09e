// crates/survey-portal-core/src/core/hashing.rs
// ============================================================================
// Module: Survey Portal Fingerprints
// Description: Canonical JSON fingerprints and session token fingerprints.
// Purpose: Detect structure changes and log tokens without exposing them.
// Dependencies: serde, serde_jcs, sha2
// ============================================================================

//! ## Overview
//! Structures are compared by fingerprint: the SHA-256 of their RFC 8785
//! (JCS) canonical JSON. Key order and whitespace therefore never count as a
//! change. Access tokens are fingerprinted the same way over their raw bytes
//! so audit records can correlate sessions without carrying bearer secrets.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::fmt::Write as _;

use serde::Deserialize;
use serde::Serialize;
use sha2::Digest;
use sha2::Sha256;
use thiserror::Error;

// ============================================================================
// SECTION: Fingerprint
// ============================================================================

/// Lowercase hex SHA-256 digest.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Digests raw bytes.
    #[must_use]
    pub fn of_bytes(bytes: &[u8]) -> Self {
        let digest = Sha256::digest(bytes);
        let mut hex = String::with_capacity(digest.len() * 2);
        for byte in digest {
            let _ = write!(hex, "{byte:02x}");
        }
        Self(hex)
    }

    /// Returns the hex digest.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the first `len` hex characters, for compact log fields.
    #[must_use]
    pub fn short(&self, len: usize) -> &str {
        &self.0[..len.min(self.0.len())]
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Raised when a value cannot be canonicalized.
#[derive(Debug, Error)]
#[error("failed to canonicalize json: {0}")]
pub struct FingerprintError(String);

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Fingerprints the canonical JSON form of `value`.
///
/// # Errors
///
/// Returns [`FingerprintError`] when serialization fails.
pub fn fingerprint_json<T: Serialize + ?Sized>(value: &T) -> Result<Fingerprint, FingerprintError> {
    let bytes = serde_jcs::to_vec(value).map_err(|err| FingerprintError(err.to_string()))?;
    Ok(Fingerprint::of_bytes(&bytes))
}

/// Fingerprints a session access token.
#[must_use]
pub fn fingerprint_token(token: &str) -> Fingerprint {
    Fingerprint::of_bytes(token.as_bytes())
}

// ============================================================================
// SECTION: Tests
// ============================================================================
