// crates/survey-portal-core/src/core/timestamp.rs
// ============================================================================
// Module: Survey Portal Timestamps
// Description: RFC 3339 timestamp wrapper for stored survey documents.
// Purpose: Keep date-time fields typed while preserving their string shape.
// Dependencies: serde, time
// ============================================================================

//! ## Overview
//! Survey records and responses store instants as RFC 3339 strings. The
//! [`Timestamp`] wrapper parses them on the way in and formats them on the way
//! out, so comparisons happen on real instants and never on string order.
//! The core never reads the wall clock; callers supply "now".

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;
use serde::Serializer;
use serde::de::Error as _;
use time::Date;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

// ============================================================================
// SECTION: Timestamp
// ============================================================================

/// RFC 3339 instant.
///
/// # Invariants
/// - Always holds a parseable instant; invalid strings are rejected on decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(OffsetDateTime);

impl Timestamp {
    /// Wraps an existing instant.
    #[must_use]
    pub const fn new(value: OffsetDateTime) -> Self {
        Self(value)
    }

    /// Parses an RFC 3339 string.
    ///
    /// # Errors
    ///
    /// Returns [`time::error::Parse`] when the string is not RFC 3339.
    pub fn parse(raw: &str) -> Result<Self, time::error::Parse> {
        OffsetDateTime::parse(raw, &Rfc3339).map(Self)
    }

    /// Returns the wrapped instant.
    #[must_use]
    pub const fn as_offset_date_time(&self) -> OffsetDateTime {
        self.0
    }

    /// Returns the calendar date in the instant's own offset.
    #[must_use]
    pub const fn date(&self) -> Date {
        self.0.date()
    }

    /// Returns unix epoch milliseconds.
    #[must_use]
    pub fn unix_millis(&self) -> i128 {
        self.0.unix_timestamp_nanos() / 1_000_000
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.format(&Rfc3339) {
            Ok(rendered) => f.write_str(&rendered),
            Err(_) => Err(fmt::Error),
        }
    }
}

impl From<OffsetDateTime> for Timestamp {
    fn from(value: OffsetDateTime) -> Self {
        Self(value)
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let rendered = self.0.format(&Rfc3339).map_err(serde::ser::Error::custom)?;
        serializer.serialize_str(&rendered)
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(|err| D::Error::custom(format!("invalid timestamp {raw}: {err}")))
    }
}
