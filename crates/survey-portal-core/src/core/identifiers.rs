// crates/survey-portal-core/src/core/identifiers.rs
// ============================================================================
// Module: Survey Portal Identifiers
// Description: Opaque identifiers for surveys, questions, and principals.
// Purpose: Provide strongly typed, serializable IDs with stable string forms.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Identifiers are opaque strings issued by the hosted backend (UUIDs for
//! records, author-chosen slugs for sections and questions). They serialize
//! transparently so the stored JSON documents keep their plain string shape.
//! Validation of uniqueness and references happens at structure boundaries,
//! not inside these wrappers.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::borrow::Borrow;
use std::fmt;

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Identifier Macro
// ============================================================================

/// Declares a transparent string identifier with the shared helper surface.
macro_rules! string_identifier {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Creates a new identifier.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Returns the identifier as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Returns true when the identifier is empty or whitespace only.
            #[must_use]
            pub fn is_blank(&self) -> bool {
                self.0.trim().is_empty()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self::new(value)
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self::new(value)
            }
        }

        impl Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }
    };
}

// ============================================================================
// SECTION: Identifier Types
// ============================================================================

string_identifier! {
    /// Survey record identifier.
    SurveyId
}

string_identifier! {
    /// Owning project identifier for a survey.
    ProjectId
}

string_identifier! {
    /// Section identifier within a survey structure.
    SectionId
}

string_identifier! {
    /// Question identifier, unique across a whole survey structure.
    ///
    /// Conditional logic addresses questions by this identifier, so it must
    /// never repeat across sections.
    QuestionId
}

string_identifier! {
    /// Assignment identifier pinning a surveyor to a survey version.
    AssignmentId
}

string_identifier! {
    /// Authenticated user identifier issued by the identity backend.
    UserId
}
