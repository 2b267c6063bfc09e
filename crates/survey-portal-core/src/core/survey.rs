// crates/survey-portal-core/src/core/survey.rs
// ============================================================================
// Module: Survey Records
// Description: Survey record with structure revision and version pinning.
// Purpose: Keep assigned survey versions stable while authors keep editing.
// Dependencies: serde, serde_json, thiserror, time
// ============================================================================

//! ## Overview
//! Assignments pin a `(survey, version)` pair. Once a survey is assigned, a
//! structural edit must not rewrite the version surveyors are collecting
//! against, so [`Survey::revise_structure`] bumps the version whenever the
//! canonical fingerprint of the structure changes. Unassigned surveys are
//! edited in place.
//!
//! Revision validates the incoming structure first and leaves the record
//! untouched on failure.
//!
//! Deserialized records go through [`Survey::validate`], so a stored record
//! whose version counter disagrees with its structure never loads.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use time::Date;

use crate::core::deadline::DeadlineStatus;
use crate::core::deadline::deadline_status;
use crate::core::hashing::FingerprintError;
use crate::core::hashing::fingerprint_json;
use crate::core::identifiers::ProjectId;
use crate::core::identifiers::SurveyId;
use crate::core::structure::SurveyStructure;
use crate::core::timestamp::Timestamp;
use crate::core::validation::StructureErrors;
use crate::core::validation::validate_structure;

// ============================================================================
// SECTION: Survey Record
// ============================================================================

/// Survey record.
///
/// # Invariants
/// - `version >= 1` and never decreases.
/// - `structure.version == version` after every successful revision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "SurveyRecord")]
pub struct Survey {
    /// Survey identifier.
    pub id: SurveyId,
    /// Owning project.
    pub project_id: ProjectId,
    /// Display name.
    pub name: String,
    /// Optional description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Current structure.
    pub structure: SurveyStructure,
    /// Current version.
    pub version: u32,
    /// Collection deadline.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadline: Option<Timestamp>,
    /// Free-form metadata.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
    /// Creation instant.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<Timestamp>,
    /// Last update instant.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<Timestamp>,
}

/// Wire form of [`Survey`] before its invariants are checked.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SurveyRecord {
    /// Survey identifier.
    id: SurveyId,
    /// Owning project.
    project_id: ProjectId,
    /// Display name.
    name: String,
    /// Optional description.
    #[serde(default)]
    description: Option<String>,
    /// Current structure.
    structure: SurveyStructure,
    /// Current version.
    version: u32,
    /// Collection deadline.
    #[serde(default)]
    deadline: Option<Timestamp>,
    /// Free-form metadata.
    #[serde(default)]
    metadata: Option<Value>,
    /// Creation instant.
    #[serde(default)]
    created_at: Option<Timestamp>,
    /// Last update instant.
    #[serde(default)]
    updated_at: Option<Timestamp>,
}

impl TryFrom<SurveyRecord> for Survey {
    type Error = SurveyError;

    fn try_from(record: SurveyRecord) -> Result<Self, Self::Error> {
        let survey = Self {
            id: record.id,
            project_id: record.project_id,
            name: record.name,
            description: record.description,
            structure: record.structure,
            version: record.version,
            deadline: record.deadline,
            metadata: record.metadata,
            created_at: record.created_at,
            updated_at: record.updated_at,
        };
        survey.validate()?;
        Ok(survey)
    }
}

/// Result of a structure revision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RevisionOutcome {
    /// Structure content did not change.
    Unchanged,
    /// Structure replaced without a version change.
    UpdatedInPlace,
    /// Structure replaced and version advanced.
    VersionBumped {
        /// Version before the revision.
        from: u32,
        /// Version after the revision.
        to: u32,
    },
}

/// Errors raised by survey revisions.
#[derive(Debug, Error)]
pub enum SurveyError {
    /// The new structure is not sound.
    #[error(transparent)]
    InvalidStructure(#[from] StructureErrors),
    /// Structure belongs to a different survey.
    #[error("structure belongs to survey {found}, expected {expected}")]
    SurveyMismatch {
        /// Survey the record describes.
        expected: SurveyId,
        /// Survey named by the structure.
        found: SurveyId,
    },
    /// Fingerprinting failed.
    #[error(transparent)]
    Fingerprint(#[from] FingerprintError),
    /// Version counter exhausted.
    #[error("survey {0} version counter overflowed")]
    VersionOverflow(SurveyId),
    /// Versions start at 1.
    #[error("survey {0} has version 0; versions start at 1")]
    InvalidVersion(SurveyId),
    /// Record and structure disagree on the version.
    #[error("survey {survey} is at version {record} but its structure is at version {structure}")]
    VersionMismatch {
        /// Survey identifier.
        survey: SurveyId,
        /// Version on the record.
        record: u32,
        /// Version on the structure.
        structure: u32,
    },
}

impl Survey {
    /// Checks the record invariants.
    ///
    /// # Errors
    ///
    /// Returns [`SurveyError`] when the version is 0, the structure names a
    /// different survey, or the structure version differs from the record.
    pub fn validate(&self) -> Result<(), SurveyError> {
        if self.version == 0 {
            return Err(SurveyError::InvalidVersion(self.id.clone()));
        }
        if self.structure.survey_id != self.id {
            return Err(SurveyError::SurveyMismatch {
                expected: self.id.clone(),
                found: self.structure.survey_id.clone(),
            });
        }
        if self.structure.version != self.version {
            return Err(SurveyError::VersionMismatch {
                survey: self.id.clone(),
                record: self.version,
                structure: self.structure.version,
            });
        }
        Ok(())
    }

    /// Replaces the structure, bumping the version when the survey is assigned.
    ///
    /// The version field of `structure` is ignored for change detection and
    /// overwritten to match the record.
    ///
    /// # Errors
    ///
    /// Returns [`SurveyError`] when the record itself is inconsistent, the
    /// structure is unsound or belongs to a different survey, or the version
    /// counter would overflow.
    pub fn revise_structure(
        &mut self,
        mut structure: SurveyStructure,
        assigned: bool,
    ) -> Result<RevisionOutcome, SurveyError> {
        self.validate()?;
        if structure.survey_id != self.id {
            return Err(SurveyError::SurveyMismatch {
                expected: self.id.clone(),
                found: structure.survey_id,
            });
        }
        validate_structure(&structure)?;

        structure.version = self.version;
        let mut current = self.structure.clone();
        current.version = self.version;
        if fingerprint_json(&structure)? == fingerprint_json(&current)? {
            return Ok(RevisionOutcome::Unchanged);
        }

        if !assigned {
            self.structure = structure;
            return Ok(RevisionOutcome::UpdatedInPlace);
        }

        let from = self.version;
        let to = from.checked_add(1).ok_or_else(|| SurveyError::VersionOverflow(self.id.clone()))?;
        structure.version = to;
        self.structure = structure;
        self.version = to;
        Ok(RevisionOutcome::VersionBumped { from, to })
    }

    /// Returns the deadline badge relative to `today`, if a deadline is set.
    #[must_use]
    pub fn deadline_status(&self, today: Date) -> Option<DeadlineStatus> {
        self.deadline.map(|deadline| deadline_status(deadline.date(), today))
    }
}
