// crates/survey-portal-core/src/core/response.rs
// ============================================================================
// Module: Survey Responses
// Description: Submitted survey response record.
// Purpose: Model an immutable collected response with optional location.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! A response is written once by a surveyor against an assignment and never
//! edited afterwards. Only the answers take part in validation; location,
//! notes, and metadata are carried through untouched.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

use crate::core::answers::Answers;
use crate::core::identifiers::AssignmentId;
use crate::core::timestamp::Timestamp;

// ============================================================================
// SECTION: Response
// ============================================================================

/// Submitted survey response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SurveyResponse {
    /// Assignment the response was collected under.
    pub assignment_id: AssignmentId,
    /// Collected answers.
    #[serde(default)]
    pub answers: Answers,
    /// Submission instant.
    pub submitted_at: Timestamp,
    /// Device location at submission.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<GeoLocation>,
    /// Free-form client metadata.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
    /// Surveyor notes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Device location.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoLocation {
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees.
    pub longitude: f64,
    /// Horizontal accuracy in meters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accuracy: Option<f64>,
}
