// crates/survey-portal-core/src/core/mod.rs
// ============================================================================
// Module: Survey Portal Core Types
// Description: Canonical data model for surveys, answers, roles, and routes.
// Purpose: Group the serializable document types shared by every crate.
// Dependencies: serde, time
// ============================================================================

//! ## Overview
//! Core types mirror the stored JSON documents exactly. The survey structure
//! shape is a stable wire contract: stored definitions and in-flight responses
//! depend on it across version bumps, so field names and enum spellings here
//! must not drift.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod answers;
pub mod deadline;
pub mod hashing;
pub mod identifiers;
pub mod response;
pub mod roles;
pub mod route_policy;
pub mod structure;
pub mod survey;
pub mod timestamp;
pub mod validation;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use answers::AnswerValue;
pub use answers::Answers;
pub use deadline::DUE_SOON_DAYS;
pub use deadline::DeadlineStatus;
pub use deadline::deadline_status;
pub use hashing::Fingerprint;
pub use hashing::FingerprintError;
pub use hashing::fingerprint_json;
pub use hashing::fingerprint_token;
pub use identifiers::AssignmentId;
pub use identifiers::ProjectId;
pub use identifiers::QuestionId;
pub use identifiers::SectionId;
pub use identifiers::SurveyId;
pub use identifiers::UserId;
pub use response::GeoLocation;
pub use response::SurveyResponse;
pub use roles::Role;
pub use roles::RoleParseError;
pub use roles::RouteAccess;
pub use route_policy::PolicyError;
pub use route_policy::RoutePolicy;
pub use route_policy::RouteRule;
pub use route_policy::normalize_path;
pub use structure::ConditionOperator;
pub use structure::ConditionValue;
pub use structure::ConditionalAction;
pub use structure::ConditionalLogic;
pub use structure::ConditionalLogicCondition;
pub use structure::LogicCombinator;
pub use structure::Question;
pub use structure::QuestionType;
pub use structure::Section;
pub use structure::SurveyStructure;
pub use structure::ValidationKind;
pub use structure::ValidationRule;
pub use survey::RevisionOutcome;
pub use survey::Survey;
pub use survey::SurveyError;
pub use timestamp::Timestamp;
pub use validation::StructureErrors;
pub use validation::StructureIssue;
pub use validation::structure_issues;
pub use validation::validate_structure;
