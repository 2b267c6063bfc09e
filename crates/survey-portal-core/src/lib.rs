// crates/survey-portal-core/src/lib.rs
// ============================================================================
// Module: Survey Portal Core Library
// Description: Public API surface for the survey portal core.
// Purpose: Expose the survey definition model, role claims, and evaluators.
// Dependencies: crate::{core, runtime}
// ============================================================================

//! ## Overview
//! Survey portal core owns the survey definition document model, the closed
//! role claim enumeration consumed by the access gate, and the pure evaluators
//! that run over survey structures: static structure validation, conditional
//! visibility, and answer validation. Nothing in this crate performs I/O; all
//! functions operate on already-fetched documents and are safe to call
//! concurrently.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod core;
pub mod runtime;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use core::*;

pub use runtime::AnswerErrors;
pub use runtime::AnswerIssue;
pub use runtime::EvaluationError;
pub use runtime::VisibilityEvaluator;
pub use runtime::VisibilityReport;
pub use runtime::check_answers;
pub use runtime::check_response;
pub use runtime::evaluate_condition;
pub use runtime::is_question_visible;
