// crates/survey-portal-core/src/runtime/mod.rs
// ============================================================================
// Module: Survey Portal Runtime
// Description: Pure evaluators over survey structures and answers.
// Purpose: Evaluate conditional visibility and validate collected answers.
// Dependencies: crate::core
// ============================================================================

//! ## Overview
//! Runtime modules evaluate survey structures against answer sets. Every
//! entry point is synchronous, allocation-bounded by the input size, and free
//! of shared state, so callers may evaluate concurrently without locking.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod answer_check;
pub mod comparator;
pub mod visibility;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use answer_check::AnswerErrors;
pub use answer_check::AnswerIssue;
pub use answer_check::check_answers;
pub use answer_check::check_response;
pub use comparator::EvaluationError;
pub use comparator::evaluate_condition;
pub use visibility::VisibilityEvaluator;
pub use visibility::VisibilityReport;
pub use visibility::is_question_visible;
