// crates/survey-portal-core/src/runtime/visibility.rs
// ============================================================================
// Module: Survey Visibility Evaluation
// Description: Conditional logic evaluation over a survey structure.
// Purpose: Decide which questions and sections a respondent sees.
// Dependencies: crate::core, crate::runtime::comparator
// ============================================================================

//! ## Overview
//! Visibility is a pure function of the structure and the current answers.
//! A question without logic, or with disabled logic, is always visible.
//! Otherwise every condition is evaluated and combined with the block's
//! combinator; the `show` action makes the combined result the visibility.
//!
//! Conditions read answers as given. A question hidden by its own logic can
//! still carry an answer that other conditions observe; callers that want
//! cascading hides must clear those answers first.
//!
//! Every condition is evaluated even after the combined result is known, so
//! a malformed condition is reported regardless of its position.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use serde::Serialize;

use crate::core::Answers;
use crate::core::ConditionalAction;
use crate::core::LogicCombinator;
use crate::core::Question;
use crate::core::QuestionId;
use crate::core::QuestionType;
use crate::core::SectionId;
use crate::core::SurveyStructure;
use crate::runtime::comparator::EvaluationError;
use crate::runtime::comparator::evaluate_condition;

// ============================================================================
// SECTION: Visibility Report
// ============================================================================

/// Visible questions and sections for one answer set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VisibilityReport {
    /// Visible question identifiers in render order.
    pub visible_questions: Vec<QuestionId>,
    /// Sections holding at least one visible question, in render order.
    pub visible_sections: Vec<SectionId>,
}

// ============================================================================
// SECTION: Visibility Evaluator
// ============================================================================

/// Evaluates conditional logic against a structure.
///
/// # Invariants
/// - Holds an immutable borrow of the structure; evaluation never mutates.
pub struct VisibilityEvaluator<'a> {
    /// Structure under evaluation.
    structure: &'a SurveyStructure,
    /// Question types keyed by identifier, for typed comparisons.
    types: BTreeMap<&'a QuestionId, QuestionType>,
}

impl<'a> VisibilityEvaluator<'a> {
    /// Indexes a structure for evaluation.
    #[must_use]
    pub fn new(structure: &'a SurveyStructure) -> Self {
        let types = structure.questions().map(|question| (&question.id, question.kind)).collect();
        Self {
            structure,
            types,
        }
    }

    /// Returns true when `question` is visible under `answers`.
    ///
    /// # Errors
    ///
    /// Returns [`EvaluationError`] for unsupported actions, missing condition
    /// values, and operator/answer type mismatches.
    pub fn is_visible(&self, question: &Question, answers: &Answers) -> Result<bool, EvaluationError> {
        let Some(logic) = &question.conditional_logic else {
            return Ok(true);
        };
        if !logic.enabled {
            return Ok(true);
        }

        let mut results = Vec::with_capacity(logic.conditions.len());
        for condition in &logic.conditions {
            let referenced_type = self.types.get(&condition.question_id).copied();
            let answer = answers.get(&condition.question_id);
            results.push(evaluate_condition(condition, referenced_type, answer)?);
        }
        let combined = match logic.logic {
            LogicCombinator::And => results.iter().all(|result| *result),
            LogicCombinator::Or => results.iter().any(|result| *result),
        };

        match &logic.action {
            ConditionalAction::Show => Ok(combined),
            ConditionalAction::Unrecognized(action) => Err(EvaluationError::UnsupportedAction {
                question_id: question.id.clone(),
                action: action.clone(),
            }),
        }
    }

    /// Returns the visible questions in render order.
    ///
    /// # Errors
    ///
    /// Returns the first [`EvaluationError`] encountered.
    pub fn visible_questions(&self, answers: &Answers) -> Result<Vec<QuestionId>, EvaluationError> {
        let mut visible = Vec::new();
        for question in self.structure.questions() {
            if self.is_visible(question, answers)? {
                visible.push(question.id.clone());
            }
        }
        Ok(visible)
    }

    /// Returns sections holding at least one visible question.
    ///
    /// # Errors
    ///
    /// Returns the first [`EvaluationError`] encountered.
    pub fn visible_sections(&self, answers: &Answers) -> Result<Vec<SectionId>, EvaluationError> {
        Ok(self.report(answers)?.visible_sections)
    }

    /// Evaluates the whole structure.
    ///
    /// # Errors
    ///
    /// Returns the first [`EvaluationError`] encountered.
    pub fn report(&self, answers: &Answers) -> Result<VisibilityReport, EvaluationError> {
        let mut report = VisibilityReport::default();
        for section in &self.structure.sections {
            let mut any_visible = false;
            for question in &section.questions {
                if self.is_visible(question, answers)? {
                    report.visible_questions.push(question.id.clone());
                    any_visible = true;
                }
            }
            if any_visible {
                report.visible_sections.push(section.id.clone());
            }
        }
        Ok(report)
    }
}

/// Evaluates the visibility of one question within `structure`.
///
/// # Errors
///
/// Returns [`EvaluationError`] as [`VisibilityEvaluator::is_visible`] does.
pub fn is_question_visible(
    question: &Question,
    structure: &SurveyStructure,
    answers: &Answers,
) -> Result<bool, EvaluationError> {
    VisibilityEvaluator::new(structure).is_visible(question, answers)
}
