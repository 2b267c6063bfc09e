// crates/survey-portal-core/src/core/validation.rs
// ============================================================================
// Module: Survey Structure Validation
// Description: Static soundness checks for survey structure documents.
// Purpose: Reject structures that would evaluate ambiguously or not at all.
// Dependencies: regex, serde, thiserror
// ============================================================================

//! ## Overview
//! Structure validation runs before a structure is saved or evaluated. It
//! walks the whole document once and collects every issue rather than
//! stopping at the first, so an author sees the full list in one pass.
//!
//! Checks cover identifier uniqueness, validation rules that do not fit the
//! question type, rules missing their comparison value, choice questions
//! without options, and conditional logic that points nowhere or compares
//! against nothing. Conditions are checked even when their logic block is
//! disabled: re-enabling it must not surface latent breakage.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;
use std::fmt;

use regex::Regex;
use serde::Serialize;
use thiserror::Error;

use crate::core::identifiers::QuestionId;
use crate::core::identifiers::SectionId;
use crate::core::structure::ConditionOperator;
use crate::core::structure::ConditionValue;
use crate::core::structure::ConditionalAction;
use crate::core::structure::Question;
use crate::core::structure::QuestionType;
use crate::core::structure::SurveyStructure;
use crate::core::structure::ValidationKind;
use crate::core::structure::ValidationRule;

// ============================================================================
// SECTION: Issues
// ============================================================================

/// A single structure soundness violation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
#[serde(tag = "kind", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum StructureIssue {
    /// Section identifier appears more than once.
    #[error("section {section_id} is declared more than once")]
    DuplicateSectionId {
        /// Repeated section identifier.
        section_id: SectionId,
    },
    /// Question identifier appears more than once across all sections.
    #[error("question {question_id} is declared more than once")]
    DuplicateQuestionId {
        /// Repeated question identifier.
        question_id: QuestionId,
    },
    /// Condition references a question that does not exist.
    #[error("question {question_id} has a condition on unknown question {referenced}")]
    DanglingReference {
        /// Question owning the condition.
        question_id: QuestionId,
        /// Missing referenced question.
        referenced: QuestionId,
    },
    /// Condition references the question that owns it.
    #[error("question {question_id} has a condition on itself")]
    SelfReference {
        /// Question owning the condition.
        question_id: QuestionId,
    },
    /// Comparison operator without a comparison value.
    #[error("question {question_id} has a {operator} condition without a value")]
    MissingConditionValue {
        /// Question owning the condition.
        question_id: QuestionId,
        /// Operator lacking its value.
        operator: ConditionOperator,
    },
    /// Conditional logic action outside the supported set.
    #[error("question {question_id} uses unsupported conditional action {action}")]
    UnsupportedAction {
        /// Question owning the logic.
        question_id: QuestionId,
        /// Action spelling as stored.
        action: String,
    },
    /// Validation rule kind not allowed for the question type.
    #[error("question {question_id} of type {question_type} cannot carry a {rule} rule")]
    InvalidValidationForType {
        /// Question owning the rule.
        question_id: QuestionId,
        /// Question type.
        question_type: QuestionType,
        /// Offending rule kind.
        rule: ValidationKind,
    },
    /// Validation rule that needs a value has none.
    #[error("question {question_id} has a {rule} rule without a value")]
    MissingRuleValue {
        /// Question owning the rule.
        question_id: QuestionId,
        /// Rule kind lacking its value.
        rule: ValidationKind,
    },
    /// Validation rule value has the wrong shape for the rule.
    #[error("question {question_id} has a {rule} rule with invalid value {value}")]
    InvalidRuleValue {
        /// Question owning the rule.
        question_id: QuestionId,
        /// Rule kind.
        rule: ValidationKind,
        /// Rendered offending value.
        value: String,
    },
    /// Pattern rule whose value is not a valid regular expression.
    #[error("question {question_id} has an invalid pattern: {reason}")]
    InvalidPattern {
        /// Question owning the rule.
        question_id: QuestionId,
        /// Compiler diagnostic.
        reason: String,
    },
    /// Choice question without any options.
    #[error("question {question_id} of type {question_type} declares no options")]
    MissingOptions {
        /// Question lacking options.
        question_id: QuestionId,
        /// Choice question type.
        question_type: QuestionType,
    },
}

impl StructureIssue {
    /// Returns the question the issue is attached to, if any.
    #[must_use]
    pub const fn question_id(&self) -> Option<&QuestionId> {
        match self {
            Self::DuplicateSectionId { .. } => None,
            Self::DuplicateQuestionId { question_id }
            | Self::DanglingReference { question_id, .. }
            | Self::SelfReference { question_id }
            | Self::MissingConditionValue { question_id, .. }
            | Self::UnsupportedAction { question_id, .. }
            | Self::InvalidValidationForType { question_id, .. }
            | Self::MissingRuleValue { question_id, .. }
            | Self::InvalidRuleValue { question_id, .. }
            | Self::InvalidPattern { question_id, .. }
            | Self::MissingOptions { question_id, .. } => Some(question_id),
        }
    }
}

/// Every issue found in one structure.
///
/// # Invariants
/// - Never empty when returned as an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct StructureErrors(pub Vec<StructureIssue>);

impl StructureErrors {
    /// Returns the collected issues.
    #[must_use]
    pub fn issues(&self) -> &[StructureIssue] {
        &self.0
    }
}

impl fmt::Display for StructureErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "survey structure has {} issue(s)", self.0.len())?;
        for issue in &self.0 {
            write!(f, "; {issue}")?;
        }
        Ok(())
    }
}

impl std::error::Error for StructureErrors {}

// ============================================================================
// SECTION: Validation
// ============================================================================

/// Validates a structure, returning every issue found.
///
/// # Errors
///
/// Returns [`StructureErrors`] when at least one issue exists.
pub fn validate_structure(structure: &SurveyStructure) -> Result<(), StructureErrors> {
    let issues = structure_issues(structure);
    if issues.is_empty() { Ok(()) } else { Err(StructureErrors(issues)) }
}

/// Collects every soundness issue in document order.
#[must_use]
pub fn structure_issues(structure: &SurveyStructure) -> Vec<StructureIssue> {
    let mut issues = Vec::new();

    let mut section_ids = BTreeSet::new();
    for section in &structure.sections {
        if !section_ids.insert(&section.id) {
            issues.push(StructureIssue::DuplicateSectionId { section_id: section.id.clone() });
        }
    }

    let mut question_ids = BTreeSet::new();
    for question in structure.questions() {
        if !question_ids.insert(&question.id) {
            issues.push(StructureIssue::DuplicateQuestionId { question_id: question.id.clone() });
        }
    }

    for question in structure.questions() {
        check_options(question, &mut issues);
        for rule in &question.validation {
            check_rule(question, rule, &mut issues);
        }
        check_logic(question, &question_ids, &mut issues);
    }

    issues
}

/// Flags choice questions that offer nothing to choose.
fn check_options(question: &Question, issues: &mut Vec<StructureIssue>) {
    let empty = question.options.as_ref().is_none_or(Vec::is_empty);
    if question.kind.is_choice() && empty {
        issues.push(StructureIssue::MissingOptions {
            question_id: question.id.clone(),
            question_type: question.kind,
        });
    }
}

/// Checks one validation rule against its owning question.
fn check_rule(question: &Question, rule: &ValidationRule, issues: &mut Vec<StructureIssue>) {
    if !question.kind.allows_rule(rule.kind) {
        issues.push(StructureIssue::InvalidValidationForType {
            question_id: question.id.clone(),
            question_type: question.kind,
            rule: rule.kind,
        });
        return;
    }
    if !rule.kind.requires_value() {
        return;
    }
    let Some(value) = &rule.value else {
        issues.push(StructureIssue::MissingRuleValue {
            question_id: question.id.clone(),
            rule: rule.kind,
        });
        return;
    };
    let well_formed = match rule.kind {
        ValidationKind::MinLength | ValidationKind::MaxLength => rule_length(value).is_some(),
        ValidationKind::MinValue | ValidationKind::MaxValue => {
            matches!(value, ConditionValue::Number(_))
        }
        ValidationKind::Pattern => {
            let ConditionValue::Text(pattern) = value else {
                issues.push(invalid_rule_value(question, rule, value));
                return;
            };
            if let Err(err) = compile_pattern(pattern) {
                issues.push(StructureIssue::InvalidPattern {
                    question_id: question.id.clone(),
                    reason: err.to_string(),
                });
            }
            true
        }
        ValidationKind::Required | ValidationKind::Email => true,
    };
    if !well_formed {
        issues.push(invalid_rule_value(question, rule, value));
    }
}

/// Builds an invalid rule value issue.
fn invalid_rule_value(
    question: &Question,
    rule: &ValidationRule,
    value: &ConditionValue,
) -> StructureIssue {
    StructureIssue::InvalidRuleValue {
        question_id: question.id.clone(),
        rule: rule.kind,
        value: value.render(),
    }
}

/// Checks the conditional logic block of a question.
fn check_logic(
    question: &Question,
    known: &BTreeSet<&QuestionId>,
    issues: &mut Vec<StructureIssue>,
) {
    let Some(logic) = &question.conditional_logic else {
        return;
    };
    if let ConditionalAction::Unrecognized(action) = &logic.action {
        issues.push(StructureIssue::UnsupportedAction {
            question_id: question.id.clone(),
            action: action.clone(),
        });
    }
    for condition in &logic.conditions {
        if condition.question_id == question.id {
            issues.push(StructureIssue::SelfReference { question_id: question.id.clone() });
        } else if !known.contains(&condition.question_id) {
            issues.push(StructureIssue::DanglingReference {
                question_id: question.id.clone(),
                referenced: condition.question_id.clone(),
            });
        }
        if condition.operator.requires_value() && condition.value.is_none() {
            issues.push(StructureIssue::MissingConditionValue {
                question_id: question.id.clone(),
                operator: condition.operator,
            });
        }
    }
}

// ============================================================================
// SECTION: Shared Rule Helpers
// ============================================================================

/// Reads a length rule value as a non-negative character count.
pub(crate) fn rule_length(value: &ConditionValue) -> Option<usize> {
    match value {
        ConditionValue::Number(number) => {
            number.as_u64().and_then(|length| usize::try_from(length).ok())
        }
        ConditionValue::Text(text) => text.trim().parse().ok(),
        ConditionValue::Boolean(_) => None,
    }
}

/// Compiles a pattern anchored to match the whole answer.
pub(crate) fn compile_pattern(pattern: &str) -> Result<Regex, regex::Error> {
    Regex::new(&format!("^(?:{pattern})$"))
}
