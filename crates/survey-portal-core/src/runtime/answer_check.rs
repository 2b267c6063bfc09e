// crates/survey-portal-core/src/runtime/answer_check.rs
// ============================================================================
// Module: Survey Answer Validation
// Description: Required-flag and validation-rule checks over answer sets.
// Purpose: Reject responses that violate the structure they were collected on.
// Dependencies: crate::core, crate::runtime::visibility, regex, serde, thiserror
// ============================================================================

//! ## Overview
//! Answer validation applies each visible question's `required` flag and
//! validation rules to its answer and collects every violation. Hidden
//! questions are skipped entirely; answers they carry are tolerated.
//!
//! When a question's visibility cannot be evaluated, the failure is recorded
//! and the question is checked as if visible.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::str::FromStr;

use bigdecimal::BigDecimal;
use serde::Serialize;
use thiserror::Error;

use crate::core::AnswerValue;
use crate::core::Answers;
use crate::core::ConditionValue;
use crate::core::Question;
use crate::core::QuestionId;
use crate::core::QuestionType;
use crate::core::SurveyResponse;
use crate::core::SurveyStructure;
use crate::core::ValidationKind;
use crate::core::ValidationRule;
use crate::core::validation::compile_pattern;
use crate::core::validation::rule_length;
use crate::runtime::comparator::EvaluationError;
use crate::runtime::comparator::date_millis;
use crate::runtime::comparator::time_millis;
use crate::runtime::visibility::VisibilityEvaluator;

/// Message used when a required question has no explicit `required` rule.
const DEFAULT_REQUIRED_MESSAGE: &str = "This field is required";

// ============================================================================
// SECTION: Issues
// ============================================================================

/// A single answer violation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
#[serde(tag = "kind", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum AnswerIssue {
    /// Answer key names no question in the structure.
    #[error("answer for unknown question {question_id}")]
    UnknownQuestion {
        /// Unknown question identifier.
        question_id: QuestionId,
    },
    /// Visible required question left unanswered.
    #[error("question {question_id}: {message}")]
    Required {
        /// Question identifier.
        question_id: QuestionId,
        /// Rule message.
        message: String,
    },
    /// Answer shape does not fit the question type.
    #[error("question {question_id} of type {question_type} cannot hold a {found} answer")]
    WrongShape {
        /// Question identifier.
        question_id: QuestionId,
        /// Question type.
        question_type: QuestionType,
        /// Shape of the supplied answer.
        found: String,
    },
    /// Choice answer outside the declared options.
    #[error("question {question_id} has no option {option:?}")]
    UnknownOption {
        /// Question identifier.
        question_id: QuestionId,
        /// Offending option.
        option: String,
    },
    /// Text shorter than `minLength`.
    #[error("question {question_id}: {message}")]
    TooShort {
        /// Question identifier.
        question_id: QuestionId,
        /// Rule message.
        message: String,
    },
    /// Text longer than `maxLength`.
    #[error("question {question_id}: {message}")]
    TooLong {
        /// Question identifier.
        question_id: QuestionId,
        /// Rule message.
        message: String,
    },
    /// Number below `minValue`.
    #[error("question {question_id}: {message}")]
    BelowMin {
        /// Question identifier.
        question_id: QuestionId,
        /// Rule message.
        message: String,
    },
    /// Number above `maxValue`.
    #[error("question {question_id}: {message}")]
    AboveMax {
        /// Question identifier.
        question_id: QuestionId,
        /// Rule message.
        message: String,
    },
    /// Text not matching `pattern`.
    #[error("question {question_id}: {message}")]
    PatternMismatch {
        /// Question identifier.
        question_id: QuestionId,
        /// Rule message.
        message: String,
    },
    /// Text not shaped like an email address.
    #[error("question {question_id}: {message}")]
    InvalidEmail {
        /// Question identifier.
        question_id: QuestionId,
        /// Rule message.
        message: String,
    },
    /// Visibility could not be evaluated; the question was checked as visible.
    #[error("visibility of question {question_id} could not be evaluated: {error}")]
    Unevaluable {
        /// Question identifier.
        question_id: QuestionId,
        /// Evaluation failure.
        error: EvaluationError,
    },
}

/// Every violation found in one answer set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct AnswerErrors(pub Vec<AnswerIssue>);

impl AnswerErrors {
    /// Returns the collected issues.
    #[must_use]
    pub fn issues(&self) -> &[AnswerIssue] {
        &self.0
    }
}

impl fmt::Display for AnswerErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "answers have {} issue(s)", self.0.len())?;
        for issue in &self.0 {
            write!(f, "; {issue}")?;
        }
        Ok(())
    }
}

impl std::error::Error for AnswerErrors {}

// ============================================================================
// SECTION: Entry Points
// ============================================================================

/// Checks a response's answers against `structure`.
///
/// # Errors
///
/// Returns [`AnswerErrors`] when at least one violation exists.
pub fn check_response(
    structure: &SurveyStructure,
    response: &SurveyResponse,
) -> Result<(), AnswerErrors> {
    check_answers(structure, &response.answers)
}

/// Checks an answer set against `structure`.
///
/// # Errors
///
/// Returns [`AnswerErrors`] when at least one violation exists.
pub fn check_answers(structure: &SurveyStructure, answers: &Answers) -> Result<(), AnswerErrors> {
    let mut issues = Vec::new();

    for (question_id, _) in answers.iter() {
        if structure.question(question_id).is_none() {
            issues.push(AnswerIssue::UnknownQuestion { question_id: question_id.clone() });
        }
    }

    let evaluator = VisibilityEvaluator::new(structure);
    for question in structure.questions() {
        match evaluator.is_visible(question, answers) {
            Ok(false) => continue,
            Ok(true) => {}
            Err(error) => issues.push(AnswerIssue::Unevaluable {
                question_id: question.id.clone(),
                error,
            }),
        }
        check_question(question, answers.get(&question.id), &mut issues);
    }

    if issues.is_empty() { Ok(()) } else { Err(AnswerErrors(issues)) }
}

// ============================================================================
// SECTION: Per-Question Checks
// ============================================================================

/// Checks one visible question.
fn check_question(question: &Question, answer: Option<&AnswerValue>, issues: &mut Vec<AnswerIssue>) {
    let required_rule = question.validation.iter().find(|rule| rule.kind == ValidationKind::Required);
    let Some(answer) = answer.filter(|answer| !answer.is_empty()) else {
        if question.required || required_rule.is_some() {
            issues.push(AnswerIssue::Required {
                question_id: question.id.clone(),
                message: required_rule
                    .map_or_else(|| DEFAULT_REQUIRED_MESSAGE.to_string(), |rule| rule.message.clone()),
            });
        }
        return;
    };

    if !check_shape(question, answer, issues) {
        return;
    }
    for rule in &question.validation {
        check_rule(question, rule, answer, issues);
    }
}

/// Verifies the answer fits the question type. Returns false on mismatch.
fn check_shape(question: &Question, answer: &AnswerValue, issues: &mut Vec<AnswerIssue>) -> bool {
    let fits = match (question.kind, answer) {
        (QuestionType::Number, AnswerValue::Number(_)) => true,
        (QuestionType::Number, AnswerValue::Text(text)) => parse_decimal(text).is_some(),
        (QuestionType::Date, AnswerValue::Text(text)) => date_millis(text).is_some(),
        (QuestionType::Time, AnswerValue::Text(text)) => time_millis(text).is_some(),
        (QuestionType::Text | QuestionType::Select | QuestionType::Radio, AnswerValue::Text(_))
        | (QuestionType::Multiselect | QuestionType::Checkbox, AnswerValue::List(_)) => true,
        _ => false,
    };
    if !fits {
        issues.push(AnswerIssue::WrongShape {
            question_id: question.id.clone(),
            question_type: question.kind,
            found: answer.shape().to_string(),
        });
        return false;
    }

    if let Some(options) = &question.options
        && question.kind.is_choice()
    {
        let chosen: Vec<&String> = match answer {
            AnswerValue::Text(text) => vec![text],
            AnswerValue::List(items) => items.iter().collect(),
            AnswerValue::Boolean(_) | AnswerValue::Number(_) => Vec::new(),
        };
        let mut all_known = true;
        for option in chosen {
            if !options.contains(option) {
                all_known = false;
                issues.push(AnswerIssue::UnknownOption {
                    question_id: question.id.clone(),
                    option: option.clone(),
                });
            }
        }
        return all_known;
    }
    true
}

/// Applies one validation rule. Malformed rules are skipped; structure
/// validation reports them.
fn check_rule(
    question: &Question,
    rule: &ValidationRule,
    answer: &AnswerValue,
    issues: &mut Vec<AnswerIssue>,
) {
    let question_id = question.id.clone();
    let message = rule.message.clone();
    match rule.kind {
        ValidationKind::Required => {}
        ValidationKind::MinLength | ValidationKind::MaxLength => {
            let (AnswerValue::Text(text), Some(limit)) = (answer, rule.value.as_ref().and_then(rule_length))
            else {
                return;
            };
            let length = text.chars().count();
            if rule.kind == ValidationKind::MinLength && length < limit {
                issues.push(AnswerIssue::TooShort { question_id, message });
            } else if rule.kind == ValidationKind::MaxLength && length > limit {
                issues.push(AnswerIssue::TooLong { question_id, message });
            }
        }
        ValidationKind::MinValue | ValidationKind::MaxValue => {
            let Some(limit) = rule.value.as_ref().and_then(rule_decimal) else {
                return;
            };
            let value = match answer {
                AnswerValue::Number(number) => parse_decimal(&number.to_string()),
                AnswerValue::Text(text) => parse_decimal(text),
                AnswerValue::Boolean(_) | AnswerValue::List(_) => None,
            };
            let Some(value) = value else {
                return;
            };
            if rule.kind == ValidationKind::MinValue && value < limit {
                issues.push(AnswerIssue::BelowMin { question_id, message });
            } else if rule.kind == ValidationKind::MaxValue && value > limit {
                issues.push(AnswerIssue::AboveMax { question_id, message });
            }
        }
        ValidationKind::Pattern => {
            let (AnswerValue::Text(text), Some(ConditionValue::Text(pattern))) = (answer, &rule.value)
            else {
                return;
            };
            if let Ok(regex) = compile_pattern(pattern)
                && !regex.is_match(text)
            {
                issues.push(AnswerIssue::PatternMismatch { question_id, message });
            }
        }
        ValidationKind::Email => {
            if let AnswerValue::Text(text) = answer
                && !looks_like_email(text)
            {
                issues.push(AnswerIssue::InvalidEmail { question_id, message });
            }
        }
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Reads a numeric bound from a rule value.
fn rule_decimal(value: &ConditionValue) -> Option<BigDecimal> {
    match value {
        ConditionValue::Number(number) => parse_decimal(&number.to_string()),
        ConditionValue::Text(text) => parse_decimal(text),
        ConditionValue::Boolean(_) => None,
    }
}

/// Parses trimmed numeric text.
fn parse_decimal(text: &str) -> Option<BigDecimal> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    BigDecimal::from_str(trimmed).ok()
}

/// Shape check: one `@`, non-empty local part, dotted domain, no whitespace.
fn looks_like_email(text: &str) -> bool {
    if text.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = text.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) => !host.is_empty() && !tld.is_empty(),
        None => false,
    }
}
