// crates/survey-portal-core/src/runtime/comparator.rs
// ============================================================================
// Module: Survey Condition Comparator
// Description: Operator evaluation for conditional logic conditions.
// Purpose: Decide a single condition against the referenced question's answer.
// Dependencies: bigdecimal, serde_json, time
// ============================================================================

//! ## Overview
//! A condition compares the answer of a referenced question against a
//! literal. Absent answers behave as empty. Numbers compare decimal-aware, so
//! `1`, `1.0`, and `"1.00"` on a number question are all equal.
//!
//! Ordered operators (`greaterThan`, `lessThan`) coerce both sides onto one
//! numeric scale chosen by the referenced question type:
//! - `number`: the decimal value.
//! - `date`: unix epoch milliseconds; a `YYYY-MM-DD` date means midnight UTC,
//!   RFC 3339 date-times are also accepted.
//! - `time`: milliseconds since midnight from `HH:MM` or `HH:MM:SS`.
//!
//! A numeric literal on a date or time question is read on that same scale.
//! Any other shape is a [`EvaluationError::TypeMismatch`] rather than a silent
//! `false`, so authors learn about conditions that can never fire.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::cmp::Ordering;
use std::str::FromStr;

use bigdecimal::BigDecimal;
use serde::Serialize;
use serde_json::Number;
use thiserror::Error;
use time::Date;
use time::Month;
use time::OffsetDateTime;
use time::Time;
use time::format_description::well_known::Rfc3339;

use crate::core::AnswerValue;
use crate::core::ConditionOperator;
use crate::core::ConditionValue;
use crate::core::ConditionalLogicCondition;
use crate::core::QuestionId;
use crate::core::QuestionType;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised while evaluating conditional logic.
///
/// Condition errors carry the referenced question; action errors carry the
/// question owning the logic block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
#[serde(tag = "kind", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum EvaluationError {
    /// Operator cannot apply to the answer or value shape.
    #[error("{operator} cannot compare question {question_id}: {reason}")]
    TypeMismatch {
        /// Referenced question.
        question_id: QuestionId,
        /// Operator being applied.
        operator: ConditionOperator,
        /// Human-readable mismatch description.
        reason: String,
    },
    /// Logic block uses an action this version does not understand.
    #[error("question {question_id} uses unsupported conditional action {action}")]
    UnsupportedAction {
        /// Question owning the logic.
        question_id: QuestionId,
        /// Action spelling as stored.
        action: String,
    },
    /// Comparison operator without a comparison value.
    #[error("{operator} condition on question {question_id} has no value")]
    MissingConditionValue {
        /// Referenced question.
        question_id: QuestionId,
        /// Operator lacking its value.
        operator: ConditionOperator,
    },
}

// ============================================================================
// SECTION: Condition Evaluation
// ============================================================================

/// Evaluates one condition.
///
/// `referenced_type` is the type of the referenced question, or `None` when
/// the reference dangles; ordered comparison then accepts numbers only.
///
/// # Errors
///
/// Returns [`EvaluationError`] when the operator needs a missing value or
/// cannot apply to the answer shape.
pub fn evaluate_condition(
    condition: &ConditionalLogicCondition,
    referenced_type: Option<QuestionType>,
    answer: Option<&AnswerValue>,
) -> Result<bool, EvaluationError> {
    let operator = condition.operator;
    match operator {
        ConditionOperator::IsEmpty => return Ok(answer.is_none_or(AnswerValue::is_empty)),
        ConditionOperator::IsNotEmpty => return Ok(!answer.is_none_or(AnswerValue::is_empty)),
        _ => {}
    }

    let Some(expected) = &condition.value else {
        return Err(EvaluationError::MissingConditionValue {
            question_id: condition.question_id.clone(),
            operator,
        });
    };

    let mismatch = |reason: String| EvaluationError::TypeMismatch {
        question_id: condition.question_id.clone(),
        operator,
        reason,
    };

    match operator {
        ConditionOperator::Equals => {
            Ok(answer.is_some_and(|answer| answer_equals(answer, expected, referenced_type)))
        }
        ConditionOperator::NotEquals => {
            Ok(!answer.is_some_and(|answer| answer_equals(answer, expected, referenced_type)))
        }
        ConditionOperator::GreaterThan | ConditionOperator::LessThan => {
            let Some(answer) = answer else {
                return Ok(false);
            };
            let ordering = compare_ordered(answer, expected, referenced_type).map_err(mismatch)?;
            Ok(if operator == ConditionOperator::GreaterThan {
                ordering.is_gt()
            } else {
                ordering.is_lt()
            })
        }
        ConditionOperator::Contains => match answer {
            None => Ok(false),
            Some(AnswerValue::Text(text)) => Ok(text.contains(&expected.render())),
            Some(AnswerValue::List(items)) => {
                let needle = expected.render();
                Ok(items.iter().any(|item| *item == needle))
            }
            Some(other) => Err(mismatch(format!("{} answers have no contents", other.shape()))),
        },
        ConditionOperator::IsEmpty | ConditionOperator::IsNotEmpty => Ok(false),
    }
}

// ============================================================================
// SECTION: Equality
// ============================================================================

/// Structural equality between an answer and a literal.
fn answer_equals(
    answer: &AnswerValue,
    expected: &ConditionValue,
    referenced_type: Option<QuestionType>,
) -> bool {
    match (answer, expected) {
        (AnswerValue::Number(left), ConditionValue::Number(right)) => {
            decimal_cmp(left, right).is_some_and(Ordering::is_eq)
        }
        (AnswerValue::Number(left), ConditionValue::Text(right)) => {
            decimal_from_number(left).zip(decimal_from_str(right)).is_some_and(|(l, r)| l == r)
        }
        (AnswerValue::Text(left), ConditionValue::Number(right)) => {
            decimal_from_str(left).zip(decimal_from_number(right)).is_some_and(|(l, r)| l == r)
        }
        (AnswerValue::Text(left), ConditionValue::Text(right)) => {
            if left == right {
                return true;
            }
            match referenced_type {
                Some(QuestionType::Date) => {
                    date_millis(left).zip(date_millis(right)).is_some_and(|(l, r)| l == r)
                }
                Some(QuestionType::Time) => {
                    time_millis(left).zip(time_millis(right)).is_some_and(|(l, r)| l == r)
                }
                _ => false,
            }
        }
        (AnswerValue::Boolean(left), ConditionValue::Boolean(right)) => left == right,
        (AnswerValue::Text(left), ConditionValue::Boolean(right)) => *left == right.to_string(),
        (AnswerValue::List(_), _) | (AnswerValue::Boolean(_) | AnswerValue::Number(_), _) => false,
    }
}

// ============================================================================
// SECTION: Ordering
// ============================================================================

/// Orders an answer against a literal on the scale implied by the question type.
fn compare_ordered(
    answer: &AnswerValue,
    expected: &ConditionValue,
    referenced_type: Option<QuestionType>,
) -> Result<Ordering, String> {
    let (left, right) = match referenced_type {
        Some(QuestionType::Date) => (
            temporal_answer(answer, date_millis, "date")?,
            temporal_literal(expected, date_millis, "date")?,
        ),
        Some(QuestionType::Time) => (
            temporal_answer(answer, time_millis, "time")?,
            temporal_literal(expected, time_millis, "time")?,
        ),
        Some(QuestionType::Number) => (numeric_answer(answer)?, numeric_literal(expected)?),
        _ => {
            let AnswerValue::Number(number) = answer else {
                let kind = referenced_type.map_or("unknown", QuestionType::as_str);
                return Err(format!("{kind} question answers have no ordering"));
            };
            let left = decimal_from_number(number)
                .ok_or_else(|| format!("answer {number} is not a decimal"))?;
            (left, numeric_literal(expected)?)
        }
    };
    Ok(left.cmp(&right))
}

/// Reads a numeric answer, accepting numeric text.
fn numeric_answer(answer: &AnswerValue) -> Result<BigDecimal, String> {
    match answer {
        AnswerValue::Number(number) => {
            decimal_from_number(number).ok_or_else(|| format!("answer {number} is not a decimal"))
        }
        AnswerValue::Text(text) => {
            decimal_from_str(text).ok_or_else(|| format!("answer {text:?} is not a number"))
        }
        other => Err(format!("{} answer is not a number", other.shape())),
    }
}

/// Reads a numeric literal, accepting numeric text.
fn numeric_literal(expected: &ConditionValue) -> Result<BigDecimal, String> {
    match expected {
        ConditionValue::Number(number) => {
            decimal_from_number(number).ok_or_else(|| format!("value {number} is not a decimal"))
        }
        ConditionValue::Text(text) => {
            decimal_from_str(text).ok_or_else(|| format!("value {text:?} is not a number"))
        }
        ConditionValue::Boolean(flag) => Err(format!("value {flag} is not a number")),
    }
}

/// Coerces a date or time answer onto its millisecond scale.
fn temporal_answer(
    answer: &AnswerValue,
    parse: fn(&str) -> Option<i64>,
    kind: &str,
) -> Result<BigDecimal, String> {
    match answer {
        AnswerValue::Text(text) => {
            parse(text).map(BigDecimal::from).ok_or_else(|| format!("answer {text:?} is not a {kind}"))
        }
        AnswerValue::Number(_) => numeric_answer(answer),
        other => Err(format!("{} answer is not a {kind}", other.shape())),
    }
}

/// Coerces a date or time literal onto its millisecond scale.
fn temporal_literal(
    expected: &ConditionValue,
    parse: fn(&str) -> Option<i64>,
    kind: &str,
) -> Result<BigDecimal, String> {
    match expected {
        ConditionValue::Text(text) => {
            parse(text).map(BigDecimal::from).ok_or_else(|| format!("value {text:?} is not a {kind}"))
        }
        ConditionValue::Number(_) => numeric_literal(expected),
        ConditionValue::Boolean(flag) => Err(format!("value {flag} is not a {kind}")),
    }
}

// ============================================================================
// SECTION: Decimal Helpers
// ============================================================================

/// Orders numeric JSON values using decimal-aware comparison.
fn decimal_cmp(left: &Number, right: &Number) -> Option<Ordering> {
    let left = decimal_from_number(left)?;
    let right = decimal_from_number(right)?;
    Some(left.cmp(&right))
}

/// Parses a JSON number into `BigDecimal` through its string form.
fn decimal_from_number(number: &Number) -> Option<BigDecimal> {
    BigDecimal::from_str(&number.to_string()).ok()
}

/// Parses numeric text into `BigDecimal`.
fn decimal_from_str(text: &str) -> Option<BigDecimal> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    BigDecimal::from_str(trimmed).ok()
}

// ============================================================================
// SECTION: Temporal Helpers
// ============================================================================

/// Parses a date or RFC 3339 date-time into unix epoch milliseconds.
pub(crate) fn date_millis(value: &str) -> Option<i64> {
    let instant = match OffsetDateTime::parse(value, &Rfc3339) {
        Ok(instant) => instant,
        Err(_) => parse_calendar_date(value)?.midnight().assume_utc(),
    };
    i64::try_from(instant.unix_timestamp_nanos() / 1_000_000).ok()
}

/// Parses `HH:MM` or `HH:MM:SS` into milliseconds since midnight.
pub(crate) fn time_millis(value: &str) -> Option<i64> {
    let mut parts = value.trim().split(':');
    let hour: u8 = parts.next()?.parse().ok()?;
    let minute: u8 = parts.next()?.parse().ok()?;
    let second: u8 = match parts.next() {
        Some(raw) => raw.parse().ok()?,
        None => 0,
    };
    if parts.next().is_some() {
        return None;
    }
    Time::from_hms(hour, minute, second).ok()?;
    Some((i64::from(hour) * 3_600 + i64::from(minute) * 60 + i64::from(second)) * 1_000)
}

/// Parses a date-only value (YYYY-MM-DD).
fn parse_calendar_date(value: &str) -> Option<Date> {
    let mut parts = value.trim().split('-');
    let year: i32 = parts.next()?.parse().ok()?;
    let month: u8 = parts.next()?.parse().ok()?;
    let day: u8 = parts.next()?.parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    let month = Month::try_from(month).ok()?;
    Date::from_calendar_date(year, month, day).ok()
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests;
