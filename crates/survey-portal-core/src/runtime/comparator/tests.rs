// crates/survey-portal-core/src/runtime/comparator/tests.rs
// ============================================================================
// Module: Condition Comparator Tests
// Description: Unit tests for operator semantics and type coercion.
// Purpose: Pin absent-answer behavior and date/time ordering scales.
// Dependencies: survey-portal-core
// ============================================================================

//! ## Overview
//! Exercises every operator against every answer shape that matters, with
//! emphasis on the coercion rules for ordered comparisons.

// ============================================================================
// SECTION: Lint Configuration
// ============================================================================

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "Test-only assertions use unwrap/expect for clarity."
)]

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde_json::Number;

use super::EvaluationError;
use super::date_millis;
use super::evaluate_condition;
use super::time_millis;
use crate::core::AnswerValue;
use crate::core::ConditionOperator;
use crate::core::ConditionValue;
use crate::core::ConditionalLogicCondition;
use crate::core::QuestionId;
use crate::core::QuestionType;

// ============================================================================
// SECTION: Helpers
// ============================================================================

fn condition(operator: ConditionOperator, value: Option<ConditionValue>) -> ConditionalLogicCondition {
    ConditionalLogicCondition {
        question_id: QuestionId::new("q1"),
        operator,
        value,
    }
}

fn eval(
    operator: ConditionOperator,
    value: impl Into<ConditionValue>,
    kind: QuestionType,
    answer: Option<AnswerValue>,
) -> Result<bool, EvaluationError> {
    evaluate_condition(&condition(operator, Some(value.into())), Some(kind), answer.as_ref())
}

// ============================================================================
// SECTION: Equality
// ============================================================================

#[test]
fn equals_requires_present_matching_answer() {
    let yes = Some(AnswerValue::from("yes"));
    assert!(eval(ConditionOperator::Equals, "yes", QuestionType::Radio, yes).unwrap());
    assert!(
        !eval(ConditionOperator::Equals, "yes", QuestionType::Radio, Some("no".into())).unwrap()
    );
    assert!(!eval(ConditionOperator::Equals, "yes", QuestionType::Radio, None).unwrap());
}

#[test]
fn not_equals_holds_for_absent_answer() {
    assert!(eval(ConditionOperator::NotEquals, "yes", QuestionType::Radio, None).unwrap());
    assert!(
        !eval(ConditionOperator::NotEquals, "yes", QuestionType::Radio, Some("yes".into()))
            .unwrap()
    );
}

#[test]
fn numeric_equality_is_decimal_aware() {
    let one_point_zero = AnswerValue::Number(Number::from_f64(1.0).unwrap());
    assert!(eval(ConditionOperator::Equals, 1, QuestionType::Number, Some(one_point_zero)).unwrap());
    assert!(
        eval(ConditionOperator::Equals, 1, QuestionType::Number, Some("1.00".into())).unwrap()
    );
}

#[test]
fn list_answer_never_equals_scalar() {
    let list = Some(AnswerValue::from(vec!["a"]));
    assert!(!eval(ConditionOperator::Equals, "a", QuestionType::Checkbox, list.clone()).unwrap());
    assert!(eval(ConditionOperator::NotEquals, "a", QuestionType::Checkbox, list).unwrap());
}

#[test]
fn date_equality_compares_instants() {
    let answer = Some(AnswerValue::from("2025-03-01T00:00:00Z"));
    assert!(eval(ConditionOperator::Equals, "2025-03-01", QuestionType::Date, answer).unwrap());
}

// ============================================================================
// SECTION: Ordering
// ============================================================================

#[test]
fn numbers_order_numerically() {
    assert!(eval(ConditionOperator::GreaterThan, 9, QuestionType::Number, Some(10.into())).unwrap());
    assert!(eval(ConditionOperator::LessThan, 10, QuestionType::Number, Some("9.5".into())).unwrap());
    assert!(!eval(ConditionOperator::GreaterThan, 10, QuestionType::Number, Some(10.into())).unwrap());
}

#[test]
fn unanswered_ordered_comparison_is_false() {
    assert!(!eval(ConditionOperator::GreaterThan, 1, QuestionType::Number, None).unwrap());
    assert!(!eval(ConditionOperator::LessThan, 1, QuestionType::Number, None).unwrap());
}

#[test]
fn dates_order_chronologically_not_lexically() {
    let answer = Some(AnswerValue::from("2025-10-02"));
    assert!(eval(ConditionOperator::GreaterThan, "2025-09-30", QuestionType::Date, answer).unwrap());
    let answer = Some(AnswerValue::from("2024-12-31T23:00:00-02:00"));
    assert!(eval(ConditionOperator::GreaterThan, "2025-01-01", QuestionType::Date, answer).unwrap());
}

#[test]
fn times_order_within_the_day() {
    let answer = Some(AnswerValue::from("09:30"));
    assert!(eval(ConditionOperator::LessThan, "10:00:00", QuestionType::Time, answer.clone()).unwrap());
    assert!(eval(ConditionOperator::GreaterThan, "9:05", QuestionType::Time, answer).unwrap());
}

#[test]
fn numeric_literal_on_time_question_uses_millis() {
    let answer = Some(AnswerValue::from("00:00:02"));
    assert!(eval(ConditionOperator::GreaterThan, 1_000, QuestionType::Time, answer).unwrap());
}

#[test]
fn ordering_text_question_is_type_mismatch() {
    let err = eval(ConditionOperator::GreaterThan, "b", QuestionType::Text, Some("c".into()))
        .unwrap_err();
    assert!(matches!(err, EvaluationError::TypeMismatch { .. }));
}

#[test]
fn unparseable_date_is_type_mismatch() {
    let err = eval(ConditionOperator::LessThan, "2025-01-01", QuestionType::Date, Some("soon".into()))
        .unwrap_err();
    assert!(matches!(err, EvaluationError::TypeMismatch { .. }));
}

// ============================================================================
// SECTION: Contains and Emptiness
// ============================================================================

#[test]
fn contains_uses_substring_and_membership() {
    assert!(
        eval(ConditionOperator::Contains, "ell", QuestionType::Text, Some("hello".into())).unwrap()
    );
    let list = Some(AnswerValue::from(vec!["red", "green"]));
    assert!(eval(ConditionOperator::Contains, "green", QuestionType::Checkbox, list.clone()).unwrap());
    assert!(!eval(ConditionOperator::Contains, "gre", QuestionType::Checkbox, list).unwrap());
    assert!(!eval(ConditionOperator::Contains, "x", QuestionType::Text, None).unwrap());
}

#[test]
fn contains_on_boolean_is_type_mismatch() {
    let err = eval(ConditionOperator::Contains, "t", QuestionType::Radio, Some(true.into()))
        .unwrap_err();
    assert!(matches!(err, EvaluationError::TypeMismatch { .. }));
}

#[test]
fn emptiness_needs_no_value() {
    let empty = condition(ConditionOperator::IsEmpty, None);
    let not_empty = condition(ConditionOperator::IsNotEmpty, None);
    assert!(evaluate_condition(&empty, Some(QuestionType::Text), None).unwrap());
    assert!(evaluate_condition(&empty, Some(QuestionType::Text), Some(&"".into())).unwrap());
    assert!(
        evaluate_condition(&empty, Some(QuestionType::Checkbox), Some(&AnswerValue::List(vec![])))
            .unwrap()
    );
    assert!(evaluate_condition(&not_empty, Some(QuestionType::Number), Some(&0.into())).unwrap());
}

#[test]
fn comparison_without_value_is_an_error() {
    let contains = condition(ConditionOperator::Contains, None);
    let err = evaluate_condition(&contains, Some(QuestionType::Text), None).unwrap_err();
    assert_eq!(
        err,
        EvaluationError::MissingConditionValue {
            question_id: QuestionId::new("q1"),
            operator: ConditionOperator::Contains,
        }
    );
}

// ============================================================================
// SECTION: Temporal Parsing
// ============================================================================

#[test]
fn temporal_parsers_reject_out_of_range_values() {
    assert_eq!(date_millis("1970-01-02"), Some(86_400_000));
    assert_eq!(date_millis("2025-02-30"), None);
    assert_eq!(time_millis("23:59:59"), Some(86_399_000));
    assert_eq!(time_millis("24:00"), None);
    assert_eq!(time_millis("12"), None);
}
