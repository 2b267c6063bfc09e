// crates/survey-portal-core/tests/visibility.rs
// ============================================================================
// Module: Visibility Evaluation Tests
// Description: Integration tests for conditional question visibility.
// Purpose: Pin AND/OR combination, disabled logic, and error surfacing.
// ============================================================================

//! Visibility evaluation tests over JSON-authored structures and answers.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "Test-only assertions and helpers are permitted."
)]

use serde_json::Value;
use serde_json::json;
use survey_portal_core::Answers;
use survey_portal_core::EvaluationError;
use survey_portal_core::QuestionId;
use survey_portal_core::SectionId;
use survey_portal_core::SurveyStructure;
use survey_portal_core::VisibilityEvaluator;
use survey_portal_core::is_question_visible;

fn gated_structure(logic: &str, conditions: Value) -> SurveyStructure {
    serde_json::from_value(json!({
        "surveyId": "s-1",
        "title": "T",
        "version": 1,
        "sections": [
            {"id": "intro", "title": "Intro", "questions": [
                {"id": "q1", "type": "radio", "label": "Own?", "options": ["yes", "no"]},
                {"id": "q3", "type": "number", "label": "Rooms"}
            ]},
            {"id": "details", "title": "Details", "questions": [
                {"id": "q2", "type": "text", "label": "Deed number",
                 "conditionalLogic": {"enabled": true, "action": "show", "logic": logic,
                                      "conditions": conditions}}
            ]}
        ]
    }))
    .unwrap()
}

fn answers(value: Value) -> Answers {
    serde_json::from_value(value).unwrap()
}

fn q2_visible(structure: &SurveyStructure, answers: &Answers) -> Result<bool, EvaluationError> {
    let question = structure.question(&QuestionId::new("q2")).unwrap();
    is_question_visible(question, structure, answers)
}

#[test]
fn single_equals_condition_controls_visibility() {
    let structure =
        gated_structure("AND", json!([{"questionId": "q1", "operator": "equals", "value": "yes"}]));
    assert!(q2_visible(&structure, &answers(json!({"q1": "yes"}))).unwrap());
    assert!(!q2_visible(&structure, &answers(json!({"q1": "no"}))).unwrap());
    assert!(!q2_visible(&structure, &answers(json!({}))).unwrap());
}

#[test]
fn and_requires_all_or_requires_any() {
    let conditions = json!([
        {"questionId": "q1", "operator": "equals", "value": "yes"},
        {"questionId": "q3", "operator": "greaterThan", "value": 2}
    ]);
    let and = gated_structure("AND", conditions.clone());
    let or = gated_structure("OR", conditions);
    let partial = answers(json!({"q1": "yes", "q3": 1}));
    assert!(!q2_visible(&and, &partial).unwrap());
    assert!(q2_visible(&or, &partial).unwrap());
    let full = answers(json!({"q1": "yes", "q3": 5}));
    assert!(q2_visible(&and, &full).unwrap());
}

#[test]
fn empty_condition_list_follows_combinator_identity() {
    let and = gated_structure("AND", json!([]));
    let or = gated_structure("OR", json!([]));
    assert!(q2_visible(&and, &Answers::new()).unwrap());
    assert!(!q2_visible(&or, &Answers::new()).unwrap());
}

#[test]
fn disabled_logic_is_always_visible_even_if_malformed() {
    let mut structure =
        gated_structure("AND", json!([{"questionId": "q1", "operator": "contains"}]));
    let question = structure.sections[1].questions[0].conditional_logic.as_mut().unwrap();
    question.enabled = false;
    assert!(q2_visible(&structure, &Answers::new()).unwrap());
}

#[test]
fn unsupported_action_is_an_error() {
    let mut value = serde_json::to_value(gated_structure("AND", json!([]))).unwrap();
    value["sections"][1]["questions"][0]["conditionalLogic"]["action"] = json!("hide");
    let structure: SurveyStructure = serde_json::from_value(value).unwrap();
    assert_eq!(
        q2_visible(&structure, &Answers::new()).unwrap_err(),
        EvaluationError::UnsupportedAction {
            question_id: QuestionId::new("q2"),
            action: "hide".to_string(),
        }
    );
}

#[test]
fn report_lists_visible_questions_and_sections() {
    let structure =
        gated_structure("AND", json!([{"questionId": "q1", "operator": "equals", "value": "yes"}]));
    let evaluator = VisibilityEvaluator::new(&structure);

    let hidden = evaluator.report(&answers(json!({"q1": "no"}))).unwrap();
    assert_eq!(hidden.visible_questions, vec![QuestionId::new("q1"), QuestionId::new("q3")]);
    assert_eq!(hidden.visible_sections, vec![SectionId::new("intro")]);

    let shown = evaluator.visible_sections(&answers(json!({"q1": "yes"}))).unwrap();
    assert_eq!(shown, vec![SectionId::new("intro"), SectionId::new("details")]);
}

#[test]
fn report_serializes_camel_case() {
    let structure = gated_structure("AND", json!([]));
    let report = VisibilityEvaluator::new(&structure).report(&Answers::new()).unwrap();
    let encoded = serde_json::to_value(&report).unwrap();
    assert_eq!(encoded["visibleQuestions"], json!(["q1", "q3", "q2"]));
    assert_eq!(encoded["visibleSections"], json!(["intro", "details"]));
}

#[test]
fn ordered_comparison_on_choice_answer_is_type_mismatch() {
    let structure =
        gated_structure("AND", json!([{"questionId": "q1", "operator": "lessThan", "value": 3}]));
    let err = q2_visible(&structure, &answers(json!({"q1": "yes"}))).unwrap_err();
    assert!(matches!(err, EvaluationError::TypeMismatch { .. }));
}
