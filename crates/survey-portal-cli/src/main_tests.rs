// crates/survey-portal-cli/src/main_tests.rs
// ============================================================================
// Module: CLI Main Helpers Tests
// Description: Unit tests for bounded reads, argument parsing, and reports.
// Purpose: Ensure CLI inputs fail closed and reports match the survey model.
// Dependencies: survey-portal-cli main helpers
// ============================================================================

//! ## Overview
//! Validates `read_bytes_with_limit` enforces size limits, the clap surface
//! parses as documented, and report builders reflect core survey checks.
//!
//! Security posture: CLI inputs are untrusted; size limits must fail closed.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;

use clap::CommandFactory;
use clap::Parser;
use serde_json::json;
use survey_portal_core::AnswerIssue;
use survey_portal_core::QuestionId;
use survey_portal_core::StructureIssue;
use survey_portal_core::Survey;
use survey_portal_core::SurveyResponse;
use survey_portal_core::SurveyStructure;
use tempfile::TempDir;
use time::Month;

use super::Cli;
use super::Commands;
use super::ReadLimitError;
use super::SurveyCommand;
use super::fingerprint_report;
use super::parse_day;
use super::read_bytes_with_limit;
use super::read_json;
use super::response_report;
use super::structure_report;

// ============================================================================
// SECTION: Helpers
// ============================================================================

fn structure() -> SurveyStructure {
    serde_json::from_value(json!({
        "surveyId": "s-1",
        "title": "Household",
        "version": 2,
        "sections": [{"id": "a", "title": "A", "questions": [
            {"id": "owner", "type": "radio", "label": "Own?", "required": true,
             "options": ["yes", "no"]},
            {"id": "deed", "type": "text", "label": "Deed", "required": true,
             "conditionalLogic": {"enabled": true, "action": "show", "logic": "AND",
                "conditions": [{"questionId": "owner", "operator": "equals", "value": "yes"}]}}
        ]}]
    }))
    .unwrap()
}

fn response(answers: serde_json::Value) -> SurveyResponse {
    serde_json::from_value(json!({
        "assignmentId": "as-1",
        "answers": answers,
        "submittedAt": "2025-06-01T10:00:00Z"
    }))
    .unwrap()
}

// ============================================================================
// SECTION: Bounded Reads
// ============================================================================

#[test]
fn read_bytes_with_limit_allows_small_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("small.bin");
    fs::write(&path, b"ok").expect("write small file");

    let bytes = read_bytes_with_limit(&path, 16).expect("read small file");
    assert_eq!(bytes, b"ok");
}

#[test]
fn read_bytes_with_limit_rejects_large_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("large.bin");
    let limit = 8_usize;
    fs::write(&path, vec![0_u8; limit + 1]).expect("write large file");

    let err = read_bytes_with_limit(&path, limit).expect_err("expected size limit failure");
    match err {
        ReadLimitError::TooLarge {
            size,
            limit: reported,
        } => {
            assert!(size > u64::try_from(limit).unwrap());
            assert_eq!(reported, limit);
        }
        ReadLimitError::Io(err) => panic!("unexpected IO error: {err}"),
    }
}

#[test]
fn read_json_names_the_input_kind_on_decode_failure() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("structure.json");
    fs::write(&path, b"{\"surveyId\": ").unwrap();

    let err = read_json::<SurveyStructure>(&path, 1024, "survey structure").unwrap_err();
    assert!(err.to_string().starts_with("invalid survey structure"));
}

#[test]
fn read_json_reports_missing_files() {
    let dir = TempDir::new().unwrap();
    let err = read_json::<SurveyStructure>(&dir.path().join("absent.json"), 1024, "answers")
        .unwrap_err();
    assert!(err.to_string().starts_with("failed to read answers"));
}

#[test]
fn read_json_rejects_survey_records_with_mismatched_versions() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("survey.json");
    let mut record = json!({
        "id": "s-1",
        "projectId": "p-1",
        "name": "Household",
        "version": 3,
        "structure": serde_json::to_value(structure()).unwrap()
    });
    fs::write(&path, serde_json::to_vec(&record).unwrap()).unwrap();
    let err = read_json::<Survey>(&path, 4096, "survey").unwrap_err().to_string();
    assert!(err.starts_with("invalid survey"), "{err}");
    assert!(err.contains("version 3 but its structure is at version 2"), "{err}");

    record["version"] = json!(2);
    fs::write(&path, serde_json::to_vec(&record).unwrap()).unwrap();
    let survey = read_json::<Survey>(&path, 4096, "survey").unwrap();
    assert_eq!(survey.version, 2);
}

// ============================================================================
// SECTION: Argument Parsing
// ============================================================================

#[test]
fn command_definition_is_consistent() {
    Cli::command().debug_assert();
}

#[test]
fn visibility_answers_are_optional() {
    let cli = Cli::try_parse_from([
        "survey-portal",
        "survey",
        "visibility",
        "--structure",
        "structure.json",
    ])
    .unwrap();
    match cli.command {
        Some(Commands::Survey {
            command: SurveyCommand::Visibility(command),
        }) => {
            assert_eq!(command.structure.to_str(), Some("structure.json"));
            assert!(command.answers.is_none());
        }
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn check_response_requires_a_response_path() {
    let result = Cli::try_parse_from([
        "survey-portal",
        "survey",
        "check-response",
        "--structure",
        "structure.json",
    ]);
    assert!(result.is_err());
}

#[test]
fn parse_day_accepts_calendar_dates_only() {
    let day = parse_day("2025-06-10").unwrap();
    assert_eq!((day.year(), day.month(), day.day()), (2025, Month::June, 10));
    assert!(parse_day("10/06/2025").is_err());
    assert!(parse_day("2025-02-30").is_err());
}

// ============================================================================
// SECTION: Reports
// ============================================================================

#[test]
fn structure_report_lists_duplicate_questions() {
    let mut structure = structure();
    let copy = structure.sections[0].questions[0].clone();
    structure.sections[0].questions.push(copy);

    let report = structure_report(&structure);
    assert!(!report.valid);
    assert_eq!(
        report.issues,
        vec![StructureIssue::DuplicateQuestionId {
            question_id: QuestionId::new("owner"),
        }]
    );
}

#[test]
fn structure_report_is_valid_for_sound_structures() {
    let report = structure_report(&structure());
    assert!(report.valid);
    assert!(report.issues.is_empty());
}

#[test]
fn response_report_checks_only_visible_questions() {
    let hidden = response_report(&structure(), &response(json!({"owner": "no"})));
    assert!(hidden.valid);

    let shown = response_report(&structure(), &response(json!({"owner": "yes"})));
    assert!(!shown.valid);
    assert!(matches!(
        shown.issues.as_slice(),
        [AnswerIssue::Required { question_id, .. }] if question_id.as_str() == "deed"
    ));
}

#[test]
fn fingerprint_report_is_stable_and_tracks_content() {
    let first = fingerprint_report(&structure()).unwrap();
    let second = fingerprint_report(&structure()).unwrap();
    assert_eq!(first.fingerprint, second.fingerprint);
    assert_eq!(first.fingerprint.len(), 64);
    assert_eq!(first.version, 2);
    assert_eq!(first.survey_id.as_str(), "s-1");

    let mut changed = structure();
    changed.title = "Renamed".to_string();
    assert_ne!(fingerprint_report(&changed).unwrap().fingerprint, first.fingerprint);
}
