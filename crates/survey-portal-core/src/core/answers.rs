// crates/survey-portal-core/src/core/answers.rs
// ============================================================================
// Module: Survey Answers
// Description: Closed answer value type and the answer map keyed by question.
// Purpose: Give the evaluators a typed view over loosely shaped JSON answers.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! Answers travel as plain JSON (`"yes"`, `42`, `true`, `["a", "b"]`). On the
//! way in they are decoded into [`AnswerValue`], a closed tagged type, so the
//! comparison operators can match exhaustively on answer shape. A JSON `null`
//! is the same as an absent answer and is dropped during decoding.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Number;

use crate::core::identifiers::QuestionId;

// ============================================================================
// SECTION: Answer Value
// ============================================================================

/// A single collected answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnswerValue {
    /// Boolean answer.
    Boolean(bool),
    /// Numeric answer.
    Number(Number),
    /// Text answer; also carries select, radio, date, and time answers.
    Text(String),
    /// Selected options for multiselect and checkbox questions.
    List(Vec<String>),
}

impl AnswerValue {
    /// Returns true for empty text and empty lists.
    ///
    /// Booleans and numbers are never empty, including `false` and `0`.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Text(text) => text.is_empty(),
            Self::List(items) => items.is_empty(),
            Self::Boolean(_) | Self::Number(_) => false,
        }
    }

    /// Returns a stable label for the answer shape.
    #[must_use]
    pub const fn shape(&self) -> &'static str {
        match self {
            Self::Boolean(_) => "boolean",
            Self::Number(_) => "number",
            Self::Text(_) => "text",
            Self::List(_) => "list",
        }
    }
}

impl From<&str> for AnswerValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<i64> for AnswerValue {
    fn from(value: i64) -> Self {
        Self::Number(Number::from(value))
    }
}

impl From<bool> for AnswerValue {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<Vec<&str>> for AnswerValue {
    fn from(values: Vec<&str>) -> Self {
        Self::List(values.into_iter().map(str::to_string).collect())
    }
}

// ============================================================================
// SECTION: Answer Map
// ============================================================================

/// Answers keyed by question identifier.
///
/// # Invariants
/// - Contains no `null` entries; absent and `null` are the same state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<QuestionId, Option<AnswerValue>>")]
pub struct Answers(BTreeMap<QuestionId, AnswerValue>);

impl Answers {
    /// Creates an empty answer map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the answer for a question, if any.
    #[must_use]
    pub fn get(&self, id: &QuestionId) -> Option<&AnswerValue> {
        self.0.get(id)
    }

    /// Records an answer, replacing any previous value.
    pub fn insert(&mut self, id: impl Into<QuestionId>, value: impl Into<AnswerValue>) {
        self.0.insert(id.into(), value.into());
    }

    /// Removes an answer.
    pub fn remove(&mut self, id: &QuestionId) -> Option<AnswerValue> {
        self.0.remove(id)
    }

    /// Iterates answers in question-id order.
    pub fn iter(&self) -> impl Iterator<Item = (&QuestionId, &AnswerValue)> {
        self.0.iter()
    }

    /// Returns the number of recorded answers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true when no answers are recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<BTreeMap<QuestionId, Option<AnswerValue>>> for Answers {
    fn from(raw: BTreeMap<QuestionId, Option<AnswerValue>>) -> Self {
        Self(raw.into_iter().filter_map(|(id, value)| value.map(|value| (id, value))).collect())
    }
}

impl<K, V> FromIterator<(K, V)> for Answers
where
    K: Into<QuestionId>,
    V: Into<AnswerValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(id, value)| (id.into(), value.into())).collect())
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
