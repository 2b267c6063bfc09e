// crates/survey-portal-core/src/core/structure.rs
// ============================================================================
// Module: Survey Structure Model
// Description: Sections, questions, validation rules, and conditional logic.
// Purpose: Define the versioned survey structure document and lookup helpers.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! A [`SurveyStructure`] is a tree: the structure owns its sections and each
//! section owns its questions in render order. Questions reference each other
//! only by [`QuestionId`] from inside [`ConditionalLogicCondition`]; those are
//! weak references validated by [`crate::validate_structure`], never followed
//! as ownership links.
//!
//! Serialization uses the camelCase keys of the stored document.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Number;

use crate::core::identifiers::QuestionId;
use crate::core::identifiers::SectionId;
use crate::core::identifiers::SurveyId;

// ============================================================================
// SECTION: Structure Document
// ============================================================================

/// Versioned survey structure document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SurveyStructure {
    /// Owning survey identifier.
    pub survey_id: SurveyId,
    /// Survey title shown to respondents.
    pub title: String,
    /// Optional survey description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Structure version; matches the owning survey's version.
    pub version: u32,
    /// Ordered sections.
    #[serde(default)]
    pub sections: Vec<Section>,
}

impl SurveyStructure {
    /// Iterates every question across all sections in render order.
    pub fn questions(&self) -> impl Iterator<Item = &Question> {
        self.sections.iter().flat_map(|section| section.questions.iter())
    }

    /// Finds a question anywhere in the structure.
    #[must_use]
    pub fn question(&self, id: &QuestionId) -> Option<&Question> {
        self.questions().find(|question| &question.id == id)
    }

    /// Finds a section by identifier.
    #[must_use]
    pub fn section(&self, id: &SectionId) -> Option<&Section> {
        self.sections.iter().find(|section| &section.id == id)
    }

    /// Returns the total number of questions.
    #[must_use]
    pub fn question_count(&self) -> usize {
        self.sections.iter().map(|section| section.questions.len()).sum()
    }
}

/// Ordered group of questions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    /// Section identifier.
    pub id: SectionId,
    /// Section title.
    pub title: String,
    /// Optional section description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Ordered questions.
    #[serde(default)]
    pub questions: Vec<Question>,
}

// ============================================================================
// SECTION: Questions
// ============================================================================

/// A single survey question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    /// Question identifier, unique across the structure.
    pub id: QuestionId,
    /// Answer type.
    #[serde(rename = "type")]
    pub kind: QuestionType,
    /// Prompt shown to the respondent.
    pub label: String,
    /// Optional input placeholder.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    /// Optional help text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Whether an answer is mandatory when the question is visible.
    #[serde(default)]
    pub required: bool,
    /// Selectable options for choice types.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
    /// Ordered validation rules.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub validation: Vec<ValidationRule>,
    /// Optional visibility conditions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conditional_logic: Option<ConditionalLogic>,
}

impl Question {
    /// Returns true when visibility depends on other answers.
    #[must_use]
    pub fn has_active_logic(&self) -> bool {
        self.conditional_logic.as_ref().is_some_and(|logic| logic.enabled)
    }
}

/// Question answer type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionType {
    /// Free text.
    Text,
    /// Numeric input.
    Number,
    /// Single choice from a dropdown.
    Select,
    /// Multiple choices from a list.
    Multiselect,
    /// Single choice from radio buttons.
    Radio,
    /// Multiple choices from checkboxes.
    Checkbox,
    /// Calendar date.
    Date,
    /// Time of day.
    Time,
}

impl QuestionType {
    /// Returns the stable document spelling.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Number => "number",
            Self::Select => "select",
            Self::Multiselect => "multiselect",
            Self::Radio => "radio",
            Self::Checkbox => "checkbox",
            Self::Date => "date",
            Self::Time => "time",
        }
    }

    /// Returns true when the question picks from declared options.
    #[must_use]
    pub const fn is_choice(self) -> bool {
        matches!(self, Self::Select | Self::Multiselect | Self::Radio | Self::Checkbox)
    }

    /// Returns true when answers are lists of selected options.
    #[must_use]
    pub const fn is_multi_valued(self) -> bool {
        matches!(self, Self::Multiselect | Self::Checkbox)
    }

    /// Returns true when answers carry a natural ordering.
    #[must_use]
    pub const fn is_ordered(self) -> bool {
        matches!(self, Self::Number | Self::Date | Self::Time)
    }

    /// Returns true when `kind` may be attached to a question of this type.
    #[must_use]
    pub const fn allows_rule(self, kind: ValidationKind) -> bool {
        match kind {
            ValidationKind::Required => true,
            ValidationKind::MinValue | ValidationKind::MaxValue => matches!(self, Self::Number),
            ValidationKind::MinLength
            | ValidationKind::MaxLength
            | ValidationKind::Pattern
            | ValidationKind::Email => matches!(self, Self::Text),
        }
    }
}

impl fmt::Display for QuestionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// SECTION: Validation Rules
// ============================================================================

/// Answer validation rule attached to a question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationRule {
    /// Rule kind.
    #[serde(rename = "type")]
    pub kind: ValidationKind,
    /// Message shown when the rule fails.
    pub message: String,
    /// Comparison value for length, bound, and pattern rules.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<ConditionValue>,
}

/// Validation rule kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ValidationKind {
    /// Answer must be present.
    Required,
    /// Minimum text length in characters.
    MinLength,
    /// Maximum text length in characters.
    MaxLength,
    /// Minimum numeric value.
    MinValue,
    /// Maximum numeric value.
    MaxValue,
    /// Regular expression the whole answer must match.
    Pattern,
    /// Answer must look like an email address.
    Email,
}

impl ValidationKind {
    /// Returns the stable document spelling.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Required => "required",
            Self::MinLength => "minLength",
            Self::MaxLength => "maxLength",
            Self::MinValue => "minValue",
            Self::MaxValue => "maxValue",
            Self::Pattern => "pattern",
            Self::Email => "email",
        }
    }

    /// Returns true when the rule is meaningless without a comparison value.
    #[must_use]
    pub const fn requires_value(self) -> bool {
        matches!(
            self,
            Self::MinLength | Self::MaxLength | Self::MinValue | Self::MaxValue | Self::Pattern
        )
    }
}

impl fmt::Display for ValidationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// SECTION: Conditional Logic
// ============================================================================

/// Visibility conditions for a question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionalLogic {
    /// Disabled logic leaves the question always visible.
    pub enabled: bool,
    /// Action applied when the combined conditions hold.
    pub action: ConditionalAction,
    /// Combinator over the condition results.
    pub logic: LogicCombinator,
    /// Ordered conditions.
    #[serde(default)]
    pub conditions: Vec<ConditionalLogicCondition>,
}

/// Conditional logic action.
///
/// Unrecognized spellings are kept verbatim so the structure still loads and
/// the author gets an explicit error instead of a silent default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ConditionalAction {
    /// Show the question when the conditions hold.
    Show,
    /// Action spelling this version does not understand.
    Unrecognized(String),
}

impl ConditionalAction {
    /// Returns the document spelling.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Show => "show",
            Self::Unrecognized(raw) => raw,
        }
    }
}

impl From<String> for ConditionalAction {
    fn from(value: String) -> Self {
        if value == "show" { Self::Show } else { Self::Unrecognized(value) }
    }
}

impl From<ConditionalAction> for String {
    fn from(value: ConditionalAction) -> Self {
        match value {
            ConditionalAction::Show => "show".to_string(),
            ConditionalAction::Unrecognized(raw) => raw,
        }
    }
}

/// Logical combinator for condition results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LogicCombinator {
    /// Every condition must hold.
    #[serde(rename = "AND")]
    And,
    /// At least one condition must hold.
    #[serde(rename = "OR")]
    Or,
}

/// A single visibility condition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConditionalLogicCondition {
    /// Referenced question whose answer is inspected.
    pub question_id: QuestionId,
    /// Comparison operator.
    pub operator: ConditionOperator,
    /// Comparison value; ignored by `isEmpty` and `isNotEmpty`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<ConditionValue>,
}

/// Condition comparison operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ConditionOperator {
    /// Structural equality.
    Equals,
    /// Structural inequality.
    NotEquals,
    /// Ordered comparison, answer above value.
    GreaterThan,
    /// Ordered comparison, answer below value.
    LessThan,
    /// Substring for text, membership for lists.
    Contains,
    /// Answer absent, empty text, or empty list.
    IsEmpty,
    /// Negation of `isEmpty`.
    IsNotEmpty,
}

impl ConditionOperator {
    /// Returns the stable document spelling.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Equals => "equals",
            Self::NotEquals => "notEquals",
            Self::GreaterThan => "greaterThan",
            Self::LessThan => "lessThan",
            Self::Contains => "contains",
            Self::IsEmpty => "isEmpty",
            Self::IsNotEmpty => "isNotEmpty",
        }
    }

    /// Returns true when the operator compares against a value.
    #[must_use]
    pub const fn requires_value(self) -> bool {
        !matches!(self, Self::IsEmpty | Self::IsNotEmpty)
    }
}

impl fmt::Display for ConditionOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Scalar comparison value used by conditions and validation rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConditionValue {
    /// Boolean literal.
    Boolean(bool),
    /// Numeric literal.
    Number(Number),
    /// Text literal.
    Text(String),
}

impl ConditionValue {
    /// Renders the value the way it would appear inside a text answer.
    #[must_use]
    pub fn render(&self) -> String {
        match self {
            Self::Boolean(value) => value.to_string(),
            Self::Number(value) => value.to_string(),
            Self::Text(value) => value.clone(),
        }
    }
}

impl From<&str> for ConditionValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<i64> for ConditionValue {
    fn from(value: i64) -> Self {
        Self::Number(Number::from(value))
    }
}

impl From<bool> for ConditionValue {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}
