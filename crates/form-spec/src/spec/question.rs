use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};

use crate::lenient;
use crate::rule::Rule;

/// Input kind of a question, as reported by the remote table schema.
///
/// Unknown remote types are kept verbatim so a stored form round-trips; the
/// render layer skips them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum QuestionType {
    ShortText,
    LongText,
    SingleSelect,
    MultiSelect,
    Attachment,
    Unrecognized(String),
}

/// Shape of the answer value a question produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueShape {
    /// A single string.
    Scalar,
    /// An ordered sequence of strings.
    Set,
}

impl QuestionType {
    pub fn as_str(&self) -> &str {
        match self {
            QuestionType::ShortText => "shortText",
            QuestionType::LongText => "longText",
            QuestionType::SingleSelect => "singleSelect",
            QuestionType::MultiSelect => "multiSelect",
            QuestionType::Attachment => "attachment",
            QuestionType::Unrecognized(label) => label,
        }
    }

    pub fn is_recognized(&self) -> bool {
        !matches!(self, QuestionType::Unrecognized(_))
    }

    /// Whether remote options are carried into the question definition.
    pub fn carries_options(&self) -> bool {
        matches!(self, QuestionType::SingleSelect | QuestionType::MultiSelect)
    }

    pub fn value_shape(&self) -> Option<ValueShape> {
        match self {
            QuestionType::ShortText | QuestionType::LongText | QuestionType::SingleSelect => {
                Some(ValueShape::Scalar)
            }
            QuestionType::MultiSelect | QuestionType::Attachment => Some(ValueShape::Set),
            QuestionType::Unrecognized(_) => None,
        }
    }
}

impl Default for QuestionType {
    fn default() -> Self {
        QuestionType::Unrecognized(String::new())
    }
}

impl From<String> for QuestionType {
    fn from(label: String) -> Self {
        match label.as_str() {
            "shortText" => QuestionType::ShortText,
            "longText" => QuestionType::LongText,
            "singleSelect" => QuestionType::SingleSelect,
            "multiSelect" => QuestionType::MultiSelect,
            "attachment" => QuestionType::Attachment,
            _ => QuestionType::Unrecognized(label),
        }
    }
}

impl From<&str> for QuestionType {
    fn from(label: &str) -> Self {
        QuestionType::from(label.to_string())
    }
}

impl From<QuestionType> for String {
    fn from(kind: QuestionType) -> Self {
        match kind {
            QuestionType::Unrecognized(label) => label,
            other => other.as_str().to_string(),
        }
    }
}

impl fmt::Display for QuestionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One question of a form, in its persisted shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuestionSpec {
    pub question_key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub airtable_field_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub airtable_field_name: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub label: String,
    #[serde(rename = "type", default, deserialize_with = "question_type")]
    #[schemars(with = "String")]
    pub kind: QuestionType,
    #[serde(default, deserialize_with = "lenient::flag")]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
    #[serde(default)]
    pub conditional_rules: Option<Rule>,
}

/// A missing or non-string type reads as an unrecognized, empty type.
fn question_type<'de, D>(deserializer: D) -> Result<QuestionType, D::Error>
where
    D: Deserializer<'de>,
{
    lenient::text(deserializer).map(QuestionType::from)
}
