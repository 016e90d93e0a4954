use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Live answers of one form-filling session, keyed by question key.
pub type AnswerMap = Map<String, Value>;

/// Body of a create-response request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Submission {
    pub answers: AnswerMap,
}

impl Submission {
    pub fn new(answers: AnswerMap) -> Self {
        Self { answers }
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Failure body returned by the submission endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct SubmissionError {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<String>>,
}

impl SubmissionError {
    pub const FALLBACK_MESSAGE: &'static str = "Submission failed";

    /// Lines to show the user: the error list when present, otherwise the
    /// message, otherwise a generic failure line.
    pub fn display_lines(&self) -> Vec<String> {
        if let Some(errors) = &self.errors
            && !errors.is_empty()
        {
            return errors.clone();
        }
        match &self.message {
            Some(message) if !message.trim().is_empty() => vec![message.clone()],
            _ => vec![Self::FALLBACK_MESSAGE.to_string()],
        }
    }
}

/// Reads an answer as a list of strings, the shape multi-select and
/// attachment questions produce. Any other shape reads as empty.
pub fn answer_as_list(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(String::from)
            .collect(),
        _ => Vec::new(),
    }
}

/// Display form of an answer value; arrays join with `", "`.
pub fn answer_to_display(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Array(items) => items
            .iter()
            .map(answer_to_display)
            .collect::<Vec<_>>()
            .join(", "),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
