use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::lenient;

/// One stored submission as listed for review.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseRecord {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default, deserialize_with = "lenient::flag")]
    pub deleted_in_airtable: bool,
    /// Leading `[key, value]` pairs of the answers.
    #[serde(default, deserialize_with = "lenient::pairs")]
    pub preview: Vec<(String, Value)>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseStatus {
    Active,
    DeletedInAirtable,
}

impl ResponseStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseStatus::Active => "Active",
            ResponseStatus::DeletedInAirtable => "Deleted in Airtable",
        }
    }
}

impl ResponseRecord {
    pub fn status(&self) -> ResponseStatus {
        if self.deleted_in_airtable {
            ResponseStatus::DeletedInAirtable
        } else {
            ResponseStatus::Active
        }
    }

    pub fn preview_text(&self) -> String {
        if self.preview.is_empty() {
            return "—".to_string();
        }
        self.preview
            .iter()
            .map(|(key, value)| format!("{}: {}", key, preview_value(value)))
            .collect::<Vec<_>>()
            .join(" | ")
    }
}

/// Preview form of a stored value: list items join with a bare `,` and null
/// items inside a list print as nothing.
fn preview_value(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::Null => String::new(),
                other => preview_value(other),
            })
            .collect::<Vec<_>>()
            .join(","),
        other => other.to_string(),
    }
}

/// Listing payload of the responses endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ResponseListing {
    #[serde(default)]
    pub responses: Vec<ResponseRecord>,
}

/// Plain-text table of the listing; one row per response.
pub fn render_responses(records: &[ResponseRecord]) -> String {
    if records.is_empty() {
        return "No responses submitted yet.".to_string();
    }

    let mut lines = vec!["# | Submission ID | Created At | Status | Answers Preview".to_string()];
    for (index, record) in records.iter().enumerate() {
        lines.push(format!(
            "{} | {} | {} | {} | {}",
            index + 1,
            record.id,
            record.created_at.as_deref().unwrap_or("—"),
            record.status().as_str(),
            record.preview_text()
        ));
    }
    lines.join("\n")
}
