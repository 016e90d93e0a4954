use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::spec::question::QuestionSpec;

/// Persisted form definition produced when a form is created from a table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct FormSpec {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub airtable_base_id: String,
    pub airtable_table_id: String,
    pub questions: Vec<QuestionSpec>,
}

impl FormSpec {
    /// Last question carrying `key`; later duplicates shadow earlier ones.
    pub fn question(&self, key: &str) -> Option<&QuestionSpec> {
        self.questions
            .iter()
            .rev()
            .find(|question| question.question_key == key)
    }
}
