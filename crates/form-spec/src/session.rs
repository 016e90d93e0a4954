use serde_json::Value;

use crate::{
    answers::{AnswerMap, Submission, answer_as_list},
    render::{RenderPayload, build_render_payload},
    spec::form::FormSpec,
    visibility::{VisibilityMap, resolve_visibility},
};

/// One form-filling session: the form plus the only mutable answer map.
#[derive(Debug, Clone)]
pub struct FormSession {
    spec: FormSpec,
    answers: AnswerMap,
}

impl FormSession {
    pub fn new(spec: FormSpec) -> Self {
        Self::with_answers(spec, AnswerMap::new())
    }

    pub fn with_answers(spec: FormSpec, answers: AnswerMap) -> Self {
        Self { spec, answers }
    }

    pub fn spec(&self) -> &FormSpec {
        &self.spec
    }

    pub fn answers(&self) -> &AnswerMap {
        &self.answers
    }

    pub fn set_answer(&mut self, key: &str, value: Value) {
        self.answers.insert(key.to_string(), value);
    }

    /// Checks or unchecks one option of a multi-select answer.
    ///
    /// A non-list answer is treated as an empty selection.
    pub fn toggle_option(&mut self, key: &str, option: &str, checked: bool) {
        let mut current = answer_as_list(self.answers.get(key));
        if checked {
            if !current.iter().any(|value| value == option) {
                current.push(option.to_string());
            }
        } else {
            current.retain(|value| value != option);
        }
        self.set_answer(
            key,
            Value::Array(current.into_iter().map(Value::String).collect()),
        );
    }

    /// Stores comma separated attachment URLs as a list, dropping blanks.
    pub fn set_attachments(&mut self, key: &str, raw: &str) {
        let urls = parse_attachment_list(raw);
        self.set_answer(key, Value::Array(urls.into_iter().map(Value::String).collect()));
    }

    pub fn visibility(&self) -> VisibilityMap {
        resolve_visibility(&self.spec, &self.answers)
    }

    pub fn render(&self) -> RenderPayload {
        build_render_payload(&self.spec, &self.answers)
    }

    /// Request body for the current answers, hidden questions included.
    pub fn submission(&self) -> Submission {
        Submission::new(self.answers.clone())
    }

    /// Clears the answers once the submission was acknowledged.
    pub fn complete_submission(&mut self) {
        self.answers.clear();
    }
}

pub fn parse_attachment_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(String::from)
        .collect()
}
