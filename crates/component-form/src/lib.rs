use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use thiserror::Error;

use form_spec::{
    AnswerMap, BuildError, FormDraft, FormSpec, RemoteField, Rule, SubmissionError,
    build_render_payload, duplicate_keys, render_json_ui as form_render_json_ui,
    render_text as form_render_text, resolve_visibility as form_resolve_visibility,
    should_show as form_should_show,
};

#[derive(Debug, Error)]
enum ComponentError {
    #[error("failed to parse config: {0}")]
    ConfigParse(#[source] serde_json::Error),
    #[error("failed to parse fields: {0}")]
    FieldsParse(#[source] serde_json::Error),
    #[error("json encode error: {0}")]
    JsonEncode(#[source] serde_json::Error),
    #[error("form build failed: {0}")]
    Build(#[from] BuildError),
}

/// Host configuration: the stored form, serialized.
#[derive(Debug, Deserialize, Serialize, Default)]
struct ComponentConfig {
    #[serde(default)]
    form_json: Option<String>,
}

/// Draft edits applied on top of the projected fields.
#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct DraftInput {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    base_id: String,
    #[serde(default)]
    table_id: String,
    fields: Vec<RemoteField>,
    #[serde(default)]
    exclude: Vec<String>,
    #[serde(default)]
    required: Vec<String>,
    #[serde(default)]
    labels: Map<String, Value>,
    #[serde(default)]
    exclude_at: Vec<usize>,
    #[serde(default)]
    required_at: Vec<usize>,
    /// Label overrides keyed by field position.
    #[serde(default)]
    labels_at: BTreeMap<usize, String>,
}

fn load_form(config_json: &str) -> Result<FormSpec, ComponentError> {
    let config: ComponentConfig =
        serde_json::from_str(config_json).map_err(ComponentError::ConfigParse)?;
    // A bare form document is accepted as well as the wrapped config.
    let form_json = config.form_json.as_deref().unwrap_or(config_json);
    serde_json::from_str(form_json).map_err(ComponentError::ConfigParse)
}

fn parse_answers(answers_json: &str) -> AnswerMap {
    serde_json::from_str::<Value>(answers_json)
        .ok()
        .and_then(|value| value.as_object().cloned())
        .unwrap_or_default()
}

fn respond(result: Result<Value, ComponentError>) -> String {
    match result {
        Ok(value) => serde_json::to_string(&value).unwrap_or_else(|error| {
            json!({"error": format!("json encode: {}", error)}).to_string()
        }),
        Err(err) => {
            tracing::warn!(error = %err, "component call failed");
            json!({ "error": err.to_string() }).to_string()
        }
    }
}

fn respond_string(result: Result<String, ComponentError>) -> String {
    match result {
        Ok(value) => value,
        Err(err) => {
            tracing::warn!(error = %err, "component call failed");
            json!({ "error": err.to_string() }).to_string()
        }
    }
}

pub fn describe(config_json: &str) -> String {
    respond(
        load_form(config_json)
            .and_then(|spec| serde_json::to_value(spec).map_err(ComponentError::JsonEncode)),
    )
}

/// Projects a field listing into a form and returns the persisted shape.
pub fn project_fields(draft_json: &str) -> String {
    respond(build_draft(draft_json).and_then(|spec| {
        let duplicates = duplicate_keys(&spec);
        if !duplicates.is_empty() {
            tracing::warn!(?duplicates, "question keys collide; later questions shadow earlier ones");
        }
        serde_json::to_value(spec).map_err(ComponentError::JsonEncode)
    }))
}

fn build_draft(draft_json: &str) -> Result<FormSpec, ComponentError> {
    let input: DraftInput =
        serde_json::from_str(draft_json).map_err(ComponentError::FieldsParse)?;
    let mut draft = FormDraft::new(input.base_id, input.table_id, &input.fields);
    draft.name = input.name.unwrap_or_default();
    for key in &input.exclude {
        draft.set_included(key, false);
    }
    for key in &input.required {
        draft.set_required(key, true);
    }
    for (key, label) in &input.labels {
        if let Some(label) = label.as_str() {
            draft.set_label(key, label);
        }
    }
    let mut out_of_range = Vec::new();
    for &index in &input.exclude_at {
        if !draft.set_included_at(index, false) {
            out_of_range.push(index);
        }
    }
    for &index in &input.required_at {
        if !draft.set_required_at(index, true) {
            out_of_range.push(index);
        }
    }
    for (&index, label) in &input.labels_at {
        if !draft.set_label_at(index, label) {
            out_of_range.push(index);
        }
    }
    if !out_of_range.is_empty() {
        tracing::warn!(?out_of_range, fields = draft.fields.len(), "field index edits ignored");
    }
    Ok(draft.build()?)
}

pub fn resolve_visibility(config_json: &str, answers_json: &str) -> String {
    respond(load_form(config_json).and_then(|spec| {
        let answers = parse_answers(answers_json);
        let visibility = form_resolve_visibility(&spec, &answers);
        tracing::debug!(questions = spec.questions.len(), "visibility pass");
        serde_json::to_value(visibility).map_err(ComponentError::JsonEncode)
    }))
}

/// Evaluates a single rule; malformed rules never fail.
pub fn should_show(rule_json: &str, answers_json: &str) -> String {
    let rule = serde_json::from_str::<Option<Rule>>(rule_json).unwrap_or_default();
    let answers = parse_answers(answers_json);
    json!({ "visible": form_should_show(rule.as_ref(), &answers) }).to_string()
}

pub fn render_json_ui(config_json: &str, answers_json: &str) -> String {
    respond(load_form(config_json).map(|spec| {
        let answers = parse_answers(answers_json);
        form_render_json_ui(&build_render_payload(&spec, &answers))
    }))
}

pub fn render_text(config_json: &str, answers_json: &str) -> String {
    respond_string(load_form(config_json).map(|spec| {
        let answers = parse_answers(answers_json);
        form_render_text(&build_render_payload(&spec, &answers))
    }))
}

/// Body of the create-response request for the given answers.
pub fn submit(config_json: &str, answers_json: &str) -> String {
    respond(load_form(config_json).map(|_| json!({ "answers": parse_answers(answers_json) })))
}

/// Lines to show for a failed submission body; unparsable bodies fall back
/// to the generic failure line.
pub fn describe_submission_error(error_json: &str) -> String {
    let error = serde_json::from_str::<SubmissionError>(error_json).unwrap_or_default();
    json!({ "lines": error.display_lines() }).to_string()
}
