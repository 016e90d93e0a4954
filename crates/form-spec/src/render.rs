use serde_json::{Map, Value, json};

use crate::{
    answers::{AnswerMap, answer_as_list, answer_to_display},
    spec::{form::FormSpec, question::QuestionType},
    visibility::visible_in_order,
};

/// Blank first entry of a single-select input.
pub const SELECT_PLACEHOLDER: &str = "Select...";

/// Input widget a question renders as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    /// Free text; short and long text share it.
    Text,
    /// One option out of many, with a blank placeholder entry.
    Select,
    /// Any number of options.
    Checkboxes,
    /// Comma separated file URLs.
    Attachments,
}

impl InputKind {
    pub fn for_type(kind: &QuestionType) -> Option<Self> {
        match kind {
            QuestionType::ShortText | QuestionType::LongText => Some(InputKind::Text),
            QuestionType::SingleSelect => Some(InputKind::Select),
            QuestionType::MultiSelect => Some(InputKind::Checkboxes),
            QuestionType::Attachment => Some(InputKind::Attachments),
            QuestionType::Unrecognized(_) => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            InputKind::Text => "text",
            InputKind::Select => "select",
            InputKind::Checkboxes => "checkboxes",
            InputKind::Attachments => "attachments",
        }
    }
}

/// Progress counters over the rendered questions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderProgress {
    pub answered: usize,
    pub total: usize,
}

/// Describes a single rendered question.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderQuestion {
    pub key: String,
    pub label: String,
    pub kind: QuestionType,
    pub input: InputKind,
    pub required: bool,
    pub options: Vec<String>,
    pub current_value: Option<Value>,
    /// Text shown in the input box.
    pub display: String,
    /// Checked options of a checkbox group.
    pub selected: Vec<String>,
}

/// Visible, renderable questions of a form against the current answers.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderPayload {
    pub form_name: String,
    pub description: Option<String>,
    pub progress: RenderProgress,
    pub questions: Vec<RenderQuestion>,
}

impl RenderPayload {
    pub fn question(&self, key: &str) -> Option<&RenderQuestion> {
        self.questions.iter().find(|question| question.key == key)
    }
}

/// An answer counts once it holds a non-blank string or a non-empty list.
pub fn is_answered(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::String(text)) => !text.trim().is_empty(),
        Some(Value::Array(items)) => !items.is_empty(),
        Some(_) => true,
    }
}

/// Build the renderer payload from the form and the current answers.
///
/// Hidden questions and questions of an unrecognized type are left out; the
/// latter stay in the stored form.
pub fn build_render_payload(spec: &FormSpec, answers: &AnswerMap) -> RenderPayload {
    let visibility = visible_in_order(spec, answers);

    let questions = spec
        .questions
        .iter()
        .zip(visibility)
        .filter(|(_, visible)| *visible)
        .filter_map(|(question, _)| {
            let input = InputKind::for_type(&question.kind)?;
            let current_value = answers.get(&question.question_key).cloned();
            let (display, selected) = match input {
                InputKind::Text => (
                    current_value
                        .as_ref()
                        .map(answer_to_display)
                        .unwrap_or_default(),
                    Vec::new(),
                ),
                InputKind::Select => (
                    current_value
                        .as_ref()
                        .and_then(Value::as_str)
                        .unwrap_or_default()
                        .to_string(),
                    Vec::new(),
                ),
                InputKind::Checkboxes => (String::new(), answer_as_list(current_value.as_ref())),
                InputKind::Attachments => {
                    (answer_as_list(current_value.as_ref()).join(", "), Vec::new())
                }
            };
            Some(RenderQuestion {
                key: question.question_key.clone(),
                label: question.label.clone(),
                kind: question.kind.clone(),
                input,
                required: question.required,
                options: question.options.clone().unwrap_or_default(),
                current_value,
                display,
                selected,
            })
        })
        .collect::<Vec<_>>();

    let answered = questions
        .iter()
        .filter(|question| is_answered(question.current_value.as_ref()))
        .count();
    let total = questions.len();

    RenderPayload {
        form_name: spec.name.clone(),
        description: spec.description.clone(),
        progress: RenderProgress { answered, total },
        questions,
    }
}

/// Render the payload as a structured JSON-friendly value.
pub fn render_json_ui(payload: &RenderPayload) -> Value {
    let questions = payload
        .questions
        .iter()
        .map(|question| {
            let mut map = Map::new();
            map.insert("key".into(), Value::String(question.key.clone()));
            map.insert("label".into(), Value::String(question.label.clone()));
            map.insert("type".into(), Value::String(question.kind.to_string()));
            map.insert(
                "input".into(),
                Value::String(question.input.as_str().to_string()),
            );
            map.insert("required".into(), Value::Bool(question.required));
            if !question.options.is_empty() {
                let mut options = question.options.clone();
                if question.input == InputKind::Select {
                    options.insert(0, SELECT_PLACEHOLDER.to_string());
                }
                map.insert("options".into(), json!(options));
            }
            if let Some(value) = &question.current_value {
                map.insert("current_value".into(), value.clone());
            }
            map.insert("display".into(), Value::String(question.display.clone()));
            if question.input == InputKind::Checkboxes {
                map.insert("selected".into(), json!(question.selected));
            }
            Value::Object(map)
        })
        .collect::<Vec<_>>();

    json!({
        "form_name": payload.form_name,
        "description": payload.description,
        "progress": {
            "answered": payload.progress.answered,
            "total": payload.progress.total,
        },
        "questions": questions,
    })
}

/// Render the payload as human-friendly text.
pub fn render_text(payload: &RenderPayload) -> String {
    let mut lines = Vec::new();
    lines.push(format!("Form: {}", payload.form_name));
    if let Some(description) = &payload.description {
        lines.push(description.clone());
    }
    lines.push(format!(
        "Answered: {}/{}",
        payload.progress.answered, payload.progress.total
    ));

    if payload.questions.is_empty() {
        lines.push("No visible questions.".to_string());
        return lines.join("\n");
    }

    lines.push("Visible questions:".to_string());
    for question in &payload.questions {
        let mut entry = format!(" - {}", question.label);
        if question.required {
            entry.push_str(" *");
        }
        entry.push_str(&format!(" [{}]", input_hint(question)));
        let shown = match question.input {
            InputKind::Checkboxes => question.selected.join(", "),
            _ => question.display.clone(),
        };
        if !shown.is_empty() {
            entry.push_str(&format!(" = {}", shown));
        }
        lines.push(entry);
    }

    lines.join("\n")
}

fn input_hint(question: &RenderQuestion) -> String {
    match question.input {
        InputKind::Text => "text".to_string(),
        InputKind::Select => format!("one of: {}", question.options.join("/")),
        InputKind::Checkboxes => format!("any of: {}", question.options.join("/")),
        InputKind::Attachments => "comma separated file URLs".to_string(),
    }
}
