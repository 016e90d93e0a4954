#![allow(missing_docs)]

pub mod answers;
mod lenient;
pub mod projection;
pub mod render;
pub mod responses;
pub mod rule;
pub mod session;
pub mod spec;
pub mod visibility;

pub use answers::{AnswerMap, Submission, SubmissionError};
pub use projection::{
    BuildError, FieldState, FormDraft, ProjectedField, RemoteField, duplicate_keys, project,
    question_key,
};
pub use render::{
    InputKind, RenderPayload, RenderProgress, RenderQuestion, build_render_payload,
    render_json_ui, render_text,
};
pub use responses::{ResponseListing, ResponseRecord, ResponseStatus, render_responses};
pub use rule::{Condition, Logic, Operator, Rule, should_show};
pub use session::FormSession;
pub use spec::{FormSpec, QuestionSpec, QuestionType, ValueShape};
pub use visibility::{VisibilityMap, resolve_visibility};

/// JSON schema of the persisted form definition.
pub fn form_schema() -> serde_json::Value {
    schemars::schema_for!(FormSpec).to_value()
}
