use serde_json::Value;

use form_spec::{
    BuildError, FieldState, FormDraft, QuestionType, RemoteField, ValueShape, duplicate_keys,
    form_schema, project, question_key,
};

fn table_fields() -> Vec<RemoteField> {
    serde_json::from_str(include_str!("fixtures/table_fields.json")).expect("fields")
}

fn field(name: &str, field_type: &str) -> RemoteField {
    RemoteField {
        id: format!("fld{}", name.len()),
        name: name.into(),
        field_type: field_type.into(),
        options: None,
    }
}

#[test]
fn projects_short_text_with_defaults() {
    let projected = project(&field("Full Name", "shortText"));
    assert_eq!(projected.question.question_key, "full_name");
    assert_eq!(projected.question.label, "Full Name");
    assert_eq!(projected.question.kind, QuestionType::ShortText);
    assert!(!projected.question.required);
    assert!(projected.question.conditional_rules.is_none());
    assert_eq!(projected.state, FieldState::Projected);
    assert!(projected.is_included());
}

#[test]
fn question_key_collapses_whitespace_runs() {
    assert_eq!(question_key("Full Name"), "full_name");
    assert_eq!(question_key("Short   Bio\tText"), "short_bio_text");
    assert_eq!(question_key(" Padded "), "_padded_");
    assert_eq!(question_key("ÉCOLE Name"), "école_name");
}

#[test]
fn options_only_carried_for_select_types() {
    let fields = table_fields();
    let projected = fields.iter().map(project).collect::<Vec<_>>();

    assert_eq!(projected[1].question.kind, QuestionType::LongText);
    assert_eq!(projected[1].question.options, None);
    assert_eq!(
        projected[2].question.options,
        Some(vec!["gold".to_string(), "silver".to_string()])
    );
    assert_eq!(
        projected[3].question.options,
        Some(vec!["a".to_string(), "b".to_string()])
    );
    assert_eq!(projected[4].question.options, None);
}

#[test]
fn value_shapes_follow_type() {
    assert_eq!(
        QuestionType::ShortText.value_shape(),
        Some(ValueShape::Scalar)
    );
    assert_eq!(
        QuestionType::SingleSelect.value_shape(),
        Some(ValueShape::Scalar)
    );
    assert_eq!(QuestionType::MultiSelect.value_shape(), Some(ValueShape::Set));
    assert_eq!(QuestionType::Attachment.value_shape(), Some(ValueShape::Set));
    assert_eq!(QuestionType::from("formula").value_shape(), None);
}

#[test]
fn unrecognized_type_passes_through_verbatim() {
    let projected = project(&field("Score", "formula"));
    assert_eq!(
        projected.question.kind,
        QuestionType::Unrecognized("formula".into())
    );
    let value = serde_json::to_value(&projected.question).expect("serialize");
    assert_eq!(value["type"], "formula");
    assert_eq!(value["conditionalRules"], Value::Null);
}

#[test]
fn toggle_moves_between_states() {
    let mut projected = project(&field("Tier", "singleSelect"));
    projected.toggle();
    assert_eq!(projected.state, FieldState::Excluded);
    projected.toggle();
    assert_eq!(projected.state, FieldState::Projected);
}

#[test]
fn draft_builds_included_fields_in_order() {
    let mut draft = FormDraft::new("appBase", "tblMembers", &table_fields());
    draft.name = "Members".into();
    assert_eq!(draft.set_included("tags", false), 1);
    assert_eq!(draft.set_required("full_name", true), 1);
    assert_eq!(draft.set_label("tier", "Membership tier"), 1);
    assert_eq!(draft.set_label("unknown", "Nothing"), 0);

    let form = draft.build().expect("form");
    assert_eq!(form.name, "Members");
    assert_eq!(form.airtable_base_id, "appBase");
    assert_eq!(form.airtable_table_id, "tblMembers");
    let keys = form
        .questions
        .iter()
        .map(|question| question.question_key.as_str())
        .collect::<Vec<_>>();
    assert_eq!(
        keys,
        vec!["full_name", "short_bio_text", "tier", "files", "score"]
    );
    assert!(form.questions[0].required);
    assert_eq!(form.questions[2].label, "Membership tier");
    assert_eq!(
        form.questions[0].airtable_field_id.as_deref(),
        Some("fldName")
    );
}

#[test]
fn draft_defaults_name_and_label() {
    let mut draft = FormDraft::new("appBase", "tblMembers", &[field("Full Name", "shortText")]);
    draft.set_label("full_name", "");
    let form = draft.build().expect("form");
    assert_eq!(form.name, "Untitled Form");
    assert_eq!(form.questions[0].label, "Full Name");
}

#[test]
fn draft_rejects_empty_selection_and_missing_table() {
    let mut draft = FormDraft::new("appBase", "tblMembers", &[field("Full Name", "shortText")]);
    draft.toggle("full_name");
    assert_eq!(draft.build(), Err(BuildError::NoFieldsSelected));

    let draft = FormDraft::new("appBase", " ", &[field("Full Name", "shortText")]);
    assert_eq!(draft.build(), Err(BuildError::MissingTable));
}

#[test]
fn colliding_keys_are_kept_and_reported() {
    let fields = vec![
        field("Full Name", "shortText"),
        field("full   name", "longText"),
        field("Email", "shortText"),
    ];
    let form = FormDraft::new("appBase", "tbl", &fields)
        .build()
        .expect("form");
    assert_eq!(form.questions.len(), 3);
    assert_eq!(duplicate_keys(&form), vec!["full_name".to_string()]);
    assert_eq!(
        form.question("full_name").map(|question| &question.kind),
        Some(&QuestionType::LongText)
    );
}

#[test]
fn index_edits_touch_one_of_colliding_fields() {
    let fields = vec![field("Full Name", "shortText"), field("full  name", "longText")];
    let mut draft = FormDraft::new("appBase", "tbl", &fields);

    assert!(draft.set_included_at(1, false));
    assert!(draft.set_label_at(0, "Your name"));
    assert!(draft.set_required_at(0, true));
    assert!(!draft.set_included_at(2, false));
    assert!(!draft.toggle_at(5));

    let form = draft.build().expect("form");
    assert_eq!(form.questions.len(), 1);
    assert_eq!(form.questions[0].kind, QuestionType::ShortText);
    assert_eq!(form.questions[0].label, "Your name");
    assert!(form.questions[0].required);

    assert!(draft.toggle_at(1));
    assert_eq!(draft.build().expect("form").questions.len(), 2);
}

#[test]
fn key_edits_touch_every_colliding_field() {
    let fields = vec![field("Full Name", "shortText"), field("full  name", "longText")];
    let mut draft = FormDraft::new("appBase", "tbl", &fields);
    assert_eq!(draft.set_included("full_name", false), 2);
    assert_eq!(draft.build(), Err(BuildError::NoFieldsSelected));
}

#[test]
fn persisted_form_schema_uses_camel_case() {
    let schema = form_schema();
    let properties = schema["properties"].as_object().expect("properties");
    assert!(properties.contains_key("airtableBaseId"));
    assert!(properties.contains_key("questions"));
}
