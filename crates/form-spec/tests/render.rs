use serde_json::{Value, json};

use form_spec::{
    FormSession, FormSpec, InputKind, ResponseListing, ResponseStatus, SubmissionError,
    build_render_payload, render_json_ui, render_responses, render_text,
};

fn fixture(name: &str) -> &'static str {
    match name {
        "intake_form" => include_str!("../tests/fixtures/intake_form.json"),
        _ => panic!("unknown fixture {}", name),
    }
}

fn intake_form() -> FormSpec {
    serde_json::from_str(fixture("intake_form")).expect("deserialize")
}

fn keys(session: &FormSession) -> Vec<String> {
    session
        .render()
        .questions
        .into_iter()
        .map(|question| question.key)
        .collect()
}

#[test]
fn hidden_and_unrecognized_questions_are_not_rendered() {
    let spec = intake_form();
    let payload = build_render_payload(&spec, &Default::default());

    let rendered = payload
        .questions
        .iter()
        .map(|question| question.key.as_str())
        .collect::<Vec<_>>();
    assert_eq!(rendered, vec!["full_name", "age", "interests", "documents"]);
    assert_eq!(payload.progress.total, 4);
    assert_eq!(payload.progress.answered, 0);
    // The unrecognized question stays in the stored form.
    assert_eq!(spec.questions.len(), 7);
    assert_eq!(spec.questions[6].kind.as_str(), "date");
}

#[test]
fn input_kinds_follow_question_type() {
    let payload = build_render_payload(&intake_form(), &Default::default());
    let input = |key: &str| payload.question(key).map(|question| question.input);
    assert_eq!(input("full_name"), Some(InputKind::Text));
    assert_eq!(input("age"), Some(InputKind::Select));
    assert_eq!(input("interests"), Some(InputKind::Checkboxes));
    assert_eq!(input("documents"), Some(InputKind::Attachments));
}

#[test]
fn session_reevaluates_after_each_change() {
    let mut session = FormSession::new(intake_form());
    assert!(!keys(&session).contains(&"employer".to_string()));

    session.set_answer("age", json!("adult"));
    assert!(keys(&session).contains(&"employer".to_string()));
    assert!(!keys(&session).contains(&"chess_rating".to_string()));

    session.toggle_option("interests", "chess", true);
    assert!(keys(&session).contains(&"chess_rating".to_string()));

    session.toggle_option("interests", "chess", false);
    assert_eq!(session.answers()["interests"], json!([]));
    assert!(!keys(&session).contains(&"chess_rating".to_string()));

    session.set_answer("age", json!("minor"));
    assert!(!session.visibility()["employer"]);
}

#[test]
fn toggle_option_keeps_order_and_ignores_duplicates() {
    let mut session = FormSession::new(intake_form());
    session.set_answer("interests", json!("not a list"));
    session.toggle_option("interests", "music", true);
    session.toggle_option("interests", "hiking", true);
    session.toggle_option("interests", "music", true);
    assert_eq!(session.answers()["interests"], json!(["music", "hiking"]));

    let payload = session.render();
    let question = payload.question("interests").expect("interests");
    assert_eq!(question.selected, vec!["music", "hiking"]);
}

#[test]
fn attachments_split_trim_and_drop_blanks() {
    let mut session = FormSession::new(intake_form());
    session.set_attachments("documents", " https://a.example/x.pdf, ,https://b.example/y.png ,");
    assert_eq!(
        session.answers()["documents"],
        json!(["https://a.example/x.pdf", "https://b.example/y.png"])
    );
    let payload = session.render();
    assert_eq!(
        payload.question("documents").map(|question| question.display.as_str()),
        Some("https://a.example/x.pdf, https://b.example/y.png")
    );
}

#[test]
fn submission_carries_answers_and_clears_after_success() {
    let mut session = FormSession::new(intake_form());
    session.set_answer("full_name", json!("Ada"));
    session.set_answer("age", json!("minor"));
    session.set_answer("employer", json!("Hidden Corp"));

    let body = serde_json::to_value(session.submission()).expect("body");
    assert_eq!(body["answers"]["full_name"], "Ada");
    assert_eq!(body["answers"]["employer"], "Hidden Corp");

    session.complete_submission();
    assert!(session.answers().is_empty());
}

#[test]
fn render_text_marks_required_questions() {
    let mut session = FormSession::new(intake_form());
    session.set_answer("full_name", json!("Ada"));
    let text = render_text(&session.render());
    assert!(text.contains("Form: Member Intake"));
    assert!(text.contains("Answered: 1/4"));
    assert!(text.contains(" - Full Name * [text] = Ada"));
    assert!(text.contains(" - Interests [any of: hiking/chess/music]"));
}

#[test]
fn render_json_ui_exposes_structure() {
    let mut session = FormSession::new(intake_form());
    session.set_answer("age", json!("adult"));
    let ui = render_json_ui(&session.render());
    assert_eq!(ui["form_name"], "Member Intake");
    assert_eq!(ui["progress"]["total"], 5);
    let questions = ui["questions"].as_array().expect("questions");
    let age = questions
        .iter()
        .find(|question| question["key"] == "age")
        .expect("age");
    assert_eq!(age["input"], "select");
    assert_eq!(age["options"][0], "Select...");
    assert_eq!(age["display"], "adult");
    assert_eq!(age["required"], true);
}

#[test]
fn submission_error_prefers_error_list() {
    let listed: SubmissionError =
        serde_json::from_value(json!({ "message": "Invalid", "errors": ["Name is required"] }))
            .expect("error");
    assert_eq!(listed.display_lines(), vec!["Name is required"]);

    let message: SubmissionError =
        serde_json::from_value(json!({ "message": "Form closed" })).expect("error");
    assert_eq!(message.display_lines(), vec!["Form closed"]);

    let empty: SubmissionError = serde_json::from_value(json!({ "errors": [] })).expect("error");
    assert_eq!(empty.display_lines(), vec!["Submission failed"]);
}

#[test]
fn responses_render_status_and_preview() {
    let listing: ResponseListing = serde_json::from_value(json!({
        "responses": [
            {
                "_id": "r1",
                "createdAt": "2024-05-01T10:00:00Z",
                "deletedInAirtable": false,
                "preview": [["full_name", "Ada"], ["interests", ["chess", "music"]]]
            },
            { "_id": "r2", "deletedInAirtable": true }
        ]
    }))
    .expect("listing");

    assert_eq!(listing.responses[0].status(), ResponseStatus::Active);
    assert_eq!(
        listing.responses[0].preview_text(),
        "full_name: Ada | interests: chess,music"
    );
    assert_eq!(
        listing.responses[1].status(),
        ResponseStatus::DeletedInAirtable
    );
    assert_eq!(listing.responses[1].preview_text(), "—");

    let table = render_responses(&listing.responses);
    assert!(table.contains("1 | r1 | 2024-05-01T10:00:00Z | Active |"));
    assert!(table.contains("2 | r2 | — | Deleted in Airtable | —"));
    assert_eq!(render_responses(&[]), "No responses submitted yet.");
    let _: Value = serde_json::to_value(&listing).expect("serialize");
}

#[test]
fn odd_question_fields_do_not_reject_the_form() {
    let spec: FormSpec = serde_json::from_value(json!({
        "name": "Loose",
        "airtableBaseId": "app1",
        "airtableTableId": "tbl1",
        "questions": [
            { "questionKey": "name", "label": "Name", "type": "shortText", "required": null },
            { "questionKey": "untyped", "label": "Untyped" },
            { "questionKey": "null_type", "label": "Null type", "type": null },
            { "questionKey": "flagged", "label": null, "type": "longText", "required": "yes" }
        ]
    }))
    .expect("lenient form");

    assert!(!spec.questions[0].required);
    assert!(!spec.questions[1].kind.is_recognized());
    assert!(!spec.questions[2].kind.is_recognized());
    assert!(!spec.questions[3].required);
    assert_eq!(spec.questions[3].label, "");

    let session = FormSession::new(spec);
    assert_eq!(keys(&session), vec!["name", "flagged"]);
}

#[test]
fn odd_response_fields_fall_back_to_defaults() {
    let listing: ResponseListing = serde_json::from_value(json!({
        "responses": [
            { "_id": "r1", "deletedInAirtable": null, "preview": null },
            { "_id": "r2", "preview": { "full_name": "Ada" } },
            { "_id": "r3", "preview": [["age", "adult"], "junk", [7, "x"], ["tags", ["a", null, "b"]]] }
        ]
    }))
    .expect("lenient listing");

    assert_eq!(listing.responses[0].status(), ResponseStatus::Active);
    assert_eq!(listing.responses[0].preview_text(), "—");
    assert_eq!(listing.responses[1].preview_text(), "—");
    assert_eq!(listing.responses[2].preview_text(), "age: adult | tags: a,,b");
}
