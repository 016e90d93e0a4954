pub mod builder;

mod wizard;

use builder::{DraftEdits, build_form, form_file_name, parse_fields, parse_label, write_form};
use clap::{Parser, Subcommand, ValueEnum};
use component_form::{render_json_ui, render_text};
use form_spec::{
    AnswerMap, FormSession, FormSpec, InputKind, RenderQuestion, ResponseListing, ResponseRecord,
    duplicate_keys, render::is_answered, render_responses, resolve_visibility,
    session::parse_attachment_list,
};
use serde::Deserialize;
use serde_json::{Map, Value, json};
use std::collections::BTreeSet;
use std::env;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;
use wizard::{AnswerParseError, PromptContext, Verbosity, WizardPresenter};

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

const OUTPUT_DIR_ENV: &str = "FORMBUILDER_OUTPUT_DIR";

#[derive(Parser)]
#[command(
    name = "formbuilder",
    author,
    version,
    about = "Build, fill, and review forms generated from table schemas",
    long_about = "Projects a table's field listing into a form definition, evaluates conditional visibility while filling it, and lists collected responses"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum RenderMode {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Command {
    /// Generate a form definition from a table's field listing.
    Create {
        /// JSON file with the field listing (array or `{ "fields": [...] }`).
        #[arg(long, value_name = "FIELDS")]
        fields: PathBuf,
        /// Identifier of the base holding the table.
        #[arg(long)]
        base: String,
        /// Identifier of the table the form writes to.
        #[arg(long)]
        table: String,
        /// Form name (defaults to "Untitled Form").
        #[arg(long)]
        name: Option<String>,
        /// Question key to leave out of the form; repeatable.
        #[arg(long, value_name = "KEY")]
        exclude: Vec<String>,
        /// Zero-based field position to leave out; repeatable.
        #[arg(long = "exclude-index", value_name = "INDEX")]
        exclude_index: Vec<usize>,
        /// Question key to mark as required; repeatable.
        #[arg(long, value_name = "KEY")]
        required: Vec<String>,
        /// Label override as key=Label; repeatable.
        #[arg(long, value_name = "KEY=LABEL", value_parser = parse_label)]
        label: Vec<(String, String)>,
        /// Output file (defaults to FORMBUILDER_OUTPUT_DIR or the current directory).
        #[arg(long, value_name = "PATH")]
        out: Option<PathBuf>,
        /// Overwrite an existing form file.
        #[arg(long)]
        force: bool,
    },
    /// Fill a form interactively, re-evaluating visibility after every answer.
    Fill {
        /// Path to the form definition JSON.
        #[arg(long, value_name = "FORM")]
        form: PathBuf,
        /// Optional JSON file containing initial answers.
        #[arg(long, value_name = "ANSWERS")]
        answers: Option<PathBuf>,
        /// Write the submission body to this file as well.
        #[arg(long, value_name = "PATH")]
        out: Option<PathBuf>,
        /// Show progress and the visible question list after each answer.
        #[arg(long)]
        verbose: bool,
    },
    /// Print which questions are visible for a set of answers.
    Visibility {
        /// Path to the form definition JSON.
        #[arg(long, value_name = "FORM")]
        form: PathBuf,
        /// Path to the answers JSON file.
        #[arg(long, value_name = "ANSWERS")]
        answers: Option<PathBuf>,
    },
    /// Render the visible questions of a form.
    Render {
        /// Path to the form definition JSON.
        #[arg(long, value_name = "FORM")]
        form: PathBuf,
        /// Path to the answers JSON file.
        #[arg(long, value_name = "ANSWERS")]
        answers: Option<PathBuf>,
        /// Output format.
        #[arg(long, value_enum, default_value_t = RenderMode::Text)]
        format: RenderMode,
    },
    /// List collected responses from a saved listing.
    Responses {
        /// JSON file with the responses listing.
        #[arg(long, value_name = "INPUT")]
        input: PathBuf,
    },
}

fn main() -> CliResult<()> {
    init_tracing();
    let cli = Cli::parse();
    match cli.command {
        Command::Create {
            fields,
            base,
            table,
            name,
            exclude,
            exclude_index,
            required,
            label,
            out,
            force,
        } => {
            let edits = DraftEdits {
                name,
                exclude,
                required,
                labels: label,
                exclude_at: exclude_index,
            };
            run_create(fields, &base, &table, &edits, out, force)
        }
        Command::Fill {
            form,
            answers,
            out,
            verbose,
        } => run_fill(form, answers, out, verbose),
        Command::Visibility { form, answers } => run_visibility(form, answers),
        Command::Render {
            form,
            answers,
            format,
        } => run_render(form, answers, format),
        Command::Responses { input } => run_responses(input),
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("formbuilder=info,component_form=warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run_create(
    fields_path: PathBuf,
    base: &str,
    table: &str,
    edits: &DraftEdits,
    out: Option<PathBuf>,
    force: bool,
) -> CliResult<()> {
    let contents = fs::read_to_string(&fields_path)?;
    let fields = parse_fields(&contents)?;
    tracing::debug!(count = fields.len(), path = %fields_path.display(), "loaded field listing");

    let built = build_form(base, table, &fields, edits)
        .map_err(|err| format!("cannot build form: {}", err))?;
    for key in &built.unmatched {
        tracing::warn!(key = %key, "no field matches this edit");
    }
    warn_duplicate_keys(&built.form);
    for question in built
        .form
        .questions
        .iter()
        .filter(|question| !question.kind.is_recognized())
    {
        tracing::warn!(
            key = %question.question_key,
            kind = %question.kind,
            "unsupported field type; the question is kept but never rendered"
        );
    }

    let path = match out {
        Some(path) => path,
        None => resolve_output_root()?.join(form_file_name(&built.form)),
    };
    let path = write_form(&built.form, &path, force)?;
    println!(
        "Generated form '{}' with {} question(s) at {}",
        built.form.name,
        built.form.questions.len(),
        path.display()
    );
    Ok(())
}

fn resolve_output_root() -> CliResult<PathBuf> {
    let candidate = env::var_os(OUTPUT_DIR_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));
    if candidate.as_os_str().is_empty() {
        return Err("output directory cannot be empty".into());
    }
    Ok(candidate)
}

fn warn_duplicate_keys(form: &FormSpec) {
    let duplicates = duplicate_keys(form);
    if !duplicates.is_empty() {
        tracing::warn!(
            keys = %duplicates.join(", "),
            "question keys collide; answers are shared and the later question wins"
        );
    }
}

fn load_form(path: &Path) -> CliResult<(String, FormSpec)> {
    let contents = fs::read_to_string(path)?;
    let form: FormSpec = serde_json::from_str(&contents)?;
    warn_duplicate_keys(&form);
    Ok((contents, form))
}

fn load_answers(path: Option<&Path>) -> CliResult<AnswerMap> {
    let Some(path) = path else {
        return Ok(AnswerMap::new());
    };
    let contents = fs::read_to_string(path)?;
    match serde_json::from_str::<Value>(&contents)? {
        Value::Object(map) => Ok(unwrap_submission(map)),
        _ => Err(format!("answers in {} must be a JSON object", path.display()).into()),
    }
}

/// Accepts either a bare answer map or a saved `{ "answers": {...} }` body.
fn unwrap_submission(mut map: Map<String, Value>) -> AnswerMap {
    if map.len() == 1
        && matches!(map.get("answers"), Some(Value::Object(_)))
        && let Some(Value::Object(inner)) = map.remove("answers")
    {
        return inner;
    }
    map
}

fn run_visibility(form_path: PathBuf, answers_path: Option<PathBuf>) -> CliResult<()> {
    let (_, form) = load_form(&form_path)?;
    let answers = load_answers(answers_path.as_deref())?;
    let visibility = resolve_visibility(&form, &answers);

    let mut printed = BTreeSet::new();
    for question in &form.questions {
        if !printed.insert(question.question_key.as_str()) {
            continue;
        }
        let visible = visibility
            .get(&question.question_key)
            .copied()
            .unwrap_or(true);
        let mut line = format!(
            "{}: {}",
            question.question_key,
            if visible { "visible" } else { "hidden" }
        );
        if !question.kind.is_recognized() {
            line.push_str(&format!(" (type '{}' is not rendered)", question.kind));
        }
        println!("{}", line);
    }
    Ok(())
}

fn run_render(
    form_path: PathBuf,
    answers_path: Option<PathBuf>,
    format: RenderMode,
) -> CliResult<()> {
    let (form_json, _) = load_form(&form_path)?;
    let answers = load_answers(answers_path.as_deref())?;
    let config_json = json!({ "form_json": form_json }).to_string();
    let answers_json = Value::Object(answers).to_string();

    match format {
        RenderMode::Text => {
            let text = render_text(&config_json, &answers_json);
            if let Ok(value) = serde_json::from_str::<Value>(&text)
                && let Some(error) = value.get("error").and_then(Value::as_str)
            {
                return Err(error.into());
            }
            println!("{}", text);
        }
        RenderMode::Json => {
            let ui = parse_component_result(&render_json_ui(&config_json, &answers_json))?;
            println!("{}", serde_json::to_string_pretty(&ui)?);
        }
    }
    Ok(())
}

fn parse_component_result(response: &str) -> CliResult<Value> {
    let value: Value = serde_json::from_str(response)?;
    if let Some(error) = value.get("error").and_then(Value::as_str) {
        Err(error.into())
    } else {
        Ok(value)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ResponsesInput {
    Listing(ResponseListing),
    Bare(Vec<ResponseRecord>),
}

fn run_responses(input: PathBuf) -> CliResult<()> {
    let contents = fs::read_to_string(&input)?;
    let records = match serde_json::from_str::<ResponsesInput>(&contents)? {
        ResponsesInput::Listing(listing) => listing.responses,
        ResponsesInput::Bare(records) => records,
    };
    println!("{}", render_responses(&records));
    Ok(())
}

fn run_fill(
    form_path: PathBuf,
    answers_path: Option<PathBuf>,
    out: Option<PathBuf>,
    verbose: bool,
) -> CliResult<()> {
    let (_, form) = load_form(&form_path)?;
    let answers = load_answers(answers_path.as_deref())?;
    let mut session = FormSession::with_answers(form, answers);
    let mut presenter = WizardPresenter::new(Verbosity::from_verbose(verbose));
    let mut skipped = BTreeSet::new();

    loop {
        let payload = session.render();
        tracing::debug!(
            visible = payload.questions.len(),
            answered = payload.progress.answered,
            "visibility pass"
        );
        presenter.show_header(&payload);
        presenter.show_status(&payload);

        let Some(question) = payload.questions.iter().find(|question| {
            !is_answered(question.current_value.as_ref()) && !skipped.contains(&question.key)
        }) else {
            break;
        };

        let prompt = PromptContext::new(question, &payload.progress);
        match prompt_question(&prompt, question, &presenter)? {
            Some(value) => session.set_answer(&question.key, value),
            None => {
                skipped.insert(question.key.clone());
            }
        }
    }

    let submission = session.submission();
    presenter.show_completion(&submission);
    if let Some(path) = out {
        fs::write(&path, submission.to_json_pretty()?)?;
        tracing::info!(path = %path.display(), "submission body written");
    }
    Ok(())
}

fn prompt_question(
    prompt: &PromptContext,
    question: &RenderQuestion,
    presenter: &WizardPresenter,
) -> CliResult<Option<Value>> {
    loop {
        presenter.show_prompt(prompt);
        print!("> ");
        io::stdout().flush()?;
        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            return Err("input ended before the form was complete".into());
        }

        let trimmed = input.trim();
        if trimmed.eq_ignore_ascii_case("exit") {
            return Err("form filling aborted by user".into());
        }

        match parse_answer(question, trimmed) {
            Ok(value) => return Ok(value),
            Err(err) => presenter.show_parse_error(&err),
        }
    }
}

/// Parses raw input for a question; blank input skips it.
fn parse_answer(question: &RenderQuestion, raw: &str) -> Result<Option<Value>, AnswerParseError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }

    match question.input {
        InputKind::Text => Ok(Some(Value::String(raw.to_string()))),
        InputKind::Select => parse_option(question, raw).map(|choice| Some(Value::String(choice))),
        InputKind::Checkboxes => {
            let mut selected = Vec::new();
            for value in raw.split(',').map(str::trim).filter(|value| !value.is_empty()) {
                let choice = parse_option(question, value)?;
                if !selected.contains(&choice) {
                    selected.push(choice);
                }
            }
            Ok(Some(json!(selected)))
        }
        InputKind::Attachments => Ok(Some(json!(parse_attachment_list(raw)))),
    }
}

fn parse_option(question: &RenderQuestion, raw: &str) -> Result<String, AnswerParseError> {
    question
        .options
        .iter()
        .find(|option| option.eq_ignore_ascii_case(raw))
        .cloned()
        .ok_or_else(|| {
            AnswerParseError::new(
                format!("Choose from: {}.", question.options.join(", ")),
                Some(format!("'{}' is not an option", raw)),
            )
        })
}
