use form_spec::{
    InputKind, RenderPayload, RenderQuestion, Submission,
    render::{RenderProgress, is_answered},
};

/// Controls which bits of state the fill loop prints.
#[derive(Copy, Clone, Eq, PartialEq)]
pub enum Verbosity {
    /// Clean output: question prompts only.
    Clean,
    /// Verbose output: progress and the visible question list after each answer.
    Verbose,
}

impl Verbosity {
    pub fn from_verbose(verbose: bool) -> Self {
        if verbose {
            Verbosity::Verbose
        } else {
            Verbosity::Clean
        }
    }

    pub fn is_verbose(&self) -> bool {
        matches!(self, Verbosity::Verbose)
    }
}

/// Prints prompts and state while a form is being filled.
pub struct WizardPresenter {
    verbosity: Verbosity,
    header_printed: bool,
}

impl WizardPresenter {
    pub fn new(verbosity: Verbosity) -> Self {
        Self {
            verbosity,
            header_printed: false,
        }
    }

    pub fn show_header(&mut self, payload: &RenderPayload) {
        if self.header_printed {
            return;
        }
        println!("Form: {}", payload.form_name);
        if let Some(description) = &payload.description {
            println!("{}", description);
        }
        self.header_printed = true;
    }

    pub fn show_status(&self, payload: &RenderPayload) {
        if !self.verbosity.is_verbose() {
            return;
        }
        println!(
            "Answered {}/{}",
            payload.progress.answered, payload.progress.total
        );
        println!("Visible questions:");
        for question in &payload.questions {
            let mark = if is_answered(question.current_value.as_ref()) {
                "x"
            } else {
                " "
            };
            println!(" [{}] {} ({})", mark, question.label, question.key);
        }
    }

    pub fn show_prompt(&self, prompt: &PromptContext) {
        let mut line = format!("{}/{} {}", prompt.index, prompt.total, prompt.label);
        if prompt.required {
            line.push_str(" *");
        }
        if let Some(hint) = &prompt.hint {
            line.push(' ');
            line.push_str(hint);
        }
        println!("{}", line);
    }

    pub fn show_parse_error(&self, error: &AnswerParseError) {
        eprintln!("Invalid answer: {}", error.user_message);
        if let Some(debug) = &error.debug_message {
            eprintln!("  Expected: {}", debug);
        }
    }

    pub fn show_completion(&self, submission: &Submission) {
        println!("Done ✅");
        match submission.to_json_pretty() {
            Ok(pretty) => println!("{}", pretty),
            Err(err) => eprintln!("Failed to serialize answers to JSON: {}", err),
        }
    }
}

/// Context used to format a single prompt.
pub struct PromptContext {
    pub index: usize,
    pub total: usize,
    pub label: String,
    pub required: bool,
    pub hint: Option<String>,
}

impl PromptContext {
    pub fn new(question: &RenderQuestion, progress: &RenderProgress) -> Self {
        Self {
            index: (progress.answered + 1).min(progress.total.max(1)),
            total: progress.total,
            label: question.label.clone(),
            required: question.required,
            hint: input_hint(question),
        }
    }
}

fn input_hint(question: &RenderQuestion) -> Option<String> {
    match question.input {
        InputKind::Text => None,
        InputKind::Select if !question.options.is_empty() => {
            Some(format!("({})", question.options.join("/")))
        }
        InputKind::Select => None,
        InputKind::Checkboxes => Some(format!(
            "(comma separated, any of {})",
            question.options.join("/")
        )),
        InputKind::Attachments => Some("(comma separated file URLs)".to_string()),
    }
}

/// Error produced when parsing answers from the user.
#[derive(Debug)]
pub struct AnswerParseError {
    pub user_message: String,
    pub debug_message: Option<String>,
}

impl AnswerParseError {
    pub fn new(user_message: impl Into<String>, debug_message: Option<String>) -> Self {
        Self {
            user_message: user_message.into(),
            debug_message,
        }
    }
}
