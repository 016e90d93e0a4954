use serde::Deserialize;
use std::{
    fs, io,
    path::{Path, PathBuf},
};

use form_spec::{BuildError, FormDraft, FormSpec, RemoteField};

/// Field listing as saved from the table schema endpoint, either bare or
/// wrapped in `{ "fields": [...] }`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum FieldListing {
    Bare(Vec<RemoteField>),
    Wrapped { fields: Vec<RemoteField> },
}

pub fn parse_fields(contents: &str) -> Result<Vec<RemoteField>, serde_json::Error> {
    Ok(match serde_json::from_str(contents)? {
        FieldListing::Bare(fields) | FieldListing::Wrapped { fields } => fields,
    })
}

/// User edits applied to the projected fields before saving.
#[derive(Debug, Clone, Default)]
pub struct DraftEdits {
    pub name: Option<String>,
    pub exclude: Vec<String>,
    pub required: Vec<String>,
    pub labels: Vec<(String, String)>,
    /// Field positions to leave out, for keys shared by several fields.
    pub exclude_at: Vec<usize>,
}

/// Parses a `key=Label` override.
pub fn parse_label(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, label)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), label.trim().to_string()))
        }
        _ => Err(format!("expected key=Label, got '{}'", raw)),
    }
}

/// Result of building a form: the form plus edit keys that matched nothing.
pub struct BuiltForm {
    pub form: FormSpec,
    pub unmatched: Vec<String>,
}

pub fn build_form(
    base_id: &str,
    table_id: &str,
    fields: &[RemoteField],
    edits: &DraftEdits,
) -> Result<BuiltForm, BuildError> {
    let mut draft = FormDraft::new(base_id, table_id, fields);
    draft.name = edits.name.clone().unwrap_or_default();

    let mut unmatched = Vec::new();
    for key in &edits.exclude {
        if draft.set_included(key, false) == 0 {
            unmatched.push(key.clone());
        }
    }
    for key in &edits.required {
        if draft.set_required(key, true) == 0 {
            unmatched.push(key.clone());
        }
    }
    for (key, label) in &edits.labels {
        if draft.set_label(key, label) == 0 {
            unmatched.push(key.clone());
        }
    }

    for &index in &edits.exclude_at {
        if !draft.set_included_at(index, false) {
            unmatched.push(format!("#{}", index));
        }
    }

    Ok(BuiltForm {
        form: draft.build()?,
        unmatched,
    })
}

pub fn form_file_name(form: &FormSpec) -> String {
    format!("{}.form.json", sanitize_file_name(&form.name))
}

fn sanitize_file_name(value: &str) -> String {
    let cleaned: String = value
        .trim()
        .chars()
        .map(|ch| {
            if ch.is_ascii_alphanumeric() || ch == '-' || ch == '_' {
                ch.to_ascii_lowercase()
            } else {
                '-'
            }
        })
        .collect();
    if cleaned.is_empty() {
        "form".into()
    } else {
        cleaned
    }
}

/// Serialize the form to `path`; refuses to replace a file unless `force`.
pub fn write_form(form: &FormSpec, path: &Path, force: bool) -> io::Result<PathBuf> {
    if path.exists() && !force {
        return Err(io::Error::new(
            io::ErrorKind::AlreadyExists,
            format!(
                "{} already exists; rerun with --force to overwrite",
                path.display()
            ),
        ));
    }
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }
    let contents = serde_json::to_string_pretty(form).map_err(io::Error::other)?;
    fs::write(path, contents)?;
    Ok(path.to_path_buf())
}
