use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::spec::{
    form::FormSpec,
    question::{QuestionSpec, QuestionType},
};

pub const UNTITLED_FORM: &str = "Untitled Form";

static WHITESPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("whitespace pattern is valid"));

/// A column as reported by the remote table schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteField {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
}

/// Whether a projected field ends up in the saved form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FieldState {
    #[default]
    Projected,
    Excluded,
}

/// A remote field mapped to a question draft, before the form is saved.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectedField {
    pub source: RemoteField,
    pub question: QuestionSpec,
    pub state: FieldState,
}

impl ProjectedField {
    pub fn is_included(&self) -> bool {
        self.state == FieldState::Projected
    }

    /// Flips between projected and excluded.
    pub fn toggle(&mut self) {
        self.state = match self.state {
            FieldState::Projected => FieldState::Excluded,
            FieldState::Excluded => FieldState::Projected,
        };
    }

    pub fn set_included(&mut self, include: bool) {
        self.state = if include {
            FieldState::Projected
        } else {
            FieldState::Excluded
        };
    }

    fn into_question(self) -> QuestionSpec {
        let mut question = self.question;
        if question.label.trim().is_empty() {
            question.label = self.source.name;
        }
        question
    }
}

/// Derives a question key: lowercase, each whitespace run replaced by `_`.
pub fn question_key(name: &str) -> String {
    WHITESPACE_RUN
        .replace_all(&name.to_lowercase(), "_")
        .into_owned()
}

pub fn project(field: &RemoteField) -> ProjectedField {
    let kind = QuestionType::from(field.field_type.as_str());
    let options = if kind.carries_options() {
        field.options.clone()
    } else {
        None
    };

    ProjectedField {
        source: field.clone(),
        question: QuestionSpec {
            question_key: question_key(&field.name),
            airtable_field_id: Some(field.id.clone()),
            airtable_field_name: Some(field.name.clone()),
            label: field.name.clone(),
            kind,
            required: false,
            options,
            conditional_rules: None,
        },
        state: FieldState::Projected,
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BuildError {
    #[error("select at least one field")]
    NoFieldsSelected,
    #[error("a base and a table must be selected")]
    MissingTable,
}

/// Editable form under construction: the projected fields of one table.
#[derive(Debug, Clone, PartialEq)]
pub struct FormDraft {
    pub name: String,
    pub base_id: String,
    pub table_id: String,
    pub fields: Vec<ProjectedField>,
}

impl FormDraft {
    pub fn new(
        base_id: impl Into<String>,
        table_id: impl Into<String>,
        fields: &[RemoteField],
    ) -> Self {
        Self {
            name: String::new(),
            base_id: base_id.into(),
            table_id: table_id.into(),
            fields: fields.iter().map(project).collect(),
        }
    }

    fn update(&mut self, key: &str, mut apply: impl FnMut(&mut ProjectedField)) -> usize {
        let mut touched = 0;
        for field in self
            .fields
            .iter_mut()
            .filter(|field| field.question.question_key == key)
        {
            apply(field);
            touched += 1;
        }
        touched
    }

    /// Overrides the label of every field with `key`; returns how many matched.
    pub fn set_label(&mut self, key: &str, label: &str) -> usize {
        self.update(key, |field| field.question.label = label.to_string())
    }

    pub fn set_required(&mut self, key: &str, required: bool) -> usize {
        self.update(key, |field| field.question.required = required)
    }

    pub fn set_included(&mut self, key: &str, include: bool) -> usize {
        self.update(key, |field| field.set_included(include))
    }

    pub fn toggle(&mut self, key: &str) -> usize {
        self.update(key, ProjectedField::toggle)
    }

    /// Edits the field at `index` only; fields sharing its key are untouched.
    /// Returns `false` when `index` is out of range.
    fn update_at(&mut self, index: usize, apply: impl FnOnce(&mut ProjectedField)) -> bool {
        match self.fields.get_mut(index) {
            Some(field) => {
                apply(field);
                true
            }
            None => false,
        }
    }

    pub fn set_label_at(&mut self, index: usize, label: &str) -> bool {
        self.update_at(index, |field| field.question.label = label.to_string())
    }

    pub fn set_required_at(&mut self, index: usize, required: bool) -> bool {
        self.update_at(index, |field| field.question.required = required)
    }

    pub fn set_included_at(&mut self, index: usize, include: bool) -> bool {
        self.update_at(index, |field| field.set_included(include))
    }

    pub fn toggle_at(&mut self, index: usize) -> bool {
        self.update_at(index, ProjectedField::toggle)
    }

    /// Produces the persisted form from the included fields, in order.
    pub fn build(&self) -> Result<FormSpec, BuildError> {
        if self.base_id.trim().is_empty() || self.table_id.trim().is_empty() {
            return Err(BuildError::MissingTable);
        }

        let questions = self
            .fields
            .iter()
            .filter(|field| field.is_included())
            .cloned()
            .map(ProjectedField::into_question)
            .collect::<Vec<_>>();
        if questions.is_empty() {
            return Err(BuildError::NoFieldsSelected);
        }

        let name = if self.name.trim().is_empty() {
            UNTITLED_FORM.to_string()
        } else {
            self.name.clone()
        };

        Ok(FormSpec {
            name,
            description: None,
            airtable_base_id: self.base_id.clone(),
            airtable_table_id: self.table_id.clone(),
            questions,
        })
    }
}

/// Question keys shared by more than one question, in key order.
pub fn duplicate_keys(form: &FormSpec) -> Vec<String> {
    let mut counts = BTreeMap::<&str, usize>::new();
    for question in &form.questions {
        *counts.entry(question.question_key.as_str()).or_default() += 1;
    }
    counts
        .into_iter()
        .filter(|(_, count)| *count > 1)
        .map(|(key, _)| key.to_string())
        .collect()
}
