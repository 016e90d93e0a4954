use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::answers::AnswerMap;

/// How per-condition results combine.
#[derive(Debug, Clone, PartialEq)]
pub enum Logic {
    And,
    Or,
    /// Anything other than `"AND"`/`"OR"`; kept as stored.
    Unrecognized(Value),
}

/// Comparison applied between an answer and a condition literal.
#[derive(Debug, Clone, PartialEq)]
pub enum Operator {
    Equals,
    NotEquals,
    Contains,
    Unrecognized(Value),
}

/// A single comparison against another question's current answer.
#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    pub question_key: String,
    #[schemars(with = "String")]
    pub operator: Operator,
    pub value: Value,
}

/// Visibility rule attached to a question.
#[derive(Debug, Clone, PartialEq, Default, Serialize, JsonSchema)]
pub struct Rule {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schemars(with = "Option<String>")]
    pub logic: Option<Logic>,
    pub conditions: Vec<Condition>,
}

impl Logic {
    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Null => None,
            Value::String(label) if label == "AND" => Some(Logic::And),
            Value::String(label) if label == "OR" => Some(Logic::Or),
            other => Some(Logic::Unrecognized(other)),
        }
    }
}

impl Operator {
    fn from_value(value: Value) -> Self {
        match value.as_str() {
            Some("equals") => Operator::Equals,
            Some("notEquals") => Operator::NotEquals,
            Some("contains") => Operator::Contains,
            _ => Operator::Unrecognized(value),
        }
    }
}

impl Condition {
    pub fn new(
        question_key: impl Into<String>,
        operator: Operator,
        value: impl Into<Value>,
    ) -> Self {
        Self {
            question_key: question_key.into(),
            operator,
            value: value.into(),
        }
    }

    fn from_value(value: Value) -> Self {
        let mut map = match value {
            Value::Object(map) => map,
            _ => Default::default(),
        };
        // A non-string key can never match an answer; the operator fallback keeps it false.
        let (question_key, operator) = match map.remove("questionKey") {
            Some(Value::String(key)) => (
                key,
                Operator::from_value(map.remove("operator").unwrap_or(Value::Null)),
            ),
            other => (String::new(), Operator::Unrecognized(other.unwrap_or(Value::Null))),
        };
        Self {
            question_key,
            operator,
            value: map.remove("value").unwrap_or(Value::Null),
        }
    }

    /// Evaluates this condition against the live answers.
    ///
    /// An unanswered (missing or null) referenced question never satisfies a
    /// condition, `notEquals` included.
    ///
    /// Equality compares JSON values structurally, so two equal lists match.
    /// `contains` on a text answer needs a text value; a number is never
    /// turned into text first.
    pub fn evaluate(&self, answers: &AnswerMap) -> bool {
        let answer = match answers.get(&self.question_key) {
            None | Some(Value::Null) => return false,
            Some(answer) => answer,
        };

        match &self.operator {
            Operator::Equals => answer == &self.value,
            Operator::NotEquals => answer != &self.value,
            Operator::Contains => match answer {
                Value::Array(items) => items.contains(&self.value),
                Value::String(text) => self
                    .value
                    .as_str()
                    .map(|needle| text.contains(needle))
                    .unwrap_or(false),
                _ => false,
            },
            Operator::Unrecognized(_) => false,
        }
    }
}

impl Rule {
    pub fn all(conditions: Vec<Condition>) -> Self {
        Self {
            logic: Some(Logic::And),
            conditions,
        }
    }

    pub fn any(conditions: Vec<Condition>) -> Self {
        Self {
            logic: Some(Logic::Or),
            conditions,
        }
    }

    /// Builds a rule from arbitrary JSON. Never fails: shapes that are not a
    /// rule object yield a rule without conditions.
    pub fn from_value(value: Value) -> Self {
        let mut map = match value {
            Value::Object(map) => map,
            _ => return Rule::default(),
        };
        let logic = map.remove("logic").and_then(Logic::from_value);
        let conditions = match map.remove("conditions") {
            Some(Value::Array(items)) => items.into_iter().map(Condition::from_value).collect(),
            _ => Vec::new(),
        };
        Self { logic, conditions }
    }

    /// Returns whether the owning question should be shown.
    pub fn evaluate(&self, answers: &AnswerMap) -> bool {
        if self.conditions.is_empty() {
            return true;
        }

        let mut results = self
            .conditions
            .iter()
            .map(|condition| condition.evaluate(answers));

        match &self.logic {
            Some(Logic::And) => results.all(|result| result),
            Some(Logic::Or) => results.any(|result| result),
            // Unrecognized or absent logic shows the question without combining.
            // Kept for compatibility with stored forms.
            Some(Logic::Unrecognized(_)) | None => true,
        }
    }
}

/// Visibility decision for an optional rule; no rule means visible.
pub fn should_show(rule: Option<&Rule>, answers: &AnswerMap) -> bool {
    rule.map(|rule| rule.evaluate(answers)).unwrap_or(true)
}

impl<'de> Deserialize<'de> for Rule {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Value::deserialize(deserializer).map(Rule::from_value)
    }
}

impl<'de> Deserialize<'de> for Condition {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Value::deserialize(deserializer).map(Condition::from_value)
    }
}

impl Serialize for Logic {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Logic::And => serializer.serialize_str("AND"),
            Logic::Or => serializer.serialize_str("OR"),
            Logic::Unrecognized(value) => value.serialize(serializer),
        }
    }
}

impl Serialize for Operator {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Operator::Equals => serializer.serialize_str("equals"),
            Operator::NotEquals => serializer.serialize_str("notEquals"),
            Operator::Contains => serializer.serialize_str("contains"),
            Operator::Unrecognized(value) => value.serialize(serializer),
        }
    }
}
