use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Reads a flag; anything but a JSON boolean is `false`.
pub(crate) fn flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(|value| value.as_bool().unwrap_or(false))
}

/// Reads text; anything but a JSON string is empty.
pub(crate) fn text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(|value| match value {
        Value::String(text) => text,
        _ => String::new(),
    })
}

/// Reads `[[key, value], ...]` pairs. A non-list reads as empty and entries
/// without a string key are dropped.
pub(crate) fn pairs<'de, D>(deserializer: D) -> Result<Vec<(String, Value)>, D::Error>
where
    D: Deserializer<'de>,
{
    let Value::Array(items) = Value::deserialize(deserializer)? else {
        return Ok(Vec::new());
    };
    Ok(items
        .into_iter()
        .filter_map(|item| {
            let Value::Array(entry) = item else {
                return None;
            };
            let mut entry = entry.into_iter();
            match entry.next() {
                Some(Value::String(key)) => Some((key, entry.next().unwrap_or(Value::Null))),
                _ => None,
            }
        })
        .collect())
}
