//! Helpers for reading AWS response objects

use crate::error::{AwsError, Result};
use serde_json::Value;

/// Value of the tag `key` in a `[{"Key": .., "Value": ..}]` list
pub fn tag_value<'a>(tags: Option<&'a Value>, key: &str) -> Option<&'a str> {
    tags?
        .as_array()?
        .iter()
        .find(|tag| tag.get("Key").and_then(Value::as_str) == Some(key))
        .and_then(|tag| tag.get("Value"))
        .and_then(Value::as_str)
}

/// Value of the `Name` tag of an object, if any
pub fn name_tag(item: &Value) -> Option<&str> {
    tag_value(item.get("Tags"), "Name").filter(|name| !name.is_empty())
}

/// Required string field of an object
pub fn str_field<'a>(item: &'a Value, key: &str) -> Result<&'a str> {
    item.get(key)
        .and_then(Value::as_str)
        .ok_or_else(|| AwsError::UnexpectedResponse(format!("missing string field {key}")))
}

/// Required array field of a response. Absent fields count as empty.
pub fn items<'a>(response: &'a Value, key: &str) -> Result<&'a [Value]> {
    match response.get(key) {
        None | Some(Value::Null) => Ok(&[]),
        Some(Value::Array(values)) => Ok(values.as_slice()),
        Some(other) => Err(AwsError::UnexpectedResponse(format!(
            "{key} should be a list, got {other}"
        ))),
    }
}

/// Last segment of an ARN or URL
pub fn last_segment(text: &str, separator: char) -> &str {
    text.rsplit(separator).next().unwrap_or(text)
}
