//! JSON decoder for submission payloads.

use anyhow::{Result, bail};
use serde_json::Value;

use crate::submission::RawSubmission;

/// Decodes a JSON array of submissions from raw bytes.
///
/// Individual elements never fail to decode (see [`RawSubmission`]), but the
/// top level must be an array.
///
/// # Errors
///
/// Returns an error if the bytes are not valid JSON or the top level is not
/// an array.
pub fn parse_submissions(bytes: &[u8]) -> Result<Vec<RawSubmission>> {
    let value: Value = serde_json::from_slice(bytes)?;
    submissions_from_value(value)
}

/// Converts an already-parsed JSON value into submissions.
///
/// # Errors
///
/// Returns an error if `value` is not an array.
pub fn submissions_from_value(value: Value) -> Result<Vec<RawSubmission>> {
    match value {
        Value::Array(items) => Ok(items.into_iter().map(RawSubmission::from).collect()),
        other => bail!("expected a JSON array of submissions, got {}", kind(&other)),
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
