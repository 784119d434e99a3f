//! One-shot strategy submissions from the mini-app form.
//!
//! This path has no session: the payload arrives complete and is
//! acknowledged (or rejected) in a single turn.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum SubmissionError {
    #[error("missing field '{0}'")]
    MissingField(&'static str),
    #[error("invalid value for '{field}': {value}")]
    InvalidValue { field: &'static str, value: String },
}

/// Parsed mini-app form payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Submission {
    pub period: u32,
    pub compare_to: String,
    pub threshold: f64,
}

fn field<'a>(
    fields: &'a HashMap<String, Value>,
    name: &'static str,
) -> Result<&'a Value, SubmissionError> {
    fields.get(name).ok_or(SubmissionError::MissingField(name))
}

fn as_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn parse_u32(value: &Value, name: &'static str) -> Result<u32, SubmissionError> {
    let parsed = match value {
        Value::Number(n) => n.as_u64().and_then(|v| u32::try_from(v).ok()),
        Value::String(s) => s.trim().parse::<u32>().ok(),
        _ => None,
    };
    parsed.ok_or_else(|| SubmissionError::InvalidValue {
        field: name,
        value: as_text(value),
    })
}

fn parse_f64(value: &Value, name: &'static str) -> Result<f64, SubmissionError> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.ok_or_else(|| SubmissionError::InvalidValue {
        field: name,
        value: as_text(value),
    })
}

/// Parse the `{period, compare_to, threshold}` payload. Fields may arrive
/// as JSON numbers or as form-encoded strings.
pub fn parse_submission(fields: &HashMap<String, Value>) -> Result<Submission, SubmissionError> {
    let period = parse_u32(field(fields, "period")?, "period")?;
    let compare_to = match field(fields, "compare_to")? {
        Value::String(s) if !s.trim().is_empty() => s.trim().to_string(),
        other => {
            return Err(SubmissionError::InvalidValue {
                field: "compare_to",
                value: as_text(other),
            })
        }
    };
    let threshold = parse_f64(field(fields, "threshold")?, "threshold")?;
    Ok(Submission {
        period,
        compare_to,
        threshold,
    })
}

/// Acknowledgement text mirrored back to the submitting user.
pub fn ack_text(submission: &Submission) -> String {
    format!(
        "Strategy received:\n• Period: {}\n• Compare to: {}\n• Threshold: {}",
        submission.period, submission.compare_to, submission.threshold
    )
}
