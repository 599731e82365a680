//! Document classification
//!
//! Sends one prompt to the model backend and turns the reply into a
//! `ClassificationRecord`. Replies that cannot be parsed, or that carry no
//! usable title, surface as typed errors so the pipeline can route the file
//! to `unclassified/`.

use serde_json::{Map, Value};

use super::client::ModelBackend;
use super::json_parser::extract_json_object;
use crate::error::ClassifyError;
use crate::organizer::types::{is_null_token, Attribute, ClassificationRecord};

/// Field that must be present for a classification to count
pub const PRIMARY_ATTRIBUTE: Attribute = Attribute::Title;

/// Turns a prompt into a classification record
pub trait Classifier {
    fn classify(&self, prompt: &str) -> Result<ClassificationRecord, ClassifyError>;
}

impl<C: Classifier + ?Sized> Classifier for Box<C> {
    fn classify(&self, prompt: &str) -> Result<ClassificationRecord, ClassifyError> {
        (**self).classify(prompt)
    }
}

/// Classifier backed by a language model
pub struct LlmClassifier<B> {
    backend: B,
}

impl<B: ModelBackend> LlmClassifier<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }
}

impl<B: ModelBackend> Classifier for LlmClassifier<B> {
    fn classify(&self, prompt: &str) -> Result<ClassificationRecord, ClassifyError> {
        let reply = self.backend.query(prompt)?;
        tracing::debug!("[Classifier] Raw reply: {}", reply.trim());
        parse_classification(&reply)
    }
}

/// Parse a model reply into a validated record
pub fn parse_classification(reply: &str) -> Result<ClassificationRecord, ClassifyError> {
    let json = extract_json_object(reply).map_err(ClassifyError::InvalidResponseFormat)?;

    let object: Map<String, Value> = match serde_json::from_str::<Value>(json) {
        Ok(Value::Object(map)) => map,
        Ok(other) => {
            return Err(ClassifyError::InvalidResponseFormat(format!(
                "expected a JSON object, got {}",
                json_kind(&other)
            )))
        }
        Err(e) => return Err(ClassifyError::InvalidResponseFormat(e.to_string())),
    };

    validate_primary(&object)?;

    let mut record = ClassificationRecord::default();
    for (key, value) in object {
        // Keys are matched case-insensitively; models sometimes echo "TITLE"
        let normalized_key = key.trim().to_lowercase();
        let Some(text) = value_as_text(&value) else {
            continue;
        };
        match Attribute::from_key(&normalized_key) {
            Some(attribute) => record.set(attribute, text),
            None => {
                record.extra.insert(normalized_key, text);
            }
        }
    }

    // Keys differing only in case collapse onto one field; check what survived
    if record.get(PRIMARY_ATTRIBUTE).is_none() {
        return Err(ClassifyError::InvalidClassification(format!(
            "'{}' is null",
            PRIMARY_ATTRIBUTE.key()
        )));
    }

    Ok(record)
}

/// The primary field must be a non-null JSON string
fn validate_primary(object: &Map<String, Value>) -> Result<(), ClassifyError> {
    let key = PRIMARY_ATTRIBUTE.key();
    let value = object
        .iter()
        .find(|(k, _)| k.trim().eq_ignore_ascii_case(key))
        .map(|(_, v)| v);

    match value {
        None => Err(ClassifyError::InvalidClassification(format!("missing '{}'", key))),
        Some(Value::String(s)) if s.trim().is_empty() || is_null_token(s) => Err(
            ClassifyError::InvalidClassification(format!("'{}' is null", key)),
        ),
        Some(Value::String(_)) => Ok(()),
        Some(other) => Err(ClassifyError::InvalidClassification(format!(
            "'{}' is a {}, not a string",
            key,
            json_kind(other)
        ))),
    }
}

/// Scalar values as text; null, arrays and objects count as absent
fn value_as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
