use serde_json::{Map, Value};

use crate::errors::{AppError, AppResult};
use crate::models::NoteRecord;

/// Removes every object key whose value is `""` or `null`, at any depth, in place.
///
/// Array elements are descended into but never removed, so list positions
/// survive. Objects emptied by the pass are kept.
pub fn strip_empty_fields(value: &mut Value) {
    match value {
        Value::Object(map) => strip_map(map),
        Value::Array(items) => {
            for item in items.iter_mut() {
                if item.is_object() || item.is_array() {
                    strip_empty_fields(item);
                }
            }
        }
        _ => {}
    }
}

fn strip_map(map: &mut Map<String, Value>) {
    map.retain(|_, field| !is_empty_marker(field));
    for field in map.values_mut() {
        strip_empty_fields(field);
    }
}

fn is_empty_marker(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(text) => text.is_empty(),
        _ => false,
    }
}

pub fn prepare_document(record: &NoteRecord) -> AppResult<Map<String, Value>> {
    let value = serde_json::to_value(record)?;
    prepare_value(value)
}

pub fn prepare_value(mut value: Value) -> AppResult<Map<String, Value>> {
    if value.is_array() {
        return Err(AppError::InvalidInput(
            "Document must be an object, not an array".to_string(),
        ));
    }
    strip_empty_fields(&mut value);
    match value {
        Value::Object(map) => Ok(map),
        other => Err(AppError::InvalidInput(format!(
            "Document must be an object, got {}",
            json_kind(&other)
        ))),
    }
}

pub fn record_from_value(value: Value) -> AppResult<NoteRecord> {
    if !value.is_object() {
        return Err(AppError::Storage(format!(
            "Stored note must be an object, got {}",
            json_kind(&value)
        )));
    }
    Ok(serde_json::from_value(value)?)
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
