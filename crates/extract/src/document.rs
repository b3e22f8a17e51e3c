//! Path lookups over decoded JSON documents.
//!
//! Paths are dot separated; a numeric segment indexes into an array, so
//! `requests.0.query.service` reads the first request's service.

use crate::error::{ExtractError, Result};
use serde_json::Value;

/// Resolve `path` below `doc`, or `None` when any segment is absent.
pub fn opt_field<'a>(doc: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = doc;
    for segment in path.split('.') {
        current = match current {
            Value::Object(map) => map.get(segment)?,
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}

/// Resolve `path` below `doc`; absence is a [`ExtractError::MissingField`].
///
/// An explicit JSON `null` counts as absent.
pub fn field<'a>(doc: &'a Value, path: &str) -> Result<&'a Value> {
    match opt_field(doc, path) {
        Some(Value::Null) | None => Err(ExtractError::missing(path)),
        Some(value) => Ok(value),
    }
}

pub fn str_field<'a>(doc: &'a Value, path: &str) -> Result<&'a str> {
    field(doc, path)?
        .as_str()
        .ok_or_else(|| ExtractError::unexpected(path, "a string"))
}

pub fn array_field<'a>(doc: &'a Value, path: &str) -> Result<&'a [Value]> {
    field(doc, path)?
        .as_array()
        .map(Vec::as_slice)
        .ok_or_else(|| ExtractError::unexpected(path, "an array"))
}

/// Like [`array_field`], but an absent field reads as an empty list.
pub fn opt_array_field<'a>(doc: &'a Value, path: &str) -> Result<&'a [Value]> {
    match opt_field(doc, path) {
        Some(Value::Null) | None => Ok(&[]),
        Some(value) => value
            .as_array()
            .map(Vec::as_slice)
            .ok_or_else(|| ExtractError::unexpected(path, "an array")),
    }
}

/// Every element of the string list at `path`.
pub fn str_list<'a>(doc: &'a Value, path: &str) -> Result<Vec<&'a str>> {
    array_field(doc, path)?
        .iter()
        .map(|item| {
            item.as_str()
                .ok_or_else(|| ExtractError::unexpected(path, "a list of strings"))
        })
        .collect()
}

/// Render a scalar that identifies something: strings as-is, numbers in
/// decimal form. Monitor ids come back from the API as integers.
pub fn scalar_string(doc: &Value, path: &str) -> Result<String> {
    match field(doc, path)? {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        _ => Err(ExtractError::unexpected(path, "a string or number")),
    }
}

/// Artifact id under the conventional `id` key.
pub fn id_string(doc: &Value) -> Result<String> {
    scalar_string(doc, "id")
}
