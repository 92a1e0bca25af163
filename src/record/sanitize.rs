//! Field tree cleanup before storing and after loading documents.

use chrono::{DateTime, SecondsFormat};
use serde_json::{Map, Number, Value};

use super::tree::DEFAULT_MAX_DEPTH;

/// Drop null fields, then every map or sequence left empty.
///
/// Applying it twice yields the same tree as applying it once.
pub fn clean_nil(fields: Map<String, Value>) -> Map<String, Value> {
    clean_nil_with_depth(fields, DEFAULT_MAX_DEPTH)
}

pub fn clean_nil_with_depth(fields: Map<String, Value>, max_depth: usize) -> Map<String, Value> {
    clean_map(fields, 0, max_depth)
}

/// `clean_nil` for an arbitrary value; a tree that cleans away entirely
/// becomes null
pub fn clean_nil_value(value: Value) -> Value {
    clean_value(value, 0, DEFAULT_MAX_DEPTH).unwrap_or(Value::Null)
}

fn clean_map(fields: Map<String, Value>, depth: usize, max_depth: usize) -> Map<String, Value> {
    if depth > max_depth {
        tracing::warn!("Nil cleanup stopped at depth {}", depth);
        return fields;
    }

    fields
        .into_iter()
        .filter_map(|(key, value)| clean_value(value, depth + 1, max_depth).map(|value| (key, value)))
        .collect()
}

fn clean_value(value: Value, depth: usize, max_depth: usize) -> Option<Value> {
    match value {
        Value::Null => None,
        Value::Object(fields) => {
            let cleaned = clean_map(fields, depth, max_depth);
            (!cleaned.is_empty()).then_some(Value::Object(cleaned))
        }
        Value::Array(items) => {
            if depth > max_depth {
                tracing::warn!("Nil cleanup stopped at depth {}", depth);
                return Some(Value::Array(items));
            }
            let cleaned: Vec<Value> = items
                .into_iter()
                .filter_map(|item| clean_value(item, depth + 1, max_depth))
                .collect();
            (!cleaned.is_empty()).then_some(Value::Array(cleaned))
        }
        scalar => Some(scalar),
    }
}

/// Unwrap typed values that come back from the document store in
/// extended JSON form (`{"$numberLong": "42"}`, `{"$date": ...}`,
/// `{"$oid": ...}`), so tree walkers only ever see plain scalars, maps
/// and sequences.
pub fn normalize_primitives(value: Value) -> Value {
    normalize_with_depth(value, DEFAULT_MAX_DEPTH)
}

pub fn normalize_with_depth(value: Value, max_depth: usize) -> Value {
    normalize(value, 0, max_depth)
}

fn normalize(value: Value, depth: usize, max_depth: usize) -> Value {
    if depth > max_depth {
        tracing::warn!("Primitive normalization stopped at depth {}", depth);
        return value;
    }

    match value {
        Value::Array(items) => Value::Array(
            items
                .into_iter()
                .map(|item| normalize(item, depth + 1, max_depth))
                .collect(),
        ),
        Value::Object(fields) => match unwrap_extended(&fields) {
            Some(plain) => plain,
            None => Value::Object(
                fields
                    .into_iter()
                    .map(|(key, value)| (key, normalize(value, depth + 1, max_depth)))
                    .collect(),
            ),
        },
        scalar => scalar,
    }
}

/// Plain value for a single-key wrapper object; `None` when `fields` is an
/// ordinary map or the wrapped content is unusable
fn unwrap_extended(fields: &Map<String, Value>) -> Option<Value> {
    if fields.len() != 1 {
        return None;
    }
    let (key, inner) = fields.iter().next()?;

    match key.as_str() {
        "$numberInt" | "$numberLong" => {
            let n: i64 = inner.as_str()?.parse().ok()?;
            Some(Value::from(n))
        }
        "$numberDouble" => {
            let f: f64 = inner.as_str()?.parse().ok()?;
            Number::from_f64(f).map(Value::Number)
        }
        "$numberDecimal" | "$oid" | "$symbol" => Some(Value::String(inner.as_str()?.to_string())),
        "$date" => date_text(inner).map(Value::String),
        _ => None,
    }
}

fn date_text(inner: &Value) -> Option<String> {
    let millis = match inner {
        Value::String(text) => return Some(text.clone()),
        Value::Number(n) => n.as_i64()?,
        Value::Object(wrapped) => wrapped.get("$numberLong")?.as_str()?.parse().ok()?,
        _ => return None,
    };
    let time = DateTime::from_timestamp_millis(millis)?;
    Some(time.to_rfc3339_opts(SecondsFormat::Millis, true))
}
