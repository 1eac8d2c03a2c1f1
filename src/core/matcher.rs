//! Purpose: Decide whether a payload entry can populate a declared attribute.
//! Exports: `FieldValue`, `FieldKind`, `Match`, `match_field`.
//! Role: Leaf coercion policy used by the parser for every declared field.
//! Invariants: Numbers are stored as their decimal text, never as numbers.
//! Invariants: Lists of objects pass through unconverted; other lists are skipped.
//! Invariants: Matching never fails; unusable values are skipped silently.
use serde::Serialize;
use serde_json::{Map, Number, Value};

pub type JsonObject = Map<String, Value>;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Text,
    List,
}

#[derive(Clone, Debug, PartialEq)]
pub enum FieldValue {
    Text(String),
    List(Vec<JsonObject>),
}

impl FieldValue {
    pub fn kind(&self) -> FieldKind {
        match self {
            FieldValue::Text(_) => FieldKind::Text,
            FieldValue::List(_) => FieldKind::List,
        }
    }

    pub fn into_json(self) -> Value {
        match self {
            FieldValue::Text(text) => Value::String(text),
            FieldValue::List(items) => Value::Array(items.into_iter().map(Value::Object).collect()),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Match {
    Assign(FieldValue),
    Skip,
}

pub fn match_field(name: &str, payload: &JsonObject) -> Match {
    let Some(value) = payload.get(name) else {
        return Match::Skip;
    };
    match value {
        Value::String(text) => Match::Assign(FieldValue::Text(text.clone())),
        Value::Number(number) => Match::Assign(FieldValue::Text(decimal_text(number))),
        Value::Array(items) => object_list(items).map_or(Match::Skip, Match::Assign),
        Value::Bool(_) | Value::Null | Value::Object(_) => Match::Skip,
    }
}

/// Integers keep their digits. Floats use plain positional notation, so whole
/// values drop the fraction (`2.0` -> `2`) and no exponent is ever emitted.
fn decimal_text(number: &Number) -> String {
    match number.as_f64() {
        Some(float) if number.is_f64() => float.to_string(),
        _ => number.to_string(),
    }
}

fn object_list(items: &[Value]) -> Option<FieldValue> {
    items
        .iter()
        .map(|item| item.as_object().cloned())
        .collect::<Option<Vec<_>>>()
        .map(FieldValue::List)
}
