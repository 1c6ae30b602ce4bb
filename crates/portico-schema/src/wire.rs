//! Conversions between a struct's serde form and its wire form.
//!
//! The serde form is what `serde_json::to_value` produces for a struct: keys
//! are serde field names, embedded structs may be nested. The wire form is
//! what clients send and receive in JSON bodies: keys are `json` tags and
//! embedded structs without their own `json` tag are flattened into the
//! parent object.

use serde_json::{Map, Number, Value};

use crate::shape::Shape;
use crate::types::{FieldType, TypeDescriptor};

/// A string that cannot be read as the target type.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("expected {expected}, got {value:?}")]
pub struct CoerceError {
    /// Name of the expected type.
    pub expected: &'static str,
    /// Offending input.
    pub value: String,
}

impl CoerceError {
    fn new(expected: &'static str, value: &str) -> Self {
        Self {
            expected,
            value: value.to_string(),
        }
    }
}

/// Parses a declaration literal (`default`, `enum`, `example`).
///
/// Sequences take a comma-separated list; maps, objects and `Any` take JSON.
pub fn parse_literal(ty: &TypeDescriptor, literal: &str) -> Result<Value, CoerceError> {
    match &ty.kind {
        FieldType::Array(item) => {
            if literal.trim_start().starts_with('[') {
                return serde_json::from_str(literal)
                    .map_err(|_| CoerceError::new("array", literal));
            }
            literal
                .split(',')
                .filter(|s| !s.is_empty())
                .map(|part| parse_literal(item, part.trim()))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array)
        }
        FieldType::Map(_) | FieldType::Object(_) => {
            serde_json::from_str(literal).map_err(|_| CoerceError::new("object", literal))
        }
        FieldType::Any => {
            Ok(serde_json::from_str(literal).unwrap_or_else(|_| Value::String(literal.into())))
        }
        _ => coerce_str(ty, literal),
    }
}

/// Reads one request string (path segment, header, query value) as `ty`.
pub fn coerce_str(ty: &TypeDescriptor, raw: &str) -> Result<Value, CoerceError> {
    match &ty.kind {
        FieldType::String | FieldType::Any => Ok(Value::String(raw.to_string())),
        FieldType::Integer => {
            if let Ok(n) = raw.parse::<i64>() {
                Ok(Value::from(n))
            } else if let Ok(n) = raw.parse::<u64>() {
                Ok(Value::from(n))
            } else {
                Err(CoerceError::new("integer", raw))
            }
        }
        FieldType::Number => raw
            .parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .map(Value::Number)
            .ok_or_else(|| CoerceError::new("number", raw)),
        FieldType::Boolean => parse_bool(raw)
            .map(Value::Bool)
            .ok_or_else(|| CoerceError::new("boolean", raw)),
        FieldType::Array(item) => coerce_str(item, raw).map(|v| Value::Array(vec![v])),
        FieldType::Map(_) | FieldType::Object(_) => {
            serde_json::from_str(raw).map_err(|_| CoerceError::new("object", raw))
        }
        FieldType::File => Err(CoerceError::new("file", raw)),
    }
}

/// Reads all values sent for one field. Sequences take every value, other
/// types take the first one.
pub fn coerce_all(ty: &TypeDescriptor, raw: &[&str]) -> Result<Option<Value>, CoerceError> {
    match (&ty.kind, raw) {
        (_, []) => Ok(None),
        (FieldType::Array(item), values) => values
            .iter()
            .map(|v| coerce_str(item, v))
            .collect::<Result<Vec<_>, _>>()
            .map(|items| Some(Value::Array(items))),
        (_, [first, ..]) => coerce_str(ty, first).map(Some),
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw {
        "1" | "t" | "T" | "true" | "TRUE" | "True" | "on" => Some(true),
        "0" | "f" | "F" | "false" | "FALSE" | "False" | "off" => Some(false),
        _ => None,
    }
}

/// The value an absent field receives.
pub fn zero_value(ty: &TypeDescriptor) -> Value {
    if ty.nullable {
        return Value::Null;
    }
    match &ty.kind {
        FieldType::String => Value::from(zero_string(ty.format)),
        FieldType::Integer | FieldType::Number => Value::from(0),
        FieldType::Boolean => Value::Bool(false),
        FieldType::Array(_) => Value::Array(Vec::new()),
        FieldType::Map(_) => Value::Object(Map::new()),
        FieldType::Object(shape) => Value::Object(zero_object(shape)),
        FieldType::File | FieldType::Any => Value::Null,
    }
}

/// Zero value of a string kind. Formatted kinds get the smallest value
/// their type parses.
fn zero_string(format: Option<&str>) -> &'static str {
    match format {
        Some("uuid") => "00000000-0000-0000-0000-000000000000",
        Some("date") => "1970-01-01",
        Some("date-time") => "1970-01-01T00:00:00Z",
        Some("ipv4") => "0.0.0.0",
        Some("ipv6") => "::",
        _ => "",
    }
}

/// Serde-form object with every field at its default or zero value.
pub fn zero_object(shape: &Shape) -> Map<String, Value> {
    let mut out = Map::new();
    fill_missing(shape, &mut out);
    out
}

/// Inserts defaults (or zero values) for fields missing from a serde-form object.
pub fn fill_missing(shape: &Shape, object: &mut Map<String, Value>) {
    for field in &shape.fields {
        if field.is_placeholder() {
            continue;
        }
        if field.flatten {
            if let Some(inner) = field.embedded_shape() {
                fill_missing(inner, object);
            }
            continue;
        }
        if !object.contains_key(&field.name) {
            let value = field
                .constraints
                .default
                .clone()
                .unwrap_or_else(|| zero_value(&field.ty));
            object.insert(field.name.clone(), value);
        }
    }
}

/// Converts a serde-form value of type `ty` into wire form.
pub fn to_wire(ty: &TypeDescriptor, value: Value) -> Value {
    match (&ty.kind, value) {
        (FieldType::Object(shape), Value::Object(object)) => {
            let mut out = Map::new();
            rekey_out(shape, &object, &mut out);
            Value::Object(out)
        }
        (FieldType::Array(item), Value::Array(items)) => {
            Value::Array(items.into_iter().map(|v| to_wire(item, v)).collect())
        }
        (FieldType::Map(inner), Value::Object(object)) => Value::Object(
            object
                .into_iter()
                .map(|(k, v)| (k, to_wire(inner, v)))
                .collect(),
        ),
        (_, other) => other,
    }
}

fn rekey_out(shape: &Shape, object: &Map<String, Value>, out: &mut Map<String, Value>) {
    for field in &shape.fields {
        if field.is_placeholder() {
            continue;
        }
        let Some(wire_name) = field.wire_name() else {
            continue;
        };
        match field.embedded_shape() {
            Some(inner) if field.tag_for(crate::ParamLocation::Body).is_none() => {
                if field.flatten {
                    rekey_out(inner, object, out);
                } else if let Some(Value::Object(nested)) = object.get(&field.name) {
                    rekey_out(inner, nested, out);
                }
            }
            _ => {
                if let Some(value) = object.get(&field.name) {
                    out.insert(wire_name.to_string(), to_wire(&field.ty, value.clone()));
                }
            }
        }
    }
}

/// Converts a wire-form value into serde form, filling absent struct
/// members with defaults or zero values.
pub fn from_wire(ty: &TypeDescriptor, value: Value) -> Value {
    match (&ty.kind, value) {
        (FieldType::Object(shape), Value::Object(object)) => {
            let mut out = rekey_in(shape, &object);
            fill_missing(shape, &mut out);
            Value::Object(out)
        }
        (FieldType::Array(item), Value::Array(items)) => {
            Value::Array(items.into_iter().map(|v| from_wire(item, v)).collect())
        }
        (FieldType::Map(inner), Value::Object(object)) => Value::Object(
            object
                .into_iter()
                .map(|(k, v)| (k, from_wire(inner, v)))
                .collect(),
        ),
        (_, other) => other,
    }
}

fn rekey_in(shape: &Shape, object: &Map<String, Value>) -> Map<String, Value> {
    let mut out = Map::new();
    for field in &shape.fields {
        if field.is_placeholder() {
            continue;
        }
        let Some(wire_name) = field.wire_name() else {
            continue;
        };
        match field.embedded_shape() {
            Some(inner) if field.tag_for(crate::ParamLocation::Body).is_none() => {
                let mut nested = rekey_in(inner, object);
                if field.flatten {
                    out.append(&mut nested);
                } else {
                    fill_missing(inner, &mut nested);
                    out.insert(field.name.clone(), Value::Object(nested));
                }
            }
            _ => {
                if let Some(value) = object.get(wire_name) {
                    out.insert(field.name.clone(), from_wire(&field.ty, value.clone()));
                }
            }
        }
    }
    out
}
