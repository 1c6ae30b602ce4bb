//! Location schema validation.
//!
//! Each of the seven locations is validated in [`ParamLocation::ALL`]
//! order. The first location with at least one failure is reported and the
//! remaining locations are not checked.
//!
//! A location's [`LocationSchema`] is rendered as a JSON Schema document
//! and checked with `jsonschema`. Compiled validators are cached by
//! document, so each distinct schema compiles once per process.

use std::collections::HashMap;
use std::sync::{Arc, OnceLock, PoisonError, RwLock};

use jsonschema::error::ValidationErrorKind;
use jsonschema::{ValidationError, Validator};
use portico_core::ParamLocation;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, error};

use crate::error::{Cause, ValidatorError};
use crate::project::project_value;
use crate::schema::LocationSchema;
use crate::shape::{Describe, Shape};

/// Validates a bound input value.
///
/// Defaults must already be applied; the validator sees the value as the
/// handler will. An input that does not serialize is rejected with a
/// single body cause and logged at `error` level.
pub fn validate<T>(input: &T) -> Result<(), ValidatorError>
where
    T: Describe + Serialize + ?Sized,
{
    match serde_json::to_value(input) {
        Ok(value) => validate_value(&T::describe(), &value),
        Err(err) => {
            error!(error = %err, shape = %T::describe().name, "input does not serialize");
            Err(ValidatorError::new(
                ParamLocation::Body,
                vec![Cause::new("", format!("input does not serialize: {err}"))],
            ))
        }
    }
}

/// Validates an already serialized input against `shape`.
pub fn validate_value(shape: &Shape, value: &Value) -> Result<(), ValidatorError> {
    ParamLocation::ALL
        .into_iter()
        .try_for_each(|location| validate_location(shape, value, location))
}

/// Validates one location.
pub fn validate_location(
    shape: &Shape,
    value: &Value,
    location: ParamLocation,
) -> Result<(), ValidatorError> {
    let schema = LocationSchema::derive(shape, location);
    if schema.is_empty() {
        return Ok(());
    }
    let projected = project_value(shape, value, location);
    let causes = schema.check(&projected);
    if causes.is_empty() {
        Ok(())
    } else {
        Err(ValidatorError::new(location, causes))
    }
}

impl LocationSchema {
    /// Checks a projected map against the schema, returning every failure.
    ///
    /// `null` members are treated as absent.
    pub fn check(&self, projected: &Map<String, Value>) -> Vec<Cause> {
        let Some(validator) = compiled(&self.to_json_schema()) else {
            return Vec::new();
        };
        let instance = without_nulls(Value::Object(projected.clone()));
        validator
            .iter_errors(&instance)
            .map(|err| cause_of(&err))
            .collect()
    }
}

fn compiled(document: &Value) -> Option<Arc<Validator>> {
    static CACHE: OnceLock<RwLock<HashMap<String, Arc<Validator>>>> = OnceLock::new();
    let cache = CACHE.get_or_init(RwLock::default);
    let key = document.to_string();

    if let Some(validator) = cache.read().unwrap_or_else(PoisonError::into_inner).get(&key) {
        return Some(Arc::clone(validator));
    }

    match jsonschema::options().should_validate_formats(true).build(document) {
        Ok(validator) => {
            let mut cache = cache.write().unwrap_or_else(PoisonError::into_inner);
            let validator = Arc::clone(cache.entry(key).or_insert_with(|| Arc::new(validator)));
            debug!(cached = cache.len(), "location schema compiled");
            Some(validator)
        }
        Err(err) => {
            error!(error = %err, schema = %document, "location schema does not compile, skipping it");
            None
        }
    }
}

fn cause_of(err: &ValidationError<'_>) -> Cause {
    let mut pointer = err.instance_path.to_string();
    if let ValidationErrorKind::Required { property } = &err.kind {
        let name = property
            .as_str()
            .map_or_else(|| property.to_string(), ToString::to_string);
        pointer.push('/');
        pointer.push_str(&escape_pointer(&name));
    }
    Cause::new(pointer, err.to_string())
}

fn without_nulls(value: Value) -> Value {
    match value {
        Value::Object(object) => Value::Object(
            object
                .into_iter()
                .filter(|(_, v)| !v.is_null())
                .map(|(k, v)| (k, without_nulls(v)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(without_nulls).collect()),
        other => other,
    }
}

fn escape_pointer(segment: &str) -> String {
    segment.replace('~', "~0").replace('/', "~1")
}
