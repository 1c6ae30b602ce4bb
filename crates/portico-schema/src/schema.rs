//! Per-location schemas derived from shapes.

use indexmap::IndexMap;
use portico_core::ParamLocation;
use regex::Regex;
use serde_json::{json, Map, Value};
use tracing::warn;

use crate::shape::{Constraints, FieldDef, Shape};
use crate::types::{FieldType, TypeDescriptor};

/// One property of a derived schema.
#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    /// Serde key of the source field.
    pub field: String,
    /// Value type.
    pub ty: TypeDescriptor,
    /// Constraints.
    pub constraints: Constraints,
    /// Must be present and non-null.
    pub required: bool,
}

impl Property {
    fn from_field(field: &FieldDef) -> Self {
        Self {
            field: field.name.clone(),
            ty: field.ty.clone(),
            constraints: field.constraints.clone(),
            required: field.required,
        }
    }
}

/// Schema of the fields a shape binds from one location.
///
/// Properties are keyed by tag name and follow the same selection and
/// merge rules as [`project_value`](crate::project_value), so a projection
/// of a value always lines up with the schema of its shape.
#[derive(Debug, Clone, PartialEq)]
pub struct LocationSchema {
    /// The location described.
    pub location: ParamLocation,
    /// Properties keyed by tag name, in declaration order.
    pub properties: IndexMap<String, Property>,
}

impl LocationSchema {
    /// Derives the schema of `shape` for `location`.
    pub fn derive(shape: &Shape, location: ParamLocation) -> Self {
        let mut properties = IndexMap::new();
        collect_location(shape, location, &mut properties);
        Self {
            location,
            properties,
        }
    }

    /// Derives the wire-form object schema of `shape` (JSON body view).
    ///
    /// Every field is included under its wire name; untagged embedded
    /// fields are flattened.
    pub fn object(shape: &Shape) -> Self {
        let mut properties = IndexMap::new();
        collect_object(shape, &mut properties);
        Self {
            location: ParamLocation::Body,
            properties,
        }
    }

    /// True if no field is bound from this location.
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    /// Names of required properties.
    pub fn required(&self) -> impl Iterator<Item = &str> {
        self.properties
            .iter()
            .filter(|(_, p)| p.required)
            .map(|(name, _)| name.as_str())
    }
}

impl LocationSchema {
    /// Renders the schema as a JSON Schema document.
    ///
    /// Nullability of properties is not expressed: the validator removes
    /// `null` members before checking, so `null` reads as absent.
    pub fn to_json_schema(&self) -> Value {
        let properties: Map<String, Value> = self
            .properties
            .iter()
            .map(|(name, property)| (name.clone(), value_schema(&property.ty, &property.constraints)))
            .collect();
        let mut schema = json!({"type": "object", "properties": properties});
        let required: Vec<Value> = self.required().map(Value::from).collect();
        if !required.is_empty() {
            schema["required"] = Value::Array(required);
        }
        schema
    }
}

fn value_schema(ty: &TypeDescriptor, constraints: &Constraints) -> Value {
    let mut schema = Map::new();
    match &ty.kind {
        FieldType::Array(item) => {
            schema.insert("type".into(), json!("array"));
            if let Some(min) = constraints.min_length {
                schema.insert("minItems".into(), json!(min));
            }
            if let Some(max) = constraints.max_length {
                schema.insert("maxItems".into(), json!(max));
            }
            schema.insert("items".into(), value_schema(item, &per_item(constraints)));
        }
        FieldType::Map(inner) => {
            schema.insert("type".into(), json!("object"));
            schema.insert(
                "additionalProperties".into(),
                value_schema(inner, &Constraints::default()),
            );
        }
        FieldType::Object(shape) => return LocationSchema::object(shape).to_json_schema(),
        FieldType::File => {
            schema.insert("type".into(), json!("object"));
        }
        FieldType::Any => {}
        kind => {
            schema.insert("type".into(), json!(kind.json_type()));
            scalar_keywords(constraints, &mut schema);
        }
    }
    if let Some(allowed) = &constraints.enumeration {
        if !matches!(ty.kind, FieldType::Array(_)) {
            schema.insert("enum".into(), Value::Array(allowed.clone()));
        }
    }
    if ty.nullable {
        if let Some(kind) = schema.remove("type") {
            schema.insert("type".into(), json!([kind, "null"]));
        }
    }
    Value::Object(schema)
}

fn scalar_keywords(constraints: &Constraints, schema: &mut Map<String, Value>) {
    if let Some(min) = constraints.min_length {
        schema.insert("minLength".into(), json!(min));
    }
    if let Some(max) = constraints.max_length {
        schema.insert("maxLength".into(), json!(max));
    }
    if let Some(pattern) = &constraints.pattern {
        let anchored = format!("^(?:{pattern})$");
        match Regex::new(&anchored) {
            Ok(_) => {
                schema.insert("pattern".into(), Value::String(anchored));
            }
            Err(err) => warn!(pattern, error = %err, "ignoring invalid pattern"),
        }
    }
    if let Some(format) = &constraints.format {
        schema.insert("format".into(), json!(format));
    }
    if let Some(min) = constraints.minimum {
        schema.insert("minimum".into(), number(min));
    }
    if let Some(max) = constraints.maximum {
        schema.insert("maximum".into(), number(max));
    }
}

/// Whole bounds render as integers so messages read `1`, not `1.0`.
#[allow(clippy::cast_possible_truncation)]
fn number(n: f64) -> Value {
    if n.fract() == 0.0 && n.abs() < 9.0e15 {
        json!(n as i64)
    } else {
        json!(n)
    }
}

/// Constraints of a sequence field that apply to each item.
fn per_item(constraints: &Constraints) -> Constraints {
    Constraints {
        pattern: constraints.pattern.clone(),
        enumeration: constraints.enumeration.clone(),
        format: constraints.format.clone(),
        minimum: constraints.minimum,
        maximum: constraints.maximum,
        ..Constraints::default()
    }
}

fn collect_location(
    shape: &Shape,
    location: ParamLocation,
    out: &mut IndexMap<String, Property>,
) {
    for field in &shape.fields {
        if field.is_placeholder() || field.is_excluded(location) {
            continue;
        }
        if let Some(tag) = field.tag_for(location) {
            out.insert(tag.to_string(), Property::from_field(field));
        } else if let Some(inner) = field.embedded_shape() {
            collect_location(inner, location, out);
        }
    }
}

fn collect_object(shape: &Shape, out: &mut IndexMap<String, Property>) {
    for field in &shape.fields {
        if field.is_placeholder() {
            continue;
        }
        let Some(wire_name) = field.wire_name() else {
            continue;
        };
        match field.embedded_shape() {
            Some(inner) if field.tag_for(ParamLocation::Body).is_none() => {
                collect_object(inner, out);
            }
            _ => {
                out.insert(wire_name.to_string(), Property::from_field(field));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TypeInfo;

    fn credentials() -> Shape {
        Shape::new("Credentials")
            .field(FieldDef::new("username", String::type_info()).json("username").required())
            .field(FieldDef::new("password", String::type_info()).json("password").min_length(8))
    }

    #[test]
    fn test_derive_only_location_fields() {
        let shape = credentials().field(FieldDef::new("trace", String::type_info()).header("X-Trace"));
        let body = LocationSchema::derive(&shape, ParamLocation::Body);
        assert_eq!(body.properties.keys().collect::<Vec<_>>(), ["username", "password"]);
        assert_eq!(body.required().collect::<Vec<_>>(), ["username"]);

        let header = LocationSchema::derive(&shape, ParamLocation::Header);
        assert_eq!(header.properties.len(), 1);
        assert!(LocationSchema::derive(&shape, ParamLocation::Path).is_empty());
    }

    #[test]
    fn test_embedded_merge_last_writer_wins() {
        let shape = Shape::new("Login")
            .field(FieldDef::embed("credentials", credentials()))
            .field(FieldDef::new("name", String::type_info()).json("username").max_length(3));
        let body = LocationSchema::derive(&shape, ParamLocation::Body);
        assert_eq!(body.properties.len(), 2);
        let username = &body.properties["username"];
        assert_eq!(username.field, "name");
        assert_eq!(username.constraints.max_length, Some(3));
        assert!(!username.required);
    }

    #[test]
    fn test_json_schema_document() {
        let shape = Shape::new("Search")
            .field(FieldDef::new("page", i32::type_info()).query("page").minimum(1.0).required())
            .field(
                FieldDef::new("tags", Vec::<String>::type_info())
                    .query("tag")
                    .max_length(2)
                    .pattern("[a-z]+"),
            )
            .field(FieldDef::new("bad", String::type_info()).query("bad").pattern("("));
        let document = LocationSchema::derive(&shape, ParamLocation::Query).to_json_schema();
        assert_eq!(
            document,
            json!({
                "type": "object",
                "properties": {
                    "page": {"type": "integer", "minimum": 1},
                    "tag": {
                        "type": "array",
                        "maxItems": 2,
                        "items": {"type": "string", "pattern": "^(?:[a-z]+)$"}
                    },
                    "bad": {"type": "string"}
                },
                "required": ["page"]
            })
        );
    }

    #[test]
    fn test_object_schema_uses_wire_names() {
        let shape = Shape::new("User")
            .field(FieldDef::new("display_name", String::type_info()))
            .field(FieldDef::new("secret", String::type_info()).json("-"))
            .field(FieldDef::embed("credentials", credentials()));
        let schema = LocationSchema::object(&shape);
        assert_eq!(
            schema.properties.keys().collect::<Vec<_>>(),
            ["display_name", "username", "password"]
        );
    }
}
