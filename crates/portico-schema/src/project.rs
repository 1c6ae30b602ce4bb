//! Field projection: one location's view of a struct value.

use portico_core::ParamLocation;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::debug;

use crate::shape::{Describe, Shape};
use crate::wire;

/// Projects `input` onto `location`.
///
/// The result maps each tag name used for `location` to the field's raw
/// value. A value that does not serialize to a JSON object projects to an
/// empty map.
pub fn project<T>(input: &T, location: ParamLocation) -> Map<String, Value>
where
    T: Describe + Serialize + ?Sized,
{
    match serde_json::to_value(input) {
        Ok(value) => project_value(&T::describe(), &value, location),
        Err(err) => {
            debug!(error = %err, %location, "input does not serialize, projecting nothing");
            Map::new()
        }
    }
}

/// Projects an already serialized value.
///
/// Rules, applied to fields in declaration order:
///
/// - a field with a usable tag for `location` is recorded under that tag;
///   an embedded field with a tag is recorded as one opaque value
/// - a field excluded with `-` is skipped
/// - an untagged embedded field is descended into and its entries merged
/// - anything else is skipped
///
/// Later entries overwrite earlier ones with the same key.
pub fn project_value(shape: &Shape, value: &Value, location: ParamLocation) -> Map<String, Value> {
    let mut out = Map::new();
    if let Value::Object(object) = value {
        collect(shape, object, location, &mut out);
    }
    out
}

fn collect(
    shape: &Shape,
    object: &Map<String, Value>,
    location: ParamLocation,
    out: &mut Map<String, Value>,
) {
    for field in &shape.fields {
        if field.is_placeholder() || field.is_excluded(location) {
            continue;
        }
        if let Some(tag) = field.tag_for(location) {
            if let Some(value) = object.get(&field.name) {
                out.insert(tag.to_string(), wire::to_wire(&field.ty, value.clone()));
            }
            continue;
        }
        let Some(inner) = field.embedded_shape() else {
            continue;
        };
        if field.flatten {
            collect(inner, object, location, out);
        } else if let Some(Value::Object(nested)) = object.get(&field.name) {
            collect(inner, nested, location, out);
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::shape::FieldDef;
    use crate::types::{TypeDescriptor, TypeInfo};

    fn object(map: Map<String, Value>) -> Value {
        Value::Object(map)
    }

    fn paging() -> Shape {
        Shape::new("Paging")
            .field(FieldDef::new("page", i32::type_info()).query("page"))
            .field(FieldDef::new("token", String::type_info()).header("X-Token"))
    }

    #[test]
    fn test_only_tagged_fields() {
        let shape = Shape::new("Input")
            .field(FieldDef::new("id", i64::type_info()).path("id"))
            .field(FieldDef::new("name", String::type_info()).json("name"))
            .field(FieldDef::new("secret", String::type_info()));
        let value = json!({"id": 7, "name": "ada", "secret": "x"});

        assert_eq!(object(project_value(&shape, &value, ParamLocation::Path)), json!({"id": 7}));
        assert_eq!(object(project_value(&shape, &value, ParamLocation::Body)), json!({"name": "ada"}));
        assert!(project_value(&shape, &value, ParamLocation::Query).is_empty());
    }

    #[test]
    fn test_embedded_nested_and_flattened() {
        let nested = Shape::new("A").field(FieldDef::embed("paging", paging()));
        let value = json!({"paging": {"page": 2, "token": "t"}});
        let out = project_value(&nested, &value, ParamLocation::Query);
        assert_eq!(out.get("page"), Some(&json!(2)));

        let flat = Shape::new("B").field(FieldDef::embed("paging", paging()).flatten());
        let value = json!({"page": 3, "token": "t"});
        let out = project_value(&flat, &value, ParamLocation::Header);
        assert_eq!(out.get("X-Token"), Some(&json!("t")));
    }

    #[test]
    fn test_last_writer_wins() {
        let shape = Shape::new("Dup")
            .field(FieldDef::embed("paging", paging()))
            .field(FieldDef::new("page_override", i32::type_info()).query("page"));
        let value = json!({"paging": {"page": 1, "token": ""}, "page_override": 9});
        let out = project_value(&shape, &value, ParamLocation::Query);
        assert_eq!(out.len(), 1);
        assert_eq!(out.get("page"), Some(&json!(9)));
    }

    #[test]
    fn test_tagged_embedded_is_opaque_only_where_tagged() {
        let shape = Shape::new("C").field(FieldDef::embed("paging", paging()).json("paging"));
        let value = json!({"paging": {"page": 1, "token": "t"}});
        let out = project_value(&shape, &value, ParamLocation::Query);
        assert_eq!(out.get("page"), Some(&json!(1)));
        let out = project_value(&shape, &value, ParamLocation::Header);
        assert_eq!(out.get("X-Token"), Some(&json!("t")));
        let out = project_value(&shape, &value, ParamLocation::Body);
        assert_eq!(out.get("paging"), Some(&json!({"page": 1, "token": "t"})));
    }

    #[test]
    fn test_excluded_embedded_is_skipped() {
        let shape = Shape::new("D").field(FieldDef::embed("paging", paging()).query("-"));
        let value = json!({"paging": {"page": 1, "token": "t"}});
        assert!(project_value(&shape, &value, ParamLocation::Query).is_empty());
        assert_eq!(project_value(&shape, &value, ParamLocation::Header).len(), 1);
    }

    #[test]
    fn test_missing_and_placeholder_fields() {
        let shape = Shape::new("E")
            .field(FieldDef::new("_", TypeDescriptor::new(crate::FieldType::Any)).query("meta"))
            .field(FieldDef::new("skipped", String::type_info()).query("s"));
        let out = project_value(&shape, &json!({"_": 1}), ParamLocation::Query);
        assert!(out.is_empty());
    }

    #[test]
    fn test_non_object_projects_nothing() {
        assert!(project_value(&paging(), &json!([1, 2]), ParamLocation::Query).is_empty());
    }
}
