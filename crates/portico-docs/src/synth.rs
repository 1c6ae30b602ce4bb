//! Operation synthesis from input and output shapes.
//!
//! The same [`LocationSchema`] derivation that drives request validation
//! drives the document, so an operation's parameters and request bodies
//! carry exactly the fields and constraints the validator enforces.

use indexmap::IndexMap;
use portico_core::ParamLocation;
use portico_schema::{Constraints, FieldType, LocationSchema, Property, Shape, TypeDescriptor};

use crate::openapi::{
    Header, MediaType, Operation, Parameter, ParameterIn, RequestBody, Response, Schema,
    SchemaType,
};

/// Component name of the error body schema.
pub const ERR_RESPONSE: &str = "ErrResponse";

const PARAMETER_LOCATIONS: [(ParamLocation, ParameterIn); 4] = [
    (ParamLocation::Path, ParameterIn::Path),
    (ParamLocation::Query, ParameterIn::Query),
    (ParamLocation::Header, ParameterIn::Header),
    (ParamLocation::Cookie, ParameterIn::Cookie),
];

const BODY_LOCATIONS: [(ParamLocation, &str); 3] = [
    (ParamLocation::Body, "application/json"),
    (ParamLocation::Form, "application/x-www-form-urlencoded"),
    (ParamLocation::FormData, "multipart/form-data"),
];

/// Builds the operation for a handler taking `input` and returning `output`.
///
/// - `path`, `query`, `header` and `cookie` fields become parameters
///   (path parameters are always required);
/// - `json`, `form` and `formData` fields become one request body media
///   type each;
/// - the output becomes the `200` JSON response, with its `header` fields
///   listed as response headers and `Set-Cookie` when it sets cookies.
pub fn synthesize(input: &Shape, output: &TypeDescriptor) -> Operation {
    let mut operation = Operation {
        parameters: parameters(input),
        request_body: request_body(input),
        ..Default::default()
    };
    operation
        .responses
        .insert("200".to_string(), success_response(output));
    operation
}

fn parameters(shape: &Shape) -> Vec<Parameter> {
    let mut out = Vec::new();
    for (location, param_in) in PARAMETER_LOCATIONS {
        let schema = LocationSchema::derive(shape, location);
        for (name, property) in &schema.properties {
            let mut prop_schema = property_schema(property);
            let description = prop_schema.description.take();
            out.push(Parameter {
                name: name.clone(),
                location: param_in,
                description,
                required: property.required || location == ParamLocation::Path,
                deprecated: property.constraints.deprecated,
                schema: Some(prop_schema),
            });
        }
    }
    out
}

fn request_body(shape: &Shape) -> Option<RequestBody> {
    let mut content = IndexMap::new();
    let mut required = false;
    for (location, media_type) in BODY_LOCATIONS {
        let schema = LocationSchema::derive(shape, location);
        if schema.is_empty() {
            continue;
        }
        required |= schema.required().next().is_some();
        let mut body = location_object(&schema);
        body.title = shape.title.clone();
        body.description = shape.description.clone();
        content.insert(
            media_type.to_string(),
            MediaType { schema: Some(body) },
        );
    }
    if content.is_empty() {
        return None;
    }
    Some(RequestBody {
        description: None,
        required,
        content,
    })
}

fn success_response(output: &TypeDescriptor) -> Response {
    let mut response = Response::json("OK", schema_of(output));
    let Some(shape) = output.shape() else {
        return response;
    };

    for (name, property) in &LocationSchema::derive(shape, ParamLocation::Header).properties {
        let mut schema = property_schema(property);
        let description = schema.description.take();
        response.headers.insert(
            name.clone(),
            Header {
                description,
                schema: Some(schema),
            },
        );
    }

    let cookie_schema = LocationSchema::derive(shape, ParamLocation::Cookie);
    let cookies: Vec<&str> = cookie_schema
        .properties
        .keys()
        .map(|template| template.split(',').next().unwrap_or_default().trim())
        .collect();
    if !cookies.is_empty() {
        response.headers.insert(
            "Set-Cookie".to_string(),
            Header {
                description: Some(format!("Sets cookies: {}", cookies.join(", "))),
                schema: Some(Schema::string()),
            },
        );
    }
    response
}

fn location_object(schema: &LocationSchema) -> Schema {
    let mut object = Schema::object();
    for (name, property) in &schema.properties {
        object
            .properties
            .insert(name.clone(), property_schema(property));
    }
    object.required = schema.required().map(ToString::to_string).collect();
    object
}

/// Schema of a struct in wire form: every serialized field under its wire name.
pub fn object_schema(shape: &Shape) -> Schema {
    let mut object = location_object(&LocationSchema::object(shape));
    object.title = shape.title.clone();
    object.description = shape.description.clone();
    object
}

/// Schema of a type, without field-level constraints.
pub fn schema_of(ty: &TypeDescriptor) -> Schema {
    let mut schema = match &ty.kind {
        FieldType::String | FieldType::File => Schema::string(),
        FieldType::Integer => Schema::integer(),
        FieldType::Number => Schema::of(SchemaType::Number),
        FieldType::Boolean => Schema::of(SchemaType::Boolean),
        FieldType::Array(item) => Schema::array(schema_of(item)),
        FieldType::Map(value) => Schema {
            additional_properties: Some(Box::new(schema_of(value))),
            ..Schema::object()
        },
        FieldType::Object(shape) => object_schema(shape),
        FieldType::Any => Schema::default(),
    };
    schema.format = ty.format.map(ToString::to_string);
    schema.nullable = ty.nullable;
    schema
}

/// Schema of a property with its constraints applied.
///
/// Length bounds apply to strings as `minLength`/`maxLength` and to arrays
/// as `minItems`/`maxItems`. Value constraints on an array field describe
/// its items.
pub fn property_schema(property: &Property) -> Schema {
    let c = &property.constraints;
    let mut schema = schema_of(&property.ty);

    match property.ty.kind {
        FieldType::Array(_) => {
            schema.min_items = c.min_length.and_then(|n| u64::try_from(n).ok());
            schema.max_items = c.max_length.and_then(|n| u64::try_from(n).ok());
            if let Some(items) = schema.items.as_deref_mut() {
                apply_value_constraints(items, c);
            }
        }
        FieldType::String => {
            schema.min_length = c.min_length.and_then(|n| u64::try_from(n).ok());
            schema.max_length = c.max_length.and_then(|n| u64::try_from(n).ok());
            apply_value_constraints(&mut schema, c);
        }
        _ => apply_value_constraints(&mut schema, c),
    }

    if c.title.is_some() {
        schema.title = c.title.clone();
    }
    if c.description.is_some() {
        schema.description = c.description.clone();
    }
    schema.default = c.default.clone();
    schema.example = c.example.clone();
    schema.deprecated = c.deprecated;
    schema
}

fn apply_value_constraints(schema: &mut Schema, c: &Constraints) {
    if let Some(pattern) = &c.pattern {
        schema.pattern = Some(pattern.clone());
    }
    if let Some(values) = &c.enumeration {
        schema.enum_values = values.clone();
    }
    if let Some(format) = &c.format {
        schema.format = Some(format.clone());
    }
    schema.minimum = c.minimum;
    schema.maximum = c.maximum;
}

/// Schema of the JSON error body written for failed requests.
pub fn error_response_schema() -> Schema {
    Schema::object()
        .property("status", Schema::string())
        .property("code", Schema::integer())
        .property("error", Schema::default())
        .property(
            "context",
            Schema {
                additional_properties: Some(Box::new(Schema::default())),
                ..Schema::object()
            },
        )
}

/// A response whose body is the shared error schema.
pub fn error_response(description: impl Into<String>) -> Response {
    Response::json(description, Schema::component(ERR_RESPONSE))
}

#[cfg(test)]
mod tests {
    use portico_schema::{FieldDef, TypeInfo};
    use serde_json::json;

    use super::*;

    fn search() -> Shape {
        Shape::new("Search")
            .field(FieldDef::new("org", String::type_info()).path("org"))
            .field(
                FieldDef::new("q", String::type_info())
                    .query("q")
                    .min_length(2)
                    .description("Search text"),
            )
            .field(
                FieldDef::new("sort", Vec::<String>::type_info())
                    .query("sort")
                    .max_length(3)
                    .enum_literal("name,date"),
            )
            .field(FieldDef::new("trace", Option::<String>::type_info()).header("X-Trace"))
    }

    #[test]
    fn test_parameters_per_location() {
        let op = synthesize(&search(), &String::type_info());
        let names: Vec<_> = op
            .parameters
            .iter()
            .map(|p| (p.name.as_str(), p.location))
            .collect();
        assert_eq!(
            names,
            [
                ("org", ParameterIn::Path),
                ("q", ParameterIn::Query),
                ("sort", ParameterIn::Query),
                ("X-Trace", ParameterIn::Header),
            ]
        );
        assert!(op.parameters[0].required);
        assert!(!op.parameters[1].required);
        assert_eq!(op.parameters[1].description.as_deref(), Some("Search text"));
        assert!(op.request_body.is_none());
    }

    #[test]
    fn test_array_constraints_apply_to_items() {
        let op = synthesize(&search(), &String::type_info());
        let schema = serde_json::to_value(op.parameters[2].schema.as_ref().unwrap()).unwrap();
        assert_eq!(
            schema,
            json!({
                "type": "array",
                "items": {"type": "string", "enum": ["name", "date"]},
                "maxItems": 3
            })
        );
    }

    #[test]
    fn test_nullable_header() {
        let op = synthesize(&search(), &String::type_info());
        let schema = op.parameters[3].schema.as_ref().unwrap();
        assert!(schema.nullable);
    }

    #[test]
    fn test_bodies_per_media_type() {
        let shape = Shape::new("Upload")
            .description("Uploads a document")
            .field(FieldDef::new("name", String::type_info()).json("name").required())
            .field(FieldDef::new("note", String::type_info()).form("note"))
            .field(
                FieldDef::new("file", portico_schema::FormFile::type_info()).form_data("file"),
            );
        let op = synthesize(&shape, &String::type_info());
        let body = op.request_body.unwrap();
        assert!(body.required);
        assert_eq!(
            body.content.keys().collect::<Vec<_>>(),
            [
                "application/json",
                "application/x-www-form-urlencoded",
                "multipart/form-data"
            ]
        );

        let json_schema = body.content["application/json"].schema.as_ref().unwrap();
        assert_eq!(json_schema.required, ["name"]);
        assert_eq!(json_schema.description.as_deref(), Some("Uploads a document"));

        let file = &body.content["multipart/form-data"].schema.as_ref().unwrap().properties["file"];
        assert_eq!(file.format.as_deref(), Some("binary"));
    }

    #[test]
    fn test_success_response_headers_and_cookies() {
        let output = Shape::new("Session")
            .field(FieldDef::new("user", String::type_info()))
            .field(FieldDef::new("token", String::type_info()).cookie("sid,HttpOnly").json("-"))
            .field(FieldDef::new("limit", u32::type_info()).header("X-Rate-Limit").json("-"));
        let op = synthesize(&Shape::new("Empty"), &TypeDescriptor::object(output));

        let ok = &op.responses["200"];
        let body = ok.content["application/json"].schema.as_ref().unwrap();
        assert_eq!(body.properties.keys().collect::<Vec<_>>(), ["user"]);
        assert_eq!(ok.headers.keys().collect::<Vec<_>>(), ["X-Rate-Limit", "Set-Cookie"]);
        assert_eq!(
            ok.headers["Set-Cookie"].description.as_deref(),
            Some("Sets cookies: sid")
        );
    }

    #[test]
    fn test_numeric_bounds() {
        let shape = Shape::new("Paging").field(
            FieldDef::new("page", u32::type_info())
                .query("page")
                .minimum(1.0)
                .maximum(100.0)
                .default_literal("1"),
        );
        let op = synthesize(&shape, &String::type_info());
        assert_eq!(
            serde_json::to_value(op.parameters[0].schema.as_ref().unwrap()).unwrap(),
            json!({"type": "integer", "format": "int32", "minimum": 1.0, "maximum": 100.0, "default": 1})
        );
    }

    #[test]
    fn test_map_and_any() {
        let ty = std::collections::HashMap::<String, i64>::type_info();
        assert_eq!(
            serde_json::to_value(schema_of(&ty)).unwrap(),
            json!({"type": "object", "additionalProperties": {"type": "integer", "format": "int64"}})
        );
        assert_eq!(
            serde_json::to_value(schema_of(&serde_json::Value::type_info())).unwrap(),
            json!({})
        );
    }

    #[test]
    fn test_error_response_refers_to_component() {
        let response = error_response("Unauthorized");
        let schema = response.content["application/json"].schema.as_ref().unwrap();
        assert_eq!(schema.reference.as_deref(), Some("#/components/schemas/ErrResponse"));
    }
}
