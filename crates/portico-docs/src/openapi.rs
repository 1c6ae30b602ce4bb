//! OpenAPI 3 document model.
//!
//! The types mirror the parts of the OpenAPI 3.0 object model that Portico
//! produces. Field names follow OpenAPI 3.0.3 through `serde` renames,
//! so the document serializes directly to `openapi.json`.
//!
//! <https://spec.openapis.org/oas/v3.0.3>

use std::sync::OnceLock;

use http::{Method, StatusCode};
use indexmap::IndexMap;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{DocsError, DocsResult};

/// OpenAPI version written to every document.
pub const OPENAPI_VERSION: &str = "3.0.3";

/// OpenAPI document root object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenApi {
    /// OpenAPI version.
    pub openapi: String,
    /// API metadata.
    pub info: Info,
    /// Available servers.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub servers: Vec<Server>,
    /// API paths and operations.
    #[serde(default)]
    pub paths: IndexMap<String, PathItem>,
    /// Reusable components (schemas, security schemes).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub components: Option<Components>,
    /// Tags for API grouping.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<Tag>,
}

impl Default for OpenApi {
    fn default() -> Self {
        Self::new("API", "1.0.0")
    }
}

impl OpenApi {
    /// Creates an empty document.
    #[must_use]
    pub fn new(title: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            openapi: OPENAPI_VERSION.to_string(),
            info: Info {
                title: title.into(),
                version: version.into(),
                description: None,
            },
            servers: Vec::new(),
            paths: IndexMap::new(),
            components: None,
            tags: Vec::new(),
        }
    }

    /// Adds a server entry.
    pub fn add_server(&mut self, url: impl Into<String>) {
        self.servers.push(Server {
            url: url.into(),
            description: None,
        });
    }

    /// Adds a document-level tag unless one with the same name exists.
    pub fn add_tag(&mut self, name: impl Into<String>) {
        let name = name.into();
        if self.tags.iter().all(|t| t.name != name) {
            self.tags.push(Tag {
                name,
                description: None,
            });
        }
    }

    /// Registers a security scheme under `key`.
    pub fn add_security_scheme(&mut self, key: impl Into<String>, scheme: SecurityScheme) {
        self.components_mut()
            .security_schemes
            .insert(key.into(), scheme);
    }

    /// Registers a reusable schema under `name`.
    pub fn add_schema(&mut self, name: impl Into<String>, schema: Schema) {
        self.components_mut().schemas.insert(name.into(), schema);
    }

    /// Components, created on first use.
    pub fn components_mut(&mut self) -> &mut Components {
        self.components.get_or_insert_with(Components::default)
    }

    /// Adds an operation at `path`.
    ///
    /// Fails if the method already has an operation at this path, if the
    /// method has no OpenAPI slot, or if the `{placeholders}` in `path` do
    /// not match the operation's path parameters one-to-one.
    pub fn add_operation(
        &mut self,
        method: &Method,
        path: &str,
        operation: Operation,
    ) -> DocsResult<()> {
        check_path_parameters(method, path, &operation)?;
        let item = self.paths.entry(path.to_string()).or_default();
        let slot = item
            .slot_mut(method)
            .ok_or_else(|| DocsError::UnsupportedMethod {
                method: method.to_string(),
                path: path.to_string(),
            })?;
        if slot.is_some() {
            return Err(DocsError::DuplicateOperation {
                method: method.to_string(),
                path: path.to_string(),
            });
        }
        *slot = Some(operation);
        Ok(())
    }

    /// Looks up the operation for `method` at `path`.
    pub fn operation(&self, method: &Method, path: &str) -> Option<&Operation> {
        self.paths.get(path)?.slot(method)?.as_ref()
    }

    /// Serializes the document as compact JSON.
    pub fn to_json(&self) -> DocsResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Serializes the document as indented JSON.
    pub fn to_json_pretty(&self) -> DocsResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

fn placeholder_regex() -> &'static Regex {
    static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();
    PLACEHOLDER.get_or_init(|| Regex::new(r"\{([^}]+)\}").expect("valid regex"))
}

/// Names of the `{placeholders}` in an OpenAPI path template.
pub fn path_placeholders(path: &str) -> Vec<String> {
    placeholder_regex()
        .captures_iter(path)
        .filter_map(|cap| cap.get(1))
        .map(|m| m.as_str().to_string())
        .collect()
}

fn check_path_parameters(method: &Method, path: &str, operation: &Operation) -> DocsResult<()> {
    let placeholders = path_placeholders(path);
    let declared: Vec<&str> = operation
        .parameters
        .iter()
        .filter(|p| p.location == ParameterIn::Path)
        .map(|p| p.name.as_str())
        .collect();

    let missing: Vec<String> = placeholders
        .iter()
        .filter(|name| !declared.contains(&name.as_str()))
        .cloned()
        .collect();
    let undeclared: Vec<String> = declared
        .iter()
        .filter(|name| !placeholders.iter().any(|p| p == *name))
        .map(ToString::to_string)
        .collect();

    if missing.is_empty() && undeclared.is_empty() {
        Ok(())
    } else {
        Err(DocsError::PathParameterMismatch {
            method: method.to_string(),
            path: path.to_string(),
            missing,
            undeclared,
        })
    }
}

/// API metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Info {
    /// API title.
    pub title: String,
    /// API version.
    pub version: String,
    /// API description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Server information.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Server {
    /// Server URL.
    pub url: String,
    /// Server description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Operations available on a single path.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PathItem {
    /// GET operation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub get: Option<Operation>,
    /// PUT operation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub put: Option<Operation>,
    /// POST operation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post: Option<Operation>,
    /// DELETE operation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delete: Option<Operation>,
    /// OPTIONS operation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Operation>,
    /// HEAD operation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub head: Option<Operation>,
    /// PATCH operation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patch: Option<Operation>,
    /// TRACE operation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trace: Option<Operation>,
}

impl PathItem {
    /// The slot for `method`, or `None` for methods OpenAPI has no field for.
    pub fn slot(&self, method: &Method) -> Option<&Option<Operation>> {
        Some(match *method {
            Method::GET => &self.get,
            Method::PUT => &self.put,
            Method::POST => &self.post,
            Method::DELETE => &self.delete,
            Method::OPTIONS => &self.options,
            Method::HEAD => &self.head,
            Method::PATCH => &self.patch,
            Method::TRACE => &self.trace,
            _ => return None,
        })
    }

    /// Mutable form of [`slot`](Self::slot).
    pub fn slot_mut(&mut self, method: &Method) -> Option<&mut Option<Operation>> {
        Some(match *method {
            Method::GET => &mut self.get,
            Method::PUT => &mut self.put,
            Method::POST => &mut self.post,
            Method::DELETE => &mut self.delete,
            Method::OPTIONS => &mut self.options,
            Method::HEAD => &mut self.head,
            Method::PATCH => &mut self.patch,
            Method::TRACE => &mut self.trace,
            _ => return None,
        })
    }
}

/// An API operation (endpoint).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    /// Unique operation identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[serde(rename = "operationId")]
    pub operation_id: Option<String>,
    /// Short summary.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    /// Full description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Tags for grouping.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    /// Whether deprecated.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub deprecated: bool,
    /// Parameters.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<Parameter>,
    /// Request body.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[serde(rename = "requestBody")]
    pub request_body: Option<RequestBody>,
    /// Responses keyed by status code.
    pub responses: IndexMap<String, Response>,
    /// Security requirements.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub security: Vec<SecurityRequirement>,
}

impl Operation {
    /// Adds a security requirement on the scheme `key` with no scopes.
    pub fn add_security(&mut self, key: impl Into<String>) {
        let mut requirement = SecurityRequirement::new();
        requirement.insert(key.into(), Vec::new());
        self.security.push(requirement);
    }

    /// Sets the response for `status`, replacing any previous one.
    pub fn set_response(&mut self, status: StatusCode, response: Response) {
        self.responses.insert(status.as_str().to_string(), response);
    }

    /// Adds tags not already present.
    pub fn add_tags<I, S>(&mut self, tags: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for tag in tags {
            let tag = tag.into();
            if !self.tags.contains(&tag) {
                self.tags.push(tag);
            }
        }
    }
}

/// Parameter location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterIn {
    /// Query string parameter.
    Query,
    /// URL path parameter.
    Path,
    /// HTTP header.
    Header,
    /// Cookie.
    Cookie,
}

/// An operation parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    /// Parameter name.
    pub name: String,
    /// Parameter location.
    #[serde(rename = "in")]
    pub location: ParameterIn,
    /// Description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Whether required.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub required: bool,
    /// Whether deprecated.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub deprecated: bool,
    /// Parameter schema.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<Schema>,
}

/// Request body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestBody {
    /// Description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Whether required.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub required: bool,
    /// Content by media type.
    pub content: IndexMap<String, MediaType>,
}

/// Media type content.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MediaType {
    /// Schema for this media type.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<Schema>,
}

/// Response definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    /// Description (required by OpenAPI).
    pub description: String,
    /// Response headers.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub headers: IndexMap<String, Header>,
    /// Response content by media type.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub content: IndexMap<String, MediaType>,
}

impl Response {
    /// A JSON response described by `schema`.
    #[must_use]
    pub fn json(description: impl Into<String>, schema: Schema) -> Self {
        let mut content = IndexMap::new();
        content.insert(
            "application/json".to_string(),
            MediaType {
                schema: Some(schema),
            },
        );
        Self {
            description: description.into(),
            headers: IndexMap::new(),
            content,
        }
    }
}

/// Response header.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Header {
    /// Description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Header schema.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<Schema>,
}

/// Reusable components.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Components {
    /// Reusable schemas.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub schemas: IndexMap<String, Schema>,
    /// Security schemes.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    #[serde(rename = "securitySchemes")]
    pub security_schemes: IndexMap<String, SecurityScheme>,
}

/// Where an API key is sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiKeyLocation {
    /// Query string.
    Query,
    /// Request header.
    Header,
    /// Cookie.
    Cookie,
}

impl ApiKeyLocation {
    fn as_str(self) -> &'static str {
        match self {
            Self::Query => "query",
            Self::Header => "header",
            Self::Cookie => "cookie",
        }
    }
}

/// Security scheme.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SecurityScheme {
    /// Security scheme type.
    #[serde(rename = "type")]
    pub scheme_type: String,
    /// Description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// HTTP auth scheme name (for type=http).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheme: Option<String>,
    /// Bearer token format.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[serde(rename = "bearerFormat")]
    pub bearer_format: Option<String>,
    /// API key location (for type=apiKey).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[serde(rename = "in")]
    pub location: Option<String>,
    /// API key name (for type=apiKey).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl SecurityScheme {
    /// HTTP authentication with the given scheme, e.g. `bearer` or `basic`.
    #[must_use]
    pub fn http(scheme: impl Into<String>) -> Self {
        Self {
            scheme_type: "http".to_string(),
            description: None,
            scheme: Some(scheme.into()),
            bearer_format: None,
            location: None,
            name: None,
        }
    }

    /// An API key carried in a header, query parameter or cookie named `name`.
    #[must_use]
    pub fn api_key(name: impl Into<String>, location: ApiKeyLocation) -> Self {
        Self {
            scheme_type: "apiKey".to_string(),
            description: None,
            scheme: None,
            bearer_format: None,
            location: Some(location.as_str().to_string()),
            name: Some(name.into()),
        }
    }
}

/// Security requirement: scheme name to required scopes.
pub type SecurityRequirement = IndexMap<String, Vec<String>>;

/// API tag for grouping operations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    /// Tag name.
    pub name: String,
    /// Description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// JSON Schema type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaType {
    /// String type.
    String,
    /// Number type.
    Number,
    /// Integer type.
    Integer,
    /// Boolean type.
    Boolean,
    /// Array type.
    Array,
    /// Object type.
    Object,
}

/// JSON Schema definition (OpenAPI 3.0 dialect).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    /// Schema type.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[serde(rename = "type")]
    pub schema_type: Option<SchemaType>,
    /// Schema format (e.g., "date-time", "email").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    /// Title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Reference to another schema.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[serde(rename = "$ref")]
    pub reference: Option<String>,
    /// Object properties.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub properties: IndexMap<String, Schema>,
    /// Required properties.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,
    /// Map value schema.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[serde(rename = "additionalProperties")]
    pub additional_properties: Option<Box<Schema>>,
    /// Array item schema.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<Schema>>,
    /// Enum values.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    #[serde(rename = "enum")]
    pub enum_values: Vec<serde_json::Value>,
    /// Minimum value (for numbers).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum: Option<f64>,
    /// Maximum value (for numbers).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maximum: Option<f64>,
    /// Minimum length (for strings).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[serde(rename = "minLength")]
    pub min_length: Option<u64>,
    /// Maximum length (for strings).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[serde(rename = "maxLength")]
    pub max_length: Option<u64>,
    /// Minimum item count (for arrays).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[serde(rename = "minItems")]
    pub min_items: Option<u64>,
    /// Maximum item count (for arrays).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[serde(rename = "maxItems")]
    pub max_items: Option<u64>,
    /// Pattern regex (for strings).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    /// Default value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<serde_json::Value>,
    /// Example value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example: Option<serde_json::Value>,
    /// Whether nullable.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub nullable: bool,
    /// Whether deprecated.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub deprecated: bool,
}

impl Schema {
    /// Schema of the given type.
    #[must_use]
    pub fn of(schema_type: SchemaType) -> Self {
        Self {
            schema_type: Some(schema_type),
            ..Default::default()
        }
    }

    /// Create a string schema.
    #[must_use]
    pub fn string() -> Self {
        Self::of(SchemaType::String)
    }

    /// Create an integer schema.
    #[must_use]
    pub fn integer() -> Self {
        Self::of(SchemaType::Integer)
    }

    /// Create an array schema with the given item schema.
    #[must_use]
    pub fn array(items: Schema) -> Self {
        Self {
            schema_type: Some(SchemaType::Array),
            items: Some(Box::new(items)),
            ..Default::default()
        }
    }

    /// Create an object schema.
    #[must_use]
    pub fn object() -> Self {
        Self::of(SchemaType::Object)
    }

    /// Create a reference to `#/components/schemas/<name>`.
    #[must_use]
    pub fn component(name: &str) -> Self {
        Self {
            reference: Some(format!("#/components/schemas/{name}")),
            ..Default::default()
        }
    }

    /// Add a description.
    #[must_use]
    pub fn with_description(mut self, desc: impl Into<String>) -> Self {
        self.description = Some(desc.into());
        self
    }

    /// Add a property to an object schema.
    #[must_use]
    pub fn property(mut self, name: impl Into<String>, schema: Schema) -> Self {
        self.properties.insert(name.into(), schema);
        self
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn operation_with_path_params(names: &[&str]) -> Operation {
        Operation {
            parameters: names
                .iter()
                .map(|name| Parameter {
                    name: (*name).to_string(),
                    location: ParameterIn::Path,
                    description: None,
                    required: true,
                    deprecated: false,
                    schema: Some(Schema::string()),
                })
                .collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_new_document() {
        let doc = OpenApi::new("Shop", "2.0.0");
        assert_eq!(doc.openapi, "3.0.3");
        assert_eq!(
            serde_json::to_value(&doc).unwrap(),
            json!({
                "openapi": "3.0.3",
                "info": {"title": "Shop", "version": "2.0.0"},
                "paths": {}
            })
        );
    }

    #[test]
    fn test_add_operation() {
        let mut doc = OpenApi::default();
        doc.add_operation(&Method::GET, "/users/{id}", operation_with_path_params(&["id"]))
            .unwrap();
        doc.add_operation(&Method::DELETE, "/users/{id}", operation_with_path_params(&["id"]))
            .unwrap();

        assert_eq!(doc.paths.len(), 1);
        assert!(doc.operation(&Method::GET, "/users/{id}").is_some());
        assert!(doc.operation(&Method::POST, "/users/{id}").is_none());
    }

    #[test]
    fn test_duplicate_operation_is_rejected() {
        let mut doc = OpenApi::default();
        doc.add_operation(&Method::GET, "/ping", Operation::default())
            .unwrap();
        let err = doc
            .add_operation(&Method::GET, "/ping", Operation::default())
            .unwrap_err();
        assert!(matches!(err, DocsError::DuplicateOperation { .. }));
    }

    #[test]
    fn test_path_parameter_mismatch() {
        let mut doc = OpenApi::default();
        let err = doc
            .add_operation(&Method::GET, "/users/{id}", operation_with_path_params(&["uid"]))
            .unwrap_err();
        match err {
            DocsError::PathParameterMismatch {
                missing, undeclared, ..
            } => {
                assert_eq!(missing, ["id"]);
                assert_eq!(undeclared, ["uid"]);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(doc.paths.is_empty());
    }

    #[test]
    fn test_unsupported_method() {
        let mut doc = OpenApi::default();
        let method = Method::from_bytes(b"PURGE").unwrap();
        let err = doc
            .add_operation(&method, "/cache", Operation::default())
            .unwrap_err();
        assert!(matches!(err, DocsError::UnsupportedMethod { .. }));
    }

    #[test]
    fn test_path_placeholders() {
        assert_eq!(path_placeholders("/a/{x}/b/{y}"), ["x", "y"]);
        assert!(path_placeholders("/plain").is_empty());
    }

    #[test]
    fn test_security_schemes() {
        let mut doc = OpenApi::default();
        doc.add_security_scheme("bearer", SecurityScheme::http("bearer"));
        doc.add_security_scheme("key", SecurityScheme::api_key("X-Api-Key", ApiKeyLocation::Header));

        let value = serde_json::to_value(&doc).unwrap();
        assert_eq!(
            value["components"]["securitySchemes"],
            json!({
                "bearer": {"type": "http", "scheme": "bearer"},
                "key": {"type": "apiKey", "in": "header", "name": "X-Api-Key"}
            })
        );
    }

    #[test]
    fn test_tags_are_unique() {
        let mut doc = OpenApi::default();
        doc.add_tag("users");
        doc.add_tag("users");
        doc.add_tag("orders");
        assert_eq!(doc.tags.len(), 2);

        let mut op = Operation::default();
        op.add_tags(["a", "b", "a"]);
        assert_eq!(op.tags, ["a", "b"]);
    }

    #[test]
    fn test_schema_serialization() {
        let schema = Schema {
            min_items: Some(1),
            nullable: true,
            ..Schema::array(Schema::string())
        };
        assert_eq!(
            serde_json::to_value(&schema).unwrap(),
            json!({"type": "array", "items": {"type": "string"}, "minItems": 1, "nullable": true})
        );
    }
}
