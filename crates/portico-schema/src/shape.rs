//! Struct shape descriptors.
//!
//! A [`Shape`] is the static description of a request or response struct:
//! its fields in declaration order, the location tags on each field, the
//! field's type and its validation constraints. Shapes are produced by
//! `#[derive(Describe)]` or built by hand:
//!
//! ```
//! use portico_schema::{FieldDef, Shape, TypeInfo};
//!
//! let shape = Shape::new("LoginInput")
//!     .field(FieldDef::new("username", String::type_info()).json("username").min_length(3).required())
//!     .field(FieldDef::new("trace", Option::<String>::type_info()).header("X-Trace-Id"));
//!
//! assert_eq!(shape.fields.len(), 2);
//! ```

use std::collections::BTreeMap;

use portico_core::ParamLocation;
use serde_json::Value;
use tracing::warn;

use crate::types::{FieldType, TypeDescriptor};
use crate::wire;

/// Types that carry a static [`Shape`].
pub trait Describe {
    /// Returns the shape of `Self`.
    fn describe() -> Shape;
}

/// Description of a struct.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Shape {
    /// Type name, used as the OpenAPI component name.
    pub name: String,
    /// Schema title.
    pub title: Option<String>,
    /// Schema description.
    pub description: Option<String>,
    /// Fields in declaration order.
    pub fields: Vec<FieldDef>,
}

impl Shape {
    /// Creates an empty shape.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Sets the title.
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Sets the description.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Appends a field.
    pub fn field(mut self, field: FieldDef) -> Self {
        self.fields.push(field);
        self
    }

    /// Finds a field by its serde key.
    pub fn field_named(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// True if any field (recursively through embedded fields) is tagged for `location`.
    pub fn has_location(&self, location: ParamLocation) -> bool {
        self.fields.iter().any(|f| {
            f.tag_for(location).is_some()
                || (!f.is_excluded(location)
                    && f.embedded_shape().is_some_and(|s| s.has_location(location)))
        })
    }
}

/// Validation and documentation constraints of a field.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Constraints {
    /// Minimum string length, or minimum item count for sequences.
    pub min_length: Option<usize>,
    /// Maximum string length, or maximum item count for sequences.
    pub max_length: Option<usize>,
    /// Regular expression the whole value must match.
    pub pattern: Option<String>,
    /// Allowed values.
    pub enumeration: Option<Vec<Value>>,
    /// Value applied when the request omits the field.
    pub default: Option<Value>,
    /// Format name (`email`, `uuid`, `date-time`, ...).
    pub format: Option<String>,
    /// Inclusive numeric lower bound.
    pub minimum: Option<f64>,
    /// Inclusive numeric upper bound.
    pub maximum: Option<f64>,
    /// Schema title.
    pub title: Option<String>,
    /// Schema description.
    pub description: Option<String>,
    /// Example value.
    pub example: Option<Value>,
    /// Marks the field deprecated in documentation.
    pub deprecated: bool,
}

/// One struct field.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDef {
    /// Serde key of the field in the struct's serialized form.
    pub name: String,
    /// Tag per location. `"-"` excludes the field from that location.
    pub tags: BTreeMap<ParamLocation, String>,
    /// Value type.
    pub ty: TypeDescriptor,
    /// Constraints.
    pub constraints: Constraints,
    /// Value must be present and non-null.
    pub required: bool,
    /// Embedded substructure, flattened into its parent per location.
    pub embedded: bool,
    /// The embedded struct is `#[serde(flatten)]`ed in the serialized form.
    pub flatten: bool,
}

impl FieldDef {
    /// Creates an untagged field.
    pub fn new(name: impl Into<String>, ty: TypeDescriptor) -> Self {
        Self {
            name: name.into(),
            tags: BTreeMap::new(),
            ty,
            constraints: Constraints::default(),
            required: false,
            embedded: false,
            flatten: false,
        }
    }

    /// Creates an embedded field holding `shape`.
    pub fn embed(name: impl Into<String>, shape: Shape) -> Self {
        Self {
            embedded: true,
            ..Self::new(name, TypeDescriptor::object(shape))
        }
    }

    /// Marks an embedded field as serde-flattened.
    pub fn flatten(mut self) -> Self {
        self.flatten = true;
        self
    }

    /// Tags the field for a location.
    pub fn tag(mut self, location: ParamLocation, name: impl Into<String>) -> Self {
        self.tags.insert(location, name.into());
        self
    }

    /// Tags the field as a path parameter.
    pub fn path(self, name: impl Into<String>) -> Self {
        self.tag(ParamLocation::Path, name)
    }

    /// Tags the field as a query parameter.
    pub fn query(self, name: impl Into<String>) -> Self {
        self.tag(ParamLocation::Query, name)
    }

    /// Tags the field as a header.
    pub fn header(self, name: impl Into<String>) -> Self {
        self.tag(ParamLocation::Header, name)
    }

    /// Tags the field as a cookie.
    pub fn cookie(self, name: impl Into<String>) -> Self {
        self.tag(ParamLocation::Cookie, name)
    }

    /// Tags the field as a JSON body member.
    pub fn json(self, name: impl Into<String>) -> Self {
        self.tag(ParamLocation::Body, name)
    }

    /// Tags the field as an urlencoded form member.
    pub fn form(self, name: impl Into<String>) -> Self {
        self.tag(ParamLocation::Form, name)
    }

    /// Tags the field as a multipart form member.
    pub fn form_data(self, name: impl Into<String>) -> Self {
        self.tag(ParamLocation::FormData, name)
    }

    /// Marks the field required.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Sets `minLength` (`minItems` for sequences).
    pub fn min_length(mut self, n: usize) -> Self {
        self.constraints.min_length = Some(n);
        self
    }

    /// Sets `maxLength` (`maxItems` for sequences).
    pub fn max_length(mut self, n: usize) -> Self {
        self.constraints.max_length = Some(n);
        self
    }

    /// Sets the pattern.
    pub fn pattern(mut self, pattern: impl Into<String>) -> Self {
        self.constraints.pattern = Some(pattern.into());
        self
    }

    /// Sets the allowed values.
    pub fn enum_values(mut self, values: Vec<Value>) -> Self {
        self.constraints.enumeration = Some(values);
        self
    }

    /// Sets the allowed values from a comma-separated literal.
    pub fn enum_literal(self, literal: &str) -> Self {
        let item = self.scalar_type().clone();
        let values = literal
            .split(',')
            .map(|part| self.literal(&item, part.trim()))
            .collect();
        self.enum_values(values)
    }

    /// Sets the default value.
    pub fn default_value(mut self, value: Value) -> Self {
        self.constraints.default = Some(value);
        self
    }

    /// Sets the default from a literal, coerced to the field type.
    pub fn default_literal(self, literal: &str) -> Self {
        let value = self.literal(&self.ty, literal);
        self.default_value(value)
    }

    /// Sets the format.
    pub fn format(mut self, format: impl Into<String>) -> Self {
        self.constraints.format = Some(format.into());
        self
    }

    /// Sets the inclusive minimum.
    pub fn minimum(mut self, n: f64) -> Self {
        self.constraints.minimum = Some(n);
        self
    }

    /// Sets the inclusive maximum.
    pub fn maximum(mut self, n: f64) -> Self {
        self.constraints.maximum = Some(n);
        self
    }

    /// Sets the title.
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.constraints.title = Some(title.into());
        self
    }

    /// Sets the description.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.constraints.description = Some(description.into());
        self
    }

    /// Sets the example from a literal, coerced to the field type.
    pub fn example_literal(mut self, literal: &str) -> Self {
        self.constraints.example = Some(self.literal(&self.ty, literal));
        self
    }

    /// Marks the field deprecated.
    pub fn deprecated(mut self) -> Self {
        self.constraints.deprecated = true;
        self
    }

    /// Returns the usable tag for `location`: present, non-empty and not `-`.
    pub fn tag_for(&self, location: ParamLocation) -> Option<&str> {
        self.tags
            .get(&location)
            .map(String::as_str)
            .filter(|t| !t.is_empty() && *t != "-")
    }

    /// True if the field is explicitly excluded from `location` with `-`.
    pub fn is_excluded(&self, location: ParamLocation) -> bool {
        self.tags.get(&location).is_some_and(|t| t == "-")
    }

    /// Key used in JSON documents: the `json` tag, or the serde key when untagged.
    pub fn wire_name(&self) -> Option<&str> {
        if self.is_excluded(ParamLocation::Body) {
            return None;
        }
        Some(self.tag_for(ParamLocation::Body).unwrap_or(&self.name))
    }

    /// Shape of an embedded field.
    pub fn embedded_shape(&self) -> Option<&Shape> {
        if self.embedded {
            self.ty.shape()
        } else {
            None
        }
    }

    /// True if the field is a struct placeholder that never carries data.
    pub fn is_placeholder(&self) -> bool {
        self.name == "_"
    }

    /// The per-item type for sequences, the field type otherwise.
    pub fn scalar_type(&self) -> &TypeDescriptor {
        match &self.ty.kind {
            FieldType::Array(item) => item,
            _ => &self.ty,
        }
    }

    fn literal(&self, ty: &TypeDescriptor, literal: &str) -> Value {
        wire::parse_literal(ty, literal).unwrap_or_else(|err| {
            warn!(field = %self.name, literal, error = %err, "literal does not match field type");
            Value::String(literal.to_string())
        })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::types::TypeInfo;

    #[test]
    fn test_builder_tags() {
        let field = FieldDef::new("id", i64::type_info()).path("id").json("-");
        assert_eq!(field.tag_for(ParamLocation::Path), Some("id"));
        assert_eq!(field.tag_for(ParamLocation::Body), None);
        assert!(field.is_excluded(ParamLocation::Body));
        assert_eq!(field.wire_name(), None);
    }

    #[test]
    fn test_wire_name_defaults_to_serde_key() {
        let field = FieldDef::new("user_name", String::type_info());
        assert_eq!(field.wire_name(), Some("user_name"));
        let field = field.json("userName");
        assert_eq!(field.wire_name(), Some("userName"));
    }

    #[test]
    fn test_default_literal_is_coerced() {
        let field = FieldDef::new("page", i32::type_info()).default_literal("1");
        assert_eq!(field.constraints.default, Some(json!(1)));

        let field = FieldDef::new("tags", Vec::<String>::type_info()).default_literal("a,b");
        assert_eq!(field.constraints.default, Some(json!(["a", "b"])));
    }

    #[test]
    fn test_bad_literal_falls_back_to_string() {
        let field = FieldDef::new("page", i32::type_info()).default_literal("one");
        assert_eq!(field.constraints.default, Some(json!("one")));
    }

    #[test]
    fn test_enum_literal_uses_item_type() {
        let field = FieldDef::new("levels", Vec::<u8>::type_info()).enum_literal("1, 2,3");
        assert_eq!(field.constraints.enumeration, Some(vec![json!(1), json!(2), json!(3)]));
    }

    #[test]
    fn test_has_location_through_embedding() {
        let inner = Shape::new("Paging").field(FieldDef::new("page", i32::type_info()).query("page"));
        let shape = Shape::new("List").field(FieldDef::embed("paging", inner));
        assert!(shape.has_location(ParamLocation::Query));
        assert!(!shape.has_location(ParamLocation::Body));
    }
}
