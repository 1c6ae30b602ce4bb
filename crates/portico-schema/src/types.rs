//! Static type descriptors for field values.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use crate::file::FormFile;
use crate::shape::{Describe, Shape};

/// The JSON-level kind of a field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldType {
    /// UTF-8 string.
    String,
    /// Whole number.
    Integer,
    /// Any JSON number.
    Number,
    /// `true` / `false`.
    Boolean,
    /// Homogeneous sequence.
    Array(Box<TypeDescriptor>),
    /// String-keyed map with homogeneous values.
    Map(Box<TypeDescriptor>),
    /// Nested struct with its own shape.
    Object(Box<Shape>),
    /// Uploaded multipart file.
    File,
    /// Any JSON value.
    Any,
}

impl FieldType {
    /// JSON schema type name.
    pub const fn json_type(&self) -> &'static str {
        match self {
            Self::String | Self::File => "string",
            Self::Integer => "integer",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Array(_) => "array",
            Self::Map(_) | Self::Object(_) => "object",
            Self::Any => "any",
        }
    }
}

/// A field's type together with nullability and an optional format hint.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeDescriptor {
    /// Kind of value.
    pub kind: FieldType,
    /// Whether `null` is accepted (`Option<T>`).
    pub nullable: bool,
    /// Format implied by the Rust type, e.g. `int64` or `uuid`.
    pub format: Option<&'static str>,
}

impl TypeDescriptor {
    /// Non-nullable descriptor of the given kind.
    pub const fn new(kind: FieldType) -> Self {
        Self {
            kind,
            nullable: false,
            format: None,
        }
    }

    /// Adds a format hint.
    pub const fn with_format(mut self, format: &'static str) -> Self {
        self.format = Some(format);
        self
    }

    /// Marks the descriptor nullable.
    pub const fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// Descriptor for a nested struct.
    pub fn object(shape: Shape) -> Self {
        Self::new(FieldType::Object(Box::new(shape)))
    }

    /// Descriptor for a sequence of `item`.
    pub fn array(item: TypeDescriptor) -> Self {
        Self::new(FieldType::Array(Box::new(item)))
    }

    /// Descriptor for a string-keyed map of `value`.
    pub fn map(value: TypeDescriptor) -> Self {
        Self::new(FieldType::Map(Box::new(value)))
    }

    /// Returns the nested shape for object types.
    pub fn shape(&self) -> Option<&Shape> {
        match &self.kind {
            FieldType::Object(shape) => Some(shape),
            _ => None,
        }
    }

    /// Returns the item descriptor for array types.
    pub fn item(&self) -> Option<&TypeDescriptor> {
        match &self.kind {
            FieldType::Array(item) => Some(item),
            _ => None,
        }
    }
}

/// Types that can describe their JSON representation.
///
/// Implemented for primitives, strings, collections, `Option`, `Box`,
/// `serde_json::Value`, common date/uuid types and [`FormFile`].
/// `#[derive(Describe)]` also implements it for the annotated struct.
pub trait TypeInfo {
    /// Describes the type.
    fn type_info() -> TypeDescriptor;
}

macro_rules! scalar_type_info {
    ($kind:ident, $format:expr => $($ty:ty),+) => {
        $(
            impl TypeInfo for $ty {
                fn type_info() -> TypeDescriptor {
                    let format: Option<&'static str> = $format;
                    TypeDescriptor {
                        kind: FieldType::$kind,
                        nullable: false,
                        format,
                    }
                }
            }
        )+
    };
}

scalar_type_info!(String, None => String, str, std::path::PathBuf);
scalar_type_info!(Boolean, None => bool);
scalar_type_info!(Integer, Some("int32") => i8, i16, i32, u8, u16, u32);
scalar_type_info!(Integer, Some("int64") => i64, u64, i128, u128, isize, usize);
scalar_type_info!(Number, Some("float") => f32);
scalar_type_info!(Number, Some("double") => f64);
scalar_type_info!(String, Some("uuid") => uuid::Uuid);
scalar_type_info!(String, Some("date") => chrono::NaiveDate);
scalar_type_info!(String, Some("ipv4") => std::net::Ipv4Addr);
scalar_type_info!(String, Some("ipv6") => std::net::Ipv6Addr);
scalar_type_info!(Any, None => serde_json::Value);
scalar_type_info!(File, Some("binary") => FormFile);

impl<Tz: chrono::TimeZone> TypeInfo for chrono::DateTime<Tz> {
    fn type_info() -> TypeDescriptor {
        TypeDescriptor::new(FieldType::String).with_format("date-time")
    }
}

impl<T: TypeInfo> TypeInfo for Option<T> {
    fn type_info() -> TypeDescriptor {
        T::type_info().nullable()
    }
}

impl<T: TypeInfo + ?Sized> TypeInfo for Box<T> {
    fn type_info() -> TypeDescriptor {
        T::type_info()
    }
}

impl<T: TypeInfo + ?Sized> TypeInfo for &T {
    fn type_info() -> TypeDescriptor {
        T::type_info()
    }
}

impl<T: TypeInfo> TypeInfo for Vec<T> {
    fn type_info() -> TypeDescriptor {
        TypeDescriptor::array(T::type_info())
    }
}

impl<T: TypeInfo> TypeInfo for [T] {
    fn type_info() -> TypeDescriptor {
        TypeDescriptor::array(T::type_info())
    }
}

impl<T: TypeInfo, S> TypeInfo for HashSet<T, S> {
    fn type_info() -> TypeDescriptor {
        TypeDescriptor::array(T::type_info())
    }
}

impl<T: TypeInfo> TypeInfo for BTreeSet<T> {
    fn type_info() -> TypeDescriptor {
        TypeDescriptor::array(T::type_info())
    }
}

impl<V: TypeInfo, S> TypeInfo for HashMap<String, V, S> {
    fn type_info() -> TypeDescriptor {
        TypeDescriptor::map(V::type_info())
    }
}

impl<V: TypeInfo> TypeInfo for BTreeMap<String, V> {
    fn type_info() -> TypeDescriptor {
        TypeDescriptor::map(V::type_info())
    }
}

impl<V: TypeInfo, S> TypeInfo for indexmap::IndexMap<String, V, S> {
    fn type_info() -> TypeDescriptor {
        TypeDescriptor::map(V::type_info())
    }
}

/// A request or response with no fields.
///
/// Serializes as `{}` and accepts any JSON object.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Empty {}

impl Describe for Empty {
    fn describe() -> Shape {
        Shape::new("Empty")
    }
}

impl TypeInfo for Empty {
    fn type_info() -> TypeDescriptor {
        TypeDescriptor::object(Self::describe())
    }
}
