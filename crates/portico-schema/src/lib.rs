//! # Portico Schema
//!
//! Static descriptions of request and response structs, and the
//! validation pipeline built on them.
//!
//! - [`Shape`] / [`FieldDef`] / [`TypeDescriptor`] - what a struct looks like
//! - [`project`] - one location's view of a struct value
//! - [`LocationSchema`] - the schema of the fields bound from one location
//! - [`validate`] - checks all seven locations with `jsonschema`, failing fast
//! - [`ValidatorError`] - the 400 error with field provenance
//!
//! Shapes are usually derived:
//!
//! ```ignore
//! #[derive(Serialize, Deserialize, Describe)]
//! struct LoginInput {
//!     #[param(json = "username", min_length = 3, required)]
//!     username: String,
//!     #[param(header = "X-Request-Id")]
//!     request_id: Option<String>,
//! }
//! ```

#![doc(html_root_url = "https://docs.rs/portico-schema/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod error;
mod file;
mod project;
mod schema;
mod shape;
mod types;
mod validate;
pub mod wire;

pub use error::{Cause, ValidatorError};
pub use file::{FileSlots, FormFile};
pub use project::{project, project_value};
pub use schema::{LocationSchema, Property};
pub use shape::{Constraints, Describe, FieldDef, Shape};
pub use types::{Empty, FieldType, TypeDescriptor, TypeInfo};
pub use validate::{validate, validate_location, validate_value};

pub use portico_core::ParamLocation;
