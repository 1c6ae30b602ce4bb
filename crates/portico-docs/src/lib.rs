//! # Portico Docs
//!
//! OpenAPI documents for Portico services.
//!
//! This crate provides:
//! - **An OpenAPI 3 model** ([`OpenApi`] and friends) that serializes to
//!   `openapi.json`
//! - **Operation synthesis** ([`synthesize`]) from a handler's input shape
//!   and output type, using the same per-location schemas the validator
//!   enforces
//! - **Swagger UI** ([`SwaggerUi`]) pointing at the served document
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use http::Method;
//! use portico_docs::{synthesize, OpenApi, SwaggerUi};
//! use portico_schema::{Describe, TypeInfo};
//!
//! let mut doc = OpenApi::new("Users", "1.0.0");
//! let operation = synthesize(&GetUser::describe(), &User::type_info());
//! doc.add_operation(&Method::GET, "/users/{id}", operation)?;
//!
//! let html = SwaggerUi::new("/docs/openapi.json").html();
//! ```

#![doc(html_root_url = "https://docs.rs/portico-docs/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod error;
mod openapi;
mod swagger;
mod synth;

pub use error::{DocsError, DocsResult};
pub use openapi::{
    path_placeholders, ApiKeyLocation, Components, Header, Info, MediaType, OpenApi, Operation,
    Parameter, ParameterIn, PathItem, RequestBody, Response, Schema, SchemaType, SecurityRequirement,
    SecurityScheme, Server, Tag, OPENAPI_VERSION,
};
pub use swagger::{DocExpansion, DocsPaths, SwaggerUi, DEFAULT_ASSET_BASE};
pub use synth::{
    error_response, error_response_schema, object_schema, property_schema, schema_of, synthesize,
    ERR_RESPONSE,
};
