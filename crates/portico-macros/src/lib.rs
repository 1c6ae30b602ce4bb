//! Procedural macros for Portico.
//!
//! `#[derive(Describe)]` turns an annotated struct into a static shape
//! descriptor: the fields, the locations they are bound from and their
//! validation constraints.
//!
//! # Example
//!
//! ```rust,ignore
//! use portico::prelude::*;
//!
//! #[derive(Serialize, Deserialize, Describe)]
//! struct CreateUser {
//!     #[param(path = "org")]
//!     org: String,
//!     /// Login name.
//!     #[param(json = "username", min_length = 3, max_length = 32, required)]
//!     username: String,
//!     #[param(json = "role", enum = "admin,member", default = "member")]
//!     role: String,
//!     #[param(header = "X-Request-Id", format = "uuid")]
//!     request_id: Option<String>,
//! }
//! ```
//!
//! # Field attributes
//!
//! | key | meaning |
//! |-----|---------|
//! | `path`, `query`, `header`, `cookie`, `json`, `form`, `formData` | bind from that location under the given name; `"-"` excludes |
//! | `embed` | the field is a struct whose fields are merged into the parent |
//! | `skip` | leave the field out of the shape |
//! | `required` | value must be present and non-null |
//! | `min_length`, `max_length` | string length, or item count for sequences |
//! | `minimum`, `maximum` | inclusive numeric bounds |
//! | `pattern`, `format`, `enum`, `default`, `example` | value constraints |
//! | `title`, `description`, `deprecated` | documentation |
//!
//! `#[serde(rename)]`, `#[serde(rename_all)]`, `#[serde(skip)]` and
//! `#[serde(flatten)]` are honoured so the shape matches the serialized form.

mod describe;
mod parse;

use proc_macro::TokenStream;
use syn::{parse_macro_input, DeriveInput};

/// Derives `Describe` and `TypeInfo` for a struct with named fields.
///
/// Container attributes: `#[param(title = "...", description = "...")]`,
/// and `#[param(crate = "path")]` when the schema crate is re-exported
/// under another path.
#[proc_macro_derive(Describe, attributes(param))]
pub fn derive_describe(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    describe::expand_describe(input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}
