//! # Portico Extract
//!
//! Moves data between HTTP messages and handler structs.
//!
//! - [`bind`] builds an input struct from a request, reading each field from
//!   the location it is tagged for
//! - [`project_output`] turns an output struct into response headers,
//!   cookies and a JSON body
//!
//! | Location | Source |
//! |----------|--------|
//! | `path` | matched route parameters |
//! | `query` | query string, repeated keys for sequences |
//! | `header` | request headers, case-insensitive |
//! | `cookie` | `Cookie` headers |
//! | `json` | `application/json` body |
//! | `form` | `application/x-www-form-urlencoded` body |
//! | `formData` | `multipart/form-data` body, files included |

mod binder;
mod context;
mod cookie;
mod form;
mod multipart;
mod output;

pub use binder::{bind, BindConfig};
pub use context::{RequestParts, RequestPartsBuilder};
pub use cookie::{render_set_cookie, Cookies};
pub use form::{parse_urlencoded, Values};
pub use multipart::{read_multipart, MultipartConfig, MultipartData};
pub use output::{project_output, OutputParts};
