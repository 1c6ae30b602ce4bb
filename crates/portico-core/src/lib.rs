//! # Portico Core
//!
//! Foundational types shared by every Portico crate:
//!
//! - [`ParamLocation`] - the seven places a request field can come from
//! - [`ApiError`] / [`Error`] - capability-based handler errors
//! - [`HttpError`] - transport errors raised by the framework itself
//! - [`classify`] - maps any error to a status and an [`ErrResponse`] body

#![doc(html_root_url = "https://docs.rs/portico-core/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod error;
mod location;
mod response;

pub use error::{chain, ApiError, Chain, Error, Fields, HttpCode, HttpError, Result, ResultExt};
pub use location::{ParamLocation, UnknownLocation};
pub use response::{classify, classify_ref, ErrResponse};

pub use http::StatusCode;
