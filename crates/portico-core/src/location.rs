//! Request parameter locations.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The part of an HTTP request a field is bound from.
///
/// The declaration order is also the validation order: path parameters are
/// checked first, multipart form data last.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ParamLocation {
    /// Path segment (`/users/{id}`).
    #[serde(rename = "path")]
    Path,
    /// URL query string.
    #[serde(rename = "query")]
    Query,
    /// Request header.
    #[serde(rename = "header")]
    Header,
    /// Request cookie.
    #[serde(rename = "cookie")]
    Cookie,
    /// JSON request body. Its tag name is `json`.
    #[serde(rename = "json")]
    Body,
    /// `application/x-www-form-urlencoded` body.
    #[serde(rename = "form")]
    Form,
    /// `multipart/form-data` body.
    #[serde(rename = "formData")]
    FormData,
}

impl ParamLocation {
    /// All locations in validation order.
    pub const ALL: [ParamLocation; 7] = [
        Self::Path,
        Self::Query,
        Self::Header,
        Self::Cookie,
        Self::Body,
        Self::Form,
        Self::FormData,
    ];

    /// Returns the tag name used in field declarations and error provenance keys.
    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Path => "path",
            Self::Query => "query",
            Self::Header => "header",
            Self::Cookie => "cookie",
            Self::Body => "json",
            Self::Form => "form",
            Self::FormData => "formData",
        }
    }

    /// Returns true for locations that are carried in the request body.
    #[must_use]
    pub const fn is_body(self) -> bool {
        matches!(self, Self::Body | Self::Form | Self::FormData)
    }

    /// Returns true for locations that map to OpenAPI `parameters`.
    #[must_use]
    pub const fn is_parameter(self) -> bool {
        !self.is_body()
    }
}

impl fmt::Display for ParamLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Error returned when parsing an unknown location tag.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown parameter location: {0}")]
pub struct UnknownLocation(pub String);

impl FromStr for ParamLocation {
    type Err = UnknownLocation;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "path" => Ok(Self::Path),
            "query" => Ok(Self::Query),
            "header" => Ok(Self::Header),
            "cookie" => Ok(Self::Cookie),
            "json" | "body" => Ok(Self::Body),
            "form" => Ok(Self::Form),
            "formData" | "form_data" => Ok(Self::FormData),
            other => Err(UnknownLocation(other.to_string())),
        }
    }
}
