//! `multipart/form-data` bodies.

use std::collections::HashMap;
use std::convert::Infallible;

use bytes::Bytes;
use http::StatusCode;
use portico_core::HttpError;
use portico_schema::FormFile;

use crate::form::Values;

/// Default maximum size of one part (10 MB).
pub const DEFAULT_MAX_FIELD_SIZE: u64 = 10 * 1024 * 1024;

/// Default maximum number of parts.
pub const DEFAULT_MAX_FIELDS: usize = 100;

/// Limits applied while reading a multipart body.
#[derive(Debug, Clone)]
pub struct MultipartConfig {
    /// Maximum size of one part in bytes.
    pub max_field_size: u64,
    /// Maximum number of parts.
    pub max_fields: usize,
}

impl Default for MultipartConfig {
    fn default() -> Self {
        Self {
            max_field_size: DEFAULT_MAX_FIELD_SIZE,
            max_fields: DEFAULT_MAX_FIELDS,
        }
    }
}

impl MultipartConfig {
    /// Sets the per-part size limit.
    #[must_use]
    pub fn max_field_size(mut self, size: u64) -> Self {
        self.max_field_size = size;
        self
    }

    /// Sets the part count limit.
    #[must_use]
    pub fn max_fields(mut self, count: usize) -> Self {
        self.max_fields = count;
        self
    }
}

/// A parsed multipart body: text parts and file parts by field name.
#[derive(Debug, Default)]
pub struct MultipartData {
    /// Parts without a filename.
    pub values: Values,
    /// Parts with a filename.
    pub files: HashMap<String, Vec<FormFile>>,
}

/// Reads a whole multipart body.
pub async fn read_multipart(
    content_type: &str,
    body: Bytes,
    config: &MultipartConfig,
) -> Result<MultipartData, HttpError> {
    let boundary = multer::parse_boundary(content_type)
        .map_err(|_| HttpError::bad_request("missing or invalid multipart boundary"))?;
    let constraints = multer::Constraints::new()
        .size_limit(multer::SizeLimit::new().per_field(config.max_field_size));
    let stream = futures_util::stream::once(async move { Ok::<_, Infallible>(body) });
    let mut multipart = multer::Multipart::with_constraints(stream, boundary, constraints);

    let mut data = MultipartData::default();
    let mut count = 0usize;
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        count += 1;
        if count > config.max_fields {
            return Err(HttpError::bad_request(format!(
                "too many multipart fields (max {})",
                config.max_fields
            )));
        }
        let Some(name) = field.name().map(ToString::to_string) else {
            continue;
        };
        let filename = field.file_name().map(ToString::to_string);
        let content_type = field.content_type().map(ToString::to_string);
        let bytes = field.bytes().await.map_err(multipart_error)?;

        if filename.is_some() {
            data.files
                .entry(name)
                .or_default()
                .push(FormFile::new(filename, content_type, bytes));
        } else {
            data.values
                .entry(name)
                .or_default()
                .push(String::from_utf8_lossy(&bytes).into_owned());
        }
    }
    Ok(data)
}

fn multipart_error(err: multer::Error) -> HttpError {
    match err {
        multer::Error::FieldSizeExceeded { .. } | multer::Error::StreamSizeExceeded { .. } => {
            HttpError::with_message(StatusCode::PAYLOAD_TOO_LARGE, err.to_string())
        }
        other => HttpError::bad_request(format!("multipart: {other}")),
    }
}
