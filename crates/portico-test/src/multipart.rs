//! `multipart/form-data` bodies for test requests.

use bytes::{BufMut, Bytes, BytesMut};
use uuid::Uuid;

/// A multipart form under construction.
///
/// ```ignore
/// let form = Multipart::new()
///     .text("title", "Holiday")
///     .file("photo", "beach.png", "image/png", png_bytes);
///
/// let response = client.post("/upload").multipart(form).send().await;
/// ```
#[derive(Debug, Clone)]
#[must_use]
pub struct Multipart {
    boundary: String,
    parts: Vec<Part>,
}

#[derive(Debug, Clone)]
struct Part {
    name: String,
    file: Option<(String, String)>,
    data: Bytes,
}

impl Multipart {
    /// Creates an empty form with a random boundary.
    pub fn new() -> Self {
        Self::with_boundary(format!("portico-{}", Uuid::now_v7().simple()))
    }

    /// Creates an empty form with a fixed boundary.
    pub fn with_boundary(boundary: impl Into<String>) -> Self {
        Self {
            boundary: boundary.into(),
            parts: Vec::new(),
        }
    }

    /// Adds a text field.
    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.parts.push(Part {
            name: name.into(),
            file: None,
            data: Bytes::from(value.into()),
        });
        self
    }

    /// Adds a file field.
    pub fn file(
        mut self,
        name: impl Into<String>,
        filename: impl Into<String>,
        content_type: impl Into<String>,
        data: impl Into<Bytes>,
    ) -> Self {
        self.parts.push(Part {
            name: name.into(),
            file: Some((filename.into(), content_type.into())),
            data: data.into(),
        });
        self
    }

    /// The boundary separating parts.
    pub fn boundary(&self) -> &str {
        &self.boundary
    }

    /// Value for the `Content-Type` header.
    pub fn content_type(&self) -> String {
        format!("multipart/form-data; boundary={}", self.boundary)
    }

    /// Encodes the form body.
    pub fn to_bytes(&self) -> Bytes {
        let mut out = BytesMut::new();
        for part in &self.parts {
            out.put_slice(format!("--{}\r\n", self.boundary).as_bytes());
            match &part.file {
                Some((filename, content_type)) => {
                    out.put_slice(
                        format!(
                            "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n\
                             Content-Type: {}\r\n\r\n",
                            part.name, filename, content_type
                        )
                        .as_bytes(),
                    );
                }
                None => {
                    out.put_slice(
                        format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", part.name)
                            .as_bytes(),
                    );
                }
            }
            out.put_slice(&part.data);
            out.put_slice(b"\r\n");
        }
        out.put_slice(format!("--{}--\r\n", self.boundary).as_bytes());
        out.freeze()
    }
}

impl Default for Multipart {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encoding() {
        let form = Multipart::with_boundary("XYZ")
            .text("title", "hi")
            .file("doc", "a.txt", "text/plain", "abc");

        assert_eq!(form.content_type(), "multipart/form-data; boundary=XYZ");
        assert_eq!(
            form.to_bytes(),
            Bytes::from(
                "--XYZ\r\nContent-Disposition: form-data; name=\"title\"\r\n\r\nhi\r\n\
                 --XYZ\r\nContent-Disposition: form-data; name=\"doc\"; filename=\"a.txt\"\r\n\
                 Content-Type: text/plain\r\n\r\nabc\r\n--XYZ--\r\n"
            )
        );
    }

    #[test]
    fn test_random_boundaries_differ() {
        assert_ne!(Multipart::new().boundary(), Multipart::new().boundary());
    }
}
