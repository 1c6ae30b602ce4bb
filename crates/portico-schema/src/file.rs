//! Uploaded files.
//!
//! File contents never pass through `serde_json::Value`. While a request is
//! bound, the binder parks the uploaded bytes in a thread-local slot table
//! and puts a slot reference into the JSON document instead;
//! [`FormFile`]'s `Deserialize` impl claims the bytes back.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;

use bytes::Bytes;
use serde::de::{self, Deserializer};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

thread_local! {
    static SLOTS: RefCell<HashMap<String, Bytes>> = RefCell::new(HashMap::new());
}

/// An uploaded `multipart/form-data` file.
///
/// Serializes as `{"filename", "contentType", "size"}`, or `null` when no
/// file was uploaded.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct FormFile {
    filename: Option<String>,
    content_type: Option<String>,
    data: Bytes,
}

impl FormFile {
    /// Creates a file from its parts.
    pub fn new(filename: Option<String>, content_type: Option<String>, data: Bytes) -> Self {
        Self {
            filename,
            content_type,
            data,
        }
    }

    /// Client-supplied file name.
    pub fn filename(&self) -> Option<&str> {
        self.filename.as_deref()
    }

    /// Declared content type of the part.
    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    /// File contents.
    pub fn data(&self) -> &Bytes {
        &self.data
    }

    /// Consumes the file and returns its contents.
    pub fn into_data(self) -> Bytes {
        self.data
    }

    /// Size in bytes.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// True if no file was uploaded.
    pub fn is_empty(&self) -> bool {
        self.filename.is_none() && self.data.is_empty()
    }
}

impl fmt::Debug for FormFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormFile")
            .field("filename", &self.filename)
            .field("content_type", &self.content_type)
            .field("len", &self.data.len())
            .finish()
    }
}

impl Serialize for FormFile {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.is_empty() {
            return serializer.serialize_none();
        }
        let mut map = serializer.serialize_map(Some(3))?;
        map.serialize_entry("filename", &self.filename)?;
        map.serialize_entry("contentType", &self.content_type)?;
        map.serialize_entry("size", &self.data.len())?;
        map.end()
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct FileRef {
    #[serde(default)]
    filename: Option<String>,
    #[serde(default)]
    content_type: Option<String>,
    #[serde(default)]
    slot: Option<String>,
}

impl<'de> Deserialize<'de> for FormFile {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let Some(file) = Option::<FileRef>::deserialize(deserializer)? else {
            return Ok(Self::default());
        };
        let data = match file.slot {
            Some(slot) => SLOTS
                .with(|slots| slots.borrow_mut().remove(&slot))
                .ok_or_else(|| de::Error::custom(format!("file slot {slot} is not bound")))?,
            None => Bytes::new(),
        };
        Ok(Self {
            filename: file.filename,
            content_type: file.content_type,
            data,
        })
    }
}

/// Slot table used while deserializing a request that carries files.
#[derive(Debug, Default)]
pub struct FileSlots {
    files: Vec<(String, Bytes)>,
}

impl FileSlots {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parks a file and returns the JSON reference that stands in for it.
    pub fn park(
        &mut self,
        filename: Option<String>,
        content_type: Option<String>,
        data: Bytes,
    ) -> Value {
        let slot = format!("file-{}", self.files.len());
        let size = data.len();
        self.files.push((slot.clone(), data));
        json!({
            "filename": filename,
            "contentType": content_type,
            "size": size,
            "slot": slot,
        })
    }

    /// True if nothing was parked.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Runs `f` with the parked files claimable by [`FormFile`].
    ///
    /// Unclaimed files are dropped when `f` returns.
    pub fn scope<R>(self, f: impl FnOnce() -> R) -> R {
        SLOTS.with(|slots| slots.borrow_mut().extend(self.files));
        let result = f();
        SLOTS.with(|slots| slots.borrow_mut().clear());
        result
    }
}
