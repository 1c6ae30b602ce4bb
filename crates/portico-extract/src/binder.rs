//! Request binding.
//!
//! The binder builds the serde form of an input struct from a request:
//!
//! 1. every field starts at its declared default, if any;
//! 2. a JSON body object fills fields by wire name;
//! 3. path, query, header, cookie, form and multipart values fill fields
//!    by their location tags, in that order;
//! 4. fields still unset get their type's zero value.
//!
//! An embedded struct tagged for a location is one value there. Every
//! location it has no tag for binds the embedded fields individually, on
//! top of that value.
//!
//! The result is handed to serde. Conversion failures are `400` transport
//! errors; validation runs afterwards, on the bound value.

use http::{HeaderMap, StatusCode};
use portico_core::{Error, HttpError, ParamLocation};
use portico_router::Params;
use portico_schema::wire::{coerce_all, from_wire, zero_value};
use portico_schema::{Describe, FieldDef, FieldType, FileSlots, Shape};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::debug;

use crate::context::RequestParts;
use crate::cookie::Cookies;
use crate::form::{parse_urlencoded, Values};
use crate::multipart::{read_multipart, MultipartConfig, MultipartData};

/// Binder settings.
#[derive(Debug, Clone, Default)]
pub struct BindConfig {
    /// Multipart limits.
    pub multipart: MultipartConfig,
}

/// Binds a request into `T`.
pub async fn bind<T>(parts: &RequestParts, config: &BindConfig) -> Result<T, Error>
where
    T: Describe + DeserializeOwned,
{
    let shape = T::describe();
    let sources = Sources::read(parts, &shape, config).await?;
    let mut slots = FileSlots::new();
    let object = bind_shape(
        &shape,
        &sources,
        &ParamLocation::ALL,
        sources.json.as_ref(),
        None,
        &mut slots,
    )?;

    slots
        .scope(|| serde_json::from_value::<T>(Value::Object(object)))
        .map_err(|e| {
            debug!(error = %e, shape = %shape.name, "bound value does not deserialize");
            HttpError::bad_request(e.to_string()).with_internal(e).into()
        })
}

/// Everything a request offers, decoded once.
struct Sources<'a> {
    path: &'a Params,
    query: Values,
    headers: &'a HeaderMap,
    cookies: Cookies,
    json: Option<Map<String, Value>>,
    form: Values,
    form_data: MultipartData,
}

impl<'a> Sources<'a> {
    async fn read(
        parts: &'a RequestParts,
        shape: &Shape,
        config: &BindConfig,
    ) -> Result<Sources<'a>, HttpError> {
        let mut sources = Sources {
            path: parts.path_params(),
            query: parse_urlencoded(parts.query_string().unwrap_or_default())?,
            headers: parts.headers(),
            cookies: Cookies::from_headers(parts.headers()),
            json: None,
            form: Values::new(),
            form_data: MultipartData::default(),
        };
        if parts.body().is_empty() {
            return Ok(sources);
        }

        let content_type = parts.content_type().unwrap_or_default();
        let essence = content_type
            .parse::<mime::Mime>()
            .map(|m| m.essence_str().to_ascii_lowercase())
            .unwrap_or_default();
        let mime_is_json = essence == "application/json" || essence.ends_with("+json");

        if mime_is_json {
            sources.json = match serde_json::from_slice::<Value>(parts.body()) {
                Ok(Value::Object(object)) => Some(object),
                Ok(Value::Null) => None,
                Ok(_) => return Err(HttpError::bad_request("request body must be a JSON object")),
                Err(e) => {
                    return Err(HttpError::bad_request(format!("invalid JSON body: {e}"))
                        .with_internal(e))
                }
            };
        } else if essence == mime::APPLICATION_WWW_FORM_URLENCODED.essence_str() {
            let body = std::str::from_utf8(parts.body())
                .map_err(|e| HttpError::bad_request("form body is not UTF-8").with_internal(e))?;
            sources.form = parse_urlencoded(body)?;
        } else if essence == mime::MULTIPART_FORM_DATA.essence_str() {
            sources.form_data =
                read_multipart(content_type, parts.body().clone(), &config.multipart).await?;
        } else if [ParamLocation::Body, ParamLocation::Form, ParamLocation::FormData]
            .into_iter()
            .any(|l| shape.has_location(l))
        {
            return Err(HttpError::new(StatusCode::UNSUPPORTED_MEDIA_TYPE));
        }
        Ok(sources)
    }

    fn lookup(
        &self,
        field: &FieldDef,
        location: ParamLocation,
        tag: &str,
        slots: &mut FileSlots,
    ) -> Result<Option<Value>, HttpError> {
        let raw: Vec<&str> = match location {
            ParamLocation::Path => self.path.get(tag).into_iter().collect(),
            ParamLocation::Query => strings(self.query.get(tag)),
            ParamLocation::Header => self
                .headers
                .get_all(tag)
                .iter()
                .filter_map(|v| v.to_str().ok())
                .collect(),
            ParamLocation::Cookie => self.cookies.get_all(tag),
            ParamLocation::Form => strings(self.form.get(tag)),
            ParamLocation::FormData => {
                if matches!(field.scalar_type().kind, FieldType::File) {
                    return Ok(self.files(field, tag, slots));
                }
                strings(self.form_data.values.get(tag))
            }
            ParamLocation::Body => return Ok(None),
        };
        coerce_all(&field.ty, &raw).map_err(|e| {
            HttpError::bad_request(format!("{location} parameter \"{tag}\": {e}"))
        })
    }

    fn files(&self, field: &FieldDef, tag: &str, slots: &mut FileSlots) -> Option<Value> {
        let files = self.form_data.files.get(tag)?;
        let mut refs = files.iter().map(|file| {
            slots.park(
                file.filename().map(ToString::to_string),
                file.content_type().map(ToString::to_string),
                file.data().clone(),
            )
        });
        if matches!(field.ty.kind, FieldType::Array(_)) {
            Some(Value::Array(refs.collect()))
        } else {
            refs.next()
        }
    }
}

fn strings(values: Option<&Vec<String>>) -> Vec<&str> {
    values
        .map(|v| v.iter().map(String::as_str).collect())
        .unwrap_or_default()
}

fn bind_shape(
    shape: &Shape,
    sources: &Sources<'_>,
    open: &[ParamLocation],
    json: Option<&Map<String, Value>>,
    base: Option<&Map<String, Value>>,
    slots: &mut FileSlots,
) -> Result<Map<String, Value>, HttpError> {
    let mut out = Map::new();
    for field in &shape.fields {
        if field.is_placeholder() {
            continue;
        }
        let inner = field.embedded_shape();

        let mut value = field.constraints.default.clone();
        if let Some(v) = base.and_then(|b| b.get(&field.name)) {
            value = Some(v.clone());
        }
        let body_is_whole = inner.is_none() || field.tag_for(ParamLocation::Body).is_some();
        if open.contains(&ParamLocation::Body) && body_is_whole {
            if let (Some(json), Some(wire_name)) = (json, field.wire_name()) {
                match json.get(wire_name) {
                    Some(Value::Null) if !field.ty.nullable => {}
                    Some(v) => value = Some(from_wire(&field.ty, v.clone())),
                    None => {}
                }
            }
        }
        for &location in open {
            if location == ParamLocation::Body {
                continue;
            }
            if let Some(tag) = field.tag_for(location) {
                if let Some(v) = sources.lookup(field, location, tag, slots)? {
                    value = Some(v);
                }
            }
        }

        let Some(inner) = inner else {
            out.insert(
                field.name.clone(),
                value.unwrap_or_else(|| zero_value(&field.ty)),
            );
            continue;
        };

        // Locations the embed has no tag for see through it to its fields.
        let inner_open: Vec<ParamLocation> = open
            .iter()
            .copied()
            .filter(|&l| field.tag_for(l).is_none() && !field.is_excluded(l))
            .collect();
        let inner_json = if field.flatten {
            json
        } else {
            json.and_then(|j| j.get(&field.name)).and_then(Value::as_object)
        };
        let inner_base = match &value {
            Some(Value::Object(object)) => Some(object),
            _ if field.flatten => base,
            _ => None,
        };
        let nested = bind_shape(inner, sources, &inner_open, inner_json, inner_base, slots)?;
        if field.flatten {
            out.extend(nested);
        } else {
            out.insert(field.name.clone(), Value::Object(nested));
        }
    }
    Ok(out)
}
