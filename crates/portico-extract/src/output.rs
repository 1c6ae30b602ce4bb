//! Handler output projection.

use http::header::{HeaderName, HeaderValue, SET_COOKIE};
use http::HeaderMap;
use portico_core::{Error, ParamLocation};
use portico_schema::wire::to_wire;
use portico_schema::{project_value, FieldType, TypeInfo};
use serde::Serialize;
use serde_json::Value;

use crate::cookie::render_set_cookie;

/// A handler output split into response headers and a JSON body.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OutputParts {
    /// Headers from `header` and `cookie` tagged fields.
    pub headers: HeaderMap,
    /// Body in wire form.
    pub body: Value,
}

/// Projects an output value.
///
/// `header` tagged fields set a response header to the field's text form.
/// `cookie` tagged fields hold a `name,attr,...` template and add a
/// `Set-Cookie` header. Null fields are skipped. The body is the whole
/// value in wire form, so a header or cookie field also appears in the body
/// unless it is tagged `json = "-"`.
pub fn project_output<O>(output: &O) -> Result<OutputParts, Error>
where
    O: TypeInfo + Serialize + ?Sized,
{
    let ty = O::type_info();
    let value = serde_json::to_value(output)?;
    let mut headers = HeaderMap::new();

    if let FieldType::Object(shape) = &ty.kind {
        for (name, field) in project_value(shape, &value, ParamLocation::Header) {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| Error::from_std(e).context(format!("output header {name:?}")))?;
            let items = match field {
                Value::Array(items) => items,
                other => vec![other],
            };
            let mut first = true;
            for item in items {
                let Some(text) = text_form(&item) else {
                    continue;
                };
                let value = header_value(&text)?;
                if first {
                    headers.insert(name.clone(), value);
                    first = false;
                } else {
                    headers.append(name.clone(), value);
                }
            }
        }
        for (template, field) in project_value(shape, &value, ParamLocation::Cookie) {
            if let Some(text) = text_form(&field) {
                headers.append(SET_COOKIE, header_value(&render_set_cookie(&template, &text))?);
            }
        }
    }

    Ok(OutputParts {
        headers,
        body: to_wire(&ty, value),
    })
}

fn text_form(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn header_value(text: &str) -> Result<HeaderValue, Error> {
    HeaderValue::from_str(text)
        .map_err(|e| Error::from_std(e).context(format!("invalid header value {text:?}")))
}
