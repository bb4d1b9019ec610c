// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Request body encodings
//!
//! A request carries at most one body encoding. [`Body`] holds the active
//! one; [`encode`] turns it into bytes and, unless the caller already chose
//! a `content-type`, the header that describes them.

use bytes::{BufMut, Bytes, BytesMut};
use rand::distr::Alphanumeric;
use rand::Rng;
use serde::de::IgnoredAny;

use super::headers::CONTENT_TYPE;
use super::merge::OptionMap;
use super::param::ParamValue;
use crate::error::{Error, Result};

/// Content type sent with form bodies
pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded; charset=UTF-8";

/// Content type sent with JSON bodies
pub const JSON_CONTENT_TYPE: &str = "application/json; charset=UTF-8";

/// Length of generated multipart boundaries
pub const BOUNDARY_LEN: usize = 30;

/// The body encoding of a request
#[derive(Debug, Clone, Default)]
pub enum Body {
    /// No body
    #[default]
    None,
    /// URL-encoded form fields
    Form(OptionMap<ParamValue>),
    /// JSON document
    Json(JsonBody),
    /// multipart/form-data parts, in order
    Multipart(Vec<MultipartPart>),
}

impl Body {
    /// Name of the active encoding, for diagnostics
    pub fn mode(&self) -> &'static str {
        match self {
            Body::None => "none",
            Body::Form(_) => "form",
            Body::Json(_) => "json",
            Body::Multipart(_) => "multipart",
        }
    }

    /// Check if no body is set
    pub fn is_none(&self) -> bool {
        matches!(self, Body::None)
    }
}

/// A JSON body as supplied by the caller
#[derive(Debug, Clone, PartialEq)]
pub enum JsonBody {
    /// Structured value; must be an array or an object
    Value(serde_json::Value),
    /// Pre-serialized JSON text; must parse
    Text(String),
}

impl JsonBody {
    /// Produce the JSON text to send, validating the input
    pub fn to_text(&self) -> Result<String> {
        match self {
            JsonBody::Value(value @ (serde_json::Value::Array(_) | serde_json::Value::Object(_))) => {
                Ok(serde_json::to_string(value)?)
            }
            JsonBody::Value(other) => Err(Error::input(format!(
                "JSON body must be an array or an object, got {}",
                other
            ))),
            JsonBody::Text(text) => match serde_json::from_str::<IgnoredAny>(text) {
                Ok(_) => Ok(text.clone()),
                Err(e) => Err(Error::input(format!("JSON body is not valid JSON: {}", e))),
            },
        }
    }
}

impl From<serde_json::Value> for JsonBody {
    fn from(value: serde_json::Value) -> Self {
        JsonBody::Value(value)
    }
}

impl From<String> for JsonBody {
    fn from(text: String) -> Self {
        JsonBody::Text(text)
    }
}

impl From<&str> for JsonBody {
    fn from(text: &str) -> Self {
        JsonBody::Text(text.to_string())
    }
}

/// A single multipart/form-data part
#[derive(Debug, Clone)]
pub struct MultipartPart {
    /// Field name
    pub name: String,
    /// Part content
    pub contents: Bytes,
    /// File name, for file uploads
    pub filename: Option<String>,
    /// Extra part headers
    pub headers: OptionMap<String>,
}

impl MultipartPart {
    /// Create a new part
    pub fn new(name: impl Into<String>, contents: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            contents: contents.into(),
            filename: None,
            headers: OptionMap::new(),
        }
    }

    /// Set the file name
    pub fn file_name(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    /// Set a part header
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name, value.into());
        self
    }
}

/// Bytes and inferred content type for a body
#[derive(Debug, Clone, Default)]
pub struct EncodedBody {
    pub bytes: Option<Bytes>,
    pub content_type: Option<String>,
}

/// Serialize a body without touching any headers
pub fn encode_body(body: &Body) -> Result<EncodedBody> {
    match body {
        Body::None => Ok(EncodedBody::default()),
        Body::Form(fields) => {
            let pairs: Vec<(&str, &ParamValue)> = fields.iter().collect();
            let encoded = serde_urlencoded::to_string(pairs)?;
            Ok(EncodedBody {
                bytes: Some(Bytes::from(encoded)),
                content_type: Some(FORM_CONTENT_TYPE.to_string()),
            })
        }
        Body::Json(json) => Ok(EncodedBody {
            bytes: Some(Bytes::from(json.to_text()?)),
            content_type: Some(JSON_CONTENT_TYPE.to_string()),
        }),
        Body::Multipart(parts) => {
            let boundary = generate_boundary();
            Ok(EncodedBody {
                bytes: Some(encode_multipart(parts, &boundary)),
                content_type: Some(format!("multipart/form-data; boundary={}", boundary)),
            })
        }
    }
}

/// Serialize a body and apply its content type to `headers` if none is set.
pub fn encode(body: &Body, headers: &mut OptionMap<String>) -> Result<Option<Bytes>> {
    let encoded = encode_body(body)?;
    if let Some(content_type) = encoded.content_type {
        if !headers.contains_key(CONTENT_TYPE) {
            headers.insert(CONTENT_TYPE, content_type);
        }
    }
    Ok(encoded.bytes)
}

/// Generate a fresh multipart boundary from the thread-local CSPRNG
pub fn generate_boundary() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(BOUNDARY_LEN)
        .map(char::from)
        .collect()
}

fn quote(value: &str) -> String {
    value
        .replace('"', "%22")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

fn encode_multipart(parts: &[MultipartPart], boundary: &str) -> Bytes {
    let mut buf = BytesMut::new();

    for part in parts {
        buf.put_slice(format!("--{}\r\n", boundary).as_bytes());

        let mut disposition = format!("form-data; name=\"{}\"", quote(&part.name));
        if let Some(ref filename) = part.filename {
            disposition.push_str(&format!("; filename=\"{}\"", quote(filename)));
        }
        buf.put_slice(format!("Content-Disposition: {}\r\n", disposition).as_bytes());

        for (name, value) in part.headers.iter() {
            if name.eq_ignore_ascii_case("content-disposition") {
                continue;
            }
            buf.put_slice(format!("{}: {}\r\n", name, value).as_bytes());
        }
        if part.filename.is_some() && !part.headers.contains_key(CONTENT_TYPE) {
            buf.put_slice(b"Content-Type: application/octet-stream\r\n");
        }

        buf.put_slice(b"\r\n");
        buf.put_slice(&part.contents);
        buf.put_slice(b"\r\n");
    }

    buf.put_slice(format!("--{}--\r\n", boundary).as_bytes());
    buf.freeze()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_form_body() {
        let fields: OptionMap<ParamValue> = [("q", ParamValue::from("a b&c")), ("n", 3.into())]
            .into_iter()
            .collect();
        let mut headers = OptionMap::new();

        let bytes = encode(&Body::Form(fields), &mut headers).unwrap().unwrap();

        assert_eq!(&bytes[..], b"q=a+b%26c&n=3");
        assert_eq!(headers.get("Content-Type").map(String::as_str), Some(FORM_CONTENT_TYPE));
    }

    #[test]
    fn test_json_value_body() {
        let mut headers = OptionMap::new();
        let bytes = encode(&Body::Json(json!({"a": [1, 2]}).into()), &mut headers)
            .unwrap()
            .unwrap();

        assert_eq!(&bytes[..], br#"{"a":[1,2]}"#);
        assert_eq!(headers.get("content-type").map(String::as_str), Some(JSON_CONTENT_TYPE));
    }

    #[test]
    fn test_json_text_is_validated() {
        assert_eq!(JsonBody::from("[1, 2]").to_text().unwrap(), "[1, 2]");

        let err = JsonBody::from("{not json").to_text().unwrap_err();
        assert!(err.is_input_validation());
    }

    #[test]
    fn test_json_scalar_value_rejected() {
        let err = JsonBody::from(json!(12)).to_text().unwrap_err();
        assert!(err.is_input_validation());
    }

    #[test]
    fn test_explicit_content_type_wins() {
        let mut headers: OptionMap<String> =
            [("CONTENT-TYPE", "application/vnd.api+json".to_string())]
                .into_iter()
                .collect();

        encode(&Body::Json(json!([]).into()), &mut headers).unwrap();

        assert_eq!(headers.len(), 1);
        assert_eq!(
            headers.get("content-type").map(String::as_str),
            Some("application/vnd.api+json")
        );
        assert_eq!(headers.key_casing("content-type"), Some("CONTENT-TYPE"));
    }

    #[test]
    fn test_no_body_no_hint() {
        let mut headers = OptionMap::new();
        assert!(encode(&Body::None, &mut headers).unwrap().is_none());
        assert!(headers.is_empty());
    }

    #[test]
    fn test_boundary_shape() {
        let a = generate_boundary();
        let b = generate_boundary();

        assert_eq!(a.len(), BOUNDARY_LEN);
        assert!(a.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(a, b);
    }

    #[test]
    fn test_multipart_body() {
        let parts = vec![
            MultipartPart::new("title", "hello"),
            MultipartPart::new("upload", &b"\x00\x01"[..])
                .file_name("data.bin")
                .header("X-Part", "2"),
        ];
        let mut headers = OptionMap::new();

        let bytes = encode(&Body::Multipart(parts), &mut headers).unwrap().unwrap();
        let content_type = headers.get("content-type").unwrap().clone();
        let boundary = content_type
            .strip_prefix("multipart/form-data; boundary=")
            .unwrap();
        assert_eq!(boundary.len(), BOUNDARY_LEN);

        let text = String::from_utf8_lossy(&bytes);
        let separator = format!("--{}\r\n", boundary);
        assert_eq!(text.matches(&separator).count(), 2);
        assert!(text.ends_with(&format!("--{}--\r\n", boundary)));
        assert!(text.contains("Content-Disposition: form-data; name=\"title\"\r\n\r\nhello\r\n"));
        assert!(text.contains("name=\"upload\"; filename=\"data.bin\"\r\n"));
        assert!(text.contains("X-Part: 2\r\nContent-Type: application/octet-stream\r\n\r\n"));
    }
}
