// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! HTTP response types and content-type driven decoding

use bytes::Bytes;
use lazy_static::lazy_static;
use regex::Regex;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use url::Url;

use super::headers::{CONTENT_TYPE, SET_COOKIE};
use crate::error::{Error, Result};

lazy_static! {
    /// `type/json`, `type/anything+json`, with optional parameters
    static ref JSON_MEDIA_TYPE: Regex =
        Regex::new(r"(?i)^\s*[a-z0-9.+-]+/(?:[a-z0-9.!#$&^_+-]+\+)?json\s*(?:;.*)?$")
            .expect("JSON media type pattern is valid");
}

/// Check if a content-type value names a JSON media type
pub fn is_json_content_type(content_type: &str) -> bool {
    JSON_MEDIA_TYPE.is_match(content_type)
}

/// HTTP response representation
#[derive(Debug, Clone)]
pub struct Response {
    /// Response status code
    pub status: StatusCode,
    /// Response headers
    pub headers: HeaderMap,
    /// Response body
    pub body: Bytes,
    /// Final URL (after redirects)
    pub url: Url,
    /// Whether the transport followed a redirect
    pub redirected: bool,
    /// Response time in milliseconds
    pub response_time_ms: u64,
}

/// A decoded response body
#[derive(Debug, Clone, PartialEq)]
pub enum Decoded {
    /// The response declared JSON and parsed
    Json(serde_json::Value),
    /// Any other content type, body unchanged
    Text(String),
}

impl Decoded {
    /// The JSON value, if any
    pub fn as_json(&self) -> Option<&serde_json::Value> {
        match self {
            Decoded::Json(v) => Some(v),
            Decoded::Text(_) => None,
        }
    }

    /// The text, if the body was not JSON
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Decoded::Text(s) => Some(s),
            Decoded::Json(_) => None,
        }
    }
}

impl Response {
    /// Create a new response
    pub fn new(
        status: StatusCode,
        headers: HeaderMap,
        body: Bytes,
        url: Url,
        redirected: bool,
        response_time_ms: u64,
    ) -> Self {
        Self {
            status,
            headers,
            body,
            url,
            redirected,
            response_time_ms,
        }
    }

    /// Build a response from plain parts, as served by mocks.
    ///
    /// Header pairs that are not valid HTTP headers are skipped.
    pub fn from_parts<'a>(
        status: u16,
        headers: impl IntoIterator<Item = (&'a str, &'a str)>,
        body: impl Into<Bytes>,
        url: Url,
    ) -> Result<Self> {
        let status = StatusCode::from_u16(status)
            .map_err(|e| Error::input(format!("invalid status code {}: {}", status, e)))?;

        let mut map = HeaderMap::new();
        for (name, value) in headers {
            match (HeaderName::try_from(name), HeaderValue::try_from(value)) {
                (Ok(name), Ok(value)) => {
                    map.append(name, value);
                }
                _ => tracing::warn!(header = name, "Skipping invalid response header"),
            }
        }

        Ok(Self::new(status, map, body.into(), url, false, 0))
    }

    /// Check if status is success (2xx)
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Check if status is client error (4xx)
    pub fn is_client_error(&self) -> bool {
        self.status.is_client_error()
    }

    /// Check if status is server error (5xx)
    pub fn is_server_error(&self) -> bool {
        self.status.is_server_error()
    }

    /// Get status code as u16
    pub fn status_code(&self) -> u16 {
        self.status.as_u16()
    }

    /// Get body as text
    pub fn text(&self) -> Result<String> {
        String::from_utf8(self.body.to_vec()).map_err(|e| Error::Other(e.to_string()))
    }

    /// Get body as text, lossy conversion
    pub fn text_lossy(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Get a header value
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Get all values for a header
    pub fn header_all(&self, name: &str) -> Vec<&str> {
        self.headers
            .get_all(name)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .collect()
    }

    /// Get content type
    pub fn content_type(&self) -> Option<&str> {
        self.header(CONTENT_TYPE)
    }

    /// Check if the content type is a JSON media type
    pub fn is_json(&self) -> bool {
        self.content_type().map_or(false, is_json_content_type)
    }

    /// Get Set-Cookie headers
    pub fn set_cookies(&self) -> Vec<&str> {
        self.header_all(SET_COOKIE)
    }

    /// Get raw body bytes
    pub fn bytes(&self) -> &Bytes {
        &self.body
    }

    /// Decode the body according to its content type.
    ///
    /// JSON media types are parsed; a malformed body is an error, never a
    /// silent fallback to text. Everything else is returned as text.
    pub fn decode(&self) -> Result<Decoded> {
        if !self.is_json() {
            return Ok(Decoded::Text(self.text_lossy()));
        }
        serde_json::from_slice(&self.body)
            .map(Decoded::Json)
            .map_err(|e| Error::decode(e.to_string(), self.body.clone()))
    }

    /// Decode a JSON body into a typed structure.
    ///
    /// Fails with a decode error if the response is not JSON or does not
    /// fit `T`.
    pub fn decode_as<T: DeserializeOwned>(&self) -> Result<T> {
        if !self.is_json() {
            return Err(Error::decode(
                format!(
                    "expected a JSON content type, got {}",
                    self.content_type().unwrap_or("none")
                ),
                self.body.clone(),
            ));
        }
        serde_json::from_slice(&self.body).map_err(|e| Error::decode(e.to_string(), self.body.clone()))
    }
}
