// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Compiled request representation

use std::time::Duration;

use bytes::Bytes;
use reqwest::Method;
use url::Url;

use super::body::Body;
use super::cookie::CookieJar;
use super::merge::OptionMap;
use super::options::TransportOptions;

/// A fully merged request, ready for the transport engine.
///
/// Produced once per [`RequestBuilder`](super::RequestBuilder) compile.
/// Handlers work on a copy, so the compiled artifact itself never changes.
#[derive(Debug, Clone)]
pub struct CompiledRequest {
    /// Request method
    pub method: Method,
    /// Request URL, query included
    pub url: Url,
    /// Request headers, default headers already merged in
    pub headers: OptionMap<String>,
    /// Encoded body
    pub body: Option<Bytes>,
    /// Merged transport options
    pub options: TransportOptions,
    /// Per-request timeout, validated at compile time
    pub timeout: Option<Duration>,
    /// Cookie jar to send and update; `None` when cookies are disabled
    pub cookies: Option<CookieJar>,
}

impl CompiledRequest {
    /// Get a header value
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(String::as_str)
    }

    /// Per-request timeout
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Check if the shared cookie jar takes part in this request
    pub fn cookies_enabled(&self) -> bool {
        self.cookies.is_some()
    }
}

/// Resolve the method: the explicit override, else GET without a body and
/// POST with one.
pub fn resolve_method(explicit: Option<&Method>, body: &Body) -> Method {
    match explicit {
        Some(method) => method.clone(),
        None if body.is_none() => Method::GET,
        None => Method::POST,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::{JsonBody, MultipartPart};

    #[test]
    fn test_method_resolution() {
        assert_eq!(resolve_method(None, &Body::None), Method::GET);
        assert_eq!(
            resolve_method(None, &Body::Form(OptionMap::new())),
            Method::POST
        );
        assert_eq!(
            resolve_method(None, &Body::Json(JsonBody::from("{}"))),
            Method::POST
        );
        assert_eq!(
            resolve_method(None, &Body::Multipart(vec![MultipartPart::new("a", "b")])),
            Method::POST
        );
        assert_eq!(
            resolve_method(Some(&Method::PUT), &Body::None),
            Method::PUT
        );
        assert_eq!(
            resolve_method(Some(&Method::DELETE), &Body::Json(JsonBody::from("[]"))),
            Method::DELETE
        );
    }
}
