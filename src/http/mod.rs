// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! HTTP request composition and response mapping
//!
//! A [`ClientConfig`] holds long-lived settings. Each [`RequestBuilder`]
//! collects per-request choices, compiles them against one snapshot of
//! the client, dispatches through a cached [`Engine`] and exposes the
//! response raw, decoded or mapped into a [`ResponseDto`].

mod body;
mod builder;
mod client;
mod cookie;
mod engine;
mod mapper;
mod merge;
pub mod options;
mod param;
mod request;
mod response;

pub use body::{encode_body, generate_boundary, Body, EncodedBody, JsonBody, MultipartPart};
pub use body::{BOUNDARY_LEN, FORM_CONTENT_TYPE, JSON_CONTENT_TYPE};
pub use builder::RequestBuilder;
pub use client::{ClientConfig, ClientSnapshot};
pub use cookie::{Cookie, CookieJar};
pub use engine::{Engine, MockResponse, MockTransport, ReqwestTransport, Transport};
pub use mapper::{map, ApiResponse, ResponseDto};
pub use merge::{merge, OptionMap};
pub use options::{EngineSettings, Handler, OptionValue, TransportOptions};
pub use param::{normalize, ParamValue};
pub use request::{resolve_method, CompiledRequest};
pub use response::{is_json_content_type, Decoded, Response};

/// Default user agent string
pub const DEFAULT_USER_AGENT: &str = concat!("courier/", env!("CARGO_PKG_VERSION"));

/// Common HTTP headers
pub mod headers {
    pub const AUTHORIZATION: &str = "authorization";
    pub const CONTENT_TYPE: &str = "content-type";
    pub const COOKIE: &str = "cookie";
    pub const LOCATION: &str = "location";
    pub const SET_COOKIE: &str = "set-cookie";
}
