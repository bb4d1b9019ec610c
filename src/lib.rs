// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! # Courier - HTTP Request Composition
//!
//! A small layer over `reqwest` for composing requests from a shared
//! client configuration and per-request choices, and for turning
//! responses into decoded values or caller-defined structures.
//!
//! ## Features
//!
//! - Case-insensitive header and option merging, later values win
//! - Form, JSON and multipart bodies with automatic content-type
//! - Shared cookie jar, in memory or persisted to a JSON file
//! - Transport engines cached by configuration fingerprint
//! - Handler middleware around every dispatch
//! - Content-type driven decoding and typed response mapping
//! - Mock responses for tests
//!
//! ## Example
//!
//! ```rust,no_run
//! use courier::{ApiResponse, ClientConfig, ResponseDto};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = ClientConfig::new();
//!     client.set_default_headers([("Accept", "application/json")]);
//!
//!     let mut request = client
//!         .request("https://api.example.com/users")
//!         .add_param("active", true);
//!
//!     let count = request
//!         .map_response(|dto: ApiResponse| dto.array_response().map(|users| users.len()))
//!         .await?;
//!     println!("{} active users", count);
//!
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod http;
pub mod network;

// Re-exports for convenience

// Errors
pub use error::{Error, ErrorContext, Result};

// HTTP
pub use http::{ApiResponse, ResponseDto};
pub use http::{Body, JsonBody, MultipartPart, ParamValue};
pub use http::{ClientConfig, CompiledRequest, RequestBuilder};
pub use http::{Cookie, CookieJar};
pub use http::{Decoded, Response};
pub use http::{MockResponse, Transport};
pub use http::{OptionMap, OptionValue, TransportOptions};

// Network
pub use network::{
    HeaderInjector, InterceptAction, InterceptorChain, RequestInterceptor, RequestLogger,
};

/// Courier version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
