// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Error types for courier
//!
//! Build-time failures (`InputValidation`) are raised before any network
//! activity. Transport failures are propagated as the engine reported them.
//! Decode and mapping errors keep enough context (body bytes, call site)
//! to diagnose the response that caused them.

use std::panic::Location;

use bytes::Bytes;
use thiserror::Error;

/// Result type alias for courier operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for courier
#[derive(Error, Debug)]
pub enum Error {
    /// The caller composed a request or destination that cannot be built
    #[error("Invalid input: {0}")]
    InputValidation(String),

    /// The response declared JSON but the body did not parse
    #[error("Failed to decode JSON response: {message}")]
    Decode {
        message: String,
        /// Raw body, kept for diagnostics
        body: Bytes,
    },

    /// A mapping callback rejected the destination it was given
    #[error("Response mapping failed at {call_site}: {message}")]
    Mapping { message: String, call_site: String },

    /// HTTP transport failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Transport failure reported by a non-reqwest engine
    #[error("Network error: {0}")]
    Network(String),

    /// A handler aborted the request before it reached the transport
    #[error("Request aborted by handler: {0}")]
    Aborted(String),

    /// URL parsing failed
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Form URL encoding error
    #[error("Form encoding failed: {0}")]
    FormEncode(#[from] serde_urlencoded::ser::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an input validation error
    pub fn input<S: Into<String>>(msg: S) -> Self {
        Error::InputValidation(msg.into())
    }

    /// Create a decode error that keeps the offending body
    pub fn decode(message: impl Into<String>, body: Bytes) -> Self {
        Error::Decode {
            message: message.into(),
            body,
        }
    }

    /// Create a mapping error tagged with the given call site
    pub fn mapping(message: impl Into<String>, call_site: &Location<'_>) -> Self {
        Error::Mapping {
            message: message.into(),
            call_site: format!(
                "{}:{}:{}",
                call_site.file(),
                call_site.line(),
                call_site.column()
            ),
        }
    }

    /// Create a new network error
    pub fn network<S: Into<String>>(msg: S) -> Self {
        Error::Network(msg.into())
    }

    /// Create a generic error
    pub fn other<S: Into<String>>(msg: S) -> Self {
        Error::Other(msg.into())
    }

    /// Check if this error was raised while building the request
    pub fn is_input_validation(&self) -> bool {
        matches!(self, Error::InputValidation(_))
    }

    /// Check if this is a transport failure
    pub fn is_transport(&self) -> bool {
        matches!(self, Error::Http(_) | Error::Network(_))
    }

    /// Check if this is a response decode failure
    pub fn is_decode(&self) -> bool {
        matches!(self, Error::Decode { .. })
    }

    /// Check if this is a mapping failure
    pub fn is_mapping(&self) -> bool {
        matches!(self, Error::Mapping { .. })
    }

    /// Check if this is a timeout reported by the transport
    pub fn is_timeout(&self) -> bool {
        match self {
            Error::Http(e) => e.is_timeout(),
            _ => false,
        }
    }

    /// Raw body attached to a decode error
    pub fn body(&self) -> Option<&Bytes> {
        match self {
            Error::Decode { body, .. } => Some(body),
            _ => None,
        }
    }
}

impl From<String> for Error {
    fn from(s: String) -> Self {
        Error::Other(s)
    }
}

impl From<&str> for Error {
    fn from(s: &str) -> Self {
        Error::Other(s.to_string())
    }
}

/// Helper trait for adding context to errors
pub trait ErrorContext<T> {
    /// Add operation context to error
    fn context(self, msg: &str) -> Result<T>;
}

impl<T, E: Into<Error>> ErrorContext<T> for std::result::Result<T, E> {
    fn context(self, msg: &str) -> Result<T> {
        self.map_err(|e| {
            let err = e.into();
            Error::Other(format!("{}: {}", msg, err))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_validation_error() {
        let err = Error::input("two body encodings");

        assert!(err.is_input_validation());
        assert!(!err.is_transport());
        assert_eq!(err.to_string(), "Invalid input: two body encodings");
    }

    #[test]
    fn test_decode_error_keeps_body() {
        let err = Error::decode("expected value", Bytes::from_static(b"{oops"));

        assert!(err.is_decode());
        assert_eq!(err.body().map(|b| b.as_ref()), Some(&b"{oops"[..]));
    }

    #[test]
    fn test_mapping_error_call_site() {
        let location = Location::caller();
        let err = Error::mapping("wrong shape", location);

        match err {
            Error::Mapping { message, call_site } => {
                assert_eq!(message, "wrong shape");
                assert!(call_site.contains("error.rs"));
            }
            _ => panic!("Expected Mapping"),
        }
    }

    #[test]
    fn test_context() {
        let result: std::result::Result<(), Error> = Err(Error::network("refused"));
        let err = result.context("sending").unwrap_err();
        assert_eq!(err.to_string(), "sending: Network error: refused");
    }
}
