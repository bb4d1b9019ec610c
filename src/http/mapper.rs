// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Response mapping into caller-defined destinations
//!
//! A destination is any type implementing [`ResponseDto`]. Mapping builds
//! the destination through a factory, attaches the response, then hands
//! the destination to a callback. A failing callback becomes
//! [`Error::Mapping`] tagged with the source location that asked for the
//! mapping.

use std::fmt;
use std::panic::Location;

use serde::de::DeserializeOwned;
use serde_json::Value;

use super::response::Response;
use crate::error::{Error, Result};

/// Contract for types that receive a mapped response
pub trait ResponseDto: Sized {
    /// Attach the received response
    fn populate(&mut self, response: Response) -> Result<()>;

    /// The attached response, if any
    fn raw_response(&self) -> Option<&Response>;

    /// Check if the attached response has a 2xx status
    fn is_ok(&self) -> bool {
        self.raw_response().map_or(false, Response::is_success)
    }

    /// Status code of the attached response
    fn code(&self) -> Option<u16> {
        self.raw_response().map(Response::status_code)
    }

    /// Deserialize the response body into `T`
    fn object_response<T: DeserializeOwned>(&self) -> Result<T> {
        self.raw_response()
            .ok_or_else(|| Error::input("destination holds no response"))?
            .decode_as()
    }

    /// The response body as a JSON array
    fn array_response(&self) -> Result<Vec<Value>> {
        self.object_response()
    }
}

/// Stock destination that simply keeps the response
#[derive(Debug, Clone, Default)]
pub struct ApiResponse {
    response: Option<Response>,
}

impl ApiResponse {
    /// Take the attached response
    pub fn into_response(self) -> Option<Response> {
        self.response
    }
}

impl ResponseDto for ApiResponse {
    fn populate(&mut self, response: Response) -> Result<()> {
        self.response = Some(response);
        Ok(())
    }

    fn raw_response(&self) -> Option<&Response> {
        self.response.as_ref()
    }
}

/// Map `response` into a destination built by `factory` and pass it to
/// `callback`.
#[track_caller]
pub fn map<D, R, E>(
    response: Response,
    factory: impl FnOnce() -> Result<D>,
    callback: impl FnOnce(D) -> std::result::Result<R, E>,
) -> Result<R>
where
    D: ResponseDto,
    E: fmt::Display,
{
    let call_site = Location::caller();
    let destination = construct(factory)?;
    map_into(destination, response, callback, call_site)
}

/// Build a destination; any failure is an input validation error
pub(crate) fn construct<D: ResponseDto>(factory: impl FnOnce() -> Result<D>) -> Result<D> {
    factory().map_err(|e| match e {
        Error::InputValidation(_) => e,
        other => Error::input(format!("cannot construct response destination: {}", other)),
    })
}

pub(crate) fn map_into<D, R, E>(
    mut destination: D,
    response: Response,
    callback: impl FnOnce(D) -> std::result::Result<R, E>,
    call_site: &Location<'_>,
) -> Result<R>
where
    D: ResponseDto,
    E: fmt::Display,
{
    destination.populate(response).map_err(|e| match e {
        Error::InputValidation(_) => e,
        other => Error::input(format!("destination rejected the response: {}", other)),
    })?;

    callback(destination).map_err(|e| {
        tracing::debug!(error = %e, "Response mapping callback failed");
        Error::mapping(e.to_string(), call_site)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use url::Url;

    fn response(status: u16, body: &'static str) -> Response {
        Response::from_parts(
            status,
            vec![("content-type", "application/json")],
            body,
            Url::parse("https://example.com").unwrap(),
        )
        .unwrap()
    }

    #[derive(Default)]
    struct Users {
        response: Option<Response>,
    }

    impl ResponseDto for Users {
        fn populate(&mut self, response: Response) -> Result<()> {
            if !response.is_json() {
                return Err(Error::input("users must be JSON"));
            }
            self.response = Some(response);
            Ok(())
        }

        fn raw_response(&self) -> Option<&Response> {
            self.response.as_ref()
        }
    }

    #[test]
    fn test_map_success() {
        #[derive(Deserialize)]
        struct User {
            name: String,
        }

        let names = map(
            response(200, r#"[{"name":"ann"},{"name":"bo"}]"#),
            || Ok(Users::default()),
            |users: Users| -> std::result::Result<Vec<String>, String> {
                assert!(users.is_ok());
                assert_eq!(users.array_response().unwrap().len(), 2);
                let list: Vec<User> = users.object_response().map_err(|e| e.to_string())?;
                Ok(list.into_iter().map(|u| u.name).collect())
            },
        )
        .unwrap();

        assert_eq!(names, vec!["ann", "bo"]);
    }

    #[test]
    fn test_callback_failure_carries_call_site() {
        let line = line!() + 1;
        let err = map(response(500, "{}"), || Ok(ApiResponse::default()), |dto: ApiResponse| {
            Err::<(), _>(format!("status {}", dto.code().unwrap_or(0)))
        })
        .unwrap_err();

        match err {
            Error::Mapping { message, call_site } => {
                assert_eq!(message, "status 500");
                assert!(call_site.contains(file!()), "{call_site}");
                assert!(call_site.contains(&format!(":{}:", line)), "{call_site}");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_factory_failure_is_input_validation() {
        let mut called = false;
        let err = map(
            response(200, "{}"),
            || Err::<ApiResponse, _>(Error::Config("no destination".into())),
            |_dto: ApiResponse| {
                called = true;
                Ok::<_, String>(())
            },
        )
        .unwrap_err();

        assert!(err.is_input_validation());
        assert!(!called);
    }

    #[test]
    fn test_populate_rejection_is_input_validation() {
        let text = Response::from_parts(
            200,
            vec![("content-type", "text/plain")],
            "hi",
            Url::parse("https://example.com").unwrap(),
        )
        .unwrap();

        let err = map(text, || Ok(Users::default()), |_u: Users| Ok::<_, String>(()))
            .unwrap_err();
        assert!(err.is_input_validation());
    }

    #[test]
    fn test_empty_destination() {
        let dto = ApiResponse::default();
        assert!(!dto.is_ok());
        assert_eq!(dto.code(), None);
        assert!(dto.array_response().unwrap_err().is_input_validation());
    }
}
