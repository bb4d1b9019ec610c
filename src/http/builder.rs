// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Per-request composition
//!
//! A [`RequestBuilder`] collects query parameters, one body mode, headers
//! and request-scoped options. Nothing touches the client until the
//! request compiles; setter mistakes are recorded and reported from the
//! first compile or send.

use std::fmt;
use std::future::Future;
use std::panic::Location;
use std::sync::Arc;

use reqwest::header::{HeaderName, HeaderValue};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use url::Url;

use super::body::{self, Body, JsonBody, MultipartPart};
use super::client::{ClientConfig, ClientSnapshot};
use super::mapper::{self, ResponseDto};
use super::merge::OptionMap;
use super::options::{OptionValue, TransportOptions};
use super::param::{normalize, ParamValue};
use super::request::{resolve_method, CompiledRequest};
use super::response::{Decoded, Response};
use crate::error::{Error, Result};
use crate::network::RequestInterceptor;

struct Compiled {
    request: Arc<CompiledRequest>,
    snapshot: Arc<ClientSnapshot>,
}

/// Builder for a single request against a [`ClientConfig`]
///
/// # Example
///
/// ```rust,no_run
/// use courier::http::ClientConfig;
///
/// # async fn run() -> courier::Result<()> {
/// let client = ClientConfig::new();
/// let mut request = client
///     .request("https://api.example.com/search")
///     .add_param("q", "rust")
///     .add_param("page", 2);
///
/// let decoded = request.get_response().await?;
/// println!("{:?}", decoded);
/// # Ok(())
/// # }
/// ```
#[must_use = "a request does nothing until it is sent"]
pub struct RequestBuilder {
    client: ClientConfig,
    url: String,
    query: OptionMap<ParamValue>,
    body: Body,
    headers: OptionMap<String>,
    method: Option<Method>,
    use_cookie: bool,
    use_default_headers: bool,
    options: TransportOptions,
    error: Option<String>,
    compiled: Option<Compiled>,
    response: Option<Response>,
}

impl fmt::Debug for RequestBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestBuilder")
            .field("url", &self.url)
            .field("method", &self.method)
            .field("body", &self.body.mode())
            .field("query", &self.query)
            .field("headers", &self.headers)
            .field("use_cookie", &self.use_cookie)
            .field("use_default_headers", &self.use_default_headers)
            .finish()
    }
}

impl RequestBuilder {
    /// Start a request for `url`
    pub fn new(client: ClientConfig, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
            query: OptionMap::new(),
            body: Body::None,
            headers: OptionMap::new(),
            method: None,
            use_cookie: true,
            use_default_headers: true,
            options: TransportOptions::new(),
            error: None,
            compiled: None,
            response: None,
        }
    }

    fn touch(&mut self) {
        self.compiled = None;
        self.response = None;
    }

    fn defer(&mut self, err: Error) {
        if self.error.is_none() {
            self.error = Some(match err {
                Error::InputValidation(msg) => msg,
                other => other.to_string(),
            });
        }
    }

    fn conflict(&mut self, requested: &str) {
        let msg = format!(
            "request already has a {} body; cannot add a {} body",
            self.body.mode(),
            requested
        );
        self.defer(Error::InputValidation(msg));
    }

    /// Add a query parameter; booleans are sent as `true`/`false`
    pub fn add_param(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.touch();
        self.query.insert(key, normalize(value.into()));
        self
    }

    /// Add several query parameters
    pub fn add_params<K, V>(self, params: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<ParamValue>,
    {
        params
            .into_iter()
            .fold(self, |req, (k, v)| req.add_param(k, v))
    }

    /// Add a form field
    pub fn add_post(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.touch();
        let value = normalize(value.into());
        match self.body {
            Body::None => {
                let mut form = OptionMap::new();
                form.insert(key, value);
                self.body = Body::Form(form);
            }
            Body::Form(ref mut form) => form.insert(key, value),
            _ => self.conflict("form"),
        }
        self
    }

    /// Add several form fields
    pub fn add_posts<K, V>(self, fields: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<ParamValue>,
    {
        fields
            .into_iter()
            .fold(self, |req, (k, v)| req.add_post(k, v))
    }

    /// Set the JSON body; text is validated when the request compiles.
    ///
    /// A second call replaces the previous JSON body.
    pub fn add_post_json(mut self, json: impl Into<JsonBody>) -> Self {
        self.touch();
        match self.body {
            Body::None | Body::Json(_) => self.body = Body::Json(json.into()),
            _ => self.conflict("json"),
        }
        self
    }

    /// Serialize `value` as the JSON body
    pub fn json<T: Serialize + ?Sized>(self, value: &T) -> Self {
        match serde_json::to_value(value) {
            Ok(value) => self.add_post_json(value),
            Err(e) => {
                let mut req = self;
                req.defer(Error::input(format!("cannot serialize JSON body: {}", e)));
                req
            }
        }
    }

    /// Add a multipart part
    pub fn add_multipart(mut self, part: MultipartPart) -> Self {
        self.touch();
        match self.body {
            Body::None => self.body = Body::Multipart(vec![part]),
            Body::Multipart(ref mut parts) => parts.push(part),
            _ => self.conflict("multipart"),
        }
        self
    }

    /// Override the method resolved from the body
    pub fn set_method(mut self, method: Method) -> Self {
        self.touch();
        self.method = Some(method);
        self
    }

    /// Add a header, replacing one with the same name
    pub fn add_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.touch();
        self.headers.insert(name, value.into());
        self
    }

    /// Add several headers
    pub fn add_headers<K, V>(self, headers: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        headers
            .into_iter()
            .fold(self, |req, (k, v)| req.add_header(k, v))
    }

    /// Include the client's default headers (on unless turned off)
    pub fn use_default_headers(mut self, enabled: bool) -> Self {
        self.touch();
        self.use_default_headers = enabled;
        self
    }

    /// Write a cookie straight into the client's shared jar
    pub fn add_cookie(self, name: impl Into<String>, value: impl Into<String>, domain: &str) -> Self {
        self.client.add_cookie(name, value, domain);
        self
    }

    /// Neither send nor store cookies for this request
    pub fn disable_cookies(mut self) -> Self {
        self.touch();
        self.use_cookie = false;
        self
    }

    /// Add a transport option for this request only
    pub fn add_client_option(mut self, key: &str, value: impl Into<OptionValue>) -> Self {
        self.touch();
        if let Err(e) = self.options.add(key, value) {
            self.defer(e);
        }
        self
    }

    /// Append a handler for this request only
    pub fn add_handler<I: RequestInterceptor + 'static>(mut self, handler: I) -> Self {
        self.touch();
        self.options.add_handler(Arc::new(handler));
        self
    }

    /// Compile the request once; later calls return the same artifact
    pub fn compile(&mut self) -> Result<Arc<CompiledRequest>> {
        if let Some(ref compiled) = self.compiled {
            return Ok(compiled.request.clone());
        }
        let snapshot = self.client.snapshot();
        let request = Arc::new(self.build(&snapshot)?);
        self.compiled = Some(Compiled {
            request: request.clone(),
            snapshot,
        });
        Ok(request)
    }

    fn build(&self, snapshot: &ClientSnapshot) -> Result<CompiledRequest> {
        let options = snapshot.merged_transport_options().merged_with(&self.options);

        if let Some(ref msg) = self.error {
            return Err(Error::InputValidation(msg.clone()));
        }

        let timeout = options.timeout().map_err(invalid_option)?;
        options.engine_settings().map_err(invalid_option)?;
        options.max_redirects().map_err(invalid_option)?;

        let method = resolve_method(self.method.as_ref(), &self.body);

        let mut headers = if self.use_default_headers {
            snapshot.default_headers.merged_with(&self.headers)
        } else {
            self.headers.clone()
        };

        let body = body::encode(&self.body, &mut headers)?;
        validate_headers(&headers)?;

        let mut url = Url::parse(&self.url)?;
        if !self.query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in self.query.iter() {
                pairs.append_pair(key, &value.to_string());
            }
        }

        let cookies = self.use_cookie.then(|| self.client.cookie_jar());

        tracing::debug!(
            method = %method,
            url = %url,
            body = self.body.mode(),
            cookies = cookies.is_some(),
            default_headers = self.use_default_headers,
            "Compiled request"
        );

        Ok(CompiledRequest {
            method,
            url,
            headers,
            body,
            options,
            timeout,
            cookies,
        })
    }

    async fn dispatch(&mut self) -> Result<Response> {
        let request = self.compile()?;
        let snapshot = match self.compiled {
            Some(ref compiled) => compiled.snapshot.clone(),
            None => self.client.snapshot(),
        };
        let engine = self
            .client
            .engine_for(&snapshot, &self.options, &request.options)?;
        engine.execute(&request).await
    }

    /// Dispatch the request once and return the response.
    ///
    /// Later accessors reuse it; only successful dispatches are kept.
    pub async fn get_http_response(&mut self) -> Result<Response> {
        if let Some(ref response) = self.response {
            return Ok(response.clone());
        }
        let response = self.dispatch().await?;
        self.response = Some(response.clone());
        Ok(response)
    }

    /// Alias for [`get_http_response`](Self::get_http_response)
    pub async fn send(&mut self) -> Result<Response> {
        self.get_http_response().await
    }

    /// Recompile against the current client and dispatch again
    pub async fn send_fresh(&mut self) -> Result<Response> {
        self.touch();
        self.get_http_response().await
    }

    /// Dispatch on a private current-thread runtime.
    ///
    /// Must not be called from inside an async context.
    pub fn send_blocking(&mut self) -> Result<Response> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        runtime.block_on(self.get_http_response())
    }

    /// Response body as text
    pub async fn get_raw_response(&mut self) -> Result<String> {
        Ok(self.get_http_response().await?.text_lossy())
    }

    /// Response body decoded by content type
    pub async fn get_response(&mut self) -> Result<Decoded> {
        self.get_http_response().await?.decode()
    }

    /// JSON response body deserialized into `T`
    pub async fn get_response_as<T: DeserializeOwned>(&mut self) -> Result<T> {
        self.get_http_response().await?.decode_as()
    }

    /// Map the response into a destination built by `factory`.
    ///
    /// The destination is built before anything is sent, so a factory
    /// failure never reaches the network.
    #[track_caller]
    pub fn map_response_with<'a, D, R, E, F, C>(
        &'a mut self,
        factory: F,
        callback: C,
    ) -> impl Future<Output = Result<R>> + 'a
    where
        D: ResponseDto + 'a,
        F: FnOnce() -> Result<D> + 'a,
        C: FnOnce(D) -> std::result::Result<R, E> + 'a,
        R: 'a,
        E: fmt::Display + 'a,
    {
        let call_site = Location::caller();
        async move {
            let destination = mapper::construct(factory)?;
            let response = self.get_http_response().await?;
            mapper::map_into(destination, response, callback, call_site)
        }
    }

    /// Map the response into a default-constructed destination
    #[track_caller]
    pub fn map_response<'a, D, R, E, C>(
        &'a mut self,
        callback: C,
    ) -> impl Future<Output = Result<R>> + 'a
    where
        D: ResponseDto + Default + 'a,
        C: FnOnce(D) -> std::result::Result<R, E> + 'a,
        R: 'a,
        E: fmt::Display + 'a,
    {
        self.map_response_with(|| Ok(D::default()), callback)
    }
}

fn invalid_option(err: Error) -> Error {
    match err {
        Error::Config(msg) => Error::InputValidation(msg),
        other => other,
    }
}

fn validate_headers(headers: &OptionMap<String>) -> Result<()> {
    for (name, value) in headers.iter() {
        HeaderName::try_from(name)
            .map_err(|_| Error::InputValidation(format!("invalid header name {:?}", name)))?;
        HeaderValue::try_from(value.as_str()).map_err(|_| {
            Error::InputValidation(format!("invalid value for header {:?}", name))
        })?;
    }
    Ok(())
}
