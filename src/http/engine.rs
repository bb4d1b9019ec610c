// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Transport engines
//!
//! The [`Transport`] trait is the seam to whatever performs socket-level
//! I/O. [`ReqwestTransport`] is the production engine; [`MockTransport`]
//! answers every request with a canned response. An [`Engine`] pairs a
//! transport with the handler chain and owns cookie traffic for a
//! dispatch.

use std::hash::{Hash, Hasher};
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::redirect::Policy;
use reqwest::{Client, Method, StatusCode};

use super::headers::{AUTHORIZATION, CONTENT_TYPE, COOKIE, LOCATION};
use super::merge::OptionMap;
use super::options::EngineSettings;
use super::request::CompiledRequest;
use super::response::Response;
use crate::error::{Error, Result};
use crate::network::{InterceptAction, InterceptorChain};

/// Socket-level HTTP transport
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send a compiled request and return the received response
    async fn send(&self, request: &CompiledRequest) -> Result<Response>;
}

/// Transport backed by a `reqwest::Client`
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Build a reqwest client from engine settings
    pub fn new(settings: &EngineSettings) -> Result<Self> {
        // redirects and cookies are driven hop by hop by the engine
        let mut builder = Client::builder()
            .user_agent(settings.user_agent.as_str())
            .connect_timeout(settings.connect_timeout)
            .redirect(Policy::none())
            .danger_accept_invalid_certs(!settings.verify)
            .cookie_store(false);

        if let Some(ref proxy) = settings.proxy {
            let proxy_url = if proxy.contains("://") {
                proxy.clone()
            } else {
                format!("http://{}", proxy)
            };
            builder = builder.proxy(
                reqwest::Proxy::all(&proxy_url)
                    .map_err(|e| Error::Config(format!("Invalid proxy URL: {}", e)))?,
            );
        }

        Ok(Self {
            client: builder.build()?,
        })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: &CompiledRequest) -> Result<Response> {
        let start = Instant::now();

        let mut builder = self
            .client
            .request(request.method.clone(), request.url.clone());

        for (name, value) in request.headers.iter() {
            builder = builder.header(name, value.as_str());
        }
        if let Some(ref body) = request.body {
            builder = builder.body(body.clone());
        }
        if let Some(timeout) = request.timeout() {
            builder = builder.timeout(timeout);
        }

        let response = builder.send().await?;
        let response_time = start.elapsed().as_millis() as u64;

        let redirected = response.url() != &request.url;
        let final_url = response.url().clone();
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await?;

        Ok(Response::new(
            status,
            headers,
            body,
            final_url,
            redirected,
            response_time,
        ))
    }
}

/// Canned response installed with [`ClientConfig::mock_response`](super::ClientConfig::mock_response)
#[derive(Debug, Clone, PartialEq)]
pub struct MockResponse {
    pub status: u16,
    pub body: Bytes,
    pub headers: OptionMap<String>,
}

impl MockResponse {
    /// Create a mock response without headers
    pub fn new(status: u16, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            body: body.into(),
            headers: OptionMap::new(),
        }
    }

    /// Add a response header
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name, value.into());
        self
    }

    pub(crate) fn hash_into<H: Hasher>(&self, state: &mut H) {
        self.status.hash(state);
        self.body.hash(state);
        for (name, value) in self.headers.iter() {
            name.to_ascii_lowercase().hash(state);
            value.hash(state);
        }
    }
}

/// Transport that never touches the network
#[derive(Debug, Clone)]
pub struct MockTransport {
    mock: MockResponse,
}

impl MockTransport {
    pub fn new(mock: MockResponse) -> Self {
        Self { mock }
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: &CompiledRequest) -> Result<Response> {
        tracing::debug!(url = %request.url, status = self.mock.status, "Serving mock response");
        Response::from_parts(
            self.mock.status,
            self.mock.headers.iter().map(|(k, v)| (k, v.as_str())),
            self.mock.body.clone(),
            request.url.clone(),
        )
    }
}

/// A transport plus the handler chain wrapped around it
#[derive(Clone)]
pub struct Engine {
    transport: Arc<dyn Transport>,
    chain: InterceptorChain,
    fingerprint: u64,
}

impl Engine {
    /// Assemble an engine
    pub fn new(transport: Arc<dyn Transport>, chain: InterceptorChain, fingerprint: u64) -> Self {
        Self {
            transport,
            chain,
            fingerprint,
        }
    }

    /// Fingerprint of the configuration this engine was built from
    pub fn fingerprint(&self) -> u64 {
        self.fingerprint
    }

    /// Run one dispatch: handlers, then the transport hop by hop.
    ///
    /// Redirects are followed up to the request's `max_redirects`; the
    /// cookie jar is applied to every hop. The compiled request is left
    /// untouched; handlers and redirects act on a working copy.
    pub async fn execute(&self, compiled: &CompiledRequest) -> Result<Response> {
        let mut request = compiled.clone();
        let max_redirects = request.options.max_redirects()?;

        match self.chain.process_request(&mut request).await {
            InterceptAction::Continue => {}
            InterceptAction::Abort(reason) => {
                let err = Error::Aborted(reason);
                self.chain.notify_error(&request, &err).await;
                return Err(err);
            }
            InterceptAction::Respond(response) => {
                tracing::debug!(url = %request.url, "Request answered by handler");
                return Ok(response);
            }
        }

        let mut explicit_cookie = request.header(COOKIE).map(str::to_string);
        let mut hops = 0;
        let mut elapsed = 0;

        let mut response = loop {
            attach_cookies(&mut request, explicit_cookie.as_deref());

            let response = match self.transport.send(&request).await {
                Ok(response) => response,
                Err(err) => {
                    self.chain.notify_error(&request, &err).await;
                    return Err(err);
                }
            };
            elapsed += response.response_time_ms;
            capture_cookies(&request, &response);

            if max_redirects == 0 {
                break response;
            }
            let Some((next, same_origin)) = redirect_target(&request, &response) else {
                break response;
            };
            if hops == max_redirects {
                let err = Error::network(format!(
                    "too many redirects (limit {}) at {}",
                    max_redirects, request.url
                ));
                self.chain.notify_error(&request, &err).await;
                return Err(err);
            }

            tracing::debug!(
                status = response.status_code(),
                from = %request.url,
                to = %next.url,
                "Following redirect"
            );
            hops += 1;
            if !same_origin {
                explicit_cookie = None;
            }
            request = next;
        };

        if hops > 0 {
            response.redirected = true;
            response.response_time_ms = elapsed;
        }

        self.chain.process_response(&request, &mut response).await?;
        Ok(response)
    }
}

/// Set the Cookie header from an explicit value plus the jar's cookies
fn attach_cookies(request: &mut CompiledRequest, explicit: Option<&str>) {
    let from_jar = request
        .cookies
        .as_ref()
        .and_then(|jar| jar.get_cookie_header(&request.url));

    let value = match (explicit, from_jar) {
        (Some(explicit), Some(jar)) => Some(format!("{}; {}", explicit, jar)),
        (Some(explicit), None) => Some(explicit.to_string()),
        (None, jar) => jar,
    };

    match value {
        Some(value) => request.headers.insert(COOKIE, value),
        None => {
            request.headers.remove(COOKIE);
        }
    }
}

/// Store Set-Cookie headers in the jar and persist it
fn capture_cookies(request: &CompiledRequest, response: &Response) {
    let Some(ref jar) = request.cookies else {
        return;
    };
    let set_cookies = response.set_cookies();
    if set_cookies.is_empty() {
        return;
    }
    for header in set_cookies {
        jar.add_from_header(header, &response.url);
    }
    if let Err(e) = jar.persist() {
        tracing::warn!(error = %e, "Failed to persist cookie jar");
    }
}

/// The request to send next if `response` redirects, and whether the
/// target keeps the same origin.
///
/// 301, 302 and 303 turn anything but GET and HEAD into a bodiless GET;
/// 307 and 308 replay the request as is. Credentials are dropped when the
/// origin changes.
fn redirect_target(
    request: &CompiledRequest,
    response: &Response,
) -> Option<(CompiledRequest, bool)> {
    let status = response.status;
    let rewrite_to_get = match status {
        StatusCode::MOVED_PERMANENTLY | StatusCode::FOUND | StatusCode::SEE_OTHER => {
            request.method != Method::GET && request.method != Method::HEAD
        }
        StatusCode::TEMPORARY_REDIRECT | StatusCode::PERMANENT_REDIRECT => false,
        _ => return None,
    };

    let location = response.header(LOCATION)?;
    let url = match request.url.join(location) {
        Ok(url) => url,
        Err(e) => {
            tracing::warn!(location, error = %e, "Ignoring unparsable redirect location");
            return None;
        }
    };

    let same_origin = url.origin() == request.url.origin();
    let mut next = request.clone();
    if rewrite_to_get {
        next.method = Method::GET;
        next.body = None;
        next.headers.remove(CONTENT_TYPE);
    }
    if !same_origin {
        next.headers.remove(AUTHORIZATION);
    }
    next.url = url;
    Some((next, same_origin))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::options::MAX_REDIRECTS;
    use crate::http::{CookieJar, TransportOptions};
    use url::Url;

    fn request(cookies: Option<CookieJar>) -> CompiledRequest {
        CompiledRequest {
            method: Method::GET,
            url: Url::parse("https://example.com/items").unwrap(),
            headers: OptionMap::new(),
            body: None,
            options: Default::default(),
            timeout: None,
            cookies,
        }
    }

    struct Echo;

    #[async_trait]
    impl Transport for Echo {
        async fn send(&self, request: &CompiledRequest) -> Result<Response> {
            let cookie = request.header("cookie").unwrap_or("").to_string();
            Response::from_parts(
                200,
                vec![("set-cookie", "fresh=1; Path=/")],
                cookie,
                request.url.clone(),
            )
        }
    }

    #[tokio::test]
    async fn test_mock_transport() {
        let mock = MockResponse::new(404, "not found").header("content-type", "text/plain");
        let engine = Engine::new(Arc::new(MockTransport::new(mock)), InterceptorChain::new(), 0);

        let response = engine.execute(&request(None)).await.unwrap();

        assert_eq!(response.status_code(), 404);
        assert_eq!(response.text().unwrap(), "not found");
        assert_eq!(response.content_type(), Some("text/plain"));
    }

    #[tokio::test]
    async fn test_cookie_round_trip() {
        let jar = CookieJar::new();
        jar.set_cookie("sid", "abc", "example.com");
        let engine = Engine::new(Arc::new(Echo), InterceptorChain::new(), 0);
        let compiled = request(Some(jar.clone()));

        let response = engine.execute(&compiled).await.unwrap();

        assert_eq!(response.text().unwrap(), "sid=abc");
        assert_eq!(jar.get_cookie_by_name("fresh").unwrap().value, "1");
        // the compiled artifact is unchanged
        assert!(compiled.header("cookie").is_none());
    }

    #[tokio::test]
    async fn test_cookies_disabled() {
        let engine = Engine::new(Arc::new(Echo), InterceptorChain::new(), 0);
        let response = engine.execute(&request(None)).await.unwrap();
        assert_eq!(response.text().unwrap(), "");
    }

    /// `/login` redirects to `/home` and sets a session cookie; `/home`
    /// echoes the Cookie header it received
    struct LoginFlow;

    #[async_trait]
    impl Transport for LoginFlow {
        async fn send(&self, request: &CompiledRequest) -> Result<Response> {
            match request.url.path() {
                "/login" => Response::from_parts(
                    302,
                    vec![("set-cookie", "sid=abc; Path=/"), ("location", "/home")],
                    "",
                    request.url.clone(),
                ),
                _ => Response::from_parts(
                    200,
                    Vec::<(&str, &str)>::new(),
                    format!("{} {}", request.method, request.header("cookie").unwrap_or("")),
                    request.url.clone(),
                ),
            }
        }
    }

    fn login_request(method: Method, max_redirects: i64) -> CompiledRequest {
        let mut options = TransportOptions::new();
        options.add(MAX_REDIRECTS, max_redirects).unwrap();
        CompiledRequest {
            method,
            url: Url::parse("https://example.com/login").unwrap(),
            body: Some(Bytes::from_static(b"user=ann")),
            options,
            ..request(Some(CookieJar::new()))
        }
    }

    #[tokio::test]
    async fn test_redirect_carries_cookies() {
        let engine = Engine::new(Arc::new(LoginFlow), InterceptorChain::new(), 0);
        let compiled = login_request(Method::POST, 5);

        let response = engine.execute(&compiled).await.unwrap();

        assert_eq!(response.status_code(), 200);
        assert!(response.redirected);
        assert_eq!(response.url.path(), "/home");
        // 302 after POST continues as GET, with the cookie set on the first hop
        assert_eq!(response.text().unwrap(), "GET sid=abc");
        let jar = compiled.cookies.as_ref().unwrap();
        assert_eq!(jar.get_cookie_by_name("sid").unwrap().value, "abc");
    }

    #[tokio::test]
    async fn test_redirects_disabled() {
        let engine = Engine::new(Arc::new(LoginFlow), InterceptorChain::new(), 0);
        let compiled = login_request(Method::GET, 0);

        let response = engine.execute(&compiled).await.unwrap();

        assert_eq!(response.status_code(), 302);
        assert!(!response.redirected);
        // the cookie is still captured from the unfollowed hop
        let jar = compiled.cookies.as_ref().unwrap();
        assert!(jar.get_cookie_by_name("sid").is_some());
    }

    #[tokio::test]
    async fn test_redirect_limit() {
        let mock = MockResponse::new(307, "").header("location", "/again");
        let engine = Engine::new(Arc::new(MockTransport::new(mock)), InterceptorChain::new(), 0);

        let err = engine.execute(&login_request(Method::GET, 3)).await.unwrap_err();

        assert!(err.is_transport());
        assert!(err.to_string().contains("too many redirects"), "{err}");
    }

    #[test]
    fn test_cross_origin_redirect_drops_credentials() {
        let mut compiled = login_request(Method::PUT, 5);
        compiled.headers.insert("Authorization", "Bearer t".to_string());
        compiled.headers.insert("Content-Type", "text/plain".to_string());
        let response = Response::from_parts(
            308,
            vec![("location", "https://other.org/next")],
            "",
            compiled.url.clone(),
        )
        .unwrap();

        let (next, same_origin) = redirect_target(&compiled, &response).unwrap();

        assert!(!same_origin);
        assert_eq!(next.method, Method::PUT);
        assert!(next.body.is_some());
        assert!(next.header("authorization").is_none());
        assert_eq!(next.header("content-type"), Some("text/plain"));
    }

    #[test]
    fn test_reqwest_transport_rejects_bad_proxy() {
        let settings = EngineSettings {
            connect_timeout: std::time::Duration::from_secs(1),
            verify: true,
            user_agent: "test".into(),
            proxy: Some("http://[::1".into()),
        };
        assert!(ReqwestTransport::new(&settings).is_err());
    }
}
