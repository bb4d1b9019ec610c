// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Request handler middleware
//!
//! Handlers registered under the `handler` transport option wrap every
//! dispatch: they see the compiled request before it reaches the transport
//! and the response before it reaches the caller.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::{Error, Result};
use crate::http::headers::AUTHORIZATION;
use crate::http::{CompiledRequest, Response};

/// Request handler trait
///
/// # Example
///
/// ```rust,no_run
/// use courier::network::{RequestInterceptor, InterceptAction};
/// use courier::http::CompiledRequest;
/// use async_trait::async_trait;
///
/// struct RequestId(String);
///
/// #[async_trait]
/// impl RequestInterceptor for RequestId {
///     async fn before_request(&self, req: &mut CompiledRequest) -> InterceptAction {
///         req.headers.insert("x-request-id", self.0.clone());
///         InterceptAction::Continue
///     }
/// }
/// ```
#[async_trait]
#[allow(unused_variables)]
pub trait RequestInterceptor: Send + Sync {
    /// Called before a request is sent
    ///
    /// Can modify the outgoing request, abort it, or answer it directly.
    async fn before_request(&self, request: &mut CompiledRequest) -> InterceptAction {
        InterceptAction::Continue
    }

    /// Called after a response is received
    async fn after_response(
        &self,
        request: &CompiledRequest,
        response: &mut Response,
    ) -> Result<()> {
        Ok(())
    }

    /// Called when the request fails
    async fn on_error(&self, request: &CompiledRequest, error: &Error) {}

    /// Filter - return true if this handler should see the request
    fn should_intercept(&self, request: &CompiledRequest) -> bool {
        true
    }

    /// Priority - higher priority handlers run first
    fn priority(&self) -> i32 {
        0
    }
}

/// Action to take after a handler inspected a request
#[derive(Debug, Clone)]
pub enum InterceptAction {
    /// Continue with the (possibly modified) request
    Continue,
    /// Abort the request with an error
    Abort(String),
    /// Answer with this response instead of calling the transport
    Respond(Response),
}

/// Header injector - adds fixed headers to matching requests
pub struct HeaderInjector {
    /// Headers to inject into every request
    headers: Vec<(String, String)>,
    /// Hosts to inject into (empty = all)
    domains: Vec<String>,
}

impl HeaderInjector {
    /// Create a new header injector
    pub fn new() -> Self {
        Self {
            headers: Vec::new(),
            domains: Vec::new(),
        }
    }

    /// Add a bearer token
    pub fn bearer_token(self, token: impl Into<String>) -> Self {
        self.header(AUTHORIZATION, format!("Bearer {}", token.into()))
    }

    /// Add basic auth
    pub fn basic_auth(self, username: &str, password: &str) -> Self {
        let encoded = base64::Engine::encode(
            &base64::engine::general_purpose::STANDARD,
            format!("{}:{}", username, password),
        );
        self.header(AUTHORIZATION, format!("Basic {}", encoded))
    }

    /// Add custom header
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Restrict to specific hosts
    pub fn for_domains(mut self, domains: Vec<String>) -> Self {
        self.domains = domains;
        self
    }
}

impl Default for HeaderInjector {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RequestInterceptor for HeaderInjector {
    fn should_intercept(&self, request: &CompiledRequest) -> bool {
        if self.domains.is_empty() {
            return true;
        }

        request
            .url
            .host_str()
            .map(|host| self.domains.iter().any(|d| host.contains(d.as_str())))
            .unwrap_or(false)
    }

    async fn before_request(&self, request: &mut CompiledRequest) -> InterceptAction {
        for (name, value) in &self.headers {
            request.headers.insert(name.clone(), value.clone());
        }
        InterceptAction::Continue
    }

    fn priority(&self) -> i32 {
        100
    }
}

/// Request logger handler
#[derive(Default)]
pub struct RequestLogger {
    /// Log request bodies
    pub log_bodies: bool,
    /// Log response bodies
    pub log_responses: bool,
    /// Filter by URL substring
    pub url_filter: Option<String>,
}

#[async_trait]
impl RequestInterceptor for RequestLogger {
    fn should_intercept(&self, request: &CompiledRequest) -> bool {
        match self.url_filter {
            Some(ref filter) => request.url.as_str().contains(filter.as_str()),
            None => true,
        }
    }

    async fn before_request(&self, request: &mut CompiledRequest) -> InterceptAction {
        tracing::info!(
            method = %request.method,
            url = %request.url,
            cookies = request.cookies.is_some(),
            "Request"
        );

        if self.log_bodies {
            if let Some(ref body) = request.body {
                tracing::debug!(body = ?String::from_utf8_lossy(body), "Request body");
            }
        }

        InterceptAction::Continue
    }

    async fn after_response(
        &self,
        request: &CompiledRequest,
        response: &mut Response,
    ) -> Result<()> {
        tracing::info!(
            url = %request.url,
            status = %response.status,
            time_ms = response.response_time_ms,
            "Response"
        );

        if self.log_responses {
            tracing::debug!(body = %response.text_lossy(), "Response body");
        }

        Ok(())
    }

    async fn on_error(&self, request: &CompiledRequest, error: &Error) {
        tracing::warn!(url = %request.url, error = %error, "Request failed");
    }

    fn priority(&self) -> i32 {
        -100
    }
}

/// Interceptor chain - runs handlers in priority, then registration, order
#[derive(Clone, Default)]
pub struct InterceptorChain {
    interceptors: Vec<Arc<dyn RequestInterceptor>>,
}

impl InterceptorChain {
    /// Create a new empty chain
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a chain from a handler stack
    pub fn from_handlers(handlers: &[Arc<dyn RequestInterceptor>]) -> Self {
        let mut chain = Self::new();
        chain.extend(handlers);
        chain
    }

    /// Add a handler
    pub fn push(&mut self, interceptor: Arc<dyn RequestInterceptor>) {
        self.interceptors.push(interceptor);
        self.interceptors
            .sort_by_key(|i| std::cmp::Reverse(i.priority()));
    }

    /// Add several handlers, keeping their relative order
    pub fn extend(&mut self, handlers: &[Arc<dyn RequestInterceptor>]) {
        self.interceptors.extend(handlers.iter().cloned());
        self.interceptors
            .sort_by_key(|i| std::cmp::Reverse(i.priority()));
    }

    /// Number of handlers
    pub fn len(&self) -> usize {
        self.interceptors.len()
    }

    /// Check if the chain is empty
    pub fn is_empty(&self) -> bool {
        self.interceptors.is_empty()
    }

    /// Process request through all handlers
    pub async fn process_request(&self, request: &mut CompiledRequest) -> InterceptAction {
        for interceptor in &self.interceptors {
            if !interceptor.should_intercept(request) {
                continue;
            }

            match interceptor.before_request(request).await {
                InterceptAction::Continue => continue,
                action => return action,
            }
        }
        InterceptAction::Continue
    }

    /// Process response through all handlers
    pub async fn process_response(
        &self,
        request: &CompiledRequest,
        response: &mut Response,
    ) -> Result<()> {
        for interceptor in &self.interceptors {
            if !interceptor.should_intercept(request) {
                continue;
            }
            interceptor.after_response(request, response).await?;
        }
        Ok(())
    }

    /// Notify handlers of an error
    pub async fn notify_error(&self, request: &CompiledRequest, error: &Error) {
        for interceptor in &self.interceptors {
            if interceptor.should_intercept(request) {
                interceptor.on_error(request, error).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::OptionMap;
    use reqwest::Method;
    use url::Url;

    fn request(url: &str) -> CompiledRequest {
        CompiledRequest {
            method: Method::GET,
            url: Url::parse(url).unwrap(),
            headers: OptionMap::new(),
            body: None,
            options: Default::default(),
            timeout: None,
            cookies: None,
        }
    }

    #[tokio::test]
    async fn test_header_injector() {
        let injector = HeaderInjector::new()
            .bearer_token("test_token")
            .header("x-custom", "value");
        let mut req = request("https://api.example.com/");

        injector.before_request(&mut req).await;

        assert_eq!(
            req.headers.get("Authorization").map(String::as_str),
            Some("Bearer test_token")
        );
        assert_eq!(req.headers.get("x-custom").map(String::as_str), Some("value"));
    }

    #[test]
    fn test_header_injector_domains() {
        let injector = HeaderInjector::new()
            .basic_auth("user", "pass")
            .for_domains(vec!["example.com".to_string()]);

        assert!(injector.should_intercept(&request("https://api.example.com/")));
        assert!(!injector.should_intercept(&request("https://other.org/")));
    }

    #[tokio::test]
    async fn test_chain_priority_and_abort() {
        struct Abort;

        #[async_trait]
        impl RequestInterceptor for Abort {
            async fn before_request(&self, _: &mut CompiledRequest) -> InterceptAction {
                InterceptAction::Abort("blocked".into())
            }
        }

        let chain = InterceptorChain::from_handlers(&[
            Arc::new(RequestLogger::default()),
            Arc::new(Abort),
            Arc::new(HeaderInjector::new().header("x-first", "1")),
        ]);
        assert_eq!(chain.len(), 3);

        let mut req = request("https://example.com/");
        let action = chain.process_request(&mut req).await;

        assert!(matches!(action, InterceptAction::Abort(ref r) if r == "blocked"));
        // the injector outranks the abort handler
        assert!(req.headers.contains_key("x-first"));
    }
}
