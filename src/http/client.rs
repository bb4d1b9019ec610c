// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Shared client configuration
//!
//! [`ClientConfig`] is cheap to clone and safe to share between tasks.
//! Every mutation publishes a new immutable [`ClientSnapshot`]; a request
//! reads exactly one snapshot when it compiles, so per-request choices
//! never write back into the shared configuration.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::path::Path;
use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::RwLock;
use reqwest::Method;

use super::builder::RequestBuilder;
use super::cookie::CookieJar;
use super::engine::{Engine, MockResponse, MockTransport, ReqwestTransport, Transport};
use super::merge::OptionMap;
use super::options::{OptionValue, TransportOptions, PROXY};
use super::response::Response;
use crate::error::Result;
use crate::network::{InterceptorChain, RequestInterceptor};

/// Immutable view of a client's configuration
#[derive(Clone, Default)]
pub struct ClientSnapshot {
    /// Headers merged beneath every request that keeps default headers on
    pub default_headers: OptionMap<String>,
    /// Options added to the client, without the baseline
    pub options: TransportOptions,
    /// Canned response replacing the transport
    pub mock: Option<MockResponse>,
    /// Caller-supplied transport replacing reqwest
    pub transport: Option<Arc<dyn Transport>>,
    fingerprint: u64,
}

impl ClientSnapshot {
    /// Baseline options with the client's options folded on top
    pub fn merged_transport_options(&self) -> TransportOptions {
        TransportOptions::defaults().merged_with(&self.options)
    }

    /// Fingerprint of everything that shapes this client's engine
    pub fn fingerprint(&self) -> u64 {
        self.fingerprint
    }

    fn fingerprint_for(&self, options: &TransportOptions) -> u64 {
        let mut hasher = DefaultHasher::new();
        options.hash_engine_subset(&mut hasher);
        match self.mock {
            Some(ref mock) => {
                1u8.hash(&mut hasher);
                mock.hash_into(&mut hasher);
            }
            None => 0u8.hash(&mut hasher),
        }
        if let Some(ref transport) = self.transport {
            (Arc::as_ptr(transport) as *const () as usize).hash(&mut hasher);
        }
        hasher.finish()
    }

    fn refresh_fingerprint(&mut self) {
        self.fingerprint = self.fingerprint_for(&self.merged_transport_options());
    }

    fn build_engine(&self, options: &TransportOptions, fingerprint: u64) -> Result<Engine> {
        let transport: Arc<dyn Transport> = match (&self.mock, &self.transport) {
            (Some(mock), _) => Arc::new(MockTransport::new(mock.clone())),
            (None, Some(transport)) => transport.clone(),
            (None, None) => Arc::new(ReqwestTransport::new(&options.engine_settings()?)?),
        };
        Ok(Engine::new(
            transport,
            InterceptorChain::from_handlers(options.handlers()),
            fingerprint,
        ))
    }
}

struct ClientInner {
    snapshot: RwLock<Arc<ClientSnapshot>>,
    cookie_jar: RwLock<Option<CookieJar>>,
    engines: DashMap<u64, Arc<Engine>>,
}

/// Long-lived HTTP client configuration shared by many requests
#[derive(Clone)]
pub struct ClientConfig {
    inner: Arc<ClientInner>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl ClientConfig {
    /// Create a client with baseline settings
    pub fn new() -> Self {
        let mut snapshot = ClientSnapshot::default();
        snapshot.refresh_fingerprint();
        Self {
            inner: Arc::new(ClientInner {
                snapshot: RwLock::new(Arc::new(snapshot)),
                cookie_jar: RwLock::new(None),
                engines: DashMap::new(),
            }),
        }
    }

    /// Current configuration
    pub fn snapshot(&self) -> Arc<ClientSnapshot> {
        self.inner.snapshot.read().clone()
    }

    fn update<T>(&self, f: impl FnOnce(&mut ClientSnapshot) -> Result<T>) -> Result<T> {
        let mut guard = self.inner.snapshot.write();
        let mut next = ClientSnapshot::clone(&guard);
        let out = f(&mut next)?;
        next.refresh_fingerprint();
        if next.fingerprint != guard.fingerprint {
            tracing::debug!(
                old = guard.fingerprint,
                new = next.fingerprint,
                "Engine configuration changed"
            );
            self.inner.engines.clear();
        }
        *guard = Arc::new(next);
        Ok(out)
    }

    /// Route requests through a proxy (`host:port` or a proxy URL)
    pub fn set_proxy(&self, proxy: impl Into<String>) {
        let proxy = proxy.into();
        let _ = self.update(|s| s.options.add(PROXY, proxy));
    }

    /// Replace the default headers
    pub fn set_default_headers<K, V>(&self, headers: impl IntoIterator<Item = (K, V)>)
    where
        K: Into<String>,
        V: Into<String>,
    {
        let headers: OptionMap<String> = headers.into_iter().map(|(k, v)| (k, v.into())).collect();
        let _ = self.update(|s| {
            s.default_headers = headers;
            Ok(())
        });
    }

    /// Current default headers
    pub fn default_headers(&self) -> OptionMap<String> {
        self.snapshot().default_headers.clone()
    }

    /// Add a transport option.
    ///
    /// Values under the `handler` key are appended to the handler stack;
    /// every other key overwrites its previous value.
    pub fn add_transport_option(&self, key: &str, value: impl Into<OptionValue>) -> Result<()> {
        let value = value.into();
        self.update(|s| s.options.add(key, value))
    }

    /// Append a handler to the client's handler stack
    pub fn add_handler<I: RequestInterceptor + 'static>(&self, handler: I) {
        let handler: Arc<dyn RequestInterceptor> = Arc::new(handler);
        let _ = self.update(|s| {
            s.options.add_handler(handler);
            Ok(())
        });
    }

    /// Client options folded onto the baseline, as used for engine builds
    pub fn merged_transport_options(&self) -> TransportOptions {
        self.snapshot().merged_transport_options()
    }

    /// Answer every request with `mock` until cleared or replaced
    pub fn mock_response(&self, mock: MockResponse) {
        let _ = self.update(|s| {
            s.mock = Some(mock);
            Ok(())
        });
    }

    /// Remove the mock response
    pub fn clear_mock(&self) {
        let _ = self.update(|s| {
            s.mock = None;
            Ok(())
        });
    }

    /// Replace the reqwest engine with a custom transport
    pub fn set_transport(&self, transport: Arc<dyn Transport>) {
        let _ = self.update(|s| {
            s.transport = Some(transport);
            Ok(())
        });
    }

    /// The shared cookie jar, created on first access
    pub fn cookie_jar(&self) -> CookieJar {
        if let Some(ref jar) = *self.inner.cookie_jar.read() {
            return jar.clone();
        }
        self.inner
            .cookie_jar
            .write()
            .get_or_insert_with(CookieJar::new)
            .clone()
    }

    /// Swap in a jar backed by `path`, loading the file if it exists
    pub fn set_cookie_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let jar = CookieJar::file_backed(path)?;
        *self.inner.cookie_jar.write() = Some(jar);
        Ok(())
    }

    /// Swap in a fresh in-memory jar
    pub fn reset_cookies(&self) {
        *self.inner.cookie_jar.write() = Some(CookieJar::new());
    }

    /// Write a cookie into the live jar
    pub fn add_cookie(&self, name: impl Into<String>, value: impl Into<String>, domain: &str) {
        self.cookie_jar().set_cookie(name, value, domain);
    }

    /// Engine for a request compiled against `snapshot`.
    ///
    /// Engines for the client's own configuration are cached by
    /// fingerprint. Requests that override engine options or bring their
    /// own handlers get an uncached engine, and an engine built from a
    /// superseded snapshot is never cached.
    pub(crate) fn engine_for(
        &self,
        snapshot: &ClientSnapshot,
        request_options: &TransportOptions,
        merged: &TransportOptions,
    ) -> Result<Arc<Engine>> {
        if request_options.affects_engine() {
            let fingerprint = snapshot.fingerprint_for(merged);
            tracing::debug!(fingerprint, "Building request-scoped engine");
            return Ok(Arc::new(snapshot.build_engine(merged, fingerprint)?));
        }

        let fingerprint = snapshot.fingerprint;
        if let Some(engine) = self.inner.engines.get(&fingerprint) {
            return Ok(engine.clone());
        }

        tracing::debug!(fingerprint, "Building transport engine");
        let engine = Arc::new(snapshot.build_engine(merged, fingerprint)?);

        // holding the read lock keeps `update` from clearing the cache
        // between the check and the insert
        let current = self.inner.snapshot.read();
        if current.fingerprint == fingerprint {
            self.inner.engines.insert(fingerprint, engine.clone());
        }
        Ok(engine)
    }

    /// Number of cached engines
    pub fn cached_engines(&self) -> usize {
        self.inner.engines.len()
    }

    /// Start a request; the method is resolved from the body at compile time
    pub fn request(&self, url: impl Into<String>) -> RequestBuilder {
        RequestBuilder::new(self.clone(), url)
    }

    /// Start a GET request
    pub fn get(&self, url: impl Into<String>) -> RequestBuilder {
        self.request(url).set_method(Method::GET)
    }

    /// Start a POST request
    pub fn post(&self, url: impl Into<String>) -> RequestBuilder {
        self.request(url).set_method(Method::POST)
    }

    /// Start a PUT request
    pub fn put(&self, url: impl Into<String>) -> RequestBuilder {
        self.request(url).set_method(Method::PUT)
    }

    /// Start a DELETE request
    pub fn delete(&self, url: impl Into<String>) -> RequestBuilder {
        self.request(url).set_method(Method::DELETE)
    }

    /// Dispatch several requests concurrently
    pub async fn dispatch_all(&self, requests: Vec<RequestBuilder>) -> Vec<Result<Response>> {
        let futures = requests.into_iter().map(|mut request| async move {
            request.get_http_response().await
        });
        futures::future::join_all(futures).await
    }
}
