// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Transport option bag
//!
//! Options are keyed case-insensitively. Most keys hold a single value and
//! a later write replaces an earlier one; the [`HANDLER`] key accumulates an
//! ordered middleware stack instead.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use std::time::Duration;

use super::merge::OptionMap;
use super::DEFAULT_USER_AGENT;
use crate::error::{Error, Result};
use crate::network::RequestInterceptor;

/// Handler stack key; values accumulate
pub const HANDLER: &str = "handler";
/// Total request timeout, in seconds
pub const TIMEOUT: &str = "timeout";
/// Connect timeout, in seconds
pub const CONNECT_TIMEOUT: &str = "connect_timeout";
/// Maximum redirects to follow; 0 disables redirects
pub const MAX_REDIRECTS: &str = "max_redirects";
/// Verify TLS certificates
pub const VERIFY: &str = "verify";
/// User agent sent by the engine
pub const USER_AGENT: &str = "user_agent";
/// Proxy, as `host:port` or a full URL
pub const PROXY: &str = "proxy";

/// Keys whose value shapes the transport engine itself
const ENGINE_KEYS: [&str; 4] = [CONNECT_TIMEOUT, VERIFY, USER_AGENT, PROXY];

/// Shared request handler
pub type Handler = Arc<dyn RequestInterceptor>;

/// A transport option value
#[derive(Clone)]
pub enum OptionValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Handler(Handler),
}

impl OptionValue {
    /// Value as a boolean
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            OptionValue::Bool(b) => Some(*b),
            OptionValue::Int(i) => Some(*i != 0),
            OptionValue::Str(s) => s.parse().ok(),
            _ => None,
        }
    }

    /// Value as a non-negative integer
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            OptionValue::Int(i) => u64::try_from(*i).ok(),
            OptionValue::Float(x) if *x >= 0.0 => Some(*x as u64),
            OptionValue::Str(s) => s.parse().ok(),
            _ => None,
        }
    }

    /// Value as a duration in seconds
    pub fn as_duration(&self) -> Option<Duration> {
        match self {
            OptionValue::Int(i) => u64::try_from(*i).ok().map(Duration::from_secs),
            OptionValue::Float(x) => Duration::try_from_secs_f64(*x).ok(),
            OptionValue::Str(s) => s
                .parse::<f64>()
                .ok()
                .and_then(|x| Duration::try_from_secs_f64(x).ok()),
            _ => None,
        }
    }

    /// Value as a string
    pub fn as_str(&self) -> Option<&str> {
        match self {
            OptionValue::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Value as a handler
    pub fn as_handler(&self) -> Option<&Handler> {
        match self {
            OptionValue::Handler(h) => Some(h),
            _ => None,
        }
    }

    fn hash_into<H: Hasher>(&self, state: &mut H) {
        match self {
            OptionValue::Bool(b) => (0u8, b).hash(state),
            OptionValue::Int(i) => (1u8, i).hash(state),
            OptionValue::Float(x) => (2u8, x.to_bits()).hash(state),
            OptionValue::Str(s) => (3u8, s).hash(state),
            OptionValue::Handler(h) => (4u8, handler_id(h)).hash(state),
        }
    }
}

/// Identity of a handler, for fingerprinting
pub(crate) fn handler_id(handler: &Handler) -> usize {
    Arc::as_ptr(handler) as *const () as usize
}

impl fmt::Debug for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionValue::Bool(b) => write!(f, "Bool({})", b),
            OptionValue::Int(i) => write!(f, "Int({})", i),
            OptionValue::Float(x) => write!(f, "Float({})", x),
            OptionValue::Str(s) => write!(f, "Str({:?})", s),
            OptionValue::Handler(h) => write!(f, "Handler({:#x})", handler_id(h)),
        }
    }
}

impl PartialEq for OptionValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (OptionValue::Bool(a), OptionValue::Bool(b)) => a == b,
            (OptionValue::Int(a), OptionValue::Int(b)) => a == b,
            (OptionValue::Float(a), OptionValue::Float(b)) => a == b,
            (OptionValue::Str(a), OptionValue::Str(b)) => a == b,
            (OptionValue::Handler(a), OptionValue::Handler(b)) => handler_id(a) == handler_id(b),
            _ => false,
        }
    }
}

impl From<bool> for OptionValue {
    fn from(b: bool) -> Self {
        OptionValue::Bool(b)
    }
}

impl From<i32> for OptionValue {
    fn from(i: i32) -> Self {
        OptionValue::Int(i as i64)
    }
}

impl From<i64> for OptionValue {
    fn from(i: i64) -> Self {
        OptionValue::Int(i)
    }
}

impl From<u32> for OptionValue {
    fn from(i: u32) -> Self {
        OptionValue::Int(i as i64)
    }
}

impl From<usize> for OptionValue {
    fn from(i: usize) -> Self {
        OptionValue::Int(i64::try_from(i).unwrap_or(i64::MAX))
    }
}

impl From<f64> for OptionValue {
    fn from(x: f64) -> Self {
        OptionValue::Float(x)
    }
}

impl From<Duration> for OptionValue {
    fn from(d: Duration) -> Self {
        OptionValue::Float(d.as_secs_f64())
    }
}

impl From<&str> for OptionValue {
    fn from(s: &str) -> Self {
        OptionValue::Str(s.to_string())
    }
}

impl From<String> for OptionValue {
    fn from(s: String) -> Self {
        OptionValue::Str(s)
    }
}

impl From<Handler> for OptionValue {
    fn from(h: Handler) -> Self {
        OptionValue::Handler(h)
    }
}

/// Settings that require a dedicated transport engine
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EngineSettings {
    pub connect_timeout: Duration,
    pub verify: bool,
    pub user_agent: String,
    pub proxy: Option<String>,
}

/// Ordered, case-insensitive option bag with an accumulating handler stack
#[derive(Clone, Default)]
pub struct TransportOptions {
    values: OptionMap<OptionValue>,
    handlers: Vec<Handler>,
}

impl TransportOptions {
    /// Create an empty option bag
    pub fn new() -> Self {
        Self::default()
    }

    /// Baseline engine options every client starts from
    pub fn defaults() -> Self {
        let mut values = OptionMap::new();
        values.insert(TIMEOUT, OptionValue::Int(30));
        values.insert(CONNECT_TIMEOUT, OptionValue::Int(10));
        values.insert(MAX_REDIRECTS, OptionValue::Int(10));
        values.insert(VERIFY, OptionValue::Bool(true));
        values.insert(USER_AGENT, OptionValue::Str(DEFAULT_USER_AGENT.to_string()));
        Self {
            values,
            handlers: Vec::new(),
        }
    }

    /// Add an option.
    ///
    /// Under the [`HANDLER`] key the value is appended to the handler stack;
    /// any other key overwrites. Handlers are only accepted under
    /// [`HANDLER`].
    pub fn add(&mut self, key: &str, value: impl Into<OptionValue>) -> Result<()> {
        let value = value.into();
        if key.eq_ignore_ascii_case(HANDLER) {
            return match value {
                OptionValue::Handler(h) => {
                    self.handlers.push(h);
                    Ok(())
                }
                other => Err(Error::input(format!(
                    "option '{}' expects a handler, got {:?}",
                    HANDLER, other
                ))),
            };
        }
        if value.as_handler().is_some() {
            return Err(Error::input(format!(
                "handlers must be registered under '{}', not '{}'",
                HANDLER, key
            )));
        }
        self.values.insert(key, value);
        Ok(())
    }

    /// Append a handler to the stack
    pub fn add_handler(&mut self, handler: Handler) {
        self.handlers.push(handler);
    }

    /// Get an option value
    pub fn get(&self, key: &str) -> Option<&OptionValue> {
        self.values.get(key)
    }

    /// Registered handlers, in registration order
    pub fn handlers(&self) -> &[Handler] {
        &self.handlers
    }

    /// Iterate non-handler options in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &OptionValue)> {
        self.values.iter()
    }

    /// Check if the bag is empty
    pub fn is_empty(&self) -> bool {
        self.values.is_empty() && self.handlers.is_empty()
    }

    /// Merge `overrides` on top of `self`.
    ///
    /// Values follow the case-insensitive merge rule with `overrides`
    /// winning. Handler stacks concatenate, `self` first.
    pub fn merged_with(&self, overrides: &TransportOptions) -> TransportOptions {
        let mut handlers = self.handlers.clone();
        handlers.extend(overrides.handlers.iter().cloned());
        TransportOptions {
            values: self.values.merged_with(&overrides.values),
            handlers,
        }
    }

    /// Check if these options change how the engine is built
    pub fn affects_engine(&self) -> bool {
        !self.handlers.is_empty() || ENGINE_KEYS.iter().any(|k| self.values.contains_key(k))
    }

    fn duration(&self, key: &str) -> Result<Option<Duration>> {
        match self.values.get(key) {
            None => Ok(None),
            Some(value) => value.as_duration().map(Some).ok_or_else(|| {
                Error::Config(format!("option '{}' is not a duration: {:?}", key, value))
            }),
        }
    }

    /// Per-request timeout
    pub fn timeout(&self) -> Result<Option<Duration>> {
        self.duration(TIMEOUT)
    }

    /// Redirect hops the engine may follow
    pub fn max_redirects(&self) -> Result<usize> {
        match self.values.get(MAX_REDIRECTS) {
            None => Ok(10),
            Some(value) => value
                .as_u64()
                .and_then(|n| usize::try_from(n).ok())
                .ok_or_else(|| {
                    Error::Config(format!("option '{}' is not a count: {:?}", MAX_REDIRECTS, value))
                }),
        }
    }

    /// Extract the engine-shaping subset, with baseline fallbacks
    pub fn engine_settings(&self) -> Result<EngineSettings> {
        let verify = match self.values.get(VERIFY) {
            None => true,
            Some(value) => value.as_bool().ok_or_else(|| {
                Error::Config(format!("option '{}' is not a boolean: {:?}", VERIFY, value))
            })?,
        };
        let user_agent = match self.values.get(USER_AGENT) {
            None => DEFAULT_USER_AGENT.to_string(),
            Some(value) => value.as_str().map(str::to_string).ok_or_else(|| {
                Error::Config(format!("option '{}' is not a string: {:?}", USER_AGENT, value))
            })?,
        };
        let proxy = match self.values.get(PROXY) {
            None => None,
            Some(OptionValue::Str(s)) if s.is_empty() => None,
            Some(value) => Some(value.as_str().map(str::to_string).ok_or_else(|| {
                Error::Config(format!("option '{}' is not a string: {:?}", PROXY, value))
            })?),
        };

        Ok(EngineSettings {
            connect_timeout: self
                .duration(CONNECT_TIMEOUT)?
                .unwrap_or(Duration::from_secs(10)),
            verify,
            user_agent,
            proxy,
        })
    }

    /// Feed the engine-shaping subset into a hasher
    pub(crate) fn hash_engine_subset<H: Hasher>(&self, state: &mut H) {
        for key in ENGINE_KEYS {
            if let Some(value) = self.values.get(key) {
                key.hash(state);
                value.hash_into(state);
            }
        }
        for handler in &self.handlers {
            handler_id(handler).hash(state);
        }
    }
}

impl fmt::Debug for TransportOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransportOptions")
            .field("values", &self.values)
            .field("handlers", &self.handlers.len())
            .finish()
    }
}
