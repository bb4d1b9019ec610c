// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Shared cookie jar
//!
//! One jar lives as long as its [`ClientConfig`](super::ClientConfig).
//! A jar is either purely in memory or backed by a JSON file that is
//! loaded on creation and rewritten by [`CookieJar::persist`].

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::Result;

/// A single HTTP cookie
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cookie {
    pub name: String,
    pub value: String,
    /// Domain the cookie belongs to; empty matches every host
    pub domain: String,
    pub path: String,
    /// Expiration time (None = session cookie)
    pub expires: Option<DateTime<Utc>>,
    /// Only send over HTTPS
    pub secure: bool,
    pub http_only: bool,
}

impl Cookie {
    /// Create a new cookie valid for every path
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            domain: String::new(),
            path: "/".to_string(),
            expires: None,
            secure: false,
            http_only: false,
        }
    }

    /// Set the domain
    pub fn domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = domain.into().trim_start_matches('.').to_string();
        self
    }

    /// Check if the cookie is expired
    pub fn is_expired(&self) -> bool {
        self.expires.map_or(false, |exp| exp < Utc::now())
    }

    /// Check if the cookie should be sent to the given URL
    pub fn matches(&self, url: &Url) -> bool {
        let host = url.host_str().unwrap_or("");
        self.domain_matches(host)
            && url.path().starts_with(&self.path)
            && (!self.secure || url.scheme() == "https")
            && !self.is_expired()
    }

    fn domain_matches(&self, host: &str) -> bool {
        if self.domain.is_empty() {
            return true;
        }
        host == self.domain || host.ends_with(&format!(".{}", self.domain))
    }

    /// Parse a Set-Cookie header value received from `url`
    pub fn parse(header: &str, url: &Url) -> Option<Self> {
        let mut parts = header.split(';');
        let (name, value) = parts.next()?.trim().split_once('=')?;
        if name.trim().is_empty() {
            return None;
        }

        let mut cookie =
            Cookie::new(name.trim(), value.trim()).domain(url.host_str().unwrap_or(""));

        for part in parts.map(str::trim) {
            match part.split_once('=') {
                Some((attr, val)) => {
                    let val = val.trim();
                    match attr.trim().to_ascii_lowercase().as_str() {
                        "domain" => cookie = cookie.domain(val),
                        "path" => cookie.path = val.to_string(),
                        "expires" => {
                            if let Ok(dt) = DateTime::parse_from_rfc2822(val) {
                                cookie.expires = Some(dt.with_timezone(&Utc));
                            }
                        }
                        "max-age" => {
                            if let Ok(secs) = val.parse::<i64>() {
                                cookie.expires = Some(Utc::now() + chrono::Duration::seconds(secs));
                            }
                        }
                        _ => {}
                    }
                }
                None if part.eq_ignore_ascii_case("secure") => cookie.secure = true,
                None if part.eq_ignore_ascii_case("httponly") => cookie.http_only = true,
                None => {}
            }
        }

        Some(cookie)
    }

    /// Convert to cookie header format
    pub fn to_header_value(&self) -> String {
        format!("{}={}", self.name, self.value)
    }
}

/// Thread-safe cookie storage, cheap to clone
#[derive(Debug, Clone, Default)]
pub struct CookieJar {
    /// Cookies stored by domain
    cookies: Arc<DashMap<String, Vec<Cookie>>>,
    /// Backing file, if any
    file: Option<Arc<PathBuf>>,
}

impl CookieJar {
    /// Create a new empty in-memory jar
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a jar backed by `path`, loading it if the file exists
    pub fn file_backed(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let jar = match std::fs::read_to_string(&path) {
            Ok(json) if !json.trim().is_empty() => Self::from_json(&json)?,
            Ok(_) => Self::new(),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Self::new(),
            Err(e) => return Err(e.into()),
        };
        Ok(Self {
            file: Some(Arc::new(path)),
            ..jar
        })
    }

    /// Backing file, if any
    pub fn file(&self) -> Option<&Path> {
        self.file.as_deref().map(PathBuf::as_path)
    }

    /// Add a cookie, replacing one with the same name and path
    pub fn add(&self, cookie: Cookie) {
        let mut entry = self.cookies.entry(cookie.domain.clone()).or_default();
        entry.retain(|c| c.name != cookie.name || c.path != cookie.path);
        entry.push(cookie);
    }

    /// Set a cookie by name, value and domain
    pub fn set_cookie(&self, name: impl Into<String>, value: impl Into<String>, domain: &str) {
        self.add(Cookie::new(name, value).domain(domain));
    }

    /// Find a live cookie by name, in any domain
    pub fn get_cookie_by_name(&self, name: &str) -> Option<Cookie> {
        self.cookies.iter().find_map(|entry| {
            entry
                .value()
                .iter()
                .find(|c| c.name == name && !c.is_expired())
                .cloned()
        })
    }

    /// Add a cookie from a Set-Cookie header
    pub fn add_from_header(&self, header: &str, url: &Url) {
        if let Some(cookie) = Cookie::parse(header, url) {
            self.add(cookie);
        }
    }

    /// Get all cookies for a URL
    pub fn get_cookies(&self, url: &Url) -> Vec<Cookie> {
        self.remove_expired();
        self.cookies
            .iter()
            .flat_map(|entry| entry.value().clone())
            .filter(|c| c.matches(url))
            .collect()
    }

    /// Get Cookie header value for a URL
    pub fn get_cookie_header(&self, url: &Url) -> Option<String> {
        let cookies = self.get_cookies(url);
        if cookies.is_empty() {
            return None;
        }

        Some(
            cookies
                .iter()
                .map(Cookie::to_header_value)
                .collect::<Vec<_>>()
                .join("; "),
        )
    }

    /// Remove cookies, optionally narrowed by domain, path and name.
    ///
    /// With no filters the whole jar is emptied.
    pub fn clear(&self, domain: Option<&str>, path: Option<&str>, name: Option<&str>) {
        let keep = |c: &Cookie| {
            path.map_or(false, |p| c.path != p) || name.map_or(false, |n| c.name != n)
        };

        match domain {
            Some(domain) => {
                if let Some(mut cookies) = self.cookies.get_mut(domain.trim_start_matches('.')) {
                    cookies.retain(|c| keep(c));
                }
            }
            None => {
                for mut entry in self.cookies.iter_mut() {
                    entry.value_mut().retain(|c| keep(c));
                }
            }
        }
        self.cookies.retain(|_, cookies| !cookies.is_empty());
    }

    fn remove_expired(&self) {
        for mut entry in self.cookies.iter_mut() {
            entry.value_mut().retain(|c| !c.is_expired());
        }
    }

    /// Get total cookie count
    pub fn len(&self) -> usize {
        self.cookies.iter().map(|e| e.value().len()).sum()
    }

    /// Check if jar is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Export all cookies as JSON
    pub fn to_json(&self) -> serde_json::Result<String> {
        let all_cookies: Vec<Cookie> = self
            .cookies
            .iter()
            .flat_map(|e| e.value().clone())
            .collect();
        serde_json::to_string(&all_cookies)
    }

    /// Import cookies from JSON
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        let cookies: Vec<Cookie> = serde_json::from_str(json)?;
        let jar = CookieJar::new();
        for cookie in cookies {
            jar.add(cookie);
        }
        Ok(jar)
    }

    /// Write the jar to its backing file; a no-op for in-memory jars
    pub fn persist(&self) -> Result<()> {
        if let Some(ref path) = self.file {
            std::fs::write(path.as_path(), self.to_json()?)?;
        }
        Ok(())
    }
}
