//! Where the proxy finds the backend base URL.
//!
//! The URL is resolved on every request, so a change to the environment
//! takes effect without restarting the server.

use std::sync::Arc;

use crate::error::{ProxyError, Result};

/// Source of the backend base URL.
pub trait BackendSource: Send + Sync + std::fmt::Debug {
    /// Resolve the base URL for the current request.
    fn base_url(&self) -> Result<String>;
}

/// Shared backend source handle.
pub type SharedBackendSource = Arc<dyn BackendSource>;

/// Reads the base URL from an environment variable, with an optional fallback.
#[derive(Debug, Clone)]
pub struct EnvBackend {
    var: String,
    fallback: Option<String>,
}

impl EnvBackend {
    pub fn new(var: impl Into<String>) -> Self {
        Self {
            var: var.into(),
            fallback: None,
        }
    }

    /// Value used when the variable is unset or empty.
    pub fn with_fallback(mut self, fallback: impl Into<String>) -> Self {
        self.fallback = Some(fallback.into());
        self
    }

    pub fn var(&self) -> &str {
        &self.var
    }
}

impl BackendSource for EnvBackend {
    fn base_url(&self) -> Result<String> {
        std::env::var(&self.var)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .or_else(|| self.fallback.clone())
            .ok_or_else(|| ProxyError::MissingBackend(format!("set {}", self.var)))
    }
}

/// A fixed base URL.
#[derive(Debug, Clone)]
pub struct StaticBackend(String);

impl StaticBackend {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self(base_url.into())
    }
}

impl BackendSource for StaticBackend {
    fn base_url(&self) -> Result<String> {
        Ok(self.0.clone())
    }
}
