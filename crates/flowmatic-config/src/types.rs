//! Configuration types mapping to the TOML schema.
//!
//! ```toml
//! [backend]                # backend origin used by the proxy and the client
//! [proxy]                  # proxy listener and header policy
//! [session]                # local storage location and key names
//! [auth]                   # auth endpoint paths on the backend
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::{ConfigError, Result};

/// Environment variable consulted for the backend base URL on every request.
pub const DEFAULT_BACKEND_ENV: &str = "FLOWMATIC_BACKEND_URL";

/// Default listen address for the proxy.
pub const DEFAULT_PROXY_BIND: &str = "127.0.0.1:3000";

/// Default mount point of the catch-all proxy route.
pub const DEFAULT_MOUNT_PATH: &str = "/api/backend";

/// Default storage file name within the config directory.
pub const DEFAULT_STORAGE_FILE: &str = "local-storage.json";

// ─────────────────────────────────────────────────────────────────────────────
// Top-level Config
// ─────────────────────────────────────────────────────────────────────────────

/// Root configuration structure.
///
/// All sections are optional so that partial configs (e.g. a project-local
/// override that only sets `[backend]`) can be loaded and merged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlowmaticConfig {
    /// Backend origin.
    pub backend: Option<BackendSection>,

    /// Proxy listener settings.
    pub proxy: Option<ProxySection>,

    /// Session storage settings.
    pub session: Option<SessionSection>,

    /// Auth endpoint paths.
    pub auth: Option<AuthSection>,
}

impl FlowmaticConfig {
    /// Create an empty config.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Serialize to a TOML string.
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Merge another config on top of this one (other takes priority).
    pub fn merge(&mut self, other: FlowmaticConfig) {
        if other.backend.is_some() {
            self.backend = other.backend;
        }

        if other.proxy.is_some() {
            self.proxy = other.proxy;
        }

        if other.session.is_some() {
            self.session = other.session;
        }

        if other.auth.is_some() {
            self.auth = other.auth;
        }
    }

    /// Name of the environment variable holding the backend base URL.
    pub fn backend_env_var(&self) -> String {
        self.backend
            .as_ref()
            .and_then(|b| b.base_url_env.clone())
            .unwrap_or_else(|| DEFAULT_BACKEND_ENV.to_string())
    }

    /// Backend base URL from the config file, if any.
    pub fn backend_base_url(&self) -> Option<&str> {
        self.backend.as_ref().and_then(|b| b.base_url.as_deref())
    }

    /// Proxy bind address, parsed.
    pub fn proxy_bind(&self) -> Result<SocketAddr> {
        let raw = self
            .proxy
            .as_ref()
            .and_then(|p| p.bind.as_deref())
            .unwrap_or(DEFAULT_PROXY_BIND);
        raw.parse().map_err(|e| ConfigError::InvalidValue {
            field: "proxy.bind".to_string(),
            reason: format!("{}: {}", raw, e),
        })
    }

    /// Proxy section, or defaults when absent.
    pub fn proxy_or_default(&self) -> ProxySection {
        self.proxy.clone().unwrap_or_default()
    }

    /// Session section, or defaults when absent.
    pub fn session_or_default(&self) -> SessionSection {
        self.session.clone().unwrap_or_default()
    }

    /// Auth section, or defaults when absent.
    pub fn auth_or_default(&self) -> AuthSection {
        self.auth.clone().unwrap_or_default()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Sections
// ─────────────────────────────────────────────────────────────────────────────

/// `[backend]` section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendSection {
    /// Fallback base URL when the environment variable is unset.
    pub base_url: Option<String>,
    /// Override the environment variable name read per request.
    pub base_url_env: Option<String>,
}

/// `[proxy]` section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProxySection {
    /// Listen address (`host:port`).
    pub bind: Option<String>,
    /// Mount point of the catch-all route.
    pub mount_path: Option<String>,
    /// Header names forwarded to the backend. Replaces the built-in list.
    pub allowed_headers: Option<Vec<String>>,
    /// Attach a permissive CORS layer.
    pub enable_cors: Option<bool>,
}

impl ProxySection {
    pub fn mount_path(&self) -> &str {
        self.mount_path.as_deref().unwrap_or(DEFAULT_MOUNT_PATH)
    }
}

/// `[session]` section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionSection {
    /// Path of the local storage file. Defaults to the config directory.
    pub storage_path: Option<PathBuf>,
    /// Storage key names.
    pub keys: Option<StorageKeyNames>,
}

/// Key names used in local storage. Unset names fall back to the
/// session crate's defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageKeyNames {
    pub user: Option<String>,
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub token_expiry: Option<String>,
}

/// `[auth]` section: endpoint paths relative to the backend base URL.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthSection {
    pub login_path: Option<String>,
    pub register_path: Option<String>,
    pub logout_path: Option<String>,
    pub refresh_path: Option<String>,
}
