//! GET reverse proxy from the Flowmatic front end to the backend API.
//!
//! Requests to `/api/backend/*path` are replayed against the backend base
//! URL with only allow-listed headers; the backend's status, content type
//! and body are relayed as-is. Transport failures become a 502 with a JSON
//! `error` field.
//!
//! # Components
//!
//! - [`backend`]: per-request resolution of the backend base URL
//! - [`forward`]: header policy, target URL construction, response relay
//! - [`proxy`]: Axum-based proxy server

pub mod backend;
pub mod error;
pub mod forward;
pub mod proxy;

pub use backend::{BackendSource, EnvBackend, SharedBackendSource, StaticBackend};
pub use error::{ProxyError, Result};
pub use forward::{DEFAULT_ALLOWED_HEADERS, Forwarder, parse_allowed_headers};
pub use proxy::{DEFAULT_BACKEND_ENV, DEFAULT_MOUNT_PATH, ProxyConfig, ProxyServer};
