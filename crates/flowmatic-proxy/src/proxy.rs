//! HTTP server exposing the backend proxy.
//!
//! `GET {mount}/{*path}` is forwarded to the backend; every other verb on
//! that route is answered by the router with 405.

use axum::{
    Json, Router as AxumRouter,
    extract::State,
    http::{HeaderMap, HeaderName, Uri},
    response::{IntoResponse, Response},
    routing::get,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::backend::{EnvBackend, SharedBackendSource};
use crate::error::ProxyError;
use crate::forward::{Forwarder, default_allowed_headers};

/// Environment variable holding the backend base URL unless configured otherwise.
pub const DEFAULT_BACKEND_ENV: &str = "FLOWMATIC_BACKEND_URL";

/// Route prefix the proxy is mounted under.
pub const DEFAULT_MOUNT_PATH: &str = "/api/backend";

/// Configuration for the proxy server.
#[derive(Debug, Clone)]
pub struct ProxyConfig {
    pub bind_addr: SocketAddr,
    pub mount_path: String,
    pub allowed_headers: Vec<HeaderName>,
    pub enable_cors: bool,
    pub backend: SharedBackendSource,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 0)),
            mount_path: DEFAULT_MOUNT_PATH.to_string(),
            allowed_headers: default_allowed_headers(),
            enable_cors: false,
            backend: Arc::new(EnvBackend::new(DEFAULT_BACKEND_ENV)),
        }
    }
}

impl ProxyConfig {
    pub fn new(bind_addr: SocketAddr) -> Self {
        Self {
            bind_addr,
            ..Default::default()
        }
    }

    pub fn with_backend(mut self, backend: SharedBackendSource) -> Self {
        self.backend = backend;
        self
    }

    pub fn with_mount_path(mut self, mount_path: impl Into<String>) -> Self {
        self.mount_path = mount_path.into();
        self
    }

    pub fn with_allowed_headers(mut self, allowed_headers: Vec<HeaderName>) -> Self {
        self.allowed_headers = allowed_headers;
        self
    }

    pub fn with_cors(mut self, enable_cors: bool) -> Self {
        self.enable_cors = enable_cors;
        self
    }

    /// Mount path without a trailing slash; empty when mounted at the root.
    fn normalized_mount(&self) -> String {
        let trimmed = self.mount_path.trim().trim_end_matches('/');
        if trimmed.is_empty() || trimmed.starts_with('/') {
            trimmed.to_string()
        } else {
            format!("/{}", trimmed)
        }
    }
}

/// Shared state for the proxy server.
struct ProxyState {
    forwarder: Forwarder,
    backend: SharedBackendSource,
    mount_path: String,
}

/// The backend proxy server.
pub struct ProxyServer {
    config: ProxyConfig,
    state: Arc<ProxyState>,
}

impl ProxyServer {
    pub fn new(config: ProxyConfig) -> Self {
        let state = ProxyState {
            forwarder: Forwarder::new(config.allowed_headers.clone()),
            backend: config.backend.clone(),
            mount_path: config.normalized_mount(),
        };

        Self {
            state: Arc::new(state),
            config,
        }
    }

    pub fn config(&self) -> &ProxyConfig {
        &self.config
    }

    /// Build the axum router.
    pub fn router(&self) -> AxumRouter {
        let mount = self.state.mount_path.as_str();
        let root = if mount.is_empty() { "/" } else { mount };

        let mut router = AxumRouter::new()
            .route(root, get(handle_forward))
            .route(&format!("{}/{{*path}}", mount), get(handle_forward))
            .route("/health", get(handle_health))
            .with_state(self.state.clone())
            .layer(TraceLayer::new_for_http());

        if self.config.enable_cors {
            router = router.layer(
                CorsLayer::new()
                    .allow_origin(Any)
                    .allow_methods(Any)
                    .allow_headers(Any),
            );
        }

        router
    }

    /// Run the proxy server.
    pub async fn run(self) -> std::io::Result<()> {
        let listener = TcpListener::bind(self.config.bind_addr).await?;
        let local_addr = listener.local_addr()?;
        tracing::info!(addr = %local_addr, mount = %self.state.mount_path, "Starting backend proxy");
        axum::serve(listener, self.router()).await
    }

    /// Run with graceful shutdown, returning the bound address.
    pub async fn run_with_shutdown(
        self,
        shutdown: impl std::future::Future<Output = ()> + Send + 'static,
    ) -> std::io::Result<SocketAddr> {
        let listener = TcpListener::bind(self.config.bind_addr).await?;
        let local_addr = listener.local_addr()?;
        tracing::info!(addr = %local_addr, mount = %self.state.mount_path, "Starting backend proxy");
        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, self.router())
                .with_graceful_shutdown(shutdown)
                .await
            {
                tracing::error!(error = %e, "Backend proxy stopped with an error");
            }
        });
        Ok(local_addr)
    }
}

/// Handle GET {mount}/{*path}
async fn handle_forward(
    State(state): State<Arc<ProxyState>>,
    uri: Uri,
    headers: HeaderMap,
) -> Result<Response, ProxyError> {
    let path = uri
        .path()
        .strip_prefix(state.mount_path.as_str())
        .unwrap_or_default();

    let result = match state.backend.base_url() {
        Ok(base_url) => {
            state
                .forwarder
                .forward(&base_url, path, uri.query(), &headers)
                .await
        }
        Err(e) => Err(e),
    };

    if let Err(e) = &result {
        tracing::warn!(path = %uri.path(), error = %e, "Proxy request failed");
    }
    result
}

/// Handle GET /health
async fn handle_health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "flowmatic-proxy"
    }))
}
