//! Seam between the session manager and the backend auth service.

use std::sync::Arc;

use async_trait::async_trait;
use flowmatic_client::{AuthResponse, Credentials, FlowmaticClient, RefreshResponse};

/// Backend auth operations the session manager depends on.
#[async_trait]
pub trait AuthBackend: Send + Sync {
    /// Exchange credentials for a user and tokens.
    async fn login(&self, credentials: &Credentials) -> flowmatic_client::Result<AuthResponse>;

    /// Create an account.
    async fn register(&self, credentials: &Credentials)
    -> flowmatic_client::Result<AuthResponse>;

    /// Invalidate the server-side session.
    async fn logout(&self, access_token: &str) -> flowmatic_client::Result<()>;

    /// Trade a refresh token for new tokens.
    async fn refresh(&self, refresh_token: &str) -> flowmatic_client::Result<RefreshResponse>;
}

/// Shared backend handle.
pub type SharedAuthBackend = Arc<dyn AuthBackend>;

#[async_trait]
impl AuthBackend for FlowmaticClient {
    async fn login(&self, credentials: &Credentials) -> flowmatic_client::Result<AuthResponse> {
        self.auth().login(credentials).await
    }

    async fn register(
        &self,
        credentials: &Credentials,
    ) -> flowmatic_client::Result<AuthResponse> {
        self.auth().register(credentials).await
    }

    async fn logout(&self, access_token: &str) -> flowmatic_client::Result<()> {
        self.auth().logout(access_token).await
    }

    async fn refresh(&self, refresh_token: &str) -> flowmatic_client::Result<RefreshResponse> {
        self.auth().refresh(refresh_token).await
    }
}

/// Stand-in used when no backend is reachable or configured.
///
/// Every call fails with the stored reason, so a session built over it can
/// still be restored, inspected and signed out locally.
#[derive(Debug, Clone)]
pub struct OfflineBackend {
    reason: String,
}

impl OfflineBackend {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }

    fn unavailable(&self) -> flowmatic_client::Error {
        flowmatic_client::Error::Config(self.reason.clone())
    }
}

#[async_trait]
impl AuthBackend for OfflineBackend {
    async fn login(&self, _credentials: &Credentials) -> flowmatic_client::Result<AuthResponse> {
        Err(self.unavailable())
    }

    async fn register(
        &self,
        _credentials: &Credentials,
    ) -> flowmatic_client::Result<AuthResponse> {
        Err(self.unavailable())
    }

    async fn logout(&self, _access_token: &str) -> flowmatic_client::Result<()> {
        Err(self.unavailable())
    }

    async fn refresh(&self, _refresh_token: &str) -> flowmatic_client::Result<RefreshResponse> {
        Err(self.unavailable())
    }
}
