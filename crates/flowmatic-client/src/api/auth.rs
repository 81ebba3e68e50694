//! Auth API.

use chrono::Utc;

use crate::client::FlowmaticClient;
use crate::error::Result;
use crate::types::{AuthResponse, Credentials, RefreshRequest, RefreshResponse};

/// Endpoint paths of the backend auth service, relative to the base URL.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthPaths {
    pub login: String,
    pub register: String,
    pub logout: String,
    pub refresh: String,
}

impl Default for AuthPaths {
    fn default() -> Self {
        Self {
            login: "auth/login".to_string(),
            register: "auth/register".to_string(),
            logout: "auth/logout".to_string(),
            refresh: "auth/refresh".to_string(),
        }
    }
}

/// Auth API client.
///
/// Tokens in every successful response are stamped with an absolute expiry
/// at the moment they are received.
pub struct AuthApi {
    client: FlowmaticClient,
}

impl AuthApi {
    pub(crate) fn new(client: FlowmaticClient) -> Self {
        Self { client }
    }

    fn paths(&self) -> &AuthPaths {
        &self.client.inner().auth_paths
    }

    /// Exchange credentials for a user and tokens.
    pub async fn login(&self, credentials: &Credentials) -> Result<AuthResponse> {
        let response: AuthResponse = self.client.post(&self.paths().login, credentials).await?;
        Ok(stamp(response))
    }

    /// Create an account. The response may omit tokens when email
    /// confirmation is required.
    pub async fn register(&self, credentials: &Credentials) -> Result<AuthResponse> {
        let response: AuthResponse = self
            .client
            .post(&self.paths().register, credentials)
            .await?;
        Ok(stamp(response))
    }

    /// Invalidate the server-side session for `access_token`.
    pub async fn logout(&self, access_token: &str) -> Result<()> {
        self.client
            .post_with_bearer(&self.paths().logout, access_token)
            .await
    }

    /// Trade a refresh token for a new token pair.
    pub async fn refresh(&self, refresh_token: &str) -> Result<RefreshResponse> {
        let mut response: RefreshResponse = self
            .client
            .post(&self.paths().refresh, &RefreshRequest { refresh_token })
            .await?;
        response.tokens = response.tokens.issued_at(Utc::now());
        Ok(response)
    }
}

fn stamp(mut response: AuthResponse) -> AuthResponse {
    let now = Utc::now();
    response.tokens = response.tokens.map(|t| t.issued_at(now));
    response
}
