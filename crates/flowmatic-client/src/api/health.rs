//! Health API.

use crate::client::FlowmaticClient;
use crate::error::Result;
use crate::types::HealthResponse;

/// Health API client.
pub struct HealthApi {
    client: FlowmaticClient,
}

impl HealthApi {
    pub(crate) fn new(client: FlowmaticClient) -> Self {
        Self { client }
    }

    /// Check backend health.
    pub async fn check(&self) -> Result<HealthResponse> {
        self.client.get("health").await
    }

    /// Simple connectivity check - returns true if the backend is reachable.
    pub async fn is_healthy(&self) -> bool {
        self.check().await.is_ok()
    }
}
