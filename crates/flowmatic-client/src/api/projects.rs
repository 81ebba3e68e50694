//! Projects API.

use crate::client::FlowmaticClient;
use crate::error::Result;
use crate::types::{CreateProjectRequest, Project, UpdateProjectRequest};

/// Projects API client. Requires a client built with an auth token.
pub struct ProjectsApi {
    client: FlowmaticClient,
}

impl ProjectsApi {
    pub(crate) fn new(client: FlowmaticClient) -> Self {
        Self { client }
    }

    /// List all projects visible to the caller.
    pub async fn list(&self) -> Result<Vec<Project>> {
        self.client.get("projects").await
    }

    /// Get a project by ID.
    pub async fn get(&self, id: &str) -> Result<Project> {
        self.client.get(&format!("projects/{}", id)).await
    }

    /// Create a new project.
    pub async fn create(&self, request: CreateProjectRequest) -> Result<Project> {
        self.client.post("projects", &request).await
    }

    /// Update a project.
    pub async fn update(&self, id: &str, request: UpdateProjectRequest) -> Result<Project> {
        self.client.patch(&format!("projects/{}", id), &request).await
    }

    /// Delete a project.
    pub async fn delete(&self, id: &str) -> Result<()> {
        self.client.delete(&format!("projects/{}", id)).await
    }
}
