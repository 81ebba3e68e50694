//! API endpoint implementations.

mod auth;
mod health;
mod projects;

pub use auth::{AuthApi, AuthPaths};
pub use health::HealthApi;
pub use projects::ProjectsApi;
