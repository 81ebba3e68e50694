//! HTTP client SDK for the Flowmatic backend API.
//!
//! # Example
//!
//! ```no_run
//! use flowmatic_client::{Credentials, FlowmaticClient, Result};
//!
//! # async fn example() -> Result<()> {
//! let client = FlowmaticClient::builder()
//!     .base_url("https://api.example.com")
//!     .build()?;
//!
//! let session = client
//!     .auth()
//!     .login(&Credentials::new("ada@example.com", "hunter2"))
//!     .await?;
//! println!("Logged in as {}", session.user.email);
//! # Ok(())
//! # }
//! ```
//!
//! # API Coverage
//!
//! - **Auth**: login, register, logout, token refresh
//! - **Projects**: list, get, create, update, delete
//! - **Health**: backend health checks

pub mod api;
pub mod client;
pub mod error;
pub mod types;

pub use api::AuthPaths;
pub use client::{ClientBuilder, FlowmaticClient};
pub use error::{Error, Result};
pub use types::*;
