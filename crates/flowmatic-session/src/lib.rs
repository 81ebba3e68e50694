//! Auth session lifecycle for Flowmatic clients.
//!
//! Holds the signed-in user and tokens for the whole process, mirrors them
//! to key/value storage so a restart can pick the session back up, and
//! broadcasts state changes to anyone who subscribes.
//!
//! # Components
//!
//! - [`manager`]: [`SessionManager`] with restore, login, register, logout, refresh
//! - [`storage`]: [`SessionStorage`] trait with file and in-memory stores
//! - [`backend`]: [`AuthBackend`] seam, implemented for `FlowmaticClient` and [`OfflineBackend`]
//! - [`state`]: [`SessionState`] snapshots and [`TokenInfo`]

pub mod backend;
pub mod error;
pub mod manager;
pub mod state;
pub mod storage;

pub use backend::{AuthBackend, OfflineBackend, SharedAuthBackend};
pub use error::{Result, SessionError};
pub use manager::{RegisterOutcome, SessionManager};
pub use state::{SessionState, TokenInfo};
pub use storage::{FileStorage, MemoryStorage, SessionStorage, SharedStorage, StorageKeys};
