//! Configuration system for the Flowmatic edge services.
//!
//! Provides TOML-based configuration with:
//! - `[backend]` origin and the environment variable read per proxy request
//! - `[proxy]` listener, mount path and header allow-list
//! - `[session]` local storage location and key names
//! - `[auth]` endpoint paths
//!
//! Files are layered: user config directory first, then `./flowmatic.toml`.

pub mod discovery;
pub mod error;
pub mod types;

pub use discovery::{
    ConfigSource, LoadedConfig, config_dir, load_config_file, load_config_with_options,
    user_config_path,
};
pub use error::{ConfigError, Result};
pub use types::*;
