//! CLI command handlers.

pub mod auth;
pub mod health;
pub mod projects;
pub mod serve;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context as _, Result, anyhow};
use flowmatic_client::{AuthPaths, FlowmaticClient};
use flowmatic_config::{AuthSection, DEFAULT_STORAGE_FILE, FlowmaticConfig, StorageKeyNames};
use flowmatic_session::{
    FileStorage, OfflineBackend, SessionManager, SharedAuthBackend, StorageKeys,
};

/// Shared context for all commands.
#[derive(Debug, Clone)]
pub struct Context {
    /// Merged configuration.
    pub config: FlowmaticConfig,
    /// Directory holding config, logs and local storage.
    pub config_dir: Option<PathBuf>,
    /// Backend URL given on the command line.
    pub backend_url: Option<String>,
    /// Output as JSON for scripting.
    pub json_output: bool,
    /// Verbose output enabled.
    pub verbose: bool,
}

impl Context {
    /// Resolve the backend base URL: flag, then the configured environment
    /// variable, then `[backend].base_url`.
    pub fn backend_url(&self) -> Result<String> {
        if let Some(url) = &self.backend_url {
            return Ok(url.clone());
        }

        let var = self.config.backend_env_var();
        std::env::var(&var)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .or_else(|| self.config.backend_base_url().map(str::to_string))
            .ok_or_else(|| {
                anyhow!(
                    "No backend URL configured. Pass --backend, set {}, or add [backend].base_url to the config",
                    var
                )
            })
    }

    /// Unauthenticated client for the configured backend.
    pub fn client(&self) -> Result<FlowmaticClient> {
        FlowmaticClient::builder()
            .base_url(self.backend_url()?)
            .auth_paths(auth_paths(&self.config.auth_or_default()))
            .build()
            .context("Failed to create backend client")
    }

    /// Client carrying the stored session's access token.
    pub fn authed_client(&self) -> Result<FlowmaticClient> {
        let session = self.online_session()?;
        let token = session
            .access_token()
            .ok_or_else(|| anyhow!("Not signed in. Run 'flowmatic auth login' first."))?;

        FlowmaticClient::builder()
            .base_url(self.backend_url()?)
            .auth_paths(auth_paths(&self.config.auth_or_default()))
            .auth_token(token)
            .build()
            .context("Failed to create backend client")
    }

    /// Session manager over the local storage file, already restored.
    ///
    /// Works without a backend: when none resolves, backend calls fail and
    /// the stored session can still be inspected and cleared.
    pub fn session(&self) -> Result<SessionManager> {
        let backend: SharedAuthBackend = match self.client() {
            Ok(client) => Arc::new(client),
            Err(e) => {
                tracing::debug!(error = %e, "No usable backend, session is local only");
                Arc::new(OfflineBackend::new(format!("{:#}", e)))
            }
        };
        self.session_with(backend)
    }

    /// Session manager that must be able to reach the backend.
    pub fn online_session(&self) -> Result<SessionManager> {
        self.session_with(Arc::new(self.client()?))
    }

    fn session_with(&self, backend: SharedAuthBackend) -> Result<SessionManager> {
        let section = self.config.session_or_default();
        let storage = FileStorage::with_path(self.storage_path()?)?;
        let keys = section
            .keys
            .as_ref()
            .map(storage_keys)
            .unwrap_or_default();

        let manager = SessionManager::new(backend, Arc::new(storage)).with_keys(keys);
        manager.restore();
        Ok(manager)
    }

    fn storage_path(&self) -> Result<PathBuf> {
        if let Some(path) = self.config.session_or_default().storage_path {
            return Ok(path);
        }
        self.config_dir
            .as_ref()
            .map(|d| d.join(DEFAULT_STORAGE_FILE))
            .ok_or_else(|| anyhow!("Could not determine config directory"))
    }
}

/// Auth endpoint paths with config overrides applied.
fn auth_paths(section: &AuthSection) -> AuthPaths {
    let defaults = AuthPaths::default();
    AuthPaths {
        login: section.login_path.clone().unwrap_or(defaults.login),
        register: section.register_path.clone().unwrap_or(defaults.register),
        logout: section.logout_path.clone().unwrap_or(defaults.logout),
        refresh: section.refresh_path.clone().unwrap_or(defaults.refresh),
    }
}

/// Storage key names with config overrides applied.
fn storage_keys(names: &StorageKeyNames) -> StorageKeys {
    let defaults = StorageKeys::default();
    StorageKeys {
        user: names.user.clone().unwrap_or(defaults.user),
        access_token: names.access_token.clone().unwrap_or(defaults.access_token),
        refresh_token: names.refresh_token.clone().unwrap_or(defaults.refresh_token),
        token_expiry: names.token_expiry.clone().unwrap_or(defaults.token_expiry),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context(toml: &str) -> Context {
        Context {
            config: FlowmaticConfig::from_toml(toml).unwrap(),
            config_dir: Some(PathBuf::from("/tmp/flowmatic-test")),
            backend_url: None,
            json_output: false,
            verbose: false,
        }
    }

    #[test]
    fn test_backend_url_flag_wins() {
        let mut ctx = context("[backend]\nbase_url = \"https://config.example.com\"\n");
        ctx.backend_url = Some("https://flag.example.com".to_string());
        assert_eq!(ctx.backend_url().unwrap(), "https://flag.example.com");
    }

    #[test]
    fn test_backend_url_falls_back_to_config() {
        let ctx = context(
            "[backend]\nbase_url = \"https://config.example.com\"\nbase_url_env = \"FLOWMATIC_CLI_TEST_UNSET\"\n",
        );
        assert_eq!(ctx.backend_url().unwrap(), "https://config.example.com");
    }

    #[test]
    fn test_backend_url_missing_names_env_var() {
        let ctx = context("[backend]\nbase_url_env = \"FLOWMATIC_CLI_TEST_UNSET\"\n");
        let err = ctx.backend_url().unwrap_err();
        assert!(err.to_string().contains("FLOWMATIC_CLI_TEST_UNSET"));
    }

    #[test]
    fn test_config_overrides_auth_paths_and_keys() {
        let ctx = context(
            "[auth]\nlogin_path = \"v2/sessions\"\n\n[session.keys]\nuser = \"app.user\"\n",
        );
        let paths = auth_paths(&ctx.config.auth_or_default());
        assert_eq!(paths.login, "v2/sessions");
        assert_eq!(paths.logout, "auth/logout");

        let keys = storage_keys(ctx.config.session_or_default().keys.as_ref().unwrap());
        assert_eq!(keys.user, "app.user");
        assert_eq!(keys.access_token, "flowmatic.access_token");
    }

    #[tokio::test]
    async fn test_session_without_backend_can_sign_out() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut ctx = context("[backend]\nbase_url_env = \"FLOWMATIC_CLI_TEST_UNSET\"\n");
        ctx.config_dir = Some(dir.path().to_path_buf());

        assert!(ctx.online_session().is_err());

        let session = ctx.session().unwrap();
        assert!(!session.state().is_authenticated);
        session.logout().await;
        assert!(!session.state().is_authenticated);
    }

    #[test]
    fn test_storage_path_defaults_to_config_dir() {
        let ctx = context("");
        assert_eq!(
            ctx.storage_path().unwrap(),
            PathBuf::from("/tmp/flowmatic-test").join(DEFAULT_STORAGE_FILE)
        );
    }
}
