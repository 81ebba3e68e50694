//! Process-wide auth session store.
//!
//! One [`SessionManager`] is built at startup and shared by reference. It
//! owns the [`SessionState`], mirrors it to [`SessionStorage`], and
//! publishes every change on a `watch` channel.
//!
//! Each login/register/refresh takes a new generation number; a response
//! that arrives after a newer operation (or a logout) has started is
//! discarded without touching state.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;
use flowmatic_client::{AuthTokens, Credentials, User};
use tokio::sync::watch;

use crate::backend::SharedAuthBackend;
use crate::error::{Result, SessionError};
use crate::state::{SessionState, TokenExpiry, TokenInfo};
use crate::storage::{SharedStorage, StorageKeys};

/// Result of a successful registration call.
#[derive(Debug, Clone, PartialEq)]
pub enum RegisterOutcome {
    /// Tokens were issued; the session is now authenticated.
    Authenticated(User),
    /// The account exists but must confirm its email first. Nothing was stored.
    ConfirmationRequired { email: String },
}

/// Auth session manager.
pub struct SessionManager {
    backend: SharedAuthBackend,
    storage: SharedStorage,
    keys: StorageKeys,
    state: watch::Sender<SessionState>,
    generation: AtomicU64,
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("keys", &self.keys)
            .field("state", &*self.state.borrow())
            .field("generation", &self.generation.load(Ordering::SeqCst))
            .finish_non_exhaustive()
    }
}

impl SessionManager {
    /// Create a manager in the initial (loading) state. Call [`restore`]
    /// before handing it to consumers.
    ///
    /// [`restore`]: SessionManager::restore
    pub fn new(backend: SharedAuthBackend, storage: SharedStorage) -> Self {
        let (state, _) = watch::channel(SessionState::initial());
        Self {
            backend,
            storage,
            keys: StorageKeys::default(),
            state,
            generation: AtomicU64::new(0),
        }
    }

    /// Use custom storage key names.
    pub fn with_keys(mut self, keys: StorageKeys) -> Self {
        self.keys = keys;
        self
    }

    pub fn keys(&self) -> &StorageKeys {
        &self.keys
    }

    /// Current state snapshot.
    ///
    /// Tokens that have passed their expiry end the session before the
    /// snapshot is taken, so `is_authenticated` never reports expired tokens.
    pub fn state(&self) -> SessionState {
        self.expire_if_stale();
        self.state.borrow().clone()
    }

    /// Receive every subsequent state change.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.expire_if_stale();
        self.state.subscribe()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Lifecycle
    // ─────────────────────────────────────────────────────────────────────────

    /// Silently restore a persisted session.
    ///
    /// Anything that does not yield a complete, unexpired session is removed
    /// from storage.
    pub fn restore(&self) -> SessionState {
        self.state.send_modify(|s| s.is_loading = true);

        let restored = match self.load_persisted() {
            Ok(Some((user, tokens))) if !tokens.is_expired_at(Utc::now()) => {
                tracing::info!(user = %user.email, "Restored session from storage");
                SessionState::authenticated(user, tokens)
            }
            Ok(Some(_)) => {
                tracing::info!("Stored session has expired, clearing it");
                self.clear_persisted();
                SessionState::anonymous()
            }
            Ok(None) => {
                self.clear_persisted();
                SessionState::anonymous()
            }
            Err(e) => {
                tracing::warn!(error = %e, "Stored session is unreadable, clearing it");
                self.clear_persisted();
                SessionState::anonymous()
            }
        };

        self.state.send_replace(restored.clone());
        restored
    }

    /// Sign in with email and password.
    ///
    /// On failure `state().error` carries a presentable message and the
    /// same error is returned.
    pub async fn login(&self, email: &str, password: &str) -> Result<User> {
        let generation = self.begin();
        let result = self
            .backend
            .login(&Credentials::new(email, password))
            .await;

        if !self.is_current(generation) {
            tracing::debug!(generation, "Dropping superseded login response");
            return Err(SessionError::Superseded);
        }

        let outcome = match result {
            Ok(response) => match response.tokens {
                Some(tokens) if !response.requires_email_confirmation => self
                    .establish(response.user.clone(), tokens)
                    .map(|_| response.user),
                _ => Err(SessionError::ConfirmationRequired),
            },
            Err(e) => Err(e.into()),
        };

        match &outcome {
            Ok(user) => tracing::info!(user = %user.email, "Signed in"),
            Err(e) => {
                tracing::warn!(error = %e, "Login failed");
                self.fail(e);
            }
        }
        outcome
    }

    /// Create an account.
    ///
    /// Only [`RegisterOutcome::Authenticated`] changes the session; a
    /// confirmation-required result leaves the manager anonymous.
    pub async fn register(&self, email: &str, password: &str) -> Result<RegisterOutcome> {
        let generation = self.begin();
        let result = self
            .backend
            .register(&Credentials::new(email, password))
            .await;

        if !self.is_current(generation) {
            tracing::debug!(generation, "Dropping superseded register response");
            return Err(SessionError::Superseded);
        }

        let outcome = match result {
            Ok(response) => match response.tokens {
                Some(tokens) if !response.requires_email_confirmation => self
                    .establish(response.user.clone(), tokens)
                    .map(|_| RegisterOutcome::Authenticated(response.user)),
                _ => {
                    self.state.send_modify(|s| {
                        s.is_loading = false;
                        s.error = None;
                    });
                    Ok(RegisterOutcome::ConfirmationRequired {
                        email: response.user.email,
                    })
                }
            },
            Err(e) => Err(e.into()),
        };

        match &outcome {
            Ok(RegisterOutcome::Authenticated(user)) => {
                tracing::info!(user = %user.email, "Registered and signed in")
            }
            Ok(RegisterOutcome::ConfirmationRequired { email }) => {
                tracing::info!(user = %email, "Registered, awaiting email confirmation")
            }
            Err(e) => {
                tracing::warn!(error = %e, "Registration failed");
                self.fail(e);
            }
        }
        outcome
    }

    /// Sign out.
    ///
    /// The backend is told first, best effort; local state is cleared no
    /// matter how that call ends.
    pub async fn logout(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);

        let access_token = self
            .state
            .borrow()
            .tokens
            .as_ref()
            .map(|t| t.access_token.clone());

        if let Some(token) = access_token
            && let Err(e) = self.backend.logout(&token).await
        {
            tracing::warn!(error = %e, "Server-side logout failed, clearing local session anyway");
        }

        self.teardown(None);
        tracing::info!("Signed out");
    }

    /// Clear the error message, leaving everything else as is.
    pub fn clear_error(&self) {
        self.state.send_if_modified(|s| s.error.take().is_some());
    }

    /// Exchange the refresh token for new tokens. Failure ends the session.
    pub async fn refresh(&self) -> Result<AuthTokens> {
        let (user, refresh_token) = {
            let state = self.state.borrow();
            match &state.tokens {
                Some(tokens) => (state.user.clone(), tokens.refresh_token.clone()),
                None => return Err(SessionError::NotAuthenticated),
            }
        };

        let generation = self.begin();
        let result = self.backend.refresh(&refresh_token).await;

        if !self.is_current(generation) {
            tracing::debug!(generation, "Dropping superseded refresh response");
            return Err(SessionError::Superseded);
        }

        let outcome = match result {
            Ok(response) => match response.user.or(user) {
                Some(user) => self.establish(user, response.tokens),
                None => Err(SessionError::NotAuthenticated),
            },
            Err(e) => Err(e.into()),
        };

        match &outcome {
            Ok(_) => tracing::debug!("Tokens refreshed"),
            Err(e) => {
                tracing::warn!(error = %e, "Token refresh failed, clearing session");
                self.teardown(Some(e.user_message()));
            }
        }
        outcome
    }

    /// The access token, if the session holds one that has not expired.
    ///
    /// Finding an expired token ends the session.
    pub fn access_token(&self) -> Option<String> {
        self.expire_if_stale();
        self.state
            .borrow()
            .tokens
            .as_ref()
            .map(|t| t.access_token.clone())
    }

    /// Expiry information for the current tokens.
    pub fn token_info(&self) -> Option<TokenInfo> {
        self.expire_if_stale();
        self.state
            .borrow()
            .tokens
            .as_ref()
            .map(|t| TokenInfo::from_tokens(t, Utc::now()))
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Internals
    // ─────────────────────────────────────────────────────────────────────────

    fn begin(&self) -> u64 {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.state.send_modify(|s| s.is_loading = true);
        generation
    }

    fn is_current(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == generation
    }

    /// Install a freshly issued session in memory and storage.
    fn establish(&self, user: User, tokens: AuthTokens) -> Result<AuthTokens> {
        let now = Utc::now();
        let tokens = if tokens.expires_at.is_none() {
            tokens.issued_at(now)
        } else {
            tokens
        };

        if tokens.is_expired_at(now) {
            return Err(SessionError::Expired);
        }

        if let Err(e) = self.persist(&user, &tokens) {
            tracing::warn!(error = %e, "Failed to persist session, keeping it in memory only");
        }

        self.state
            .send_replace(SessionState::authenticated(user, tokens.clone()));
        Ok(tokens)
    }

    /// End the session if its tokens have expired.
    fn expire_if_stale(&self) {
        let expired = self
            .state
            .borrow()
            .tokens
            .as_ref()
            .is_some_and(|t| t.is_expired_at(Utc::now()));

        if expired {
            tracing::info!("Access token expired, clearing session");
            self.teardown(Some(SessionError::Expired.user_message()));
        }
    }

    fn fail(&self, error: &SessionError) {
        let message = error.user_message();
        self.state.send_modify(|s| {
            s.is_loading = false;
            s.error = Some(message);
        });
    }

    fn teardown(&self, error: Option<String>) {
        self.clear_persisted();
        self.state.send_replace(SessionState {
            error,
            ..SessionState::anonymous()
        });
    }

    fn load_persisted(&self) -> Result<Option<(User, AuthTokens)>> {
        let user = self.storage.get_item(&self.keys.user)?;
        let access_token = self.storage.get_item(&self.keys.access_token)?;
        let refresh_token = self.storage.get_item(&self.keys.refresh_token)?;
        let expiry = self.storage.get_item(&self.keys.token_expiry)?;

        let (Some(user), Some(access_token), Some(refresh_token), Some(expiry)) =
            (user, access_token, refresh_token, expiry)
        else {
            return Ok(None);
        };

        let user: User = serde_json::from_str(&user)?;
        let expiry: TokenExpiry = serde_json::from_str(&expiry)?;

        Ok(Some((
            user,
            AuthTokens {
                access_token,
                refresh_token,
                expires_in: expiry.expires_in,
                expires_at: Some(expiry.expires_at),
            },
        )))
    }

    fn persist(&self, user: &User, tokens: &AuthTokens) -> Result<()> {
        let expires_at = tokens.expires_at.ok_or(SessionError::Expired)?;
        let expiry = TokenExpiry {
            expires_in: tokens.expires_in,
            expires_at,
        };

        self.storage
            .set_item(&self.keys.user, &serde_json::to_string(user)?)?;
        self.storage
            .set_item(&self.keys.access_token, &tokens.access_token)?;
        self.storage
            .set_item(&self.keys.refresh_token, &tokens.refresh_token)?;
        self.storage
            .set_item(&self.keys.token_expiry, &serde_json::to_string(&expiry)?)?;
        Ok(())
    }

    fn clear_persisted(&self) {
        for key in self.keys.all() {
            if let Err(e) = self.storage.remove_item(key) {
                tracing::warn!(key, error = %e, "Failed to remove stored session key");
            }
        }
    }
}
