//! Session state snapshot and token display info.

use chrono::{DateTime, Utc};
use flowmatic_client::{AuthTokens, User};
use serde::{Deserialize, Serialize};

/// Snapshot of who is signed in.
///
/// `is_authenticated` is true exactly when `user` and `tokens` are both set
/// and the tokens are not expired. Snapshots read through
/// `SessionManager::state` are checked against the clock first.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    pub user: Option<User>,
    pub tokens: Option<AuthTokens>,
    pub is_authenticated: bool,
    pub is_loading: bool,
    pub error: Option<String>,
}

impl SessionState {
    /// State before restore has run.
    pub fn initial() -> Self {
        Self {
            is_loading: true,
            ..Self::anonymous()
        }
    }

    /// Nobody signed in, nothing pending.
    pub fn anonymous() -> Self {
        Self {
            user: None,
            tokens: None,
            is_authenticated: false,
            is_loading: false,
            error: None,
        }
    }

    /// A signed-in user with valid tokens.
    pub fn authenticated(user: User, tokens: AuthTokens) -> Self {
        Self {
            user: Some(user),
            tokens: Some(tokens),
            is_authenticated: true,
            is_loading: false,
            error: None,
        }
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::initial()
    }
}

/// Expiry bookkeeping persisted next to the raw tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct TokenExpiry {
    pub expires_in: u64,
    pub expires_at: DateTime<Utc>,
}

/// Information about the current tokens for display.
#[derive(Debug, Clone, PartialEq)]
pub struct TokenInfo {
    pub expires_at: Option<DateTime<Utc>>,
    pub expires_in_secs: u64,
    pub is_expired: bool,
}

impl TokenInfo {
    /// Derive display info for `tokens` at `now`.
    pub fn from_tokens(tokens: &AuthTokens, now: DateTime<Utc>) -> Self {
        Self {
            expires_at: tokens.expires_at,
            expires_in_secs: tokens.remaining_secs_at(now),
            is_expired: tokens.is_expired_at(now),
        }
    }

    /// Whole minutes until expiry.
    pub fn minutes_remaining(&self) -> u64 {
        self.expires_in_secs / 60
    }

    pub fn expires_in_display(&self) -> String {
        if self.is_expired {
            "Expired".to_string()
        } else {
            let hours = self.expires_in_secs / 3600;
            let minutes = (self.expires_in_secs % 3600) / 60;
            format!("{}h {}m", hours, minutes)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_initial_is_loading_and_anonymous() {
        let state = SessionState::initial();
        assert!(state.is_loading);
        assert!(!state.is_authenticated);
        assert!(state.user.is_none() && state.tokens.is_none());
    }

    #[test]
    fn test_token_info_display() {
        let now = Utc::now();
        let tokens = AuthTokens {
            access_token: "a".to_string(),
            refresh_token: "r".to_string(),
            expires_in: 7200,
            expires_at: None,
        }
        .issued_at(now);

        let info = TokenInfo::from_tokens(&tokens, now);
        assert_eq!(info.expires_in_display(), "2h 0m");
        assert_eq!(info.minutes_remaining(), 120);

        let later = TokenInfo::from_tokens(&tokens, now + Duration::hours(3));
        assert!(later.is_expired);
        assert_eq!(later.expires_in_display(), "Expired");
        assert_eq!(later.minutes_remaining(), 0);
    }
}
