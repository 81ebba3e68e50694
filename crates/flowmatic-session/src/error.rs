//! Error types for the session manager.

/// Result type alias for this crate.
pub type Result<T> = std::result::Result<T, SessionError>;

/// Shown when the backend could not be reached at all.
pub const NETWORK_MESSAGE: &str =
    "Unable to reach the server. Check your connection and try again.";

/// Shown when the backend failed without saying why.
pub const FALLBACK_MESSAGE: &str = "Something went wrong. Please try again.";

/// Shown when stored or issued tokens are no longer valid.
pub const EXPIRED_MESSAGE: &str = "Your session has expired. Please sign in again.";

/// Shown when login succeeds but the account still needs email confirmation.
pub const CONFIRMATION_MESSAGE: &str = "Please confirm your email address before signing in.";

/// Errors that can occur in session operations.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The backend call failed.
    #[error(transparent)]
    Backend(#[from] flowmatic_client::Error),

    /// Local storage could not be read or written.
    #[error("Storage error: {0}")]
    Storage(String),

    /// The account must confirm its email before tokens are issued.
    #[error("Email confirmation required")]
    ConfirmationRequired,

    /// Tokens are missing an expiry or already past it.
    #[error("Session expired")]
    Expired,

    /// The operation needs a signed-in user.
    #[error("Not authenticated")]
    NotAuthenticated,

    /// A newer session operation started before this one finished; its
    /// result was discarded.
    #[error("Superseded by a newer session request")]
    Superseded,
}

impl SessionError {
    /// One-line message suitable for rendering next to a form.
    pub fn user_message(&self) -> String {
        match self {
            SessionError::Backend(e) => {
                if let Some(message) = e.server_message() {
                    message.to_string()
                } else if e.is_transport() {
                    NETWORK_MESSAGE.to_string()
                } else {
                    FALLBACK_MESSAGE.to_string()
                }
            }
            SessionError::ConfirmationRequired => CONFIRMATION_MESSAGE.to_string(),
            SessionError::Expired | SessionError::NotAuthenticated => EXPIRED_MESSAGE.to_string(),
            SessionError::Storage(_) | SessionError::Superseded => FALLBACK_MESSAGE.to_string(),
        }
    }
}

impl From<serde_json::Error> for SessionError {
    fn from(e: serde_json::Error) -> Self {
        SessionError::Storage(format!("Invalid stored value: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_message_is_surfaced() {
        let err = SessionError::from(flowmatic_client::Error::Auth("Invalid credentials".into()));
        assert_eq!(err.user_message(), "Invalid credentials");
    }

    #[test]
    fn test_status_only_failure_uses_fallback() {
        let err = SessionError::from(flowmatic_client::Error::Api {
            status: 502,
            message: "HTTP 502".into(),
        });
        assert_eq!(err.user_message(), FALLBACK_MESSAGE);
    }

    #[test]
    fn test_messages_are_never_empty() {
        let errors = [
            SessionError::Storage("disk full".into()),
            SessionError::ConfirmationRequired,
            SessionError::Expired,
            SessionError::NotAuthenticated,
            SessionError::Superseded,
        ];
        for err in errors {
            assert!(!err.user_message().is_empty());
        }
    }
}
