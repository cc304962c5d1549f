use thiserror::Error;

// ─── Top-level error hierarchy ───────────────────────────────────────────────

/// Structured error hierarchy for the ability service.
///
/// Webhook-handling code returns `ActionError`; the platform collaborators
/// return `PlatformError`. The gateway maps both onto status codes at the
/// handler boundary; bootstrap code uses `anyhow::Result` for context chains.
#[derive(Debug, Error)]
pub enum AbilityError {
    #[error("action: {0}")]
    Action(#[from] ActionError),

    #[error("platform: {0}")]
    Platform(#[from] PlatformError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// ─── Webhook action errors ───────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ActionError {
    #[error("shared secret missing or mismatched")]
    Unauthorized,

    #[error("state token {state} is missing or outside the validation window")]
    StaleValidation { state: String },

    #[error("unrecognized action type: {0}")]
    Unrecognized(String),

    #[error("malformed action payload: {0}")]
    Malformed(String),

    #[error("secure packet decryption failed: {0}")]
    Decryption(String),
}

// ─── Platform collaborator errors ────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum PlatformError {
    #[error("device key fetch failed: {0}")]
    Keys(String),

    #[error("packet crypto: {0}")]
    Crypto(String),

    #[error("publish rejected with status {status}")]
    PublishStatus { status: u16 },

    #[error("http: {0}")]
    Http(#[from] reqwest::Error),
}

/// Shorthand result type for the crate.
pub type Result<T> = std::result::Result<T, AbilityError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stale_validation_displays_token() {
        let err = AbilityError::Action(ActionError::StaleValidation {
            state: "abc".into(),
        });
        assert!(err.to_string().contains("abc"));
        assert!(err.to_string().contains("validation window"));
    }

    #[test]
    fn publish_status_displays_code() {
        let err = AbilityError::Platform(PlatformError::PublishStatus { status: 503 });
        assert!(err.to_string().contains("503"));
    }

    #[test]
    fn anyhow_interop() {
        let anyhow_err = anyhow::anyhow!("something went wrong");
        let err: AbilityError = anyhow_err.into();
        assert!(err.to_string().contains("something went wrong"));
    }
}
