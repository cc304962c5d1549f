//! Inbound webhook action classification.
//!
//! The platform posts `{ "type": ..., "body": ... }` envelopes; the body may
//! be a secure packet (version >= 2.0.0) that has to be decrypted before the
//! fields are readable. Classification happens after decryption and turns the
//! string tag into a variant matched exhaustively by the dispatcher, with an
//! explicit arm for types this ability does not handle.

use semver::Version;
use serde::Deserialize;
use serde_json::Value;

use crate::error::ActionError;

/// Raw webhook envelope as received on `POST /action`.
#[derive(Debug, Deserialize)]
pub struct ActionEnvelope {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub body: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Enable-flow callback: the user confirmed enablement on the platform.
    Validate { state: String, user_id: String },
    /// The user disabled this ability.
    Disable { user_id: String },
    Unrecognized(String),
}

impl Action {
    pub fn classify(kind: &str, body: Option<&Value>) -> Result<Self, ActionError> {
        match kind {
            "integration:validate" => {
                let body = require_body(kind, body)?;
                Ok(Self::Validate {
                    state: str_field(body, "state")?,
                    user_id: str_field(body, "userId")?,
                })
            }
            "integration:disable" => {
                let body = require_body(kind, body)?;
                Ok(Self::Disable {
                    user_id: str_field(body, "userId")?,
                })
            }
            other => Ok(Self::Unrecognized(other.to_string())),
        }
    }
}

/// True when the body advertises the secure-packet format and must be
/// decrypted before dispatch.
pub fn is_secure_packet(body: &Value) -> bool {
    body.get("version")
        .and_then(Value::as_str)
        .and_then(|v| Version::parse(v).ok())
        .is_some_and(|v| v >= Version::new(2, 0, 0))
}

fn require_body<'a>(kind: &str, body: Option<&'a Value>) -> Result<&'a Value, ActionError> {
    body.ok_or_else(|| ActionError::Malformed(format!("{kind} action has no body")))
}

fn str_field(body: &Value, name: &str) -> Result<String, ActionError> {
    body.get(name)
        .and_then(Value::as_str)
        .map(str::to_owned)
        .ok_or_else(|| ActionError::Malformed(format!("missing field `{name}`")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn classifies_validate() {
        let body = json!({"state": "abc", "userId": "user1"});
        let action = Action::classify("integration:validate", Some(&body)).unwrap();
        assert_eq!(
            action,
            Action::Validate {
                state: "abc".into(),
                user_id: "user1".into()
            }
        );
    }

    #[test]
    fn classifies_disable() {
        let body = json!({"userId": "user1"});
        let action = Action::classify("integration:disable", Some(&body)).unwrap();
        assert_eq!(
            action,
            Action::Disable {
                user_id: "user1".into()
            }
        );
    }

    #[test]
    fn unknown_type_is_unrecognized_not_an_error() {
        let action = Action::classify("integration:frobnicate", None).unwrap();
        assert_eq!(action, Action::Unrecognized("integration:frobnicate".into()));
    }

    #[test]
    fn validate_without_state_is_malformed() {
        let body = json!({"userId": "user1"});
        let err = Action::classify("integration:validate", Some(&body)).unwrap_err();
        assert!(matches!(err, ActionError::Malformed(_)));
        assert!(err.to_string().contains("state"));
    }

    #[test]
    fn validate_without_body_is_malformed() {
        let err = Action::classify("integration:validate", None).unwrap_err();
        assert!(matches!(err, ActionError::Malformed(_)));
    }

    #[test]
    fn envelope_parses_without_body() {
        let envelope: ActionEnvelope =
            serde_json::from_str(r#"{"type": "integration:disable"}"#).unwrap();
        assert_eq!(envelope.kind, "integration:disable");
        assert!(envelope.body.is_none());
    }

    #[test]
    fn secure_packet_gate_is_semver_aware() {
        assert!(is_secure_packet(&json!({"version": "2.0.0"})));
        assert!(is_secure_packet(&json!({"version": "2.1.3"})));
        assert!(!is_secure_packet(&json!({"version": "1.9.9"})));
        assert!(!is_secure_packet(&json!({"version": "not-semver"})));
        assert!(!is_secure_packet(&json!({"version": 2})));
        assert!(!is_secure_packet(&json!({"state": "abc"})));
    }
}
