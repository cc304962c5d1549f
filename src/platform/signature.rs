//! Enable-flow request signatures.
//!
//! The platform signs `GET /enable` redirects with HMAC-SHA256 over
//! `"{state}:{timestamp}"` keyed by the ability's shared secret; the
//! signature travels as lowercase hex in the `signature` query parameter.

use hmac::{Hmac, Mac};
use sha2::Sha256;

/// Verify an enable-request signature. Returns `false` on any malformed
/// input rather than erroring — the caller always redirects.
pub fn verify_enable_signature(
    shared_secret: &str,
    state: &str,
    timestamp: &str,
    signature_hex: &str,
) -> bool {
    let Ok(expected) = hex::decode(signature_hex) else {
        return false;
    };

    let Ok(mut mac) = Hmac::<Sha256>::new_from_slice(shared_secret.as_bytes()) else {
        return false;
    };
    mac.update(state.as_bytes());
    mac.update(b":");
    mac.update(timestamp.as_bytes());

    // Constant-time comparison
    mac.verify_slice(&expected).is_ok()
}

/// Produce the hex signature the platform would send. Useful for local
/// testing of the enable flow.
pub fn sign_enable_request(shared_secret: &str, state: &str, timestamp: &str) -> String {
    let mut mac = Hmac::<Sha256>::new_from_slice(shared_secret.as_bytes())
        .expect("HMAC accepts any key length");
    mac.update(state.as_bytes());
    mac.update(b":");
    mac.update(timestamp.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

/// Constant-time string equality for shared-secret checks.
pub fn constant_time_eq(a: &str, b: &str) -> bool {
    use subtle::ConstantTimeEq;
    a.as_bytes().ct_eq(b.as_bytes()).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_signature_verifies() {
        let sig = sign_enable_request("secret", "state-token", "1700000000");
        assert!(verify_enable_signature(
            "secret",
            "state-token",
            "1700000000",
            &sig
        ));
    }

    #[test]
    fn wrong_secret_fails() {
        let sig = sign_enable_request("wrong", "state-token", "1700000000");
        assert!(!verify_enable_signature(
            "secret",
            "state-token",
            "1700000000",
            &sig
        ));
    }

    #[test]
    fn tampered_state_fails() {
        let sig = sign_enable_request("secret", "state-token", "1700000000");
        assert!(!verify_enable_signature(
            "secret",
            "other-token",
            "1700000000",
            &sig
        ));
    }

    #[test]
    fn tampered_timestamp_fails() {
        let sig = sign_enable_request("secret", "state-token", "1700000000");
        assert!(!verify_enable_signature(
            "secret",
            "state-token",
            "1700000001",
            &sig
        ));
    }

    #[test]
    fn invalid_hex_fails() {
        assert!(!verify_enable_signature(
            "secret",
            "state-token",
            "1700000000",
            "zz-not-hex"
        ));
    }

    #[test]
    fn empty_signature_fails() {
        assert!(!verify_enable_signature("secret", "state-token", "1", ""));
    }

    #[test]
    fn truncated_signature_fails() {
        let sig = sign_enable_request("secret", "state-token", "1700000000");
        assert!(!verify_enable_signature(
            "secret",
            "state-token",
            "1700000000",
            &sig[..32]
        ));
    }

    #[test]
    fn constant_time_eq_basic() {
        assert!(constant_time_eq("abc", "abc"));
        assert!(!constant_time_eq("abc", "abd"));
        assert!(!constant_time_eq("abc", "abcd"));
        assert!(constant_time_eq("", ""));
    }
}
