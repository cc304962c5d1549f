//! Field-selective packet sealing.
//!
//! Stand-in for the platform SDK's end-to-end scheme, kept behind
//! [`PacketCrypto`] so it can be swapped without touching the dispatcher.
//! Outbound packets have the values at the configured JSON-pointer paths
//! sealed with ChaCha20-Poly1305 under the recipient's packet key; inbound
//! secure action packets are opened with a key derived from the
//! integration's API secret.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use chacha20poly1305::{
    ChaCha20Poly1305, KeyInit, Nonce,
    aead::{Aead, OsRng, rand_core::RngCore},
};
use serde_json::Value;
use sha2::{Digest, Sha256};

use super::traits::{DeviceKeys, PacketCrypto};
use crate::error::PlatformError;

const ENC_PREFIX: &str = "enc:v1:";
const NONCE_LEN: usize = 12;
const KEY_LEN: usize = 32;

pub struct PacketCipher {
    /// Key for opening secure packets addressed to this integration.
    inbound_key: [u8; KEY_LEN],
}

impl PacketCipher {
    pub fn new(api_secret: &str) -> Self {
        let digest = Sha256::digest(api_secret.as_bytes());
        Self {
            inbound_key: digest.into(),
        }
    }

    fn packet_key(keys: &DeviceKeys) -> Result<[u8; KEY_LEN], PlatformError> {
        let key = keys
            .keys
            .first()
            .ok_or_else(|| PlatformError::Keys(format!("no device keys for {}", keys.user_id)))?;
        let bytes = BASE64
            .decode(&key.public_key)
            .map_err(|e| PlatformError::Crypto(format!("invalid packet key encoding: {e}")))?;
        bytes
            .try_into()
            .map_err(|_| PlatformError::Crypto("packet key must be 32 bytes".to_string()))
    }

    fn seal(key: &[u8; KEY_LEN], plaintext: &[u8]) -> Result<String, PlatformError> {
        let cipher = ChaCha20Poly1305::new_from_slice(key)
            .map_err(|e| PlatformError::Crypto(format!("invalid key length: {e}")))?;

        let mut nonce_bytes = [0u8; NONCE_LEN];
        OsRng.fill_bytes(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);

        let ciphertext = cipher
            .encrypt(nonce, plaintext)
            .map_err(|e| PlatformError::Crypto(format!("encryption failed: {e}")))?;

        let mut combined = nonce_bytes.to_vec();
        combined.extend_from_slice(&ciphertext);
        Ok(format!("{ENC_PREFIX}{}", hex::encode(combined)))
    }

    fn open(key: &[u8; KEY_LEN], sealed: &str) -> Result<String, PlatformError> {
        let hex_str = sealed
            .strip_prefix(ENC_PREFIX)
            .ok_or_else(|| PlatformError::Crypto("missing sealed-value prefix".to_string()))?;
        let combined = hex::decode(hex_str)
            .map_err(|e| PlatformError::Crypto(format!("invalid hex in sealed value: {e}")))?;

        if combined.len() < NONCE_LEN {
            return Err(PlatformError::Crypto("sealed value too short".to_string()));
        }
        let (nonce_bytes, ciphertext) = combined.split_at(NONCE_LEN);
        let nonce = Nonce::from_slice(nonce_bytes);

        let cipher = ChaCha20Poly1305::new_from_slice(key)
            .map_err(|e| PlatformError::Crypto(format!("invalid key length: {e}")))?;
        let plaintext = cipher
            .decrypt(nonce, ciphertext)
            .map_err(|e| PlatformError::Crypto(format!("decryption failed: {e}")))?;

        String::from_utf8(plaintext)
            .map_err(|e| PlatformError::Crypto(format!("sealed value is not UTF-8: {e}")))
    }

    fn open_in_place(key: &[u8; KEY_LEN], value: &mut Value) -> Result<(), PlatformError> {
        match value {
            Value::String(s) if s.starts_with(ENC_PREFIX) => {
                let plain = Self::open(key, s)?;
                *value = serde_json::from_str(&plain)
                    .map_err(|e| PlatformError::Crypto(format!("sealed value is not JSON: {e}")))?;
            }
            Value::Object(map) => {
                for v in map.values_mut() {
                    Self::open_in_place(key, v)?;
                }
            }
            Value::Array(items) => {
                for v in items.iter_mut() {
                    Self::open_in_place(key, v)?;
                }
            }
            _ => {}
        }
        Ok(())
    }
}

impl PacketCrypto for PacketCipher {
    fn encrypt_packet(
        &self,
        packet: &Value,
        paths: &[&str],
        keys: &DeviceKeys,
    ) -> Result<Value, PlatformError> {
        let key = Self::packet_key(keys)?;
        let mut sealed = packet.clone();
        for path in paths {
            let Some(slot) = sealed.pointer_mut(path) else {
                continue;
            };
            let plain = serde_json::to_string(slot)
                .map_err(|e| PlatformError::Crypto(format!("serializing {path}: {e}")))?;
            *slot = Value::String(Self::seal(&key, plain.as_bytes())?);
        }
        Ok(sealed)
    }

    fn decrypt_packet(&self, body: &Value) -> Result<Value, PlatformError> {
        let mut opened = body.clone();
        Self::open_in_place(&self.inbound_key, &mut opened)?;
        Ok(opened)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::packet::{ENCRYPTED_PATHS, quickstart_packet};
    use crate::platform::traits::DeviceKey;
    use serde_json::json;

    fn test_keys() -> DeviceKeys {
        DeviceKeys {
            user_id: "user1".to_string(),
            keys: vec![DeviceKey {
                device_id: "glasses-1".to_string(),
                public_key: BASE64.encode([7u8; KEY_LEN]),
            }],
        }
    }

    #[test]
    fn seals_configured_paths_only() {
        let cipher = PacketCipher::new("api-secret");
        let plain = serde_json::to_value(quickstart_packet()).unwrap();

        let sealed = cipher
            .encrypt_packet(&plain, &ENCRYPTED_PATHS, &test_keys())
            .unwrap();

        for path in ENCRYPTED_PATHS {
            let v = sealed.pointer(path).unwrap().as_str().unwrap();
            assert!(v.starts_with(ENC_PREFIX), "{path} was not sealed");
        }
        // Untargeted fields stay plaintext.
        assert_eq!(sealed["title"], plain["title"]);
        assert_eq!(sealed["body"], plain["body"]);
        assert_eq!(sealed["icon"]["type"], "URL");
    }

    #[test]
    fn sealed_fields_open_under_the_same_key() {
        let key = [9u8; KEY_LEN];
        let sealed = PacketCipher::seal(&key, br#""hello""#).unwrap();
        assert_eq!(PacketCipher::open(&key, &sealed).unwrap(), r#""hello""#);
    }

    #[test]
    fn decrypt_packet_restores_sealed_body() {
        let cipher = PacketCipher::new("api-secret");
        let sealed_state = PacketCipher::seal(&cipher.inbound_key, br#""abc""#).unwrap();
        let body = json!({
            "version": "2.0.0",
            "state": sealed_state,
            "userId": "user1",
        });

        let opened = cipher.decrypt_packet(&body).unwrap();
        assert_eq!(opened["state"], "abc");
        assert_eq!(opened["userId"], "user1");
    }

    #[test]
    fn decrypt_packet_fails_on_wrong_key() {
        let sender = PacketCipher::new("their-secret");
        let receiver = PacketCipher::new("our-secret");
        let sealed = PacketCipher::seal(&sender.inbound_key, br#""abc""#).unwrap();
        let body = json!({"version": "2.0.0", "state": sealed});

        assert!(receiver.decrypt_packet(&body).is_err());
    }

    #[test]
    fn decrypt_packet_fails_on_garbage_ciphertext() {
        let cipher = PacketCipher::new("api-secret");
        let body = json!({"version": "2.0.0", "state": "enc:v1:deadbeef"});
        assert!(cipher.decrypt_packet(&body).is_err());
    }

    #[test]
    fn packet_key_rejects_wrong_length() {
        let keys = DeviceKeys {
            user_id: "user1".to_string(),
            keys: vec![DeviceKey {
                device_id: "glasses-1".to_string(),
                public_key: BASE64.encode([1u8; 16]),
            }],
        };
        assert!(matches!(
            PacketCipher::packet_key(&keys),
            Err(PlatformError::Crypto(_))
        ));
    }

    #[test]
    fn packet_key_requires_at_least_one_device() {
        let keys = DeviceKeys {
            user_id: "user1".to_string(),
            keys: vec![],
        };
        assert!(matches!(
            PacketCipher::packet_key(&keys),
            Err(PlatformError::Keys(_))
        ));
    }
}
