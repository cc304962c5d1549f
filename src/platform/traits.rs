use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::PlatformError;

/// Current packet keys for one user's devices, as returned by the platform's
/// key-distribution service.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceKeys {
    pub user_id: String,
    pub keys: Vec<DeviceKey>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceKey {
    pub device_id: String,
    /// Base64-encoded 32-byte packet key.
    pub public_key: String,
}

/// Key-distribution service boundary.
#[async_trait]
pub trait KeyService: Send + Sync {
    async fn device_keys(
        &self,
        user_id: &str,
        integration_id: &str,
    ) -> Result<DeviceKeys, PlatformError>;
}

/// Field-selective packet encryption boundary. Synchronous: the SDK seals
/// locally once keys are in hand.
pub trait PacketCrypto: Send + Sync {
    /// Seal the values at `paths` (JSON pointers) in `packet` for the devices
    /// in `keys`. The rest of the packet stays plaintext.
    fn encrypt_packet(
        &self,
        packet: &Value,
        paths: &[&str],
        keys: &DeviceKeys,
    ) -> Result<Value, PlatformError>;

    /// Open a secure action packet sent to this integration.
    fn decrypt_packet(&self, body: &Value) -> Result<Value, PlatformError>;
}

/// Cloud publish endpoint boundary.
#[async_trait]
pub trait Publisher: Send + Sync {
    async fn publish_to_user(&self, user_id: &str, packet: &Value) -> Result<(), PlatformError>;
}
