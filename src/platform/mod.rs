//! Platform SDK collaborators.
//!
//! Everything the ability delegates to the Lumen cloud — device key
//! retrieval, field-selective packet encryption, enable-flow signature
//! verification, continuation URLs, and the secure publish endpoint — lives
//! behind the traits in [`traits`], with the production implementations here.

mod crypto;
mod http;
mod signature;
mod traits;
mod urls;

pub use crypto::PacketCipher;
pub use http::PlatformClient;
pub use signature::{constant_time_eq, sign_enable_request, verify_enable_signature};
pub use traits::{DeviceKey, DeviceKeys, KeyService, PacketCrypto, Publisher};
pub use urls::EnableUrls;
