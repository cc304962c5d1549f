//! HTTP client for the platform cloud API.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::{Value, json};
use url::Url;

use super::traits::{DeviceKeys, KeyService, Publisher};
use crate::config::Config;
use crate::error::PlatformError;

const DEVICE_KEYS_PATH: &str = "/v1/api/integration/secure/device-keys";
const PUBLISH_PATH: &str = "/v1/api/integration/secure/publish-to-user";

/// No retries anywhere: a failed call is terminal for the request that made
/// it. The timeout only bounds how long a handler can hang on the cloud.
const REQUEST_TIMEOUT_SECS: u64 = 30;

pub struct PlatformClient {
    client: reqwest::Client,
    api_key: String,
    api_secret: String,
    integration_id: String,
    device_keys_url: Url,
    publish_url: Url,
}

impl PlatformClient {
    pub fn new(config: &Config) -> Result<Self> {
        let base = Url::parse(&config.platform.base_url).context("invalid platform base URL")?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            api_secret: config.api_secret.clone(),
            integration_id: config.integration_id.clone(),
            device_keys_url: base.join(DEVICE_KEYS_PATH).context("bad device-keys URL")?,
            publish_url: base.join(PUBLISH_PATH).context("bad publish URL")?,
        })
    }
}

#[async_trait]
impl KeyService for PlatformClient {
    async fn device_keys(
        &self,
        user_id: &str,
        integration_id: &str,
    ) -> Result<DeviceKeys, PlatformError> {
        let resp = self
            .client
            .post(self.device_keys_url.clone())
            .json(&json!({
                "apiKey": self.api_key,
                "apiSecret": self.api_secret,
                "integrationId": integration_id,
                "userId": user_id,
            }))
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(PlatformError::Keys(format!(
                "key service returned {} for {user_id}",
                resp.status()
            )));
        }

        Ok(resp.json::<DeviceKeys>().await?)
    }
}

#[async_trait]
impl Publisher for PlatformClient {
    async fn publish_to_user(&self, user_id: &str, packet: &Value) -> Result<(), PlatformError> {
        let resp = self
            .client
            .post(self.publish_url.clone())
            .json(&json!({
                "apiKey": self.api_key,
                "apiSecret": self.api_secret,
                "integrationId": self.integration_id,
                "targetUserId": user_id,
                "packet": packet,
            }))
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(PlatformError::PublishStatus {
                status: resp.status().as_u16(),
            });
        }
        Ok(())
    }
}
