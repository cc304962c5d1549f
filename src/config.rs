use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use url::Url;

/// Config file looked up in the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "ability.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Static credential proving a request came from this ability's backend.
    pub shared_secret: String,
    pub api_key: String,
    pub api_secret: String,
    pub integration_id: String,
    pub gateway: GatewayConfig,
    pub platform: PlatformConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    pub host: String,
    pub port: u16,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8330,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlatformConfig {
    /// Base URL of the platform cloud API.
    pub base_url: String,
    /// Enable-flow continuation URL users are redirected to.
    pub enable_url: String,
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            base_url: "https://cloud.lumenglass.io".to_string(),
            enable_url: "https://cloud.lumenglass.io/v1/integration/enable".to_string(),
        }
    }
}

impl Config {
    /// Load config from `path`, or from `ability.toml` if present, or defaults.
    ///
    /// An explicitly passed `--config` path that does not exist is an error;
    /// a missing default file is not.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => {
                let contents = fs::read_to_string(path)
                    .with_context(|| format!("failed to read config file {}", path.display()))?;
                toml::from_str(&contents).context("failed to parse config file")
            }
            None => {
                let default = Path::new(DEFAULT_CONFIG_FILE);
                if default.exists() {
                    let contents =
                        fs::read_to_string(default).context("failed to read ability.toml")?;
                    toml::from_str(&contents).context("failed to parse ability.toml")
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// Environment variables win over the config file.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(secret) = std::env::var("LUMEN_ABILITY_SHARED_SECRET")
            && !secret.is_empty()
        {
            self.shared_secret = secret;
        }

        if let Ok(key) = std::env::var("LUMEN_ABILITY_API_KEY")
            && !key.is_empty()
        {
            self.api_key = key;
        }

        if let Ok(secret) = std::env::var("LUMEN_ABILITY_API_SECRET")
            && !secret.is_empty()
        {
            self.api_secret = secret;
        }

        if let Ok(id) = std::env::var("LUMEN_ABILITY_INTEGRATION_ID")
            && !id.is_empty()
        {
            self.integration_id = id;
        }

        if let Ok(host) = std::env::var("LUMEN_ABILITY_HOST").or_else(|_| std::env::var("HOST"))
            && !host.is_empty()
        {
            self.gateway.host = host;
        }

        if let Ok(port_str) = std::env::var("LUMEN_ABILITY_PORT").or_else(|_| std::env::var("PORT"))
            && let Ok(port) = port_str.parse::<u16>()
        {
            self.gateway.port = port;
        }

        if let Ok(url) = std::env::var("LUMEN_ABILITY_PLATFORM_BASE_URL")
            && !url.is_empty()
        {
            self.platform.base_url = url;
        }

        if let Ok(url) = std::env::var("LUMEN_ABILITY_PLATFORM_ENABLE_URL")
            && !url.is_empty()
        {
            self.platform.enable_url = url;
        }
    }

    /// Reject configs that would only fail later, mid-request.
    pub fn validate(&self) -> Result<()> {
        if self.shared_secret.is_empty() {
            bail!("shared_secret must be set (config file or LUMEN_ABILITY_SHARED_SECRET)");
        }
        if self.api_key.is_empty() || self.api_secret.is_empty() {
            bail!("api_key and api_secret must be set");
        }
        if self.integration_id.is_empty() {
            bail!("integration_id must be set");
        }
        Url::parse(&self.platform.base_url).context("platform.base_url is not a valid URL")?;
        Url::parse(&self.platform.enable_url).context("platform.enable_url is not a valid URL")?;
        Ok(())
    }
}
