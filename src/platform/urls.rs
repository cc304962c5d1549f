//! Enable-flow continuation URLs.

use anyhow::{Context, Result};
use url::Url;

/// Builds the platform URLs the `/enable` endpoint redirects to. Parsed once
/// at startup so redirect construction is infallible per request.
pub struct EnableUrls {
    base: Url,
}

impl EnableUrls {
    pub fn new(enable_url: &str) -> Result<Self> {
        Ok(Self {
            base: Url::parse(enable_url).context("invalid platform enable URL")?,
        })
    }

    /// Where to send the user to continue enablement for `state`.
    pub fn continue_url(&self, state: &str) -> Url {
        let mut url = self.base.clone();
        url.query_pairs_mut().append_pair("state", state);
        url
    }

    /// Where to send the user when the redirect's signature did not verify.
    pub fn invalid_state_url(&self) -> Url {
        let mut url = self.base.clone();
        url.query_pairs_mut()
            .append_pair("state", "")
            .append_pair("error", "invalid_state");
        url
    }
}
