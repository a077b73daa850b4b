//! Connection settings shared by every command.

use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::Args;

use vision_core::{ApiUrl, Credentials};
use vision_http::{
    ClientConfig, DEFAULT_PAGE_SIZE, DEFAULT_RENEWAL_THRESHOLD, DEFAULT_TIMEOUT,
};

#[derive(Args, Debug, Clone)]
pub struct ConnectionArgs {
    /// API base URL (https://, or http:// for localhost) or file:// snapshot directory
    #[arg(long, env = "VISION_API_URL")]
    pub source: Option<String>,

    /// API username
    #[arg(long, env = "VISION_API_USERNAME")]
    pub username: Option<String>,

    /// API password
    #[arg(long, env = "VISION_API_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// OAuth client id, for deployments that require one
    #[arg(long, env = "VISION_API_CLIENT_ID")]
    pub client_id: Option<String>,

    /// OAuth client secret
    #[arg(long, env = "VISION_API_CLIENT_SECRET", hide_env_values = true)]
    pub client_secret: Option<String>,

    /// Token age in seconds after which the session re-authenticates
    #[arg(long, env = "VISION_API_RENEWAL_SECS", default_value_t = DEFAULT_RENEWAL_THRESHOLD.as_secs())]
    pub renewal_secs: u64,

    /// Items per page
    #[arg(long, env = "VISION_API_PAGE_SIZE", default_value_t = DEFAULT_PAGE_SIZE)]
    pub page_size: u32,

    /// Per-request timeout in seconds
    #[arg(long, env = "VISION_API_TIMEOUT_SECS", default_value_t = DEFAULT_TIMEOUT.as_secs())]
    pub timeout: u64,

    /// Maximum concurrent requests per fetch (unbounded if unset)
    #[arg(long, env = "VISION_API_MAX_CONCURRENCY")]
    pub max_concurrency: Option<usize>,
}

impl ConnectionArgs {
    pub fn api_url(&self) -> Result<ApiUrl> {
        let Some(source) = self.source.as_deref() else {
            bail!("No API URL. Pass --source or set VISION_API_URL.");
        };
        ApiUrl::new(source).context("Invalid API URL")
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }

    pub fn client_config(&self, base_url: ApiUrl) -> ClientConfig {
        ClientConfig::new(base_url)
            .with_renewal_threshold(Duration::from_secs(self.renewal_secs))
            .with_page_size(self.page_size)
            .with_timeout(self.timeout())
            .with_max_concurrency(self.max_concurrency)
    }

    pub fn credentials(&self) -> Result<Credentials> {
        let username = self
            .username
            .as_deref()
            .context("No username. Pass --username or set VISION_API_USERNAME.")?;
        let password = self
            .password
            .as_deref()
            .context("No password. Pass --password or set VISION_API_PASSWORD.")?;

        let credentials = Credentials::new(username, password);
        match (self.client_id.as_deref(), self.client_secret.as_deref()) {
            (Some(id), Some(secret)) => Ok(credentials.with_client(id, secret)),
            (None, None) => Ok(credentials),
            _ => bail!("--client-id and --client-secret must be given together"),
        }
    }
}
