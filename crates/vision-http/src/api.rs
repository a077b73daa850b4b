//! The dashboard's view of the Vision API.

use std::time::Duration;

use async_trait::async_trait;
use tracing::instrument;

use vision_core::traits::RecordSource;
use vision_core::{ApiUrl, Credentials, Record, ResourcePath, Result};

use crate::config::ClientConfig;
use crate::endpoints::{AI_IDENTIFICATIONS, CAMERAS, OBJECTS, PROMPTS};
use crate::fetcher::PaginatedFetcher;
use crate::session::AuthSession;

/// An authenticated client exposing the collections the dashboard reads.
///
/// Construct one with [`VisionApi::login`] and pass it by reference (or
/// clone it; clones share the session).
///
/// ```no_run
/// # async fn run() -> vision_core::Result<()> {
/// use vision_core::{ApiUrl, Credentials};
/// use vision_http::{ClientConfig, VisionApi};
///
/// let config = ClientConfig::new(ApiUrl::new("https://vision.example.org")?);
/// let api = VisionApi::login(config, Credentials::new("operator", "secret")).await?;
/// let cameras = api.cameras().await?;
/// println!("{} cameras", cameras.len());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct VisionApi {
    config: ClientConfig,
    fetcher: PaginatedFetcher,
}

impl VisionApi {
    /// Authenticate and build the client.
    pub async fn login(config: ClientConfig, credentials: Credentials) -> Result<Self> {
        let session = AuthSession::login(&config, credentials).await?;
        let fetcher = PaginatedFetcher::new(session).with_max_concurrency(config.max_concurrency);
        Ok(Self { config, fetcher })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn session(&self) -> &AuthSession {
        self.fetcher.session()
    }

    pub fn fetcher(&self) -> &PaginatedFetcher {
        &self.fetcher
    }

    /// Fetch a whole collection with the configured page size and timeout.
    pub async fn get_all(&self, path: &ResourcePath) -> Result<Vec<Record>> {
        self.fetcher
            .fetch_all(path, self.config.page_size, self.config.timeout)
            .await
    }

    /// Fetch each path with the configured timeout.
    pub async fn get_each(&self, paths: &[ResourcePath]) -> Result<Vec<Record>> {
        self.fetcher.fetch_paths(paths, self.config.timeout).await
    }

    pub async fn cameras(&self) -> Result<Vec<Record>> {
        self.get_all(&ResourcePath::new(CAMERAS)?).await
    }

    pub async fn objects(&self) -> Result<Vec<Record>> {
        self.get_all(&ResourcePath::new(OBJECTS)?).await
    }

    pub async fn prompts(&self) -> Result<Vec<Record>> {
        self.get_all(&ResourcePath::new(PROMPTS)?).await
    }

    pub async fn ai_identifications(&self) -> Result<Vec<Record>> {
        self.get_all(&ResourcePath::new(AI_IDENTIFICATIONS)?).await
    }

    /// Fetch specific cameras by id, one request per id.
    #[instrument(skip(self, ids))]
    pub async fn cameras_by_id<I, S>(&self, ids: I) -> Result<Vec<Record>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let cameras = ResourcePath::new(CAMERAS)?;
        let paths = ids
            .into_iter()
            .map(|id| cameras.child(id))
            .collect::<Result<Vec<_>>>()?;
        self.get_each(&paths).await
    }
}

#[async_trait]
impl RecordSource for VisionApi {
    fn url(&self) -> &ApiUrl {
        &self.config.base_url
    }

    async fn fetch_all(
        &self,
        path: &ResourcePath,
        page_size: u32,
        timeout: Duration,
    ) -> Result<Vec<Record>> {
        self.fetcher.fetch_all(path, page_size, timeout).await
    }

    async fn fetch_paths(
        &self,
        paths: &[ResourcePath],
        timeout: Duration,
    ) -> Result<Vec<Record>> {
        self.fetcher.fetch_paths(paths, timeout).await
    }
}
