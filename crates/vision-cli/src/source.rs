//! Record source wrapper for CLI use.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use colored::Colorize;

use vision_core::traits::RecordSource;
use vision_core::{ApiUrl, Record, ResourcePath};
use vision_file::FileSource;
use vision_http::VisionApi;

use crate::config::ConnectionArgs;

/// Either the live API or a file snapshot, chosen by the URL scheme.
#[derive(Debug)]
pub enum CliSource {
    File(FileSource),
    Http(VisionApi),
}

impl CliSource {
    /// Open the source named by `--source`, logging in for network URLs.
    pub async fn connect(args: &ConnectionArgs) -> Result<Self> {
        let url = args.api_url()?;

        if url.is_local() {
            let source = FileSource::open(url).context("Failed to open snapshot directory")?;
            return Ok(CliSource::File(source));
        }

        let credentials = args.credentials()?;
        eprintln!("{}", "Logging in...".dimmed());
        let api = VisionApi::login(args.client_config(url), credentials)
            .await
            .context("Failed to login")?;
        Ok(CliSource::Http(api))
    }

    pub fn as_http(&self) -> Option<&VisionApi> {
        match self {
            CliSource::Http(api) => Some(api),
            _ => None,
        }
    }
}

#[async_trait]
impl RecordSource for CliSource {
    fn url(&self) -> &ApiUrl {
        match self {
            CliSource::File(source) => source.url(),
            CliSource::Http(api) => api.url(),
        }
    }

    async fn fetch_all(
        &self,
        path: &ResourcePath,
        page_size: u32,
        timeout: Duration,
    ) -> vision_core::Result<Vec<Record>> {
        match self {
            CliSource::File(source) => source.fetch_all(path, page_size, timeout).await,
            CliSource::Http(api) => api.fetch_all(path, page_size, timeout).await,
        }
    }

    async fn fetch_paths(
        &self,
        paths: &[ResourcePath],
        timeout: Duration,
    ) -> vision_core::Result<Vec<Record>> {
        match self {
            CliSource::File(source) => source.fetch_paths(paths, timeout).await,
            CliSource::Http(api) => api.fetch_paths(paths, timeout).await,
        }
    }
}
