//! vision-http - HTTP client for the Vision AI identification API.
//!
//! [`AuthSession`] exchanges credentials for a bearer token and renews it
//! once it ages past the configured threshold. [`PaginatedFetcher`] probes a
//! collection's size and fetches all its pages concurrently, absorbing
//! per-page failures. [`VisionApi`] bundles both behind the named
//! collections the dashboard reads.

mod api;
mod client;
mod config;
mod endpoints;
mod fetcher;
mod session;

pub use api::VisionApi;
pub use client::ApiClient;
pub use config::{
    ClientConfig, DEFAULT_AUTH_TIMEOUT, DEFAULT_PAGE_SIZE, DEFAULT_RENEWAL_THRESHOLD,
    DEFAULT_TIMEOUT,
};
pub use fetcher::{FetchSummary, PaginatedFetcher};
pub use session::{AuthHeaders, AuthSession};
