//! Record source trait.

use async_trait::async_trait;
use std::time::Duration;

use crate::types::{ApiUrl, ResourcePath};
use crate::{Record, Result};

/// Anything that can produce record collections: the live API or a file
/// snapshot of it.
///
/// Both methods follow the same degradation policy. A part of the fetch
/// that fails (a page, a path) contributes zero records instead of failing
/// the call. Errors are reserved for authentication, input validation and,
/// for local sources, an unreadable collection.
#[async_trait]
pub trait RecordSource: Send + Sync {
    /// Returns the base URL this source reads from.
    fn url(&self) -> &ApiUrl;

    /// Fetch every record of a paged collection.
    ///
    /// Records come back in completion order, not page order.
    async fn fetch_all(
        &self,
        path: &ResourcePath,
        page_size: u32,
        timeout: Duration,
    ) -> Result<Vec<Record>>;

    /// Fetch each of the given paths concurrently and concatenate the
    /// records they return.
    async fn fetch_paths(&self, paths: &[ResourcePath], timeout: Duration)
    -> Result<Vec<Record>>;
}
