//! Concurrent paginated fetches.
//!
//! A fetch makes one freshness check on the session, one probe request to
//! learn the collection total, then spawns one task per page (or per
//! explicit path) on a [`JoinSet`]. Results are drained in completion
//! order. A task that times out, errors, or panics contributes no records;
//! only authentication and input errors fail the call.

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde_json::Value;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, instrument, trace, warn};

use vision_core::error::{Error, TransportError};
use vision_core::{
    PageBody, PageFailure, PageRequest, PageResult, Record, ResourcePath, Result,
    checked_page_size, flatten_records, total_pages,
};

use crate::client::ApiClient;
use crate::session::{AuthHeaders, AuthSession};

/// Counters for one fetch call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FetchSummary {
    /// Tasks spawned (pages or explicit paths).
    pub tasks: usize,
    /// Tasks that contributed nothing because they failed.
    pub failed: usize,
    /// Records returned.
    pub items: usize,
    pub elapsed: Duration,
}

/// Fetches whole collections through an [`AuthSession`].
#[derive(Debug, Clone)]
pub struct PaginatedFetcher {
    session: AuthSession,
    max_concurrency: Option<usize>,
}

impl PaginatedFetcher {
    /// A fetcher with unbounded fan-out: one in-flight request per page.
    pub fn new(session: AuthSession) -> Self {
        Self {
            session,
            max_concurrency: None,
        }
    }

    /// Caps the number of in-flight requests per fetch. `None` or `Some(0)`
    /// removes the cap.
    pub fn with_max_concurrency(mut self, limit: Option<usize>) -> Self {
        self.max_concurrency = limit.filter(|&n| n > 0);
        self
    }

    pub fn session(&self) -> &AuthSession {
        &self.session
    }

    pub fn max_concurrency(&self) -> Option<usize> {
        self.max_concurrency
    }

    /// Fetch every record of the paged collection at `path`.
    ///
    /// Records are returned in page completion order. An empty collection,
    /// or a probe that fails or carries no `total`, yields an empty vector.
    pub async fn fetch_all(
        &self,
        path: &ResourcePath,
        page_size: u32,
        timeout: Duration,
    ) -> Result<Vec<Record>> {
        self.fetch_all_detailed(path, page_size, timeout)
            .await
            .map(|(records, _)| records)
    }

    /// Like [`fetch_all`](Self::fetch_all), also returning fetch counters.
    #[instrument(skip(self), fields(%path))]
    pub async fn fetch_all_detailed(
        &self,
        path: &ResourcePath,
        page_size: u32,
        timeout: Duration,
    ) -> Result<(Vec<Record>, FetchSummary)> {
        let page_size = checked_page_size(page_size)?;
        let started = Instant::now();
        let headers = self.session.ensure_fresh().await?;

        let probe = PageRequest::probe(path.clone(), timeout);
        let Some(total) = self.probe_total(&probe, &headers).await else {
            debug!("Empty resource");
            return Ok(empty_fetch(started));
        };

        let Some(pages) = total_pages(total, page_size) else {
            warn!(total, "Page count overflows, treating resource as empty");
            return Ok(empty_fetch(started));
        };
        debug!(total, pages, "Probe complete");

        let targets = (1..=pages).map(|page| {
            FetchTarget::Page(PageRequest::new(path.clone(), page, page_size.get(), timeout))
        });

        Ok(self.fan_out(targets, headers, started).await)
    }

    /// Fetch each path concurrently and concatenate the records.
    ///
    /// A path may answer with a single record, a bare array, or an
    /// `{"items": [...]}` page. Exactly one request is made per path.
    pub async fn fetch_paths(
        &self,
        paths: &[ResourcePath],
        timeout: Duration,
    ) -> Result<Vec<Record>> {
        self.fetch_paths_detailed(paths, timeout)
            .await
            .map(|(records, _)| records)
    }

    /// Like [`fetch_paths`](Self::fetch_paths), also returning fetch counters.
    #[instrument(skip(self, paths), fields(paths = paths.len()))]
    pub async fn fetch_paths_detailed(
        &self,
        paths: &[ResourcePath],
        timeout: Duration,
    ) -> Result<(Vec<Record>, FetchSummary)> {
        let started = Instant::now();
        let headers = self.session.ensure_fresh().await?;

        let targets = paths.iter().map(|path| FetchTarget::Path {
            path: path.clone(),
            timeout,
        });

        Ok(self.fan_out(targets, headers, started).await)
    }

    /// Fetch a single page.
    pub async fn fetch_page(&self, request: &PageRequest) -> Result<PageResult> {
        checked_page_size(request.size)?;
        let headers = self.session.ensure_fresh().await?;
        let client = self.session.client();
        Ok(FetchTarget::Page(request.clone())
            .fetch(client, &headers)
            .await)
    }

    async fn probe_total(&self, probe: &PageRequest, headers: &AuthHeaders) -> Option<u64> {
        let body = match self
            .session
            .client()
            .get_json(&probe.path, &probe.query(), headers.as_map(), probe.timeout)
            .await
        {
            Ok(body) => body,
            Err(err) => {
                warn!(error = %err, "Probe failed, treating resource as empty");
                return None;
            }
        };

        if is_falsy(&body) {
            return None;
        }

        let total = body.get("total").and_then(item_count);
        if total.is_none() {
            debug!("Probe response has no usable total");
        }
        total
    }

    async fn fan_out(
        &self,
        targets: impl IntoIterator<Item = FetchTarget>,
        headers: AuthHeaders,
        started: Instant,
    ) -> (Vec<Record>, FetchSummary) {
        let limiter = self.max_concurrency.map(|n| Arc::new(Semaphore::new(n)));
        let mut tasks = JoinSet::new();

        for target in targets {
            let client = self.session.client().clone();
            let headers = headers.clone();
            let limiter = limiter.clone();

            tasks.spawn(async move {
                let _permit = match limiter {
                    Some(semaphore) => semaphore.acquire_owned().await.ok(),
                    None => None,
                };
                let label = target.to_string();
                (label, target.fetch(&client, &headers).await)
            });
        }

        let mut summary = FetchSummary {
            tasks: tasks.len(),
            ..FetchSummary::default()
        };
        let mut records = Vec::new();

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((label, PageResult::Items(items))) => {
                    trace!(resource = %label, items = items.len(), "Fetched");
                    records.extend(items);
                }
                Ok((label, PageResult::Failed(failure))) => {
                    summary.failed += 1;
                    warn!(resource = %label, %failure, "Fetch failed, contributing no records");
                }
                Err(err) => {
                    summary.failed += 1;
                    warn!(error = %err, "Fetch task did not complete");
                }
            }
        }

        summary.items = records.len();
        summary.elapsed = started.elapsed();
        debug!(
            tasks = summary.tasks,
            failed = summary.failed,
            items = summary.items,
            elapsed_ms = summary.elapsed.as_millis() as u64,
            "Fetch complete"
        );

        (records, summary)
    }
}

/// One unit of fan-out.
enum FetchTarget {
    Page(PageRequest),
    Path { path: ResourcePath, timeout: Duration },
}

impl FetchTarget {
    async fn fetch(self, client: &ApiClient, headers: &AuthHeaders) -> PageResult {
        match self {
            FetchTarget::Page(request) => {
                let response = client
                    .get_json(
                        &request.path,
                        &request.query(),
                        headers.as_map(),
                        request.timeout,
                    )
                    .await;
                match response {
                    Ok(body) if is_falsy(&body) => PageResult::Items(Vec::new()),
                    Ok(body) => match serde_json::from_value::<PageBody>(body) {
                        Ok(page) => PageResult::Items(page.items),
                        Err(err) => PageResult::Failed(PageFailure::Decode {
                            message: err.to_string(),
                        }),
                    },
                    Err(err) => PageResult::Failed(page_failure(err)),
                }
            }
            FetchTarget::Path { path, timeout } => {
                match client.get_json(&path, &[], headers.as_map(), timeout).await {
                    Ok(body) => PageResult::Items(flatten_records(body)),
                    Err(err) => PageResult::Failed(page_failure(err)),
                }
            }
        }
    }
}

impl fmt::Display for FetchTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchTarget::Page(request) => write!(f, "{}?page={}", request.path, request.page),
            FetchTarget::Path { path, .. } => write!(f, "{}", path),
        }
    }
}

fn page_failure(err: Error) -> PageFailure {
    match err {
        Error::Transport(TransportError::Timeout { duration_ms }) => {
            PageFailure::Timeout { duration_ms }
        }
        Error::Transport(TransportError::Decode { message }) => PageFailure::Decode { message },
        Error::Protocol(err) => PageFailure::Status { status: err.status },
        other => PageFailure::Transport {
            message: other.to_string(),
        },
    }
}

fn empty_fetch(started: Instant) -> (Vec<Record>, FetchSummary) {
    let summary = FetchSummary {
        elapsed: started.elapsed(),
        ..FetchSummary::default()
    };
    (Vec::new(), summary)
}

/// A non-negative whole count, accepting integral floats such as `25.0`.
fn item_count(value: &Value) -> Option<u64> {
    if let Some(n) = value.as_u64() {
        return Some(n);
    }
    let n = value.as_f64()?;
    // 2^64 as f64; anything at or above it does not fit.
    if n.is_finite() && n >= 0.0 && n.fract() == 0.0 && n < 18_446_744_073_709_551_616.0 {
        Some(n as u64)
    } else {
        None
    }
}

/// JSON truthiness: `null`, `false`, `0`, `""`, `[]` and `{}` are falsy.
fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
    }
}
