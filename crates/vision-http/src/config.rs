//! Client configuration.

use std::time::Duration;

use vision_core::ApiUrl;

/// Token age after which the session re-authenticates.
pub const DEFAULT_RENEWAL_THRESHOLD: Duration = Duration::from_secs(600);

/// Items requested per page.
pub const DEFAULT_PAGE_SIZE: u32 = 300;

/// Per-request timeout for page and path fetches.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(600);

/// Timeout for the token request.
pub const DEFAULT_AUTH_TIMEOUT: Duration = Duration::from_secs(20);

/// Settings shared by the session, the fetcher and the API facade.
///
/// ```
/// use std::time::Duration;
/// use vision_core::ApiUrl;
/// use vision_http::ClientConfig;
///
/// let config = ClientConfig::new(ApiUrl::new("https://vision.example.org").unwrap())
///     .with_page_size(100)
///     .with_max_concurrency(Some(16));
/// assert_eq!(config.page_size, 100);
/// assert_eq!(config.timeout, Duration::from_secs(600));
/// ```
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: ApiUrl,
    pub renewal_threshold: Duration,
    pub page_size: u32,
    pub timeout: Duration,
    pub auth_timeout: Duration,
    /// Upper bound on in-flight requests per fan-out. `None` means one task
    /// per page with no cap.
    pub max_concurrency: Option<usize>,
}

impl ClientConfig {
    pub fn new(base_url: ApiUrl) -> Self {
        Self {
            base_url,
            renewal_threshold: DEFAULT_RENEWAL_THRESHOLD,
            page_size: DEFAULT_PAGE_SIZE,
            timeout: DEFAULT_TIMEOUT,
            auth_timeout: DEFAULT_AUTH_TIMEOUT,
            max_concurrency: None,
        }
    }

    pub fn with_renewal_threshold(mut self, threshold: Duration) -> Self {
        self.renewal_threshold = threshold;
        self
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_auth_timeout(mut self, timeout: Duration) -> Self {
        self.auth_timeout = timeout;
        self
    }

    pub fn with_max_concurrency(mut self, limit: Option<usize>) -> Self {
        self.max_concurrency = limit.filter(|&n| n > 0);
        self
    }
}
