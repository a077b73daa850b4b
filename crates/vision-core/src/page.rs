//! Page arithmetic and per-page request/result types.

use serde::Deserialize;
use std::num::NonZeroU32;
use std::time::Duration;
use thiserror::Error;

use crate::error::InvalidInputError;
use crate::record::Record;
use crate::types::ResourcePath;
use crate::Result;

/// Number of pages to request for a collection of `total` items.
///
/// This is `round(total / page_size) + 1` with ties rounded to even. It is
/// never less than ceiling division and often requests one trailing empty
/// page. Callers depend on this exact count; do not replace it with
/// `div_ceil`.
///
/// Returns `None` when the count does not fit in a `u64`.
///
/// ```
/// use std::num::NonZeroU32;
/// use vision_core::total_pages;
///
/// let size = NonZeroU32::new(300).unwrap();
/// assert_eq!(total_pages(0, size), Some(1));
/// assert_eq!(total_pages(300, size), Some(2));
/// assert_eq!(total_pages(299, size), Some(2));
/// ```
pub fn total_pages(total: u64, page_size: NonZeroU32) -> Option<u64> {
    let size = u64::from(page_size.get());
    let quotient = total / size;
    let twice_remainder = (total % size) * 2;

    let rounded = match twice_remainder.cmp(&size) {
        std::cmp::Ordering::Less => quotient,
        std::cmp::Ordering::Greater => quotient + 1,
        std::cmp::Ordering::Equal => quotient + (quotient % 2),
    };

    rounded.checked_add(1)
}

/// Validates a page size, rejecting zero.
pub fn checked_page_size(page_size: u32) -> Result<NonZeroU32> {
    NonZeroU32::new(page_size).ok_or_else(|| InvalidInputError::PageSize.into())
}

/// One unit of fan-out: a single `GET path?page=n&size=m`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub path: ResourcePath,
    /// 1-based page index.
    pub page: u64,
    pub size: u32,
    pub timeout: Duration,
}

impl PageRequest {
    pub fn new(path: ResourcePath, page: u64, size: u32, timeout: Duration) -> Self {
        Self {
            path,
            page,
            size,
            timeout,
        }
    }

    /// The minimal request used to learn a collection's total.
    pub fn probe(path: ResourcePath, timeout: Duration) -> Self {
        Self::new(path, 1, 1, timeout)
    }

    /// Query parameters for this page.
    pub fn query(&self) -> [(&'static str, String); 2] {
        [("page", self.page.to_string()), ("size", self.size.to_string())]
    }
}

/// Why a single page contributed no items.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PageFailure {
    #[error("timed out after {duration_ms}ms")]
    Timeout { duration_ms: u64 },

    #[error("transport failure: {message}")]
    Transport { message: String },

    #[error("HTTP {status}")]
    Status { status: u16 },

    #[error("undecodable body: {message}")]
    Decode { message: String },
}

/// Outcome of one fan-out task.
#[derive(Debug, Clone, PartialEq)]
pub enum PageResult {
    Items(Vec<Record>),
    Failed(PageFailure),
}

impl PageResult {
    pub fn is_failed(&self) -> bool {
        matches!(self, PageResult::Failed(_))
    }

    /// Returns the page's items; a failed page yields none.
    pub fn into_items(self) -> Vec<Record> {
        match self {
            PageResult::Items(items) => items,
            PageResult::Failed(_) => Vec::new(),
        }
    }
}

/// Wire shape of a page response: `{"total": n, "items": [...]}`.
#[derive(Debug, Clone, Deserialize)]
pub struct PageBody {
    #[serde(default)]
    pub total: Option<u64>,
    pub items: Vec<Record>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn size(n: u32) -> NonZeroU32 {
        NonZeroU32::new(n).unwrap()
    }

    #[test]
    fn empty_collection_still_gets_one_page() {
        assert_eq!(total_pages(0, size(300)), Some(1));
    }

    #[test]
    fn exact_multiple_over_provisions() {
        assert_eq!(total_pages(300, size(300)), Some(2));
        assert_eq!(total_pages(600, size(300)), Some(3));
    }

    #[test]
    fn just_below_page_size() {
        assert_eq!(total_pages(299, size(300)), Some(2));
    }

    #[test]
    fn half_page_ties_round_to_even() {
        // 0.5 -> 0, 1.5 -> 2, 2.5 -> 2
        assert_eq!(total_pages(150, size(300)), Some(1));
        assert_eq!(total_pages(450, size(300)), Some(3));
        assert_eq!(total_pages(750, size(300)), Some(3));
    }

    #[test]
    fn never_fewer_than_ceiling_division() {
        assert_eq!(total_pages(330, size(300)), Some(2));
        assert_eq!(total_pages(1000, size(300)), Some(4));
        assert_eq!(total_pages(25, size(10)), Some(3));

        for total in 0..2_000u64 {
            assert!(total_pages(total, size(300)) >= Some(total.div_ceil(300)));
        }
    }

    #[test]
    fn page_size_of_one() {
        assert_eq!(total_pages(7, size(1)), Some(8));
    }

    #[test]
    fn page_count_overflow_is_none() {
        assert_eq!(total_pages(u64::MAX, size(1)), None);
        assert_eq!(total_pages(u64::MAX - 1, size(1)), Some(u64::MAX));
        assert!(total_pages(u64::MAX, size(2)).is_some());
    }

    #[test]
    fn zero_page_size_rejected() {
        assert!(checked_page_size(0).is_err());
        assert_eq!(checked_page_size(300).unwrap().get(), 300);
    }

    #[test]
    fn probe_query() {
        let path = ResourcePath::new("/cameras").unwrap();
        let probe = PageRequest::probe(path, Duration::from_secs(5));
        assert_eq!(
            probe.query(),
            [("page", "1".to_string()), ("size", "1".to_string())]
        );
    }

    #[test]
    fn failed_page_yields_no_items() {
        let failed = PageResult::Failed(PageFailure::Status { status: 502 });
        assert!(failed.is_failed());
        assert!(failed.into_items().is_empty());
    }

    #[test]
    fn page_body_requires_items() {
        let body: PageBody =
            serde_json::from_value(serde_json::json!({"total": 2, "items": [{"id": 1}]})).unwrap();
        assert_eq!(body.total, Some(2));
        assert_eq!(body.items.len(), 1);

        assert!(serde_json::from_value::<PageBody>(serde_json::json!({"total": 2})).is_err());
    }
}
