//! vision-core - Core types and traits for the Vision AI API client.
//!
//! Everything here is free of network and filesystem I/O. Backends
//! (`vision-http`, `vision-file`) implement [`RecordSource`] on top of
//! these types so callers can swap a live API for a flat-file snapshot.

pub mod credentials;
pub mod error;
pub mod page;
pub mod record;
pub mod tokens;
pub mod traits;
pub mod types;

pub use credentials::Credentials;
pub use error::Error;
pub use page::{PageBody, PageFailure, PageRequest, PageResult, checked_page_size, total_pages};
pub use record::{Record, flatten_records, sort_records_by};
pub use tokens::AccessToken;
pub use traits::RecordSource;
pub use types::{ApiUrl, ResourcePath};

/// Result type alias using the crate's Error type.
pub type Result<T> = std::result::Result<T, Error>;
