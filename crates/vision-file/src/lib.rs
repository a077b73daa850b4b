//! vision-file - Flat-file record store.
//!
//! Holds pre-fetched collections as JSON files so the dashboard can run
//! against a snapshot instead of the live API. [`FileSource`] implements
//! the same [`RecordSource`](vision_core::RecordSource) trait as the network
//! client and returns records of identical shape.

mod source;
mod store;

pub use source::FileSource;
pub use store::FileStore;
