//! Core traits shared by the record backends.

mod source;

pub use source::RecordSource;
