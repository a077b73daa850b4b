//! Validated addressing types.
//!
//! Both types reject malformed input at construction, so a request URL
//! built from them is always well formed.

mod api_url;
mod resource_path;

pub use api_url::ApiUrl;
pub use resource_path::ResourcePath;
