//! API base URL type.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use url::Url;

use super::ResourcePath;
use crate::error::{Error, InvalidInputError};

/// A validated base URL for the Vision API or for a local record store.
///
/// Network URLs must use HTTPS (or HTTP for localhost). `file://` URLs point
/// at a directory of JSON collection files that stands in for the live API.
///
/// # Example
///
/// ```
/// use vision_core::{ApiUrl, ResourcePath};
///
/// let api = ApiUrl::new("https://vision.example.org/api/v1").unwrap();
/// let path = ResourcePath::new("/cameras").unwrap();
/// assert_eq!(api.endpoint_url(&path), "https://vision.example.org/api/v1/cameras");
///
/// let local = ApiUrl::new("file:///tmp/vision-mock").unwrap();
/// assert!(local.is_local());
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ApiUrl(Url);

impl ApiUrl {
    /// Parse and validate a base URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL cannot be parsed, is relative, carries a
    /// query or fragment, or uses plain HTTP for a non-local host.
    pub fn new(s: impl AsRef<str>) -> Result<Self, Error> {
        let s = s.as_ref();
        let url = Url::parse(s).map_err(|e| InvalidInputError::ApiUrl {
            value: s.to_string(),
            reason: e.to_string(),
        })?;

        Self::validate(&url, s)?;

        // Normalize: remove trailing slash
        let normalized = if url.path() == "/" {
            let mut u = url.clone();
            u.set_path("");
            u
        } else {
            url
        };

        Ok(Self(normalized))
    }

    /// Returns the absolute URL of a resource path under this base.
    pub fn endpoint_url(&self, path: &ResourcePath) -> String {
        let base = self.0.as_str().trim_end_matches('/');
        format!("{}{}", base, path)
    }

    /// Returns the base URL as a string.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Returns the inner URL.
    pub fn as_url(&self) -> &Url {
        &self.0
    }

    /// Returns the host string.
    pub fn host(&self) -> Option<&str> {
        self.0.host_str()
    }

    /// Returns the URL scheme (e.g., "https", "http", "file").
    pub fn scheme(&self) -> &str {
        self.0.scheme()
    }

    /// Returns true if this is a local record store (file:// URL).
    pub fn is_local(&self) -> bool {
        self.0.scheme() == "file"
    }

    /// Returns true if this is a network API (http:// or https:// URL).
    pub fn is_network(&self) -> bool {
        let scheme = self.0.scheme();
        scheme == "http" || scheme == "https"
    }

    /// Returns the filesystem path for file:// URLs.
    ///
    /// Returns `None` for non-file URLs.
    pub fn to_file_path(&self) -> Option<PathBuf> {
        if self.is_local() {
            self.0.to_file_path().ok()
        } else {
            None
        }
    }

    fn validate(url: &Url, original: &str) -> Result<(), Error> {
        let invalid = |reason: &str| -> Error {
            InvalidInputError::ApiUrl {
                value: original.to_string(),
                reason: reason.to_string(),
            }
            .into()
        };

        if url.cannot_be_a_base() {
            return Err(invalid("must be an absolute URL"));
        }

        if url.query().is_some() || url.fragment().is_some() {
            return Err(invalid("must not carry a query or fragment"));
        }

        let scheme = url.scheme();

        if scheme == "file" {
            if url.path().is_empty() {
                return Err(invalid("file:// URL must have a path"));
            }
            return Ok(());
        }

        let is_localhost = url
            .host_str()
            .is_some_and(|h| h == "localhost" || h == "127.0.0.1" || h == "[::1]");

        if scheme != "https" && !(scheme == "http" && is_localhost) {
            return Err(invalid("must use HTTPS (HTTP allowed only for localhost)"));
        }

        if url.host_str().is_none() {
            return Err(invalid("must have a host"));
        }

        Ok(())
    }
}

impl fmt::Display for ApiUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ApiUrl {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl Serialize for ApiUrl {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.0.as_str())
    }
}

impl<'de> Deserialize<'de> for ApiUrl {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        ApiUrl::new(&s).map_err(serde::de::Error::custom)
    }
}

impl AsRef<str> for ApiUrl {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cameras() -> ResourcePath {
        ResourcePath::new("/cameras").unwrap()
    }

    #[test]
    fn valid_https_url() {
        let api = ApiUrl::new("https://vision.example.org").unwrap();
        assert_eq!(api.host(), Some("vision.example.org"));
        assert!(api.is_network());
    }

    #[test]
    fn valid_localhost_http() {
        let api = ApiUrl::new("http://127.0.0.1:8080").unwrap();
        assert_eq!(api.host(), Some("127.0.0.1"));
    }

    #[test]
    fn endpoint_url_keeps_base_path() {
        let api = ApiUrl::new("https://vision.example.org/api/v1").unwrap();
        assert_eq!(
            api.endpoint_url(&cameras()),
            "https://vision.example.org/api/v1/cameras"
        );
    }

    #[test]
    fn endpoint_url_ignores_trailing_slash() {
        let api = ApiUrl::new("https://vision.example.org/").unwrap();
        assert_eq!(
            api.endpoint_url(&cameras()),
            "https://vision.example.org/cameras"
        );

        let api = ApiUrl::new("https://vision.example.org/api/").unwrap();
        assert_eq!(
            api.endpoint_url(&cameras()),
            "https://vision.example.org/api/cameras"
        );
    }

    #[test]
    fn invalid_http_non_localhost() {
        assert!(ApiUrl::new("http://vision.example.org").is_err());
    }

    #[test]
    fn invalid_relative_url() {
        assert!(ApiUrl::new("/cameras").is_err());
    }

    #[test]
    fn rejects_query_string() {
        assert!(ApiUrl::new("https://vision.example.org/?page=1").is_err());
    }

    #[test]
    fn valid_file_url() {
        let api = ApiUrl::new("file:///tmp/vision-mock").unwrap();
        assert!(api.is_local());
        assert!(!api.is_network());
        assert_eq!(api.scheme(), "file");
    }

    #[cfg(unix)]
    #[test]
    fn file_url_to_path() {
        let api = ApiUrl::new("file:///tmp/vision-mock").unwrap();
        assert_eq!(
            api.to_file_path().unwrap(),
            PathBuf::from("/tmp/vision-mock")
        );
    }

    #[test]
    fn network_url_has_no_file_path() {
        let api = ApiUrl::new("https://vision.example.org").unwrap();
        assert!(api.to_file_path().is_none());
    }

    #[test]
    fn deserializes_with_validation() {
        let api: ApiUrl = serde_json::from_str("\"https://vision.example.org\"").unwrap();
        assert_eq!(api.host(), Some("vision.example.org"));
        assert!(serde_json::from_str::<ApiUrl>("\"ftp://vision.example.org\"").is_err());
    }
}
