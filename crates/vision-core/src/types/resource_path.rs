//! Resource path type.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, InvalidInputError};

/// A validated path of a collection or item endpoint, e.g. `/cameras` or
/// `/cameras/3f2a`.
///
/// Always starts with `/`, has at least one segment, and never carries a
/// query string, fragment, whitespace, empty segment or dot segment. A
/// single trailing slash is dropped.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourcePath(String);

impl ResourcePath {
    /// Parse and validate a resource path.
    pub fn new(s: impl AsRef<str>) -> Result<Self, Error> {
        let original = s.as_ref();
        let invalid = |reason: &str| -> Error {
            InvalidInputError::ResourcePath {
                value: original.to_string(),
                reason: reason.to_string(),
            }
            .into()
        };

        if !original.starts_with('/') {
            return Err(invalid("must start with '/'"));
        }
        if original.contains(['?', '#']) {
            return Err(invalid("must not contain a query or fragment"));
        }
        if original.chars().any(char::is_whitespace) {
            return Err(invalid("must not contain whitespace"));
        }

        let trimmed = original.strip_suffix('/').unwrap_or(original);
        if trimmed.is_empty() {
            return Err(invalid("must name a resource"));
        }

        for segment in trimmed[1..].split('/') {
            match segment {
                "" => return Err(invalid("must not contain empty segments")),
                "." | ".." => return Err(invalid("must not contain dot segments")),
                _ => {}
            }
        }

        Ok(Self(trimmed.to_string()))
    }

    /// Returns the path as a string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the path of an item below this one, e.g. `/cameras` + `abc`.
    pub fn child(&self, segment: impl AsRef<str>) -> Result<Self, Error> {
        Self::new(format!("{}/{}", self.0, segment.as_ref()))
    }

    /// Returns the enclosing collection, or `None` for a top-level path.
    pub fn parent(&self) -> Option<Self> {
        let idx = self.0.rfind('/')?;
        if idx == 0 {
            None
        } else {
            Some(Self(self.0[..idx].to_string()))
        }
    }

    /// Returns the final segment.
    pub fn last_segment(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or_default()
    }

    /// Iterates the path segments in order.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0[1..].split('/')
    }
}

impl fmt::Display for ResourcePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ResourcePath {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for ResourcePath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Serialize for ResourcePath {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for ResourcePath {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        ResourcePath::new(&s).map_err(serde::de::Error::custom)
    }
}
