//! Endpoint paths and wire types.

use serde::{Deserialize, Serialize};

/// Token endpoint (form-encoded POST).
pub const AUTH_TOKEN: &str = "/auth/token";

pub const CAMERAS: &str = "/cameras";

pub const OBJECTS: &str = "/objects";

pub const PROMPTS: &str = "/prompts";

pub const AI_IDENTIFICATIONS: &str = "/identifications/ai";

/// Form body for the token request.
#[derive(Debug, Serialize)]
pub struct TokenRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_secret: Option<&'a str>,
}

/// Token response. Only `access_token` is required for a usable session.
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    #[serde(default)]
    pub access_token: Option<String>,
}

/// Error body in the `{"detail": ...}` shape the API returns.
#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub detail: Option<serde_json::Value>,
}

impl ErrorBody {
    /// The detail as display text; structured details are rendered as JSON.
    pub fn detail_text(self) -> Option<String> {
        match self.detail? {
            serde_json::Value::String(s) => Some(s),
            serde_json::Value::Null => None,
            other => Some(other.to_string()),
        }
    }
}
