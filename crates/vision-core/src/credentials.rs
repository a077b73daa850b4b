//! Login credentials type.

use std::fmt;

/// Login credentials for the Vision API token endpoint.
///
/// Holds the username/password pair and, for deployments that require it,
/// an OAuth client id and secret.
///
/// # Security
///
/// The password and client secret are never exposed in Debug output.
///
/// # Example
///
/// ```
/// use vision_core::Credentials;
///
/// let creds = Credentials::new("operator", "hunter2").with_client("dashboard", "s3cret");
/// assert_eq!(creds.username(), "operator");
/// assert_eq!(creds.client_id(), Some("dashboard"));
/// ```
#[derive(Clone)]
pub struct Credentials {
    username: String,
    password: String,
    client_id: Option<String>,
    client_secret: Option<String>,
}

impl Credentials {
    /// Create new credentials from a username and password.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            client_id: None,
            client_secret: None,
        }
    }

    /// Attach an OAuth client id and secret.
    pub fn with_client(
        mut self,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        self.client_id = Some(client_id.into());
        self.client_secret = Some(client_secret.into());
        self
    }

    /// Returns the username.
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Returns the password.
    ///
    /// Use this only when building the token request. Never log it.
    pub fn password(&self) -> &str {
        &self.password
    }

    /// Returns the client id, if any.
    pub fn client_id(&self) -> Option<&str> {
        self.client_id.as_deref()
    }

    /// Returns the client secret, if any.
    pub fn client_secret(&self) -> Option<&str> {
        self.client_secret.as_deref()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("client_id", &self.client_id)
            .field(
                "client_secret",
                &self.client_secret.as_ref().map(|_| "[REDACTED]"),
            )
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credentials_hide_secrets_in_debug() {
        let creds = Credentials::new("operator", "secret123").with_client("dash", "topsecret");
        let debug = format!("{:?}", creds);
        assert!(debug.contains("operator"));
        assert!(debug.contains("dash"));
        assert!(!debug.contains("secret123"));
        assert!(!debug.contains("topsecret"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn client_fields_default_to_none() {
        let creds = Credentials::new("operator", "pw");
        assert_eq!(creds.client_id(), None);
        assert_eq!(creds.client_secret(), None);
        assert_eq!(creds.password(), "pw");
    }
}
