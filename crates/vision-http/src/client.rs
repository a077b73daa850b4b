//! HTTP transport for the Vision API.

use std::time::Duration;

use reqwest::header::HeaderMap;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, instrument, trace};

use vision_core::error::{Error, ProtocolError, TransportError};
use vision_core::{ApiUrl, ResourcePath};

use crate::endpoints::ErrorBody;

/// Thin wrapper over a shared `reqwest::Client` bound to one base URL.
///
/// Every call carries its own timeout, since token requests and page
/// fetches use different budgets.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    base: ApiUrl,
}

impl ApiClient {
    /// Create a client for the given base URL.
    pub fn new(base: ApiUrl) -> Result<Self, Error> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("vision-http/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| TransportError::Http {
                message: format!("failed to build HTTP client: {}", e),
            })?;

        Ok(Self { client, base })
    }

    /// Returns the base URL this client is configured for.
    pub fn base_url(&self) -> &ApiUrl {
        &self.base
    }

    /// POST a form-encoded body and decode the JSON response.
    #[instrument(skip(self, form), fields(base = %self.base, %path))]
    pub async fn post_form<B>(
        &self,
        path: &ResourcePath,
        form: &B,
        timeout: Duration,
    ) -> Result<Value, Error>
    where
        B: Serialize + ?Sized,
    {
        let url = self.base.endpoint_url(path);
        debug!(%url, "POST form");

        let response = self
            .client
            .post(&url)
            .form(form)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| transport_error(e, timeout))?;

        self.handle_response(response, timeout).await
    }

    /// GET a JSON document with the given query and headers.
    #[instrument(skip(self, headers), fields(base = %self.base, %path))]
    pub async fn get_json(
        &self,
        path: &ResourcePath,
        query: &[(&str, String)],
        headers: &HeaderMap,
        timeout: Duration,
    ) -> Result<Value, Error> {
        let url = self.base.endpoint_url(path);
        trace!(?query, "GET");

        let response = self
            .client
            .get(&url)
            .query(query)
            .headers(headers.clone())
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| transport_error(e, timeout))?;

        self.handle_response(response, timeout).await
    }

    async fn handle_response(
        &self,
        response: reqwest::Response,
        timeout: Duration,
    ) -> Result<Value, Error> {
        let status = response.status();
        trace!(status = %status, "response");

        if status.is_success() {
            let body = response
                .json::<Value>()
                .await
                .map_err(|e| transport_error(e, timeout))?;
            Ok(body)
        } else {
            Err(Error::Protocol(parse_error_response(response).await))
        }
    }
}

async fn parse_error_response(response: reqwest::Response) -> ProtocolError {
    let status = response.status().as_u16();

    match response.json::<ErrorBody>().await {
        Ok(body) => ProtocolError::new(status, body.detail_text()),
        Err(_) => ProtocolError::new(status, None),
    }
}

/// Classifies a reqwest failure.
pub(crate) fn transport_error(err: reqwest::Error, timeout: Duration) -> TransportError {
    if err.is_timeout() {
        TransportError::Timeout {
            duration_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
        }
    } else if err.is_connect() {
        TransportError::Connection {
            message: err.to_string(),
        }
    } else if err.is_decode() {
        TransportError::Decode {
            message: err.to_string(),
        }
    } else {
        TransportError::Http {
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_creation() {
        let base = ApiUrl::new("https://vision.example.org").unwrap();
        let client = ApiClient::new(base.clone()).unwrap();
        assert_eq!(client.base_url(), &base);
    }
}
