//! HTTP transport used by the client.

use crate::error::{BoxError, Error, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use serde_json::Value;
use std::time::Duration;

/// Raw HTTP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// Status code.
    pub status: u16,
    /// Response body.
    pub body: String,
}

impl HttpResponse {
    /// Whether the status is 2xx.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Sends JSON POST requests to the API.
///
/// Implementations own authentication and the base URL; `path` is relative to the
/// versioned API root. Any error returned is reported as a transport failure.
#[async_trait]
pub trait Transport: Send + Sync {
    /// POST `body` to `path`, giving up after `timeout`.
    async fn post(
        &self,
        path: &str,
        body: &Value,
        timeout: Duration,
    ) -> std::result::Result<HttpResponse, BoxError>;
}

/// Default [`Transport`] backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    base_url: String,
    headers: HeaderMap,
    http_client: reqwest::Client,
}

impl ReqwestTransport {
    /// Create a transport for `base_url` authenticating with `api_key`.
    pub fn new(base_url: impl Into<String>, api_key: &str, user_agent: &str) -> Result<Self> {
        let mut headers = HeaderMap::new();
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", api_key))
            .map_err(|_| Error::Config("API key contains invalid header characters".into()))?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(user_agent)
                .map_err(|_| Error::Config("User-Agent contains invalid characters".into()))?,
        );

        let http_client = reqwest::Client::builder()
            .build()
            .map_err(|e| Error::Config(format!("HTTP client could not be built: {e}")))?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            headers,
            http_client,
        })
    }

    /// The versioned API root requests are sent to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn post(
        &self,
        path: &str,
        body: &Value,
        timeout: Duration,
    ) -> std::result::Result<HttpResponse, BoxError> {
        let url = format!("{}{}", self.base_url, path);

        let response = self
            .http_client
            .post(url)
            .headers(self.headers.clone())
            .timeout(timeout)
            .json(body)
            .send()
            .await?;

        let status = response.status().as_u16();
        let body = response.text().await?;

        Ok(HttpResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let transport =
            ReqwestTransport::new("https://api.example.com/v1/", "key", "agent").unwrap();
        assert_eq!(transport.base_url(), "https://api.example.com/v1");
    }

    #[test]
    fn test_invalid_api_key_characters() {
        let err = ReqwestTransport::new("https://api.example.com", "bad\nkey", "agent").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_status_classification() {
        let ok = HttpResponse {
            status: 204,
            body: String::new(),
        };
        let not_found = HttpResponse {
            status: 404,
            body: String::new(),
        };
        assert!(ok.is_success());
        assert!(!not_found.is_success());
    }
}
