//! Main BitBuffet client implementation.

use crate::error::{BoxError, Error, Result};
use crate::request::resolve;
use crate::schema::SchemaDescriptor;
use crate::transport::{ReqwestTransport, Transport};
use crate::types::*;
use crate::version::{build_user_agent, API_VERSION, DEFAULT_BASE_URL};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

const DEFAULT_TIMEOUT_SECS: u64 = 60;
const EXTRACT_PATH: &str = "/extract";

/// Builder for constructing a [`Client`].
pub struct ClientBuilder {
    api_key: String,
    base_url: String,
    api_version: String,
    timeout: Duration,
    user_agent_suffix: Option<String>,
    transport: Option<Arc<dyn Transport>>,
}

impl ClientBuilder {
    /// Create a new client builder with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            api_version: API_VERSION.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent_suffix: None,
            transport: None,
        }
    }

    /// Set the API base URL.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the API version path segment.
    pub fn api_version(mut self, version: impl Into<String>) -> Self {
        self.api_version = version.into().trim_matches('/').to_string();
        self
    }

    /// Set the default per-call timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set a custom User-Agent suffix.
    pub fn user_agent_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.user_agent_suffix = Some(suffix.into());
        self
    }

    /// Use a custom transport instead of the built-in `reqwest` one.
    ///
    /// The transport is responsible for authentication; the base URL and
    /// User-Agent settings are ignored.
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Build the client.
    pub fn build(self) -> Result<Client> {
        if self.api_key.trim().is_empty() {
            return Err(Error::Config(
                "API key is required. Please provide a valid API key when initializing the client."
                    .into(),
            ));
        }

        if self.timeout.is_zero() {
            return Err(Error::Config("timeout must be greater than zero".into()));
        }

        let base_url = if self.api_version.is_empty() {
            self.base_url
        } else {
            format!("{}/{}", self.base_url, self.api_version)
        };

        let (transport, base_url): (Arc<dyn Transport>, Option<String>) = match self.transport {
            Some(transport) => (transport, None),
            None => {
                // Warn about insecure connections
                if !base_url.starts_with("https://") {
                    warn!(
                        base_url = %base_url,
                        "API base URL is not using HTTPS. This is insecure."
                    );
                }

                let user_agent = build_user_agent(self.user_agent_suffix.as_deref());
                let transport =
                    ReqwestTransport::new(base_url.clone(), &self.api_key, &user_agent)?;
                (Arc::new(transport), Some(base_url))
            }
        };

        Ok(Client {
            base_url,
            default_timeout: self.timeout,
            transport,
        })
    }
}

/// The BitBuffet SDK client.
///
/// Configuration is fixed at construction. The client holds no per-call state,
/// so one instance (or its clones) can serve any number of concurrent calls.
///
/// # Example
///
/// ```rust,no_run
/// use bitbuffet::{Client, ExtractConfig, TypedSchema};
/// use schemars::JsonSchema;
/// use serde::Deserialize;
///
/// #[derive(Debug, Deserialize, JsonSchema)]
/// struct Article {
///     title: String,
///     author: String,
/// }
///
/// #[tokio::main]
/// async fn main() -> Result<(), bitbuffet::Error> {
///     let client = Client::new("your-api-key")?;
///
///     let article = client
///         .extract_json(
///             "https://example.com/article",
///             TypedSchema::<Article>::new(),
///             ExtractConfig::default(),
///         )
///         .await?;
///     println!("{:?}", article);
///
///     let markdown = client
///         .extract_markdown("https://example.com/article", ExtractConfig::default())
///         .await?;
///     println!("{}", markdown);
///     Ok(())
/// }
/// ```
#[derive(Clone)]
pub struct Client {
    base_url: Option<String>,
    default_timeout: Duration,
    transport: Arc<dyn Transport>,
}

impl Client {
    /// Create a client with default settings.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        ClientBuilder::new(api_key).build()
    }

    /// Create a new client builder.
    pub fn builder(api_key: impl Into<String>) -> ClientBuilder {
        ClientBuilder::new(api_key)
    }

    /// The versioned API root, or `None` when a custom transport was supplied
    /// (the transport then decides where requests go).
    pub fn base_url(&self) -> Option<&str> {
        self.base_url.as_deref()
    }

    /// Timeout applied when a call does not supply one.
    pub fn default_timeout(&self) -> Duration {
        self.default_timeout
    }

    /// Extract a web page.
    ///
    /// The mode follows from the shape of `args`: a schema selects JSON unless the
    /// accompanying configuration asks for markdown (which is rejected), and a
    /// configuration on its own selects whatever its mode indicator says, JSON by
    /// default (which is rejected for lack of a schema). All argument checks run
    /// before any request is sent.
    pub async fn extract<S>(
        &self,
        url: impl AsRef<str>,
        args: ExtractArgs<S>,
    ) -> Result<ExtractionResult<S::Output>>
    where
        S: SchemaDescriptor,
    {
        let request = resolve(url.as_ref(), args, self.default_timeout)?;
        let payload = request.payload()?;
        let envelope = self.send(&payload, request.timeout).await?;

        if !envelope.success {
            debug!(
                url = %payload.url,
                error = envelope.error.as_deref().unwrap_or("Unknown error"),
                "Extraction failed"
            );
        }

        request.interpret(envelope)
    }

    /// Extract structured data matching `schema`.
    ///
    /// `config.mode` must be absent or JSON.
    pub async fn extract_json<S>(
        &self,
        url: impl AsRef<str>,
        schema: S,
        config: ExtractConfig,
    ) -> Result<S::Output>
    where
        S: SchemaDescriptor,
    {
        let args = ExtractArgs::schema(schema).with_config(config);
        match self.extract(url, args).await? {
            ExtractionResult::Structured(value) => Ok(value),
            ExtractionResult::Markdown(_) => Err(Error::ModeMismatch(
                "expected structured data, got markdown".into(),
            )),
        }
    }

    /// Extract the page as markdown.
    ///
    /// Any mode set on `config` is overridden. The content is not validated, but
    /// it must be a JSON string: a `null` or non-string `data` field fails with
    /// [`Error::Validation`] instead of being passed through.
    pub async fn extract_markdown(
        &self,
        url: impl AsRef<str>,
        config: ExtractConfig,
    ) -> Result<String> {
        let config = ExtractConfig {
            mode: Some(ExtractionMode::Markdown),
            ..config
        };
        match self.extract(url, ExtractArgs::config(config)).await? {
            ExtractionResult::Markdown(content) => Ok(content),
            ExtractionResult::Structured(_) => Err(Error::ModeMismatch(
                "expected markdown, got structured data".into(),
            )),
        }
    }

    async fn send(&self, payload: &ExtractPayload, timeout: Duration) -> Result<ApiEnvelope> {
        let body = serde_json::to_value(payload).map_err(|e| {
            Error::InvalidParameter(format!("payload could not be serialized: {e}"))
        })?;

        debug!(
            url = %payload.url,
            mode = %payload.mode,
            timeout_ms = timeout.as_millis() as u64,
            "Sending extraction request"
        );

        let response =
            match tokio::time::timeout(timeout, self.transport.post(EXTRACT_PATH, &body, timeout))
                .await
            {
                Ok(Ok(response)) => response,
                Ok(Err(e)) => {
                    warn!(error = %e, url = %payload.url, "Extraction request failed");
                    return Err(transport_error(e, timeout));
                }
                Err(_) => {
                    warn!(url = %payload.url, "Extraction request timed out");
                    return Err(Error::timeout(timeout));
                }
            };

        if !response.is_success() {
            let detail = serde_json::from_str::<ApiEnvelope>(&response.body)
                .ok()
                .and_then(|envelope| envelope.error);
            let message = match detail {
                Some(detail) => format!("API request failed: HTTP {}: {}", response.status, detail),
                None => format!("API request failed: HTTP {}", response.status),
            };
            warn!(status = response.status, url = %payload.url, "Extraction request rejected");
            return Err(Error::Transport {
                message,
                status: Some(response.status),
                timed_out: false,
                source: None,
            });
        }

        serde_json::from_str(&response.body).map_err(|e| Error::Transport {
            message: format!("Invalid JSON response: {e}"),
            status: Some(response.status),
            timed_out: false,
            source: Some(Box::new(e)),
        })
    }
}

fn transport_error(e: BoxError, timeout: Duration) -> Error {
    let timed_out = e
        .downcast_ref::<reqwest::Error>()
        .is_some_and(reqwest::Error::is_timeout);

    if timed_out {
        return Error::Transport {
            message: format!("Request timed out after {}ms: {}", timeout.as_millis(), e),
            status: None,
            timed_out: true,
            source: Some(e),
        };
    }

    Error::Transport {
        message: format!("API request failed: {e}"),
        status: None,
        timed_out: false,
        source: Some(e),
    }
}
