//! API types for the BitBuffet SDK.

use crate::schema::NoSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::time::Duration;

/// Extraction mode.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ExtractionMode {
    /// Schema-validated structured data.
    #[default]
    Json,
    /// Raw markdown content.
    Markdown,
}

impl fmt::Display for ExtractionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtractionMode::Json => f.write_str("json"),
            ExtractionMode::Markdown => f.write_str("markdown"),
        }
    }
}

/// Reasoning effort requested from the extraction model.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ReasoningEffort {
    /// Medium effort.
    Medium,
    /// High effort.
    High,
}

/// Per-call extraction options.
///
/// `mode` is the mode indicator: leave it `None` to let the arguments decide
/// (structured JSON when a schema is supplied).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractConfig {
    /// Explicit mode indicator.
    pub mode: Option<ExtractionMode>,
    /// Additional instructions for the extraction model.
    pub prompt: Option<String>,
    /// Reasoning effort.
    pub reasoning_effort: Option<ReasoningEffort>,
    /// Sampling temperature. Mutually exclusive with `top_p`.
    pub temperature: Option<f64>,
    /// Nucleus sampling. Mutually exclusive with `temperature`.
    pub top_p: Option<f64>,
}

impl ExtractConfig {
    /// Configuration selecting markdown mode.
    pub fn markdown() -> Self {
        Self {
            mode: Some(ExtractionMode::Markdown),
            ..Default::default()
        }
    }

    /// Configuration selecting JSON mode.
    pub fn json() -> Self {
        Self {
            mode: Some(ExtractionMode::Json),
            ..Default::default()
        }
    }

    /// Set the prompt.
    pub fn prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = Some(prompt.into());
        self
    }

    /// Set the reasoning effort.
    pub fn reasoning_effort(mut self, effort: ReasoningEffort) -> Self {
        self.reasoning_effort = Some(effort);
        self
    }

    /// Set the sampling temperature.
    pub fn temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Set nucleus sampling.
    pub fn top_p(mut self, top_p: f64) -> Self {
        self.top_p = Some(top_p);
        self
    }
}

/// Arguments to [`Client::extract`](crate::Client::extract).
///
/// The variants mirror the accepted call shapes: a configuration object in the
/// schema slot, or a schema followed by an optional configuration. A timeout may
/// trail either shape; without one the client default applies.
#[derive(Debug, Clone)]
pub enum ExtractArgs<S> {
    /// `extract(url, config, timeout?)`
    Config {
        /// Configuration, including the mode indicator.
        config: ExtractConfig,
        /// Per-call timeout.
        timeout: Option<Duration>,
    },
    /// `extract(url, schema, config?, timeout?)`
    Schema {
        /// Expected output shape.
        schema: S,
        /// Configuration; its mode indicator selects the mode.
        config: Option<ExtractConfig>,
        /// Per-call timeout.
        timeout: Option<Duration>,
    },
}

impl ExtractArgs<NoSchema> {
    /// Configuration-only arguments.
    pub fn config(config: ExtractConfig) -> Self {
        ExtractArgs::Config {
            config,
            timeout: None,
        }
    }
}

impl<S> ExtractArgs<S> {
    /// Schema arguments with default configuration.
    pub fn schema(schema: S) -> Self {
        ExtractArgs::Schema {
            schema,
            config: None,
            timeout: None,
        }
    }

    /// Attach a configuration after the schema.
    ///
    /// On configuration-only arguments this replaces the configuration.
    pub fn with_config(self, new_config: ExtractConfig) -> Self {
        match self {
            ExtractArgs::Config { timeout, .. } => ExtractArgs::Config {
                config: new_config,
                timeout,
            },
            ExtractArgs::Schema {
                schema, timeout, ..
            } => ExtractArgs::Schema {
                schema,
                config: Some(new_config),
                timeout,
            },
        }
    }

    /// Attach the trailing timeout.
    pub fn with_timeout(mut self, new_timeout: Duration) -> Self {
        match &mut self {
            ExtractArgs::Config { timeout, .. } | ExtractArgs::Schema { timeout, .. } => {
                *timeout = Some(new_timeout);
            }
        }
        self
    }
}

/// Result of an extraction.
#[derive(Debug, Clone, PartialEq)]
pub enum ExtractionResult<T> {
    /// Data validated against the requested schema.
    Structured(T),
    /// Markdown content of the page.
    Markdown(String),
}

impl<T> ExtractionResult<T> {
    /// The mode that produced this result.
    pub fn mode(&self) -> ExtractionMode {
        match self {
            ExtractionResult::Structured(_) => ExtractionMode::Json,
            ExtractionResult::Markdown(_) => ExtractionMode::Markdown,
        }
    }

    /// The structured value, if any.
    pub fn into_structured(self) -> Option<T> {
        match self {
            ExtractionResult::Structured(value) => Some(value),
            ExtractionResult::Markdown(_) => None,
        }
    }

    /// The markdown content, if any.
    pub fn into_markdown(self) -> Option<String> {
        match self {
            ExtractionResult::Markdown(content) => Some(content),
            ExtractionResult::Structured(_) => None,
        }
    }
}

/// Wire payload for `POST /extract`.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ExtractPayload {
    /// URL to extract.
    pub url: String,
    /// Extraction mode.
    pub mode: ExtractionMode,
    /// Wire schema, JSON mode only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub json_schema: Option<Value>,
    /// Reasoning effort.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reasoning_effort: Option<ReasoningEffort>,
    /// Additional prompt.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
    /// Nucleus sampling.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f64>,
    /// Sampling temperature.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
}

/// Top-level response wrapper returned by the API.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ApiEnvelope {
    /// Whether the extraction succeeded.
    #[serde(default)]
    pub success: bool,
    /// Extracted data or markdown content.
    #[serde(default)]
    pub data: Option<Value>,
    /// Error detail on failure.
    #[serde(default)]
    pub error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_payload_skips_absent_fields() {
        let payload = ExtractPayload {
            url: "https://example.com".into(),
            mode: ExtractionMode::Markdown,
            json_schema: None,
            reasoning_effort: None,
            prompt: None,
            top_p: None,
            temperature: None,
        };

        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(
            value,
            json!({ "url": "https://example.com", "mode": "markdown" })
        );
    }

    #[test]
    fn test_payload_field_names() {
        let payload = ExtractPayload {
            url: "https://example.com".into(),
            mode: ExtractionMode::Json,
            json_schema: Some(json!({ "type": "object" })),
            reasoning_effort: Some(ReasoningEffort::High),
            prompt: Some("Custom prompt".into()),
            top_p: None,
            temperature: Some(1.2),
        };

        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(value["mode"], "json");
        assert_eq!(value["reasoning_effort"], "high");
        assert_eq!(value["prompt"], "Custom prompt");
        assert_eq!(value["temperature"], 1.2);
        assert!(value.get("top_p").is_none());
    }

    #[test]
    fn test_envelope_defaults() {
        let envelope: ApiEnvelope = serde_json::from_str("{}").unwrap();
        assert!(!envelope.success);
        assert!(envelope.data.is_none());

        let envelope: ApiEnvelope =
            serde_json::from_str(r##"{"success":true,"data":"# Title","method":"markdown"}"##)
                .unwrap();
        assert!(envelope.success);
        assert_eq!(envelope.data, Some(json!("# Title")));
    }

    #[test]
    fn test_args_builders() {
        let args = ExtractArgs::schema(())
            .with_config(ExtractConfig::markdown())
            .with_timeout(Duration::from_secs(5));

        match args {
            ExtractArgs::Schema {
                config, timeout, ..
            } => {
                assert_eq!(config.unwrap().mode, Some(ExtractionMode::Markdown));
                assert_eq!(timeout, Some(Duration::from_secs(5)));
            }
            ExtractArgs::Config { .. } => panic!("expected schema arguments"),
        }
    }
}
