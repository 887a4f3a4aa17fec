//! Mode resolution, parameter validation and payload assembly.
//!
//! Resolution runs before the network is touched: a [`ResolvedRequest`] only
//! exists once the arguments are known to be legal.

use crate::error::{Error, Result, Violation};
use crate::schema::SchemaDescriptor;
use crate::types::*;
use serde_json::Value;
use std::time::Duration;

/// What the call will produce.
#[derive(Debug, Clone)]
pub(crate) enum Target<S> {
    Json(S),
    Markdown,
}

/// A validated extraction request, built per call and used once.
#[derive(Debug, Clone)]
pub(crate) struct ResolvedRequest<S> {
    pub(crate) url: String,
    pub(crate) target: Target<S>,
    pub(crate) config: ExtractConfig,
    pub(crate) timeout: Duration,
}

/// Resolve the extraction mode from the argument shape and validate it.
pub(crate) fn resolve<S>(
    url: &str,
    args: ExtractArgs<S>,
    default_timeout: Duration,
) -> Result<ResolvedRequest<S>> {
    let (schema, config, timeout) = match args {
        // A configuration in the schema slot is the configuration.
        ExtractArgs::Config { config, timeout } => (None, config, timeout),
        ExtractArgs::Schema {
            schema,
            config,
            timeout,
        } => (Some(schema), config.unwrap_or_default(), timeout),
    };

    if config.temperature.is_some() && config.top_p.is_some() {
        return Err(Error::ParameterConflict(
            "'temperature' and 'top_p' are mutually exclusive parameters; use only one".into(),
        ));
    }

    // Non-finite floats serialize as null.
    for (name, value) in [("temperature", config.temperature), ("top_p", config.top_p)] {
        if value.is_some_and(|v| !v.is_finite()) {
            return Err(Error::InvalidParameter(format!(
                "'{name}' must be a finite number"
            )));
        }
    }

    let target = match (config.mode.unwrap_or_default(), schema) {
        (ExtractionMode::Json, Some(schema)) => Target::Json(schema),
        (ExtractionMode::Json, None) => {
            return Err(Error::ModeMismatch(
                "schema required for json mode".into(),
            ))
        }
        (ExtractionMode::Markdown, None) => Target::Markdown,
        (ExtractionMode::Markdown, Some(_)) => {
            return Err(Error::ModeMismatch(
                "schema forbidden for markdown mode".into(),
            ))
        }
    };

    if url.trim().is_empty() {
        return Err(Error::InvalidParameter("url must not be empty".into()));
    }

    let timeout = timeout.unwrap_or(default_timeout);
    if timeout.is_zero() {
        return Err(Error::InvalidParameter(
            "timeout must be greater than zero".into(),
        ));
    }

    Ok(ResolvedRequest {
        url: url.to_string(),
        target,
        config,
        timeout,
    })
}

impl<S> ResolvedRequest<S> {
    pub(crate) fn mode(&self) -> ExtractionMode {
        match self.target {
            Target::Json(_) => ExtractionMode::Json,
            Target::Markdown => ExtractionMode::Markdown,
        }
    }
}

impl<S: SchemaDescriptor> ResolvedRequest<S> {
    /// Assemble the wire payload. Optional fields are only set when supplied.
    pub(crate) fn payload(&self) -> Result<ExtractPayload> {
        let json_schema = match &self.target {
            Target::Json(schema) => Some(schema.to_wire_schema()?),
            Target::Markdown => None,
        };

        Ok(ExtractPayload {
            url: self.url.clone(),
            mode: self.mode(),
            json_schema,
            reasoning_effort: self.config.reasoning_effort,
            prompt: self.config.prompt.clone(),
            top_p: self.config.top_p,
            temperature: self.config.temperature,
        })
    }

    /// Map the server envelope to a result for this request.
    pub(crate) fn interpret(self, envelope: ApiEnvelope) -> Result<ExtractionResult<S::Output>> {
        if !envelope.success {
            return Err(Error::Api(
                envelope.error.unwrap_or_else(|| "Unknown error".into()),
            ));
        }

        let data = envelope.data.unwrap_or(Value::Null);
        match self.target {
            Target::Markdown => match data {
                Value::String(content) => Ok(ExtractionResult::Markdown(content)),
                other => Err(Error::Validation {
                    violations: vec![Violation::new(
                        "",
                        format!("expected markdown string, got {}", json_kind(&other)),
                    )],
                }),
            },
            Target::Json(schema) => schema
                .validate(data)
                .map(ExtractionResult::Structured)
                .map_err(|violations| Error::Validation { violations }),
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
