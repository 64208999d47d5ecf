//! Draft dispatch: validate the action, compose prompts, relay upstream.
//!
//! Check order inside [`DraftDispatcher::run`] is fixed and covered by tests:
//! action validation, then credential, then prompt composition, then the
//! single upstream call. Admission happens earlier, in the route handler.

use chrono::Utc;
use serde_json::Value;
use std::sync::Arc;

use super::error::{GatewayError, ValidationError};
use super::upstream::{GenerationBackend, GenerationRequest};
use crate::config::CredentialSource;
use crate::constants::DEFAULT_TEMPERATURE;
use crate::domain::{DraftAction, PromptBundle};

/// Raw request body. Both fields are kept loose so that wrong types
/// surface as validation errors instead of deserialization failures.
#[derive(Debug, Default)]
pub struct DraftEnvelope {
    pub action: Option<Value>,
    pub payload: Value,
}

impl DraftEnvelope {
    /// Parse a request body. Anything that is not a JSON object carries no
    /// action and is treated as such.
    pub fn from_slice(body: &[u8]) -> Self {
        match serde_json::from_slice::<Value>(body) {
            Ok(Value::Object(mut fields)) => Self {
                action: fields.remove("action"),
                payload: fields.remove("payload").unwrap_or(Value::Null),
            },
            _ => Self::default(),
        }
    }
}

/// Generated draft returned to the caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Generated {
    pub action: DraftAction,
    pub text: String,
}

/// Resolve the action field. Absent, null or non-string values are missing;
/// strings outside the enum are unknown.
pub fn parse_action(raw: Option<&Value>) -> Result<DraftAction, ValidationError> {
    let name = raw
        .and_then(Value::as_str)
        .filter(|name| !name.is_empty())
        .ok_or(ValidationError::MissingAction)?;

    name.parse::<DraftAction>()
        .map_err(|_| ValidationError::UnknownAction(name.to_string()))
}

/// Compose the prompt pair, refusing blank user prompts.
pub fn build_bundle(action: DraftAction, payload: &Value) -> Result<PromptBundle, ValidationError> {
    let bundle = PromptBundle::compose(action, payload, Utc::now());
    if !bundle.has_user_content() {
        return Err(ValidationError::EmptyPrompt);
    }
    Ok(bundle)
}

/// Validate and compose in one step, with no credential or network involved.
pub fn dispatch(action: Option<&Value>, payload: &Value) -> Result<PromptBundle, ValidationError> {
    let action = parse_action(action)?;
    build_bundle(action, payload)
}

/// Sampling temperature from the payload, when it is a sane number.
fn requested_temperature(payload: &Value) -> f64 {
    payload
        .get("temperature")
        .and_then(Value::as_f64)
        .filter(|t| (0.0..=2.0).contains(t))
        .unwrap_or(DEFAULT_TEMPERATURE)
}

pub struct DraftDispatcher {
    backend: Arc<dyn GenerationBackend>,
    credentials: Arc<dyn CredentialSource>,
}

impl DraftDispatcher {
    pub fn new(backend: Arc<dyn GenerationBackend>, credentials: Arc<dyn CredentialSource>) -> Self {
        Self {
            backend,
            credentials,
        }
    }

    pub async fn run(&self, envelope: DraftEnvelope) -> Result<Generated, GatewayError> {
        let action = parse_action(envelope.action.as_ref())?;

        let api_key = self.credentials.api_key().ok_or_else(|| {
            tracing::error!("upstream API key is not configured");
            GatewayError::NotConfigured
        })?;

        let prompt = build_bundle(action, &envelope.payload)?;
        let request = GenerationRequest {
            prompt,
            temperature: requested_temperature(&envelope.payload),
        };

        let text = self
            .backend
            .generate(&api_key, &request)
            .await
            .map_err(|e| {
                tracing::error!(%action, error = %e, "draft generation failed");
                GatewayError::Upstream(e)
            })?;

        Ok(Generated { action, text })
    }
}
