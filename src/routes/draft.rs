use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
};
use serde::Serialize;
use std::sync::Arc;

use crate::AppState;
use crate::domain::ClientIdentity;
use crate::services::dispatcher::DraftEnvelope;
use crate::services::error::GatewayError;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/draft", post(create_draft).options(preflight))
}

#[derive(Serialize)]
struct DraftResponse {
    text: String,
}

/// OPTIONS /draft - CORS preflight, headers are added by the app-wide layer
async fn preflight() -> StatusCode {
    StatusCode::NO_CONTENT
}

/// POST /draft - Admit, validate, and relay one draft to the upstream model
///
/// Admission runs before the body is parsed, so malformed requests still
/// spend a slot.
async fn create_draft(
    State(state): State<Arc<AppState>>,
    identity: ClientIdentity,
    body: Bytes,
) -> Result<Response, GatewayError> {
    let decision = state.admission.check(&identity).await;
    if !decision.allowed {
        tracing::warn!(client = %identity.redacted(), "[draft] rate limit exceeded");
        return Err(GatewayError::RateLimited {
            retry_after_secs: state.admission.retry_after().as_secs(),
        });
    }

    let envelope = DraftEnvelope::from_slice(&body);
    let generated = state.dispatcher.run(envelope).await.inspect_err(|e| {
        if let GatewayError::Validation(reason) = e {
            tracing::debug!(client = %identity.redacted(), %reason, "[draft] rejected request");
        }
    })?;

    tracing::info!(
        client = %identity.redacted(),
        action = %generated.action,
        remaining = decision.remaining,
        "[draft] generated document"
    );

    let mut response = Json(DraftResponse {
        text: generated.text,
    })
    .into_response();
    response
        .headers_mut()
        .insert("x-ratelimit-remaining", HeaderValue::from(decision.remaining));

    Ok(response)
}
