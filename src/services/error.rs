//! Error types for the draft endpoint and their HTTP rendering

use axum::{
    Json,
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use serde_json::json;

use super::upstream::UpstreamError;

/// Client input problems, always answered with 400
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Invalid request: action is required")]
    MissingAction,
    #[error("Invalid action type")]
    UnknownAction(String),
    #[error("Invalid request: prompt content is required")]
    EmptyPrompt,
}

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("rate limit exceeded")]
    RateLimited { retry_after_secs: u64 },
    #[error("upstream credential not configured")]
    NotConfigured,
    #[error(transparent)]
    Upstream(#[from] UpstreamError),
}

impl GatewayError {
    pub fn status(&self) -> StatusCode {
        match self {
            GatewayError::Validation(_) => StatusCode::BAD_REQUEST,
            GatewayError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            GatewayError::NotConfigured => StatusCode::INTERNAL_SERVER_ERROR,
            GatewayError::Upstream(UpstreamError::RateLimited) => StatusCode::TOO_MANY_REQUESTS,
            GatewayError::Upstream(UpstreamError::CreditsExhausted) => StatusCode::PAYMENT_REQUIRED,
            GatewayError::Upstream(UpstreamError::Timeout) => StatusCode::GATEWAY_TIMEOUT,
            GatewayError::Upstream(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message shown to the caller. Never includes upstream detail.
    pub fn public_message(&self) -> String {
        match self {
            GatewayError::Validation(e) => e.to_string(),
            GatewayError::RateLimited { .. } => {
                "Rate limit exceeded. Please wait before making more requests.".to_string()
            }
            GatewayError::NotConfigured => "AI service not configured".to_string(),
            GatewayError::Upstream(UpstreamError::RateLimited) => {
                "Rate limit exceeded. Please try again in a moment.".to_string()
            }
            GatewayError::Upstream(UpstreamError::CreditsExhausted) => {
                "AI credits exhausted. Please add credits to continue.".to_string()
            }
            GatewayError::Upstream(UpstreamError::Timeout) => "AI service timed out".to_string(),
            GatewayError::Upstream(_) => "AI service error".to_string(),
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = Json(json!({ "error": self.public_message() }));
        let mut response = (status, body).into_response();

        if let GatewayError::RateLimited { retry_after_secs } = self {
            let headers = response.headers_mut();
            headers.insert("x-ratelimit-remaining", HeaderValue::from_static("0"));
            headers.insert("retry-after", HeaderValue::from(retry_after_secs));
        }

        response
    }
}
