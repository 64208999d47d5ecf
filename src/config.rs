//! Runtime configuration read from the process environment.
//!
//! Everything except the upstream credential is resolved once at startup.
//! The credential is looked up on every request through [`CredentialSource`]
//! so a missing key surfaces per request instead of aborting boot.

use std::time::Duration;

use crate::constants::{
    API_KEY_ENV_VAR, DEFAULT_MAX_REQUEST_BODY_BYTES, DEFAULT_RATE_LIMIT_MAX_IDENTITIES,
    DEFAULT_RATE_LIMIT_MAX_REQUESTS, DEFAULT_RATE_LIMIT_WINDOW_SECS, DEFAULT_SWEEP_INTERVAL_SECS,
    DEFAULT_UPSTREAM_MODEL, DEFAULT_UPSTREAM_TIMEOUT_SECS, DEFAULT_UPSTREAM_URL,
};
use crate::services::rate_limit::RateLimitConfig;

#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub port: u16,
    pub upstream_url: String,
    pub upstream_model: String,
    pub upstream_timeout: Duration,
    pub rate_limit: RateLimitConfig,
    pub sweep_interval: Duration,
    pub max_body_bytes: usize,
}

impl GatewayConfig {
    pub fn from_env() -> Self {
        Self {
            port: env_parse("PORT", 3000),
            upstream_url: env_string("AI_GATEWAY_URL", DEFAULT_UPSTREAM_URL),
            upstream_model: env_string("AI_GATEWAY_MODEL", DEFAULT_UPSTREAM_MODEL),
            upstream_timeout: Duration::from_secs(env_parse(
                "AI_GATEWAY_TIMEOUT_SECS",
                DEFAULT_UPSTREAM_TIMEOUT_SECS,
            )),
            rate_limit: RateLimitConfig {
                max_requests: env_parse("RATE_LIMIT_MAX_REQUESTS", DEFAULT_RATE_LIMIT_MAX_REQUESTS),
                window: Duration::from_secs(env_parse(
                    "RATE_LIMIT_WINDOW_SECS",
                    DEFAULT_RATE_LIMIT_WINDOW_SECS,
                )),
                max_identities: env_parse(
                    "RATE_LIMIT_MAX_IDENTITIES",
                    DEFAULT_RATE_LIMIT_MAX_IDENTITIES,
                ),
            },
            sweep_interval: Duration::from_secs(env_parse(
                "RATE_LIMIT_SWEEP_INTERVAL_SECS",
                DEFAULT_SWEEP_INTERVAL_SECS,
            )),
            max_body_bytes: env_parse("MAX_REQUEST_BODY_BYTES", DEFAULT_MAX_REQUEST_BODY_BYTES),
        }
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            upstream_url: DEFAULT_UPSTREAM_URL.to_string(),
            upstream_model: DEFAULT_UPSTREAM_MODEL.to_string(),
            upstream_timeout: Duration::from_secs(DEFAULT_UPSTREAM_TIMEOUT_SECS),
            rate_limit: RateLimitConfig::default(),
            sweep_interval: Duration::from_secs(DEFAULT_SWEEP_INTERVAL_SECS),
            max_body_bytes: DEFAULT_MAX_REQUEST_BODY_BYTES,
        }
    }
}

/// Parse a positive numeric env var, falling back on absence, garbage or zero.
fn env_parse<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + PartialEq + Default + Copy,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse::<T>().ok())
        .filter(|v| *v != T::default())
        .unwrap_or(default)
}

fn env_string(key: &str, default: &str) -> String {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}

/// Where the upstream API key comes from.
pub trait CredentialSource: Send + Sync {
    /// Current credential, or `None` when it is unset or blank.
    fn api_key(&self) -> Option<String>;
}

/// Reads the credential from an environment variable on every call.
#[derive(Debug, Clone)]
pub struct EnvCredential {
    var: String,
}

impl EnvCredential {
    pub fn new(var: &str) -> Self {
        Self {
            var: var.to_string(),
        }
    }
}

impl Default for EnvCredential {
    fn default() -> Self {
        Self::new(API_KEY_ENV_VAR)
    }
}

impl CredentialSource for EnvCredential {
    fn api_key(&self) -> Option<String> {
        std::env::var(&self.var)
            .ok()
            .filter(|key| !key.trim().is_empty())
    }
}

/// Fixed credential, for tests and embedding.
#[derive(Debug, Clone, Default)]
pub struct StaticCredential(pub Option<String>);

impl CredentialSource for StaticCredential {
    fn api_key(&self) -> Option<String> {
        self.0.clone().filter(|key| !key.trim().is_empty())
    }
}
