//! Application constants

/// Requests allowed per client identity within one window
pub const DEFAULT_RATE_LIMIT_MAX_REQUESTS: u32 = 20;

/// Length of a rate-limit window in seconds
pub const DEFAULT_RATE_LIMIT_WINDOW_SECS: u64 = 60;

/// Upper bound on client identities tracked by the in-memory limiter
pub const DEFAULT_RATE_LIMIT_MAX_IDENTITIES: usize = 100_000;

/// How often the background sweeper drops expired windows
pub const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 30;

/// Maximum accepted request body (1 MB)
pub const DEFAULT_MAX_REQUEST_BODY_BYTES: usize = 1024 * 1024;

/// Upstream chat-completions endpoint
pub const DEFAULT_UPSTREAM_URL: &str = "https://ai.gateway.lovable.dev/v1/chat/completions";

/// Model requested from the upstream gateway
pub const DEFAULT_UPSTREAM_MODEL: &str = "google/gemini-2.5-flash";

/// Deadline for a single upstream call
pub const DEFAULT_UPSTREAM_TIMEOUT_SECS: u64 = 60;

/// Environment variable holding the upstream credential
pub const API_KEY_ENV_VAR: &str = "AI_GATEWAY_API_KEY";

/// Sampling temperature used when the payload does not supply one
pub const DEFAULT_TEMPERATURE: f64 = 0.3;

/// Document content forwarded for rosetta-stone analysis is cut at this many characters
pub const DOCUMENT_CONTENT_LIMIT: usize = 10_000;

/// Returned when the upstream answers without any message content
pub const NO_CONTENT_FALLBACK: &str = "No content generated.";

/// Sentinel identity for requests without any forwarding header
pub const UNKNOWN_CLIENT: &str = "unknown";

/// CORS headers attached to every response
pub const CORS_ALLOW_ORIGIN: &str = "*";
pub const CORS_ALLOW_HEADERS: &str = "authorization, x-client-info, apikey, content-type";
