//! Best-effort client identity derived from forwarding headers.
//!
//! Nothing here is authenticated. Any caller can forge these headers, so the
//! identity is only good enough to key a rate limiter.

use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, request::Parts},
};
use std::convert::Infallible;
use std::fmt;

use crate::constants::UNKNOWN_CLIENT;

/// Characters of an identity that may appear in logs
const LOG_PREFIX_LEN: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClientIdentity(String);

impl ClientIdentity {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn unknown() -> Self {
        Self(UNKNOWN_CLIENT.to_string())
    }

    /// Resolve from `x-forwarded-for` (first hop), then `cf-connecting-ip`,
    /// then `x-real-ip`.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let forwarded = header_str(headers, "x-forwarded-for")
            .and_then(|chain| chain.split(',').next())
            .map(str::trim)
            .filter(|hop| !hop.is_empty());

        forwarded
            .or_else(|| non_empty(header_str(headers, "cf-connecting-ip")))
            .or_else(|| non_empty(header_str(headers, "x-real-ip")))
            .map(Self::new)
            .unwrap_or_else(Self::unknown)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_unknown(&self) -> bool {
        self.0 == UNKNOWN_CLIENT
    }

    /// Truncated form for log lines.
    pub fn redacted(&self) -> String {
        let prefix: String = self.0.chars().take(LOG_PREFIX_LEN).collect();
        format!("{}...", prefix)
    }
}

impl fmt::Display for ClientIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

impl<S: Send + Sync> FromRequestParts<S> for ClientIdentity {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(ClientIdentity::from_headers(&parts.headers))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for &(name, value) in pairs {
            map.insert(name, HeaderValue::from_static(value));
        }
        map
    }

    #[test]
    fn test_first_forwarded_hop_wins() {
        let identity = ClientIdentity::from_headers(&headers(&[
            ("x-forwarded-for", " 1.2.3.4 , 10.0.0.1, 10.0.0.2"),
            ("x-real-ip", "9.9.9.9"),
        ]));
        assert_eq!(identity.as_str(), "1.2.3.4");
    }

    #[test]
    fn test_fallback_order() {
        let identity = ClientIdentity::from_headers(&headers(&[
            ("cf-connecting-ip", "5.5.5.5"),
            ("x-real-ip", "9.9.9.9"),
        ]));
        assert_eq!(identity.as_str(), "5.5.5.5");

        let identity = ClientIdentity::from_headers(&headers(&[("x-real-ip", "9.9.9.9")]));
        assert_eq!(identity.as_str(), "9.9.9.9");

        let identity = ClientIdentity::from_headers(&headers(&[("x-forwarded-for", " , 1.1.1.1")]));
        assert!(identity.is_unknown());
    }

    #[test]
    fn test_unknown_without_headers() {
        let identity = ClientIdentity::from_headers(&HeaderMap::new());
        assert!(identity.is_unknown());
        assert_eq!(identity.to_string(), "unknown");
    }

    #[test]
    fn test_redacted_truncates() {
        assert_eq!(
            ClientIdentity::new("2001:db8:85a3::8a2e:370:7334").redacted(),
            "2001:db8:8..."
        );
        assert_eq!(ClientIdentity::new("1.2.3.4").redacted(), "1.2.3.4...");
    }
}
