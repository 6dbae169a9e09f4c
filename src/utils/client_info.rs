//! Visitor metadata extraction from request headers.

use axum::http::{HeaderMap, header};
use std::net::{IpAddr, SocketAddr};

use crate::domain::click_event::VisitorInfo;

const X_FORWARDED_FOR: &str = "x-forwarded-for";
const X_REAL_IP: &str = "x-real-ip";

/// Longest header value kept in the click log.
const MAX_HEADER_LEN: usize = 1024;

fn header_str<'a>(headers: &'a HeaderMap, name: impl header::AsHeaderName) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

fn truncated(value: &str) -> String {
    value.chars().take(MAX_HEADER_LEN).collect()
}

/// Client IP as reported by a reverse proxy.
///
/// Takes the first `X-Forwarded-For` entry, then `X-Real-IP`. Values that are not IP
/// addresses are ignored.
fn forwarded_ip(headers: &HeaderMap) -> Option<IpAddr> {
    let from_xff = header_str(headers, X_FORWARDED_FOR)
        .and_then(|v| v.split(',').next())
        .and_then(|first| first.trim().parse().ok());

    from_xff.or_else(|| header_str(headers, X_REAL_IP).and_then(|v| v.parse().ok()))
}

/// Builds [`VisitorInfo`] for the click log.
///
/// Proxy headers are honoured only when `trust_proxy` is set; otherwise they are trivially
/// spoofable and the socket peer address is used.
pub fn visitor_from_parts(
    headers: &HeaderMap,
    peer: Option<SocketAddr>,
    trust_proxy: bool,
) -> VisitorInfo {
    let ip = trust_proxy
        .then(|| forwarded_ip(headers))
        .flatten()
        .or_else(|| peer.map(|addr| addr.ip()));

    VisitorInfo {
        ip_address: ip.map(|ip| ip.to_string()),
        user_agent: header_str(headers, header::USER_AGENT).map(truncated),
        referer: header_str(headers, header::REFERER).map(truncated),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn peer() -> Option<SocketAddr> {
        Some("10.0.0.1:54321".parse().unwrap())
    }

    #[test]
    fn test_uses_peer_address_by_default() {
        let mut headers = HeaderMap::new();
        headers.insert(X_FORWARDED_FOR, HeaderValue::from_static("203.0.113.7"));

        let visitor = visitor_from_parts(&headers, peer(), false);
        assert_eq!(visitor.ip_address.as_deref(), Some("10.0.0.1"));
    }

    #[test]
    fn test_first_forwarded_entry_when_trusted() {
        let mut headers = HeaderMap::new();
        headers.insert(
            X_FORWARDED_FOR,
            HeaderValue::from_static("203.0.113.7, 70.41.3.18, 150.172.238.178"),
        );
        headers.insert(X_REAL_IP, HeaderValue::from_static("198.51.100.1"));

        let visitor = visitor_from_parts(&headers, peer(), true);
        assert_eq!(visitor.ip_address.as_deref(), Some("203.0.113.7"));
    }

    #[test]
    fn test_real_ip_fallback_and_garbage_ignored() {
        let mut headers = HeaderMap::new();
        headers.insert(X_FORWARDED_FOR, HeaderValue::from_static("unknown"));
        headers.insert(X_REAL_IP, HeaderValue::from_static("2001:db8::1"));

        let visitor = visitor_from_parts(&headers, peer(), true);
        assert_eq!(visitor.ip_address.as_deref(), Some("2001:db8::1"));

        let mut headers = HeaderMap::new();
        headers.insert(X_REAL_IP, HeaderValue::from_static("not-an-ip"));
        let visitor = visitor_from_parts(&headers, peer(), true);
        assert_eq!(visitor.ip_address.as_deref(), Some("10.0.0.1"));
    }

    #[test]
    fn test_user_agent_and_referer() {
        let mut headers = HeaderMap::new();
        headers.insert(header::USER_AGENT, HeaderValue::from_static("Mozilla/5.0"));
        headers.insert(header::REFERER, HeaderValue::from_static("https://news.example"));

        let visitor = visitor_from_parts(&headers, None, false);
        assert_eq!(visitor.user_agent.as_deref(), Some("Mozilla/5.0"));
        assert_eq!(visitor.referer.as_deref(), Some("https://news.example"));
        assert!(visitor.ip_address.is_none());
    }

    #[test]
    fn test_blank_headers_are_absent() {
        let mut headers = HeaderMap::new();
        headers.insert(header::USER_AGENT, HeaderValue::from_static("   "));

        let visitor = visitor_from_parts(&headers, None, false);
        assert!(visitor.user_agent.is_none());
    }
}
