//! Client identification for throttling and response envelopes.

use axum::extract::ConnectInfo;
use axum::http::{Extensions, HeaderMap};
use std::net::SocketAddr;

pub const FORWARDED_FOR: &str = "x-forwarded-for";

const UNKNOWN_CLIENT: &str = "unknown";

/// Resolve the client key of an incoming request.
///
/// The first `X-Forwarded-For` hop wins when the header is present and
/// non-empty; otherwise the peer address of the connection is used.
pub fn client_key(headers: &HeaderMap, extensions: &Extensions) -> String {
    let peer = extensions
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);

    resolve(headers, peer)
}

pub fn resolve(headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
    if let Some(forwarded) = forwarded_client(headers) {
        return forwarded;
    }

    match peer {
        Some(addr) => addr.ip().to_string(),
        None => UNKNOWN_CLIENT.to_string(),
    }
}

fn forwarded_client(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(FORWARDED_FOR)?.to_str().ok()?;
    let first = value.split(',').next()?.trim();

    if first.is_empty() {
        None
    } else {
        Some(first.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{HeaderValue, Request};

    fn peer() -> SocketAddr {
        SocketAddr::from(([203, 0, 113, 9], 51234))
    }

    #[test]
    fn test_first_forwarded_hop_is_used() {
        let mut headers = HeaderMap::new();
        headers.insert(FORWARDED_FOR, HeaderValue::from_static("192.168.1.1, 10.0.0.1"));

        assert_eq!(resolve(&headers, Some(peer())), "192.168.1.1");
    }

    #[test]
    fn test_empty_header_falls_back_to_peer() {
        let mut headers = HeaderMap::new();
        headers.insert(FORWARDED_FOR, HeaderValue::from_static("  "));

        assert_eq!(resolve(&headers, Some(peer())), "203.0.113.9");
    }

    #[test]
    fn test_leading_comma_falls_back_to_peer() {
        let mut headers = HeaderMap::new();
        headers.insert(FORWARDED_FOR, HeaderValue::from_static(", 10.0.0.1"));

        assert_eq!(resolve(&headers, Some(peer())), "203.0.113.9");
    }

    #[test]
    fn test_missing_everything_is_unknown() {
        assert_eq!(resolve(&HeaderMap::new(), None), "unknown");
    }

    #[test]
    fn test_client_key_reads_connect_info() {
        let mut request = Request::new(Body::empty());
        request.extensions_mut().insert(ConnectInfo(peer()));

        assert_eq!(client_key(request.headers(), request.extensions()), "203.0.113.9");
    }
}
