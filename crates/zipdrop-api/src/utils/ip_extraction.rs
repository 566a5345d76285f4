//! Client IP resolution for rate limiting
//!
//! Only the right-most `trusted_hops` entries of `X-Forwarded-For` were appended by
//! proxies we control; anything to their left is client-supplied.

use crate::state::AppState;
use axum::extract::{ConnectInfo, FromRequestParts};
use axum::http::request::Parts;
use axum::http::HeaderMap;
use std::convert::Infallible;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

const UNKNOWN_CLIENT: &str = "unknown";

/// Resolve the client address from forwarding headers, falling back to the peer.
pub fn client_ip(
    headers: &HeaderMap,
    peer: Option<SocketAddr>,
    trusted_hops: usize,
) -> Option<IpAddr> {
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|chain| from_forwarded_chain(chain, trusted_hops));
    if forwarded.is_some() {
        return forwarded;
    }

    let real_ip = headers
        .get("x-real-ip")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse().ok());
    if real_ip.is_some() {
        return real_ip;
    }

    peer.map(|addr| addr.ip())
}

/// Pick the entry just left of the trusted proxies. With no trusted proxies, or a
/// chain too short to contain them, the closest hop is used.
fn from_forwarded_chain(chain: &str, trusted_hops: usize) -> Option<IpAddr> {
    let hops: Vec<&str> = chain
        .split(',')
        .map(str::trim)
        .filter(|hop| !hop.is_empty())
        .collect();

    let index = if trusted_hops == 0 || hops.len() <= trusted_hops {
        hops.len().checked_sub(1)?
    } else {
        hops.len() - trusted_hops - 1
    };
    hops.get(index)?.parse().ok()
}

/// Client address as the identity for per-client rate limits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientIp(pub String);

impl FromRequestParts<Arc<AppState>> for ClientIp {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let peer = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| *addr);
        Ok(ClientIp(
            client_ip(&parts.headers, peer, state.trusted_proxy_count)
                .map(|ip| ip.to_string())
                .unwrap_or_else(|| UNKNOWN_CLIENT.to_string()),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(name: &'static str, value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(name, HeaderValue::from_str(value).unwrap());
        headers
    }

    fn ip(s: &str) -> Option<IpAddr> {
        Some(s.parse().unwrap())
    }

    #[test]
    fn test_chain_skips_trusted_proxies() {
        assert_eq!(from_forwarded_chain("203.0.113.7, 10.0.0.1", 1), ip("203.0.113.7"));
        assert_eq!(
            from_forwarded_chain("198.51.100.1, 203.0.113.7, 10.0.0.1, 10.0.0.2", 2),
            ip("203.0.113.7")
        );
    }

    #[test]
    fn test_short_or_untrusted_chain_uses_closest_hop() {
        assert_eq!(from_forwarded_chain("203.0.113.7", 1), ip("203.0.113.7"));
        assert_eq!(from_forwarded_chain("1.1.1.1, 10.0.0.9", 0), ip("10.0.0.9"));
    }

    #[test]
    fn test_garbage_chain_is_ignored() {
        assert_eq!(from_forwarded_chain("", 1), None);
        assert_eq!(from_forwarded_chain("not-an-ip", 0), None);
    }

    #[test]
    fn test_fallback_order() {
        let peer = SocketAddr::from(([127, 0, 0, 1], 4000));

        let real = headers("x-real-ip", "::1");
        assert_eq!(client_ip(&real, Some(peer), 1), ip("::1"));

        let bogus = headers("x-forwarded-for", "bogus");
        assert_eq!(client_ip(&bogus, Some(peer), 1), ip("127.0.0.1"));

        assert_eq!(client_ip(&HeaderMap::new(), None, 1), None);
    }
}
