//! Hop-by-hop stripping, upgrade detection and `X-Forwarded-*` handling.
//!
//! Client headers are forwarded as a full clone; only the headers that
//! describe a single connection are removed, on both the outbound
//! request and the final response. The one exception is a protocol
//! upgrade, whose `Connection`/`Upgrade` pair is put back after stripping.
//! Forwarding headers supplied by the client are never trusted as-is.

use std::net::IpAddr;
use std::sync::LazyLock;

use http::header::{CONNECTION, FORWARDED, HOST, UPGRADE};
use http::{HeaderMap, HeaderName, HeaderValue};

static HOP_BY_HOP: LazyLock<Vec<HeaderName>> = LazyLock::new(|| {
    [
        "connection",
        "keep-alive",
        "proxy-connection",
        "transfer-encoding",
        "te",
        "trailer",
        "upgrade",
        "proxy-authorization",
        "proxy-authenticate",
    ]
    .iter()
    .filter_map(|name| name.parse::<HeaderName>().ok())
    .collect()
});

static X_FORWARDED_FOR: HeaderName = HeaderName::from_static("x-forwarded-for");
static X_FORWARDED_HOST: HeaderName = HeaderName::from_static("x-forwarded-host");
static X_FORWARDED_PROTO: HeaderName = HeaderName::from_static("x-forwarded-proto");

/// Remove hop-by-hop headers, including any extra names listed in `Connection`.
pub fn strip_hop_by_hop(headers: &mut HeaderMap) {
    let listed: Vec<HeaderName> = headers
        .get_all(CONNECTION)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .filter_map(|name| name.trim().parse::<HeaderName>().ok())
        .collect();

    for name in listed {
        headers.remove(name);
    }
    for name in HOP_BY_HOP.iter() {
        headers.remove(name);
    }
}

/// Protocol named in `Upgrade`, if `Connection` carries the `upgrade` token.
#[must_use]
pub fn upgrade_protocol(headers: &HeaderMap) -> Option<HeaderValue> {
    let wants_upgrade = headers
        .get_all(CONNECTION)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .any(|token| token.trim().eq_ignore_ascii_case("upgrade"));
    if wants_upgrade {
        headers.get(UPGRADE).cloned()
    } else {
        None
    }
}

/// Re-add the upgrade pair after [`strip_hop_by_hop`].
pub fn restore_upgrade(headers: &mut HeaderMap, protocol: HeaderValue) {
    headers.insert(CONNECTION, HeaderValue::from_static("upgrade"));
    headers.insert(UPGRADE, protocol);
}

/// Drop `Forwarded` and `X-Forwarded-*` headers sent by the client.
pub fn strip_forwarded(headers: &mut HeaderMap) {
    headers.remove(FORWARDED);
    headers.remove(&X_FORWARDED_FOR);
    headers.remove(&X_FORWARDED_HOST);
    headers.remove(&X_FORWARDED_PROTO);
}

/// Record the client hop. Must run before the Host header is overridden.
///
/// An inbound `X-Forwarded-For` chain is extended; every other forwarding
/// header the client sent is replaced.
pub fn add_forwarded(headers: &mut HeaderMap, client_ip: IpAddr) {
    // X-Forwarded-For: append to chain
    let xff = headers
        .get(&X_FORWARDED_FOR)
        .and_then(|v| v.to_str().ok())
        .map_or_else(
            || client_ip.to_string(),
            |existing| format!("{existing}, {client_ip}"),
        );
    strip_forwarded(headers);
    if let Ok(val) = HeaderValue::from_str(&xff) {
        headers.insert(X_FORWARDED_FOR.clone(), val);
    }

    if let Some(original_host) = headers.get(HOST).cloned() {
        headers.insert(X_FORWARDED_HOST.clone(), original_host);
    }

    // Listener is plain HTTP; TLS termination happens in front of us if at all.
    headers.insert(X_FORWARDED_PROTO.clone(), HeaderValue::from_static("http"));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_standard_hop_by_hop() {
        let mut headers = HeaderMap::new();
        headers.insert("connection", "keep-alive".parse().unwrap());
        headers.insert("keep-alive", "timeout=5".parse().unwrap());
        headers.insert("transfer-encoding", "chunked".parse().unwrap());
        headers.insert("content-type", "application/json".parse().unwrap());
        headers.insert("authorization", "Bearer t".parse().unwrap());

        strip_hop_by_hop(&mut headers);

        assert!(headers.get("connection").is_none());
        assert!(headers.get("keep-alive").is_none());
        assert!(headers.get("transfer-encoding").is_none());
        assert_eq!(headers.get("content-type").unwrap(), "application/json");
        assert_eq!(headers.get("authorization").unwrap(), "Bearer t");
    }

    #[test]
    fn strips_headers_named_in_connection() {
        let mut headers = HeaderMap::new();
        headers.insert("connection", "close, x-session-hint".parse().unwrap());
        headers.insert("x-session-hint", "abc".parse().unwrap());
        headers.insert("x-kept", "1".parse().unwrap());

        strip_hop_by_hop(&mut headers);

        assert!(headers.get("x-session-hint").is_none());
        assert_eq!(headers.get("x-kept").unwrap(), "1");
    }

    #[test]
    fn starts_x_forwarded_for_chain() {
        let mut headers = HeaderMap::new();
        headers.insert(HOST, "edge.example.com".parse().unwrap());

        add_forwarded(&mut headers, "10.0.0.1".parse().unwrap());

        assert_eq!(headers.get("x-forwarded-for").unwrap(), "10.0.0.1");
        assert_eq!(headers.get("x-forwarded-host").unwrap(), "edge.example.com");
        assert_eq!(headers.get("x-forwarded-proto").unwrap(), "http");
        assert_eq!(headers.get(HOST).unwrap(), "edge.example.com");
    }

    #[test]
    fn appends_x_forwarded_for() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", "1.2.3.4".parse().unwrap());

        add_forwarded(&mut headers, "10.0.0.1".parse().unwrap());

        assert_eq!(headers.get("x-forwarded-for").unwrap(), "1.2.3.4, 10.0.0.1");
        assert!(headers.get("x-forwarded-host").is_none());
    }

    #[test]
    fn add_forwarded_replaces_client_supplied_host_and_proto() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-host", "spoofed.example".parse().unwrap());
        headers.insert("x-forwarded-proto", "https".parse().unwrap());
        headers.insert("forwarded", "for=6.6.6.6".parse().unwrap());

        add_forwarded(&mut headers, "10.0.0.1".parse().unwrap());

        assert!(headers.get("x-forwarded-host").is_none());
        assert!(headers.get("forwarded").is_none());
        assert_eq!(headers.get("x-forwarded-proto").unwrap(), "http");
    }

    #[test]
    fn strip_forwarded_removes_all_forwarding_headers() {
        let mut headers = HeaderMap::new();
        headers.insert("forwarded", "for=6.6.6.6".parse().unwrap());
        headers.insert("x-forwarded-for", "6.6.6.6".parse().unwrap());
        headers.insert("x-forwarded-host", "spoofed.example".parse().unwrap());
        headers.insert("x-forwarded-proto", "https".parse().unwrap());
        headers.insert("x-kept", "1".parse().unwrap());

        strip_forwarded(&mut headers);

        assert_eq!(headers.len(), 1);
        assert_eq!(headers.get("x-kept").unwrap(), "1");
    }

    #[test]
    fn upgrade_protocol_needs_connection_token() {
        let mut headers = HeaderMap::new();
        headers.insert("upgrade", "websocket".parse().unwrap());
        assert!(upgrade_protocol(&headers).is_none());

        headers.insert("connection", "keep-alive, Upgrade".parse().unwrap());
        assert_eq!(upgrade_protocol(&headers).unwrap(), "websocket");
    }

    #[test]
    fn upgrade_pair_survives_strip_and_restore() {
        let mut headers = HeaderMap::new();
        headers.insert("connection", "Upgrade".parse().unwrap());
        headers.insert("upgrade", "websocket".parse().unwrap());
        headers.insert("sec-websocket-key", "dGhlIHNhbXBsZQ==".parse().unwrap());

        let protocol = upgrade_protocol(&headers).unwrap();
        strip_hop_by_hop(&mut headers);
        assert!(headers.get("upgrade").is_none());
        restore_upgrade(&mut headers, protocol);

        assert_eq!(headers.get("connection").unwrap(), "upgrade");
        assert_eq!(headers.get("upgrade").unwrap(), "websocket");
        assert_eq!(headers.get("sec-websocket-key").unwrap(), "dGhlIHNhbXBsZQ==");
    }
}
