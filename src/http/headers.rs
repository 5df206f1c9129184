//! Header filtering at the connection boundary.
//!
//! # Responsibilities
//! - Drop hop-by-hop headers in both directions (RFC 9110 §7.6.1)
//! - Drop `Host` from the outbound request so the client derives it from the target URL
//! - Keep every other header, including repeated values, in order

use axum::http::{header, HeaderMap, HeaderName};

/// Headers that describe a single connection rather than the message.
pub const HOP_BY_HOP: [HeaderName; 7] = [
    header::CONNECTION,
    HeaderName::from_static("keep-alive"),
    HeaderName::from_static("proxy-connection"),
    header::TE,
    header::TRAILER,
    header::TRANSFER_ENCODING,
    header::UPGRADE,
];

/// Headers to send upstream for an inbound request.
pub fn outbound(inbound: &HeaderMap) -> HeaderMap {
    let mut headers = relayed(inbound);
    headers.remove(header::HOST);
    headers
}

/// Headers to relay for a message crossing the forwarder.
pub fn relayed(source: &HeaderMap) -> HeaderMap {
    let listed = connection_listed(source);
    let mut headers = HeaderMap::with_capacity(source.len());

    for (name, value) in source {
        if HOP_BY_HOP.contains(name) || listed.contains(name) {
            continue;
        }
        headers.append(name.clone(), value.clone());
    }

    headers
}

/// Header names nominated as hop-by-hop through the `Connection` header.
fn connection_listed(headers: &HeaderMap) -> Vec<HeaderName> {
    headers
        .get_all(header::CONNECTION)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(','))
        .filter_map(|token| HeaderName::try_from(token.trim()).ok())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn map(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut headers = HeaderMap::new();
        for (name, value) in pairs {
            headers.append(*name, HeaderValue::from_static(value));
        }
        headers
    }

    #[test]
    fn outbound_drops_host_and_hop_by_hop() {
        let inbound = map(&[
            ("host", "forwarder.example.com"),
            ("connection", "keep-alive"),
            ("keep-alive", "timeout=5"),
            ("transfer-encoding", "chunked"),
            ("content-type", "application/json"),
            ("x-telegram-bot-api-secret-token", "s3cr3t"),
        ]);

        let headers = outbound(&inbound);

        assert!(headers.get("host").is_none());
        assert!(headers.get("connection").is_none());
        assert!(headers.get("keep-alive").is_none());
        assert!(headers.get("transfer-encoding").is_none());
        assert_eq!(headers["content-type"], "application/json");
        assert_eq!(headers["x-telegram-bot-api-secret-token"], "s3cr3t");
    }

    #[test]
    fn relayed_keeps_end_to_end_headers() {
        let source = map(&[("content-length", "11"), ("retry-after", "5")]);

        let headers = relayed(&source);

        assert_eq!(headers, source);
    }

    #[test]
    fn connection_listed_headers_are_dropped() {
        let source = map(&[
            ("connection", "close, X-Hop"),
            ("x-hop", "1"),
            ("x-end-to-end", "2"),
        ]);

        let headers = relayed(&source);

        assert!(headers.get("x-hop").is_none());
        assert_eq!(headers["x-end-to-end"], "2");
    }

    #[test]
    fn repeated_values_survive_in_order() {
        let source = map(&[("set-cookie", "a=1"), ("set-cookie", "b=2")]);

        let headers = relayed(&source);

        let values: Vec<_> = headers.get_all("set-cookie").iter().collect();
        assert_eq!(values, ["a=1", "b=2"]);
    }
}
