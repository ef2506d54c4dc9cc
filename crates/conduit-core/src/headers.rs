//! Header handling for requests forwarded to upstream providers

use http::header::{self, HeaderMap, HeaderName, HeaderValue};

/// Inbound headers that are never copied onto an outbound call
///
/// Client credentials are replaced by the gateway's own, framing headers
/// are recomputed by the outbound transport, and hop-by-hop headers only
/// describe the client connection.
const STRIPPED: [&str; 16] = [
    "authorization",
    "host",
    "content-length",
    "content-type",
    "accept-encoding",
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "proxy-connection",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
    "x-api-key",
    "x-goog-api-key",
];

/// Build the forwarded header set for an outbound call
///
/// Copies every inbound header except credentials, `Host`, framing and
/// hop-by-hop headers (including any named in the client's `Connection`
/// header), then forces `Content-Type: application/json`.
pub fn sanitize_forwarded_headers(inbound: &HeaderMap) -> HeaderMap {
    let connection_tokens: Vec<String> = inbound
        .get_all(header::CONNECTION)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(','))
        .map(|token| token.trim().to_ascii_lowercase())
        .filter(|token| !token.is_empty())
        .collect();

    let mut forwarded = HeaderMap::with_capacity(inbound.len());

    for (name, value) in inbound {
        if is_stripped(name) || connection_tokens.iter().any(|token| token == name.as_str()) {
            continue;
        }
        forwarded.append(name.clone(), value.clone());
    }

    forwarded.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
    forwarded
}

fn is_stripped(name: &HeaderName) -> bool {
    STRIPPED.contains(&name.as_str())
}
