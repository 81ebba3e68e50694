//! Outbound request construction and response relay.
//!
//! Incoming headers are filtered against an allow-list before the request
//! goes to the backend; the backend's status, content type and body come
//! back unchanged.

use axum::body::Body;
use axum::http::{HeaderMap, HeaderName, HeaderValue, Response, header};
use reqwest::Client;

use crate::error::{ProxyError, Result};

/// Headers forwarded when no allow-list is configured.
pub const DEFAULT_ALLOWED_HEADERS: [&str; 5] = [
    "authorization",
    "accept",
    "content-type",
    "accept-language",
    "x-request-id",
];

/// Tunnel bypass header added for ngrok-hosted backends.
pub const NGROK_SKIP_HEADER: &str = "ngrok-skip-browser-warning";

const DEFAULT_ACCEPT: &str = "application/json";

/// Parse a list of header names into an allow-list.
pub fn parse_allowed_headers<I, S>(names: I) -> Result<Vec<HeaderName>>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    names
        .into_iter()
        .map(|name| {
            let name = name.as_ref().trim();
            HeaderName::from_bytes(name.to_ascii_lowercase().as_bytes())
                .map_err(|_| ProxyError::InvalidHeader(name.to_string()))
        })
        .collect()
}

/// The default allow-list.
pub fn default_allowed_headers() -> Vec<HeaderName> {
    DEFAULT_ALLOWED_HEADERS
        .into_iter()
        .map(HeaderName::from_static)
        .collect()
}

/// Join the backend base URL with the incoming path and query.
///
/// `path` is used as received (still percent-encoded); a trailing `/` on the
/// base is dropped so exactly one separator remains.
pub fn build_target_url(base_url: &str, path: &str, query: Option<&str>) -> String {
    let base = base_url.trim_end_matches('/');
    let path = path.trim_start_matches('/');
    match query {
        Some(query) if !query.is_empty() => format!("{}/{}?{}", base, path, query),
        _ => format!("{}/{}", base, path),
    }
}

/// Whether `base_url` points at an ngrok tunnel. A URL that does not parse
/// is treated as not ngrok.
pub fn is_ngrok_host(base_url: &str) -> bool {
    url::Url::parse(base_url)
        .ok()
        .and_then(|u| u.host_str().map(|host| host.contains("ngrok")))
        .unwrap_or(false)
}

/// Build the header set for the outbound request.
pub fn build_outbound_headers(
    incoming: &HeaderMap,
    allowed: &[HeaderName],
    base_url: &str,
) -> HeaderMap {
    let mut outbound = HeaderMap::new();

    for name in allowed {
        for value in incoming.get_all(name) {
            outbound.append(name.clone(), value.clone());
        }
    }

    if is_ngrok_host(base_url) {
        outbound.insert(NGROK_SKIP_HEADER, HeaderValue::from_static("true"));
    }

    if !outbound.contains_key(header::ACCEPT) {
        outbound.insert(header::ACCEPT, HeaderValue::from_static(DEFAULT_ACCEPT));
    }

    outbound
}

/// Forwards GET requests to the backend.
#[derive(Debug, Clone)]
pub struct Forwarder {
    client: Client,
    allowed_headers: Vec<HeaderName>,
}

impl Forwarder {
    pub fn new(allowed_headers: Vec<HeaderName>) -> Self {
        Self {
            client: Client::new(),
            allowed_headers,
        }
    }

    pub fn allowed_headers(&self) -> &[HeaderName] {
        &self.allowed_headers
    }

    /// Fetch `path?query` from `base_url` and relay the result.
    pub async fn forward(
        &self,
        base_url: &str,
        path: &str,
        query: Option<&str>,
        incoming: &HeaderMap,
    ) -> Result<Response<Body>> {
        let target = build_target_url(base_url, path, query);
        let headers = build_outbound_headers(incoming, &self.allowed_headers, base_url);

        tracing::debug!(%target, "Forwarding request to backend");

        let upstream = self.client.get(&target).headers(headers).send().await?;

        let status = upstream.status();
        let content_type = upstream
            .headers()
            .get(header::CONTENT_TYPE)
            .cloned()
            .unwrap_or_else(|| HeaderValue::from_static(DEFAULT_ACCEPT));
        let body = upstream.bytes().await?;

        tracing::debug!(%target, status = status.as_u16(), bytes = body.len(), "Backend responded");

        Response::builder()
            .status(status)
            .header(header::CONTENT_TYPE, content_type)
            .body(Body::from(body))
            .map_err(|e| ProxyError::Response(e.to_string()))
    }
}

impl Default for Forwarder {
    fn default() -> Self {
        Self::new(default_allowed_headers())
    }
}
