//! Per-request metadata extracted from the inbound HTTP request.

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};

use axum::http::{header, HeaderMap, Uri};

const X_FORWARDED_FOR: &str = "x-forwarded-for";
const X_FORWARDED_PROTO: &str = "x-forwarded-proto";
const X_FORWARDED_HOST: &str = "x-forwarded-host";

/// Request details used for campaign resolution and tracking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    pub remote_ip: Option<IpAddr>,
    /// Empty when the client sent none.
    pub user_agent: String,
    /// Whether the client connection was encrypted.
    pub encrypted: bool,
    pub host: String,
    pub path: String,
    /// Raw query string, without the leading `?`.
    pub query: Option<String>,
    /// Decoded query parameters; the last occurrence of a key wins.
    pub params: HashMap<String, String>,
    /// Empty when the client sent none.
    pub referrer: String,
}

impl RequestContext {
    /// Build the context from request parts.
    ///
    /// `X-Forwarded-*` headers are only honoured when `trust_proxy` is set.
    pub fn from_parts(
        uri: &Uri,
        headers: &HeaderMap,
        peer: Option<SocketAddr>,
        trust_proxy: bool,
    ) -> Self {
        let forwarded_ip = trust_proxy
            .then(|| header_str(headers, X_FORWARDED_FOR))
            .flatten()
            .and_then(|v| v.split(',').next())
            .and_then(|v| v.trim().parse::<IpAddr>().ok());

        let forwarded_https = trust_proxy
            && header_str(headers, X_FORWARDED_PROTO)
                .map(|v| v.trim().eq_ignore_ascii_case("https"))
                .unwrap_or(false);

        let forwarded_host = trust_proxy
            .then(|| header_str(headers, X_FORWARDED_HOST))
            .flatten();

        let host = forwarded_host
            .or_else(|| header_str(headers, header::HOST.as_str()))
            .map(str::to_string)
            .or_else(|| uri.authority().map(|a| a.to_string()))
            .unwrap_or_else(|| "localhost".to_string());

        let query = uri.query().map(str::to_string);
        let params = query
            .as_deref()
            .map(|q| url::form_urlencoded::parse(q.as_bytes()).into_owned().collect())
            .unwrap_or_default();

        Self {
            remote_ip: forwarded_ip.or_else(|| peer.map(|p| p.ip())),
            user_agent: header_str(headers, header::USER_AGENT.as_str())
                .unwrap_or_default()
                .to_string(),
            encrypted: uri.scheme_str() == Some("https") || forwarded_https,
            host,
            path: uri.path().to_string(),
            query,
            params,
            referrer: header_str(headers, header::REFERER.as_str())
                .unwrap_or_default()
                .to_string(),
        }
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for &(k, v) in pairs {
            map.insert(k, HeaderValue::from_static(v));
        }
        map
    }

    fn peer() -> Option<SocketAddr> {
        Some("192.0.2.10:51234".parse().unwrap())
    }

    #[test]
    fn test_from_parts_basic() {
        let uri: Uri = "/reprints/acme.png?pk_campaign=foo%20bar&pk_keyword=x".parse().unwrap();
        let h = headers(&[
            ("host", "pixels.example.com"),
            ("user-agent", "TestAgent/1.0"),
            ("referer", "https://blog.example/"),
        ]);

        let ctx = RequestContext::from_parts(&uri, &h, peer(), false);

        assert_eq!(ctx.remote_ip, Some("192.0.2.10".parse().unwrap()));
        assert_eq!(ctx.user_agent, "TestAgent/1.0");
        assert!(!ctx.encrypted);
        assert_eq!(ctx.host, "pixels.example.com");
        assert_eq!(ctx.path, "/reprints/acme.png");
        assert_eq!(ctx.query.as_deref(), Some("pk_campaign=foo%20bar&pk_keyword=x"));
        assert_eq!(ctx.params["pk_campaign"], "foo bar");
        assert_eq!(ctx.params["pk_keyword"], "x");
        assert_eq!(ctx.referrer, "https://blog.example/");
    }

    #[test]
    fn test_missing_headers() {
        let uri: Uri = "/".parse().unwrap();
        let ctx = RequestContext::from_parts(&uri, &HeaderMap::new(), None, false);

        assert_eq!(ctx.remote_ip, None);
        assert_eq!(ctx.user_agent, "");
        assert_eq!(ctx.referrer, "");
        assert_eq!(ctx.host, "localhost");
        assert_eq!(ctx.query, None);
        assert!(ctx.params.is_empty());
    }

    #[test]
    fn test_proxy_headers_ignored_by_default() {
        let uri: Uri = "/a.png".parse().unwrap();
        let h = headers(&[
            ("host", "internal:8080"),
            ("x-forwarded-for", "203.0.113.9"),
            ("x-forwarded-proto", "https"),
            ("x-forwarded-host", "pixels.example.com"),
        ]);

        let ctx = RequestContext::from_parts(&uri, &h, peer(), false);

        assert_eq!(ctx.remote_ip, Some("192.0.2.10".parse().unwrap()));
        assert!(!ctx.encrypted);
        assert_eq!(ctx.host, "internal:8080");
    }

    #[test]
    fn test_proxy_headers_trusted() {
        let uri: Uri = "/a.png".parse().unwrap();
        let h = headers(&[
            ("host", "internal:8080"),
            ("x-forwarded-for", "203.0.113.9, 10.0.0.1"),
            ("x-forwarded-proto", "HTTPS"),
            ("x-forwarded-host", "pixels.example.com"),
        ]);

        let ctx = RequestContext::from_parts(&uri, &h, peer(), true);

        assert_eq!(ctx.remote_ip, Some("203.0.113.9".parse().unwrap()));
        assert!(ctx.encrypted);
        assert_eq!(ctx.host, "pixels.example.com");
    }

    #[test]
    fn test_absolute_https_uri() {
        let uri: Uri = "https://pixels.example.com/a.png".parse().unwrap();
        let ctx = RequestContext::from_parts(&uri, &HeaderMap::new(), None, false);

        assert!(ctx.encrypted);
        assert_eq!(ctx.host, "pixels.example.com");
    }
}
