//! Origin parsing and request resolution.

use swcache_core::RequestDescriptor;

/// Error type for URL handling failures.
#[derive(Debug, Clone, thiserror::Error)]
pub enum UrlError {
    #[error("empty URL")]
    Empty,

    #[error("unsupported scheme: {0}")]
    UnsupportedScheme(String),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}

/// Parse the origin that requests are resolved against.
///
/// Normalization steps:
/// 1. Trim leading/trailing whitespace
/// 2. Default scheme to https:// if missing
/// 3. Lowercase the host
/// 4. Drop path, query and fragment
pub fn parse_origin(input: &str) -> Result<url::Url, UrlError> {
    let trimmed = input.trim();

    if trimmed.is_empty() {
        return Err(UrlError::Empty);
    }

    let url_str = if trimmed.contains("://") { trimmed.to_string() } else { format!("https://{trimmed}") };

    let mut parsed = url::Url::parse(&url_str).map_err(|e| UrlError::InvalidUrl(e.to_string()))?;

    match parsed.scheme() {
        "http" | "https" => {}
        scheme => return Err(UrlError::UnsupportedScheme(scheme.to_string())),
    }

    if let Some(host) = parsed.host_str() {
        let host = host.to_lowercase();
        parsed
            .set_host(Some(&host))
            .map_err(|e| UrlError::InvalidUrl(e.to_string()))?;
    }

    parsed.set_path("/");
    parsed.set_query(None);
    parsed.set_fragment(None);

    Ok(parsed)
}

/// Absolute URL for an intercepted request against `origin`.
pub fn resolve(origin: &url::Url, request: &RequestDescriptor) -> Result<url::Url, UrlError> {
    origin
        .join(&request.href())
        .map_err(|e| UrlError::InvalidUrl(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_origin_basic() {
        let url = parse_origin("https://example.com").unwrap();
        assert_eq!(url.as_str(), "https://example.com/");
    }

    #[test]
    fn test_parse_origin_default_scheme() {
        let url = parse_origin("example.com").unwrap();
        assert_eq!(url.scheme(), "https");
    }

    #[test]
    fn test_parse_origin_lowercase_host_and_strip_path() {
        let url = parse_origin("http://EXAMPLE.COM:8000/some/page?x=1#frag").unwrap();
        assert_eq!(url.as_str(), "http://example.com:8000/");
    }

    #[test]
    fn test_parse_origin_unsupported_scheme() {
        assert!(matches!(parse_origin("file:///etc/passwd"), Err(UrlError::UnsupportedScheme(_))));
    }

    #[test]
    fn test_parse_origin_empty() {
        assert!(matches!(parse_origin("   "), Err(UrlError::Empty)));
    }

    #[test]
    fn test_resolve_keeps_query() {
        let origin = parse_origin("https://example.com").unwrap();
        let request = RequestDescriptor::get("/api/items?page=2").unwrap();
        let url = resolve(&origin, &request).unwrap();
        assert_eq!(url.as_str(), "https://example.com/api/items?page=2");
    }
}
