//! Request key generation.

use sha2::{Digest, Sha256};

/// Compute the storage key for an intercepted request.
///
/// `href` is the path plus `?query` when a query is present.
pub fn compute_request_key(method: &str, href: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(method.as_bytes());
    hasher.update(b"\n");
    hasher.update(href.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_stability() {
        let key1 = compute_request_key("GET", "/static/styles.css");
        let key2 = compute_request_key("GET", "/static/styles.css");
        assert_eq!(key1, key2);
    }

    #[test]
    fn test_key_different_query() {
        let plain = compute_request_key("GET", "/api/items");
        let paged = compute_request_key("GET", "/api/items?page=2");
        assert_ne!(plain, paged);
    }

    #[test]
    fn test_key_method_separated_from_href() {
        let a = compute_request_key("GET", "X/y");
        let b = compute_request_key("GETX", "/y");
        assert_ne!(a, b);
    }

    #[test]
    fn test_key_format() {
        let key = compute_request_key("GET", "/");
        assert_eq!(key.len(), 64);
        assert!(key.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
