//! Utility functions and helpers.

pub mod http;

use url::Url;

use crate::error::Result;

/// Resolve a potentially relative URL against a base URL.
pub fn resolve_url(base: &Url, href: &str) -> String {
    base.join(href)
        .map(|u| u.to_string())
        .unwrap_or_else(|_| href.to_string())
}

/// Resolve a URL string against a base URL string.
pub fn resolve(base_url: &str, href: &str) -> Result<String> {
    let base = Url::parse(base_url)?;
    Ok(resolve_url(&base, href))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_url() {
        let base = Url::parse("https://example.com/ja/").unwrap();
        assert_eq!(
            resolve_url(&base, "page/251.html"),
            "https://example.com/ja/page/251.html"
        );
        assert_eq!(
            resolve_url(&base, "/en/page/1.html"),
            "https://example.com/en/page/1.html"
        );
        assert_eq!(
            resolve_url(&base, "https://other.com/x"),
            "https://other.com/x"
        );
    }

    #[test]
    fn test_resolve_rejects_bad_base() {
        assert!(resolve("not a url", "page.html").is_err());
    }
}
