//! Link to the cart page.
//!
//! The cart page lives at one configured location. Every page links to it
//! directly; nothing probes alternative paths at runtime.

use core::fmt;

use thiserror::Error;
use url::Url;

/// Default cart page path.
pub const DEFAULT_CART_PATH: &str = "/cart";

/// Errors that can occur when validating the configured cart location.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum NavigationError {
    #[error("cart location cannot be empty")]
    Empty,
    #[error("cart location {0:?} must be an absolute path or an http(s) URL")]
    NotAbsolute(String),
}

/// Validated location of the cart page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartLink(String);

impl CartLink {
    /// Validate a configured cart location.
    ///
    /// Accepts an absolute path (`/cart`) or an absolute `http`/`https` URL.
    /// Protocol-relative paths (`//host/cart`) are rejected.
    ///
    /// # Errors
    ///
    /// Returns an error if the location is empty or not absolute.
    pub fn parse(location: &str) -> Result<Self, NavigationError> {
        let location = location.trim();
        if location.is_empty() {
            return Err(NavigationError::Empty);
        }

        if location.starts_with('/') && !location.starts_with("//") {
            return Ok(Self(location.to_owned()));
        }

        match Url::parse(location) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => Ok(Self(url.to_string())),
            _ => Err(NavigationError::NotAbsolute(location.to_owned())),
        }
    }

    /// The link target.
    #[must_use]
    pub fn href(&self) -> &str {
        &self.0
    }
}

impl Default for CartLink {
    fn default() -> Self {
        Self(DEFAULT_CART_PATH.to_owned())
    }
}

impl fmt::Display for CartLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Return a local redirect target, or `fallback` if `candidate` is missing or
/// could leave the site.
#[must_use]
pub fn local_path_or<'a>(candidate: Option<&'a str>, fallback: &'a str) -> &'a str {
    candidate
        .map(str::trim)
        .filter(|path| path.starts_with('/') && !path.starts_with("//") && !path.contains('\\'))
        .unwrap_or(fallback)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_absolute_path() {
        assert_eq!(CartLink::parse("/cart").map(|l| l.href().to_owned()), Ok("/cart".to_owned()));
        assert_eq!(
            CartLink::parse(" /shop/cart ").map(|l| l.href().to_owned()),
            Ok("/shop/cart".to_owned())
        );
    }

    #[test]
    fn test_parse_http_url() {
        let link = CartLink::parse("https://shop.example.com/cart");
        assert_eq!(
            link.map(|l| l.href().to_owned()),
            Ok("https://shop.example.com/cart".to_owned())
        );
    }

    #[test]
    fn test_parse_rejects_relative_and_foreign() {
        assert_eq!(CartLink::parse(""), Err(NavigationError::Empty));
        assert!(matches!(
            CartLink::parse("nav/carrito.html"),
            Err(NavigationError::NotAbsolute(_))
        ));
        assert!(matches!(
            CartLink::parse("../../nav/carrito.html"),
            Err(NavigationError::NotAbsolute(_))
        ));
        assert!(matches!(
            CartLink::parse("//evil.example.com/cart"),
            Err(NavigationError::NotAbsolute(_))
        ));
        assert!(matches!(
            CartLink::parse("javascript:alert(1)"),
            Err(NavigationError::NotAbsolute(_))
        ));
    }

    #[test]
    fn test_default_is_cart() {
        assert_eq!(CartLink::default().href(), DEFAULT_CART_PATH);
    }

    #[test]
    fn test_local_path_or() {
        assert_eq!(local_path_or(Some("/products"), "/"), "/products");
        assert_eq!(local_path_or(Some("https://evil.example.com"), "/"), "/");
        assert_eq!(local_path_or(Some("//evil.example.com"), "/"), "/");
        assert_eq!(local_path_or(Some("/\\evil.example.com"), "/"), "/");
        assert_eq!(local_path_or(None, "/cart"), "/cart");
    }
}
