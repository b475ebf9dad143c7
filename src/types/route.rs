//! Route keys for the payment policy

use crate::X402Error;
use http::Method;
use std::fmt;
use std::str::FromStr;

/// Lookup key into the route payment policy.
///
/// The path is compared byte for byte: no prefix or pattern matching, no
/// trailing-slash normalization. `/a` and `/a/` are distinct keys, and so
/// are `GET /a` and `POST /a`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RouteKey {
    method: Method,
    path: String,
}

impl RouteKey {
    /// Create a new route key
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
        }
    }

    /// Shorthand for a `GET` route
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

impl fmt::Display for RouteKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.path)
    }
}

/// Parses the `"<METHOD> <path>"` notation used in policy files.
impl FromStr for RouteKey {
    type Err = X402Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (method, path) = s
            .trim()
            .split_once(' ')
            .ok_or_else(|| X402Error::config(format!("Route key '{}' must be '<METHOD> <path>'", s)))?;

        let method = Method::from_bytes(method.as_bytes())
            .map_err(|_| X402Error::config(format!("Invalid HTTP method in route key '{}'", s)))?;

        let path = path.trim();
        if !path.starts_with('/') {
            return Err(X402Error::config(format!(
                "Route path in '{}' must start with '/'",
                s
            )));
        }
        if path.contains(char::is_whitespace) {
            return Err(X402Error::config(format!(
                "Route path in '{}' must not contain whitespace",
                s
            )));
        }

        Ok(Self::new(method, path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_key_parse() {
        let key: RouteKey = "GET /api/premium-content".parse().unwrap();
        assert_eq!(key.method(), &Method::GET);
        assert_eq!(key.path(), "/api/premium-content");
        assert_eq!(key.to_string(), "GET /api/premium-content");
    }

    #[test]
    fn test_route_key_method_is_part_of_identity() {
        assert_ne!(
            RouteKey::new(Method::GET, "/api/premium-content"),
            RouteKey::new(Method::POST, "/api/premium-content")
        );
    }

    #[test]
    fn test_route_key_trailing_slash_is_distinct() {
        assert_ne!(RouteKey::get("/docs"), RouteKey::get("/docs/"));
    }

    #[test]
    fn test_route_key_parse_errors() {
        assert!("GET".parse::<RouteKey>().is_err());
        assert!("GET api/premium".parse::<RouteKey>().is_err());
        assert!("G(T /x".parse::<RouteKey>().is_err());
        assert!("GET /a b".parse::<RouteKey>().is_err());
    }
}
