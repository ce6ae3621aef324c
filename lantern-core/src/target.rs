//! Scan targets and URL canonicalization
//!
//! A `ScanTarget` is the base .onion address under scan. It is immutable
//! once a crawl starts and defines the same-origin predicate that keeps
//! the crawl on one hidden service.

use thiserror::Error;
use url::Url;

/// Hidden services live under this suffix
pub const ONION_SUFFIX: &str = ".onion";

/// Errors from target validation
#[derive(Debug, Error)]
pub enum TargetError {
    #[error("Invalid URL '{0}': {1}")]
    Invalid(String, url::ParseError),

    #[error("Unsupported scheme '{0}': only http and https route over Tor")]
    UnsupportedScheme(String),

    #[error("'{0}' does not appear to be an .onion address")]
    NotOnion(String),
}

/// The base address under scan
#[derive(Debug, Clone)]
pub struct ScanTarget {
    url: Url,
}

impl ScanTarget {
    /// Parse a user-supplied target. A missing scheme defaults to `http://`.
    pub fn parse(input: &str) -> Result<Self, TargetError> {
        let raw = if input.contains("://") {
            input.to_string()
        } else {
            format!("http://{}", input)
        };

        let url = Url::parse(&raw).map_err(|e| TargetError::Invalid(input.to_string(), e))?;

        match url.scheme() {
            "http" | "https" => {}
            other => return Err(TargetError::UnsupportedScheme(other.to_string())),
        }

        let host = url.host_str().unwrap_or_default();
        if !host.ends_with(ONION_SUFFIX) {
            return Err(TargetError::NotOnion(input.to_string()));
        }

        Ok(Self { url })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Canonical form of the base address; the crawl's seed and dedup anchor
    pub fn canonical(&self) -> String {
        canonicalize(&self.url)
    }

    /// True when `other` shares the target's origin
    pub fn same_origin(&self, other: &Url) -> bool {
        same_origin(&self.url, other)
    }
}

impl std::fmt::Display for ScanTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.canonical())
    }
}

/// Two URLs share an origin when scheme, host, and port all match
pub fn same_origin(a: &Url, b: &Url) -> bool {
    a.scheme() == b.scheme()
        && a.host_str() == b.host_str()
        && a.port_or_known_default() == b.port_or_known_default()
}

/// Reduce a URL to `scheme://host[:port]/path` with the query, fragment,
/// and trailing slash removed. The result is the sole deduplication key.
pub fn canonicalize(url: &Url) -> String {
    let mut out = format!("{}://{}", url.scheme(), url.host_str().unwrap_or_default());
    if let Some(port) = url.port() {
        out.push(':');
        out.push_str(&port.to_string());
    }
    out.push_str(url.path().trim_end_matches('/'));
    out
}
