use crate::{UrlError, UrlResult};
use std::fmt;
use url::Url;

/// Identity of a site for all per-domain state
///
/// The key is the ASCII serialization of the URL origin: lowercase scheme,
/// lowercase host, and the port only when it differs from the scheme default.
/// Every component keys its maps by this value, so `HTTPS://Example.COM/a` and
/// `https://example.com/b` share state while `http://example.com` does not.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DomainKey(String);

impl DomainKey {
    /// Returns the key as a string slice (e.g. `https://example.com`)
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the robots.txt URL for this domain
    pub fn robots_url(&self) -> String {
        format!("{}/robots.txt", self.0)
    }
}

impl fmt::Display for DomainKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for DomainKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Parses a URL string and checks that it is an absolute HTTP(S) URL with a host
///
/// # Examples
///
/// ```
/// use polite_scraper::url::parse_http_url;
///
/// assert!(parse_http_url("https://example.com/page").is_ok());
/// assert!(parse_http_url("ftp://example.com/file").is_err());
/// assert!(parse_http_url("not a url").is_err());
/// ```
pub fn parse_http_url(url_str: &str) -> UrlResult<Url> {
    let url = Url::parse(url_str.trim()).map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    if url.host_str().map_or(true, str::is_empty) {
        return Err(UrlError::MissingHost);
    }

    Ok(url)
}

/// Extracts the domain key from a URL
///
/// # Examples
///
/// ```
/// use url::Url;
/// use polite_scraper::url::domain_key;
///
/// let url = Url::parse("https://EXAMPLE.COM/path?q=1").unwrap();
/// assert_eq!(domain_key(&url).unwrap().as_str(), "https://example.com");
///
/// let url = Url::parse("http://127.0.0.1:8080/").unwrap();
/// assert_eq!(domain_key(&url).unwrap().as_str(), "http://127.0.0.1:8080");
/// ```
pub fn domain_key(url: &Url) -> UrlResult<DomainKey> {
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(url.scheme().to_string()));
    }

    // Opaque origins only occur for non-hierarchical URLs, which the scheme
    // check above already excludes; a missing host still needs rejecting.
    if url.host_str().is_none() {
        return Err(UrlError::MissingHost);
    }

    Ok(DomainKey(url.origin().ascii_serialization()))
}
