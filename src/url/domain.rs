use url::{Position, Url};

/// Returns the key under which a URL's robots.txt policy is memoized
///
/// The key is the URL's origin (`scheme://host[:port]`), lowercased by the
/// URL parser, since robots.txt is scoped to exactly that authority.
/// Returns `None` for URLs without a host.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use fourbot::url::host_key;
///
/// let url = Url::parse("https://EXAMPLE.com:8443/path").unwrap();
/// assert_eq!(host_key(&url), Some("https://example.com:8443".to_string()));
/// ```
pub fn host_key(url: &Url) -> Option<String> {
    url.host_str()?;
    Some(url.origin().ascii_serialization())
}

/// Builds `{scheme}://{host}/robots.txt` for the given URL
///
/// The port is kept; credentials, query and fragment are dropped.
pub fn robots_url(url: &Url) -> Option<Url> {
    url.host_str()?;
    let mut robots = url.clone();
    robots.set_path("/robots.txt");
    robots.set_query(None);
    robots.set_fragment(None);
    // Only fails for cannot-be-a-base URLs, which have no host
    let _ = robots.set_username("");
    let _ = robots.set_password(None);
    Some(robots)
}

/// Path and query of a URL, the part robots.txt rules are matched against
pub fn request_path(url: &Url) -> &str {
    &url[Position::BeforePath..Position::AfterQuery]
}
