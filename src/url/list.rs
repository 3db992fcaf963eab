use crate::InputError;
use url::Url;

/// Parses a single target, accepting only absolute `http`/`https` URLs with a host
pub fn parse_target(raw: &str) -> Option<Url> {
    let url = Url::parse(raw).ok()?;
    let supported = matches!(url.scheme(), "http" | "https");
    (supported && url.host_str().is_some()).then_some(url)
}

/// Splits and validates a comma-separated URL list
///
/// Segments are trimmed and empty segments are ignored. Either every
/// remaining segment is a valid target and all of them are returned in input
/// order, or the first invalid one is reported; a partial list is never
/// returned.
///
/// # Examples
///
/// ```
/// use fourbot::url::validate_urls;
///
/// let urls = validate_urls("http://example.com, http://example.org").unwrap();
/// assert_eq!(urls, vec!["http://example.com", "http://example.org"]);
///
/// assert!(validate_urls("http://example.com, not-a-url").is_err());
/// ```
pub fn validate_urls(input: &str) -> Result<Vec<String>, InputError> {
    let mut urls = Vec::new();

    for (index, segment) in input
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .enumerate()
    {
        if parse_target(segment).is_none() {
            return Err(InputError::InvalidUrl {
                position: index + 1,
                url: segment.to_string(),
            });
        }
        urls.push(segment.to_string());
    }

    if urls.is_empty() {
        return Err(InputError::Empty);
    }

    Ok(urls)
}
