/// Checks whether a URL is excluded by a blacklist
///
/// A URL is blacklisted when it contains any blacklist entry as a substring.
/// Matching is plain, case-sensitive containment: no patterns, no hostname
/// parsing.
///
/// # Arguments
///
/// * `url` - The URL string to check
/// * `blacklist` - The blacklist entries
///
/// # Returns
///
/// * `true` - If any entry occurs in `url`
/// * `false` - Otherwise, and always for an empty blacklist
///
/// # Examples
///
/// ```
/// use mock_traffic::url::is_blacklisted;
///
/// let blacklist = vec!["facebook.com".to_string(), "logout".to_string()];
///
/// assert!(is_blacklisted("https://www.facebook.com/share", &blacklist));
/// assert!(is_blacklisted("https://example.com/logout?next=/", &blacklist));
/// assert!(!is_blacklisted("https://example.com/", &blacklist));
/// assert!(!is_blacklisted("https://example.com/", &[]));
/// ```
pub fn is_blacklisted(url: &str, blacklist: &[String]) -> bool {
    blacklist.iter().any(|entry| url.contains(entry.as_str()))
}

/// An owned blacklist, shared by the frontier's admission check
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Blacklist {
    entries: Vec<String>,
}

impl Blacklist {
    pub fn new(entries: Vec<String>) -> Self {
        Self { entries }
    }

    /// Returns true if `url` contains any entry of this blacklist
    pub fn contains_match(&self, url: &str) -> bool {
        is_blacklisted(url, &self.entries)
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl From<Vec<String>> for Blacklist {
    fn from(entries: Vec<String>) -> Self {
        Self::new(entries)
    }
}
