//! Credential denylist applied to discovered endpoint URLs.
//!
//! Public directories list key-gated URLs alongside open ones. Those are
//! dropped before they can enter a pool.

use regex::Regex;

use crate::endpoint::Endpoint;

/// Default denylist: any URL mentioning an API key.
pub const DEFAULT_DENY_PATTERN: &str = r"(?i).*api[_]?key.*";

/// Matches URLs that must never be used as pool endpoints.
#[derive(Debug, Clone)]
pub struct CredentialFilter {
    patterns: Vec<Regex>,
}

impl Default for CredentialFilter {
    fn default() -> Self {
        Self {
            patterns: vec![default_pattern()],
        }
    }
}

fn default_pattern() -> Regex {
    Regex::new(DEFAULT_DENY_PATTERN).expect("default deny pattern is valid")
}

impl CredentialFilter {
    /// Filter with no patterns; denies nothing.
    pub fn allow_all() -> Self {
        Self { patterns: vec![] }
    }

    /// Build from custom patterns, replacing the default.
    pub fn from_patterns<I, S>(patterns: I) -> Result<Self, regex::Error>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patterns = patterns
            .into_iter()
            .map(|p| Regex::new(p.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { patterns })
    }

    /// Add one more pattern on top of the existing ones.
    pub fn with_pattern(mut self, pattern: &str) -> Result<Self, regex::Error> {
        self.patterns.push(Regex::new(pattern)?);
        Ok(self)
    }

    /// Returns `true` if the lower-cased URL matches any denylist pattern.
    pub fn is_denied(&self, url: &str) -> bool {
        let lowered = url.to_lowercase();
        self.patterns.iter().any(|p| p.is_match(&lowered))
    }
}

/// Turn raw directory URLs into pool candidates.
///
/// Each URL is lower-cased, then dropped if denied, malformed, not HTTP(S),
/// or already seen. Order of first appearance is kept.
pub fn filter_candidates<I, S>(urls: I, filter: &CredentialFilter) -> Vec<Endpoint>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out: Vec<Endpoint> = Vec::new();
    for raw in urls {
        let url = raw.as_ref().to_lowercase();
        if filter.is_denied(&url) {
            tracing::debug!(url = %url, "dropping credential-gated endpoint");
            continue;
        }
        let endpoint = match Endpoint::parse(url.as_str()) {
            Ok(ep) => ep,
            Err(e) => {
                tracing::debug!(url = %url, error = %e, "dropping malformed endpoint");
                continue;
            }
        };
        if !endpoint.is_http() {
            tracing::debug!(url = %url, "dropping non-HTTP endpoint");
            continue;
        }
        if out.contains(&endpoint) {
            continue;
        }
        out.push(endpoint);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_key_urls_are_denied() {
        let filter = CredentialFilter::default();
        assert!(filter.is_denied("https://rpc.example.com/?apikey=XYZ"));
        assert!(filter.is_denied("https://rpc.example.com/v1/${API_KEY}"));
        assert!(filter.is_denied("https://rpc.example.com/?api_key=abc"));
        assert!(!filter.is_denied("https://rpc.example.com"));
    }

    #[test]
    fn custom_patterns_replace_default() {
        let filter = CredentialFilter::from_patterns([r"infura\.io"]).unwrap();
        assert!(filter.is_denied("https://mainnet.infura.io/v3/abc"));
        assert!(!filter.is_denied("https://rpc.example.com/?apikey=XYZ"));
    }

    #[test]
    fn with_pattern_extends() {
        let filter = CredentialFilter::default().with_pattern(r"\$\{").unwrap();
        assert!(filter.is_denied("https://rpc.example.com/${TOKEN}"));
        assert!(filter.is_denied("https://rpc.example.com/?apikey=1"));
    }

    #[test]
    fn invalid_pattern_is_an_error() {
        assert!(CredentialFilter::from_patterns(["("]).is_err());
    }

    #[test]
    fn candidates_are_lowercased_filtered_and_deduplicated() {
        let urls = [
            "https://RPC.Example.com",
            "https://rpc.example.com/?apikey=XYZ",
            "wss://rpc.example.com/ws",
            "https://rpc.example.com",
            "not a url",
            "https://arb1.example.org/rpc",
        ];
        let eps = filter_candidates(urls, &CredentialFilter::default());
        let got: Vec<&str> = eps.iter().map(Endpoint::as_str).collect();
        assert_eq!(got, vec!["https://rpc.example.com", "https://arb1.example.org/rpc"]);
    }

    #[test]
    fn allow_all_keeps_key_urls() {
        let eps = filter_candidates(
            ["https://rpc.example.com/?apikey=XYZ"],
            &CredentialFilter::allow_all(),
        );
        assert_eq!(eps.len(), 1);
    }
}
