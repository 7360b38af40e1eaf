//! URL candidate scanning in free text.

use std::sync::LazyLock;

use regex::Regex;
use tracing::trace;

/// Regex pattern for finding URL-like tokens in text.
/// Matches `http://`, `https://` and bare `www.` hosts up to whitespace or
/// common delimiters. Case-insensitive because OCR output is not reliable
/// about case.
#[allow(clippy::expect_used)]
static URL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)(?:\bhttps?://|\bwww\.)[^\s<>"'\]\[{}|\\^`]+"#).expect("URL regex is valid") // Static pattern, safe to panic
});

/// Scans `input` for URL-like tokens, in order of appearance.
///
/// Tokens are trimmed of trailing sentence punctuation but otherwise left
/// as found: the report service decides what a valid URL is.
#[must_use]
pub fn scan_urls(input: &str) -> Vec<&str> {
    URL_PATTERN
        .find_iter(input)
        .map(|m| clean_url_trailing(m.as_str()))
        .filter(|url| !is_bare_prefix(url))
        .inspect(|url| trace!(url, "found URL candidate"))
        .collect()
}

/// Drops matches that are nothing but a scheme or `www.`.
fn is_bare_prefix(url: &str) -> bool {
    let lower = url.to_ascii_lowercase();
    matches!(lower.as_str(), "http://" | "https://" | "www." | "www")
}

/// Cleans trailing punctuation that OCR and prose attach to URLs.
///
/// Commas are the common case (lists of URLs in reports); sentence-ending
/// punctuation and unbalanced closing brackets are stripped as well.
fn clean_url_trailing(url: &str) -> &str {
    let mut result = url;

    while let Some(last) = result.chars().last() {
        match last {
            '.' | ',' | ';' | ':' | '!' | '?' => {
                result = &result[..result.len() - 1];
            }
            ')' => {
                // Keep the paren when the URL itself opened one (wiki-style paths).
                let open_count = result.chars().filter(|&c| c == '(').count();
                let close_count = result.chars().filter(|&c| c == ')').count();
                if close_count > open_count {
                    result = &result[..result.len() - 1];
                } else {
                    break;
                }
            }
            _ => break,
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_single_url() {
        assert_eq!(scan_urls("http://example.com/login"), vec!["http://example.com/login"]);
    }

    #[test]
    fn test_scan_strips_trailing_commas() {
        let input = "http://a.example, http://b.example,, http://c.example";
        assert_eq!(
            scan_urls(input),
            vec!["http://a.example", "http://b.example", "http://c.example"]
        );
    }

    #[test]
    fn test_scan_strips_sentence_punctuation() {
        assert_eq!(
            scan_urls("Go to https://bank-secure.example/verify. Now!"),
            vec!["https://bank-secure.example/verify"]
        );
        assert_eq!(scan_urls("link: http://x.example?"), vec!["http://x.example"]);
    }

    #[test]
    fn test_scan_keeps_balanced_parens() {
        assert_eq!(
            scan_urls("(see https://en.wikipedia.org/wiki/Foo_(bar))"),
            vec!["https://en.wikipedia.org/wiki/Foo_(bar)"]
        );
        assert_eq!(scan_urls("(http://x.example/a)"), vec!["http://x.example/a"]);
    }

    #[test]
    fn test_scan_finds_bare_www_hosts() {
        assert_eq!(
            scan_urls("Visit www.parcel-fee.example/pay to avoid return"),
            vec!["www.parcel-fee.example/pay"]
        );
    }

    #[test]
    fn test_scan_is_case_insensitive_for_scheme() {
        assert_eq!(scan_urls("HTTPS://EXAMPLE.COM/X"), vec!["HTTPS://EXAMPLE.COM/X"]);
    }

    #[test]
    fn test_scan_stops_at_quotes_and_angle_brackets() {
        assert_eq!(
            scan_urls(r#"<a href="http://x.example/a">click</a>"#),
            vec!["http://x.example/a"]
        );
    }

    #[test]
    fn test_scan_ignores_bare_scheme() {
        assert!(scan_urls("just http:// and nothing else").is_empty());
    }

    #[test]
    fn test_scan_keeps_malformed_tokens_for_the_service_to_judge() {
        assert_eq!(scan_urls("http://bad"), vec!["http://bad"]);
    }

    #[test]
    fn test_scan_no_urls() {
        assert!(scan_urls("Your parcel is waiting. Reply STOP to opt out").is_empty());
        assert!(scan_urls("").is_empty());
    }
}
