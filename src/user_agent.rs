//! Shared User-Agent string for report traffic.
//!
//! Abuse-reporting services log submitters; the UA identifies the tool and
//! where to find it.

/// Project URL for User-Agent identification (RFC 9308).
const PROJECT_UA_URL: &str = "https://github.com/fierce/url-reporter";

/// Default User-Agent for report submissions.
#[must_use]
pub(crate) fn default_report_user_agent() -> String {
    let version = env!("CARGO_PKG_VERSION");
    format!("url-reporter/{version} (abuse-reporting-tool; +{PROJECT_UA_URL})")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_ua_carries_version_and_project_url() {
        let ua = default_report_user_agent();
        assert!(ua.contains(PROJECT_UA_URL), "UA must contain project URL");
        assert_eq!(
            Some(env!("CARGO_PKG_VERSION")),
            ua.strip_prefix("url-reporter/")
                .and_then(|s| s.split(' ').next()),
            "UA must contain crate version"
        );
    }

    #[test]
    fn test_report_ua_identifies_purpose() {
        let ua = default_report_user_agent();
        assert!(
            ua.contains("abuse-reporting-tool"),
            "UA must identify as abuse-reporting-tool: {ua}"
        );
    }
}
