//! Compile-time build information.

include!(concat!(env!("OUT_DIR"), "/build_info.rs"));

/// One-line version string, as `--version` prints it.
pub fn version_line() -> String {
    format!("brogue-portal {}", VERSION)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_info_not_empty() {
        assert!(!BUILD_COMMIT.is_empty());
        assert!(!BUILD_DATE.is_empty());
    }

    #[test]
    fn test_build_commit_format() {
        // 7 chars from git, "unknown" outside a checkout, or whatever CI injected
        assert!(BUILD_COMMIT == "unknown" || !BUILD_COMMIT.contains(char::is_whitespace));
    }

    #[test]
    fn test_user_agent_names_the_crate() {
        assert!(USER_AGENT.starts_with("brogue-portal/"));
        assert!(USER_AGENT.contains(BUILD_COMMIT));
    }

    #[test]
    fn test_version_line_mentions_commit_and_date() {
        let line = version_line();
        assert!(line.contains(BUILD_COMMIT));
        assert!(line.contains(BUILD_DATE));
        assert!(line.contains(env!("CARGO_PKG_VERSION")));
    }
}
