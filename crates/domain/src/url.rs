//! URL normalization for property-sourced destinations.

const SCHEMES: [&str; 2] = ["http://", "https://"];

/// Ensure `candidate` carries an explicit scheme.
///
/// Whitespace is trimmed and a blank candidate yields `""` ("no URL").
/// Strings already starting with `http://` or `https://` (exact, case-sensitive)
/// are returned trimmed; anything else is treated as a bare host and prefixed
/// with `https://`. Relative paths are not recognised and get prefixed too.
#[must_use]
pub fn normalize_url(candidate: &str) -> String {
    let trimmed = candidate.trim();
    if trimmed.is_empty() {
        return String::new();
    }
    if SCHEMES.iter().any(|scheme| trimmed.starts_with(scheme)) {
        return trimmed.to_owned();
    }
    format!("https://{trimmed}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn prefixes_bare_hosts() {
        assert_eq!(normalize_url("example.com"), "https://example.com");
        assert_eq!(normalize_url("  acme.io/pricing "), "https://acme.io/pricing");
    }

    #[test]
    fn keeps_explicit_schemes() {
        assert_eq!(normalize_url("http://x.io"), "http://x.io");
        assert_eq!(normalize_url(" https://x.io "), "https://x.io");
    }

    #[test]
    fn blank_means_no_url() {
        assert_eq!(normalize_url("  "), "");
        assert_eq!(normalize_url(""), "");
    }

    #[test]
    fn scheme_match_is_case_sensitive() {
        assert_eq!(normalize_url("HTTP://X.IO"), "https://HTTP://X.IO");
    }

    proptest! {
        #[test]
        fn normalization_is_idempotent(candidate in ".*") {
            let once = normalize_url(&candidate);
            prop_assert_eq!(normalize_url(&once), once);
        }
    }
}
