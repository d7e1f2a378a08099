//! Small utility helpers shared across the crate.

/// Return the first non-blank value `lookup` yields for `keys`, or `None`.
pub fn first_present(keys: &[&str], lookup: impl Fn(&str) -> Option<String>) -> Option<String> {
    for key in keys {
        if let Some(value) = lookup(key) {
            if !value.trim().is_empty() {
                return Some(value);
            }
        }
    }
    None
}

/// Normalise a URL by prepending `http://` or `https://` when the scheme is missing.
pub fn normalize_url(raw: &str) -> String {
    if raw.contains("://") {
        return raw.to_string();
    }
    let scheme = if raw.starts_with("localhost") || raw.starts_with("127.") || raw.contains(":80") {
        "http"
    } else {
        "https"
    };
    format!("{scheme}://{raw}")
}

/// Join a base URL and a path with exactly one `/` between them.
pub fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_present_skips_blank_values() {
        let lookup = |key: &str| match key {
            "A" => Some("  ".to_string()),
            "B" => Some("b".to_string()),
            _ => None,
        };
        assert_eq!(first_present(&["MISSING", "A", "B"], lookup), Some("b".to_string()));
        assert_eq!(first_present(&["A"], lookup), None);
    }

    #[test]
    fn normalize_url_picks_scheme() {
        assert_eq!(normalize_url("localhost:8080"), "http://localhost:8080");
        assert_eq!(normalize_url("api.openai.com/v1"), "https://api.openai.com/v1");
        assert_eq!(normalize_url("http://x.test"), "http://x.test");
    }

    #[test]
    fn join_url_collapses_slashes() {
        assert_eq!(join_url("https://a.test/v1/", "/responses"), "https://a.test/v1/responses");
        assert_eq!(join_url("https://a.test/v1", "responses"), "https://a.test/v1/responses");
    }
}
