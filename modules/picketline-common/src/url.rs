use url::Url;

/// Query parameters stripped during canonicalization. They carry campaign
/// or session state, not article identity, and cause dedup mismatches.
const TRACKING_PARAMS: &[&str] = &[
    "_dt", "fbclid", "gclid", "utm_source", "utm_medium", "utm_campaign",
    "utm_term", "utm_content", "mc_cid", "mc_eid", "ito",
];

/// Normalize a candidate URL into the canonical Record key.
/// Returns `None` for anything that is not an absolute http(s) URL.
pub fn canonical_url(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    let mut parsed = Url::parse(trimmed).ok()?;
    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return None;
    }
    parsed.host_str()?;

    if parsed.query().is_none() {
        return Some(parsed.to_string());
    }

    let clean_pairs: Vec<(String, String)> = parsed
        .query_pairs()
        .filter(|(key, _)| !TRACKING_PARAMS.contains(&key.as_ref()))
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    if clean_pairs.is_empty() {
        parsed.set_query(None);
    } else {
        parsed.query_pairs_mut().clear().extend_pairs(clean_pairs);
    }

    Some(parsed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_tracking_params() {
        let url = "https://www.theguardian.com/uk/2024/jan/01/march?utm_source=feed&utm_medium=rss";
        assert_eq!(
            canonical_url(url).unwrap(),
            "https://www.theguardian.com/uk/2024/jan/01/march"
        );
    }

    #[test]
    fn keeps_meaningful_params() {
        let url = "https://example.com/article?page=2&utm_campaign=x";
        assert_eq!(
            canonical_url(url).unwrap(),
            "https://example.com/article?page=2"
        );
    }

    #[test]
    fn trims_whitespace() {
        assert_eq!(
            canonical_url("  https://example.com/a \n").unwrap(),
            "https://example.com/a"
        );
    }

    #[test]
    fn rejects_non_http_schemes() {
        assert_eq!(canonical_url("mailto:news@example.com"), None);
        assert_eq!(canonical_url("javascript:void(0)"), None);
    }

    #[test]
    fn rejects_relative_and_garbage() {
        assert_eq!(canonical_url("/uk/2024/article"), None);
        assert_eq!(canonical_url("not a url"), None);
        assert_eq!(canonical_url(""), None);
    }

    #[test]
    fn dailymail_ito_param_is_tracking() {
        let url = "https://www.dailymail.co.uk/news/article-1.html?ito=social-twitter";
        assert_eq!(
            canonical_url(url).unwrap(),
            "https://www.dailymail.co.uk/news/article-1.html"
        );
    }
}
