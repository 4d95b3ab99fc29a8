use url::Url;

/// Hostname with any leading `www.` removed, lowercased.
fn host_of(u: &str) -> Option<String> {
    let parsed = Url::parse(u).ok()?;
    let host = parsed.host_str()?.to_lowercase();
    Some(host.strip_prefix("www.").unwrap_or(&host).to_string())
}

/// Decide the newspaper name from a URL host, falling back to the media
/// page URL when the article URL has no usable host. Matches by suffix
/// so subdomains (amp., live., i.) resolve to the same paper.
pub fn infer_paper(url: &str, media_url: Option<&str>) -> String {
    let host = host_of(url)
        .or_else(|| media_url.and_then(host_of))
        .unwrap_or_default();

    if host.ends_with("dailymail.co.uk") || host.ends_with("mailonline.co.uk") {
        return "Daily Mail".to_string();
    }
    if host.ends_with("theguardian.com") {
        return "The Guardian".to_string();
    }
    if host.ends_with("standard.co.uk") {
        return "Evening Standard".to_string();
    }

    if host.is_empty() {
        "Unknown".to_string()
    } else {
        host
    }
}
