use std::collections::HashSet;

use picketline_common::{canonical_url, infer_paper};
use picketline_store::SeedArticle;
use tracing::warn;

use crate::candidates::Candidate;

/// The batch of articles a run will actually fetch, plus counts of
/// everything that was weeded out on the way.
#[derive(Debug, Default)]
pub struct Frontier {
    pub articles: Vec<SeedArticle>,
    pub invalid: u64,
    pub duplicates: u64,
    pub already_done: u64,
}

/// Canonicalize candidate URLs, collapse within-batch duplicates, and
/// drop URLs already fetched to completion. Rows that previously failed
/// or errored are not in `done` and so stay eligible for retry.
pub fn build_frontier(candidates: &[Candidate], done: &HashSet<String>) -> Frontier {
    let mut frontier = Frontier::default();
    let mut seen: HashSet<String> = HashSet::new();

    for candidate in candidates {
        let Some(url) = canonical_url(&candidate.url) else {
            warn!(url = %candidate.url, "Skipping candidate with unusable URL");
            frontier.invalid += 1;
            continue;
        };
        if !seen.insert(url.clone()) {
            frontier.duplicates += 1;
            continue;
        }
        if done.contains(&url) {
            frontier.already_done += 1;
            continue;
        }

        let paper = candidate
            .paper
            .clone()
            .unwrap_or_else(|| infer_paper(&url, candidate.media_url.as_deref()));

        frontier.articles.push(SeedArticle {
            url,
            media_url: candidate.media_url.clone(),
            paper,
            title: candidate.title.clone(),
            publish_date: candidate.publish_date.clone(),
        });
    }

    frontier
}
