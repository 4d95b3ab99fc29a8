use std::sync::Arc;
use std::sync::LazyLock;

use anyhow::Result;
use picketline_store::{ArticleStore, CandidateUpdate};
use regex::Regex;
use tracing::info;

/// Page size for the keyword scan. Pure string matching, so pages can
/// be larger than the inference-bound passes.
pub const KEYWORD_PAGE_SIZE: i64 = 500;

/// Surface vocabulary of protest coverage. Matching any one term marks
/// the record as a candidate worth scoring.
pub const PROTEST_TERMS: &[&str] = &[
    "protest",
    "protests",
    "protester",
    "protesters",
    "demonstration",
    "demonstrations",
    "demo",
    "rally",
    "march",
    "sit-in",
    "occupation",
    "blockade",
    "strike",
    "walkout",
    "picket",
    "picket line",
    "riot",
    "riots",
    "clash with police",
    "clashes with police",
    "took to the streets",
    "mass protest",
    "mass demonstration",
];

static KEYWORD_RE: LazyLock<Regex> = LazyLock::new(|| {
    let alternates = PROTEST_TERMS
        .iter()
        .map(|term| regex::escape(term))
        .collect::<Vec<_>>()
        .join("|");
    // Word boundaries keep "demo" from firing inside "democracy".
    Regex::new(&format!(r"(?i)\b(?:{alternates})\b")).expect("valid regex")
});

/// True if the title-plus-body text mentions any protest term.
pub fn mentions_protest(title: Option<&str>, text: Option<&str>) -> bool {
    let haystack = format!("{} {}", title.unwrap_or(""), text.unwrap_or(""));
    KEYWORD_RE.is_match(&haystack)
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct KeywordStats {
    pub scanned: u64,
    pub candidates: u64,
    pub modified: u64,
    pub pages: u64,
}

impl std::fmt::Display for KeywordStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "\n=== Keyword Pre-Filter Complete ===")?;
        writeln!(f, "Scanned:    {}", self.scanned)?;
        writeln!(f, "Candidates: {}", self.candidates)?;
        writeln!(f, "Modified:   {}", self.modified)?;
        writeln!(f, "Pages:      {}", self.pages)?;
        Ok(())
    }
}

/// Walks every record and stamps keyword_candidate so downstream
/// passes can cheaply restrict to plausible protest articles.
pub struct KeywordMarker {
    store: Arc<dyn ArticleStore>,
}

impl KeywordMarker {
    pub fn new(store: Arc<dyn ArticleStore>) -> Self {
        Self { store }
    }

    pub async fn run(&self, dry_run: bool) -> Result<KeywordStats> {
        let mut stats = KeywordStats::default();
        let mut after: Option<String> = None;

        loop {
            let page = self
                .store
                .candidate_page(after.as_deref(), KEYWORD_PAGE_SIZE)
                .await?;
            if page.is_empty() {
                break;
            }
            stats.pages += 1;

            let mut updates: Vec<CandidateUpdate> = Vec::new();
            for row in &page {
                stats.scanned += 1;
                after = Some(row.url.clone());

                let flag = mentions_protest(row.title.as_deref(), row.text.as_deref());
                if flag {
                    stats.candidates += 1;
                }
                // Rows already carrying the right flag need no write.
                if row.keyword_candidate == Some(flag) {
                    continue;
                }
                updates.push(CandidateUpdate {
                    url: row.url.clone(),
                    keyword_candidate: flag,
                });
            }

            if !updates.is_empty() && !dry_run {
                let modified = self.store.apply_candidates(&updates).await?;
                stats.modified += modified;
                info!(modified, "Applied keyword batch");
            }
        }

        info!(
            scanned = stats.scanned,
            candidates = stats.candidates,
            modified = stats.modified,
            dry_run,
            "Keyword pass finished"
        );
        Ok(stats)
    }
}
