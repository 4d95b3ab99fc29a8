// In-memory Document Store for engine and pipeline tests.
//
// A BTreeMap keyed by URL gives the same ascending-url page semantics
// as the Postgres implementation; the Mutex makes it shareable across
// worker tasks. No network, no database.

use std::collections::{BTreeMap, HashSet};
use std::ops::Bound;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;

use crate::article::{
    ArticleRecord, CandidateRow, CandidateUpdate, ClassStatus, ClassUpdate, EvalSample,
    FetchStatus, FetchedArticle, LabelUpdate, ScoredRow, SeedArticle, StatusCounts,
    UnclassifiedRow,
};
use crate::error::Result;
use crate::store::ArticleStore;

// ---------------------------------------------------------------------------
// Row factories
// ---------------------------------------------------------------------------

/// Bare pending row with the given url and nothing else set.
pub fn blank_record(url: &str) -> ArticleRecord {
    ArticleRecord {
        url: url.to_string(),
        media_url: None,
        paper: "Unknown".to_string(),
        title: None,
        publish_date: None,
        text: None,
        status: FetchStatus::Pending.as_str().to_string(),
        error: None,
        time_enqueued: None,
        time_scraped: None,
        score: None,
        label: None,
        label_name: None,
        top_label: None,
        top_score: None,
        model: None,
        reason: None,
        class_status: None,
        class_error: None,
        keyword_candidate: None,
        human_label: None,
    }
}

/// Done row with text, as left behind by a successful fetch.
pub fn done_record(url: &str, text: &str) -> ArticleRecord {
    let mut record = blank_record(url);
    record.status = FetchStatus::Done.as_str().to_string();
    record.text = Some(text.to_string());
    record.time_scraped = Some(Utc::now());
    record
}

/// Done row that has also been scored.
pub fn scored_record(url: &str, score: f64) -> ArticleRecord {
    let mut record = done_record(url, "body text long enough to have been scored");
    record.score = Some(score);
    record.class_status = Some(ClassStatus::Ok.as_str().to_string());
    record
}

// ---------------------------------------------------------------------------
// MemoryArticleStore
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct MemoryArticleStore {
    rows: Mutex<BTreeMap<String, ArticleRecord>>,
}

impl MemoryArticleStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a row directly, bypassing the seeding path. Test setup.
    pub fn insert(&self, record: ArticleRecord) {
        self.rows
            .lock()
            .unwrap()
            .insert(record.url.clone(), record);
    }

    pub fn len(&self) -> usize {
        self.rows.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.lock().unwrap().is_empty()
    }
}

fn page_after<'a>(
    rows: &'a BTreeMap<String, ArticleRecord>,
    after: Option<&'a str>,
) -> impl Iterator<Item = &'a ArticleRecord> {
    let lower = match after {
        Some(a) => Bound::Excluded(a.to_string()),
        None => Bound::Unbounded,
    };
    rows.range((lower, Bound::Unbounded)).map(|(_, v)| v)
}

fn has_text(record: &ArticleRecord) -> bool {
    record.text.as_deref().is_some_and(|t| !t.is_empty())
}

#[async_trait]
impl ArticleStore for MemoryArticleStore {
    async fn seed(&self, seeds: &[SeedArticle]) -> Result<u64> {
        let mut rows = self.rows.lock().unwrap();
        let mut inserted = 0u64;
        for seed in seeds {
            if rows.contains_key(&seed.url) {
                continue;
            }
            let mut row = blank_record(&seed.url);
            row.media_url = seed.media_url.clone();
            row.paper = seed.paper.clone();
            row.title = seed.title.clone();
            row.publish_date = seed.publish_date.clone();
            row.time_enqueued = Some(Utc::now());
            rows.insert(seed.url.clone(), row);
            inserted += 1;
        }
        Ok(inserted)
    }

    async fn mark_done(&self, article: &FetchedArticle) -> Result<()> {
        let mut rows = self.rows.lock().unwrap();
        let row = rows
            .entry(article.url.clone())
            .or_insert_with(|| blank_record(&article.url));
        row.media_url = article.media_url.clone();
        row.paper = article.paper.clone();
        row.title = article.title.clone();
        row.publish_date = article.publish_date.clone();
        row.text = Some(article.text.clone());
        row.status = FetchStatus::Done.as_str().to_string();
        row.error = None;
        row.time_scraped = Some(Utc::now());
        Ok(())
    }

    async fn mark_failed(&self, url: &str, paper: &str, marker: &str) -> Result<()> {
        let mut rows = self.rows.lock().unwrap();
        let row = rows
            .entry(url.to_string())
            .or_insert_with(|| blank_record(url));
        row.paper = paper.to_string();
        row.status = FetchStatus::Failed.as_str().to_string();
        row.error = Some(marker.to_string());
        row.text = None;
        row.time_scraped = Some(Utc::now());
        Ok(())
    }

    async fn mark_errored(&self, url: &str, paper: &str, message: &str) -> Result<()> {
        let mut rows = self.rows.lock().unwrap();
        let row = rows
            .entry(url.to_string())
            .or_insert_with(|| blank_record(url));
        row.paper = paper.to_string();
        row.status = FetchStatus::Error.as_str().to_string();
        row.error = Some(message.to_string());
        row.text = None;
        row.time_scraped = Some(Utc::now());
        Ok(())
    }

    async fn done_urls(&self) -> Result<HashSet<String>> {
        let rows = self.rows.lock().unwrap();
        Ok(rows
            .values()
            .filter(|r| r.status == FetchStatus::Done.as_str() && has_text(r))
            .map(|r| r.url.clone())
            .collect())
    }

    async fn status_counts(&self) -> Result<StatusCounts> {
        let rows = self.rows.lock().unwrap();
        let mut counts = StatusCounts::default();
        for row in rows.values() {
            match row.status.as_str() {
                "pending" => counts.pending += 1,
                "done" => counts.done += 1,
                "failed" => counts.failed += 1,
                "error" => counts.error += 1,
                _ => {}
            }
        }
        Ok(counts)
    }

    async fn get(&self, url: &str) -> Result<Option<ArticleRecord>> {
        Ok(self.rows.lock().unwrap().get(url).cloned())
    }

    async fn scored_page(&self, after: Option<&str>, limit: i64) -> Result<Vec<ScoredRow>> {
        let rows = self.rows.lock().unwrap();
        Ok(page_after(&rows, after)
            .filter_map(|r| {
                r.score.map(|score| ScoredRow {
                    url: r.url.clone(),
                    score,
                    label: r.label,
                    label_name: r.label_name.clone(),
                    top_label: r.top_label.clone(),
                    top_score: r.top_score,
                    reason: r.reason.clone(),
                })
            })
            .take(limit as usize)
            .collect())
    }

    async fn count_scored(&self) -> Result<i64> {
        let rows = self.rows.lock().unwrap();
        Ok(rows.values().filter(|r| r.score.is_some()).count() as i64)
    }

    async fn unclassified_page(
        &self,
        after: Option<&str>,
        limit: i64,
        force: bool,
    ) -> Result<Vec<UnclassifiedRow>> {
        let rows = self.rows.lock().unwrap();
        Ok(page_after(&rows, after)
            .filter(|r| has_text(r) && (force || r.score.is_none()))
            .take(limit as usize)
            .map(|r| UnclassifiedRow {
                url: r.url.clone(),
                title: r.title.clone(),
                text: r.text.clone().unwrap_or_default(),
            })
            .collect())
    }

    async fn count_unclassified(&self, force: bool) -> Result<i64> {
        let rows = self.rows.lock().unwrap();
        Ok(rows
            .values()
            .filter(|r| has_text(r) && (force || r.score.is_none()))
            .count() as i64)
    }

    async fn candidate_page(&self, after: Option<&str>, limit: i64) -> Result<Vec<CandidateRow>> {
        let rows = self.rows.lock().unwrap();
        Ok(page_after(&rows, after)
            .take(limit as usize)
            .map(|r| CandidateRow {
                url: r.url.clone(),
                title: r.title.clone(),
                text: r.text.clone(),
                keyword_candidate: r.keyword_candidate,
            })
            .collect())
    }

    async fn apply_labels(&self, updates: &[LabelUpdate]) -> Result<u64> {
        let mut rows = self.rows.lock().unwrap();
        let mut modified = 0u64;
        for update in updates {
            if let Some(row) = rows.get_mut(&update.url) {
                row.label = Some(update.label);
                row.label_name = Some(update.label_name.clone());
                row.reason = Some(update.reason.clone());
                modified += 1;
            }
        }
        Ok(modified)
    }

    async fn apply_classifications(&self, updates: &[ClassUpdate]) -> Result<u64> {
        let mut rows = self.rows.lock().unwrap();
        let mut modified = 0u64;
        for update in updates {
            let Some(row) = rows.get_mut(update.url()) else {
                continue;
            };
            match update {
                ClassUpdate::Scored {
                    score,
                    label,
                    label_name,
                    top_label,
                    top_score,
                    model,
                    reason,
                    ..
                } => {
                    row.score = Some(*score);
                    row.label = Some(*label);
                    row.label_name = Some(label_name.clone());
                    row.top_label = Some(top_label.clone());
                    row.top_score = Some(*top_score);
                    row.model = Some(model.clone());
                    row.reason = Some(reason.clone());
                    row.class_status = Some(ClassStatus::Ok.as_str().to_string());
                    row.class_error = None;
                }
                ClassUpdate::Skipped { reason, .. } => {
                    row.class_status = Some(ClassStatus::SkippedShortText.as_str().to_string());
                    row.reason = Some(reason.clone());
                }
                ClassUpdate::Errored { message, .. } => {
                    row.class_status = Some(ClassStatus::Error.as_str().to_string());
                    row.class_error = Some(message.clone());
                }
            }
            modified += 1;
        }
        Ok(modified)
    }

    async fn apply_candidates(&self, updates: &[CandidateUpdate]) -> Result<u64> {
        let mut rows = self.rows.lock().unwrap();
        let mut modified = 0u64;
        for update in updates {
            if let Some(row) = rows.get_mut(&update.url) {
                row.keyword_candidate = Some(update.keyword_candidate);
                modified += 1;
            }
        }
        Ok(modified)
    }

    async fn eval_samples(&self) -> Result<Vec<EvalSample>> {
        let rows = self.rows.lock().unwrap();
        Ok(rows
            .values()
            .filter_map(|r| match (r.human_label, r.score) {
                (Some(human_label), Some(score)) => Some(EvalSample { human_label, score }),
                _ => None,
            })
            .collect())
    }
}
