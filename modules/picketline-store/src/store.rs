//! Document Store seam. Engines and the fetch pipeline depend on this
//! trait so tests can substitute the in-memory implementation and run
//! with no database.

use std::collections::HashSet;

use async_trait::async_trait;

use crate::article::{
    ArticleRecord, CandidateRow, CandidateUpdate, ClassUpdate, EvalSample, FetchedArticle,
    LabelUpdate, ScoredRow, SeedArticle, StatusCounts, UnclassifiedRow,
};
use crate::error::Result;

#[async_trait]
pub trait ArticleStore: Send + Sync {
    /// Insert pending placeholders for candidates not yet present.
    /// Rows that already exist, whatever their status, are left
    /// untouched. Returns the number of rows actually inserted.
    async fn seed(&self, seeds: &[SeedArticle]) -> Result<u64>;

    /// Upsert a successful fetch: provenance + text, `status = done`,
    /// failure marker cleared.
    async fn mark_done(&self, article: &FetchedArticle) -> Result<()>;

    /// Upsert a clean extraction failure. Text is cleared so that no
    /// non-done row ever carries article text.
    async fn mark_failed(&self, url: &str, paper: &str, marker: &str) -> Result<()>;

    /// Upsert an unexpected fetch error.
    async fn mark_errored(&self, url: &str, paper: &str, message: &str) -> Result<()>;

    /// URLs already fetched successfully (`status = done`, non-empty
    /// text). Drives the frontier dedup filter.
    async fn done_urls(&self) -> Result<HashSet<String>>;

    async fn status_counts(&self) -> Result<StatusCounts>;

    async fn get(&self, url: &str) -> Result<Option<ArticleRecord>>;

    /// Rows with a numeric score, ascending url, strictly after `after`.
    async fn scored_page(&self, after: Option<&str>, limit: i64) -> Result<Vec<ScoredRow>>;

    async fn count_scored(&self) -> Result<i64>;

    /// Rows with non-empty text and no score; all rows with non-empty
    /// text when `force` is set.
    async fn unclassified_page(
        &self,
        after: Option<&str>,
        limit: i64,
        force: bool,
    ) -> Result<Vec<UnclassifiedRow>>;

    async fn count_unclassified(&self, force: bool) -> Result<i64>;

    /// Every row, ascending url, for the keyword pre-filter.
    async fn candidate_page(&self, after: Option<&str>, limit: i64) -> Result<Vec<CandidateRow>>;

    /// Unordered bulk update: individual row failures are logged and
    /// skipped, the rest of the batch still applies. Returns the number
    /// of rows written.
    async fn apply_labels(&self, updates: &[LabelUpdate]) -> Result<u64>;

    async fn apply_classifications(&self, updates: &[ClassUpdate]) -> Result<u64>;

    async fn apply_candidates(&self, updates: &[CandidateUpdate]) -> Result<u64>;

    /// Gold-labeled rows that also carry a score, for the threshold
    /// sweep.
    async fn eval_samples(&self) -> Result<Vec<EvalSample>>;
}
