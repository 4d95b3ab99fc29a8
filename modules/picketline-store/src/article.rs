//! Record types for the `articles` table.

use chrono::{DateTime, Utc};

/// Failure marker for a clean extractor failure.
pub const SCRAPE_FAILED: &str = "SCRAPE_FAILED";
/// Failure marker for an extraction that produced an empty body.
pub const EMPTY_TEXT: &str = "EMPTY_TEXT";

/// Fetch lifecycle of a Record.
///
/// `failed` and `error` rows stay eligible for the next run's frontier;
/// only `done` with non-empty text is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchStatus {
    Pending,
    Done,
    Failed,
    Error,
}

impl FetchStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FetchStatus::Pending => "pending",
            FetchStatus::Done => "done",
            FetchStatus::Failed => "failed",
            FetchStatus::Error => "error",
        }
    }
}

impl std::fmt::Display for FetchStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classification outcome marker (`class_status` column).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassStatus {
    Ok,
    SkippedShortText,
    Error,
}

impl ClassStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClassStatus::Ok => "ok",
            ClassStatus::SkippedShortText => "skipped_short_text",
            ClassStatus::Error => "error",
        }
    }
}

/// One row of the `articles` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ArticleRecord {
    pub url: String,
    pub media_url: Option<String>,
    pub paper: String,
    pub title: Option<String>,
    pub publish_date: Option<String>,
    pub text: Option<String>,
    pub status: String,
    pub error: Option<String>,
    pub time_enqueued: Option<DateTime<Utc>>,
    pub time_scraped: Option<DateTime<Utc>>,
    pub score: Option<f64>,
    pub label: Option<i32>,
    pub label_name: Option<String>,
    pub top_label: Option<String>,
    pub top_score: Option<f64>,
    pub model: Option<String>,
    pub reason: Option<String>,
    pub class_status: Option<String>,
    pub class_error: Option<String>,
    pub keyword_candidate: Option<bool>,
    pub human_label: Option<i32>,
}

/// Seed payload: provenance only, written insert-if-absent.
#[derive(Debug, Clone)]
pub struct SeedArticle {
    pub url: String,
    pub media_url: Option<String>,
    pub paper: String,
    pub title: Option<String>,
    pub publish_date: Option<String>,
}

/// Payload of a successful fetch.
#[derive(Debug, Clone)]
pub struct FetchedArticle {
    pub url: String,
    pub media_url: Option<String>,
    pub paper: String,
    pub title: Option<String>,
    pub publish_date: Option<String>,
    pub text: String,
}

/// Per-status row counts across the whole table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusCounts {
    pub pending: i64,
    pub done: i64,
    pub failed: i64,
    pub error: i64,
}

impl StatusCounts {
    pub fn total(&self) -> i64 {
        self.pending + self.done + self.failed + self.error
    }
}

impl std::fmt::Display for StatusCounts {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "done={} pending={} failed={} error={}",
            self.done, self.pending, self.failed, self.error
        )
    }
}

/// Page row for the Relabel Engine: everything needed to recompute the
/// derived fields and detect no-op rewrites without a second read.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ScoredRow {
    pub url: String,
    pub score: f64,
    pub label: Option<i32>,
    pub label_name: Option<String>,
    pub top_label: Option<String>,
    pub top_score: Option<f64>,
    pub reason: Option<String>,
}

/// Page row for the Classify-Missing Engine.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UnclassifiedRow {
    pub url: String,
    pub title: Option<String>,
    pub text: String,
}

/// Page row for the keyword pre-filter.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CandidateRow {
    pub url: String,
    pub title: Option<String>,
    pub text: Option<String>,
    pub keyword_candidate: Option<bool>,
}

/// Relabel bulk update: only the three derived fields.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelUpdate {
    pub url: String,
    pub label: i32,
    pub label_name: String,
    pub reason: String,
}

/// Classify-Missing bulk update, one per scored/skipped/errored row.
#[derive(Debug, Clone)]
pub enum ClassUpdate {
    Scored {
        url: String,
        score: f64,
        label: i32,
        label_name: String,
        top_label: String,
        top_score: f64,
        model: String,
        reason: String,
    },
    Skipped {
        url: String,
        reason: String,
    },
    Errored {
        url: String,
        message: String,
    },
}

impl ClassUpdate {
    pub fn url(&self) -> &str {
        match self {
            ClassUpdate::Scored { url, .. } => url,
            ClassUpdate::Skipped { url, .. } => url,
            ClassUpdate::Errored { url, .. } => url,
        }
    }
}

/// Keyword pre-filter bulk update.
#[derive(Debug, Clone)]
pub struct CandidateUpdate {
    pub url: String,
    pub keyword_candidate: bool,
}

/// One gold-labeled evaluation point for the threshold sweep.
#[derive(Debug, Clone, Copy, sqlx::FromRow)]
pub struct EvalSample {
    pub human_label: i32,
    pub score: f64,
}
