//! Postgres implementation of the Document Store.
//!
//! All writes are keyed by canonical URL. Outcome writes are
//! upsert-merges (`INSERT .. ON CONFLICT (url) DO UPDATE SET` touching
//! only that outcome's columns), seeding is insert-if-absent
//! (`ON CONFLICT DO NOTHING`), and bulk updates are unordered: one
//! failing row is logged and skipped without aborting the batch.

use std::collections::HashSet;

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::warn;

use crate::article::{
    ArticleRecord, CandidateRow, CandidateUpdate, ClassStatus, ClassUpdate, EvalSample,
    FetchedArticle, LabelUpdate, ScoredRow, SeedArticle, StatusCounts, UnclassifiedRow,
};
use crate::error::Result;
use crate::store::ArticleStore;

pub struct PgArticleStore {
    pool: PgPool,
}

impl PgArticleStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl ArticleStore for PgArticleStore {
    async fn seed(&self, seeds: &[SeedArticle]) -> Result<u64> {
        let mut inserted = 0u64;
        for seed in seeds {
            let res = sqlx::query(
                r#"
                INSERT INTO articles (url, media_url, paper, title, publish_date, status, time_enqueued)
                VALUES ($1, $2, $3, $4, $5, 'pending', NOW())
                ON CONFLICT (url) DO NOTHING
                "#,
            )
            .bind(&seed.url)
            .bind(&seed.media_url)
            .bind(&seed.paper)
            .bind(&seed.title)
            .bind(&seed.publish_date)
            .execute(&self.pool)
            .await;

            match res {
                Ok(done) => inserted += done.rows_affected(),
                Err(e) => warn!(url = %seed.url, error = %e, "Seed insert failed"),
            }
        }
        Ok(inserted)
    }

    async fn mark_done(&self, article: &FetchedArticle) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO articles
                (url, media_url, paper, title, publish_date, text, status, error, time_scraped)
            VALUES ($1, $2, $3, $4, $5, $6, 'done', NULL, NOW())
            ON CONFLICT (url) DO UPDATE SET
                media_url    = EXCLUDED.media_url,
                paper        = EXCLUDED.paper,
                title        = EXCLUDED.title,
                publish_date = EXCLUDED.publish_date,
                text         = EXCLUDED.text,
                status       = 'done',
                error        = NULL,
                time_scraped = EXCLUDED.time_scraped
            "#,
        )
        .bind(&article.url)
        .bind(&article.media_url)
        .bind(&article.paper)
        .bind(&article.title)
        .bind(&article.publish_date)
        .bind(&article.text)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn mark_failed(&self, url: &str, paper: &str, marker: &str) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO articles (url, paper, status, error, time_scraped)
            VALUES ($1, $2, 'failed', $3, NOW())
            ON CONFLICT (url) DO UPDATE SET
                paper        = EXCLUDED.paper,
                status       = 'failed',
                error        = EXCLUDED.error,
                text         = NULL,
                time_scraped = EXCLUDED.time_scraped
            "#,
        )
        .bind(url)
        .bind(paper)
        .bind(marker)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn mark_errored(&self, url: &str, paper: &str, message: &str) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO articles (url, paper, status, error, time_scraped)
            VALUES ($1, $2, 'error', $3, NOW())
            ON CONFLICT (url) DO UPDATE SET
                paper        = EXCLUDED.paper,
                status       = 'error',
                error        = EXCLUDED.error,
                text         = NULL,
                time_scraped = EXCLUDED.time_scraped
            "#,
        )
        .bind(url)
        .bind(paper)
        .bind(message)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn done_urls(&self) -> Result<HashSet<String>> {
        let urls: Vec<String> = sqlx::query_scalar(
            "SELECT url FROM articles WHERE status = 'done' AND text IS NOT NULL AND text <> ''",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(urls.into_iter().collect())
    }

    async fn status_counts(&self) -> Result<StatusCounts> {
        let rows: Vec<(String, i64)> =
            sqlx::query_as("SELECT status, COUNT(*) FROM articles GROUP BY status")
                .fetch_all(&self.pool)
                .await?;

        let mut counts = StatusCounts::default();
        for (status, n) in rows {
            match status.as_str() {
                "pending" => counts.pending = n,
                "done" => counts.done = n,
                "failed" => counts.failed = n,
                "error" => counts.error = n,
                other => warn!(status = other, count = n, "Unknown status in articles table"),
            }
        }
        Ok(counts)
    }

    async fn get(&self, url: &str) -> Result<Option<ArticleRecord>> {
        let record = sqlx::query_as::<_, ArticleRecord>(
            r#"
            SELECT url, media_url, paper, title, publish_date, text, status, error,
                   time_enqueued, time_scraped, score, label, label_name,
                   top_label, top_score, model, reason, class_status, class_error,
                   keyword_candidate, human_label
            FROM articles
            WHERE url = $1
            "#,
        )
        .bind(url)
        .fetch_optional(&self.pool)
        .await?;
        Ok(record)
    }

    async fn scored_page(&self, after: Option<&str>, limit: i64) -> Result<Vec<ScoredRow>> {
        // The empty string sorts before every URL, so None scans from the start.
        let rows = sqlx::query_as::<_, ScoredRow>(
            r#"
            SELECT url, score, label, label_name, top_label, top_score, reason
            FROM articles
            WHERE score IS NOT NULL AND url > $1
            ORDER BY url ASC
            LIMIT $2
            "#,
        )
        .bind(after.unwrap_or(""))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn count_scored(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM articles WHERE score IS NOT NULL")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn unclassified_page(
        &self,
        after: Option<&str>,
        limit: i64,
        force: bool,
    ) -> Result<Vec<UnclassifiedRow>> {
        let rows = sqlx::query_as::<_, UnclassifiedRow>(
            r#"
            SELECT url, title, text
            FROM articles
            WHERE text IS NOT NULL AND text <> ''
              AND ($3 OR score IS NULL)
              AND url > $1
            ORDER BY url ASC
            LIMIT $2
            "#,
        )
        .bind(after.unwrap_or(""))
        .bind(limit)
        .bind(force)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn count_unclassified(&self, force: bool) -> Result<i64> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM articles
            WHERE text IS NOT NULL AND text <> '' AND ($1 OR score IS NULL)
            "#,
        )
        .bind(force)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    async fn candidate_page(&self, after: Option<&str>, limit: i64) -> Result<Vec<CandidateRow>> {
        let rows = sqlx::query_as::<_, CandidateRow>(
            r#"
            SELECT url, title, text, keyword_candidate
            FROM articles
            WHERE url > $1
            ORDER BY url ASC
            LIMIT $2
            "#,
        )
        .bind(after.unwrap_or(""))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn apply_labels(&self, updates: &[LabelUpdate]) -> Result<u64> {
        let mut modified = 0u64;
        for update in updates {
            let res = sqlx::query(
                "UPDATE articles SET label = $2, label_name = $3, reason = $4 WHERE url = $1",
            )
            .bind(&update.url)
            .bind(update.label)
            .bind(&update.label_name)
            .bind(&update.reason)
            .execute(&self.pool)
            .await;

            match res {
                Ok(done) => modified += done.rows_affected(),
                Err(e) => warn!(url = %update.url, error = %e, "Label update failed"),
            }
        }
        Ok(modified)
    }

    async fn apply_classifications(&self, updates: &[ClassUpdate]) -> Result<u64> {
        let mut modified = 0u64;
        for update in updates {
            let res = match update {
                ClassUpdate::Scored {
                    url,
                    score,
                    label,
                    label_name,
                    top_label,
                    top_score,
                    model,
                    reason,
                } => {
                    sqlx::query(
                        r#"
                        UPDATE articles SET
                            score        = $2,
                            label        = $3,
                            label_name   = $4,
                            top_label    = $5,
                            top_score    = $6,
                            model        = $7,
                            reason       = $8,
                            class_status = $9,
                            class_error  = NULL
                        WHERE url = $1
                        "#,
                    )
                    .bind(url)
                    .bind(score)
                    .bind(label)
                    .bind(label_name)
                    .bind(top_label)
                    .bind(top_score)
                    .bind(model)
                    .bind(reason)
                    .bind(ClassStatus::Ok.as_str())
                    .execute(&self.pool)
                    .await
                }
                ClassUpdate::Skipped { url, reason } => {
                    sqlx::query(
                        "UPDATE articles SET class_status = $2, reason = $3 WHERE url = $1",
                    )
                    .bind(url)
                    .bind(ClassStatus::SkippedShortText.as_str())
                    .bind(reason)
                    .execute(&self.pool)
                    .await
                }
                ClassUpdate::Errored { url, message } => {
                    sqlx::query(
                        "UPDATE articles SET class_status = $2, class_error = $3 WHERE url = $1",
                    )
                    .bind(url)
                    .bind(ClassStatus::Error.as_str())
                    .bind(message)
                    .execute(&self.pool)
                    .await
                }
            };

            match res {
                Ok(done) => modified += done.rows_affected(),
                Err(e) => warn!(url = %update.url(), error = %e, "Classification update failed"),
            }
        }
        Ok(modified)
    }

    async fn apply_candidates(&self, updates: &[CandidateUpdate]) -> Result<u64> {
        let mut modified = 0u64;
        for update in updates {
            let res = sqlx::query("UPDATE articles SET keyword_candidate = $2 WHERE url = $1")
                .bind(&update.url)
                .bind(update.keyword_candidate)
                .execute(&self.pool)
                .await;

            match res {
                Ok(done) => modified += done.rows_affected(),
                Err(e) => warn!(url = %update.url, error = %e, "Keyword update failed"),
            }
        }
        Ok(modified)
    }

    async fn eval_samples(&self) -> Result<Vec<EvalSample>> {
        let samples = sqlx::query_as::<_, EvalSample>(
            "SELECT human_label, score FROM articles WHERE human_label IS NOT NULL AND score IS NOT NULL",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(samples)
    }
}
