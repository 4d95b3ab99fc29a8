use std::sync::Arc;

use anyhow::Result;
use picketline_store::{ArticleStore, ClassUpdate};
use tracing::{info, warn};

use crate::decision::{build_reason, decide};
use crate::scorer::{ProtestScorer, ScoreOutcome};

/// Default page size for the classify scan. Smaller than the relabel
/// page because every row here costs an inference call.
pub const CLASSIFY_PAGE_SIZE: i64 = 250;

#[derive(Debug, Clone, Copy)]
pub struct ClassifyParams {
    pub threshold: f64,
    pub page_size: i64,
    /// Cap on scanned records; 0 means no cap.
    pub limit: u64,
    pub dry_run: bool,
    /// Re-score records that already have a score.
    pub force: bool,
}

impl Default for ClassifyParams {
    fn default() -> Self {
        Self {
            threshold: crate::decision::DEFAULT_THRESHOLD,
            page_size: CLASSIFY_PAGE_SIZE,
            limit: 0,
            dry_run: false,
            force: false,
        }
    }
}

/// Stats from a classify-missing pass.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ClassifyStats {
    pub scanned: u64,
    /// Scorer invocations, including ones that came back skipped.
    pub attempted: u64,
    pub scored: u64,
    pub skipped: u64,
    pub errored: u64,
    pub modified: u64,
    pub pages: u64,
}

impl std::fmt::Display for ClassifyStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "\n=== Classify Missing Complete ===")?;
        writeln!(f, "Scanned:   {}", self.scanned)?;
        writeln!(f, "Attempted: {}", self.attempted)?;
        writeln!(f, "Scored:    {}", self.scored)?;
        writeln!(f, "Skipped:   {}", self.skipped)?;
        writeln!(f, "Errors:    {}", self.errored)?;
        writeln!(f, "Modified:  {}", self.modified)?;
        writeln!(f, "Pages:     {}", self.pages)?;
        Ok(())
    }
}

/// Scores every text-bearing Record that has no score yet (all of them
/// in force mode). One scorer failure poisons only its own Record; the
/// page batch carries on.
pub struct MissingClassifier {
    store: Arc<dyn ArticleStore>,
    scorer: Arc<dyn ProtestScorer>,
}

impl MissingClassifier {
    pub fn new(store: Arc<dyn ArticleStore>, scorer: Arc<dyn ProtestScorer>) -> Self {
        Self { store, scorer }
    }

    pub async fn run(&self, params: &ClassifyParams) -> Result<ClassifyStats> {
        let mut stats = ClassifyStats::default();
        let mut after: Option<String> = None;

        let pending = self.store.count_unclassified(params.force).await?;
        info!(
            pending,
            threshold = params.threshold,
            force = params.force,
            dry_run = params.dry_run,
            model = self.scorer.model(),
            "Classify pass starting"
        );

        loop {
            let page = self
                .store
                .unclassified_page(after.as_deref(), params.page_size, params.force)
                .await?;
            if page.is_empty() {
                break;
            }
            stats.pages += 1;

            let mut updates: Vec<ClassUpdate> = Vec::new();
            for row in &page {
                if params.limit != 0 && stats.scanned >= params.limit {
                    break;
                }
                stats.scanned += 1;
                after = Some(row.url.clone());

                stats.attempted += 1;
                match self.scorer.score(row.title.as_deref(), &row.text).await {
                    Ok(ScoreOutcome::Scored(result)) => {
                        let decision = decide(result.probability, params.threshold);
                        let reason = build_reason(
                            Some((&result.top_label, result.top_score)),
                            result.probability,
                            params.threshold,
                            decision.label_name,
                        );
                        stats.scored += 1;
                        updates.push(ClassUpdate::Scored {
                            url: row.url.clone(),
                            score: result.probability,
                            label: decision.label,
                            label_name: decision.label_name.to_string(),
                            top_label: result.top_label,
                            top_score: result.top_score,
                            model: result.model,
                            reason,
                        });
                    }
                    Ok(ScoreOutcome::SkippedShortText { min_length }) => {
                        stats.skipped += 1;
                        updates.push(ClassUpdate::Skipped {
                            url: row.url.clone(),
                            reason: format!(
                                "Skipped: text shorter than min_length={min_length}"
                            ),
                        });
                    }
                    Err(e) => {
                        warn!(url = %row.url, error = %e, "Scorer failed for record");
                        stats.errored += 1;
                        updates.push(ClassUpdate::Errored {
                            url: row.url.clone(),
                            message: e.to_string(),
                        });
                    }
                }
            }

            if !updates.is_empty() && !params.dry_run {
                let modified = self.store.apply_classifications(&updates).await?;
                stats.modified += modified;
                info!(modified, "Applied classification batch");
            }

            if params.limit != 0 && stats.scanned >= params.limit {
                break;
            }

            // Without force, scored rows drop out of the filter on the
            // next page query, but the boundary still guards against
            // rescanning rows that were skipped or errored.
        }

        info!(
            scanned = stats.scanned,
            attempted = stats.attempted,
            scored = stats.scored,
            skipped = stats.skipped,
            errored = stats.errored,
            dry_run = params.dry_run,
            force = params.force,
            "Classify pass finished"
        );
        Ok(stats)
    }
}
