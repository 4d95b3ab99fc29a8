use std::sync::Arc;

use anyhow::Result;
use picketline_store::{ArticleStore, LabelUpdate, ScoredRow};
use tracing::info;

use crate::decision::{build_reason, decide};

/// Default page size for the relabel scan. Large pages are fine here;
/// each row costs one comparison, not an inference call.
pub const RELABEL_PAGE_SIZE: i64 = 1000;

#[derive(Debug, Clone, Copy)]
pub struct RelabelParams {
    pub threshold: f64,
    pub page_size: i64,
    /// Cap on scanned records; 0 means no cap.
    pub limit: u64,
    pub dry_run: bool,
}

impl Default for RelabelParams {
    fn default() -> Self {
        Self {
            threshold: crate::decision::DEFAULT_THRESHOLD,
            page_size: RELABEL_PAGE_SIZE,
            limit: 0,
            dry_run: false,
        }
    }
}

/// Stats from a relabel pass.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct RelabelStats {
    pub scanned: u64,
    /// Rows with a usable (finite) score.
    pub relabelable: u64,
    /// Rows whose recomputed fields differ from what is stored.
    pub changed: u64,
    /// Rows the store reports as written.
    pub modified: u64,
    pub pages: u64,
}

impl std::fmt::Display for RelabelStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "\n=== Relabel Complete ===")?;
        writeln!(f, "Scanned:     {}", self.scanned)?;
        writeln!(f, "Relabelable: {}", self.relabelable)?;
        writeln!(f, "Changed:     {}", self.changed)?;
        writeln!(f, "Modified:    {}", self.modified)?;
        writeln!(f, "Pages:       {}", self.pages)?;
        Ok(())
    }
}

/// Recomputes `label`/`label_name`/`reason` for every scored Record
/// from the stored score alone. Never calls the scorer.
pub struct Relabeler {
    store: Arc<dyn ArticleStore>,
}

impl Relabeler {
    pub fn new(store: Arc<dyn ArticleStore>) -> Self {
        Self { store }
    }

    /// Walk all scored Records in ascending-url pages and rewrite the
    /// derived fields where the threshold decision moved them. The page
    /// boundary advances over skipped rows too, so progress is
    /// monotonic even when nothing in a page changes.
    pub async fn run(&self, params: &RelabelParams) -> Result<RelabelStats> {
        let mut stats = RelabelStats::default();
        let mut after: Option<String> = None;

        info!(
            threshold = params.threshold,
            dry_run = params.dry_run,
            "Relabel pass starting"
        );

        loop {
            let page = self
                .store
                .scored_page(after.as_deref(), params.page_size)
                .await?;
            if page.is_empty() {
                break;
            }
            stats.pages += 1;

            let mut updates: Vec<LabelUpdate> = Vec::new();
            for row in &page {
                if params.limit != 0 && stats.scanned >= params.limit {
                    break;
                }
                stats.scanned += 1;
                after = Some(row.url.clone());

                if !row.score.is_finite() {
                    continue;
                }
                stats.relabelable += 1;

                let update = relabel_row(row, params.threshold);
                if is_noop(row, &update) {
                    continue;
                }
                stats.changed += 1;
                updates.push(update);
            }

            if !updates.is_empty() && !params.dry_run {
                let modified = self.store.apply_labels(&updates).await?;
                stats.modified += modified;
                info!(modified, "Applied relabel batch");
            }

            if params.limit != 0 && stats.scanned >= params.limit {
                break;
            }
        }

        info!(
            scanned = stats.scanned,
            relabelable = stats.relabelable,
            changed = stats.changed,
            modified = stats.modified,
            dry_run = params.dry_run,
            "Relabel pass finished"
        );
        Ok(stats)
    }

    /// Point diagnosis for one URL: print the stored derived fields,
    /// apply the recomputation, print them again. Bypasses pagination.
    pub async fn debug_one(&self, url: &str, threshold: f64, dry_run: bool) -> Result<()> {
        let Some(before) = self.store.get(url).await? else {
            println!("[debug] no record for {url}");
            return Ok(());
        };
        println!(
            "[debug] BEFORE: score={:?} label={:?} label_name={:?} reason={:?}",
            before.score, before.label, before.label_name, before.reason
        );

        let Some(score) = before.score.filter(|s| s.is_finite()) else {
            println!("[debug] record has no usable score; cannot relabel");
            return Ok(());
        };

        let row = ScoredRow {
            url: before.url.clone(),
            score,
            label: before.label,
            label_name: before.label_name.clone(),
            top_label: before.top_label.clone(),
            top_score: before.top_score,
            reason: before.reason.clone(),
        };
        let update = relabel_row(&row, threshold);
        if !dry_run {
            self.store.apply_labels(std::slice::from_ref(&update)).await?;
        }

        if let Some(after) = self.store.get(url).await? {
            println!(
                "[debug] AFTER:  score={:?} label={:?} label_name={:?} reason={:?}",
                after.score, after.label, after.label_name, after.reason
            );
        }
        Ok(())
    }
}

fn relabel_row(row: &ScoredRow, threshold: f64) -> LabelUpdate {
    let decision = decide(row.score, threshold);
    let top = match (row.top_label.as_deref(), row.top_score) {
        (Some(label), Some(score)) => Some((label, score)),
        _ => None,
    };
    LabelUpdate {
        url: row.url.clone(),
        label: decision.label,
        label_name: decision.label_name.to_string(),
        reason: build_reason(top, row.score, threshold, decision.label_name),
    }
}

/// A rewrite that reproduces the stored fields byte for byte is
/// skipped, which keeps repeated passes from reporting phantom writes.
fn is_noop(row: &ScoredRow, update: &LabelUpdate) -> bool {
    row.label == Some(update.label)
        && row.label_name.as_deref() == Some(update.label_name.as_str())
        && row.reason.as_deref() == Some(update.reason.as_str())
}
