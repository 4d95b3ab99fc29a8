use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use futures::stream::{self, StreamExt};
use picketline_store::{ArticleStore, FetchedArticle, SeedArticle, EMPTY_TEXT, SCRAPE_FAILED};
use rand::Rng;
use tracing::{error, info, warn};

use crate::candidates::Candidate;
use crate::extractor::{ArticleExtractor, ExtractError};
use crate::frontier::build_frontier;

/// Tuning for a harvest run. The per-fetch delay is drawn uniformly
/// from `[delay_min_ms, delay_max_ms]`; a zero max disables it.
#[derive(Debug, Clone, Copy)]
pub struct HarvestParams {
    pub workers: usize,
    pub delay_min_ms: u64,
    pub delay_max_ms: u64,
}

impl Default for HarvestParams {
    fn default() -> Self {
        Self {
            workers: 4,
            delay_min_ms: 500,
            delay_max_ms: 2500,
        }
    }
}

/// Stats from a harvest run.
#[derive(Debug, Default)]
pub struct HarvestStats {
    pub candidates: u64,
    pub invalid: u64,
    pub duplicates: u64,
    pub already_done: u64,
    pub enqueued: u64,
    pub fetched: u64,
    pub empty: u64,
    pub failed: u64,
    pub errored: u64,
}

impl std::fmt::Display for HarvestStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "\n=== Harvest Run Complete ===")?;
        writeln!(f, "Candidates:     {}", self.candidates)?;
        writeln!(f, "Invalid URLs:   {}", self.invalid)?;
        writeln!(f, "Duplicates:     {}", self.duplicates)?;
        writeln!(f, "Already done:   {}", self.already_done)?;
        writeln!(f, "Newly enqueued: {}", self.enqueued)?;
        writeln!(f, "Fetched:        {}", self.fetched)?;
        writeln!(f, "Empty text:     {}", self.empty)?;
        writeln!(f, "Failed:         {}", self.failed)?;
        writeln!(f, "Errors:         {}", self.errored)?;
        Ok(())
    }
}

enum FetchOutcome {
    Fetched,
    Empty,
    Failed,
    Errored,
}

/// Drives one harvest cycle: frontier construction, seeding, then the
/// bounded fetch pool. Every outcome is written to the store inside its
/// worker task, so an interrupted run loses nothing already fetched.
pub struct Harvester {
    store: Arc<dyn ArticleStore>,
    extractor: Arc<dyn ArticleExtractor>,
    params: HarvestParams,
}

impl Harvester {
    pub fn new(
        store: Arc<dyn ArticleStore>,
        extractor: Arc<dyn ArticleExtractor>,
        params: HarvestParams,
    ) -> Self {
        Self {
            store,
            extractor,
            params,
        }
    }

    /// Run a full harvest cycle over one candidate batch.
    pub async fn run(&self, candidates: &[Candidate]) -> Result<HarvestStats> {
        let mut stats = HarvestStats {
            candidates: candidates.len() as u64,
            ..Default::default()
        };

        let done = self.store.done_urls().await?;
        let frontier = build_frontier(candidates, &done);
        stats.invalid = frontier.invalid;
        stats.duplicates = frontier.duplicates;
        stats.already_done = frontier.already_done;

        // Placeholder rows first, so the store reflects the whole batch
        // even if the fetch pool dies partway.
        stats.enqueued = self.store.seed(&frontier.articles).await?;
        info!(
            eligible = frontier.articles.len(),
            enqueued = stats.enqueued,
            extractor = self.extractor.name(),
            "Frontier ready"
        );

        let outcomes: Vec<FetchOutcome> = stream::iter(
            frontier
                .articles
                .iter()
                .map(|article| self.fetch_one(article)),
        )
        .buffer_unordered(self.params.workers.max(1))
        .collect()
        .await;

        for outcome in outcomes {
            match outcome {
                FetchOutcome::Fetched => stats.fetched += 1,
                FetchOutcome::Empty => stats.empty += 1,
                FetchOutcome::Failed => stats.failed += 1,
                FetchOutcome::Errored => stats.errored += 1,
            }
        }

        info!("{stats}");
        Ok(stats)
    }

    /// Fetch one article and record the outcome. Store write failures
    /// are logged and counted as errors rather than aborting the pool.
    async fn fetch_one(&self, seed: &SeedArticle) -> FetchOutcome {
        self.pause().await;

        match self.extractor.extract(&seed.url).await {
            Ok(text) => {
                let article = FetchedArticle {
                    url: seed.url.clone(),
                    media_url: seed.media_url.clone(),
                    paper: seed.paper.clone(),
                    title: seed.title.clone(),
                    publish_date: seed.publish_date.clone(),
                    text,
                };
                match self.store.mark_done(&article).await {
                    Ok(()) => FetchOutcome::Fetched,
                    Err(e) => {
                        warn!(url = %seed.url, error = %e, "Failed to store fetched article");
                        FetchOutcome::Errored
                    }
                }
            }
            Err(ExtractError::Empty) => {
                warn!(url = %seed.url, "No article text after extraction");
                match self.store.mark_failed(&seed.url, &seed.paper, EMPTY_TEXT).await {
                    Ok(()) => FetchOutcome::Empty,
                    Err(e) => {
                        warn!(url = %seed.url, error = %e, "Failed to record empty fetch");
                        FetchOutcome::Errored
                    }
                }
            }
            Err(ExtractError::Other(e)) => {
                error!(url = %seed.url, error = %e, "Fetch worker error");
                match self
                    .store
                    .mark_errored(&seed.url, &seed.paper, &e.to_string())
                    .await
                {
                    Ok(()) => FetchOutcome::Errored,
                    Err(e) => {
                        warn!(url = %seed.url, error = %e, "Failed to record worker error");
                        FetchOutcome::Errored
                    }
                }
            }
            Err(e) => {
                warn!(url = %seed.url, error = %e, "Fetch failed");
                match self.store.mark_failed(&seed.url, &seed.paper, SCRAPE_FAILED).await {
                    Ok(()) => FetchOutcome::Failed,
                    Err(e) => {
                        warn!(url = %seed.url, error = %e, "Failed to record fetch failure");
                        FetchOutcome::Errored
                    }
                }
            }
        }
    }

    /// Politeness delay so the pool doesn't hammer one origin.
    async fn pause(&self) {
        if self.params.delay_max_ms == 0 {
            return;
        }
        let min = self.params.delay_min_ms.min(self.params.delay_max_ms);
        let ms = rand::rng().random_range(min..=self.params.delay_max_ms);
        tokio::time::sleep(Duration::from_millis(ms)).await;
    }
}
