use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use sqlx::PgPool;
use tracing::info;
use tracing_subscriber::EnvFilter;

use picketline_common::Config;
use picketline_scrape::{load_candidates, Harvester, HarvestParams, HttpExtractor};
use picketline_store::{ArticleStore, PgArticleStore};

#[derive(Parser)]
#[command(name = "picketline-scrape", about = "Fetch candidate articles into the document store")]
struct Cli {
    /// Path to a JSONL file of candidate articles
    #[arg(long, default_value = "./candidates.jsonl")]
    candidates: PathBuf,

    /// Concurrent fetch workers
    #[arg(long, default_value_t = 4)]
    workers: usize,

    /// Minimum per-fetch politeness delay in milliseconds
    #[arg(long, default_value_t = 500)]
    delay_min_ms: u64,

    /// Maximum per-fetch politeness delay in milliseconds (0 disables)
    #[arg(long, default_value_t = 2500)]
    delay_max_ms: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("picketline=info".parse()?))
        .init();

    info!("Picketline harvester starting...");

    let cli = Cli::parse();
    let config = Config::store_from_env();

    let pool = PgPool::connect(&config.database_url).await?;
    let store = Arc::new(PgArticleStore::new(pool));
    store.migrate().await?;

    let candidates = load_candidates(&cli.candidates)?;
    info!(
        count = candidates.len(),
        file = %cli.candidates.display(),
        "Loaded candidate batch"
    );

    let harvester = Harvester::new(
        store.clone(),
        Arc::new(HttpExtractor::new()?),
        HarvestParams {
            workers: cli.workers,
            delay_min_ms: cli.delay_min_ms,
            delay_max_ms: cli.delay_max_ms,
        },
    );

    let stats = harvester.run(&candidates).await?;
    println!("{stats}");

    let counts = store.status_counts().await?;
    println!("Store totals: {counts} (total={})", counts.total());

    Ok(())
}
