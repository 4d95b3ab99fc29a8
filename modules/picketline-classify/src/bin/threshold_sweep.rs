use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use sqlx::PgPool;
use tracing::info;
use tracing_subscriber::EnvFilter;

use picketline_classify::{run_sweep, SweepConfig};
use picketline_common::Config;
use picketline_store::{ArticleStore, PgArticleStore};

#[derive(Parser)]
#[command(
    name = "threshold_sweep",
    about = "Sweep decision thresholds over gold-labeled records and report the F0.5 best"
)]
struct Cli {
    /// Lowest threshold to evaluate
    #[arg(long, default_value_t = 0.05)]
    start: f64,

    /// Highest threshold to evaluate (inclusive)
    #[arg(long, default_value_t = 0.90)]
    end: f64,

    /// Step between thresholds
    #[arg(long, default_value_t = 0.01)]
    step: f64,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("picketline=info".parse()?))
        .init();

    let cli = Cli::parse();
    let config = Config::store_from_env();

    let pool = PgPool::connect(&config.database_url).await?;
    let store = Arc::new(PgArticleStore::new(pool));
    store.migrate().await?;

    let samples = store.eval_samples().await?;
    info!(count = samples.len(), "Loaded gold-labeled samples");

    let report = run_sweep(
        &samples,
        SweepConfig {
            start: cli.start,
            end: cli.end,
            step: cli.step,
        },
    );
    println!("{report}");

    Ok(())
}
