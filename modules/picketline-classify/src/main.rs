use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use sqlx::PgPool;
use tracing::info;
use tracing_subscriber::EnvFilter;

use picketline_classify::{
    ClassifyParams, KeywordMarker, MissingClassifier, RelabelParams, Relabeler, ZeroShotClient,
    DEFAULT_MAX_CHARS, DEFAULT_MIN_LENGTH, DEFAULT_THRESHOLD,
};
use picketline_common::Config;
use picketline_store::PgArticleStore;

#[derive(Parser)]
#[command(name = "picketline-classify", about = "Score and label stored articles")]
struct Cli {
    /// Protest probability at or above which a record is labeled PROTEST
    #[arg(long, default_value_t = DEFAULT_THRESHOLD)]
    threshold: f64,

    /// Re-score records that already have a score
    #[arg(long)]
    force: bool,

    /// Skip articles whose trimmed text is shorter than this
    #[arg(long, default_value_t = DEFAULT_MIN_LENGTH)]
    min_length: usize,

    /// Truncate article text to this many chars before inference
    #[arg(long, default_value_t = DEFAULT_MAX_CHARS)]
    max_chars: usize,

    /// Run only the threshold relabel pass, no inference
    #[arg(long, conflicts_with = "hybrid")]
    relabel_only: bool,

    /// Relabel first, then score unscored records (the default)
    #[arg(long)]
    hybrid: bool,

    /// Print one record's stored fields before and after relabeling
    #[arg(long)]
    debug_url: Option<String>,

    /// Compute everything but write nothing
    #[arg(long)]
    dry_run: bool,

    /// Cap on scanned records per pass (0 means no cap)
    #[arg(long, default_value_t = 0)]
    limit: u64,

    /// Stamp keyword_candidate on every record instead of classifying
    #[arg(long)]
    mark_keywords: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("picketline=info".parse()?))
        .init();

    let cli = Cli::parse();
    info!(
        threshold = cli.threshold,
        force = cli.force,
        hybrid = cli.hybrid,
        relabel_only = cli.relabel_only,
        dry_run = cli.dry_run,
        "Picketline classifier starting..."
    );

    let config = if cli.relabel_only || cli.mark_keywords || cli.debug_url.is_some() {
        Config::store_from_env()
    } else {
        Config::from_env()
    };

    let pool = PgPool::connect(&config.database_url).await?;
    let store = Arc::new(PgArticleStore::new(pool));
    store.migrate().await?;

    if let Some(url) = &cli.debug_url {
        let relabeler = Relabeler::new(store);
        relabeler.debug_one(url, cli.threshold, cli.dry_run).await?;
        return Ok(());
    }

    if cli.mark_keywords {
        let marker = KeywordMarker::new(store);
        let stats = marker.run(cli.dry_run).await?;
        println!("{stats}");
        return Ok(());
    }

    let relabeler = Relabeler::new(store.clone());
    let stats = relabeler
        .run(&RelabelParams {
            threshold: cli.threshold,
            limit: cli.limit,
            dry_run: cli.dry_run,
            ..RelabelParams::default()
        })
        .await?;
    println!("{stats}");

    if cli.relabel_only {
        return Ok(());
    }

    let scorer = ZeroShotClient::new(&config.scorer_api_key, &config.scorer_model)
        .with_base_url(&config.scorer_base_url)
        .with_limits(cli.min_length, cli.max_chars);
    let classifier = MissingClassifier::new(store, Arc::new(scorer));
    let stats = classifier
        .run(&ClassifyParams {
            threshold: cli.threshold,
            limit: cli.limit,
            dry_run: cli.dry_run,
            force: cli.force,
            ..ClassifyParams::default()
        })
        .await?;
    println!("{stats}");

    Ok(())
}
