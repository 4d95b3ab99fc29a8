//! Integration tests for PgArticleStore.
//! Requires a Postgres instance. Set DATABASE_TEST_URL or these tests are skipped.

use picketline_store::{
    ArticleStore, ClassUpdate, FetchedArticle, LabelUpdate, PgArticleStore, SeedArticle,
    SCRAPE_FAILED,
};
use sqlx::PgPool;

/// Get a migrated test store, or skip if no test DB is available.
async fn test_store() -> Option<PgArticleStore> {
    let url = std::env::var("DATABASE_TEST_URL").ok()?;
    let pool = PgPool::connect(&url).await.ok()?;
    let store = PgArticleStore::new(pool.clone());
    store.migrate().await.ok()?;

    // Clean slate for each test
    sqlx::query("TRUNCATE articles")
        .execute(&pool)
        .await
        .ok()?;

    Some(store)
}

fn seed(url: &str) -> SeedArticle {
    SeedArticle {
        url: url.to_string(),
        media_url: Some(format!("{url}?ito=rss")),
        paper: "Daily Mail".to_string(),
        title: Some("Rally planned".to_string()),
        publish_date: Some("2024-03-01".to_string()),
    }
}

fn fetched(url: &str, text: &str) -> FetchedArticle {
    FetchedArticle {
        url: url.to_string(),
        media_url: None,
        paper: "Daily Mail".to_string(),
        title: Some("Rally held".to_string()),
        publish_date: Some("2024-03-01".to_string()),
        text: text.to_string(),
    }
}

#[tokio::test]
async fn seed_is_insert_if_absent() {
    let Some(store) = test_store().await else {
        return;
    };

    let inserted = store
        .seed(&[seed("https://example.com/a"), seed("https://example.com/b")])
        .await
        .unwrap();
    assert_eq!(inserted, 2);

    // Reseeding the same URLs leaves rows untouched.
    store.mark_done(&fetched("https://example.com/a", "body")).await.unwrap();
    let inserted = store.seed(&[seed("https://example.com/a")]).await.unwrap();
    assert_eq!(inserted, 0);

    let row = store.get("https://example.com/a").await.unwrap().unwrap();
    assert_eq!(row.status, "done");
    assert_eq!(row.text.as_deref(), Some("body"));
    assert_eq!(row.title.as_deref(), Some("Rally held"));
}

#[tokio::test]
async fn fetch_outcomes_round_trip() {
    let Some(store) = test_store().await else {
        return;
    };

    store.mark_done(&fetched("https://example.com/done", "body")).await.unwrap();
    store
        .mark_failed("https://example.com/failed", "Daily Mail", SCRAPE_FAILED)
        .await
        .unwrap();
    store
        .mark_errored("https://example.com/error", "Daily Mail", "pool timed out")
        .await
        .unwrap();

    let counts = store.status_counts().await.unwrap();
    assert_eq!(counts.done, 1);
    assert_eq!(counts.failed, 1);
    assert_eq!(counts.error, 1);
    assert_eq!(counts.pending, 0);

    let failed = store.get("https://example.com/failed").await.unwrap().unwrap();
    assert_eq!(failed.error.as_deref(), Some(SCRAPE_FAILED));
    assert!(failed.text.is_none());
    assert!(failed.time_scraped.is_some());

    // Only the done row with text enters the dedup set.
    let done = store.done_urls().await.unwrap();
    assert_eq!(done.len(), 1);
    assert!(done.contains("https://example.com/done"));
}

#[tokio::test]
async fn retry_after_failure_clears_the_marker() {
    let Some(store) = test_store().await else {
        return;
    };
    let url = "https://example.com/a";

    store.mark_failed(url, "Daily Mail", SCRAPE_FAILED).await.unwrap();
    store.mark_done(&fetched(url, "recovered")).await.unwrap();

    let row = store.get(url).await.unwrap().unwrap();
    assert_eq!(row.status, "done");
    assert!(row.error.is_none());
    assert_eq!(row.text.as_deref(), Some("recovered"));
}

#[tokio::test]
async fn scored_page_walks_in_url_order() {
    let Some(store) = test_store().await else {
        return;
    };

    for (url, score) in [
        ("https://example.com/c", 0.3),
        ("https://example.com/a", 0.1),
        ("https://example.com/b", 0.2),
    ] {
        store.mark_done(&fetched(url, "body")).await.unwrap();
        store
            .apply_classifications(&[ClassUpdate::Scored {
                url: url.to_string(),
                score,
                label: 0,
                label_name: "NOT PROTEST".to_string(),
                top_label: "something else (no specific protest event)".to_string(),
                top_score: 1.0 - score,
                model: "facebook/bart-large-mnli".to_string(),
                reason: "seeded by test".to_string(),
            }])
            .await
            .unwrap();
    }

    assert_eq!(store.count_scored().await.unwrap(), 3);

    let page = store.scored_page(None, 2).await.unwrap();
    let urls: Vec<_> = page.iter().map(|r| r.url.as_str()).collect();
    assert_eq!(urls, ["https://example.com/a", "https://example.com/b"]);
    assert_eq!(page[0].score, 0.1);

    let page = store.scored_page(Some("https://example.com/b"), 2).await.unwrap();
    let urls: Vec<_> = page.iter().map(|r| r.url.as_str()).collect();
    assert_eq!(urls, ["https://example.com/c"]);
}

#[tokio::test]
async fn unclassified_page_respects_force() {
    let Some(store) = test_store().await else {
        return;
    };

    store.mark_done(&fetched("https://example.com/new", "fresh")).await.unwrap();
    store.mark_done(&fetched("https://example.com/old", "stale")).await.unwrap();
    store
        .apply_classifications(&[ClassUpdate::Scored {
            url: "https://example.com/old".to_string(),
            score: 0.9,
            label: 1,
            label_name: "PROTEST".to_string(),
            top_label: "a concrete real-world protest event".to_string(),
            top_score: 0.9,
            model: "facebook/bart-large-mnli".to_string(),
            reason: "seeded by test".to_string(),
        }])
        .await
        .unwrap();

    assert_eq!(store.count_unclassified(false).await.unwrap(), 1);
    let page = store.unclassified_page(None, 10, false).await.unwrap();
    assert_eq!(page.len(), 1);
    assert_eq!(page[0].url, "https://example.com/new");
    assert_eq!(page[0].text, "fresh");

    assert_eq!(store.count_unclassified(true).await.unwrap(), 2);
    let page = store.unclassified_page(None, 10, true).await.unwrap();
    assert_eq!(page.len(), 2);
}

#[tokio::test]
async fn bulk_updates_report_modified_rows() {
    let Some(store) = test_store().await else {
        return;
    };

    store.mark_done(&fetched("https://example.com/a", "body")).await.unwrap();
    store
        .apply_classifications(&[ClassUpdate::Scored {
            url: "https://example.com/a".to_string(),
            score: 0.7,
            label: 1,
            label_name: "PROTEST".to_string(),
            top_label: "a concrete real-world protest event".to_string(),
            top_score: 0.7,
            model: "facebook/bart-large-mnli".to_string(),
            reason: "seeded by test".to_string(),
        }])
        .await
        .unwrap();

    // Relabel touches only the derived fields and skips unknown URLs.
    let modified = store
        .apply_labels(&[
            LabelUpdate {
                url: "https://example.com/a".to_string(),
                label: 0,
                label_name: "NOT PROTEST".to_string(),
                reason: "P(PROTEST)=0.700; threshold=0.80 -> NOT PROTEST".to_string(),
            },
            LabelUpdate {
                url: "https://example.com/missing".to_string(),
                label: 0,
                label_name: "NOT PROTEST".to_string(),
                reason: "never stored".to_string(),
            },
        ])
        .await
        .unwrap();
    assert_eq!(modified, 1);

    let row = store.get("https://example.com/a").await.unwrap().unwrap();
    assert_eq!(row.label, Some(0));
    assert_eq!(row.label_name.as_deref(), Some("NOT PROTEST"));
    assert_eq!(row.score, Some(0.7));
    assert_eq!(row.class_status.as_deref(), Some("ok"));
}

#[tokio::test]
async fn skip_and_error_classifications_persist() {
    let Some(store) = test_store().await else {
        return;
    };

    store.mark_done(&fetched("https://example.com/short", "tiny")).await.unwrap();
    store.mark_done(&fetched("https://example.com/bad", "body")).await.unwrap();

    store
        .apply_classifications(&[
            ClassUpdate::Skipped {
                url: "https://example.com/short".to_string(),
                reason: "Skipped: text shorter than min_length=200".to_string(),
            },
            ClassUpdate::Errored {
                url: "https://example.com/bad".to_string(),
                message: "scorer endpoint returned 503".to_string(),
            },
        ])
        .await
        .unwrap();

    let short = store.get("https://example.com/short").await.unwrap().unwrap();
    assert_eq!(short.class_status.as_deref(), Some("skipped_short_text"));
    assert!(short.score.is_none());

    let bad = store.get("https://example.com/bad").await.unwrap().unwrap();
    assert_eq!(bad.class_status.as_deref(), Some("error"));
    assert_eq!(bad.class_error.as_deref(), Some("scorer endpoint returned 503"));
}
