//! Behavior tests for the Document Store contract, run against the
//! in-memory implementation. The same guarantees are exercised against
//! Postgres in pg_store_test.rs.

use picketline_store::testing::{blank_record, done_record, scored_record, MemoryArticleStore};
use picketline_store::{
    ArticleStore, ClassUpdate, FetchedArticle, LabelUpdate, SeedArticle, EMPTY_TEXT,
    SCRAPE_FAILED,
};

fn seed(url: &str, title: &str) -> SeedArticle {
    SeedArticle {
        url: url.to_string(),
        media_url: None,
        paper: "The Guardian".to_string(),
        title: Some(title.to_string()),
        publish_date: Some("2024-03-01".to_string()),
    }
}

fn fetched(url: &str, text: &str) -> FetchedArticle {
    FetchedArticle {
        url: url.to_string(),
        media_url: None,
        paper: "The Guardian".to_string(),
        title: Some("March in London".to_string()),
        publish_date: Some("2024-03-01".to_string()),
        text: text.to_string(),
    }
}

// =========================================================================
// Seeding and the fetch state machine
// =========================================================================

#[tokio::test]
async fn seed_inserts_only_absent_urls() {
    let store = MemoryArticleStore::new();

    let inserted = store
        .seed(&[seed("https://example.com/a", "A"), seed("https://example.com/b", "B")])
        .await
        .unwrap();
    assert_eq!(inserted, 2);

    // Second pass with one old and one new URL inserts only the new one.
    let inserted = store
        .seed(&[seed("https://example.com/a", "A"), seed("https://example.com/c", "C")])
        .await
        .unwrap();
    assert_eq!(inserted, 1);
    assert_eq!(store.len(), 3);

    let row = store.get("https://example.com/a").await.unwrap().unwrap();
    assert_eq!(row.status, "pending");
    assert_eq!(row.title.as_deref(), Some("A"));
    assert!(row.time_enqueued.is_some());
    assert!(row.text.is_none());
}

#[tokio::test]
async fn seed_never_overwrites_existing_rows() {
    let store = MemoryArticleStore::new();
    store
        .mark_done(&fetched("https://example.com/a", "full article body"))
        .await
        .unwrap();

    let inserted = store.seed(&[seed("https://example.com/a", "A")]).await.unwrap();
    assert_eq!(inserted, 0);

    let row = store.get("https://example.com/a").await.unwrap().unwrap();
    assert_eq!(row.status, "done");
    assert_eq!(row.text.as_deref(), Some("full article body"));
}

#[tokio::test]
async fn failed_then_done_clears_the_failure_marker() {
    let store = MemoryArticleStore::new();
    let url = "https://example.com/a";

    store
        .mark_failed(url, "The Guardian", SCRAPE_FAILED)
        .await
        .unwrap();
    let row = store.get(url).await.unwrap().unwrap();
    assert_eq!(row.status, "failed");
    assert_eq!(row.error.as_deref(), Some(SCRAPE_FAILED));
    assert!(row.text.is_none());

    store.mark_done(&fetched(url, "recovered body")).await.unwrap();
    let row = store.get(url).await.unwrap().unwrap();
    assert_eq!(row.status, "done");
    assert!(row.error.is_none());
    assert_eq!(row.text.as_deref(), Some("recovered body"));
}

#[tokio::test]
async fn failure_after_done_clears_text() {
    let store = MemoryArticleStore::new();
    let url = "https://example.com/a";

    store.mark_done(&fetched(url, "body")).await.unwrap();
    store.mark_failed(url, "The Guardian", EMPTY_TEXT).await.unwrap();

    let row = store.get(url).await.unwrap().unwrap();
    assert_eq!(row.status, "failed");
    assert!(row.text.is_none(), "non-done rows must never carry text");
}

#[tokio::test]
async fn done_urls_requires_nonempty_text() {
    let store = MemoryArticleStore::new();
    store.insert(done_record("https://example.com/full", "body"));
    store.insert(done_record("https://example.com/empty", ""));
    store
        .mark_failed("https://example.com/failed", "Daily Mail", SCRAPE_FAILED)
        .await
        .unwrap();

    let done = store.done_urls().await.unwrap();
    assert_eq!(done.len(), 1);
    assert!(done.contains("https://example.com/full"));
}

#[tokio::test]
async fn status_counts_cover_all_states() {
    let store = MemoryArticleStore::new();
    store.seed(&[seed("https://example.com/p", "P")]).await.unwrap();
    store.mark_done(&fetched("https://example.com/d", "body")).await.unwrap();
    store
        .mark_failed("https://example.com/f", "Unknown", SCRAPE_FAILED)
        .await
        .unwrap();
    store
        .mark_errored("https://example.com/e", "Unknown", "boom")
        .await
        .unwrap();

    let counts = store.status_counts().await.unwrap();
    assert_eq!(counts.pending, 1);
    assert_eq!(counts.done, 1);
    assert_eq!(counts.failed, 1);
    assert_eq!(counts.error, 1);
    assert_eq!(counts.total(), 4);
}

// =========================================================================
// Cursor pages
// =========================================================================

#[tokio::test]
async fn scored_page_orders_by_url_and_honors_the_boundary() {
    let store = MemoryArticleStore::new();
    store.insert(scored_record("https://example.com/c", 0.3));
    store.insert(scored_record("https://example.com/a", 0.1));
    store.insert(scored_record("https://example.com/b", 0.2));
    store.insert(done_record("https://example.com/unscored", "body"));

    let page = store.scored_page(None, 2).await.unwrap();
    let urls: Vec<_> = page.iter().map(|r| r.url.as_str()).collect();
    assert_eq!(urls, ["https://example.com/a", "https://example.com/b"]);

    let page = store.scored_page(Some("https://example.com/b"), 2).await.unwrap();
    let urls: Vec<_> = page.iter().map(|r| r.url.as_str()).collect();
    assert_eq!(urls, ["https://example.com/c"]);

    let page = store.scored_page(Some("https://example.com/c"), 2).await.unwrap();
    assert!(page.is_empty());
}

#[tokio::test]
async fn unclassified_page_selects_missing_scores_unless_forced() {
    let store = MemoryArticleStore::new();
    store.insert(done_record("https://example.com/new", "fresh body"));
    store.insert(scored_record("https://example.com/old", 0.9));
    store.insert(done_record("https://example.com/empty", ""));

    let page = store.unclassified_page(None, 10, false).await.unwrap();
    let urls: Vec<_> = page.iter().map(|r| r.url.as_str()).collect();
    assert_eq!(urls, ["https://example.com/new"]);
    assert_eq!(store.count_unclassified(false).await.unwrap(), 1);

    let page = store.unclassified_page(None, 10, true).await.unwrap();
    assert_eq!(page.len(), 2);
    assert_eq!(store.count_unclassified(true).await.unwrap(), 2);
}

#[tokio::test]
async fn candidate_page_walks_every_row() {
    let store = MemoryArticleStore::new();
    store.insert(done_record("https://example.com/a", "body"));
    store.insert(blank_record("https://example.com/b"));

    let page = store.candidate_page(None, 10).await.unwrap();
    assert_eq!(page.len(), 2);
}

// =========================================================================
// Bulk updates
// =========================================================================

#[tokio::test]
async fn apply_labels_touches_only_the_derived_fields() {
    let store = MemoryArticleStore::new();
    store.insert(scored_record("https://example.com/a", 0.8));

    let modified = store
        .apply_labels(&[LabelUpdate {
            url: "https://example.com/a".to_string(),
            label: 1,
            label_name: "PROTEST".to_string(),
            reason: "P(PROTEST)=0.800; threshold=0.65 -> PROTEST".to_string(),
        }])
        .await
        .unwrap();
    assert_eq!(modified, 1);

    let row = store.get("https://example.com/a").await.unwrap().unwrap();
    assert_eq!(row.label, Some(1));
    assert_eq!(row.label_name.as_deref(), Some("PROTEST"));
    assert_eq!(row.score, Some(0.8), "relabel must never touch the score");
}

#[tokio::test]
async fn apply_labels_skips_unknown_urls() {
    let store = MemoryArticleStore::new();
    let modified = store
        .apply_labels(&[LabelUpdate {
            url: "https://example.com/missing".to_string(),
            label: 0,
            label_name: "NOT PROTEST".to_string(),
            reason: "x".to_string(),
        }])
        .await
        .unwrap();
    assert_eq!(modified, 0);
}

#[tokio::test]
async fn apply_classifications_writes_each_variant() {
    let store = MemoryArticleStore::new();
    store.insert(done_record("https://example.com/ok", "long body"));
    store.insert(done_record("https://example.com/short", "tiny"));
    store.insert(done_record("https://example.com/bad", "body"));

    let modified = store
        .apply_classifications(&[
            ClassUpdate::Scored {
                url: "https://example.com/ok".to_string(),
                score: 0.91,
                label: 1,
                label_name: "PROTEST".to_string(),
                top_label: "a concrete real-world protest event".to_string(),
                top_score: 0.91,
                model: "facebook/bart-large-mnli".to_string(),
                reason: "Top='a concrete real-world protest event' (0.910); P(PROTEST)=0.910; threshold=0.65 -> PROTEST".to_string(),
            },
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
    assert_eq!(modified, 3);

    let ok = store.get("https://example.com/ok").await.unwrap().unwrap();
    assert_eq!(ok.score, Some(0.91));
    assert_eq!(ok.label, Some(1));
    assert_eq!(ok.class_status.as_deref(), Some("ok"));
    assert!(ok.class_error.is_none());

    let short = store.get("https://example.com/short").await.unwrap().unwrap();
    assert!(short.score.is_none());
    assert_eq!(short.class_status.as_deref(), Some("skipped_short_text"));

    let bad = store.get("https://example.com/bad").await.unwrap().unwrap();
    assert_eq!(bad.class_status.as_deref(), Some("error"));
    assert_eq!(bad.class_error.as_deref(), Some("scorer endpoint returned 503"));
}

#[tokio::test]
async fn eval_samples_require_label_and_score() {
    let store = MemoryArticleStore::new();

    let mut gold = scored_record("https://example.com/gold", 0.7);
    gold.human_label = Some(1);
    store.insert(gold);

    let mut unlabeled = scored_record("https://example.com/unlabeled", 0.4);
    unlabeled.human_label = None;
    store.insert(unlabeled);

    let mut unscored = blank_record("https://example.com/unscored");
    unscored.human_label = Some(0);
    store.insert(unscored);

    let samples = store.eval_samples().await.unwrap();
    assert_eq!(samples.len(), 1);
    assert_eq!(samples[0].human_label, 1);
    assert_eq!(samples[0].score, 0.7);
}
