//! Multi-index aggregation through the worker: global ordering, hash
//! composition, all-or-nothing failure.

use std::sync::Arc;

use jolr::{Error, IndexSpec};

use super::common::{book_blob, client_with, docs_blob, StubFetcher};

async fn two_index_client() -> jolr::SearchClient {
    let fetcher = Arc::new(
        StubFetcher::new()
            .blob("docs.jolrindex", docs_blob())
            .blob("book.jolrindex", book_blob()),
    );
    let client = client_with(fetcher).await;
    client
        .preload(vec![
            IndexSpec::new("docs", "docs.jolrindex"),
            IndexSpec::new("book", "book.jolrindex"),
        ])
        .unwrap();
    client
}

#[tokio::test]
async fn merged_results_sort_globally_by_score() {
    let client = two_index_client().await;
    let merged = client
        .query(vec!["docs".into(), "book".into()], "transaction")
        .await
        .unwrap();

    assert!(merged.results.iter().any(|h| h.index_id == "docs"));
    assert!(merged.results.iter().any(|h| h.index_id == "book"));
    for pair in merged.results.windows(2) {
        assert!(
            pair[0].score >= pair[1].score,
            "not globally sorted: {} before {}",
            pair[0].score,
            pair[1].score
        );
    }
}

#[tokio::test]
async fn combined_hash_joins_per_index_hashes_in_request_order() {
    let client = two_index_client().await;

    let docs_only = client.query(vec!["docs".into()], "transaction").await.unwrap();
    let book_only = client.query(vec!["book".into()], "transaction").await.unwrap();
    let merged = client
        .query(vec!["docs".into(), "book".into()], "transaction")
        .await
        .unwrap();

    assert_eq!(merged.hash, format!("{}_{}", docs_only.hash, book_only.hash));
    assert_eq!(
        merged.results.len(),
        docs_only.results.len() + book_only.results.len()
    );
    // The token list is shared — the same query went to every index.
    assert_eq!(merged.query, docs_only.query);

    let reversed = client
        .query(vec!["book".into(), "docs".into()], "transaction")
        .await
        .unwrap();
    assert_eq!(reversed.hash, format!("{}_{}", book_only.hash, docs_only.hash));
}

#[tokio::test]
async fn one_failing_index_fails_the_whole_query() {
    let fetcher = Arc::new(
        StubFetcher::new()
            .blob("docs.jolrindex", docs_blob())
            .failing("broken.jolrindex"),
    );
    let client = client_with(Arc::clone(&fetcher)).await;
    client
        .preload(vec![
            IndexSpec::new("docs", "docs.jolrindex"),
            IndexSpec::new("broken", "broken.jolrindex"),
        ])
        .unwrap();

    let err = client
        .query(vec!["docs".into(), "broken".into()], "transaction")
        .await
        .unwrap_err();
    assert!(
        matches!(err, Error::Worker(ref message) if message.contains("broken.jolrindex")),
        "no partial results: the whole query fails, got {err:?}"
    );

    // The healthy index is untouched by its neighbor's failure.
    let outcome = client.query(vec!["docs".into()], "transaction").await.unwrap();
    assert!(!outcome.results.is_empty());
}
