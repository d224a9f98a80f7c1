//! Correlation integrity: responses route by echoed id even when they
//! complete out of order, and abandoned requests leave no residue.

use std::sync::Arc;
use std::time::{Duration, Instant};

use jolr::IndexSpec;

use super::common::{book_blob, client_with, docs_blob, StubFetcher};

#[tokio::test]
async fn out_of_order_completion_routes_by_id() {
    // "slow" takes 250ms to load; "fast" is immediate. The slow query is
    // issued first, so its response arrives second.
    let fetcher = Arc::new(
        StubFetcher::new()
            .blob_after("slow.jolrindex", docs_blob(), Duration::from_millis(250))
            .blob("fast.jolrindex", book_blob()),
    );
    let client = client_with(Arc::clone(&fetcher)).await;
    client
        .preload(vec![
            IndexSpec::new("slow", "slow.jolrindex"),
            IndexSpec::new("fast", "fast.jolrindex"),
        ])
        .unwrap();

    let slow_query = async {
        let outcome = client.query(vec!["slow".into()], "transaction").await;
        (Instant::now(), outcome)
    };
    let fast_query = async {
        let outcome = client.query(vec!["fast".into()], "filtering").await;
        (Instant::now(), outcome)
    };
    let ((slow_done, slow_outcome), (fast_done, fast_outcome)) =
        tokio::join!(slow_query, fast_query);

    let slow_outcome = slow_outcome.unwrap();
    let fast_outcome = fast_outcome.unwrap();

    // Each response resolved its own request, not the other's.
    assert!(!slow_outcome.results.is_empty());
    assert!(slow_outcome.results.iter().all(|h| h.index_id == "slow"));
    assert!(!fast_outcome.results.is_empty());
    assert!(fast_outcome.results.iter().all(|h| h.index_id == "fast"));

    // And they really did complete out of order.
    assert!(
        fast_done < slow_done,
        "fast query should resolve while the slow one is still loading"
    );
}

#[tokio::test]
async fn abandoned_queries_do_not_poison_later_ones() {
    let fetcher = Arc::new(
        StubFetcher::new().blob_after("slow.jolrindex", docs_blob(), Duration::from_millis(200)),
    );
    let client = client_with(Arc::clone(&fetcher)).await;
    client
        .preload(vec![IndexSpec::new("slow", "slow.jolrindex")])
        .unwrap();

    // Give up on the first query long before the index finishes loading.
    // The worker will still answer it; the router must drop that stale
    // response instead of delivering it to anyone else.
    let abandoned = tokio::time::timeout(
        Duration::from_millis(20),
        client.query(vec!["slow".into()], "transaction"),
    )
    .await;
    assert!(abandoned.is_err(), "query should have been abandoned");

    let outcome = client.query(vec!["slow".into()], "transaction").await.unwrap();
    assert!(!outcome.results.is_empty());
    assert_eq!(fetcher.hits("slow.jolrindex"), 1);
}

#[tokio::test]
async fn many_interleaved_queries_all_resolve_correctly() {
    let fetcher = Arc::new(
        StubFetcher::new()
            .blob_after("slow.jolrindex", docs_blob(), Duration::from_millis(100))
            .blob("fast.jolrindex", book_blob()),
    );
    let client = Arc::new(client_with(Arc::clone(&fetcher)).await);
    client
        .preload(vec![
            IndexSpec::new("slow", "slow.jolrindex"),
            IndexSpec::new("fast", "fast.jolrindex"),
        ])
        .unwrap();

    let mut tasks = Vec::new();
    for i in 0..8 {
        let client = Arc::clone(&client);
        tasks.push(tokio::spawn(async move {
            let index = if i % 2 == 0 { "slow" } else { "fast" };
            let outcome = client
                .query(vec![index.to_string()], "transaction")
                .await
                .unwrap();
            (index, outcome)
        }));
    }

    for task in tasks {
        let (index, outcome) = task.await.unwrap();
        assert!(
            outcome.results.iter().all(|h| h.index_id == index),
            "response for {index} contained foreign hits"
        );
    }
}
