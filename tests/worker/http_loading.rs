//! Loading blobs through the production HTTP fetcher.

use httpmock::prelude::*;
use jolr::{Error, IndexSpec, SearchClient};

use super::common::{docs_blob, test_config};

#[tokio::test]
async fn loads_blobs_over_http() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET).path("/docsearch.jolrindex");
            then.status(200).body(docs_blob());
        })
        .await;

    let client = SearchClient::spawn(test_config()).await.unwrap();
    client
        .preload(vec![IndexSpec::new("docs", server.url("/docsearch.jolrindex"))])
        .unwrap();

    let outcome = client.query(vec!["docs".into()], "savepoint").await.unwrap();
    assert!(!outcome.results.is_empty());
    assert_eq!(outcome.results[0].doc.relname(), Some("savepoints"));

    // Repeat queries reuse the cached index: still exactly one fetch.
    let _ = client.query(vec!["docs".into()], "transaction").await.unwrap();
    assert_eq!(mock.hits_async().await, 1);
}

#[tokio::test]
async fn http_error_status_is_a_correlated_error() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/missing.jolrindex");
            then.status(404);
        })
        .await;

    let client = SearchClient::spawn(test_config()).await.unwrap();
    client
        .preload(vec![IndexSpec::new("docs", server.url("/missing.jolrindex"))])
        .unwrap();

    let err = client.query(vec!["docs".into()], "select").await.unwrap_err();
    assert!(
        matches!(err, Error::Worker(ref message) if message.contains("HTTP 404")),
        "got {err:?}"
    );
}

#[tokio::test]
async fn filesystem_paths_load_without_a_server() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("docsearch.jolrindex");
    std::fs::write(&path, docs_blob()).unwrap();

    let client = SearchClient::spawn(test_config()).await.unwrap();
    client
        .preload(vec![IndexSpec::new("docs", path.to_string_lossy())])
        .unwrap();

    let outcome = client.query(vec!["docs".into()], "rollback").await.unwrap();
    assert!(!outcome.results.is_empty());
}
