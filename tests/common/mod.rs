//! Shared test utilities and fixtures.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use jolr::{BlobFetcher, Error, IndexSpec, Result, SearchClient, WorkerConfig};

// Re-export canonical fixtures from jolr::testing
pub use jolr::testing::{blob_bytes_from_docs, doc, fixture_weights, small_corpus, DocFixture};

// ============================================================================
// STUB FETCHER
// ============================================================================

enum Route {
    Blob { bytes: Vec<u8>, delay: Duration },
    Fail,
}

/// Deterministic in-memory blob source with per-path latency, failure
/// injection and hit counting.
pub struct StubFetcher {
    routes: HashMap<String, Route>,
    hits: Mutex<HashMap<String, usize>>,
}

impl StubFetcher {
    pub fn new() -> Self {
        StubFetcher {
            routes: HashMap::new(),
            hits: Mutex::new(HashMap::new()),
        }
    }

    pub fn blob(self, path: &str, bytes: Vec<u8>) -> Self {
        self.blob_after(path, bytes, Duration::ZERO)
    }

    pub fn blob_after(mut self, path: &str, bytes: Vec<u8>, delay: Duration) -> Self {
        self.routes.insert(path.to_string(), Route::Blob { bytes, delay });
        self
    }

    pub fn failing(mut self, path: &str) -> Self {
        self.routes.insert(path.to_string(), Route::Fail);
        self
    }

    /// How many times `path` was fetched.
    pub fn hits(&self, path: &str) -> usize {
        *self.hits.lock().unwrap().get(path).unwrap_or(&0)
    }
}

#[async_trait]
impl BlobFetcher for StubFetcher {
    async fn fetch(&self, path: &str) -> Result<Vec<u8>> {
        *self.hits.lock().unwrap().entry(path.to_string()).or_insert(0) += 1;

        match self.routes.get(path) {
            Some(Route::Blob { bytes, delay }) => {
                if !delay.is_zero() {
                    tokio::time::sleep(*delay).await;
                }
                Ok(bytes.clone())
            }
            Some(Route::Fail) => Err(Error::FetchStatus {
                path: path.to_string(),
                status: 500,
            }),
            None => Err(Error::FetchStatus {
                path: path.to_string(),
                status: 404,
            }),
        }
    }
}

// ============================================================================
// CORPORA
// ============================================================================

/// The four-document docs corpus from `jolr::testing`, serialized.
pub fn docs_blob() -> Vec<u8> {
    blob_bytes_from_docs(&small_corpus())
}

/// A second, smaller corpus standing in for the book index.
pub fn book_blob() -> Vec<u8> {
    blob_bytes_from_docs(&[
        doc(&[
            ("relname", "chapter1"),
            ("title", "Starting out"),
            ("content", "a transaction walks into a database"),
        ])
        .boost(2.0),
        doc(&[
            ("relname", "chapter2"),
            ("title", "Filtering"),
            ("content", "filtering and ordering query results"),
        ]),
    ])
}

// ============================================================================
// CLIENT HELPERS
// ============================================================================

/// Worker config whose default weight table matches the fixture schema.
pub fn test_config() -> WorkerConfig {
    WorkerConfig {
        default_weights: fixture_weights(),
        ..Default::default()
    }
}

/// Spawn a client over a stub fetcher.
pub async fn client_with(fetcher: Arc<StubFetcher>) -> SearchClient {
    SearchClient::spawn_with_fetcher(test_config(), fetcher)
        .await
        .expect("search worker spawns")
}

/// One preloaded "docs" index over the standard corpus.
pub async fn docs_client() -> (SearchClient, Arc<StubFetcher>) {
    let fetcher = Arc::new(StubFetcher::new().blob("docs.jolrindex", docs_blob()));
    let client = client_with(Arc::clone(&fetcher)).await;
    client
        .preload(vec![IndexSpec::new("docs", "docs.jolrindex")])
        .expect("preload request sends");
    (client, fetcher)
}
