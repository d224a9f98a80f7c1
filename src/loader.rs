// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Index loading: fetch a blob, decode it, cache the result by id.
//!
//! The cache is owned by the worker actor and lives exactly as long as it
//! does — there is no process-global state, so tests can spin up as many
//! isolated workers as they like.
//!
//! Each index id gets one slot holding a *shared* load future: the first
//! `begin_load` for an id creates it, every query that names the id awaits
//! a clone of it, and repeat preloads are no-ops. A failed load stays in
//! its slot and replays the same error to every later query — reload is a
//! worker-lifetime decision, not a per-query retry.
//!
//! Fetching goes through [`BlobFetcher`] so tests can substitute in-memory
//! sources with controlled latency and failure modes. The production
//! fetcher resolves `http(s)://` paths over the network and anything else
//! through the filesystem.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::future::{LocalBoxFuture, Shared};
use futures::FutureExt;

use crate::blob::IndexBlob;
use crate::error::{Error, Result};
use crate::index::Index;
use crate::types::{FieldWeights, IndexSpec};

/// Source of raw blob bytes.
#[async_trait]
pub trait BlobFetcher: Send + Sync {
    async fn fetch(&self, path: &str) -> Result<Vec<u8>>;
}

/// Fetches blobs over HTTP(S), or from the filesystem for bare paths.
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(Error::HttpClient)?;
        Ok(HttpFetcher { client })
    }
}

#[async_trait]
impl BlobFetcher for HttpFetcher {
    async fn fetch(&self, path: &str) -> Result<Vec<u8>> {
        if path.starts_with("http://") || path.starts_with("https://") {
            let response = self.client.get(path).send().await.map_err(|source| Error::Fetch {
                path: path.to_string(),
                source,
            })?;

            let status = response.status();
            if !status.is_success() {
                return Err(Error::FetchStatus {
                    path: path.to_string(),
                    status: status.as_u16(),
                });
            }

            let bytes = response.bytes().await.map_err(|source| Error::Fetch {
                path: path.to_string(),
                source,
            })?;
            Ok(bytes.to_vec())
        } else {
            tokio::fs::read(path).await.map_err(|source| Error::Read {
                path: path.to_string(),
                source,
            })
        }
    }
}

/// A load in flight (or finished): clones poll the same underlying future.
///
/// `Rc`/`Arc` in the output keep both arms cheaply cloneable for fan-out to
/// every query awaiting the index.
pub(crate) type SharedLoad =
    Shared<LocalBoxFuture<'static, std::result::Result<Rc<Index>, Arc<Error>>>>;

/// Worker-owned, id-keyed cache of index loads.
pub(crate) struct IndexCache {
    fetcher: Arc<dyn BlobFetcher>,
    default_weights: FieldWeights,
    slots: RefCell<HashMap<String, SharedLoad>>,
}

impl IndexCache {
    pub(crate) fn new(fetcher: Arc<dyn BlobFetcher>, default_weights: FieldWeights) -> Self {
        IndexCache {
            fetcher,
            default_weights,
            slots: RefCell::new(HashMap::new()),
        }
    }

    /// Create the load future for `spec` unless its id already has one.
    ///
    /// Returns the future only on first registration so the caller can
    /// drive it eagerly; repeat calls are no-ops regardless of the path or
    /// weights they carry.
    pub(crate) fn begin_load(&self, spec: IndexSpec) -> Option<SharedLoad> {
        let mut slots = self.slots.borrow_mut();
        if slots.contains_key(&spec.id) {
            tracing::debug!(index = %spec.id, "index already loading; preload ignored");
            return None;
        }

        let fetcher = Arc::clone(&self.fetcher);
        let weights = spec.weights.unwrap_or_else(|| self.default_weights.clone());
        let IndexSpec { id, path, .. } = spec;

        tracing::debug!(index = %id, %path, "loading index");
        let load_id = id.clone();
        let load = async move {
            let bytes = fetcher.fetch(&path).await.map_err(Error::into_shared)?;
            let blob = IndexBlob::from_slice(&load_id, &bytes).map_err(Error::into_shared)?;
            let index =
                Index::from_blob(&load_id, &blob, &weights).map_err(Error::into_shared)?;
            tracing::debug!(
                index = %load_id,
                docs = index.doc_count(),
                terms = index.term_count(),
                "index loaded"
            );
            Ok(Rc::new(index))
        }
        .boxed_local()
        .shared();

        slots.insert(id, load.clone());
        Some(load)
    }

    /// The load slot for `id`. Never fetches: an id that was never
    /// preloaded is a correlated error, not a lazy load.
    pub(crate) fn lookup(&self, id: &str) -> Result<SharedLoad> {
        self.slots
            .borrow()
            .get(id)
            .cloned()
            .ok_or_else(|| Error::UnknownIndex(id.to_string()))
    }
}
