// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Host-side handle to the search worker.
//!
//! `SearchClient` spawns the worker thread, performs the `loaded`
//! handshake, and then routes responses through an explicit pending-request
//! table: correlation id → oneshot completion handle. The table is the
//! entire staleness story —
//!
//! - a response whose id is still pending resolves exactly that caller;
//! - a response whose id is unknown (the caller gave up and dropped its
//!   future, or already got its answer) is logged and dropped, never
//!   surfaced as someone else's result;
//! - when the worker disappears, every pending caller fails with
//!   [`Error::WorkerClosed`] instead of hanging forever.
//!
//! Correlation ids are assigned from an atomic counter starting at 1, so
//! concurrent callers can share one client behind an `Arc`.
//!
//! Must be created and used inside a tokio runtime: the response router is
//! a spawned task.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::{mpsc, oneshot};

use crate::error::{Error, Result};
use crate::loader::BlobFetcher;
use crate::types::{IndexSpec, SearchOutcome};
use crate::worker::{spawn_worker, spawn_worker_with_fetcher, Request, Response, WorkerConfig};

type PendingTable = Arc<Mutex<HashMap<u64, oneshot::Sender<Result<SearchOutcome>>>>>;

/// Async handle to a spawned search worker.
pub struct SearchClient {
    requests: mpsc::UnboundedSender<Request>,
    pending: PendingTable,
    next_id: AtomicU64,
}

impl SearchClient {
    /// Spawn a worker with the production fetcher and wait until it is
    /// ready to accept requests.
    pub async fn spawn(config: WorkerConfig) -> Result<Self> {
        Self::connect(spawn_worker(config)?).await
    }

    /// Spawn a worker with a custom blob fetcher.
    pub async fn spawn_with_fetcher(
        config: WorkerConfig,
        fetcher: Arc<dyn BlobFetcher>,
    ) -> Result<Self> {
        Self::connect(spawn_worker_with_fetcher(config, fetcher)?).await
    }

    async fn connect(
        channels: (
            mpsc::UnboundedSender<Request>,
            mpsc::UnboundedReceiver<Response>,
        ),
    ) -> Result<Self> {
        let (requests, mut responses) = channels;

        match responses.recv().await {
            Some(Response::Loaded) => {}
            _ => return Err(Error::WorkerClosed),
        }

        let pending: PendingTable = Arc::new(Mutex::new(HashMap::new()));
        tokio::spawn(route_responses(responses, Arc::clone(&pending)));

        Ok(SearchClient {
            requests,
            pending,
            next_id: AtomicU64::new(0),
        })
    }

    /// Ask the worker to start loading `indexes`. Fire-and-forget: load
    /// failures surface on the first query naming the index.
    pub fn preload(&self, indexes: Vec<IndexSpec>) -> Result<()> {
        self.requests
            .send(Request::Preload { indexes })
            .map_err(|_| Error::WorkerClosed)
    }

    /// Search `query` across `index_ids`, resolving when the worker's
    /// correlated response arrives.
    ///
    /// Dropping the returned future abandons the request: the worker still
    /// answers, and the router discards the orphaned response by id.
    pub async fn query(
        &self,
        index_ids: Vec<String>,
        query: impl Into<String>,
    ) -> Result<SearchOutcome> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        let (resolve_tx, resolve_rx) = oneshot::channel();
        self.pending.lock().insert(id, resolve_tx);

        let sent = self.requests.send(Request::Query {
            id,
            index_ids,
            query: query.into(),
        });
        if sent.is_err() {
            self.pending.lock().remove(&id);
            return Err(Error::WorkerClosed);
        }

        match resolve_rx.await {
            Ok(outcome) => outcome,
            // Router dropped our sender without resolving: worker is gone.
            Err(_) => Err(Error::WorkerClosed),
        }
    }
}

async fn route_responses(mut responses: mpsc::UnboundedReceiver<Response>, pending: PendingTable) {
    while let Some(response) = responses.recv().await {
        match response {
            Response::Loaded => {
                tracing::warn!("duplicate loaded signal from search worker");
            }
            Response::Query { id, result } => resolve(&pending, id, Ok(result)),
            Response::Error { id, error } => resolve(&pending, id, Err(Error::Worker(error))),
        }
    }

    // Channel closed: the worker is gone. Fail everything still pending so
    // no caller waits forever on a response that cannot come.
    let mut table = pending.lock();
    for (_, resolve_tx) in table.drain() {
        let _ = resolve_tx.send(Err(Error::WorkerClosed));
    }
}

fn resolve(pending: &PendingTable, id: u64, outcome: Result<SearchOutcome>) {
    match pending.lock().remove(&id) {
        // The caller may have dropped its future; a failed send is fine.
        Some(resolve_tx) => {
            let _ = resolve_tx.send(outcome);
        }
        None => tracing::debug!(id, "dropping stale search response"),
    }
}
