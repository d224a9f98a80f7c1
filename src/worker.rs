// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! The search worker: an actor owning every loaded index.
//!
//! One dedicated OS thread runs a single-threaded tokio runtime with a
//! `LocalSet` — cooperative run-to-completion scheduling, so the index
//! cache needs no locks: nothing else can observe it between awaits.
//!
//! Lifecycle:
//!
//! ```text
//!  spawn ──▶ announce Loaded ──▶ ┌───────────────────────────────┐
//!                                │ recv Preload → start loads    │
//!                                │ recv Query   → spawn task:    │◀─┐
//!                                │   await loads, search, merge, │  │ loop until the
//!                                │   send exactly one response   │──┘ host hangs up
//!                                └───────────────────────────────┘
//! ```
//!
//! Requests are dequeued in the order the host sent them, but query tasks
//! complete whenever their index loads do — responses may come back out of
//! order, and correlation is solely by the echoed request id. There is no
//! cancellation: a superseded query still runs to completion and the host
//! discards the late response.
//!
//! Every failure inside a query task is converted to a correlated
//! `error` response at this boundary. Nothing unwinds across the loop; a
//! query that found no matches is a successful response with an empty
//! result list, not an error.

use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::aggregate;
use crate::error::{Error, Result};
use crate::loader::{BlobFetcher, HttpFetcher, IndexCache};
use crate::types::{default_field_weights, FieldWeights, IndexSpec, SearchOutcome};

// =============================================================================
// PROTOCOL MESSAGES
// =============================================================================

/// Host → worker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Request {
    /// Start loading the named indexes. No response; load failures surface
    /// on the first query that touches the index.
    Preload { indexes: Vec<IndexSpec> },
    /// Search `query` across `index_ids`. Answered by exactly one
    /// [`Response::Query`] or [`Response::Error`] echoing `id`.
    Query {
        id: u64,
        #[serde(rename = "indexIds")]
        index_ids: Vec<String>,
        query: String,
    },
}

/// Worker → host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Response {
    /// Emitted exactly once, before any request is processed.
    Loaded,
    Query { id: u64, result: SearchOutcome },
    Error { id: u64, error: String },
}

// =============================================================================
// WORKER
// =============================================================================

/// Worker-level settings.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Weight table for index specs that don't carry their own.
    pub default_weights: FieldWeights,
    /// End-to-end timeout for one blob fetch.
    pub fetch_timeout: Duration,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        WorkerConfig {
            default_weights: default_field_weights(),
            fetch_timeout: Duration::from_secs(30),
        }
    }
}

/// Spawn the worker thread with the production fetcher.
pub(crate) fn spawn_worker(
    config: WorkerConfig,
) -> Result<(mpsc::UnboundedSender<Request>, mpsc::UnboundedReceiver<Response>)> {
    let fetcher: Arc<dyn BlobFetcher> = Arc::new(HttpFetcher::new(config.fetch_timeout)?);
    spawn_worker_with_fetcher(config, fetcher)
}

/// Spawn the worker thread with a caller-supplied fetcher (tests inject
/// deterministic in-memory sources here).
pub(crate) fn spawn_worker_with_fetcher(
    config: WorkerConfig,
    fetcher: Arc<dyn BlobFetcher>,
) -> Result<(mpsc::UnboundedSender<Request>, mpsc::UnboundedReceiver<Response>)> {
    let (request_tx, request_rx) = mpsc::unbounded_channel();
    let (response_tx, response_rx) = mpsc::unbounded_channel();

    std::thread::Builder::new()
        .name("jolr-search-worker".into())
        .spawn(move || {
            let runtime = match tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
            {
                Ok(runtime) => runtime,
                Err(error) => {
                    tracing::error!(%error, "failed to build search worker runtime");
                    return;
                }
            };

            let local = tokio::task::LocalSet::new();
            local.block_on(&runtime, run_worker(config, fetcher, request_rx, response_tx));
        })
        .map_err(Error::WorkerSpawn)?;

    Ok((request_tx, response_rx))
}

async fn run_worker(
    config: WorkerConfig,
    fetcher: Arc<dyn BlobFetcher>,
    mut inbox: mpsc::UnboundedReceiver<Request>,
    outbox: mpsc::UnboundedSender<Response>,
) {
    // Announce readiness before touching the inbox; the host blocks its
    // first request on this.
    let _ = outbox.send(Response::Loaded);

    let cache = Rc::new(IndexCache::new(fetcher, config.default_weights));

    while let Some(request) = inbox.recv().await {
        match request {
            Request::Preload { indexes } => {
                for spec in indexes {
                    if let Some(load) = cache.begin_load(spec) {
                        // Drive the load eagerly so it overlaps with the
                        // user still typing, not with their first query.
                        tokio::task::spawn_local(async move {
                            let _ = load.await;
                        });
                    }
                }
            }
            Request::Query { id, index_ids, query } => {
                let cache = Rc::clone(&cache);
                let outbox = outbox.clone();
                tokio::task::spawn_local(async move {
                    let response =
                        match aggregate::query_indexes(&cache, &index_ids, &query).await {
                            Ok(result) => Response::Query { id, result },
                            Err(error) => {
                                tracing::debug!(id, %error, "query failed");
                                Response::Error {
                                    id,
                                    error: error.to_string(),
                                }
                            }
                        };
                    // A send failure means the host hung up; the worker
                    // loop will notice on the next recv.
                    let _ = outbox.send(response);
                });
            }
        }
    }

    tracing::debug!("request channel closed; search worker shutting down");
}
