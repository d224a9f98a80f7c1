// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Error taxonomy for the whole crate.
//!
//! Everything that can go wrong is one of three families:
//!
//! - **Load errors**: the blob couldn't be fetched or decoded. These are
//!   cached alongside the index slot, so every query naming the index keeps
//!   seeing the same failure until the worker is torn down. No retries.
//! - **Programmer errors**: querying an index that was never preloaded, an
//!   empty index set, an unknown field in a weight table. Fail fast with a
//!   descriptive message instead of returning empty results.
//! - **Lifecycle errors**: the worker thread or its channels are gone.
//!
//! At the worker message boundary every variant collapses into an
//! `{type: "error", id, error}` response via `to_string()`; nothing is
//! allowed to unwind across the worker loop.

use std::sync::Arc;

use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// The HTTP client itself couldn't be constructed (TLS backend init).
    #[error("failed to construct HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),

    /// Network failure while fetching an index blob.
    #[error("failed to fetch index blob from \"{path}\": {source}")]
    Fetch {
        path: String,
        #[source]
        source: reqwest::Error,
    },

    /// The blob URL answered with a non-success HTTP status.
    #[error("fetching index blob from \"{path}\" returned HTTP {status}")]
    FetchStatus { path: String, status: u16 },

    /// Filesystem failure while reading a blob from a local path.
    #[error("failed to read index blob from \"{path}\": {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The blob bytes are not the JSON shape the builder emits.
    #[error("malformed index blob for \"{id}\": {source}")]
    Decode {
        id: String,
        #[source]
        source: serde_json::Error,
    },

    /// The blob decoded but its content is inconsistent (bad enum ordinal,
    /// posting triplet referencing a missing field, truncated document row).
    #[error("invalid index blob for \"{id}\": {reason}")]
    InvalidBlob { id: String, reason: String },

    /// A weight table names a field the index doesn't declare.
    #[error("unknown field \"{field}\" in weight table for index \"{id}\"")]
    UnknownWeightField { id: String, field: String },

    /// Querying an index id that was never preloaded.
    #[error("no index loaded for \"{0}\"")]
    UnknownIndex(String),

    /// A query named no indexes at all.
    #[error("query names no indexes")]
    EmptyIndexSet,

    /// A document is missing a field the builder declared `required`.
    #[error("document {doc} is missing required field \"{field}\"")]
    MissingField { doc: usize, field: String },

    /// The worker thread couldn't be spawned.
    #[error("failed to spawn search worker thread: {0}")]
    WorkerSpawn(#[source] std::io::Error),

    /// The worker thread is gone; no more queries can complete.
    #[error("search worker is no longer running")]
    WorkerClosed,

    /// An error response from the worker, already rendered to a string on
    /// the far side of the message boundary.
    #[error("{0}")]
    Worker(String),

    /// A previously failed load, replayed to a later query.
    ///
    /// Load futures are shared between every query that names the index, so
    /// the original error is wrapped in an `Arc` the first time it surfaces.
    #[error("{0}")]
    Shared(Arc<Error>),
}

impl From<Arc<Error>> for Error {
    fn from(inner: Arc<Error>) -> Self {
        Error::Shared(inner)
    }
}

impl Error {
    /// Wrap for fan-out to multiple waiting queries.
    pub(crate) fn into_shared(self) -> Arc<Error> {
        match self {
            Error::Shared(inner) => inner,
            other => Arc::new(other),
        }
    }
}
