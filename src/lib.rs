//! Weighted-field full-text search over prebuilt JSON indexes.
//!
//! This crate owns the query side of a documentation-search pipeline: an
//! offline [`Builder`] turns documents into compact index blobs, and a
//! worker-isolated engine loads those blobs and answers ranked queries
//! without ever blocking the caller's thread.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────┐ blob JSON ┌────────────┐ postings ┌─────────────┐
//! │ builder.rs │──────────▶│  blob.rs   │─────────▶│  index.rs   │
//! │ (offline)  │           │ (codec)    │          │ + search.rs │
//! └────────────┘           └────────────┘          └──────┬──────┘
//!                                                         │ per-index
//!                ┌────────────┐  loads   ┌────────────┐   │ rankings
//!                │ loader.rs  │─────────▶│aggregate.rs│◀──┘
//!                │ (cache)    │          │ (merge)    │
//!                └──────▲─────┘          └─────▲──────┘
//!                       │    owned by worker   │
//!                ┌──────┴───────────────────────┴──────┐
//!                │  worker.rs — actor on its own thread │
//!                └──────────────────▲──────────────────┘
//!                                   │ messages, correlated by id
//!                ┌──────────────────┴──────────────────┐
//!                │  host.rs — SearchClient + pending   │
//!                │  request table on the caller side   │
//!                └─────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```ignore
//! let client = SearchClient::spawn(WorkerConfig::default()).await?;
//! client.preload(vec![
//!     IndexSpec::new("docs", "https://example.com/docsearch.jolrindex"),
//!     IndexSpec::new("tutorial", "https://example.com/tutorialsearch.jolrindex"),
//! ])?;
//!
//! let outcome = client.query(vec!["docs".into(), "tutorial".into()], "link props").await?;
//! for hit in &outcome.results {
//!     println!("{}: {:?} ({:.3})", hit.index_id, hit.doc.relname(), hit.score);
//! }
//! ```
//!
//! Queries fan out across every named index, merge into one globally
//! ranked list, and fail all-or-nothing: a broken index fails the whole
//! query rather than silently returning partial results.

// Module declarations
mod aggregate;
pub mod blob;
pub mod builder;
pub mod error;
pub mod host;
pub mod index;
pub mod loader;
mod search;
mod suggest;
pub mod testing;
pub mod tokenize;
pub mod types;
pub mod worker;

// Re-exports for public API
pub use blob::IndexBlob;
pub use builder::{Builder, CustomTokenizer, DocumentSource, FieldOptions};
pub use error::{Error, Result};
pub use host::SearchClient;
pub use index::Index;
pub use loader::{BlobFetcher, HttpFetcher};
pub use types::{
    default_field_weights, DocId, Document, FieldDef, FieldId, FieldKind, FieldWeights, IndexSpec,
    QueryTerm, SearchHit, SearchOutcome,
};
pub use worker::{Request, Response, WorkerConfig};
