// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! The building blocks of a loaded index and its query results.
//!
//! These types define the two surfaces the crate owns:
//!
//! - the *blob side*: field declarations and published document rows as the
//!   offline builder serializes them (`blob` module holds the raw wire
//!   shapes; this module holds the decoded forms), and
//! - the *result side*: ranked hits and the outcome envelope that crosses
//!   the worker boundary back to the host.
//!
//! # Invariants
//!
//! - `DocId` is a dense index into the blob's `documents` array:
//!   `doc_id.0 < doc_count`. Postings referencing ids outside that range are
//!   rejected at load.
//! - `FieldId` is a dense index into the blob's `fields` array, in
//!   declaration order.
//! - `SearchOutcome::results` is sorted by non-increasing score; equal
//!   scores order by ascending doc id so ranking is reproducible run to run.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

// =============================================================================
// NEWTYPES: Type-safe indices
// =============================================================================

/// Type-safe document identifier: a dense index into the document table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(transparent)]
pub struct DocId(pub u32);

impl DocId {
    /// Create a new DocId, validating it's within bounds.
    #[inline]
    pub fn new(id: u32, doc_count: usize) -> Option<Self> {
        if (id as usize) < doc_count {
            Some(DocId(id))
        } else {
            None
        }
    }

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Type-safe field identifier: a dense index into the field table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(transparent)]
pub struct FieldId(pub u32);

impl FieldId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

// =============================================================================
// FIELD DECLARATIONS
// =============================================================================

/// How a field's values are tokenized and stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    /// Prose: tokenized with the full stop list.
    Text,
    /// Closed vocabulary: stored as an ordinal into the field's enum table.
    Enum,
    /// Identifier-like values ("name" fields): stop words are preserved and
    /// the raw lowercased token is indexed alongside the stemmed form, at
    /// double weight, so exact-name lookups outrank prose mentions.
    Name,
}

/// A field declaration, as carried in the blob's `fields` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldDef {
    pub id: FieldId,
    pub name: String,
    /// Whether the field's text participates in the term index.
    pub index: bool,
    /// Whether the field's value is published into result documents.
    pub publish: bool,
    #[serde(rename = "type")]
    pub kind: FieldKind,
    /// Number of documents with a non-empty value for this field (IDF input).
    pub count: u32,
    /// Value table for `enum` fields.
    #[serde(default, rename = "enum", skip_serializing_if = "Option::is_none")]
    pub values: Option<Vec<String>>,
}

/// Per-field score multipliers, keyed by field name.
///
/// Applied once at index construction time; unknown field names are a load
/// error rather than a silent no-op.
pub type FieldWeights = BTreeMap<String, f64>;

/// The weight table the worker applies when an index spec doesn't carry its
/// own: generic identifiers dominate, then names, then titles, with type
/// tags as a weak signal.
pub fn default_field_weights() -> FieldWeights {
    let mut weights = FieldWeights::new();
    weights.insert("index".into(), 5.0);
    weights.insert("name".into(), 3.0);
    weights.insert("title".into(), 2.0);
    weights.insert("type".into(), 0.5);
    weights
}

// =============================================================================
// INDEX SPECS
// =============================================================================

/// Names one index to preload: a short id and the location of its blob.
///
/// `path` may be an `http(s)://` URL or a filesystem path. `weights`
/// overrides the worker's default field-weight table for this index; it is
/// omitted from the wire form when absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexSpec {
    pub id: String,
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weights: Option<FieldWeights>,
}

impl IndexSpec {
    pub fn new(id: impl Into<String>, path: impl Into<String>) -> Self {
        IndexSpec {
            id: id.into(),
            path: path.into(),
            weights: None,
        }
    }

    pub fn with_weights(mut self, weights: FieldWeights) -> Self {
        self.weights = Some(weights);
        self
    }
}

// =============================================================================
// DOCUMENTS AND RESULTS
// =============================================================================

/// A published document descriptor: whatever fields the builder marked
/// `publish`, plus the document's boost.
///
/// The field set is index-defined (a docs index publishes `relname`,
/// `title`, `target`, ...; a tutorial index publishes a different shape), so
/// values stay an open map rather than a closed struct.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    #[serde(rename = "_boost")]
    pub boost: f64,
    #[serde(flatten)]
    pub fields: serde_json::Map<String, serde_json::Value>,
}

impl Document {
    /// String value of a published field, if present.
    pub fn str_field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).and_then(|v| v.as_str())
    }

    /// The document's relative name, the one field every index publishes.
    pub fn relname(&self) -> Option<&str> {
        self.str_field("relname")
    }

    /// Optional anchor within the document.
    pub fn target(&self) -> Option<&str> {
        self.str_field("target")
    }
}

/// One token of a query, in the three forms the tokenizer produces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryTerm {
    /// The token as typed (whitespace-trimmed).
    pub orig: String,
    /// Lowercased, edge punctuation stripped, diacritics folded.
    pub stripped: String,
    /// Stemmed form; compound tokens join their stemmed parts with `_`.
    pub stemmed: String,
}

/// A matched document with its relevance score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub id: DocId,
    pub doc: Document,
    pub score: f64,
    #[serde(rename = "indexId")]
    pub index_id: String,
}

/// The result of one search: per-index when produced by the engine,
/// merged when produced by the aggregator.
///
/// `hash` fingerprints the ranked doc-id list (per index: ids joined by
/// `-`; aggregated: per-index hashes joined by `_`), letting the host
/// detect duplicate or stale responses cheaply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchOutcome {
    pub hash: String,
    pub query: Vec<QueryTerm>,
    pub results: Vec<SearchHit>,
}
