// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Canonical fixtures shared by unit tests, integration tests and benches.
//!
//! The fixture schema mirrors a documentation index: a `relname` name
//! field, a published `title`, an indexed `content` body, weighted
//! `{title: 2, content: 1}`.

use crate::builder::{Builder, DocumentSource, FieldOptions};
use crate::index::Index;
use crate::types::FieldWeights;

/// A document under construction for a fixture index.
#[derive(Debug, Clone)]
pub struct DocFixture {
    values: DocumentSource,
    boost: f64,
}

impl DocFixture {
    pub fn boost(mut self, boost: f64) -> Self {
        self.boost = boost;
        self
    }
}

/// Shorthand for a fixture document from `(field, value)` pairs.
pub fn doc(pairs: &[(&str, &str)]) -> DocFixture {
    DocFixture {
        values: pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect(),
        boost: 1.0,
    }
}

/// The weight table the fixtures use.
pub fn fixture_weights() -> FieldWeights {
    let mut weights = FieldWeights::new();
    weights.insert("title".into(), 2.0);
    weights.insert("content".into(), 1.0);
    weights
}

/// Serialize the fixture documents through the real builder and load the
/// result through the real decoder — fixtures exercise the same path as
/// production blobs.
pub fn blob_bytes_from_docs(docs: &[DocFixture]) -> Vec<u8> {
    let mut builder = Builder::new();
    builder
        .name_field("relname", FieldOptions::indexed().published())
        .text_field("title", FieldOptions::indexed().published())
        .text_field("content", FieldOptions::indexed());

    for doc in docs {
        builder
            .add_document(&doc.values, doc.boost)
            .expect("fixture documents are well-formed");
    }

    builder.into_blob().to_vec()
}

pub fn index_from_docs(id: &str, docs: &[DocFixture]) -> Index {
    let bytes = blob_bytes_from_docs(docs);
    let blob = crate::blob::IndexBlob::from_slice(id, &bytes).expect("fixture blob decodes");
    Index::from_blob(id, &blob, &fixture_weights()).expect("fixture index builds")
}

/// Four-document docs index used across the test suites.
pub fn small_index() -> Index {
    index_from_docs("docs", &small_corpus())
}

pub fn small_corpus() -> Vec<DocFixture> {
    vec![
        doc(&[
            ("relname", "intro"),
            ("title", "Introduction"),
            ("content", "getting started guide"),
        ]),
        doc(&[
            ("relname", "transactions"),
            ("title", "Transactions"),
            ("content", "atomic commit and rollback"),
        ]),
        doc(&[
            ("relname", "savepoints"),
            ("title", "Savepoints"),
            ("content", "partial rollback inside a transaction"),
        ]),
        doc(&[
            ("relname", "select"),
            ("title", "Select"),
            ("content", "querying objects and filtering results"),
        ]),
    ]
}
