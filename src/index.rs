// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Turning a decoded blob into a searchable index.
//!
//! Construction does all the ranking math once, so query time is lookups
//! and accumulation only:
//!
//! 1. Walk the blob's term trie, collecting raw postings
//!    (term → doc → field → occurrence count), per-field document
//!    frequencies, and per-field token lengths.
//! 2. Convert occurrence counts to weights:
//!    `(1 + ln(field_doc_count / doc_freq)) * count / (1 + field_len)`,
//!    scaled by the field's entry in the weight table when it has one.
//!    The `1 +` floor keeps a term that saturates its field (every
//!    document with the field contains it) at a positive weight instead
//!    of vanishing — with it, a one-document index is still searchable.
//! 3. Record each term's best weight and build the suggestion trie over
//!    the vocabulary.
//!
//! # Invariants
//!
//! - Every posting references a declared field and an in-range document
//!   (checked here; the blob walk only checks shape).
//! - Weights are finite. `doc_freq ≤ field.count` holds for any blob the
//!   builder emits, and a zero `field.count` alongside postings is
//!   rejected, so the idf logarithm always gets a positive finite input.
//! - An `Index` is immutable after construction; the worker shares it
//!   freely across in-flight queries.

use std::collections::HashMap;

use crate::blob::IndexBlob;
use crate::error::{Error, Result};
use crate::suggest::SuggestionTrie;
use crate::types::{DocId, Document, FieldDef, FieldId, FieldKind, FieldWeights};

/// Per-term postings: document → matched fields → precomputed weight.
pub(crate) type TermPostings = HashMap<DocId, HashMap<FieldId, f64>>;

/// A loaded, immutable, searchable index.
#[derive(Debug)]
pub struct Index {
    id: String,
    fields: Vec<FieldDef>,
    documents: Vec<Document>,
    postings: HashMap<String, TermPostings>,
    suggestions: SuggestionTrie,
}

impl Index {
    /// Build a searchable index from a decoded blob.
    ///
    /// `weights` scales per-field contributions by field *name*; naming a
    /// field the blob doesn't declare is an error, since a typo here would
    /// otherwise silently flatten the ranking.
    pub fn from_blob(id: &str, blob: &IndexBlob, weights: &FieldWeights) -> Result<Self> {
        let fields = blob.fields.clone();

        let mut boost_by_field: Vec<Option<f64>> = vec![None; fields.len()];
        for (name, weight) in weights {
            match fields.iter().find(|f| &f.name == name) {
                Some(field) => boost_by_field[field.id.index()] = Some(*weight),
                None => {
                    return Err(Error::UnknownWeightField {
                        id: id.to_string(),
                        field: name.clone(),
                    })
                }
            }
        }

        let documents = decode_documents(id, blob)?;

        // Pass 1: raw occurrence counts straight off the trie.
        let mut postings: HashMap<String, TermPostings> = HashMap::new();
        // term → field → number of documents containing the term in it
        let mut doc_freq: HashMap<String, HashMap<FieldId, u32>> = HashMap::new();
        // field → doc → total indexed occurrences (the field's token length)
        let mut field_lens: Vec<HashMap<DocId, u32>> = vec![HashMap::new(); fields.len()];

        blob.for_each_term(id, |term, triplets| {
            for triplet in triplets.chunks_exact(3) {
                let (raw_field, raw_doc, count) = (triplet[0], triplet[1], triplet[2]);

                if raw_field as usize >= fields.len() {
                    return Err(invalid(id, format!("posting for \"{term}\" names field {raw_field}")));
                }
                let field_id = FieldId(raw_field);
                let doc_id = DocId::new(raw_doc, documents.len()).ok_or_else(|| {
                    invalid(id, format!("posting for \"{term}\" names document {raw_doc}"))
                })?;

                *doc_freq
                    .entry(term.to_string())
                    .or_default()
                    .entry(field_id)
                    .or_insert(0) += 1;
                *field_lens[field_id.index()].entry(doc_id).or_insert(0) += count;
                postings
                    .entry(term.to_string())
                    .or_default()
                    .entry(doc_id)
                    .or_default()
                    .insert(field_id, f64::from(count));
            }
            Ok(())
        })?;

        // Pass 2: occurrence counts become weights, and each term records
        // its best weight for the suggestion trie.
        let mut term_weights: HashMap<String, f64> = HashMap::with_capacity(postings.len());
        for (term, doc_map) in &mut postings {
            let freqs = &doc_freq[term.as_str()];
            let mut best = f64::NEG_INFINITY;

            for (doc_id, field_map) in doc_map.iter_mut() {
                for (field_id, value) in field_map.iter_mut() {
                    let field = &fields[field_id.index()];
                    if field.count == 0 {
                        return Err(invalid(
                            id,
                            format!("field \"{}\" has postings but a zero count", field.name),
                        ));
                    }
                    let df = f64::from(freqs[field_id]);
                    let idf = 1.0 + (f64::from(field.count) / df).ln();
                    let len = f64::from(field_lens[field_id.index()][doc_id]);
                    let mut weight = idf * *value / (1.0 + len);
                    if let Some(boost) = boost_by_field[field_id.index()] {
                        weight *= boost;
                    }
                    *value = weight;
                    best = best.max(weight);
                }
            }

            term_weights.insert(term.clone(), best);
        }

        let suggestions = SuggestionTrie::build(&term_weights);

        Ok(Index {
            id: id.to_string(),
            fields,
            documents,
            postings,
            suggestions,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn fields(&self) -> &[FieldDef] {
        &self.fields
    }

    pub fn doc_count(&self) -> usize {
        self.documents.len()
    }

    pub fn term_count(&self) -> usize {
        self.postings.len()
    }

    pub(crate) fn document(&self, doc_id: DocId) -> &Document {
        &self.documents[doc_id.index()]
    }

    pub(crate) fn term_postings(&self, stemmed: &str) -> Option<&TermPostings> {
        self.postings.get(stemmed)
    }

    pub(crate) fn complete_term(&self, prefix: &str) -> Option<&str> {
        self.suggestions.complete(prefix)
    }
}

/// Decode positional document rows into published field maps.
fn decode_documents(id: &str, blob: &IndexBlob) -> Result<Vec<Document>> {
    let mut documents = Vec::with_capacity(blob.documents.len());

    for (doc_id, row) in blob.documents.iter().enumerate() {
        // validate() checked arity and the numeric boost already.
        let boost = row[row.len() - 1].as_f64().unwrap_or(1.0);

        let mut fields = serde_json::Map::new();
        for field in &blob.fields {
            let value = &row[field.id.index()];
            if value.is_null() {
                continue;
            }
            let published = match field.kind {
                FieldKind::Enum => {
                    let ordinal = value.as_u64().ok_or_else(|| {
                        invalid(id, format!("document {doc_id}: enum \"{}\" is not an ordinal", field.name))
                    })?;
                    let table = field.values.as_deref().unwrap_or(&[]);
                    let label = table.get(ordinal as usize).ok_or_else(|| {
                        invalid(
                            id,
                            format!("document {doc_id}: enum \"{}\" ordinal {ordinal} out of range", field.name),
                        )
                    })?;
                    serde_json::Value::String(label.clone())
                }
                FieldKind::Text | FieldKind::Name => value.clone(),
            };
            fields.insert(field.name.clone(), published);
        }

        documents.push(Document { boost, fields });
    }

    Ok(documents)
}

fn invalid(id: &str, reason: String) -> Error {
    Error::InvalidBlob {
        id: id.to_string(),
        reason,
    }
}
