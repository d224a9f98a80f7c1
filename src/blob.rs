// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! The serialized index blob format.
//!
//! A blob is the JSON the offline builder emits and the loader fetches:
//!
//! ```text
//! {
//!   "fields":    [{id, name, index, publish, type, count, enum?}, ...],
//!   "documents": [[<published values by field id>..., boost], ...],
//!   "index":     {"c": {"a": {"t": {" ": [fieldId, docId, termCount, ...]}}}}
//! }
//! ```
//!
//! `index` is a character trie. Every key is a single character except the
//! `" "` sentinel, which terminates a term and holds its postings as a flat
//! array of `[field_id, doc_id, term_count]` triplets. Document rows are
//! positional by field id (unpublished slots are null), with the document's
//! boost appended as the final element.
//!
//! Blobs arrive from the network, so decoding validates everything it
//! touches: key shapes, triplet arity, and (in `index::Index::from_blob`)
//! id ranges and enum ordinals.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::types::FieldDef;

/// The `" "` key terminating a term in the raw trie.
const TERM_SENTINEL: &str = " ";

/// A decoded blob, structurally validated but not yet searchable.
///
/// `index::Index::from_blob` turns this into postings and weights.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexBlob {
    pub fields: Vec<FieldDef>,
    /// Positional rows: published values by field id, boost last.
    pub documents: Vec<Vec<serde_json::Value>>,
    pub index: RawTrieNode,
}

/// One node of the raw character trie.
///
/// The untagged repr matches the JSON: objects are interior nodes, arrays
/// are posting lists (and only ever appear under the `" "` sentinel).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawTrieNode {
    Postings(Vec<u32>),
    Children(BTreeMap<String, RawTrieNode>),
}

impl RawTrieNode {
    pub fn empty() -> Self {
        RawTrieNode::Children(BTreeMap::new())
    }
}

impl IndexBlob {
    /// Decode a fetched blob.
    ///
    /// `id` is the index id the blob was loaded for, used in error messages
    /// only — the blob itself doesn't carry one.
    pub fn from_slice(id: &str, bytes: &[u8]) -> Result<Self> {
        let blob: IndexBlob = serde_json::from_slice(bytes).map_err(|source| Error::Decode {
            id: id.to_string(),
            source,
        })?;
        blob.validate(id)?;
        Ok(blob)
    }

    pub fn to_vec(&self) -> Vec<u8> {
        // A blob is a tree of maps, vecs and scalars; serialization of that
        // shape cannot fail.
        serde_json::to_vec(self).unwrap_or_default()
    }

    /// Walk every term in the trie, invoking `visit(term, postings)`.
    ///
    /// Terms are visited in lexicographic order (the trie maps are sorted),
    /// so downstream accumulation is deterministic.
    pub fn for_each_term<F>(&self, id: &str, mut visit: F) -> Result<()>
    where
        F: FnMut(&str, &[u32]) -> Result<()>,
    {
        let mut prefix = String::new();
        Self::walk(id, &self.index, &mut prefix, &mut visit)
    }

    fn walk<F>(id: &str, node: &RawTrieNode, prefix: &mut String, visit: &mut F) -> Result<()>
    where
        F: FnMut(&str, &[u32]) -> Result<()>,
    {
        let children = match node {
            RawTrieNode::Children(children) => children,
            RawTrieNode::Postings(_) => {
                return Err(invalid(id, format!("posting array at interior node \"{prefix}\"")));
            }
        };

        for (key, child) in children {
            if key == TERM_SENTINEL {
                let postings = match child {
                    RawTrieNode::Postings(postings) => postings,
                    RawTrieNode::Children(_) => {
                        return Err(invalid(id, format!("subtree under sentinel at \"{prefix}\"")));
                    }
                };
                if postings.len() % 3 != 0 {
                    return Err(invalid(
                        id,
                        format!("posting list for \"{prefix}\" is not triplets"),
                    ));
                }
                if postings.is_empty() {
                    return Err(invalid(id, format!("empty posting list for \"{prefix}\"")));
                }
                visit(prefix, postings)?;
            } else {
                if key.chars().count() != 1 {
                    return Err(invalid(id, format!("trie key \"{key}\" is not a single char")));
                }
                prefix.push_str(key);
                Self::walk(id, child, prefix, visit)?;
                prefix.truncate(prefix.len() - key.len());
            }
        }

        Ok(())
    }

    fn validate(&self, id: &str) -> Result<()> {
        for (pos, field) in self.fields.iter().enumerate() {
            if field.id.index() != pos {
                return Err(invalid(
                    id,
                    format!("field \"{}\" has id {} at position {pos}", field.name, field.id.0),
                ));
            }
        }

        // Rows carry one slot per field plus the trailing boost.
        let row_len = self.fields.len() + 1;
        for (doc_id, row) in self.documents.iter().enumerate() {
            if row.len() != row_len {
                return Err(invalid(
                    id,
                    format!("document {doc_id} has {} slots, expected {row_len}", row.len()),
                ));
            }
            if !row[row.len() - 1].is_number() {
                return Err(invalid(id, format!("document {doc_id} has a non-numeric boost")));
            }
        }

        Ok(())
    }
}

fn invalid(id: &str, reason: String) -> Error {
    Error::InvalidBlob {
        id: id.to_string(),
        reason,
    }
}
