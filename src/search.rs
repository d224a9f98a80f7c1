// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Query execution against one loaded index.
//!
//! The scoring pass keeps two accumulators per document:
//!
//! - `sum`: Σ weight² over every (term, field) match, and
//! - `cnt`: the number of matches, doubling as a state flag — a negative
//!   `cnt` marks the document excluded.
//!
//! Terms combine with AND semantics: a document missing a fully-typed term
//! is excluded outright. The trailing query token gets gentler treatment,
//! since the user is probably still typing it — a document missing it is
//! only penalized (`cnt += 10`, diluting its final score) because some
//! *other* document may contain the finished word. When the trailing token
//! matches nothing at all, the suggestion trie completes it to the
//! best-weighted vocabulary term sharing the prefix, and the completed
//! term's postings score with the same penalty rules.
//!
//! Final score: `sqrt(sum) / cnt * boost`, ranked descending. Equal scores
//! order by ascending doc id, so ranking is stable across runs.
//!
//! # Edge cases
//!
//! - An empty query, or one consisting only of interior stop words, scores
//!   nothing and returns an empty result list — not an error.
//! - A query term absent from the vocabulary (and not completable) is
//!   skipped entirely; it neither excludes nor penalizes anyone.

use crate::index::Index;
use crate::tokenize::tokenize_query;
use crate::types::{DocId, SearchHit, SearchOutcome};

impl Index {
    /// Score `query` against this index and return the ranked results.
    pub fn search(&self, query: &str) -> SearchOutcome {
        let terms = tokenize_query(query);
        let doc_count = self.doc_count();

        let mut sums = vec![0.0_f64; doc_count];
        let mut counts = vec![0_i32; doc_count];

        // A query ending mid-word ("tran") treats its last token as
        // unfinished; one ending in whitespace ("tran ") does not.
        let unfinished_tail = query.chars().next_back().is_some_and(|c| !c.is_whitespace());

        for (i, term) in terms.iter().enumerate() {
            let last_and_unfinished = i == terms.len() - 1 && unfinished_tail;
            let mut suggested = false;

            let mut postings = self.term_postings(&term.stemmed);
            if postings.is_none() && last_and_unfinished {
                let completed = self
                    .complete_term(&term.orig)
                    .or_else(|| self.complete_term(&term.stemmed));
                let Some(completed) = completed else { continue };

                postings = self.term_postings(completed);
                if postings.is_none() {
                    // The trie is built from the same vocabulary as the
                    // postings, so this indicates a corrupted index.
                    tracing::warn!(index = self.id(), term = completed, "completed term has no postings");
                    continue;
                }
                suggested = true;
            }
            let Some(postings) = postings else { continue };

            for doc_index in 0..doc_count {
                if counts[doc_index] < 0 {
                    // Already excluded by an earlier term.
                    continue;
                }

                match postings.get(&DocId(doc_index as u32)) {
                    None => {
                        if !suggested && !last_and_unfinished {
                            counts[doc_index] = -1;
                        } else {
                            counts[doc_index] += 10;
                        }
                    }
                    Some(field_weights) => {
                        for weight in field_weights.values() {
                            sums[doc_index] += weight * weight;
                            counts[doc_index] += 1;
                        }
                    }
                }
            }
        }

        let mut ranked: Vec<(DocId, f64)> = (0..doc_count)
            .filter_map(|doc_index| {
                if counts[doc_index] <= 0 || sums[doc_index] == 0.0 {
                    return None;
                }
                let doc_id = DocId(doc_index as u32);
                let score =
                    sums[doc_index].sqrt() / f64::from(counts[doc_index]) * self.document(doc_id).boost;
                Some((doc_id, score))
            })
            .collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

        let hash = ranked
            .iter()
            .map(|(doc_id, _)| doc_id.0.to_string())
            .collect::<Vec<_>>()
            .join("-");

        let results = ranked
            .into_iter()
            .map(|(doc_id, score)| SearchHit {
                id: doc_id,
                doc: self.document(doc_id).clone(),
                score,
                index_id: self.id().to_string(),
            })
            .collect();

        SearchOutcome {
            hash,
            query: terms,
            results,
        }
    }
}
