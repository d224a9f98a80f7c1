// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Prefix completion for the trailing, still-being-typed query token.
//!
//! A character trie over every term in the index. Each node caches the
//! best-weighted term in its subtree (a term's weight is the maximum
//! field weight it reaches in any document, computed at index build), so
//! completing a prefix is a walk plus one lookup — no subtree scan at
//! query time.
//!
//! # Invariants
//!
//! - Every term inserted is reachable: `complete(term)` for a full term
//!   returns a term with at least its weight.
//! - `complete` never allocates; it returns a borrowed best term.
//! - Ties on weight resolve to the lexicographically smaller term, keeping
//!   completion deterministic across runs.

use std::collections::HashMap;

#[derive(Debug, Clone)]
struct Best {
    term: String,
    weight: f64,
}

#[derive(Debug, Default)]
struct TrieNode {
    children: HashMap<char, TrieNode>,
    best: Option<Best>,
}

/// Term-completion trie with per-node best-descendant caching.
#[derive(Debug, Default)]
pub struct SuggestionTrie {
    root: TrieNode,
}

impl SuggestionTrie {
    /// Build from the index's term → best-weight table.
    pub fn build(term_weights: &HashMap<String, f64>) -> Self {
        let mut root = TrieNode::default();
        for term in term_weights.keys() {
            let mut node = &mut root;
            for ch in term.chars() {
                node = node.children.entry(ch).or_default();
            }
        }

        let mut prefix = String::new();
        augment(&mut root, &mut prefix, term_weights);
        SuggestionTrie { root }
    }

    /// The best term starting with `prefix`, if any term does.
    pub fn complete(&self, prefix: &str) -> Option<&str> {
        let mut node = &self.root;
        for ch in prefix.chars() {
            node = node.children.get(&ch)?;
        }
        node.best.as_ref().map(|best| best.term.as_str())
    }
}

/// Fill each node's `best` bottom-up and return it to the parent.
fn augment(node: &mut TrieNode, prefix: &mut String, weights: &HashMap<String, f64>) -> Option<Best> {
    let mut best: Option<Best> = weights.get(prefix.as_str()).map(|weight| Best {
        term: prefix.clone(),
        weight: *weight,
    });

    for (ch, child) in &mut node.children {
        prefix.push(*ch);
        let child_best = augment(child, prefix, weights);
        prefix.truncate(prefix.len() - ch.len_utf8());

        if let Some(candidate) = child_best {
            best = Some(match best.take() {
                None => candidate,
                Some(current) => pick(current, candidate),
            });
        }
    }

    node.best = best.clone();
    best
}

fn pick(a: Best, b: Best) -> Best {
    if b.weight > a.weight || (b.weight == a.weight && b.term < a.term) {
        b
    } else {
        a
    }
}
