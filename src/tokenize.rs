// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Tokenization shared by the index builder and the query path.
//!
//! Both sides MUST agree on this pipeline or queries silently stop matching
//! what the builder indexed. The steps, in order:
//!
//! 1. Split on whitespace.
//! 2. Normalize each token: lowercase and strip combining marks, so
//!    "Café" and "cafe" index and match identically.
//! 3. Strip trailing `, . : ) ! ; ' " { [` and leading `( ' " } ]`
//!    punctuation. For queries this only applies to tokens containing at
//!    least one ASCII alphanumeric (an all-punctuation query token like
//!    `->` is looked up as-is).
//! 4. Drop tokens that are empty, start with a digit, or (on the build
//!    path) are not identifier-shaped (`[a-z][a-z0-9_-]*`).
//! 5. Drop stop words. Document text uses the full list; name-like and
//!    published fields and queries use the much smaller "super" list, and
//!    the final token of a query is always kept (the user may still be
//!    typing it).
//! 6. Split compounds on `_`/`-`: `connection-pool` emits the sub-tokens
//!    `connection` and `pool` plus the joined compound, so both the parts
//!    and the whole are searchable.
//! 7. Stem (Snowball English); compounds join their stemmed parts with `_`.

use std::collections::HashSet;
use std::sync::LazyLock;

use rust_stemmers::{Algorithm, Stemmer};
use serde::Deserialize;
use unicode_normalization::UnicodeNormalization;

use crate::types::QueryTerm;

/// Stop lists embedded from data/stop_words.json.
///
/// `stops` is the full English list applied to document prose; `super_stops`
/// is the handful of words too common to mean anything even in a query.
#[derive(Deserialize)]
struct StopLists {
    stops: Vec<String>,
    super_stops: Vec<String>,
}

static STOP_LISTS: LazyLock<(HashSet<String>, HashSet<String>)> = LazyLock::new(|| {
    let lists: StopLists = serde_json::from_str(include_str!("../data/stop_words.json"))
        .expect("embedded stop_words.json is valid");
    (
        lists.stops.into_iter().collect(),
        lists.super_stops.into_iter().collect(),
    )
});

static STEMMER: LazyLock<Stemmer> = LazyLock::new(|| Stemmer::create(Algorithm::English));

/// Stem a single lowercase token.
pub fn stem(token: &str) -> String {
    STEMMER.stem(token).into_owned()
}

/// Lowercase and strip combining marks (diacritics).
///
/// NFD-decompose, drop the marks, lowercase: "Tú" → "tu", "naïve" → "naive".
pub fn fold(token: &str) -> String {
    token
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect::<String>()
        .to_lowercase()
}

/// Check if a character is a combining mark (diacritic).
fn is_combining_mark(c: char) -> bool {
    matches!(c,
        '\u{0300}'..='\u{036F}' |  // Combining Diacritical Marks
        '\u{1DC0}'..='\u{1DFF}' |  // Combining Diacritical Marks Supplement
        '\u{20D0}'..='\u{20FF}' |  // Combining Diacritical Marks for Symbols
        '\u{FE20}'..='\u{FE2F}'    // Combining Half Marks
    )
}

/// Tokenize document text on the build path.
///
/// `preserve_stops` switches to the query-grade "super" stop list; the
/// builder sets it for name-kind and published fields, whose values are
/// short identifiers where even "while" or "for" can be meaningful.
pub fn tokenize_field(text: &str, preserve_stops: bool) -> Vec<QueryTerm> {
    tokenize(text, !preserve_stops, false)
}

/// Tokenize a user query.
///
/// Uses the "super" stop list and never drops the final token, which is
/// assumed to be mid-keystroke.
pub fn tokenize_query(query: &str) -> Vec<QueryTerm> {
    tokenize(query, false, true)
}

fn tokenize(text: &str, clean_stops: bool, is_query: bool) -> Vec<QueryTerm> {
    let raw_tokens: Vec<&str> = text.split_whitespace().collect();
    let (full_stops, super_stops) = &*STOP_LISTS;
    let stop_list = if clean_stops { full_stops } else { super_stops };

    let mut terms = Vec::new();
    for (i, &orig_token) in raw_tokens.iter().enumerate() {
        let mut token = fold(orig_token);
        let last_token = i == raw_tokens.len() - 1 && is_query;
        let contains_alphanum = token.chars().any(|c| c.is_ascii_alphanumeric());

        if !is_query || contains_alphanum {
            token = strip_edge_punctuation(&token);
        }

        if token.is_empty()
            || token.starts_with(|c: char| c.is_ascii_digit())
            || (!is_query && !is_identifier_shaped(&token))
            || (stop_list.contains(token.as_str()) && !last_token)
        {
            continue;
        }

        let sub_tokens: Vec<&str> = if contains_alphanum {
            token.split(['_', '-']).filter(|s| !s.is_empty()).collect()
        } else {
            vec![token.as_str()]
        };

        if sub_tokens.len() > 1 {
            let mut stemmed_parts = Vec::with_capacity(sub_tokens.len());
            for sub in &sub_tokens {
                let stemmed = stem(sub);
                terms.push(QueryTerm {
                    orig: (*sub).to_string(),
                    stripped: (*sub).to_string(),
                    stemmed: stemmed.clone(),
                });
                stemmed_parts.push(stemmed);
            }
            terms.push(QueryTerm {
                orig: orig_token.to_string(),
                stripped: token.clone(),
                stemmed: stemmed_parts.join("_"),
            });
        } else {
            terms.push(QueryTerm {
                orig: orig_token.to_string(),
                stripped: token.clone(),
                stemmed: stem(&token),
            });
        }
    }

    terms
}

/// Trailing `, . : ) ! ; ' " { [` and leading `( ' " } ]` are sentence
/// punctuation, not token content.
fn strip_edge_punctuation(token: &str) -> String {
    let trimmed = token
        .trim_end_matches([',', '.', ':', ')', '!', ';', '\'', '"', '{', '['])
        .trim_start_matches(['(', '\'', '"', '}', ']']);
    trimmed.to_string()
}

/// Build-path gate: terms must look like identifiers or words, `[a-z]`
/// first, then `[a-z0-9_-]`.
fn is_identifier_shaped(token: &str) -> bool {
    let mut chars = token.chars();
    match chars.next() {
        Some(c) if c.is_ascii_lowercase() => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-')
}
