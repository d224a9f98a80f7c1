// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Fanning one query across several loaded indexes.
//!
//! Order of operations matters for the failure semantics:
//!
//! 1. Resolve every named id to its load slot *before* awaiting anything —
//!   an unknown id fails the whole request immediately, without touching
//!   the network.
//! 2. Await all loads together. All-or-nothing: one failed load fails the
//!   aggregated request; there is no partial-results fallback.
//! 3. Search each index and merge: per-index hashes join with `_` in
//!   request order, the token list comes from the first index (the same
//!   query string went to all of them), and the concatenated results
//!   re-sort globally by descending score. The sort is stable, so equal
//!   scores keep request order of indexes, then each index's own
//!   deterministic ranking.

use futures::future::try_join_all;

use crate::error::{Error, Result};
use crate::loader::IndexCache;
use crate::types::{SearchHit, SearchOutcome};

/// Run `query` against every index in `index_ids` and merge the rankings.
pub(crate) async fn query_indexes(
    cache: &IndexCache,
    index_ids: &[String],
    query: &str,
) -> Result<SearchOutcome> {
    if index_ids.is_empty() {
        return Err(Error::EmptyIndexSet);
    }

    let slots = index_ids
        .iter()
        .map(|id| cache.lookup(id))
        .collect::<Result<Vec<_>>>()?;

    let indexes = try_join_all(slots).await?;
    let outcomes: Vec<SearchOutcome> = indexes.iter().map(|index| index.search(query)).collect();

    Ok(merge(outcomes))
}

fn merge(outcomes: Vec<SearchOutcome>) -> SearchOutcome {
    let hash = outcomes
        .iter()
        .map(|outcome| outcome.hash.as_str())
        .collect::<Vec<_>>()
        .join("_");
    let query = outcomes.first().map(|o| o.query.clone()).unwrap_or_default();

    let mut results: Vec<SearchHit> = outcomes
        .into_iter()
        .flat_map(|outcome| outcome.results)
        .collect();
    results.sort_by(|a, b| b.score.total_cmp(&a.score));

    SearchOutcome { hash, query, results }
}
