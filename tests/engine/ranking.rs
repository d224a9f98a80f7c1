//! Ranking invariants: descending scores, deterministic ties, penalty
//! dilution for the unfinished tail.

use jolr::testing::{doc, index_from_docs, small_index};

#[test]
fn scores_rank_non_increasing() {
    let index = small_index();
    for query in ["transaction", "rollback", "select objects", "savepoint"] {
        let outcome = index.search(query);
        for pair in outcome.results.windows(2) {
            assert!(
                pair[0].score >= pair[1].score,
                "query {query:?}: {} before {}",
                pair[0].score,
                pair[1].score
            );
        }
    }
}

#[test]
fn equal_scores_order_by_doc_id() {
    // Three byte-identical documents: identical weights, identical boost,
    // so scores tie exactly and the secondary key decides.
    let index = index_from_docs(
        "docs",
        &[
            doc(&[("relname", "a"), ("title", "Indexes"), ("content", "btree indexes")]),
            doc(&[("relname", "b"), ("title", "Indexes"), ("content", "btree indexes")]),
            doc(&[("relname", "c"), ("title", "Indexes"), ("content", "btree indexes")]),
        ],
    );

    let outcome = index.search("btree");
    assert_eq!(outcome.results.len(), 3);
    let scores: Vec<f64> = outcome.results.iter().map(|h| h.score).collect();
    assert_eq!(scores[0], scores[1]);
    assert_eq!(scores[1], scores[2]);
    assert_eq!(
        outcome.results.iter().map(|h| h.id.0).collect::<Vec<_>>(),
        vec![0, 1, 2]
    );
}

#[test]
fn ranking_is_reproducible_across_runs() {
    let index = small_index();
    let first = index.search("transaction rollback");
    let second = index.search("transaction rollback");
    assert_eq!(first.hash, second.hash);
    assert_eq!(
        first.results.iter().map(|h| h.id).collect::<Vec<_>>(),
        second.results.iter().map(|h| h.id).collect::<Vec<_>>()
    );
}

#[test]
fn missing_unfinished_tail_penalizes_instead_of_excluding() {
    let index = index_from_docs(
        "docs",
        &[
            doc(&[("relname", "both"), ("title", "Alpha beta")]),
            doc(&[("relname", "only-alpha"), ("title", "Alpha gamma")]),
        ],
    );

    // "bet" is unfinished; it completes to "beta", which only doc 0 has.
    // Doc 1 still matched "alpha", so it stays listed — diluted, not gone.
    let outcome = index.search("alpha bet");
    assert_eq!(outcome.results.len(), 2);
    assert_eq!(outcome.results[0].doc.relname(), Some("both"));
    assert_eq!(outcome.results[1].doc.relname(), Some("only-alpha"));
    assert!(outcome.results[0].score > outcome.results[1].score * 2.0);
}

#[test]
fn fully_typed_missing_term_excludes() {
    let index = index_from_docs(
        "docs",
        &[
            doc(&[("relname", "both"), ("title", "Alpha beta")]),
            doc(&[("relname", "only-alpha"), ("title", "Alpha gamma")]),
        ],
    );

    // Trailing space finishes "beta": now it's a hard AND.
    let outcome = index.search("alpha beta ");
    assert_eq!(outcome.results.len(), 1);
    assert_eq!(outcome.results[0].doc.relname(), Some("both"));
}

#[test]
fn boost_scales_final_scores() {
    let plain = index_from_docs(
        "docs",
        &[doc(&[("relname", "a"), ("title", "Migrations")])],
    );
    let boosted = index_from_docs(
        "docs",
        &[doc(&[("relname", "a"), ("title", "Migrations")]).boost(4.0)],
    );

    let base = plain.search("migrations").results[0].score;
    let scaled = boosted.search("migrations").results[0].score;
    assert!((scaled - base * 4.0).abs() < 1e-9);
}
