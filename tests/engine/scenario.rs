//! The canonical single-document scenario, end to end at the engine level:
//! build a blob, decode it, load it with explicit weights, query it.

use jolr::{Builder, FieldOptions, FieldWeights, Index, IndexBlob};

fn one_doc_index() -> Index {
    let mut builder = Builder::new();
    builder
        .name_field("relname", FieldOptions::indexed().published())
        .text_field("title", FieldOptions::indexed().published())
        .text_field("content", FieldOptions::indexed());
    builder
        .add_document(
            &[
                ("relname".to_string(), "intro".to_string()),
                ("title".to_string(), "Introduction".to_string()),
                ("content".to_string(), "getting started guide".to_string()),
            ]
            .into_iter()
            .collect(),
            1.0,
        )
        .unwrap();

    let bytes = builder.into_blob().to_vec();
    let blob = IndexBlob::from_slice("docs", &bytes).unwrap();

    let mut weights = FieldWeights::new();
    weights.insert("title".into(), 2.0);
    weights.insert("content".into(), 1.0);
    Index::from_blob("docs", &blob, &weights).unwrap()
}

#[test]
fn matching_query_returns_the_document_with_positive_score() {
    let index = one_doc_index();
    let outcome = index.search("getting started");

    assert_eq!(outcome.results.len(), 1, "exactly one document matches");
    let hit = &outcome.results[0];
    assert_eq!(hit.doc.relname(), Some("intro"));
    assert!(hit.score > 0.0, "score must be positive, got {}", hit.score);
    assert_eq!(hit.index_id, "docs");
    assert_eq!(outcome.hash, "0");
}

#[test]
fn unmatched_query_returns_empty_results_not_an_error() {
    let index = one_doc_index();
    let outcome = index.search("nonexistent term xyz");

    assert!(outcome.results.is_empty());
    assert_eq!(outcome.hash, "");
    // The tokenizer still reports what it looked for.
    assert_eq!(outcome.query.len(), 3);
}

#[test]
fn published_fields_round_trip_into_the_hit() {
    let index = one_doc_index();
    let outcome = index.search("guide");
    assert_eq!(outcome.results.len(), 1);

    let doc = &outcome.results[0].doc;
    assert_eq!(doc.str_field("title"), Some("Introduction"));
    // content is indexed but not published
    assert_eq!(doc.str_field("content"), None);
    assert_eq!(doc.boost, 1.0);
}
