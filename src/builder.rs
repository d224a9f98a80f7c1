// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Offline index construction: documents in, blob out.
//!
//! The builder owns the blob format's write side. Declare fields first,
//! feed documents, serialize:
//!
//! ```ignore
//! let mut builder = Builder::new();
//! builder.text_field("title", FieldOptions::indexed().published());
//! builder.add_document(&source, 1.0)?;
//! let blob = builder.into_blob();
//! ```
//!
//! Indexing rules per field kind:
//!
//! - `text`: tokenized with the full stop list (unless published — short
//!   published strings behave like labels, so they keep query-grade stops).
//! - `name`: stop words preserved, and each token is indexed twice — the
//!   stemmed form at weight 1 and the raw folded form at weight 2 — so an
//!   exact identifier match outranks a stem collision.
//! - `enum`: values are interned into the field's ordinal table; when
//!   marked indexable the label text goes through the text pipeline.
//!
//! A field may also carry a custom tokenizer (dotted-path splitting and the
//! like); its tokens are indexed verbatim at weight 1.

use std::collections::BTreeMap;

use crate::blob::{IndexBlob, RawTrieNode};
use crate::error::{Error, Result};
use crate::tokenize::{fold, tokenize_field};
use crate::types::{DocId, FieldDef, FieldId, FieldKind};

/// Tokenizer override for one field: raw value in, index terms out.
pub type CustomTokenizer = Box<dyn Fn(&str) -> Vec<String> + Send + Sync>;

/// Declaration-time options for a field.
#[derive(Debug, Clone, Copy, Default)]
pub struct FieldOptions {
    pub index: bool,
    pub publish: bool,
    pub required: bool,
}

impl FieldOptions {
    pub fn indexed() -> Self {
        FieldOptions {
            index: true,
            ..Default::default()
        }
    }

    pub fn published(mut self) -> Self {
        self.publish = true;
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }
}

/// Interns enum values in first-seen order.
#[derive(Debug, Default)]
struct EnumTable {
    ordinals: BTreeMap<String, u32>,
    labels: Vec<String>,
}

impl EnumTable {
    fn intern(&mut self, label: &str) -> u32 {
        if let Some(&ordinal) = self.ordinals.get(label) {
            return ordinal;
        }
        let ordinal = self.labels.len() as u32;
        self.ordinals.insert(label.to_string(), ordinal);
        self.labels.push(label.to_string());
        ordinal
    }
}

struct BuilderField {
    def: FieldDef,
    options: FieldOptions,
    enum_table: Option<EnumTable>,
    tokenizer: Option<CustomTokenizer>,
}

/// Mutable trie node; `into_raw` flattens postings into blob triplets.
#[derive(Default)]
struct MutNode {
    children: BTreeMap<char, MutNode>,
    postings: BTreeMap<(FieldId, DocId), u32>,
}

impl MutNode {
    fn into_raw(self) -> RawTrieNode {
        let mut children: BTreeMap<String, RawTrieNode> = BTreeMap::new();

        if !self.postings.is_empty() {
            let mut flat = Vec::with_capacity(self.postings.len() * 3);
            for ((field_id, doc_id), count) in self.postings {
                flat.extend_from_slice(&[field_id.0, doc_id.0, count]);
            }
            children.insert(" ".to_string(), RawTrieNode::Postings(flat));
        }

        for (ch, child) in self.children {
            children.insert(ch.to_string(), child.into_raw());
        }

        RawTrieNode::Children(children)
    }
}

/// One document's raw field values.
pub type DocumentSource = BTreeMap<String, String>;

/// Incremental blob builder.
pub struct Builder {
    fields: Vec<BuilderField>,
    root: MutNode,
    documents: Vec<Vec<serde_json::Value>>,
}

impl Default for Builder {
    fn default() -> Self {
        Self::new()
    }
}

impl Builder {
    pub fn new() -> Self {
        Builder {
            fields: Vec::new(),
            root: MutNode::default(),
            documents: Vec::new(),
        }
    }

    pub fn text_field(&mut self, name: &str, options: FieldOptions) -> &mut Self {
        self.push_field(name, FieldKind::Text, options, None)
    }

    pub fn name_field(&mut self, name: &str, options: FieldOptions) -> &mut Self {
        self.push_field(name, FieldKind::Name, options, None)
    }

    pub fn enum_field(&mut self, name: &str, options: FieldOptions) -> &mut Self {
        self.push_field(name, FieldKind::Enum, options, None)
    }

    /// A text field whose values are split by `tokenizer` instead of the
    /// standard pipeline.
    pub fn custom_field(
        &mut self,
        name: &str,
        options: FieldOptions,
        tokenizer: CustomTokenizer,
    ) -> &mut Self {
        self.push_field(name, FieldKind::Text, options, Some(tokenizer))
    }

    fn push_field(
        &mut self,
        name: &str,
        kind: FieldKind,
        options: FieldOptions,
        tokenizer: Option<CustomTokenizer>,
    ) -> &mut Self {
        let id = FieldId(self.fields.len() as u32);
        self.fields.push(BuilderField {
            def: FieldDef {
                id,
                name: name.to_string(),
                index: options.index,
                publish: options.publish,
                kind,
                count: 0,
                values: None,
            },
            options,
            enum_table: matches!(kind, FieldKind::Enum).then(EnumTable::default),
            tokenizer,
        });
        self
    }

    /// Index one document. Field values are looked up by declared name;
    /// absent or empty values are fine unless the field is `required`.
    pub fn add_document(&mut self, source: &DocumentSource, boost: f64) -> Result<()> {
        let doc_id = DocId(self.documents.len() as u32);
        let mut row = vec![serde_json::Value::Null; self.fields.len() + 1];
        row[self.fields.len()] = boost.into();

        let mut terms: Vec<(FieldId, String, u32)> = Vec::new();

        for field in &mut self.fields {
            let value = source.get(&field.def.name).map(String::as_str).unwrap_or("");
            if value.is_empty() {
                if field.options.required {
                    return Err(Error::MissingField {
                        doc: doc_id.index(),
                        field: field.def.name.clone(),
                    });
                }
                continue;
            }
            field.def.count += 1;

            if field.def.index {
                collect_terms(field, value, &mut terms);
            }

            if field.def.publish {
                row[field.def.id.index()] = match field.enum_table.as_mut() {
                    Some(table) => table.intern(value).into(),
                    None => value.into(),
                };
            } else if let Some(table) = field.enum_table.as_mut() {
                // Unpublished enums still need stable ordinals for counting.
                table.intern(value);
            }
        }

        for (field_id, term, weight) in terms {
            self.insert_term(field_id, doc_id, &term, weight);
        }

        self.documents.push(row);
        Ok(())
    }

    /// Index a batch, tokenizing documents in parallel.
    ///
    /// Trie insertion stays serial — the trie is cheap next to stemming.
    #[cfg(feature = "parallel")]
    pub fn add_documents(&mut self, sources: &[(DocumentSource, f64)]) -> Result<()> {
        use rayon::prelude::*;

        let fields = &self.fields;
        let tokenized: Vec<Vec<(FieldId, String, u32)>> = sources
            .par_iter()
            .map(|(source, _)| {
                let mut terms = Vec::new();
                for field in fields.iter() {
                    if !field.def.index {
                        continue;
                    }
                    if let Some(value) = source.get(&field.def.name) {
                        if !value.is_empty() {
                            collect_terms(field, value, &mut terms);
                        }
                    }
                }
                terms
            })
            .collect();

        for ((source, boost), terms) in sources.iter().zip(tokenized) {
            let doc_id = DocId(self.documents.len() as u32);
            self.add_document_row(source, *boost, doc_id)?;
            for (field_id, term, weight) in terms {
                self.insert_term(field_id, doc_id, &term, weight);
            }
        }
        Ok(())
    }

    /// Row bookkeeping shared with the batch path: counts, publishing,
    /// required checks — everything except term indexing.
    #[cfg(feature = "parallel")]
    fn add_document_row(&mut self, source: &DocumentSource, boost: f64, doc_id: DocId) -> Result<()> {
        let mut row = vec![serde_json::Value::Null; self.fields.len() + 1];
        row[self.fields.len()] = boost.into();

        for field in &mut self.fields {
            let value = source.get(&field.def.name).map(String::as_str).unwrap_or("");
            if value.is_empty() {
                if field.options.required {
                    return Err(Error::MissingField {
                        doc: doc_id.index(),
                        field: field.def.name.clone(),
                    });
                }
                continue;
            }
            field.def.count += 1;
            if field.def.publish {
                row[field.def.id.index()] = match field.enum_table.as_mut() {
                    Some(table) => table.intern(value).into(),
                    None => value.into(),
                };
            } else if let Some(table) = field.enum_table.as_mut() {
                table.intern(value);
            }
        }

        self.documents.push(row);
        Ok(())
    }

    fn insert_term(&mut self, field_id: FieldId, doc_id: DocId, term: &str, weight: u32) {
        let mut node = &mut self.root;
        for ch in term.chars() {
            node = node.children.entry(ch).or_default();
        }
        *node.postings.entry((field_id, doc_id)).or_insert(0) += weight;
    }

    pub fn doc_count(&self) -> usize {
        self.documents.len()
    }

    /// Serialize everything indexed so far.
    pub fn into_blob(self) -> IndexBlob {
        let fields = self
            .fields
            .into_iter()
            .map(|field| {
                let mut def = field.def;
                def.values = field.enum_table.map(|table| table.labels);
                def
            })
            .collect();

        IndexBlob {
            fields,
            documents: self.documents,
            index: self.root.into_raw(),
        }
    }
}

/// Tokenize one field value into `(field, term, weight)` insertions.
fn collect_terms(field: &BuilderField, value: &str, terms: &mut Vec<(FieldId, String, u32)>) {
    let field_id = field.def.id;

    if let Some(tokenizer) = &field.tokenizer {
        for term in tokenizer(value) {
            terms.push((field_id, term, 1));
        }
        return;
    }

    // Name-like and published fields hold short labels where ordinary stop
    // words carry meaning, so only the query-grade list applies.
    let preserve_stops = matches!(field.def.kind, FieldKind::Name) || field.def.publish;
    for token in tokenize_field(value, preserve_stops) {
        terms.push((field_id, token.stemmed, 1));
        if matches!(field.def.kind, FieldKind::Name) {
            terms.push((field_id, fold(&token.orig), 2));
        }
    }
}
