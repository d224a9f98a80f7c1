use std::collections::BTreeMap;
use std::fs;

use clap::Parser;
use serde::Deserialize;
use tracing_subscriber::EnvFilter;

use jolr::{
    Builder, FieldKind, FieldOptions, FieldWeights, IndexBlob, IndexSpec, SearchClient,
    WorkerConfig,
};

mod cli;
use cli::{Cli, Commands};

/// Input for the `build` command.
#[derive(Deserialize)]
struct Manifest {
    fields: Vec<ManifestField>,
    documents: Vec<ManifestDoc>,
}

#[derive(Deserialize)]
struct ManifestField {
    name: String,
    #[serde(rename = "type", default = "default_kind")]
    kind: FieldKind,
    #[serde(default)]
    index: bool,
    #[serde(default)]
    publish: bool,
    #[serde(default)]
    required: bool,
}

fn default_kind() -> FieldKind {
    FieldKind::Text
}

#[derive(Deserialize)]
struct ManifestDoc {
    #[serde(rename = "_boost", default = "default_boost")]
    boost: f64,
    #[serde(flatten)]
    values: BTreeMap<String, String>,
}

fn default_boost() -> f64 {
    1.0
}

type CliResult = Result<(), Box<dyn std::error::Error>>;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Build { input, output } => run_build(&input, &output),
        Commands::Inspect { file } => run_inspect(&file),
        Commands::Search {
            indexes,
            query,
            weights,
            limit,
        } => run_search(&indexes, &query, &weights, limit),
    };

    if let Err(error) = result {
        eprintln!("error: {error}");
        std::process::exit(1);
    }
}

fn run_build(input: &str, output: &str) -> CliResult {
    let manifest: Manifest = serde_json::from_slice(&fs::read(input)?)?;

    let mut builder = Builder::new();
    for field in &manifest.fields {
        let options = FieldOptions {
            index: field.index,
            publish: field.publish,
            required: field.required,
        };
        match field.kind {
            FieldKind::Text => builder.text_field(&field.name, options),
            FieldKind::Name => builder.name_field(&field.name, options),
            FieldKind::Enum => builder.enum_field(&field.name, options),
        };
    }

    #[cfg(feature = "parallel")]
    {
        let sources: Vec<(jolr::DocumentSource, f64)> = manifest
            .documents
            .iter()
            .map(|doc| (doc.values.clone(), doc.boost))
            .collect();
        builder.add_documents(&sources)?;
    }
    #[cfg(not(feature = "parallel"))]
    for doc in &manifest.documents {
        builder.add_document(&doc.values, doc.boost)?;
    }

    let doc_count = builder.doc_count();
    let blob = builder.into_blob();
    fs::write(output, blob.to_vec())?;
    println!("indexed {doc_count} documents into {output}");
    Ok(())
}

fn run_inspect(file: &str) -> CliResult {
    let blob = IndexBlob::from_slice(file, &fs::read(file)?)?;

    println!("{:<4} {:<16} {:<6} {:>7} {:>7} {:>6}", "id", "name", "type", "indexed", "publish", "count");
    for field in &blob.fields {
        println!(
            "{:<4} {:<16} {:<6} {:>7} {:>7} {:>6}",
            field.id.0,
            field.name,
            format!("{:?}", field.kind).to_lowercase(),
            field.index,
            field.publish,
            field.count
        );
    }

    let mut term_count = 0usize;
    blob.for_each_term(file, |_, _| {
        term_count += 1;
        Ok(())
    })?;
    println!("{} documents, {} terms", blob.documents.len(), term_count);
    Ok(())
}

fn run_search(indexes: &[String], query: &str, weights: &[String], limit: usize) -> CliResult {
    let weights = parse_weights(weights)?;
    let specs = indexes
        .iter()
        .map(|entry| {
            let (id, path) = entry
                .split_once('=')
                .ok_or_else(|| format!("--index takes ID=PATH, got \"{entry}\""))?;
            Ok(IndexSpec::new(id, path).with_weights(weights.clone()))
        })
        .collect::<Result<Vec<_>, String>>()?;
    let index_ids: Vec<String> = specs.iter().map(|spec| spec.id.clone()).collect();

    let runtime = tokio::runtime::Builder::new_multi_thread().enable_all().build()?;
    let outcome = runtime.block_on(async {
        let client = SearchClient::spawn(WorkerConfig::default()).await?;
        client.preload(specs)?;
        client.query(index_ids, query).await
    })?;

    if outcome.results.is_empty() {
        println!("no results");
        return Ok(());
    }

    for (rank, hit) in outcome.results.iter().take(limit).enumerate() {
        let relname = hit.doc.relname().unwrap_or("<unnamed>");
        let title = hit.doc.str_field("title").unwrap_or("");
        println!(
            "{:>3}. [{:.4}] {}:{relname}{}{title}",
            rank + 1,
            hit.score,
            hit.index_id,
            if title.is_empty() { "" } else { "  " },
        );
    }
    if outcome.results.len() > limit {
        println!("... and {} more", outcome.results.len() - limit);
    }
    Ok(())
}

fn parse_weights(entries: &[String]) -> Result<FieldWeights, Box<dyn std::error::Error>> {
    let mut weights = FieldWeights::new();
    for entry in entries {
        let (field, value) = entry
            .split_once('=')
            .ok_or_else(|| format!("--weight takes FIELD=WEIGHT, got \"{entry}\""))?;
        weights.insert(field.to_string(), value.parse::<f64>()?);
    }
    Ok(weights)
}
