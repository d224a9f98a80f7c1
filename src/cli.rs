use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "jolr",
    about = "Weighted-field search index builder and query tool",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build a .jolrindex blob from a manifest of fields and documents
    Build {
        /// Manifest JSON declaring fields and documents
        #[arg(short, long)]
        input: String,

        /// Output path for the .jolrindex blob
        #[arg(short, long)]
        output: String,
    },

    /// Summarize a .jolrindex blob
    Inspect {
        /// Path to a .jolrindex file
        file: String,
    },

    /// Preload indexes into a search worker and run a query
    Search {
        /// Index to load, as id=path; repeat for multiple indexes
        #[arg(short, long = "index", value_name = "ID=PATH", required = true)]
        indexes: Vec<String>,

        /// Query text
        #[arg(short, long)]
        query: String,

        /// Field weight override, as field=number; repeatable
        #[arg(short, long = "weight", value_name = "FIELD=WEIGHT")]
        weights: Vec<String>,

        /// Maximum number of results to print
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
}
