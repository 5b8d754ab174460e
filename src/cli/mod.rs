//! CLI command definitions and parsing
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::search::SearchMode;

#[derive(Parser, Debug)]
#[command(
    name = "prodsearch",
    version,
    about = "Keyword, semantic, and hybrid search over a product catalog",
    long_about = "Prodsearch indexes an e-commerce product catalog into Elasticsearch, attaching \
                  embedding vectors from a TEI-compatible inference server, and runs keyword, \
                  semantic, or hybrid queries against the index."
)]
pub struct Cli {
    /// Global config file path (defaults to ~/.config/prodsearch/config.toml)
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create the product index with its mapping (idempotent)
    Init,

    /// Load a product catalog into the index
    Load {
        /// Catalog JSON file (array of products)
        #[arg(short, long, conflicts_with = "sample")]
        file: Option<PathBuf>,

        /// Use the built-in sample catalog (default when no file is given)
        #[arg(long)]
        sample: bool,

        /// Reindex even if the index already contains documents
        #[arg(long)]
        force: bool,

        /// Index zero vectors instead of calling the embedding server
        #[arg(long)]
        no_embeddings: bool,
    },

    /// Run a query in one of the three modes
    Query {
        /// Search query text
        text: String,

        /// Search mode
        #[arg(short, long, value_enum, default_value_t = SearchMode::Hybrid)]
        mode: SearchMode,

        /// Maximum number of results to return (defaults to config value)
        #[arg(short, long)]
        limit: Option<usize>,

        /// Hybrid-mode weight for the keyword leg
        #[arg(long)]
        keyword_weight: Option<f32>,

        /// Hybrid-mode weight for the semantic leg
        #[arg(long)]
        semantic_weight: Option<f32>,

        /// Show results in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Initialize default configuration
    Init {
        /// Force overwrite existing config
        #[arg(short, long)]
        force: bool,
    },

    /// Validate configuration file
    Validate {
        /// Path to config file (defaults to standard location)
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

impl Cli {
    /// Parse CLI arguments from command line
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
