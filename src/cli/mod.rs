use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::DEFAULT_CONFIG_FILE;

#[derive(Parser)]
#[command(name = "ragcompare")]
#[command(author, version, about = "Compare Solr keyword search and Milvus vector search behind one HTTP endpoint")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, global = true, default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP query router
    Serve {
        /// Host to bind to (overrides configuration)
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on (overrides configuration)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Populate a backend from the CSV corpora
    Index {
        #[command(subcommand)]
        target: Target,
    },

    /// Inspect a backend
    Check {
        #[command(subcommand)]
        target: CheckTarget,
    },
}

/// Backends the offline indexer can populate.
#[derive(Subcommand)]
pub enum Target {
    /// Bulk-submit documents to the Solr core
    Solr,
    /// Drop, recreate and fill the Milvus collection
    Milvus,
}

#[derive(Subcommand)]
pub enum CheckTarget {
    /// List collections and count rows in the target collection
    Milvus,
}
