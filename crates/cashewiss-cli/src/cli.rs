//! CLI argument definitions using clap
//!
//! This module contains the clap structs and enums for parsing CLI arguments.
//! The command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Cashewiss - Swiss bank exports to Cashew
#[derive(Parser)]
#[command(name = "cashewiss")]
#[command(about = "Categorize Swiss bank exports and send them to Cashew", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Settings file
    ///
    /// Defaults to config.toml in the cashewiss data directory, then to the
    /// built-in settings.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Categorize statement files and export them to Cashew
    Process {
        /// Statement files (several files of one provider are merged and deduplicated)
        #[arg(short, long, required = true, num_args = 1..)]
        file: Vec<PathBuf>,

        /// Provider: swisscard, viseca, zkb, migros (auto-detected if not specified)
        #[arg(short, long)]
        provider: Option<String>,

        /// Processor name, written to each transaction's note
        #[arg(short, long)]
        name: Option<String>,

        /// Cashew account (defaults to the processor name)
        #[arg(short, long)]
        account: Option<String>,

        /// First date to include (YYYY-MM-DD)
        #[arg(long)]
        from: Option<String>,

        /// Last date to include (YYYY-MM-DD)
        #[arg(long)]
        to: Option<String>,

        /// Extra mapping files, applied after the built-in and user tables
        #[arg(short, long)]
        mappings: Vec<PathBuf>,

        /// Write a Cashew CSV import file
        #[arg(long)]
        csv: Option<PathBuf>,

        /// Show a CSV preview and the first deep-link without opening anything
        #[arg(long)]
        dry_run: bool,

        /// Open each batch deep-link in the browser
        #[arg(long)]
        open: bool,

        /// Use the addTransactionRoute endpoint (review before saving)
        #[arg(long)]
        route_only: bool,

        /// Skip category suggestions for unmatched transactions
        #[arg(long)]
        no_predict: bool,
    },

    /// Show the category taxonomy
    Categories,

    /// Show the effective mapping tables for a provider
    Mappings {
        /// Provider: swisscard, viseca, zkb, migros
        #[arg(short, long)]
        provider: String,

        /// Only this table: merchant, merchant_category, registered_category
        #[arg(short, long)]
        table: Option<String>,
    },

    /// Resolve a category for hand-entered transaction fields
    Resolve {
        /// Provider whose tables are used
        #[arg(short, long)]
        provider: String,

        /// Merchant name
        #[arg(short, long)]
        merchant: Option<String>,

        /// Provider merchant category
        #[arg(long)]
        merchant_category: Option<String>,

        /// Provider registered category
        #[arg(long)]
        registered_category: Option<String>,

        /// Signed amount (negative for spending)
        #[arg(short, long, allow_hyphen_values = true)]
        amount: Option<f64>,
    },

    /// Look up one label in a mapping table, with the predictor as fallback
    Lookup {
        /// Provider whose tables are used
        #[arg(short, long)]
        provider: String,

        /// Table: merchant, merchant_category, registered_category
        #[arg(short, long)]
        table: String,

        /// Label to look up
        label: String,

        /// Table lookup only
        #[arg(long)]
        no_predict: bool,
    },
}
