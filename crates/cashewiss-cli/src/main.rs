//! Cashewiss CLI - Swiss bank exports to Cashew
//!
//! Usage:
//!   cashewiss process --file statement.csv --dry-run   Categorize and preview
//!   cashewiss process --file a.csv b.csv --open        Send to Cashew in batches
//!   cashewiss categories                               Show the taxonomy
//!   cashewiss resolve --provider zkb --merchant "SBB"  Try a single resolution

mod cli;
mod commands;


use anyhow::{Context, Result};
use cashewiss_core::config::load_settings;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    let settings = load_settings(cli.config.as_deref()).context("Failed to load settings")?;

    match cli.command {
        Commands::Process {
            file,
            provider,
            name,
            account,
            from,
            to,
            mappings,
            csv,
            dry_run,
            open,
            route_only,
            no_predict,
        } => commands::cmd_process(
            &settings,
            &commands::ProcessOptions {
                files: file,
                provider,
                name,
                account,
                from,
                to,
                mappings,
                csv,
                dry_run,
                open,
                route_only,
                no_predict,
            },
        ),
        Commands::Categories => commands::cmd_categories(),
        Commands::Mappings { provider, table } => {
            commands::cmd_mappings(&settings, &provider, table.as_deref())
        }
        Commands::Resolve {
            provider,
            merchant,
            merchant_category,
            registered_category,
            amount,
        } => commands::cmd_resolve(
            &settings,
            &provider,
            merchant.as_deref(),
            merchant_category.as_deref(),
            registered_category.as_deref(),
            amount,
        ),
        Commands::Lookup {
            provider,
            table,
            label,
            no_predict,
        } => commands::cmd_lookup(&settings, &provider, &table, &label, no_predict),
    }
}
