//! Shared command utilities
//!
//! This module contains:
//! - `parse_provider` - Provider names with a helpful error
//! - `build_processor` - Processor with every mapping layer applied

use std::path::PathBuf;

use anyhow::{Context, Result};
use cashewiss_core::{config::load_user_mappings, MappingSet, Processor, Provider, Settings};
use tracing::info;

pub fn parse_provider(name: &str) -> Result<Provider> {
    name.parse().map_err(|_| {
        anyhow::anyhow!(
            "Unknown provider: {}\nUse one of: swisscard, viseca, zkb, migros",
            name
        )
    })
}

/// Build a processor for `provider`: built-in tables, then the user's
/// override file, then settings mapping files, then `extra_mappings`.
pub fn build_processor(
    settings: &Settings,
    provider: Provider,
    extra_mappings: &[PathBuf],
    predict: bool,
) -> Result<Processor> {
    let mut processor = Processor::new(provider)
        .with_context(|| format!("Failed to load built-in {} mappings", provider))?;

    if predict {
        if let Some(predictor) = settings.predictor() {
            processor = processor.with_predictor(predictor);
        }
    }

    if let Some(set) = load_user_mappings(provider)
        .with_context(|| format!("Failed to load user mappings for {}", provider))?
    {
        let count = processor.extend_mappings(&set)?;
        info!("Applied {} user mappings for {}", count, provider);
    }

    for path in settings.mapping_files.iter().chain(extra_mappings) {
        let set = MappingSet::load(path)
            .with_context(|| format!("Failed to load mappings: {}", path.display()))?;
        let count = processor
            .extend_mappings(&set)
            .with_context(|| format!("Invalid mappings in {}", path.display()))?;
        info!("Applied {} mappings from {}", count, path.display());
    }

    Ok(processor)
}
