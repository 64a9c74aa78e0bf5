//! Effective mapping tables

use anyhow::Result;
use cashewiss_core::{Settings, TableKind};

use super::{build_processor, parse_provider, truncate};

pub fn cmd_mappings(settings: &Settings, provider: &str, table: Option<&str>) -> Result<()> {
    let provider = parse_provider(provider)?;
    let kinds = match table {
        Some(name) => vec![name.parse::<TableKind>()?],
        None => TableKind::ALL.to_vec(),
    };

    let processor = build_processor(settings, provider, &[], false)?;
    let tables = processor.resolver().tables();

    for kind in kinds {
        let entries = tables.entries(kind);
        println!();
        println!(
            "📋 {} {} ({} entries)",
            provider.display_name(),
            kind,
            entries.len()
        );
        if entries.is_empty() {
            println!("   (none)");
            continue;
        }
        for (key, mapping) in entries {
            println!("   {:<40} → {}", truncate(key, 40), mapping);
        }
    }

    Ok(())
}
