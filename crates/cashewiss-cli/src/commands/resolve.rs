//! Single-row resolution and single-label lookup

use anyhow::Result;
use cashewiss_core::{Error, Settings, TableKind, TransactionRow};

use super::{build_processor, parse_provider};

pub fn cmd_resolve(
    settings: &Settings,
    provider: &str,
    merchant: Option<&str>,
    merchant_category: Option<&str>,
    registered_category: Option<&str>,
    amount: Option<f64>,
) -> Result<()> {
    let provider = parse_provider(provider)?;
    let processor = build_processor(settings, provider, &[], false)?;
    let resolver = processor.resolver();
    let roles = resolver.roles();

    let fields = [
        ("merchant", roles.merchant.as_deref(), merchant),
        (
            "merchant category",
            roles.merchant_category.as_deref(),
            merchant_category,
        ),
        (
            "registered category",
            roles.registered_category.as_deref(),
            registered_category,
        ),
    ];

    let mut row = TransactionRow::new();
    for (label, field, value) in fields {
        match (field, value) {
            (Some(field), Some(value)) => row = row.with(field, value),
            (None, Some(_)) => {
                println!(
                    "   ⚠️  {} rows have no {}; ignoring it",
                    provider.display_name(),
                    label
                );
            }
            _ => {}
        }
    }
    if let Some(amount) = amount {
        row = row.with(roles.amount.as_str(), amount);
    }

    let resolution = resolver.resolve_with_source(&row).map_err(|e| match e {
        Error::MissingField(field) => anyhow::anyhow!(
            "No table entry matched and '{}' is needed for the default.\nPass --amount",
            field
        ),
        other => other.into(),
    })?;

    println!("✅ {}", resolution.mapping);
    println!("   Matched by: {}", resolution.source);
    Ok(())
}

pub fn cmd_lookup(
    settings: &Settings,
    provider: &str,
    table: &str,
    label: &str,
    no_predict: bool,
) -> Result<()> {
    let provider = parse_provider(provider)?;
    let kind: TableKind = table.parse()?;
    let processor = build_processor(settings, provider, &[], !no_predict)?;

    match processor.resolver().lookup_label(kind, label) {
        Some(resolution) => {
            println!("✅ {} → {}", label, resolution.mapping);
            println!("   Matched by: {}", resolution.source);
        }
        None => {
            println!("❓ No {} mapping for '{}'", kind, label);
        }
    }
    Ok(())
}
