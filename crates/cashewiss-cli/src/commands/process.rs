//! Statement processing and Cashew export

use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use cashewiss_core::{
    detect_provider, preview_csv, write_csv, CashewClient, DateRange, MatchSource, Processor,
    Provider, ResolutionStats, Settings, TableKind, TransactionBatch,
};
use chrono::NaiveDate;

use super::{build_processor, parse_provider, truncate};

/// Rows shown by `--dry-run`
const PREVIEW_ROWS: usize = 5;

/// Suggestions printed for unmatched transactions
const MAX_SUGGESTIONS: usize = 10;

/// Options for `cashewiss process`
#[derive(Debug, Default)]
pub struct ProcessOptions {
    pub files: Vec<PathBuf>,
    pub provider: Option<String>,
    pub name: Option<String>,
    pub account: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
    pub mappings: Vec<PathBuf>,
    pub csv: Option<PathBuf>,
    pub dry_run: bool,
    pub open: bool,
    pub route_only: bool,
    pub no_predict: bool,
}

pub fn cmd_process(settings: &Settings, opts: &ProcessOptions) -> Result<()> {
    if opts.files.is_empty() {
        anyhow::bail!("No statement files given");
    }

    let statements = opts
        .files
        .iter()
        .map(|path| {
            fs::read_to_string(path)
                .with_context(|| format!("Failed to open file: {}", path.display()))
                .map(|content| (path.as_path(), content))
        })
        .collect::<Result<Vec<_>>>()?;

    let provider = match opts.provider.as_deref() {
        Some(name) => parse_provider(name)?,
        None => detect_statements_provider(&statements)?,
    };
    let range = parse_date_range(opts.from.as_deref(), opts.to.as_deref())?;

    let mut processor = build_processor(settings, provider, &opts.mappings, !opts.no_predict)?;
    if let Some(name) = &opts.name {
        processor = processor.with_name(name.as_str());
    }
    if let Some(account) = &opts.account {
        processor = processor.with_account(account.as_str());
    }

    println!(
        "📥 Processing {} file(s) as {}...",
        statements.len(),
        provider.display_name()
    );

    let mut batch = TransactionBatch::new(processor.name(), Vec::new());
    let mut stats = ResolutionStats::default();
    for (path, content) in &statements {
        let outcome = processor
            .process(content.as_bytes(), range)
            .with_context(|| format!("Failed to process {}", path.display()))?;
        println!("   {}: {} transactions", path.display(), outcome.batch.len());
        stats.merge(&outcome.stats);
        batch.extend(outcome.batch);
    }

    let duplicates = batch.dedup();
    batch.sort_by_date();
    stats.recount(&batch);

    print_summary(&batch, &stats, duplicates);

    if !opts.no_predict && processor.resolver().has_predictor() {
        print_suggestions(&processor, &batch);
    }

    if batch.is_empty() {
        println!();
        println!("Nothing to export.");
        return Ok(());
    }

    if let Some(path) = &opts.csv {
        export_csv(&batch, path)?;
    }

    if !opts.dry_run && !opts.open {
        if opts.csv.is_none() {
            println!();
            println!("💡 Tip: Use --dry-run to preview, --csv to write a file, or --open to send to Cashew");
        }
        return Ok(());
    }

    let client = CashewClient::new(&settings.cashew_url)
        .with_context(|| format!("Invalid Cashew URL: {}", settings.cashew_url))?;
    let urls = client.batch_urls(&batch, settings.batch_size, opts.route_only)?;

    if opts.dry_run {
        println!();
        println!("📝 CSV preview:");
        print!("{}", preview_csv(&batch, PREVIEW_ROWS)?);
        println!();
        println!(
            "🔗 {} batch URL(s) of up to {} transactions. First:",
            urls.len(),
            settings.batch_size
        );
        if let Some(url) = urls.first() {
            println!("{}", url);
        }
        if opts.open {
            println!("   Dry run: not opening anything");
        }
    } else {
        open_batches(&urls, settings.pause_secs)?;
    }

    Ok(())
}

/// Detect the provider of the first statement and check the rest match
fn detect_statements_provider(statements: &[(&Path, String)]) -> Result<Provider> {
    let mut detected = None;
    for (path, content) in statements {
        let provider = detect_provider(content).ok_or_else(|| {
            anyhow::anyhow!(
                "Could not auto-detect provider for {}.\n\
                 Specify --provider with one of: swisscard, viseca, zkb, migros",
                path.display()
            )
        })?;
        match detected {
            None => detected = Some(provider),
            Some(first) if first != provider => anyhow::bail!(
                "{} looks like a {} export, expected {}",
                path.display(),
                provider.display_name(),
                first.display_name()
            ),
            Some(_) => {}
        }
    }
    detected.ok_or_else(|| anyhow::anyhow!("No statement files given"))
}

pub fn parse_date_range(from: Option<&str>, to: Option<&str>) -> Result<DateRange> {
    let parse = |s: &str| {
        NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .with_context(|| format!("Invalid date '{}', expected YYYY-MM-DD", s))
    };
    let from = from.map(parse).transpose()?;
    let to = to.map(parse).transpose()?;
    Ok(DateRange::new(from, to)?)
}

fn print_summary(batch: &TransactionBatch, stats: &ResolutionStats, duplicates: usize) {
    println!();
    println!("📊 {} transactions ready for Cashew", batch.len());

    let counts = [
        (MatchSource::MerchantExact, stats.by_merchant),
        (MatchSource::MerchantToken, stats.by_merchant_token),
        (MatchSource::MerchantCategory, stats.by_merchant_category),
        (MatchSource::RegisteredCategory, stats.by_registered_category),
        (MatchSource::Default, stats.by_default),
    ];
    for (source, count) in counts {
        if count > 0 {
            println!("   - By {}: {}", source, count);
        }
    }
    if duplicates > 0 {
        println!("   Duplicates removed: {}", duplicates);
    }
    if stats.out_of_range > 0 {
        println!("   Outside date range: {}", stats.out_of_range);
    }

    if let Some(tx) = batch.iter().next() {
        println!();
        println!("Example transaction:");
        match serde_json::to_string_pretty(&tx.to_cashew()) {
            Ok(json) => println!("{}", json),
            Err(_) => println!("   {} {} {}", tx.date, tx.title, tx.mapping),
        }
    }
}

/// Predicted categories for transactions that fell through to the default.
/// Printed only; the exported mapping is unchanged.
fn print_suggestions(processor: &Processor, batch: &TransactionBatch) {
    let suggestions: Vec<_> = batch
        .iter()
        .filter(|tx| tx.match_source() == Some(MatchSource::Default))
        .filter_map(|tx| {
            let resolution = processor
                .resolver()
                .lookup_label(TableKind::Merchant, &tx.title)?;
            (resolution.source == MatchSource::Predicted).then_some((tx, resolution.mapping))
        })
        .take(MAX_SUGGESTIONS)
        .collect();

    if suggestions.is_empty() {
        return;
    }

    println!();
    println!("💡 Suggestions for unmatched transactions (add them to a mappings file):");
    for (tx, mapping) in suggestions {
        println!("   {:<40} → {}", truncate(&tx.title, 40), mapping);
    }
}

fn export_csv(batch: &TransactionBatch, path: &Path) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create file: {}", path.display()))?;
    write_csv(batch, BufWriter::new(file))
        .with_context(|| format!("Failed to write CSV: {}", path.display()))?;

    println!();
    println!("💾 Wrote {} transactions to {}", batch.len(), path.display());
    Ok(())
}

fn open_batches(urls: &[String], pause_secs: u64) -> Result<()> {
    println!();
    for (i, url) in urls.iter().enumerate() {
        println!("🌐 Opening batch {}/{}...", i + 1, urls.len());
        open_url(url)?;
        if i + 1 < urls.len() {
            thread::sleep(Duration::from_secs(pause_secs));
        }
    }
    println!("✅ Sent {} batch(es) to Cashew", urls.len());
    Ok(())
}

/// Open a URL with the platform's default handler
fn open_url(url: &str) -> Result<()> {
    let status = if cfg!(target_os = "macos") {
        Command::new("open").arg(url).status()
    } else if cfg!(target_os = "windows") {
        Command::new("cmd").args(["/C", "start", ""]).arg(url).status()
    } else {
        Command::new("xdg-open").arg(url).status()
    }
    .context("Failed to launch the browser")?;

    if !status.success() {
        anyhow::bail!("Browser launcher exited with {}", status);
    }
    Ok(())
}
