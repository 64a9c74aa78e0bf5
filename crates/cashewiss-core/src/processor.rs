//! Per-provider processing: parse a statement, resolve categories, and
//! assemble Cashew-ready transactions

use std::io::Read;
use tracing::{debug, info};

use crate::defaults::default_tables;
use crate::error::Result;
use crate::import::{field_roles, parse_statement, ImportedRecord};
use crate::models::{DateRange, Provider, Transaction, TransactionBatch};
use crate::predict::CategoryPredictor;
use crate::resolver::{CategoryResolver, MatchSource};
use crate::tables::MappingSet;

/// Counts per resolution strategy
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolutionStats {
    pub total: usize,
    pub by_merchant: usize,
    pub by_merchant_token: usize,
    pub by_merchant_category: usize,
    pub by_registered_category: usize,
    pub by_default: usize,
    /// Parsed rows dropped by the date filter
    pub out_of_range: usize,
}

impl ResolutionStats {
    fn record(&mut self, source: MatchSource) {
        self.total += 1;
        match source {
            MatchSource::MerchantExact => self.by_merchant += 1,
            MatchSource::MerchantToken => self.by_merchant_token += 1,
            MatchSource::MerchantCategory => self.by_merchant_category += 1,
            MatchSource::RegisteredCategory => self.by_registered_category += 1,
            // Row resolution never consults the predictor
            MatchSource::Predicted => {}
            MatchSource::Default => self.by_default += 1,
        }
    }

    /// Add another run's counts
    pub fn merge(&mut self, other: &ResolutionStats) {
        self.total += other.total;
        self.by_merchant += other.by_merchant;
        self.by_merchant_token += other.by_merchant_token;
        self.by_merchant_category += other.by_merchant_category;
        self.by_registered_category += other.by_registered_category;
        self.by_default += other.by_default;
        self.out_of_range += other.out_of_range;
    }

    /// Rebuild the strategy counts from the transactions left in `batch`,
    /// e.g. after `TransactionBatch::dedup`. The date-filter count is kept.
    pub fn recount(&mut self, batch: &TransactionBatch) {
        *self = Self {
            out_of_range: self.out_of_range,
            ..Self::default()
        };
        for tx in batch {
            if let Some(source) = tx.match_source() {
                self.record(source);
            }
        }
    }

    /// Rows matched by a table entry rather than the default
    pub fn matched(&self) -> usize {
        self.total - self.by_default
    }
}

/// Result of processing one statement
#[derive(Debug, Clone)]
pub struct ProcessOutcome {
    pub batch: TransactionBatch,
    pub stats: ResolutionStats,
}

/// Statement processor for one provider.
///
/// Mapping tables are seeded at construction (shared defaults, then the
/// provider's overrides) and may be extended through `&mut self` before
/// processing. Processing itself only borrows `&self`.
#[derive(Debug)]
pub struct Processor {
    provider: Provider,
    name: String,
    account: String,
    resolver: CategoryResolver,
}

impl Processor {
    pub fn new(provider: Provider) -> Result<Self> {
        let tables = default_tables(provider)?;
        let name = provider.display_name().to_string();
        Ok(Self {
            provider,
            account: name.clone(),
            name,
            resolver: CategoryResolver::new(tables, field_roles(provider)),
        })
    }

    /// Processor name, written to each transaction's notes. Also becomes the
    /// account unless one is set explicitly afterwards.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self.account = self.name.clone();
        self
    }

    pub fn with_account(mut self, account: impl Into<String>) -> Self {
        self.account = account.into();
        self
    }

    pub fn with_predictor(mut self, predictor: impl CategoryPredictor + 'static) -> Self {
        self.resolver = self.resolver.with_predictor(predictor);
        self
    }

    /// Layer additional mappings over the current tables (last write wins)
    pub fn extend_mappings(&mut self, set: &MappingSet) -> Result<usize> {
        let count = self.resolver.tables_mut().seed_set(set)?;
        debug!("Extended {} mappings with {} entries", self.name, count);
        Ok(count)
    }

    pub fn provider(&self) -> Provider {
        self.provider
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn account(&self) -> &str {
        &self.account
    }

    pub fn resolver(&self) -> &CategoryResolver {
        &self.resolver
    }

    /// Parse and categorize a statement
    pub fn process<R: Read>(&self, reader: R, range: DateRange) -> Result<ProcessOutcome> {
        let records = parse_statement(reader, self.provider)?;
        self.process_records(records, range)
    }

    /// Categorize already-parsed records
    pub fn process_records(
        &self,
        records: Vec<ImportedRecord>,
        range: DateRange,
    ) -> Result<ProcessOutcome> {
        let mut stats = ResolutionStats::default();
        let mut transactions = Vec::with_capacity(records.len());

        for record in records {
            if !range.contains(record.date) {
                stats.out_of_range += 1;
                continue;
            }

            let resolution = self.resolver.resolve_with_source(&record.row)?;
            stats.record(resolution.source);

            let mut meta = record.meta;
            meta.insert("processor".to_string(), self.name.clone());
            meta.insert("fingerprint".to_string(), record.fingerprint);
            meta.insert("match_source".to_string(), resolution.source.to_string());

            transactions.push(Transaction {
                date: record.date,
                title: record.title,
                amount: record.amount,
                currency: record.currency,
                mapping: resolution.mapping,
                notes: Some(self.name.clone()),
                account: Some(self.account.clone()),
                meta,
            });
        }

        info!(
            "Processed {} {} transactions ({} matched, {} defaulted, {} outside date range)",
            stats.total,
            self.name,
            stats.matched(),
            stats.by_default,
            stats.out_of_range
        );

        Ok(ProcessOutcome {
            batch: TransactionBatch::new(self.name.clone(), transactions),
            stats,
        })
    }
}
