//! Data models for cashewiss

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

use crate::error::{Error, Result};
use crate::mapping::CategoryMapping;
use crate::resolver::MatchSource;
use crate::taxonomy::{Category, Subcategory};

/// Supported statement providers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Swisscard,
    Viseca,
    Zkb,
    Migros,
}

impl Provider {
    pub const ALL: [Provider; 4] = [Self::Swisscard, Self::Viseca, Self::Zkb, Self::Migros];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Swisscard => "swisscard",
            Self::Viseca => "viseca",
            Self::Zkb => "zkb",
            Self::Migros => "migros",
        }
    }

    /// Human-readable processor name, used as the transaction note
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Swisscard => "SwissCard",
            Self::Viseca => "Viseca",
            Self::Zkb => "ZKB",
            Self::Migros => "Migros Bank",
        }
    }
}

impl std::str::FromStr for Provider {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "swisscard" | "swiss_card" => Ok(Self::Swisscard),
            "viseca" => Ok(Self::Viseca),
            "zkb" | "zuercherkantonalbank" | "zürcher kantonalbank" => Ok(Self::Zkb),
            "migros" | "migrosbank" | "migros_bank" | "migros-bank" => Ok(Self::Migros),
            _ => Err(format!("Unknown provider: {}", s)),
        }
    }
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Inclusive date filter; either bound may be open
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl DateRange {
    pub fn new(from: Option<NaiveDate>, to: Option<NaiveDate>) -> Result<Self> {
        if let (Some(from), Some(to)) = (from, to) {
            if from > to {
                return Err(Error::InvalidData(format!(
                    "Date range starts after it ends: {} > {}",
                    from, to
                )));
            }
        }
        Ok(Self { from, to })
    }

    /// No bounds
    pub fn all() -> Self {
        Self::default()
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.from.map_or(true, |from| date >= from) && self.to.map_or(true, |to| date <= to)
    }
}

/// A normalized, categorized transaction
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Transaction {
    pub date: NaiveDate,
    pub title: String,
    /// Signed amount: negative for spending, positive for income
    pub amount: f64,
    pub currency: String,
    #[serde(flatten)]
    pub mapping: CategoryMapping,
    pub notes: Option<String>,
    pub account: Option<String>,
    /// Provider-specific extras (card number, references, original categories)
    pub meta: BTreeMap<String, String>,
}

impl Transaction {
    pub fn category(&self) -> Category {
        self.mapping.category()
    }

    pub fn subcategory(&self) -> Option<Subcategory> {
        self.mapping.subcategory()
    }

    /// SHA-256 fingerprint assigned during import
    pub fn fingerprint(&self) -> Option<&str> {
        self.meta.get("fingerprint").map(String::as_str)
    }

    /// Resolution strategy recorded during processing
    pub fn match_source(&self) -> Option<MatchSource> {
        self.meta.get("match_source")?.parse().ok()
    }

    pub fn to_cashew(&self) -> CashewTransaction {
        CashewTransaction {
            date: self.date.format("%Y-%m-%d").to_string(),
            title: self.title.clone(),
            amount: self.amount,
            currency: self.currency.clone(),
            category: self.category().as_str().to_string(),
            subcategory: self.subcategory().map(|s| s.as_str().to_string()),
            account: self.account.clone(),
            notes: self.notes.clone(),
        }
    }
}

/// Transaction in the shape Cashew's `addTransaction` route expects
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CashewTransaction {
    pub date: String,
    pub title: String,
    pub amount: f64,
    pub currency: String,
    pub category: String,
    pub subcategory: Option<String>,
    pub account: Option<String>,
    pub notes: Option<String>,
}

/// Transactions produced by one processing run
#[derive(Debug, Clone, Default)]
pub struct TransactionBatch {
    pub source: String,
    pub transactions: Vec<Transaction>,
}

impl TransactionBatch {
    pub fn new(source: impl Into<String>, transactions: Vec<Transaction>) -> Self {
        Self {
            source: source.into(),
            transactions,
        }
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Transaction> {
        self.transactions.iter()
    }

    /// Append another batch's transactions
    pub fn extend(&mut self, other: TransactionBatch) {
        self.transactions.extend(other.transactions);
    }

    /// Drop transactions whose fingerprint was already seen, keeping the
    /// first occurrence. Returns the number removed.
    pub fn dedup(&mut self) -> usize {
        let before = self.transactions.len();
        let mut seen = HashSet::new();
        self.transactions.retain(|tx| match tx.fingerprint() {
            Some(fp) => seen.insert(fp.to_string()),
            None => true,
        });
        before - self.transactions.len()
    }

    /// Sort oldest first, keeping file order for equal dates
    pub fn sort_by_date(&mut self) {
        self.transactions.sort_by_key(|tx| tx.date);
    }

    pub fn to_cashew_format(&self) -> Vec<CashewTransaction> {
        self.transactions.iter().map(Transaction::to_cashew).collect()
    }
}

impl<'a> IntoIterator for &'a TransactionBatch {
    type Item = &'a Transaction;
    type IntoIter = std::slice::Iter<'a, Transaction>;

    fn into_iter(self) -> Self::IntoIter {
        self.transactions.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tx(date: (i32, u32, u32), title: &str, fingerprint: Option<&str>) -> Transaction {
        let mut meta = BTreeMap::new();
        if let Some(fp) = fingerprint {
            meta.insert("fingerprint".to_string(), fp.to_string());
        }
        Transaction {
            date: NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
            title: title.to_string(),
            amount: -10.0,
            currency: "CHF".to_string(),
            mapping: CategoryMapping::from(Subcategory::Social),
            notes: Some("ZKB".to_string()),
            account: Some("ZKB".to_string()),
            meta,
        }
    }

    #[test]
    fn test_provider_from_str() {
        assert_eq!("SwissCard".parse::<Provider>().unwrap(), Provider::Swisscard);
        assert_eq!("migros-bank".parse::<Provider>().unwrap(), Provider::Migros);
        assert_eq!("ZKB".parse::<Provider>().unwrap(), Provider::Zkb);
        assert!("postfinance".parse::<Provider>().is_err());
    }

    #[test]
    fn test_date_range() {
        let from = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let to = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();
        let range = DateRange::new(Some(from), Some(to)).unwrap();

        assert!(range.contains(from));
        assert!(range.contains(to));
        assert!(!range.contains(NaiveDate::from_ymd_opt(2024, 2, 1).unwrap()));
        assert!(DateRange::all().contains(NaiveDate::from_ymd_opt(1999, 5, 5).unwrap()));

        assert!(DateRange::new(Some(to), Some(from)).is_err());
    }

    #[test]
    fn test_to_cashew_format() {
        let batch = TransactionBatch::new("ZKB", vec![tx((2024, 3, 9), "Kir Royal", None)]);
        let cashew = batch.to_cashew_format();

        assert_eq!(cashew.len(), 1);
        assert_eq!(cashew[0].date, "2024-03-09");
        assert_eq!(cashew[0].category, "Dining");
        assert_eq!(cashew[0].subcategory.as_deref(), Some("Social"));
        assert_eq!(cashew[0].notes.as_deref(), Some("ZKB"));
    }

    #[test]
    fn test_transaction_serializes_flat_mapping() {
        let json = serde_json::to_value(tx((2024, 3, 9), "Kir Royal", None)).unwrap();
        assert_eq!(json["category"], "Dining");
        assert_eq!(json["subcategory"], "Social");
        assert_eq!(json["date"], "2024-03-09");
    }

    #[test]
    fn test_dedup_keeps_first_occurrence() {
        let mut batch = TransactionBatch::new(
            "ZKB",
            vec![
                tx((2024, 1, 2), "first", Some("aaa")),
                tx((2024, 1, 2), "duplicate", Some("aaa")),
                tx((2024, 1, 3), "other", Some("bbb")),
                tx((2024, 1, 3), "no fingerprint", None),
            ],
        );

        assert_eq!(batch.dedup(), 1);
        assert_eq!(batch.len(), 3);
        assert_eq!(batch.transactions[0].title, "first");
    }

    #[test]
    fn test_sort_by_date() {
        let mut batch = TransactionBatch::new(
            "ZKB",
            vec![tx((2024, 2, 1), "late", None), tx((2024, 1, 1), "early", None)],
        );
        batch.sort_by_date();
        assert_eq!(batch.transactions[0].title, "early");
    }
}
