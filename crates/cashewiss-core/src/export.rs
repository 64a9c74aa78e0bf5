//! Export to Cashew: `addTransaction` deep-links and CSV import files

use csv::WriterBuilder;
use serde::Serialize;
use std::io::Write;
use tracing::debug;
use url::Url;

use crate::error::{Error, Result};
use crate::models::{CashewTransaction, Transaction, TransactionBatch};

/// Cashew web app; `https://cashewapp.web.app` opens the mobile app instead
pub const DEFAULT_CASHEW_URL: &str = "https://budget-track.web.app";

/// Transactions per deep-link, keeping URLs within browser limits
pub const DEFAULT_BATCH_SIZE: usize = 25;

/// Cashew CSV import header
const CSV_HEADER: [&str; 7] = [
    "Date",
    "Amount",
    "Category",
    "Subcategory",
    "Title",
    "Note",
    "Account",
];

#[derive(Serialize)]
struct Payload<'a> {
    transactions: &'a [CashewTransaction],
}

/// Builds Cashew deep-link URLs
#[derive(Debug, Clone)]
pub struct CashewClient {
    base_url: String,
}

impl Default for CashewClient {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_CASHEW_URL.to_string(),
        }
    }
}

impl CashewClient {
    pub fn new(base_url: &str) -> Result<Self> {
        let base_url = base_url.trim_end_matches('/').to_string();
        Url::parse(&base_url)?;
        Ok(Self { base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, route_only: bool) -> Result<Url> {
        let route = if route_only {
            "addTransactionRoute"
        } else {
            "addTransaction"
        };
        Ok(Url::parse(&format!("{}/{}", self.base_url, route))?)
    }

    /// One URL adding all given transactions via the `JSON` parameter
    pub fn add_transactions_url(&self, transactions: &[Transaction], route_only: bool) -> Result<String> {
        validate(transactions)?;
        let cashew: Vec<CashewTransaction> = transactions.iter().map(Transaction::to_cashew).collect();
        let json = serde_json::to_string(&Payload {
            transactions: &cashew,
        })?;

        let mut url = self.endpoint(route_only)?;
        url.query_pairs_mut().append_pair("JSON", &json);
        Ok(url.into())
    }

    /// URL for a single transaction using individual query parameters
    pub fn transaction_url(&self, tx: &Transaction, route_only: bool) -> Result<String> {
        validate(std::slice::from_ref(tx))?;
        let mut url = self.endpoint(route_only)?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("amount", &tx.amount.to_string());
            query.append_pair("title", &tx.title);
            if let Some(notes) = tx.notes.as_deref().filter(|n| !n.is_empty()) {
                query.append_pair("notes", notes);
            }
            query.append_pair("date", &tx.date.format("%Y-%m-%d").to_string());
            query.append_pair("category", tx.category().as_str());
            if let Some(sub) = tx.subcategory() {
                query.append_pair("subcategory", sub.as_str());
            }
            if let Some(account) = tx.account.as_deref().filter(|a| !a.is_empty()) {
                query.append_pair("account", account);
            }
        }
        Ok(url.into())
    }

    /// Split a batch into chunks of at most `max_size` and build one URL each
    pub fn batch_urls(&self, batch: &TransactionBatch, max_size: usize, route_only: bool) -> Result<Vec<String>> {
        if max_size == 0 {
            return Err(Error::InvalidData("Batch size must be at least 1".into()));
        }
        validate(&batch.transactions)?;

        let urls = batch
            .transactions
            .chunks(max_size)
            .map(|chunk| self.add_transactions_url(chunk, route_only))
            .collect::<Result<Vec<_>>>()?;
        debug!(
            "Split {} transactions into {} batches of max {}",
            batch.len(),
            urls.len(),
            max_size
        );
        Ok(urls)
    }
}

/// Cashew needs a title on every transaction
fn validate(transactions: &[Transaction]) -> Result<()> {
    for (i, tx) in transactions.iter().enumerate() {
        if tx.title.trim().is_empty() {
            return Err(Error::InvalidData(format!(
                "Invalid transaction at index {}: missing title",
                i
            )));
        }
    }
    Ok(())
}

/// Write a batch as a Cashew CSV import file
pub fn write_csv<W: Write>(batch: &TransactionBatch, writer: W) -> Result<()> {
    write_rows(batch.transactions.iter(), writer)
}

/// Header plus the first `rows` transactions as CSV text
pub fn preview_csv(batch: &TransactionBatch, rows: usize) -> Result<String> {
    let mut buf = Vec::new();
    write_rows(batch.transactions.iter().take(rows), &mut buf)?;
    String::from_utf8(buf).map_err(|e| Error::InvalidData(format!("CSV is not UTF-8: {}", e)))
}

fn write_rows<'a, I, W>(transactions: I, writer: W) -> Result<()>
where
    I: Iterator<Item = &'a Transaction>,
    W: Write,
{
    let mut wtr = WriterBuilder::new().from_writer(writer);
    wtr.write_record(CSV_HEADER)?;
    for tx in transactions {
        wtr.write_record([
            tx.date.format("%d/%m/%Y 00:00").to_string(),
            tx.amount.to_string(),
            tx.category().as_str().to_string(),
            tx.subcategory().map(|s| s.as_str()).unwrap_or_default().to_string(),
            tx.title.clone(),
            tx.notes.clone().unwrap_or_default(),
            tx.account.clone().unwrap_or_default(),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::CategoryMapping;
    use crate::taxonomy::{Category, Subcategory};
    use chrono::NaiveDate;
    use std::collections::BTreeMap;

    fn tx(title: &str, amount: f64, mapping: CategoryMapping) -> Transaction {
        Transaction {
            date: NaiveDate::from_ymd_opt(2024, 3, 9).unwrap(),
            title: title.to_string(),
            amount,
            currency: "CHF".to_string(),
            mapping,
            notes: Some("ZKB".to_string()),
            account: Some("ZKB".to_string()),
            meta: BTreeMap::new(),
        }
    }

    fn batch(n: usize) -> TransactionBatch {
        let txs = (0..n)
            .map(|i| tx(&format!("Shop {}", i), -1.0, CategoryMapping::bare(Category::Shopping)))
            .collect();
        TransactionBatch::new("ZKB", txs)
    }

    #[test]
    fn test_trailing_slash_is_trimmed() {
        let client = CashewClient::new("https://cashewapp.web.app/").unwrap();
        assert_eq!(client.base_url(), "https://cashewapp.web.app");
        assert!(CashewClient::new("not a url").is_err());
    }

    #[test]
    fn test_add_transactions_url_round_trips_json() {
        let client = CashewClient::default();
        let txs = vec![tx("Kir Royal", -42.5, Subcategory::Social.into())];
        let url = client.add_transactions_url(&txs, false).unwrap();

        assert!(url.starts_with("https://budget-track.web.app/addTransaction?JSON="));

        let parsed = Url::parse(&url).unwrap();
        let (key, json) = parsed.query_pairs().next().unwrap();
        assert_eq!(key, "JSON");
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        let first = &value["transactions"][0];
        assert_eq!(first["title"], "Kir Royal");
        assert_eq!(first["amount"], -42.5);
        assert_eq!(first["date"], "2024-03-09");
        assert_eq!(first["category"], "Dining");
        assert_eq!(first["subcategory"], "Social");
        assert_eq!(first["currency"], "CHF");
    }

    #[test]
    fn test_route_only_endpoint() {
        let client = CashewClient::default();
        let url = client
            .add_transactions_url(&[tx("x", -1.0, CategoryMapping::bare(Category::Shopping))], true)
            .unwrap();
        assert!(url.contains("/addTransactionRoute?"));
    }

    #[test]
    fn test_transaction_url_params() {
        let client = CashewClient::default();
        let url = client
            .transaction_url(&tx("Coop Pronto", -3.2, CategoryMapping::bare(Category::Shopping)), false)
            .unwrap();
        let parsed = Url::parse(&url).unwrap();
        let params: BTreeMap<String, String> = parsed.query_pairs().into_owned().collect();

        assert_eq!(params["amount"], "-3.2");
        assert_eq!(params["title"], "Coop Pronto");
        assert_eq!(params["date"], "2024-03-09");
        assert_eq!(params["category"], "Shopping");
        assert_eq!(params["account"], "ZKB");
        assert!(!params.contains_key("subcategory"));
    }

    #[test]
    fn test_batch_urls_split() {
        let client = CashewClient::default();
        let urls = client.batch_urls(&batch(60), DEFAULT_BATCH_SIZE, false).unwrap();
        assert_eq!(urls.len(), 3);

        assert!(client.batch_urls(&batch(3), 0, false).is_err());
        assert!(client.batch_urls(&batch(0), 25, false).unwrap().is_empty());
    }

    #[test]
    fn test_missing_title_is_rejected() {
        let client = CashewClient::default();
        let mut bad = batch(3);
        bad.transactions[2].title = "  ".to_string();
        let err = client.batch_urls(&bad, 25, false).unwrap_err();
        assert!(matches!(err, Error::InvalidData(msg) if msg.contains("index 2")));
    }

    #[test]
    fn test_write_csv() {
        let batch = TransactionBatch::new(
            "ZKB",
            vec![
                tx("Kir Royal", -42.5, Subcategory::Social.into()),
                tx("Coop, Zürich", -3.2, CategoryMapping::bare(Category::Shopping)),
            ],
        );
        let mut out = Vec::new();
        write_csv(&batch, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "Date,Amount,Category,Subcategory,Title,Note,Account");
        assert_eq!(lines[1], "09/03/2024 00:00,-42.5,Dining,Social,Kir Royal,ZKB,ZKB");
        // Commas in titles are quoted
        assert_eq!(lines[2], "09/03/2024 00:00,-3.2,Shopping,,\"Coop, Zürich\",ZKB,ZKB");
    }

    #[test]
    fn test_preview_csv() {
        let preview = preview_csv(&batch(10), 5).unwrap();
        assert_eq!(preview.lines().count(), 6);
    }
}
