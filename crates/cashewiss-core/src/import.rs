//! Statement parsers for Swiss providers
//!
//! Each parser turns one export file into [`ImportedRecord`]s: the normalized
//! transaction fields plus a [`TransactionRow`] carrying whatever the provider
//! offers for category resolution.

use chrono::{NaiveDate, NaiveDateTime};
use csv::{ReaderBuilder, StringRecord};
use regex::Regex;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::io::Read;
use tracing::debug;

use crate::error::{Error, Result};
use crate::models::Provider;
use crate::resolver::{FieldRoles, TransactionRow};

/// Amount field name used in rows built by the card parsers
const AMOUNT_FIELD: &str = "Amount";

/// One parsed statement line, before categorization
#[derive(Debug, Clone, PartialEq)]
pub struct ImportedRecord {
    pub date: NaiveDate,
    pub title: String,
    /// Signed amount: negative for spending
    pub amount: f64,
    pub currency: String,
    /// Fields for the resolver, keyed by the provider's [`FieldRoles`]
    pub row: TransactionRow,
    pub meta: BTreeMap<String, String>,
    /// SHA-256 over date, title, amount and provider reference
    pub fingerprint: String,
}

/// Field roles for each provider's rows
pub fn field_roles(provider: Provider) -> FieldRoles {
    match provider {
        Provider::Swisscard => FieldRoles::new(AMOUNT_FIELD)
            .with_merchant("Merchant")
            .with_merchant_category("Merchant Category")
            .with_registered_category("Registered Category"),
        Provider::Viseca => FieldRoles::new(AMOUNT_FIELD)
            .with_merchant("Name")
            .with_merchant_category("PFMCategoryName"),
        Provider::Zkb => FieldRoles::new(AMOUNT_FIELD).with_merchant("Booking text"),
        Provider::Migros => FieldRoles::new("Betrag").with_merchant("Buchungstext"),
    }
}

/// Parse a provider export into records
pub fn parse_statement<R: Read>(mut reader: R, provider: Provider) -> Result<Vec<ImportedRecord>> {
    let mut content = String::new();
    reader.read_to_string(&mut content)?;
    let content = content.trim_start_matches('\u{feff}');

    match provider {
        Provider::Swisscard => parse_swisscard(content),
        Provider::Viseca => parse_viseca(content),
        Provider::Zkb => parse_zkb(content),
        Provider::Migros => parse_migros(content),
    }
}

/// Detect the provider from the first lines of an export
///
/// Migros Bank files start with an account preamble, so every line up to the
/// first recognized header is checked. Returns None if no format matches.
pub fn detect_provider(content: &str) -> Option<Provider> {
    content
        .trim_start_matches('\u{feff}')
        .lines()
        .take(30)
        .find_map(detect_header_line)
}

fn detect_header_line(line: &str) -> Option<Provider> {
    let line = line.trim();

    // Swisscard: "Transaction date,Description,Merchant,Card number,...,Registered Category"
    if line.contains("Transaction date") && line.contains("Registered Category") {
        return Some(Provider::Swisscard);
    }

    // Viseca export of the card API: "date,description,amount,currency,Name,PFMCategoryName,..."
    if line.contains("PFMCategoryName") {
        return Some(Provider::Viseca);
    }

    // ZKB: Date;"Booking text";"ZKB reference";...
    if line.contains("Booking text") && line.contains("ZKB reference") {
        return Some(Provider::Zkb);
    }

    // Migros Bank: Datum;Buchungstext;Mitteilung;...
    if line.trim_start_matches('"').starts_with("Datum") && line.contains("Buchungstext") {
        return Some(Provider::Migros);
    }

    None
}

/// Column lookup by header name
struct Header {
    names: Vec<String>,
}

impl Header {
    fn new(record: &StringRecord) -> Self {
        Self {
            names: record
                .iter()
                .map(|h| h.trim().trim_matches('"').to_string())
                .collect(),
        }
    }

    fn index(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|h| h.eq_ignore_ascii_case(name))
    }

    fn require(&self, columns: &[&str]) -> Result<()> {
        let missing: Vec<&str> = columns
            .iter()
            .copied()
            .filter(|c| self.index(c).is_none())
            .collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(Error::Import(format!(
                "Missing required columns: {}",
                missing.join(", ")
            )))
        }
    }

    /// Trimmed cell text; None when the column is absent or the cell is blank
    fn get<'r>(&self, record: &'r StringRecord, name: &str) -> Option<&'r str> {
        self.index(name)
            .and_then(|i| record.get(i))
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    fn require_value<'r>(&self, record: &'r StringRecord, name: &str) -> Result<&'r str> {
        self.get(record, name)
            .ok_or_else(|| Error::Import(format!("Missing {}", name)))
    }
}

fn reader_for(content: &str, delimiter: u8) -> csv::Reader<&[u8]> {
    ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .delimiter(delimiter)
        .from_reader(content.as_bytes())
}

/// Comma unless the header line has more semicolons than commas
fn sniff_delimiter(content: &str) -> u8 {
    let header = content.lines().next().unwrap_or_default();
    if header.matches(';').count() > header.matches(',').count() {
        b';'
    } else {
        b','
    }
}

fn insert_meta(meta: &mut BTreeMap<String, String>, key: &str, value: Option<&str>) {
    if let Some(value) = value {
        meta.insert(key.to_string(), value.to_string());
    }
}

/// Parse Swisscard statement export
/// Format: Transaction date,Description,Merchant,Card number,Currency,Amount,
/// Foreign Currency,Amount in foreign currency,Debit/Credit,Status,
/// Merchant Category,Registered Category
///
/// Only posted debits are kept. Amounts are positive for debits in the
/// export and are negated here.
fn parse_swisscard(content: &str) -> Result<Vec<ImportedRecord>> {
    let mut rdr = reader_for(content, sniff_delimiter(content));
    let header = Header::new(rdr.headers()?);
    header.require(&[
        "Transaction date",
        "Description",
        "Amount",
        "Currency",
        "Merchant Category",
        "Registered Category",
        "Status",
    ])?;

    let mut records = Vec::new();
    let mut skipped = 0;

    for result in rdr.records() {
        let record = result?;

        let status = header.get(&record, "Status").unwrap_or_default();
        let direction = header.get(&record, "Debit/Credit").unwrap_or_default();
        if status != "Posted" || direction == "Credit" {
            skipped += 1;
            continue;
        }

        let date = parse_date(header.require_value(&record, "Transaction date")?)?;
        let amount = -parse_amount(header.require_value(&record, "Amount")?)?;
        let currency = header.require_value(&record, "Currency")?.to_string();
        let merchant = header.get(&record, "Merchant");
        let title = match merchant {
            Some(m) => m.to_string(),
            None => header.require_value(&record, "Description")?.to_string(),
        };
        let merchant_category = header.get(&record, "Merchant Category");
        let registered_category = header.get(&record, "Registered Category");
        let card_number = header.get(&record, "Card number");

        let mut row = TransactionRow::new().with(AMOUNT_FIELD, amount);
        if let Some(m) = merchant {
            row = row.with("Merchant", m);
        }
        if let Some(c) = merchant_category {
            row = row.with("Merchant Category", c);
        }
        if let Some(c) = registered_category {
            row = row.with("Registered Category", c);
        }

        let mut meta = BTreeMap::new();
        insert_meta(&mut meta, "card_number", card_number);
        insert_meta(&mut meta, "foreign_currency", header.get(&record, "Foreign Currency"));
        insert_meta(
            &mut meta,
            "foreign_amount",
            header.get(&record, "Amount in foreign currency"),
        );
        insert_meta(&mut meta, "original_merchant_category", merchant_category);
        insert_meta(&mut meta, "original_registered_category", registered_category);

        let fingerprint = generate_hash(&date, &title, amount, card_number);
        records.push(ImportedRecord {
            date,
            title,
            amount,
            currency,
            row,
            meta,
            fingerprint,
        });
    }

    debug!(
        "Parsed {} Swisscard transactions ({} pending or credit rows skipped)",
        records.len(),
        skipped
    );
    Ok(records)
}

/// Parse Viseca transactions export
/// Format: date,description,amount,currency,Name,PFMCategoryName,Merchant
///
/// Amounts are positive for debits and are negated here.
fn parse_viseca(content: &str) -> Result<Vec<ImportedRecord>> {
    let mut rdr = reader_for(content, sniff_delimiter(content));
    let header = Header::new(rdr.headers()?);
    header.require(&["date", "description", "amount", "currency"])?;

    let mut records = Vec::new();

    for result in rdr.records() {
        let record = result?;

        let date = parse_date(header.require_value(&record, "date")?)?;
        let title = header.require_value(&record, "description")?.to_string();
        let amount = -parse_amount(header.require_value(&record, "amount")?)?;
        let currency = header.require_value(&record, "currency")?.to_string();
        let name = header.get(&record, "Name");
        let merchant_category = header.get(&record, "PFMCategoryName");

        let mut row = TransactionRow::new().with(AMOUNT_FIELD, amount);
        if let Some(n) = name {
            row = row.with("Name", n);
        }
        if let Some(c) = merchant_category {
            row = row.with("PFMCategoryName", c);
        }

        let mut meta = BTreeMap::new();
        insert_meta(&mut meta, "original_merchant_category", merchant_category);
        insert_meta(&mut meta, "merchant", header.get(&record, "Merchant"));

        let fingerprint = generate_hash(&date, &title, amount, None);
        records.push(ImportedRecord {
            date,
            title,
            amount,
            currency,
            row,
            meta,
            fingerprint,
        });
    }

    debug!("Parsed {} Viseca transactions", records.len());
    Ok(records)
}

/// Parse ZKB account statement
/// Format: Date;"Booking text";"ZKB reference";"Reference number";
/// "Debit CHF";"Credit CHF";"Value date";"Balance CHF"
///
/// Card settlements (Viseca, Swisscard) are dropped since those
/// transactions are imported from the card statements.
fn parse_zkb(content: &str) -> Result<Vec<ImportedRecord>> {
    let mut rdr = reader_for(content, b';');
    let header = Header::new(rdr.headers()?);
    header.require(&["Date", "Booking text", "Debit CHF", "Credit CHF"])?;

    let mut records = Vec::new();
    let mut settlements = 0;

    for result in rdr.records() {
        let record = result?;

        let raw_text = header.require_value(&record, "Booking text")?;
        let title = clean_zkb_booking_text(raw_text);
        let lowered = title.to_lowercase();
        if lowered.contains("viseca") || lowered.contains("swisscard") {
            settlements += 1;
            continue;
        }

        let date = parse_date(header.require_value(&record, "Date")?)?;
        let debit = parse_optional_amount(header.get(&record, "Debit CHF"))?;
        let credit = parse_optional_amount(header.get(&record, "Credit CHF"))?;
        let amount = credit - debit;
        let zkb_reference = header.get(&record, "ZKB reference");

        let row = TransactionRow::new()
            .with("Booking text", title.as_str())
            .with(AMOUNT_FIELD, amount);

        let mut meta = BTreeMap::new();
        insert_meta(&mut meta, "zkb_reference", zkb_reference);
        insert_meta(&mut meta, "reference_number", header.get(&record, "Reference number"));
        insert_meta(&mut meta, "value_date", header.get(&record, "Value date"));
        insert_meta(&mut meta, "balance", header.get(&record, "Balance CHF"));
        insert_meta(&mut meta, "original_text", Some(raw_text));

        let fingerprint = generate_hash(&date, &title, amount, zkb_reference);
        records.push(ImportedRecord {
            date,
            title,
            amount,
            currency: "CHF".to_string(),
            row,
            meta,
            fingerprint,
        });
    }

    debug!(
        "Parsed {} ZKB transactions ({} card settlements dropped)",
        records.len(),
        settlements
    );
    Ok(records)
}

/// Booking texts look like "Debit Card: COOP-1234 ZUERICH, Zürich" or
/// "Credit TWINT: +41 79 123 45 67, JANE DOE". Keeps the part after the last
/// colon, cuts at the first comma when there are several, and rewrites
/// TWINT transfers to "TWINT <Counterparty>".
pub fn clean_zkb_booking_text(text: &str) -> String {
    let is_twint = text.contains("TWINT");
    let after_colon = text.rsplit(':').next().unwrap_or(text);
    let cleaned = if after_colon.matches(',').count() > 1 {
        after_colon.split(',').next().unwrap_or(after_colon)
    } else {
        after_colon
    }
    .trim();

    if is_twint {
        let counterparty = cleaned.rsplit(',').next().unwrap_or(cleaned).trim();
        format!("TWINT {}", title_case(counterparty))
    } else {
        cleaned.to_string()
    }
}

fn title_case(text: &str) -> String {
    text.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

/// Parse Migros Bank account statement
/// Format (after an account preamble): Datum;Buchungstext;Mitteilung;
/// Referenznummer;Betrag;Saldo;Valuta
///
/// Dates are dd.mm.yyyy and amounts use a decimal comma ("-12,32").
fn parse_migros(content: &str) -> Result<Vec<ImportedRecord>> {
    let start = content
        .lines()
        .position(|line| detect_header_line(line) == Some(Provider::Migros))
        .ok_or_else(|| Error::Import("Missing Migros Bank header row (Datum;Buchungstext;...)".into()))?;
    let body = content.lines().skip(start).collect::<Vec<_>>().join("\n");

    let mut rdr = reader_for(&body, b';');
    let header = Header::new(rdr.headers()?);
    header.require(&[
        "Datum",
        "Buchungstext",
        "Mitteilung",
        "Referenznummer",
        "Betrag",
        "Saldo",
        "Valuta",
    ])?;

    let card_settlement = Regex::new(r"Karte:\s*\d+")?;
    let twint_phone = Regex::new(r"\+41\s?7\d")?;

    let mut records = Vec::new();
    let mut settlements = 0;

    for result in rdr.records() {
        let record = result?;
        // Trailing summary lines have no date
        let Some(date_str) = header.get(&record, "Datum") else {
            continue;
        };

        let text = header.require_value(&record, "Buchungstext")?;
        if card_settlement.is_match(text) {
            settlements += 1;
            continue;
        }

        let date = parse_date(date_str)?;
        let amount = parse_amount(header.require_value(&record, "Betrag")?)?;
        let merchant = migros_merchant(text, &twint_phone);
        let title = header
            .get(&record, "Mitteilung")
            .map(str::to_string)
            .unwrap_or(merchant);
        let reference = header.get(&record, "Referenznummer");

        let row = TransactionRow::new()
            .with("Buchungstext", title.as_str())
            .with("Betrag", amount);

        let mut meta = BTreeMap::new();
        insert_meta(&mut meta, "reference_number", reference);
        insert_meta(&mut meta, "balance", header.get(&record, "Saldo"));
        insert_meta(&mut meta, "value_date", header.get(&record, "Valuta"));
        insert_meta(&mut meta, "original_text", Some(text));

        let fingerprint = generate_hash(&date, &title, amount, reference);
        records.push(ImportedRecord {
            date,
            title,
            amount,
            currency: "CHF".to_string(),
            row,
            meta,
            fingerprint,
        });
    }

    debug!(
        "Parsed {} Migros Bank transactions ({} card settlements dropped)",
        records.len(),
        settlements
    );
    Ok(records)
}

/// Merchant from a Migros Bank booking text: the first comma segment, with
/// TWINT transfers reduced to the counterparty
fn migros_merchant(text: &str, twint_phone: &Regex) -> String {
    let first = text.split(',').next().unwrap_or(text).trim();
    if !first.contains("TWINT") {
        return first.to_string();
    }

    // "TWINT Gutschrift +41 79 ..., Jane Doe"
    if twint_phone.is_match(text) {
        let person = text.split(',').nth(1).map(str::trim).unwrap_or_default();
        return format!("TWINT {}", person);
    }

    // "TWINT Belastung IKEA AG 0400003132762475"
    if let Some((_, rest)) = first.split_once("TWINT Belastung ") {
        return rest.split(" 0").next().unwrap_or(rest).trim().to_string();
    }

    first.to_string()
}

/// Generate a fingerprint for deduplication across overlapping statements
fn generate_hash(date: &NaiveDate, title: &str, amount: f64, reference: Option<&str>) -> String {
    let mut hasher = Sha256::new();
    hasher.update(date.to_string().as_bytes());
    hasher.update(title.as_bytes());
    hasher.update(amount.to_be_bytes());
    if let Some(reference) = reference {
        hasher.update(reference.as_bytes());
    }
    hex::encode(hasher.finalize())
}

/// Parse a date string, trying formats used by Swiss exports
pub fn parse_date(s: &str) -> Result<NaiveDate> {
    let s = s.trim();

    let formats = [
        "%d.%m.%Y", // 15.01.2024
        "%d.%m.%y", // 15.01.24
        "%Y-%m-%d", // 2024-01-15
        "%d/%m/%Y", // 15/01/2024
    ];
    for fmt in formats {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            return Ok(date);
        }
    }

    // Timestamps from API-based exports
    let datetime_formats = ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%d.%m.%Y %H:%M"];
    for fmt in datetime_formats {
        if let Ok(datetime) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(datetime.date());
        }
    }

    Err(Error::InvalidData(format!("Unable to parse date: {}", s)))
}

/// Parse an amount string: Swiss thousands separators ('), currency codes,
/// decimal commas and accounting parentheses
pub fn parse_amount(s: &str) -> Result<f64> {
    let mut cleaned: String = s
        .trim()
        .trim_start_matches("CHF")
        .replace(['\'', ' ', '\u{2019}'], "")
        .replace('(', "-")
        .replace(')', "");

    if cleaned.contains(',') {
        cleaned = if cleaned.contains('.') {
            cleaned.replace(',', "")
        } else {
            cleaned.replace(',', ".")
        };
    }

    cleaned
        .parse::<f64>()
        .map_err(|_| Error::InvalidData(format!("Unable to parse amount: {}", s)))
}

/// Blank debit/credit cells count as zero
fn parse_optional_amount(s: Option<&str>) -> Result<f64> {
    s.map_or(Ok(0.0), parse_amount)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::FieldValue;

    #[test]
    fn test_parse_date() {
        let expected = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        assert_eq!(parse_date("15.01.2024").unwrap(), expected);
        assert_eq!(parse_date("2024-01-15").unwrap(), expected);
        assert_eq!(parse_date("2024-01-15T10:22:00").unwrap(), expected);
        assert!(matches!(
            parse_date("January 15").unwrap_err(),
            Error::InvalidData(_)
        ));
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("1'234.56").unwrap(), 1234.56);
        assert_eq!(parse_amount("-12,32").unwrap(), -12.32);
        assert_eq!(parse_amount("CHF 45.00").unwrap(), 45.0);
        assert_eq!(parse_amount("1,234.50").unwrap(), 1234.5);
        assert_eq!(parse_amount("(100.00)").unwrap(), -100.0);
        assert!(parse_amount("n/a").is_err());
    }

    #[test]
    fn test_detect_provider() {
        assert_eq!(
            detect_provider("Transaction date,Description,Merchant,Card number,Currency,Amount,Foreign Currency,Amount in foreign currency,Debit/Credit,Status,Merchant Category,Registered Category"),
            Some(Provider::Swisscard)
        );
        assert_eq!(
            detect_provider("date,description,amount,currency,Name,PFMCategoryName,Merchant"),
            Some(Provider::Viseca)
        );
        assert_eq!(
            detect_provider("Date;\"Booking text\";\"ZKB reference\";\"Reference number\";\"Debit CHF\";\"Credit CHF\";\"Value date\";\"Balance CHF\""),
            Some(Provider::Zkb)
        );
        assert_eq!(
            detect_provider("Kontoauszug bis: 31.01.2024;;\nKonto: CH00 0000;;\n\nDatum;Buchungstext;Mitteilung;Referenznummer;Betrag;Saldo;Valuta"),
            Some(Provider::Migros)
        );
        assert_eq!(detect_provider("Transaction Date,Post Date,Description"), None);
    }

    #[test]
    fn test_parse_swisscard() {
        let csv = r#"Transaction date,Description,Merchant,Card number,Currency,Amount,Foreign Currency,Amount in foreign currency,Debit/Credit,Status,Merchant Category,Registered Category
15.01.2024,KIR ROYAL ZUERICH,Bar KIR ROYAL,1234 XXXX XXXX 5678,CHF,42.50,,,Debit,Posted,Food and Drink,"BARS, LOUNGES"
16.01.2024,PENDING SHOP,,1234 XXXX XXXX 5678,CHF,10.00,,,Debit,Pending,Shopping,
17.01.2024,REFUND,,1234 XXXX XXXX 5678,CHF,5.00,,,Credit,Posted,Shopping,
18.01.2024,AMAZON EU,,1234 XXXX XXXX 5678,CHF,19.90,EUR,20.50,Debit,Posted,Shopping,CATALOG MERCHANTS"#;

        let records = parse_statement(csv.as_bytes(), Provider::Swisscard).unwrap();
        assert_eq!(records.len(), 2);

        let kir = &records[0];
        assert_eq!(kir.title, "Bar KIR ROYAL");
        assert_eq!(kir.amount, -42.50);
        assert_eq!(kir.currency, "CHF");
        assert_eq!(
            kir.row.get("Registered Category"),
            Some(&FieldValue::from("BARS, LOUNGES"))
        );
        assert_eq!(kir.meta["card_number"], "1234 XXXX XXXX 5678");

        // Title falls back to the description when there is no merchant
        let amazon = &records[1];
        assert_eq!(amazon.title, "AMAZON EU");
        assert_eq!(amazon.row.get("Merchant"), None);
        assert_eq!(amazon.meta["foreign_currency"], "EUR");
        assert_eq!(amazon.meta["foreign_amount"], "20.50");
    }

    #[test]
    fn test_parse_swisscard_missing_columns() {
        let csv = "Transaction date,Description,Amount\n15.01.2024,X,1.00";
        let err = parse_statement(csv.as_bytes(), Provider::Swisscard).unwrap_err();
        match err {
            Error::Import(msg) => {
                assert!(msg.contains("Currency"));
                assert!(msg.contains("Status"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_parse_viseca() {
        let csv = r#"date,description,amount,currency,Name,PFMCategoryName,Merchant
2024-02-01T12:10:00,Boulderlounge Zürich,25.00,CHF,Boulderlounge,Sport,Boulderlounge AG
2024-02-03T08:00:00,Refund Coop,-5.40,CHF,Coop,Supermarket,"#;

        let records = parse_statement(csv.as_bytes(), Provider::Viseca).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].date, NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());
        assert_eq!(records[0].title, "Boulderlounge Zürich");
        assert_eq!(records[0].amount, -25.0);
        assert_eq!(records[0].row.get("Name"), Some(&FieldValue::from("Boulderlounge")));
        assert_eq!(records[0].meta["merchant"], "Boulderlounge AG");
        assert_eq!(records[1].amount, 5.40);
    }

    #[test]
    fn test_clean_zkb_booking_text() {
        assert_eq!(
            clean_zkb_booking_text("Debit Card: Coop-1234 Zuerich, Zürich"),
            "Coop-1234 Zuerich, Zürich"
        );
        assert_eq!(
            clean_zkb_booking_text("Purchase ZKB Visa Debit card no. xxxx 1234: Migros M Zuerich, Zuerich, CH"),
            "Migros M Zuerich"
        );
        assert_eq!(
            clean_zkb_booking_text("Debit TWINT: +41 79 123 45 67, JANE DOE"),
            "TWINT Jane Doe"
        );
        assert_eq!(clean_zkb_booking_text("Salary"), "Salary");
    }

    #[test]
    fn test_parse_zkb() {
        let csv = r#"Date;"Booking text";"ZKB reference";"Reference number";"Debit CHF";"Credit CHF";"Value date";"Balance CHF"
02.01.2024;"Debit TWINT: +41 79 123 45 67, JANE DOE";"Z1";"";"12.30";"";"02.01.2024";"1000.00"
03.01.2024;"Credit: Mensile AG";"Z2";"";"";"5'000.00";"03.01.2024";"6000.00"
04.01.2024;"Debit: Viseca Card Services SA";"Z3";"";"800.00";"";"04.01.2024";"5200.00""#;

        let records = parse_statement(csv.as_bytes(), Provider::Zkb).unwrap();
        assert_eq!(records.len(), 2);

        assert_eq!(records[0].title, "TWINT Jane Doe");
        assert_eq!(records[0].amount, -12.30);
        assert_eq!(records[0].currency, "CHF");
        assert_eq!(records[0].meta["zkb_reference"], "Z1");

        assert_eq!(records[1].title, "Mensile AG");
        assert_eq!(records[1].amount, 5000.0);
    }

    #[test]
    fn test_migros_merchant() {
        let phone = Regex::new(r"\+41\s?7\d").unwrap();
        assert_eq!(
            migros_merchant("TWINT Belastung IKEA AG 0400003132762475", &phone),
            "IKEA AG"
        );
        assert_eq!(
            migros_merchant("TWINT Gutschrift +41791234567, Jane Doe", &phone),
            "TWINT Jane Doe"
        );
        assert_eq!(
            migros_merchant("Einkauf Coop-4711 Zürich, Karte: 1234", &phone),
            "Einkauf Coop-4711 Zürich"
        );
    }

    #[test]
    fn test_parse_migros() {
        let csv = "Kontoauszug bis: 31.01.2024 ;;;;;;\n\
Konto: CH00 0000 0000 0000 0000 0;;;;;;\n\
\n\
Datum;Buchungstext;Mitteilung;Referenznummer;Betrag;Saldo;Valuta\n\
05.01.2024;TWINT Belastung IKEA AG 0400003132762475;;R1;-89,90;1000,00;05.01.2024\n\
06.01.2024;Zahlung an Baugenossenschaft, Zürich;Miete Januar;R2;-1450,00;-450,00;06.01.2024\n\
07.01.2024;Belastung Cumulus-Mastercard, Karte: 474124;;R3;-300,00;-750,00;07.01.2024\n";

        let records = parse_statement(csv.as_bytes(), Provider::Migros).unwrap();
        assert_eq!(records.len(), 2);

        assert_eq!(records[0].title, "IKEA AG");
        assert_eq!(records[0].amount, -89.90);
        assert_eq!(records[0].row.get("Buchungstext"), Some(&FieldValue::from("IKEA AG")));

        // Mitteilung wins as title and is what gets categorized
        assert_eq!(records[1].title, "Miete Januar");
        assert_eq!(records[1].meta["original_text"], "Zahlung an Baugenossenschaft, Zürich");
    }

    #[test]
    fn test_migros_requires_header() {
        let err = parse_statement("just;some;text\n".as_bytes(), Provider::Migros).unwrap_err();
        assert!(matches!(err, Error::Import(_)));
    }

    #[test]
    fn test_fingerprint_uses_reference() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let a = generate_hash(&date, "Coop", -5.0, Some("R1"));
        let b = generate_hash(&date, "Coop", -5.0, Some("R2"));
        let c = generate_hash(&date, "Coop", -5.0, Some("R1"));
        assert_ne!(a, b);
        assert_eq!(a, c);
        assert_eq!(a.len(), 64);
    }
}
