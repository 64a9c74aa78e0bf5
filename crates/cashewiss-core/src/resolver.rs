//! Category resolution engine
//!
//! Resolves a transaction row to exactly one [`CategoryMapping`] using an
//! ordered fallback chain:
//!
//! 1. merchant name, exact match in the `merchant` table
//! 2. merchant name tokens, probed left to right in the `merchant` table
//! 3. provider merchant category, exact match
//! 4. provider registered category, exact match
//! 5. default from the amount sign and whether the merchant is a TWINT transfer
//!
//! All lookups are case-insensitive. Resolution only reads the tables; the
//! resolver must be fully seeded before it is shared.

use std::borrow::Cow;
use std::collections::HashMap;
use tracing::debug;

use crate::error::{Error, Result};
use crate::mapping::CategoryMapping;
use crate::predict::CategoryPredictor;
use crate::tables::{MappingTables, TableKind};
use crate::taxonomy::{Category, Subcategory};

/// A single cell of a transaction row
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Number(f64),
}

impl FieldValue {
    pub fn as_text(&self) -> Cow<'_, str> {
        match self {
            Self::Text(s) => Cow::Borrowed(s.as_str()),
            Self::Number(n) => Cow::Owned(n.to_string()),
        }
    }

    /// Finite numeric value; text is parsed after stripping Swiss thousands
    /// separators. NaN and infinities carry no sign and count as non-numeric.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Text(s) => s.trim().replace(['\'', ' '], "").parse().ok(),
        }
        .filter(|n: &f64| n.is_finite())
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<f64> for FieldValue {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

/// Field-name → value map for one transaction
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionRow {
    fields: HashMap<String, FieldValue>,
}

impl TransactionRow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    /// Text of a field, or None when absent or blank
    pub fn text(&self, name: &str) -> Option<Cow<'_, str>> {
        self.get(name)
            .map(FieldValue::as_text)
            .filter(|s| !s.trim().is_empty())
    }
}

impl<K, V> FromIterator<(K, V)> for TransactionRow
where
    K: Into<String>,
    V: Into<FieldValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Which row fields play which role. Missing optional roles simply skip the
/// corresponding strategy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldRoles {
    pub merchant: Option<String>,
    pub merchant_category: Option<String>,
    pub registered_category: Option<String>,
    pub amount: String,
}

impl Default for FieldRoles {
    fn default() -> Self {
        Self {
            merchant: Some("Merchant".to_string()),
            merchant_category: Some("Merchant Category".to_string()),
            registered_category: Some("Registered Category".to_string()),
            amount: "Amount".to_string(),
        }
    }
}

impl FieldRoles {
    /// Only an amount field; add the rest with the `with_*` methods
    pub fn new(amount: impl Into<String>) -> Self {
        Self {
            merchant: None,
            merchant_category: None,
            registered_category: None,
            amount: amount.into(),
        }
    }

    pub fn with_merchant(mut self, field: impl Into<String>) -> Self {
        self.merchant = Some(field.into());
        self
    }

    pub fn with_merchant_category(mut self, field: impl Into<String>) -> Self {
        self.merchant_category = Some(field.into());
        self
    }

    pub fn with_registered_category(mut self, field: impl Into<String>) -> Self {
        self.registered_category = Some(field.into());
        self
    }
}

/// Which strategy produced a mapping
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatchSource {
    MerchantExact,
    MerchantToken,
    MerchantCategory,
    RegisteredCategory,
    Predicted,
    Default,
}

impl MatchSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MerchantExact => "merchant",
            Self::MerchantToken => "merchant_token",
            Self::MerchantCategory => "merchant_category",
            Self::RegisteredCategory => "registered_category",
            Self::Predicted => "predicted",
            Self::Default => "default",
        }
    }
}

impl std::str::FromStr for MatchSource {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "merchant" => Ok(Self::MerchantExact),
            "merchant_token" => Ok(Self::MerchantToken),
            "merchant_category" => Ok(Self::MerchantCategory),
            "registered_category" => Ok(Self::RegisteredCategory),
            "predicted" => Ok(Self::Predicted),
            "default" => Ok(Self::Default),
            _ => Err(Error::InvalidData(format!("Unknown match source: {}", s))),
        }
    }
}

impl std::fmt::Display for MatchSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A mapping together with the strategy that found it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    pub mapping: CategoryMapping,
    pub source: MatchSource,
}

impl Resolution {
    fn new(mapping: CategoryMapping, source: MatchSource) -> Self {
        Self { mapping, source }
    }
}

/// Resolves rows against one processor's tables
pub struct CategoryResolver {
    tables: MappingTables,
    roles: FieldRoles,
    predictor: Option<Box<dyn CategoryPredictor>>,
}

impl std::fmt::Debug for CategoryResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CategoryResolver")
            .field("tables", &self.tables)
            .field("roles", &self.roles)
            .field("predictor", &self.predictor.as_ref().map(|p| p.name()))
            .finish()
    }
}

impl CategoryResolver {
    pub fn new(tables: MappingTables, roles: FieldRoles) -> Self {
        Self {
            tables,
            roles,
            predictor: None,
        }
    }

    /// Attach a fallback predictor for single-label lookups
    pub fn with_predictor(mut self, predictor: impl CategoryPredictor + 'static) -> Self {
        self.predictor = Some(Box::new(predictor));
        self
    }

    pub fn set_predictor(&mut self, predictor: Option<Box<dyn CategoryPredictor>>) {
        self.predictor = predictor;
    }

    pub fn has_predictor(&self) -> bool {
        self.predictor.is_some()
    }

    pub fn tables(&self) -> &MappingTables {
        &self.tables
    }

    /// Mutable access for seeding; not available while the resolver is shared
    pub fn tables_mut(&mut self) -> &mut MappingTables {
        &mut self.tables
    }

    pub fn roles(&self) -> &FieldRoles {
        &self.roles
    }

    /// Resolve a row to a single mapping
    pub fn resolve(&self, row: &TransactionRow) -> Result<CategoryMapping> {
        self.resolve_with_source(row).map(|r| r.mapping)
    }

    /// Resolve a row and report which strategy matched
    pub fn resolve_with_source(&self, row: &TransactionRow) -> Result<Resolution> {
        let merchant = self.role_text(row, self.roles.merchant.as_deref());

        if let Some(merchant) = merchant.as_deref() {
            // 1. Exact merchant
            if let Some(mapping) = self.tables.get(TableKind::Merchant, merchant) {
                debug!("Merchant matched for '{}': {}", merchant, mapping);
                return Ok(Resolution::new(mapping, MatchSource::MerchantExact));
            }

            // 2. Merchant tokens, left to right
            if let Some((token, mapping)) = self.match_token(merchant) {
                debug!(
                    "Merchant token '{}' matched for '{}': {}",
                    token, merchant, mapping
                );
                return Ok(Resolution::new(mapping, MatchSource::MerchantToken));
            }
        }

        // 3. Provider merchant category
        if let Some(label) = self.role_text(row, self.roles.merchant_category.as_deref()) {
            if let Some(mapping) = self.tables.get(TableKind::MerchantCategory, &label) {
                debug!("Merchant category '{}' matched: {}", label, mapping);
                return Ok(Resolution::new(mapping, MatchSource::MerchantCategory));
            }
        }

        // 4. Provider registered category
        if let Some(label) = self.role_text(row, self.roles.registered_category.as_deref()) {
            if let Some(mapping) = self.tables.get(TableKind::RegisteredCategory, &label) {
                debug!("Registered category '{}' matched: {}", label, mapping);
                return Ok(Resolution::new(mapping, MatchSource::RegisteredCategory));
            }
        }

        // 5. Default from amount sign
        let amount = self.amount(row)?;
        let is_twint = merchant
            .as_deref()
            .is_some_and(|m| m.to_lowercase().contains("twint"));
        let mapping = default_mapping(amount, is_twint);
        debug!(
            "Falling back to default for '{}' ({}, twint: {}): {}",
            merchant.as_deref().unwrap_or(""),
            amount,
            is_twint,
            mapping
        );
        Ok(Resolution::new(mapping, MatchSource::Default))
    }

    /// Look up a single label in one table, falling back to the predictor.
    ///
    /// Predicted results never carry a subcategory.
    pub fn lookup_label(&self, table: TableKind, label: &str) -> Option<Resolution> {
        if let Some(mapping) = self.tables.get(table, label) {
            let source = match table {
                TableKind::Merchant => MatchSource::MerchantExact,
                TableKind::MerchantCategory => MatchSource::MerchantCategory,
                TableKind::RegisteredCategory => MatchSource::RegisteredCategory,
            };
            return Some(Resolution::new(mapping, source));
        }

        let predictor = self.predictor.as_ref()?;
        let category = predictor.predict(label)?;
        debug!(
            "Predicted '{}' as {} via {}",
            label,
            category,
            predictor.name()
        );
        Some(Resolution::new(
            CategoryMapping::bare(category),
            MatchSource::Predicted,
        ))
    }

    /// [`lookup_label`](Self::lookup_label) by table name
    pub fn resolve_label(&self, table_name: &str, label: &str) -> Result<Option<CategoryMapping>> {
        let table: TableKind = table_name.parse()?;
        Ok(self.lookup_label(table, label).map(|r| r.mapping))
    }

    fn role_text<'r>(&self, row: &'r TransactionRow, field: Option<&str>) -> Option<Cow<'r, str>> {
        field.and_then(|name| row.text(name))
    }

    /// First whitespace token of the merchant with a table entry. Tokens are
    /// probed in string order and each distinct token once.
    fn match_token<'m>(&self, merchant: &'m str) -> Option<(&'m str, CategoryMapping)> {
        let mut probed: Vec<&str> = Vec::new();
        for token in merchant.split_whitespace() {
            if probed.iter().any(|seen| seen.eq_ignore_ascii_case(token)) {
                continue;
            }
            probed.push(token);
            if let Some(mapping) = self.tables.get(TableKind::Merchant, token) {
                return Some((token, mapping));
            }
        }
        None
    }

    fn amount(&self, row: &TransactionRow) -> Result<f64> {
        let field = &self.roles.amount;
        let value = row
            .get(field)
            .filter(|v| !matches!(v, FieldValue::Text(s) if s.trim().is_empty()))
            .ok_or_else(|| Error::MissingField(field.clone()))?;
        value.as_number().ok_or_else(|| {
            Error::InvalidData(format!(
                "Field '{}' is not a number: {}",
                field,
                value.as_text()
            ))
        })
    }
}

/// Strategy 5: income when positive, TWINT transfers to Dining, everything
/// else Shopping
fn default_mapping(amount: f64, is_twint: bool) -> CategoryMapping {
    if amount > 0.0 {
        if is_twint {
            CategoryMapping::from(Subcategory::IncomeTwint)
        } else {
            CategoryMapping::bare(Category::Income)
        }
    } else if is_twint {
        CategoryMapping::from(Subcategory::DiningTwint)
    } else {
        CategoryMapping::bare(Category::Shopping)
    }
}
