//! Per-processor mapping tables
//!
//! Each processor owns three lookup tables keyed by lowercase text:
//! merchant names, provider merchant categories and provider registered
//! categories. Tables are seeded from the shared defaults first and provider
//! or user overrides second; the last write for a key wins.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use tracing::debug;

use crate::error::{Error, Result};
use crate::mapping::{CategoryMapping, RawMapping, SeedValue};

/// The three named tables
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableKind {
    Merchant,
    MerchantCategory,
    RegisteredCategory,
}

impl TableKind {
    pub const ALL: [TableKind; 3] = [
        Self::Merchant,
        Self::MerchantCategory,
        Self::RegisteredCategory,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Merchant => "merchant",
            Self::MerchantCategory => "merchant_category",
            Self::RegisteredCategory => "registered_category",
        }
    }
}

impl std::str::FromStr for TableKind {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "merchant" => Ok(Self::Merchant),
            "merchant_category" | "merchant-category" => Ok(Self::MerchantCategory),
            "registered_category" | "registered-category" => Ok(Self::RegisteredCategory),
            _ => Err(Error::UnknownTable(s.to_string())),
        }
    }
}

impl std::fmt::Display for TableKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Seed data for all three tables, as stored in TOML files:
///
/// ```toml
/// [merchant]
/// "ikea" = { category = "Household", subcategory = "Furniture" }
///
/// [merchant_category]
/// "Groceries" = { category = "Essentials", subcategory = "Groceries" }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingSet {
    #[serde(default)]
    pub merchant: BTreeMap<String, RawMapping>,
    #[serde(default)]
    pub merchant_category: BTreeMap<String, RawMapping>,
    #[serde(default)]
    pub registered_category: BTreeMap<String, RawMapping>,
}

impl MappingSet {
    /// Parse a mapping set from TOML text
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(format!("Invalid mapping file: {}", e)))
    }

    /// Load a mapping set from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| {
            Error::Config(format!("Invalid mapping file {}: {}", path.display(), e))
        })
    }

    pub fn entries(&self, kind: TableKind) -> &BTreeMap<String, RawMapping> {
        match kind {
            TableKind::Merchant => &self.merchant,
            TableKind::MerchantCategory => &self.merchant_category,
            TableKind::RegisteredCategory => &self.registered_category,
        }
    }

    pub fn is_empty(&self) -> bool {
        TableKind::ALL.iter().all(|kind| self.entries(*kind).is_empty())
    }
}

/// The three lookup tables of one processor
#[derive(Debug, Clone, Default)]
pub struct MappingTables {
    merchant: HashMap<String, CategoryMapping>,
    merchant_category: HashMap<String, CategoryMapping>,
    registered_category: HashMap<String, CategoryMapping>,
}

impl MappingTables {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build tables by seeding each set in order (later sets override earlier ones)
    pub fn layered<'a, I>(sets: I) -> Result<Self>
    where
        I: IntoIterator<Item = &'a MappingSet>,
    {
        let mut tables = Self::new();
        for set in sets {
            tables.seed_set(set)?;
        }
        Ok(tables)
    }

    fn table(&self, kind: TableKind) -> &HashMap<String, CategoryMapping> {
        match kind {
            TableKind::Merchant => &self.merchant,
            TableKind::MerchantCategory => &self.merchant_category,
            TableKind::RegisteredCategory => &self.registered_category,
        }
    }

    fn table_mut(&mut self, kind: TableKind) -> &mut HashMap<String, CategoryMapping> {
        match kind {
            TableKind::Merchant => &mut self.merchant,
            TableKind::MerchantCategory => &mut self.merchant_category,
            TableKind::RegisteredCategory => &mut self.registered_category,
        }
    }

    /// Seed entries into a table. Keys are lowercased and raw values are
    /// validated; if any entry is invalid, nothing is written.
    ///
    /// Returns the number of entries written.
    pub fn seed<I, K, V>(&mut self, kind: TableKind, entries: I) -> Result<usize>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<SeedValue>,
    {
        let validated = validate_entries(entries)?;
        let count = validated.len();
        self.table_mut(kind).extend(validated);
        debug!("Seeded {} entries into {} table", count, kind);
        Ok(count)
    }

    /// Seed by table name; unknown names fail with `UnknownTable`
    pub fn seed_named<I, K, V>(&mut self, table_name: &str, entries: I) -> Result<usize>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<SeedValue>,
    {
        let kind: TableKind = table_name.parse()?;
        self.seed(kind, entries)
    }

    /// Seed all three tables from a mapping set. Every table of the set is
    /// validated before any of them is written.
    pub fn seed_set(&mut self, set: &MappingSet) -> Result<usize> {
        let validated = TableKind::ALL
            .into_iter()
            .map(|kind| Ok((kind, validate_entries(set.entries(kind).clone())?)))
            .collect::<Result<Vec<_>>>()?;

        let mut total = 0;
        for (kind, entries) in validated {
            total += entries.len();
            self.table_mut(kind).extend(entries);
        }
        debug!("Seeded {} entries from mapping set", total);
        Ok(total)
    }

    /// Exact, case-insensitive lookup
    pub fn get(&self, kind: TableKind, key: &str) -> Option<CategoryMapping> {
        self.table(kind).get(&key.to_lowercase()).copied()
    }

    /// Lookup by table name; unknown names fail with `UnknownTable`
    pub fn get_named(&self, table_name: &str, key: &str) -> Result<Option<CategoryMapping>> {
        let kind: TableKind = table_name.parse()?;
        Ok(self.get(kind, key))
    }

    pub fn len(&self, kind: TableKind) -> usize {
        self.table(kind).len()
    }

    pub fn is_empty(&self) -> bool {
        TableKind::ALL.iter().all(|kind| self.table(*kind).is_empty())
    }

    /// All entries of a table, sorted by key
    pub fn entries(&self, kind: TableKind) -> Vec<(&str, CategoryMapping)> {
        let mut entries: Vec<_> = self
            .table(kind)
            .iter()
            .map(|(key, mapping)| (key.as_str(), *mapping))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        entries
    }
}

/// Lowercase keys and resolve raw values, failing on the first invalid entry
fn validate_entries<I, K, V>(entries: I) -> Result<Vec<(String, CategoryMapping)>>
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: Into<SeedValue>,
{
    entries
        .into_iter()
        .map(|(key, value)| {
            let mapping = value.into().into_mapping()?;
            Ok((key.as_ref().to_lowercase(), mapping))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::taxonomy::{Category, Subcategory};

    #[test]
    fn test_keys_are_case_insensitive() {
        let mut tables = MappingTables::new();
        tables
            .seed(
                TableKind::Merchant,
                [("Boulderlounge", CategoryMapping::from(Subcategory::Bouldern))],
            )
            .unwrap();

        for key in ["boulderlounge", "BOULDERLOUNGE", "BoulderLounge"] {
            assert_eq!(
                tables.get(TableKind::Merchant, key),
                Some(Subcategory::Bouldern.into())
            );
        }
    }

    #[test]
    fn test_last_write_wins() {
        let mut tables = MappingTables::new();
        tables
            .seed(
                TableKind::Merchant,
                [("ikea", RawMapping::new("Household", Some("Decor & Furnishings")))],
            )
            .unwrap();
        tables
            .seed(
                TableKind::Merchant,
                [("IKEA", RawMapping::new("Household", Some("Furniture")))],
            )
            .unwrap();

        assert_eq!(
            tables.get(TableKind::Merchant, "ikea"),
            Some(Subcategory::Furniture.into())
        );
        assert_eq!(tables.len(TableKind::Merchant), 1);
    }

    #[test]
    fn test_unknown_table_name() {
        let mut tables = MappingTables::new();
        let err = tables
            .seed_named("unknown_table", [("x", CategoryMapping::bare(Category::Dining))])
            .unwrap_err();
        assert!(matches!(err, Error::UnknownTable(name) if name == "unknown_table"));

        let err = tables.get_named("unknown_table", "x").unwrap_err();
        assert!(matches!(err, Error::UnknownTable(_)));
    }

    #[test]
    fn test_invalid_raw_entry_leaves_table_untouched() {
        let mut tables = MappingTables::new();
        let err = tables
            .seed(
                TableKind::Merchant,
                [
                    ("salsarica", RawMapping::new("Hobbies", Some("Salsa"))),
                    ("kir", RawMapping::new("Dining", Some("Salsa"))),
                ],
            )
            .unwrap_err();

        assert!(matches!(err, Error::InvalidSubcategory { .. }));
        assert!(tables.is_empty());
    }

    #[test]
    fn test_only_exact_matches() {
        let mut tables = MappingTables::new();
        tables
            .seed(TableKind::Merchant, [("kir", CategoryMapping::from(Subcategory::Social))])
            .unwrap();
        assert_eq!(tables.get(TableKind::Merchant, "bar kir royal"), None);
    }

    #[test]
    fn test_layered_sets() {
        let defaults = MappingSet::parse(
            r#"
[merchant]
"ikea" = { category = "Household", subcategory = "Decor & Furnishings" }
"sbb" = { category = "Essentials", subcategory = "Transit" }
"#,
        )
        .unwrap();
        let overrides = MappingSet::parse(
            r#"
[merchant]
"IKEA" = { category = "Household", subcategory = "Furniture" }

[registered_category]
"PASSENGER RAILWAYS" = { category = "Essentials", subcategory = "Transit" }
"#,
        )
        .unwrap();

        let tables = MappingTables::layered([&defaults, &overrides]).unwrap();
        assert_eq!(
            tables.get(TableKind::Merchant, "ikea"),
            Some(Subcategory::Furniture.into())
        );
        assert_eq!(
            tables.get(TableKind::Merchant, "sbb"),
            Some(Subcategory::Transit.into())
        );
        assert_eq!(
            tables.get(TableKind::RegisteredCategory, "passenger railways"),
            Some(Subcategory::Transit.into())
        );
    }

    #[test]
    fn test_invalid_toml_is_a_config_error() {
        let err = MappingSet::parse("[merchant]\nikea = 3").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mine.toml");
        std::fs::write(
            &path,
            "[merchant]\n\"Kafi Schnaps\" = { category = \"Dining\", subcategory = \"Social\" }\n",
        )
        .unwrap();

        let set = MappingSet::load(&path).unwrap();
        assert_eq!(set.merchant.len(), 1);
        assert!(!set.is_empty());
    }

    #[test]
    fn test_load_error_names_the_file_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.toml");
        std::fs::write(&path, "[merchant]
ikea = 3
").unwrap();

        let err = MappingSet::load(&path).unwrap_err();
        let message = err.to_string();
        assert!(matches!(err, Error::Config(_)));
        assert!(message.contains("broken.toml"));
        assert_eq!(message.matches("Config error").count(), 1);
    }

    #[test]
    fn test_invalid_set_leaves_every_table_untouched() {
        let set = MappingSet::parse(
            r#"
[merchant]
"brocki" = { category = "Shopping" }

[registered_category]
"broken" = { category = "Dining", subcategory = "Groceries" }
"#,
        )
        .unwrap();

        let mut tables = MappingTables::new();
        let err = tables.seed_set(&set).unwrap_err();

        assert!(matches!(err, Error::InvalidSubcategory { .. }));
        assert_eq!(tables.get(TableKind::Merchant, "brocki"), None);
        assert!(tables.is_empty());
    }
}
