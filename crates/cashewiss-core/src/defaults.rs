//! Built-in mapping tables
//!
//! Seed data is embedded TOML. The shared table applies to every provider;
//! Swisscard and Viseca add their own merchant and category tables on top.

use crate::error::Result;
use crate::models::Provider;
use crate::tables::{MappingSet, MappingTables};

const DEFAULT_MAPPINGS: &str = include_str!("../data/defaults.toml");
const SWISSCARD_MAPPINGS: &str = include_str!("../data/swisscard.toml");
const VISECA_MAPPINGS: &str = include_str!("../data/viseca.toml");

/// Merchant mappings shared by all providers
pub fn default_mappings() -> Result<MappingSet> {
    MappingSet::parse(DEFAULT_MAPPINGS)
}

/// Provider-specific overrides (empty for the bank accounts)
pub fn provider_mappings(provider: Provider) -> Result<MappingSet> {
    match provider {
        Provider::Swisscard => MappingSet::parse(SWISSCARD_MAPPINGS),
        Provider::Viseca => MappingSet::parse(VISECA_MAPPINGS),
        Provider::Zkb | Provider::Migros => Ok(MappingSet::default()),
    }
}

/// Shared defaults layered under the provider's overrides
pub fn default_tables(provider: Provider) -> Result<MappingTables> {
    let defaults = default_mappings()?;
    let overrides = provider_mappings(provider)?;
    MappingTables::layered([&defaults, &overrides])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::CategoryMapping;
    use crate::tables::TableKind;
    use crate::taxonomy::{Category, Subcategory};

    #[test]
    fn test_embedded_data_is_valid() {
        // Every entry validates against the taxonomy
        for provider in Provider::ALL {
            let tables = default_tables(provider).unwrap();
            assert!(tables.len(TableKind::Merchant) > 50, "{}", provider);
        }
    }

    #[test]
    fn test_shared_defaults() {
        let tables = default_tables(Provider::Zkb).unwrap();
        assert_eq!(
            tables.get(TableKind::Merchant, "kir"),
            Some(Subcategory::Social.into())
        );
        assert_eq!(
            tables.get(TableKind::Merchant, "ikea"),
            Some(Subcategory::Decor.into())
        );
        assert_eq!(
            tables.get(TableKind::Merchant, "mensile"),
            Some(CategoryMapping::bare(Category::Income))
        );
        assert_eq!(tables.len(TableKind::MerchantCategory), 0);
        assert_eq!(tables.len(TableKind::RegisteredCategory), 0);
    }

    #[test]
    fn test_provider_overrides_win() {
        let tables = default_tables(Provider::Swisscard).unwrap();
        assert_eq!(
            tables.get(TableKind::Merchant, "IKEA"),
            Some(Subcategory::Furniture.into())
        );
        assert_eq!(
            tables.get(TableKind::Merchant, "google"),
            Some(Subcategory::Telecom.into())
        );
        assert_eq!(
            tables.get(TableKind::RegisteredCategory, "passenger railways"),
            Some(Subcategory::Transit.into())
        );
    }

    #[test]
    fn test_viseca_has_no_registered_categories() {
        let tables = default_tables(Provider::Viseca).unwrap();
        assert_eq!(tables.len(TableKind::RegisteredCategory), 0);
        assert_eq!(
            tables.get(TableKind::MerchantCategory, "public transport"),
            Some(Subcategory::Transit.into())
        );
    }
}
