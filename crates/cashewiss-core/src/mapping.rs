//! Validated category mappings and their raw (unvalidated) seed form

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::taxonomy::{Category, Subcategory};

/// A (category, optional subcategory) pair.
///
/// Construction checks that the subcategory belongs to the category, so a
/// value of this type is always valid. Fields are private to keep it that way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct CategoryMapping {
    category: Category,
    subcategory: Option<Subcategory>,
}

impl CategoryMapping {
    /// Build a mapping, rejecting subcategories outside the category's set
    pub fn new(category: Category, subcategory: Option<Subcategory>) -> Result<Self> {
        if let Some(sub) = subcategory {
            if !category.supports(sub) {
                return Err(Error::InvalidSubcategory {
                    category: category.to_string(),
                    subcategory: sub.to_string(),
                });
            }
        }
        Ok(Self {
            category,
            subcategory,
        })
    }

    /// A category with no subcategory; always valid
    pub fn bare(category: Category) -> Self {
        Self {
            category,
            subcategory: None,
        }
    }

    /// Build from display names, e.g. `("Dining", Some("Social"))`
    pub fn from_names(category: &str, subcategory: Option<&str>) -> Result<Self> {
        let category: Category = category.parse()?;
        let subcategory = match subcategory.map(str::trim).filter(|s| !s.is_empty()) {
            Some(name) => Some(Subcategory::parse(category, name)?),
            None => None,
        };
        Self::new(category, subcategory)
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn subcategory(&self) -> Option<Subcategory> {
        self.subcategory
    }
}

impl From<Subcategory> for CategoryMapping {
    fn from(sub: Subcategory) -> Self {
        Self {
            category: sub.category(),
            subcategory: Some(sub),
        }
    }
}

impl std::fmt::Display for CategoryMapping {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.subcategory {
            Some(sub) => write!(f, "{} / {}", self.category, sub),
            None => write!(f, "{}", self.category),
        }
    }
}

/// Unvalidated `{category, subcategory?}` record as found in seed files
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawMapping {
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subcategory: Option<String>,
}

impl RawMapping {
    pub fn new(category: impl Into<String>, subcategory: Option<&str>) -> Self {
        Self {
            category: category.into(),
            subcategory: subcategory.map(str::to_string),
        }
    }

    pub fn validate(&self) -> Result<CategoryMapping> {
        CategoryMapping::from_names(&self.category, self.subcategory.as_deref())
    }
}

/// A seed entry: either an already-built mapping or a raw record that is
/// validated when it is seeded
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SeedValue {
    Mapping(CategoryMapping),
    Raw(RawMapping),
}

impl SeedValue {
    pub fn into_mapping(self) -> Result<CategoryMapping> {
        match self {
            Self::Mapping(mapping) => Ok(mapping),
            Self::Raw(raw) => raw.validate(),
        }
    }
}

impl From<CategoryMapping> for SeedValue {
    fn from(mapping: CategoryMapping) -> Self {
        Self::Mapping(mapping)
    }
}

impl From<RawMapping> for SeedValue {
    fn from(raw: RawMapping) -> Self {
        Self::Raw(raw)
    }
}
