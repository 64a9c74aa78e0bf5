//! Cashew category taxonomy
//!
//! A closed two-level set: every [`Category`] owns a fixed list of
//! [`Subcategory`] values. Display names are the labels Cashew shows, so they
//! are also what gets written into deep-links and CSV exports.

use serde::{Deserialize, Serialize, Serializer};

use crate::error::{Error, Result};

/// Top-level budgeting category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Income,
    Bills,
    Essentials,
    Dining,
    Shopping,
    Household,
    #[serde(rename = "Personal Care & Health")]
    PersonalCare,
    Leisure,
    Hobbies,
    Travel,
    Financial,
}

impl Category {
    /// All categories in display order
    pub const ALL: [Category; 11] = [
        Self::Income,
        Self::Bills,
        Self::Essentials,
        Self::Dining,
        Self::Shopping,
        Self::Household,
        Self::PersonalCare,
        Self::Leisure,
        Self::Hobbies,
        Self::Travel,
        Self::Financial,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Income => "Income",
            Self::Bills => "Bills",
            Self::Essentials => "Essentials",
            Self::Dining => "Dining",
            Self::Shopping => "Shopping",
            Self::Household => "Household",
            Self::PersonalCare => "Personal Care & Health",
            Self::Leisure => "Leisure",
            Self::Hobbies => "Hobbies",
            Self::Travel => "Travel",
            Self::Financial => "Financial",
        }
    }

    /// The closed subcategory set for this category (may be empty)
    pub fn subcategories(&self) -> &'static [Subcategory] {
        use Subcategory::*;
        match self {
            Self::Income => &[Salary, Side, IncomeTwint],
            Self::Bills => &[
                Rent,
                Utilities,
                Insurance,
                Telecom,
                Taxes,
                Fees,
                Subscriptions,
            ],
            Self::Essentials => &[Transit, Groceries],
            Self::Dining => &[Work, Date, Delivery, Social, DiningTwint],
            Self::Shopping => &[Clothing, Electronics, Media, Gifts],
            Self::Household => &[Furniture, Appliances, Decor, Cleaning],
            Self::PersonalCare => &[Medical, PersonalCare],
            Self::Leisure => &[Events, Activities],
            Self::Hobbies => &[Bouldern, Salsa, Tech],
            Self::Travel => &[Transport, Accommodation, FoodActivities],
            Self::Financial => &[Investments, Savings],
        }
    }

    pub fn has_subcategories(&self) -> bool {
        !self.subcategories().is_empty()
    }

    /// Membership test; each subcategory knows its parent, so this is O(1)
    pub fn supports(&self, subcategory: Subcategory) -> bool {
        subcategory.category() == *self
    }
}

impl std::str::FromStr for Category {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "income" => Ok(Self::Income),
            "bills" => Ok(Self::Bills),
            "essentials" => Ok(Self::Essentials),
            "dining" => Ok(Self::Dining),
            "shopping" => Ok(Self::Shopping),
            "household" => Ok(Self::Household),
            "personal care & health" | "personal_care" | "personal care" | "personalcare" => {
                Ok(Self::PersonalCare)
            }
            "leisure" => Ok(Self::Leisure),
            "hobbies" => Ok(Self::Hobbies),
            "travel" => Ok(Self::Travel),
            "financial" => Ok(Self::Financial),
            _ => Err(Error::UnknownCategory(s.to_string())),
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Second-level category.
///
/// "Twint" exists under both Income and Dining, so the two are separate
/// variants that share a display name. Parse with [`Subcategory::parse`],
/// which needs the owning category to disambiguate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Subcategory {
    // Income
    Salary,
    Side,
    IncomeTwint,
    // Bills
    Rent,
    Utilities,
    Insurance,
    Telecom,
    Taxes,
    Fees,
    Subscriptions,
    // Essentials
    Transit,
    Groceries,
    // Dining
    Work,
    Date,
    Delivery,
    Social,
    DiningTwint,
    // Shopping
    Clothing,
    Electronics,
    Media,
    Gifts,
    // Household
    Furniture,
    Appliances,
    Decor,
    Cleaning,
    // Personal Care & Health
    Medical,
    PersonalCare,
    // Leisure
    Events,
    Activities,
    // Hobbies
    Bouldern,
    Salsa,
    Tech,
    // Travel
    Transport,
    Accommodation,
    FoodActivities,
    // Financial
    Investments,
    Savings,
}

impl Subcategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Salary => "Salary",
            Self::Side => "Side",
            Self::IncomeTwint | Self::DiningTwint => "Twint",
            Self::Rent => "Rent",
            Self::Utilities => "Utilities",
            Self::Insurance => "Insurance",
            Self::Telecom => "Telecom",
            Self::Taxes => "Taxes",
            Self::Fees => "Fees",
            Self::Subscriptions => "Subscriptions",
            Self::Transit => "Transit",
            Self::Groceries => "Groceries",
            Self::Work => "Work",
            Self::Date => "Date",
            Self::Delivery => "Delivery",
            Self::Social => "Social",
            Self::Clothing => "Clothing",
            Self::Electronics => "Electronics",
            Self::Media => "Media",
            Self::Gifts => "Gifts",
            Self::Furniture => "Furniture",
            Self::Appliances => "Appliances",
            Self::Decor => "Decor & Furnishings",
            Self::Cleaning => "Cleaning",
            Self::Medical => "Medical",
            Self::PersonalCare => "Personal Care",
            Self::Events => "Events",
            Self::Activities => "Activities",
            Self::Bouldern => "Bouldern",
            Self::Salsa => "Salsa",
            Self::Tech => "Tech",
            Self::Transport => "Transport",
            Self::Accommodation => "Accommodation",
            Self::FoodActivities => "Food & Activities",
            Self::Investments => "Investments",
            Self::Savings => "Savings",
        }
    }

    /// The category this subcategory belongs to
    pub fn category(&self) -> Category {
        match self {
            Self::Salary | Self::Side | Self::IncomeTwint => Category::Income,
            Self::Rent
            | Self::Utilities
            | Self::Insurance
            | Self::Telecom
            | Self::Taxes
            | Self::Fees
            | Self::Subscriptions => Category::Bills,
            Self::Transit | Self::Groceries => Category::Essentials,
            Self::Work | Self::Date | Self::Delivery | Self::Social | Self::DiningTwint => {
                Category::Dining
            }
            Self::Clothing | Self::Electronics | Self::Media | Self::Gifts => Category::Shopping,
            Self::Furniture | Self::Appliances | Self::Decor | Self::Cleaning => {
                Category::Household
            }
            Self::Medical | Self::PersonalCare => Category::PersonalCare,
            Self::Events | Self::Activities => Category::Leisure,
            Self::Bouldern | Self::Salsa | Self::Tech => Category::Hobbies,
            Self::Transport | Self::Accommodation | Self::FoodActivities => Category::Travel,
            Self::Investments | Self::Savings => Category::Financial,
        }
    }

    /// The Twint variant for a category, if it has one
    pub fn twint(category: Category) -> Option<Subcategory> {
        match category {
            Category::Income => Some(Self::IncomeTwint),
            Category::Dining => Some(Self::DiningTwint),
            _ => None,
        }
    }

    /// Parse a subcategory display name within `category` (case-insensitive).
    ///
    /// Fails with `InvalidSubcategory` when the name is not in the category's set.
    pub fn parse(category: Category, name: &str) -> Result<Subcategory> {
        let wanted = name.trim().to_lowercase();
        category
            .subcategories()
            .iter()
            .copied()
            .find(|sub| sub.as_str().to_lowercase() == wanted)
            .ok_or_else(|| Error::InvalidSubcategory {
                category: category.to_string(),
                subcategory: name.to_string(),
            })
    }
}

impl std::fmt::Display for Subcategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Serialize for Subcategory {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}
