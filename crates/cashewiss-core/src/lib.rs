//! Cashewiss Core Library
//!
//! Category resolution for Swiss bank exports, feeding the Cashew budgeting app:
//! - Category taxonomy with validated subcategories
//! - Mapping tables (merchant, merchant category, registered category)
//! - Built-in and user-supplied mapping layers
//! - Statement parsers for Swisscard, Viseca, ZKB and Migros Bank
//! - Prioritized category resolution with an optional fuzzy predictor
//! - Cashew deep-link and CSV export

pub mod config;
pub mod defaults;
pub mod error;
pub mod export;
pub mod import;
pub mod mapping;
pub mod models;
pub mod predict;
pub mod processor;
pub mod resolver;
pub mod tables;
pub mod taxonomy;

pub use config::{load_settings, load_user_mappings, Settings};
pub use error::{Error, Result};
pub use export::{preview_csv, write_csv, CashewClient};
pub use import::{detect_provider, parse_statement, ImportedRecord};
pub use mapping::{CategoryMapping, RawMapping, SeedValue};
pub use models::{CashewTransaction, DateRange, Provider, Transaction, TransactionBatch};
pub use predict::{CategoryPredictor, SimilarityPredictor};
pub use processor::{ProcessOutcome, Processor, ResolutionStats};
pub use resolver::{
    CategoryResolver, FieldRoles, FieldValue, MatchSource, Resolution, TransactionRow,
};
pub use tables::{MappingSet, MappingTables, TableKind};
pub use taxonomy::{Category, Subcategory};
