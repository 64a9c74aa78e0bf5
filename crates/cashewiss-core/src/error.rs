//! Error types for cashewiss

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Subcategory '{subcategory}' is not valid for category '{category}'")]
    InvalidSubcategory {
        category: String,
        subcategory: String,
    },

    #[error("Unknown mapping table: {0}")]
    UnknownTable(String),

    #[error("Missing field: {0}")]
    MissingField(String),

    #[error("Unknown category: {0}")]
    UnknownCategory(String),

    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),

    #[error("Import error: {0}")]
    Import(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Config error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;
