//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `core` - Shared utilities (provider parsing, processor setup)
//! - `process` - Statement processing and Cashew export
//! - `categories` - Taxonomy listing
//! - `mappings` - Effective mapping tables
//! - `resolve` - Single-row resolution and single-label lookup

pub mod categories;
pub mod core;
pub mod mappings;
pub mod process;
pub mod resolve;

// Re-export command functions for main.rs
pub use categories::*;
pub use core::*;
pub use mappings::*;
pub use process::*;
pub use resolve::*;

/// Truncate a string to a maximum length, adding "..." if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
