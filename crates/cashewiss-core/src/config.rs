//! User settings and mapping overrides
//!
//! Settings are TOML. Lookup order: an explicit path, then
//! `<data dir>/cashewiss/config.toml`, then the embedded defaults.
//! Per-provider mapping overrides live in
//! `<data dir>/cashewiss/mappings/<provider>.toml`.

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{Error, Result};
use crate::export::{DEFAULT_BATCH_SIZE, DEFAULT_CASHEW_URL};
use crate::models::Provider;
use crate::predict::SimilarityPredictor;
use crate::tables::MappingSet;

/// Embedded default settings
const DEFAULT_SETTINGS: &str = include_str!("../data/config.toml");

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub cashew_url: String,
    pub batch_size: usize,
    pub pause_secs: u64,
    pub use_predictor: bool,
    pub predictor_threshold: f64,
    /// Mapping files applied to every provider, after the built-in tables
    pub mapping_files: Vec<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            cashew_url: DEFAULT_CASHEW_URL.to_string(),
            batch_size: DEFAULT_BATCH_SIZE,
            pause_secs: 10,
            use_predictor: true,
            predictor_threshold: SimilarityPredictor::DEFAULT_THRESHOLD,
            mapping_files: Vec::new(),
        }
    }
}

impl Settings {
    /// Predictor configured from these settings, if enabled
    pub fn predictor(&self) -> Option<SimilarityPredictor> {
        self.use_predictor
            .then(|| SimilarityPredictor::new().with_threshold(self.predictor_threshold))
    }
}

/// `~/.local/share/cashewiss` on Linux
pub fn data_dir() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("cashewiss"))
}

pub fn default_config_path() -> Option<PathBuf> {
    data_dir().map(|d| d.join("config.toml"))
}

pub fn user_mappings_path(provider: Provider) -> Option<PathBuf> {
    data_dir().map(|d| d.join("mappings").join(format!("{}.toml", provider)))
}

/// Load settings (explicit path first, then the data dir, then defaults)
pub fn load_settings(override_path: Option<&Path>) -> Result<Settings> {
    let content = match override_path {
        Some(path) => read_file(path)?,
        None => match default_config_path().filter(|p| p.exists()) {
            Some(path) => read_file(&path)?,
            None => DEFAULT_SETTINGS.to_string(),
        },
    };
    parse_settings(&content)
}

fn read_file(path: &Path) -> Result<String> {
    debug!("Reading settings from {}", path.display());
    fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Failed to read {}: {}", path.display(), e)))
}

/// The provider's override file from the data dir, if one exists
pub fn load_user_mappings(provider: Provider) -> Result<Option<MappingSet>> {
    match user_mappings_path(provider).filter(|p| p.exists()) {
        Some(path) => {
            debug!("Loading {} mapping overrides from {}", provider, path.display());
            MappingSet::load(&path).map(Some)
        }
        None => Ok(None),
    }
}

/// Raw settings structure for TOML parsing
#[derive(Debug, Deserialize)]
struct RawSettings {
    cashew: Option<RawCashew>,
    predictor: Option<RawPredictor>,
    mappings: Option<RawMappings>,
}

#[derive(Debug, Deserialize)]
struct RawCashew {
    url: Option<String>,
    batch_size: Option<usize>,
    pause_secs: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct RawPredictor {
    enabled: Option<bool>,
    threshold: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct RawMappings {
    files: Option<Vec<PathBuf>>,
}

/// Parse settings TOML; missing keys keep their defaults
pub fn parse_settings(content: &str) -> Result<Settings> {
    let raw: RawSettings = toml::from_str(content)
        .map_err(|e| Error::Config(format!("Invalid config TOML: {}", e)))?;

    let mut settings = Settings::default();

    if let Some(cashew) = raw.cashew {
        if let Some(url) = cashew.url {
            settings.cashew_url = url;
        }
        if let Some(size) = cashew.batch_size {
            if size == 0 {
                return Err(Error::Config("cashew.batch_size must be at least 1".into()));
            }
            settings.batch_size = size;
        }
        if let Some(pause) = cashew.pause_secs {
            settings.pause_secs = pause;
        }
    }

    if let Some(predictor) = raw.predictor {
        if let Some(enabled) = predictor.enabled {
            settings.use_predictor = enabled;
        }
        if let Some(threshold) = predictor.threshold {
            if !(0.0..=1.0).contains(&threshold) {
                return Err(Error::Config(format!(
                    "predictor.threshold must be between 0 and 1, got {}",
                    threshold
                )));
            }
            settings.predictor_threshold = threshold;
        }
    }

    if let Some(mappings) = raw.mappings {
        settings.mapping_files = mappings.files.unwrap_or_default();
    }

    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_default_settings() {
        let settings = parse_settings(DEFAULT_SETTINGS).unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_partial_settings_keep_defaults() {
        let settings = parse_settings(
            r#"
[cashew]
url = "https://cashewapp.web.app"

[predictor]
enabled = false
"#,
        )
        .unwrap();

        assert_eq!(settings.cashew_url, "https://cashewapp.web.app");
        assert_eq!(settings.batch_size, 25);
        assert_eq!(settings.pause_secs, 10);
        assert!(!settings.use_predictor);
        assert!(settings.predictor().is_none());
    }

    #[test]
    fn test_invalid_settings() {
        assert!(matches!(
            parse_settings("[cashew]\nbatch_size = 0").unwrap_err(),
            Error::Config(_)
        ));
        assert!(matches!(
            parse_settings("[predictor]\nthreshold = 1.5").unwrap_err(),
            Error::Config(_)
        ));
        assert!(matches!(
            parse_settings("[cashew").unwrap_err(),
            Error::Config(_)
        ));
    }

    #[test]
    fn test_load_settings_from_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            "[cashew]\npause_secs = 2\n\n[mappings]\nfiles = [\"/tmp/extra.toml\"]\n",
        )
        .unwrap();

        let settings = load_settings(Some(&path)).unwrap();
        assert_eq!(settings.pause_secs, 2);
        assert_eq!(settings.mapping_files, vec![PathBuf::from("/tmp/extra.toml")]);
    }

    #[test]
    fn test_missing_explicit_path_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_settings(Some(&dir.path().join("missing.toml"))).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_predictor_threshold_from_settings() {
        let settings = parse_settings("[predictor]\nthreshold = 0.9").unwrap();
        assert_eq!(settings.predictor().unwrap().threshold(), 0.9);
    }
}
