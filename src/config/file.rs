//! TOML configuration file loading
//!
//! Supports `~/.config/tandem/config.toml` as a persistent config source.
//! All fields are optional; the file is a partial overlay on top of defaults.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::Result;

/// Top-level TOML configuration file schema
#[derive(Debug, Default, Deserialize)]
pub struct TandemConfigFile {
    /// Default language pair
    #[serde(default)]
    pub languages: LanguagesFileConfig,

    /// Speech output configuration
    #[serde(default)]
    pub voice: VoiceFileConfig,

    /// Translation configuration
    #[serde(default)]
    pub translation: TranslationFileConfig,
}

/// Default language pair
#[derive(Debug, Default, Deserialize)]
pub struct LanguagesFileConfig {
    /// FROM side language code (e.g. "en")
    pub from: Option<String>,

    /// TO side language code (e.g. "hi")
    pub to: Option<String>,

    /// Permit both sides to use the same language
    pub allow_same_language: Option<bool>,
}

/// Speech output configuration
#[derive(Debug, Default, Deserialize)]
pub struct VoiceFileConfig {
    /// Speech rate multiplier (1.0 = normal)
    pub speech_rate: Option<f32>,
}

/// Translation configuration
#[derive(Debug, Default, Deserialize)]
pub struct TranslationFileConfig {
    /// Artificial latency added to each translation
    pub latency_ms: Option<u64>,
}

/// Load the TOML config file from the standard path
///
/// Returns `TandemConfigFile::default()` if the file doesn't exist or can't be parsed.
pub fn load_config_file() -> TandemConfigFile {
    config_file_path().map_or_else(TandemConfigFile::default, |path| {
        load_config_file_from(&path)
    })
}

/// Load a TOML config file from `path`, falling back to defaults
pub fn load_config_file_from(path: &Path) -> TandemConfigFile {
    match read_config_file(path) {
        Ok(Some(config)) => {
            tracing::info!(path = %path.display(), "loaded config file");
            config
        }
        Ok(None) => TandemConfigFile::default(),
        Err(e) => {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "failed to load config file, using defaults"
            );
            TandemConfigFile::default()
        }
    }
}

/// Read and parse the config file at `path`
///
/// Returns `Ok(None)` if the file doesn't exist.
///
/// # Errors
///
/// Returns `Error::Io` if the file can't be read, `Error::Toml` if it isn't
/// valid config
pub fn read_config_file(path: &Path) -> Result<Option<TandemConfigFile>> {
    if !path.exists() {
        return Ok(None);
    }

    let content = std::fs::read_to_string(path)?;
    Ok(Some(toml::from_str(&content)?))
}

/// Return the config file path: `~/.config/tandem/config.toml`
pub fn config_file_path() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|d| d.config_dir().join("tandem").join("config.toml"))
}
