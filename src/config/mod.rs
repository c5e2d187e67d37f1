//! Configuration management for the tandem interpreter

pub mod file;

use std::time::Duration;

use crate::{Error, LanguagePair, Result};

/// Lowest accepted speech rate
const MIN_SPEECH_RATE: f32 = 0.1;

/// Highest accepted speech rate
const MAX_SPEECH_RATE: f32 = 10.0;

/// Interpreter configuration
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Language pair a new conversation starts with
    pub languages: LanguagePair,

    /// Permit turns when both sides use the same language
    pub allow_same_language: bool,

    /// Speech output configuration
    pub voice: VoiceConfig,

    /// Translation configuration
    pub translation: TranslationConfig,
}

/// Speech output configuration
#[derive(Debug, Clone)]
pub struct VoiceConfig {
    /// Speech rate multiplier (1.0 = normal)
    pub speech_rate: f32,
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self { speech_rate: 0.9 }
    }
}

/// Translation configuration
#[derive(Debug, Clone, Default)]
pub struct TranslationConfig {
    /// Artificial latency added to each translation
    pub latency: Duration,
}

impl Config {
    /// Load configuration from the environment and the config file
    ///
    /// # Errors
    ///
    /// Returns error if a value is malformed or a language is unknown
    pub fn load() -> Result<Self> {
        let fc = file::load_config_file();
        Self::from_sources(fc, |key| std::env::var(key).ok())
    }

    /// Build configuration from a parsed file and an environment lookup
    ///
    /// Precedence is env > file > default.
    ///
    /// # Errors
    ///
    /// Returns error if a value is malformed or a language is unknown
    pub fn from_sources(
        fc: file::TandemConfigFile,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        let defaults = Self::default();

        let languages = LanguagePair::new(
            env("TANDEM_FROM_LANG")
                .or(fc.languages.from)
                .unwrap_or(defaults.languages.from),
            env("TANDEM_TO_LANG")
                .or(fc.languages.to)
                .unwrap_or(defaults.languages.to),
        );

        let allow_same_language = match env("TANDEM_ALLOW_SAME_LANGUAGE") {
            Some(v) => parse_bool("TANDEM_ALLOW_SAME_LANGUAGE", &v)?,
            None => fc
                .languages
                .allow_same_language
                .unwrap_or(defaults.allow_same_language),
        };

        let speech_rate = match env("TANDEM_SPEECH_RATE") {
            Some(v) => v.parse::<f32>().map_err(|e| {
                Error::Config(format!("TANDEM_SPEECH_RATE must be a number: {e}"))
            })?,
            None => fc.voice.speech_rate.unwrap_or(defaults.voice.speech_rate),
        };

        let latency_ms = match env("TANDEM_TRANSLATE_LATENCY_MS") {
            Some(v) => Some(v.parse::<u64>().map_err(|e| {
                Error::Config(format!(
                    "TANDEM_TRANSLATE_LATENCY_MS must be whole milliseconds: {e}"
                ))
            })?),
            None => fc.translation.latency_ms,
        };

        let config = Self {
            languages,
            allow_same_language,
            voice: VoiceConfig { speech_rate },
            translation: TranslationConfig {
                latency: latency_ms.map_or(defaults.translation.latency, Duration::from_millis),
            },
        };
        config.validate()?;

        Ok(config)
    }

    /// Check values that cannot be expressed in the types
    ///
    /// # Errors
    ///
    /// Returns error on an unknown language or out-of-range speech rate
    pub fn validate(&self) -> Result<()> {
        self.languages.validate()?;

        if !(MIN_SPEECH_RATE..=MAX_SPEECH_RATE).contains(&self.voice.speech_rate) {
            return Err(Error::Config(format!(
                "speech rate {} outside {MIN_SPEECH_RATE}..={MAX_SPEECH_RATE}",
                self.voice.speech_rate
            )));
        }

        Ok(())
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Ok(true),
        "0" | "false" | "no" => Ok(false),
        other => Err(Error::Config(format!("{key} must be a boolean, got {other:?}"))),
    }
}
