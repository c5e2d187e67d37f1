//! Error types for the tandem interpreter

use thiserror::Error;

/// Result type alias for tandem operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur outside of a conversation turn
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Language code not present in the catalog
    #[error("unknown language code: {0}")]
    UnknownLanguage(String),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Why a conversation turn ended without completing
///
/// Recorded as the controller's last error; never fatal to the controller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TurnError {
    /// The speech input provider reports no capture capability
    #[error("speech input unavailable")]
    InputUnavailable,

    /// Both sides of the pair use the same language
    #[error("both sides use the same language: {0}")]
    SameLanguage(String),

    /// Speech capture failed
    #[error("speech input error: {0}")]
    Input(#[from] InputError),

    /// Translation provider failed
    #[error("translation error: {0}")]
    Translation(#[from] TranslationError),

    /// Speech playback failed
    #[error("speech output error: {0}")]
    Output(#[from] OutputError),
}

/// Failure reported by a speech input provider
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    /// Capture is not supported on this host
    #[error("speech recognition not supported")]
    NoSupport,

    /// Microphone permission was refused
    #[error("microphone permission denied")]
    PermissionDenied,

    /// Recognition failed or produced nothing
    #[error("recognition failed: {0}")]
    Recognition(String),
}

/// Failure reported by a translation provider
///
/// A lookup miss is not represented here: providers degrade to a fallback
/// string instead of failing the turn.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TranslationError {
    /// Provider-side failure
    #[error("provider error: {0}")]
    Provider(String),

    /// Provider returned an empty translation
    #[error("provider returned an empty translation")]
    EmptyResult,
}

/// Failure reported by a speech output provider
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OutputError {
    /// Synthesis is not supported on this host
    #[error("speech synthesis not supported")]
    NoSupport,

    /// Synthesis failed for this utterance
    #[error("synthesis failed: {0}")]
    Synthesis(String),
}
