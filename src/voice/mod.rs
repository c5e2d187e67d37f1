//! Speech input and output providers
//!
//! The conversation session owns exactly one input and one output provider.
//! Both are driven asynchronously: `capture`/`speak` resolve when the
//! utterance is recognized or played, while `stop`/`cancel` are best-effort
//! and may still let a pending call resolve afterwards.

mod console;
mod queued;
mod stop;

use async_trait::async_trait;

use crate::error::{InputError, OutputError};

pub use console::ConsoleSpeechOutput;
pub use queued::QueuedSpeechInput;
pub(crate) use stop::StopSignal;

/// Speech-to-text capture
#[async_trait]
pub trait SpeechInput: Send + Sync {
    /// Whether this host can capture speech at all
    fn is_available(&self) -> bool;

    /// Capture one utterance in `language` and return its transcript
    ///
    /// # Errors
    ///
    /// Returns `InputError` on missing support, denied permission, or a
    /// recognition failure
    async fn capture(&self, language: &str) -> Result<String, InputError>;

    /// Stop any capture in progress
    fn stop(&self);
}

/// Text-to-speech playback
#[async_trait]
pub trait SpeechOutput: Send + Sync {
    /// Whether this host can synthesize speech at all
    fn is_available(&self) -> bool;

    /// Speak `text` in `language`, resolving when playback ends
    ///
    /// # Errors
    ///
    /// Returns `OutputError` on missing support or synthesis failure
    async fn speak(&self, text: &str, language: &str) -> Result<(), OutputError>;

    /// Interrupt playback in progress
    fn cancel(&self);
}
