//! Text translation providers
//!
//! The conversation controller only sees the [`TranslationProvider`] trait.
//! A lookup miss is the provider's problem: it must answer with a fallback
//! string rather than an error.

mod phrasebook;

use async_trait::async_trait;

use crate::error::TranslationError;

pub use phrasebook::{PhrasebookTranslator, fallback_translation};

/// Maps text from one language to another
#[async_trait]
pub trait TranslationProvider: Send + Sync {
    /// Translate `text` from `source` to `target`
    ///
    /// # Errors
    ///
    /// Returns `TranslationError::Provider` if the backend fails
    async fn translate(
        &self,
        text: &str,
        source: &str,
        target: &str,
    ) -> Result<String, TranslationError>;
}
