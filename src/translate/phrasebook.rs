//! Built-in phrasebook translator

use std::time::Duration;

use async_trait::async_trait;

use super::TranslationProvider;
use crate::error::TranslationError;
use crate::language;

/// Phrase, then (target code, translation) entries
const PHRASES: &[(&str, &[(&str, &str)])] = &[
    (
        "hello",
        &[
            ("hi", "नमस्ते"),
            ("bn", "হ্যালো"),
            ("ar", "مرحبا"),
            ("sw", "Hujambo"),
            ("es", "Hola"),
            ("pt", "Olá"),
            ("en", "Hello"),
        ],
    ),
    (
        "how are you",
        &[
            ("hi", "आप कैसे हैं?"),
            ("bn", "আপনি কেমন আছেন?"),
            ("ar", "كيف حالك؟"),
            ("sw", "Hujambo, habari?"),
            ("es", "¿Cómo estás?"),
            ("pt", "Como você está?"),
            ("en", "How are you?"),
        ],
    ),
    (
        "thank you",
        &[
            ("hi", "धन्यवाद"),
            ("bn", "ধন্যবাদ"),
            ("ar", "شكرا لك"),
            ("sw", "Asante"),
            ("es", "Gracias"),
            ("pt", "Obrigado"),
            ("en", "Thank you"),
        ],
    ),
];

/// Deterministic answer for text the phrasebook does not know
#[must_use]
pub fn fallback_translation(text: &str, target: &str) -> String {
    format!("[{} translation: \"{text}\"]", language::name(target))
}

/// Translates a handful of common phrases, echoing anything else
///
/// The source language is ignored: phrases are keyed by their English form.
#[derive(Debug, Clone, Default)]
pub struct PhrasebookTranslator {
    latency: Duration,
}

impl PhrasebookTranslator {
    /// Create a translator that answers immediately
    #[must_use]
    pub const fn new() -> Self {
        Self {
            latency: Duration::ZERO,
        }
    }

    /// Delay every answer by `latency` to mimic a remote service
    #[must_use]
    pub const fn with_latency(latency: Duration) -> Self {
        Self { latency }
    }

    /// Look up an exact phrase, ignoring case and surrounding whitespace
    #[must_use]
    pub fn lookup(text: &str, target: &str) -> Option<&'static str> {
        let key = text.trim().to_lowercase();
        PHRASES
            .iter()
            .find(|(phrase, _)| *phrase == key)
            .and_then(|(_, entries)| {
                entries
                    .iter()
                    .find(|(code, _)| code.eq_ignore_ascii_case(target))
                    .map(|(_, translation)| *translation)
            })
    }
}

#[async_trait]
impl TranslationProvider for PhrasebookTranslator {
    async fn translate(
        &self,
        text: &str,
        source: &str,
        target: &str,
    ) -> Result<String, TranslationError> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        let translated = Self::lookup(text, target).map_or_else(
            || {
                tracing::debug!(source, target, text, "phrasebook miss, using fallback");
                fallback_translation(text, target)
            },
            ToString::to_string,
        );

        Ok(translated)
    }
}
