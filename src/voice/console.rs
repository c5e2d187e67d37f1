//! Speech output rendered to the terminal

use std::time::Duration;

use async_trait::async_trait;

use super::{SpeechOutput, StopSignal};
use crate::error::OutputError;
use crate::language;

/// Seconds per character at rate 1.0
const SECONDS_PER_CHAR: f32 = 0.04;

/// "Speaks" by printing the utterance, paced like real speech
pub struct ConsoleSpeechOutput {
    available: bool,
    rate: f32,
    cancelled: StopSignal,
}

impl ConsoleSpeechOutput {
    /// Create a console output speaking at `rate` (1.0 = normal)
    #[must_use]
    pub fn new(rate: f32) -> Self {
        Self {
            available: true,
            rate: rate.max(0.1),
            cancelled: StopSignal::new(),
        }
    }

    /// Create an output that reports no synthesis capability
    #[must_use]
    pub fn muted() -> Self {
        Self {
            available: false,
            ..Self::new(1.0)
        }
    }

    /// How long an utterance of `text` takes at the configured rate
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn duration_for(&self, text: &str) -> Duration {
        let chars = text.chars().count() as f32;
        Duration::from_secs_f32(chars * SECONDS_PER_CHAR / self.rate)
    }
}

#[async_trait]
impl SpeechOutput for ConsoleSpeechOutput {
    fn is_available(&self) -> bool {
        self.available
    }

    async fn speak(&self, text: &str, language: &str) -> Result<(), OutputError> {
        if !self.available {
            return Err(OutputError::NoSupport);
        }

        let since = self.cancelled.generation();
        println!(
            "🔊 {} {}: {text}",
            language::flag(language),
            language::name(language)
        );

        tokio::select! {
            biased;
            () = self.cancelled.stopped_since(since) => {
                Err(OutputError::Synthesis("interrupted".to_string()))
            }
            () = tokio::time::sleep(self.duration_for(text)) => Ok(()),
        }
    }

    fn cancel(&self) {
        self.cancelled.trigger();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slower_rate_takes_longer() {
        let normal = ConsoleSpeechOutput::new(1.0);
        let slow = ConsoleSpeechOutput::new(0.5);
        assert!(slow.duration_for("hello there") > normal.duration_for("hello there"));
        assert_eq!(normal.duration_for(""), Duration::ZERO);
    }

    #[tokio::test]
    async fn test_cancel_interrupts_playback() {
        let output = std::sync::Arc::new(ConsoleSpeechOutput::new(0.1));
        let playing = tokio::spawn({
            let output = std::sync::Arc::clone(&output);
            async move { output.speak("a long sentence to read out", "en").await }
        });

        tokio::time::sleep(Duration::from_millis(10)).await;
        output.cancel();

        let result = tokio::time::timeout(Duration::from_secs(1), playing)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(result, Err(OutputError::Synthesis("interrupted".to_string())));
    }

    #[tokio::test]
    async fn test_muted_output_is_unavailable() {
        let output = ConsoleSpeechOutput::muted();
        assert!(!output.is_available());
        assert_eq!(output.speak("hello", "en").await, Err(OutputError::NoSupport));
    }

    #[test]
    fn test_rate_is_clamped() {
        let output = ConsoleSpeechOutput::new(0.0);
        assert!(output.duration_for("hi") > Duration::ZERO);
    }
}
