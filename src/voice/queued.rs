//! Speech input fed from already-recognized transcripts

use async_trait::async_trait;
use tokio::sync::{Mutex, mpsc};

use super::{SpeechInput, StopSignal};
use crate::error::InputError;

/// Speech input whose transcripts are pushed by the host
///
/// Stands in for a recognizer: the CLI pushes stdin lines, tests push
/// scripted utterances. Each `capture` consumes one transcript.
pub struct QueuedSpeechInput {
    available: bool,
    sender: mpsc::UnboundedSender<String>,
    receiver: Mutex<mpsc::UnboundedReceiver<String>>,
    stopped: StopSignal,
}

impl QueuedSpeechInput {
    /// Create an input that accepts pushed transcripts
    #[must_use]
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        Self {
            available: true,
            sender,
            receiver: Mutex::new(receiver),
            stopped: StopSignal::new(),
        }
    }

    /// Create an input that reports no capture capability
    #[must_use]
    pub fn unsupported() -> Self {
        Self {
            available: false,
            ..Self::new()
        }
    }

    /// Queue a transcript for the next capture
    pub fn push(&self, transcript: impl Into<String>) {
        // The receiver lives as long as self, so send cannot fail here
        let _ = self.sender.send(transcript.into());
    }

    async fn next_transcript(&self) -> Option<String> {
        self.receiver.lock().await.recv().await
    }
}

impl Default for QueuedSpeechInput {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SpeechInput for QueuedSpeechInput {
    fn is_available(&self) -> bool {
        self.available
    }

    async fn capture(&self, language: &str) -> Result<String, InputError> {
        if !self.available {
            return Err(InputError::NoSupport);
        }

        tracing::debug!(language, "waiting for transcript");
        let since = self.stopped.generation();

        tokio::select! {
            biased;
            () = self.stopped.stopped_since(since) => {
                Err(InputError::Recognition("capture stopped".to_string()))
            }
            transcript = self.next_transcript() => match transcript {
                Some(text) if text.trim().is_empty() => {
                    Err(InputError::Recognition("no speech detected".to_string()))
                }
                Some(text) => Ok(text.trim().to_string()),
                None => Err(InputError::Recognition("input closed".to_string())),
            },
        }
    }

    fn stop(&self) {
        tracing::trace!("stopping capture");
        self.stopped.trigger();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_capture_returns_trimmed_transcript() {
        let input = QueuedSpeechInput::new();
        input.push("  hello  ");
        assert_eq!(input.capture("en").await.unwrap(), "hello");
    }

    #[tokio::test]
    async fn test_blank_transcript_is_recognition_error() {
        let input = QueuedSpeechInput::new();
        input.push("   ");
        assert!(matches!(
            input.capture("en").await,
            Err(InputError::Recognition(_))
        ));
    }

    #[tokio::test]
    async fn test_unsupported_input() {
        let input = QueuedSpeechInput::unsupported();
        assert!(!input.is_available());
        assert_eq!(input.capture("en").await, Err(InputError::NoSupport));
    }

    #[tokio::test]
    async fn test_stop_wakes_pending_capture() {
        let input = std::sync::Arc::new(QueuedSpeechInput::new());
        let pending = tokio::spawn({
            let input = std::sync::Arc::clone(&input);
            async move { input.capture("en").await }
        });

        // Let the capture reach its wait point
        tokio::task::yield_now().await;
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        input.stop();

        let result = pending.await.unwrap();
        assert!(matches!(result, Err(InputError::Recognition(msg)) if msg == "capture stopped"));
    }

    #[tokio::test]
    async fn test_stop_wakes_capture_waiting_for_lock() {
        let input = std::sync::Arc::new(QueuedSpeechInput::new());
        let spawn_capture = || {
            let input = std::sync::Arc::clone(&input);
            tokio::spawn(async move { input.capture("en").await })
        };

        // The first capture holds the receiver, the second queues behind it
        let first = spawn_capture();
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        let second = spawn_capture();
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        input.stop();

        for pending in [first, second] {
            let result = tokio::time::timeout(std::time::Duration::from_secs(1), pending)
                .await
                .unwrap()
                .unwrap();
            assert!(matches!(result, Err(InputError::Recognition(_))));
        }

        // Nothing was consumed by the stopped captures
        input.push("hello");
        assert_eq!(input.capture("en").await.unwrap(), "hello");
    }
}
