//! Async host for the turn controller
//!
//! Owns one speech input, one translator and one speech output for the
//! lifetime of a conversation view. Provider calls run as tokio tasks and
//! report back through a single channel, so every controller mutation happens
//! on whichever task polls the session. Cancelling stops pending capture and
//! playback tasks; a translation already underway is left to finish and its
//! result is discarded by ticket.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinSet;

use super::controller::{ConversationTurnController, Phase, Request, Ticket};
use super::turn::{ConversationLog, Side, TurnLog};
use crate::error::{InputError, OutputError, TranslationError, TurnError};
use crate::language::LanguagePair;
use crate::translate::TranslationProvider;
use crate::voice::{SpeechInput, SpeechOutput, StopSignal};

/// The providers a session acquires on creation
#[derive(Clone)]
pub struct Providers {
    pub input: Arc<dyn SpeechInput>,
    pub translator: Arc<dyn TranslationProvider>,
    pub output: Arc<dyn SpeechOutput>,
}

/// Completion of a provider request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderEvent {
    /// Speech capture finished
    Captured {
        ticket: Ticket,
        result: Result<String, InputError>,
    },
    /// Translation finished
    Translated {
        ticket: Ticket,
        result: Result<String, TranslationError>,
    },
    /// Playback finished
    Spoken {
        ticket: Ticket,
        result: Result<(), OutputError>,
    },
}

impl ProviderEvent {
    /// Ticket of the request this event completes
    #[must_use]
    pub const fn ticket(&self) -> Ticket {
        match self {
            Self::Captured { ticket, .. }
            | Self::Translated { ticket, .. }
            | Self::Spoken { ticket, .. } => *ticket,
        }
    }
}

/// A live voice conversation between two languages
///
/// Dropping the session stops capture and playback and aborts any provider
/// task still running.
pub struct ConversationSession<L: TurnLog = ConversationLog> {
    controller: ConversationTurnController<L>,
    providers: Providers,
    events_tx: mpsc::UnboundedSender<ProviderEvent>,
    events_rx: mpsc::UnboundedReceiver<ProviderEvent>,
    tasks: JoinSet<()>,
    stops: Arc<StopSignal>,
}

impl<L: TurnLog> ConversationSession<L> {
    /// Open a session over `pair`, appending completed turns to `log`
    pub fn new(pair: LanguagePair, providers: Providers, log: L) -> Self {
        let input_available = providers.input.is_available();
        if !providers.output.is_available() {
            tracing::warn!("speech output unavailable, translations will not be spoken");
        }

        let controller =
            ConversationTurnController::new(pair, log).with_input_available(input_available);
        let (events_tx, events_rx) = mpsc::unbounded_channel();

        tracing::debug!(
            from = %controller.pair().from,
            to = %controller.pair().to,
            input_available,
            "conversation session opened"
        );

        Self {
            controller,
            providers,
            events_tx,
            events_rx,
            tasks: JoinSet::new(),
            stops: Arc::new(StopSignal::new()),
        }
    }

    /// Let turns run when both sides share a language
    #[must_use]
    pub fn with_same_language_allowed(mut self, allowed: bool) -> Self {
        self.controller.set_same_language_allowed(allowed);
        self
    }

    #[must_use]
    pub const fn controller(&self) -> &ConversationTurnController<L> {
        &self.controller
    }

    #[must_use]
    pub const fn phase(&self) -> Phase {
        self.controller.phase()
    }

    #[must_use]
    pub const fn log(&self) -> &L {
        self.controller.log()
    }

    pub fn select_active_side(&mut self, side: Side) {
        self.controller.select_active_side(side);
    }

    /// Start listening on the active side
    ///
    /// # Errors
    ///
    /// Returns the controller's `TurnError` when the turn cannot start
    pub fn begin_turn(&mut self) -> Result<(), TurnError> {
        let request = self.controller.begin_turn()?;
        self.execute(request);
        Ok(())
    }

    /// Select `side` and start listening on it
    ///
    /// # Errors
    ///
    /// Returns the controller's `TurnError` when the turn cannot start
    pub fn begin_turn_as(&mut self, side: Side) -> Result<(), TurnError> {
        let request = self.controller.begin_turn_as(side)?;
        self.execute(request);
        Ok(())
    }

    /// Abandon the turn in progress
    pub fn cancel(&mut self) {
        let request = self.controller.cancel();
        self.execute(request);
    }

    /// Replace the language pair, cancelling any turn in progress
    pub fn set_language_pair(&mut self, pair: LanguagePair) {
        let request = self.controller.set_language_pair(pair);
        self.execute(request);
    }

    /// Swap the two languages, cancelling any turn in progress
    pub fn swap_languages(&mut self) {
        let request = self.controller.swap_languages();
        self.execute(request);
    }

    /// Wait for the next provider completion
    pub async fn next_event(&mut self) -> Option<ProviderEvent> {
        self.events_rx.recv().await
    }

    /// Feed one provider completion to the controller
    pub fn handle(&mut self, event: ProviderEvent) {
        let request = match event {
            ProviderEvent::Captured { ticket, result } => match result {
                Ok(transcript) => self.controller.on_input_captured(ticket, transcript),
                Err(e) => {
                    self.controller.on_input_error(ticket, e);
                    None
                }
            },
            ProviderEvent::Translated { ticket, result } => match result {
                Ok(text) => self.controller.on_translation_ready(ticket, text),
                Err(e) => {
                    self.controller.on_translation_failed(ticket, e);
                    None
                }
            },
            ProviderEvent::Spoken { ticket, result } => {
                match result {
                    Ok(()) => self.controller.on_output_finished(ticket),
                    Err(e) => self.controller.on_output_error(ticket, e),
                }
                None
            }
        };
        self.execute(request);
    }

    /// Process provider completions until the controller is idle
    pub async fn pump_until_idle(&mut self) {
        while !self.controller.is_idle() {
            let Some(event) = self.next_event().await else {
                break;
            };
            self.handle(event);
        }
    }

    /// Run one full turn on the active side
    ///
    /// # Errors
    ///
    /// Returns the `TurnError` that ended the turn. An output error still
    /// leaves the translated turn in the log.
    pub async fn run_turn(&mut self) -> Result<(), TurnError> {
        self.run_turn_with(|| {}).await
    }

    /// Run one full turn, calling `on_listening` once capture was requested
    ///
    /// Hosts that feed the input themselves push the utterance here, so a
    /// turn that never starts does not leave it queued for the next one.
    ///
    /// # Errors
    ///
    /// Same as [`Self::run_turn`]
    pub async fn run_turn_with(&mut self, on_listening: impl FnOnce()) -> Result<(), TurnError> {
        self.begin_turn()?;
        on_listening();
        self.pump_until_idle().await;
        self.controller.last_error().cloned().map_or(Ok(()), Err)
    }

    /// Stop all provider activity
    ///
    /// Called automatically on drop.
    pub fn shutdown(&mut self) {
        let _ = self.controller.cancel();
        self.stops.trigger();
        self.providers.input.stop();
        self.providers.output.cancel();
        self.tasks.abort_all();
        tracing::debug!("conversation session closed");
    }

    fn execute(&mut self, request: Option<Request>) {
        // Reap finished provider tasks
        while self.tasks.try_join_next().is_some() {}

        let Some(request) = request else {
            return;
        };

        match request {
            Request::Capture { ticket, language } => {
                let input = Arc::clone(&self.providers.input);
                let tx = self.events_tx.clone();
                let stops = Arc::clone(&self.stops);
                let since = stops.generation();
                self.tasks.spawn(async move {
                    // A stop issued before this task first runs still applies
                    let result = tokio::select! {
                        biased;
                        () = stops.stopped_since(since) => {
                            Err(InputError::Recognition("capture stopped".to_string()))
                        }
                        result = input.capture(&language) => result,
                    };
                    let _ = tx.send(ProviderEvent::Captured { ticket, result });
                });
            }
            Request::Translate {
                ticket,
                text,
                source,
                target,
            } => {
                let translator = Arc::clone(&self.providers.translator);
                let tx = self.events_tx.clone();
                self.tasks.spawn(async move {
                    let result = translator.translate(&text, &source, &target).await;
                    let _ = tx.send(ProviderEvent::Translated { ticket, result });
                });
            }
            Request::Speak {
                ticket,
                text,
                language,
            } => {
                let output = Arc::clone(&self.providers.output);
                let tx = self.events_tx.clone();
                let stops = Arc::clone(&self.stops);
                let since = stops.generation();
                self.tasks.spawn(async move {
                    let result = if output.is_available() {
                        tokio::select! {
                            biased;
                            () = stops.stopped_since(since) => {
                                Err(OutputError::Synthesis("interrupted".to_string()))
                            }
                            result = output.speak(&text, &language) => result,
                        }
                    } else {
                        Err(OutputError::NoSupport)
                    };
                    let _ = tx.send(ProviderEvent::Spoken { ticket, result });
                });
            }
            Request::StopCapture => {
                self.stops.trigger();
                self.providers.input.stop();
            }
            Request::CancelOutput => {
                self.stops.trigger();
                self.providers.output.cancel();
            }
        }
    }
}

impl<L: TurnLog> Drop for ConversationSession<L> {
    fn drop(&mut self) {
        self.shutdown();
    }
}
