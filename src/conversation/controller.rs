//! Turn-taking state machine for a two-party voice conversation
//!
//! The controller performs no IO. Each operation returns the provider
//! [`Request`] the host must carry out, tagged with a [`Ticket`]. Completion
//! callbacks hand the ticket back, and anything that does not match the one
//! request currently in flight is dropped.
//!
//! ```text
//! Idle --begin_turn--> Listening --captured--> Processing --ready--> Speaking
//!  ^                       |                        |                   |
//!  +------ error/cancel ---+-------- failed/cancel -+-- finished/error/cancel
//! ```

use super::turn::{ConversationLog, ConversationTurn, Side, TurnLog};
use crate::error::{InputError, OutputError, TranslationError, TurnError};
use crate::language::LanguagePair;

/// Phase of the current turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// No turn in progress
    Idle,
    /// Waiting for the speech input provider
    Listening,
    /// Waiting for the translation provider
    Processing,
    /// Waiting for the speech output provider
    Speaking,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Listening => "listening",
            Self::Processing => "processing",
            Self::Speaking => "speaking",
        };
        f.write_str(name)
    }
}

/// Identifies one provider request; strictly increasing per controller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Ticket(u64);

impl std::fmt::Display for Ticket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Provider work the host must perform on the controller's behalf
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    /// Capture one utterance
    Capture { ticket: Ticket, language: String },
    /// Translate a transcript
    Translate {
        ticket: Ticket,
        text: String,
        source: String,
        target: String,
    },
    /// Speak a translation
    Speak {
        ticket: Ticket,
        text: String,
        language: String,
    },
    /// Best-effort stop of the capture in flight
    StopCapture,
    /// Best-effort stop of the playback in flight
    CancelOutput,
}

/// Transcript waiting on its translation
#[derive(Debug)]
struct PendingTurn {
    transcript: String,
    source: String,
    target: String,
    speaker: Side,
}

/// Drives one speak → translate → speak cycle at a time
///
/// Completed turns go to the log `L`, owned by the caller and handed in at
/// construction.
#[derive(Debug)]
pub struct ConversationTurnController<L: TurnLog = ConversationLog> {
    pair: LanguagePair,
    active_side: Side,
    phase: Phase,
    last_error: Option<TurnError>,
    input_available: bool,
    allow_same_language: bool,
    last_ticket: u64,
    in_flight: Option<Ticket>,
    pending: Option<PendingTurn>,
    log: L,
}

impl<L: TurnLog> ConversationTurnController<L> {
    /// Create an idle controller with the FROM side active
    pub fn new(pair: LanguagePair, log: L) -> Self {
        Self {
            pair,
            active_side: Side::From,
            phase: Phase::Idle,
            last_error: None,
            input_available: true,
            allow_same_language: false,
            last_ticket: 0,
            in_flight: None,
            pending: None,
            log,
        }
    }

    /// Record whether the speech input provider can capture at all
    #[must_use]
    pub fn with_input_available(mut self, available: bool) -> Self {
        self.input_available = available;
        self
    }

    /// Let turns run when both sides share a language
    #[must_use]
    pub fn with_same_language_allowed(mut self, allowed: bool) -> Self {
        self.set_same_language_allowed(allowed);
        self
    }

    pub const fn set_same_language_allowed(&mut self, allowed: bool) {
        self.allow_same_language = allowed;
    }

    #[must_use]
    pub const fn phase(&self) -> Phase {
        self.phase
    }

    #[must_use]
    pub const fn is_idle(&self) -> bool {
        matches!(self.phase, Phase::Idle)
    }

    #[must_use]
    pub const fn active_side(&self) -> Side {
        self.active_side
    }

    #[must_use]
    pub const fn pair(&self) -> &LanguagePair {
        &self.pair
    }

    /// Error that ended the most recent turn, cleared by the next
    /// successful transition
    #[must_use]
    pub const fn last_error(&self) -> Option<&TurnError> {
        self.last_error.as_ref()
    }

    /// Ticket of the request currently awaited, if any
    #[must_use]
    pub const fn in_flight(&self) -> Option<Ticket> {
        self.in_flight
    }

    #[must_use]
    pub const fn log(&self) -> &L {
        &self.log
    }

    /// Give the log back to the caller
    pub fn into_log(self) -> L {
        self.log
    }

    /// Designate the input side. Ignored while a turn is in progress.
    pub fn select_active_side(&mut self, side: Side) {
        if !self.is_idle() {
            tracing::debug!(phase = %self.phase, %side, "side change ignored, turn in progress");
            return;
        }
        self.active_side = side;
        tracing::debug!(%side, language = self.pair.language_for(side), "active side selected");
    }

    /// Start listening on the active side
    ///
    /// Returns `Ok(None)` when a turn is already in progress.
    ///
    /// # Errors
    ///
    /// Returns `TurnError::InputUnavailable` when the input provider cannot
    /// capture, or `TurnError::SameLanguage` when both sides share a language
    /// and that is not allowed. The controller stays idle and records the
    /// error.
    pub fn begin_turn(&mut self) -> Result<Option<Request>, TurnError> {
        if !self.is_idle() {
            tracing::debug!(phase = %self.phase, "begin_turn ignored, turn in progress");
            return Ok(None);
        }

        if !self.input_available {
            return Err(self.record_error(TurnError::InputUnavailable));
        }

        if !self.allow_same_language && self.pair.is_same_language() {
            let code = self.pair.from.clone();
            return Err(self.record_error(TurnError::SameLanguage(code)));
        }

        let language = self.pair.language_for(self.active_side).to_string();
        let ticket = self.issue_ticket();
        self.enter(Phase::Listening);

        Ok(Some(Request::Capture { ticket, language }))
    }

    /// Select `side`, then start listening on it
    ///
    /// # Errors
    ///
    /// Same as [`Self::begin_turn`]
    pub fn begin_turn_as(&mut self, side: Side) -> Result<Option<Request>, TurnError> {
        self.select_active_side(side);
        self.begin_turn()
    }

    /// Speech was recognized; ask for its translation
    pub fn on_input_captured(
        &mut self,
        ticket: Ticket,
        transcript: impl Into<String>,
    ) -> Option<Request> {
        if !self.accepts(Phase::Listening, ticket, "input captured") {
            return None;
        }

        let transcript = transcript.into();
        if transcript.trim().is_empty() {
            self.fail(InputError::Recognition("empty transcript".to_string()).into());
            return None;
        }

        let speaker = self.active_side;
        let source = self.pair.language_for(speaker).to_string();
        let target = self.pair.language_for(speaker.other()).to_string();

        self.pending = Some(PendingTurn {
            transcript: transcript.clone(),
            source: source.clone(),
            target: target.clone(),
            speaker,
        });

        let ticket = self.issue_ticket();
        self.enter(Phase::Processing);

        Some(Request::Translate {
            ticket,
            text: transcript,
            source,
            target,
        })
    }

    /// Speech capture failed; the turn ends without a log entry
    pub fn on_input_error(&mut self, ticket: Ticket, error: InputError) {
        if self.accepts(Phase::Listening, ticket, "input error") {
            self.fail(error.into());
        }
    }

    /// Translation arrived; log the turn and ask for it to be spoken
    pub fn on_translation_ready(
        &mut self,
        ticket: Ticket,
        translated: impl Into<String>,
    ) -> Option<Request> {
        if !self.accepts(Phase::Processing, ticket, "translation ready") {
            return None;
        }

        let translated = translated.into();
        if translated.trim().is_empty() {
            self.fail(TranslationError::EmptyResult.into());
            return None;
        }

        let Some(pending) = self.pending.take() else {
            // Processing is only entered with a pending turn
            let missing =
                TranslationError::Provider("no transcript awaiting translation".to_string());
            self.fail(missing.into());
            return None;
        };

        let turn = ConversationTurn::new(
            pending.transcript,
            translated.clone(),
            pending.source,
            pending.target.clone(),
            pending.speaker,
        );
        tracing::info!(
            id = %turn.id,
            speaker = %turn.speaker,
            source = %turn.source_lang,
            target = %turn.target_lang,
            "turn recorded"
        );
        self.log.append(turn);

        let ticket = self.issue_ticket();
        self.enter(Phase::Speaking);

        Some(Request::Speak {
            ticket,
            text: translated,
            language: pending.target,
        })
    }

    /// Translation failed; nothing is logged
    pub fn on_translation_failed(&mut self, ticket: Ticket, error: TranslationError) {
        if self.accepts(Phase::Processing, ticket, "translation failed") {
            self.fail(error.into());
        }
    }

    /// Playback finished
    pub fn on_output_finished(&mut self, ticket: Ticket) {
        if self.accepts(Phase::Speaking, ticket, "output finished") {
            self.in_flight = None;
            self.enter(Phase::Idle);
        }
    }

    /// Playback failed; the already-logged turn stays logged
    pub fn on_output_error(&mut self, ticket: Ticket, error: OutputError) {
        if self.accepts(Phase::Speaking, ticket, "output error") {
            self.fail(error.into());
        }
    }

    /// Abandon the turn in progress
    ///
    /// Returns the stop request for the provider currently working, if it
    /// can be stopped. Any result it still delivers will be rejected.
    pub fn cancel(&mut self) -> Option<Request> {
        let stop = match self.phase {
            Phase::Idle => return None,
            Phase::Listening => Some(Request::StopCapture),
            Phase::Processing => None,
            Phase::Speaking => Some(Request::CancelOutput),
        };

        tracing::info!(phase = %self.phase, ticket = ?self.in_flight, "turn cancelled");
        self.in_flight = None;
        self.pending = None;
        self.enter(Phase::Idle);
        stop
    }

    /// Replace the language pair, cancelling any turn in progress
    pub fn set_language_pair(&mut self, pair: LanguagePair) -> Option<Request> {
        let stop = self.cancel();
        tracing::debug!(from = %pair.from, to = %pair.to, "language pair changed");
        self.pair = pair;
        stop
    }

    /// Swap the two languages, cancelling any turn in progress
    pub fn swap_languages(&mut self) -> Option<Request> {
        let mut pair = self.pair.clone();
        pair.swap();
        self.set_language_pair(pair)
    }

    fn issue_ticket(&mut self) -> Ticket {
        self.last_ticket += 1;
        let ticket = Ticket(self.last_ticket);
        self.in_flight = Some(ticket);
        ticket
    }

    fn accepts(&self, expected: Phase, ticket: Ticket, event: &'static str) -> bool {
        if self.phase != expected {
            tracing::trace!(event, phase = %self.phase, %ticket, "callback ignored, wrong phase");
            return false;
        }
        if self.in_flight != Some(ticket) {
            tracing::debug!(event, %ticket, expected = ?self.in_flight, "stale callback rejected");
            return false;
        }
        true
    }

    fn enter(&mut self, phase: Phase) {
        tracing::debug!(
            from = %self.phase,
            to = %phase,
            side = %self.active_side,
            "phase transition"
        );
        self.phase = phase;
        self.last_error = None;
    }

    fn fail(&mut self, error: TurnError) {
        self.in_flight = None;
        self.pending = None;
        self.enter(Phase::Idle);
        self.record_error(error);
    }

    fn record_error(&mut self, error: TurnError) -> TurnError {
        tracing::warn!(error = %error, side = %self.active_side, "turn failed");
        self.last_error = Some(error.clone());
        error
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn controller() -> ConversationTurnController {
        ConversationTurnController::new(LanguagePair::new("en", "es"), ConversationLog::new())
    }

    fn capture_ticket(request: Option<Request>) -> Ticket {
        match request {
            Some(Request::Capture { ticket, .. }) => ticket,
            other => panic!("expected capture request, got {other:?}"),
        }
    }

    #[test]
    fn test_begin_turn_requests_active_language() {
        let mut c = controller();
        c.select_active_side(Side::To);

        let request = c.begin_turn().unwrap();
        assert!(matches!(request, Some(Request::Capture { ref language, .. }) if language == "es"));
        assert_eq!(c.phase(), Phase::Listening);
    }

    #[test]
    fn test_begin_turn_ignored_when_busy() {
        let mut c = controller();
        let first = capture_ticket(c.begin_turn().unwrap());

        assert_eq!(c.begin_turn(), Ok(None));
        assert_eq!(c.phase(), Phase::Listening);
        assert_eq!(c.in_flight(), Some(first));
    }

    #[test]
    fn test_side_locked_during_turn() {
        let mut c = controller();
        c.begin_turn().unwrap();
        c.select_active_side(Side::To);
        assert_eq!(c.active_side(), Side::From);
    }

    #[test]
    fn test_input_unavailable() {
        let mut c = controller().with_input_available(false);
        assert_eq!(c.begin_turn(), Err(TurnError::InputUnavailable));
        assert_eq!(c.phase(), Phase::Idle);
        assert_eq!(c.last_error(), Some(&TurnError::InputUnavailable));
    }

    #[test]
    fn test_same_language_rejected_unless_allowed() {
        let mut c = ConversationTurnController::new(LanguagePair::new("en", "en"), Vec::new());
        assert_eq!(
            c.begin_turn(),
            Err(TurnError::SameLanguage("en".to_string()))
        );

        let mut c = ConversationTurnController::new(LanguagePair::new("en", "en"), Vec::new())
            .with_same_language_allowed(true);
        assert!(c.begin_turn().unwrap().is_some());
    }

    #[test]
    fn test_out_of_order_callback_ignored() {
        let mut c = controller();
        let ticket = capture_ticket(c.begin_turn().unwrap());

        assert!(c.on_translation_ready(ticket, "Hola").is_none());
        c.on_output_finished(ticket);
        assert_eq!(c.phase(), Phase::Listening);
        assert!(c.log().is_empty());
    }

    #[test]
    fn test_tickets_increase() {
        let mut c = controller();
        let capture = capture_ticket(c.begin_turn().unwrap());
        let Some(Request::Translate { ticket, .. }) = c.on_input_captured(capture, "hello") else {
            panic!("expected translate request");
        };
        assert!(ticket > capture);
    }

    #[test]
    fn test_empty_transcript_is_input_error() {
        let mut c = controller();
        let ticket = capture_ticket(c.begin_turn().unwrap());

        assert!(c.on_input_captured(ticket, "  ").is_none());
        assert_eq!(c.phase(), Phase::Idle);
        assert!(matches!(c.last_error(), Some(TurnError::Input(_))));
    }

    #[test]
    fn test_error_cleared_by_next_turn() {
        let mut c = controller();
        let ticket = capture_ticket(c.begin_turn().unwrap());
        c.on_input_error(ticket, InputError::PermissionDenied);
        assert!(c.last_error().is_some());

        c.begin_turn().unwrap();
        assert!(c.last_error().is_none());
    }

    #[test]
    fn test_cancel_returns_stop_for_active_provider() {
        let mut c = controller();
        assert_eq!(c.cancel(), None);

        let ticket = capture_ticket(c.begin_turn().unwrap());
        assert_eq!(c.cancel(), Some(Request::StopCapture));

        let ticket2 = capture_ticket(c.begin_turn().unwrap());
        assert_ne!(ticket, ticket2);
        let Some(Request::Translate { ticket: t, .. }) = c.on_input_captured(ticket2, "hi") else {
            panic!("expected translate request");
        };
        assert_eq!(c.cancel(), None);
        assert_eq!(c.phase(), Phase::Idle);

        // Late translation for the cancelled turn
        assert!(c.on_translation_ready(t, "Hola").is_none());
        assert!(c.log().is_empty());
    }

    #[test]
    fn test_swap_languages_resets_turn() {
        let mut c = controller();
        c.begin_turn().unwrap();

        assert_eq!(c.swap_languages(), Some(Request::StopCapture));
        assert_eq!(c.phase(), Phase::Idle);
        assert_eq!(c.pair(), &LanguagePair::new("es", "en"));
    }
}
