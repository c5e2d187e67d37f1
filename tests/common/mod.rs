//! Shared test utilities: scripted providers with observable side effects

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tandem::{
    ConversationSession, InputError, OutputError, PhrasebookTranslator, ProviderEvent, Providers,
    SpeechInput, SpeechOutput, TranslationError, TranslationProvider, TurnLog,
};
use tokio::sync::Notify;

/// How long a test waits for a provider event before failing
pub const EVENT_TIMEOUT: Duration = Duration::from_secs(2);

/// Speech input answering from a script; `stop` is recorded but never
/// interrupts a pending capture, so late results always arrive
pub struct ScriptedInput {
    available: bool,
    script: Mutex<VecDeque<Result<String, InputError>>>,
    pushed: Notify,
    stops: AtomicUsize,
}

impl ScriptedInput {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            available: true,
            script: Mutex::new(VecDeque::new()),
            pushed: Notify::new(),
            stops: AtomicUsize::new(0),
        })
    }

    pub fn unavailable() -> Arc<Self> {
        Arc::new(Self {
            available: false,
            script: Mutex::new(VecDeque::new()),
            pushed: Notify::new(),
            stops: AtomicUsize::new(0),
        })
    }

    pub fn say(&self, transcript: &str) {
        self.push(Ok(transcript.to_string()));
    }

    pub fn fail(&self, error: InputError) {
        self.push(Err(error));
    }

    fn push(&self, result: Result<String, InputError>) {
        self.script.lock().unwrap().push_back(result);
        self.pushed.notify_one();
    }

    pub fn stops(&self) -> usize {
        self.stops.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SpeechInput for ScriptedInput {
    fn is_available(&self) -> bool {
        self.available
    }

    async fn capture(&self, _language: &str) -> Result<String, InputError> {
        loop {
            let next = self.script.lock().unwrap().pop_front();
            if let Some(result) = next {
                return result;
            }
            self.pushed.notified().await;
        }
    }

    fn stop(&self) {
        self.stops.fetch_add(1, Ordering::SeqCst);
    }
}

/// Phrasebook translator that can be held until released, or made to fail
pub struct ControlledTranslator {
    inner: PhrasebookTranslator,
    gated: bool,
    gate: Notify,
    failure: Option<TranslationError>,
    answer: Option<String>,
}

impl ControlledTranslator {
    pub fn phrasebook() -> Arc<Self> {
        Arc::new(Self::with(false, None, None))
    }

    pub fn gated() -> Arc<Self> {
        Arc::new(Self::with(true, None, None))
    }

    pub fn failing(error: TranslationError) -> Arc<Self> {
        Arc::new(Self::with(false, Some(error), None))
    }

    pub fn answering(text: &str) -> Arc<Self> {
        Arc::new(Self::with(false, None, Some(text.to_string())))
    }

    fn with(gated: bool, failure: Option<TranslationError>, answer: Option<String>) -> Self {
        Self {
            inner: PhrasebookTranslator::new(),
            gated,
            gate: Notify::new(),
            failure,
            answer,
        }
    }

    /// Let one held translation complete
    pub fn release(&self) {
        self.gate.notify_one();
    }
}

#[async_trait]
impl TranslationProvider for ControlledTranslator {
    async fn translate(
        &self,
        text: &str,
        source: &str,
        target: &str,
    ) -> Result<String, TranslationError> {
        if self.gated {
            self.gate.notified().await;
        }
        if let Some(error) = &self.failure {
            return Err(error.clone());
        }
        if let Some(answer) = &self.answer {
            return Ok(answer.clone());
        }
        self.inner.translate(text, source, target).await
    }
}

/// Speech output that records what it was asked to say
pub struct RecordingOutput {
    available: bool,
    failure: Option<OutputError>,
    gated: bool,
    gate: Notify,
    spoken: Mutex<Vec<(String, String)>>,
    cancels: AtomicUsize,
}

impl RecordingOutput {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::with(true, None, false))
    }

    pub fn unavailable() -> Arc<Self> {
        Arc::new(Self::with(false, None, false))
    }

    pub fn failing(error: OutputError) -> Arc<Self> {
        Arc::new(Self::with(true, Some(error), false))
    }

    /// Playback only finishes once released
    pub fn gated() -> Arc<Self> {
        Arc::new(Self::with(true, None, true))
    }

    fn with(available: bool, failure: Option<OutputError>, gated: bool) -> Self {
        Self {
            available,
            failure,
            gated,
            gate: Notify::new(),
            spoken: Mutex::new(Vec::new()),
            cancels: AtomicUsize::new(0),
        }
    }

    pub fn release(&self) {
        self.gate.notify_one();
    }

    /// (text, language) pairs in the order they were spoken
    pub fn spoken(&self) -> Vec<(String, String)> {
        self.spoken.lock().unwrap().clone()
    }

    pub fn cancels(&self) -> usize {
        self.cancels.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SpeechOutput for RecordingOutput {
    fn is_available(&self) -> bool {
        self.available
    }

    async fn speak(&self, text: &str, language: &str) -> Result<(), OutputError> {
        self.spoken
            .lock()
            .unwrap()
            .push((text.to_string(), language.to_string()));
        if self.gated {
            self.gate.notified().await;
        }
        self.failure.clone().map_or(Ok(()), Err)
    }

    fn cancel(&self) {
        self.cancels.fetch_add(1, Ordering::SeqCst);
    }
}

/// Bundle concrete test providers for a session
pub fn providers(
    input: &Arc<ScriptedInput>,
    translator: &Arc<ControlledTranslator>,
    output: &Arc<RecordingOutput>,
) -> Providers {
    Providers {
        input: input.clone(),
        translator: translator.clone(),
        output: output.clone(),
    }
}

/// Wait for the next provider event, failing the test on timeout
pub async fn next_event<L: TurnLog>(session: &mut ConversationSession<L>) -> ProviderEvent {
    tokio::time::timeout(EVENT_TIMEOUT, session.next_event())
        .await
        .expect("timed out waiting for provider event")
        .expect("event channel closed")
}

/// Drive the session until idle, failing the test on timeout
pub async fn settle<L: TurnLog>(session: &mut ConversationSession<L>) {
    tokio::time::timeout(EVENT_TIMEOUT, session.pump_until_idle())
        .await
        .expect("timed out waiting for session to go idle");
}
