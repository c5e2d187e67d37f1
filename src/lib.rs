//! Tandem - two-party voice interpreter
//!
//! Two people share one device, each speaking their own language. A turn
//! captures one side's speech, translates it, logs it, and speaks the
//! translation in the other side's language.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────┐
//! │                 ConversationSession               │
//! │   tokio tasks  │  event channel  │  scoped drop   │
//! └───────┬───────────────┬──────────────────┬───────┘
//!         │               │                  │
//! ┌───────▼──────┐ ┌──────▼───────┐ ┌────────▼──────┐
//! │ SpeechInput  │ │ Translation  │ │ SpeechOutput  │
//! │              │ │  Provider    │ │               │
//! └──────────────┘ └──────────────┘ └───────────────┘
//!                         ▲
//!          ConversationTurnController (state machine)
//! ```

pub mod config;
pub mod conversation;
pub mod error;
pub mod language;
pub mod translate;
pub mod voice;

pub use config::Config;
pub use conversation::{
    ConversationLog, ConversationSession, ConversationTurn, ConversationTurnController, Phase,
    ProviderEvent, Providers, Request, Side, Ticket, TurnLog,
};
pub use error::{Error, InputError, OutputError, Result, TranslationError, TurnError};
pub use language::{Language, LanguagePair};
pub use translate::{PhrasebookTranslator, TranslationProvider};
pub use voice::{ConsoleSpeechOutput, QueuedSpeechInput, SpeechInput, SpeechOutput};
