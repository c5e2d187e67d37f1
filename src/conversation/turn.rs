//! Conversation turns and the log they are appended to

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::error::Result;

/// Which of the two configured languages is the input language
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    /// The pair's `from` language
    From,
    /// The pair's `to` language
    To,
}

impl Side {
    /// The opposite side
    #[must_use]
    pub const fn other(self) -> Self {
        match self {
            Self::From => Self::To,
            Self::To => Self::From,
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::From => f.write_str("from"),
            Self::To => f.write_str("to"),
        }
    }
}

/// One completed speak → translate cycle
///
/// Only constructed once both the transcript and its translation exist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub id: Uuid,
    pub original_text: String,
    pub translated_text: String,
    pub source_lang: String,
    pub target_lang: String,
    pub timestamp: DateTime<Utc>,
    pub speaker: Side,
}

impl ConversationTurn {
    pub(crate) fn new(
        original_text: String,
        translated_text: String,
        source_lang: String,
        target_lang: String,
        speaker: Side,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            original_text,
            translated_text,
            source_lang,
            target_lang,
            timestamp: Utc::now(),
            speaker,
        }
    }
}

/// Append-only destination for completed turns
pub trait TurnLog {
    /// Record a completed turn
    fn append(&mut self, turn: ConversationTurn);
}

impl TurnLog for Vec<ConversationTurn> {
    fn append(&mut self, turn: ConversationTurn) {
        self.push(turn);
    }
}

/// Forward turns to another task that owns the display list
impl TurnLog for mpsc::UnboundedSender<ConversationTurn> {
    fn append(&mut self, turn: ConversationTurn) {
        if self.send(turn).is_err() {
            tracing::warn!("conversation log receiver dropped, turn not delivered");
        }
    }
}

/// In-memory ordered conversation log
#[derive(Debug, Clone, Default, Serialize)]
pub struct ConversationLog {
    turns: Vec<ConversationTurn>,
}

impl ConversationLog {
    #[must_use]
    pub const fn new() -> Self {
        Self { turns: Vec::new() }
    }

    /// Turns in the order they were recorded
    #[must_use]
    pub fn turns(&self) -> &[ConversationTurn] {
        &self.turns
    }

    /// Most recent turn
    #[must_use]
    pub fn last(&self) -> Option<&ConversationTurn> {
        self.turns.last()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Export the log as pretty-printed JSON
    ///
    /// # Errors
    ///
    /// Returns `Error::Serialization` if a turn cannot be encoded
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl TurnLog for ConversationLog {
    fn append(&mut self, turn: ConversationTurn) {
        tracing::trace!(id = %turn.id, total = self.turns.len() + 1, "turn logged");
        self.turns.push(turn);
    }
}
