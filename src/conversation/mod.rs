//! Voice conversation turn-taking
//!
//! [`ConversationTurnController`] is the state machine; [`ConversationSession`]
//! runs it against real providers on a tokio runtime.

mod controller;
mod session;
mod turn;

pub use controller::{ConversationTurnController, Phase, Request, Ticket};
pub use session::{ConversationSession, ProviderEvent, Providers};
pub use turn::{ConversationLog, ConversationTurn, Side, TurnLog};
