//! Conversation domain.
//!
//! - [`entities::ConversationTurn`] — one system, user, assistant or tool turn
//! - [`entities::Conversation`] — the append-only turn sequence of one run
//! - [`response::Completion`] — what the LLM returns for one request

pub mod entities;
pub mod response;
