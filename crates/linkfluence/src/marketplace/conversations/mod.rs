//! Conversation projector over the append-only message log.
//!
//! Conversations are never stored. Every read derives its view from the log, so a view can be
//! expensive but never stale.

pub mod domain;
pub mod projection;
pub mod repository;
pub mod router;
pub mod service;

pub use domain::{ConversationSummary, Message, MessageDraft};
pub use projection::project_conversations;
pub use repository::MessageRepository;
pub use router::conversation_router;
pub use service::{ConversationService, ConversationServiceError};
