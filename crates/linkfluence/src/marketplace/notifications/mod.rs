//! Notification dispatcher: persists unread notifications produced by other components and
//! serves poll-based retrieval, read-state transitions and unread counts.
//!
//! The dispatcher carries no business rules. Callers pick the kind, title and text; emission
//! failures are isolated from the caller's own write through [`NotificationDispatcher::notify`].

pub mod dispatcher;
pub mod domain;
pub mod repository;
pub mod router;

pub use dispatcher::{NotificationDispatcher, NotificationError};
pub use domain::{Notification, NotificationEvent, NotificationKind};
pub use repository::NotificationRepository;
pub use router::notification_router;
