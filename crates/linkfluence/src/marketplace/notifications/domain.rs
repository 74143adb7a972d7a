use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::marketplace::domain::{NotificationId, Timestamp, UserId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    NewApplication,
    ApplicationUpdate,
    NewReview,
    NewMessage,
}

impl NotificationKind {
    pub const fn label(self) -> &'static str {
        match self {
            NotificationKind::NewApplication => "new_application",
            NotificationKind::ApplicationUpdate => "application_update",
            NotificationKind::NewReview => "new_review",
            NotificationKind::NewMessage => "new_message",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: NotificationId,
    pub user_id: UserId,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub read: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read_at: Option<Timestamp>,
    pub created_at: Timestamp,
    /// Type-specific correlation fields (`campaign_id`, `creator_id`, ...).
    #[serde(flatten)]
    pub correlation: BTreeMap<String, String>,
}

/// What a caller asks the dispatcher to persist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationEvent {
    pub user_id: UserId,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub correlation: BTreeMap<String, String>,
}

impl NotificationEvent {
    pub fn new(
        user_id: UserId,
        kind: NotificationKind,
        title: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            user_id,
            kind,
            title: title.into(),
            message: message.into(),
            correlation: BTreeMap::new(),
        }
    }

    pub fn correlate(mut self, key: &str, value: impl ToString) -> Self {
        self.correlation.insert(key.to_string(), value.to_string());
        self
    }
}
