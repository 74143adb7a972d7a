use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::marketplace::domain::{CampaignId, MessageId, Timestamp, UserId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub campaign_id: CampaignId,
    pub sender_id: UserId,
    pub receiver_id: UserId,
    pub content: String,
    pub timestamp: Timestamp,
}

impl Message {
    pub fn involves(&self, user_id: &UserId) -> bool {
        &self.sender_id == user_id || &self.receiver_id == user_id
    }

    /// True when the message travels between `a` and `b`, in either direction.
    pub fn between(&self, a: &UserId, b: &UserId) -> bool {
        (&self.sender_id == a && &self.receiver_id == b)
            || (&self.sender_id == b && &self.receiver_id == a)
    }
}

/// Incoming message; every field is required.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct MessageDraft {
    #[serde(default)]
    pub campaign_id: Option<CampaignId>,
    #[serde(default)]
    pub sender_id: Option<UserId>,
    #[serde(default)]
    pub receiver_id: Option<UserId>,
    #[serde(default)]
    pub content: Option<String>,
}

/// One entry of a user's inbox: the latest message of a campaign thread.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConversationSummary {
    pub campaign_id: CampaignId,
    pub last_message: Message,
    pub participants: BTreeSet<UserId>,
    pub message_count: usize,
}
