use super::domain::Message;
use crate::marketplace::domain::{CampaignId, UserId};
use crate::marketplace::store::RepositoryError;

/// Append-only message log.
pub trait MessageRepository: Send + Sync {
    fn append_message(&self, message: Message) -> Result<Message, RepositoryError>;
    /// Messages of `campaign_id` exchanged between the two users, oldest first.
    fn conversation_messages(
        &self,
        campaign_id: &CampaignId,
        first: &UserId,
        second: &UserId,
    ) -> Result<Vec<Message>, RepositoryError>;
    /// Every message sent or received by `user_id`, in log order.
    fn messages_involving(&self, user_id: &UserId) -> Result<Vec<Message>, RepositoryError>;
}
