use std::sync::Arc;

use axum::http::StatusCode;
use chrono::Utc;
use tracing::info;

use super::domain::{ConversationSummary, Message, MessageDraft};
use super::projection::project_conversations;
use super::repository::MessageRepository;
use crate::marketplace::campaigns::CampaignRepository;
use crate::marketplace::domain::{required_field, CampaignId, MessageId, UserId};
use crate::marketplace::identity::{IdentityRegistry, IdentityRepository, RegistryError};
use crate::marketplace::notifications::{
    NotificationDispatcher, NotificationEvent, NotificationKind, NotificationRepository,
};
use crate::marketplace::store::RepositoryError;

pub struct ConversationService<S, N> {
    store: Arc<S>,
    registry: IdentityRegistry<S>,
    notifications: NotificationDispatcher<N>,
}

impl<S, N> ConversationService<S, N>
where
    S: MessageRepository + CampaignRepository + IdentityRepository + 'static,
    N: NotificationRepository + 'static,
{
    pub fn new(store: Arc<S>, notifications: NotificationDispatcher<N>) -> Self {
        Self {
            registry: IdentityRegistry::new(Arc::clone(&store)),
            store,
            notifications,
        }
    }

    /// Append a message to the log and notify the receiver.
    pub fn send(&self, draft: MessageDraft) -> Result<Message, ConversationServiceError> {
        let campaign_id = required(draft.campaign_id, "campaign_id")?;
        let sender_id = required(draft.sender_id, "sender_id")?;
        let receiver_id = required(draft.receiver_id, "receiver_id")?;
        let content = required(draft.content, "content")?;

        if sender_id == receiver_id {
            return Err(ConversationServiceError::Validation(
                "sender and receiver must differ".to_string(),
            ));
        }

        let sender = self.registry.resolve(&sender_id)?;
        self.registry.resolve(&receiver_id)?;
        let campaign = self
            .store
            .fetch_campaign(&campaign_id)?
            .ok_or_else(|| ConversationServiceError::CampaignNotFound(campaign_id.clone()))?;

        let message = Message {
            id: MessageId::generate(),
            campaign_id,
            sender_id,
            receiver_id,
            content,
            timestamp: Utc::now(),
        };
        let stored = self.store.append_message(message)?;

        info!(
            message_id = %stored.id,
            campaign_id = %stored.campaign_id,
            sender_id = %stored.sender_id,
            "message sent"
        );

        self.notifications.notify(
            NotificationEvent::new(
                stored.receiver_id.clone(),
                NotificationKind::NewMessage,
                "New Message",
                format!("{} sent you a message about '{}'", sender.name, campaign.title),
            )
            .correlate("campaign_id", &stored.campaign_id)
            .correlate("sender_id", &stored.sender_id)
            .correlate("message_id", &stored.id),
        );

        Ok(stored)
    }

    /// Messages between the creator and the business on one campaign, oldest first.
    pub fn get_conversation(
        &self,
        campaign_id: &CampaignId,
        creator_id: &UserId,
        business_id: &UserId,
    ) -> Result<Vec<Message>, ConversationServiceError> {
        Ok(self
            .store
            .conversation_messages(campaign_id, creator_id, business_id)?)
    }

    /// Per-campaign inbox summaries for `user_id`, most recent first.
    pub fn list_conversations_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<ConversationSummary>, ConversationServiceError> {
        let messages = self.store.messages_involving(user_id)?;
        Ok(project_conversations(user_id, messages))
    }
}

fn required<T>(value: Option<T>, field: &'static str) -> Result<T, ConversationServiceError>
where
    T: AsRef<str>,
{
    required_field(value, field).map_err(ConversationServiceError::Validation)
}

#[derive(Debug, thiserror::Error)]
pub enum ConversationServiceError {
    #[error("{0}")]
    Validation(String),
    #[error("campaign {0} not found")]
    CampaignNotFound(CampaignId),
    #[error(transparent)]
    Identity(#[from] RegistryError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl ConversationServiceError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ConversationServiceError::Validation(_) => StatusCode::BAD_REQUEST,
            ConversationServiceError::CampaignNotFound(_) => StatusCode::NOT_FOUND,
            ConversationServiceError::Identity(error) => error.status_code(),
            ConversationServiceError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
