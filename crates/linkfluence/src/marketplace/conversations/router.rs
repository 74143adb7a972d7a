use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;

use super::domain::MessageDraft;
use super::repository::MessageRepository;
use super::service::{ConversationService, ConversationServiceError};
use crate::error::{error_response, rejection_response};
use crate::marketplace::campaigns::CampaignRepository;
use crate::marketplace::domain::{CampaignId, UserId};
use crate::marketplace::identity::IdentityRepository;
use crate::marketplace::notifications::NotificationRepository;

pub fn conversation_router<S, N>(service: Arc<ConversationService<S, N>>) -> Router
where
    S: MessageRepository + CampaignRepository + IdentityRepository + 'static,
    N: NotificationRepository + 'static,
{
    Router::new()
        .route("/api/messages", post(send_handler::<S, N>))
        .route(
            "/api/messages/conversation",
            get(conversation_handler::<S, N>),
        )
        .route(
            "/api/messages/conversations",
            get(conversations_handler::<S, N>),
        )
        .with_state(service)
}

#[derive(Debug, Deserialize)]
pub(crate) struct ConversationQuery {
    #[serde(default)]
    campaign_id: Option<String>,
    #[serde(default)]
    creator_id: Option<String>,
    #[serde(default)]
    business_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct InboxQuery {
    #[serde(default)]
    user_id: Option<String>,
}

impl IntoResponse for ConversationServiceError {
    fn into_response(self) -> Response {
        error_response(self.status_code(), self.to_string())
    }
}

fn present(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.trim().is_empty())
}

pub(crate) async fn send_handler<S, N>(
    State(service): State<Arc<ConversationService<S, N>>>,
    payload: Result<Json<MessageDraft>, JsonRejection>,
) -> Response
where
    S: MessageRepository + CampaignRepository + IdentityRepository + 'static,
    N: NotificationRepository + 'static,
{
    let Json(draft) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return rejection_response(rejection),
    };

    match service.send(draft) {
        Ok(message) => (
            StatusCode::CREATED,
            Json(json!({
                "message": "Sent",
                "message_id": message.id,
                "data": message,
            })),
        )
            .into_response(),
        Err(error) => error.into_response(),
    }
}

pub(crate) async fn conversation_handler<S, N>(
    State(service): State<Arc<ConversationService<S, N>>>,
    Query(query): Query<ConversationQuery>,
) -> Response
where
    S: MessageRepository + CampaignRepository + IdentityRepository + 'static,
    N: NotificationRepository + 'static,
{
    let (Some(campaign_id), Some(creator_id), Some(business_id)) = (
        present(query.campaign_id),
        present(query.creator_id),
        present(query.business_id),
    ) else {
        return error_response(
            StatusCode::BAD_REQUEST,
            "campaign_id, creator_id and business_id required".to_string(),
        );
    };

    let conversation = service.get_conversation(
        &CampaignId(campaign_id),
        &UserId(creator_id),
        &UserId(business_id),
    );
    match conversation {
        Ok(messages) => (StatusCode::OK, Json(json!({ "messages": messages }))).into_response(),
        Err(error) => error.into_response(),
    }
}

pub(crate) async fn conversations_handler<S, N>(
    State(service): State<Arc<ConversationService<S, N>>>,
    Query(query): Query<InboxQuery>,
) -> Response
where
    S: MessageRepository + CampaignRepository + IdentityRepository + 'static,
    N: NotificationRepository + 'static,
{
    let Some(user_id) = present(query.user_id) else {
        return error_response(StatusCode::BAD_REQUEST, "user_id required".to_string());
    };

    match service.list_conversations_for_user(&UserId(user_id)) {
        Ok(conversations) => (
            StatusCode::OK,
            Json(json!({ "conversations": conversations })),
        )
            .into_response(),
        Err(error) => error.into_response(),
    }
}
