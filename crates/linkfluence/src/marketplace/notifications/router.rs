use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;

use super::dispatcher::{NotificationDispatcher, NotificationError};
use super::repository::NotificationRepository;
use crate::error::error_response;
use crate::marketplace::domain::{NotificationId, UserId};

pub fn notification_router<N>(dispatcher: Arc<NotificationDispatcher<N>>) -> Router
where
    N: NotificationRepository + 'static,
{
    Router::new()
        .route("/api/notifications", get(list_handler::<N>))
        .route("/api/notifications/unread-count", get(unread_count_handler::<N>))
        .route(
            "/api/notifications/:notification_id/read",
            post(mark_read_handler::<N>),
        )
        .with_state(dispatcher)
}

#[derive(Debug, Deserialize)]
pub(crate) struct NotificationQuery {
    #[serde(default)]
    user_id: Option<String>,
    #[serde(default)]
    limit: Option<usize>,
}

impl IntoResponse for NotificationError {
    fn into_response(self) -> Response {
        error_response(self.status_code(), self.to_string())
    }
}

fn require_user(query: &NotificationQuery) -> Result<UserId, Response> {
    match query.user_id.as_deref().map(str::trim) {
        Some(user_id) if !user_id.is_empty() => Ok(UserId::from(user_id)),
        _ => Err(error_response(
            StatusCode::BAD_REQUEST,
            "user_id required".to_string(),
        )),
    }
}

pub(crate) async fn list_handler<N>(
    State(dispatcher): State<Arc<NotificationDispatcher<N>>>,
    Query(query): Query<NotificationQuery>,
) -> Response
where
    N: NotificationRepository + 'static,
{
    let user_id = match require_user(&query) {
        Ok(user_id) => user_id,
        Err(response) => return response,
    };

    let listing = dispatcher
        .list_for_user(&user_id, query.limit)
        .and_then(|notifications| {
            let unread = dispatcher.count_unread(&user_id)?;
            Ok((notifications, unread))
        });

    match listing {
        Ok((notifications, unread_count)) => (
            StatusCode::OK,
            Json(json!({
                "notifications": notifications,
                "unread_count": unread_count,
            })),
        )
            .into_response(),
        Err(error) => error.into_response(),
    }
}

pub(crate) async fn unread_count_handler<N>(
    State(dispatcher): State<Arc<NotificationDispatcher<N>>>,
    Query(query): Query<NotificationQuery>,
) -> Response
where
    N: NotificationRepository + 'static,
{
    let user_id = match require_user(&query) {
        Ok(user_id) => user_id,
        Err(response) => return response,
    };

    match dispatcher.count_unread(&user_id) {
        Ok(unread_count) => (
            StatusCode::OK,
            Json(json!({ "unread_count": unread_count })),
        )
            .into_response(),
        Err(error) => error.into_response(),
    }
}

pub(crate) async fn mark_read_handler<N>(
    State(dispatcher): State<Arc<NotificationDispatcher<N>>>,
    Path(notification_id): Path<String>,
) -> Response
where
    N: NotificationRepository + 'static,
{
    match dispatcher.mark_read(&NotificationId(notification_id)) {
        Ok(notification) => (StatusCode::OK, Json(notification)).into_response(),
        Err(error) => error.into_response(),
    }
}
