use std::sync::Arc;

use axum::http::StatusCode;
use chrono::Utc;
use tracing::{debug, warn};

use super::domain::{Notification, NotificationEvent};
use super::repository::NotificationRepository;
use crate::config::ListLimits;
use crate::marketplace::domain::{NotificationId, UserId};
use crate::marketplace::store::RepositoryError;

/// Fan-out sink shared by the application, review and conversation services.
pub struct NotificationDispatcher<N> {
    repository: Arc<N>,
    default_limit: usize,
}

impl<N> Clone for NotificationDispatcher<N> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            default_limit: self.default_limit,
        }
    }
}

impl<N> NotificationDispatcher<N>
where
    N: NotificationRepository + 'static,
{
    pub fn new(repository: Arc<N>) -> Self {
        Self::with_limit(repository, ListLimits::DEFAULT_LIMIT)
    }

    pub fn with_limit(repository: Arc<N>, default_limit: usize) -> Self {
        Self {
            repository,
            default_limit: default_limit.max(1),
        }
    }

    /// Persist an unread notification.
    pub fn emit(&self, event: NotificationEvent) -> Result<NotificationId, NotificationError> {
        let notification = Notification {
            id: NotificationId::generate(),
            user_id: event.user_id,
            kind: event.kind,
            title: event.title,
            message: event.message,
            read: false,
            read_at: None,
            created_at: Utc::now(),
            correlation: event.correlation,
        };

        let stored = self.repository.insert_notification(notification)?;
        debug!(
            notification_id = %stored.id,
            user_id = %stored.user_id,
            kind = stored.kind.label(),
            "notification emitted"
        );
        Ok(stored.id)
    }

    /// Best-effort emission for callers whose own write already succeeded: failures are logged
    /// and swallowed so they never surface through the caller's result.
    pub fn notify(&self, event: NotificationEvent) -> Option<NotificationId> {
        let user_id = event.user_id.clone();
        let kind = event.kind;
        match self.emit(event) {
            Ok(id) => Some(id),
            Err(error) => {
                warn!(%user_id, kind = kind.label(), %error, "notification dropped");
                None
            }
        }
    }

    pub fn list_for_user(
        &self,
        user_id: &UserId,
        limit: Option<usize>,
    ) -> Result<Vec<Notification>, NotificationError> {
        let limit = limit.unwrap_or(self.default_limit).max(1);
        Ok(self.repository.notifications_for_user(user_id, limit)?)
    }

    /// One-directional unread → read transition; repeating it still succeeds.
    pub fn mark_read(&self, id: &NotificationId) -> Result<Notification, NotificationError> {
        match self.repository.mark_notification_read(id, Utc::now()) {
            Ok(notification) => Ok(notification),
            Err(RepositoryError::NotFound) => Err(NotificationError::NotFound(id.clone())),
            Err(other) => Err(other.into()),
        }
    }

    pub fn count_unread(&self, user_id: &UserId) -> Result<usize, NotificationError> {
        Ok(self.repository.count_unread(user_id)?)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum NotificationError {
    #[error("notification {0} not found")]
    NotFound(NotificationId),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl NotificationError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            NotificationError::NotFound(_) => StatusCode::NOT_FOUND,
            NotificationError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
