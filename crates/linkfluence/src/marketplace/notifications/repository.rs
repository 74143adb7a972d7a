use super::domain::Notification;
use crate::marketplace::domain::{NotificationId, Timestamp, UserId};
use crate::marketplace::store::RepositoryError;

pub trait NotificationRepository: Send + Sync {
    fn insert_notification(
        &self,
        notification: Notification,
    ) -> Result<Notification, RepositoryError>;
    /// Newest first, at most `limit` entries.
    fn notifications_for_user(
        &self,
        user_id: &UserId,
        limit: usize,
    ) -> Result<Vec<Notification>, RepositoryError>;
    /// Sets `read`; keeps the first `read_at` when already read.
    fn mark_notification_read(
        &self,
        id: &NotificationId,
        at: Timestamp,
    ) -> Result<Notification, RepositoryError>;
    fn count_unread(&self, user_id: &UserId) -> Result<usize, RepositoryError>;
}
