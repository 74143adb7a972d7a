use super::domain::Review;
use crate::marketplace::domain::UserId;
use crate::marketplace::store::RepositoryError;

/// Storage for review documents.
///
/// Implementations must hold a unique index on `(creator_id, reviewer_id)`; a second review
/// for the same pair fails with [`RepositoryError::Conflict`].
pub trait ReviewRepository: Send + Sync {
    fn insert_review(&self, review: Review) -> Result<Review, RepositoryError>;
    /// Newest first, at most `limit` entries.
    fn reviews_for_creator(
        &self,
        creator_id: &UserId,
        limit: usize,
    ) -> Result<Vec<Review>, RepositoryError>;
    /// Every rating recorded for the creator, in no particular order.
    fn ratings_for_creator(&self, creator_id: &UserId) -> Result<Vec<u8>, RepositoryError>;
}
