use std::sync::Arc;

use axum::http::StatusCode;
use chrono::Utc;
use tracing::info;

use super::domain::{parse_rating, summarize_ratings, Review, ReviewSubmission};
use super::repository::ReviewRepository;
use crate::config::ListLimits;
use crate::marketplace::domain::{ReviewId, Role, UserId};
use crate::marketplace::identity::{
    CachedRating, IdentityRegistry, IdentityRepository, RegistryError,
};
use crate::marketplace::notifications::{
    NotificationDispatcher, NotificationEvent, NotificationKind, NotificationRepository,
};
use crate::marketplace::store::RepositoryError;

pub struct ReviewService<S, N> {
    store: Arc<S>,
    registry: IdentityRegistry<S>,
    notifications: NotificationDispatcher<N>,
    default_limit: usize,
}

impl<S, N> ReviewService<S, N>
where
    S: ReviewRepository + IdentityRepository + 'static,
    N: NotificationRepository + 'static,
{
    pub fn new(store: Arc<S>, notifications: NotificationDispatcher<N>) -> Self {
        Self::with_limit(store, notifications, ListLimits::DEFAULT_LIMIT)
    }

    pub fn with_limit(
        store: Arc<S>,
        notifications: NotificationDispatcher<N>,
        default_limit: usize,
    ) -> Self {
        Self {
            registry: IdentityRegistry::new(Arc::clone(&store)),
            store,
            notifications,
            default_limit: default_limit.max(1),
        }
    }

    /// Record a review and synchronously refresh the creator's cached rating from a full scan
    /// of that creator's reviews.
    pub fn submit(&self, submission: ReviewSubmission) -> Result<Review, ReviewServiceError> {
        let rating = parse_rating(submission.rating)
            .ok_or(ReviewServiceError::InvalidRating(submission.rating))?;
        if submission.creator_id == submission.reviewer_id {
            return Err(ReviewServiceError::Validation(
                "creators cannot review themselves".to_string(),
            ));
        }

        let creator = self
            .registry
            .resolve_with_role(&submission.creator_id, Role::Creator)?;
        let reviewer = self.registry.resolve(&submission.reviewer_id)?;

        let review = Review {
            id: ReviewId::generate(),
            creator_id: creator.id.clone(),
            reviewer_id: reviewer.id.clone(),
            reviewer_name: reviewer.name.clone(),
            rating,
            comment: submission.comment,
            created_at: Utc::now(),
        };

        let stored = match self.store.insert_review(review) {
            Ok(stored) => stored,
            Err(RepositoryError::Conflict) => {
                return Err(ReviewServiceError::DuplicateReview {
                    creator_id: creator.id,
                    reviewer_id: reviewer.id,
                })
            }
            Err(other) => return Err(other.into()),
        };

        let summary = self.refresh_cached_rating(&creator.id)?;
        info!(
            review_id = %stored.id,
            creator_id = %creator.id,
            average = summary.average,
            count = summary.count,
            "review posted"
        );

        self.notifications.notify(
            NotificationEvent::new(
                creator.id.clone(),
                NotificationKind::NewReview,
                "New Review",
                format!("{} rated you {} out of 5", reviewer.name, rating),
            )
            .correlate("review_id", &stored.id)
            .correlate("reviewer_id", &reviewer.id),
        );

        Ok(stored)
    }

    /// Aggregate computed fresh from the review collection; `{0, 0}` without reviews.
    pub fn get_stats(&self, creator_id: &UserId) -> Result<CachedRating, ReviewServiceError> {
        let ratings = self.store.ratings_for_creator(creator_id)?;
        Ok(summarize_ratings(&ratings))
    }

    pub fn list_for_creator(
        &self,
        creator_id: &UserId,
        limit: Option<usize>,
    ) -> Result<Vec<Review>, ReviewServiceError> {
        let limit = limit.unwrap_or(self.default_limit).max(1);
        Ok(self.store.reviews_for_creator(creator_id, limit)?)
    }

    fn refresh_cached_rating(
        &self,
        creator_id: &UserId,
    ) -> Result<CachedRating, ReviewServiceError> {
        let summary = self.get_stats(creator_id)?;
        self.store.set_cached_rating(creator_id, summary)?;
        Ok(summary)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ReviewServiceError {
    #[error("rating must be a whole number between 1 and 5, got {0}")]
    InvalidRating(f64),
    #[error("{0}")]
    Validation(String),
    #[error("reviewer {reviewer_id} has already reviewed creator {creator_id}")]
    DuplicateReview {
        creator_id: UserId,
        reviewer_id: UserId,
    },
    #[error(transparent)]
    Identity(#[from] RegistryError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl ReviewServiceError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ReviewServiceError::InvalidRating(_) | ReviewServiceError::Validation(_) => {
                StatusCode::BAD_REQUEST
            }
            ReviewServiceError::DuplicateReview { .. } => StatusCode::CONFLICT,
            ReviewServiceError::Identity(error) => error.status_code(),
            ReviewServiceError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
