use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;

use super::domain::ReviewSubmission;
use super::repository::ReviewRepository;
use super::service::{ReviewService, ReviewServiceError};
use crate::error::{error_response, rejection_response};
use crate::marketplace::domain::UserId;
use crate::marketplace::identity::IdentityRepository;
use crate::marketplace::notifications::NotificationRepository;

pub fn review_router<S, N>(service: Arc<ReviewService<S, N>>) -> Router
where
    S: ReviewRepository + IdentityRepository + 'static,
    N: NotificationRepository + 'static,
{
    Router::new()
        .route("/api/reviews", post(submit_handler::<S, N>))
        .route(
            "/api/reviews/creator/:creator_id",
            get(creator_reviews_handler::<S, N>),
        )
        .with_state(service)
}

#[derive(Debug, Deserialize)]
pub(crate) struct ReviewListQuery {
    #[serde(default)]
    limit: Option<usize>,
}

impl IntoResponse for ReviewServiceError {
    fn into_response(self) -> Response {
        error_response(self.status_code(), self.to_string())
    }
}

pub(crate) async fn submit_handler<S, N>(
    State(service): State<Arc<ReviewService<S, N>>>,
    payload: Result<Json<ReviewSubmission>, JsonRejection>,
) -> Response
where
    S: ReviewRepository + IdentityRepository + 'static,
    N: NotificationRepository + 'static,
{
    let Json(submission) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return rejection_response(rejection),
    };

    match service.submit(submission) {
        Ok(review) => (
            StatusCode::CREATED,
            Json(json!({
                "message": "Review submitted",
                "review_id": review.id,
                "review": review,
            })),
        )
            .into_response(),
        Err(error) => error.into_response(),
    }
}

pub(crate) async fn creator_reviews_handler<S, N>(
    State(service): State<Arc<ReviewService<S, N>>>,
    Path(creator_id): Path<String>,
    Query(query): Query<ReviewListQuery>,
) -> Response
where
    S: ReviewRepository + IdentityRepository + 'static,
    N: NotificationRepository + 'static,
{
    let creator_id = UserId(creator_id);
    let listing = service
        .list_for_creator(&creator_id, query.limit)
        .and_then(|reviews| Ok((reviews, service.get_stats(&creator_id)?)));

    match listing {
        Ok((reviews, stats)) => (
            StatusCode::OK,
            Json(json!({
                "reviews": reviews,
                "average_rating": stats.average,
                "review_count": stats.count,
            })),
        )
            .into_response(),
        Err(error) => error.into_response(),
    }
}
