use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, patch, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;

use super::domain::ApplicationSubmission;
use super::repository::ApplicationRepository;
use super::service::{ApplicationService, ApplicationServiceError};
use crate::error::{error_response, rejection_response};
use crate::marketplace::campaigns::CampaignRepository;
use crate::marketplace::domain::{ApplicationId, CampaignId, UserId};
use crate::marketplace::identity::IdentityRepository;
use crate::marketplace::notifications::NotificationRepository;

/// Router exposing submission, listing and decision endpoints.
pub fn application_router<S, N>(service: Arc<ApplicationService<S, N>>) -> Router
where
    S: ApplicationRepository + CampaignRepository + IdentityRepository + 'static,
    N: NotificationRepository + 'static,
{
    Router::new()
        .route("/api/applications", post(submit_handler::<S, N>))
        .route(
            "/api/applications/campaign/:campaign_id",
            get(campaign_applications_handler::<S, N>),
        )
        .route(
            "/api/applications/campaign/:campaign_id/reconcile",
            post(reconcile_handler::<S, N>),
        )
        .route(
            "/api/applications/creator/:creator_id",
            get(creator_applications_handler::<S, N>),
        )
        .route(
            "/api/applications/:application_id/status",
            patch(status_handler::<S, N>),
        )
        .with_state(service)
}

#[derive(Debug, Deserialize)]
pub(crate) struct StatusUpdateRequest {
    #[serde(default)]
    status: Option<String>,
}

impl IntoResponse for ApplicationServiceError {
    fn into_response(self) -> Response {
        error_response(self.status_code(), self.to_string())
    }
}

pub(crate) async fn submit_handler<S, N>(
    State(service): State<Arc<ApplicationService<S, N>>>,
    payload: Result<Json<ApplicationSubmission>, JsonRejection>,
) -> Response
where
    S: ApplicationRepository + CampaignRepository + IdentityRepository + 'static,
    N: NotificationRepository + 'static,
{
    let Json(submission) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return rejection_response(rejection),
    };

    match service.submit(submission) {
        Ok(application) => (
            StatusCode::CREATED,
            Json(json!({
                "message": "Application submitted successfully!",
                "application_id": application.id,
                "application": application,
            })),
        )
            .into_response(),
        Err(error) => error.into_response(),
    }
}

pub(crate) async fn campaign_applications_handler<S, N>(
    State(service): State<Arc<ApplicationService<S, N>>>,
    Path(campaign_id): Path<String>,
) -> Response
where
    S: ApplicationRepository + CampaignRepository + IdentityRepository + 'static,
    N: NotificationRepository + 'static,
{
    match service.list_by_campaign(&CampaignId(campaign_id)) {
        Ok(applications) => (StatusCode::OK, Json(applications)).into_response(),
        Err(error) => error.into_response(),
    }
}

pub(crate) async fn creator_applications_handler<S, N>(
    State(service): State<Arc<ApplicationService<S, N>>>,
    Path(creator_id): Path<String>,
) -> Response
where
    S: ApplicationRepository + CampaignRepository + IdentityRepository + 'static,
    N: NotificationRepository + 'static,
{
    match service.list_by_creator(&UserId(creator_id)) {
        Ok(applications) => (StatusCode::OK, Json(applications)).into_response(),
        Err(error) => error.into_response(),
    }
}

pub(crate) async fn status_handler<S, N>(
    State(service): State<Arc<ApplicationService<S, N>>>,
    Path(application_id): Path<String>,
    payload: Result<Json<StatusUpdateRequest>, JsonRejection>,
) -> Response
where
    S: ApplicationRepository + CampaignRepository + IdentityRepository + 'static,
    N: NotificationRepository + 'static,
{
    let Json(request) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return rejection_response(rejection),
    };

    let status = request.status.unwrap_or_default();
    match service.update_status(&ApplicationId(application_id), &status) {
        Ok(application) => (
            StatusCode::OK,
            Json(json!({
                "message": format!("Application {}", application.status),
                "application": application,
            })),
        )
            .into_response(),
        Err(error) => error.into_response(),
    }
}

pub(crate) async fn reconcile_handler<S, N>(
    State(service): State<Arc<ApplicationService<S, N>>>,
    Path(campaign_id): Path<String>,
) -> Response
where
    S: ApplicationRepository + CampaignRepository + IdentityRepository + 'static,
    N: NotificationRepository + 'static,
{
    match service.reconcile_applicants(&CampaignId(campaign_id)) {
        Ok(campaign) => (StatusCode::OK, Json(campaign)).into_response(),
        Err(error) => error.into_response(),
    }
}
