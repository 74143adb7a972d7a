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

use super::domain::{CampaignDraft, CampaignPatch};
use super::repository::CampaignRepository;
use super::service::{CampaignService, CampaignServiceError};
use crate::error::{error_response, rejection_response};
use crate::marketplace::applications::ApplicationRepository;
use crate::marketplace::domain::{CampaignId, UserId};
use crate::marketplace::identity::IdentityRepository;

pub fn campaign_router<S>(service: Arc<CampaignService<S>>) -> Router
where
    S: CampaignRepository + ApplicationRepository + IdentityRepository + 'static,
{
    Router::new()
        .route(
            "/api/campaigns",
            post(create_handler::<S>).get(list_handler::<S>),
        )
        .route(
            "/api/campaigns/:campaign_id",
            get(get_handler::<S>)
                .patch(edit_handler::<S>)
                .delete(delete_handler::<S>),
        )
        .route("/api/campaigns/:campaign_id/close", post(close_handler::<S>))
        .with_state(service)
}

#[derive(Debug, Deserialize)]
pub(crate) struct CreateCampaignRequest {
    #[serde(default)]
    business_id: Option<UserId>,
    #[serde(flatten)]
    draft: CampaignDraft,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CampaignQuery {
    #[serde(default)]
    business_id: Option<String>,
}

impl IntoResponse for CampaignServiceError {
    fn into_response(self) -> Response {
        error_response(self.status_code(), self.to_string())
    }
}

pub(crate) async fn create_handler<S>(
    State(service): State<Arc<CampaignService<S>>>,
    payload: Result<Json<CreateCampaignRequest>, JsonRejection>,
) -> Response
where
    S: CampaignRepository + ApplicationRepository + IdentityRepository + 'static,
{
    let Json(request) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return rejection_response(rejection),
    };

    let Some(business_id) = request.business_id else {
        return CampaignServiceError::Validation("missing required field: business_id".to_string())
            .into_response();
    };

    match service.create(&business_id, request.draft) {
        Ok(campaign) => (
            StatusCode::CREATED,
            Json(json!({
                "message": "Campaign created",
                "campaign_id": campaign.id,
                "campaign": campaign,
            })),
        )
            .into_response(),
        Err(error) => error.into_response(),
    }
}

pub(crate) async fn list_handler<S>(
    State(service): State<Arc<CampaignService<S>>>,
    Query(query): Query<CampaignQuery>,
) -> Response
where
    S: CampaignRepository + ApplicationRepository + IdentityRepository + 'static,
{
    let business_id = query
        .business_id
        .filter(|raw| !raw.trim().is_empty())
        .map(UserId);

    match service.list(business_id.as_ref()) {
        Ok(campaigns) => (StatusCode::OK, Json(campaigns)).into_response(),
        Err(error) => error.into_response(),
    }
}

pub(crate) async fn get_handler<S>(
    State(service): State<Arc<CampaignService<S>>>,
    Path(campaign_id): Path<String>,
) -> Response
where
    S: CampaignRepository + ApplicationRepository + IdentityRepository + 'static,
{
    match service.get(&CampaignId(campaign_id)) {
        Ok(campaign) => (StatusCode::OK, Json(campaign)).into_response(),
        Err(error) => error.into_response(),
    }
}

pub(crate) async fn edit_handler<S>(
    State(service): State<Arc<CampaignService<S>>>,
    Path(campaign_id): Path<String>,
    payload: Result<Json<CampaignPatch>, JsonRejection>,
) -> Response
where
    S: CampaignRepository + ApplicationRepository + IdentityRepository + 'static,
{
    let Json(patch) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return rejection_response(rejection),
    };

    match service.edit(&CampaignId(campaign_id), patch) {
        Ok(campaign) => (StatusCode::OK, Json(campaign)).into_response(),
        Err(error) => error.into_response(),
    }
}

pub(crate) async fn close_handler<S>(
    State(service): State<Arc<CampaignService<S>>>,
    Path(campaign_id): Path<String>,
) -> Response
where
    S: CampaignRepository + ApplicationRepository + IdentityRepository + 'static,
{
    match service.close(&CampaignId(campaign_id)) {
        Ok(campaign) => (StatusCode::OK, Json(campaign)).into_response(),
        Err(error) => error.into_response(),
    }
}

pub(crate) async fn delete_handler<S>(
    State(service): State<Arc<CampaignService<S>>>,
    Path(campaign_id): Path<String>,
) -> Response
where
    S: CampaignRepository + ApplicationRepository + IdentityRepository + 'static,
{
    match service.delete(&CampaignId(campaign_id)) {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({ "message": "Campaign deleted" })),
        )
            .into_response(),
        Err(error) => error.into_response(),
    }
}
