use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};

use super::domain::{ProfileFields, Registration};
use super::registry::{IdentityRegistry, RegistryError};
use super::repository::IdentityRepository;
use crate::error::{error_response, rejection_response};
use crate::marketplace::domain::UserId;

pub fn identity_router<S>(registry: Arc<IdentityRegistry<S>>) -> Router
where
    S: IdentityRepository + 'static,
{
    Router::new()
        .route("/api/users", post(register_handler::<S>))
        .route(
            "/api/users/:user_id",
            get(resolve_handler::<S>).patch(update_profile_handler::<S>),
        )
        .with_state(registry)
}

impl IntoResponse for RegistryError {
    fn into_response(self) -> Response {
        error_response(self.status_code(), self.to_string())
    }
}

pub(crate) async fn register_handler<S>(
    State(registry): State<Arc<IdentityRegistry<S>>>,
    payload: Result<Json<Registration>, JsonRejection>,
) -> Response
where
    S: IdentityRepository + 'static,
{
    let Json(registration) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return rejection_response(rejection),
    };

    match registry.register(registration) {
        Ok(identity) => (StatusCode::CREATED, Json(identity)).into_response(),
        Err(error) => error.into_response(),
    }
}

pub(crate) async fn resolve_handler<S>(
    State(registry): State<Arc<IdentityRegistry<S>>>,
    Path(user_id): Path<String>,
) -> Response
where
    S: IdentityRepository + 'static,
{
    match registry.resolve(&UserId(user_id)) {
        Ok(identity) => (StatusCode::OK, Json(identity)).into_response(),
        Err(error) => error.into_response(),
    }
}

pub(crate) async fn update_profile_handler<S>(
    State(registry): State<Arc<IdentityRegistry<S>>>,
    Path(user_id): Path<String>,
    payload: Result<Json<ProfileFields>, JsonRejection>,
) -> Response
where
    S: IdentityRepository + 'static,
{
    let Json(fields) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return rejection_response(rejection),
    };

    match registry.update_profile(&UserId(user_id), fields) {
        Ok(identity) => (StatusCode::OK, Json(identity)).into_response(),
        Err(error) => error.into_response(),
    }
}
