use std::sync::Arc;

use axum::http::StatusCode;
use chrono::Utc;
use tracing::info;

use super::domain::{CachedRating, Identity, ProfileFields, Registration};
use super::repository::IdentityRepository;
use crate::marketplace::domain::{required_field, Role, UserId};
use crate::marketplace::store::RepositoryError;

/// Read-mostly view over the identity collection shared by every component.
pub struct IdentityRegistry<S> {
    store: Arc<S>,
}

impl<S> Clone for IdentityRegistry<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S> IdentityRegistry<S>
where
    S: IdentityRepository + 'static,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub fn resolve(&self, id: &UserId) -> Result<Identity, RegistryError> {
        self.store
            .fetch_identity(id)?
            .ok_or_else(|| RegistryError::NotFound(id.clone()))
    }

    pub fn resolve_with_role(
        &self,
        id: &UserId,
        expected: Role,
    ) -> Result<Identity, RegistryError> {
        let identity = self.resolve(id)?;
        if identity.role != expected {
            return Err(RegistryError::RoleMismatch {
                id: id.clone(),
                expected,
                actual: identity.role,
            });
        }
        Ok(identity)
    }

    pub fn register(&self, registration: Registration) -> Result<Identity, RegistryError> {
        let name =
            required_field(registration.name, "name").map_err(RegistryError::Validation)?;

        let identity = Identity {
            id: UserId::generate(),
            role: registration.role,
            name,
            profile: registration.profile,
            cached_rating: CachedRating::default(),
            created_at: Utc::now(),
        };

        let stored = self.store.insert_identity(identity)?;
        info!(user_id = %stored.id, role = %stored.role, "identity registered");
        Ok(stored)
    }

    pub fn update_profile(
        &self,
        id: &UserId,
        fields: ProfileFields,
    ) -> Result<Identity, RegistryError> {
        match self.store.merge_profile(id, fields) {
            Ok(identity) => Ok(identity),
            Err(RepositoryError::NotFound) => Err(RegistryError::NotFound(id.clone())),
            Err(other) => Err(other.into()),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("user {0} not found")]
    NotFound(UserId),
    #[error("user {id} is a {actual}, expected a {expected}")]
    RoleMismatch {
        id: UserId,
        expected: Role,
        actual: Role,
    },
    #[error("{0}")]
    Validation(String),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl RegistryError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            RegistryError::NotFound(_) => StatusCode::NOT_FOUND,
            RegistryError::RoleMismatch { .. } | RegistryError::Validation(_) => {
                StatusCode::BAD_REQUEST
            }
            RegistryError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
