use super::domain::{CachedRating, Identity, ProfileFields};
use crate::marketplace::domain::UserId;
use crate::marketplace::store::RepositoryError;

/// Storage for identity documents.
pub trait IdentityRepository: Send + Sync {
    fn insert_identity(&self, identity: Identity) -> Result<Identity, RepositoryError>;
    fn fetch_identity(&self, id: &UserId) -> Result<Option<Identity>, RepositoryError>;
    /// Shallow-merge profile fields; `NotFound` when the identity is absent.
    fn merge_profile(
        &self,
        id: &UserId,
        fields: ProfileFields,
    ) -> Result<Identity, RepositoryError>;
    fn set_cached_rating(&self, id: &UserId, rating: CachedRating)
        -> Result<(), RepositoryError>;
}
