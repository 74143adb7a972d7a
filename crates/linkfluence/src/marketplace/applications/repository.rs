use super::domain::{Application, ApplicationStatus};
use crate::marketplace::domain::{ApplicationId, CampaignId, Timestamp, UserId};
use crate::marketplace::store::RepositoryError;

/// Storage for application documents.
///
/// Implementations must hold a unique index on `(campaign_id, creator_id)`: inserting a second
/// application for the same pair fails with [`RepositoryError::Conflict`].
/// Inserting an application whose campaign does not exist fails with
/// [`RepositoryError::NotFound`], atomically with respect to campaign deletion.
pub trait ApplicationRepository: Send + Sync {
    fn insert_application(&self, application: Application)
        -> Result<Application, RepositoryError>;
    fn fetch_application(&self, id: &ApplicationId)
        -> Result<Option<Application>, RepositoryError>;
    fn find_application(
        &self,
        campaign_id: &CampaignId,
        creator_id: &UserId,
    ) -> Result<Option<Application>, RepositoryError>;
    /// Newest first.
    fn applications_for_campaign(
        &self,
        campaign_id: &CampaignId,
    ) -> Result<Vec<Application>, RepositoryError>;
    /// Newest first.
    fn applications_for_creator(
        &self,
        creator_id: &UserId,
    ) -> Result<Vec<Application>, RepositoryError>;
    /// Compare-and-set on the stored status: fails with `Conflict` when the current status is
    /// not `expected`, `NotFound` when the document is absent.
    fn transition_application(
        &self,
        id: &ApplicationId,
        expected: ApplicationStatus,
        next: ApplicationStatus,
        at: Timestamp,
    ) -> Result<Application, RepositoryError>;
}
