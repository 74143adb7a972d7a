use std::collections::BTreeSet;

use super::domain::{ApplicantInsert, Campaign, CampaignPatch, CampaignStatus};
use crate::marketplace::domain::{CampaignId, UserId};
use crate::marketplace::store::RepositoryError;

/// Storage for campaign documents. Every method touches a single document.
pub trait CampaignRepository: Send + Sync {
    fn insert_campaign(&self, campaign: Campaign) -> Result<Campaign, RepositoryError>;
    fn fetch_campaign(&self, id: &CampaignId) -> Result<Option<Campaign>, RepositoryError>;
    /// Newest first, optionally restricted to one business.
    fn list_campaigns(&self, business_id: Option<&UserId>)
        -> Result<Vec<Campaign>, RepositoryError>;
    fn patch_campaign(
        &self,
        id: &CampaignId,
        patch: &CampaignPatch,
    ) -> Result<Campaign, RepositoryError>;
    fn set_campaign_status(
        &self,
        id: &CampaignId,
        status: CampaignStatus,
    ) -> Result<Campaign, RepositoryError>;
    fn add_applicant(
        &self,
        id: &CampaignId,
        creator_id: &UserId,
    ) -> Result<ApplicantInsert, RepositoryError>;
    fn replace_applicants(
        &self,
        id: &CampaignId,
        applicants: BTreeSet<UserId>,
    ) -> Result<Campaign, RepositoryError>;
    /// Fails with `Conflict` while any application references the campaign. The check and the
    /// removal are atomic with respect to `ApplicationRepository::insert_application`.
    fn delete_campaign(&self, id: &CampaignId) -> Result<(), RepositoryError>;
}
