use std::collections::BTreeSet;
use std::sync::Arc;

use axum::http::StatusCode;
use chrono::Utc;
use tracing::info;

use super::domain::{
    valid_budget, ApplicantInsert, Campaign, CampaignDraft, CampaignPatch, CampaignStatus,
};
use super::repository::CampaignRepository;
use crate::marketplace::applications::ApplicationRepository;
use crate::marketplace::domain::{required_field, CampaignId, Role, UserId};
use crate::marketplace::identity::{IdentityRegistry, IdentityRepository, RegistryError};
use crate::marketplace::store::RepositoryError;

/// Owns campaign documents and the advisory applicant set embedded in them.
pub struct CampaignService<S> {
    store: Arc<S>,
    registry: IdentityRegistry<S>,
}

impl<S> Clone for CampaignService<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            registry: self.registry.clone(),
        }
    }
}

impl<S> CampaignService<S>
where
    S: CampaignRepository + ApplicationRepository + IdentityRepository + 'static,
{
    pub fn new(store: Arc<S>) -> Self {
        let registry = IdentityRegistry::new(Arc::clone(&store));
        Self { store, registry }
    }

    pub fn create(
        &self,
        business_id: &UserId,
        draft: CampaignDraft,
    ) -> Result<Campaign, CampaignServiceError> {
        let title =
            required_field(draft.title, "title").map_err(CampaignServiceError::Validation)?;
        let description = required_field(draft.description, "description")
            .map_err(CampaignServiceError::Validation)?;
        let budget = match draft.budget {
            Some(budget) if valid_budget(budget) => budget,
            Some(_) => {
                return Err(CampaignServiceError::Validation(
                    "budget must be a non-negative amount".to_string(),
                ))
            }
            None => {
                return Err(CampaignServiceError::Validation(
                    "missing required field: budget".to_string(),
                ))
            }
        };

        self.registry.resolve_with_role(business_id, Role::Business)?;

        let campaign = Campaign {
            id: CampaignId::generate(),
            business_id: business_id.clone(),
            title,
            description,
            budget,
            status: CampaignStatus::Active,
            applicant_ids: BTreeSet::new(),
            created_at: Utc::now(),
        };

        let stored = self.store.insert_campaign(campaign)?;
        info!(campaign_id = %stored.id, business_id = %stored.business_id, "campaign created");
        Ok(stored)
    }

    pub fn get(&self, id: &CampaignId) -> Result<Campaign, CampaignServiceError> {
        self.store
            .fetch_campaign(id)?
            .ok_or_else(|| CampaignServiceError::NotFound(id.clone()))
    }

    /// All campaigns, or one business's campaigns, newest first.
    pub fn list(
        &self,
        business_id: Option<&UserId>,
    ) -> Result<Vec<Campaign>, CampaignServiceError> {
        Ok(self.store.list_campaigns(business_id)?)
    }

    /// Merge the recognized fields of `patch`; unspecified fields stay untouched.
    pub fn edit(
        &self,
        id: &CampaignId,
        patch: CampaignPatch,
    ) -> Result<Campaign, CampaignServiceError> {
        if let Some(title) = &patch.title {
            if title.trim().is_empty() {
                return Err(CampaignServiceError::Validation(
                    "title must not be empty".to_string(),
                ));
            }
        }
        if let Some(description) = &patch.description {
            if description.trim().is_empty() {
                return Err(CampaignServiceError::Validation(
                    "description must not be empty".to_string(),
                ));
            }
        }
        if let Some(budget) = patch.budget {
            if !valid_budget(budget) {
                return Err(CampaignServiceError::Validation(
                    "budget must be a non-negative amount".to_string(),
                ));
            }
        }

        if patch.is_empty() {
            return self.get(id);
        }

        self.store
            .patch_campaign(id, &patch)
            .map_err(|error| not_found_as(error, id))
    }

    /// Stop accepting applications. Closing twice is a no-op.
    pub fn close(&self, id: &CampaignId) -> Result<Campaign, CampaignServiceError> {
        let campaign = self.get(id)?;
        if campaign.status == CampaignStatus::Closed {
            return Ok(campaign);
        }

        let closed = self
            .store
            .set_campaign_status(id, CampaignStatus::Closed)
            .map_err(|error| not_found_as(error, id))?;
        info!(campaign_id = %id, "campaign closed");
        Ok(closed)
    }

    /// Delete a campaign that no application references. Messages may remain as orphans.
    pub fn delete(&self, id: &CampaignId) -> Result<(), CampaignServiceError> {
        match self.store.delete_campaign(id) {
            Ok(()) => {
                info!(campaign_id = %id, "campaign deleted");
                Ok(())
            }
            Err(RepositoryError::Conflict) => Err(CampaignServiceError::HasApplications {
                campaign_id: id.clone(),
                count: self.store.applications_for_campaign(id)?.len(),
            }),
            Err(error) => Err(not_found_as(error, id)),
        }
    }

    /// Idempotent insert into the applicant set.
    pub fn add_applicant(
        &self,
        id: &CampaignId,
        creator_id: &UserId,
    ) -> Result<ApplicantInsert, CampaignServiceError> {
        self.store
            .add_applicant(id, creator_id)
            .map_err(|error| not_found_as(error, id))
    }

    /// Rebuild `applicant_ids` from the authoritative application rows.
    pub fn rebuild_applicants(&self, id: &CampaignId) -> Result<Campaign, CampaignServiceError> {
        let applicants = self
            .store
            .applications_for_campaign(id)?
            .into_iter()
            .map(|application| application.creator_id)
            .collect::<BTreeSet<_>>();

        let campaign = self
            .store
            .replace_applicants(id, applicants)
            .map_err(|error| not_found_as(error, id))?;
        info!(
            campaign_id = %id,
            applicants = campaign.applicant_ids.len(),
            "applicant set rebuilt"
        );
        Ok(campaign)
    }
}

fn not_found_as(error: RepositoryError, id: &CampaignId) -> CampaignServiceError {
    match error {
        RepositoryError::NotFound => CampaignServiceError::NotFound(id.clone()),
        other => CampaignServiceError::Repository(other),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CampaignServiceError {
    #[error("{0}")]
    Validation(String),
    #[error("campaign {0} not found")]
    NotFound(CampaignId),
    #[error("campaign {campaign_id} still has {count} application(s)")]
    HasApplications { campaign_id: CampaignId, count: usize },
    #[error(transparent)]
    Identity(#[from] RegistryError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl CampaignServiceError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            CampaignServiceError::Validation(_) => StatusCode::BAD_REQUEST,
            CampaignServiceError::NotFound(_) => StatusCode::NOT_FOUND,
            CampaignServiceError::HasApplications { .. } => StatusCode::CONFLICT,
            CampaignServiceError::Identity(error) => error.status_code(),
            CampaignServiceError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
