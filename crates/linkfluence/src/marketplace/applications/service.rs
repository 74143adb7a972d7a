use std::sync::Arc;

use axum::http::StatusCode;
use chrono::Utc;
use tracing::{debug, info, warn};

use super::domain::{Application, ApplicationStatus, ApplicationSubmission};
use super::repository::ApplicationRepository;
use crate::marketplace::campaigns::{
    Campaign, CampaignRepository, CampaignService, CampaignServiceError,
};
use crate::marketplace::domain::{ApplicationId, CampaignId, Role, UserId};
use crate::marketplace::identity::{IdentityRegistry, IdentityRepository, RegistryError};
use crate::marketplace::notifications::{
    NotificationDispatcher, NotificationEvent, NotificationKind, NotificationRepository,
};
use crate::marketplace::store::RepositoryError;

/// Service composing the registry, campaign store and notification dispatcher around the
/// application collection.
pub struct ApplicationService<S, N> {
    store: Arc<S>,
    registry: IdentityRegistry<S>,
    campaigns: CampaignService<S>,
    notifications: NotificationDispatcher<N>,
}

impl<S, N> ApplicationService<S, N>
where
    S: ApplicationRepository + CampaignRepository + IdentityRepository + 'static,
    N: NotificationRepository + 'static,
{
    pub fn new(store: Arc<S>, notifications: NotificationDispatcher<N>) -> Self {
        Self {
            registry: IdentityRegistry::new(Arc::clone(&store)),
            campaigns: CampaignService::new(Arc::clone(&store)),
            store,
            notifications,
        }
    }

    /// Submit a creator's application. The unique `(campaign_id, creator_id)` index turns a
    /// second submission into `DuplicateApplication` without side effects.
    pub fn submit(
        &self,
        submission: ApplicationSubmission,
    ) -> Result<Application, ApplicationServiceError> {
        if !(submission.bid_amount.is_finite() && submission.bid_amount >= 0.0) {
            return Err(ApplicationServiceError::Validation(
                "bid_amount must be a non-negative amount".to_string(),
            ));
        }

        let creator = self
            .registry
            .resolve_with_role(&submission.creator_id, Role::Creator)?;
        let campaign = self
            .store
            .fetch_campaign(&submission.campaign_id)?
            .ok_or_else(|| {
                ApplicationServiceError::CampaignNotFound(submission.campaign_id.clone())
            })?;
        if !campaign.is_open() {
            return Err(ApplicationServiceError::CampaignClosed(campaign.id));
        }

        let now = Utc::now();
        let application = Application {
            id: ApplicationId::generate(),
            campaign_id: campaign.id.clone(),
            creator_id: creator.id.clone(),
            creator_name: creator.name.clone(),
            cover_letter: submission.cover_letter,
            bid_amount: submission.bid_amount,
            status: ApplicationStatus::Pending,
            created_at: now,
            updated_at: now,
        };

        let stored = match self.store.insert_application(application) {
            Ok(stored) => stored,
            Err(RepositoryError::Conflict) => {
                return Err(ApplicationServiceError::DuplicateApplication {
                    campaign_id: campaign.id,
                    creator_id: creator.id,
                })
            }
            Err(RepositoryError::NotFound) => {
                return Err(ApplicationServiceError::CampaignNotFound(campaign.id))
            }
            Err(other) => return Err(other.into()),
        };

        // The applicant set is advisory; the row above is already authoritative.
        if let Err(error) = self.campaigns.add_applicant(&campaign.id, &creator.id) {
            warn!(
                campaign_id = %campaign.id,
                creator_id = %creator.id,
                %error,
                "applicant set not updated"
            );
        }

        self.notifications.notify(
            NotificationEvent::new(
                campaign.business_id.clone(),
                NotificationKind::NewApplication,
                "New Application!",
                format!("{} applied for your campaign: {}", creator.name, campaign.title),
            )
            .correlate("campaign_id", &campaign.id)
            .correlate("creator_id", &creator.id)
            .correlate("application_id", &stored.id),
        );

        info!(
            application_id = %stored.id,
            campaign_id = %stored.campaign_id,
            creator_id = %stored.creator_id,
            "application submitted"
        );
        Ok(stored)
    }

    /// Move a pending application to `status`. Terminal applications reject every update.
    pub fn update_status(
        &self,
        id: &ApplicationId,
        status: &str,
    ) -> Result<Application, ApplicationServiceError> {
        let next = ApplicationStatus::parse(status)
            .ok_or_else(|| ApplicationServiceError::InvalidStatus(status.to_string()))?;

        let current = self.get(id)?;
        if current.status.is_terminal() {
            return Err(ApplicationServiceError::InvalidTransition {
                application_id: id.clone(),
                from: current.status,
                to: next,
            });
        }

        let transition = self
            .store
            .transition_application(id, current.status, next, Utc::now());
        let updated = match transition {
            Ok(updated) => updated,
            Err(RepositoryError::Conflict) => {
                // Another decision landed between the read and the compare-and-set.
                let latest = self.get(id)?;
                return Err(ApplicationServiceError::InvalidTransition {
                    application_id: id.clone(),
                    from: latest.status,
                    to: next,
                });
            }
            Err(RepositoryError::NotFound) => {
                return Err(ApplicationServiceError::NotFound(id.clone()))
            }
            Err(other) => return Err(other.into()),
        };

        info!(
            application_id = %id,
            from = current.status.label(),
            to = next.label(),
            "application status updated"
        );
        self.notify_decision(&updated);
        Ok(updated)
    }

    fn notify_decision(&self, application: &Application) {
        let campaign = match self.store.fetch_campaign(&application.campaign_id) {
            Ok(Some(campaign)) => campaign,
            Ok(None) => {
                debug!(
                    application_id = %application.id,
                    campaign_id = %application.campaign_id,
                    "campaign missing, decision notification skipped"
                );
                return;
            }
            Err(error) => {
                warn!(
                    application_id = %application.id,
                    %error,
                    "campaign lookup failed, decision notification skipped"
                );
                return;
            }
        };

        self.notifications.notify(decision_event(application, &campaign));
    }

    pub fn get(&self, id: &ApplicationId) -> Result<Application, ApplicationServiceError> {
        self.store
            .fetch_application(id)?
            .ok_or_else(|| ApplicationServiceError::NotFound(id.clone()))
    }

    pub fn list_by_campaign(
        &self,
        campaign_id: &CampaignId,
    ) -> Result<Vec<Application>, ApplicationServiceError> {
        Ok(self.store.applications_for_campaign(campaign_id)?)
    }

    pub fn list_by_creator(
        &self,
        creator_id: &UserId,
    ) -> Result<Vec<Application>, ApplicationServiceError> {
        Ok(self.store.applications_for_creator(creator_id)?)
    }

    /// Authoritative "did this creator apply" check against application rows.
    pub fn has_applied(
        &self,
        campaign_id: &CampaignId,
        creator_id: &UserId,
    ) -> Result<bool, ApplicationServiceError> {
        Ok(self
            .store
            .find_application(campaign_id, creator_id)?
            .is_some())
    }

    /// Repair the campaign's applicant set from the application rows.
    pub fn reconcile_applicants(
        &self,
        campaign_id: &CampaignId,
    ) -> Result<Campaign, ApplicationServiceError> {
        Ok(self.campaigns.rebuild_applicants(campaign_id)?)
    }
}

fn decision_event(application: &Application, campaign: &Campaign) -> NotificationEvent {
    let outcome = if application.status == ApplicationStatus::Accepted {
        "accepted"
    } else {
        "was reviewed"
    };

    NotificationEvent::new(
        application.creator_id.clone(),
        NotificationKind::ApplicationUpdate,
        format!("Application {}", application.status.headline()),
        format!("Your application for '{}' {}!", campaign.title, outcome),
    )
    .correlate("campaign_id", &application.campaign_id)
    .correlate("application_id", &application.id)
}

/// Error raised by the application service.
#[derive(Debug, thiserror::Error)]
pub enum ApplicationServiceError {
    #[error("{0}")]
    Validation(String),
    #[error("invalid status '{0}': must be pending, accepted, or rejected")]
    InvalidStatus(String),
    #[error("application {application_id} is {from} and cannot move to {to}")]
    InvalidTransition {
        application_id: ApplicationId,
        from: ApplicationStatus,
        to: ApplicationStatus,
    },
    #[error("creator {creator_id} has already applied to campaign {campaign_id}")]
    DuplicateApplication {
        campaign_id: CampaignId,
        creator_id: UserId,
    },
    #[error("application {0} not found")]
    NotFound(ApplicationId),
    #[error("campaign {0} not found")]
    CampaignNotFound(CampaignId),
    #[error("campaign {0} is closed")]
    CampaignClosed(CampaignId),
    #[error(transparent)]
    Campaign(#[from] CampaignServiceError),
    #[error(transparent)]
    Identity(#[from] RegistryError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl ApplicationServiceError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApplicationServiceError::Validation(_) | ApplicationServiceError::InvalidStatus(_) => {
                StatusCode::BAD_REQUEST
            }
            ApplicationServiceError::DuplicateApplication { .. }
            | ApplicationServiceError::InvalidTransition { .. }
            | ApplicationServiceError::CampaignClosed(_) => StatusCode::CONFLICT,
            ApplicationServiceError::NotFound(_) | ApplicationServiceError::CampaignNotFound(_) => {
                StatusCode::NOT_FOUND
            }
            ApplicationServiceError::Campaign(error) => error.status_code(),
            ApplicationServiceError::Identity(error) => error.status_code(),
            ApplicationServiceError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
