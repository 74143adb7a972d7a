use std::sync::Arc;

use axum::response::Response;
use serde_json::{json, Value};

use crate::config::ListLimits;
use crate::marketplace::applications::{Application, ApplicationSubmission};
use crate::marketplace::campaigns::{Campaign, CampaignDraft};
use crate::marketplace::domain::{NotificationId, Role, Timestamp, UserId};
use crate::marketplace::identity::{
    CachedRating, Identity, IdentityRepository, ProfileFields, Registration,
};
use crate::marketplace::notifications::{Notification, NotificationRepository};
use crate::marketplace::store::{MemoryStore, RepositoryError};
use crate::marketplace::{Marketplace, MarketplaceStore};

pub(super) type MemoryMarketplace = Marketplace<MemoryStore, MemoryStore>;

pub(super) fn build_marketplace() -> (MemoryMarketplace, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let marketplace = Marketplace::new(store.clone(), store.clone(), ListLimits::default());
    (marketplace, store)
}

pub(super) fn build_with_failing_notifications(
) -> (Marketplace<MemoryStore, FailingNotifications>, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let marketplace = Marketplace::new(
        store.clone(),
        Arc::new(FailingNotifications),
        ListLimits::default(),
    );
    (marketplace, store)
}

pub(super) fn register<S, N>(marketplace: &Marketplace<S, N>, role: Role, name: &str) -> Identity
where
    S: MarketplaceStore,
    N: NotificationRepository + 'static,
{
    let mut profile = serde_json::Map::new();
    profile.insert("bio".to_string(), json!(format!("{name} bio")));
    marketplace
        .registry
        .register(Registration {
            role,
            name: Some(name.to_string()),
            profile,
        })
        .expect("registration succeeds")
}

pub(super) fn draft(title: &str, budget: f64) -> CampaignDraft {
    CampaignDraft {
        title: Some(title.to_string()),
        description: Some(format!("{title} description")),
        budget: Some(budget),
    }
}

pub(super) fn post_campaign<S, N>(
    marketplace: &Marketplace<S, N>,
    business: &Identity,
    title: &str,
) -> Campaign
where
    S: MarketplaceStore,
    N: NotificationRepository + 'static,
{
    marketplace
        .campaigns
        .create(&business.id, draft(title, 500.0))
        .expect("campaign created")
}

pub(super) fn submission(campaign: &Campaign, creator: &Identity) -> ApplicationSubmission {
    ApplicationSubmission {
        campaign_id: campaign.id.clone(),
        creator_id: creator.id.clone(),
        cover_letter: "Happy to help".to_string(),
        bid_amount: 250.0,
    }
}

pub(super) fn apply<S, N>(
    marketplace: &Marketplace<S, N>,
    campaign: &Campaign,
    creator: &Identity,
) -> Application
where
    S: MarketplaceStore,
    N: NotificationRepository + 'static,
{
    marketplace
        .applications
        .submit(submission(campaign, creator))
        .expect("application submitted")
}

/// Business `Acme`, creator `Ada` and one open campaign owned by Acme.
pub(super) struct Scenario {
    pub(super) marketplace: MemoryMarketplace,
    pub(super) store: Arc<MemoryStore>,
    pub(super) business: Identity,
    pub(super) creator: Identity,
    pub(super) campaign: Campaign,
}

pub(super) fn scenario() -> Scenario {
    let (marketplace, store) = build_marketplace();
    let business = register(&marketplace, Role::Business, "Acme");
    let creator = register(&marketplace, Role::Creator, "Ada");
    let campaign = post_campaign(&marketplace, &business, "Spring Launch");
    Scenario {
        marketplace,
        store,
        business,
        creator,
        campaign,
    }
}

pub(super) fn notifications_for(
    marketplace: &MemoryMarketplace,
    user: &UserId,
) -> Vec<Notification> {
    marketplace
        .notifications
        .list_for_user(user, None)
        .expect("notifications listed")
}

/// Notification sink that is always offline.
pub(super) struct FailingNotifications;

impl NotificationRepository for FailingNotifications {
    fn insert_notification(
        &self,
        _notification: Notification,
    ) -> Result<Notification, RepositoryError> {
        Err(RepositoryError::Unavailable("notification sink offline".to_string()))
    }

    fn notifications_for_user(
        &self,
        _user_id: &UserId,
        _limit: usize,
    ) -> Result<Vec<Notification>, RepositoryError> {
        Err(RepositoryError::Unavailable("notification sink offline".to_string()))
    }

    fn mark_notification_read(
        &self,
        _id: &NotificationId,
        _at: Timestamp,
    ) -> Result<Notification, RepositoryError> {
        Err(RepositoryError::Unavailable("notification sink offline".to_string()))
    }

    fn count_unread(&self, _user_id: &UserId) -> Result<usize, RepositoryError> {
        Err(RepositoryError::Unavailable("notification sink offline".to_string()))
    }
}

/// Identity collection whose backing store is unreachable.
pub(super) struct OfflineIdentities;

impl IdentityRepository for OfflineIdentities {
    fn insert_identity(&self, _identity: Identity) -> Result<Identity, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch_identity(&self, _id: &UserId) -> Result<Option<Identity>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn merge_profile(
        &self,
        _id: &UserId,
        _fields: ProfileFields,
    ) -> Result<Identity, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn set_cached_rating(
        &self,
        _id: &UserId,
        _rating: CachedRating,
    ) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
