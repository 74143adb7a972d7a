//! Marketplace components and the facade wiring them over one store.

pub mod applications;
pub mod campaigns;
pub mod conversations;
pub mod domain;
pub mod identity;
pub mod notifications;
pub mod reviews;
pub mod store;

#[cfg(test)]
mod tests;

use std::sync::Arc;

use axum::Router;

use crate::config::ListLimits;
use applications::{application_router, ApplicationRepository, ApplicationService};
use campaigns::{campaign_router, CampaignRepository, CampaignService};
use conversations::{conversation_router, ConversationService, MessageRepository};
use identity::{identity_router, IdentityRegistry, IdentityRepository};
use notifications::{notification_router, NotificationDispatcher, NotificationRepository};
use reviews::{review_router, ReviewRepository, ReviewService};
use store::MemoryStore;

/// Every document collection except notifications, which may live in a separate sink.
pub trait MarketplaceStore:
    IdentityRepository
    + CampaignRepository
    + ApplicationRepository
    + ReviewRepository
    + MessageRepository
    + 'static
{
}

impl<T> MarketplaceStore for T where
    T: IdentityRepository
        + CampaignRepository
        + ApplicationRepository
        + ReviewRepository
        + MessageRepository
        + 'static
{
}

/// All six components sharing one document store and one notification sink.
pub struct Marketplace<S, N> {
    pub registry: Arc<IdentityRegistry<S>>,
    pub campaigns: Arc<CampaignService<S>>,
    pub applications: Arc<ApplicationService<S, N>>,
    pub reviews: Arc<ReviewService<S, N>>,
    pub conversations: Arc<ConversationService<S, N>>,
    pub notifications: Arc<NotificationDispatcher<N>>,
}

impl<S, N> Clone for Marketplace<S, N> {
    fn clone(&self) -> Self {
        Self {
            registry: Arc::clone(&self.registry),
            campaigns: Arc::clone(&self.campaigns),
            applications: Arc::clone(&self.applications),
            reviews: Arc::clone(&self.reviews),
            conversations: Arc::clone(&self.conversations),
            notifications: Arc::clone(&self.notifications),
        }
    }
}

impl Marketplace<MemoryStore, MemoryStore> {
    /// Process-local marketplace where documents and notifications share one [`MemoryStore`].
    pub fn in_memory(limits: ListLimits) -> Self {
        let store = Arc::new(MemoryStore::new());
        Self::new(Arc::clone(&store), store, limits)
    }
}

impl<S, N> Marketplace<S, N>
where
    S: MarketplaceStore,
    N: NotificationRepository + 'static,
{
    pub fn new(store: Arc<S>, notifications: Arc<N>, limits: ListLimits) -> Self {
        let dispatcher = NotificationDispatcher::with_limit(notifications, limits.notifications);

        Self {
            registry: Arc::new(IdentityRegistry::new(Arc::clone(&store))),
            campaigns: Arc::new(CampaignService::new(Arc::clone(&store))),
            applications: Arc::new(ApplicationService::new(
                Arc::clone(&store),
                dispatcher.clone(),
            )),
            reviews: Arc::new(ReviewService::with_limit(
                Arc::clone(&store),
                dispatcher.clone(),
                limits.reviews,
            )),
            conversations: Arc::new(ConversationService::new(store, dispatcher.clone())),
            notifications: Arc::new(dispatcher),
        }
    }

    /// HTTP surface of every component.
    pub fn router(&self) -> Router {
        Router::new()
            .merge(identity_router(Arc::clone(&self.registry)))
            .merge(campaign_router(Arc::clone(&self.campaigns)))
            .merge(application_router(Arc::clone(&self.applications)))
            .merge(review_router(Arc::clone(&self.reviews)))
            .merge(conversation_router(Arc::clone(&self.conversations)))
            .merge(notification_router(Arc::clone(&self.notifications)))
    }
}
