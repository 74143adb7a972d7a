//! Document store shared by every marketplace component.
//!
//! [`MemoryStore`] keeps each collection behind its own mutex. Uniqueness of
//! `(campaign_id, creator_id)` applications and `(creator_id, reviewer_id)` reviews is enforced
//! inside the collection lock, so concurrent inserts for the same pair resolve to exactly one
//! winner.
//!
//! Operations spanning applications and campaigns lock `applications` before `campaigns`.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::hash::Hash;
use std::sync::{Mutex, MutexGuard};

use crate::marketplace::applications::{Application, ApplicationRepository, ApplicationStatus};
use crate::marketplace::campaigns::{
    ApplicantInsert, Campaign, CampaignPatch, CampaignRepository, CampaignStatus,
};
use crate::marketplace::conversations::{Message, MessageRepository};
use crate::marketplace::domain::{
    ApplicationId, CampaignId, MessageId, NotificationId, ReviewId, Timestamp, UserId,
};
use crate::marketplace::identity::{CachedRating, Identity, IdentityRepository, ProfileFields};
use crate::marketplace::notifications::{Notification, NotificationRepository};
use crate::marketplace::reviews::{Review, ReviewRepository};

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Records keyed by id that remember insertion order.
struct Collection<K, V> {
    order: Vec<K>,
    records: HashMap<K, V>,
}

impl<K, V> Default for Collection<K, V> {
    fn default() -> Self {
        Self {
            order: Vec::new(),
            records: HashMap::new(),
        }
    }
}

impl<K, V> Collection<K, V>
where
    K: Clone + Eq + Hash,
    V: Clone,
{
    fn insert(&mut self, key: K, value: V) -> Result<(), RepositoryError> {
        if self.records.contains_key(&key) {
            return Err(RepositoryError::Conflict);
        }
        self.order.push(key.clone());
        self.records.insert(key, value);
        Ok(())
    }

    fn get(&self, key: &K) -> Option<V> {
        self.records.get(key).cloned()
    }

    fn get_mut(&mut self, key: &K) -> Result<&mut V, RepositoryError> {
        self.records.get_mut(key).ok_or(RepositoryError::NotFound)
    }

    fn remove(&mut self, key: &K) -> Result<V, RepositoryError> {
        let removed = self.records.remove(key).ok_or(RepositoryError::NotFound)?;
        self.order.retain(|candidate| candidate != key);
        Ok(removed)
    }

    /// Insertion order.
    fn iter(&self) -> impl DoubleEndedIterator<Item = &V> + '_ {
        self.order.iter().filter_map(|key| self.records.get(key))
    }

    /// Matching records newest first. Records sharing a timestamp keep reverse insertion order.
    fn newest_first<F, P>(&self, created_at: F, mut keep: P) -> Vec<V>
    where
        F: Fn(&V) -> Timestamp,
        P: FnMut(&V) -> bool,
    {
        let mut matches: Vec<V> = self.iter().rev().filter(|v| keep(v)).cloned().collect();
        matches.sort_by(|a, b| created_at(b).cmp(&created_at(a)));
        matches
    }
}

#[derive(Default)]
struct ApplicationTable {
    rows: Collection<ApplicationId, Application>,
    pairs: HashSet<(CampaignId, UserId)>,
}

#[derive(Default)]
struct ReviewTable {
    rows: Collection<ReviewId, Review>,
    pairs: HashSet<(UserId, UserId)>,
}

/// Process-local store implementing every repository trait.
#[derive(Default)]
pub struct MemoryStore {
    identities: Mutex<Collection<UserId, Identity>>,
    campaigns: Mutex<Collection<CampaignId, Campaign>>,
    applications: Mutex<ApplicationTable>,
    reviews: Mutex<ReviewTable>,
    messages: Mutex<Collection<MessageId, Message>>,
    notifications: Mutex<Collection<NotificationId, Notification>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(test)]
impl MemoryStore {
    /// Remove a campaign even while applications reference it.
    pub(crate) fn force_delete_campaign(&self, id: &CampaignId) -> Result<(), RepositoryError> {
        lock(&self.campaigns, "campaigns")?.remove(id).map(|_| ())
    }
}

fn lock<'a, T>(
    mutex: &'a Mutex<T>,
    collection: &str,
) -> Result<MutexGuard<'a, T>, RepositoryError> {
    mutex
        .lock()
        .map_err(|_| RepositoryError::Unavailable(format!("{collection} lock poisoned")))
}

impl IdentityRepository for MemoryStore {
    fn insert_identity(&self, identity: Identity) -> Result<Identity, RepositoryError> {
        let mut guard = lock(&self.identities, "identities")?;
        guard.insert(identity.id.clone(), identity.clone())?;
        Ok(identity)
    }

    fn fetch_identity(&self, id: &UserId) -> Result<Option<Identity>, RepositoryError> {
        Ok(lock(&self.identities, "identities")?.get(id))
    }

    fn merge_profile(
        &self,
        id: &UserId,
        fields: ProfileFields,
    ) -> Result<Identity, RepositoryError> {
        let mut guard = lock(&self.identities, "identities")?;
        let identity = guard.get_mut(id)?;
        identity.profile.extend(fields);
        Ok(identity.clone())
    }

    fn set_cached_rating(
        &self,
        id: &UserId,
        rating: CachedRating,
    ) -> Result<(), RepositoryError> {
        let mut guard = lock(&self.identities, "identities")?;
        guard.get_mut(id)?.cached_rating = rating;
        Ok(())
    }
}

impl CampaignRepository for MemoryStore {
    fn insert_campaign(&self, campaign: Campaign) -> Result<Campaign, RepositoryError> {
        let mut guard = lock(&self.campaigns, "campaigns")?;
        guard.insert(campaign.id.clone(), campaign.clone())?;
        Ok(campaign)
    }

    fn fetch_campaign(&self, id: &CampaignId) -> Result<Option<Campaign>, RepositoryError> {
        Ok(lock(&self.campaigns, "campaigns")?.get(id))
    }

    fn list_campaigns(
        &self,
        business_id: Option<&UserId>,
    ) -> Result<Vec<Campaign>, RepositoryError> {
        let guard = lock(&self.campaigns, "campaigns")?;
        Ok(guard.newest_first(
            |campaign| campaign.created_at,
            |campaign| business_id.map_or(true, |owner| &campaign.business_id == owner),
        ))
    }

    fn patch_campaign(
        &self,
        id: &CampaignId,
        patch: &CampaignPatch,
    ) -> Result<Campaign, RepositoryError> {
        let mut guard = lock(&self.campaigns, "campaigns")?;
        let campaign = guard.get_mut(id)?;
        patch.apply(campaign);
        Ok(campaign.clone())
    }

    fn set_campaign_status(
        &self,
        id: &CampaignId,
        status: CampaignStatus,
    ) -> Result<Campaign, RepositoryError> {
        let mut guard = lock(&self.campaigns, "campaigns")?;
        let campaign = guard.get_mut(id)?;
        campaign.status = status;
        Ok(campaign.clone())
    }

    fn add_applicant(
        &self,
        id: &CampaignId,
        creator_id: &UserId,
    ) -> Result<ApplicantInsert, RepositoryError> {
        let mut guard = lock(&self.campaigns, "campaigns")?;
        let campaign = guard.get_mut(id)?;
        if campaign.applicant_ids.insert(creator_id.clone()) {
            Ok(ApplicantInsert::Added)
        } else {
            Ok(ApplicantInsert::AlreadyApplied)
        }
    }

    fn replace_applicants(
        &self,
        id: &CampaignId,
        applicants: BTreeSet<UserId>,
    ) -> Result<Campaign, RepositoryError> {
        let mut guard = lock(&self.campaigns, "campaigns")?;
        let campaign = guard.get_mut(id)?;
        campaign.applicant_ids = applicants;
        Ok(campaign.clone())
    }

    fn delete_campaign(&self, id: &CampaignId) -> Result<(), RepositoryError> {
        let applications = lock(&self.applications, "applications")?;
        let mut campaigns = lock(&self.campaigns, "campaigns")?;
        if campaigns.get(id).is_none() {
            return Err(RepositoryError::NotFound);
        }
        if applications
            .pairs
            .iter()
            .any(|(campaign_id, _)| campaign_id == id)
        {
            return Err(RepositoryError::Conflict);
        }
        campaigns.remove(id).map(|_| ())
    }
}

impl ApplicationRepository for MemoryStore {
    fn insert_application(
        &self,
        application: Application,
    ) -> Result<Application, RepositoryError> {
        let mut guard = lock(&self.applications, "applications")?;
        let pair = (
            application.campaign_id.clone(),
            application.creator_id.clone(),
        );
        if guard.pairs.contains(&pair) {
            return Err(RepositoryError::Conflict);
        }
        if lock(&self.campaigns, "campaigns")?
            .get(&application.campaign_id)
            .is_none()
        {
            return Err(RepositoryError::NotFound);
        }
        guard
            .rows
            .insert(application.id.clone(), application.clone())?;
        guard.pairs.insert(pair);
        Ok(application)
    }

    fn fetch_application(
        &self,
        id: &ApplicationId,
    ) -> Result<Option<Application>, RepositoryError> {
        Ok(lock(&self.applications, "applications")?.rows.get(id))
    }

    fn find_application(
        &self,
        campaign_id: &CampaignId,
        creator_id: &UserId,
    ) -> Result<Option<Application>, RepositoryError> {
        let guard = lock(&self.applications, "applications")?;
        let found = guard
            .rows
            .iter()
            .find(|application| {
                &application.campaign_id == campaign_id && &application.creator_id == creator_id
            })
            .cloned();
        Ok(found)
    }

    fn applications_for_campaign(
        &self,
        campaign_id: &CampaignId,
    ) -> Result<Vec<Application>, RepositoryError> {
        let guard = lock(&self.applications, "applications")?;
        Ok(guard.rows.newest_first(
            |application| application.created_at,
            |application| &application.campaign_id == campaign_id,
        ))
    }

    fn applications_for_creator(
        &self,
        creator_id: &UserId,
    ) -> Result<Vec<Application>, RepositoryError> {
        let guard = lock(&self.applications, "applications")?;
        Ok(guard.rows.newest_first(
            |application| application.created_at,
            |application| &application.creator_id == creator_id,
        ))
    }

    fn transition_application(
        &self,
        id: &ApplicationId,
        expected: ApplicationStatus,
        next: ApplicationStatus,
        at: Timestamp,
    ) -> Result<Application, RepositoryError> {
        let mut guard = lock(&self.applications, "applications")?;
        let application = guard.rows.get_mut(id)?;
        if application.status != expected {
            return Err(RepositoryError::Conflict);
        }
        application.status = next;
        application.updated_at = at;
        Ok(application.clone())
    }
}

impl ReviewRepository for MemoryStore {
    fn insert_review(&self, review: Review) -> Result<Review, RepositoryError> {
        let mut guard = lock(&self.reviews, "reviews")?;
        let pair = (review.creator_id.clone(), review.reviewer_id.clone());
        if guard.pairs.contains(&pair) {
            return Err(RepositoryError::Conflict);
        }
        guard.rows.insert(review.id.clone(), review.clone())?;
        guard.pairs.insert(pair);
        Ok(review)
    }

    fn reviews_for_creator(
        &self,
        creator_id: &UserId,
        limit: usize,
    ) -> Result<Vec<Review>, RepositoryError> {
        let guard = lock(&self.reviews, "reviews")?;
        let mut reviews = guard.rows.newest_first(
            |review| review.created_at,
            |review| &review.creator_id == creator_id,
        );
        reviews.truncate(limit);
        Ok(reviews)
    }

    fn ratings_for_creator(&self, creator_id: &UserId) -> Result<Vec<u8>, RepositoryError> {
        let guard = lock(&self.reviews, "reviews")?;
        Ok(guard
            .rows
            .iter()
            .filter(|review| &review.creator_id == creator_id)
            .map(|review| review.rating)
            .collect())
    }
}

impl MessageRepository for MemoryStore {
    fn append_message(&self, message: Message) -> Result<Message, RepositoryError> {
        let mut guard = lock(&self.messages, "messages")?;
        guard.insert(message.id.clone(), message.clone())?;
        Ok(message)
    }

    fn conversation_messages(
        &self,
        campaign_id: &CampaignId,
        first: &UserId,
        second: &UserId,
    ) -> Result<Vec<Message>, RepositoryError> {
        let guard = lock(&self.messages, "messages")?;
        let mut messages: Vec<Message> = guard
            .iter()
            .filter(|message| {
                &message.campaign_id == campaign_id && message.between(first, second)
            })
            .cloned()
            .collect();
        messages.sort_by_key(|message| message.timestamp);
        Ok(messages)
    }

    fn messages_involving(&self, user_id: &UserId) -> Result<Vec<Message>, RepositoryError> {
        let guard = lock(&self.messages, "messages")?;
        Ok(guard
            .iter()
            .filter(|message| message.involves(user_id))
            .cloned()
            .collect())
    }
}

impl NotificationRepository for MemoryStore {
    fn insert_notification(
        &self,
        notification: Notification,
    ) -> Result<Notification, RepositoryError> {
        let mut guard = lock(&self.notifications, "notifications")?;
        guard.insert(notification.id.clone(), notification.clone())?;
        Ok(notification)
    }

    fn notifications_for_user(
        &self,
        user_id: &UserId,
        limit: usize,
    ) -> Result<Vec<Notification>, RepositoryError> {
        let guard = lock(&self.notifications, "notifications")?;
        let mut notifications = guard.newest_first(
            |notification| notification.created_at,
            |notification| &notification.user_id == user_id,
        );
        notifications.truncate(limit);
        Ok(notifications)
    }

    fn mark_notification_read(
        &self,
        id: &NotificationId,
        at: Timestamp,
    ) -> Result<Notification, RepositoryError> {
        let mut guard = lock(&self.notifications, "notifications")?;
        let notification = guard.get_mut(id)?;
        if !notification.read {
            notification.read = true;
            notification.read_at = Some(at);
        }
        Ok(notification.clone())
    }

    fn count_unread(&self, user_id: &UserId) -> Result<usize, RepositoryError> {
        let guard = lock(&self.notifications, "notifications")?;
        Ok(guard
            .iter()
            .filter(|notification| &notification.user_id == user_id && !notification.read)
            .count())
    }
}
