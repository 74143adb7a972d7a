//! Campaign lifecycle store.
//!
//! Owns campaign documents including the embedded `applicant_ids` set. That set is a
//! denormalized membership cache: the application collection is authoritative, and the set must
//! only ever contain creators holding an application row for the campaign.

pub mod domain;
pub mod repository;
pub mod router;
pub mod service;

pub use domain::{ApplicantInsert, Campaign, CampaignDraft, CampaignPatch, CampaignStatus};
pub use repository::CampaignRepository;
pub use router::campaign_router;
pub use service::{CampaignService, CampaignServiceError};
