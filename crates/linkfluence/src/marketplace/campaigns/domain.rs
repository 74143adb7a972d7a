use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::marketplace::domain::{CampaignId, Timestamp, UserId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CampaignStatus {
    Active,
    Closed,
}

impl CampaignStatus {
    pub const fn label(self) -> &'static str {
        match self {
            CampaignStatus::Active => "active",
            CampaignStatus::Closed => "closed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Campaign {
    pub id: CampaignId,
    pub business_id: UserId,
    pub title: String,
    pub description: String,
    pub budget: f64,
    pub status: CampaignStatus,
    #[serde(default)]
    pub applicant_ids: BTreeSet<UserId>,
    pub created_at: Timestamp,
}

impl Campaign {
    pub fn is_open(&self) -> bool {
        self.status == CampaignStatus::Active
    }
}

/// Fields supplied when a business posts a campaign. All three are required.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CampaignDraft {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub budget: Option<f64>,
}

/// Partial edit. Only these fields are recognized; anything else in a payload is ignored.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CampaignPatch {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub budget: Option<f64>,
}

impl CampaignPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none() && self.budget.is_none()
    }

    pub(crate) fn apply(&self, campaign: &mut Campaign) {
        if let Some(title) = &self.title {
            campaign.title = title.clone();
        }
        if let Some(description) = &self.description {
            campaign.description = description.clone();
        }
        if let Some(budget) = self.budget {
            campaign.budget = budget;
        }
    }
}

/// Outcome of the idempotent applicant-set insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplicantInsert {
    Added,
    AlreadyApplied,
}

pub(crate) fn valid_budget(budget: f64) -> bool {
    budget.is_finite() && budget >= 0.0
}
