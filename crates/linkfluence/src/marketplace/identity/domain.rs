use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::marketplace::domain::{Role, Timestamp, UserId};

/// Loosely-typed profile attributes (bio, category, social links, ...).
pub type ProfileFields = Map<String, Value>;

/// Denormalized rating aggregate stored on a creator's identity.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CachedRating {
    pub average: f64,
    pub count: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Identity {
    pub id: UserId,
    pub role: Role,
    pub name: String,
    #[serde(default)]
    pub profile: ProfileFields,
    #[serde(default)]
    pub cached_rating: CachedRating,
    pub created_at: Timestamp,
}

/// Registration payload; credentials are handled outside this crate.
#[derive(Debug, Clone, Deserialize)]
pub struct Registration {
    pub role: Role,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub profile: ProfileFields,
}
