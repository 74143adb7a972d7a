use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Wall-clock instant recorded on every document; rendered as RFC 3339 on output.
pub type Timestamp = DateTime<Utc>;

static DOCUMENT_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_key(prefix: &str) -> String {
    let id = DOCUMENT_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    format!("{prefix}-{id:06}")
}

macro_rules! document_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub(crate) fn generate() -> Self {
                Self(next_key($prefix))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }
    };
}

document_id!(
    /// Identifier of a registered creator or business.
    UserId,
    "usr"
);
document_id!(
    /// Identifier of a campaign posting.
    CampaignId,
    "cmp"
);
document_id!(
    /// Identifier of a creator's application to a campaign.
    ApplicationId,
    "app"
);
document_id!(ReviewId, "rev");
document_id!(MessageId, "msg");
document_id!(NotificationId, "ntf");

/// Role tag carried by every identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Creator,
    Business,
}

impl Role {
    pub const fn label(self) -> &'static str {
        match self {
            Role::Creator => "creator",
            Role::Business => "business",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Required field: present and not only whitespace.
pub(crate) fn required_field<T>(value: Option<T>, field: &'static str) -> Result<T, String>
where
    T: AsRef<str>,
{
    match value {
        Some(value) if !value.as_ref().trim().is_empty() => Ok(value),
        _ => Err(format!("missing required field: {field}")),
    }
}
