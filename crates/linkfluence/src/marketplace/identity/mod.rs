//! Identity & role registry: resolves opaque user identifiers to role-tagged identities.
//!
//! Every other component consults the registry before accepting a write that references a
//! user. The registry never initiates writes of its own beyond registration and profile merges;
//! the cached rating is written by the review engine through [`IdentityRepository`].

pub mod domain;
pub mod registry;
pub mod repository;
pub mod router;

pub use domain::{CachedRating, Identity, ProfileFields, Registration};
pub use registry::{IdentityRegistry, RegistryError};
pub use repository::IdentityRepository;
pub use router::identity_router;
