//! Review aggregation engine.
//!
//! Owns review documents (one per creator/reviewer pair) and keeps the cached rating on the
//! creator's identity equal to a fresh aggregate over every stored review for that creator.

pub mod domain;
pub mod repository;
pub mod router;
pub mod service;

pub use domain::{summarize_ratings, Review, ReviewSubmission};
pub use repository::ReviewRepository;
pub use router::review_router;
pub use service::{ReviewService, ReviewServiceError};
