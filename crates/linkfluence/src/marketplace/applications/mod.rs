//! Application state machine.
//!
//! One application per (campaign, creator) pair, starting `pending` and moving once to either
//! `accepted` or `rejected`. Submission keeps the campaign's applicant set in step and notifies
//! the owning business; decisions notify the creator.

pub mod domain;
pub mod repository;
pub mod router;
pub mod service;

pub use domain::{Application, ApplicationStatus, ApplicationSubmission};
pub use repository::ApplicationRepository;
pub use router::application_router;
pub use service::{ApplicationService, ApplicationServiceError};
