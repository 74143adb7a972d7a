//! Cross-entity consistency and notification fan-out for the creator/business marketplace.
//!
//! Campaigns, applications, reviews and messages live in independent collections that share
//! denormalized copies of the same facts. The services under [`marketplace`] own one collection
//! each and keep the duplicated data (applicant sets, cached rating aggregates, conversation
//! grouping) consistent, emitting notifications as a side effect of their state transitions.

pub mod config;
pub mod error;
pub mod marketplace;
pub mod telemetry;
