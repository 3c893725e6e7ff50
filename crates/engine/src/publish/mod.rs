//! Publish pipeline: deploy strategies, availability probe, and
//! deployment history.

mod api;
mod availability;
mod coordinator;

pub use api::{DeployApi, DeployOutcome, HttpDeployApi};
pub use availability::{
    Availability, AvailabilityProbe, DEFAULT_DEBOUNCE, MIN_CANDIDATE_LEN, ProbeResult,
    is_valid_subdomain,
};
pub use coordinator::PublishCoordinator;
