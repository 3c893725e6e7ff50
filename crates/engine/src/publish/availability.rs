//! Debounced, cancelable subdomain availability probe.
//!
//! Each call gets a monotonically increasing generation number. A call
//! only evaluates after the candidate has been stable for the debounce
//! window, and its result is committed to the shared latest-result slot
//! only if no newer call has started in the meantime — a superseded call
//! resolves `Unknown` and never touches shared state, regardless of
//! network response ordering.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::api::DeployApi;

/// Candidates shorter than this resolve `Unknown` without a network call.
pub const MIN_CANDIDATE_LEN: usize = 3;

/// Debounce window applied before a candidate is evaluated.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);

/// Probe verdict for a subdomain candidate.
///
/// `Unknown` covers short or malformed candidates, superseded probes, and
/// transport failures — a failed check never reads as `Available`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Availability {
    Available,
    Taken,
    Unknown,
}

/// The most recent completed probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeResult {
    pub candidate: String,
    pub availability: Availability,
}

/// Debounced availability checker against the deploy service.
pub struct AvailabilityProbe {
    api: Arc<dyn DeployApi>,
    debounce: Duration,
    generation: AtomicU64,
    latest: Mutex<Option<ProbeResult>>,
}

impl AvailabilityProbe {
    /// Create a probe with the given debounce window.
    pub fn new(api: Arc<dyn DeployApi>, debounce: Duration) -> Self {
        Self {
            api,
            debounce,
            generation: AtomicU64::new(0),
            latest: Mutex::new(None),
        }
    }

    /// Evaluate a candidate.
    ///
    /// Waits out the debounce window, asks the deploy service, and
    /// commits the verdict — unless a newer call started first, in which
    /// case the verdict is discarded and `Unknown` returned.
    pub async fn check(&self, candidate: &str) -> Availability {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        // Short or malformed candidates resolve immediately, no network.
        if candidate.len() < MIN_CANDIDATE_LEN || !is_valid_subdomain(candidate) {
            self.commit(generation, candidate, Availability::Unknown);
            return Availability::Unknown;
        }

        tokio::time::sleep(self.debounce).await;
        if self.is_superseded(generation) {
            debug!(candidate = %candidate, "probe superseded during debounce");
            return Availability::Unknown;
        }

        let availability = match self.api.check_subdomain(candidate).await {
            Ok(true) => Availability::Available,
            Ok(false) => Availability::Taken,
            Err(e) => {
                // Fail closed: a failed check must never read as available.
                warn!(candidate = %candidate, error = %e, "availability check failed");
                Availability::Unknown
            }
        };

        if !self.commit(generation, candidate, availability) {
            debug!(candidate = %candidate, "probe superseded; result discarded");
            return Availability::Unknown;
        }
        availability
    }

    /// The latest committed result, if any probe has completed.
    pub fn latest(&self) -> Option<ProbeResult> {
        self.latest.lock().clone()
    }

    fn is_superseded(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) != generation
    }

    /// Store a result unless a newer probe has started. Returns whether
    /// the result was committed.
    fn commit(&self, generation: u64, candidate: &str, availability: Availability) -> bool {
        let mut latest = self.latest.lock();
        if self.is_superseded(generation) {
            return false;
        }
        *latest = Some(ProbeResult {
            candidate: candidate.to_string(),
            availability,
        });
        true
    }
}

/// Subdomain labels: lowercase ASCII alphanumerics and hyphens, no
/// leading or trailing hyphen, at most 63 characters.
pub fn is_valid_subdomain(candidate: &str) -> bool {
    if candidate.is_empty() || candidate.len() > 63 {
        return false;
    }
    if candidate.starts_with('-') || candidate.ends_with('-') {
        return false;
    }
    candidate
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}
