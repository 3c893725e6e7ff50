//! Publish coordinator: strategy state machines, the single in-flight
//! guard, and deployment history.
//!
//! Strategy paths:
//! - subpath: `requested → deployed | failed` (one synchronous round trip)
//! - subdomain: `requested → deployed | failed`, gated on a prior
//!   `available` probe result
//! - custom-domain: `requested → dns-pending → deployed | failed`; the
//!   terminal state is observed on a later history refresh, never polled
//!   here

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use chrono::Utc;
use parking_lot::RwLock;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};
use crate::models::{DeployStatus, DeployType, DeploymentRecord, DnsInstructions};

use super::api::{DeployApi, DeployOutcome};
use super::availability::{Availability, AvailabilityProbe, ProbeResult};

/// TTL suggested for custom-domain CNAME records.
const DNS_TTL_SECS: u32 = 3600;

/// Orchestrates the three publish strategies against the deploy service.
///
/// At most one publish call is in flight at any time; triggers arriving
/// while one is running are ignored, never queued. History records are
/// created here and only here.
pub struct PublishCoordinator {
    api: Arc<dyn DeployApi>,
    probe: AvailabilityProbe,
    in_flight: AtomicBool,
    records: RwLock<Vec<DeploymentRecord>>,
}

/// Clears the in-flight flag when a publish call completes.
struct InFlightGuard<'a>(&'a AtomicBool);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl PublishCoordinator {
    /// Create a coordinator with the given probe debounce window.
    pub fn new(api: Arc<dyn DeployApi>, debounce: Duration) -> Self {
        Self {
            probe: AvailabilityProbe::new(api.clone(), debounce),
            api,
            in_flight: AtomicBool::new(false),
            records: RwLock::new(Vec::new()),
        }
    }

    /// Whether a publish call is currently in flight.
    pub fn is_publishing(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Debounced availability probe for a subdomain candidate.
    pub async fn check_subdomain_availability(&self, candidate: &str) -> Availability {
        self.probe.check(candidate).await
    }

    /// The latest completed probe result.
    pub fn last_availability(&self) -> Option<ProbeResult> {
        self.probe.latest()
    }

    /// Publish under an ephemeral provider-chosen subpath.
    ///
    /// Returns `Ok(None)` when ignored because another publish is in
    /// flight. A failed attempt appends a terminal `failed` record — never
    /// an orphaned `requested` one — and the error still propagates.
    pub async fn publish_subpath(&self) -> EngineResult<Option<DeploymentRecord>> {
        let Some(_guard) = self.try_begin() else {
            debug!("publish_subpath ignored: another publish is in flight");
            return Ok(None);
        };

        match self.api.publish_subpath().await {
            Ok(outcome) => {
                let record = self.record_deployed(DeployType::Subpath, None, outcome);
                info!(url = record.published_url.as_deref().unwrap_or(""), "subpath deploy succeeded");
                Ok(Some(record))
            }
            Err(e) => {
                self.record_failed(DeployType::Subpath, None, None, &e);
                warn!(error = %e, "subpath deploy failed");
                Err(e)
            }
        }
    }

    /// Publish under a chosen subdomain.
    ///
    /// Precondition: the most recent completed probe covered exactly this
    /// candidate and found it available. Checked before any network call.
    pub async fn publish_subdomain(&self, candidate: &str) -> EngineResult<Option<DeploymentRecord>> {
        let Some(_guard) = self.try_begin() else {
            debug!("publish_subdomain ignored: another publish is in flight");
            return Ok(None);
        };

        match self.probe.latest() {
            Some(result)
                if result.candidate == candidate
                    && result.availability == Availability::Available => {}
            _ => {
                return Err(EngineError::Precondition(format!(
                    "subdomain '{candidate}' has not been confirmed available"
                )));
            }
        }

        match self.api.publish_subdomain(candidate).await {
            Ok(outcome) => {
                let record =
                    self.record_deployed(DeployType::Subdomain, Some(candidate.to_string()), outcome);
                info!(subdomain = %candidate, "subdomain deploy succeeded");
                Ok(Some(record))
            }
            Err(e) => {
                self.record_failed(DeployType::Subdomain, Some(candidate.to_string()), None, &e);
                warn!(subdomain = %candidate, error = %e, "subdomain deploy failed");
                Err(e)
            }
        }
    }

    /// Attach a custom domain to an existing subdomain deployment.
    ///
    /// Precondition: `site_id` belongs to a prior successful `subdomain`
    /// record — custom domains are layered on subdomain deployments,
    /// never on subpath deployments. Success yields a `dns-pending`
    /// record carrying the CNAME instructions; the terminal state is
    /// observed on a later [`Self::refresh_history`].
    pub async fn attach_custom_domain(
        &self,
        site_id: &str,
        domain: &str,
    ) -> EngineResult<Option<DeploymentRecord>> {
        let Some(_guard) = self.try_begin() else {
            debug!("attach_custom_domain ignored: another publish is in flight");
            return Ok(None);
        };

        if !is_valid_domain(domain) {
            return Err(EngineError::Validation(format!(
                "'{domain}' is not a valid domain name"
            )));
        }

        let parent = self
            .records
            .read()
            .iter()
            .find(|r| {
                r.deploy_type == DeployType::Subdomain
                    && r.status == DeployStatus::Deployed
                    && r.provider_site_id.as_deref() == Some(site_id)
            })
            .cloned();
        let Some(parent) = parent else {
            return Err(EngineError::Precondition(format!(
                "no subdomain deployment owns site id '{site_id}'"
            )));
        };

        match self.api.attach_custom_domain(site_id, domain).await {
            Ok(()) => {
                let record = DeploymentRecord {
                    id: Uuid::now_v7().to_string(),
                    deploy_type: DeployType::CustomDomain,
                    published_url: Some(format!("https://{domain}")),
                    status: DeployStatus::DnsPending,
                    subdomain: parent.subdomain.clone(),
                    custom_domain: Some(domain.to_string()),
                    provider_site_id: Some(site_id.to_string()),
                    created_at: Utc::now(),
                    dns_instructions: Some(cname_instructions(domain, &parent)),
                    error: None,
                };
                self.append(record.clone());
                info!(domain = %domain, site_id = %site_id, "custom domain attached; awaiting DNS");
                Ok(Some(record))
            }
            Err(e) => {
                self.record_failed(
                    DeployType::CustomDomain,
                    parent.subdomain.clone(),
                    Some(domain.to_string()),
                    &e,
                );
                warn!(domain = %domain, error = %e, "custom domain attach failed");
                Err(e)
            }
        }
    }

    /// Refresh the local history cache from the deploy service.
    ///
    /// The service is the source of truth; DNS propagation for
    /// `dns-pending` records is observed here. Safe to call while a
    /// publish is in flight — a just-succeeded deploy may not appear
    /// until the next refresh.
    pub async fn refresh_history(&self) -> EngineResult<()> {
        let remote = self.api.history().await?;
        let count = remote.len();
        *self.records.write() = remote;
        debug!(records = count, "deployment history refreshed");
        Ok(())
    }

    /// All known deployment records, newest first.
    pub fn list_history(&self) -> Vec<DeploymentRecord> {
        let mut records = self.records.read().clone();
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        records
    }

    /// Subdomain deployments eligible as custom-domain targets. Derived
    /// from the history list on demand, never cached separately.
    pub fn custom_domain_targets(&self) -> Vec<DeploymentRecord> {
        self.list_history()
            .into_iter()
            .filter(|r| {
                r.deploy_type == DeployType::Subdomain
                    && r.status == DeployStatus::Deployed
                    && r.provider_site_id.is_some()
            })
            .collect()
    }

    /// Remove a deployment record.
    ///
    /// Bookkeeping only: the live deployment, if any, stays up.
    pub async fn delete_deployment(&self, id: &str) -> EngineResult<()> {
        let exists = self.records.read().iter().any(|r| r.id == id);
        if !exists {
            return Err(EngineError::not_found("deployment", id));
        }

        self.api.delete_deployment(id).await?;
        self.records.write().retain(|r| r.id != id);
        info!(deployment_id = %id, "deployment record deleted");
        Ok(())
    }

    fn try_begin(&self) -> Option<InFlightGuard<'_>> {
        self.in_flight
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
            .then(|| InFlightGuard(&self.in_flight))
    }

    fn append(&self, record: DeploymentRecord) {
        self.records.write().push(record);
    }

    fn record_deployed(
        &self,
        deploy_type: DeployType,
        subdomain: Option<String>,
        outcome: DeployOutcome,
    ) -> DeploymentRecord {
        let record = DeploymentRecord {
            id: Uuid::now_v7().to_string(),
            deploy_type,
            published_url: Some(outcome.url),
            status: DeployStatus::Deployed,
            subdomain,
            custom_domain: None,
            provider_site_id: outcome.site_id,
            created_at: Utc::now(),
            dns_instructions: None,
            error: None,
        };
        self.append(record.clone());
        record
    }

    fn record_failed(
        &self,
        deploy_type: DeployType,
        subdomain: Option<String>,
        custom_domain: Option<String>,
        error: &EngineError,
    ) {
        self.append(DeploymentRecord {
            id: Uuid::now_v7().to_string(),
            deploy_type,
            published_url: None,
            status: DeployStatus::Failed,
            subdomain,
            custom_domain,
            provider_site_id: None,
            created_at: Utc::now(),
            dns_instructions: None,
            error: Some(error.to_string()),
        });
    }
}

/// CNAME from the custom domain to the parent subdomain deployment's host.
fn cname_instructions(domain: &str, parent: &DeploymentRecord) -> DnsInstructions {
    DnsInstructions {
        record_type: "CNAME".to_string(),
        host: domain.to_string(),
        value: deploy_host(parent).unwrap_or_default(),
        ttl: DNS_TTL_SECS,
    }
}

/// Host of a record's published URL.
fn deploy_host(record: &DeploymentRecord) -> Option<String> {
    let raw = record.published_url.as_deref()?;
    url::Url::parse(raw)
        .ok()?
        .host_str()
        .map(|h| h.to_string())
}

/// Full domain names: dot-separated valid labels, at most 253 characters.
fn is_valid_domain(domain: &str) -> bool {
    if domain.len() > 253 || !domain.contains('.') {
        return false;
    }
    domain.split('.').all(|label| {
        !label.is_empty()
            && label.len() <= 63
            && !label.starts_with('-')
            && !label.ends_with('-')
            && label
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    })
}
