//! Shared test fixtures: a scripted deploy API and session constructors.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use sitewright_engine::config::EngineConfig;
use sitewright_engine::error::{EngineError, EngineResult};
use sitewright_engine::models::DeploymentRecord;
use sitewright_engine::publish::{DeployApi, DeployOutcome};
use sitewright_engine::state::BuilderState;
use sitewright_engine::storage::MemoryGateway;

/// Per-operation call counters.
#[derive(Default)]
pub struct CallCounts {
    pub subpath: AtomicUsize,
    pub check: AtomicUsize,
    pub subdomain: AtomicUsize,
    pub custom_domain: AtomicUsize,
    pub history: AtomicUsize,
    pub delete: AtomicUsize,
}

/// Scripted deploy API double.
///
/// Every operation succeeds by default; set a `fail_*` slot to make the
/// next calls fail with a transport error. `check_delays` queues per-call
/// latencies for the availability endpoint, `subpath_delay` one for the
/// subpath deploy.
#[derive(Default)]
pub struct MockDeployApi {
    pub fail_subpath: Mutex<Option<String>>,
    pub fail_subdomain: Mutex<Option<String>>,
    pub fail_custom_domain: Mutex<Option<String>>,
    /// `Some(bool)` answers the availability check; `None` simulates a
    /// transport failure.
    pub subdomain_available: Mutex<Option<bool>>,
    pub remote_history: Mutex<Vec<DeploymentRecord>>,
    pub check_delays: Mutex<VecDeque<u64>>,
    pub subpath_delay_ms: Mutex<Option<u64>>,
    pub calls: CallCounts,
}

impl MockDeployApi {
    pub fn new() -> Self {
        Self {
            subdomain_available: Mutex::new(Some(true)),
            ..Self::default()
        }
    }

    pub fn push_check_delay(&self, ms: u64) {
        self.check_delays.lock().push_back(ms);
    }
}

#[async_trait]
impl DeployApi for MockDeployApi {
    async fn publish_subpath(&self) -> EngineResult<DeployOutcome> {
        self.calls.subpath.fetch_add(1, Ordering::SeqCst);
        let delay = self.subpath_delay_ms.lock().take();
        if let Some(ms) = delay {
            tokio::time::sleep(Duration::from_millis(ms)).await;
        }
        if let Some(msg) = self.fail_subpath.lock().clone() {
            return Err(EngineError::Transport(msg));
        }
        Ok(DeployOutcome {
            url: "https://sites.example/s/ephemeral-1".to_string(),
            site_id: None,
        })
    }

    async fn check_subdomain(&self, _name: &str) -> EngineResult<bool> {
        self.calls.check.fetch_add(1, Ordering::SeqCst);
        let delay = self.check_delays.lock().pop_front();
        if let Some(ms) = delay {
            tokio::time::sleep(Duration::from_millis(ms)).await;
        }
        match *self.subdomain_available.lock() {
            Some(available) => Ok(available),
            None => Err(EngineError::Transport("name service unreachable".to_string())),
        }
    }

    async fn publish_subdomain(&self, subdomain: &str) -> EngineResult<DeployOutcome> {
        self.calls.subdomain.fetch_add(1, Ordering::SeqCst);
        if let Some(msg) = self.fail_subdomain.lock().clone() {
            return Err(EngineError::Transport(msg));
        }
        Ok(DeployOutcome {
            url: format!("https://{subdomain}.sites.example"),
            site_id: Some(format!("site-{subdomain}")),
        })
    }

    async fn attach_custom_domain(&self, _site_id: &str, _domain: &str) -> EngineResult<()> {
        self.calls.custom_domain.fetch_add(1, Ordering::SeqCst);
        if let Some(msg) = self.fail_custom_domain.lock().clone() {
            return Err(EngineError::Transport(msg));
        }
        Ok(())
    }

    async fn history(&self) -> EngineResult<Vec<DeploymentRecord>> {
        self.calls.history.fetch_add(1, Ordering::SeqCst);
        Ok(self.remote_history.lock().clone())
    }

    async fn delete_deployment(&self, _id: &str) -> EngineResult<()> {
        self.calls.delete.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

pub fn test_config() -> EngineConfig {
    EngineConfig {
        deploy_api_base: "http://127.0.0.1:9/api".to_string(),
        upload_endpoint: "http://127.0.0.1:9/api/upload".to_string(),
        http_timeout_secs: 5,
        availability_debounce_ms: 500,
        site_file: None,
    }
}

/// A builder session over the scripted API and a memory gateway.
pub fn test_state(api: Arc<MockDeployApi>) -> BuilderState {
    BuilderState::with_backends(test_config(), api, Arc::new(MemoryGateway::new()))
        .expect("builder state")
}

/// Make a session publishable: one section, saved.
pub async fn seed_and_save(state: &BuilderState) {
    let page = state.store().current_page();
    state
        .store()
        .add_section_from_template(&page.id, "hero-split")
        .expect("seed section");
    state.store().save().await.expect("save");
}
