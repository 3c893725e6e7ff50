//! Builder session state shared with the host UI.
//!
//! One `BuilderState` per builder session; independent sessions (and
//! tests) share nothing. Wrapped in Arc internally so Clone is cheap.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::info;

use crate::catalog::TemplateCatalog;
use crate::config::EngineConfig;
use crate::content::ContentStore;
use crate::error::{EngineError, EngineResult};
use crate::models::DeploymentRecord;
use crate::publish::{DeployApi, HttpDeployApi, PublishCoordinator};
use crate::storage::{JsonFileGateway, MemoryGateway, PersistenceGateway};
use crate::upload::UploadService;

/// Shared builder session state.
#[derive(Clone)]
pub struct BuilderState {
    inner: Arc<BuilderStateInner>,
}

struct BuilderStateInner {
    config: EngineConfig,
    catalog: Arc<TemplateCatalog>,
    store: ContentStore,
    publisher: PublishCoordinator,
    uploader: UploadService,
}

impl BuilderState {
    /// Build a session from configuration: HTTP deploy client, JSON file
    /// gateway when a site file is configured, memory gateway otherwise.
    pub fn new(config: EngineConfig) -> Result<Self> {
        let client = http_client(&config)?;
        let api: Arc<dyn DeployApi> =
            Arc::new(HttpDeployApi::new(client, &config.deploy_api_base));

        let gateway: Arc<dyn PersistenceGateway> = match &config.site_file {
            Some(path) => Arc::new(JsonFileGateway::new(path.clone())),
            None => Arc::new(MemoryGateway::new()),
        };

        Self::with_backends(config, api, gateway)
    }

    /// Build a session with explicit backends. Used by tests and by hosts
    /// that bring their own gateway or deploy client.
    pub fn with_backends(
        config: EngineConfig,
        api: Arc<dyn DeployApi>,
        gateway: Arc<dyn PersistenceGateway>,
    ) -> Result<Self> {
        let client = http_client(&config)?;
        let catalog = Arc::new(TemplateCatalog::with_standard_templates());
        let store = ContentStore::new(catalog.clone(), gateway);
        let publisher =
            PublishCoordinator::new(api, Duration::from_millis(config.availability_debounce_ms));
        let uploader = UploadService::new(client, config.upload_endpoint.clone());

        info!("builder session initialized");
        Ok(Self {
            inner: Arc::new(BuilderStateInner {
                config,
                catalog,
                store,
                publisher,
                uploader,
            }),
        })
    }

    /// Engine configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.inner.config
    }

    /// Template catalog.
    pub fn catalog(&self) -> &TemplateCatalog {
        &self.inner.catalog
    }

    /// Content store.
    pub fn store(&self) -> &ContentStore {
        &self.inner.store
    }

    /// Publish coordinator.
    pub fn publisher(&self) -> &PublishCoordinator {
        &self.inner.publisher
    }

    /// Upload client.
    pub fn uploader(&self) -> &UploadService {
        &self.inner.uploader
    }

    /// Publish under an ephemeral subpath, after the content gate.
    pub async fn publish_subpath(&self) -> EngineResult<Option<DeploymentRecord>> {
        self.ensure_publishable()?;
        let record = self.inner.publisher.publish_subpath().await?;
        if record.is_some() {
            self.inner.store.mark_deployed();
        }
        Ok(record)
    }

    /// Publish under a chosen subdomain, after the content gate.
    pub async fn publish_subdomain(
        &self,
        candidate: &str,
    ) -> EngineResult<Option<DeploymentRecord>> {
        self.ensure_publishable()?;
        let record = self.inner.publisher.publish_subdomain(candidate).await?;
        if record.is_some() {
            self.inner.store.mark_deployed();
        }
        Ok(record)
    }

    /// Attach a custom domain, after the content gate.
    pub async fn attach_custom_domain(
        &self,
        site_id: &str,
        domain: &str,
    ) -> EngineResult<Option<DeploymentRecord>> {
        self.ensure_publishable()?;
        let record = self
            .inner
            .publisher
            .attach_custom_domain(site_id, domain)
            .await?;
        if record.is_some() {
            self.inner.store.mark_deployed();
        }
        Ok(record)
    }

    /// Publishing is disallowed while the store has unsaved changes or
    /// the site has no sections. Checked here, before any network call —
    /// the coordinator does not re-derive this gate.
    fn ensure_publishable(&self) -> EngineResult<()> {
        if self.inner.store.has_unsaved_changes() {
            return Err(EngineError::Precondition(
                "save changes before publishing".to_string(),
            ));
        }
        if self.inner.store.section_count() == 0 {
            return Err(EngineError::Precondition(
                "add at least one section before publishing".to_string(),
            ));
        }
        Ok(())
    }
}

fn http_client(config: &EngineConfig) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(config.http_timeout_secs))
        .build()
        .context("build HTTP client")
}

impl std::fmt::Debug for BuilderState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BuilderState")
            .field("store", &self.inner.store)
            .finish()
    }
}
