//! Deploy service HTTP client.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use crate::error::{EngineError, EngineResult};
use crate::models::DeploymentRecord;

/// Result of a successful deploy call.
#[derive(Debug, Clone)]
pub struct DeployOutcome {
    /// Public URL of the deployment.
    pub url: String,
    /// Provider-side site id, when the strategy yields one.
    pub site_id: Option<String>,
}

/// Seam to the remote deploy service. Implemented over HTTP in
/// production and scripted in tests.
#[async_trait]
pub trait DeployApi: Send + Sync {
    async fn publish_subpath(&self) -> EngineResult<DeployOutcome>;

    /// Whether a subdomain candidate is free to claim.
    async fn check_subdomain(&self, name: &str) -> EngineResult<bool>;

    async fn publish_subdomain(&self, subdomain: &str) -> EngineResult<DeployOutcome>;

    async fn attach_custom_domain(&self, site_id: &str, domain: &str) -> EngineResult<()>;

    async fn history(&self) -> EngineResult<Vec<DeploymentRecord>>;

    async fn delete_deployment(&self, id: &str) -> EngineResult<()>;
}

/// Wire envelope shared by the deploy endpoints.
#[derive(Debug, Deserialize)]
struct DeployEnvelope {
    success: bool,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    site_id: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

impl DeployEnvelope {
    fn failure_message(self) -> String {
        self.error
            .unwrap_or_else(|| "deploy service reported failure".to_string())
    }

    fn into_outcome(self) -> EngineResult<DeployOutcome> {
        if !self.success {
            return Err(EngineError::Transport(self.failure_message()));
        }
        let Some(url) = self.url else {
            return Err(EngineError::Transport(
                "deploy service returned success without a url".to_string(),
            ));
        };
        Ok(DeployOutcome {
            url,
            site_id: self.site_id,
        })
    }

    fn into_unit(self) -> EngineResult<()> {
        if !self.success {
            return Err(EngineError::Transport(self.failure_message()));
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct AvailabilityEnvelope {
    available: bool,
}

/// Production [`DeployApi`] over HTTP.
pub struct HttpDeployApi {
    client: reqwest::Client,
    base: String,
}

impl HttpDeployApi {
    /// Create a client against the service base URL.
    pub fn new(client: reqwest::Client, base: impl Into<String>) -> Self {
        let base = base.into().trim_end_matches('/').to_string();
        Self { client, base }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{path}", self.base)
    }
}

#[async_trait]
impl DeployApi for HttpDeployApi {
    async fn publish_subpath(&self) -> EngineResult<DeployOutcome> {
        let envelope: DeployEnvelope = self
            .client
            .post(self.endpoint("subpath"))
            .json(&json!({}))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        envelope.into_outcome()
    }

    async fn check_subdomain(&self, name: &str) -> EngineResult<bool> {
        let envelope: AvailabilityEnvelope = self
            .client
            .get(self.endpoint("check-subdomain"))
            .query(&[("name", name)])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(envelope.available)
    }

    async fn publish_subdomain(&self, subdomain: &str) -> EngineResult<DeployOutcome> {
        let envelope: DeployEnvelope = self
            .client
            .post(self.endpoint("subdomain"))
            .json(&json!({ "subdomain": subdomain }))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        envelope.into_outcome()
    }

    async fn attach_custom_domain(&self, site_id: &str, domain: &str) -> EngineResult<()> {
        let envelope: DeployEnvelope = self
            .client
            .post(self.endpoint("custom-domain"))
            .json(&json!({ "siteId": site_id, "domain": domain }))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        envelope.into_unit()
    }

    async fn history(&self) -> EngineResult<Vec<DeploymentRecord>> {
        let records = self
            .client
            .get(self.endpoint("history"))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(records)
    }

    async fn delete_deployment(&self, id: &str) -> EngineResult<()> {
        let envelope: DeployEnvelope = self
            .client
            .delete(self.endpoint(id))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        envelope.into_unit()
    }
}
