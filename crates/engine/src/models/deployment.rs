//! Deployment bookkeeping records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The three publish strategies, increasing in setup cost and persistence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DeployType {
    /// Ephemeral deploy under a provider-chosen subpath.
    Subpath,
    /// Deploy under a user-chosen subdomain.
    Subdomain,
    /// A custom domain attached to an existing subdomain deployment.
    CustomDomain,
}

/// Status of a deployment attempt.
///
/// `deployed` and `failed` are terminal; `dns-pending` resolves on a later
/// history refresh once DNS propagation is observed by the deploy service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DeployStatus {
    Requested,
    Deployed,
    DnsPending,
    Failed,
}

impl DeployStatus {
    /// Whether the record can no longer change (other than deletion).
    pub fn is_terminal(self) -> bool {
        matches!(self, DeployStatus::Deployed | DeployStatus::Failed)
    }
}

/// DNS record the user must create for a custom domain to go live.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DnsInstructions {
    #[serde(rename = "type")]
    pub record_type: String,
    pub host: String,
    pub value: String,
    pub ttl: u32,
}

/// One attempt/result of publishing.
///
/// Created only by the publish coordinator; immutable once in a terminal
/// state, except for bookkeeping deletion. A `custom-domain` record's
/// `provider_site_id` always references a prior `subdomain` record —
/// custom domains are layered on subdomain deployments, never on subpath
/// deployments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentRecord {
    pub id: String,

    pub deploy_type: DeployType,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_url: Option<String>,

    pub status: DeployStatus,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subdomain: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_domain: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_site_id: Option<String>,

    pub created_at: DateTime<Utc>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dns_instructions: Option<DnsInstructions>,

    /// Backend or transport message for terminal `failed` records.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
