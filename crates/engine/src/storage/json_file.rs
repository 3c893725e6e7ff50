//! JSON file snapshot storage.

use std::path::PathBuf;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::debug;

use crate::models::SiteConfig;

use super::PersistenceGateway;

/// Stores the site snapshot as a single pretty-printed JSON file.
pub struct JsonFileGateway {
    path: PathBuf,
}

impl JsonFileGateway {
    /// Create a gateway writing to `path`. The file is created on first
    /// save.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl PersistenceGateway for JsonFileGateway {
    async fn save(&self, snapshot: &SiteConfig) -> Result<()> {
        let json = serde_json::to_vec_pretty(snapshot).context("serialize site snapshot")?;

        // Write-then-rename so a crashed save never leaves a truncated
        // snapshot behind.
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, &json)
            .await
            .with_context(|| format!("write {}", tmp.display()))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .with_context(|| format!("rename into {}", self.path.display()))?;

        debug!(path = %self.path.display(), bytes = json.len(), "snapshot written");
        Ok(())
    }

    async fn load(&self) -> Result<Option<SiteConfig>> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(e).with_context(|| format!("read {}", self.path.display()));
            }
        };

        let snapshot = serde_json::from_slice(&bytes)
            .with_context(|| format!("parse {}", self.path.display()))?;
        Ok(Some(snapshot))
    }
}

#[cfg(test)]
// Tests are allowed to use unwrap/expect freely.
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn scratch_path() -> PathBuf {
        std::env::temp_dir().join(format!("sitewright-{}.json", Uuid::now_v7()))
    }

    #[tokio::test]
    async fn missing_file_loads_as_none() {
        let gateway = JsonFileGateway::new(scratch_path());
        assert!(gateway.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn save_then_load_round_trips() {
        let path = scratch_path();
        let gateway = JsonFileGateway::new(path.clone());

        let site = SiteConfig::default_site();
        gateway.save(&site).await.unwrap();
        assert_eq!(gateway.load().await.unwrap(), Some(site));

        tokio::fs::remove_file(&path).await.unwrap();
    }

    #[tokio::test]
    async fn corrupt_file_is_an_error_not_a_default() {
        let path = scratch_path();
        tokio::fs::write(&path, b"{ not json").await.unwrap();

        let gateway = JsonFileGateway::new(path.clone());
        assert!(gateway.load().await.is_err());

        tokio::fs::remove_file(&path).await.unwrap();
    }
}
