//! Site snapshot persistence.
//!
//! All snapshot reads and writes go through [`PersistenceGateway`] so the
//! backend can be swapped — memory for tests, a JSON file for local use,
//! a remote service in a host application — without touching call sites.

mod json_file;

use anyhow::Result;
use async_trait::async_trait;
use parking_lot::Mutex;

pub use json_file::JsonFileGateway;

use crate::models::SiteConfig;

/// Storage seam for whole-site snapshots.
#[async_trait]
pub trait PersistenceGateway: Send + Sync {
    /// Persist a snapshot. Saving the same snapshot twice yields the same
    /// stored state.
    async fn save(&self, snapshot: &SiteConfig) -> Result<()>;

    /// Return the last successfully saved snapshot, or `None` if nothing
    /// has been saved yet.
    async fn load(&self) -> Result<Option<SiteConfig>>;
}

/// In-memory gateway for tests and throwaway sessions.
#[derive(Default)]
pub struct MemoryGateway {
    slot: Mutex<Option<SiteConfig>>,
}

impl MemoryGateway {
    /// Create an empty gateway.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PersistenceGateway for MemoryGateway {
    async fn save(&self, snapshot: &SiteConfig) -> Result<()> {
        *self.slot.lock() = Some(snapshot.clone());
        Ok(())
    }

    async fn load(&self) -> Result<Option<SiteConfig>> {
        Ok(self.slot.lock().clone())
    }
}
