//! Sitewright engine
//!
//! Content model, template catalog, and publish pipeline behind the site
//! builder UI. Renderers and widgets live in the host application; they
//! read the model and drive it exclusively through the public operations
//! on [`content::ContentStore`] and [`publish::PublishCoordinator`],
//! composed by [`state::BuilderState`].

pub mod catalog;
pub mod config;
pub mod content;
pub mod error;
pub mod models;
pub mod publish;
pub mod state;
pub mod storage;
pub mod upload;

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize tracing for a host binary.
///
/// Respects `RUST_LOG`; defaults to `info`. Safe to call more than once —
/// later calls are no-ops.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}
