//! Content store: the mutable site model behind the builder UI.
//!
//! The store has a single logical owner (the UI's event turn). All
//! mutations are synchronous and atomic — each one takes the write lock,
//! so a reader never observes a half-applied multi-field merge. Saving
//! and loading are async and delegate to the persistence gateway.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use parking_lot::RwLock;
use serde_json::{Map, Value};
use tokio::sync::broadcast;
use tracing::{debug, info};

use crate::catalog::TemplateCatalog;
use crate::content::slug::{derive_slug, is_url_safe_slug};
use crate::error::{EngineError, EngineResult};
use crate::models::{Page, Section, SiteConfig};
use crate::storage::PersistenceGateway;

/// Broadcast capacity for change events. A UI that falls this far behind
/// re-reads a snapshot anyway.
const EVENT_CAPACITY: usize = 64;

/// Change notification emitted after every successful mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeEvent {
    /// The whole config was replaced (load).
    SiteReplaced,
    PageAdded { page_id: String },
    PageRemoved { page_id: String },
    PageSwitched { page_id: String },
    SectionAdded { page_id: String, section_id: String },
    SectionUpdated { page_id: String, section_id: String },
    SectionRemoved { page_id: String, section_id: String },
    SectionsReordered { page_id: String },
    Saved,
}

struct StoreInner {
    site: SiteConfig,
    dirty: bool,
    /// Bumped on every mutation; lets `save` detect edits that raced the
    /// gateway round trip.
    revision: u64,
}

/// The mutable site model and all CRUD/reorder operations on it.
///
/// Constructed per builder session; independent instances share nothing.
pub struct ContentStore {
    catalog: Arc<TemplateCatalog>,
    gateway: Arc<dyn PersistenceGateway>,
    inner: RwLock<StoreInner>,
    events: broadcast::Sender<ChangeEvent>,
}

impl ContentStore {
    /// Create a store holding the default site (one blank "Home" page).
    pub fn new(catalog: Arc<TemplateCatalog>, gateway: Arc<dyn PersistenceGateway>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            catalog,
            gateway,
            inner: RwLock::new(StoreInner {
                site: SiteConfig::default_site(),
                dirty: false,
                revision: 0,
            }),
            events,
        }
    }

    /// Subscribe to change events. Every successful mutation emits exactly
    /// one event; no-op calls emit none.
    pub fn subscribe(&self) -> broadcast::Receiver<ChangeEvent> {
        self.events.subscribe()
    }

    /// Clone of the full site snapshot.
    pub fn snapshot(&self) -> SiteConfig {
        self.inner.read().site.clone()
    }

    /// True from the first mutation after the last successful save until
    /// the next successful save.
    pub fn has_unsaved_changes(&self) -> bool {
        self.inner.read().dirty
    }

    /// Clone of the page currently open in the editor.
    pub fn current_page(&self) -> Page {
        self.inner.read().site.current().clone()
    }

    /// Clone of a page by id.
    pub fn page(&self, page_id: &str) -> Option<Page> {
        self.inner.read().site.page(page_id).cloned()
    }

    /// Clone of a section by page and section id.
    pub fn section(&self, page_id: &str, section_id: &str) -> Option<Section> {
        self.inner
            .read()
            .site
            .page(page_id)
            .and_then(|p| p.section(section_id))
            .cloned()
    }

    /// Total number of sections across all pages.
    pub fn section_count(&self) -> usize {
        self.inner.read().site.section_count()
    }

    /// Append a section to a page.
    pub fn add_section(&self, page_id: &str, section: Section) -> EngineResult<()> {
        let section_id = section.id.clone();
        {
            let mut inner = self.inner.write();
            let page = inner
                .site
                .page_mut(page_id)
                .ok_or_else(|| EngineError::not_found("page", page_id))?;

            if page.section(&section.id).is_some() {
                return Err(EngineError::DuplicateId(section.id));
            }
            page.sections.push(section);
            inner.mark_changed();
        }

        info!(page_id = %page_id, section_id = %section_id, "section added");
        self.emit(ChangeEvent::SectionAdded {
            page_id: page_id.to_string(),
            section_id,
        });
        Ok(())
    }

    /// Instantiate a catalog template and append it to a page.
    pub fn add_section_from_template(
        &self,
        page_id: &str,
        template_id: &str,
    ) -> EngineResult<Section> {
        let section = self.catalog.new_section(template_id)?;
        self.add_section(page_id, section.clone())?;
        Ok(section)
    }

    /// Shallow-merge fields into a section's data bag.
    ///
    /// Top-level keys are replaced wholesale — arrays and nested objects
    /// are never deep-merged. A merge that changes nothing leaves the
    /// dirty flag alone and emits no event.
    pub fn update_section(
        &self,
        page_id: &str,
        section_id: &str,
        partial: Map<String, Value>,
    ) -> EngineResult<()> {
        {
            let mut inner = self.inner.write();
            let page = inner
                .site
                .page_mut(page_id)
                .ok_or_else(|| EngineError::not_found("page", page_id))?;
            let section = page
                .section_mut(section_id)
                .ok_or_else(|| EngineError::not_found("section", section_id))?;

            let mut changed = false;
            for (key, value) in partial {
                if section.data.get(&key) != Some(&value) {
                    changed = true;
                }
                section.data.insert(key, value);
            }

            if !changed {
                debug!(page_id = %page_id, section_id = %section_id, "update changed nothing");
                return Ok(());
            }
            inner.mark_changed();
        }

        self.emit(ChangeEvent::SectionUpdated {
            page_id: page_id.to_string(),
            section_id: section_id.to_string(),
        });
        Ok(())
    }

    /// Remove a section by id. Every section is ordinary — there is no
    /// special casing for navbars or footers.
    pub fn remove_section(&self, page_id: &str, section_id: &str) -> EngineResult<()> {
        {
            let mut inner = self.inner.write();
            let page = inner
                .site
                .page_mut(page_id)
                .ok_or_else(|| EngineError::not_found("page", page_id))?;

            let idx = page
                .sections
                .iter()
                .position(|s| s.id == section_id)
                .ok_or_else(|| EngineError::not_found("section", section_id))?;
            page.sections.remove(idx);
            inner.mark_changed();
        }

        info!(page_id = %page_id, section_id = %section_id, "section removed");
        self.emit(ChangeEvent::SectionRemoved {
            page_id: page_id.to_string(),
            section_id: section_id.to_string(),
        });
        Ok(())
    }

    /// Replace a page's section order.
    ///
    /// `ordered_ids` must be a permutation of the page's current section
    /// ids; the page is left untouched otherwise.
    pub fn reorder_sections(&self, page_id: &str, ordered_ids: &[String]) -> EngineResult<()> {
        {
            let mut inner = self.inner.write();
            let page = inner
                .site
                .page_mut(page_id)
                .ok_or_else(|| EngineError::not_found("page", page_id))?;

            if ordered_ids.len() != page.sections.len() {
                return Err(EngineError::Validation(format!(
                    "order lists {} ids but the page has {} sections",
                    ordered_ids.len(),
                    page.sections.len()
                )));
            }

            let existing: HashSet<&str> = page.sections.iter().map(|s| s.id.as_str()).collect();
            let mut requested = HashSet::with_capacity(ordered_ids.len());
            for id in ordered_ids {
                if !requested.insert(id.as_str()) {
                    return Err(EngineError::Validation(format!(
                        "duplicate section id in order: {id}"
                    )));
                }
                if !existing.contains(id.as_str()) {
                    return Err(EngineError::Validation(format!(
                        "order references a section not on the page: {id}"
                    )));
                }
            }

            let index: HashMap<&str, usize> = ordered_ids
                .iter()
                .enumerate()
                .map(|(i, id)| (id.as_str(), i))
                .collect();
            page.sections
                .sort_by_key(|s| index.get(s.id.as_str()).copied().unwrap_or(usize::MAX));
            inner.mark_changed();
        }

        self.emit(ChangeEvent::SectionsReordered {
            page_id: page_id.to_string(),
        });
        Ok(())
    }

    /// Create a page from a catalog template and add it to the site.
    ///
    /// The slug is derived from the name when not supplied; a colliding
    /// slug is a hard error, never auto-suffixed.
    pub fn add_page(
        &self,
        name: &str,
        slug: Option<&str>,
        template_id: &str,
    ) -> EngineResult<Page> {
        if name.trim().is_empty() {
            return Err(EngineError::Validation(
                "page name must not be empty".to_string(),
            ));
        }

        let slug = match slug {
            Some(explicit) => {
                if !is_url_safe_slug(explicit) {
                    return Err(EngineError::Validation(format!(
                        "slug '{explicit}' is not URL-safe"
                    )));
                }
                explicit.to_string()
            }
            None => {
                let derived = derive_slug(name);
                if derived.is_empty() {
                    return Err(EngineError::Validation(format!(
                        "name '{name}' does not yield a usable slug"
                    )));
                }
                derived
            }
        };

        let page = {
            let mut inner = self.inner.write();
            if inner.site.pages.iter().any(|p| p.slug == slug) {
                return Err(EngineError::SlugConflict(slug));
            }

            let page = self.catalog.new_page(name, &slug, template_id)?;
            inner.site.pages.push(page.clone());
            inner.mark_changed();
            page
        };

        info!(page_id = %page.id, slug = %page.slug, "page added");
        self.emit(ChangeEvent::PageAdded {
            page_id: page.id.clone(),
        });
        Ok(page)
    }

    /// Make a page current. Unknown ids are ignored — this is called from
    /// navigation handlers and must never throw.
    pub fn switch_page(&self, page_id: &str) {
        {
            let mut inner = self.inner.write();
            if inner.site.page(page_id).is_none() {
                debug!(page_id = %page_id, "switch_page ignored: unknown page");
                return;
            }
            if inner.site.current_page == page_id {
                return;
            }
            inner.site.current_page = page_id.to_string();
            inner.mark_changed();
        }

        self.emit(ChangeEvent::PageSwitched {
            page_id: page_id.to_string(),
        });
    }

    /// Remove a page. Removing the last page is a hard error; removing
    /// the current page reassigns `current_page` to the first remaining
    /// page.
    pub fn remove_page(&self, page_id: &str) -> EngineResult<()> {
        {
            let mut inner = self.inner.write();
            let idx = inner
                .site
                .pages
                .iter()
                .position(|p| p.id == page_id)
                .ok_or_else(|| EngineError::not_found("page", page_id))?;

            if inner.site.pages.len() == 1 {
                return Err(EngineError::LastPage);
            }

            inner.site.pages.remove(idx);
            if inner.site.current_page == page_id {
                inner.site.current_page = inner.site.pages[0].id.clone();
            }
            inner.mark_changed();
        }

        info!(page_id = %page_id, "page removed");
        self.emit(ChangeEvent::PageRemoved {
            page_id: page_id.to_string(),
        });
        Ok(())
    }

    /// Persist the current snapshot through the gateway.
    ///
    /// On success the dirty flag clears — unless an edit raced the
    /// gateway round trip, in which case the store stays dirty. On
    /// failure local state is untouched and the error propagates.
    pub async fn save(&self) -> EngineResult<()> {
        let (snapshot, revision) = {
            let inner = self.inner.read();
            (inner.site.clone(), inner.revision)
        };

        self.gateway
            .save(&snapshot)
            .await
            .map_err(|e| EngineError::Transport(format!("save failed: {e:#}")))?;

        {
            let mut inner = self.inner.write();
            if inner.revision == revision {
                inner.dirty = false;
            } else {
                debug!("config changed while saving; keeping dirty flag");
            }
        }

        info!("site configuration saved");
        self.emit(ChangeEvent::Saved);
        Ok(())
    }

    /// Replace the in-memory config with the gateway's last snapshot, or
    /// the default site if nothing has been saved yet.
    ///
    /// An invalid snapshot is rejected and the current state kept.
    pub async fn load(&self) -> EngineResult<()> {
        let loaded = self
            .gateway
            .load()
            .await
            .map_err(|e| EngineError::Transport(format!("load failed: {e:#}")))?;

        let site = match loaded {
            Some(snapshot) => {
                snapshot.validate()?;
                snapshot
            }
            None => SiteConfig::default_site(),
        };

        {
            let mut inner = self.inner.write();
            inner.site = site;
            inner.dirty = false;
            inner.revision += 1;
        }

        info!("site configuration loaded");
        self.emit(ChangeEvent::SiteReplaced);
        Ok(())
    }

    /// Record that the site has been published at least once.
    ///
    /// Deployment status is bookkeeping, not user content: the dirty flag
    /// stays as it is.
    pub fn mark_deployed(&self) {
        self.inner.write().site.deployed = true;
    }

    fn emit(&self, event: ChangeEvent) {
        // Nobody subscribed is fine.
        let _ = self.events.send(event);
    }
}

impl StoreInner {
    fn mark_changed(&mut self) {
        self.dirty = true;
        self.revision += 1;
    }
}

impl std::fmt::Debug for ContentStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.read();
        f.debug_struct("ContentStore")
            .field("pages", &inner.site.pages.len())
            .field("dirty", &inner.dirty)
            .finish()
    }
}
