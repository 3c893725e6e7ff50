//! Whole-site snapshot and its structural invariants.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

use super::Page;

/// The whole-site snapshot: pages, the current-page pointer, and the
/// deployed flag.
///
/// Invariants (enforced by the content store, re-checked by
/// [`SiteConfig::validate`] on load):
/// - `pages` is never empty
/// - page ids and slugs are unique across the site
/// - section ids are unique within each page
/// - `current_page` resolves to an existing page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteConfig {
    pub pages: Vec<Page>,

    /// Id of the page currently open in the editor.
    pub current_page: String,

    /// Whether this site has ever been published.
    #[serde(default)]
    pub deployed: bool,
}

impl SiteConfig {
    /// The documented empty default: a single blank "Home" page.
    pub fn default_site() -> Self {
        let home = Page::new("Home", "home");
        let current_page = home.id.clone();
        Self {
            pages: vec![home],
            current_page,
            deployed: false,
        }
    }

    /// Look up a page by id.
    pub fn page(&self, page_id: &str) -> Option<&Page> {
        self.pages.iter().find(|p| p.id == page_id)
    }

    /// Look up a page by id, mutably.
    pub fn page_mut(&mut self, page_id: &str) -> Option<&mut Page> {
        self.pages.iter_mut().find(|p| p.id == page_id)
    }

    /// Resolve the current page.
    ///
    /// The store never lets `current_page` dangle and never empties
    /// `pages`; the first page is a deterministic fallback for snapshots
    /// that bypassed validation.
    pub fn current(&self) -> &Page {
        self.page(&self.current_page).unwrap_or(&self.pages[0])
    }

    /// Total number of sections across all pages.
    pub fn section_count(&self) -> usize {
        self.pages.iter().map(|p| p.sections.len()).sum()
    }

    /// Check the structural invariants. Used before installing an
    /// externally loaded snapshot.
    pub fn validate(&self) -> EngineResult<()> {
        if self.pages.is_empty() {
            return Err(EngineError::Validation(
                "site must contain at least one page".to_string(),
            ));
        }

        let mut page_ids = HashSet::new();
        let mut slugs = HashSet::new();
        for page in &self.pages {
            if !page_ids.insert(page.id.as_str()) {
                return Err(EngineError::DuplicateId(page.id.clone()));
            }
            if !slugs.insert(page.slug.as_str()) {
                return Err(EngineError::SlugConflict(page.slug.clone()));
            }

            let mut section_ids = HashSet::new();
            for section in &page.sections {
                if !section_ids.insert(section.id.as_str()) {
                    return Err(EngineError::DuplicateId(section.id.clone()));
                }
            }
        }

        if !page_ids.contains(self.current_page.as_str()) {
            return Err(EngineError::Validation(format!(
                "current page '{}' does not resolve to any page",
                self.current_page
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
// Tests are allowed to use unwrap/expect freely.
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::models::{Section, SectionType};
    use serde_json::Map;

    #[test]
    fn default_site_is_valid() {
        let site = SiteConfig::default_site();
        site.validate().unwrap();
        assert_eq!(site.pages.len(), 1);
        assert_eq!(site.current().slug, "home");
        assert!(!site.deployed);
    }

    #[test]
    fn validate_rejects_duplicate_slugs() {
        let mut site = SiteConfig::default_site();
        let mut other = Page::new("Other", "home");
        other.slug = "home".to_string();
        site.pages.push(other);

        assert!(matches!(
            site.validate(),
            Err(EngineError::SlugConflict(slug)) if slug == "home"
        ));
    }

    #[test]
    fn validate_rejects_duplicate_section_ids() {
        let mut site = SiteConfig::default_site();
        let section = Section::new(SectionType::Hero, "split", Map::new());
        let mut duplicate = section.clone();
        duplicate.variant = "centered".to_string();
        site.pages[0].sections.push(section);
        site.pages[0].sections.push(duplicate);

        assert!(matches!(site.validate(), Err(EngineError::DuplicateId(_))));
    }

    #[test]
    fn validate_rejects_dangling_current_page() {
        let mut site = SiteConfig::default_site();
        site.current_page = "no-such-page".to_string();

        assert!(matches!(site.validate(), Err(EngineError::Validation(_))));
    }

    #[test]
    fn validate_rejects_empty_page_list() {
        let mut site = SiteConfig::default_site();
        site.pages.clear();

        assert!(matches!(site.validate(), Err(EngineError::Validation(_))));
    }
}
