//! Page model: an ordered list of sections plus routing metadata.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Section;

/// A single page of the site.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    /// Unique identifier across the site (UUIDv7).
    pub id: String,

    /// Display name shown in the page switcher.
    pub name: String,

    /// URL-safe slug, unique across all pages.
    pub slug: String,

    /// Sections in display order. Each section is exclusively owned by
    /// this page; other pages may reference it by id only.
    #[serde(default)]
    pub sections: Vec<Section>,
}

impl Page {
    /// Create an empty page with a fresh time-ordered id.
    pub fn new(name: impl Into<String>, slug: impl Into<String>) -> Self {
        Self {
            id: Uuid::now_v7().to_string(),
            name: name.into(),
            slug: slug.into(),
            sections: Vec::new(),
        }
    }

    /// Look up a section by id.
    pub fn section(&self, section_id: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.id == section_id)
    }

    /// Look up a section by id, mutably.
    pub fn section_mut(&mut self, section_id: &str) -> Option<&mut Section> {
        self.sections.iter_mut().find(|s| s.id == section_id)
    }

    /// Section ids in display order.
    pub fn section_ids(&self) -> Vec<String> {
        self.sections.iter().map(|s| s.id.clone()).collect()
    }
}
