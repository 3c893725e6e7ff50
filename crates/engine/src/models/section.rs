//! Section model: a typed, styleable content block owned by a page.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// Closed set of section types the builder understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionType {
    Navbar,
    Hero,
    About,
    Features,
    Services,
    Gallery,
    Blog,
    Products,
    Pricing,
    Faq,
    Team,
    Testimonials,
    Contact,
    Footer,
}

impl SectionType {
    /// All section types, in the order the section picker presents them.
    pub const ALL: [SectionType; 14] = [
        SectionType::Navbar,
        SectionType::Hero,
        SectionType::About,
        SectionType::Features,
        SectionType::Services,
        SectionType::Gallery,
        SectionType::Blog,
        SectionType::Products,
        SectionType::Pricing,
        SectionType::Faq,
        SectionType::Team,
        SectionType::Testimonials,
        SectionType::Contact,
        SectionType::Footer,
    ];

    /// Machine name of the type (matches the serialized form).
    pub fn as_str(self) -> &'static str {
        match self {
            SectionType::Navbar => "navbar",
            SectionType::Hero => "hero",
            SectionType::About => "about",
            SectionType::Features => "features",
            SectionType::Services => "services",
            SectionType::Gallery => "gallery",
            SectionType::Blog => "blog",
            SectionType::Products => "products",
            SectionType::Pricing => "pricing",
            SectionType::Faq => "faq",
            SectionType::Team => "team",
            SectionType::Testimonials => "testimonials",
            SectionType::Contact => "contact",
            SectionType::Footer => "footer",
        }
    }
}

impl std::fmt::Display for SectionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single content block on a page.
///
/// `data` is an open attribute bag: a key's presence means the field is
/// editable and rendered, absence means it does not apply to this variant.
/// Which keys a variant carries is described by the template catalog's
/// field descriptors, not inferred from the bag itself. Sub-collections
/// (`items`, `buttons`, `links`, `columns`, `stats`, `timeline`,
/// `categories`) are ordered arrays of records carrying their own ids;
/// their order is user-visible and significant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    /// Unique identifier within the owning page (UUIDv7).
    pub id: String,

    /// Section type (closed enumeration).
    #[serde(rename = "type")]
    pub section_type: SectionType,

    /// Layout variant within the type.
    pub variant: String,

    /// Open attribute bag. Arrays are replaced wholesale on update, never
    /// deep-merged.
    #[serde(default)]
    pub data: Map<String, Value>,
}

impl Section {
    /// Create a section with a fresh time-ordered id.
    pub fn new(section_type: SectionType, variant: impl Into<String>, data: Map<String, Value>) -> Self {
        Self {
            id: Uuid::now_v7().to_string(),
            section_type,
            variant: variant.into(),
            data,
        }
    }

    /// Deserialize an ordered sub-collection.
    ///
    /// Returns an empty vector when the key is absent, not an array, or
    /// any record fails to deserialize — absence is not an error.
    pub fn collection<T: serde::de::DeserializeOwned>(&self, key: &str) -> Vec<T> {
        self.data
            .get(key)
            .and_then(|value| serde_json::from_value(value.clone()).ok())
            .unwrap_or_default()
    }

    /// Replace a sub-collection wholesale.
    pub fn set_collection<T: Serialize>(&mut self, key: &str, records: &[T]) -> serde_json::Result<()> {
        let value = serde_json::to_value(records)?;
        self.data.insert(key.to_string(), value);
        Ok(())
    }
}

/// A navigation link (navbar and footer `links` collections).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NavLink {
    pub id: String,
    pub label: String,
    /// Target href. May reference another page's slug (a back-reference by
    /// name, not ownership).
    pub href: String,
}

/// A call-to-action button (`buttons` collections).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionButton {
    pub id: String,
    pub label: String,
    pub href: String,
    #[serde(default)]
    pub style: String,
}

/// A generic card record (`items` collections: features, services,
/// gallery, blog, products, team, testimonials).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionItem {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub href: String,
}

/// A question/answer pair (FAQ `items`). Order is the display order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaqEntry {
    pub id: String,
    pub question: String,
    pub answer: String,
}

/// A pricing tier (`columns` collections).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingColumn {
    pub id: String,
    pub title: String,
    pub price: String,
    #[serde(default)]
    pub period: String,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default)]
    pub cta_label: String,
    #[serde(default)]
    pub cta_href: String,
    #[serde(default)]
    pub highlighted: bool,
}

/// A headline figure (`stats` collections).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatEntry {
    pub id: String,
    pub label: String,
    pub value: String,
}

/// A dated milestone (`timeline` collections).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineEntry {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub description: String,
}

/// A filter tag (`categories` collections).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryTag {
    pub id: String,
    pub label: String,
}
