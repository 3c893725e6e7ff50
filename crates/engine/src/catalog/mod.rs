//! Template catalog: section and page templates with editor field schemas.
//!
//! Provides:
//! - `SectionTemplate`: default data and field descriptors for one
//!   (type, variant) pair
//! - `PageTemplate`: a named list of section templates to seed a new page
//! - `TemplateCatalog`: immutable registry seeded at startup; the single
//!   source of truth for new-section defaults and for which fields the
//!   property editor shows

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};
use crate::models::{Page, Section, SectionType};

/// Editor control used for a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Text,
    Textarea,
    Image,
    Link,
    Color,
    Toggle,
    Number,
    Items,
    Buttons,
    Links,
    Columns,
    Stats,
    Timeline,
    Categories,
}

impl FieldKind {
    /// Whether the field holds an ordered record collection.
    pub fn is_collection(self) -> bool {
        matches!(
            self,
            FieldKind::Items
                | FieldKind::Buttons
                | FieldKind::Links
                | FieldKind::Columns
                | FieldKind::Stats
                | FieldKind::Timeline
                | FieldKind::Categories
        )
    }
}

/// One editable field of a (type, variant) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    /// Key in the section's data bag.
    pub name: String,
    /// Label shown in the property editor.
    pub label: String,
    pub kind: FieldKind,
}

impl FieldDescriptor {
    fn new(name: &str, label: &str, kind: FieldKind) -> Self {
        Self {
            name: name.to_string(),
            label: label.to_string(),
            kind,
        }
    }
}

/// Template for a single section variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionTemplate {
    /// Stable template id (e.g. "hero-split").
    pub id: String,
    /// Human-readable name.
    pub name: String,
    #[serde(rename = "type")]
    pub section_type: SectionType,
    pub variant: String,
    /// Data a freshly added section starts with.
    pub default_data: Map<String, Value>,
    /// Editable fields, in editor display order.
    pub fields: Vec<FieldDescriptor>,
}

/// Template for a new page: section templates instantiated in order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageTemplate {
    pub id: String,
    pub name: String,
    /// Section template ids, in display order.
    pub sections: Vec<String>,
}

/// Registry of section and page templates.
///
/// Seeded once at startup and never mutated afterwards; lookups are pure.
#[derive(Debug, Clone)]
pub struct TemplateCatalog {
    sections: Vec<SectionTemplate>,
    section_index: HashMap<String, usize>,
    pages: Vec<PageTemplate>,
    page_index: HashMap<String, usize>,
}

impl Default for TemplateCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateCatalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self {
            sections: Vec::new(),
            section_index: HashMap::new(),
            pages: Vec::new(),
            page_index: HashMap::new(),
        }
    }

    /// Create a catalog pre-populated with the standard section and page
    /// templates.
    pub fn with_standard_templates() -> Self {
        let mut catalog = Self::new();
        catalog.register_standard_sections();
        catalog.register_standard_pages();
        catalog
    }

    /// Register a section template. Re-registering an id replaces it.
    pub fn register_section(&mut self, template: SectionTemplate) {
        match self.section_index.get(&template.id) {
            Some(&idx) => self.sections[idx] = template,
            None => {
                self.section_index
                    .insert(template.id.clone(), self.sections.len());
                self.sections.push(template);
            }
        }
    }

    /// Register a page template. Re-registering an id replaces it.
    pub fn register_page(&mut self, template: PageTemplate) {
        match self.page_index.get(&template.id) {
            Some(&idx) => self.pages[idx] = template,
            None => {
                self.page_index
                    .insert(template.id.clone(), self.pages.len());
                self.pages.push(template);
            }
        }
    }

    /// All section templates, in registration (picker) order.
    pub fn templates(&self) -> &[SectionTemplate] {
        &self.sections
    }

    /// All page templates, in registration order.
    pub fn page_templates(&self) -> &[PageTemplate] {
        &self.pages
    }

    /// Look up a section template by id.
    pub fn section_template(&self, id: &str) -> Option<&SectionTemplate> {
        self.section_index.get(id).map(|&idx| &self.sections[idx])
    }

    /// Look up a page template by id.
    pub fn page_template(&self, id: &str) -> Option<&PageTemplate> {
        self.page_index.get(id).map(|&idx| &self.pages[idx])
    }

    /// Field descriptors for a (type, variant) pair.
    ///
    /// "Is this field editable" is answered here, never by probing a
    /// section's data bag.
    pub fn editor_schema(&self, section_type: SectionType, variant: &str) -> Option<&[FieldDescriptor]> {
        self.sections
            .iter()
            .find(|t| t.section_type == section_type && t.variant == variant)
            .map(|t| t.fields.as_slice())
    }

    /// Page template used when none is specified.
    pub fn default_page_template_id(&self) -> &str {
        "blank"
    }

    /// Instantiate a section from a template with fresh ids.
    pub fn new_section(&self, template_id: &str) -> EngineResult<Section> {
        let template = self.section_template(template_id).ok_or_else(|| {
            EngineError::Validation(format!("unknown section template '{template_id}'"))
        })?;

        let mut data = template.default_data.clone();
        freshen_collection_ids(&mut data);

        Ok(Section::new(
            template.section_type,
            template.variant.clone(),
            data,
        ))
    }

    /// Instantiate a page from a template. The slug is resolved and
    /// checked for conflicts by the content store before this is called.
    pub fn new_page(&self, name: &str, slug: &str, template_id: &str) -> EngineResult<Page> {
        let template = self.page_template(template_id).ok_or_else(|| {
            EngineError::Validation(format!("unknown page template '{template_id}'"))
        })?;

        let mut page = Page::new(name, slug);
        for section_template_id in &template.sections {
            page.sections.push(self.new_section(section_template_id)?);
        }

        Ok(page)
    }

    /// Register the standard section templates: one or two variants per
    /// section type, each with its default data and field descriptors.
    fn register_standard_sections(&mut self) {
        use FieldKind::*;

        self.register_section(SectionTemplate {
            id: "navbar-basic".to_string(),
            name: "Navigation bar".to_string(),
            section_type: SectionType::Navbar,
            variant: "basic".to_string(),
            default_data: as_map(json!({
                "logo_text": "Acme",
                "links": [
                    { "id": "link-1", "label": "Home", "href": "/home" },
                    { "id": "link-2", "label": "Pricing", "href": "#pricing" },
                    { "id": "link-3", "label": "Contact", "href": "#contact" }
                ],
                "sticky": true
            })),
            fields: vec![
                FieldDescriptor::new("logo_text", "Logo text", Text),
                FieldDescriptor::new("links", "Links", Links),
                FieldDescriptor::new("sticky", "Stick to top", Toggle),
            ],
        });

        self.register_section(SectionTemplate {
            id: "hero-split".to_string(),
            name: "Hero — split".to_string(),
            section_type: SectionType::Hero,
            variant: "split".to_string(),
            default_data: as_map(json!({
                "title": "Build something people want",
                "subtitle": "Launch your site in minutes, not weeks.",
                "image": "",
                "background_color": "#ffffff",
                "buttons": [
                    { "id": "btn-1", "label": "Get started", "href": "#pricing", "style": "primary" },
                    { "id": "btn-2", "label": "Learn more", "href": "#features", "style": "ghost" }
                ]
            })),
            fields: vec![
                FieldDescriptor::new("title", "Title", Text),
                FieldDescriptor::new("subtitle", "Subtitle", Textarea),
                FieldDescriptor::new("image", "Image", Image),
                FieldDescriptor::new("background_color", "Background color", Color),
                FieldDescriptor::new("buttons", "Buttons", Buttons),
            ],
        });

        self.register_section(SectionTemplate {
            id: "hero-centered".to_string(),
            name: "Hero — centered".to_string(),
            section_type: SectionType::Hero,
            variant: "centered".to_string(),
            default_data: as_map(json!({
                "title": "Welcome",
                "subtitle": "Everything you need, nothing you don't.",
                "background_image": "",
                "buttons": [
                    { "id": "btn-1", "label": "Get started", "href": "#pricing", "style": "primary" }
                ]
            })),
            fields: vec![
                FieldDescriptor::new("title", "Title", Text),
                FieldDescriptor::new("subtitle", "Subtitle", Textarea),
                FieldDescriptor::new("background_image", "Background image", Image),
                FieldDescriptor::new("buttons", "Buttons", Buttons),
            ],
        });

        self.register_section(SectionTemplate {
            id: "about-portrait".to_string(),
            name: "About — portrait".to_string(),
            section_type: SectionType::About,
            variant: "portrait".to_string(),
            default_data: as_map(json!({
                "title": "About us",
                "body": "We are a small team with a big mission.",
                "image": "",
                "stats": [
                    { "id": "stat-1", "label": "Customers", "value": "1,200+" },
                    { "id": "stat-2", "label": "Countries", "value": "14" }
                ]
            })),
            fields: vec![
                FieldDescriptor::new("title", "Title", Text),
                FieldDescriptor::new("body", "Body", Textarea),
                FieldDescriptor::new("image", "Image", Image),
                FieldDescriptor::new("stats", "Stats", Stats),
            ],
        });

        self.register_section(SectionTemplate {
            id: "about-timeline".to_string(),
            name: "About — timeline".to_string(),
            section_type: SectionType::About,
            variant: "timeline".to_string(),
            default_data: as_map(json!({
                "title": "Our story",
                "body": "How we got here.",
                "timeline": [
                    { "id": "tl-1", "title": "Founded", "date": "2019", "description": "Two people, one laptop." },
                    { "id": "tl-2", "title": "First customer", "date": "2020", "description": "" }
                ]
            })),
            fields: vec![
                FieldDescriptor::new("title", "Title", Text),
                FieldDescriptor::new("body", "Body", Textarea),
                FieldDescriptor::new("timeline", "Timeline", Timeline),
            ],
        });

        self.register_section(SectionTemplate {
            id: "features-grid".to_string(),
            name: "Features grid".to_string(),
            section_type: SectionType::Features,
            variant: "grid".to_string(),
            default_data: as_map(json!({
                "title": "Features",
                "subtitle": "",
                "items": [
                    { "id": "item-1", "title": "Fast", "description": "Ready in minutes.", "image": "", "href": "" },
                    { "id": "item-2", "title": "Flexible", "description": "Swap layouts any time.", "image": "", "href": "" },
                    { "id": "item-3", "title": "Yours", "description": "Custom domain included.", "image": "", "href": "" }
                ]
            })),
            fields: vec![
                FieldDescriptor::new("title", "Title", Text),
                FieldDescriptor::new("subtitle", "Subtitle", Textarea),
                FieldDescriptor::new("items", "Features", Items),
            ],
        });

        self.register_section(SectionTemplate {
            id: "services-cards".to_string(),
            name: "Services cards".to_string(),
            section_type: SectionType::Services,
            variant: "cards".to_string(),
            default_data: as_map(json!({
                "title": "Services",
                "items": [
                    { "id": "item-1", "title": "Consulting", "description": "", "image": "", "href": "" },
                    { "id": "item-2", "title": "Support", "description": "", "image": "", "href": "" }
                ]
            })),
            fields: vec![
                FieldDescriptor::new("title", "Title", Text),
                FieldDescriptor::new("items", "Services", Items),
            ],
        });

        self.register_section(SectionTemplate {
            id: "gallery-grid".to_string(),
            name: "Gallery grid".to_string(),
            section_type: SectionType::Gallery,
            variant: "grid".to_string(),
            default_data: as_map(json!({
                "title": "Gallery",
                "items": [
                    { "id": "item-1", "title": "", "description": "", "image": "", "href": "" }
                ],
                "categories": [
                    { "id": "cat-1", "label": "All" }
                ]
            })),
            fields: vec![
                FieldDescriptor::new("title", "Title", Text),
                FieldDescriptor::new("items", "Images", Items),
                FieldDescriptor::new("categories", "Categories", Categories),
            ],
        });

        self.register_section(SectionTemplate {
            id: "blog-list".to_string(),
            name: "Blog list".to_string(),
            section_type: SectionType::Blog,
            variant: "list".to_string(),
            default_data: as_map(json!({
                "title": "From the blog",
                "items": [
                    { "id": "item-1", "title": "Hello world", "description": "Our first post.", "image": "", "href": "" }
                ]
            })),
            fields: vec![
                FieldDescriptor::new("title", "Title", Text),
                FieldDescriptor::new("items", "Posts", Items),
            ],
        });

        self.register_section(SectionTemplate {
            id: "products-grid".to_string(),
            name: "Products grid".to_string(),
            section_type: SectionType::Products,
            variant: "grid".to_string(),
            default_data: as_map(json!({
                "title": "Products",
                "items": [
                    { "id": "item-1", "title": "Starter kit", "description": "$29", "image": "", "href": "" }
                ],
                "categories": [
                    { "id": "cat-1", "label": "All" }
                ]
            })),
            fields: vec![
                FieldDescriptor::new("title", "Title", Text),
                FieldDescriptor::new("items", "Products", Items),
                FieldDescriptor::new("categories", "Categories", Categories),
            ],
        });

        self.register_section(SectionTemplate {
            id: "pricing-columns".to_string(),
            name: "Pricing columns".to_string(),
            section_type: SectionType::Pricing,
            variant: "columns".to_string(),
            default_data: as_map(json!({
                "title": "Pricing",
                "subtitle": "Simple plans, no surprises.",
                "columns": [
                    {
                        "id": "col-1",
                        "title": "Free",
                        "price": "$0",
                        "period": "forever",
                        "features": ["1 site", "Subpath publishing"],
                        "cta_label": "Start free",
                        "cta_href": "#",
                        "highlighted": false
                    },
                    {
                        "id": "col-2",
                        "title": "Pro",
                        "price": "$12",
                        "period": "per month",
                        "features": ["Unlimited sites", "Custom domain", "Priority support"],
                        "cta_label": "Go Pro",
                        "cta_href": "#",
                        "highlighted": true
                    }
                ]
            })),
            fields: vec![
                FieldDescriptor::new("title", "Title", Text),
                FieldDescriptor::new("subtitle", "Subtitle", Textarea),
                FieldDescriptor::new("columns", "Plans", Columns),
            ],
        });

        self.register_section(SectionTemplate {
            id: "faq-accordion".to_string(),
            name: "FAQ accordion".to_string(),
            section_type: SectionType::Faq,
            variant: "accordion".to_string(),
            default_data: as_map(json!({
                "title": "Frequently asked questions",
                "items": [
                    { "id": "faq-1", "question": "Can I use my own domain?", "answer": "Yes, on any paid plan." },
                    { "id": "faq-2", "question": "Can I cancel anytime?", "answer": "Yes." }
                ]
            })),
            fields: vec![
                FieldDescriptor::new("title", "Title", Text),
                FieldDescriptor::new("items", "Questions", Items),
            ],
        });

        self.register_section(SectionTemplate {
            id: "team-grid".to_string(),
            name: "Team grid".to_string(),
            section_type: SectionType::Team,
            variant: "grid".to_string(),
            default_data: as_map(json!({
                "title": "The team",
                "items": [
                    { "id": "item-1", "title": "Alex Doe", "description": "Founder", "image": "", "href": "" }
                ]
            })),
            fields: vec![
                FieldDescriptor::new("title", "Title", Text),
                FieldDescriptor::new("items", "Members", Items),
            ],
        });

        self.register_section(SectionTemplate {
            id: "testimonials-carousel".to_string(),
            name: "Testimonials carousel".to_string(),
            section_type: SectionType::Testimonials,
            variant: "carousel".to_string(),
            default_data: as_map(json!({
                "title": "What customers say",
                "items": [
                    { "id": "item-1", "title": "Jamie L.", "description": "Shipped our site in an afternoon.", "image": "", "href": "" }
                ]
            })),
            fields: vec![
                FieldDescriptor::new("title", "Title", Text),
                FieldDescriptor::new("items", "Quotes", Items),
            ],
        });

        self.register_section(SectionTemplate {
            id: "contact-form".to_string(),
            name: "Contact form".to_string(),
            section_type: SectionType::Contact,
            variant: "form".to_string(),
            default_data: as_map(json!({
                "title": "Get in touch",
                "email": "hello@example.com",
                "phone": "",
                "address": "",
                "show_map": false
            })),
            fields: vec![
                FieldDescriptor::new("title", "Title", Text),
                FieldDescriptor::new("email", "Email", Text),
                FieldDescriptor::new("phone", "Phone", Text),
                FieldDescriptor::new("address", "Address", Textarea),
                FieldDescriptor::new("show_map", "Show map", Toggle),
            ],
        });

        self.register_section(SectionTemplate {
            id: "footer-columns".to_string(),
            name: "Footer".to_string(),
            section_type: SectionType::Footer,
            variant: "columns".to_string(),
            default_data: as_map(json!({
                "logo_text": "Acme",
                "copyright": "© Acme. All rights reserved.",
                "links": [
                    { "id": "link-1", "label": "Privacy", "href": "/privacy" },
                    { "id": "link-2", "label": "Terms", "href": "/terms" }
                ]
            })),
            fields: vec![
                FieldDescriptor::new("logo_text", "Logo text", Text),
                FieldDescriptor::new("copyright", "Copyright", Text),
                FieldDescriptor::new("links", "Links", Links),
            ],
        });
    }

    /// Register the standard page templates.
    fn register_standard_pages(&mut self) {
        self.register_page(PageTemplate {
            id: "blank".to_string(),
            name: "Blank page".to_string(),
            sections: vec![],
        });

        self.register_page(PageTemplate {
            id: "landing".to_string(),
            name: "Landing page".to_string(),
            sections: vec![
                "navbar-basic".to_string(),
                "hero-split".to_string(),
                "features-grid".to_string(),
                "pricing-columns".to_string(),
                "faq-accordion".to_string(),
                "footer-columns".to_string(),
            ],
        });

        self.register_page(PageTemplate {
            id: "storefront".to_string(),
            name: "Storefront".to_string(),
            sections: vec![
                "navbar-basic".to_string(),
                "hero-centered".to_string(),
                "products-grid".to_string(),
                "testimonials-carousel".to_string(),
                "contact-form".to_string(),
                "footer-columns".to_string(),
            ],
        });
    }
}

/// Replace the `id` of every record in every sub-collection with a fresh
/// one, so two sections instantiated from the same template never share
/// record ids.
fn freshen_collection_ids(data: &mut Map<String, Value>) {
    for value in data.values_mut() {
        let Value::Array(records) = value else {
            continue;
        };
        for record in records {
            if let Value::Object(fields) = record
                && fields.contains_key("id")
            {
                fields.insert("id".to_string(), Value::String(Uuid::now_v7().to_string()));
            }
        }
    }
}

/// Convert a `json!` object literal into a data bag.
fn as_map(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}
