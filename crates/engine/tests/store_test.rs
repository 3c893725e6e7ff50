//! Integration tests for the content store.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use serde_json::{Map, Value, json};

use sitewright_engine::catalog::TemplateCatalog;
use sitewright_engine::content::{ChangeEvent, ContentStore};
use sitewright_engine::error::EngineError;
use sitewright_engine::models::{Section, SectionType, SiteConfig};
use sitewright_engine::storage::{MemoryGateway, PersistenceGateway};

fn store_with_gateway(gateway: Arc<dyn PersistenceGateway>) -> ContentStore {
    ContentStore::new(Arc::new(TemplateCatalog::with_standard_templates()), gateway)
}

fn store() -> ContentStore {
    store_with_gateway(Arc::new(MemoryGateway::new()))
}

fn fields(pairs: &[(&str, Value)]) -> Map<String, Value> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect()
}

/// A gateway whose every operation fails.
struct FailingGateway;

#[async_trait]
impl PersistenceGateway for FailingGateway {
    async fn save(&self, _snapshot: &SiteConfig) -> Result<()> {
        anyhow::bail!("backend unavailable")
    }

    async fn load(&self) -> Result<Option<SiteConfig>> {
        anyhow::bail!("backend unavailable")
    }
}

#[test]
fn fresh_store_holds_the_default_site() {
    let store = store();
    let site = store.snapshot();

    assert_eq!(site.pages.len(), 1);
    assert_eq!(site.current().slug, "home");
    assert!(site.current().sections.is_empty());
    assert!(!site.deployed);
    assert!(!store.has_unsaved_changes());
}

#[test]
fn add_section_rejects_duplicate_ids() {
    let store = store();
    let page = store.current_page();

    let section = Section::new(SectionType::Hero, "split", Map::new());
    let duplicate = section.clone();

    store.add_section(&page.id, section).expect("first add");
    assert!(store.has_unsaved_changes());

    let err = store.add_section(&page.id, duplicate).unwrap_err();
    assert!(matches!(err, EngineError::DuplicateId(_)));
    assert_eq!(store.current_page().sections.len(), 1);
}

#[test]
fn add_section_to_unknown_page_is_not_found() {
    let store = store();
    let section = Section::new(SectionType::Hero, "split", Map::new());

    let err = store.add_section("no-such-page", section).unwrap_err();
    assert!(matches!(err, EngineError::NotFound { kind: "page", .. }));
}

#[test]
fn section_ids_stay_unique_within_a_page() {
    let store = store();
    let page = store.current_page();

    for template in ["navbar-basic", "hero-split", "faq-accordion", "footer-columns"] {
        store
            .add_section_from_template(&page.id, template)
            .expect("add template section");
    }

    let section_ids: Vec<String> = store.current_page().section_ids();
    let unique: std::collections::HashSet<&String> = section_ids.iter().collect();
    assert_eq!(unique.len(), section_ids.len());
}

#[test]
fn update_section_merges_shallowly_and_replaces_arrays() {
    let store = store();
    let page = store.current_page();
    let section = store
        .add_section_from_template(&page.id, "hero-split")
        .expect("add section");

    store
        .update_section(
            &page.id,
            &section.id,
            fields(&[
                ("title", json!("New title")),
                ("buttons", json!([{ "id": "b1", "label": "Go", "href": "#", "style": "primary" }])),
            ]),
        )
        .expect("update");

    let updated = store.section(&page.id, &section.id).expect("section");
    assert_eq!(updated.data["title"], "New title");
    // Untouched keys survive the merge.
    assert_eq!(updated.data["subtitle"], section.data["subtitle"]);
    // The buttons array was replaced wholesale, not appended to.
    assert_eq!(updated.data["buttons"].as_array().map(Vec::len), Some(1));
}

#[test]
fn update_section_unknown_ids_are_not_found() {
    let store = store();
    let page = store.current_page();

    let err = store
        .update_section(&page.id, "missing", fields(&[("title", json!("x"))]))
        .unwrap_err();
    assert!(matches!(err, EngineError::NotFound { kind: "section", .. }));

    let err = store
        .update_section("missing", "missing", Map::new())
        .unwrap_err();
    assert!(matches!(err, EngineError::NotFound { kind: "page", .. }));
}

#[tokio::test]
async fn no_op_update_may_skip_the_dirty_flag() {
    let store = store();
    let page = store.current_page();
    let section = store
        .add_section_from_template(&page.id, "contact-form")
        .expect("add section");
    store.save().await.expect("save");
    assert!(!store.has_unsaved_changes());

    let same_value = section.data["email"].clone();
    store
        .update_section(&page.id, &section.id, fields(&[("email", same_value)]))
        .expect("no-op update");
    assert!(!store.has_unsaved_changes());
}

#[test]
fn remove_section_treats_every_section_as_ordinary() {
    let store = store();
    let page = store.current_page();
    let navbar = store
        .add_section_from_template(&page.id, "navbar-basic")
        .expect("navbar");

    store.remove_section(&page.id, &navbar.id).expect("remove navbar");
    assert!(store.current_page().sections.is_empty());

    let err = store.remove_section(&page.id, &navbar.id).unwrap_err();
    assert!(matches!(err, EngineError::NotFound { .. }));
}

#[test]
fn reorder_sections_requires_a_permutation() {
    let store = store();
    let page = store.current_page();
    for template in ["navbar-basic", "hero-split", "footer-columns"] {
        store
            .add_section_from_template(&page.id, template)
            .expect("add");
    }
    let ids = store.current_page().section_ids();

    // Reversing is a valid permutation.
    let reversed: Vec<String> = ids.iter().rev().cloned().collect();
    store.reorder_sections(&page.id, &reversed).expect("reorder");
    assert_eq!(store.current_page().section_ids(), reversed);

    // Too short.
    let err = store.reorder_sections(&page.id, &reversed[..2]).unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));

    // Duplicate entry.
    let mut duplicated = reversed.clone();
    duplicated[2] = duplicated[0].clone();
    let err = store.reorder_sections(&page.id, &duplicated).unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));

    // Foreign id.
    let mut foreign = reversed.clone();
    foreign[0] = "not-a-section".to_string();
    let err = store.reorder_sections(&page.id, &foreign).unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));

    // Failed reorders leave the order untouched.
    assert_eq!(store.current_page().section_ids(), reversed);
}

#[test]
fn add_page_derives_the_slug_and_rejects_collisions() {
    let store = store();

    let shop = store.add_page("Shop", None, "blank").expect("add Shop");
    assert_eq!(shop.slug, "shop");

    let err = store.add_page("Shop", None, "blank").unwrap_err();
    assert!(matches!(err, EngineError::SlugConflict(slug) if slug == "shop"));

    let err = store.add_page("Storefront", Some("shop"), "blank").unwrap_err();
    assert!(matches!(err, EngineError::SlugConflict(_)));

    assert_eq!(store.snapshot().pages.len(), 2);
}

#[test]
fn add_page_validates_name_slug_and_template() {
    let store = store();

    assert!(matches!(
        store.add_page("  ", None, "blank"),
        Err(EngineError::Validation(_))
    ));
    assert!(matches!(
        store.add_page("Shop", Some("Not A Slug"), "blank"),
        Err(EngineError::Validation(_))
    ));
    assert!(matches!(
        store.add_page("Shop", None, "no-such-template"),
        Err(EngineError::Validation(_))
    ));
}

#[test]
fn add_page_seeds_sections_from_the_template() {
    let store = store();
    let landing = store
        .add_page("Landing", None, "landing")
        .expect("add landing");

    assert_eq!(landing.sections.len(), 6);
    assert_eq!(landing.sections[0].section_type, SectionType::Navbar);
}

#[test]
fn switch_page_ignores_unknown_ids() {
    let store = store();
    let home = store.current_page();
    let shop = store.add_page("Shop", None, "blank").expect("add");

    store.switch_page("no-such-page");
    assert_eq!(store.current_page().id, home.id);

    store.switch_page(&shop.id);
    assert_eq!(store.current_page().id, shop.id);
}

#[test]
fn remove_page_guards_the_last_page_and_reassigns_current() {
    let store = store();
    let home = store.current_page();

    let err = store.remove_page(&home.id).unwrap_err();
    assert!(matches!(err, EngineError::LastPage));
    assert_eq!(store.snapshot().pages.len(), 1);

    let shop = store.add_page("Shop", None, "blank").expect("add");
    store.switch_page(&shop.id);

    // Removing the current page falls back to the first remaining page.
    store.remove_page(&shop.id).expect("remove current");
    let site = store.snapshot();
    assert_eq!(site.current_page, home.id);
    site.validate().expect("invariants hold");

    let err = store.remove_page("no-such-page").unwrap_err();
    assert!(matches!(err, EngineError::NotFound { .. }));
}

#[test]
fn current_page_never_dangles_across_removals() {
    let store = store();
    let mut page_ids = vec![store.current_page().id];
    for name in ["One", "Two", "Three"] {
        page_ids.push(store.add_page(name, None, "blank").expect("add").id);
    }

    for id in &page_ids[..3] {
        store.switch_page(id);
        store.remove_page(id).expect("remove");
        let site = store.snapshot();
        assert!(site.page(&site.current_page).is_some());
    }
}

#[tokio::test]
async fn save_clears_dirty_and_load_round_trips() {
    let gateway = Arc::new(MemoryGateway::new());
    let store = store_with_gateway(gateway);

    let page = store.current_page();
    store
        .add_section_from_template(&page.id, "pricing-columns")
        .expect("add");
    store.add_page("Shop", None, "storefront").expect("add page");
    assert!(store.has_unsaved_changes());

    store.save().await.expect("save");
    assert!(!store.has_unsaved_changes());
    let saved = store.snapshot();

    // load() restores exactly what was saved.
    store.switch_page("no-such-page");
    store.load().await.expect("load");
    assert_eq!(store.snapshot(), saved);
    assert!(!store.has_unsaved_changes());

    // save(load()) then load() is a fixed point.
    store.save().await.expect("save again");
    store.load().await.expect("load again");
    assert_eq!(store.snapshot(), saved);
}

#[tokio::test]
async fn failed_save_keeps_state_and_dirty_flag() {
    let store = store_with_gateway(Arc::new(FailingGateway));
    let page = store.current_page();
    store
        .add_section_from_template(&page.id, "hero-split")
        .expect("add");

    let before = store.snapshot();
    let err = store.save().await.unwrap_err();
    assert!(matches!(err, EngineError::Transport(_)));

    // The attempted state is still here for a retry.
    assert!(store.has_unsaved_changes());
    assert_eq!(store.snapshot(), before);
}

#[tokio::test]
async fn load_without_a_snapshot_installs_the_default_site() {
    let store = store();
    let page = store.current_page();
    store
        .add_section_from_template(&page.id, "hero-split")
        .expect("add");

    store.load().await.expect("load");
    let site = store.snapshot();
    assert_eq!(site.pages.len(), 1);
    assert_eq!(site.current().slug, "home");
    assert!(site.current().sections.is_empty());
}

#[tokio::test]
async fn load_rejects_invalid_snapshots_and_keeps_state() {
    let gateway = Arc::new(MemoryGateway::new());

    // Prime the gateway with a snapshot whose current page dangles.
    let mut bad = SiteConfig::default_site();
    bad.current_page = "dangling".to_string();
    gateway.save(&bad).await.expect("prime gateway");

    let store = store_with_gateway(gateway);
    let before = store.snapshot();

    let err = store.load().await.unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));
    assert_eq!(store.snapshot(), before);
}

#[test]
fn every_mutation_emits_exactly_one_event() {
    let store = store();
    let mut events = store.subscribe();
    let page = store.current_page();

    let section = store
        .add_section_from_template(&page.id, "faq-accordion")
        .expect("add");
    assert_eq!(
        events.try_recv().expect("event"),
        ChangeEvent::SectionAdded {
            page_id: page.id.clone(),
            section_id: section.id.clone(),
        }
    );

    store
        .update_section(&page.id, &section.id, fields(&[("title", json!("FAQ"))]))
        .expect("update");
    assert!(matches!(
        events.try_recv(),
        Ok(ChangeEvent::SectionUpdated { .. })
    ));

    // No-op merge: no event.
    store
        .update_section(&page.id, &section.id, fields(&[("title", json!("FAQ"))]))
        .expect("no-op update");
    assert!(events.try_recv().is_err());

    // Unknown switch: no event.
    store.switch_page("no-such-page");
    assert!(events.try_recv().is_err());
}

#[test]
fn readers_never_observe_a_partial_merge() {
    let store = Arc::new(store());
    let page = store.current_page();
    let section = store
        .add_section_from_template(&page.id, "hero-split")
        .expect("add");
    // Start from agreeing fields so the reader's check holds throughout.
    store
        .update_section(
            &page.id,
            &section.id,
            fields(&[("title", json!("gen-0")), ("subtitle", json!("gen-0"))]),
        )
        .expect("seed");

    let reader = {
        let store = Arc::clone(&store);
        let page_id = page.id.clone();
        let section_id = section.id.clone();
        std::thread::spawn(move || {
            for _ in 0..500 {
                let Some(section) = store.section(&page_id, &section_id) else {
                    continue;
                };
                let title = section.data.get("title").cloned();
                let subtitle = section.data.get("subtitle").cloned();
                // Both fields are merged in one call, so they always agree.
                assert_eq!(title, subtitle, "observed a half-applied update");
            }
        })
    };

    for i in 0..500 {
        let marker = json!(format!("gen-{i}"));
        store
            .update_section(
                &page.id,
                &section.id,
                fields(&[("title", marker.clone()), ("subtitle", marker)]),
            )
            .expect("update");
    }

    reader.join().expect("reader thread");
}
