//! Data model shared by the content store and the publish pipeline.

mod deployment;
mod page;
mod section;
mod site;

pub use deployment::{DeployStatus, DeployType, DeploymentRecord, DnsInstructions};
pub use page::Page;
pub use section::{
    ActionButton, CategoryTag, CollectionItem, FaqEntry, NavLink, PricingColumn, Section,
    SectionType, StatEntry, TimelineEntry,
};
pub use site::SiteConfig;
