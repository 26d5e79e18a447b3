//! Storage collaborator: row loaders over the shared connection.
//!
//! Record shapes are the model structs; the repository only cares that
//! each loader delivers a full set of rows. The SQL implementation runs
//! over the process-wide pool created once at startup and never closed.

pub mod memory;
pub mod sql;

use async_trait::async_trait;

use crate::models::{Atom, Item, Language, Page, Paragraph, Template};

pub use memory::MemoryStorage;
pub use sql::SqlStorage;

/// Row loaders for the bootstrap fetch sequence.
#[async_trait]
pub trait Storage: Send + Sync {
    async fn load_languages(&self) -> anyhow::Result<Vec<Language>>;

    async fn load_atoms(&self) -> anyhow::Result<Vec<Atom>>;

    async fn load_templates(&self) -> anyhow::Result<Vec<Template>>;

    async fn load_items(&self) -> anyhow::Result<Vec<Item>>;

    async fn load_pages(&self) -> anyhow::Result<Vec<Page>>;

    /// Second pass: content blocks for one page.
    async fn load_page_content(&self, item_id: i64, language: &str)
    -> anyhow::Result<Vec<Paragraph>>;

    async fn load_domains(&self) -> anyhow::Result<Vec<String>>;
}
