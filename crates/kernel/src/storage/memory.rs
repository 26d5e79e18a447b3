//! In-memory storage backed by fixture rows.
//!
//! Used by the integration tests and local demo seeding. Records the
//! order loaders are invoked in and can be told to fail a given step,
//! which is what the bootstrap-ordering and error-path tests hook into.

use std::collections::HashMap;
use std::collections::HashSet;

use anyhow::Result;
use async_trait::async_trait;
use parking_lot::Mutex;

use crate::models::{Atom, Item, Language, Page, Paragraph, Template};

use super::Storage;

/// Fixture-backed storage.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    languages: Vec<Language>,
    atoms: Vec<Atom>,
    templates: Vec<Template>,
    items: Vec<Item>,
    pages: Vec<Page>,
    content: HashMap<(i64, String), Vec<Paragraph>>,
    domains: Vec<String>,

    failing_steps: HashSet<&'static str>,
    calls: Mutex<Vec<String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_language(mut self, id: i64, code: &str) -> Self {
        self.languages.push(Language::new(id, code));
        self
    }

    pub fn with_atom(mut self, atom: Atom) -> Self {
        self.atoms.push(atom);
        self
    }

    pub fn with_template(mut self, id: i64, name: &str, controller_name: &str, view: &str) -> Self {
        self.templates.push(Template {
            id,
            name: name.to_string(),
            controller_name: controller_name.to_string(),
            view: view.to_string(),
            controller: None,
        });
        self
    }

    pub fn with_item(mut self, id: i64, template_id: i64, parent_id: i64, name: &str) -> Self {
        let sort_order = self.items.len() as i32;
        self.items.push(Item {
            id,
            template_id,
            parent_id,
            name: name.to_string(),
            content: String::new(),
            sort_order,
            parent: None,
        });
        self
    }

    pub fn with_page(mut self, item_id: i64, language: &str, link: &str, title: &str) -> Self {
        let id = self.pages.len() as i64 + 1;
        self.pages.push(Page {
            id,
            item_id,
            language: language.to_string(),
            link: link.to_string(),
            title: title.to_string(),
            content: Vec::new(),
            children: Vec::new(),
            root: None,
        });
        self
    }

    pub fn with_paragraph(mut self, item_id: i64, language: &str, text: &str) -> Self {
        let blocks = self
            .content
            .entry((item_id, language.to_string()))
            .or_default();
        blocks.push(Paragraph {
            id: blocks.len() as i64 + 1,
            title: String::new(),
            text: text.to_string(),
            sort_order: blocks.len() as i32,
        });
        self
    }

    pub fn with_domain(mut self, domain: &str) -> Self {
        self.domains.push(domain.to_string());
        self
    }

    /// Make the named loader (`"languages"`, `"atoms"`, ...) fail.
    pub fn failing_on(mut self, step: &'static str) -> Self {
        self.failing_steps.insert(step);
        self
    }

    /// Loader invocations seen so far, in order.
    pub fn call_log(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    fn record(&self, call: impl Into<String>) -> Result<()> {
        let call = call.into();
        let failing = self
            .failing_steps
            .iter()
            .any(|step| call.starts_with(step));
        self.calls.lock().push(call.clone());
        if failing {
            anyhow::bail!("fixture failure injected for '{call}'");
        }
        Ok(())
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn load_languages(&self) -> Result<Vec<Language>> {
        self.record("languages")?;
        Ok(self.languages.clone())
    }

    async fn load_atoms(&self) -> Result<Vec<Atom>> {
        self.record("atoms")?;
        Ok(self.atoms.clone())
    }

    async fn load_templates(&self) -> Result<Vec<Template>> {
        self.record("templates")?;
        Ok(self.templates.clone())
    }

    async fn load_items(&self) -> Result<Vec<Item>> {
        self.record("items")?;
        Ok(self.items.clone())
    }

    async fn load_pages(&self) -> Result<Vec<Page>> {
        self.record("pages")?;
        Ok(self.pages.clone())
    }

    async fn load_page_content(&self, item_id: i64, language: &str) -> Result<Vec<Paragraph>> {
        self.record(format!("content:{language}/{item_id}"))?;
        Ok(self
            .content
            .get(&(item_id, language.to_string()))
            .cloned()
            .unwrap_or_default())
    }

    async fn load_domains(&self) -> Result<Vec<String>> {
        self.record("domains")?;
        Ok(self.domains.clone())
    }
}
