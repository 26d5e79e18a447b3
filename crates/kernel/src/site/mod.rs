//! Site repository: all in-memory structure indexes plus the bootstrap
//! sequence that fills them.
//!
//! The fetch sequence runs in a fixed order because later steps depend on
//! earlier ones: languages → atoms → templates (bound against the
//! controller registry) → items (then parent resolution over the full
//! set) → pages (create, index, second content pass, sitemap) → forms
//! (placeholder) → domains. Requests are only served once the whole chain
//! has completed.

mod sitemap;

use std::collections::HashMap;

use tracing::{debug, info};

use crate::controller::ControllerRegistry;
use crate::error::LookupError;
use crate::models::{Atom, Item, Language, Page, PageKey, Template};
use crate::path::SitePath;
use crate::sequence::{self, BoxFuture, ErrorMode, SequenceError, StepFn};
use crate::storage::Storage;

/// Well-known content root item ids.
pub const NO_PAGE: i64 = -1;
pub const HOME_PAGE: i64 = 1;
pub const LOGIN_PAGE: i64 = 2;
pub const ORPHANS_PAGE: i64 = 3;
pub const FOOTER_PAGE: i64 = 4;
pub const DASHBOARD_PAGE: i64 = 9;
pub const GLOBAL_PAGE: i64 = 99;

/// The page chain a dispatch pass needs, cloned out of the indexes so the
/// repository lock is not held across controller awaits.
#[derive(Debug, Clone)]
pub struct ResolvedRequest {
    pub page: Page,
    pub item: Item,
    pub template: Template,
}

/// Owner of all in-memory structure indexes.
pub struct SiteRepository {
    default_language: String,

    languages: Vec<Language>,
    atoms: HashMap<i64, Atom>,
    templates: HashMap<i64, Template>,
    items: HashMap<i64, Item>,
    pages: HashMap<PageKey, Page>,
    urls: HashMap<String, PageKey>,
    domains: Vec<String>,

    controllers: ControllerRegistry,
}

/// Shared state for the bootstrap step pipeline.
struct Bootstrap<'a> {
    site: &'a mut SiteRepository,
    storage: &'a dyn Storage,
    mode: ErrorMode,
}

impl SiteRepository {
    pub fn new(default_language: impl Into<String>, controllers: ControllerRegistry) -> Self {
        Self {
            default_language: default_language.into(),
            languages: Vec::new(),
            atoms: HashMap::new(),
            templates: HashMap::new(),
            items: HashMap::new(),
            pages: HashMap::new(),
            urls: HashMap::new(),
            domains: Vec::new(),
            controllers,
        }
    }

    /// Run the fetch sequence, populating every index.
    ///
    /// Order matters; the steps run strictly sequentially through the
    /// pipeline driver. A step failure halts (or, in report-and-continue
    /// mode, is logged and surfaced after the remaining steps ran); either
    /// way a failed bootstrap never reports clean completion.
    pub async fn initialize(
        &mut self,
        storage: &dyn Storage,
        mode: ErrorMode,
    ) -> Result<(), SequenceError> {
        let mut boot = Bootstrap {
            site: self,
            storage,
            mode,
        };

        let steps: &[(&'static str, StepFn<Bootstrap<'_>>)] = &[
            ("languages", step_languages),
            ("atoms", step_atoms),
            ("templates", step_templates),
            ("items", step_items),
            ("pages", step_pages),
            ("forms", step_forms),
            ("domains", step_domains),
        ];

        sequence::do_list(&mut boot, steps, mode).await?;
        info!("finished loading the database structures");
        Ok(())
    }

    // --- Languages ---

    pub fn languages(&self) -> &[Language] {
        &self.languages
    }

    pub fn default_language(&self) -> &str {
        &self.default_language
    }

    pub fn is_default_language(&self, code: &str) -> bool {
        code == self.default_language
    }

    // --- Atoms ---

    pub fn atom(&self, id: i64) -> Option<&Atom> {
        self.atoms.get(&id)
    }

    /// Children of an atom, scanned lazily and sorted by sort order.
    pub fn atom_children(&self, parent_id: i64) -> Vec<&Atom> {
        let mut children: Vec<&Atom> = self
            .atoms
            .values()
            .filter(|a| a.parent_id == parent_id && a.id != parent_id)
            .collect();
        children.sort_by_key(|a| (a.sort_order, a.id));
        children
    }

    pub fn has_atom_children(&self, parent_id: i64) -> bool {
        self.atoms
            .values()
            .any(|a| a.parent_id == parent_id && a.id != parent_id)
    }

    // --- Templates ---

    pub fn template(&self, id: i64) -> Option<&Template> {
        self.templates.get(&id)
    }

    /// True if any item still references the template.
    pub fn template_used(&self, template_id: i64) -> bool {
        self.items.values().any(|i| i.template_id == template_id)
    }

    /// Remove a template, returning it if it existed. Callers check
    /// [`template_used`] first; items pointing at a removed template
    /// fail resolution with a typed miss.
    ///
    /// [`template_used`]: Self::template_used
    pub fn delete_template(&mut self, template_id: i64) -> Option<Template> {
        let removed = self.templates.remove(&template_id);
        if let Some(template) = &removed {
            info!(template = template.id, name = %template.name, "deleted template");
        }
        removed
    }

    // --- Items ---

    pub fn item(&self, id: i64) -> Option<&Item> {
        self.items.get(&id)
    }

    /// Add one item and resolve its parent against the current index.
    pub fn add_item(&mut self, mut item: Item) {
        item.pick_parent(&self.items);
        info!(item = item.id, name = %item.name, "added item");
        self.items.insert(item.id, item);
    }

    /// Remove an item; cascades to its pages in every language.
    pub fn delete_item(&mut self, item_id: i64) -> Option<Item> {
        let removed = self.items.remove(&item_id)?;
        self.delete_pages_for_item(item_id);
        Some(removed)
    }

    /// Resolve every item's parent reference.
    ///
    /// Runs once, strictly after the full item set is in memory, so
    /// forward references resolve the same as backward ones.
    fn resolve_item_parents(&mut self) {
        let snapshot = self.items.clone();
        for item in self.items.values_mut() {
            item.pick_parent(&snapshot);
        }
    }

    // --- Pages ---

    /// Page by (language, item id).
    pub fn page(&self, language: &str, item_id: i64) -> Option<&Page> {
        self.page_by_key(&format!("{language}/{item_id}"))
    }

    /// Page by raw url-index key (`language/link` or `language/itemId`).
    pub fn page_by_key(&self, key: &str) -> Option<&Page> {
        self.urls.get(key).and_then(|k| self.pages.get(k))
    }

    /// All loaded pages, in no particular order.
    pub fn pages(&self) -> impl Iterator<Item = &Page> {
        self.pages.values()
    }

    /// Add one page and relink everything.
    pub fn add_page(&mut self, page: Page) {
        debug!(page = %page.key(), "added page");
        self.pages.insert(page.key(), page);
        self.rebuild_url_index();
        self.rebuild_sitemap();
    }

    /// Remove an item's pages in every loaded language.
    pub fn delete_pages_for_item(&mut self, item_id: i64) {
        let before = self.pages.len();
        self.pages.retain(|key, _| key.item_id != item_id);
        info!(
            item = item_id,
            removed = before - self.pages.len(),
            "deleted pages for item"
        );
        self.rebuild_url_index();
        self.rebuild_sitemap();
    }

    /// Resolve a parsed path to a page with graduated fallback:
    /// exact `language/link`, then the language's `notfound` page, then
    /// its `welcome` page. Returns the display variant.
    pub fn lookup_page(&self, path: &SitePath) -> Result<&Page, LookupError> {
        let page_link = path.page_link();

        let found = self
            .page_by_key(&page_link)
            .or_else(|| {
                debug!(path = %page_link, "page not found, trying notfound fallback");
                self.page_by_key(&format!("{}/notfound", path.language))
            })
            .or_else(|| {
                debug!(path = %page_link, "trying welcome fallback");
                self.page_by_key(&format!("{}/welcome", path.language))
            });

        match found {
            Some(page) => Ok(page.display()),
            None => Err(LookupError::Page {
                language: path.language.clone(),
                page_link,
            }),
        }
    }

    /// Resolve a path all the way to its page/item/template chain,
    /// cloning the records out of the indexes.
    pub fn resolve(&self, path: &SitePath) -> Result<ResolvedRequest, LookupError> {
        let page = self.lookup_page(path)?.clone();
        let item = self
            .items
            .get(&page.item_id)
            .ok_or(LookupError::Item(page.item_id))?
            .clone();
        let template = self
            .templates
            .get(&item.template_id)
            .ok_or(LookupError::Template(item.template_id))?
            .clone();

        Ok(ResolvedRequest {
            page,
            item,
            template,
        })
    }

    /// Rebuild the url index from scratch.
    ///
    /// Always a wholesale replacement: partial patches would leave stale
    /// entries pointing at removed or relinked pages.
    fn rebuild_url_index(&mut self) {
        self.urls.clear();
        for (key, page) in &self.pages {
            self.urls
                .insert(format!("{}/{}", key.language, key.item_id), key.clone());
            if !page.link.is_empty() {
                self.urls
                    .insert(format!("{}/{}", key.language, page.link), key.clone());
            }
        }
    }

    /// Recompute all sitemap edges.
    pub fn rebuild_sitemap(&mut self) {
        sitemap::rebuild(&mut self.pages, &self.items);
    }

    // --- Domains / forms ---

    pub fn domains(&self) -> &[String] {
        &self.domains
    }

    /// Forms are not loaded yet; the index is always empty.
    pub fn get_form(&self, _form_id: i64) -> Option<&serde_json::Value> {
        None
    }

    // --- Diagnostics ---

    /// Log a structure dump: index sizes, controllers, and the page trees
    /// under the well-known roots for every language.
    pub fn dump(&self) {
        info!(
            languages = self.languages.len(),
            atoms = self.atoms.len(),
            templates = self.templates.len(),
            items = self.items.len(),
            pages = self.pages.len(),
            domains = self.domains.len(),
            "structure dump"
        );
        info!(controllers = ?self.controllers.names(), "registered controllers");

        let mut content_total = 0;
        for language in &self.languages {
            for (label, root) in [
                ("home", HOME_PAGE),
                ("dashboard", DASHBOARD_PAGE),
                ("footer", FOOTER_PAGE),
                ("orphans", ORPHANS_PAGE),
            ] {
                if let Some(page) = self.page(&language.code, root) {
                    content_total += self.dump_level(page, label, 0);
                }
            }
            for (label, id) in [("global", GLOBAL_PAGE), ("login", LOGIN_PAGE)] {
                match self.page(&language.code, id) {
                    Some(page) => info!("[{label}] {}", page.short_string()),
                    None => info!(language = %language.code, "[{label}] ** missing page **"),
                }
            }
        }
        info!(bytes = content_total, "total content");
    }

    fn dump_level(&self, page: &Page, label: &str, depth: usize) -> usize {
        info!("[{label}] {}{}", "  ".repeat(depth), page.short_string());
        let mut total = page.content_length();
        for child in &page.children {
            if let Some(child_page) = self.pages.get(child) {
                total += self.dump_level(child_page, label, depth + 1);
            }
        }
        total
    }
}

impl std::fmt::Debug for SiteRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SiteRepository")
            .field("default_language", &self.default_language)
            .field("languages", &self.languages.len())
            .field("atoms", &self.atoms.len())
            .field("templates", &self.templates.len())
            .field("items", &self.items.len())
            .field("pages", &self.pages.len())
            .field("urls", &self.urls.len())
            .field("domains", &self.domains.len())
            .finish()
    }
}

// --- Bootstrap steps ---

fn step_languages<'a>(boot: &'a mut Bootstrap<'_>) -> BoxFuture<'a, anyhow::Result<()>> {
    Box::pin(async move {
        let rows = boot.storage.load_languages().await?;
        info!(count = rows.len(), "fetched languages");
        boot.site.languages = rows;
        Ok(())
    })
}

fn step_atoms<'a>(boot: &'a mut Bootstrap<'_>) -> BoxFuture<'a, anyhow::Result<()>> {
    Box::pin(async move {
        let rows = boot.storage.load_atoms().await?;
        info!(count = rows.len(), "fetched atoms");
        boot.site.atoms = rows.into_iter().map(|a| (a.id, a)).collect();
        Ok(())
    })
}

fn step_templates<'a>(boot: &'a mut Bootstrap<'_>) -> BoxFuture<'a, anyhow::Result<()>> {
    Box::pin(async move {
        let rows = boot.storage.load_templates().await?;
        info!(count = rows.len(), "fetched templates");
        boot.site.templates = rows
            .into_iter()
            .map(|mut t| {
                t.bind_controller(&boot.site.controllers);
                (t.id, t)
            })
            .collect();
        Ok(())
    })
}

fn step_items<'a>(boot: &'a mut Bootstrap<'_>) -> BoxFuture<'a, anyhow::Result<()>> {
    Box::pin(async move {
        let rows = boot.storage.load_items().await?;
        info!(count = rows.len(), "fetched items");
        boot.site.items = rows.into_iter().map(|i| (i.id, i)).collect();
        // Parent resolution only after the full set is indexed.
        boot.site.resolve_item_parents();
        Ok(())
    })
}

fn step_pages<'a>(boot: &'a mut Bootstrap<'_>) -> BoxFuture<'a, anyhow::Result<()>> {
    Box::pin(async move {
        let rows = boot.storage.load_pages().await?;
        info!(count = rows.len(), "fetched pages");

        boot.site.pages.clear();
        let mut keys = Vec::with_capacity(rows.len());
        for page in rows {
            keys.push(page.key());
            boot.site.pages.insert(page.key(), page);
        }
        boot.site.rebuild_url_index();

        // Second pass: content per page, one at a time. The sitemap is
        // derived even when a page's content fetch failed.
        let mode = boot.mode;
        let content = sequence::each(&mut *boot, &keys, step_page_content, mode).await;
        boot.site.rebuild_sitemap();
        content?;
        Ok(())
    })
}

fn step_page_content<'a>(
    boot: &'a mut Bootstrap<'_>,
    key: &'a PageKey,
) -> BoxFuture<'a, anyhow::Result<()>> {
    Box::pin(async move {
        let blocks = boot
            .storage
            .load_page_content(key.item_id, &key.language)
            .await?;
        if let Some(page) = boot.site.pages.get_mut(key) {
            page.content = blocks;
        }
        Ok(())
    })
}

fn step_forms<'a>(_boot: &'a mut Bootstrap<'_>) -> BoxFuture<'a, anyhow::Result<()>> {
    Box::pin(async move {
        // Placeholder until forms come out of the store.
        debug!("forms fetch skipped (placeholder)");
        Ok(())
    })
}

fn step_domains<'a>(boot: &'a mut Bootstrap<'_>) -> BoxFuture<'a, anyhow::Result<()>> {
    Box::pin(async move {
        let rows = boot.storage.load_domains().await?;
        info!(count = rows.len(), "fetched domains");
        boot.site.domains = rows;
        Ok(())
    })
}
