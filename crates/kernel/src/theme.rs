//! Tera-backed view rendering.
//!
//! Views are addressed by relative path under the views directory, e.g.
//! `mysite/views/page.html` or `builtin/login.html`.

use std::path::Path;

use anyhow::{Context, Result};
use dashmap::DashMap;
use tera::Tera;
use tracing::debug;

/// View engine wrapping a Tera instance loaded from one directory tree.
pub struct ThemeEngine {
    tera: Tera,
    /// Cache of view-name existence checks.
    known_views: DashMap<String, bool>,
}

impl ThemeEngine {
    /// Load every `.html` view under the given directory.
    pub fn new(views_dir: &Path) -> Result<Self> {
        let pattern = views_dir.join("**/*.html");
        let pattern_str = pattern.to_str().context("invalid views directory path")?;

        let tera = Tera::new(pattern_str).context("failed to initialize Tera views")?;
        debug!(count = tera.get_template_names().count(), "loaded views");

        Ok(Self {
            tera,
            known_views: DashMap::new(),
        })
    }

    /// An engine with no views loaded (for testing).
    pub fn empty() -> Self {
        Self {
            tera: Tera::default(),
            known_views: DashMap::new(),
        }
    }

    /// True if a view with this name is loaded.
    pub fn has_view(&self, name: &str) -> bool {
        if let Some(known) = self.known_views.get(name) {
            return *known;
        }
        let exists = self.tera.get_template(name).is_ok();
        self.known_views.insert(name.to_string(), exists);
        exists
    }

    /// Render one view with the given context data.
    pub fn render_view(&self, name: &str, data: serde_json::Value) -> Result<String> {
        let context = tera::Context::from_value(data)
            .with_context(|| format!("invalid context for view {name}"))?;
        self.tera
            .render(name, &context)
            .with_context(|| format!("failed to render view {name}"))
    }
}
