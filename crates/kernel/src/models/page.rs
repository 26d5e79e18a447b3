//! Page records: the per-language, per-item rendered units.
//!
//! Pages are created during the page fetch, get their content in a second
//! pass, and are only navigable once the sitemap pass has attached
//! children and roots. Sitemap edges are stored as [`PageKey`]s, never as
//! references; they are derived data and recomputed wholesale on every
//! structural change.

use serde::{Deserialize, Serialize};

/// Identity of a page: one page per (language, item) pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PageKey {
    pub language: String,
    pub item_id: i64,
}

impl PageKey {
    pub fn new(language: impl Into<String>, item_id: i64) -> Self {
        Self {
            language: language.into(),
            item_id,
        }
    }
}

impl std::fmt::Display for PageKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.language, self.item_id)
    }
}

/// One block of page content, loaded in the second fetch pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Paragraph {
    pub id: i64,
    pub title: String,
    pub text: String,
    pub sort_order: i32,
}

/// Page record.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Page {
    /// Numeric identifier.
    pub id: i64,

    /// Owning item.
    pub item_id: i64,

    /// Language code.
    pub language: String,

    /// Url link segment (may be empty; the page is then reachable only
    /// via its item id).
    pub link: String,

    /// Localized title.
    pub title: String,

    /// Content blocks, filled by the second fetch pass.
    #[sqlx(skip)]
    #[serde(default)]
    pub content: Vec<Paragraph>,

    /// Child pages, derived by the sitemap pass.
    #[sqlx(skip)]
    #[serde(default)]
    pub children: Vec<PageKey>,

    /// Topmost ancestor page, derived by the sitemap pass.
    #[sqlx(skip)]
    #[serde(default)]
    pub root: Option<PageKey>,
}

impl Page {
    /// Identity key of this page.
    pub fn key(&self) -> PageKey {
        PageKey::new(self.language.clone(), self.item_id)
    }

    /// The resolved form of this page returned by lookup.
    ///
    /// Localization currently resolves to the page itself; this is the
    /// seam where a display substitute would hook in.
    pub fn display(&self) -> &Page {
        self
    }

    /// Total content payload size in bytes.
    pub fn content_length(&self) -> usize {
        self.content.iter().map(|p| p.text.len()).sum()
    }

    /// One-line summary used by the structure dump.
    pub fn short_string(&self) -> String {
        format!(
            "{}/{} '{}'{}",
            self.language,
            self.item_id,
            self.title,
            if self.link.is_empty() {
                String::new()
            } else {
                format!(" -> {}", self.link)
            }
        )
    }
}
