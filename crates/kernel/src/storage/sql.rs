//! PostgreSQL storage implementation.

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::PgPool;

use crate::models::{Atom, Item, Language, Page, Paragraph, Template};

use super::Storage;

/// Row loaders backed by the shared PostgreSQL pool.
#[derive(Debug, Clone)]
pub struct SqlStorage {
    pool: PgPool,
}

impl SqlStorage {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// The shared pool (health checks, ad-hoc queries).
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl Storage for SqlStorage {
    async fn load_languages(&self) -> Result<Vec<Language>> {
        let languages = sqlx::query_as::<_, Language>("SELECT id, code FROM language ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .context("failed to load languages")?;

        Ok(languages)
    }

    async fn load_atoms(&self) -> Result<Vec<Atom>> {
        let atoms = sqlx::query_as::<_, Atom>(
            "SELECT id, parent_id, sort_order, name, extension, size FROM atom ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await
        .context("failed to load atoms")?;

        Ok(atoms)
    }

    async fn load_templates(&self) -> Result<Vec<Template>> {
        let templates = sqlx::query_as::<_, Template>(
            "SELECT id, name, controller_name, view FROM template ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await
        .context("failed to load templates")?;

        Ok(templates)
    }

    async fn load_items(&self) -> Result<Vec<Item>> {
        let items = sqlx::query_as::<_, Item>(
            "SELECT id, template_id, parent_id, name, content, sort_order FROM item ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await
        .context("failed to load items")?;

        Ok(items)
    }

    async fn load_pages(&self) -> Result<Vec<Page>> {
        let pages = sqlx::query_as::<_, Page>(
            "SELECT id, item_id, language, link, title FROM page ORDER BY language, item_id",
        )
        .fetch_all(&self.pool)
        .await
        .context("failed to load pages")?;

        Ok(pages)
    }

    async fn load_page_content(&self, item_id: i64, language: &str) -> Result<Vec<Paragraph>> {
        let paragraphs = sqlx::query_as::<_, Paragraph>(
            "SELECT id, title, text, sort_order FROM paragraph \
             WHERE item_id = $1 AND language = $2 ORDER BY sort_order",
        )
        .bind(item_id)
        .bind(language)
        .fetch_all(&self.pool)
        .await
        .with_context(|| format!("failed to load content for page {language}/{item_id}"))?;

        Ok(paragraphs)
    }

    async fn load_domains(&self) -> Result<Vec<String>> {
        let domains: Vec<String> =
            sqlx::query_scalar("SELECT DISTINCT domain FROM account ORDER BY domain")
                .fetch_all(&self.pool)
                .await
                .context("failed to load domains")?;

        Ok(domains)
    }
}
