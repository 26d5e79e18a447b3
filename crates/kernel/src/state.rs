//! Application state shared across all handlers.

use std::sync::Arc;

use anyhow::{Context, Result};
use parking_lot::RwLock;
use sqlx::PgPool;
use tracing::info;

use crate::config::Config;
use crate::controller::ControllerRegistry;
use crate::db;
use crate::site::SiteRepository;
use crate::storage::{SqlStorage, Storage};
use crate::theme::ThemeEngine;

/// Shared application state.
///
/// Wrapped in Arc internally so Clone is cheap.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: Config,

    /// PostgreSQL connection pool, absent when storage is injected.
    db: Option<PgPool>,

    /// Structure store the site repository loads from.
    storage: Arc<dyn Storage>,

    /// All in-memory site structures.
    ///
    /// Uses `parking_lot::RwLock`: no poisoning, and the short read
    /// sections never hold the lock across an await.
    site: RwLock<SiteRepository>,

    /// View engine.
    theme: ThemeEngine,
}

impl AppState {
    /// Connect to PostgreSQL, run the structure fetch sequence, and load
    /// the views. A failed fetch is fatal here; requests are never served
    /// from a partially loaded site.
    pub async fn new(config: Config) -> Result<Self> {
        let pool = db::create_pool(&config).await?;
        let storage: Arc<dyn Storage> = Arc::new(SqlStorage::new(pool.clone()));

        let theme = ThemeEngine::new(&config.views_dir)?;

        Self::build(
            config,
            Some(pool),
            storage,
            theme,
            ControllerRegistry::with_defaults(),
        )
        .await
    }

    /// State over an injected storage backend, with no views loaded.
    pub async fn with_storage(config: Config, storage: Arc<dyn Storage>) -> Result<Self> {
        Self::with_controllers(config, storage, ControllerRegistry::with_defaults()).await
    }

    /// State over injected storage and a caller-supplied controller set.
    pub async fn with_controllers(
        config: Config,
        storage: Arc<dyn Storage>,
        controllers: ControllerRegistry,
    ) -> Result<Self> {
        Self::build(config, None, storage, ThemeEngine::empty(), controllers).await
    }

    async fn build(
        config: Config,
        pool: Option<PgPool>,
        storage: Arc<dyn Storage>,
        theme: ThemeEngine,
        controllers: ControllerRegistry,
    ) -> Result<Self> {
        let mut site = SiteRepository::new(&config.default_language, controllers);
        site.initialize(storage.as_ref(), config.load_error_mode)
            .await
            .context("failed to load the site structures")?;

        if config.dump_structures {
            site.dump();
        }
        info!(app = %config.app_name, "site structures ready");

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                db: pool,
                storage,
                site: RwLock::new(site),
                theme,
            }),
        })
    }

    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    pub fn app_name(&self) -> &str {
        &self.inner.config.app_name
    }

    pub fn default_language(&self) -> &str {
        &self.inner.config.default_language
    }

    pub fn db(&self) -> Option<&PgPool> {
        self.inner.db.as_ref()
    }

    pub fn storage(&self) -> &Arc<dyn Storage> {
        &self.inner.storage
    }

    pub fn site(&self) -> &RwLock<SiteRepository> {
        &self.inner.site
    }

    pub fn theme(&self) -> &ThemeEngine {
        &self.inner.theme
    }
}
