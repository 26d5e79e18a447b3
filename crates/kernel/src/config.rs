//! Configuration loaded from environment variables.

use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::sequence::ErrorMode;

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Site name, used as the first url segment and the views namespace.
    pub app_name: String,

    /// Version string reported by the health endpoint.
    pub version: String,

    /// HTTP server port (default: 3000).
    pub port: u16,

    /// PostgreSQL connection URL.
    pub database_url: String,

    /// Maximum database connections in pool (default: 10).
    pub database_max_connections: u32,

    /// Language used when a url carries no language prefix (default: en).
    pub default_language: String,

    /// Path to the views directory (default: ./views).
    pub views_dir: PathBuf,

    /// How structure-fetch failures are treated at startup.
    pub load_error_mode: ErrorMode,

    /// Log a full structure dump after the fetch sequence (default: false).
    pub dump_structures: bool,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        let app_name = env::var("APP_NAME").context("APP_NAME environment variable is required")?;

        let version = env::var("APP_VERSION").unwrap_or_else(|_| "0.1.0".to_string());

        let port = env::var("PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse()
            .context("PORT must be a valid u16")?;

        let database_url =
            env::var("DATABASE_URL").context("DATABASE_URL environment variable is required")?;

        let database_max_connections = env::var("DATABASE_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "10".to_string())
            .parse()
            .context("DATABASE_MAX_CONNECTIONS must be a valid u32")?;

        let default_language = env::var("DEFAULT_LANGUAGE").unwrap_or_else(|_| "en".to_string());

        let views_dir = env::var("VIEWS_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./views"));

        let load_error_mode =
            ErrorMode::from_config(&env::var("LOAD_ERROR_MODE").unwrap_or_default());

        let dump_structures = env::var("DUMP_STRUCTURES")
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false);

        Ok(Self {
            app_name,
            version,
            port,
            database_url,
            database_max_connections,
            default_language,
            views_dir,
            load_error_mode,
            dump_structures,
        })
    }
}
