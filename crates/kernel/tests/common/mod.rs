#![allow(clippy::unwrap_used, clippy::expect_used)]
//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use struttura_kernel::config::Config;
use struttura_kernel::sequence::ErrorMode;
use struttura_kernel::site::HOME_PAGE;
use struttura_kernel::state::AppState;
use struttura_kernel::storage::MemoryStorage;

/// Configuration pointing at nothing real.
pub fn test_config() -> Config {
    Config {
        app_name: "mysite".to_string(),
        version: "0.0.0-test".to_string(),
        port: 0,
        database_url: "postgres://unused".to_string(),
        database_max_connections: 1,
        default_language: "en".to_string(),
        views_dir: PathBuf::from("./views"),
        load_error_mode: ErrorMode::Halt,
        dump_structures: false,
    }
}

/// A two-language site: a welcome page, an about page in both languages,
/// an English notfound page, and a login-gated dashboard.
pub fn seeded_storage() -> MemoryStorage {
    MemoryStorage::new()
        .with_language(1, "en")
        .with_language(2, "fr")
        .with_template(1, "Standard", "PageController", "page.html")
        .with_template(2, "Login", "LoginController", "-/login.html")
        .with_template(3, "Dashboard", "DashboardController", "dashboard.html")
        .with_item(HOME_PAGE, 1, HOME_PAGE, "Home")
        .with_item(2, 2, HOME_PAGE, "Login")
        .with_item(5, 1, HOME_PAGE, "About")
        .with_item(9, 3, HOME_PAGE, "Dashboard")
        .with_page(HOME_PAGE, "en", "welcome", "Welcome")
        .with_page(HOME_PAGE, "fr", "welcome", "Bienvenue")
        .with_page(2, "en", "login", "Log in")
        .with_page(2, "fr", "login", "Connexion")
        .with_page(5, "en", "about", "About us")
        .with_page(5, "fr", "a-propos", "Qui sommes-nous")
        .with_page(9, "en", "dashboard", "Dashboard")
        .with_page(7, "en", "notfound", "Not found")
        .with_item(7, 1, HOME_PAGE, "Not found")
        .with_paragraph(5, "en", "We make things.")
        .with_domain("example.com")
}

/// Application state over the seeded storage, structures loaded.
pub async fn seeded_state() -> AppState {
    let storage = Arc::new(seeded_storage());
    AppState::with_storage(test_config(), storage)
        .await
        .expect("state should load from seeded storage")
}
