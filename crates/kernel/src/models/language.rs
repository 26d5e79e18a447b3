//! Language records.
//!
//! Languages are loaded once at bootstrap and immutable afterwards; every
//! other record refers to a language by its code.

use serde::{Deserialize, Serialize};

/// Site language record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Language {
    /// Numeric identifier.
    pub id: i64,

    /// Language code (e.g., "en", "fr"); the key used in page links.
    pub code: String,
}

impl Language {
    pub fn new(id: i64, code: impl Into<String>) -> Self {
        Self {
            id,
            code: code.into(),
        }
    }
}
