//! Request path parsing.
//!
//! A raw request path like `/mysite/fr/a-propos/edit` breaks down into an
//! optional application-name segment, an optional language segment, a link
//! segment, and trailing components. The parser has no access to the
//! loaded structure: a segment counts as a language when it has the shape
//! of a language code, and the repository's fallback cascade deals with
//! codes that turn out not to exist.

use serde::{Deserialize, Serialize};

/// Link served when the path carries no link segment.
pub const HOME_LINK: &str = "welcome";

/// A parsed request path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SitePath {
    /// Resolved language code (parsed or defaulted).
    pub language: String,

    /// Link or item-id segment.
    pub link: String,

    /// Remaining path components after the link.
    pub trail: Vec<String>,
}

impl SitePath {
    /// Parse a raw request path.
    ///
    /// The application-name prefix is stripped when present; a leading
    /// 2-3 letter lowercase segment is taken as the language, everything
    /// else falls back to `default_language`. An empty link resolves to
    /// [`HOME_LINK`].
    pub fn parse(raw: &str, app_name: &str, default_language: &str) -> Self {
        let decoded = urlencoding::decode(raw).map_or_else(|_| raw.to_string(), |s| s.into_owned());

        let mut segments = decoded
            .split('/')
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect::<Vec<_>>();

        if segments.first().map(String::as_str) == Some(app_name) {
            segments.remove(0);
        }

        let language = if segments.first().is_some_and(|s| is_language_code(s)) {
            segments.remove(0)
        } else {
            default_language.to_string()
        };

        let link = if segments.is_empty() {
            HOME_LINK.to_string()
        } else {
            segments.remove(0)
        };

        Self {
            language,
            link,
            trail: segments,
        }
    }

    /// Canonical lookup key into the url index.
    pub fn page_link(&self) -> String {
        format!("{}/{}", self.language, self.link)
    }
}

impl std::fmt::Display for SitePath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.page_link())?;
        for part in &self.trail {
            write!(f, "/{part}")?;
        }
        Ok(())
    }
}

/// Shape test for a language segment: 2-3 lowercase ASCII letters.
fn is_language_code(segment: &str) -> bool {
    (2..=3).contains(&segment.len()) && segment.bytes().all(|b| b.is_ascii_lowercase())
}
