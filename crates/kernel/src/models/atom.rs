//! Atom records: leaf content units (images and files).
//!
//! Atoms form a forest under two fixed roots. Children are never stored;
//! callers scan the atom index and filter by parent id, sorted by sort
//! order (see `SiteRepository::atom_children`).

use serde::{Deserialize, Serialize};

/// Root atom id for the image tree.
pub const IMAGE_ROOT: i64 = 1;

/// Root atom id for the file tree.
pub const FILE_ROOT: i64 = 2;

/// Atom record: image or file metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Atom {
    /// Numeric identifier.
    pub id: i64,

    /// Parent atom id ([`IMAGE_ROOT`] and [`FILE_ROOT`] are their own parents).
    pub parent_id: i64,

    /// Sort position among siblings.
    pub sort_order: i32,

    /// Display name.
    pub name: String,

    /// File extension (e.g., "jpg", "pdf"); empty for folders.
    pub extension: String,

    /// Size in bytes; 0 for folders.
    pub size: i64,
}

impl Atom {
    /// True if `child` hangs directly under this atom.
    pub fn is_parent_of(&self, child: &Atom) -> bool {
        child.parent_id == self.id && child.id != self.id
    }

    /// True for atoms without a file payload.
    pub fn is_folder(&self) -> bool {
        self.extension.is_empty()
    }

    /// True if this atom lives under the given fixed root.
    ///
    /// Only checks the direct parent; deep nesting goes through the
    /// repository's child scan.
    pub fn is_under(&self, root: i64) -> bool {
        self.parent_id == root
    }
}
