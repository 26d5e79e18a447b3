//! Item records: one content node per logical page across languages.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Item record.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Item {
    /// Numeric identifier.
    pub id: i64,

    /// Template this item renders through.
    pub template_id: i64,

    /// Raw parent id as stored.
    pub parent_id: i64,

    /// Display name.
    pub name: String,

    /// Content payload (shared across languages).
    pub content: String,

    /// Sort position among siblings; orders sitemap children.
    pub sort_order: i32,

    /// Parent id after resolution against the full item index; `None`
    /// marks a root. Only meaningful once [`Item::pick_parent`] has run,
    /// which the repository does strictly after all items are loaded.
    #[sqlx(skip)]
    #[serde(skip)]
    pub parent: Option<i64>,
}

impl Item {
    /// Resolve the parent reference from the id-indexed item mapping.
    ///
    /// An item whose `parent_id` resolves to no known item (or to itself)
    /// is a root.
    pub fn pick_parent(&mut self, items: &HashMap<i64, Item>) {
        self.parent = match items.get(&self.parent_id) {
            Some(parent) if parent.id != self.id => Some(parent.id),
            _ => None,
        };
    }

    /// True if this item has no resolvable parent.
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn item(id: i64, parent_id: i64) -> Item {
        Item {
            id,
            template_id: 1,
            parent_id,
            name: format!("item {id}"),
            content: String::new(),
            sort_order: 0,
            parent: None,
        }
    }

    #[test]
    fn pick_parent_resolves_known_ids() {
        let mut items = HashMap::new();
        items.insert(1, item(1, 1));
        items.insert(5, item(5, 1));

        let mut child = item(5, 1);
        child.pick_parent(&items);
        assert_eq!(child.parent, Some(1));
        assert!(!child.is_root());
    }

    #[test]
    fn missing_or_self_parent_makes_a_root() {
        let mut items = HashMap::new();
        items.insert(1, item(1, 1));

        let mut orphan = item(7, 999);
        orphan.pick_parent(&items);
        assert!(orphan.is_root());

        let mut selfie = item(1, 1);
        selfie.pick_parent(&items);
        assert!(selfie.is_root());
    }
}
