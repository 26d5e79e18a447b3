//! Sitemap derivation: children and root pointers over the loaded pages.
//!
//! Sitemap edges are derived, never authoritative. Every rebuild starts
//! from a clean slate and recomputes the whole structure; partial patching
//! would risk orphaned edges after structural changes.

use std::collections::{HashMap, HashSet};

use crate::models::{Item, Page, PageKey};

/// Recompute children lists and root pointers for every page.
///
/// Pages are processed in a deterministic order (language, item sort
/// order, item id), so children come out sorted and repeated rebuilds on
/// an unchanged index yield identical assignments.
pub(crate) fn rebuild(pages: &mut HashMap<PageKey, Page>, items: &HashMap<i64, Item>) {
    for page in pages.values_mut() {
        page.children.clear();
        page.root = None;
    }

    let mut keys: Vec<PageKey> = pages.keys().cloned().collect();
    keys.sort_by(|a, b| {
        let order_of = |key: &PageKey| {
            items
                .get(&key.item_id)
                .map_or((0, key.item_id), |i| (i.sort_order, i.id))
        };
        (a.language.as_str(), order_of(a)).cmp(&(b.language.as_str(), order_of(b)))
    });

    // Children: a page hangs under the page of its item's resolved parent
    // in the same language.
    for key in &keys {
        let Some(parent_id) = items.get(&key.item_id).and_then(|i| i.parent) else {
            continue;
        };
        let parent_key = PageKey::new(key.language.clone(), parent_id);
        if parent_key == *key {
            continue;
        }
        if let Some(parent_page) = pages.get_mut(&parent_key) {
            parent_page.children.push(key.clone());
        }
    }

    // Roots: walk each page's item ancestry to its toplevel.
    for key in &keys {
        let root_item = root_of(key.item_id, items);
        if let Some(page) = pages.get_mut(key) {
            page.root = Some(PageKey::new(key.language.clone(), root_item));
        }
    }
}

/// Topmost ancestor of an item, following resolved parents.
///
/// The visited set guards against parent cycles in bad content data.
fn root_of(item_id: i64, items: &HashMap<i64, Item>) -> i64 {
    let mut current = item_id;
    let mut seen = HashSet::new();

    while seen.insert(current) {
        match items.get(&current).and_then(|i| i.parent) {
            Some(parent) => current = parent,
            None => break,
        }
    }

    current
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn item(id: i64, parent: Option<i64>, sort_order: i32) -> Item {
        Item {
            id,
            template_id: 1,
            parent_id: parent.unwrap_or(id),
            name: format!("item {id}"),
            content: String::new(),
            sort_order,
            parent,
        }
    }

    fn page(item_id: i64, language: &str) -> Page {
        Page {
            id: item_id,
            item_id,
            language: language.to_string(),
            link: String::new(),
            title: format!("page {item_id}"),
            content: Vec::new(),
            children: Vec::new(),
            root: None,
        }
    }

    fn fixture() -> (HashMap<PageKey, Page>, HashMap<i64, Item>) {
        let mut items = HashMap::new();
        items.insert(1, item(1, None, 0));
        items.insert(5, item(5, Some(1), 2));
        items.insert(6, item(6, Some(1), 1));
        items.insert(7, item(7, Some(5), 0));

        let mut pages = HashMap::new();
        for id in [1, 5, 6, 7] {
            let p = page(id, "en");
            pages.insert(p.key(), p);
        }
        (pages, items)
    }

    #[test]
    fn children_follow_item_parents_in_sort_order() {
        let (mut pages, items) = fixture();
        rebuild(&mut pages, &items);

        let home = &pages[&PageKey::new("en", 1)];
        // Item 6 sorts before item 5.
        assert_eq!(
            home.children,
            vec![PageKey::new("en", 6), PageKey::new("en", 5)]
        );

        let five = &pages[&PageKey::new("en", 5)];
        assert_eq!(five.children, vec![PageKey::new("en", 7)]);
    }

    #[test]
    fn roots_point_at_the_toplevel_page() {
        let (mut pages, items) = fixture();
        rebuild(&mut pages, &items);

        assert_eq!(
            pages[&PageKey::new("en", 7)].root,
            Some(PageKey::new("en", 1))
        );
        assert_eq!(
            pages[&PageKey::new("en", 1)].root,
            Some(PageKey::new("en", 1))
        );
    }

    #[test]
    fn rebuild_is_idempotent() {
        let (mut pages, items) = fixture();
        rebuild(&mut pages, &items);

        let first: Vec<_> = {
            let mut keys: Vec<_> = pages.keys().cloned().collect();
            keys.sort_by_key(|k| (k.language.clone(), k.item_id));
            keys.iter()
                .map(|k| (pages[k].children.clone(), pages[k].root.clone()))
                .collect()
        };

        rebuild(&mut pages, &items);

        let second: Vec<_> = {
            let mut keys: Vec<_> = pages.keys().cloned().collect();
            keys.sort_by_key(|k| (k.language.clone(), k.item_id));
            keys.iter()
                .map(|k| (pages[k].children.clone(), pages[k].root.clone()))
                .collect()
        };

        assert_eq!(first, second);
    }

    #[test]
    fn parent_cycles_do_not_hang() {
        let mut items = HashMap::new();
        // 2 and 3 point at each other.
        items.insert(2, item(2, Some(3), 0));
        items.insert(3, item(3, Some(2), 0));

        let mut pages = HashMap::new();
        for id in [2, 3] {
            let p = page(id, "en");
            pages.insert(p.key(), p);
        }

        rebuild(&mut pages, &items);
        assert!(pages[&PageKey::new("en", 2)].root.is_some());
    }

    #[test]
    fn languages_stay_separate() {
        let mut items = HashMap::new();
        items.insert(1, item(1, None, 0));
        items.insert(5, item(5, Some(1), 0));

        let mut pages = HashMap::new();
        for lang in ["en", "fr"] {
            for id in [1, 5] {
                let p = page(id, lang);
                pages.insert(p.key(), p);
            }
        }

        rebuild(&mut pages, &items);

        assert_eq!(
            pages[&PageKey::new("en", 1)].children,
            vec![PageKey::new("en", 5)]
        );
        assert_eq!(
            pages[&PageKey::new("fr", 1)].children,
            vec![PageKey::new("fr", 5)]
        );
    }
}
