//! Read-only item index.
//!
//! An [`Index`] is one content generation: the item tree plus route lookups.
//! It is built once and shared between request handlers behind an `Arc`;
//! nothing mutates it after construction.

use std::collections::{BTreeMap, HashMap};

use crate::file::File;
use crate::item::{Item, ItemType};
use crate::route::Route;
use crate::tag::Tag;

/// Item tree with O(1) route lookups.
///
/// Lookups store the child-index path from the root to each item, so the tree
/// itself keeps plain parent-owns-children ownership.
#[derive(Debug)]
pub struct Index {
    root: Item,
    items: HashMap<Route, Vec<usize>>,
    files: HashMap<Route, (Vec<usize>, usize)>,
}

impl Default for Index {
    fn default() -> Self {
        Self::empty()
    }
}

impl Index {
    /// Build an index over an item tree.
    #[must_use]
    pub fn new(root: Item) -> Self {
        let mut items = HashMap::new();
        let mut files = HashMap::new();
        let mut position = Vec::new();
        collect_locations(&root, &mut position, &mut items, &mut files);

        Self { root, items, files }
    }

    /// Index holding only an empty root repository item.
    #[must_use]
    pub fn empty() -> Self {
        Self::new(Item::new(Route::root(), "", ItemType::Repository))
    }

    /// Root item.
    #[must_use]
    pub fn root(&self) -> &Item {
        &self.root
    }

    /// Item at a route.
    #[must_use]
    pub fn get(&self, route: &Route) -> Option<&Item> {
        self.items.get(route).map(|path| self.resolve(path))
    }

    /// File at a route.
    #[must_use]
    pub fn file(&self, route: &Route) -> Option<&File> {
        self.files
            .get(route)
            .map(|(path, idx)| &self.resolve(path).files[*idx])
    }

    fn resolve(&self, path: &[usize]) -> &Item {
        path.iter().fold(&self.root, |item, &i| &item.children[i])
    }

    /// All items in pre-order.
    #[must_use]
    pub fn items(&self) -> Vec<&Item> {
        let mut items = Vec::with_capacity(self.items.len());
        self.root.walk(&mut |item| items.push(item));
        items
    }

    /// All files in item pre-order.
    #[must_use]
    pub fn files(&self) -> Vec<&File> {
        let mut files = Vec::with_capacity(self.files.len());
        self.root.walk(&mut |item| files.extend(item.files.iter()));
        files
    }

    /// Items grouped by tag, tags in name order.
    #[must_use]
    pub fn tags(&self) -> BTreeMap<&Tag, Vec<&Item>> {
        let mut tags: BTreeMap<&Tag, Vec<&Item>> = BTreeMap::new();
        self.root.walk(&mut |item| {
            for tag in &item.meta.tags {
                tags.entry(tag).or_default().push(item);
            }
        });
        tags
    }

    /// Number of items, including the root.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the index holds only the root item without content.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.root.children.is_empty() && self.root.body.is_empty()
    }
}

fn collect_locations(
    item: &Item,
    position: &mut Vec<usize>,
    items: &mut HashMap<Route, Vec<usize>>,
    files: &mut HashMap<Route, (Vec<usize>, usize)>,
) {
    if items.contains_key(&item.route) {
        tracing::warn!(route = %item.route, "Duplicate item route, keeping first");
    } else {
        items.insert(item.route.clone(), position.clone());
    }

    for (idx, file) in item.files.iter().enumerate() {
        files
            .entry(file.route().clone())
            .or_insert_with(|| (position.clone(), idx));
    }

    for (idx, child) in item.children.iter().enumerate() {
        position.push(idx);
        collect_locations(child, position, items, files);
        position.pop();
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::item::MetaData;

    static_assertions::assert_impl_all!(Index: Send, Sync);

    fn route(path: &str) -> Route {
        Route::parse(path).unwrap()
    }

    fn tagged(path: &str, tags: &[&str]) -> Item {
        let meta = MetaData {
            tags: tags.iter().map(|t| Tag::new(t).unwrap()).collect::<BTreeSet<_>>(),
            ..MetaData::default()
        };
        Item::new(route(path), path, ItemType::Document).with_meta(meta)
    }

    fn sample() -> Index {
        let root = Item::new(Route::root(), "Home", ItemType::Repository)
            .with_child(
                tagged("a", &["rust"])
                    .with_file(File::new(route("a/files/x.png"), "/repo/a/files/x.png"))
                    .with_child(tagged("a/b", &["rust", "web"])),
            )
            .with_child(tagged("c", &[]));
        Index::new(root)
    }

    #[test]
    fn test_get_by_route() {
        let index = sample();

        assert_eq!(index.get(&route("a/b")).unwrap().title, "a/b");
        assert_eq!(index.get(&Route::root()).unwrap().title, "Home");
        assert!(index.get(&route("missing")).is_none());
        assert_eq!(index.len(), 4);
    }

    #[test]
    fn test_file_by_route() {
        let index = sample();

        let file = index.file(&route("a/files/x.png")).unwrap();

        assert_eq!(file.route(), &route("a/files/x.png"));
        assert!(index.file(&route("a/files/y.png")).is_none());
        assert_eq!(index.files().len(), 1);
    }

    #[test]
    fn test_items_pre_order() {
        let index = sample();

        let routes: Vec<String> = index.items().iter().map(|i| i.route.value()).collect();

        assert_eq!(routes, vec!["", "a", "a/b", "c"]);
    }

    #[test]
    fn test_tags_grouping() {
        let index = sample();

        let tags: Vec<(String, usize)> = index
            .tags()
            .into_iter()
            .map(|(tag, items)| (tag.name().to_owned(), items.len()))
            .collect();

        assert_eq!(tags, vec![("rust".to_owned(), 2), ("web".to_owned(), 1)]);
    }

    #[test]
    fn test_empty_index() {
        let index = Index::empty();

        assert!(index.is_empty());
        assert_eq!(index.len(), 1);
        assert!(index.files().is_empty());
    }
}
