//! Hierarchical file tree built from routed files.
//!
//! # Architecture
//!
//! Nodes are stored in a flat `Vec<FileNode>` with children tracked by
//! indices, the root at index 0. Each node keeps its children in insertion
//! order plus a segment-keyed `HashMap` for O(1) fan-out during lookups, so
//! `get_node` costs O(d) where d is the route depth.

use std::collections::HashMap;

use crate::file::File;
use crate::route::Route;

/// Error returned when building a file tree fails.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TreeError {
    /// Two files were inserted with the same route.
    #[error("Duplicate file at {0}")]
    DuplicateFile(Route),
}

#[derive(Debug)]
struct FileNode {
    route: Route,
    file: Option<File>,
    children: Vec<usize>,
    child_index: HashMap<String, usize>,
}

impl FileNode {
    fn new(route: Route) -> Self {
        Self {
            route,
            file: None,
            children: Vec::new(),
            child_index: HashMap::new(),
        }
    }
}

/// File tree with one node per route segment.
///
/// Built once from a flat file list and read-only afterwards.
#[derive(Debug)]
pub struct FileTree {
    nodes: Vec<FileNode>,
}

impl Default for FileTree {
    fn default() -> Self {
        Self::new()
    }
}

impl FileTree {
    /// Create a tree holding only the root node.
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: vec![FileNode::new(Route::root())],
        }
    }

    /// Build a tree from files in order.
    ///
    /// Sibling order follows the order of the input sequence.
    pub fn build(files: impl IntoIterator<Item = File>) -> Result<Self, TreeError> {
        let mut tree = Self::new();
        for file in files {
            tree.insert(file)?;
        }
        Ok(tree)
    }

    /// Insert a file, creating intermediate nodes as needed.
    pub fn insert(&mut self, file: File) -> Result<(), TreeError> {
        let mut current = 0;
        for segment in file.route().segments() {
            let existing = self.nodes[current].child_index.get(segment).copied();
            current = match existing {
                Some(child) => child,
                None => self.add_child(current, segment),
            };
        }

        let node = &mut self.nodes[current];
        if node.file.is_some() {
            return Err(TreeError::DuplicateFile(file.route().clone()));
        }
        node.file = Some(file);
        Ok(())
    }

    fn add_child(&mut self, parent: usize, segment: &str) -> usize {
        let idx = self.nodes.len();
        let route = self.nodes[parent].route.child(segment);
        self.nodes.push(FileNode::new(route));

        let parent = &mut self.nodes[parent];
        parent.children.push(idx);
        parent.child_index.insert(segment.to_owned(), idx);
        idx
    }

    /// Root node.
    #[must_use]
    pub fn root(&self) -> NodeRef<'_> {
        NodeRef { tree: self, idx: 0 }
    }

    /// Find the node for a route.
    ///
    /// Returns `None` if any segment along the way is missing.
    #[must_use]
    pub fn get_node(&self, route: &Route) -> Option<NodeRef<'_>> {
        let mut current = 0;
        for segment in route.segments() {
            current = *self.nodes[current].child_index.get(segment)?;
        }
        Some(NodeRef {
            tree: self,
            idx: current,
        })
    }

    /// Number of nodes, including the root.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the tree holds only the root node.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 1
    }
}

/// Borrowed view of a tree node.
#[derive(Clone, Copy, Debug)]
pub struct NodeRef<'a> {
    tree: &'a FileTree,
    idx: usize,
}

impl<'a> NodeRef<'a> {
    fn node(&self) -> &'a FileNode {
        &self.tree.nodes[self.idx]
    }

    /// Segment name (`""` for root).
    #[must_use]
    pub fn name(&self) -> &'a str {
        self.node().route.last_component_name()
    }

    /// Full route of the node.
    #[must_use]
    pub fn route(&self) -> &'a Route {
        &self.node().route
    }

    /// File associated with this node, if any.
    #[must_use]
    pub fn file(&self) -> Option<&'a File> {
        self.node().file.as_ref()
    }

    /// Whether the node has children.
    #[must_use]
    pub fn has_children(&self) -> bool {
        !self.node().children.is_empty()
    }

    /// Children in insertion order.
    pub fn children(&self) -> impl Iterator<Item = NodeRef<'a>> + 'a {
        let tree = self.tree;
        self.node()
            .children
            .iter()
            .map(move |&idx| NodeRef { tree, idx })
    }
}
