//! Routed file entities.

use std::path::{Path, PathBuf};

use crate::route::Route;

/// A leaf content unit attached to an item.
///
/// Identified by its route; `path` points at the file on disk.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct File {
    route: Route,
    path: PathBuf,
}

impl File {
    /// Create a file entity.
    #[must_use]
    pub fn new(route: Route, path: impl Into<PathBuf>) -> Self {
        Self {
            route,
            path: path.into(),
        }
    }

    /// Route identifying the file.
    #[must_use]
    pub fn route(&self) -> &Route {
        &self.route
    }

    /// Location on disk.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}
