//! Content items and their metadata.

use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use chrono::NaiveDate;

use crate::file::File;
use crate::route::Route;
use crate::tag::Tag;
use crate::view::ViewModel;

/// Declared type of an item.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum ItemType {
    /// Regular document.
    #[default]
    Document,
    /// Slide presentation.
    Presentation,
    /// Short message or post.
    Message,
    /// General content container (directory without its own document).
    Repository,
    /// Type name nobody knows how to render.
    Unknown(String),
}

impl ItemType {
    /// Parse a type name from metadata (case-insensitive).
    #[must_use]
    pub fn parse(name: &str) -> Self {
        match name.trim().to_lowercase().as_str() {
            "document" => Self::Document,
            "presentation" => Self::Presentation,
            "message" => Self::Message,
            "repository" => Self::Repository,
            _ => Self::Unknown(name.to_owned()),
        }
    }

    /// Type name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Document => "document",
            Self::Presentation => "presentation",
            Self::Message => "message",
            Self::Repository => "repository",
            Self::Unknown(name) => name,
        }
    }
}

impl fmt::Display for ItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Item metadata.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MetaData {
    /// Declared item type.
    pub item_type: ItemType,
    /// Language (e.g. "en-US").
    pub language: Option<String>,
    /// Publication date.
    pub date: Option<NaiveDate>,
    /// Item tags.
    pub tags: BTreeSet<Tag>,
}

/// A content node in the repository tree.
///
/// Each item exclusively owns its children and files. The attached view model
/// is a cache written by the view mapper; it is never consulted for
/// correctness.
#[derive(Debug)]
pub struct Item {
    /// Depth in the tree (root is 0).
    pub level: usize,
    /// Route relative to the repository root.
    pub route: Route,
    /// Directory holding the item on disk.
    pub source: PathBuf,
    /// Display title.
    pub title: String,
    /// Short description.
    pub description: String,
    /// Raw markdown body.
    pub body: String,
    /// Metadata.
    pub meta: MetaData,
    /// Attached files.
    pub files: Vec<File>,
    /// Child items in order.
    pub children: Vec<Item>,
    model: Mutex<Option<Arc<ViewModel>>>,
}

impl Item {
    /// Create an item with no body, files or children.
    #[must_use]
    pub fn new(route: Route, title: impl Into<String>, item_type: ItemType) -> Self {
        Self {
            level: route.level(),
            route,
            source: PathBuf::new(),
            title: title.into(),
            description: String::new(),
            body: String::new(),
            meta: MetaData {
                item_type,
                ..MetaData::default()
            },
            files: Vec::new(),
            children: Vec::new(),
            model: Mutex::new(None),
        }
    }

    /// Set the source directory.
    #[must_use]
    pub fn with_source(mut self, source: impl Into<PathBuf>) -> Self {
        self.source = source.into();
        self
    }

    /// Set the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the markdown body.
    #[must_use]
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    /// Replace the metadata.
    #[must_use]
    pub fn with_meta(mut self, meta: MetaData) -> Self {
        self.meta = meta;
        self
    }

    /// Attach a file.
    #[must_use]
    pub fn with_file(mut self, file: File) -> Self {
        self.files.push(file);
        self
    }

    /// Append a child item.
    #[must_use]
    pub fn with_child(mut self, child: Item) -> Self {
        self.children.push(child);
        self
    }

    /// Source directory on disk.
    #[must_use]
    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Last view model attached by the mapper.
    #[must_use]
    pub fn cached_model(&self) -> Option<Arc<ViewModel>> {
        self.model
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Attach a freshly mapped view model.
    pub fn attach_model(&self, model: Arc<ViewModel>) {
        *self.model.lock().unwrap_or_else(PoisonError::into_inner) = Some(model);
    }

    /// Visit this item and its descendants in pre-order.
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a Item)) {
        visit(self);
        for child in &self.children {
            child.walk(visit);
        }
    }
}
