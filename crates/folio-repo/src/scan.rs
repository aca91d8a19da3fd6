//! Directory scanner that populates an [`Index`].
//!
//! Layout rules:
//! - A directory containing a markdown file is an item. `index.md` wins over
//!   other markdown files; otherwise the first one by name is used.
//! - Files below a `files/` folder belong to the enclosing item.
//! - Other subdirectories are child items.
//! - A directory without markdown but with item descendants becomes a
//!   `repository` item titled after the directory.
//! - Hidden entries (leading `.`) are skipped.
//!
//! Markdown files may start with YAML front matter:
//!
//! ```text
//! ---
//! title: Getting started
//! description: First steps
//! type: document
//! language: en-US
//! date: 2024-03-01
//! tags: [rust, web]
//! ---
//! # Getting started
//! ```

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::Deserialize;

use crate::file::File;
use crate::index::Index;
use crate::item::{Item, ItemType, MetaData};
use crate::route::Route;
use crate::tag::Tag;

/// Name of the folder holding item attachments.
pub const FILES_FOLDER: &str = "files";

/// Preferred markdown file name within an item directory.
const INDEX_FILE: &str = "index.md";

/// Error returned when scanning fails.
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    /// Source directory does not exist.
    #[error("Source directory not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error while reading the tree.
    #[error("I/O error at {}: {source}", path.display())]
    Io {
        /// Path being read.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
}

/// Metadata block at the top of a markdown file.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FrontMatter {
    title: Option<String>,
    description: Option<String>,
    #[serde(rename = "type")]
    item_type: Option<String>,
    language: Option<String>,
    date: Option<String>,
    tags: Vec<String>,
}

/// Builds an [`Index`] from a content directory.
pub struct Scanner {
    source_dir: PathBuf,
}

impl Scanner {
    /// Create a scanner for a content directory.
    #[must_use]
    pub fn new(source_dir: impl Into<PathBuf>) -> Self {
        Self {
            source_dir: source_dir.into(),
        }
    }

    /// Content directory being scanned.
    #[must_use]
    pub fn source_dir(&self) -> &Path {
        &self.source_dir
    }

    /// Scan the content directory into a new index.
    pub fn scan(&self) -> Result<Index, ScanError> {
        if !self.source_dir.is_dir() {
            return Err(ScanError::NotFound(self.source_dir.clone()));
        }

        let root = match self.scan_directory(&self.source_dir, Route::root())? {
            Some(root) => root,
            None => Item::new(Route::root(), self.directory_title(), ItemType::Repository)
                .with_source(&self.source_dir),
        };

        let index = Index::new(root);
        tracing::debug!(
            source_dir = %self.source_dir.display(),
            items = index.len(),
            files = index.files().len(),
            "Scanned content directory"
        );
        Ok(index)
    }

    /// Map a path below the content directory to the route of its owning item.
    ///
    /// Markdown files map to their directory; attachments map to the item
    /// that owns the `files/` folder. Returns `None` for paths outside the
    /// content directory or hidden paths.
    #[must_use]
    pub fn item_route_for(&self, path: &Path) -> Option<Route> {
        let relative = path.strip_prefix(&self.source_dir).ok()?;
        let mut segments: Vec<String> = Vec::new();
        for component in relative.components() {
            let std::path::Component::Normal(name) = component else {
                return None;
            };
            let name = name.to_string_lossy();
            if name.starts_with('.') {
                return None;
            }
            segments.push(name.into_owned());
        }

        if let Some(files_at) = segments.iter().position(|s| s == FILES_FOLDER) {
            segments.truncate(files_at);
        } else if relative.extension().is_some_and(|e| e == "md")
            || path.is_file()
            || !path.exists()
        {
            segments.pop();
        }

        Route::parse(&segments.join("/")).ok()
    }

    fn directory_title(&self) -> String {
        self.source_dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    fn scan_directory(&self, dir: &Path, route: Route) -> Result<Option<Item>, ScanError> {
        let mut entries: Vec<_> = fs::read_dir(dir)
            .map_err(|source| io_error(dir, source))?
            .filter_map(Result::ok)
            .filter(|e| !e.file_name().to_string_lossy().starts_with('.'))
            .collect();
        entries.sort_by_key(fs::DirEntry::file_name);

        let mut markdown: Option<PathBuf> = None;
        let mut files = Vec::new();
        let mut children = Vec::new();

        for entry in entries {
            let path = entry.path();
            let name = entry.file_name().to_string_lossy().into_owned();
            let is_dir = entry.file_type().is_ok_and(|t| t.is_dir());

            if is_dir && name == FILES_FOLDER {
                collect_files(&path, &route.child(FILES_FOLDER), &mut files)?;
            } else if is_dir {
                if let Some(child) = self.scan_directory(&path, route.child(&name))? {
                    children.push(child);
                }
            } else if path.extension().is_some_and(|e| e == "md")
                && (markdown.is_none() || name.eq_ignore_ascii_case(INDEX_FILE))
            {
                markdown = Some(path);
            }
        }

        let item = match markdown {
            Some(path) => {
                let content = fs::read_to_string(&path).map_err(|source| io_error(&path, source))?;
                parse_item(route, &content, dir_name(dir))
            }
            None if !children.is_empty() || route.is_root() => {
                Item::new(route, dir_name(dir), ItemType::Repository)
            }
            None => return Ok(None),
        };

        let mut item = item.with_source(dir);
        item.files = files;
        item.children = children;
        Ok(Some(item))
    }
}

fn io_error(path: &Path, source: std::io::Error) -> ScanError {
    ScanError::Io {
        path: path.to_path_buf(),
        source,
    }
}

fn dir_name(dir: &Path) -> String {
    dir.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Collect attachments recursively, in name order.
fn collect_files(dir: &Path, route: &Route, files: &mut Vec<File>) -> Result<(), ScanError> {
    let mut entries: Vec<_> = fs::read_dir(dir)
        .map_err(|source| io_error(dir, source))?
        .filter_map(Result::ok)
        .filter(|e| !e.file_name().to_string_lossy().starts_with('.'))
        .collect();
    entries.sort_by_key(fs::DirEntry::file_name);

    for entry in entries {
        let name = entry.file_name().to_string_lossy().into_owned();
        let child_route = route.child(&name);
        if entry.file_type().is_ok_and(|t| t.is_dir()) {
            collect_files(&entry.path(), &child_route, files)?;
        } else {
            files.push(File::new(child_route, entry.path()));
        }
    }
    Ok(())
}

/// Build an item from markdown content.
fn parse_item(route: Route, content: &str, fallback_title: String) -> Item {
    let (front_matter, body) = split_front_matter(content);
    let front: FrontMatter = match front_matter.map(serde_yaml::from_str).transpose() {
        Ok(front) => front.unwrap_or_default(),
        Err(e) => {
            tracing::warn!(route = %route, error = %e, "Ignoring invalid front matter");
            FrontMatter::default()
        }
    };

    let title = front
        .title
        .clone()
        .or_else(|| first_heading(body))
        .unwrap_or(fallback_title);

    let meta = MetaData {
        item_type: front
            .item_type
            .as_deref()
            .map_or(ItemType::Document, ItemType::parse),
        language: front.language.clone(),
        date: front.date.as_deref().and_then(|d| parse_date(&route, d)),
        tags: parse_tags(&route, &front.tags),
    };

    Item::new(route, title, ItemType::Document)
        .with_description(front.description.unwrap_or_default())
        .with_body(body)
        .with_meta(meta)
}

/// Split a leading `---` delimited YAML block from the body.
fn split_front_matter(content: &str) -> (Option<&str>, &str) {
    let Some(rest) = content
        .strip_prefix("---\n")
        .or_else(|| content.strip_prefix("---\r\n"))
    else {
        return (None, content);
    };

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end() == "---" {
            let front = &rest[..offset];
            let body = &rest[offset + line.len()..];
            return (Some(front), body);
        }
        offset += line.len();
    }

    (None, content)
}

fn first_heading(body: &str) -> Option<String> {
    body.lines()
        .find_map(|line| line.strip_prefix("# "))
        .map(|title| title.trim().to_owned())
        .filter(|title| !title.is_empty())
}

fn parse_date(route: &Route, value: &str) -> Option<NaiveDate> {
    match NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d") {
        Ok(date) => Some(date),
        Err(e) => {
            tracing::warn!(route = %route, date = value, error = %e, "Ignoring invalid date");
            None
        }
    }
}

fn parse_tags(route: &Route, names: &[String]) -> BTreeSet<Tag> {
    names
        .iter()
        .filter_map(|name| match Tag::new(name) {
            Ok(tag) => Some(tag),
            Err(e) => {
                tracing::warn!(route = %route, error = %e, "Dropping invalid tag");
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    use super::*;

    fn write(dir: &Path, relative: &str, content: &str) {
        let path = dir.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn route(path: &str) -> Route {
        Route::parse(path).unwrap()
    }

    #[test]
    fn test_scan_missing_directory() {
        let scanner = Scanner::new("/nonexistent/folio/content");

        assert!(matches!(scanner.scan(), Err(ScanError::NotFound(_))));
    }

    #[test]
    fn test_scan_builds_item_tree() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "index.md", "# Home\n\nWelcome.");
        write(temp.path(), "guide/index.md", "# Guide\n");
        write(temp.path(), "guide/setup/notes.md", "# Setup\n");
        write(temp.path(), "about/readme.md", "No heading here.");

        let index = Scanner::new(temp.path()).scan().unwrap();

        let routes: Vec<String> = index.items().iter().map(|i| i.route.value()).collect();
        assert_eq!(routes, vec!["", "about", "guide", "guide/setup"]);
        assert_eq!(index.root().title, "Home");
        assert_eq!(index.get(&route("guide/setup")).unwrap().title, "Setup");
        assert_eq!(index.get(&route("guide/setup")).unwrap().level, 2);
        assert_eq!(index.get(&route("about")).unwrap().title, "about");
    }

    #[test]
    fn test_scan_collects_files() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "doc/index.md", "# Doc\n");
        write(temp.path(), "doc/files/b.png", "b");
        write(temp.path(), "doc/files/a.txt", "a");
        write(temp.path(), "doc/files/nested/c.pdf", "c");

        let index = Scanner::new(temp.path()).scan().unwrap();

        let doc = index.get(&route("doc")).unwrap();
        let files: Vec<String> = doc.files.iter().map(|f| f.route().value()).collect();
        assert_eq!(
            files,
            vec!["doc/files/a.txt", "doc/files/b.png", "doc/files/nested/c.pdf"]
        );
        assert!(index.get(&route("doc/files")).is_none());
    }

    #[test]
    fn test_scan_repository_item_for_directory_without_markdown() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "blog/2024/post/index.md", "# Post\n");
        write(temp.path(), "empty/image.png", "x");

        let index = Scanner::new(temp.path()).scan().unwrap();

        let blog = index.get(&route("blog")).unwrap();
        assert_eq!(blog.meta.item_type, ItemType::Repository);
        assert!(index.get(&route("blog/2024/post")).is_some());
        assert!(index.get(&route("empty")).is_none());
        assert_eq!(index.root().meta.item_type, ItemType::Repository);
    }

    #[test]
    fn test_scan_skips_hidden_entries() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "index.md", "# Home\n");
        write(temp.path(), ".git/index.md", "# Hidden\n");

        let index = Scanner::new(temp.path()).scan().unwrap();

        assert_eq!(index.len(), 1);
    }

    #[test]
    fn test_parse_item_front_matter() {
        let content = "---\ntitle: Release notes\ndescription: What changed\ntype: message\nlanguage: de-DE\ndate: 2024-03-01\ntags: [Rust, ' web ', '']\n---\n# Ignored heading\n\nBody.";

        let item = parse_item(route("news"), content, "news".to_owned());

        assert_eq!(item.title, "Release notes");
        assert_eq!(item.description, "What changed");
        assert_eq!(item.meta.item_type, ItemType::Message);
        assert_eq!(item.meta.language.as_deref(), Some("de-DE"));
        assert_eq!(item.meta.date, NaiveDate::from_ymd_opt(2024, 3, 1));
        let tags: Vec<&str> = item.meta.tags.iter().map(Tag::name).collect();
        assert_eq!(tags, vec!["rust", "web"]);
        assert!(item.body.starts_with("# Ignored heading"));
    }

    #[test]
    fn test_parse_item_unknown_type_is_kept() {
        let item = parse_item(route("x"), "---\ntype: gallery\n---\n", "x".to_owned());

        assert_eq!(item.meta.item_type, ItemType::Unknown("gallery".to_owned()));
    }

    #[test]
    fn test_parse_item_invalid_front_matter_falls_back() {
        let item = parse_item(route("x"), "---\ntags: [unclosed\n---\n# Title\n", "x".to_owned());

        assert_eq!(item.title, "Title");
        assert!(item.meta.tags.is_empty());
    }

    #[test]
    fn test_split_front_matter_without_block() {
        assert_eq!(split_front_matter("# Title\n"), (None, "# Title\n"));
        assert_eq!(split_front_matter("---\nunterminated"), (None, "---\nunterminated"));
    }

    #[test]
    fn test_item_route_for_paths() {
        let scanner = Scanner::new("/content");

        assert_eq!(
            scanner.item_route_for(Path::new("/content/guide/index.md")),
            Some(route("guide"))
        );
        assert_eq!(
            scanner.item_route_for(Path::new("/content/guide/files/img/a.png")),
            Some(route("guide"))
        );
        assert_eq!(
            scanner.item_route_for(Path::new("/content/index.md")),
            Some(Route::root())
        );
        assert_eq!(scanner.item_route_for(Path::new("/elsewhere/a.md")), None);
        assert_eq!(scanner.item_route_for(Path::new("/content/.git/HEAD")), None);
    }
}
