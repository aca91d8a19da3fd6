//! HTML rendering of file trees.

use std::fmt::Write;

use folio_repo::{File, FileTree, NodeRef, Route, TreeError};

use crate::escape::escape_html;
use crate::pather::Pather;

/// Renders sections of a file tree as nested HTML lists.
#[derive(Debug)]
pub struct FileTreeRenderer {
    pather: Pather,
    base: Route,
    tree: FileTree,
}

impl FileTreeRenderer {
    /// Build a renderer over `files`, resolving sections below `base`.
    pub fn new(
        pather: Pather,
        base: Route,
        files: impl IntoIterator<Item = File>,
    ) -> Result<Self, TreeError> {
        Ok(Self {
            pather,
            base,
            tree: FileTree::build(files)?,
        })
    }

    /// Render the section at `path` (relative to the base route).
    ///
    /// Returns an empty string when `path` is not a valid route. A section
    /// whose route has no node, or a node without children, renders only the
    /// wrapper and the optional header.
    #[must_use]
    pub fn render(&self, title: &str, css_class: &str, path: &str) -> String {
        let folder = match Route::from_request(path) {
            Ok(route) => self.base.join(&route),
            Err(e) => {
                tracing::debug!(path, error = %e, "Skipping file tree section");
                return String::new();
            }
        };

        let mut html = format!(r#"<section class="{}">"#, escape_html(css_class));
        if !title.trim().is_empty() {
            let _ = writeln!(html, "\n<header>{}</header>", escape_html(title));
        }

        if let Some(node) = self.tree.get_node(&folder)
            && node.has_children()
        {
            html.push_str("<ul class=\"tree\">\n");
            for child in node.children() {
                html.push_str("<li>\n");
                self.render_node(child, &mut html);
                html.push_str("</li>\n");
            }
            html.push_str("</ul>\n");
        }

        html.push_str("</section>");
        html
    }

    fn render_node(&self, node: NodeRef<'_>, html: &mut String) {
        if let Some(file) = node.file() {
            let route = file.route();
            let _ = write!(
                html,
                r#"<a href="{}" title="{}">{}</a>"#,
                escape_html(&self.pather.route_path(route)),
                escape_html(&route.value()),
                escape_html(route.last_component_name())
            );
        } else {
            html.push_str(&escape_html(node.name()));
        }

        if node.has_children() {
            html.push_str("<ul>\n");
            for child in node.children() {
                html.push_str("<li>");
                self.render_node(child, html);
                html.push_str("</li>\n");
            }
            html.push_str("</ul>\n");
        }
    }
}
