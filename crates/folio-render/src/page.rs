//! HTML pages.
//!
//! Markup is kept minimal: semantic elements and class names a theme
//! stylesheet can target. Body builders return fragments; [`Page`] wraps a
//! fragment into a complete document.

use std::fmt::Write;

use folio_repo::{Index, SearchHit, ViewModel};

use crate::escape::escape_html;
use crate::pather::Pather;

/// Complete HTML document around a body fragment.
#[derive(Clone, Debug, Default)]
pub struct Page {
    title: String,
    language: String,
    stylesheet: Option<String>,
    live_reload: Option<String>,
    head: Vec<String>,
}

impl Page {
    /// Create a page with a document title.
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            language: crate::mapper::DEFAULT_LANGUAGE.to_owned(),
            ..Self::default()
        }
    }

    /// Set the `lang` attribute.
    #[must_use]
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    /// Link a stylesheet.
    #[must_use]
    pub fn with_stylesheet(mut self, href: impl Into<String>) -> Self {
        self.stylesheet = Some(href.into());
        self
    }

    /// Reload the page when the live-update socket at `ws_path` reports a change.
    #[must_use]
    pub fn with_live_reload(mut self, ws_path: impl Into<String>) -> Self {
        self.live_reload = Some(ws_path.into());
        self
    }

    /// Add a raw `<head>` element.
    #[must_use]
    pub fn with_head(mut self, element: impl Into<String>) -> Self {
        self.head.push(element.into());
        self
    }

    /// Render the document around `body`.
    #[must_use]
    pub fn render(&self, body: &str) -> String {
        let mut html = String::with_capacity(body.len() + 512);
        let _ = writeln!(
            html,
            "<!DOCTYPE html>\n<html lang=\"{}\">\n<head>\n<meta charset=\"utf-8\">\n\
             <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
             <title>{}</title>",
            escape_html(&self.language),
            escape_html(&self.title)
        );
        if let Some(href) = &self.stylesheet {
            let _ = writeln!(html, r#"<link rel="stylesheet" href="{}">"#, escape_html(href));
        }
        for element in &self.head {
            html.push_str(element);
            html.push('\n');
        }
        html.push_str("</head>\n<body>\n");
        html.push_str(body);
        if let Some(ws_path) = &self.live_reload {
            html.push('\n');
            html.push_str(&live_reload_script(ws_path));
        }
        html.push_str("\n</body>\n</html>\n");
        html
    }
}

/// Script that reloads the page on an update message.
#[must_use]
pub fn live_reload_script(ws_path: &str) -> String {
    let path = ws_path.replace(['"', '\\', '<', '>'], "");
    format!(
        r#"<script>
(function () {{
  var scheme = location.protocol === "https:" ? "wss://" : "ws://";
  var socket = new WebSocket(scheme + location.host + "{path}");
  socket.onmessage = function (event) {{
    var message = JSON.parse(event.data);
    if (message.type === "update") {{
      location.reload();
    }}
  }};
}})();
</script>"#
    )
}

/// Item page: article, attachments and child list.
#[must_use]
pub fn item_body(model: &ViewModel, pather: &Pather, files_section: &str) -> String {
    let mut html = String::new();
    let _ = writeln!(
        html,
        "<article class=\"{}\">",
        escape_html(&model.item_type)
    );
    write_header(&mut html, model);
    let _ = writeln!(html, "<section class=\"content\">\n{}</section>", model.content);
    if !files_section.is_empty() {
        html.push_str(files_section);
        html.push('\n');
    }
    if !model.childs.is_empty() {
        html.push_str("<section class=\"childs\">\n<ul>\n");
        for child in &model.childs {
            let _ = write!(
                html,
                r#"<li><a href="{}">{}</a>"#,
                escape_html(&pather.path(&child.absolute_route)),
                escape_html(&child.title)
            );
            if !child.description.is_empty() {
                let _ = write!(html, " <span>{}</span>", escape_html(&child.description));
            }
            html.push_str("</li>\n");
        }
        html.push_str("</ul>\n</section>\n");
    }
    html.push_str("</article>");
    html
}

/// Printer-friendly item body without navigation.
#[must_use]
pub fn print_body(model: &ViewModel) -> String {
    let mut html = String::from("<article class=\"print\">\n");
    write_header(&mut html, model);
    let _ = writeln!(html, "{}", model.content);
    html.push_str("</article>");
    html
}

fn write_header(html: &mut String, model: &ViewModel) {
    let _ = writeln!(html, "<header>\n<h1>{}</h1>", escape_html(&model.title));
    if !model.description.is_empty() {
        let _ = writeln!(
            html,
            "<p class=\"description\">{}</p>",
            escape_html(&model.description)
        );
    }
    if !model.date.is_empty() {
        let _ = writeln!(
            html,
            "<time datetime=\"{0}\">{0}</time>",
            escape_html(&model.date)
        );
    }
    if !model.tags.is_empty() {
        html.push_str("<ul class=\"tags\">");
        for tag in &model.tags {
            let _ = write!(html, "<li>{}</li>", escape_html(&tag.name));
        }
        html.push_str("</ul>\n");
    }
    html.push_str("</header>\n");
}

/// Tag overview: every tag with links to its items.
#[must_use]
pub fn tags_body(index: &Index, pather: &Pather) -> String {
    let mut html = String::from("<section class=\"tags\">\n<h1>Tags</h1>\n");
    for (tag, items) in index.tags() {
        let name = escape_html(tag.name());
        let _ = writeln!(html, "<h2 id=\"{name}\">{name}</h2>\n<ul>");
        for item in items {
            let _ = writeln!(
                html,
                r#"<li><a href="{}">{}</a></li>"#,
                escape_html(&pather.route_path(&item.route)),
                escape_html(&item.title)
            );
        }
        html.push_str("</ul>\n");
    }
    html.push_str("</section>");
    html
}

/// Nested list of all items below a root model.
#[must_use]
pub fn sitemap_body(root: &ViewModel, pather: &Pather) -> String {
    let mut html = String::from("<section class=\"sitemap\">\n<h1>Sitemap</h1>\n<ul>\n");
    write_sitemap_entry(&mut html, root, pather);
    html.push_str("</ul>\n</section>");
    html
}

fn write_sitemap_entry(html: &mut String, model: &ViewModel, pather: &Pather) {
    let _ = write!(
        html,
        r#"<li><a href="{}">{}</a>"#,
        escape_html(&pather.path(&model.absolute_route)),
        escape_html(&model.title)
    );
    if !model.childs.is_empty() {
        html.push_str("\n<ul>\n");
        for child in &model.childs {
            write_sitemap_entry(html, child, pather);
        }
        html.push_str("</ul>\n");
    }
    html.push_str("</li>\n");
}

/// Search form and results.
#[must_use]
pub fn search_body(query: &str, hits: &[SearchHit], pather: &Pather) -> String {
    let mut html = String::from("<section class=\"search\">\n");
    let _ = writeln!(
        html,
        "<form action=\"{}\" method=\"get\"><input type=\"search\" name=\"q\" value=\"{}\"></form>",
        escape_html(&pather.path("/search")),
        escape_html(query)
    );
    if !query.trim().is_empty() {
        if hits.is_empty() {
            let _ = writeln!(
                html,
                "<p>No results for <em>{}</em>.</p>",
                escape_html(query)
            );
        } else {
            html.push_str("<ol>\n");
            for hit in hits {
                let _ = writeln!(
                    html,
                    r#"<li><a href="{}">{}</a> <span>{}</span></li>"#,
                    escape_html(&pather.route_path(&hit.route)),
                    escape_html(&hit.title),
                    escape_html(&hit.description)
                );
            }
            html.push_str("</ol>\n");
        }
    }
    html.push_str("</section>");
    html
}

/// Table of every indexed item and file.
#[must_use]
pub fn debug_body(index: &Index) -> String {
    let mut html = String::from(
        "<section class=\"debug\">\n<h1>Index</h1>\n<table>\n\
         <tr><th>Route</th><th>Type</th><th>Title</th><th>Files</th><th>Source</th></tr>\n",
    );
    for item in index.items() {
        let _ = writeln!(
            html,
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
            escape_html(&item.route.url()),
            escape_html(item.meta.item_type.as_str()),
            escape_html(&item.title),
            item.files.len(),
            escape_html(&item.source().display().to_string())
        );
    }
    let _ = writeln!(
        html,
        "</table>\n<p>{} items, {} files</p>",
        index.len(),
        index.files().len()
    );
    html.push_str("</section>");
    html
}

#[cfg(test)]
mod tests {
    use folio_repo::{Item, ItemType, MetaData, Route, Tag};

    use super::*;

    fn route(path: &str) -> Route {
        Route::parse(path).unwrap()
    }

    fn model(path: &str, title: &str) -> ViewModel {
        let route = route(path);
        ViewModel {
            level: route.level(),
            relative_route: route.value(),
            absolute_route: route.url(),
            title: title.to_owned(),
            item_type: "document".to_owned(),
            ..ViewModel::default()
        }
    }

    #[test]
    fn test_page_render_with_live_reload() {
        let html = Page::new("Guide & more")
            .with_language("de")
            .with_stylesheet("/theme/screen.css")
            .with_live_reload("/docs/guide.ws")
            .render("<p>body</p>");

        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains(r#"<html lang="de">"#));
        assert!(html.contains("<title>Guide &amp; more</title>"));
        assert!(html.contains(r#"href="/theme/screen.css""#));
        assert!(html.contains("<p>body</p>"));
        assert!(html.contains(r#"location.host + "/docs/guide.ws""#));
    }

    #[test]
    fn test_page_without_live_reload_has_no_script() {
        let html = Page::new("Plain").render("");

        assert!(!html.contains("<script>"));
    }

    #[test]
    fn test_item_body_lists_children() {
        let mut parent = model("docs", "Docs");
        parent.content = "<p>Intro</p>".to_owned();
        let mut child = model("docs/guide", "Guide");
        child.description = "Step by step".to_owned();
        parent.childs.push(child);

        let html = item_body(&parent, &Pather::relative(route("docs")), "");

        assert!(html.contains("<h1>Docs</h1>"));
        assert!(html.contains("<p>Intro</p>"));
        assert!(html.contains(r#"<li><a href="docs/guide">Guide</a> <span>Step by step</span></li>"#));
    }

    #[test]
    fn test_print_body_has_no_children() {
        let mut parent = model("docs", "Docs");
        parent.childs.push(model("docs/guide", "Guide"));

        let html = print_body(&parent);

        assert!(html.contains("<h1>Docs</h1>"));
        assert!(!html.contains("Guide"));
    }

    #[test]
    fn test_tags_body_groups_items() {
        let meta = MetaData {
            tags: [Tag::new("rust").unwrap()].into_iter().collect(),
            ..MetaData::default()
        };
        let root = Item::new(Route::root(), "Home", ItemType::Repository)
            .with_child(Item::new(route("a"), "A", ItemType::Document).with_meta(meta));
        let index = Index::new(root);

        let html = tags_body(&index, &Pather::relative(Route::root()));

        assert!(html.contains(r#"<h2 id="rust">rust</h2>"#));
        assert!(html.contains(r#"<li><a href="a">A</a></li>"#));
    }

    #[test]
    fn test_sitemap_body_nests_children() {
        let mut root = model("", "Home");
        let mut docs = model("docs", "Docs");
        docs.childs.push(model("docs/guide", "Guide"));
        root.childs.push(docs);

        let html = sitemap_body(&root, &Pather::relative(Route::root()));

        assert!(html.contains(r#"<li><a href="./">Home</a>"#));
        assert!(html.contains(r#"<li><a href="docs/guide">Guide</a></li>"#));
    }

    #[test]
    fn test_search_body_results() {
        let hits = vec![SearchHit {
            route: route("a"),
            title: "A".to_owned(),
            description: "first".to_owned(),
            score: 8,
        }];

        let html = search_body("alpha", &hits, &Pather::relative(Route::root()));
        let empty = search_body("beta", &[], &Pather::relative(Route::root()));

        assert!(html.contains(r#"<li><a href="a">A</a> <span>first</span></li>"#));
        assert!(empty.contains("No results for <em>beta</em>"));
    }

    #[test]
    fn test_debug_body_counts() {
        let root = Item::new(Route::root(), "Home", ItemType::Repository)
            .with_child(Item::new(route("a"), "A", ItemType::Document));

        let html = debug_body(&Index::new(root));

        assert!(html.contains("<td>/a</td><td>document</td>"));
        assert!(html.contains("<p>2 items, 0 files</p>"));
    }
}
