//! Markdown to HTML conversion.

use pulldown_cmark::{CowStr, Event, Options, Parser, Tag};

use folio_repo::Item;

use crate::pather::Pather;

/// Converts an item's body into HTML.
pub trait Converter: Send + Sync {
    /// Render the body of `item`.
    fn convert(&self, item: &Item) -> String;
}

/// Default converter backed by `pulldown-cmark`.
///
/// Link and image targets are resolved against the item's route, so
/// attachments referenced as `files/diagram.png` point at the item's files
/// wherever the page is served.
#[derive(Clone, Debug)]
pub struct MarkdownConverter {
    gfm: bool,
}

impl Default for MarkdownConverter {
    fn default() -> Self {
        Self { gfm: true }
    }
}

impl MarkdownConverter {
    /// Create a converter with GitHub Flavored Markdown enabled.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable tables, strikethrough and task lists.
    #[must_use]
    pub fn with_gfm(mut self, enabled: bool) -> Self {
        self.gfm = enabled;
        self
    }

    /// Parser options for the current configuration.
    #[must_use]
    pub fn parser_options(&self) -> Options {
        if self.gfm {
            Options::ENABLE_TABLES
                | Options::ENABLE_STRIKETHROUGH
                | Options::ENABLE_TASKLISTS
                | Options::ENABLE_GFM
        } else {
            Options::empty()
        }
    }

    /// Render markdown, resolving link targets through `pather`.
    #[must_use]
    pub fn render(&self, markdown: &str, pather: &Pather) -> String {
        let events = Parser::new_ext(markdown, self.parser_options()).map(|event| match event {
            Event::Start(Tag::Link {
                link_type,
                dest_url,
                title,
                id,
            }) => Event::Start(Tag::Link {
                link_type,
                dest_url: resolve(pather, &dest_url),
                title,
                id,
            }),
            Event::Start(Tag::Image {
                link_type,
                dest_url,
                title,
                id,
            }) => Event::Start(Tag::Image {
                link_type,
                dest_url: resolve(pather, &dest_url),
                title,
                id,
            }),
            other => other,
        });

        let mut html = String::with_capacity(markdown.len() * 3 / 2);
        pulldown_cmark::html::push_html(&mut html, events);
        html
    }
}

fn resolve(pather: &Pather, target: &str) -> CowStr<'static> {
    CowStr::from(pather.path(target))
}

impl Converter for MarkdownConverter {
    fn convert(&self, item: &Item) -> String {
        self.render(&item.body, &Pather::relative(item.route.clone()))
    }
}

#[cfg(test)]
mod tests {
    use folio_repo::{ItemType, Route};

    use super::*;

    fn item(route: &str, body: &str) -> Item {
        Item::new(Route::parse(route).unwrap(), "Test", ItemType::Document).with_body(body)
    }

    #[test]
    fn test_convert_basic_markdown() {
        let html = MarkdownConverter::new().convert(&item("", "# Hello\n\nSome *text*."));

        assert!(html.contains("<h1>Hello</h1>"));
        assert!(html.contains("<em>text</em>"));
    }

    #[test]
    fn test_convert_resolves_relative_image() {
        let html = MarkdownConverter::new()
            .convert(&item("docs/guide", "![diagram](files/diagram.png)"));

        assert!(html.contains(r#"src="guide/files/diagram.png""#), "{html}");
    }

    #[test]
    fn test_convert_keeps_external_link() {
        let html = MarkdownConverter::new()
            .convert(&item("docs", "[site](https://example.com/page)"));

        assert!(html.contains(r#"href="https://example.com/page""#));
    }

    #[test]
    fn test_convert_rooted_link() {
        let html = MarkdownConverter::new().convert(&item("docs/guide", "[about](/about)"));

        assert!(html.contains(r#"href="../about""#), "{html}");
    }

    #[test]
    fn test_gfm_tables_toggle() {
        let markdown = "| a | b |\n|---|---|\n| 1 | 2 |";
        let pather = Pather::relative(Route::root());

        let with_gfm = MarkdownConverter::new().render(markdown, &pather);
        let without = MarkdownConverter::new().with_gfm(false).render(markdown, &pather);

        assert!(with_gfm.contains("<table>"));
        assert!(!without.contains("<table>"));
    }
}
