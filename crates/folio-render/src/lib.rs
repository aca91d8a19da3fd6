//! Rendering for Folio content.
//!
//! Everything here is a pure function of an index snapshot and a request
//! base: link resolution ([`Pather`]), item to view model projection
//! ([`map`]), markdown conversion ([`MarkdownConverter`]), file tree sections
//! ([`FileTreeRenderer`]) and the HTML/XML/RTF documents served over HTTP.
//!
//! # Example
//!
//! ```
//! use folio_render::{FileTreeRenderer, Pather};
//! use folio_repo::{File, Route};
//!
//! let base = Route::parse("docs").unwrap();
//! let files = [File::new(Route::parse("docs/files/a.png").unwrap(), "/repo/docs/files/a.png")];
//! let renderer = FileTreeRenderer::new(Pather::relative(base.clone()), base, files).unwrap();
//!
//! let html = renderer.render("Files", "files", "files");
//! assert!(html.contains(r#"<ul class="tree">"#));
//! ```

mod converter;
mod escape;
pub mod feed;
mod mapper;
pub mod page;
mod pather;
mod rtf;
mod tree;

pub use converter::{Converter, MarkdownConverter};
pub use escape::{escape_html, escape_xml};
pub use mapper::{DEFAULT_LANGUAGE, format_date, language_tag, map};
pub use page::Page;
pub use pather::Pather;
pub use rtf::to_rtf;
pub use tree::FileTreeRenderer;
