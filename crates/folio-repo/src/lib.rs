//! Content repository model for Folio.
//!
//! This crate provides:
//! - [`Route`] and [`Tag`]: normalized path and label values
//! - [`Item`] and [`File`]: the content tree being served
//! - [`FileTree`]: hierarchical index over a flat list of routed files
//! - [`Index`]: read-only snapshot of one content generation
//! - [`Scanner`]: builds an index from a content directory
//! - [`Searcher`]: full-text query over an index
//!
//! # Quick Start
//!
//! ```no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use folio_repo::{KeywordSearcher, Route, Scanner, Searcher};
//!
//! let index = Scanner::new("content").scan()?;
//! let guide = index.get(&Route::parse("guide")?);
//! let hits = KeywordSearcher.search(&index, "install", 10);
//! # Ok(())
//! # }
//! ```

mod file;
mod index;
mod item;
mod route;
mod scan;
mod search;
mod tag;
mod tree;
mod view;

pub use file::File;
pub use index::Index;
pub use item::{Item, ItemType, MetaData};
pub use route::{Route, RouteError, encode_segment};
pub use scan::{FILES_FOLDER, ScanError, Scanner};
pub use search::{KeywordSearcher, SearchHit, Searcher};
pub use tag::{Tag, TagError};
pub use tree::{FileTree, NodeRef, TreeError};
pub use view::{ERROR_TYPE, TagModel, ViewModel};
