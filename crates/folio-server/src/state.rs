//! Application state.
//!
//! Shared state for all request handlers.

use std::sync::Arc;

use folio_render::Converter;
use folio_repo::Searcher;

use crate::content::ContentStore;
use crate::live_reload::HubHandle;

/// Site identity used by pages and feeds.
#[derive(Clone, Debug)]
pub(crate) struct SiteInfo {
    pub(crate) title: String,
    pub(crate) description: String,
    /// Absolute URL prefix without trailing slash.
    pub(crate) base_url: String,
}

/// Application state shared across all handlers.
pub(crate) struct AppState {
    /// Current content generation.
    pub(crate) content: ContentStore,
    /// Markdown to HTML conversion.
    pub(crate) converter: Arc<dyn Converter>,
    /// Full-text search.
    pub(crate) searcher: Arc<dyn Searcher>,
    /// Update hub; `None` when live reload is disabled.
    pub(crate) hub: Option<HubHandle>,
    pub(crate) site: SiteInfo,
    /// Whether a theme directory is mounted under `/theme`.
    pub(crate) theme: bool,
    /// Application version for `ETag` computation.
    pub(crate) version: String,
}
