//! HTTP server for Folio.
//!
//! Serves a content directory as HTML pages, feeds and JSON, and pushes
//! live-update notifications to open pages over WebSockets:
//! - a single dispatch table maps every request path to one endpoint
//!   (exact paths, then `.print`/`.json`/`.rtf`/`.ws` suffixes, then the item
//!   view)
//! - `/theme/*` is served from the theme directory when it exists
//! - the update hub fans content changes out to live connections whose route
//!   equals or contains the changed route
//!
//! # Quick Start
//!
//! ```no_run
//! use folio_server::{Server, ServerOptions};
//!
//! # async fn run() -> Result<(), folio_server::ServerError> {
//! let server = Server::new(ServerOptions {
//!     port: 8080,
//!     source_dir: "content".into(),
//!     ..ServerOptions::default()
//! });
//!
//! let completion = server.start().await?;
//! // ... later
//! server.stop();
//! completion.await.ok();
//! # Ok(())
//! # }
//! ```
//!
//! # Architecture
//!
//! ```text
//! Browser ──HTTP──► axum router ──► dispatch table ──► handlers
//!    ▲                                                   │
//!    │                                                   └─► ContentStore (Arc<Index>)
//!    │                                                           ▲
//!    └──WS── connection task ◄── Update hub ◄── change watcher ──┘
//!                                                   ▲
//!                                               notify
//! ```

mod app;
mod content;
mod dispatch;
mod error;
mod handlers;
mod live_reload;
mod middleware;
mod server;
mod state;

pub use content::ContentStore;
pub use error::ServerError;
pub use live_reload::{DEFAULT_SESSION_CAPACITY, Hub, HubHandle, Subscription, UpdateEvent};
pub use server::{Completion, Server, ServerOptions, ServerStatus};
