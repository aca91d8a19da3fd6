//! Server lifecycle.
//!
//! [`Server::start`] validates the options, scans the content directory,
//! starts the update hub and the change watcher, then binds and serves on a
//! background task. The outcome of that task (clean stop, bind failure or
//! I/O error) is delivered once on the returned completion channel.

use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::sync::atomic::{AtomicU8, Ordering};
use std::time::Duration;

use tokio::net::TcpListener;
use tokio::sync::{Notify, oneshot};

use folio_render::{Converter, MarkdownConverter};
use folio_repo::{KeywordSearcher, Scanner, Searcher};

use crate::app::create_router;
use crate::content::ContentStore;
use crate::error::ServerError;
use crate::live_reload::{ChangeWatcher, DEFAULT_SESSION_CAPACITY, Hub, HubHandle};
use crate::state::{AppState, SiteInfo};

/// Receives the terminal outcome of a started server.
pub type Completion = oneshot::Receiver<Result<(), ServerError>>;

/// Lifecycle state of a [`Server`].
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ServerStatus {
    Stopped = 0,
    Starting = 1,
    Running = 2,
}

impl From<u8> for ServerStatus {
    fn from(value: u8) -> Self {
        match value {
            1 => Self::Starting,
            2 => Self::Running,
            _ => Self::Stopped,
        }
    }
}

/// Server options.
#[derive(Clone, Debug)]
pub struct ServerOptions {
    /// Host address to bind to.
    pub host: String,
    /// Port to listen on; must be within `1..=65535`.
    pub port: i64,
    /// Content directory.
    pub source_dir: PathBuf,
    /// Theme directory served under `/theme`, if it exists.
    pub theme_dir: Option<PathBuf>,
    /// Enable live updates.
    pub live_reload: bool,
    /// Quiet period before a burst of file changes is applied.
    pub debounce_ms: u64,
    /// Glob patterns (relative to the content directory) that trigger reloads.
    pub watch_patterns: Option<Vec<String>>,
    /// Site title.
    pub site_title: String,
    /// Site description.
    pub site_description: String,
    /// Public base URL for absolute links; defaults to `http://host:port`.
    pub base_url: Option<String>,
    /// Application version (for `ETag`s).
    pub version: String,
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_owned(),
            port: folio_config::DEFAULT_PORT,
            source_dir: PathBuf::from("content"),
            theme_dir: None,
            live_reload: true,
            debounce_ms: 200,
            watch_patterns: None,
            site_title: "Folio".to_owned(),
            site_description: String::new(),
            base_url: None,
            version: String::new(),
        }
    }
}

impl ServerOptions {
    /// Options from a loaded configuration.
    #[must_use]
    pub fn from_config(config: &folio_config::Config, version: impl Into<String>) -> Self {
        Self {
            host: config.server.host.clone(),
            port: config.server.port,
            source_dir: config.content_resolved.source_dir.clone(),
            theme_dir: Some(config.content_resolved.theme_dir.clone()),
            live_reload: config.live_reload.enabled,
            debounce_ms: config.live_reload.debounce_ms,
            watch_patterns: config.live_reload.watch_patterns.clone(),
            site_title: config.site.title.clone(),
            site_description: config.site.description.clone(),
            base_url: Some(config.base_url()),
            version: version.into(),
        }
    }
}

/// Content server.
///
/// Cheap to share behind an `Arc`; `start`, `stop` and `is_running` may be
/// called from any task.
pub struct Server {
    options: ServerOptions,
    converter: Arc<dyn Converter>,
    searcher: Arc<dyn Searcher>,
    status: Arc<AtomicU8>,
    shutdown: Arc<Mutex<Option<Arc<Notify>>>>,
}

impl Server {
    /// Create a server with the default markdown converter and keyword search.
    #[must_use]
    pub fn new(options: ServerOptions) -> Self {
        Self {
            options,
            converter: Arc::new(MarkdownConverter::new()),
            searcher: Arc::new(KeywordSearcher),
            status: Arc::new(AtomicU8::new(ServerStatus::Stopped as u8)),
            shutdown: Arc::new(Mutex::new(None)),
        }
    }

    /// Use a different converter.
    #[must_use]
    pub fn with_converter(mut self, converter: Arc<dyn Converter>) -> Self {
        self.converter = converter;
        self
    }

    /// Use a different searcher.
    #[must_use]
    pub fn with_searcher(mut self, searcher: Arc<dyn Searcher>) -> Self {
        self.searcher = searcher;
        self
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn status(&self) -> ServerStatus {
        ServerStatus::from(self.status.load(Ordering::SeqCst))
    }

    /// Whether the server is starting or serving.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.status() != ServerStatus::Stopped
    }

    /// Start serving in the background.
    ///
    /// Fails without side effects on an invalid port or when already running.
    /// Scan and watcher errors are returned directly; bind and serve errors
    /// arrive on the completion channel.
    pub async fn start(&self) -> Result<Completion, ServerError> {
        let port = u16::try_from(self.options.port)
            .ok()
            .filter(|port| *port != 0)
            .ok_or(ServerError::InvalidPort(self.options.port))?;

        if self
            .status
            .compare_exchange(
                ServerStatus::Stopped as u8,
                ServerStatus::Starting as u8,
                Ordering::SeqCst,
                Ordering::SeqCst,
            )
            .is_err()
        {
            return Err(ServerError::AlreadyRunning);
        }

        // Per-run signal: a permit left by a stop that raced a failed run
        // dies with that run.
        let shutdown = Arc::new(Notify::new());
        *lock_slot(&self.shutdown) = Some(Arc::clone(&shutdown));

        match self.launch(port, shutdown).await {
            Ok(completion) => Ok(completion),
            Err(e) => {
                lock_slot(&self.shutdown).take();
                self.set_status(ServerStatus::Stopped);
                Err(e)
            }
        }
    }

    /// Request a graceful shutdown.
    ///
    /// In-flight requests finish and the update hub drains; the completion
    /// channel then reports `Ok`. A stop while starting ends the run as soon as
    /// it binds.
    pub fn stop(&self) {
        if let Some(shutdown) = lock_slot(&self.shutdown).as_ref() {
            tracing::info!("Stopping server");
            shutdown.notify_one();
        }
    }

    fn set_status(&self, status: ServerStatus) {
        self.status.store(status as u8, Ordering::SeqCst);
    }

    async fn launch(&self, port: u16, shutdown: Arc<Notify>) -> Result<Completion, ServerError> {
        let options = &self.options;
        let source_dir =
            std::fs::canonicalize(&options.source_dir).unwrap_or_else(|_| options.source_dir.clone());
        let scanner = Arc::new(Scanner::new(source_dir));

        let index = {
            let scanner = Arc::clone(&scanner);
            tokio::task::spawn_blocking(move || scanner.scan())
                .await
                .map_err(std::io::Error::other)??
        };
        tracing::info!(
            source_dir = %scanner.source_dir().display(),
            items = index.len(),
            "Content loaded"
        );
        let content = ContentStore::new(index);

        let (hub, watcher) = if options.live_reload {
            let (hub, task) = Hub::spawn(DEFAULT_SESSION_CAPACITY);
            let watcher = ChangeWatcher::start(
                scanner,
                options.watch_patterns.as_deref(),
                Duration::from_millis(options.debounce_ms),
                content.clone(),
                hub.clone(),
            )
            .inspect_err(|_| hub.shutdown())?;
            (Some((hub, task)), Some(watcher))
        } else {
            (None, None)
        };

        let theme_dir = options.theme_dir.as_deref().filter(|dir| dir.is_dir());
        let state = Arc::new(AppState {
            content,
            converter: Arc::clone(&self.converter),
            searcher: Arc::clone(&self.searcher),
            hub: hub.as_ref().map(|(hub, _)| hub.clone()),
            site: SiteInfo {
                title: options.site_title.clone(),
                description: options.site_description.clone(),
                base_url: options
                    .base_url
                    .clone()
                    .unwrap_or_else(|| format!("http://{}:{port}", options.host))
                    .trim_end_matches('/')
                    .to_owned(),
            },
            theme: theme_dir.is_some(),
            version: options.version.clone(),
        });
        let router = create_router(state, theme_dir);

        let (done, completion) = oneshot::channel();
        let host = options.host.clone();
        let status = Arc::clone(&self.status);
        let slot = Arc::clone(&self.shutdown);

        tokio::spawn(async move {
            let result = serve(&host, port, router, &status, shutdown).await;
            if let Err(e) = &result {
                tracing::error!(error = %e, "Server stopped with error");
            }

            drop(watcher);
            if let Some((hub, task)) = hub {
                hub.shutdown();
                if let Err(e) = task.await {
                    tracing::warn!(error = %e, "Update hub task failed");
                }
            }
            lock_slot(&slot).take();
            status.store(ServerStatus::Stopped as u8, Ordering::SeqCst);
            let _ = done.send(result);
        });

        Ok(completion)
    }
}

fn lock_slot(slot: &Mutex<Option<Arc<Notify>>>) -> MutexGuard<'_, Option<Arc<Notify>>> {
    slot.lock().unwrap_or_else(PoisonError::into_inner)
}

async fn serve(
    host: &str,
    port: u16,
    router: axum::Router,
    status: &AtomicU8,
    shutdown: Arc<Notify>,
) -> Result<(), ServerError> {
    let listener = TcpListener::bind((host, port))
        .await
        .map_err(|e| ServerError::bind(format!("{host}:{port}"), e))?;
    status.store(ServerStatus::Running as u8, Ordering::SeqCst);
    tracing::info!(address = %listener.local_addr()?, "Server listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(async move { shutdown.notified().await })
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}
