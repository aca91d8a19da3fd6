//! Change detection for the content directory.
//!
//! Raw `notify` events are filtered by the watch patterns and debounced.
//! Each settled batch triggers one rescan; the new index is swapped into the
//! content store before the affected item routes are published, so a client
//! reloading on the notification already sees the new generation.

use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use folio_repo::{Route, Scanner};

use super::debouncer::{Change, ChangeKind, Debouncer};
use super::hub::HubHandle;
use crate::content::ContentStore;

/// Patterns used when none are configured.
pub(crate) const DEFAULT_WATCH_PATTERNS: &[&str] = &["**/*"];

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Running filesystem watcher.
///
/// Dropping it stops the watcher and its background tasks.
pub(crate) struct ChangeWatcher {
    _watcher: RecommendedWatcher,
    tasks: Vec<JoinHandle<()>>,
}

impl ChangeWatcher {
    /// Watch the scanner's content directory.
    ///
    /// Must be called from within a tokio runtime.
    pub(crate) fn start(
        scanner: Arc<Scanner>,
        patterns: Option<&[String]>,
        debounce: Duration,
        store: ContentStore,
        hub: HubHandle,
    ) -> Result<Self, notify::Error> {
        let patterns = compile_patterns(patterns);
        let (tx, mut rx) = mpsc::channel::<Event>(256);

        let mut watcher = notify::recommended_watcher(move |res: Result<Event, notify::Error>| {
            match res {
                Ok(event) => {
                    // The callback runs on notify's own thread.
                    let _ = tx.blocking_send(event);
                }
                Err(e) => tracing::warn!(error = %e, "File watcher error"),
            }
        })?;
        watcher.watch(scanner.source_dir(), RecursiveMode::Recursive)?;
        tracing::info!(
            source_dir = %scanner.source_dir().display(),
            debounce = ?debounce,
            "Watching content directory"
        );

        let debouncer = Arc::new(Debouncer::new(debounce));

        let recorder = {
            let debouncer = Arc::clone(&debouncer);
            let source_dir = scanner.source_dir().to_path_buf();
            tokio::spawn(async move {
                while let Some(event) = rx.recv().await {
                    record_event(&event, &source_dir, &patterns, &debouncer);
                }
            })
        };

        let processor = tokio::spawn(async move {
            let mut interval = tokio::time::interval(POLL_INTERVAL);
            loop {
                interval.tick().await;
                let changes = debouncer.drain_ready();
                if !changes.is_empty() {
                    apply_changes(&changes, &scanner, &store, &hub).await;
                }
            }
        });

        Ok(Self {
            _watcher: watcher,
            tasks: vec![recorder, processor],
        })
    }
}

impl Drop for ChangeWatcher {
    fn drop(&mut self) {
        for task in &self.tasks {
            task.abort();
        }
    }
}

fn compile_patterns(patterns: Option<&[String]>) -> Vec<glob::Pattern> {
    let compile = |pattern: &str| match glob::Pattern::new(pattern) {
        Ok(compiled) => Some(compiled),
        Err(e) => {
            tracing::warn!(pattern, error = %e, "Ignoring invalid watch pattern");
            None
        }
    };
    match patterns {
        Some(patterns) => patterns.iter().filter_map(|p| compile(p)).collect(),
        None => DEFAULT_WATCH_PATTERNS
            .iter()
            .filter_map(|p| compile(p))
            .collect(),
    }
}

fn record_event(
    event: &Event,
    source_dir: &Path,
    patterns: &[glob::Pattern],
    debouncer: &Debouncer,
) {
    let kind = match event.kind {
        EventKind::Create(_) => ChangeKind::Created,
        EventKind::Modify(_) => ChangeKind::Modified,
        EventKind::Remove(_) => ChangeKind::Removed,
        _ => return,
    };

    for path in &event.paths {
        if matches_patterns(path, source_dir, patterns) {
            tracing::debug!(path = %path.display(), ?kind, "Recorded content change");
            debouncer.record(path.clone(), kind);
        }
    }
}

/// Whether a path below `source_dir` is watched.
///
/// Hidden files and directories never are.
fn matches_patterns(path: &Path, source_dir: &Path, patterns: &[glob::Pattern]) -> bool {
    let Ok(relative) = path.strip_prefix(source_dir) else {
        return false;
    };
    if relative
        .components()
        .any(|c| c.as_os_str().to_string_lossy().starts_with('.'))
    {
        return false;
    }

    let relative = relative.to_string_lossy();
    patterns.iter().any(|pattern| pattern.matches(&relative))
}

/// Rescan, swap the generation and publish the affected routes.
async fn apply_changes(
    changes: &[Change],
    scanner: &Arc<Scanner>,
    store: &ContentStore,
    hub: &HubHandle,
) {
    let start = Instant::now();

    let rescan = {
        let scanner = Arc::clone(scanner);
        tokio::task::spawn_blocking(move || scanner.scan()).await
    };
    match rescan {
        Ok(Ok(index)) => store.replace(index),
        Ok(Err(e)) => {
            tracing::warn!(error = %e, "Rescan failed, keeping previous content");
            return;
        }
        Err(e) => {
            tracing::error!(error = %e, "Rescan task failed");
            return;
        }
    }

    let routes = affected_routes(changes, scanner);
    tracing::info!(
        changes = changes.len(),
        routes = routes.len(),
        elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
        "Content reloaded"
    );
    for route in routes {
        hub.publish(route);
    }
}

fn affected_routes(changes: &[Change], scanner: &Scanner) -> BTreeSet<Route> {
    changes
        .iter()
        .filter_map(|change| scanner.item_route_for(&change.path))
        .collect()
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    fn patterns(list: &[&str]) -> Vec<glob::Pattern> {
        list.iter().map(|p| glob::Pattern::new(p).unwrap()).collect()
    }

    #[test]
    fn test_default_patterns_match_everything_visible() {
        let source_dir = PathBuf::from("/content");
        let patterns = compile_patterns(None);

        assert!(matches_patterns(Path::new("/content/a/index.md"), &source_dir, &patterns));
        assert!(matches_patterns(Path::new("/content/a/files/x.png"), &source_dir, &patterns));
        assert!(!matches_patterns(Path::new("/content/.git/HEAD"), &source_dir, &patterns));
        assert!(!matches_patterns(Path::new("/content/a/.index.md.swp"), &source_dir, &patterns));
    }

    #[test]
    fn test_configured_patterns() {
        let source_dir = PathBuf::from("/content");
        let patterns = patterns(&["**/*.md"]);

        assert!(matches_patterns(Path::new("/content/a/b/index.md"), &source_dir, &patterns));
        assert!(!matches_patterns(Path::new("/content/a/files/x.png"), &source_dir, &patterns));
    }

    #[test]
    fn test_outside_source_dir_ignored() {
        let patterns = compile_patterns(None);

        assert!(!matches_patterns(
            Path::new("/elsewhere/index.md"),
            Path::new("/content"),
            &patterns
        ));
    }

    #[test]
    fn test_invalid_pattern_skipped() {
        let configured = vec!["[".to_owned(), "*.md".to_owned()];

        assert_eq!(compile_patterns(Some(&configured)).len(), 1);
    }

    #[test]
    fn test_affected_routes_deduplicated() {
        let scanner = Scanner::new("/content");
        let changes = [
            Change {
                path: PathBuf::from("/content/guide/index.md"),
                kind: ChangeKind::Modified,
            },
            Change {
                path: PathBuf::from("/content/guide/files/shot.png"),
                kind: ChangeKind::Created,
            },
            Change {
                path: PathBuf::from("/content/news/index.md"),
                kind: ChangeKind::Removed,
            },
        ];

        let routes: Vec<Route> = affected_routes(&changes, &scanner).into_iter().collect();

        assert_eq!(
            routes,
            vec![Route::parse("guide").unwrap(), Route::parse("news").unwrap()]
        );
    }

    #[tokio::test]
    async fn test_edit_publishes_item_route() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().canonicalize().unwrap();
        std::fs::create_dir_all(root.join("guide")).unwrap();
        std::fs::write(root.join("guide/index.md"), "# Guide\n").unwrap();

        let scanner = Arc::new(Scanner::new(&root));
        let store = ContentStore::new(scanner.scan().unwrap());
        let (hub, _task) = super::super::hub::Hub::spawn(4);
        let mut subscription = hub.register(Route::parse("guide").unwrap());
        let _watcher = ChangeWatcher::start(
            Arc::clone(&scanner),
            None,
            Duration::from_millis(20),
            store.clone(),
            hub.clone(),
        )
        .unwrap();

        // Give the platform watcher a moment to arm.
        tokio::time::sleep(Duration::from_millis(200)).await;
        std::fs::write(root.join("guide/index.md"), "# Updated guide\n").unwrap();

        let event = tokio::time::timeout(Duration::from_secs(5), subscription.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(event.route, Route::parse("guide").unwrap());
        let index = store.snapshot();
        let guide = index.get(&Route::parse("guide").unwrap()).unwrap();
        assert_eq!(guide.title, "Updated guide");
    }
}
