//! Coalescing of raw filesystem events.
//!
//! Editors emit bursts of events per save (truncate, write, rename). Events
//! for one path are merged until the path has been quiet for the debounce
//! window.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

/// Kind of change seen on a path.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ChangeKind {
    Created,
    Modified,
    Removed,
}

impl ChangeKind {
    /// Merge a later change into this one.
    ///
    /// `None` means the pair cancels out (created then removed).
    #[allow(clippy::match_same_arms)]
    fn then(self, next: Self) -> Option<Self> {
        use ChangeKind::{Created, Modified, Removed};

        match (self, next) {
            (Created, Created | Modified) => Some(Created),
            (Created, Removed) => None,
            (Modified, Created) => Some(Created),
            (Modified, Modified) => Some(Modified),
            (Modified, Removed) => Some(Removed),
            // Replaced by a new file.
            (Removed, Created) => Some(Modified),
            (Removed, Modified | Removed) => Some(Removed),
        }
    }
}

/// A settled change.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Change {
    pub path: PathBuf,
    pub kind: ChangeKind,
}

struct Pending {
    kind: ChangeKind,
    deadline: Instant,
}

/// Thread-safe per-path debouncer.
///
/// `record` is called from the watcher callback thread, `drain_ready` from
/// the async processing task.
pub(crate) struct Debouncer {
    pending: Mutex<HashMap<PathBuf, Pending>>,
    window: Duration,
}

impl Debouncer {
    pub(crate) fn new(window: Duration) -> Self {
        Self {
            pending: Mutex::new(HashMap::new()),
            window,
        }
    }

    /// Record a change, restarting the path's quiet window.
    pub(crate) fn record(&self, path: PathBuf, kind: ChangeKind) {
        let deadline = Instant::now() + self.window;
        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);

        let merged = match pending.get(&path) {
            Some(existing) => existing.kind.then(kind),
            None => Some(kind),
        };
        match merged {
            Some(kind) => {
                pending.insert(path, Pending { kind, deadline });
            }
            None => {
                pending.remove(&path);
            }
        }
    }

    /// Remove and return every change whose window has passed.
    pub(crate) fn drain_ready(&self) -> Vec<Change> {
        let now = Instant::now();
        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);

        pending
            .extract_if(|_, entry| entry.deadline <= now)
            .map(|(path, entry)| Change {
                path,
                kind: entry.kind,
            })
            .collect()
    }

    /// Whether nothing is waiting.
    pub(crate) fn is_empty(&self) -> bool {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_empty()
    }
}
