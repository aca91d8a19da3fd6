//! Current content generation.

use std::sync::{Arc, PoisonError, RwLock};

use folio_repo::Index;

/// Holds the index snapshot requests are served from.
///
/// Handlers take a snapshot once per request and keep it for the whole
/// response, so a rescan swapping in a new generation never changes content
/// under a request in flight.
#[derive(Clone, Default)]
pub struct ContentStore {
    current: Arc<RwLock<Arc<Index>>>,
}

impl ContentStore {
    /// Create a store serving `index`.
    #[must_use]
    pub fn new(index: Index) -> Self {
        Self {
            current: Arc::new(RwLock::new(Arc::new(index))),
        }
    }

    /// Current index snapshot.
    #[must_use]
    pub fn snapshot(&self) -> Arc<Index> {
        let guard = self.current.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&guard)
    }

    /// Swap in a new generation.
    pub fn replace(&self, index: Index) {
        let index = Arc::new(index);
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = index;
    }
}
