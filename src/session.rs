use crate::config::Config;
use crate::models::{FeatureRef, ObjectId};
use crate::selection::{SelectionChange, SelectionStore};
use crate::traits::Chrome;
use indexmap::IndexSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::JoinHandle;

/// Boundary geometry per park name, filled lazily and kept for the process lifetime.
pub type ParkCache = moka::future::Cache<String, FeatureRef>;

/// State shared by every controller of one map session.
pub struct Session {
    pub config: Config,
    selection: Mutex<SelectionStore>,
    row_highlights: Mutex<IndexSet<ObjectId>>,
    parks: ParkCache,
}

pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl Session {
    pub fn new(config: Config) -> Arc<Self> {
        let parks = moka::future::Cache::builder()
            .max_capacity(config.park_cache_capacity)
            .build();
        Arc::new(Session {
            config,
            selection: Mutex::new(SelectionStore::new()),
            row_highlights: Mutex::new(IndexSet::new()),
            parks,
        })
    }

    pub fn with_selection<R>(&self, f: impl FnOnce(&mut SelectionStore) -> R) -> R {
        f(&mut lock(&self.selection))
    }

    pub fn selection_count(&self) -> usize {
        lock(&self.selection).count()
    }

    pub fn selected_ids(&self) -> Vec<ObjectId> {
        lock(&self.selection).to_vec()
    }

    pub fn is_selected(&self, id: ObjectId) -> bool {
        lock(&self.selection).contains(id)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SelectionChange> {
        lock(&self.selection).subscribe()
    }

    /// Transient ids highlighted in the table because the pointer hovers them on the map.
    pub(crate) fn row_highlights(&self) -> MutexGuard<'_, IndexSet<ObjectId>> {
        lock(&self.row_highlights)
    }

    pub fn row_highlight_ids(&self) -> Vec<ObjectId> {
        self.row_highlights().iter().copied().collect()
    }

    pub fn parks(&self) -> &ParkCache {
        &self.parks
    }

    /// Keeps the "clear selection" button enabled exactly while something is selected.
    pub fn spawn_clear_button_sync(&self, chrome: Arc<dyn Chrome>) -> JoinHandle<()> {
        let mut rx = self.subscribe();
        chrome.set_clear_enabled(self.selection_count() > 0);
        tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(change) => chrome.set_clear_enabled(change.count > 0),
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::debug!(skipped, "selection listener lagged");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        })
    }
}
