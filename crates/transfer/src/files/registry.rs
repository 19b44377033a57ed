use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use tracing::debug;

use super::file::RsynkFile;

type Snapshot = Arc<HashMap<String, Arc<RsynkFile>>>;

/// The set of files served to clients, keyed by logical path.
///
/// Mutations replace the whole map under the write lock, so every lookup
/// sees either all or none of a batch added with [`TrackedFiles::add`].
/// Lookups hold the read lock only long enough to clone the snapshot.
#[derive(Debug, Default)]
pub struct TrackedFiles {
    files: RwLock<Snapshot>,
}

impl TrackedFiles {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces entries as a single mutation.
    pub fn add(&self, files: impl IntoIterator<Item = RsynkFile>) {
        let files: Vec<_> = files.into_iter().map(Arc::new).collect();
        if files.is_empty() {
            return;
        }

        let mut guard = self.files.write().unwrap_or_else(PoisonError::into_inner);
        let mut next = (**guard).clone();
        for file in files {
            debug!(
                target: "rsynk::registry",
                path = file.path(),
                disk_path = %file.disk_path().display(),
                "tracking file"
            );
            next.insert(file.path().to_owned(), file);
        }
        *guard = Arc::new(next);
    }

    /// Forgets every entry.
    pub fn remove_all(&self) {
        let mut guard = self.files.write().unwrap_or_else(PoisonError::into_inner);
        debug!(target: "rsynk::registry", count = guard.len(), "removing all tracked files");
        *guard = Snapshot::default();
    }

    /// The entry registered under `path`.
    #[must_use]
    pub fn lookup(&self, path: &str) -> Option<Arc<RsynkFile>> {
        self.snapshot().get(path).cloned()
    }

    /// Number of tracked files.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshot().len()
    }

    /// Whether nothing is tracked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshot().is_empty()
    }

    /// Tracked paths in sorted order.
    #[must_use]
    pub fn paths(&self) -> Vec<String> {
        let mut paths: Vec<_> = self.snapshot().keys().cloned().collect();
        paths.sort_unstable();
        paths
    }

    fn snapshot(&self) -> Snapshot {
        Arc::clone(&*self.files.read().unwrap_or_else(PoisonError::into_inner))
    }
}
