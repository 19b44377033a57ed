use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::boundaries::{FileBoundaries, FileBoundariesProvider};

/// A file clients may request, with the provider deciding which bytes of it
/// they get.
#[derive(Clone)]
pub struct RsynkFile {
    path: String,
    disk_path: PathBuf,
    boundaries: Arc<dyn FileBoundariesProvider>,
}

impl RsynkFile {
    /// Serves the whole of `disk_path` under the logical `path`.
    pub fn new(path: impl Into<String>, disk_path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            disk_path: disk_path.into(),
            boundaries: Arc::new(FileBoundaries::whole_file()),
        }
    }

    /// Tracks a file under its own path, as given.
    pub fn at(disk_path: impl Into<PathBuf>) -> Self {
        let disk_path = disk_path.into();
        Self::new(disk_path.to_string_lossy().into_owned(), disk_path)
    }

    /// Replaces the boundaries provider.
    #[must_use]
    pub fn with_boundaries(mut self, provider: impl FileBoundariesProvider + 'static) -> Self {
        self.boundaries = Arc::new(provider);
        self
    }

    /// Registry key requested by clients.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Location on disk.
    #[must_use]
    pub fn disk_path(&self) -> &Path {
        &self.disk_path
    }

    /// Evaluates the provider for one request.
    #[must_use]
    pub fn boundaries(&self) -> FileBoundaries {
        self.boundaries.boundaries()
    }
}

impl fmt::Debug for RsynkFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RsynkFile")
            .field("path", &self.path)
            .field("disk_path", &self.disk_path)
            .finish_non_exhaustive()
    }
}
