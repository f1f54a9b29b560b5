//! Build-dependency tracking for declaration files
//!
//! Discovery reports every declaration file it reads, so that a host caching
//! the compiled registry can invalidate the cache when one of them changes.

use std::path::{Path, PathBuf};

/// Receives the path of every declaration file the pipeline reads
pub trait ResourceTracker {
    fn track(&mut self, path: &Path);
}

/// Tracker for hosts that do not cache the registry
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopTracker;

impl ResourceTracker for NoopTracker {
    fn track(&mut self, _path: &Path) {}
}

/// Tracker that keeps every reported path, in report order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordingTracker {
    paths: Vec<PathBuf>,
}

impl RecordingTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Paths reported so far
    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    pub fn into_paths(self) -> Vec<PathBuf> {
        self.paths
    }
}

impl ResourceTracker for RecordingTracker {
    fn track(&mut self, path: &Path) {
        self.paths.push(path.to_path_buf());
    }
}

impl<T: ResourceTracker + ?Sized> ResourceTracker for &mut T {
    fn track(&mut self, path: &Path) {
        (**self).track(path);
    }
}
