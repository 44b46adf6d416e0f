//! Detection of service directories.
//!
//! A directory qualifies as a service when every marker path exists under
//! it. Detection only reads the filesystem.

use crate::constants::MARKER_FILES;
use crate::error::{Error, Result};
use log::{debug, warn};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// A qualifying service directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppDirectory {
    pub path: PathBuf,
    /// Final path segment of `path`
    pub name: String,
}

/// Finds qualifying service directories directly under a root.
#[derive(Debug, Clone)]
pub struct AppDetector {
    markers: Vec<String>,
}

impl AppDetector {
    pub fn new() -> Self {
        Self::with_markers(MARKER_FILES)
    }

    pub fn with_markers<I, S>(markers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { markers: markers.into_iter().map(Into::into).collect() }
    }

    pub fn markers(&self) -> &[String] {
        &self.markers
    }

    /// True when every marker exists under `dir`. Stops at the first missing marker.
    pub fn qualifies(&self, dir: &Path) -> bool {
        match self.markers.iter().find(|marker| !dir.join(marker).exists()) {
            Some(missing) => {
                debug!("Skipping '{}': missing '{}'", dir.display(), missing);
                false
            }
            None => true,
        }
    }

    /// Lists the immediate subdirectories of `root` that qualify, in
    /// filesystem listing order. Symlinked directories count. An empty
    /// result is not an error.
    ///
    /// # Errors
    /// * `Error::FileSystemError` if `root` cannot be listed
    pub fn detect(&self, root: &Path) -> Result<Vec<AppDirectory>> {
        let mut apps = Vec::new();
        for entry in WalkDir::new(root).min_depth(1).max_depth(1).follow_links(true) {
            let entry = match entry {
                Ok(entry) => entry,
                // Dangling links and unreadable entries only disqualify themselves.
                Err(e) if e.depth() > 0 => {
                    warn!("Skipping {}", e);
                    continue;
                }
                Err(e) => {
                    let path = e.path().unwrap_or(root).to_path_buf();
                    return Err(Error::fs(path, e.into()));
                }
            };
            if !entry.file_type().is_dir() {
                continue;
            }
            let path = entry.path();
            if !self.qualifies(path) {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            debug!("Detected service '{}' at {}", name, path.display());
            apps.push(AppDirectory { path: path.to_path_buf(), name });
        }
        Ok(apps)
    }
}

impl Default for AppDetector {
    fn default() -> Self {
        AppDetector::new()
    }
}
