//! Filesystem existence probe.
//!
//! The engine never touches the filesystem beyond asking whether a path
//! exists; this seam lets embedders and tests answer that question.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// Read-only existence check used during path resolution.
pub trait PathProbe {
    fn exists(&self, path: &Path) -> bool;
}

/// Probe backed by the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFileSystem;

impl PathProbe for LocalFileSystem {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }
}

/// Probe answering from a fixed set of paths.
#[derive(Debug, Clone, Default)]
pub struct KnownPaths {
    paths: BTreeSet<PathBuf>,
}

impl KnownPaths {
    pub fn new<I, P>(paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            paths: paths.into_iter().map(Into::into).collect(),
        }
    }
}

impl PathProbe for KnownPaths {
    fn exists(&self, path: &Path) -> bool {
        self.paths.contains(path)
    }
}

#[cfg(test)]
mod tests {
    use super::{KnownPaths, LocalFileSystem, PathProbe};
    use std::path::Path;

    #[test]
    fn known_paths_answers_exact_matches() {
        let probe = KnownPaths::new(["/a/b.framework"]);
        assert!(probe.exists(Path::new("/a/b.framework")));
        assert!(!probe.exists(Path::new("/a")));
    }

    #[test]
    fn local_file_system_sees_temp_dir() {
        assert!(LocalFileSystem.exists(&std::env::temp_dir()));
    }
}
