//! Source-tree resolution for candidate file paths.
//!
//! # Responsibility
//! - Decide which symbolic root a new file reference is expressed against.
//! - Rewrite absolute paths under a configured root into root-relative form.
//!
//! # Invariants
//! - Resolution never fails hard: an unplaceable path yields `None`.
//! - Stored paths always use `/` separators.

use crate::config::EngineConfig;
use crate::model::source_tree::SourceTree;
use crate::resolve::fs_probe::PathProbe;
use std::path::{Component, Path, PathBuf};

/// Placement decided for one candidate path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPath {
    /// Root the stored path is relative to.
    pub tree: SourceTree,
    /// Path as written to the file reference.
    pub path: String,
    /// The caller's absolute path, when one was given.
    pub absolute: Option<PathBuf>,
}

impl ResolvedPath {
    /// Last path segment, used as the file reference name.
    pub fn file_name(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or(self.path.as_str())
    }

    /// Extension of the last segment, without the dot.
    pub fn extension(&self) -> Option<&str> {
        Path::new(self.file_name())
            .extension()
            .and_then(|value| value.to_str())
    }

    /// Search-path entry locating this file's directory.
    ///
    /// Only absolute additions produce a fragment; project-relative adds
    /// never touch build settings.
    pub fn search_path_fragment(&self) -> Option<String> {
        self.absolute.as_ref()?;
        let dir = match self.path.rfind('/') {
            Some(index) => &self.path[..index],
            None => "",
        };
        match self.tree {
            SourceTree::Group => None,
            SourceTree::Absolute => Some(if dir.is_empty() { "/" } else { dir }.to_string()),
            tree => {
                let variable = tree.setting_variable()?;
                if dir.is_empty() {
                    Some(format!("$({variable})"))
                } else {
                    Some(format!("$({variable})/{dir}"))
                }
            }
        }
    }
}

/// Resolves `path` against `explicit_tree` and the configured roots.
///
/// Returns `None` when the path cannot be placed:
/// - it has no file-name segment (`.`, `..`, `/`) or is not UTF-8;
/// - it is absolute but missing on the probe;
/// - it is relative, no tree is given, and it is missing under the project root;
/// - it is relative and the explicit tree is `<absolute>`.
pub fn resolve(
    path: &Path,
    explicit_tree: Option<SourceTree>,
    config: &EngineConfig,
    probe: &dyn PathProbe,
) -> Option<ResolvedPath> {
    path.file_name()?;

    if path.is_absolute() {
        return resolve_absolute(path, explicit_tree, config, probe);
    }

    let relative = relative_to_plist(path)?;
    match explicit_tree {
        Some(SourceTree::Absolute) => None,
        Some(tree) => Some(ResolvedPath {
            tree,
            path: relative,
            absolute: None,
        }),
        None => {
            if !probe.exists(&config.source_root.join(path)) {
                return None;
            }
            Some(ResolvedPath {
                tree: SourceTree::Group,
                path: relative,
                absolute: None,
            })
        }
    }
}

fn resolve_absolute(
    path: &Path,
    explicit_tree: Option<SourceTree>,
    config: &EngineConfig,
    probe: &dyn PathProbe,
) -> Option<ResolvedPath> {
    if !probe.exists(path) {
        return None;
    }

    let candidates: &[SourceTree] = match explicit_tree {
        Some(ref tree) => std::slice::from_ref(tree),
        None => &SourceTree::ROOTS,
    };
    for tree in candidates {
        let Some(root) = config.root_for(*tree) else {
            continue;
        };
        if let Some(relative) = path
            .strip_prefix(root)
            .ok()
            .and_then(relative_to_plist)
            .filter(|value| !value.is_empty())
        {
            return Some(ResolvedPath {
                tree: *tree,
                path: relative,
                absolute: Some(path.to_path_buf()),
            });
        }
    }

    Some(ResolvedPath {
        tree: SourceTree::Absolute,
        path: path.to_str()?.to_string(),
        absolute: Some(path.to_path_buf()),
    })
}

fn relative_to_plist(path: &Path) -> Option<String> {
    let mut segments = Vec::new();
    for component in path.components() {
        match component {
            Component::Normal(value) => segments.push(value.to_str()?),
            Component::ParentDir => segments.push(".."),
            Component::CurDir => {}
            Component::RootDir | Component::Prefix(_) => return None,
        }
    }
    Some(segments.join("/"))
}
