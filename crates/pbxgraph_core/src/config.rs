//! Engine configuration.
//!
//! # Responsibility
//! - Describe the directories the symbolic source trees expand to.
//! - Reject configurations the tree resolver cannot work with.
//!
//! # Invariants
//! - Every configured root is an absolute path after `validate()`.

use crate::model::source_tree::SourceTree;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

/// Directory roots backing the symbolic source trees.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Directory holding the `.xcodeproj` bundle (`SOURCE_ROOT`).
    pub source_root: PathBuf,
    #[serde(default)]
    pub built_products_dir: Option<PathBuf>,
    #[serde(default)]
    pub sdk_root: Option<PathBuf>,
    #[serde(default)]
    pub developer_dir: Option<PathBuf>,
}

impl EngineConfig {
    /// Creates a configuration with only the project root set.
    pub fn new(source_root: impl Into<PathBuf>) -> Self {
        Self {
            source_root: source_root.into(),
            built_products_dir: None,
            sdk_root: None,
            developer_dir: None,
        }
    }

    /// Directory backing `tree`, when one is configured.
    pub fn root_for(&self, tree: SourceTree) -> Option<&Path> {
        match tree {
            SourceTree::SourceRoot => Some(self.source_root.as_path()),
            SourceTree::BuiltProductsDir => self.built_products_dir.as_deref(),
            SourceTree::SdkRoot => self.sdk_root.as_deref(),
            SourceTree::DeveloperDir => self.developer_dir.as_deref(),
            SourceTree::Absolute | SourceTree::Group => None,
        }
    }

    /// Validates that every configured root is absolute.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for tree in SourceTree::ROOTS {
            if let Some(root) = self.root_for(tree) {
                if root.as_os_str().is_empty() {
                    return Err(ConfigError::EmptyRoot(tree));
                }
                if !root.is_absolute() {
                    return Err(ConfigError::RelativeRoot {
                        tree,
                        path: root.to_path_buf(),
                    });
                }
            }
        }
        Ok(())
    }
}

/// Configuration validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    EmptyRoot(SourceTree),
    RelativeRoot { tree: SourceTree, path: PathBuf },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyRoot(tree) => write!(f, "root for `{tree}` must not be empty"),
            Self::RelativeRoot { tree, path } => write!(
                f,
                "root for `{tree}` must be an absolute path, got `{}`",
                path.display()
            ),
        }
    }
}

impl Error for ConfigError {}
