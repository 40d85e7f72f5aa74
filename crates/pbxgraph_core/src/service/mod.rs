//! Graph editing services.
//!
//! # Responsibility
//! - Low-level helpers over the object store: group hierarchy, build
//!   phases and build settings.
//! - Capability traits (`ProjectFiles`, `ProjectGroups`, `ProjectFlags`)
//!   composing those helpers into the public editing API.
//!
//! # Invariants
//! - Every operation validates its inputs before the first mutation.
//! - Soft no-ops return empty results; only `ProjectError` is a hard failure.

pub mod build_phase;
pub mod build_settings;
pub mod group_tree;
pub mod project_files;
pub mod project_flags;
pub mod project_groups;

use crate::config::ConfigError;
use crate::model::id::ObjectId;
use crate::store::StoreError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ProjectResult<T> = Result<T, ProjectError>;

/// Hard failures of graph editing operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProjectError {
    /// The extension is outside the classifier table and no fallback was
    /// requested.
    UnknownFileExtension(String),
    /// Explicit parent id is not in the graph.
    ParentNotFound(ObjectId),
    /// Explicit parent exists but is not a group.
    ParentNotGroup(ObjectId),
    Config(ConfigError),
    Store(StoreError),
}

impl Display for ProjectError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownFileExtension(ext) => write!(f, "unknown file extension: {ext}"),
            Self::ParentNotFound(id) => write!(f, "parent group not found: {id}"),
            Self::ParentNotGroup(id) => write!(f, "parent is not a group: {id}"),
            Self::Config(err) => write!(f, "{err}"),
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ProjectError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Config(err) => Some(err),
            Self::Store(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ConfigError> for ProjectError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<StoreError> for ProjectError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

impl ProjectError {
    /// Stable code used in `error_code=` log fields.
    pub fn code(&self) -> &'static str {
        match self {
            Self::UnknownFileExtension(_) => "unknown_file_extension",
            Self::ParentNotFound(_) => "parent_not_found",
            Self::ParentNotGroup(_) => "parent_not_group",
            Self::Config(_) => "invalid_config",
            Self::Store(_) => "store_failure",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ProjectError;
    use crate::config::ConfigError;
    use crate::model::id::ObjectId;
    use crate::model::source_tree::SourceTree;
    use std::error::Error;

    #[test]
    fn unknown_extension_message_names_extension() {
        let err = ProjectError::UnknownFileExtension("unknowntype".to_string());
        assert_eq!(err.to_string(), "unknown file extension: unknowntype");
        assert_eq!(err.code(), "unknown_file_extension");
    }

    #[test]
    fn wrapped_errors_expose_source() {
        let err = ProjectError::from(ConfigError::EmptyRoot(SourceTree::SourceRoot));
        assert!(err.source().is_some());
        assert!(ProjectError::ParentNotGroup(ObjectId::from("1"))
            .source()
            .is_none());
    }
}
