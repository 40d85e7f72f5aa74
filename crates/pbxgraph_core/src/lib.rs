//! Object-graph editing engine for Xcode project files.
//! Owns the in-memory `objects` graph of a decoded project plist and keeps its
//! cross-references consistent while files, groups and settings change.

pub mod config;
pub mod logging;
pub mod model;
pub mod project;
pub mod resolve;
pub mod service;
pub mod store;

pub use config::{ConfigError, EngineConfig};
pub use logging::{default_log_level, init_logging, init_stderr_logging, logging_status, LogSink};
pub use model::id::ObjectId;
pub use model::object::{ObjectKind, PhaseKind, ProjectObject, TargetKind};
pub use model::source_tree::{SourceTree, SourceTreeParseError};
pub use model::value::PlistValue;
pub use project::{ProjectDocument, XcodeProject};
pub use resolve::fs_probe::{KnownPaths, LocalFileSystem, PathProbe};
pub use service::project_files::{AddFileOptions, AddFileOutcome, ProjectFiles};
pub use service::project_flags::ProjectFlags;
pub use service::project_groups::ProjectGroups;
pub use service::{ProjectError, ProjectResult};
pub use store::object_store::ObjectStore;
pub use store::{StoreError, StoreResult};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
