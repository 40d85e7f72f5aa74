//! Project document and the editing engine that owns it.
//!
//! # Responsibility
//! - Map the top-level project plist (`objects`, `rootObject`, the rest).
//! - Own one document together with its configuration and filesystem probe.
//!
//! # Invariants
//! - Top-level keys other than `objects` and `rootObject` round-trip
//!   untouched.
//! - A constructed `XcodeProject` always carries a validated configuration.
//! - Only build phases created through this engine instance are ever
//!   deleted by it; phases present in the loaded document are kept.
//!
//! # See also
//! - `service` for the editing capabilities implemented on `XcodeProject`.

use crate::config::EngineConfig;
use crate::model::id::ObjectId;
use crate::model::object::ProjectObject;
use crate::model::source_tree::SourceTree;
use crate::model::value::PlistValue;
use crate::resolve::fs_probe::{LocalFileSystem, PathProbe};
use crate::resolve::tree_resolver::{self, ResolvedPath};
use crate::service::build_phase;
use crate::service::group_tree::GroupTree;
use crate::service::ProjectResult;
use crate::store::object_store::ObjectStore;
use log::warn;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fmt::{Debug, Formatter};
use std::path::Path;

/// Top-level mapping of a project file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectDocument {
    pub objects: ObjectStore,
    #[serde(
        rename = "rootObject",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub root_object: Option<ObjectId>,
    /// `archiveVersion`, `objectVersion`, `classes` and anything else.
    #[serde(flatten)]
    pub extra: BTreeMap<String, PlistValue>,
}

impl ProjectDocument {
    pub fn new(objects: ObjectStore, root_object: Option<ObjectId>) -> Self {
        Self {
            objects,
            root_object,
            extra: BTreeMap::new(),
        }
    }
}

/// Editing engine over one project document.
///
/// File, group and build-setting operations are provided through the
/// [`ProjectFiles`](crate::ProjectFiles), [`ProjectGroups`](crate::ProjectGroups)
/// and [`ProjectFlags`](crate::ProjectFlags) traits.
pub struct XcodeProject {
    document: ProjectDocument,
    config: EngineConfig,
    probe: Box<dyn PathProbe>,
    created_phases: HashSet<ObjectId>,
}

impl XcodeProject {
    /// Creates an engine probing the local filesystem.
    ///
    /// # Errors
    /// - `ProjectError::Config` when a configured root is empty or relative.
    pub fn new(document: ProjectDocument, config: EngineConfig) -> ProjectResult<Self> {
        Self::with_probe(document, config, LocalFileSystem)
    }

    /// Creates an engine answering existence checks through `probe`.
    pub fn with_probe(
        document: ProjectDocument,
        config: EngineConfig,
        probe: impl PathProbe + 'static,
    ) -> ProjectResult<Self> {
        if let Err(err) = config.validate() {
            warn!(
                "event=project_open module=project status=error error_code=invalid_config error={}",
                crate::logging::log_value(&err.to_string())
            );
            return Err(err.into());
        }
        Ok(Self {
            document,
            config,
            probe: Box::new(probe),
            created_phases: HashSet::new(),
        })
    }

    pub fn document(&self) -> &ProjectDocument {
        &self.document
    }

    pub fn into_document(self) -> ProjectDocument {
        self.document
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn objects(&self) -> &ObjectStore {
        &self.document.objects
    }

    pub fn object(&self, id: &str) -> Option<&ProjectObject> {
        self.document.objects.get(id)
    }

    /// Target ids, all of them or only those named `name`.
    pub fn get_targets(&self, name: Option<&str>) -> Vec<ObjectId> {
        build_phase::targets(&self.document.objects, name)
    }

    pub fn get_target_by_name(&self, name: &str) -> Option<ObjectId> {
        self.get_targets(Some(name)).into_iter().next()
    }

    /// Every build phase whose isa equals `isa`.
    pub fn get_build_phases_by_name(&self, isa: &str) -> Vec<ObjectId> {
        build_phase::phases_with_isa(&self.document.objects, isa)
    }

    pub(crate) fn store(&self) -> &ObjectStore {
        &self.document.objects
    }

    pub(crate) fn store_mut(&mut self) -> &mut ObjectStore {
        &mut self.document.objects
    }

    pub(crate) fn root_object(&self) -> Option<&str> {
        self.document.root_object.as_ref().map(ObjectId::as_str)
    }

    pub(crate) fn record_created_phases(&mut self, phases: impl IntoIterator<Item = ObjectId>) {
        self.created_phases.extend(phases);
    }

    /// Stops tracking `phase`; `true` when this engine had created it.
    pub(crate) fn forget_created_phase(&mut self, phase: &str) -> bool {
        self.created_phases.remove(phase)
    }

    pub(crate) fn group_tree(&self) -> GroupTree<'_> {
        GroupTree::new(&self.document.objects, self.root_object())
    }

    /// Places `path` against the configured roots.
    pub(crate) fn resolve_path(
        &self,
        path: &Path,
        tree: Option<SourceTree>,
    ) -> Option<ResolvedPath> {
        tree_resolver::resolve(path, tree, &self.config, self.probe.as_ref())
    }
}

impl Debug for XcodeProject {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("XcodeProject")
            .field("document", &self.document)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::{ProjectDocument, XcodeProject};
    use crate::config::EngineConfig;
    use crate::model::id::ObjectId;
    use crate::model::object::{keys, ProjectObject};
    use crate::model::value::PlistValue;
    use crate::resolve::fs_probe::KnownPaths;
    use crate::service::ProjectError;
    use crate::store::object_store::ObjectStore;

    fn document() -> ProjectDocument {
        let mut objects = ObjectStore::new();
        objects
            .insert_with_id(
                ObjectId::from("target"),
                ProjectObject::new("PBXNativeTarget")
                    .with(keys::NAME, "app")
                    .with(keys::BUILD_PHASES, PlistValue::string_array(["phase"])),
            )
            .expect("target");
        objects
            .insert_with_id(
                ObjectId::from("phase"),
                ProjectObject::new("PBXSourcesBuildPhase"),
            )
            .expect("phase");
        ProjectDocument::new(objects, None)
    }

    #[test]
    fn rejects_invalid_config() {
        let err = XcodeProject::with_probe(
            document(),
            EngineConfig::new("relative/root"),
            KnownPaths::default(),
        )
        .expect_err("relative root must fail");
        assert!(matches!(err, ProjectError::Config(_)));
    }

    #[test]
    fn exposes_targets_and_phases() {
        let project = XcodeProject::with_probe(
            document(),
            EngineConfig::new("/work/app"),
            KnownPaths::default(),
        )
        .expect("project");
        assert_eq!(project.get_target_by_name("app"), Some(ObjectId::from("target")));
        assert_eq!(project.get_target_by_name("missing"), None);
        assert_eq!(
            project.get_build_phases_by_name("PBXSourcesBuildPhase"),
            vec![ObjectId::from("phase")]
        );
        assert!(project.object("target").is_some());
        assert_eq!(project.objects().len(), 2);
        assert_eq!(project.into_document(), document());
    }

    #[test]
    fn document_keeps_unknown_top_level_keys() {
        let json = r#"{
            "archiveVersion": "1",
            "objects": {
                "AB": { "isa": "PBXGroup", "children": [] }
            },
            "objectVersion": "46",
            "rootObject": "AB"
        }"#;
        let document: ProjectDocument = serde_json::from_str(json).expect("parse document");
        assert_eq!(document.root_object, Some(ObjectId::from("AB")));
        assert_eq!(
            document.extra.get("objectVersion"),
            Some(&PlistValue::from("46"))
        );
        let rendered = serde_json::to_value(&document).expect("render document");
        assert_eq!(rendered["archiveVersion"], "1");
        assert_eq!(rendered["objects"]["AB"]["isa"], "PBXGroup");
    }
}
