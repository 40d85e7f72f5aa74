//! Project record model.
//!
//! # Responsibility
//! - Represent one graph node: an `isa` tag plus an open attribute bag.
//! - Classify records into a closed set of kinds the engine understands.
//!
//! # Invariants
//! - `isa` is never stored inside `attributes`; it is written first on
//!   serialization and read back into its own field.
//! - Records of kind `Other` are never mutated by the engine.

use crate::model::id::ObjectId;
use crate::model::value::PlistValue;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const ISA_PROJECT: &str = "PBXProject";
pub const ISA_GROUP: &str = "PBXGroup";
pub const ISA_VARIANT_GROUP: &str = "PBXVariantGroup";
pub const ISA_FILE_REFERENCE: &str = "PBXFileReference";
pub const ISA_BUILD_FILE: &str = "PBXBuildFile";
pub const ISA_NATIVE_TARGET: &str = "PBXNativeTarget";
pub const ISA_AGGREGATE_TARGET: &str = "PBXAggregateTarget";
pub const ISA_LEGACY_TARGET: &str = "PBXLegacyTarget";
pub const ISA_CONFIGURATION_LIST: &str = "XCConfigurationList";
pub const ISA_BUILD_CONFIGURATION: &str = "XCBuildConfiguration";

/// Well-known attribute keys.
pub mod keys {
    pub const BUILD_ACTION_MASK: &str = "buildActionMask";
    pub const BUILD_CONFIGURATION_LIST: &str = "buildConfigurationList";
    pub const BUILD_CONFIGURATIONS: &str = "buildConfigurations";
    pub const BUILD_PHASES: &str = "buildPhases";
    pub const BUILD_SETTINGS: &str = "buildSettings";
    pub const CHILDREN: &str = "children";
    pub const DST_PATH: &str = "dstPath";
    pub const DST_SUBFOLDER_SPEC: &str = "dstSubfolderSpec";
    pub const FILE_REF: &str = "fileRef";
    pub const FILES: &str = "files";
    pub const LAST_KNOWN_FILE_TYPE: &str = "lastKnownFileType";
    pub const MAIN_GROUP: &str = "mainGroup";
    pub const NAME: &str = "name";
    pub const PATH: &str = "path";
    pub const RUN_ONLY_FOR_DEPLOYMENT_POSTPROCESSING: &str = "runOnlyForDeploymentPostprocessing";
    pub const SETTINGS: &str = "settings";
    pub const ATTRIBUTES: &str = "ATTRIBUTES";
    pub const SOURCE_TREE: &str = "sourceTree";
}

/// Build phase variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PhaseKind {
    Sources,
    Frameworks,
    Resources,
    CopyFiles,
    Headers,
    ShellScript,
    Generic,
}

impl PhaseKind {
    pub fn isa(self) -> &'static str {
        match self {
            Self::Sources => "PBXSourcesBuildPhase",
            Self::Frameworks => "PBXFrameworksBuildPhase",
            Self::Resources => "PBXResourcesBuildPhase",
            Self::CopyFiles => "PBXCopyFilesBuildPhase",
            Self::Headers => "PBXHeadersBuildPhase",
            Self::ShellScript => "PBXShellScriptBuildPhase",
            Self::Generic => "PBXGenericBuildPhase",
        }
    }

    fn from_isa(isa: &str) -> Option<Self> {
        match isa {
            "PBXSourcesBuildPhase" => Some(Self::Sources),
            "PBXFrameworksBuildPhase" => Some(Self::Frameworks),
            "PBXResourcesBuildPhase" => Some(Self::Resources),
            "PBXCopyFilesBuildPhase" => Some(Self::CopyFiles),
            "PBXHeadersBuildPhase" => Some(Self::Headers),
            "PBXShellScriptBuildPhase" => Some(Self::ShellScript),
            "PBXGenericBuildPhase" => Some(Self::Generic),
            _ => None,
        }
    }
}

/// Target variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetKind {
    Native,
    Aggregate,
    Legacy,
    /// Any other `*Target` isa.
    Other,
}

/// Closed classification of record kinds, derived from `isa`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    Project,
    Group,
    FileReference,
    BuildFile,
    BuildPhase(PhaseKind),
    Target(TargetKind),
    ConfigurationList,
    BuildConfiguration,
    Other,
}

impl ObjectKind {
    pub fn from_isa(isa: &str) -> Self {
        if let Some(phase) = PhaseKind::from_isa(isa) {
            return Self::BuildPhase(phase);
        }
        match isa {
            ISA_PROJECT => Self::Project,
            ISA_GROUP | ISA_VARIANT_GROUP => Self::Group,
            ISA_FILE_REFERENCE => Self::FileReference,
            ISA_BUILD_FILE => Self::BuildFile,
            ISA_NATIVE_TARGET => Self::Target(TargetKind::Native),
            ISA_AGGREGATE_TARGET => Self::Target(TargetKind::Aggregate),
            ISA_LEGACY_TARGET => Self::Target(TargetKind::Legacy),
            ISA_CONFIGURATION_LIST => Self::ConfigurationList,
            ISA_BUILD_CONFIGURATION => Self::BuildConfiguration,
            other if other.ends_with("Target") => Self::Target(TargetKind::Other),
            _ => Self::Other,
        }
    }

    pub fn is_target(self) -> bool {
        matches!(self, Self::Target(_))
    }
}

/// One record of the project object graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectObject {
    isa: String,
    #[serde(flatten)]
    attributes: BTreeMap<String, PlistValue>,
}

impl ProjectObject {
    /// Creates an empty record of the given `isa`.
    pub fn new(isa: impl Into<String>) -> Self {
        Self {
            isa: isa.into(),
            attributes: BTreeMap::new(),
        }
    }

    /// Builder-style attribute setter.
    pub fn with(mut self, key: &str, value: impl Into<PlistValue>) -> Self {
        self.set(key, value);
        self
    }

    pub fn isa(&self) -> &str {
        self.isa.as_str()
    }

    pub fn kind(&self) -> ObjectKind {
        ObjectKind::from_isa(&self.isa)
    }

    pub fn attributes(&self) -> &BTreeMap<String, PlistValue> {
        &self.attributes
    }

    pub fn get(&self, key: &str) -> Option<&PlistValue> {
        self.attributes.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut PlistValue> {
        self.attributes.get_mut(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(PlistValue::as_str)
    }

    pub fn set(&mut self, key: &str, value: impl Into<PlistValue>) {
        self.attributes.insert(key.to_string(), value.into());
    }

    pub fn remove(&mut self, key: &str) -> Option<PlistValue> {
        self.attributes.remove(key)
    }

    /// `name` when present, otherwise `path`.
    pub fn display_name(&self) -> Option<&str> {
        self.get_str(keys::NAME).or_else(|| self.get_str(keys::PATH))
    }

    /// Reads a list-of-ids attribute such as `children` or `files`.
    ///
    /// A missing attribute reads as an empty list.
    pub fn id_list(&self, key: &str) -> Vec<ObjectId> {
        self.get(key)
            .and_then(PlistValue::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(PlistValue::as_str)
                    .map(ObjectId::from)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Returns whether a list-of-ids attribute contains `id`.
    pub fn list_contains(&self, key: &str, id: &str) -> bool {
        self.get(key)
            .and_then(PlistValue::as_array)
            .is_some_and(|items| items.iter().any(|item| item.as_str() == Some(id)))
    }

    /// Appends `id` to a list attribute, creating the list when missing.
    pub fn push_id(&mut self, key: &str, id: &ObjectId) {
        let entry = self
            .attributes
            .entry(key.to_string())
            .or_insert_with(|| PlistValue::Array(Vec::new()));
        match entry.as_array_mut() {
            Some(items) => items.push(PlistValue::from(id.as_str())),
            None => *entry = PlistValue::string_array([id.as_str()]),
        }
    }

    /// Removes every occurrence of `id` from a list attribute.
    ///
    /// Returns `false` when nothing was removed.
    pub fn remove_id(&mut self, key: &str, id: &str) -> bool {
        let Some(items) = self.attributes.get_mut(key).and_then(PlistValue::as_array_mut) else {
            return false;
        };
        let before = items.len();
        items.retain(|item| item.as_str() != Some(id));
        items.len() != before
    }
}
