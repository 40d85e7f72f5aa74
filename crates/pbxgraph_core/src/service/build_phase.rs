//! Target and build-phase bookkeeping.
//!
//! # Responsibility
//! - Select targets and the phases they own.
//! - Ensure phases of a given kind exist and create build-file records.
//! - Attach and detach build files to and from phases.
//!
//! # Invariants
//! - A target owns at most one phase per kind for our purposes; the first
//!   one in `buildPhases` order wins.
//! - Phases are only created on demand and always carry the canonical
//!   `buildActionMask`, empty `files` and deployment flag.
//! - Callers learn whether a phase was created, so that only phases the
//!   engine created are ever deleted again.

use crate::model::id::ObjectId;
use crate::model::object::{keys, ObjectKind, PhaseKind, ProjectObject, ISA_BUILD_FILE};
use crate::model::value::PlistValue;
use crate::store::object_store::ObjectStore;
use crate::store::StoreResult;
use std::collections::BTreeMap;

/// `buildActionMask` written on new phases.
pub const DEFAULT_BUILD_ACTION_MASK: &str = "2147483647";
/// Name of the copy-files phase embedding frameworks.
pub const EMBED_FRAMEWORKS_PHASE_NAME: &str = "Embed Frameworks";
/// `dstSubfolderSpec` of the frameworks destination.
pub const FRAMEWORKS_SUBFOLDER_SPEC: &str = "10";

/// A phase returned by [`ensure_phase`] or [`ensure_embed_frameworks_phase`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnsuredPhase {
    pub id: ObjectId,
    /// `true` when the phase did not exist and was appended to the target.
    pub created: bool,
}

impl EnsuredPhase {
    fn existing(id: ObjectId) -> Self {
        Self { id, created: false }
    }

    fn created(id: ObjectId) -> Self {
        Self { id, created: true }
    }
}

/// Target ids in id order, optionally restricted to one display name.
pub fn targets(store: &ObjectStore, name: Option<&str>) -> Vec<ObjectId> {
    store.ids_where(|object| {
        object.kind().is_target()
            && name.map_or(true, |wanted| object.get_str(keys::NAME) == Some(wanted))
    })
}

/// Phase ids owned by `target`, in `buildPhases` order.
pub fn target_phases(store: &ObjectStore, target: &str) -> Vec<ObjectId> {
    store
        .get(target)
        .map(|object| object.id_list(keys::BUILD_PHASES))
        .unwrap_or_default()
}

/// Every phase id whose isa equals `isa`, in id order.
pub fn phases_with_isa(store: &ObjectStore, isa: &str) -> Vec<ObjectId> {
    store
        .section(isa)
        .filter(|(_, object)| matches!(object.kind(), ObjectKind::BuildPhase(_)))
        .map(|(id, _)| id.clone())
        .collect()
}

/// First phase of `kind` owned by `target`.
pub fn phase_of_kind(store: &ObjectStore, target: &str, kind: PhaseKind) -> Option<ObjectId> {
    target_phases(store, target)
        .into_iter()
        .find(|phase| store.kind_of(phase.as_str()) == Some(ObjectKind::BuildPhase(kind)))
}

fn phase_record(kind: PhaseKind) -> ProjectObject {
    ProjectObject::new(kind.isa())
        .with(keys::BUILD_ACTION_MASK, DEFAULT_BUILD_ACTION_MASK)
        .with(keys::FILES, PlistValue::Array(Vec::new()))
        .with(keys::RUN_ONLY_FOR_DEPLOYMENT_POSTPROCESSING, "0")
}

fn append_phase(
    store: &mut ObjectStore,
    target: &str,
    record: ProjectObject,
) -> StoreResult<ObjectId> {
    let phase = store.insert(record)?;
    if let Some(object) = store.get_mut(target) {
        object.push_id(keys::BUILD_PHASES, &phase);
    }
    Ok(phase)
}

/// Returns `target`'s phase of `kind`, creating and appending it if absent.
pub fn ensure_phase(
    store: &mut ObjectStore,
    target: &str,
    kind: PhaseKind,
) -> StoreResult<EnsuredPhase> {
    if let Some(existing) = phase_of_kind(store, target, kind) {
        return Ok(EnsuredPhase::existing(existing));
    }
    append_phase(store, target, phase_record(kind)).map(EnsuredPhase::created)
}

/// Returns `target`'s copy-files phase into the frameworks folder, creating
/// an `Embed Frameworks` phase if absent.
pub fn ensure_embed_frameworks_phase(
    store: &mut ObjectStore,
    target: &str,
) -> StoreResult<EnsuredPhase> {
    let existing = target_phases(store, target).into_iter().find(|phase| {
        store.get(phase.as_str()).is_some_and(|object| {
            object.kind() == ObjectKind::BuildPhase(PhaseKind::CopyFiles)
                && object.get_str(keys::DST_SUBFOLDER_SPEC) == Some(FRAMEWORKS_SUBFOLDER_SPEC)
        })
    });
    if let Some(existing) = existing {
        return Ok(EnsuredPhase::existing(existing));
    }
    let record = phase_record(PhaseKind::CopyFiles)
        .with(keys::NAME, EMBED_FRAMEWORKS_PHASE_NAME)
        .with(keys::DST_PATH, "")
        .with(keys::DST_SUBFOLDER_SPEC, FRAMEWORKS_SUBFOLDER_SPEC);
    append_phase(store, target, record).map(EnsuredPhase::created)
}

/// Registers a build file for `file_ref` with the given `ATTRIBUTES`.
///
/// `settings` is omitted entirely when `attributes` is empty.
pub fn create_build_file(
    store: &mut ObjectStore,
    file_ref: &ObjectId,
    attributes: &[&str],
) -> StoreResult<ObjectId> {
    let mut record = ProjectObject::new(ISA_BUILD_FILE).with(keys::FILE_REF, file_ref.as_str());
    if !attributes.is_empty() {
        let settings = BTreeMap::from([(
            keys::ATTRIBUTES.to_string(),
            PlistValue::string_array(attributes.iter().copied()),
        )]);
        record.set(keys::SETTINGS, settings);
    }
    store.insert(record)
}

/// Appends `build_file` to `phase`'s files unless already listed.
pub fn attach(store: &mut ObjectStore, phase: &str, build_file: &ObjectId) -> bool {
    let Some(object) = store.get_mut(phase) else {
        return false;
    };
    if object.list_contains(keys::FILES, build_file.as_str()) {
        return false;
    }
    object.push_id(keys::FILES, build_file);
    true
}

/// Removes `build_file` from `phase`'s files.
pub fn detach(store: &mut ObjectStore, phase: &str, build_file: &str) -> bool {
    store
        .get_mut(phase)
        .is_some_and(|object| object.remove_id(keys::FILES, build_file))
}

/// Build-file ids whose `fileRef` is `file_ref`.
pub fn build_files_referencing(store: &ObjectStore, file_ref: &str) -> Vec<ObjectId> {
    store.ids_where(|object| {
        object.kind() == ObjectKind::BuildFile && object.get_str(keys::FILE_REF) == Some(file_ref)
    })
}

/// Whether `phase` lists no files.
pub fn is_empty_phase(store: &ObjectStore, phase: &str) -> bool {
    store
        .get(phase)
        .map_or(false, |object| object.id_list(keys::FILES).is_empty())
}

/// Unlinks `phase` from `target` and deletes its record.
pub fn remove_phase(store: &mut ObjectStore, target: &str, phase: &str) {
    if let Some(object) = store.get_mut(target) {
        object.remove_id(keys::BUILD_PHASES, phase);
    }
    store.remove(phase);
}
