//! File add/remove/lookup capability.
//!
//! # Responsibility
//! - Turn a filesystem path into a file reference, build files and phase
//!   memberships across the selected targets.
//! - Undo those effects exactly on removal.
//! - Look file references up by name or stored path.
//!
//! # Invariants
//! - `add_file` decides everything (placement, classification, targets,
//!   parent) before its first mutation; a rejected call leaves the graph
//!   unchanged.
//! - Removing what an add created restores the previous graph, including
//!   phases the add had to create.
//! - Only file references and build files are removable through this API.

use crate::logging::{log_path, log_value};
use crate::model::id::ObjectId;
use crate::model::object::{keys, ObjectKind, ProjectObject, ISA_FILE_REFERENCE};
use crate::model::source_tree::SourceTree;
use crate::project::XcodeProject;
use crate::resolve::file_classifier::{self, FileClass};
use crate::resolve::tree_resolver::ResolvedPath;
use crate::service::build_phase;
use crate::service::build_settings;
use crate::service::group_tree;
use crate::service::{ProjectError, ProjectResult};
use crate::store::object_store::ObjectStore;
use log::{debug, info, warn};
use std::path::Path;

/// Options of [`ProjectFiles::add_file`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddFileOptions {
    /// Source tree to express the path against; `None` lets the resolver
    /// pick one.
    pub tree: Option<SourceTree>,
    /// When false only the file reference is created.
    pub create_build_files: bool,
    /// Treat unknown extensions as generic resources instead of failing.
    pub ignore_unknown_type: bool,
    /// Link frameworks weakly.
    pub weak: bool,
    /// Also copy embeddable frameworks into the product.
    pub embed_framework: bool,
    /// Sign embedded frameworks on copy.
    pub code_sign_on_copy: bool,
    /// Group receiving the file reference; the main group when `None`.
    pub parent: Option<ObjectId>,
    /// Restrict build-file fan-out to the target with this name.
    pub target_name: Option<String>,
}

impl Default for AddFileOptions {
    fn default() -> Self {
        Self {
            tree: Some(SourceTree::SourceRoot),
            create_build_files: true,
            ignore_unknown_type: false,
            weak: false,
            embed_framework: true,
            code_sign_on_copy: true,
            parent: None,
            target_name: None,
        }
    }
}

impl AddFileOptions {
    pub fn with_tree(mut self, tree: Option<SourceTree>) -> Self {
        self.tree = tree;
        self
    }

    pub fn with_target(mut self, target_name: impl Into<String>) -> Self {
        self.target_name = Some(target_name.into());
        self
    }

    pub fn with_parent(mut self, parent: impl Into<ObjectId>) -> Self {
        self.parent = Some(parent.into());
        self
    }
}

/// Records created by one add.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddFileOutcome {
    /// New file reference, `None` for a no-op.
    pub file_reference: Option<ObjectId>,
    /// New build files, in target then attachment order.
    pub build_files: Vec<ObjectId>,
}

impl AddFileOutcome {
    /// True when the call changed nothing.
    pub fn is_noop(&self) -> bool {
        self.file_reference.is_none() && self.build_files.is_empty()
    }
}

/// File-level editing capability of a project graph.
pub trait ProjectFiles {
    /// Adds `path` to the project.
    ///
    /// Unresolvable paths, missing absolute paths and unknown target names
    /// are soft no-ops returning an empty outcome.
    ///
    /// # Errors
    /// - `UnknownFileExtension` when the extension is not classified and
    ///   `ignore_unknown_type` is off.
    /// - `ParentNotFound` / `ParentNotGroup` for a bad explicit parent.
    fn add_file(
        &mut self,
        path: impl AsRef<Path>,
        options: &AddFileOptions,
    ) -> ProjectResult<AddFileOutcome>;

    /// Like [`add_file`](Self::add_file), but a no-op when a reference with
    /// the same stored path and tree already exists.
    fn add_file_if_doesnt_exist(
        &mut self,
        path: impl AsRef<Path>,
        options: &AddFileOptions,
    ) -> ProjectResult<AddFileOutcome>;

    /// File references named `name`, below `parent` when given.
    fn get_files_by_name(&self, name: &str, parent: Option<&str>) -> Vec<ObjectId>;

    /// File references whose stored path is `path`, optionally restricted
    /// to one source tree.
    fn get_files_by_path(&self, path: &str, tree: Option<SourceTree>) -> Vec<ObjectId>;

    /// Removes a file reference or build file.
    ///
    /// With `target_name`, only that target's build files are detached and
    /// the file reference is kept while other targets still use it.
    fn remove_file_by_id(&mut self, id: &str, target_name: Option<&str>) -> bool;

    /// Removes every file reference matching `path` and `tree`.
    fn remove_files_by_path(
        &mut self,
        path: &str,
        tree: Option<SourceTree>,
        target_name: Option<&str>,
    ) -> bool;
}

impl ProjectFiles for XcodeProject {
    fn add_file(
        &mut self,
        path: impl AsRef<Path>,
        options: &AddFileOptions,
    ) -> ProjectResult<AddFileOutcome> {
        let path = path.as_ref();
        let Some(resolved) = self.resolve_path(path, options.tree) else {
            debug!(
                "event=add_file module=project_files status=noop reason=unresolved path={}",
                log_path(path)
            );
            return Ok(AddFileOutcome::default());
        };
        self.add_resolved(resolved, options)
    }

    fn add_file_if_doesnt_exist(
        &mut self,
        path: impl AsRef<Path>,
        options: &AddFileOptions,
    ) -> ProjectResult<AddFileOutcome> {
        let path = path.as_ref();
        let Some(resolved) = self.resolve_path(path, options.tree) else {
            debug!(
                "event=add_file module=project_files status=noop reason=unresolved path={}",
                log_path(path)
            );
            return Ok(AddFileOutcome::default());
        };
        let existing = self
            .group_tree()
            .find_by_path(&resolved.path, Some(resolved.tree), None);
        if !existing.is_empty() {
            debug!(
                "event=add_file module=project_files status=noop reason=exists path={} tree={}",
                log_value(&resolved.path),
                resolved.tree
            );
            return Ok(AddFileOutcome::default());
        }
        self.add_resolved(resolved, options)
    }

    fn get_files_by_name(&self, name: &str, parent: Option<&str>) -> Vec<ObjectId> {
        self.group_tree().find_by_name(name, parent)
    }

    fn get_files_by_path(&self, path: &str, tree: Option<SourceTree>) -> Vec<ObjectId> {
        self.group_tree().find_by_path(path, tree, None)
    }

    fn remove_file_by_id(&mut self, id: &str, target_name: Option<&str>) -> bool {
        let kind = self.store().kind_of(id);
        let removed = match kind {
            Some(ObjectKind::FileReference) => self.remove_file_reference(id, target_name),
            Some(ObjectKind::BuildFile) => self.remove_build_file(id, target_name),
            _ => false,
        };
        if removed {
            info!(
                "event=remove_file module=project_files status=ok id={} target={}",
                log_value(id),
                log_value(target_name.unwrap_or("*"))
            );
        } else {
            debug!(
                "event=remove_file module=project_files status=noop id={} target={}",
                log_value(id),
                log_value(target_name.unwrap_or("*"))
            );
        }
        removed
    }

    fn remove_files_by_path(
        &mut self,
        path: &str,
        tree: Option<SourceTree>,
        target_name: Option<&str>,
    ) -> bool {
        let matches = self.group_tree().find_by_path(path, tree, None);
        if matches.is_empty() {
            debug!(
                "event=remove_file module=project_files status=noop reason=no_match path={}",
                log_value(path)
            );
            return false;
        }
        let mut removed = false;
        for id in matches {
            removed |= self.remove_file_by_id(id.as_str(), target_name);
        }
        removed
    }
}

impl XcodeProject {
    fn add_resolved(
        &mut self,
        resolved: ResolvedPath,
        options: &AddFileOptions,
    ) -> ProjectResult<AddFileOutcome> {
        let class = match classify_for_add(&resolved, options.ignore_unknown_type) {
            Ok(class) => class,
            Err(err) => return Err(self.reject(&resolved, err)),
        };
        let parent = match self.insertion_parent(options.parent.as_ref()) {
            Ok(parent) => parent,
            Err(err) => return Err(self.reject(&resolved, err)),
        };

        let targets = if options.create_build_files {
            let targets = build_phase::targets(self.store(), options.target_name.as_deref());
            if targets.is_empty() && options.target_name.is_some() {
                debug!(
                    "event=add_file module=project_files status=noop reason=unknown_target target={}",
                    log_value(options.target_name.as_deref().unwrap_or_default())
                );
                return Ok(AddFileOutcome::default());
            }
            targets
        } else {
            Vec::new()
        };

        let root_object = self.root_object().map(ObjectId::from);
        let store = self.store_mut();
        let parent = match parent {
            Some(parent) => parent,
            None => group_tree::create_main_group(store, root_object.as_ref().map(ObjectId::as_str))?,
        };
        let file_reference =
            group_tree::insert_child(store, parent.as_str(), file_reference_record(&resolved, &class))?;

        let mut outcome = AddFileOutcome {
            file_reference: Some(file_reference.clone()),
            build_files: Vec::new(),
        };
        let mut created_phases = Vec::new();

        for target in &targets {
            if let Some(kind) = class.phase {
                let phase = build_phase::ensure_phase(store, target.as_str(), kind)?;
                if phase.created {
                    created_phases.push(phase.id.clone());
                }
                let build_file = build_phase::create_build_file(
                    store,
                    &file_reference,
                    &class.default_attributes(options.weak),
                )?;
                build_phase::attach(store, phase.id.as_str(), &build_file);
                outcome.build_files.push(build_file);
            }
            if options.embed_framework && class.embeddable {
                let phase = build_phase::ensure_embed_frameworks_phase(store, target.as_str())?;
                if phase.created {
                    created_phases.push(phase.id.clone());
                }
                let build_file = build_phase::create_build_file(
                    store,
                    &file_reference,
                    &class.embed_attributes(options.code_sign_on_copy),
                )?;
                build_phase::attach(store, phase.id.as_str(), &build_file);
                outcome.build_files.push(build_file);
            }
        }

        if options.create_build_files {
            if let (Some(kind), Some(fragment)) =
                (class.search_path, resolved.search_path_fragment())
            {
                build_settings::inject_search_path(store, &targets, kind.setting_name(), &fragment);
            }
        }
        self.record_created_phases(created_phases);

        info!(
            "event=add_file module=project_files status=ok path={} tree={} targets={} build_files={}",
            log_value(&resolved.path),
            resolved.tree,
            targets.len(),
            outcome.build_files.len()
        );
        Ok(outcome)
    }

    fn reject(&self, resolved: &ResolvedPath, err: ProjectError) -> ProjectError {
        warn!(
            "event=add_file module=project_files status=error path={} error_code={} error={}",
            log_value(&resolved.path),
            err.code(),
            log_value(&err.to_string())
        );
        err
    }

    /// Explicit parent after validation, or the main group. `Ok(None)`
    /// means the main group has to be created first.
    fn insertion_parent(&self, parent: Option<&ObjectId>) -> ProjectResult<Option<ObjectId>> {
        match parent {
            Some(parent) => match self.store().kind_of(parent.as_str()) {
                Some(ObjectKind::Group) => Ok(Some(parent.clone())),
                Some(_) => Err(ProjectError::ParentNotGroup(parent.clone())),
                None => Err(ProjectError::ParentNotFound(parent.clone())),
            },
            None => Ok(self.group_tree().root_group().cloned()),
        }
    }

    fn remove_build_file(&mut self, build_file: &str, target_name: Option<&str>) -> bool {
        let detached = self.detach_build_files(&[ObjectId::from(build_file)], target_name);
        if target_name.is_some() {
            return detached;
        }
        let store = self.store_mut();
        purge_build_file(store, build_file);
        detached | store.remove(build_file).is_some()
    }

    fn remove_file_reference(&mut self, file_reference: &str, target_name: Option<&str>) -> bool {
        let build_files = build_phase::build_files_referencing(self.store(), file_reference);
        let detached = self.detach_build_files(&build_files, target_name);

        if target_name.is_some() && !detached {
            return false;
        }

        let store = self.store_mut();
        if target_name.is_none() {
            // Leftovers: orphans and phases no target owns.
            for build_file in &build_files {
                purge_build_file(store, build_file.as_str());
                store.remove(build_file.as_str());
            }
        }
        if !build_phase::build_files_referencing(store, file_reference).is_empty() {
            return detached;
        }

        group_tree::remove_from_all_groups(store, file_reference);
        store.remove(file_reference);
        true
    }

    /// Detaches `build_files` from the phases of the selected targets,
    /// deleting each detached record. A phase left empty is deleted only
    /// when this engine created it.
    fn detach_build_files(&mut self, build_files: &[ObjectId], target_name: Option<&str>) -> bool {
        if build_files.is_empty() {
            return false;
        }
        let targets = build_phase::targets(self.store(), target_name);
        let mut emptied_phases = Vec::new();
        let store = self.store_mut();
        let mut detached = false;
        for target in &targets {
            for phase in build_phase::target_phases(store, target.as_str()) {
                let mut changed = false;
                for build_file in build_files {
                    if build_phase::detach(store, phase.as_str(), build_file.as_str()) {
                        store.remove(build_file.as_str());
                        changed = true;
                    }
                }
                if !changed {
                    continue;
                }
                detached = true;
                if build_phase::is_empty_phase(store, phase.as_str()) {
                    emptied_phases.push((target.clone(), phase));
                }
            }
        }
        for (target, phase) in emptied_phases {
            if self.forget_created_phase(phase.as_str()) {
                build_phase::remove_phase(self.store_mut(), target.as_str(), phase.as_str());
            }
        }
        detached
    }
}

/// Drops `build_file` from every phase still listing it.
fn purge_build_file(store: &mut ObjectStore, build_file: &str) {
    let phases = store.ids_where(|object| {
        matches!(object.kind(), ObjectKind::BuildPhase(_))
            && object.list_contains(keys::FILES, build_file)
    });
    for phase in phases {
        build_phase::detach(store, phase.as_str(), build_file);
    }
}

fn classify_for_add(resolved: &ResolvedPath, ignore_unknown_type: bool) -> ProjectResult<FileClass> {
    let extension = resolved.extension().unwrap_or_default();
    match file_classifier::classify(extension) {
        Some(class) => Ok(class),
        None if ignore_unknown_type => Ok(FileClass::fallback()),
        None => Err(ProjectError::UnknownFileExtension(extension.to_string())),
    }
}

fn file_reference_record(resolved: &ResolvedPath, class: &FileClass) -> ProjectObject {
    ProjectObject::new(ISA_FILE_REFERENCE)
        .with(keys::LAST_KNOWN_FILE_TYPE, class.file_type)
        .with(keys::NAME, resolved.file_name())
        .with(keys::PATH, resolved.path.as_str())
        .with(keys::SOURCE_TREE, resolved.tree.as_str())
}
