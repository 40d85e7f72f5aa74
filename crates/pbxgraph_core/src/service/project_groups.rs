//! Group editing capability.
//!
//! # Invariants
//! - New groups are `<group>`-rooted and appended to their parent.
//! - The main group is never removed.
//! - Recursive removal goes through `remove_file_by_id` so build files and
//!   emptied phases disappear with their file references.

use crate::logging::log_value;
use crate::model::id::ObjectId;
use crate::model::object::ObjectKind;
use crate::project::XcodeProject;
use crate::service::group_tree;
use crate::service::project_files::ProjectFiles;
use crate::service::{ProjectError, ProjectResult};
use log::{debug, info};

/// Group-level editing capability of a project graph.
pub trait ProjectGroups {
    /// Creates a group under `parent` (the main group when omitted).
    ///
    /// # Errors
    /// - `ParentNotFound` / `ParentNotGroup` for a bad explicit parent.
    fn add_group(
        &mut self,
        name: &str,
        path: Option<&str>,
        parent: Option<&str>,
    ) -> ProjectResult<ObjectId>;

    /// Returns the first direct child group of `parent` named `name`,
    /// creating it when absent.
    fn get_or_create_group(
        &mut self,
        name: &str,
        path: Option<&str>,
        parent: Option<&str>,
    ) -> ProjectResult<ObjectId>;

    /// Groups displayed as `name`, below `parent` when given.
    fn get_groups_by_name(&self, name: &str, parent: Option<&str>) -> Vec<ObjectId>;

    /// Group listing `id` among its children.
    fn get_parent_group(&self, id: &str) -> Option<ObjectId>;

    /// Path of `id` composed through its `<group>`-relative ancestors.
    fn get_group_path(&self, id: &str) -> Option<String>;

    /// Removes a group. Without `recursive`, only empty groups are removed.
    fn remove_group_by_id(&mut self, id: &str, recursive: bool) -> bool;
}

impl ProjectGroups for XcodeProject {
    fn add_group(
        &mut self,
        name: &str,
        path: Option<&str>,
        parent: Option<&str>,
    ) -> ProjectResult<ObjectId> {
        let parent = self.group_parent(parent)?;
        let store = self.store_mut();
        let id = group_tree::insert_child(store, parent.as_str(), group_tree::group_record(Some(name), path))?;
        info!(
            "event=add_group module=project_groups status=ok name={} parent={}",
            log_value(name),
            parent
        );
        Ok(id)
    }

    fn get_or_create_group(
        &mut self,
        name: &str,
        path: Option<&str>,
        parent: Option<&str>,
    ) -> ProjectResult<ObjectId> {
        let parent_id = self.group_parent(parent)?;
        if let Some(existing) = self.group_tree().child_group_named(parent_id.as_str(), name) {
            return Ok(existing);
        }
        self.add_group(name, path, Some(parent_id.as_str()))
    }

    fn get_groups_by_name(&self, name: &str, parent: Option<&str>) -> Vec<ObjectId> {
        self.group_tree().find_groups_by_name(name, parent)
    }

    fn get_parent_group(&self, id: &str) -> Option<ObjectId> {
        self.group_tree().parent_of(id)
    }

    fn get_group_path(&self, id: &str) -> Option<String> {
        self.group_tree().composed_path(id)
    }

    fn remove_group_by_id(&mut self, id: &str, recursive: bool) -> bool {
        let tree = self.group_tree();
        let refused = if self.store().kind_of(id) != Some(ObjectKind::Group) {
            Some("not_group")
        } else if tree.root_group().is_some_and(|root| root.as_str() == id) {
            Some("main_group")
        } else if !recursive && !tree.children(id).is_empty() {
            Some("not_empty")
        } else {
            None
        };
        if let Some(reason) = refused {
            debug!(
                "event=remove_group module=project_groups status=noop reason={} id={}",
                reason,
                log_value(id)
            );
            return false;
        }

        let children = tree.children(id);
        for child in children {
            match self.store().kind_of(child.as_str()) {
                Some(ObjectKind::FileReference) => {
                    self.remove_file_by_id(child.as_str(), None);
                }
                Some(ObjectKind::Group) => {
                    self.remove_group_by_id(child.as_str(), true);
                }
                _ => {
                    let store = self.store_mut();
                    group_tree::remove_child(store, id, child.as_str());
                    store.remove(child.as_str());
                }
            }
        }

        let store = self.store_mut();
        group_tree::remove_from_all_groups(store, id);
        store.remove(id);
        info!(
            "event=remove_group module=project_groups status=ok id={} recursive={}",
            log_value(id),
            recursive
        );
        true
    }
}

impl XcodeProject {
    /// Explicit group parent after validation, or the main group (created
    /// on demand).
    fn group_parent(&mut self, parent: Option<&str>) -> ProjectResult<ObjectId> {
        match parent {
            Some(parent) => match self.store().kind_of(parent) {
                Some(ObjectKind::Group) => Ok(ObjectId::from(parent)),
                Some(_) => Err(ProjectError::ParentNotGroup(ObjectId::from(parent))),
                None => Err(ProjectError::ParentNotFound(ObjectId::from(parent))),
            },
            None => {
                if let Some(root) = self.group_tree().root_group().cloned() {
                    return Ok(root);
                }
                let root_object = self.root_object().map(ObjectId::from);
                Ok(group_tree::create_main_group(
                    self.store_mut(),
                    root_object.as_ref().map(ObjectId::as_str),
                )?)
            }
        }
    }
}
