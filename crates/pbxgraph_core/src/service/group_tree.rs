//! Group hierarchy over the object store.
//!
//! # Responsibility
//! - Traverse `children` lists depth-first from the root group or any scope.
//! - Locate file references by name or stored path.
//! - Insert new nodes under a parent group and detach them again.
//!
//! # Invariants
//! - Traversal is order-preserving and visits each node at most once, so a
//!   malformed graph with a children cycle still terminates.
//! - `remove_child` never recurses; callers delete the child record.

use crate::model::id::ObjectId;
use crate::model::object::{keys, ObjectKind, ProjectObject, ISA_GROUP};
use crate::model::source_tree::SourceTree;
use crate::model::value::PlistValue;
use crate::store::object_store::ObjectStore;
use crate::store::StoreResult;
use std::collections::HashSet;

/// Read-only view of the group hierarchy.
pub struct GroupTree<'a> {
    store: &'a ObjectStore,
    root_group: Option<ObjectId>,
}

impl<'a> GroupTree<'a> {
    /// Builds a view rooted at the project's main group.
    ///
    /// The main group is the `mainGroup` of the root project record when it
    /// names a group, otherwise the first group carrying neither `name` nor
    /// `path`.
    pub fn new(store: &'a ObjectStore, root_object: Option<&str>) -> Self {
        let declared = root_object
            .and_then(|id| store.get(id))
            .and_then(|project| project.get_str(keys::MAIN_GROUP))
            .filter(|id| store.kind_of(id) == Some(ObjectKind::Group))
            .map(ObjectId::from);
        let root_group = declared.or_else(|| {
            store
                .iter()
                .find(|(_, object)| {
                    object.kind() == ObjectKind::Group
                        && object.get(keys::NAME).is_none()
                        && object.get(keys::PATH).is_none()
                })
                .map(|(id, _)| id.clone())
        });
        Self { store, root_group }
    }

    pub fn root_group(&self) -> Option<&ObjectId> {
        self.root_group.as_ref()
    }

    /// Direct children of `group`, in stored order.
    pub fn children(&self, group: &str) -> Vec<ObjectId> {
        self.store
            .get(group)
            .map(|object| object.id_list(keys::CHILDREN))
            .unwrap_or_default()
    }

    /// Every node below `scope`, depth-first and in stored order.
    ///
    /// Dangling child ids are skipped. `scope` itself is not included.
    pub fn descendants(&self, scope: &str) -> Vec<ObjectId> {
        let mut visited = HashSet::new();
        visited.insert(scope.to_string());

        let mut result = Vec::new();
        let mut stack: Vec<ObjectId> = self.children(scope).into_iter().rev().collect();
        while let Some(current) = stack.pop() {
            if !visited.insert(current.as_str().to_string()) {
                continue;
            }
            let Some(object) = self.store.get(current.as_str()) else {
                continue;
            };
            if object.kind() == ObjectKind::Group {
                let nested = object.id_list(keys::CHILDREN);
                stack.extend(nested.into_iter().rev());
            }
            result.push(current);
        }
        result
    }

    /// File references named `name` below `scope` (root group if omitted).
    ///
    /// A reference without a `name` attribute is matched on the last
    /// segment of its `path`.
    pub fn find_by_name(&self, name: &str, scope: Option<&str>) -> Vec<ObjectId> {
        self.candidates(scope, ObjectKind::FileReference)
            .into_iter()
            .filter(|id| {
                self.store
                    .get(id.as_str())
                    .and_then(reference_name)
                    .is_some_and(|candidate| candidate == name)
            })
            .collect()
    }

    /// File references whose stored `path` equals `path`.
    ///
    /// With `tree_filter`, only references whose `sourceTree` equals the
    /// filter's symbol are returned.
    pub fn find_by_path(
        &self,
        path: &str,
        tree_filter: Option<SourceTree>,
        scope: Option<&str>,
    ) -> Vec<ObjectId> {
        self.candidates(scope, ObjectKind::FileReference)
            .into_iter()
            .filter(|id| {
                let Some(object) = self.store.get(id.as_str()) else {
                    return false;
                };
                object.get_str(keys::PATH) == Some(path)
                    && tree_filter
                        .map_or(true, |tree| object.get_str(keys::SOURCE_TREE) == Some(tree.as_str()))
            })
            .collect()
    }

    /// Groups whose display name equals `name` below `scope`.
    pub fn find_groups_by_name(&self, name: &str, scope: Option<&str>) -> Vec<ObjectId> {
        self.candidates(scope, ObjectKind::Group)
            .into_iter()
            .filter(|id| {
                self.store
                    .get(id.as_str())
                    .and_then(ProjectObject::display_name)
                    == Some(name)
            })
            .collect()
    }

    /// First direct child group of `parent` displayed as `name`.
    pub fn child_group_named(&self, parent: &str, name: &str) -> Option<ObjectId> {
        self.children(parent).into_iter().find(|id| {
            self.store.get(id.as_str()).is_some_and(|object| {
                object.kind() == ObjectKind::Group && object.display_name() == Some(name)
            })
        })
    }

    /// Group whose `children` list `child`.
    pub fn parent_of(&self, child: &str) -> Option<ObjectId> {
        self.store
            .iter()
            .find(|(_, object)| {
                object.kind() == ObjectKind::Group && object.list_contains(keys::CHILDREN, child)
            })
            .map(|(id, _)| id.clone())
    }

    /// Path of `node` composed from its own and its ancestors' `path`
    /// attributes.
    ///
    /// Composition stops at the first node not rooted at `<group>`, since
    /// its path is already anchored elsewhere.
    pub fn composed_path(&self, node: &str) -> Option<String> {
        let mut segments = Vec::new();
        let mut visited = HashSet::new();
        let mut cursor = Some(ObjectId::from(node));
        while let Some(current) = cursor {
            if !visited.insert(current.clone()) {
                break;
            }
            let object = self.store.get(current.as_str())?;
            if let Some(path) = object.get_str(keys::PATH) {
                segments.push(path.to_string());
            }
            let group_relative = object
                .get_str(keys::SOURCE_TREE)
                .map_or(true, |tree| tree == SourceTree::Group.as_str());
            if !group_relative {
                break;
            }
            cursor = self.parent_of(current.as_str());
        }
        segments.reverse();
        Some(segments.join("/"))
    }

    fn candidates(&self, scope: Option<&str>, kind: ObjectKind) -> Vec<ObjectId> {
        let scope = scope.or(self.root_group.as_ref().map(ObjectId::as_str));
        match scope {
            Some(scope) => self
                .descendants(scope)
                .into_iter()
                .filter(|id| self.store.kind_of(id.as_str()) == Some(kind))
                .collect(),
            None => self.store.ids_where(|object| object.kind() == kind),
        }
    }
}

fn reference_name(object: &ProjectObject) -> Option<&str> {
    object.get_str(keys::NAME).or_else(|| {
        object
            .get_str(keys::PATH)
            .and_then(|path| path.rsplit('/').next())
    })
}

/// Builds an empty `<group>`-rooted group record.
pub fn group_record(name: Option<&str>, path: Option<&str>) -> ProjectObject {
    let mut group = ProjectObject::new(ISA_GROUP)
        .with(keys::CHILDREN, PlistValue::Array(Vec::new()))
        .with(keys::SOURCE_TREE, SourceTree::Group.as_str());
    if let Some(name) = name {
        group.set(keys::NAME, name);
    }
    if let Some(path) = path {
        group.set(keys::PATH, path);
    }
    group
}

/// Registers `record` and appends its id to `parent`'s children.
pub fn insert_child(
    store: &mut ObjectStore,
    parent: &str,
    record: ProjectObject,
) -> StoreResult<ObjectId> {
    let id = store.insert(record)?;
    if let Some(group) = store.get_mut(parent) {
        group.push_id(keys::CHILDREN, &id);
    }
    Ok(id)
}

/// Removes `child` from `parent`'s children without touching the child.
pub fn remove_child(store: &mut ObjectStore, parent: &str, child: &str) -> bool {
    store
        .get_mut(parent)
        .is_some_and(|group| group.remove_id(keys::CHILDREN, child))
}

/// Removes `child` from every group listing it. Returns the number of
/// groups changed.
pub fn remove_from_all_groups(store: &mut ObjectStore, child: &str) -> usize {
    let parents = store.ids_where(|object| {
        object.kind() == ObjectKind::Group && object.list_contains(keys::CHILDREN, child)
    });
    parents
        .iter()
        .filter(|parent| remove_child(store, parent.as_str(), child))
        .count()
}

/// Creates a main group and links it from the root project record.
pub fn create_main_group(
    store: &mut ObjectStore,
    root_object: Option<&str>,
) -> StoreResult<ObjectId> {
    let id = store.insert(group_record(None, None))?;
    if let Some(project) = root_object.and_then(|root| store.get_mut(root)) {
        if project.kind() == ObjectKind::Project {
            project.set(keys::MAIN_GROUP, id.as_str());
        }
    }
    Ok(id)
}

#[cfg(test)]
mod tests {
    use super::{
        create_main_group, group_record, insert_child, remove_child, remove_from_all_groups,
        GroupTree,
    };
    use crate::model::id::ObjectId;
    use crate::model::object::{keys, ProjectObject};
    use crate::model::source_tree::SourceTree;
    use crate::model::value::PlistValue;
    use crate::store::object_store::ObjectStore;

    fn group(children: &[&str]) -> ProjectObject {
        ProjectObject::new("PBXGroup").with(keys::CHILDREN, PlistValue::string_array(children.iter().copied()))
    }

    fn file(name: &str, path: &str, tree: &str) -> ProjectObject {
        ProjectObject::new("PBXFileReference")
            .with(keys::NAME, name)
            .with(keys::PATH, path)
            .with(keys::SOURCE_TREE, tree)
    }

    fn store() -> ObjectStore {
        let mut store = ObjectStore::new();
        let records = [
            ("0", group(&["group1"])),
            ("group1", group(&["group2", "group3"]).with(keys::NAME, "root")),
            ("group2", group(&["file1", "file2"]).with(keys::NAME, "app")),
            ("group3", group(&["file3", "group4"]).with(keys::NAME, "app")),
            ("group4", group(&[]).with(keys::NAME, "app")),
            ("file1", file("file", "file", "SOURCE_ROOT")),
            ("file2", file("file", "file", "SOURCE_ROOT")),
            ("file3", file("file", "file", "SDKROOT")),
        ];
        for (id, record) in records {
            store
                .insert_with_id(ObjectId::from(id), record)
                .expect("fixture insert");
        }
        store
    }

    #[test]
    fn root_group_falls_back_to_unnamed_group() {
        let store = store();
        let tree = GroupTree::new(&store, None);
        assert_eq!(tree.root_group().map(ObjectId::as_str), Some("0"));
    }

    #[test]
    fn root_group_prefers_project_main_group() {
        let mut store = store();
        store
            .insert_with_id(
                ObjectId::from("project"),
                ProjectObject::new("PBXProject").with(keys::MAIN_GROUP, "group1"),
            )
            .expect("project insert");
        let tree = GroupTree::new(&store, Some("project"));
        assert_eq!(tree.root_group().map(ObjectId::as_str), Some("group1"));
    }

    #[test]
    fn descendants_are_depth_first_in_order() {
        let store = store();
        let tree = GroupTree::new(&store, None);
        let order: Vec<String> = tree
            .descendants("group1")
            .into_iter()
            .map(|id| id.to_string())
            .collect();
        assert_eq!(
            order,
            vec!["group2", "file1", "file2", "group3", "file3", "group4"]
        );
    }

    #[test]
    fn find_by_name_respects_scope() {
        let store = store();
        let tree = GroupTree::new(&store, None);
        assert_eq!(tree.find_by_name("file", None).len(), 3);
        assert_eq!(tree.find_by_name("file", Some("group2")).len(), 2);
        assert_eq!(tree.find_by_name("file", Some("group3")).len(), 1);
        assert!(tree.find_by_name("missing", None).is_empty());
    }

    #[test]
    fn find_by_path_filters_on_tree() {
        let store = store();
        let tree = GroupTree::new(&store, None);
        assert_eq!(tree.find_by_path("file", None, None).len(), 3);
        assert_eq!(
            tree.find_by_path("file", Some(SourceTree::SdkRoot), None),
            vec![ObjectId::from("file3")]
        );
        assert_eq!(
            tree.find_by_path("file", Some(SourceTree::SourceRoot), Some("group3")),
            Vec::<ObjectId>::new()
        );
    }

    #[test]
    fn descendants_survive_children_cycles() {
        let mut store = store();
        store
            .get_mut("group4")
            .expect("group4")
            .push_id(keys::CHILDREN, &ObjectId::from("group1"));
        let tree = GroupTree::new(&store, None);
        assert_eq!(tree.descendants("0").len(), 7);
    }

    #[test]
    fn groups_and_parents_are_found() {
        let store = store();
        let tree = GroupTree::new(&store, None);
        assert_eq!(tree.find_groups_by_name("app", None).len(), 3);
        assert_eq!(
            tree.child_group_named("group1", "app"),
            Some(ObjectId::from("group2"))
        );
        assert_eq!(tree.parent_of("file3"), Some(ObjectId::from("group3")));
        assert_eq!(tree.parent_of("0"), None);
    }

    #[test]
    fn composed_path_joins_group_relative_ancestors() {
        let mut store = ObjectStore::new();
        store
            .insert_with_id(ObjectId::from("root"), group(&["src"]))
            .expect("root");
        store
            .insert_with_id(
                ObjectId::from("src"),
                group(&["feature"])
                    .with(keys::PATH, "Sources")
                    .with(keys::SOURCE_TREE, "<group>"),
            )
            .expect("src");
        store
            .insert_with_id(
                ObjectId::from("feature"),
                group(&[])
                    .with(keys::PATH, "Feature")
                    .with(keys::SOURCE_TREE, "<group>"),
            )
            .expect("feature");
        let tree = GroupTree::new(&store, None);
        assert_eq!(
            tree.composed_path("feature").as_deref(),
            Some("Sources/Feature")
        );
        assert_eq!(tree.composed_path("missing"), None);
    }

    #[test]
    fn insert_and_remove_child_edit_parent_only() {
        let mut store = store();
        let id = insert_child(&mut store, "group4", group_record(Some("new"), None))
            .expect("insert child");
        assert!(store
            .get("group4")
            .expect("group4")
            .list_contains(keys::CHILDREN, id.as_str()));

        assert!(remove_child(&mut store, "group4", id.as_str()));
        assert!(!remove_child(&mut store, "group4", id.as_str()));
        assert!(store.contains(id.as_str()));
    }

    #[test]
    fn remove_from_all_groups_counts_parents() {
        let mut store = store();
        store
            .get_mut("group4")
            .expect("group4")
            .push_id(keys::CHILDREN, &ObjectId::from("file1"));
        assert_eq!(remove_from_all_groups(&mut store, "file1"), 2);
        assert_eq!(remove_from_all_groups(&mut store, "file1"), 0);
    }

    #[test]
    fn create_main_group_links_project() {
        let mut store = ObjectStore::new();
        store
            .insert_with_id(ObjectId::from("project"), ProjectObject::new("PBXProject"))
            .expect("project");
        let id = create_main_group(&mut store, Some("project")).expect("main group");
        assert_eq!(
            store.get("project").and_then(|p| p.get_str(keys::MAIN_GROUP)),
            Some(id.as_str())
        );
        let tree = GroupTree::new(&store, Some("project"));
        assert_eq!(tree.root_group(), Some(&id));
    }
}
