//! In-memory object store.
//!
//! # Responsibility
//! - Own the id → record map of one project graph.
//! - Provide typed section iteration, fresh-id allocation and deletion.
//!
//! # Invariants
//! - Ids are unique across the whole store.
//! - Iteration order is id order, so two stores holding the same records
//!   render identically.

use crate::model::id::ObjectId;
use crate::model::object::{ObjectKind, ProjectObject};
use crate::store::{StoreError, StoreResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

const MAX_ID_DRAWS: usize = 16;

/// Flat mapping from id to record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectStore {
    objects: BTreeMap<ObjectId, ProjectObject>,
}

impl ObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_objects(objects: BTreeMap<ObjectId, ProjectObject>) -> Self {
        Self { objects }
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.objects.contains_key(id)
    }

    pub fn get(&self, id: &str) -> Option<&ProjectObject> {
        self.objects.get(id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut ProjectObject> {
        self.objects.get_mut(id)
    }

    /// Kind of the record stored under `id`, if any.
    pub fn kind_of(&self, id: &str) -> Option<ObjectKind> {
        self.get(id).map(ProjectObject::kind)
    }

    /// Iterates every record in id order.
    pub fn iter(&self) -> impl Iterator<Item = (&ObjectId, &ProjectObject)> {
        self.objects.iter()
    }

    /// Iterates the records whose `isa` equals `isa`.
    pub fn section<'a>(
        &'a self,
        isa: &'a str,
    ) -> impl Iterator<Item = (&'a ObjectId, &'a ProjectObject)> + 'a {
        self.objects
            .iter()
            .filter(move |(_, object)| object.isa() == isa)
    }

    /// Number of records whose `isa` equals `isa`.
    pub fn count_isa(&self, isa: &str) -> usize {
        self.section(isa).count()
    }

    /// Ids of every record matching `predicate`, in id order.
    pub fn ids_where<F>(&self, mut predicate: F) -> Vec<ObjectId>
    where
        F: FnMut(&ProjectObject) -> bool,
    {
        self.objects
            .iter()
            .filter(|(_, object)| predicate(object))
            .map(|(id, _)| id.clone())
            .collect()
    }

    /// Draws a fresh id that is not present in the store.
    pub fn allocate_id(&self) -> StoreResult<ObjectId> {
        for _ in 0..MAX_ID_DRAWS {
            let candidate = ObjectId::generate();
            if !self.contains(candidate.as_str()) {
                return Ok(candidate);
            }
        }
        Err(StoreError::IdSpaceExhausted)
    }

    /// Inserts a record under a freshly allocated id.
    pub fn insert(&mut self, object: ProjectObject) -> StoreResult<ObjectId> {
        let id = self.allocate_id()?;
        self.objects.insert(id.clone(), object);
        Ok(id)
    }

    /// Inserts a record under a caller-provided id.
    pub fn insert_with_id(&mut self, id: ObjectId, object: ProjectObject) -> StoreResult<()> {
        if self.contains(id.as_str()) {
            return Err(StoreError::DuplicateId(id));
        }
        self.objects.insert(id, object);
        Ok(())
    }

    pub fn remove(&mut self, id: &str) -> Option<ProjectObject> {
        self.objects.remove(id)
    }

    pub fn into_objects(self) -> BTreeMap<ObjectId, ProjectObject> {
        self.objects
    }
}
