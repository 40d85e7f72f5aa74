//! Object storage layer.
//!
//! # Responsibility
//! - Hold the flat record map exclusively owned by one project engine.
//! - Report storage-level failures as semantic errors.
//!
//! # Invariants
//! - Store operations never follow references between records; graph
//!   integrity is maintained by the service layer.

use crate::model::id::ObjectId;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod object_store;

pub type StoreResult<T> = Result<T, StoreError>;

/// Errors from object store operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Caller-provided id is already taken.
    DuplicateId(ObjectId),
    /// Repeated random draws kept colliding with existing ids.
    IdSpaceExhausted,
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DuplicateId(id) => write!(f, "object id already exists: {id}"),
            Self::IdSpaceExhausted => write!(f, "failed to allocate a fresh object id"),
        }
    }
}

impl Error for StoreError {}
