//! Object identifiers.
//!
//! # Invariants
//! - Ids are opaque: existing graphs may use any string, only generated ids
//!   follow the 24-hex-character project convention.
//! - Ordering is plain string ordering so `ObjectId` and `&str` lookups agree.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Length of generated object ids.
pub const GENERATED_ID_LEN: usize = 24;

/// Opaque, store-unique identifier of one project record.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectId(String);

impl ObjectId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Draws a fresh random id in project format.
    ///
    /// Uniqueness against a concrete store is checked by the store.
    pub fn generate() -> Self {
        let mut hex = Uuid::new_v4().simple().to_string().to_ascii_uppercase();
        hex.truncate(GENERATED_ID_LEN);
        Self(hex)
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Display for ObjectId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for ObjectId {
    fn borrow(&self) -> &str {
        self.0.as_str()
    }
}

impl AsRef<str> for ObjectId {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl From<&str> for ObjectId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for ObjectId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl PartialEq<str> for ObjectId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for ObjectId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}
