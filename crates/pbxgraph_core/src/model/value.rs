//! Attribute values carried by project records.
//!
//! # Responsibility
//! - Represent every attribute shape found in a project plist: strings,
//!   ordered arrays and nested dictionaries.
//! - Keep unknown attributes intact through read-modify-write cycles.
//!
//! # Invariants
//! - Dictionary keys are kept in sorted order, matching the order the
//!   project codec writes them in.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One plist attribute value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PlistValue {
    /// Scalar value. Numbers and booleans are stored in their textual form.
    String(String),
    /// Ordered list, e.g. `children`, `files` or a list-valued build setting.
    Array(Vec<PlistValue>),
    /// Nested map, e.g. `buildSettings`.
    Dictionary(BTreeMap<String, PlistValue>),
}

impl PlistValue {
    /// Builds an array value from string items.
    pub fn string_array<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Array(
            items
                .into_iter()
                .map(|item| Self::String(item.into()))
                .collect(),
        )
    }

    /// Builds an empty dictionary value.
    pub fn empty_dictionary() -> Self {
        Self::Dictionary(BTreeMap::new())
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(value) => Some(value.as_str()),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[PlistValue]> {
        match self {
            Self::Array(items) => Some(items.as_slice()),
            _ => None,
        }
    }

    pub fn as_array_mut(&mut self) -> Option<&mut Vec<PlistValue>> {
        match self {
            Self::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_dictionary(&self) -> Option<&BTreeMap<String, PlistValue>> {
        match self {
            Self::Dictionary(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_dictionary_mut(&mut self) -> Option<&mut BTreeMap<String, PlistValue>> {
        match self {
            Self::Dictionary(map) => Some(map),
            _ => None,
        }
    }

    /// Returns the string items of an array value.
    ///
    /// Non-string items are skipped; a scalar yields itself as a single item.
    pub fn string_items(&self) -> Vec<&str> {
        match self {
            Self::String(value) => vec![value.as_str()],
            Self::Array(items) => items.iter().filter_map(PlistValue::as_str).collect(),
            Self::Dictionary(_) => Vec::new(),
        }
    }
}

impl From<&str> for PlistValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for PlistValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<Vec<PlistValue>> for PlistValue {
    fn from(value: Vec<PlistValue>) -> Self {
        Self::Array(value)
    }
}

impl From<BTreeMap<String, PlistValue>> for PlistValue {
    fn from(value: BTreeMap<String, PlistValue>) -> Self {
        Self::Dictionary(value)
    }
}
