//! Source-tree symbols.
//!
//! A file reference path is always expressed relative to one symbolic root.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Plist symbol for the project directory.
pub const SOURCE_TREE_SOURCE_ROOT: &str = "SOURCE_ROOT";
/// Plist symbol for the build products directory.
pub const SOURCE_TREE_BUILT_PRODUCTS_DIR: &str = "BUILT_PRODUCTS_DIR";
/// Plist symbol for the active SDK.
pub const SOURCE_TREE_SDKROOT: &str = "SDKROOT";
/// Plist symbol for the developer directory.
pub const SOURCE_TREE_DEVELOPER_DIR: &str = "DEVELOPER_DIR";
/// Plist symbol for absolute paths.
pub const SOURCE_TREE_ABSOLUTE: &str = "<absolute>";
/// Plist symbol for paths relative to the enclosing group.
pub const SOURCE_TREE_GROUP: &str = "<group>";

/// Symbolic root a path is expressed relative to.
///
/// "Unspecified" is modelled as `Option<SourceTree>::None` by callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SourceTree {
    #[serde(rename = "SOURCE_ROOT")]
    SourceRoot,
    #[serde(rename = "BUILT_PRODUCTS_DIR")]
    BuiltProductsDir,
    #[serde(rename = "SDKROOT")]
    SdkRoot,
    #[serde(rename = "DEVELOPER_DIR")]
    DeveloperDir,
    #[serde(rename = "<absolute>")]
    Absolute,
    #[serde(rename = "<group>")]
    Group,
}

impl SourceTree {
    /// Trees backed by a directory root, in resolution order.
    pub const ROOTS: [SourceTree; 4] = [
        Self::SourceRoot,
        Self::BuiltProductsDir,
        Self::SdkRoot,
        Self::DeveloperDir,
    ];

    /// Stable plist symbol.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::SourceRoot => SOURCE_TREE_SOURCE_ROOT,
            Self::BuiltProductsDir => SOURCE_TREE_BUILT_PRODUCTS_DIR,
            Self::SdkRoot => SOURCE_TREE_SDKROOT,
            Self::DeveloperDir => SOURCE_TREE_DEVELOPER_DIR,
            Self::Absolute => SOURCE_TREE_ABSOLUTE,
            Self::Group => SOURCE_TREE_GROUP,
        }
    }

    /// Build-setting variable that expands to this root.
    ///
    /// `SOURCE_ROOT` is written as `SRCROOT`, the spelling build settings use.
    pub fn setting_variable(self) -> Option<&'static str> {
        match self {
            Self::SourceRoot => Some("SRCROOT"),
            Self::BuiltProductsDir => Some(SOURCE_TREE_BUILT_PRODUCTS_DIR),
            Self::SdkRoot => Some(SOURCE_TREE_SDKROOT),
            Self::DeveloperDir => Some(SOURCE_TREE_DEVELOPER_DIR),
            Self::Absolute | Self::Group => None,
        }
    }
}

impl Display for SourceTree {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceTree {
    type Err = SourceTreeParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "" => Err(SourceTreeParseError::Empty),
            SOURCE_TREE_SOURCE_ROOT => Ok(Self::SourceRoot),
            SOURCE_TREE_BUILT_PRODUCTS_DIR => Ok(Self::BuiltProductsDir),
            SOURCE_TREE_SDKROOT => Ok(Self::SdkRoot),
            SOURCE_TREE_DEVELOPER_DIR => Ok(Self::DeveloperDir),
            SOURCE_TREE_ABSOLUTE => Ok(Self::Absolute),
            SOURCE_TREE_GROUP => Ok(Self::Group),
            other => Err(SourceTreeParseError::Unknown(other.to_string())),
        }
    }
}

/// Source-tree symbol parse errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceTreeParseError {
    Empty,
    Unknown(String),
}

impl Display for SourceTreeParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "source tree symbol must not be empty"),
            Self::Unknown(value) => write!(f, "unknown source tree symbol: {value}"),
        }
    }
}

impl Error for SourceTreeParseError {}
