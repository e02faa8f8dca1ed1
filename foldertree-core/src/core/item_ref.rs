//! Tagged references stored in order lists.
//!
//! A single order list interleaves folders and items, so every entry carries
//! a prefix that says which kind it is: `folder:<id>` or `leaf:<key>`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

const FOLDER_PREFIX: &str = "folder:";
const LEAF_PREFIX: &str = "leaf:";

/// One entry of an order list.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ItemRef {
    /// A canonical item, by key.
    Leaf(String),
    /// A folder, by id.
    Folder(String),
}

impl ItemRef {
    pub fn leaf(key: impl Into<String>) -> Self {
        Self::Leaf(key.into())
    }

    pub fn folder(id: impl Into<String>) -> Self {
        Self::Folder(id.into())
    }

    /// Returns the folder id if this is a folder ref.
    pub fn folder_id(&self) -> Option<&str> {
        match self {
            Self::Folder(id) => Some(id),
            Self::Leaf(_) => None,
        }
    }

    /// Returns the item key if this is a leaf ref.
    pub fn leaf_key(&self) -> Option<&str> {
        match self {
            Self::Leaf(key) => Some(key),
            Self::Folder(_) => None,
        }
    }
}

impl fmt::Display for ItemRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Leaf(key) => write!(f, "{LEAF_PREFIX}{key}"),
            Self::Folder(id) => write!(f, "{FOLDER_PREFIX}{id}"),
        }
    }
}

/// Returned when a string carries neither tag or names nothing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("not an item ref: {0:?}")]
pub struct ParseItemRefError(pub String);

impl FromStr for ItemRef {
    type Err = ParseItemRefError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(id) = s.strip_prefix(FOLDER_PREFIX) {
            if !id.is_empty() {
                return Ok(Self::Folder(id.to_string()));
            }
        } else if let Some(key) = s.strip_prefix(LEAF_PREFIX) {
            if !key.is_empty() {
                return Ok(Self::Leaf(key.to_string()));
            }
        }
        Err(ParseItemRefError(s.to_string()))
    }
}

impl Serialize for ItemRef {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ItemRef {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
