//! Canonical item descriptors.
//!
//! Item sources hand the engine loose lists: bare ids, richer records, or
//! display names typed by hand. This module folds them into a deduplicated
//! list of [`CanonicalItem`]s with stable keys. First occurrence per key
//! wins; empty entries are dropped without complaint.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// A raw item as supplied by a catalog or roster.
///
/// Deserializes from either a JSON string or a `{id, name?, folderHints?}`
/// object, so catalogs can be fed in as they are stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ItemDescriptor {
    Id(String),
    Detailed {
        id: String,
        #[serde(default)]
        name: Option<String>,
        #[serde(default, rename = "folderHints")]
        folder_hints: Vec<String>,
    },
}

impl From<&str> for ItemDescriptor {
    fn from(id: &str) -> Self {
        Self::Id(id.to_string())
    }
}

impl From<String> for ItemDescriptor {
    fn from(id: String) -> Self {
        Self::Id(id)
    }
}

/// A deduplicated item with a stable key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalItem {
    pub key: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub folder_hints: Vec<String>,
}

/// Normalizes questionnaire descriptors. Ids pass through unchanged apart
/// from surrounding whitespace.
pub fn normalize_questionnaires(inputs: &[ItemDescriptor]) -> Vec<CanonicalItem> {
    let mut seen = HashSet::new();
    let mut items = Vec::new();
    for input in inputs {
        let (id, name, hints) = match input {
            ItemDescriptor::Id(id) => (id.as_str(), None, &[] as &[String]),
            ItemDescriptor::Detailed { id, name, folder_hints } => {
                (id.as_str(), name.as_deref(), folder_hints.as_slice())
            }
        };
        let key = id.trim();
        if key.is_empty() || !seen.insert(key.to_string()) {
            continue;
        }
        let name = name
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or(key);
        items.push(CanonicalItem {
            key: key.to_string(),
            name: name.to_string(),
            folder_hints: hints.to_vec(),
        });
    }
    items
}

/// Normalizes student display names. Spelling variants of one person
/// (case, extra spaces) collapse to the first-seen entry.
pub fn normalize_students<S: AsRef<str>>(names: &[S]) -> Vec<CanonicalItem> {
    let mut seen = HashSet::new();
    let mut items = Vec::new();
    for raw in names {
        let display = collapse_whitespace(raw.as_ref());
        if display.is_empty() {
            continue;
        }
        let key = display.to_lowercase();
        if !seen.insert(key.clone()) {
            continue;
        }
        items.push(CanonicalItem {
            key,
            name: display,
            folder_hints: Vec::new(),
        });
    }
    items
}

/// Folds a student name to its case-insensitive, whitespace-collapsed key.
pub fn student_key(name: &str) -> String {
    collapse_whitespace(name).to_lowercase()
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
