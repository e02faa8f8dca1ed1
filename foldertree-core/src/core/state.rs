//! The persisted tree state and its read accessors.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::{Folder, ItemRef, Result};

/// Parent key of the top level. Never a valid folder id.
pub const ROOT_KEY: &str = "__root__";

/// Schema version written into every state.
pub const STATE_VERSION: u32 = 1;

/// Map key of the order list for `parent` (`None` is the top level).
pub fn parent_key(parent: Option<&str>) -> &str {
    parent.unwrap_or(ROOT_KEY)
}

/// Current wall-clock time in epoch milliseconds.
pub(crate) fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// A structurally valid folder tree.
///
/// Only [`normalize_state`](crate::normalize_state) builds one from outside
/// data; the mutation functions derive new states from existing ones.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeState {
    pub version: u32,
    pub folders: Vec<Folder>,
    /// Ordered child refs per parent key ([`ROOT_KEY`] or a folder id).
    pub item_order_by_parent: BTreeMap<String, Vec<ItemRef>>,
    /// Roster only: item key to the folder currently holding it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub student_folder_by_key: Option<BTreeMap<String, Option<String>>>,
    /// Epoch milliseconds of the last change.
    pub updated_at: i64,
}

impl TreeState {
    /// Serializes the state as the JSON document handed to storage.
    ///
    /// # Errors
    ///
    /// Returns [`crate::FolderTreeError::Json`] if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn folder(&self, folder_id: &str) -> Option<&Folder> {
        self.folders.iter().find(|f| f.id == folder_id)
    }

    pub fn has_folder(&self, folder_id: &str) -> bool {
        self.folder(folder_id).is_some()
    }

    /// Child refs of `parent` in display order.
    pub fn children(&self, parent: Option<&str>) -> &[ItemRef] {
        self.item_order_by_parent
            .get(parent_key(parent))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Finds the order list holding `item_ref`.
    ///
    /// Returns `None` if the ref is not placed anywhere, `Some(None)` for the
    /// top level, and `Some(Some(id))` for a folder.
    pub fn parent_of(&self, item_ref: &ItemRef) -> Option<Option<&str>> {
        self.item_order_by_parent
            .iter()
            .find(|(_, refs)| refs.contains(item_ref))
            .map(|(key, _)| (key != ROOT_KEY).then_some(key.as_str()))
    }

    /// Returns `true` if `candidate` is `ancestor` or lies beneath it.
    ///
    /// The walk stops on a repeated id, so a corrupted parent chain cannot
    /// loop forever.
    pub fn is_descendant(&self, candidate: &str, ancestor: &str) -> bool {
        let mut seen = HashSet::new();
        let mut current = Some(candidate);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            if !seen.insert(id) {
                return false;
            }
            current = self.folder(id).and_then(|f| f.parent_id.as_deref());
        }
        false
    }

    /// Names of the folders from the top level down to `folder_id`.
    ///
    /// Empty if the folder does not exist.
    pub fn folder_path(&self, folder_id: &str) -> Vec<String> {
        let mut path = Vec::new();
        let mut seen = HashSet::new();
        let mut current = self.folder(folder_id);
        while let Some(folder) = current {
            if !seen.insert(folder.id.as_str()) {
                break;
            }
            path.push(folder.name.clone());
            current = folder.parent_id.as_deref().and_then(|p| self.folder(p));
        }
        path.reverse();
        path
    }

    /// All leaf keys in the subtree under `parent`, in display order.
    pub fn leaf_keys_under(&self, parent: Option<&str>) -> Vec<String> {
        let mut keys = Vec::new();
        let mut visited = HashSet::new();
        self.collect_leaf_keys(parent_key(parent), &mut keys, &mut visited);
        keys
    }

    fn collect_leaf_keys<'a>(
        &'a self,
        key: &'a str,
        keys: &mut Vec<String>,
        visited: &mut HashSet<&'a str>,
    ) {
        if !visited.insert(key) {
            return;
        }
        for item_ref in self.item_order_by_parent.get(key).into_iter().flatten() {
            match item_ref {
                ItemRef::Leaf(k) => keys.push(k.clone()),
                ItemRef::Folder(id) => self.collect_leaf_keys(id, keys, visited),
            }
        }
    }
}
