//! Flattened destination list for "move to folder" pickers.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::TreeState;

/// One selectable destination: the top level or a folder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParentOption {
    /// Folder id, or `None` for the top level.
    pub id: Option<String>,
    pub label: String,
    /// 0 for the top level, 1 for top-level folders, +1 per nesting level.
    pub depth: usize,
}

/// Lists the top level followed by every folder in pre-order.
///
/// Siblings appear in their display order. `exclude` drops that folder and
/// its whole subtree, which is what a picker for moving that folder needs.
pub fn build_parent_options(state: &TreeState, root_label: &str, exclude: Option<&str>) -> Vec<ParentOption> {
    let mut options = vec![ParentOption {
        id: None,
        label: root_label.to_string(),
        depth: 0,
    }];
    let mut visited = HashSet::new();
    push_children(state, None, 1, exclude, &mut options, &mut visited);
    options
}

fn push_children<'a>(
    state: &'a TreeState,
    parent: Option<&str>,
    depth: usize,
    exclude: Option<&str>,
    options: &mut Vec<ParentOption>,
    visited: &mut HashSet<&'a str>,
) {
    for id in state.children(parent).iter().filter_map(|r| r.folder_id()) {
        if Some(id) == exclude || !visited.insert(id) {
            continue;
        }
        let Some(folder) = state.folder(id) else {
            continue;
        };
        options.push(ParentOption {
            id: Some(folder.id.clone()),
            label: folder.name.clone(),
            depth,
        });
        push_children(state, Some(id), depth + 1, exclude, options, visited);
    }
}
