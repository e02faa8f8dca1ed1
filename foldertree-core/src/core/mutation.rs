//! Pure state transitions on a [`TreeState`].
//!
//! Every function takes the current state by reference and returns a new
//! one. Requests that make no sense (unknown folder, cyclic move, redundant
//! move, system folder) return an unchanged clone, so callers can detect
//! "nothing happened" with `==`. Deleting a folder is the one operation that
//! reports why it refused; see [`delete_folder`](crate::delete_folder).

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::state::now_millis;
use crate::{parent_key, sanitize_folder_name, Folder, FolderKind, ItemRef, OrganizerSettings, TreeState};

/// Direction of a one-step reorder within a sibling list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MoveDirection {
    /// Towards the start of the list.
    Up,
    /// Towards the end of the list.
    Down,
}

fn unchanged(state: &TreeState, reason: &str) -> TreeState {
    log::debug!("Folder tree left unchanged: {reason}");
    state.clone()
}

fn fresh_folder_id(state: &TreeState) -> String {
    loop {
        let id = format!("f-{}", Uuid::new_v4());
        if !state.has_folder(&id) && !state.item_order_by_parent.contains_key(&id) {
            return id;
        }
    }
}

/// Appends a new user folder under `parent_id` and returns it with its id.
///
/// An unknown `parent_id` places the folder at the top level.
pub fn create_folder(
    state: &TreeState,
    name: &str,
    parent_id: Option<&str>,
    settings: &OrganizerSettings,
) -> (TreeState, String) {
    let parent = parent_id.filter(|id| state.has_folder(id));
    let id = fresh_folder_id(state);

    let mut next = state.clone();
    next.folders.push(Folder {
        id: id.clone(),
        name: sanitize_folder_name(name, state.folders.len() + 1, settings),
        parent_id: parent.map(str::to_string),
        kind: FolderKind::User,
    });
    next.item_order_by_parent
        .entry(parent_key(parent).to_string())
        .or_default()
        .push(ItemRef::folder(id.as_str()));
    next.item_order_by_parent.insert(id.clone(), Vec::new());
    next.updated_at = now_millis();

    log::debug!("Created folder {id}");
    (next, id)
}

/// Creates a folder, then moves each distinct ref of `item_refs` into it.
///
/// Refs that cannot move (unknown, cyclic) are skipped the way
/// [`move_item_to_parent`] skips them.
pub fn create_folder_with_items(
    state: &TreeState,
    name: &str,
    parent_id: Option<&str>,
    item_refs: &[ItemRef],
    settings: &OrganizerSettings,
) -> (TreeState, String) {
    let (mut next, id) = create_folder(state, name, parent_id, settings);
    let own_ref = ItemRef::folder(id.as_str());
    let mut seen = HashSet::new();
    for item_ref in item_refs {
        if *item_ref == own_ref || !seen.insert(item_ref) {
            continue;
        }
        next = move_item_to_parent(&next, item_ref, Some(id.as_str()));
    }
    (next, id)
}

/// Renames a user folder. System folders and unchanged names are no-ops.
pub fn rename_folder(
    state: &TreeState,
    folder_id: &str,
    name: &str,
    settings: &OrganizerSettings,
) -> TreeState {
    let Some(index) = state.folders.iter().position(|f| f.id == folder_id) else {
        return unchanged(state, "rename of unknown folder");
    };
    let folder = &state.folders[index];
    if folder.is_system() {
        return unchanged(state, "rename of system folder");
    }
    let name = sanitize_folder_name(name, index + 1, settings);
    if name == folder.name {
        return unchanged(state, "rename to the same name");
    }

    let mut next = state.clone();
    next.folders[index].name = name;
    next.updated_at = now_millis();
    next
}

/// Moves `item_ref` to the end of `target`'s list (`None` is the top level).
///
/// No-op when the ref is not placed, the target folder is unknown, the ref
/// is a system folder, the move would put a folder inside itself, or the
/// ref already lives under `target`.
pub fn move_item_to_parent(state: &TreeState, item_ref: &ItemRef, target: Option<&str>) -> TreeState {
    let Some(current) = state.parent_of(item_ref) else {
        return unchanged(state, "move of unplaced ref");
    };
    if target.is_some_and(|t| !state.has_folder(t)) {
        return unchanged(state, "move to unknown folder");
    }
    if let ItemRef::Folder(id) = item_ref {
        if state.folder(id).is_some_and(Folder::is_system) {
            return unchanged(state, "move of system folder");
        }
        if target.is_some_and(|t| state.is_descendant(t, id)) {
            return unchanged(state, "move would create a cycle");
        }
    }
    if current == target {
        return unchanged(state, "move to current parent");
    }

    let mut next = state.clone();
    if let Some(list) = next.item_order_by_parent.get_mut(parent_key(current)) {
        list.retain(|r| r != item_ref);
    }
    next.item_order_by_parent
        .entry(parent_key(target).to_string())
        .or_default()
        .push(item_ref.clone());

    match item_ref {
        ItemRef::Folder(id) => {
            if let Some(folder) = next.folders.iter_mut().find(|f| f.id == *id) {
                folder.parent_id = target.map(str::to_string);
            }
        }
        ItemRef::Leaf(key) => {
            if let Some(index) = next.student_folder_by_key.as_mut() {
                index.insert(key.clone(), target.map(str::to_string));
            }
        }
    }
    next.updated_at = now_millis();
    next
}

/// Swaps `item_ref` with its neighbour in `direction` within its sibling list.
pub fn move_item_by_offset(state: &TreeState, item_ref: &ItemRef, direction: MoveDirection) -> TreeState {
    if let ItemRef::Folder(id) = item_ref {
        if state.folder(id).is_some_and(Folder::is_system) {
            return unchanged(state, "reorder of system folder");
        }
    }
    let Some(current) = state.parent_of(item_ref) else {
        return unchanged(state, "reorder of unplaced ref");
    };
    let key = parent_key(current);
    let siblings = state.children(current);
    let Some(pos) = siblings.iter().position(|r| r == item_ref) else {
        return unchanged(state, "reorder of unplaced ref");
    };
    let neighbour = match direction {
        MoveDirection::Up => pos.checked_sub(1),
        MoveDirection::Down => (pos + 1 < siblings.len()).then_some(pos + 1),
    };
    let Some(neighbour) = neighbour else {
        return unchanged(state, "reorder past the end of the list");
    };

    let mut next = state.clone();
    if let Some(list) = next.item_order_by_parent.get_mut(key) {
        list.swap(pos, neighbour);
    }
    next.updated_at = now_millis();
    next
}

/// Places the item `item_key` at the end of `folder_id`'s list (`None` is the
/// top level), removing it from every other list first.
///
/// Unlike [`move_item_to_parent`] this also heals an item that was placed in
/// more than one list, and re-appends even when the item is already there.
pub fn assign_item_to_folder(state: &TreeState, item_key: &str, folder_id: Option<&str>) -> TreeState {
    if folder_id.is_some_and(|id| !state.has_folder(id)) {
        return unchanged(state, "assign to unknown folder");
    }
    let leaf = ItemRef::leaf(item_key);
    if state.parent_of(&leaf).is_none() {
        return unchanged(state, "assign of unknown item");
    }

    let mut next = state.clone();
    for list in next.item_order_by_parent.values_mut() {
        list.retain(|r| *r != leaf);
    }
    next.item_order_by_parent
        .entry(parent_key(folder_id).to_string())
        .or_default()
        .push(leaf);
    if let Some(index) = next.student_folder_by_key.as_mut() {
        index.insert(item_key.to_string(), folder_id.map(str::to_string));
    }
    next.updated_at = now_millis();
    next
}
