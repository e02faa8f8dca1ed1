//! Folder deletion and its result types.
//!
//! Deletion is the one tree operation that explains a refusal. The reasons
//! are returned as a tag next to the (unchanged) state rather than as a Rust
//! error, so a caller that ignores the tag still holds a usable tree.
//!
//! ## Serialization
//!
//! [`DeleteError`] serializes as the kebab-case tags `"not-found"`,
//! `"forbidden"` and `"not-empty"`; [`DeleteOutcome`] omits `error` on
//! success.
//!
//! ## Examples
//!
//! ```rust
//! use foldertree_core::{DeleteError, ItemRef, Organizer};
//!
//! let organizer = Organizer::questionnaires();
//! let items = organizer.canonical_items(&["q1".into()]);
//! let state = organizer.empty_state(&items);
//! let (state, folder) = organizer.create_folder(&state, "Later", None);
//! let state = organizer.move_item_to_parent(&state, &ItemRef::leaf("q1"), Some(folder.as_str()));
//!
//! let blocked = organizer.delete_folder(&state, &folder);
//! assert_eq!(blocked.error, Some(DeleteError::NotEmpty));
//! assert_eq!(blocked.state, state);
//!
//! let json = serde_json::to_string(&DeleteError::NotEmpty).unwrap();
//! assert_eq!(json, r#""not-empty""#);
//! ```

use serde::{Deserialize, Serialize};

use crate::core::state::now_millis;
use crate::{ItemRef, TreeState};

/// Why a folder could not be deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[serde(rename_all = "kebab-case")]
pub enum DeleteError {
    /// No folder has the requested id.
    #[error("folder not found")]
    NotFound,

    /// The folder is derived from catalog metadata.
    #[error("system folders cannot be deleted")]
    Forbidden,

    /// The folder still holds folders or items.
    #[error("folder is not empty")]
    NotEmpty,
}

/// The state after a delete attempt, plus the refusal reason if any.
///
/// On refusal `state` equals the input state.
///
/// # Examples
///
/// ```rust
/// use foldertree_core::{DeleteError, Organizer};
///
/// let organizer = Organizer::questionnaires();
/// let state = organizer.empty_state(&[]);
/// let outcome = organizer.delete_folder(&state, "missing");
/// assert!(!outcome.is_ok());
/// assert_eq!(outcome.into_result(), Err(DeleteError::NotFound));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteOutcome {
    /// The resulting state.
    pub state: TreeState,

    /// Set when the folder was not deleted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<DeleteError>,
}

impl DeleteOutcome {
    fn refused(state: &TreeState, error: DeleteError) -> Self {
        log::debug!("Folder delete refused: {error}");
        Self {
            state: state.clone(),
            error: Some(error),
        }
    }

    /// Returns `true` if the folder was deleted.
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    /// Converts into a `Result`, dropping the unchanged state on refusal.
    ///
    /// # Errors
    ///
    /// Returns the [`DeleteError`] if the folder was not deleted.
    pub fn into_result(self) -> std::result::Result<TreeState, DeleteError> {
        match self.error {
            None => Ok(self.state),
            Some(error) => Err(error),
        }
    }
}

/// Deletes an empty user folder.
///
/// The folder's ref leaves its parent's list, its own (empty) list is
/// removed, and reverse-index entries pointing at it fall back to the top
/// level.
pub fn delete_folder(state: &TreeState, folder_id: &str) -> DeleteOutcome {
    let Some(folder) = state.folder(folder_id) else {
        return DeleteOutcome::refused(state, DeleteError::NotFound);
    };
    if folder.is_system() {
        return DeleteOutcome::refused(state, DeleteError::Forbidden);
    }
    if !state.children(Some(folder_id)).is_empty() {
        return DeleteOutcome::refused(state, DeleteError::NotEmpty);
    }

    let folder_ref = ItemRef::folder(folder_id);
    let mut next = state.clone();
    next.folders.retain(|f| f.id != folder_id);
    for list in next.item_order_by_parent.values_mut() {
        list.retain(|r| *r != folder_ref);
    }
    next.item_order_by_parent.remove(folder_id);
    if let Some(index) = next.student_folder_by_key.as_mut() {
        for placement in index.values_mut() {
            if placement.as_deref() == Some(folder_id) {
                *placement = None;
            }
        }
    }
    next.updated_at = now_millis();

    log::debug!("Deleted folder {folder_id}");
    DeleteOutcome {
        state: next,
        error: None,
    }
}
