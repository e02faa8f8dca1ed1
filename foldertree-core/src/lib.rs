//! Core library for organizing items into a user-editable folder tree.
//!
//! The tree groups a flat set of opaque items (questionnaires, or reviewed
//! students) into nested folders with stable ordering. It is a pure value:
//! [`Organizer::load`] builds a valid [`TreeState`] from whatever the storage
//! layer persisted, and every mutation returns a new state without touching
//! its input. Nothing in this crate performs I/O.
//!
//! Types are re-exported from their respective sub-modules for convenience;
//! consumers should import from the crate root rather than the `core` module.

pub mod core;

// Re-export commonly used types.
#[doc(inline)]
pub use crate::core::{
    delete::{delete_folder, DeleteError, DeleteOutcome},
    error::{FolderTreeError, Result},
    folder::{sanitize_folder_name, Folder, FolderKind},
    item::{normalize_questionnaires, normalize_students, student_key, CanonicalItem, ItemDescriptor},
    item_ref::{ItemRef, ParseItemRefError},
    mutation::{
        assign_item_to_folder, create_folder, create_folder_with_items, move_item_by_offset,
        move_item_to_parent, rename_folder, MoveDirection,
    },
    normalize::{normalize_json_str, normalize_state, NormalizeContext},
    options::{build_parent_options, ParentOption},
    organizer::{Domain, Organizer},
    settings::OrganizerSettings,
    state::{parent_key, TreeState, ROOT_KEY, STATE_VERSION},
    system::{derive_system_folders, is_system_id, system_folder_id, SystemForest, SYSTEM_ID_PREFIX},
};
