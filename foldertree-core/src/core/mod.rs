//! Internal domain modules for the folder tree core library.
//!
//! All public types from these modules are re-exported at the crate root
//! with `#[doc(inline)]`; import from there in preference to this module.

pub mod delete;
pub mod error;
pub mod folder;
pub mod item;
pub mod item_ref;
pub mod mutation;
pub mod normalize;
pub mod options;
pub mod organizer;
pub mod settings;
pub mod state;
pub mod system;

#[doc(inline)]
pub use delete::{delete_folder, DeleteError, DeleteOutcome};
#[doc(inline)]
pub use error::{FolderTreeError, Result};
#[doc(inline)]
pub use folder::{sanitize_folder_name, Folder, FolderKind};
#[doc(inline)]
pub use item::{normalize_questionnaires, normalize_students, student_key, CanonicalItem, ItemDescriptor};
#[doc(inline)]
pub use item_ref::{ItemRef, ParseItemRefError};
#[doc(inline)]
pub use mutation::{
    assign_item_to_folder, create_folder, create_folder_with_items, move_item_by_offset,
    move_item_to_parent, rename_folder, MoveDirection,
};
#[doc(inline)]
pub use normalize::{normalize_json_str, normalize_state, NormalizeContext};
#[doc(inline)]
pub use options::{build_parent_options, ParentOption};
#[doc(inline)]
pub use organizer::{Domain, Organizer};
#[doc(inline)]
pub use settings::OrganizerSettings;
#[doc(inline)]
pub use state::{parent_key, TreeState, ROOT_KEY, STATE_VERSION};
#[doc(inline)]
pub use system::{derive_system_folders, is_system_id, system_folder_id, SystemForest, SYSTEM_ID_PREFIX};
