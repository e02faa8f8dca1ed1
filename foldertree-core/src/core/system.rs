//! Read-only folders derived from catalog path hints.
//!
//! A questionnaire may carry hints such as `"Math / Algebra"` or
//! `"Science > Physics > Optics"`. Only the first hint of each item is
//! turned into a chain of [`FolderKind::System`] folders, shared by every item
//! whose path passes through the same segments.
//!
//! Folder ids hash the lower-cased path, so a path maps to the same id on
//! every reload and persisted order lists keep pointing at the right folder.

use std::collections::HashMap;

use crate::{sanitize_folder_name, CanonicalItem, Folder, FolderKind, OrganizerSettings};

/// Prefix reserved for derived folder ids. User folders never carry it.
pub const SYSTEM_ID_PREFIX: &str = "sys-";

/// The derived system sub-forest plus each item's default placement.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SystemForest {
    /// Folders in derivation order; parents precede their children.
    pub folders: Vec<Folder>,
    /// Item key to the deepest system folder its hint reached.
    pub placement: HashMap<String, String>,
}

impl SystemForest {
    pub fn is_empty(&self) -> bool {
        self.folders.is_empty()
    }

    pub fn contains(&self, folder_id: &str) -> bool {
        self.folders.iter().any(|f| f.id == folder_id)
    }
}

/// Returns `true` if `id` lies in the namespace reserved for system folders.
pub fn is_system_id(id: &str) -> bool {
    id.starts_with(SYSTEM_ID_PREFIX)
}

/// Derives the deterministic id of the system folder for a normalized path.
pub fn system_folder_id(normalized_path: &str) -> String {
    let hash = blake3::hash(normalized_path.as_bytes());
    format!("{SYSTEM_ID_PREFIX}{}", &hash.to_hex()[..16])
}

/// Builds the system sub-forest for `items`.
pub fn derive_system_folders(items: &[CanonicalItem], settings: &OrganizerSettings) -> SystemForest {
    let mut forest = SystemForest::default();
    let mut by_path: HashMap<String, String> = HashMap::new();

    for item in items {
        let Some(hint) = item.folder_hints.first() else {
            continue;
        };
        let segments = split_hint(hint);

        let mut path = String::new();
        let mut parent: Option<String> = None;
        for segment in segments {
            if !path.is_empty() {
                path.push('/');
            }
            path.push_str(&segment.to_lowercase());

            let id = match by_path.get(&path) {
                Some(id) => id.clone(),
                None => {
                    let id = system_folder_id(&path);
                    let ordinal = forest.folders.len() + 1;
                    forest.folders.push(Folder {
                        id: id.clone(),
                        name: sanitize_folder_name(segment, ordinal, settings),
                        parent_id: parent.clone(),
                        kind: FolderKind::System,
                    });
                    by_path.insert(path.clone(), id.clone());
                    id
                }
            };
            parent = Some(id);
        }

        if let Some(deepest) = parent {
            forest.placement.insert(item.key.clone(), deepest);
        }
    }

    log::debug!(
        "Derived {} system folders for {} items",
        forest.folders.len(),
        forest.placement.len()
    );
    forest
}

/// Splits a hint on `/` or `>`, dropping blank segments.
fn split_hint(hint: &str) -> Vec<&str> {
    hint.split(['/', '>'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}
