//! Folder nodes of the organizer tree.

use serde::{Deserialize, Serialize};

use crate::OrganizerSettings;

/// Where a folder came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FolderKind {
    /// Created by the user; freely editable.
    #[default]
    User,
    /// Derived from catalog metadata; read-only to direct mutation.
    System,
}

/// A named tree node that holds an ordered list of child refs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Folder {
    pub id: String,
    pub name: String,
    pub parent_id: Option<String>,
    #[serde(default)]
    pub kind: FolderKind,
}

impl Folder {
    pub fn is_system(&self) -> bool {
        self.kind == FolderKind::System
    }
}

/// Trims `raw` and caps it at the configured length.
///
/// A name that is blank after trimming becomes `"<placeholder> <ordinal>"`,
/// where `ordinal` is the 1-based slot of the folder in the folder list.
pub fn sanitize_folder_name(raw: &str, ordinal: usize, settings: &OrganizerSettings) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return format!("{} {ordinal}", settings.folder_name_placeholder.trim());
    }
    match trimmed.char_indices().nth(settings.max_folder_name_length) {
        // Truncation can expose trailing whitespace from the middle of the name.
        Some((cut, _)) => trimmed[..cut].trim_end().to_string(),
        None => trimmed.to_string(),
    }
}
