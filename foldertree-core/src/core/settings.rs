//! Organizer settings.
//!
//! Settings arrive as a small JSON object owned by the host application.
//! Missing fields take their defaults, so older settings files keep working.

use serde::{Deserialize, Serialize};

use crate::{FolderTreeError, Result};

/// Tunables shared by every operation of an [`Organizer`](crate::Organizer).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OrganizerSettings {
    /// Folder names longer than this many characters are truncated.
    pub max_folder_name_length: usize,
    /// Prefix of the numbered name given to folders whose name is blank.
    pub folder_name_placeholder: String,
    /// Label of the root entry in destination pickers.
    pub root_label: String,
}

impl Default for OrganizerSettings {
    fn default() -> Self {
        Self {
            max_folder_name_length: 120,
            folder_name_placeholder: "Folder".to_string(),
            root_label: "All items".to_string(),
        }
    }
}

impl OrganizerSettings {
    /// Parses settings from JSON, filling absent fields with defaults.
    ///
    /// # Errors
    ///
    /// Returns [`FolderTreeError::Json`] for malformed JSON and
    /// [`FolderTreeError::InvalidSettings`] when a value is unusable.
    pub fn from_json(json: &str) -> Result<Self> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Parses settings, returning defaults if the input is missing or corrupt.
    pub fn from_json_lenient(json: &str) -> Self {
        match Self::from_json(json) {
            Ok(settings) => settings,
            Err(e) => {
                log::warn!("Ignoring unusable organizer settings: {e}");
                Self::default()
            }
        }
    }

    /// Serializes settings as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns [`FolderTreeError::Json`] if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    fn validate(&self) -> Result<()> {
        if self.max_folder_name_length == 0 {
            return Err(FolderTreeError::InvalidSettings(
                "maxFolderNameLength must be positive".to_string(),
            ));
        }
        if self.folder_name_placeholder.trim().is_empty() {
            return Err(FolderTreeError::InvalidSettings(
                "folderNamePlaceholder must not be blank".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let s = OrganizerSettings::default();
        assert_eq!(s.max_folder_name_length, 120);
        assert_eq!(s.folder_name_placeholder, "Folder");
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let s = OrganizerSettings::from_json(r#"{"rootLabel":"Everything"}"#).unwrap();
        assert_eq!(s.root_label, "Everything");
        assert_eq!(s.max_folder_name_length, 120);
    }

    #[test]
    fn test_zero_length_rejected() {
        let err = OrganizerSettings::from_json(r#"{"maxFolderNameLength":0}"#).unwrap_err();
        assert!(matches!(err, FolderTreeError::InvalidSettings(_)));
    }

    #[test]
    fn test_lenient_falls_back_to_defaults() {
        assert_eq!(OrganizerSettings::from_json_lenient("{not json"), OrganizerSettings::default());
        assert_eq!(
            OrganizerSettings::from_json_lenient(r#"{"folderNamePlaceholder":"  "}"#),
            OrganizerSettings::default()
        );
    }

    #[test]
    fn test_round_trip_uses_camel_case() {
        let json = OrganizerSettings::default().to_json().unwrap();
        assert!(json.contains("maxFolderNameLength"));
        assert_eq!(OrganizerSettings::from_json(&json).unwrap(), OrganizerSettings::default());
    }
}
