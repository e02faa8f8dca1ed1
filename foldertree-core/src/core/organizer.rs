//! The two instantiations of the folder tree behind one facade.
//!
//! An [`Organizer`] pairs a [`Domain`] with [`OrganizerSettings`] and exposes
//! every tree operation with both already applied. The questionnaire domain
//! derives read-only system folders from catalog hints; the roster domain
//! folds student names to case-insensitive keys and keeps a reverse index of
//! each student's folder.
//!
//! All methods are pure. The host loads the persisted document, calls
//! [`Organizer::load`], and saves whatever state the mutations return.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    assign_item_to_folder, build_parent_options, create_folder, create_folder_with_items,
    delete_folder, derive_system_folders, move_item_by_offset, move_item_to_parent,
    normalize_json_str, normalize_questionnaires, normalize_state, normalize_students,
    rename_folder, student_key, CanonicalItem, DeleteOutcome, ItemDescriptor, ItemRef,
    MoveDirection, NormalizeContext, OrganizerSettings, ParentOption, SystemForest, TreeState,
};

/// Which kind of items a tree organizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Domain {
    /// A student's questionnaire catalog, with derived system folders.
    Questionnaires,
    /// A curator's reviewed-student roster, with a reverse index.
    Roster,
}

/// Folder tree operations for one domain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Organizer {
    domain: Domain,
    settings: OrganizerSettings,
}

impl Organizer {
    pub fn new(domain: Domain, settings: OrganizerSettings) -> Self {
        Self { domain, settings }
    }

    /// Questionnaire organizer with default settings.
    pub fn questionnaires() -> Self {
        Self::new(Domain::Questionnaires, OrganizerSettings::default())
    }

    /// Roster organizer with default settings.
    pub fn roster() -> Self {
        Self::new(Domain::Roster, OrganizerSettings::default())
    }

    pub fn domain(&self) -> Domain {
        self.domain
    }

    pub fn settings(&self) -> &OrganizerSettings {
        &self.settings
    }

    /// Deduplicates raw inputs into canonical items for this domain.
    ///
    /// For the roster, a descriptor's `name` (or its `id` when there is no
    /// name) is the student's display name.
    pub fn canonical_items(&self, inputs: &[ItemDescriptor]) -> Vec<CanonicalItem> {
        match self.domain {
            Domain::Questionnaires => normalize_questionnaires(inputs),
            Domain::Roster => {
                let names: Vec<&str> = inputs
                    .iter()
                    .map(|input| match input {
                        ItemDescriptor::Id(name) => name.as_str(),
                        ItemDescriptor::Detailed { id, name, .. } => name.as_deref().unwrap_or(id),
                    })
                    .collect();
                normalize_students(&names)
            }
        }
    }

    /// The canonical key for an item as the user names it.
    pub fn item_key(&self, raw_key: &str) -> String {
        match self.domain {
            Domain::Questionnaires => raw_key.trim().to_string(),
            Domain::Roster => student_key(raw_key),
        }
    }


    /// Derives the system folders for `items`; only questionnaires have any.
    pub fn system_folders(&self, items: &[CanonicalItem]) -> Option<SystemForest> {
        match self.domain {
            Domain::Questionnaires => Some(derive_system_folders(items, &self.settings)),
            Domain::Roster => None,
        }
    }

    /// Builds a valid state from a persisted document (or `Value::Null`).
    pub fn load(&self, raw: &Value, items: &[CanonicalItem]) -> TreeState {
        let system = self.system_folders(items);
        normalize_state(raw, &self.context(items, system.as_ref()), &self.settings)
    }

    /// Like [`Organizer::load`], from the document's JSON text.
    pub fn load_str(&self, json: &str, items: &[CanonicalItem]) -> TreeState {
        let system = self.system_folders(items);
        normalize_json_str(json, &self.context(items, system.as_ref()), &self.settings)
    }

    /// The state for a user with nothing persisted yet.
    pub fn empty_state(&self, items: &[CanonicalItem]) -> TreeState {
        self.load(&Value::Null, items)
    }

    fn context<'a>(&self, items: &'a [CanonicalItem], system: Option<&'a SystemForest>) -> NormalizeContext<'a> {
        NormalizeContext {
            items,
            system,
            track_reverse_index: self.domain == Domain::Roster,
        }
    }

    pub fn create_folder(&self, state: &TreeState, name: &str, parent_id: Option<&str>) -> (TreeState, String) {
        create_folder(state, name, parent_id, &self.settings)
    }

    pub fn create_folder_with_items(
        &self,
        state: &TreeState,
        name: &str,
        parent_id: Option<&str>,
        item_refs: &[ItemRef],
    ) -> (TreeState, String) {
        create_folder_with_items(state, name, parent_id, item_refs, &self.settings)
    }

    pub fn rename_folder(&self, state: &TreeState, folder_id: &str, name: &str) -> TreeState {
        rename_folder(state, folder_id, name, &self.settings)
    }

    pub fn move_item_to_parent(&self, state: &TreeState, item_ref: &ItemRef, target: Option<&str>) -> TreeState {
        move_item_to_parent(state, item_ref, target)
    }

    pub fn move_item_by_offset(&self, state: &TreeState, item_ref: &ItemRef, direction: MoveDirection) -> TreeState {
        move_item_by_offset(state, item_ref, direction)
    }

    /// Assigns an item, given by its raw name or id, to a folder.
    pub fn assign_item_to_folder(&self, state: &TreeState, raw_key: &str, folder_id: Option<&str>) -> TreeState {
        assign_item_to_folder(state, &self.item_key(raw_key), folder_id)
    }

    pub fn delete_folder(&self, state: &TreeState, folder_id: &str) -> DeleteOutcome {
        delete_folder(state, folder_id)
    }

    /// Destination picker entries, labelled with the configured root label.
    pub fn parent_options(&self, state: &TreeState, exclude: Option<&str>) -> Vec<ParentOption> {
        build_parent_options(state, &self.settings.root_label, exclude)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DeleteError, ROOT_KEY};
    use serde_json::json;

    fn catalog() -> Vec<ItemDescriptor> {
        serde_json::from_value(json!([
            {"id": "q1", "folderHints": ["Math / Algebra"]},
            {"id": "q2", "folderHints": ["Math"]},
            "q3"
        ]))
        .unwrap()
    }

    #[test]
    fn test_questionnaire_load_places_by_hint() {
        let org = Organizer::questionnaires();
        let items = org.canonical_items(&catalog());
        let state = org.empty_state(&items);
        let math = state.folders[0].id.clone();
        let algebra = state.folders[1].id.clone();
        assert_eq!(state.children(Some(math.as_str())), &[ItemRef::folder(algebra.as_str()), ItemRef::leaf("q2")]);
        assert_eq!(state.children(Some(algebra.as_str())), &[ItemRef::leaf("q1")]);
        assert_eq!(state.children(None), &[ItemRef::folder(math.as_str()), ItemRef::leaf("q3")]);
        assert!(state.student_folder_by_key.is_none());
    }

    #[test]
    fn test_system_folders_are_read_only() {
        let org = Organizer::questionnaires();
        let items = org.canonical_items(&catalog());
        let state = org.empty_state(&items);
        let math = state.folders[0].id.clone();
        let math_ref = ItemRef::folder(math.as_str());

        assert_eq!(org.rename_folder(&state, &math, "Maths"), state);
        assert_eq!(org.move_item_by_offset(&state, &math_ref, MoveDirection::Down), state);
        assert_eq!(org.move_item_to_parent(&state, &math_ref, None), state);
        let outcome = org.delete_folder(&state, &math);
        assert_eq!(outcome.error, Some(DeleteError::Forbidden));
        assert_eq!(outcome.state, state);
    }

    #[test]
    fn test_user_move_out_of_system_folder_survives_reload() {
        let org = Organizer::questionnaires();
        let items = org.canonical_items(&catalog());
        let state = org.empty_state(&items);
        let moved = org.move_item_to_parent(&state, &ItemRef::leaf("q1"), None);
        let json = moved.to_json().unwrap();
        let reloaded = org.load_str(&json, &items);
        assert_eq!(reloaded, moved);
        assert_eq!(reloaded.item_order_by_parent[ROOT_KEY].last(), Some(&ItemRef::leaf("q1")));
    }

    #[test]
    fn test_roster_folds_names_and_tracks_index() {
        let org = Organizer::roster();
        let items = org.canonical_items(&["Ada Lovelace".into(), "ada  lovelace".into(), "Alan Turing".into()]);
        assert_eq!(items.len(), 2);
        let state = org.empty_state(&items);
        let index = state.student_folder_by_key.as_ref().unwrap();
        assert_eq!(index.len(), 2);
        assert!(index.values().all(Option::is_none));

        let (state, f) = org.create_folder(&state, "Reviewed", None);
        let state = org.assign_item_to_folder(&state, "  ADA LOVELACE ", Some(f.as_str()));
        assert_eq!(state.children(Some(f.as_str())), &[ItemRef::leaf("ada lovelace")]);
        assert_eq!(
            state.student_folder_by_key.as_ref().unwrap()["ada lovelace"],
            Some(f.clone())
        );

        let reloaded = org.load_str(&state.to_json().unwrap(), &items);
        assert_eq!(reloaded, state);
    }

    #[test]
    fn test_item_keys_per_domain() {
        assert_eq!(Organizer::questionnaires().item_key("  q1 "), "q1");
        assert_eq!(Organizer::roster().item_key(" Ada   LOVELACE "), "ada lovelace");
    }

    #[test]
    fn test_parent_options_use_root_label() {
        let settings = OrganizerSettings {
            root_label: "All students".to_string(),
            ..OrganizerSettings::default()
        };
        let org = Organizer::new(Domain::Roster, settings);
        let state = org.empty_state(&[]);
        let options = org.parent_options(&state, None);
        assert_eq!(options.len(), 1);
        assert_eq!(options[0].label, "All students");
    }
}
