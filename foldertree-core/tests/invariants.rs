//! Structural invariants checked after long operation sequences.

use std::collections::{BTreeSet, HashMap};

use foldertree_core::{
    parent_key, CanonicalItem, ItemDescriptor, ItemRef, MoveDirection, Organizer, TreeState, ROOT_KEY,
};
use serde_json::{json, Value};

/// Small deterministic generator so failures reproduce.
struct Lcg(u64);

impl Lcg {
    fn next(&mut self, bound: usize) -> usize {
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        ((self.0 >> 33) as usize) % bound.max(1)
    }
}

fn assert_invariants(state: &TreeState, items: &[CanonicalItem]) {
    let keys: BTreeSet<&str> = state.item_order_by_parent.keys().map(String::as_str).collect();
    let mut expected: BTreeSet<&str> = state.folders.iter().map(|f| f.id.as_str()).collect();
    assert_eq!(expected.len(), state.folders.len(), "duplicate folder ids");
    expected.insert(ROOT_KEY);
    assert_eq!(keys, expected, "order list keys");

    let mut seen: HashMap<&ItemRef, &str> = HashMap::new();
    for (key, refs) in &state.item_order_by_parent {
        for item_ref in refs {
            assert!(seen.insert(item_ref, key).is_none(), "{item_ref} placed twice");
        }
    }
    for folder in &state.folders {
        let item_ref = ItemRef::folder(folder.id.as_str());
        assert_eq!(
            seen.get(&item_ref).copied(),
            Some(parent_key(folder.parent_id.as_deref())),
            "folder {} in wrong list",
            folder.id
        );
        let mut hops = 0;
        let mut current = folder.parent_id.as_deref();
        while let Some(id) = current {
            assert_ne!(id, folder.id, "folder {} is its own ancestor", folder.id);
            hops += 1;
            assert!(hops <= state.folders.len(), "parent chain does not end");
            current = state.folder(id).and_then(|f| f.parent_id.as_deref());
        }
    }
    let leaves: BTreeSet<&str> = seen.keys().filter_map(|r| r.leaf_key()).collect();
    let canonical: BTreeSet<&str> = items.iter().map(|i| i.key.as_str()).collect();
    assert_eq!(leaves, canonical, "leaf set");
    assert_eq!(seen.len(), state.folders.len() + items.len());

    if let Some(index) = &state.student_folder_by_key {
        for (key, folder) in index {
            let holder = seen[&ItemRef::leaf(key.as_str())];
            assert_eq!(parent_key(folder.as_deref()), holder, "stale reverse index for {key}");
        }
    }
}

fn all_refs(state: &TreeState) -> Vec<ItemRef> {
    state.item_order_by_parent.values().flatten().cloned().collect()
}

fn run_sequence(org: &Organizer, items: &[CanonicalItem], seed: u64, steps: usize) -> TreeState {
    let mut rng = Lcg(seed);
    let mut state = org.empty_state(items);
    assert_invariants(&state, items);

    for step in 0..steps {
        let refs = all_refs(&state);
        let folder_ids: Vec<String> = state.folders.iter().map(|f| f.id.clone()).collect();
        let target = match rng.next(folder_ids.len() + 1) {
            0 => None,
            n => Some(folder_ids[n - 1].clone()),
        };
        let target = target.as_deref();
        let some_ref = refs[rng.next(refs.len())].clone();

        state = match rng.next(7) {
            0 => org.create_folder(&state, &format!("F{step}"), target).0,
            1 | 2 => org.move_item_to_parent(&state, &some_ref, target),
            3 => {
                let direction = if rng.next(2) == 0 { MoveDirection::Up } else { MoveDirection::Down };
                org.move_item_by_offset(&state, &some_ref, direction)
            }
            4 => match target {
                Some(id) => org.delete_folder(&state, id).state,
                None => state,
            },
            5 => match some_ref.leaf_key() {
                Some(key) => org.assign_item_to_folder(&state, key, target),
                None => state,
            },
            _ => {
                let picked: Vec<ItemRef> = refs.iter().filter(|_| rng.next(4) == 0).cloned().collect();
                org.create_folder_with_items(&state, "", target, &picked).0
            }
        };
        assert_invariants(&state, items);
    }
    state
}

fn questionnaire_catalog() -> (Organizer, Vec<CanonicalItem>) {
    let org = Organizer::questionnaires();
    let inputs: Vec<ItemDescriptor> = serde_json::from_value(json!([
        {"id": "q1", "folderHints": ["Math/Algebra"]},
        {"id": "q2", "folderHints": ["Math/Geometry"]},
        {"id": "q3", "folderHints": ["Science > Physics"]},
        "q4", "q5", "q6", "q4"
    ]))
    .unwrap();
    let items = org.canonical_items(&inputs);
    (org, items)
}

#[test]
fn test_example_one_normalize_null() {
    let org = Organizer::questionnaires();
    let items = org.canonical_items(&["q1".into(), "q2".into()]);
    let state = org.load(&Value::Null, &items);
    assert!(state.folders.is_empty());
    assert_eq!(state.children(None), &[ItemRef::leaf("q1"), ItemRef::leaf("q2")]);
}

#[test]
fn test_example_two_create_then_move() {
    let org = Organizer::questionnaires();
    let items = org.canonical_items(&["q1".into(), "q2".into()]);
    let state = org.empty_state(&items);
    let (state, f) = org.create_folder(&state, "Important", None);
    let f_ref = ItemRef::folder(f.as_str());
    assert_eq!(state.children(None), &[ItemRef::leaf("q1"), ItemRef::leaf("q2"), f_ref.clone()]);

    let state = org.move_item_to_parent(&state, &ItemRef::leaf("q2"), Some(f.as_str()));
    assert_eq!(state.children(Some(f.as_str())), &[ItemRef::leaf("q2")]);
    assert_eq!(state.children(None), &[ItemRef::leaf("q1"), f_ref]);
}

#[test]
fn test_example_three_cycle_guard() {
    let org = Organizer::questionnaires();
    let state = org.empty_state(&[]);
    let (state, a) = org.create_folder(&state, "A", None);
    let (state, b) = org.create_folder(&state, "B", Some(a.as_str()));
    let next = org.move_item_to_parent(&state, &ItemRef::folder(a.as_str()), Some(b.as_str()));
    assert_eq!(next, state);
    assert_eq!(next.folder(&a).unwrap().parent_id, None);
}

#[test]
fn test_example_four_delete_after_emptying() {
    let org = Organizer::questionnaires();
    let items = org.canonical_items(&["q1".into()]);
    let (state, f) = org.create_folder(&org.empty_state(&items), "F", None);
    let state = org.move_item_to_parent(&state, &ItemRef::leaf("q1"), Some(f.as_str()));
    assert_eq!(org.delete_folder(&state, &f).error, Some(foldertree_core::DeleteError::NotEmpty));

    let state = org.move_item_to_parent(&state, &ItemRef::leaf("q1"), None);
    let outcome = org.delete_folder(&state, &f);
    assert!(outcome.is_ok());
    assert!(outcome.state.folder(&f).is_none());
    assert!(!outcome.state.item_order_by_parent.contains_key(&f));
    assert_invariants(&outcome.state, &items);
}

#[test]
fn test_questionnaire_sequences_keep_invariants() {
    let (org, items) = questionnaire_catalog();
    for seed in 1..=20 {
        run_sequence(&org, &items, seed, 150);
    }
}

#[test]
fn test_roster_sequences_keep_invariants() {
    let org = Organizer::roster();
    let items = org.canonical_items(&[
        "Ada Lovelace".into(),
        "Alan Turing".into(),
        "Grace Hopper".into(),
        "grace  hopper".into(),
        "Edsger Dijkstra".into(),
    ]);
    assert_eq!(items.len(), 4);
    for seed in 100..=120 {
        run_sequence(&org, &items, seed, 150);
    }
}

#[test]
fn test_normalize_is_idempotent_after_sequences() {
    let (org, items) = questionnaire_catalog();
    for seed in 7..=12 {
        let state = run_sequence(&org, &items, seed, 80);
        let reloaded = org.load(&serde_json::to_value(&state).unwrap(), &items);
        assert_eq!(reloaded, state);
    }
}

#[test]
fn test_catalog_shrink_repairs_state() {
    let (org, items) = questionnaire_catalog();
    let state = run_sequence(&org, &items, 3, 100);
    let fewer: Vec<CanonicalItem> = items.iter().filter(|i| i.key != "q1" && i.key != "q4").cloned().collect();
    let reloaded = org.load(&serde_json::to_value(&state).unwrap(), &fewer);
    assert_invariants(&reloaded, &fewer);
}

#[test]
fn test_hand_edited_document_is_repaired() {
    let (org, items) = questionnaire_catalog();
    let raw = json!({
        "version": 0,
        "folders": [
            {"id": "d", "name": "D", "parentId": "y"},
            {"id": "x", "name": "X", "parentId": "y"},
            {"id": "y", "name": "Y", "parentId": "x"},
            {"id": "x", "name": "X again"},
            {"id": 5, "name": "numeric id"}
        ],
        "itemOrderByParent": {
            "__root__": ["leaf:q4", "leaf:q4", "folder:x"],
            "y": ["leaf:q5", "folder:x"],
            "x": ["folder:y", "leaf:q5"]
        },
        "updatedAt": null
    });
    let state = org.load(&raw, &items);
    assert_invariants(&state, &items);
    // "d" hangs off the x/y cycle and "x" closes it; both lose their parent.
    // "y" stays inside "x", whose list is read first.
    assert_eq!(state.folder("d").unwrap().parent_id, None);
    assert!(state.children(None).contains(&ItemRef::folder("d")));
    assert_eq!(state.folder("x").unwrap().parent_id, None);
    assert_eq!(state.children(Some("x")), &[ItemRef::folder("y"), ItemRef::leaf("q5")]);
    assert!(state.children(Some("y")).is_empty());
}
