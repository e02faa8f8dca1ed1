//! Turns untrusted persisted data into a valid [`TreeState`].
//!
//! The persisted document may be missing, come from an older schema, or have
//! been edited by hand. Nothing here fails: whatever cannot be validated is
//! dropped and the tree is rebuilt around what survives. Every repair is
//! logged at `debug`, with a single `warn` summary per document.
//!
//! The steps, in order:
//!
//! 1. sanitize user folders (ids, names, parent links, system impostors);
//! 2. break any parent cycle that survived step 1;
//! 3. merge the derived system folders in front of the user folders;
//! 4. sanitize the roster reverse index, if the domain keeps one;
//! 5. rebuild the order lists, then place every folder and item not yet placed;
//! 6. recompute the reverse index from the final order lists;
//! 7. keep `updatedAt` when it is a usable number.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;

use serde_json::{Map, Value};

use crate::core::state::now_millis;
use crate::core::system::is_system_id;
use crate::{
    parent_key, sanitize_folder_name, CanonicalItem, Folder, FolderKind, ItemRef,
    OrganizerSettings, SystemForest, TreeState, ROOT_KEY, STATE_VERSION,
};

/// The current canonical inputs a persisted document is reconciled against.
#[derive(Debug, Clone, Copy)]
pub struct NormalizeContext<'a> {
    /// Canonical items, in display order for newly placed entries.
    pub items: &'a [CanonicalItem],
    /// Derived system folders (questionnaire domain).
    pub system: Option<&'a SystemForest>,
    /// Whether the state keeps `studentFolderByKey` (roster domain).
    pub track_reverse_index: bool,
}

impl<'a> NormalizeContext<'a> {
    /// Context for a plain tree with no system folders and no reverse index.
    pub fn plain(items: &'a [CanonicalItem]) -> Self {
        Self {
            items,
            system: None,
            track_reverse_index: false,
        }
    }
}

/// Counts repairs so a single summary can be logged per document.
#[derive(Default)]
struct Repairs(usize);

impl Repairs {
    fn record(&mut self, what: fmt::Arguments<'_>) {
        log::debug!("Repairing folder state: {what}");
        self.0 += 1;
    }
}

/// Parses `json` and normalizes it. Text that is not JSON counts as absent.
pub fn normalize_json_str(
    json: &str,
    ctx: &NormalizeContext<'_>,
    settings: &OrganizerSettings,
) -> TreeState {
    let raw = match serde_json::from_str::<Value>(json) {
        Ok(raw) => raw,
        Err(e) => {
            log::warn!("Discarding unreadable folder state: {e}");
            Value::Null
        }
    };
    normalize_state(&raw, ctx, settings)
}

/// Builds a valid state from `raw`, repairing or discarding anything invalid.
pub fn normalize_state(
    raw: &Value,
    ctx: &NormalizeContext<'_>,
    settings: &OrganizerSettings,
) -> TreeState {
    let mut repairs = Repairs::default();
    let empty = Map::new();
    let doc = match raw {
        Value::Object(doc) => doc,
        Value::Null => &empty,
        other => {
            repairs.record(format_args!("document is not an object ({})", kind_of(other)));
            &empty
        }
    };

    let system_folders: &[Folder] = ctx.system.map(|s| s.folders.as_slice()).unwrap_or(&[]);

    let mut user_folders = sanitize_folders(doc.get("folders"), system_folders, settings, &mut repairs);
    break_cycles(&mut user_folders, &mut repairs);

    let mut folders = system_folders.to_vec();
    folders.extend(user_folders);

    let item_keys: HashSet<&str> = ctx.items.iter().map(|i| i.key.as_str()).collect();
    let folder_ids: HashSet<&str> = folders.iter().map(|f| f.id.as_str()).collect();

    let reverse_index = ctx.track_reverse_index.then(|| {
        sanitize_reverse_index(doc.get("studentFolderByKey"), &item_keys, &folder_ids, &mut repairs)
    });

    let item_order_by_parent = rebuild_order(
        doc.get("itemOrderByParent"),
        &folders,
        &item_keys,
        ctx,
        reverse_index.as_ref(),
        &mut repairs,
    );

    let student_folder_by_key = reverse_index.map(|_| reverse_index_from_order(&item_order_by_parent));

    let updated_at = match read_timestamp(doc.get("updatedAt")) {
        Some(ts) => ts,
        None => {
            if doc.contains_key("updatedAt") {
                repairs.record(format_args!("unusable updatedAt"));
            }
            now_millis()
        }
    };

    if repairs.0 > 0 {
        log::warn!("Folder state needed {} repairs", repairs.0);
    }

    TreeState {
        version: STATE_VERSION,
        folders,
        item_order_by_parent,
        student_folder_by_key,
        updated_at,
    }
}

/// Step 1: keeps well-formed user folders and points each parent link at a
/// surviving folder or the top level.
fn sanitize_folders(
    raw: Option<&Value>,
    system_folders: &[Folder],
    settings: &OrganizerSettings,
    repairs: &mut Repairs,
) -> Vec<Folder> {
    let entries: &[Value] = match raw {
        Some(Value::Array(entries)) => entries.as_slice(),
        None | Some(Value::Null) => &[],
        Some(other) => {
            repairs.record(format_args!("folders is not a list ({})", kind_of(other)));
            &[]
        }
    };
    let system_ids: HashSet<&str> = system_folders.iter().map(|f| f.id.as_str()).collect();

    let mut folders: Vec<Folder> = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();
    for entry in entries {
        let Some(obj) = entry.as_object() else {
            repairs.record(format_args!("folder entry is not an object"));
            continue;
        };
        let Some(id) = obj.get("id").and_then(Value::as_str).filter(|id| !id.trim().is_empty())
        else {
            repairs.record(format_args!("folder entry without id"));
            continue;
        };
        let claims_system = obj.get("kind").and_then(Value::as_str) == Some("system");
        if claims_system && system_ids.contains(id) {
            // A saved copy of a derived folder; the derived one replaces it.
            continue;
        }
        if claims_system || id == ROOT_KEY || system_ids.contains(id) || is_system_id(id) {
            repairs.record(format_args!("folder {id} collides with reserved ids"));
            continue;
        }
        if !seen.insert(id.to_string()) {
            repairs.record(format_args!("duplicate folder {id}"));
            continue;
        }
        let ordinal = system_folders.len() + folders.len() + 1;
        let raw_name = obj.get("name").and_then(Value::as_str).unwrap_or("");
        folders.push(Folder {
            id: id.to_string(),
            name: sanitize_folder_name(raw_name, ordinal, settings),
            parent_id: obj.get("parentId").and_then(Value::as_str).map(str::to_string),
            kind: FolderKind::User,
        });
    }

    for folder in &mut folders {
        let valid = match folder.parent_id.as_deref() {
            None => true,
            Some(parent) => parent != folder.id && (seen.contains(parent) || system_ids.contains(parent)),
        };
        if !valid {
            repairs.record(format_args!("folder {} has unknown parent", folder.id));
            folder.parent_id = None;
        }
    }
    folders
}

/// Step 2: moves a folder to the top level when walking up from it meets
/// any folder twice, whether the cycle contains the folder or lies above it.
/// Folders are processed in order, so later walks see earlier repairs.
fn break_cycles(folders: &mut [Folder], repairs: &mut Repairs) {
    for i in 0..folders.len() {
        if walk_revisits(folders, i) {
            repairs.record(format_args!("folder {} has a cyclic parent chain", folders[i].id));
            folders[i].parent_id = None;
        }
    }
}

fn walk_revisits(folders: &[Folder], index: usize) -> bool {
    let parents: HashMap<&str, Option<&str>> = folders
        .iter()
        .map(|f| (f.id.as_str(), f.parent_id.as_deref()))
        .collect();
    let mut visited = HashSet::from([folders[index].id.as_str()]);
    let mut current = folders[index].parent_id.as_deref();
    while let Some(id) = current {
        if !visited.insert(id) {
            return true;
        }
        current = parents.get(id).copied().flatten();
    }
    false
}

/// Step 4: keeps entries for canonical items, nulling unknown folders.
fn sanitize_reverse_index(
    raw: Option<&Value>,
    item_keys: &HashSet<&str>,
    folder_ids: &HashSet<&str>,
    repairs: &mut Repairs,
) -> BTreeMap<String, Option<String>> {
    let mut index = BTreeMap::new();
    let Some(entries) = raw.and_then(Value::as_object) else {
        return index;
    };
    for (key, value) in entries {
        if !item_keys.contains(key.as_str()) {
            repairs.record(format_args!("reverse index entry for unknown item {key}"));
            continue;
        }
        let folder = match value.as_str() {
            Some(id) if folder_ids.contains(id) => Some(id.to_string()),
            _ => {
                if !value.is_null() {
                    repairs.record(format_args!("reverse index entry {key} names an unknown folder"));
                }
                None
            }
        };
        index.insert(key.clone(), folder);
    }
    index
}

/// Step 5: keeps valid persisted entries in their lists, then places
/// everything still missing.
fn rebuild_order(
    raw: Option<&Value>,
    folders: &[Folder],
    item_keys: &HashSet<&str>,
    ctx: &NormalizeContext<'_>,
    reverse_index: Option<&BTreeMap<String, Option<String>>>,
    repairs: &mut Repairs,
) -> BTreeMap<String, Vec<ItemRef>> {
    let persisted = raw.and_then(Value::as_object);
    let folder_parent: HashMap<&str, &str> = folders
        .iter()
        .map(|f| (f.id.as_str(), parent_key(f.parent_id.as_deref())))
        .collect();

    let keys: Vec<&str> = std::iter::once(ROOT_KEY)
        .chain(folders.iter().map(|f| f.id.as_str()))
        .collect();
    let mut order: BTreeMap<String, Vec<ItemRef>> =
        keys.iter().map(|k| (k.to_string(), Vec::new())).collect();
    let mut placed: HashSet<ItemRef> = HashSet::new();

    if let Some(persisted) = persisted {
        for key in persisted.keys() {
            if !order.contains_key(key) {
                repairs.record(format_args!("order list for unknown parent {key}"));
            }
        }
        // Visiting in folder order keeps "first occurrence wins" independent
        // of the key order of the JSON object.
        for &key in &keys {
            let Some(entries) = persisted.get(key) else {
                continue;
            };
            let Some(entries) = entries.as_array() else {
                repairs.record(format_args!("order list {key} is not a list"));
                continue;
            };
            let list = order.entry(key.to_string()).or_default();
            for entry in entries {
                let Some(item_ref) = entry.as_str().and_then(|s| s.parse::<ItemRef>().ok()) else {
                    repairs.record(format_args!("malformed ref in {key}"));
                    continue;
                };
                let belongs = match &item_ref {
                    ItemRef::Folder(id) => folder_parent.get(id.as_str()) == Some(&key),
                    ItemRef::Leaf(item) => item_keys.contains(item.as_str()),
                };
                if !belongs || placed.contains(&item_ref) {
                    repairs.record(format_args!("misplaced or repeated {item_ref} in {key}"));
                    continue;
                }
                placed.insert(item_ref.clone());
                list.push(item_ref);
            }
        }
    }

    for folder in folders {
        let item_ref = ItemRef::folder(folder.id.as_str());
        if placed.insert(item_ref.clone()) {
            let key = parent_key(folder.parent_id.as_deref());
            order.entry(key.to_string()).or_default().push(item_ref);
        }
    }

    for item in ctx.items {
        let item_ref = ItemRef::leaf(item.key.as_str());
        if !placed.insert(item_ref.clone()) {
            continue;
        }
        let default_folder = ctx
            .system
            .and_then(|s| s.placement.get(&item.key))
            .or_else(|| reverse_index.and_then(|ri| ri.get(&item.key)).and_then(Option::as_ref))
            .filter(|id| folder_parent.contains_key(id.as_str()));
        let key = parent_key(default_folder.map(String::as_str));
        order.entry(key.to_string()).or_default().push(item_ref);
    }

    order
}

/// Step 6: derives each item's folder from the order lists.
fn reverse_index_from_order(order: &BTreeMap<String, Vec<ItemRef>>) -> BTreeMap<String, Option<String>> {
    let mut index = BTreeMap::new();
    for (key, refs) in order {
        let folder = (key != ROOT_KEY).then(|| key.clone());
        for item_ref in refs {
            if let ItemRef::Leaf(item) = item_ref {
                index.insert(item.clone(), folder.clone());
            }
        }
    }
    index
}

fn read_timestamp(raw: Option<&Value>) -> Option<i64> {
    let value = raw?;
    if let Some(ts) = value.as_i64() {
        return Some(ts);
    }
    value
        .as_f64()
        .filter(|ts| ts.is_finite())
        .map(|ts| ts as i64)
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "object",
    }
}
