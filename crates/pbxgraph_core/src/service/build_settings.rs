//! Build-setting edits across target configurations.
//!
//! # Responsibility
//! - Walk target -> configuration list -> build configurations.
//! - Merge search-path fragments while keeping the `$(inherited)` sentinel.
//! - Add and remove plain flag values.
//!
//! # Invariants
//! - Values are compared with surrounding double quotes stripped, so a
//!   quoted entry is never added a second time in unquoted form.
//! - A list written back by any edit holds no repeated entries.
//! - After a search-path merge the `$(inherited)` sentinel is the last entry.
//! - A configuration whose setting is a dictionary is left untouched.

use crate::model::id::ObjectId;
use crate::model::object::{keys, ObjectKind};
use crate::model::value::PlistValue;
use crate::store::object_store::ObjectStore;

/// Sentinel keeping values inherited from the project level.
pub const INHERITED: &str = "$(inherited)";

/// Build-configuration ids of `target`, in list order.
pub fn configurations(store: &ObjectStore, target: &str) -> Vec<ObjectId> {
    let Some(list) = store
        .get(target)
        .and_then(|object| object.get_str(keys::BUILD_CONFIGURATION_LIST))
    else {
        return Vec::new();
    };
    store
        .get(list)
        .map(|object| object.id_list(keys::BUILD_CONFIGURATIONS))
        .unwrap_or_default()
        .into_iter()
        .filter(|id| store.kind_of(id.as_str()) == Some(ObjectKind::BuildConfiguration))
        .collect()
}

/// Reads `setting` from the first configuration named `configuration_name`
/// across `targets`.
pub fn read_setting<'a>(
    store: &'a ObjectStore,
    targets: &[ObjectId],
    configuration_name: &str,
    setting: &str,
) -> Option<&'a PlistValue> {
    targets
        .iter()
        .flat_map(|target| configurations(store, target.as_str()))
        .filter_map(|configuration| store.get(configuration.as_str()))
        .filter(|configuration| configuration.get_str(keys::NAME) == Some(configuration_name))
        .find_map(|configuration| {
            configuration
                .get(keys::BUILD_SETTINGS)
                .and_then(PlistValue::as_dictionary)
                .and_then(|settings| settings.get(setting))
        })
}

/// Adds `fragment` to `setting` in every configuration of `targets`,
/// keeping `$(inherited)` last. Returns the number of configurations changed.
pub fn inject_search_path(
    store: &mut ObjectStore,
    targets: &[ObjectId],
    setting: &str,
    fragment: &str,
) -> usize {
    update_setting(store, targets, setting, |current| {
        merge_search_path(current, fragment)
    })
}

/// Appends each of `values` missing from `setting`. Returns the number of
/// configurations changed.
pub fn add_values(
    store: &mut ObjectStore,
    targets: &[ObjectId],
    setting: &str,
    values: &[&str],
) -> usize {
    update_setting(store, targets, setting, |current| merge_values(current, values))
}

/// Removes each of `values` from `setting`. Returns the number of
/// configurations changed.
pub fn remove_values(
    store: &mut ObjectStore,
    targets: &[ObjectId],
    setting: &str,
    values: &[&str],
) -> usize {
    update_setting(store, targets, setting, |current| subtract_values(current, values))
}

/// Outcome of merging one setting value.
enum Update {
    Keep,
    Set(PlistValue),
    Delete,
}

fn update_setting<F>(store: &mut ObjectStore, targets: &[ObjectId], setting: &str, mut merge: F) -> usize
where
    F: FnMut(Option<&PlistValue>) -> Update,
{
    let mut configuration_ids: Vec<ObjectId> = targets
        .iter()
        .flat_map(|target| configurations(store, target.as_str()))
        .collect();
    configuration_ids.dedup();

    let mut changed = 0;
    for id in configuration_ids {
        let Some(configuration) = store.get_mut(id.as_str()) else {
            continue;
        };
        let current = configuration
            .get(keys::BUILD_SETTINGS)
            .and_then(PlistValue::as_dictionary)
            .and_then(|settings| settings.get(setting));
        match merge(current) {
            Update::Keep => {}
            Update::Set(value) => {
                if configuration.get(keys::BUILD_SETTINGS).is_none() {
                    configuration.set(keys::BUILD_SETTINGS, PlistValue::empty_dictionary());
                }
                let Some(settings) = configuration
                    .get_mut(keys::BUILD_SETTINGS)
                    .and_then(PlistValue::as_dictionary_mut)
                else {
                    continue;
                };
                settings.insert(setting.to_string(), value);
                changed += 1;
            }
            Update::Delete => {
                if let Some(settings) = configuration
                    .get_mut(keys::BUILD_SETTINGS)
                    .and_then(PlistValue::as_dictionary_mut)
                {
                    settings.remove(setting);
                    changed += 1;
                }
            }
        }
    }
    changed
}

fn unquote(value: &str) -> &str {
    value
        .strip_prefix('"')
        .and_then(|inner| inner.strip_suffix('"'))
        .unwrap_or(value)
}

fn same_entry(left: &str, right: &str) -> bool {
    unquote(left) == unquote(right)
}

fn contains_entry(items: &[PlistValue], value: &str) -> bool {
    items
        .iter()
        .any(|item| item.as_str().is_some_and(|entry| same_entry(entry, value)))
}

/// Current value as a list, or `None` for a dictionary.
fn as_items(current: Option<&PlistValue>) -> Option<Vec<PlistValue>> {
    match current {
        None => Some(Vec::new()),
        Some(PlistValue::String(value)) => Some(vec![PlistValue::from(value.as_str())]),
        Some(PlistValue::Array(items)) => Some(items.clone()),
        Some(PlistValue::Dictionary(_)) => None,
    }
}

fn changed_to(current: Option<&PlistValue>, next: PlistValue) -> Update {
    if current == Some(&next) {
        Update::Keep
    } else {
        Update::Set(next)
    }
}

/// Drops repeated entries, keeping first occurrences.
fn dedupe_entries(items: Vec<PlistValue>) -> Vec<PlistValue> {
    let mut kept: Vec<PlistValue> = Vec::with_capacity(items.len());
    for item in items {
        let repeated = item.as_str().is_some_and(|entry| contains_entry(&kept, entry));
        if !repeated {
            kept.push(item);
        }
    }
    kept
}

/// Moves the `$(inherited)` sentinel to the end of a deduped list.
fn sentinel_last(mut items: Vec<PlistValue>) -> Vec<PlistValue> {
    let position = items
        .iter()
        .position(|item| item.as_str().is_some_and(|entry| same_entry(entry, INHERITED)));
    if let Some(index) = position {
        let sentinel = items.remove(index);
        items.push(sentinel);
    }
    items
}

fn merge_search_path(current: Option<&PlistValue>, fragment: &str) -> Update {
    let Some(mut items) = as_items(current) else {
        return Update::Keep;
    };
    if !contains_entry(&items, fragment) {
        items.push(PlistValue::from(fragment));
    }
    if !contains_entry(&items, INHERITED) {
        items.push(PlistValue::from(INHERITED));
    }
    changed_to(current, PlistValue::Array(sentinel_last(dedupe_entries(items))))
}

fn merge_values(current: Option<&PlistValue>, values: &[&str]) -> Update {
    let Some(mut items) = as_items(current) else {
        return Update::Keep;
    };
    for value in values {
        if !contains_entry(&items, value) {
            items.push(PlistValue::from(*value));
        }
    }
    let mut items = dedupe_entries(items);
    let next = match (current, items.len()) {
        (_, 0) => return Update::Keep,
        (Some(PlistValue::Array(_)), _) => PlistValue::Array(items),
        (_, 1) => items.remove(0),
        _ => PlistValue::Array(items),
    };
    changed_to(current, next)
}

fn subtract_values(current: Option<&PlistValue>, values: &[&str]) -> Update {
    if current.is_none() {
        return Update::Keep;
    }
    let Some(mut items) = as_items(current) else {
        return Update::Keep;
    };
    let before = items.len();
    items.retain(|item| {
        !item
            .as_str()
            .is_some_and(|entry| values.iter().any(|value| same_entry(entry, value)))
    });
    if items.len() == before {
        return Update::Keep;
    }
    let mut items = dedupe_entries(items);
    match items.len() {
        0 => Update::Delete,
        1 => Update::Set(items.remove(0)),
        _ => Update::Set(PlistValue::Array(items)),
    }
}

#[cfg(test)]
mod tests {
    use super::{
        add_values, configurations, inject_search_path, read_setting, remove_values, INHERITED,
    };
    use crate::model::id::ObjectId;
    use crate::model::object::{keys, ProjectObject};
    use crate::model::value::PlistValue;
    use crate::store::object_store::ObjectStore;
    use std::collections::BTreeMap;

    fn store() -> ObjectStore {
        let mut store = ObjectStore::new();
        let records = [
            (
                "target",
                ProjectObject::new("PBXNativeTarget").with(keys::BUILD_CONFIGURATION_LIST, "list"),
            ),
            (
                "list",
                ProjectObject::new("XCConfigurationList").with(
                    keys::BUILD_CONFIGURATIONS,
                    PlistValue::string_array(["debug", "release"]),
                ),
            ),
            (
                "debug",
                ProjectObject::new("XCBuildConfiguration")
                    .with(keys::NAME, "Debug")
                    .with(
                        keys::BUILD_SETTINGS,
                        BTreeMap::from([("base".to_string(), PlistValue::from("a"))]),
                    ),
            ),
            (
                "release",
                ProjectObject::new("XCBuildConfiguration").with(keys::NAME, "Release"),
            ),
        ];
        for (id, record) in records {
            store
                .insert_with_id(ObjectId::from(id), record)
                .expect("fixture insert");
        }
        store
    }

    fn setting<'a>(store: &'a ObjectStore, configuration: &str, key: &str) -> Option<&'a PlistValue> {
        read_setting(store, &[ObjectId::from("target")], configuration, key)
    }

    fn targets() -> Vec<ObjectId> {
        vec![ObjectId::from("target")]
    }

    #[test]
    fn configurations_follow_list_order() {
        let store = store();
        assert_eq!(
            configurations(&store, "target"),
            vec![ObjectId::from("debug"), ObjectId::from("release")]
        );
        assert!(configurations(&store, "missing").is_empty());
    }

    #[test]
    fn search_path_gets_inherited_sentinel_once() {
        let mut store = store();
        let fragment = "$(SRCROOT)/tests/samples";
        assert_eq!(inject_search_path(&mut store, &targets(), "FRAMEWORK_SEARCH_PATHS", fragment), 2);
        assert_eq!(inject_search_path(&mut store, &targets(), "FRAMEWORK_SEARCH_PATHS", fragment), 0);

        let expected = PlistValue::string_array([fragment, INHERITED]);
        assert_eq!(setting(&store, "Debug", "FRAMEWORK_SEARCH_PATHS"), Some(&expected));
        assert_eq!(setting(&store, "Release", "FRAMEWORK_SEARCH_PATHS"), Some(&expected));
        assert_eq!(setting(&store, "Debug", "base"), Some(&PlistValue::from("a")));
    }

    #[test]
    fn search_path_promotes_scalar_and_keeps_sentinel_last() {
        let mut store = store();
        add_values(&mut store, &targets(), "LIBRARY_SEARCH_PATHS", &["/opt/lib"]);
        inject_search_path(&mut store, &targets(), "LIBRARY_SEARCH_PATHS", "$(SRCROOT)/libs");
        assert_eq!(
            setting(&store, "Debug", "LIBRARY_SEARCH_PATHS"),
            Some(&PlistValue::string_array(["/opt/lib", "$(SRCROOT)/libs", INHERITED]))
        );

        inject_search_path(&mut store, &targets(), "LIBRARY_SEARCH_PATHS", "$(SRCROOT)/more");
        assert_eq!(
            setting(&store, "Debug", "LIBRARY_SEARCH_PATHS"),
            Some(&PlistValue::string_array([
                "/opt/lib",
                "$(SRCROOT)/libs",
                "$(SRCROOT)/more",
                INHERITED
            ]))
        );
    }

    fn seed(store: &mut ObjectStore, key: &str, value: PlistValue) {
        store
            .get_mut("debug")
            .and_then(|object| object.get_mut(keys::BUILD_SETTINGS))
            .and_then(PlistValue::as_dictionary_mut)
            .expect("debug settings")
            .insert(key.to_string(), value);
    }

    #[test]
    fn search_path_merge_drops_existing_duplicates() {
        let mut store = store();
        seed(
            &mut store,
            "FRAMEWORK_SEARCH_PATHS",
            PlistValue::string_array(["a", "\"a\"", INHERITED, "a"]),
        );

        inject_search_path(&mut store, &targets(), "FRAMEWORK_SEARCH_PATHS", "$(SRCROOT)/libs");

        assert_eq!(
            setting(&store, "Debug", "FRAMEWORK_SEARCH_PATHS"),
            Some(&PlistValue::string_array(["a", "$(SRCROOT)/libs", INHERITED]))
        );
    }

    #[test]
    fn search_path_appends_and_moves_leading_sentinel_last() {
        let mut store = store();
        seed(
            &mut store,
            "HEADER_SEARCH_PATHS",
            PlistValue::string_array([INHERITED, "x"]),
        );

        assert_eq!(inject_search_path(&mut store, &targets(), "HEADER_SEARCH_PATHS", "frag"), 2);
        assert_eq!(
            setting(&store, "Debug", "HEADER_SEARCH_PATHS"),
            Some(&PlistValue::string_array(["x", "frag", INHERITED]))
        );
        assert_eq!(inject_search_path(&mut store, &targets(), "HEADER_SEARCH_PATHS", "frag"), 0);
    }

    #[test]
    fn flag_edits_drop_existing_duplicates_in_place() {
        let mut store = store();
        seed(
            &mut store,
            "OTHER_LDFLAGS",
            PlistValue::string_array([INHERITED, "-ObjC", "-ObjC", "-lz", "-lz"]),
        );

        assert_eq!(add_values(&mut store, &targets(), "OTHER_LDFLAGS", &["-lc++"]), 2);
        assert_eq!(
            setting(&store, "Debug", "OTHER_LDFLAGS"),
            Some(&PlistValue::string_array([INHERITED, "-ObjC", "-lz", "-lc++"]))
        );

        seed(
            &mut store,
            "OTHER_LDFLAGS",
            PlistValue::string_array(["-ObjC", "-ObjC", "-lz"]),
        );
        remove_values(&mut store, &targets(), "OTHER_LDFLAGS", &["-lz"]);
        assert_eq!(
            setting(&store, "Debug", "OTHER_LDFLAGS"),
            Some(&PlistValue::from("-ObjC"))
        );
    }

    #[test]
    fn quoted_entries_are_not_duplicated() {
        let mut store = store();
        add_values(&mut store, &targets(), "OTHER_LDFLAGS", &["\"-ObjC\"", "-lz"]);
        assert_eq!(add_values(&mut store, &targets(), "OTHER_LDFLAGS", &["-ObjC"]), 0);
        assert_eq!(
            setting(&store, "Release", "OTHER_LDFLAGS"),
            Some(&PlistValue::string_array(["\"-ObjC\"", "-lz"]))
        );
    }

    #[test]
    fn single_flag_is_stored_as_scalar() {
        let mut store = store();
        add_values(&mut store, &targets(), "OTHER_CFLAGS", &["-DDEBUG"]);
        assert_eq!(
            setting(&store, "Debug", "OTHER_CFLAGS"),
            Some(&PlistValue::from("-DDEBUG"))
        );
        add_values(&mut store, &targets(), "OTHER_CFLAGS", &["-Wall"]);
        assert_eq!(
            setting(&store, "Debug", "OTHER_CFLAGS"),
            Some(&PlistValue::string_array(["-DDEBUG", "-Wall"]))
        );
    }

    #[test]
    fn removal_collapses_then_deletes() {
        let mut store = store();
        add_values(&mut store, &targets(), "OTHER_CFLAGS", &["-DDEBUG", "-Wall"]);
        assert_eq!(remove_values(&mut store, &targets(), "OTHER_CFLAGS", &["-Wall"]), 2);
        assert_eq!(
            setting(&store, "Debug", "OTHER_CFLAGS"),
            Some(&PlistValue::from("-DDEBUG"))
        );
        assert_eq!(remove_values(&mut store, &targets(), "OTHER_CFLAGS", &["-DDEBUG"]), 2);
        assert_eq!(setting(&store, "Debug", "OTHER_CFLAGS"), None);
        assert_eq!(remove_values(&mut store, &targets(), "OTHER_CFLAGS", &["-DDEBUG"]), 0);
    }

    #[test]
    fn dictionary_settings_are_left_alone() {
        let mut store = store();
        store
            .get_mut("debug")
            .and_then(|object| object.get_mut(keys::BUILD_SETTINGS))
            .and_then(PlistValue::as_dictionary_mut)
            .expect("debug settings")
            .insert("ODD".to_string(), PlistValue::empty_dictionary());
        assert_eq!(inject_search_path(&mut store, &targets(), "ODD", "x"), 1);
        assert_eq!(
            setting(&store, "Debug", "ODD"),
            Some(&PlistValue::empty_dictionary())
        );
    }
}
