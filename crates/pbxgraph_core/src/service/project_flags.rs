//! Build-setting editing capability.
//!
//! Every operation applies to all configurations of the selected targets and
//! returns how many configurations changed.

use crate::logging::log_value;
use crate::model::value::PlistValue;
use crate::project::XcodeProject;
use crate::service::build_phase;
use crate::service::build_settings;
use log::{debug, info};

/// Build-setting editing capability of a project graph.
pub trait ProjectFlags {
    /// Merges plain `values` into `setting`.
    fn add_flags(&mut self, setting: &str, values: &[&str], target_name: Option<&str>) -> usize;

    /// Removes `values` from `setting`, deleting it once empty.
    fn remove_flags(&mut self, setting: &str, values: &[&str], target_name: Option<&str>)
        -> usize;

    /// Adds search-path entries ahead of the `$(inherited)` sentinel.
    ///
    /// With `recursive`, each entry is suffixed with `/**`.
    fn add_search_paths(
        &mut self,
        setting: &str,
        paths: &[&str],
        recursive: bool,
        target_name: Option<&str>,
    ) -> usize;

    /// Removes search-path entries; the sentinel stays.
    fn remove_search_paths(
        &mut self,
        setting: &str,
        paths: &[&str],
        target_name: Option<&str>,
    ) -> usize;

    /// Value of `setting` in the first configuration named
    /// `configuration_name` of the selected targets.
    fn get_build_setting(
        &self,
        target_name: Option<&str>,
        configuration_name: &str,
        setting: &str,
    ) -> Option<&PlistValue>;
}

impl ProjectFlags for XcodeProject {
    fn add_flags(&mut self, setting: &str, values: &[&str], target_name: Option<&str>) -> usize {
        let targets = build_phase::targets(self.store(), target_name);
        let changed = build_settings::add_values(self.store_mut(), &targets, setting, values);
        log_setting_edit("add_flags", setting, changed);
        changed
    }

    fn remove_flags(
        &mut self,
        setting: &str,
        values: &[&str],
        target_name: Option<&str>,
    ) -> usize {
        let targets = build_phase::targets(self.store(), target_name);
        let changed = build_settings::remove_values(self.store_mut(), &targets, setting, values);
        log_setting_edit("remove_flags", setting, changed);
        changed
    }

    fn add_search_paths(
        &mut self,
        setting: &str,
        paths: &[&str],
        recursive: bool,
        target_name: Option<&str>,
    ) -> usize {
        let targets = build_phase::targets(self.store(), target_name);
        let store = self.store_mut();
        let mut changed = 0;
        for path in paths {
            let entry = if recursive {
                format!("{path}/**")
            } else {
                (*path).to_string()
            };
            changed += build_settings::inject_search_path(store, &targets, setting, &entry);
        }
        log_setting_edit("add_search_paths", setting, changed);
        changed
    }

    fn remove_search_paths(
        &mut self,
        setting: &str,
        paths: &[&str],
        target_name: Option<&str>,
    ) -> usize {
        self.remove_flags(setting, paths, target_name)
    }

    fn get_build_setting(
        &self,
        target_name: Option<&str>,
        configuration_name: &str,
        setting: &str,
    ) -> Option<&PlistValue> {
        let targets = build_phase::targets(self.store(), target_name);
        build_settings::read_setting(self.store(), &targets, configuration_name, setting)
    }
}

fn log_setting_edit(event: &str, setting: &str, changed: usize) {
    if changed == 0 {
        debug!(
            "event={} module=project_flags status=noop setting={}",
            event,
            log_value(setting)
        );
    } else {
        info!(
            "event={} module=project_flags status=ok setting={} configurations={}",
            event,
            log_value(setting),
            changed
        );
    }
}

#[cfg(test)]
mod tests {
    use super::ProjectFlags;
    use crate::config::EngineConfig;
    use crate::model::id::ObjectId;
    use crate::model::object::{keys, ProjectObject};
    use crate::model::value::PlistValue;
    use crate::project::{ProjectDocument, XcodeProject};
    use crate::resolve::fs_probe::KnownPaths;
    use crate::store::object_store::ObjectStore;

    fn project() -> XcodeProject {
        let mut objects = ObjectStore::new();
        let records = [
            (
                "app",
                ProjectObject::new("PBXNativeTarget")
                    .with(keys::NAME, "app")
                    .with(keys::BUILD_CONFIGURATION_LIST, "app-list"),
            ),
            (
                "tests",
                ProjectObject::new("PBXNativeTarget")
                    .with(keys::NAME, "tests")
                    .with(keys::BUILD_CONFIGURATION_LIST, "tests-list"),
            ),
            (
                "app-list",
                ProjectObject::new("XCConfigurationList")
                    .with(keys::BUILD_CONFIGURATIONS, PlistValue::string_array(["app-debug"])),
            ),
            (
                "tests-list",
                ProjectObject::new("XCConfigurationList")
                    .with(keys::BUILD_CONFIGURATIONS, PlistValue::string_array(["tests-debug"])),
            ),
            (
                "app-debug",
                ProjectObject::new("XCBuildConfiguration").with(keys::NAME, "Debug"),
            ),
            (
                "tests-debug",
                ProjectObject::new("XCBuildConfiguration").with(keys::NAME, "Debug"),
            ),
        ];
        for (id, record) in records {
            objects
                .insert_with_id(ObjectId::from(id), record)
                .expect("fixture insert");
        }
        XcodeProject::with_probe(
            ProjectDocument::new(objects, None),
            EngineConfig::new("/work/app"),
            KnownPaths::default(),
        )
        .expect("project")
    }

    #[test]
    fn flags_respect_target_filter() {
        let mut project = project();
        assert_eq!(project.add_flags("OTHER_LDFLAGS", &["-ObjC"], Some("app")), 1);
        assert_eq!(
            project.get_build_setting(Some("app"), "Debug", "OTHER_LDFLAGS"),
            Some(&PlistValue::from("-ObjC"))
        );
        assert_eq!(
            project.get_build_setting(Some("tests"), "Debug", "OTHER_LDFLAGS"),
            None
        );
        assert_eq!(project.remove_flags("OTHER_LDFLAGS", &["-ObjC"], None), 1);
        assert_eq!(project.get_build_setting(None, "Debug", "OTHER_LDFLAGS"), None);
    }

    #[test]
    fn recursive_search_paths_get_glob_suffix() {
        let mut project = project();
        assert_eq!(
            project.add_search_paths("HEADER_SEARCH_PATHS", &["$(SRCROOT)/include"], true, None),
            2
        );
        assert_eq!(
            project.get_build_setting(Some("tests"), "Debug", "HEADER_SEARCH_PATHS"),
            Some(&PlistValue::string_array([
                "$(SRCROOT)/include/**",
                "$(inherited)"
            ]))
        );

        assert_eq!(
            project.remove_search_paths("HEADER_SEARCH_PATHS", &["$(SRCROOT)/include/**"], None),
            2
        );
        assert_eq!(
            project.get_build_setting(Some("app"), "Debug", "HEADER_SEARCH_PATHS"),
            Some(&PlistValue::from("$(inherited)"))
        );
    }
}
