use pbxgraph_core::{
    AddFileOptions, EngineConfig, KnownPaths, ObjectId, ProjectDocument, ProjectError,
    ProjectFiles, ProjectGroups, XcodeProject,
};

const FIXTURE: &str = r#"{
    "archiveVersion": "1",
    "objectVersion": "46",
    "classes": {},
    "rootObject": "project",
    "objects": {
        "project": { "isa": "PBXProject", "mainGroup": "main", "targets": ["target"] },
        "main": { "isa": "PBXGroup", "children": [], "sourceTree": "<group>" },
        "target": { "isa": "PBXNativeTarget", "name": "app", "buildPhases": [] }
    }
}"#;

fn setup() -> XcodeProject {
    let document: ProjectDocument = serde_json::from_str(FIXTURE).unwrap();
    XcodeProject::with_probe(document, EngineConfig::new("/work/app"), KnownPaths::default())
        .unwrap()
}

fn render(project: &XcodeProject) -> String {
    serde_json::to_string(project.document()).unwrap()
}

#[test]
fn files_can_be_added_under_a_new_group() {
    let mut project = setup();
    let sources = project.add_group("Sources", Some("Sources"), None).unwrap();

    let outcome = project
        .add_file(
            "Sources/main.swift",
            &AddFileOptions::default().with_parent(sources.clone()),
        )
        .unwrap();

    let file_reference = outcome.file_reference.unwrap();
    assert_eq!(
        project.get_parent_group(file_reference.as_str()),
        Some(sources.clone())
    );
    assert_eq!(
        project.get_files_by_name("main.swift", Some(sources.as_str())),
        vec![file_reference]
    );
    assert_eq!(project.get_groups_by_name("Sources", None), vec![sources]);
}

#[test]
fn add_file_under_file_reference_is_rejected() {
    let mut project = setup();
    let outcome = project
        .add_file("a.swift", &AddFileOptions::default())
        .unwrap();
    let file_reference = outcome.file_reference.unwrap();
    let before = render(&project);

    let err = project
        .add_file(
            "b.swift",
            &AddFileOptions::default().with_parent(file_reference.clone()),
        )
        .unwrap_err();

    assert_eq!(err, ProjectError::ParentNotGroup(file_reference));
    assert_eq!(render(&project), before);
}

#[test]
fn recursive_group_removal_restores_document() {
    let mut project = setup();
    let original = render(&project);

    let outer = project.get_or_create_group("Feature", Some("Feature"), None).unwrap();
    let inner = project
        .get_or_create_group("Views", Some("Views"), Some(outer.as_str()))
        .unwrap();
    let parent = AddFileOptions::default().with_parent(inner.clone());
    project.add_file("Feature/Views/list.swift", &parent).unwrap();
    project.add_file("Feature/Views/list.xib", &parent).unwrap();
    assert_eq!(
        project.get_group_path(inner.as_str()).as_deref(),
        Some("Feature/Views")
    );

    assert!(!project.remove_group_by_id(outer.as_str(), false));
    assert!(project.remove_group_by_id(outer.as_str(), true));

    assert_eq!(render(&project), original);
}

#[test]
fn main_group_is_taken_from_root_project() {
    let mut project = setup();

    let group = project.add_group("Resources", None, None).unwrap();

    assert_eq!(
        project.get_parent_group(group.as_str()),
        Some(ObjectId::from("main"))
    );
    assert!(!project.remove_group_by_id("main", true));
}
