use bunch_check::checker::{
    build_creation_index, check_commits, check_one_commit, is_deleted_bunch_file,
};
use bunch_check::{
    author_string, ChangeType, CommitInfo, CreationIndex, DeletionCache, Error, Extensions,
    FileAction,
};
use std::fs;
use tree_fs::TreeBuilder;

fn extensions(list: &[&str]) -> Extensions {
    Extensions::new(list.iter().map(|e| (*e).to_string()).collect())
        .expect("valid extensions")
}

fn commit(hash: &str, actions: &[(ChangeType, &str)]) -> CommitInfo {
    CommitInfo {
        hash: hash.to_string(),
        title: format!("Commit {hash}"),
        author: Some("amy".to_string()),
        committer: Some("amy".to_string()),
        file_actions: actions
            .iter()
            .map(|(change_type, path)| FileAction::new(*change_type, Some(*path)))
            .collect(),
    }
}

#[test]
fn test_untouched_existing_sibling_is_forgotten() {
    let tree = TreeBuilder::default()
        .add_file("foo.c", "int main() {}")
        .add_file("foo.c.x", "int main() { return 1; }")
        .create()
        .expect("Failed to create tree");
    let commits = vec![
        commit("c2", &[(ChangeType::Modify, "foo.c")]),
        commit("c1", &[(ChangeType::Modify, "bar.c")]),
        commit("c0", &[(ChangeType::Modify, "baz.c")]),
    ];
    let ext = extensions(&["x"]);

    let forgotten = check_one_commit(&commits[0], &ext, &tree.root, &CreationIndex::new(), 0);
    assert_eq!(forgotten, vec!["foo.c.x".to_string()]);

    let mut index = CreationIndex::new();
    index.insert("foo.c.x".to_string(), 1);
    let forgotten = check_one_commit(&commits[0], &ext, &tree.root, &index, 0);
    assert!(forgotten.is_empty(), "0 < 1 means the sibling is not eligible");
}

#[test]
fn test_sibling_updated_in_same_commit_is_not_forgotten() {
    let tree = TreeBuilder::default()
        .add_file("src/a.kt", "fun a() = 1")
        .add_file("src/a.kt.183", "fun a() = 2")
        .create()
        .expect("Failed to create tree");
    let c = commit(
        "c0",
        &[
            (ChangeType::Modify, "src/a.kt"),
            (ChangeType::Modify, "src/a.kt.183"),
        ],
    );

    let forgotten = check_one_commit(
        &c,
        &extensions(&["183"]),
        &tree.root,
        &CreationIndex::new(),
        0,
    );
    assert!(forgotten.is_empty());
}

#[test]
fn test_missing_sibling_is_never_forgotten() {
    let tree = TreeBuilder::default()
        .add_file("src/a.kt", "fun a() = 1")
        .create()
        .expect("Failed to create tree");
    let c = commit("c0", &[(ChangeType::Modify, "src/a.kt")]);
    let mut index = CreationIndex::new();
    index.insert("src/a.kt.183".to_string(), 0);

    let forgotten = check_one_commit(&c, &extensions(&["183"]), &tree.root, &index, 0);
    assert!(forgotten.is_empty());
}

#[test]
fn test_creation_commit_is_exempt_but_older_index_is_not() {
    let tree = TreeBuilder::default()
        .add_file("a.kt", "1")
        .add_file("a.kt.183", "2")
        .create()
        .expect("Failed to create tree");
    let ext = extensions(&["183"]);
    let c = commit("c", &[(ChangeType::Modify, "a.kt")]);
    let mut index = CreationIndex::new();
    index.insert("a.kt.183".to_string(), 2);

    assert!(check_one_commit(&c, &ext, &tree.root, &index, 1).is_empty());
    assert_eq!(
        check_one_commit(&c, &ext, &tree.root, &index, 2),
        vec!["a.kt.183".to_string()]
    );
    assert_eq!(
        check_one_commit(&c, &ext, &tree.root, &index, 3),
        vec!["a.kt.183".to_string()]
    );
}

#[test]
fn test_bunch_files_of_bunch_files_are_skipped() {
    let tree = TreeBuilder::default()
        .add_file("a.kt.183", "1")
        .add_file("a.kt.183.182", "2")
        .create()
        .expect("Failed to create tree");
    let c = commit("c", &[(ChangeType::Modify, "a.kt.183")]);

    let forgotten = check_one_commit(
        &c,
        &extensions(&["183", "182"]),
        &tree.root,
        &CreationIndex::new(),
        0,
    );
    assert!(forgotten.is_empty());
}

#[test]
fn test_forgotten_files_keep_discovery_order() {
    let tree = TreeBuilder::default()
        .add_file("a.kt", "1")
        .add_file("a.kt.183", "1")
        .add_file("a.kt.as32", "1")
        .add_file("b.kt", "1")
        .add_file("b.kt.183", "1")
        .create()
        .expect("Failed to create tree");
    let c = CommitInfo {
        file_actions: vec![
            FileAction::new(ChangeType::Delete, None),
            FileAction::new(ChangeType::Modify, Some("b.kt")),
            FileAction::new(ChangeType::Rename, Some("a.kt")),
        ],
        ..commit("c", &[])
    };

    let forgotten = check_one_commit(
        &c,
        &extensions(&["183", "as32"]),
        &tree.root,
        &CreationIndex::new(),
        0,
    );
    assert_eq!(forgotten, vec!["b.kt.183", "a.kt.183", "a.kt.as32"]);
}

#[test]
fn test_creation_index_records_first_add_only() {
    let commits = vec![
        commit("c3", &[(ChangeType::Add, "a.kt.183")]),
        commit(
            "c2",
            &[(ChangeType::Add, "b.kt"), (ChangeType::Modify, "b.kt.183")],
        ),
        commit(
            "c1",
            &[(ChangeType::Add, "a.kt.183"), (ChangeType::Add, "c.kt.as32")],
        ),
        commit("c0", &[(ChangeType::Copy, "d.kt.183")]),
    ];
    let ext = extensions(&["183", "as32"]);

    let index = build_creation_index(&commits, &ext);

    assert_eq!(index.len(), 2);
    assert_eq!(index.get("a.kt.183"), Some(&0));
    assert_eq!(index.get("c.kt.as32"), Some(&2));
    assert_eq!(index, build_creation_index(&commits, &ext));
}

#[test]
fn test_is_deleted_bunch_file() {
    let tree = TreeBuilder::default()
        .add_file("empty.kt.183", "")
        .add_file("blank.kt.183", "  \n\t\n")
        .add_file("full.kt.183", "\n fun a() = 1\n")
        .create()
        .expect("Failed to create tree");

    assert!(is_deleted_bunch_file(&tree.root, "empty.kt.183").unwrap());
    assert!(is_deleted_bunch_file(&tree.root, "blank.kt.183").unwrap());
    assert!(!is_deleted_bunch_file(&tree.root, "full.kt.183").unwrap());
    assert!(!is_deleted_bunch_file(&tree.root, "missing.kt.183").unwrap());
}

#[test]
fn test_binary_bunch_file_is_forgotten_but_not_deleted() {
    let tree = TreeBuilder::default()
        .add_file("logo.png", "png")
        .create()
        .expect("Failed to create tree");
    fs::write(tree.root.join("logo.png.183"), [0x89, 0x50, 0xff, 0xfe, 0x00])
        .expect("Failed to write binary bunch file");
    let commits = vec![commit("c0", &[(ChangeType::Modify, "logo.png")])];

    let report = check_commits(&commits, &extensions(&["183"]), &tree.root)
        .expect("Failed to check commits");

    assert_eq!(report.problems.len(), 1);
    assert_eq!(report.problems[0].forgotten[0].path, "logo.png.183");
    assert!(!report.problems[0].forgotten[0].deleted);
}

#[test]
fn test_deletion_cache_memoizes_per_path() {
    let tree = TreeBuilder::default()
        .add_file("a.kt.183", "")
        .create()
        .expect("Failed to create tree");
    let mut cache = DeletionCache::default();

    assert!(cache.is_deleted(&tree.root, "a.kt.183").unwrap());
    fs::write(tree.root.join("a.kt.183"), "fun a() = 1").expect("Failed to write file");
    assert!(cache.is_deleted(&tree.root, "a.kt.183").unwrap());
    assert!(!is_deleted_bunch_file(&tree.root, "a.kt.183").unwrap());
}

#[test]
fn test_check_commits_reports_every_problem_commit() {
    let tree = TreeBuilder::default()
        .add_file("a.kt", "1")
        .add_file("a.kt.183", "")
        .add_file("b.kt", "1")
        .add_file("b.kt.183", "2")
        .create()
        .expect("Failed to create tree");
    let mut newest = commit("c2", &[(ChangeType::Modify, "a.kt")]);
    newest.committer = Some("bob".to_string());
    let commits = vec![
        newest,
        commit(
            "c1",
            &[(ChangeType::Modify, "b.kt"), (ChangeType::Modify, "b.kt.183")],
        ),
        commit(
            "c0",
            &[(ChangeType::Modify, "a.kt"), (ChangeType::Modify, "b.kt")],
        ),
    ];

    let report = check_commits(&commits, &extensions(&["183"]), &tree.root)
        .expect("Failed to check commits");

    assert!(report.has_problems());
    assert_eq!(report.commits.len(), 3);
    assert_eq!(report.problems.len(), 2);

    let first = &report.problems[0];
    assert_eq!(first.hash, "c2");
    assert_eq!(first.author, "[amy (bob)]");
    assert_eq!(first.forgotten.len(), 1);
    assert_eq!(first.forgotten[0].path, "a.kt.183");
    assert!(first.forgotten[0].deleted);

    let second = &report.problems[1];
    assert_eq!(second.hash, "c0");
    assert_eq!(
        second
            .forgotten
            .iter()
            .map(|f| (f.path.as_str(), f.deleted))
            .collect::<Vec<_>>(),
        vec![("a.kt.183", true), ("b.kt.183", false)]
    );
}

#[test]
fn test_check_commits_clean_history() {
    let tree = TreeBuilder::default()
        .add_file("a.kt", "1")
        .create()
        .expect("Failed to create tree");
    let commits = vec![commit("c0", &[(ChangeType::Modify, "a.kt")])];

    let report = check_commits(&commits, &extensions(&["183"]), &tree.root)
        .expect("Failed to check commits");

    assert!(!report.has_problems());
    assert_eq!(report.commits[0].title, "Commit c0");

    let json = report.to_json().expect("Failed to serialize report");
    assert!(json.contains("\"title\": \"Commit c0\""));
    assert!(json.contains("\"problems\": []"));
}

#[test]
fn test_author_string() {
    assert_eq!(author_string(None, None), "");
    assert_eq!(author_string(None, Some("bob")), "[bob]");
    assert_eq!(author_string(Some("amy"), Some("amy")), "[amy]");
    assert_eq!(author_string(Some("amy"), None), "[amy]");
    assert_eq!(author_string(Some("amy"), Some("bob")), "[amy (bob)]");
}

#[test]
fn test_extensions_validation() {
    let parsed = Extensions::parse_list(" kt183, ,as32 ").expect("valid list");
    assert_eq!(parsed.iter().collect::<Vec<_>>(), vec!["kt183", "as32"]);
    assert!(parsed.is_bunch_path("dir.v2/File.kt.as32"));
    assert!(!parsed.is_bunch_path("dir.as32/File"));

    assert!(matches!(
        Extensions::parse_list(" , "),
        Err(Error::ConfigError(_))
    ));
    assert!(matches!(
        Extensions::parse_list("183,182,183"),
        Err(Error::ConfigError(_))
    ));
}
