// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! End-to-end behaviour of the engine over decoded records

use dv_domain_types::{AccessSet, DirectoryRecord, FileRecord, NodeId, TreeScope};
use dv_tree_engine::{
    AccessDiff, AccessDiffEngine, ConflictAction, Forest, MenuAction, SelectionController,
    UploadConflictResolver, build, mark_virtual_roots,
};
use std::collections::HashSet;

fn dir(id: u64, parent: Option<u64>) -> DirectoryRecord {
    DirectoryRecord::new(id, format!("dir {id}"), parent)
}

fn file(id: u64, directory_id: u64, name: &str) -> FileRecord {
    FileRecord::new(id, name, directory_id)
}

#[test]
fn test_nested_directory_with_file() {
    let dirs = vec![dir(1, None), dir(2, Some(1))];
    let files = vec![file(10, 2, "a.txt")];

    let forest = Forest::materialize(&dirs, &files);
    assert_eq!(forest.roots.len(), 1);
    let root = &forest.roots[0];
    assert_eq!(root.key(), "dir-1");
    assert_eq!(root.children.len(), 1);
    assert_eq!(root.children[0].key(), "dir-2");
    assert_eq!(root.children[0].children.len(), 1);
    assert_eq!(root.children[0].children[0].key(), "file-10");
    assert!(root.children[0].children[0].children.is_empty());
    assert!(forest.report.virtual_roots.is_empty());
    assert!(!forest.report.is_partial());
}

#[test]
fn test_invisible_parent_yields_virtual_root() {
    let forest = Forest::materialize(&[dir(5, Some(3))], &[]);
    assert_eq!(forest.roots.len(), 1);
    assert_eq!(forest.roots[0].key(), "dir-5");
    assert!(forest.roots[0].is_virtual_root);
    assert!(forest.report.is_partial());
}

#[test]
fn test_toggle_scenario_diff() {
    let known = AccessSet::from_ids([1, 2, 3], []);
    let mut engine = AccessDiffEngine::new();
    engine.initialize(&AccessSet::from_ids([1, 2], []), known);

    engine.toggle_directory(3, true).unwrap();
    engine.toggle_directory(2, false).unwrap();

    assert_eq!(engine.pending(), &AccessSet::from_ids([1, 3], []));
    assert_eq!(
        engine.diff(),
        AccessDiff {
            added_directory_ids: vec![3],
            removed_directory_ids: vec![2],
            added_file_ids: vec![],
            removed_file_ids: vec![],
        }
    );
    assert!(engine.is_dirty());
}

#[test]
fn test_duplicate_names_in_one_batch_both_create() {
    let dirs = vec![dir(1, None)];
    let files = vec![file(10, 1, "notes.md")];
    let forest = Forest::materialize(&dirs, &files);

    let confirm = |_: &str| -> bool { panic!("no collision expected") };
    let decisions = UploadConflictResolver::default()
        .resolve(&forest.roots[0], &["plan.txt", "plan.txt"], &confirm)
        .unwrap();

    assert_eq!(decisions.len(), 2);
    assert!(decisions.iter().all(|d| d.action == ConflictAction::Create));
}

#[test]
fn test_no_record_duplicated_or_leaked() {
    // Mix of visible chain, invisible parents, orphan files and a cycle
    let dirs = vec![
        dir(4, Some(1)),
        dir(1, None),
        dir(2, Some(1)),
        dir(6, Some(40)),
        dir(7, Some(8)),
        dir(8, Some(7)),
        dir(9, Some(9)),
    ];
    let files = vec![
        file(100, 1, "a"),
        file(101, 2, "b"),
        file(102, 6, "c"),
        file(103, 55, "d"),
        file(104, 7, "e"),
    ];

    let forest = Forest::materialize(&dirs, &files);
    let mut seen = Vec::new();
    for root in &forest.roots {
        root.walk(&mut |node| seen.push(node.id));
    }
    let unique: HashSet<NodeId> = seen.iter().copied().collect();
    assert_eq!(unique.len(), seen.len(), "a node was emitted twice");

    let dir_ids: HashSet<u64> = dirs.iter().map(|d| d.id).collect();
    for node in &seen {
        match node {
            NodeId::File(id) => {
                let record = files.iter().find(|f| f.id == *id).unwrap();
                assert!(dir_ids.contains(&record.directory_id));
            }
            NodeId::Directory(id) => assert!(dir_ids.contains(id)),
        }
    }
    assert!(!unique.contains(&NodeId::File(103)));
    assert_eq!(forest.report.orphaned_files, vec![103]);
    assert_eq!(forest.report.unreachable_directories, vec![7, 8]);
}

#[test]
fn test_virtual_root_flag_matches_parent_visibility() {
    let dirs = vec![dir(1, None), dir(2, Some(1)), dir(3, Some(99)), dir(4, Some(98))];
    let mut roots = build(&dirs, &[]);
    mark_virtual_roots(&dirs, &mut roots);

    let ids: HashSet<u64> = dirs.iter().map(|d| d.id).collect();
    for root in &roots {
        let record = dirs.iter().find(|d| d.node_id() == root.id).unwrap();
        let expected = matches!(record.parent_id, Some(parent) if !ids.contains(&parent));
        assert_eq!(root.is_virtual_root, expected, "{}", root.key());
    }
}

#[test]
fn test_build_is_deterministic() {
    let dirs = vec![dir(3, Some(1)), dir(1, None), dir(2, Some(1))];
    let files = vec![file(11, 3, "x"), file(10, 1, "y")];
    assert_eq!(build(&dirs, &files), build(&dirs, &files));
}

#[test]
fn test_commit_is_idempotent() {
    let mut engine = AccessDiffEngine::new();
    engine.initialize(&AccessSet::new(), AccessSet::from_ids([1], [10]));
    engine.toggle_file(10, true).unwrap();

    engine.commit();
    assert!(!engine.is_dirty());
    engine.commit();
    assert!(!engine.is_dirty());
    assert_eq!(engine.original(), &AccessSet::from_ids([], [10]));
}

#[test]
fn test_diff_matches_set_difference() {
    let original = AccessSet::from_ids([1, 2, 5], [10, 11]);
    let known = AccessSet::from_ids([1, 2, 3, 4, 5], [10, 11, 12]);
    let mut engine = AccessDiffEngine::new();
    engine.initialize(&original, known);

    engine.toggle_directory(4, true).unwrap();
    engine.toggle_directory(5, false).unwrap();
    engine.toggle_file(12, true).unwrap();
    engine.toggle_file(10, false).unwrap();

    let pending = engine.pending().clone();
    let diff = engine.diff();
    let expected_added: Vec<u64> =
        pending.directory_ids.difference(&original.directory_ids).copied().collect();
    let expected_removed: Vec<u64> =
        original.file_ids.difference(&pending.file_ids).copied().collect();
    assert_eq!(diff.added_directory_ids, expected_added);
    assert_eq!(diff.removed_file_ids, expected_removed);
    assert_eq!(diff.change_count(), 4);
    assert_eq!(engine.is_dirty(), !diff.is_empty());
}

#[test]
fn test_menu_over_archived_tree() {
    let forest = Forest::materialize(&[dir(1, None)], &[file(10, 1, "old.pdf")]);
    let mut controller = SelectionController::new();

    controller.open_at(12, 34, NodeId::Directory(1), TreeScope::Archived);
    assert_eq!(controller.available_actions(), &[MenuAction::DeleteFolder]);
    assert!(controller.dispatch(MenuAction::CreateFile, &forest).is_err());

    let command = controller.dispatch(MenuAction::DeleteFolder, &forest).unwrap();
    assert_eq!(command.scope, TreeScope::Archived);
    assert!(!controller.is_open());
}
