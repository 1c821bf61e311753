use assert_fs::TempDir;
use predicates::prelude::*;
use rstest::rstest;

mod common;

use common::command::{commit_file, init_repository_dir, run_kit_command};
use common::file::{FileSpec, read_file, write_file};

/// History: first(a.txt=hello) -> feature: second(a.txt=world), master
/// untouched. Merging feature is a pure fast-forward.
#[rstest]
fn merging_a_descendant_branch_fast_forwards(init_repository_dir: TempDir) {
    let dir = init_repository_dir;

    run_kit_command(dir.path(), &["branch", "feature"])
        .assert()
        .success();
    run_kit_command(dir.path(), &["checkout", "feature"])
        .assert()
        .success();
    commit_file(dir.path(), "a.txt", "world", "second");

    run_kit_command(dir.path(), &["checkout", "master"])
        .assert()
        .success();
    run_kit_command(dir.path(), &["merge", "feature"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Current branch fast-forwarded."));

    assert_eq!(read_file(&dir.path().join("a.txt")), "world");
}

/// Both sides add their own file after diverging; the merge takes the other
/// branch's file, keeps ours, and records a merge commit.
#[rstest]
fn divergent_branches_merge_cleanly_and_commit(init_repository_dir: TempDir) {
    let dir = init_repository_dir;

    run_kit_command(dir.path(), &["branch", "feature"])
        .assert()
        .success();
    commit_file(dir.path(), "ours.txt", "ours\n", "master adds ours");

    run_kit_command(dir.path(), &["checkout", "feature"])
        .assert()
        .success();
    commit_file(dir.path(), "theirs.txt", "theirs\n", "feature adds theirs");

    run_kit_command(dir.path(), &["checkout", "master"])
        .assert()
        .success();
    run_kit_command(dir.path(), &["merge", "feature"])
        .assert()
        .success();

    assert_eq!(read_file(&dir.path().join("ours.txt")), "ours\n");
    assert_eq!(read_file(&dir.path().join("theirs.txt")), "theirs\n");

    run_kit_command(dir.path(), &["log"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Merged feature into master."));
}

/// Both sides edit a.txt differently after diverging: the file ends up with
/// both versions between conflict markers and no merge commit is created.
#[rstest]
fn conflicting_edits_leave_markers_and_no_commit(init_repository_dir: TempDir) {
    let dir = init_repository_dir;

    run_kit_command(dir.path(), &["branch", "feature"])
        .assert()
        .success();
    commit_file(dir.path(), "a.txt", "master version\n", "master edit");

    run_kit_command(dir.path(), &["checkout", "feature"])
        .assert()
        .success();
    commit_file(dir.path(), "a.txt", "feature version\n", "feature edit");

    run_kit_command(dir.path(), &["checkout", "master"])
        .assert()
        .success();
    run_kit_command(dir.path(), &["merge", "feature"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Encountered a merge conflict."));

    assert_eq!(
        read_file(&dir.path().join("a.txt")),
        "<<<<<<< HEAD\nmaster version\n=======\nfeature version\n>>>>>>> feature\n"
    );

    run_kit_command(dir.path(), &["log"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Merged").not());
}

#[rstest]
fn merging_an_ancestor_is_already_up_to_date(init_repository_dir: TempDir) {
    let dir = init_repository_dir;

    run_kit_command(dir.path(), &["branch", "feature"])
        .assert()
        .success();
    commit_file(dir.path(), "a.txt", "v2\n", "second");

    run_kit_command(dir.path(), &["merge", "feature"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Given branch is an ancestor of the current branch.",
        ));
}

#[rstest]
fn a_branch_cannot_merge_with_itself(init_repository_dir: TempDir) {
    let dir = init_repository_dir;

    run_kit_command(dir.path(), &["merge", "master"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Cannot merge a branch with itself."));
}

#[rstest]
fn merge_refuses_to_run_with_staged_changes(init_repository_dir: TempDir) {
    let dir = init_repository_dir;

    run_kit_command(dir.path(), &["branch", "feature"])
        .assert()
        .success();
    write_file(FileSpec::new(
        dir.path().join("pending.txt"),
        "pending\n".to_string(),
    ));
    run_kit_command(dir.path(), &["add", "pending.txt"])
        .assert()
        .success();

    run_kit_command(dir.path(), &["merge", "feature"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("You have uncommitted changes."));
}

#[rstest]
fn merging_an_unknown_branch_fails(init_repository_dir: TempDir) {
    let dir = init_repository_dir;

    run_kit_command(dir.path(), &["merge", "ghost"])
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "A branch with that name does not exist.",
        ));
}

/// One side deletes a file the other left alone: the deletion wins and the
/// merge commits.
#[rstest]
fn deletion_on_one_side_propagates(init_repository_dir: TempDir) {
    let dir = init_repository_dir;

    run_kit_command(dir.path(), &["branch", "feature"])
        .assert()
        .success();
    commit_file(dir.path(), "keep.txt", "keep\n", "master adds keep");

    run_kit_command(dir.path(), &["checkout", "feature"])
        .assert()
        .success();
    run_kit_command(dir.path(), &["rm", "a.txt"])
        .assert()
        .success();
    run_kit_command(dir.path(), &["commit", "-m", "feature drops a.txt"])
        .assert()
        .success();

    run_kit_command(dir.path(), &["checkout", "master"])
        .assert()
        .success();
    run_kit_command(dir.path(), &["merge", "feature"])
        .assert()
        .success();

    assert!(!dir.path().join("a.txt").exists());
    assert_eq!(read_file(&dir.path().join("keep.txt")), "keep\n");
}
