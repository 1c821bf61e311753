use assert_fs::TempDir;
use predicates::prelude::predicate;
use rstest::rstest;

mod common;

use common::command::{commit_file, init_repository_dir, kit_commit, run_kit_command};
use common::file::{FileSpec, read_file, write_file};

#[rstest]
fn status_lists_staged_and_removed_files(init_repository_dir: TempDir) {
    let dir = init_repository_dir;

    write_file(FileSpec::new(dir.path().join("new.txt"), "new\n".to_string()));
    run_kit_command(dir.path(), &["add", "new.txt"])
        .assert()
        .success();
    run_kit_command(dir.path(), &["rm", "a.txt"])
        .assert()
        .success();

    run_kit_command(dir.path(), &["status"])
        .assert()
        .success()
        .stdout(predicate::str::contains("=== Branches ===\n*master\n"))
        .stdout(predicate::str::contains("=== Staged Files ===\nnew.txt\n"))
        .stdout(predicate::str::contains("=== Removed Files ===\na.txt\n"));
}

#[rstest]
fn status_lists_untracked_files(init_repository_dir: TempDir) {
    let dir = init_repository_dir;

    write_file(FileSpec::new(
        dir.path().join("loose.txt"),
        "untracked\n".to_string(),
    ));

    run_kit_command(dir.path(), &["status"])
        .assert()
        .success()
        .stdout(predicate::str::contains("=== Untracked Files ===\nloose.txt\n"));
}

#[rstest]
fn rm_deletes_a_committed_file_and_the_next_commit_drops_it(init_repository_dir: TempDir) {
    let dir = init_repository_dir;

    run_kit_command(dir.path(), &["rm", "a.txt"])
        .assert()
        .success();
    assert!(!dir.path().join("a.txt").exists());

    kit_commit(dir.path(), "drop a.txt").assert().success();

    // the file stays gone after a round trip through another branch
    run_kit_command(dir.path(), &["branch", "other"])
        .assert()
        .success();
    run_kit_command(dir.path(), &["checkout", "other"])
        .assert()
        .success();
    assert!(!dir.path().join("a.txt").exists());
}

#[rstest]
fn rm_on_an_untracked_file_reports_no_reason_to_remove(init_repository_dir: TempDir) {
    let dir = init_repository_dir;

    write_file(FileSpec::new(
        dir.path().join("loose.txt"),
        "untracked\n".to_string(),
    ));

    run_kit_command(dir.path(), &["rm", "loose.txt"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No reason to remove the file"));
}

#[rstest]
fn readding_an_unchanged_file_stages_nothing(init_repository_dir: TempDir) {
    let dir = init_repository_dir;

    run_kit_command(dir.path(), &["add", "a.txt"])
        .assert()
        .success();

    kit_commit(dir.path(), "no-op")
        .assert()
        .failure()
        .stderr(predicate::str::contains("No changes added to the commit"));
}

#[rstest]
fn commit_requires_a_message(init_repository_dir: TempDir) {
    let dir = init_repository_dir;

    write_file(FileSpec::new(dir.path().join("b.txt"), "b\n".to_string()));
    run_kit_command(dir.path(), &["add", "b.txt"])
        .assert()
        .success();

    kit_commit(dir.path(), " ")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Please enter a commit message."));
}

#[rstest]
fn checkout_restores_a_file_from_the_head_commit(init_repository_dir: TempDir) {
    let dir = init_repository_dir;

    write_file(FileSpec::new(
        dir.path().join("a.txt"),
        "scribbled over\n".to_string(),
    ));

    run_kit_command(dir.path(), &["checkout", "--", "a.txt"])
        .assert()
        .success();

    assert_eq!(read_file(&dir.path().join("a.txt")), "hello\n");
}

#[rstest]
fn checkout_restores_a_file_from_an_older_commit(init_repository_dir: TempDir) {
    let dir = init_repository_dir;

    let first_commit = current_head(&dir);
    commit_file(dir.path(), "a.txt", "second version\n", "second");

    run_kit_command(dir.path(), &["checkout", &first_commit, "--", "a.txt"])
        .assert()
        .success();
    assert_eq!(read_file(&dir.path().join("a.txt")), "hello\n");

    // an abbreviated hash works too
    commit_file(dir.path(), "a.txt", "third version\n", "third");
    run_kit_command(dir.path(), &["checkout", &first_commit[..8], "--", "a.txt"])
        .assert()
        .success();
    assert_eq!(read_file(&dir.path().join("a.txt")), "hello\n");
}

#[rstest]
fn checkout_of_a_path_missing_from_the_commit_fails(init_repository_dir: TempDir) {
    let dir = init_repository_dir;

    run_kit_command(dir.path(), &["checkout", "--", "ghost.txt"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("File does not exist in that commit"));
}

fn current_head(dir: &TempDir) -> String {
    let master = dir
        .path()
        .join(".kit")
        .join("refs")
        .join("heads")
        .join("master");
    read_file(&master).trim().to_string()
}
