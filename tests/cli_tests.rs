use assert_fs::TempDir;
use predicates::prelude::predicate;
use rstest::rstest;

mod common;

use common::command::{kit_commit, repository_dir, run_kit_command};

#[rstest]
fn init_reports_the_repository_location(repository_dir: TempDir) {
    run_kit_command(repository_dir.path(), &["init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialized empty kit repository in"));

    assert!(repository_dir.path().join(".kit").join("objects").exists());
    assert!(
        repository_dir
            .path()
            .join(".kit")
            .join("refs")
            .join("heads")
            .join("master")
            .exists()
    );
}

#[rstest]
fn init_twice_is_rejected(repository_dir: TempDir) {
    run_kit_command(repository_dir.path(), &["init"])
        .assert()
        .success();

    run_kit_command(repository_dir.path(), &["init"])
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "A kit version-control system already exists in the current directory.",
        ));
}

#[rstest]
fn commands_outside_a_repository_fail(repository_dir: TempDir) {
    run_kit_command(repository_dir.path(), &["status"])
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "Not in an initialized kit directory.",
        ));
}

#[rstest]
fn expected_failures_print_one_message_and_exit_nonzero(repository_dir: TempDir) {
    run_kit_command(repository_dir.path(), &["init"])
        .assert()
        .success();

    run_kit_command(repository_dir.path(), &["add", "missing.txt"])
        .assert()
        .failure()
        .stderr(predicate::eq("File does not exist.\n"));

    kit_commit(repository_dir.path(), "nothing staged")
        .assert()
        .failure()
        .stderr(predicate::eq("No changes added to the commit\n"));
}
