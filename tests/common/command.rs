use crate::common::file::{FileSpec, write_file};
use assert_cmd::Command;
use assert_fs::TempDir;
use rstest::fixture;
use std::path::Path;

#[fixture]
pub fn repository_dir() -> TempDir {
    TempDir::new().expect("Failed to create temp dir")
}

/// A repository with one committed file: `a.txt` containing "hello\n" on
/// branch master.
#[fixture]
pub fn init_repository_dir(repository_dir: TempDir) -> TempDir {
    run_kit_command(repository_dir.path(), &["init"])
        .assert()
        .success();

    write_file(FileSpec::new(
        repository_dir.path().join("a.txt"),
        "hello\n".to_string(),
    ));
    run_kit_command(repository_dir.path(), &["add", "a.txt"])
        .assert()
        .success();
    kit_commit(repository_dir.path(), "first").assert().success();

    repository_dir
}

pub fn run_kit_command(dir: &Path, args: &[&str]) -> Command {
    let mut cmd = Command::cargo_bin("kit").expect("Failed to find kit binary");
    // pin commit timestamps so repeated runs build identical histories
    cmd.env("KIT_COMMIT_DATE", "2023-05-01 12:00:00 +0000");
    cmd.current_dir(dir);
    for arg in args {
        cmd.arg(arg);
    }
    cmd
}

pub fn kit_commit(dir: &Path, message: &str) -> Command {
    run_kit_command(dir, &["commit", "-m", message])
}

/// Stage a file's content and commit it in one step.
pub fn commit_file(dir: &Path, name: &str, content: &str, message: &str) {
    write_file(FileSpec::new(dir.join(name), content.to_string()));
    run_kit_command(dir, &["add", name]).assert().success();
    kit_commit(dir, message).assert().success();
}
