//! Workspace (working tree)
//!
//! Thin wrapper over the repository's working directory: reading and writing
//! user-visible files, never touching the `.kit` metadata directory.

use anyhow::Context;
use derive_new::new;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Name of the repository metadata directory, skipped by every listing.
pub const REPO_DIR_NAME: &str = ".kit";

#[derive(Debug, new)]
pub struct Workspace {
    /// Repository root directory.
    path: Box<Path>,
}

impl Workspace {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.path.join(path).is_file()
    }

    pub fn read_file(&self, path: &Path) -> anyhow::Result<String> {
        std::fs::read_to_string(self.path.join(path))
            .with_context(|| format!("failed to read workspace file {}", path.display()))
    }

    pub fn write_file(&self, path: &Path, content: &str) -> anyhow::Result<()> {
        let file_path = self.path.join(path);
        if let Some(parent) = file_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(&file_path, content)
            .with_context(|| format!("failed to write workspace file {}", path.display()))
    }

    /// Delete a file if present; a missing file is not an error.
    pub fn remove_file(&self, path: &Path) -> anyhow::Result<()> {
        let file_path = self.path.join(path);
        if file_path.is_file() {
            std::fs::remove_file(&file_path)
                .with_context(|| format!("failed to remove workspace file {}", path.display()))?;
        }

        Ok(())
    }

    /// Every file under the root, as root-relative paths, sorted. The
    /// metadata directory is never listed.
    pub fn list_files(&self) -> anyhow::Result<Vec<PathBuf>> {
        let mut files = WalkDir::new(&self.path)
            .into_iter()
            .filter_entry(|entry| entry.file_name() != REPO_DIR_NAME)
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.path().is_file())
            .filter_map(|entry| {
                entry
                    .path()
                    .strip_prefix(&self.path)
                    .map(|relative| relative.to_path_buf())
                    .ok()
            })
            .collect::<Vec<_>>();

        files.sort();
        Ok(files)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_fs::TempDir;
    use assert_fs::prelude::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn workspace_dir() -> TempDir {
        TempDir::new().expect("Failed to create temp dir")
    }

    #[rstest]
    fn listing_skips_the_metadata_directory(workspace_dir: TempDir) {
        workspace_dir.child("a.txt").write_str("a").unwrap();
        workspace_dir.child("dir/b.txt").write_str("b").unwrap();
        workspace_dir
            .child(format!("{REPO_DIR_NAME}/HEAD"))
            .write_str("ref: refs/heads/master")
            .unwrap();

        let workspace = Workspace::new(workspace_dir.path().to_path_buf().into_boxed_path());

        assert_eq!(
            workspace.list_files().unwrap(),
            vec![PathBuf::from("a.txt"), PathBuf::from("dir/b.txt")]
        );
    }

    #[rstest]
    fn write_creates_missing_parent_directories(workspace_dir: TempDir) {
        let workspace = Workspace::new(workspace_dir.path().to_path_buf().into_boxed_path());

        workspace
            .write_file(Path::new("deep/nested/file.txt"), "content")
            .unwrap();

        assert_eq!(
            workspace.read_file(Path::new("deep/nested/file.txt")).unwrap(),
            "content"
        );
    }

    #[rstest]
    fn removing_a_missing_file_is_not_an_error(workspace_dir: TempDir) {
        let workspace = Workspace::new(workspace_dir.path().to_path_buf().into_boxed_path());

        assert!(workspace.remove_file(Path::new("ghost.txt")).is_ok());
    }
}
