//! Remote definitions
//!
//! A remote is another repository on the local filesystem. Each definition
//! is one file under `.kit/remotes/<name>` holding the remote's directory
//! path; fetch/push open that directory as a second repository context and
//! copy objects between the two stores.

use crate::artifacts::core::RepoError;
use derive_new::new;
use std::path::{Path, PathBuf};

#[derive(Debug, new)]
pub struct Remotes {
    /// Directory holding one file per remote (typically `.kit/remotes`).
    path: Box<Path>,
}

impl Remotes {
    /// Record a remote's directory under `name`.
    pub fn add(&self, name: &str, directory: &str) -> anyhow::Result<()> {
        let remote_path = self.path.join(name);
        if remote_path.exists() {
            return Err(RepoError::ConflictingState(
                "A remote with that name already exists.".to_string(),
            )
            .into());
        }

        std::fs::create_dir_all(&self.path)?;
        std::fs::write(&remote_path, directory)?;

        Ok(())
    }

    pub fn remove(&self, name: &str) -> anyhow::Result<()> {
        let remote_path = self.path.join(name);
        if !remote_path.exists() {
            return Err(RepoError::ReferenceNotFound(
                "A remote with that name does not exist.".to_string(),
            )
            .into());
        }

        std::fs::remove_file(&remote_path)?;
        Ok(())
    }

    /// The directory a remote points at.
    pub fn directory(&self, name: &str) -> anyhow::Result<PathBuf> {
        let remote_path = self.path.join(name);
        if !remote_path.exists() {
            return Err(RepoError::ReferenceNotFound(
                "A remote with that name does not exist.".to_string(),
            )
            .into());
        }

        Ok(PathBuf::from(std::fs::read_to_string(&remote_path)?.trim()))
    }
}
