use crate::areas::refs::{RefTarget, branch_ref, remote_tracking_ref};
use crate::areas::repository::Repository;
use crate::areas::workspace::REPO_DIR_NAME;
use crate::artifacts::core::RepoError;
use crate::artifacts::log::{ancestors_of, history};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::remote::Remotes;

impl Repository {
    pub fn add_remote(&self, name: &str, directory: &str) -> anyhow::Result<()> {
        self.remotes().add(name, directory)
    }

    pub fn rm_remote(&self, name: &str) -> anyhow::Result<()> {
        self.remotes().remove(name)
    }

    /// Copy a remote branch's history into the local object store and point
    /// the remote-tracking reference at its tip. The remote repository is
    /// only read.
    pub fn fetch(&self, remote: &str, branch: &str) -> anyhow::Result<()> {
        let remote_repository = self.open_remote(remote)?;

        if remote_repository.refs().read(&branch_ref(branch))?.is_none() {
            return Err(RepoError::ReferenceNotFound(
                "That remote does not have that branch.".to_string(),
            )
            .into());
        }
        let remote_tip = remote_repository
            .refs()
            .resolve(&branch_ref(branch))?
            .ok_or_else(|| {
                RepoError::ReferenceNotFound(
                    "That remote does not have that branch.".to_string(),
                )
            })?;

        Self::copy_history(&remote_repository, self, &remote_tip)?;
        self.refs().set(
            &remote_tracking_ref(remote, branch),
            RefTarget::Oid(remote_tip),
        );

        Ok(())
    }

    /// Append local history onto a remote branch.
    ///
    /// Only fast-forward pushes are allowed: the remote tip must already be
    /// an ancestor of the local head. A missing or unborn remote branch is
    /// created outright.
    pub fn push(&self, remote: &str, branch: &str) -> anyhow::Result<()> {
        let remote_repository = self.open_remote(remote)?;

        let local_head = self.refs().read_head()?.ok_or_else(|| {
            RepoError::ConflictingState("No commits to push.".to_string())
        })?;

        let remote_tip = match remote_repository.refs().read(&branch_ref(branch))? {
            Some(_) => remote_repository.refs().resolve(&branch_ref(branch))?,
            None => None,
        };
        if let Some(remote_tip) = remote_tip
            && !ancestors_of(self.database(), &local_head)?.contains(&remote_tip)
        {
            return Err(RepoError::ConflictingState(
                "Please pull down remote changes before pushing.".to_string(),
            )
            .into());
        }

        Self::copy_history(self, &remote_repository, &local_head)?;
        remote_repository
            .refs()
            .set(&branch_ref(branch), RefTarget::Oid(local_head));
        remote_repository.flush()?;

        Ok(())
    }

    /// Fetch a remote branch, then merge its tracking reference into the
    /// current branch.
    pub fn pull(&self, remote: &str, branch: &str) -> anyhow::Result<()> {
        if self.index().is_dirty() {
            return Err(RepoError::ConflictingState(
                "You have uncommitted changes.".to_string(),
            )
            .into());
        }

        self.fetch(remote, branch)?;

        let remote_tip = self
            .refs()
            .resolve(&remote_tracking_ref(remote, branch))?
            .ok_or_else(|| {
                RepoError::ReferenceNotFound(
                    "That remote does not have that branch.".to_string(),
                )
            })?;

        self.merge_into_head(&format!("{remote}/{branch}"), remote_tip)
    }

    fn remotes(&self) -> Remotes {
        Remotes::new(self.remotes_path().into_boxed_path())
    }

    fn open_remote(&self, name: &str) -> anyhow::Result<Repository> {
        let directory = self.remotes().directory(name)?;

        if !directory.join(REPO_DIR_NAME).exists() {
            return Err(RepoError::ReferenceNotFound(
                "Remote directory not found.".to_string(),
            )
            .into());
        }

        Repository::open(&directory.to_string_lossy(), Box::new(std::io::sink()))
    }

    /// Copy every commit reachable from `tip`, and every blob those commits
    /// reference, from one store into another. Content addressing makes the
    /// copy idempotent.
    fn copy_history(
        source: &Repository,
        destination: &Repository,
        tip: &ObjectId,
    ) -> anyhow::Result<()> {
        for commit_oid in history(source.database(), tip)? {
            let commit = source.database().parse_commit(&commit_oid)?;

            for blob_oid in commit.snapshot().values() {
                if !destination.database().contains(blob_oid) {
                    destination
                        .database()
                        .put(&source.database().parse_blob(blob_oid)?)?;
                }
            }

            destination.database().put(&commit)?;
        }

        Ok(())
    }
}
