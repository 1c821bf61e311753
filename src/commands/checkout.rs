use crate::areas::refs::branch_ref;
use crate::areas::repository::Repository;
use crate::artifacts::checkout::Migration;
use crate::artifacts::core::RepoError;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use std::path::Path;

impl Repository {
    /// Dispatch the three checkout forms: a branch, a file from the head
    /// commit, or a file from a named commit.
    pub fn checkout(&self, target: Option<&str>, path: Option<&str>) -> anyhow::Result<()> {
        match (target, path) {
            (Some(branch), None) => self.checkout_branch(branch),
            (None, Some(path)) => {
                let head_oid = self.refs().read_head()?.ok_or_else(|| {
                    RepoError::ReferenceNotFound(
                        "No commit exists on the current branch yet.".to_string(),
                    )
                })?;
                self.checkout_file(&head_oid, Path::new(path))
            }
            (Some(commit_prefix), Some(path)) => {
                let commit_oid = self
                    .database()
                    .find_by_prefix(ObjectType::Commit, commit_prefix)?;
                self.checkout_file(&commit_oid, Path::new(path))
            }
            (None, None) => {
                Err(RepoError::UserInput("Incorrect operands.".to_string()).into())
            }
        }
    }

    /// Switch HEAD to a branch and materialize its snapshot.
    ///
    /// Staged but uncommitted changes are discarded without confirmation:
    /// the index is reset to the target snapshot.
    pub fn checkout_branch(&self, name: &str) -> anyhow::Result<()> {
        if self.refs().read(&branch_ref(name))?.is_none() {
            return Err(
                RepoError::ReferenceNotFound("No such branch exists.".to_string()).into(),
            );
        }
        if name == self.refs().current_branch()? {
            return Err(RepoError::ConflictingState(
                "No need to checkout the current branch.".to_string(),
            )
            .into());
        }

        let target_snapshot = match self.refs().resolve(&branch_ref(name))? {
            Some(commit_oid) => self.database().parse_commit(&commit_oid)?.snapshot().clone(),
            None => Default::default(),
        };

        let current_snapshot = self.index().tracked().clone();
        Migration::between(&current_snapshot, &target_snapshot)
            .apply(self.database(), self.workspace())?;

        self.index().replace_tracked(target_snapshot);
        self.refs().set_head(name);

        Ok(())
    }

    /// Restore one file from a commit's snapshot, overwriting the
    /// working-tree copy. The index is not touched.
    pub fn checkout_file(&self, commit_oid: &ObjectId, path: &Path) -> anyhow::Result<()> {
        let commit = self.database().parse_commit(commit_oid)?;

        let blob_oid = commit
            .blob_oid(path)
            .ok_or_else(|| RepoError::FileNotInCommit(path.to_path_buf()))?;
        let blob = self.database().parse_blob(blob_oid)?;

        self.workspace().write_file(path, blob.content())
    }
}
