use crate::areas::refs::RefTarget;
use crate::areas::repository::Repository;
use crate::artifacts::core::RepoError;

impl Repository {
    /// Create a branch at the current commit. The new branch is not checked
    /// out. Branching an unborn HEAD yields another unborn branch.
    pub fn branch(&self, name: &str) -> anyhow::Result<()> {
        let target = match self.refs().read_head()? {
            Some(commit_oid) => RefTarget::Oid(commit_oid),
            None => RefTarget::Unborn,
        };

        self.refs().create_branch(name, target)
    }

    /// Delete a branch pointer. The commits it pointed at stay in the object
    /// store; only the name goes away.
    pub fn rm_branch(&self, name: &str) -> anyhow::Result<()> {
        if name == self.refs().current_branch()? {
            return Err(RepoError::ConflictingState(
                "Cannot remove the current branch.".to_string(),
            )
            .into());
        }

        self.refs().delete_branch(name)
    }
}
