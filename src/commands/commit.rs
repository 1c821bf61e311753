use crate::areas::repository::Repository;
use crate::artifacts::core::RepoError;
use crate::artifacts::objects::commit::{Commit, Snapshot};
use crate::artifacts::objects::object_id::ObjectId;

impl Repository {
    /// Freeze the staged state into a new commit on the current branch.
    pub fn commit(&self, message: &str) -> anyhow::Result<()> {
        if message.trim().is_empty() {
            return Err(
                RepoError::UserInput("Please enter a commit message.".to_string()).into(),
            );
        }

        let snapshot = self.index().snapshot_for_commit()?;
        self.record_commit(message, snapshot)?;

        Ok(())
    }

    /// Persist a commit with the given snapshot and advance the current
    /// branch to it. The branch reference moves last, after the commit is
    /// scheduled in the object store, so a flushed reference never names a
    /// hash the store does not hold.
    pub(crate) fn record_commit(
        &self,
        message: &str,
        snapshot: Snapshot,
    ) -> anyhow::Result<ObjectId> {
        let parent = self.refs().read_head()?;
        let commit = Commit::new(parent, snapshot, message.to_string());

        let commit_oid = self.database().put(&commit)?;
        self.refs().update_current_branch(commit_oid.clone())?;

        Ok(commit_oid)
    }
}
