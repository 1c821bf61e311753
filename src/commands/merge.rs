use crate::areas::refs::branch_ref;
use crate::areas::repository::Repository;
use crate::artifacts::checkout::Migration;
use crate::artifacts::core::RepoError;
use crate::artifacts::merge::split_finder::SplitPointFinder;
use crate::artifacts::merge::{MergeAction, classify, conflict_content};
use crate::artifacts::objects::commit::Snapshot;
use crate::artifacts::objects::object_id::ObjectId;
use std::io::Write;

impl Repository {
    /// Merge a branch into the current branch.
    ///
    /// Guards run before any mutation: merging a branch into itself and
    /// merging with staged changes are both rejected. The merge itself is a
    /// three-way reconciliation against the split point; a conflict-free
    /// merge is committed automatically, a conflicted one leaves markers in
    /// the working tree and commits nothing.
    pub fn merge(&self, other_branch: &str) -> anyhow::Result<()> {
        if other_branch == self.refs().current_branch()? {
            return Err(RepoError::ConflictingState(
                "Cannot merge a branch with itself.".to_string(),
            )
            .into());
        }
        if self.index().is_dirty() {
            return Err(RepoError::ConflictingState(
                "You have uncommitted changes.".to_string(),
            )
            .into());
        }
        if self.refs().read(&branch_ref(other_branch))?.is_none() {
            return Err(RepoError::ReferenceNotFound(
                "A branch with that name does not exist.".to_string(),
            )
            .into());
        }

        let other_oid = self.refs().resolve(&branch_ref(other_branch))?.ok_or_else(|| {
            RepoError::ReferenceNotFound(
                "Cannot merge a branch with no commits.".to_string(),
            )
        })?;

        self.merge_into_head(other_branch, other_oid)
    }

    /// Merge an already resolved tip into the current branch. `other_label`
    /// names the incoming side in conflict markers and the merge message.
    pub(crate) fn merge_into_head(
        &self,
        other_label: &str,
        other_oid: ObjectId,
    ) -> anyhow::Result<()> {
        let head_oid = self.refs().read_head()?;

        let split = match &head_oid {
            Some(head_oid) => SplitPointFinder::new(|oid: &ObjectId| {
                Ok(self.database().parse_commit(oid)?.parent().cloned())
            })
            .find(head_oid, &other_oid)?,
            None => None,
        };

        if split.as_ref() == Some(&other_oid) {
            writeln!(
                self.writer(),
                "Given branch is an ancestor of the current branch."
            )?;
            return Ok(());
        }

        if head_oid.is_none() || split == head_oid {
            return self.fast_forward(other_oid);
        }

        let head_snapshot = self.snapshot_of(head_oid.as_ref())?;
        let other_snapshot = self.snapshot_of(Some(&other_oid))?;
        let split_snapshot = self.snapshot_of(split.as_ref())?;

        let mut conflicted = vec![];

        for (path, action) in classify(&head_snapshot, &other_snapshot, &split_snapshot) {
            match action {
                MergeAction::TakeOther(blob_oid) => {
                    let blob = self.database().parse_blob(&blob_oid)?;
                    self.workspace().write_file(&path, blob.content())?;
                    self.index().add(path, blob_oid);
                }
                MergeAction::Delete => {
                    self.workspace().remove_file(&path)?;
                    self.index().remove(&path, true)?;
                }
                MergeAction::Conflict { head, other } => {
                    let head_content = self.blob_content_or_empty(head.as_ref())?;
                    let other_content = self.blob_content_or_empty(other.as_ref())?;
                    self.workspace().write_file(
                        &path,
                        &conflict_content(&head_content, &other_content, other_label),
                    )?;
                    conflicted.push(path);
                }
            }
        }

        if conflicted.is_empty() {
            let snapshot = {
                let mut index = self.index();
                if index.is_dirty() {
                    index.snapshot_for_commit()?
                } else {
                    // both sides converged on identical trees; the merge
                    // commit still records that the histories joined
                    index.tracked().clone()
                }
            };

            let current_branch = self.refs().current_branch()?;
            self.record_commit(
                &format!("Merged {other_label} into {current_branch}."),
                snapshot,
            )?;
        } else {
            writeln!(self.writer(), "Encountered a merge conflict.")?;
        }

        Ok(())
    }

    /// The incoming branch strictly extends the current one: move the branch
    /// pointer and materialize the target snapshot, no merge commit.
    fn fast_forward(&self, other_oid: ObjectId) -> anyhow::Result<()> {
        let target_snapshot = self.snapshot_of(Some(&other_oid))?;
        let current_snapshot = self.index().tracked().clone();

        Migration::between(&current_snapshot, &target_snapshot)
            .apply(self.database(), self.workspace())?;
        self.index().replace_tracked(target_snapshot);
        self.refs().update_current_branch(other_oid)?;

        writeln!(self.writer(), "Current branch fast-forwarded.")?;
        Ok(())
    }

    fn snapshot_of(&self, commit_oid: Option<&ObjectId>) -> anyhow::Result<Snapshot> {
        match commit_oid {
            Some(oid) => Ok(self.database().parse_commit(oid)?.snapshot().clone()),
            None => Ok(Snapshot::new()),
        }
    }

    fn blob_content_or_empty(&self, blob_oid: Option<&ObjectId>) -> anyhow::Result<String> {
        match blob_oid {
            Some(oid) => Ok(self.database().parse_blob(oid)?.content().to_string()),
            None => Ok(String::new()),
        }
    }
}
