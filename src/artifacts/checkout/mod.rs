//! Working-tree materialization
//!
//! Computes and applies the file operations needed to move the working tree
//! from one snapshot to another: write every path of the target snapshot
//! whose content differs, delete every currently tracked path the target
//! does not contain.

use crate::areas::database::Database;
use crate::areas::workspace::Workspace;
use crate::artifacts::objects::commit::Snapshot;
use crate::artifacts::objects::object_id::ObjectId;
use std::path::PathBuf;

/// Planned working-tree changes for a snapshot switch.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Migration {
    /// Paths to write, with the blob to write there.
    pub writes: Vec<(PathBuf, ObjectId)>,
    /// Tracked paths absent from the target snapshot.
    pub deletes: Vec<PathBuf>,
}

impl Migration {
    /// Plan the move from `current` to `target`.
    pub fn between(current: &Snapshot, target: &Snapshot) -> Self {
        let writes = target
            .iter()
            .filter(|(path, oid)| current.get(*path) != Some(*oid))
            .map(|(path, oid)| (path.clone(), oid.clone()))
            .collect();

        let deletes = current
            .keys()
            .filter(|path| !target.contains_key(*path))
            .cloned()
            .collect();

        Migration { writes, deletes }
    }

    /// Apply the plan to the working tree.
    pub fn apply(&self, database: &Database, workspace: &Workspace) -> anyhow::Result<()> {
        for (path, oid) in &self.writes {
            let blob = database.parse_blob(oid)?;
            workspace.write_file(path, blob.content())?;
        }

        for path in &self.deletes {
            workspace.remove_file(path)?;
        }

        Ok(())
    }
}
