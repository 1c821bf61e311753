//! Staging index
//!
//! The index is the staging area: a tracked map (path to blob hash) that is
//! exactly the snapshot the next commit will freeze, plus three diff sets
//! (`added`, `modified`, `removed`) recording how the tracked map diverged
//! from the last commit. The diff sets gate committing and drive status
//! output; they clear after a successful commit while the tracked map
//! persists as the new baseline.
//!
//! ## Index File Format
//!
//! A text file at `.kit/index`:
//! ```text
//! kit-index v1
//! tracked <blob-hash> <path>     (one per tracked file, sorted by path)
//! added <path>
//! modified <path>
//! removed <path>
//! ```

use crate::artifacts::core::RepoError;
use crate::artifacts::objects::commit::Snapshot;
use crate::artifacts::objects::object_id::ObjectId;
use anyhow::Context;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

/// Header line identifying the index file format.
const SIGNATURE: &str = "kit-index v1";

#[derive(Debug, Clone)]
pub struct Index {
    /// Path to the index file (typically `.kit/index`).
    path: Box<Path>,
    /// Tracked files mapped to their staged blob ids.
    tracked: BTreeMap<PathBuf, ObjectId>,
    /// Paths staged that the last commit did not track.
    added: BTreeSet<PathBuf>,
    /// Tracked paths staged with different content than the last commit.
    modified: BTreeSet<PathBuf>,
    /// Paths staged for removal from the next commit.
    removed: BTreeSet<PathBuf>,
    /// Whether the index diverged from the last commit's snapshot.
    changed: bool,
}

impl Index {
    pub fn new(path: Box<Path>) -> Self {
        Index {
            path,
            tracked: BTreeMap::new(),
            added: BTreeSet::new(),
            modified: BTreeSet::new(),
            removed: BTreeSet::new(),
            changed: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_tracked(&self, path: &Path) -> bool {
        self.tracked.contains_key(path)
    }

    pub fn tracked_oid(&self, path: &Path) -> Option<&ObjectId> {
        self.tracked.get(path)
    }

    pub fn tracked(&self) -> &BTreeMap<PathBuf, ObjectId> {
        &self.tracked
    }

    pub fn added(&self) -> &BTreeSet<PathBuf> {
        &self.added
    }

    pub fn modified(&self) -> &BTreeSet<PathBuf> {
        &self.modified
    }

    pub fn removed(&self) -> &BTreeSet<PathBuf> {
        &self.removed
    }

    /// Whether anything has been staged since the last commit.
    pub fn is_dirty(&self) -> bool {
        self.changed
    }

    /// Stage a file's content.
    ///
    /// Re-staging a path with the blob id it already maps to is a no-op (the
    /// content-addressed hash proves the content is unchanged). Staging a
    /// previously removed path cancels the removal.
    pub fn add(&mut self, path: PathBuf, blob_oid: ObjectId) {
        if self.tracked.get(&path) == Some(&blob_oid) {
            return;
        }

        // a removed path left the tracked map, so re-staging it is an add
        self.removed.remove(&path);
        if self.tracked.contains_key(&path) {
            self.modified.insert(path.clone());
        } else {
            self.added.insert(path.clone());
        }

        self.tracked.insert(path, blob_oid);
        self.changed = true;
    }

    /// Unstage a file, optionally marking it for removal from the next
    /// commit.
    ///
    /// `record_removal` is false when the path was never committed (it was
    /// only staged), so the next commit has nothing to drop.
    pub fn remove(&mut self, path: &Path, record_removal: bool) -> anyhow::Result<()> {
        if self.tracked.remove(path).is_none() {
            return Err(RepoError::NotTracked(path.to_path_buf()).into());
        }

        self.added.remove(path);
        self.modified.remove(path);
        if record_removal {
            self.removed.insert(path.to_path_buf());
        }
        self.changed = true;

        Ok(())
    }

    /// Freeze the staged state for a commit.
    ///
    /// Fails unless something is staged. On success the diff sets clear and
    /// the tracked map becomes the committed baseline.
    pub fn snapshot_for_commit(&mut self) -> anyhow::Result<Snapshot> {
        if !self.changed {
            return Err(RepoError::NothingToCommit.into());
        }

        self.added.clear();
        self.modified.clear();
        self.removed.clear();
        self.changed = false;

        Ok(self.tracked.clone())
    }

    /// Reset the tracked map to a commit's snapshot, discarding any staged
    /// changes. Used when switching branches.
    pub fn replace_tracked(&mut self, snapshot: Snapshot) {
        self.tracked = snapshot;
        self.added.clear();
        self.modified.clear();
        self.removed.clear();
        self.changed = false;
    }

    /// Load the index from disk. A missing file is an empty index.
    pub fn rehydrate(&mut self) -> anyhow::Result<()> {
        self.tracked.clear();
        self.added.clear();
        self.modified.clear();
        self.removed.clear();
        self.changed = false;

        if !self.path.exists() {
            return Ok(());
        }

        let content = std::fs::read_to_string(&self.path)?;
        let mut lines = content.lines();

        let header = lines.next().context("Invalid index file: missing header")?;
        if header != SIGNATURE {
            anyhow::bail!("Invalid index file: unrecognized header {header:?}");
        }

        for line in lines {
            if line.is_empty() {
                continue;
            }

            let (kind, rest) = line
                .split_once(' ')
                .context("Invalid index file: malformed line")?;

            match kind {
                "tracked" => {
                    let (oid, path) = rest
                        .split_once(' ')
                        .context("Invalid index file: malformed tracked line")?;
                    self.tracked
                        .insert(PathBuf::from(path), ObjectId::try_parse(oid.to_string())?);
                }
                "added" => {
                    self.added.insert(PathBuf::from(rest));
                }
                "modified" => {
                    self.modified.insert(PathBuf::from(rest));
                }
                "removed" => {
                    self.removed.insert(PathBuf::from(rest));
                }
                _ => anyhow::bail!("Invalid index file: unknown line kind {kind:?}"),
            }
        }

        self.changed =
            !self.added.is_empty() || !self.modified.is_empty() || !self.removed.is_empty();

        Ok(())
    }

    /// Persist the index to disk.
    pub fn write_updates(&self) -> anyhow::Result<()> {
        let mut lines = vec![SIGNATURE.to_string()];

        for (path, oid) in &self.tracked {
            lines.push(format!("tracked {} {}", oid.as_ref(), path.display()));
        }
        for path in &self.added {
            lines.push(format!("added {}", path.display()));
        }
        for path in &self.modified {
            lines.push(format!("modified {}", path.display()));
        }
        for path in &self.removed {
            lines.push(format!("removed {}", path.display()));
        }
        lines.push(String::new());

        std::fs::write(&self.path, lines.join("\n"))
            .with_context(|| format!("failed to write index file at {:?}", self.path))
    }
}
