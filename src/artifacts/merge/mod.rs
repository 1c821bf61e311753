//! Three-way merge engine
//!
//! Reconciles two divergent snapshots against their split point (latest
//! common ancestor). Comparison is whole-file by blob hash; there is no
//! line-level diffing. Each path in the union of the three snapshots is
//! classified independently:
//!
//! - untouched on both sides: no-op
//! - touched on one side only: that side wins (take, delete, or keep)
//! - touched differently on both sides: conflict, both versions written
//!   into the file between conflict markers
//!
//! A side that deleted the path while the other edited it still conflicts;
//! the deleted side contributes empty content between its markers.

pub mod split_finder;

use crate::artifacts::objects::commit::Snapshot;
use crate::artifacts::objects::object_id::ObjectId;
use std::collections::BTreeSet;
use std::path::PathBuf;

/// What the merge decided for one path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeAction {
    /// Write the other branch's version and stage it.
    TakeOther(ObjectId),
    /// Remove the path from the working tree and untrack it.
    Delete,
    /// Both sides changed the path incompatibly; `None` means that side
    /// deleted it.
    Conflict {
        head: Option<ObjectId>,
        other: Option<ObjectId>,
    },
}

/// Classify every path of the three snapshots, no-ops omitted. Results are
/// ordered by path.
pub fn classify(
    head: &Snapshot,
    other: &Snapshot,
    split: &Snapshot,
) -> Vec<(PathBuf, MergeAction)> {
    let paths = head
        .keys()
        .chain(other.keys())
        .chain(split.keys())
        .cloned()
        .collect::<BTreeSet<_>>();

    paths
        .into_iter()
        .filter_map(|path| {
            let at_head = head.get(&path);
            let at_other = other.get(&path);
            let at_split = split.get(&path);

            let head_touched = at_head != at_split;
            let other_touched = at_other != at_split;

            let action = match (head_touched, other_touched) {
                (_, false) => None,
                (false, true) => match at_other {
                    Some(oid) => Some(MergeAction::TakeOther(oid.clone())),
                    None => Some(MergeAction::Delete),
                },
                (true, true) if at_head == at_other => None,
                (true, true) => Some(MergeAction::Conflict {
                    head: at_head.cloned(),
                    other: at_other.cloned(),
                }),
            };

            action.map(|action| (path, action))
        })
        .collect()
}

/// Conflicted file content: both versions delimited by markers, the current
/// branch's version first.
pub fn conflict_content(head_content: &str, other_content: &str, other_branch: &str) -> String {
    format!(
        "<<<<<<< HEAD\n{head_content}=======\n{other_content}>>>>>>> {other_branch}\n"
    )
}
