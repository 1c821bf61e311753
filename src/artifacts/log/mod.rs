//! Commit graph traversal
//!
//! History is a single-parent chain, so every walk is a simple loop from a
//! tip to the root commit. The graph is never materialized; commits load
//! lazily from the object store.

use crate::areas::database::Database;
use crate::artifacts::objects::object_id::ObjectId;
use std::collections::HashSet;

/// Parent chain from `start` to the root, nearest first, `start` included.
pub fn history(database: &Database, start: &ObjectId) -> anyhow::Result<Vec<ObjectId>> {
    let mut chain = vec![];
    let mut current = Some(start.clone());

    while let Some(oid) = current {
        let commit = database.parse_commit(&oid)?;
        chain.push(oid);
        current = commit.parent().cloned();
    }

    Ok(chain)
}

/// Every commit reachable from `start`, `start` included.
pub fn ancestors_of(database: &Database, start: &ObjectId) -> anyhow::Result<HashSet<ObjectId>> {
    Ok(history(database, start)?.into_iter().collect())
}
