//! Split point search
//!
//! The split point of two branch tips is their latest common ancestor. With
//! single-parent commits each history is a plain chain, so the search is the
//! first entry of one chain that belongs to the other chain's ancestor set.
//!
//! The finder is generic over a parent loader so it can run against the real
//! object store or an in-memory graph in tests.

use crate::artifacts::objects::object_id::ObjectId;
use derive_new::new;
use std::collections::HashSet;

#[derive(new)]
pub struct SplitPointFinder<F>
where
    F: Fn(&ObjectId) -> anyhow::Result<Option<ObjectId>>,
{
    /// Loads a commit's parent id, `None` for the root commit.
    parent_of: F,
}

impl<F> SplitPointFinder<F>
where
    F: Fn(&ObjectId) -> anyhow::Result<Option<ObjectId>>,
{
    /// Latest common ancestor of `a` and `b`, `None` when their histories
    /// share no commit.
    pub fn find(&self, a: &ObjectId, b: &ObjectId) -> anyhow::Result<Option<ObjectId>> {
        if a == b {
            return Ok(Some(a.clone()));
        }

        let ancestors_of_b = self.chain(b)?.into_iter().collect::<HashSet<_>>();

        Ok(self
            .chain(a)?
            .into_iter()
            .find(|oid| ancestors_of_b.contains(oid)))
    }

    /// Nearest-first parent chain, start included.
    fn chain(&self, start: &ObjectId) -> anyhow::Result<Vec<ObjectId>> {
        let mut chain = vec![];
        let mut current = Some(start.clone());

        while let Some(oid) = current {
            current = (self.parent_of)(&oid)?;
            chain.push(oid);
        }

        Ok(chain)
    }
}
