//! References (HEAD, branches, tags, remote-tracking branches)
//!
//! References are human-readable names pointing at commits. A reference is
//! either direct (a full object id), unborn (an empty file, a branch with no
//! commits yet), or symbolic (`ref: <name>`, pointing at another reference).
//!
//! References never hold live pointers to each other: they are entries in a
//! flat name-keyed map, so resolution is a bounded-hop walk and a cyclic
//! chain is detected by running out of hops.
//!
//! ## Namespaces
//!
//! - `HEAD`: symbolic reference naming the current branch
//! - `refs/heads/<branch>`: branch tips
//! - `refs/remotes/<remote>/<branch>`: remote-tracking tips
//!
//! Like the object database, the store is a dirty-tracking read-through
//! cache; `flush` persists every reference written during the session.

use crate::artifacts::core::RepoError;
use crate::artifacts::objects::object_id::ObjectId;
use anyhow::Context;
use derive_new::new;
use std::cell::RefCell;
use std::collections::{BTreeSet, HashMap};
use std::path::Path;
use walkdir::WalkDir;

/// Name of the HEAD reference.
pub const HEAD_REF_NAME: &str = "HEAD";

/// Regex pattern for parsing symbolic references.
const SYMREF_REGEX: &str = r"^ref: (.+)$";

/// Upper bound on symbolic indirection; exceeding it means a cycle.
const MAX_REF_HOPS: usize = 16;

/// A reference's stored value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefTarget {
    /// Direct object id.
    Oid(ObjectId),
    /// Symbolic reference naming another reference.
    SymRef(String),
    /// A branch that exists but has no commits yet.
    Unborn,
}

#[derive(Debug, new)]
pub struct Refs {
    /// Path to the repository metadata directory (typically `.kit`).
    path: Box<Path>,
    #[new(default)]
    cache: RefCell<HashMap<String, Option<RefTarget>>>,
    #[new(default)]
    dirty: RefCell<BTreeSet<String>>,
}

/// Full reference name for a branch.
pub fn branch_ref(name: &str) -> String {
    format!("refs/heads/{name}")
}

/// Full reference name for a remote-tracking branch.
pub fn remote_tracking_ref(remote: &str, branch: &str) -> String {
    format!("refs/remotes/{remote}/{branch}")
}

impl Refs {
    /// Read a reference by full name, `None` when it does not exist.
    pub fn read(&self, name: &str) -> anyhow::Result<Option<RefTarget>> {
        if let Some(target) = self.cache.borrow().get(name) {
            return Ok(target.clone());
        }

        let target = Self::read_ref_file(self.path.join(name).as_path())?;
        self.cache
            .borrow_mut()
            .insert(name.to_string(), target.clone());

        Ok(target)
    }

    /// Write a reference, deferring persistence until `flush`.
    pub fn set(&self, name: &str, target: RefTarget) {
        self.cache
            .borrow_mut()
            .insert(name.to_string(), Some(target));
        self.dirty.borrow_mut().insert(name.to_string());
    }

    /// Delete a reference immediately.
    pub fn remove(&self, name: &str) -> anyhow::Result<()> {
        let ref_path = self.path.join(name);
        if ref_path.exists() {
            std::fs::remove_file(&ref_path)
                .with_context(|| format!("failed to delete ref file at {:?}", ref_path))?;
            self.prune_empty_parent_dirs(&ref_path)?;
        }

        self.cache.borrow_mut().insert(name.to_string(), None);
        self.dirty.borrow_mut().remove(name);

        Ok(())
    }

    /// Follow a symbolic chain to a final direct reference.
    ///
    /// `Ok(None)` means the chain ends in an unborn branch. A chain that
    /// dangles or exceeds the hop bound (a cycle) is a broken reference.
    pub fn resolve(&self, name: &str) -> anyhow::Result<Option<ObjectId>> {
        let mut current = name.to_string();

        for _ in 0..MAX_REF_HOPS {
            match self.read(&current)? {
                None if current == name => {
                    return Err(RepoError::ReferenceNotFound(name.to_string()).into());
                }
                None => return Err(RepoError::BrokenReference(current).into()),
                Some(RefTarget::Unborn) => return Ok(None),
                Some(RefTarget::Oid(oid)) => return Ok(Some(oid)),
                Some(RefTarget::SymRef(next)) => current = next,
            }
        }

        Err(RepoError::BrokenReference(name.to_string()).into())
    }

    /// The branch HEAD currently names.
    pub fn current_branch(&self) -> anyhow::Result<String> {
        match self.read(HEAD_REF_NAME)? {
            Some(RefTarget::SymRef(target)) => target
                .strip_prefix("refs/heads/")
                .map(|branch| branch.to_string())
                .ok_or_else(|| anyhow::anyhow!("HEAD does not name a branch: {target}")),
            _ => Err(anyhow::anyhow!("HEAD is missing or not symbolic")),
        }
    }

    pub fn set_head(&self, branch: &str) {
        self.set(HEAD_REF_NAME, RefTarget::SymRef(branch_ref(branch)));
    }

    /// The current branch's tip commit, `None` on an unborn branch.
    pub fn read_head(&self) -> anyhow::Result<Option<ObjectId>> {
        self.resolve(HEAD_REF_NAME)
    }

    /// Point the current branch at a new commit.
    pub fn update_current_branch(&self, oid: ObjectId) -> anyhow::Result<()> {
        let branch = self.current_branch()?;
        self.set(&branch_ref(&branch), RefTarget::Oid(oid));
        Ok(())
    }

    pub fn create_branch(&self, name: &str, target: RefTarget) -> anyhow::Result<()> {
        if self.read(&branch_ref(name))?.is_some() {
            return Err(RepoError::ConflictingState(format!(
                "A branch with that name already exists: {name}"
            ))
            .into());
        }

        self.set(&branch_ref(name), target);
        Ok(())
    }

    pub fn delete_branch(&self, name: &str) -> anyhow::Result<()> {
        if self.read(&branch_ref(name))?.is_none() {
            return Err(RepoError::ReferenceNotFound(format!(
                "A branch with that name does not exist: {name}"
            ))
            .into());
        }

        self.remove(&branch_ref(name))
    }

    /// All branch names, persisted and session-written alike, sorted.
    pub fn list_branches(&self) -> anyhow::Result<Vec<String>> {
        let mut branches = BTreeSet::new();

        let heads_path = self.path.join("refs").join("heads");
        if heads_path.exists() {
            for entry in WalkDir::new(&heads_path)
                .into_iter()
                .filter_map(|entry| entry.ok())
                .filter(|entry| entry.path().is_file())
            {
                if let Ok(relative) = entry.path().strip_prefix(&heads_path) {
                    branches.insert(relative.to_string_lossy().to_string());
                }
            }
        }

        for (name, target) in self.cache.borrow().iter() {
            if let Some(branch) = name.strip_prefix("refs/heads/") {
                match target {
                    Some(_) => {
                        branches.insert(branch.to_string());
                    }
                    None => {
                        branches.remove(branch);
                    }
                }
            }
        }

        Ok(branches.into_iter().collect())
    }

    /// Persist every reference written this session.
    ///
    /// Callers flush the object database first, so a published hash always
    /// exists on disk before any reference names it.
    pub fn flush(&self) -> anyhow::Result<()> {
        let dirty = std::mem::take(&mut *self.dirty.borrow_mut());

        for name in dirty {
            let target = self
                .cache
                .borrow()
                .get(&name)
                .cloned()
                .flatten()
                .context("dirty reference missing from cache")?;
            self.write_ref_file(&name, &target)?;
        }

        Ok(())
    }

    fn read_ref_file(path: &Path) -> anyhow::Result<Option<RefTarget>> {
        if !path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(path)?;
        let content = content.trim();

        if content.is_empty() {
            return Ok(Some(RefTarget::Unborn));
        }

        let symref_match = regex::Regex::new(SYMREF_REGEX)?.captures(content);
        if let Some(symref_match) = symref_match {
            Ok(Some(RefTarget::SymRef(symref_match[1].to_string())))
        } else {
            Ok(Some(RefTarget::Oid(ObjectId::try_parse(
                content.to_string(),
            )?)))
        }
    }

    fn write_ref_file(&self, name: &str, target: &RefTarget) -> anyhow::Result<()> {
        let ref_path = self.path.join(name);
        std::fs::create_dir_all(ref_path.parent().with_context(|| {
            format!("failed to resolve parent directory for ref {name}")
        })?)?;

        let raw_ref = match target {
            RefTarget::Oid(oid) => oid.as_ref().to_string(),
            RefTarget::SymRef(symref) => format!("ref: {symref}"),
            RefTarget::Unborn => String::new(),
        };

        std::fs::write(&ref_path, raw_ref)
            .with_context(|| format!("failed to write ref file at {:?}", ref_path))
    }

    fn prune_empty_parent_dirs(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent()
            && parent.starts_with(self.path.join("refs"))
            && parent != self.path.join("refs").as_path()
            && parent.exists()
            && parent.read_dir()?.next().is_none()
        {
            std::fs::remove_dir(parent).with_context(|| {
                format!("failed to remove empty ref directory at {:?}", parent)
            })?;
            self.prune_empty_parent_dirs(parent)?;
        }

        Ok(())
    }
}
