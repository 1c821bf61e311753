//! Repository context
//!
//! Ties together the object database, reference store, staging index, and
//! workspace under one root. Commands borrow the pieces they need through
//! this context; `flush` persists everything touched during the session in
//! dependency order (objects first, references last), so a reference on disk
//! never names a hash that does not exist yet.

use crate::areas::database::Database;
use crate::areas::index::Index;
use crate::areas::refs::{RefTarget, Refs};
use crate::areas::workspace::{REPO_DIR_NAME, Workspace};
use crate::artifacts::core::RepoError;
use std::cell::{RefCell, RefMut};
use std::path::Path;

/// Name of the branch created by `init`.
pub const DEFAULT_BRANCH: &str = "master";

pub struct Repository {
    path: Box<Path>,
    writer: RefCell<Box<dyn std::io::Write>>,
    database: Database,
    refs: Refs,
    index: RefCell<Index>,
    workspace: Workspace,
}

impl Repository {
    /// Initialize a fresh repository at `path`.
    ///
    /// Creates the metadata directory, an unborn default branch, and HEAD
    /// pointing at it. Fails when a repository already exists there.
    pub fn new(path: &str, writer: Box<dyn std::io::Write>) -> anyhow::Result<Self> {
        let path = Path::new(path).canonicalize()?;

        if path.join(REPO_DIR_NAME).exists() {
            return Err(RepoError::ConflictingState(
                "A kit version-control system already exists in the current directory."
                    .to_string(),
            )
            .into());
        }

        std::fs::create_dir_all(path.join(REPO_DIR_NAME).join("objects"))?;
        std::fs::create_dir_all(path.join(REPO_DIR_NAME).join("refs").join("heads"))?;
        std::fs::create_dir_all(path.join(REPO_DIR_NAME).join("remotes"))?;

        let repository = Self::assemble(&path, writer)?;
        repository
            .refs()
            .create_branch(DEFAULT_BRANCH, RefTarget::Unborn)?;
        repository.refs().set_head(DEFAULT_BRANCH);

        Ok(repository)
    }

    /// Open an existing repository at `path`.
    pub fn open(path: &str, writer: Box<dyn std::io::Write>) -> anyhow::Result<Self> {
        let path = Path::new(path).canonicalize()?;

        if !path.join(REPO_DIR_NAME).exists() {
            return Err(RepoError::ConflictingState(
                "Not in an initialized kit directory.".to_string(),
            )
            .into());
        }

        let repository = Self::assemble(&path, writer)?;
        repository.index.borrow_mut().rehydrate()?;

        Ok(repository)
    }

    fn assemble(path: &Path, writer: Box<dyn std::io::Write>) -> anyhow::Result<Self> {
        let repo_dir = path.join(REPO_DIR_NAME);

        Ok(Repository {
            path: path.to_path_buf().into_boxed_path(),
            writer: RefCell::new(writer),
            database: Database::new(repo_dir.join("objects").into_boxed_path()),
            refs: Refs::new(repo_dir.clone().into_boxed_path()),
            index: RefCell::new(Index::new(repo_dir.join("index").into_boxed_path())),
            workspace: Workspace::new(path.to_path_buf().into_boxed_path()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Directory holding remote definitions.
    pub fn remotes_path(&self) -> std::path::PathBuf {
        self.path.join(REPO_DIR_NAME).join("remotes")
    }

    pub fn writer(&'_ self) -> RefMut<'_, Box<dyn std::io::Write>> {
        self.writer.borrow_mut()
    }

    pub fn database(&self) -> &Database {
        &self.database
    }

    pub fn refs(&self) -> &Refs {
        &self.refs
    }

    pub fn index(&'_ self) -> RefMut<'_, Index> {
        self.index.borrow_mut()
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    /// Persist every piece touched during the session.
    pub fn flush(&self) -> anyhow::Result<()> {
        self.database.flush()?;
        self.index.borrow().write_updates()?;
        self.refs.flush()
    }
}
