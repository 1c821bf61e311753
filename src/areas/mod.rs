//! Core repository components
//!
//! The fundamental building blocks of a repository:
//!
//! - `database`: content-addressed object store for blobs and commits
//! - `index`: staging area tracking files for the next commit
//! - `refs`: reference management (HEAD, branches, remote-tracking refs)
//! - `repository`: high-level repository context and coordination
//! - `workspace`: working directory file system operations

pub mod database;
pub mod index;
pub mod refs;
pub mod repository;
pub mod workspace;
