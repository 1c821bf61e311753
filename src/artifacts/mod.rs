//! Domain types and algorithms
//!
//! - `objects`: immutable stored records (blobs and commits) and their ids
//! - `core`: the shared error taxonomy
//! - `log`: parent-chain history walks
//! - `checkout`: snapshot-to-working-tree migrations
//! - `merge`: split-point search and three-way classification
//! - `remote`: local-directory remotes

pub mod checkout;
pub mod core;
pub mod log;
pub mod merge;
pub mod objects;
pub mod remote;
