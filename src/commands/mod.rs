//! User-facing command implementations
//!
//! Each file adds one workflow onto `Repository`. Commands compose the areas
//! (database, refs, index, workspace) and the domain algorithms (history,
//! merge, checkout) and print through the repository's injected writer, so
//! tests can capture output without touching stdout.

pub mod add;
pub mod branch;
pub mod checkout;
pub mod commit;
pub mod init;
pub mod log;
pub mod merge;
pub mod remote;
pub mod rm;
pub mod status;
