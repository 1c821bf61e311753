//! Object identifier (SHA-1 hash)
//!
//! Object ids are 40-character hexadecimal strings identifying every stored
//! record (blobs and commits). Identity equals the hash of the record's own
//! serialized bytes, so identical content always yields the same id.
//!
//! ## Storage
//!
//! Objects are stored in `.kit/objects/<first-2-chars>/<remaining-38-chars>`

use crate::artifacts::objects::OBJECT_ID_LENGTH;
use std::path::PathBuf;

/// A validated 40-character hexadecimal object id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct ObjectId(String);

impl ObjectId {
    /// Parse and validate an object id from a string.
    pub fn try_parse(id: String) -> anyhow::Result<Self> {
        if id.len() != OBJECT_ID_LENGTH {
            return Err(anyhow::anyhow!("Invalid object id length: {}", id.len()));
        }
        if !id.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(anyhow::anyhow!("Invalid object id characters: {}", id));
        }
        Ok(Self(id))
    }

    /// Convert to the sharded on-disk path, `XX/YYYY...` with a 2-char prefix
    /// directory keeping directory sizes bounded.
    pub fn to_path(&self) -> PathBuf {
        let (dir, file) = self.0.split_at(2);
        PathBuf::from(dir).join(file)
    }

    /// First 7 characters, the standard abbreviation for display.
    pub fn to_short_oid(&self) -> String {
        self.0.split_at(7).0.to_string()
    }
}

impl AsRef<str> for ObjectId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ObjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
