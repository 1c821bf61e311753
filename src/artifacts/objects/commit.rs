//! Commit object
//!
//! A commit freezes a whole-repository snapshot: an ordered map of path to
//! blob id, a single parent link (absent for the root commit), a timestamp,
//! and a message. Commits are immutable and content-addressed like blobs,
//! so history reachable from any reference is acyclic by construction: a
//! commit's parent always existed strictly before the commit itself.
//!
//! ## Format
//!
//! On disk:
//! ```text
//! commit <size>\0
//! parent <parent-hash>        (omitted for the root commit)
//! timestamp <unix-seconds> <timezone>
//! entry <blob-hash> <path>    (one per snapshot entry, sorted by path)
//!
//! <commit message>
//! ```

use crate::artifacts::objects::object::Unpackable;
use crate::artifacts::objects::object::{Object, Packable};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use anyhow::Context;
use bytes::Bytes;
use std::collections::BTreeMap;
use std::io::{BufRead, Write};
use std::path::PathBuf;

/// Ordered path -> blob-id mapping describing a full working-tree state.
pub type Snapshot = BTreeMap<PathBuf, ObjectId>;

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Commit {
    /// Parent commit id; `None` only for the root commit.
    parent: Option<ObjectId>,
    /// When the snapshot was frozen.
    timestamp: chrono::DateTime<chrono::FixedOffset>,
    /// Path -> blob id, keys unique and sorted.
    snapshot: Snapshot,
    /// Commit message.
    message: String,
}

impl Commit {
    pub fn new(parent: Option<ObjectId>, snapshot: Snapshot, message: String) -> Self {
        Commit {
            parent,
            timestamp: Self::timestamp_from_env(),
            snapshot,
            message,
        }
    }

    pub fn new_with_timestamp(
        parent: Option<ObjectId>,
        snapshot: Snapshot,
        message: String,
        timestamp: chrono::DateTime<chrono::FixedOffset>,
    ) -> Self {
        Commit {
            parent,
            timestamp,
            snapshot,
            message,
        }
    }

    /// Commit timestamp, overridable through `KIT_COMMIT_DATE` for
    /// reproducible histories.
    fn timestamp_from_env() -> chrono::DateTime<chrono::FixedOffset> {
        std::env::var("KIT_COMMIT_DATE")
            .ok()
            .and_then(|date_str| {
                chrono::DateTime::parse_from_rfc2822(&date_str)
                    .or_else(|_| {
                        chrono::DateTime::parse_from_str(&date_str, "%Y-%m-%d %H:%M:%S %z")
                    })
                    .ok()
            })
            .unwrap_or_else(|| chrono::Local::now().fixed_offset())
    }

    pub fn parent(&self) -> Option<&ObjectId> {
        self.parent.as_ref()
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    pub fn blob_oid(&self, path: &std::path::Path) -> Option<&ObjectId> {
        self.snapshot.get(path)
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn timestamp(&self) -> chrono::DateTime<chrono::FixedOffset> {
        self.timestamp
    }

    pub fn readable_timestamp(&self) -> String {
        self.timestamp
            .format("%a %b %-d %H:%M:%S %Y %z")
            .to_string()
    }
}

impl Packable for Commit {
    fn serialize(&self) -> anyhow::Result<Bytes> {
        let mut object_content = vec![];

        if let Some(parent) = &self.parent {
            object_content.push(format!("parent {}", parent.as_ref()));
        }
        object_content.push(format!(
            "timestamp {} {}",
            self.timestamp.timestamp(),
            self.timestamp.format("%z")
        ));
        for (path, oid) in &self.snapshot {
            object_content.push(format!("entry {} {}", oid.as_ref(), path.display()));
        }
        object_content.push(String::new());
        object_content.push(self.message.to_string());

        let content_bytes = object_content.join("\n").into_bytes();

        let mut commit_bytes = Vec::new();
        let header = format!("{} {}\0", self.object_type().as_str(), content_bytes.len());
        commit_bytes.write_all(header.as_bytes())?;
        commit_bytes.write_all(&content_bytes)?;

        Ok(Bytes::from(commit_bytes))
    }
}

impl Unpackable for Commit {
    fn deserialize(reader: impl BufRead) -> anyhow::Result<Self> {
        let content = reader
            .bytes()
            .collect::<Result<Vec<u8>, std::io::Error>>()?;

        let content = String::from_utf8(content)?;
        let mut lines = content.lines();

        let mut next_line = lines
            .next()
            .context("Invalid commit object: missing timestamp line")?;

        let parent = match next_line.strip_prefix("parent ") {
            Some(parent_oid) => {
                next_line = lines
                    .next()
                    .context("Invalid commit object: missing timestamp line")?;
                Some(ObjectId::try_parse(parent_oid.to_string())?)
            }
            None => None,
        };

        let timestamp_line = next_line
            .strip_prefix("timestamp ")
            .context("Invalid commit object: invalid timestamp line")?;
        let (seconds, timezone) = timestamp_line
            .split_once(' ')
            .context("Invalid commit object: invalid timestamp line")?;
        let seconds = seconds
            .parse::<i64>()
            .context("Invalid commit object: invalid timestamp seconds")?;
        let utc = chrono::DateTime::from_timestamp(seconds, 0)
            .context("Invalid commit object: timestamp out of range")?;
        let timestamp = utc.with_timezone(&parse_timezone(timezone)?);

        let mut snapshot = Snapshot::new();
        for line in lines.by_ref() {
            if line.is_empty() {
                break;
            }

            let entry = line
                .strip_prefix("entry ")
                .context("Invalid commit object: invalid snapshot entry")?;
            let (oid, path) = entry
                .split_once(' ')
                .context("Invalid commit object: invalid snapshot entry")?;
            snapshot.insert(PathBuf::from(path), ObjectId::try_parse(oid.to_string())?);
        }

        let message = lines.collect::<Vec<&str>>().join("\n");
        Ok(Self::new_with_timestamp(parent, snapshot, message, timestamp))
    }
}

/// Parse a `±HHMM` timezone as written by chrono's `%z` formatter.
fn parse_timezone(timezone: &str) -> anyhow::Result<chrono::FixedOffset> {
    if timezone.len() != 5 || !timezone.is_ascii() {
        anyhow::bail!("Invalid commit object: invalid timezone");
    }

    let (sign, digits) = timezone.split_at(1);
    let hours = digits[..2]
        .parse::<i32>()
        .map_err(|_| anyhow::anyhow!("Invalid commit object: invalid timezone"))?;
    let minutes = digits[2..]
        .parse::<i32>()
        .map_err(|_| anyhow::anyhow!("Invalid commit object: invalid timezone"))?;
    let offset_seconds = hours * 3600 + minutes * 60;

    match sign {
        "+" => chrono::FixedOffset::east_opt(offset_seconds),
        "-" => chrono::FixedOffset::west_opt(offset_seconds),
        _ => None,
    }
    .ok_or_else(|| anyhow::anyhow!("Invalid commit object: invalid timezone"))
}

impl Object for Commit {
    fn object_type(&self) -> ObjectType {
        ObjectType::Commit
    }
}
