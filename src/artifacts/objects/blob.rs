//! Blob object
//!
//! Blobs store file content: just the raw text, no path or metadata (paths
//! live in commit snapshots). Each unique content is stored once, addressed
//! by the SHA-1 of its serialized form.
//!
//! ## Format
//!
//! On disk: `blob <size>\0<content>`

use crate::artifacts::objects::object::Unpackable;
use crate::artifacts::objects::object::{Object, Packable};
use crate::artifacts::objects::object_type::ObjectType;
use bytes::Bytes;
use derive_new::new;
use std::io::{BufRead, Write};

#[derive(Debug, Clone, Eq, PartialEq, new)]
pub struct Blob {
    content: String,
}

impl Blob {
    pub fn content(&self) -> &str {
        &self.content
    }
}

impl Packable for Blob {
    fn serialize(&self) -> anyhow::Result<Bytes> {
        let content_bytes = self.content.as_bytes();

        let mut blob_bytes = Vec::new();
        let header = format!("{} {}\0", self.object_type().as_str(), content_bytes.len());
        blob_bytes.write_all(header.as_bytes())?;
        blob_bytes.write_all(content_bytes)?;

        Ok(Bytes::from(blob_bytes))
    }
}

impl Unpackable for Blob {
    fn deserialize(reader: impl BufRead) -> anyhow::Result<Self> {
        // the header has already been read
        let content = reader
            .bytes()
            .collect::<Result<Vec<u8>, std::io::Error>>()?;

        let content = String::from_utf8(content)?;
        Ok(Self::new(content))
    }
}

impl Object for Blob {
    fn object_type(&self) -> ObjectType {
        ObjectType::Blob
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::io::Cursor;

    proptest! {
        #[test]
        fn any_content_round_trips(content in ".*") {
            let blob = Blob::new(content.clone());

            let bytes = blob.serialize().unwrap();
            let mut reader = Cursor::new(bytes);
            ObjectType::parse_object_type(&mut reader).unwrap();
            let parsed = Blob::deserialize(reader).unwrap();

            prop_assert_eq!(parsed.content(), content);
        }

        #[test]
        fn identity_depends_only_on_content(content in ".*") {
            let first = Blob::new(content.clone()).object_id().unwrap();
            let second = Blob::new(content).object_id().unwrap();

            prop_assert_eq!(first, second);
        }
    }
}
