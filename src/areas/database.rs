//! Content-addressed object database
//!
//! Append-only storage for immutable blobs and commits. Objects are addressed
//! by the SHA-1 of their serialized form, so storing identical content twice
//! is a no-op that yields the same id.
//!
//! The database is a dirty-tracking read-through cache: opening it loads
//! nothing, reads pull objects into the cache on demand, and `flush` writes
//! every object put during the session exactly once. Writes go through a
//! temp-file-then-rename step so a crash never leaves a half-written object.
//!
//! ## Layout
//!
//! `objects/<2-char-prefix>/<remaining-38-chars>`, one zlib-compressed file
//! per object.

use crate::artifacts::core::RepoError;
use crate::artifacts::objects::blob::Blob;
use crate::artifacts::objects::commit::Commit;
use crate::artifacts::objects::object::{Object, Unpackable};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use anyhow::Context;
use bytes::Bytes;
use fake::rand;
use std::cell::RefCell;
use std::collections::{BTreeSet, HashMap};
use std::io::{Cursor, Read, Write};
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub struct Database {
    /// Path to the objects directory (typically `.kit/objects`).
    path: Box<Path>,
    /// Serialized form of every object touched this session.
    cache: RefCell<HashMap<ObjectId, Bytes>>,
    /// Objects put this session but not yet persisted.
    pending: RefCell<BTreeSet<ObjectId>>,
}

impl Database {
    pub fn new(path: Box<Path>) -> Self {
        Database {
            path,
            cache: RefCell::new(HashMap::new()),
            pending: RefCell::new(BTreeSet::new()),
        }
    }

    pub fn objects_path(&self) -> &Path {
        &self.path
    }

    /// Store an object, returning its content hash. Idempotent: content that
    /// is already cached or persisted is not scheduled for another write.
    pub fn put(&self, object: &impl Object) -> anyhow::Result<ObjectId> {
        let object_content = object.serialize()?;
        let object_id = object.object_id()?;

        let mut cache = self.cache.borrow_mut();
        if !cache.contains_key(&object_id) {
            if !self.path.join(object_id.to_path()).exists() {
                self.pending.borrow_mut().insert(object_id.clone());
            }
            cache.insert(object_id.clone(), object_content);
        }

        Ok(object_id)
    }

    pub fn contains(&self, object_id: &ObjectId) -> bool {
        self.cache.borrow().contains_key(object_id)
            || self.path.join(object_id.to_path()).exists()
    }

    pub fn parse_blob(&self, object_id: &ObjectId) -> anyhow::Result<Blob> {
        let (object_type, object_reader) = self.parse_object_as_bytes(object_id)?;

        match object_type {
            ObjectType::Blob => Blob::deserialize(object_reader),
            other => Err(anyhow::anyhow!("object {} is a {}, not a blob", object_id, other)),
        }
    }

    pub fn parse_commit(&self, object_id: &ObjectId) -> anyhow::Result<Commit> {
        let (object_type, object_reader) = self.parse_object_as_bytes(object_id)?;

        match object_type {
            ObjectType::Commit => Commit::deserialize(object_reader),
            other => Err(anyhow::anyhow!(
                "object {} is a {}, not a commit",
                object_id,
                other
            )),
        }
    }

    pub fn object_type_of(&self, object_id: &ObjectId) -> anyhow::Result<ObjectType> {
        let (object_type, _) = self.parse_object_as_bytes(object_id)?;
        Ok(object_type)
    }

    /// Resolve an abbreviated hash to a full id of the requested type.
    ///
    /// More than one match is an error: abbreviations never pick silently.
    pub fn find_by_prefix(
        &self,
        object_type: ObjectType,
        prefix: &str,
    ) -> anyhow::Result<ObjectId> {
        if prefix.is_empty() || !prefix.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(RepoError::ObjectNotFound(prefix.to_string()).into());
        }

        let mut matches = Vec::new();
        for object_id in self.list_object_ids()? {
            if object_id.as_ref().starts_with(prefix)
                && self.object_type_of(&object_id)? == object_type
            {
                matches.push(object_id);
            }
        }

        match matches.len() {
            0 => Err(RepoError::ObjectNotFound(prefix.to_string()).into()),
            1 => Ok(matches.remove(0)),
            _ => Err(RepoError::AmbiguousReference(prefix.to_string()).into()),
        }
    }

    /// Every object id known to this database: persisted and pending alike.
    pub fn list_object_ids(&self) -> anyhow::Result<Vec<ObjectId>> {
        let mut object_ids = self
            .cache
            .borrow()
            .keys()
            .cloned()
            .collect::<BTreeSet<_>>();

        if self.path.exists() {
            for entry in walkdir::WalkDir::new(self.path.as_ref())
                .min_depth(2)
                .max_depth(2)
                .into_iter()
                .filter_map(|entry| entry.ok())
                .filter(|entry| entry.path().is_file())
            {
                let dir_name = entry
                    .path()
                    .parent()
                    .and_then(|parent| parent.file_name())
                    .map(|name| name.to_string_lossy().to_string())
                    .unwrap_or_default();
                let file_name = entry.file_name().to_string_lossy().to_string();

                if let Ok(object_id) = ObjectId::try_parse(format!("{dir_name}{file_name}")) {
                    object_ids.insert(object_id);
                }
            }
        }

        Ok(object_ids.into_iter().collect())
    }

    /// Persist every pending object exactly once.
    pub fn flush(&self) -> anyhow::Result<()> {
        let pending = std::mem::take(&mut *self.pending.borrow_mut());

        for object_id in pending {
            let object_content = self
                .cache
                .borrow()
                .get(&object_id)
                .cloned()
                .context("pending object missing from cache")?;
            self.write_object(self.path.join(object_id.to_path()), object_content)?;
        }

        Ok(())
    }

    fn parse_object_as_bytes(
        &self,
        object_id: &ObjectId,
    ) -> anyhow::Result<(ObjectType, impl std::io::BufRead)> {
        let object_content = self.load_raw(object_id)?;
        let mut object_reader = Cursor::new(object_content);

        let object_type = ObjectType::parse_object_type(&mut object_reader)?;

        Ok((object_type, object_reader))
    }

    fn load_raw(&self, object_id: &ObjectId) -> anyhow::Result<Bytes> {
        if let Some(object_content) = self.cache.borrow().get(object_id) {
            return Ok(object_content.clone());
        }

        let object_path = self.path.join(object_id.to_path());
        if !object_path.exists() {
            return Err(RepoError::ObjectNotFound(object_id.to_string()).into());
        }

        let object_content = std::fs::read(&object_path).context(format!(
            "Unable to read object file {}",
            object_path.display()
        ))?;
        let object_content = Self::decompress(object_content.into())?;

        self.cache
            .borrow_mut()
            .insert(object_id.clone(), object_content.clone());

        Ok(object_content)
    }

    fn write_object(&self, object_path: PathBuf, object_content: Bytes) -> anyhow::Result<()> {
        if object_path.exists() {
            return Ok(());
        }

        let object_dir = object_path
            .parent()
            .context(format!("Invalid object path {}", object_path.display()))?;
        std::fs::create_dir_all(object_dir).context(format!(
            "Unable to create object directory {}",
            object_dir.display()
        ))?;

        let temp_object_path = object_dir.join(Self::generate_temp_name());
        let object_content = Self::compress(object_content)?;

        let mut file = std::fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&temp_object_path)
            .context(format!(
                "Unable to open object file {}",
                temp_object_path.display()
            ))?;
        file.write_all(&object_content).context(format!(
            "Unable to write object file {}",
            temp_object_path.display()
        ))?;

        // rename the temp file to the object file to make the write atomic
        std::fs::rename(&temp_object_path, &object_path).context(format!(
            "Unable to rename object file to {}",
            object_path.display()
        ))?;

        Ok(())
    }

    fn compress(data: Bytes) -> anyhow::Result<Bytes> {
        let mut encoder =
            flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::default());
        encoder
            .write_all(&data)
            .context("Unable to compress object content")?;

        encoder
            .finish()
            .map(|compressed_content| compressed_content.into())
            .context("Unable to finish compressing object content")
    }

    fn decompress(data: Bytes) -> anyhow::Result<Bytes> {
        let mut decoder = flate2::read::ZlibDecoder::new(&*data);
        let mut decompressed_content = Vec::new();
        decoder
            .read_to_end(&mut decompressed_content)
            .context("Unable to decompress object content")?;

        Ok(decompressed_content.into())
    }

    fn generate_temp_name() -> String {
        format!("tmp-obj-{}", rand::random::<u32>())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::objects::commit::Snapshot;
    use assert_fs::TempDir;
    use rstest::{fixture, rstest};

    #[fixture]
    fn objects_dir() -> TempDir {
        TempDir::new().expect("Failed to create temp dir")
    }

    fn database(dir: &TempDir) -> Database {
        Database::new(dir.path().join("objects").into_boxed_path())
    }

    #[rstest]
    fn put_is_idempotent(objects_dir: TempDir) {
        let database = database(&objects_dir);
        let blob = Blob::new("hello".to_string());

        let first = database.put(&blob).unwrap();
        let second = database.put(&blob).unwrap();

        assert_eq!(first, second);
        assert_eq!(database.pending.borrow().len(), 1);

        database.flush().unwrap();
        assert!(database.pending.borrow().is_empty());
        assert!(objects_dir.path().join("objects").join(first.to_path()).exists());

        // storing again after a flush schedules nothing
        database.put(&blob).unwrap();
        database.flush().unwrap();
        assert_eq!(database.list_object_ids().unwrap().len(), 1);
    }

    #[rstest]
    fn commit_round_trips_through_persisted_storage(objects_dir: TempDir) {
        let writer = database(&objects_dir);

        let blob_oid = writer.put(&Blob::new("content".to_string())).unwrap();
        let snapshot = Snapshot::from([(std::path::PathBuf::from("a.txt"), blob_oid)]);
        let commit = Commit::new(None, snapshot.clone(), "first".to_string());
        let commit_oid = writer.put(&commit).unwrap();
        writer.flush().unwrap();

        // a fresh database sees only the persisted files
        let reader = database(&objects_dir);
        let loaded = reader.parse_commit(&commit_oid).unwrap();
        assert_eq!(loaded.snapshot(), &snapshot);
        assert_eq!(loaded.message(), "first");
    }

    #[rstest]
    fn missing_object_is_reported_as_not_found(objects_dir: TempDir) {
        let database = database(&objects_dir);
        let absent = ObjectId::try_parse("ab".repeat(20)).unwrap();

        let error = database.parse_blob(&absent).unwrap_err();
        assert!(matches!(
            error.downcast_ref::<RepoError>(),
            Some(RepoError::ObjectNotFound(_))
        ));
    }

    #[rstest]
    fn ambiguous_prefix_is_rejected(objects_dir: TempDir) {
        let database = database(&objects_dir);

        // generate blobs until two ids share a 2-character prefix
        let mut seen = std::collections::HashMap::<String, ObjectId>::new();
        let mut ambiguous_prefix = None;
        for i in 0..4096 {
            let oid = database.put(&Blob::new(format!("content {i}"))).unwrap();
            let prefix = oid.as_ref()[..2].to_string();
            if seen.insert(prefix.clone(), oid).is_some() {
                ambiguous_prefix = Some(prefix);
                break;
            }
        }

        let prefix = ambiguous_prefix.expect("no colliding prefix found");
        let error = database
            .find_by_prefix(ObjectType::Blob, &prefix)
            .unwrap_err();
        assert!(matches!(
            error.downcast_ref::<RepoError>(),
            Some(RepoError::AmbiguousReference(_))
        ));
    }

    #[rstest]
    fn unique_prefix_resolves_to_full_id(objects_dir: TempDir) {
        let database = database(&objects_dir);
        let oid = database.put(&Blob::new("solo".to_string())).unwrap();
        database.flush().unwrap();

        let found = database
            .find_by_prefix(ObjectType::Blob, &oid.to_short_oid())
            .unwrap();
        assert_eq!(found, oid);
    }
}
