use crate::areas::repository::Repository;
use crate::artifacts::core::RepoError;
use crate::artifacts::objects::blob::Blob;
use std::path::Path;

impl Repository {
    /// Stage a file's current content for the next commit.
    ///
    /// Hashing happens here: the content becomes a blob in the object store
    /// and the index maps the path to the blob id. Re-adding an unchanged
    /// file is a no-op because the hash proves nothing changed.
    pub fn add(&self, path: &str) -> anyhow::Result<()> {
        let path = Path::new(path);

        if !self.workspace().contains(path) {
            return Err(RepoError::UserInput("File does not exist.".to_string()).into());
        }

        let content = self.workspace().read_file(path)?;
        let blob_oid = self.database().put(&Blob::new(content))?;
        self.index().add(path.to_path_buf(), blob_oid);

        Ok(())
    }
}
