use crate::areas::repository::Repository;
use std::path::Path;

impl Repository {
    /// Unstage a file and, when the current commit tracks it, schedule its
    /// removal from the next commit and delete the working-tree copy.
    ///
    /// A path that is neither staged nor committed has no reason to be
    /// removed; the index reports that as an error.
    pub fn rm(&self, path: &str) -> anyhow::Result<()> {
        let path = Path::new(path);

        let committed = match self.refs().read_head()? {
            Some(head_oid) => self
                .database()
                .parse_commit(&head_oid)?
                .blob_oid(path)
                .is_some(),
            None => false,
        };

        self.index().remove(path, committed)?;

        if committed {
            self.workspace().remove_file(path)?;
        }

        Ok(())
    }
}
