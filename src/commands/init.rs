use crate::areas::repository::Repository;
use crate::areas::workspace::REPO_DIR_NAME;
use std::io::Write;

impl Repository {
    /// Report a freshly initialized repository. Directory and reference
    /// setup happens in `Repository::new`.
    pub fn init(&self) -> anyhow::Result<()> {
        writeln!(
            self.writer(),
            "Initialized empty kit repository in {}",
            self.path().join(REPO_DIR_NAME).display()
        )?;

        Ok(())
    }
}
