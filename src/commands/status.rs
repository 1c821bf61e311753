use crate::areas::repository::Repository;
use std::io::Write;

impl Repository {
    /// Show branches (current starred), staged files, files staged for
    /// removal, and untracked files.
    pub fn status(&self) -> anyhow::Result<()> {
        let current_branch = self.refs().current_branch()?;
        let branches = self.refs().list_branches()?;

        let index = self.index();
        let staged = index
            .added()
            .iter()
            .chain(index.modified().iter())
            .collect::<std::collections::BTreeSet<_>>();
        let untracked = self
            .workspace()
            .list_files()?
            .into_iter()
            .filter(|path| !index.is_tracked(path))
            .collect::<Vec<_>>();

        let mut writer = self.writer();

        writeln!(writer, "=== Branches ===")?;
        for branch in &branches {
            if *branch == current_branch {
                writeln!(writer, "*{branch}")?;
            } else {
                writeln!(writer, "{branch}")?;
            }
        }
        writeln!(writer)?;

        writeln!(writer, "=== Staged Files ===")?;
        for path in &staged {
            writeln!(writer, "{}", path.display())?;
        }
        writeln!(writer)?;

        writeln!(writer, "=== Removed Files ===")?;
        for path in index.removed() {
            writeln!(writer, "{}", path.display())?;
        }
        writeln!(writer)?;

        writeln!(writer, "=== Untracked Files ===")?;
        for path in &untracked {
            writeln!(writer, "{}", path.display())?;
        }
        writeln!(writer)?;

        Ok(())
    }
}
