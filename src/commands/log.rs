use crate::areas::repository::Repository;
use crate::artifacts::core::RepoError;
use crate::artifacts::log::history;
use crate::artifacts::objects::commit::Commit;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use colored::Colorize;
use std::io::Write;

impl Repository {
    /// Show the current branch's history, newest first.
    pub fn log(&self) -> anyhow::Result<()> {
        let Some(head_oid) = self.refs().read_head()? else {
            return Ok(());
        };

        for commit_oid in history(self.database(), &head_oid)? {
            let commit = self.database().parse_commit(&commit_oid)?;
            self.print_commit(&commit_oid, &commit)?;
        }

        Ok(())
    }

    /// Show every commit in the object store, in no particular order.
    pub fn global_log(&self) -> anyhow::Result<()> {
        for object_id in self.database().list_object_ids()? {
            if self.database().object_type_of(&object_id)? == ObjectType::Commit {
                let commit = self.database().parse_commit(&object_id)?;
                self.print_commit(&object_id, &commit)?;
            }
        }

        Ok(())
    }

    /// Print the ids of every commit whose message matches exactly.
    pub fn find(&self, message: &str) -> anyhow::Result<()> {
        let mut found = false;

        for object_id in self.database().list_object_ids()? {
            if self.database().object_type_of(&object_id)? == ObjectType::Commit
                && self.database().parse_commit(&object_id)?.message() == message
            {
                writeln!(self.writer(), "{object_id}")?;
                found = true;
            }
        }

        if !found {
            return Err(RepoError::ReferenceNotFound(
                "Found no commit with that message.".to_string(),
            )
            .into());
        }

        Ok(())
    }

    fn print_commit(&self, commit_oid: &ObjectId, commit: &Commit) -> anyhow::Result<()> {
        let mut writer = self.writer();

        writeln!(writer, "===")?;
        writeln!(writer, "{}", format!("commit {commit_oid}").yellow())?;
        writeln!(writer, "Date: {}", commit.readable_timestamp())?;
        writeln!(writer, "{}", commit.message())?;
        writeln!(writer)?;

        Ok(())
    }
}
