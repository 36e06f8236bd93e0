//! Version-control operations against a single working directory.
//!
//! A [`Backend`] is the only handle to the checkout. It is passed by `&mut`
//! into every index and log operation, so at any instant exactly one branch
//! is materialized and only the owner of the handle can move it. Calls are
//! blocking and never retried here.

mod git;
mod memory;

pub use git::GitBackend;
pub use memory::{MemoryBackend, Op};

use crate::error::Result;
use chrono::{DateTime, Utc};

pub trait Backend {
    /// Force-checkout `branch`, discarding working-tree edits. With `create`
    /// set, a branch that does not exist yet is started empty.
    fn switch_branch(&mut self, branch: &str, create: bool) -> Result<()>;

    fn stage_all(&mut self) -> Result<()>;

    fn commit(&mut self, message: &str) -> Result<()>;

    fn push(&mut self) -> Result<()>;

    /// Tracked files of the checked-out branch.
    fn list_files(&mut self) -> Result<Vec<String>>;

    fn list_branches(&mut self) -> Result<Vec<String>>;

    /// `None` when the checked-out branch has no commits yet.
    fn last_commit_time(&mut self) -> Result<Option<DateTime<Utc>>>;

    fn last_commit_message(&mut self) -> Result<Option<String>>;

    fn read_file(&mut self, name: &str) -> Result<Option<Vec<u8>>>;

    fn write_file(&mut self, name: &str, contents: &[u8]) -> Result<()>;
}

impl<B: Backend + ?Sized> Backend for Box<B> {
    fn switch_branch(&mut self, branch: &str, create: bool) -> Result<()> {
        (**self).switch_branch(branch, create)
    }

    fn stage_all(&mut self) -> Result<()> {
        (**self).stage_all()
    }

    fn commit(&mut self, message: &str) -> Result<()> {
        (**self).commit(message)
    }

    fn push(&mut self) -> Result<()> {
        (**self).push()
    }

    fn list_files(&mut self) -> Result<Vec<String>> {
        (**self).list_files()
    }

    fn list_branches(&mut self) -> Result<Vec<String>> {
        (**self).list_branches()
    }

    fn last_commit_time(&mut self) -> Result<Option<DateTime<Utc>>> {
        (**self).last_commit_time()
    }

    fn last_commit_message(&mut self) -> Result<Option<String>> {
        (**self).last_commit_message()
    }

    fn read_file(&mut self, name: &str) -> Result<Option<Vec<u8>>> {
        (**self).read_file(name)
    }

    fn write_file(&mut self, name: &str, contents: &[u8]) -> Result<()> {
        (**self).write_file(name, contents)
    }
}
