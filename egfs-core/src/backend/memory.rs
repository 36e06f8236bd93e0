//! In-process branch model for tests and ephemeral stores.
//!
//! Mirrors the git semantics the store relies on: branches exist once they
//! have a commit, switching discards the working tree, committing an
//! unchanged tree fails. Any operation can be made to fail on demand.

use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, Utc};

use super::Backend;
use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    Switch,
    Stage,
    Commit,
    Push,
    ListFiles,
    ListBranches,
    Read,
    Write,
}

type Tree = BTreeMap<String, Vec<u8>>;

#[derive(Debug, Clone, Default)]
struct Branch {
    files: Tree,
    commits: Vec<(DateTime<Utc>, String)>,
    pushed: usize,
}

#[derive(Debug, Default)]
pub struct MemoryBackend {
    branches: BTreeMap<String, Branch>,
    current: Option<String>,
    worktree: Tree,
    staged: Tree,
    failing: HashSet<Op>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every later call of `op` fails with [`Error::Backend`] until cleared.
    pub fn fail_on(&mut self, op: Op) {
        self.failing.insert(op);
    }

    pub fn clear_failures(&mut self) {
        self.failing.clear();
    }

    pub fn current_branch(&self) -> Option<&str> {
        self.current.as_deref()
    }

    /// Committed files of `branch`, regardless of what is checked out.
    pub fn committed_files(&self, branch: &str) -> Option<&BTreeMap<String, Vec<u8>>> {
        self.branches.get(branch).map(|b| &b.files)
    }

    pub fn commit_count(&self, branch: &str) -> usize {
        self.branches.get(branch).map_or(0, |b| b.commits.len())
    }

    pub fn pushed_count(&self, branch: &str) -> usize {
        self.branches.get(branch).map_or(0, |b| b.pushed)
    }

    fn check(&self, op: Op) -> Result<()> {
        if self.failing.contains(&op) {
            return Err(Error::Backend {
                command: format!("{op:?}"),
                stderr: "injected failure".to_string(),
                exit_code: None,
            });
        }
        Ok(())
    }

    fn checked_out(&self) -> Result<&str> {
        self.current.as_deref().ok_or_else(|| Error::Backend {
            command: "HEAD".to_string(),
            stderr: "no branch checked out".to_string(),
            exit_code: None,
        })
    }

    fn head(&self) -> Option<&Branch> {
        self.current.as_ref().and_then(|name| self.branches.get(name))
    }
}

impl Backend for MemoryBackend {
    fn switch_branch(&mut self, branch: &str, create: bool) -> Result<()> {
        self.check(Op::Switch)?;

        let files = match self.branches.get(branch) {
            Some(existing) => existing.files.clone(),
            None if create => Tree::new(),
            None => {
                return Err(Error::Backend {
                    command: format!("checkout {branch}"),
                    stderr: format!("branch {branch} does not exist"),
                    exit_code: None,
                })
            }
        };

        self.worktree = files.clone();
        self.staged = files;
        self.current = Some(branch.to_string());
        Ok(())
    }

    fn stage_all(&mut self) -> Result<()> {
        self.check(Op::Stage)?;
        self.checked_out()?;
        self.staged = self.worktree.clone();
        Ok(())
    }

    fn commit(&mut self, message: &str) -> Result<()> {
        self.check(Op::Commit)?;
        let name = self.checked_out()?.to_string();

        let unchanged = match self.branches.get(&name) {
            Some(branch) => branch.files == self.staged,
            None => self.staged.is_empty(),
        };
        if unchanged {
            return Err(Error::Backend {
                command: "commit".to_string(),
                stderr: "nothing to commit".to_string(),
                exit_code: Some(1),
            });
        }

        let branch = self.branches.entry(name).or_default();
        branch.files = self.staged.clone();
        branch.commits.push((Utc::now(), message.to_string()));
        Ok(())
    }

    fn push(&mut self) -> Result<()> {
        self.check(Op::Push)?;
        let name = self.checked_out()?.to_string();

        match self.branches.get_mut(&name) {
            Some(branch) => {
                branch.pushed = branch.commits.len();
                Ok(())
            }
            None => Err(Error::Backend {
                command: "push".to_string(),
                stderr: format!("src refspec {name} does not match any"),
                exit_code: Some(1),
            }),
        }
    }

    fn list_files(&mut self) -> Result<Vec<String>> {
        self.check(Op::ListFiles)?;
        Ok(self.staged.keys().cloned().collect())
    }

    fn list_branches(&mut self) -> Result<Vec<String>> {
        self.check(Op::ListBranches)?;
        Ok(self.branches.keys().cloned().collect())
    }

    fn last_commit_time(&mut self) -> Result<Option<DateTime<Utc>>> {
        Ok(self.head().and_then(|b| b.commits.last()).map(|(t, _)| *t))
    }

    fn last_commit_message(&mut self) -> Result<Option<String>> {
        Ok(self
            .head()
            .and_then(|b| b.commits.last())
            .map(|(_, m)| m.clone()))
    }

    fn read_file(&mut self, name: &str) -> Result<Option<Vec<u8>>> {
        self.check(Op::Read)?;
        Ok(self.worktree.get(name).cloned())
    }

    fn write_file(&mut self, name: &str, contents: &[u8]) -> Result<()> {
        self.check(Op::Write)?;
        self.checked_out()?;
        self.worktree.insert(name.to_string(), contents.to_vec());
        Ok(())
    }
}
