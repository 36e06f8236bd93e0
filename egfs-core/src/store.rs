use std::collections::HashSet;

use tracing::{info, warn};

use crate::backend::{Backend, GitBackend};
use crate::codec::{self, Key};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::fs::FileHandle;
use crate::index::DocumentIndex;
use crate::log;
use crate::models::{Document, Entry, ReconcileReport};
use crate::naming::{self, DEFAULT_PRIMARY_BRANCH};

/// Password-holding view of one repository checkout.
///
/// Writes are two-phase: the entry is committed on the document branch
/// first, then the index on the primary branch learns the name. A failure in
/// between leaves the document reachable only through [`Store::reconcile`].
pub struct Store<B: Backend> {
    backend: B,
    key: Key,
    primary: String,
}

impl Store<GitBackend> {
    pub fn from_config(config: &Config, password: &[u8]) -> Result<Self> {
        config.validate()?;
        Ok(Store::new(config.backend(), password).with_primary_branch(&config.primary_branch))
    }
}

impl<B: Backend> Store<B> {
    pub fn new(backend: B, password: &[u8]) -> Self {
        Self {
            backend,
            key: codec::derive_key(password),
            primary: DEFAULT_PRIMARY_BRANCH.to_string(),
        }
    }

    pub fn with_primary_branch(mut self, primary: &str) -> Self {
        self.primary = primary.to_string();
        self
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn index(&mut self) -> Result<DocumentIndex> {
        DocumentIndex::load(&mut self.backend, &self.key, &self.primary)
    }

    /// Commits an empty index when the primary branch has no history yet.
    /// Returns whether anything was written.
    pub fn initialize(&mut self) -> Result<bool> {
        let index = self.index()?;
        if self.backend.last_commit_time()?.is_some() {
            return Ok(false);
        }
        index.save(&mut self.backend, &self.key)?;
        info!(branch = %self.primary, "initialized empty index");
        Ok(true)
    }

    /// Appends `content` as a new entry stamped now.
    pub fn write(&mut self, name: &str, content: Vec<u8>) -> Result<Entry> {
        let index = self.index()?;
        index.validate(name)?;

        let entry = log::append_now(&mut self.backend, &self.key, name, content)?;
        self.register(index, name)?;
        Ok(entry)
    }

    /// Appends an entry with a caller-chosen timestamp.
    pub fn append(&mut self, name: &str, entry: &Entry) -> Result<()> {
        let index = self.index()?;
        index.validate(name)?;

        log::append(&mut self.backend, &self.key, name, entry)?;
        self.register(index, name)
    }

    fn register(&mut self, mut index: DocumentIndex, name: &str) -> Result<()> {
        if index.mark_present(name)? {
            index.save(&mut self.backend, &self.key)?;
            info!(document = name, "added document to index");
        }
        Ok(())
    }

    pub fn document(&mut self, name: &str) -> Result<Document> {
        self.require(name)?;
        Ok(Document {
            name: name.to_string(),
            entries: log::read_all(&mut self.backend, &self.key, name)?,
        })
    }

    pub fn open(&mut self, name: &str) -> Result<FileHandle> {
        self.require(name)?;
        self.assemble(name)
    }

    /// Every indexed document, sorted by name.
    pub fn list_all(&mut self) -> Result<Vec<FileHandle>> {
        let index = self.index()?;
        index.names().map(|name| self.assemble(name)).collect()
    }

    fn require(&mut self, name: &str) -> Result<()> {
        if self.index()?.contains(name) {
            Ok(())
        } else {
            Err(Error::NotFound(name.to_string()))
        }
    }

    fn assemble(&mut self, name: &str) -> Result<FileHandle> {
        let snapshot = log::snapshot(&mut self.backend, &self.key, name)?;

        let document = Document {
            name: name.to_string(),
            entries: snapshot.entries,
        };

        let mut content = snapshot.legacy.unwrap_or_default();
        content.extend(document.assemble());
        Ok(FileHandle::new(name, content, snapshot.last_commit))
    }

    /// Repairs the index after interrupted writes: every document branch whose
    /// name can be recovered from its entry commits is added. Nothing is
    /// removed; indexed names without a branch are only reported.
    pub fn reconcile(&mut self) -> Result<ReconcileReport> {
        let mut index = self.index()?;
        let mut report = ReconcileReport::default();

        let branches = self.backend.list_branches()?;
        let known: HashSet<String> = index.names().map(naming::branch_for).collect();

        for branch in branches.iter().filter(|b| **b != self.primary && !known.contains(*b)) {
            self.backend.switch_branch(branch, false)?;
            let recovered = self
                .backend
                .last_commit_message()?
                .and_then(|message| log::document_for_message(&message, &self.key))
                .filter(|name| naming::branch_for(name) == *branch);

            match recovered {
                Some(name) if index.validate(&name).is_ok() => {
                    index.mark_present(&name)?;
                    report.added.push(name);
                }
                _ => {
                    warn!(branch = %branch, "cannot recover document name for branch");
                    report.unrecognized.push(branch.clone());
                }
            }
        }

        let existing: HashSet<&String> = branches.iter().collect();
        report.missing_branches = index
            .names()
            .filter(|name| !existing.contains(&naming::branch_for(name)))
            .map(str::to_owned)
            .collect();

        if !report.added.is_empty() {
            index.save(&mut self.backend, &self.key)?;
        }

        info!(
            added = report.added.len(),
            unrecognized = report.unrecognized.len(),
            missing = report.missing_branches.len(),
            "reconciled index"
        );
        Ok(report)
    }
}
