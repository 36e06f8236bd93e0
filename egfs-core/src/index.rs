//! Table of contents: the sealed set of document names kept on the primary
//! branch.

use std::collections::BTreeMap;

use tracing::{debug, info};

use crate::backend::Backend;
use crate::codec::{self, Key};
use crate::error::{Error, Result};
use crate::naming::{self, RESERVED_FILE};

pub const INDEX_COMMIT_MESSAGE: &str = "update index";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentIndex {
    primary: String,
    documents: BTreeMap<String, bool>,
}

impl DocumentIndex {
    pub fn new(primary: impl Into<String>) -> Self {
        Self {
            primary: primary.into(),
            documents: BTreeMap::new(),
        }
    }

    /// Reads the index from the primary branch. A repository that has never
    /// saved one yields an empty index.
    pub fn load<B: Backend + ?Sized>(backend: &mut B, key: &Key, primary: &str) -> Result<Self> {
        Self::read(backend, key, primary).map_err(Error::index)
    }

    fn read<B: Backend + ?Sized>(backend: &mut B, key: &Key, primary: &str) -> Result<Self> {
        backend.switch_branch(primary, true)?;

        let mut index = Self::new(primary);
        let Some(raw) = backend.read_file(RESERVED_FILE)? else {
            debug!("no index on {primary}, starting empty");
            return Ok(index);
        };

        let text = String::from_utf8(raw).map_err(|e| Error::Format(e.to_string()))?;
        let plaintext = codec::open(&text, key)?;
        index.documents = serde_json::from_slice(&plaintext)?;

        debug!("loaded index with {} documents", index.documents.len());
        Ok(index)
    }

    /// Switch, seal, write, stage, commit, push. The first failing step
    /// aborts and leaves whatever it already did in place.
    pub fn save<B: Backend + ?Sized>(&self, backend: &mut B, key: &Key) -> Result<()> {
        self.write(backend, key).map_err(Error::index)
    }

    fn write<B: Backend + ?Sized>(&self, backend: &mut B, key: &Key) -> Result<()> {
        backend.switch_branch(&self.primary, true)?;

        let plaintext = serde_json::to_vec(&self.documents)?;
        let sealed = codec::seal(&plaintext, key)?;
        backend.write_file(RESERVED_FILE, sealed.as_bytes())?;

        backend.stage_all()?;
        backend.commit(INDEX_COMMIT_MESSAGE)?;
        backend.push()?;

        info!("saved index with {} documents", self.documents.len());
        Ok(())
    }

    /// Returns `true` when the name was not already present.
    pub fn mark_present(&mut self, name: &str) -> Result<bool> {
        self.validate(name)?;
        Ok(self.documents.insert(name.to_string(), true) != Some(true))
    }

    pub fn validate(&self, name: &str) -> Result<()> {
        if name.is_empty() || name.contains('\0') {
            return Err(Error::InvalidName(name.to_string()));
        }
        if naming::is_reserved(name, &self.primary) {
            return Err(Error::ReservedName(name.to_string()));
        }
        Ok(())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.documents.get(name).copied().unwrap_or(false)
    }

    /// Present document names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.documents
            .iter()
            .filter(|(_, present)| **present)
            .map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.names().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn primary_branch(&self) -> &str {
        &self.primary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{MemoryBackend, Op};
    use crate::codec::derive_key;
    use crate::naming::DEFAULT_PRIMARY_BRANCH;

    fn setup() -> (MemoryBackend, Key) {
        (MemoryBackend::new(), derive_key(b"password"))
    }

    #[test]
    fn test_load_without_index_is_empty() {
        let (mut mem, key) = setup();
        let index = DocumentIndex::load(&mut mem, &key, DEFAULT_PRIMARY_BRANCH).unwrap();

        assert!(index.is_empty());
        assert_eq!(mem.current_branch(), Some(DEFAULT_PRIMARY_BRANCH));
    }

    #[test]
    fn test_save_and_load() {
        let (mut mem, key) = setup();
        let mut index = DocumentIndex::new(DEFAULT_PRIMARY_BRANCH);
        index.mark_present("notes").unwrap();
        index.mark_present("diary").unwrap();
        index.save(&mut mem, &key).unwrap();

        assert_eq!(mem.pushed_count(DEFAULT_PRIMARY_BRANCH), 1);

        let loaded = DocumentIndex::load(&mut mem, &key, DEFAULT_PRIMARY_BRANCH).unwrap();
        assert_eq!(loaded, index);
        assert_eq!(loaded.names().collect::<Vec<_>>(), vec!["diary", "notes"]);
    }

    #[test]
    fn test_loads_aes_gcm_index_from_older_stores() {
        let (mut mem, key) = setup();
        // {"notes":true} sealed with AES-256-GCM
        let sealed = "000102030405060708090a0b1188806327c7d425dd9279c43f365f424ac949a2cf7746a4557dfc243718";
        mem.switch_branch(DEFAULT_PRIMARY_BRANCH, true).unwrap();
        mem.write_file(RESERVED_FILE, sealed.as_bytes()).unwrap();
        mem.stage_all().unwrap();
        mem.commit("update").unwrap();

        let index = DocumentIndex::load(&mut mem, &key, DEFAULT_PRIMARY_BRANCH).unwrap();
        assert!(index.contains("notes"));
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn test_index_is_stored_encrypted() {
        let (mut mem, key) = setup();
        let mut index = DocumentIndex::new(DEFAULT_PRIMARY_BRANCH);
        index.mark_present("secret-plans").unwrap();
        index.save(&mut mem, &key).unwrap();

        let stored = &mem.committed_files(DEFAULT_PRIMARY_BRANCH).unwrap()[RESERVED_FILE];
        let text = String::from_utf8_lossy(stored);
        assert!(!text.contains("secret-plans"));
        assert!(text.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_mark_present_twice_keeps_one_entry() {
        let (mut mem, key) = setup();
        let mut index = DocumentIndex::load(&mut mem, &key, DEFAULT_PRIMARY_BRANCH).unwrap();

        assert!(index.mark_present("notes").unwrap());
        index.save(&mut mem, &key).unwrap();

        let mut index = DocumentIndex::load(&mut mem, &key, DEFAULT_PRIMARY_BRANCH).unwrap();
        assert!(!index.mark_present("notes").unwrap());
        index.save(&mut mem, &key).unwrap();

        let index = DocumentIndex::load(&mut mem, &key, DEFAULT_PRIMARY_BRANCH).unwrap();
        assert_eq!(index.len(), 1);
        assert!(index.contains("notes"));
    }

    #[test]
    fn test_reserved_and_invalid_names() {
        let mut index = DocumentIndex::new(DEFAULT_PRIMARY_BRANCH);

        assert!(matches!(index.mark_present("master"), Err(Error::ReservedName(_))));
        assert!(matches!(index.mark_present(RESERVED_FILE), Err(Error::ReservedName(_))));
        assert!(matches!(index.mark_present(""), Err(Error::InvalidName(_))));
        assert!(index.is_empty());
    }

    #[test]
    fn test_wrong_password_is_decryption_error() {
        let (mut mem, key) = setup();
        let mut index = DocumentIndex::new(DEFAULT_PRIMARY_BRANCH);
        index.mark_present("notes").unwrap();
        index.save(&mut mem, &key).unwrap();

        let err = DocumentIndex::load(&mut mem, &derive_key(b"nope"), DEFAULT_PRIMARY_BRANCH)
            .unwrap_err();
        assert!(matches!(err, Error::Index(_)));
        assert!(matches!(err.root_cause(), Error::Decryption));
    }

    #[test]
    fn test_corrupt_index_is_format_error() {
        let (mut mem, key) = setup();
        mem.switch_branch(DEFAULT_PRIMARY_BRANCH, true).unwrap();
        mem.write_file(RESERVED_FILE, b"zz-not-hex").unwrap();
        mem.stage_all().unwrap();
        mem.commit("garbage").unwrap();

        let err = DocumentIndex::load(&mut mem, &key, DEFAULT_PRIMARY_BRANCH).unwrap_err();
        assert!(matches!(err.root_cause(), Error::Format(_)));
    }

    #[test]
    fn test_undecodable_plaintext_is_serialization_error() {
        let (mut mem, key) = setup();
        mem.switch_branch(DEFAULT_PRIMARY_BRANCH, true).unwrap();
        let sealed = codec::seal(b"[1, 2, 3]", &key).unwrap();
        mem.write_file(RESERVED_FILE, sealed.as_bytes()).unwrap();
        mem.stage_all().unwrap();
        mem.commit("wrong shape").unwrap();

        let err = DocumentIndex::load(&mut mem, &key, DEFAULT_PRIMARY_BRANCH).unwrap_err();
        assert!(matches!(err.root_cause(), Error::Serialization(_)));
    }

    #[test]
    fn test_push_failure_leaves_local_commit() {
        let (mut mem, key) = setup();
        mem.fail_on(Op::Push);

        let mut index = DocumentIndex::new(DEFAULT_PRIMARY_BRANCH);
        index.mark_present("notes").unwrap();
        let err = index.save(&mut mem, &key).unwrap_err();

        assert!(matches!(err.root_cause(), Error::Backend { .. }));
        assert_eq!(mem.commit_count(DEFAULT_PRIMARY_BRANCH), 1);
        assert_eq!(mem.pushed_count(DEFAULT_PRIMARY_BRANCH), 0);
    }
}
