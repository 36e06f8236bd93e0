//! Per-document append-only logs.
//!
//! Each document owns the branch `branch_for(name)`. Every entry is one
//! sealed file named by its entry identifier; nothing on the branch is ever
//! rewritten. Appending does not touch the index.

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, info};

use crate::backend::Backend;
use crate::codec::{self, Key};
use crate::error::{Error, Result};
use crate::models::Entry;
use crate::naming::{self, RESERVED_FILE};

const ENTRY_COMMIT_PREFIX: &str = "entry";

/// Everything the read path needs from one document branch.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub entries: Vec<Entry>,
    /// Single-file content written by earlier versions of the store.
    pub legacy: Option<Vec<u8>>,
    pub last_commit: Option<DateTime<Utc>>,
}

pub fn append<B: Backend + ?Sized>(
    backend: &mut B,
    key: &Key,
    document: &str,
    entry: &Entry,
) -> Result<()> {
    checkout(backend, document)
        .and_then(|files| commit_entry(backend, key, document, entry, &files))
        .map_err(|e| Error::log(document, e))
}

/// Appends `content` stamped strictly after the newest entry already on the
/// branch, so two quick writes never share an identifier.
pub fn append_now<B: Backend + ?Sized>(
    backend: &mut B,
    key: &Key,
    document: &str,
    content: Vec<u8>,
) -> Result<Entry> {
    let files = checkout(backend, document).map_err(|e| Error::log(document, e))?;

    let mut timestamp = Utc::now();
    if let Some(latest) = files.iter().filter_map(|f| naming::parse_entry_id(f)).max() {
        if timestamp <= latest {
            // nothing sorts after the newest entry once it sits at the end of time
            timestamp = latest
                .checked_add_signed(Duration::nanoseconds(1))
                .ok_or_else(|| {
                    Error::log(
                        document,
                        Error::EntryExists {
                            document: document.to_string(),
                            entry_id: naming::entry_id_for(latest),
                        },
                    )
                })?;
        }
    }

    let entry = Entry::at(timestamp, content);
    commit_entry(backend, key, document, &entry, &files).map_err(|e| Error::log(document, e))?;
    Ok(entry)
}

/// Entries of `document` in chronological order. Files that are not entry
/// identifiers are skipped; the first entry that fails to open aborts.
pub fn read_all<B: Backend + ?Sized>(
    backend: &mut B,
    key: &Key,
    document: &str,
) -> Result<Vec<Entry>> {
    read_all_inner(backend, key, document).map_err(|e| Error::log(document, e))
}

fn read_all_inner<B: Backend + ?Sized>(
    backend: &mut B,
    key: &Key,
    document: &str,
) -> Result<Vec<Entry>> {
    backend.switch_branch(&naming::branch_for(document), false)?;
    read_entries(backend, key)
}

pub fn snapshot<B: Backend + ?Sized>(
    backend: &mut B,
    key: &Key,
    document: &str,
) -> Result<Snapshot> {
    let inner = |backend: &mut B| -> Result<Snapshot> {
        let entries = read_all_inner(backend, key, document)?;
        let legacy = match backend.read_file(RESERVED_FILE)? {
            Some(raw) => Some(open_file(RESERVED_FILE, raw, key)?),
            None => None,
        };
        Ok(Snapshot {
            entries,
            legacy,
            last_commit: backend.last_commit_time()?,
        })
    };
    inner(backend).map_err(|e| Error::log(document, e))
}

/// Recovers the document name from an entry commit message.
pub fn document_for_message(message: &str, key: &Key) -> Option<String> {
    let mut parts = message.split_whitespace();
    if parts.next()? != ENTRY_COMMIT_PREFIX {
        return None;
    }
    naming::parse_entry_id(parts.next()?)?;
    let name = codec::open(parts.next()?, key).ok()?;
    String::from_utf8(name).ok()
}

fn checkout<B: Backend + ?Sized>(backend: &mut B, document: &str) -> Result<Vec<String>> {
    backend.switch_branch(&naming::branch_for(document), true)?;
    backend.list_files()
}

fn commit_entry<B: Backend + ?Sized>(
    backend: &mut B,
    key: &Key,
    document: &str,
    entry: &Entry,
    existing: &[String],
) -> Result<()> {
    let id = entry.id();
    if existing.iter().any(|f| *f == id) {
        return Err(Error::EntryExists {
            document: document.to_string(),
            entry_id: id,
        });
    }

    let sealed = codec::seal(&entry.content, key)?;
    backend.write_file(&id, sealed.as_bytes())?;
    backend.stage_all()?;

    let sealed_name = codec::seal(document.as_bytes(), key)?;
    backend.commit(&format!("{ENTRY_COMMIT_PREFIX} {id} {sealed_name}"))?;
    backend.push()?;

    info!(entry = %id, bytes = entry.content.len(), "appended entry");
    Ok(())
}

fn read_entries<B: Backend + ?Sized>(backend: &mut B, key: &Key) -> Result<Vec<Entry>> {
    let mut entries = Vec::new();

    for file in backend.list_files()? {
        let Some(timestamp) = naming::parse_entry_id(&file) else {
            debug!("skipping non-entry file {file}");
            continue;
        };
        let raw = backend
            .read_file(&file)?
            .ok_or_else(|| Error::Format(format!("tracked entry {file} missing from checkout")))?;
        entries.push(Entry::at(timestamp, open_file(&file, raw, key)?));
    }

    entries.sort_by_key(|e| e.timestamp);
    Ok(entries)
}

fn open_file(name: &str, raw: Vec<u8>, key: &Key) -> Result<Vec<u8>> {
    let text = String::from_utf8(raw).map_err(|e| Error::Format(format!("{name}: {e}")))?;
    codec::open(&text, key)
}
