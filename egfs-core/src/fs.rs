//! Read-only file view over decrypted documents, for hosts that serve files.

use std::io::{self, Cursor, Read, Seek, SeekFrom};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileStat {
    pub name: String,
    pub size: u64,
    pub mod_time: Option<DateTime<Utc>>,
    pub is_dir: bool,
}

/// A fully decrypted document. Reads never touch the repository again.
#[derive(Debug, Clone)]
pub struct FileHandle {
    name: String,
    mod_time: Option<DateTime<Utc>>,
    content: Cursor<Vec<u8>>,
}

impl FileHandle {
    pub fn new(name: impl Into<String>, content: Vec<u8>, mod_time: Option<DateTime<Utc>>) -> Self {
        Self {
            name: name.into(),
            mod_time,
            content: Cursor::new(content),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn stat(&self) -> FileStat {
        FileStat {
            name: self.name.clone(),
            size: self.content.get_ref().len() as u64,
            mod_time: self.mod_time,
            is_dir: false,
        }
    }

    /// Whole content regardless of the read position.
    pub fn content(&self) -> &[u8] {
        self.content.get_ref()
    }

    pub fn into_content(self) -> Vec<u8> {
        self.content.into_inner()
    }

    pub fn close(self) -> io::Result<()> {
        Ok(())
    }
}

impl Read for FileHandle {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.content.read(buf)
    }
}

impl Seek for FileHandle {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.content.seek(pos)
    }
}
