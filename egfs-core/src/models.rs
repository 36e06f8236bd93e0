use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::naming;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub timestamp: DateTime<Utc>,
    pub content: Vec<u8>,
}

impl Entry {
    pub fn new(content: Vec<u8>) -> Self {
        Self {
            timestamp: Utc::now(),
            content,
        }
    }

    pub fn at(timestamp: DateTime<Utc>, content: Vec<u8>) -> Self {
        Self { timestamp, content }
    }

    /// File name of this entry on its document branch.
    pub fn id(&self) -> String {
        naming::entry_id_for(self.timestamp)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub name: String,
    pub entries: Vec<Entry>,
}

impl Document {
    pub fn branch(&self) -> String {
        naming::branch_for(&self.name)
    }

    /// Entry contents joined in chronological order.
    pub fn assemble(&self) -> Vec<u8> {
        self.entries.iter().flat_map(|e| e.content.iter().copied()).collect()
    }
}

/// Outcome of [`crate::Store::reconcile`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconcileReport {
    /// Documents found on a branch but missing from the index, now added.
    pub added: Vec<String>,
    /// Branches whose document name could not be recovered.
    pub unrecognized: Vec<String>,
    /// Indexed documents without a branch.
    pub missing_branches: Vec<String>,
}

impl ReconcileReport {
    pub fn is_clean(&self) -> bool {
        self.added.is_empty() && self.unrecognized.is_empty() && self.missing_branches.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_entry_id_matches_naming() {
        let t = Utc.timestamp_opt(1_700_000_000, 5).unwrap();
        let entry = Entry::at(t, b"hello".to_vec());
        assert_eq!(entry.id(), naming::entry_id_for(t));
    }

    #[test]
    fn test_document_assemble() {
        let doc = Document {
            name: "notes".to_string(),
            entries: vec![
                Entry::at(Utc.timestamp_opt(1, 0).unwrap(), b"Hello, ".to_vec()),
                Entry::at(Utc.timestamp_opt(2, 0).unwrap(), b"World!".to_vec()),
            ],
        };

        assert_eq!(doc.assemble(), b"Hello, World!");
        assert_eq!(doc.branch(), naming::branch_for("notes"));
    }

    #[test]
    fn test_empty_report_is_clean() {
        assert!(ReconcileReport::default().is_clean());
    }
}
