//! Where things live in the repository: one branch per document, one file
//! per entry.

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};

/// Branch holding the index unless the config says otherwise.
pub const DEFAULT_PRIMARY_BRANCH: &str = "master";

/// Holds the sealed index on the primary branch and a whole legacy document
/// on a document branch.
pub const RESERVED_FILE: &str = "file";

const ENTRY_ID_BYTES: usize = 12;
const SIGN_BIT: u64 = 1 << 63;

pub fn branch_for(document: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(document.as_bytes());
    hex::encode(hasher.finalize())
}

/// Seconds (sign bit flipped) then nanoseconds, both big-endian, so that
/// identifiers sort lexicographically in time order.
pub fn entry_id_for(timestamp: DateTime<Utc>) -> String {
    let secs = (timestamp.timestamp() as u64) ^ SIGN_BIT;
    let nanos = timestamp.timestamp_subsec_nanos();

    let mut bytes = [0u8; ENTRY_ID_BYTES];
    bytes[..8].copy_from_slice(&secs.to_be_bytes());
    bytes[8..].copy_from_slice(&nanos.to_be_bytes());
    hex::encode(bytes)
}

/// Returns `None` for anything that is not a canonical entry identifier.
pub fn parse_entry_id(id: &str) -> Option<DateTime<Utc>> {
    if id.len() != ENTRY_ID_BYTES * 2
        || !id.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
    {
        return None;
    }

    let bytes = hex::decode(id).ok()?;
    let secs = u64::from_be_bytes(bytes[..8].try_into().ok()?) ^ SIGN_BIT;
    let nanos = u32::from_be_bytes(bytes[8..].try_into().ok()?);

    let timestamp = DateTime::from_timestamp(secs as i64, nanos)?;
    (entry_id_for(timestamp) == id).then_some(timestamp)
}

/// Names that would collide with the storage layout itself.
pub fn is_reserved(document: &str, primary_branch: &str) -> bool {
    document == primary_branch || document == RESERVED_FILE
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    #[test]
    fn test_branch_for_is_stable_hex() {
        let branch = branch_for("notes");
        assert_eq!(branch.len(), 64);
        assert_eq!(branch, branch_for("notes"));
        assert_ne!(branch, branch_for("notes2"));
        assert_ne!(branch, DEFAULT_PRIMARY_BRANCH);
    }

    #[test]
    fn test_entry_id_round_trip() {
        let samples = [
            Utc.timestamp_opt(0, 0).unwrap(),
            Utc.timestamp_opt(1_700_000_000, 123_456_789).unwrap(),
            Utc.timestamp_opt(-86_400 * 365, 999_999_999).unwrap(),
            DateTime::<Utc>::MIN_UTC,
            DateTime::<Utc>::MAX_UTC,
            Utc::now(),
        ];

        for t in samples {
            let id = entry_id_for(t);
            assert_eq!(id.len(), 24);
            assert_eq!(parse_entry_id(&id), Some(t));
        }
    }

    #[test]
    fn test_entry_ids_sort_chronologically() {
        let base = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        let mut times = vec![
            base,
            base + Duration::nanoseconds(1),
            base - Duration::seconds(1),
            base + Duration::seconds(256),
            Utc.timestamp_opt(-5, 10).unwrap(),
            Utc.timestamp_opt(0, 0).unwrap(),
        ];

        let mut ids: Vec<String> = times.iter().map(|t| entry_id_for(*t)).collect();
        ids.sort();
        times.sort();

        let decoded: Vec<_> = ids.iter().map(|id| parse_entry_id(id).unwrap()).collect();
        assert_eq!(decoded, times);
    }

    #[test]
    fn test_parse_rejects_non_entry_names() {
        assert_eq!(parse_entry_id(RESERVED_FILE), None);
        assert_eq!(parse_entry_id(""), None);
        assert_eq!(parse_entry_id(".gitkeep"), None);
        assert_eq!(parse_entry_id(&"0".repeat(23)), None);
        assert_eq!(parse_entry_id(&"g".repeat(24)), None);

        let upper = entry_id_for(Utc::now()).to_uppercase();
        assert_eq!(parse_entry_id(&upper), None);

        // nanoseconds far out of range
        assert_eq!(parse_entry_id("8000000000000000ffffffff"), None);
    }

    #[test]
    fn test_reserved_names() {
        assert!(is_reserved("master", DEFAULT_PRIMARY_BRANCH));
        assert!(is_reserved(RESERVED_FILE, DEFAULT_PRIMARY_BRANCH));
        assert!(is_reserved("main", "main"));
        assert!(!is_reserved("notes", DEFAULT_PRIMARY_BRANCH));
    }
}
