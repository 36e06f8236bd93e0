use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Backend error: `{command}` failed: {stderr}")]
    Backend {
        command: String,
        stderr: String,
        exit_code: Option<i32>,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed payload: {0}")]
    Format(String),

    #[error("Decryption failed: wrong password or corrupted data")]
    Decryption,

    #[error("Encryption failed: {0}")]
    Encryption(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Document not found: {0}")]
    NotFound(String),

    #[error("Invalid document name: {0:?}")]
    InvalidName(String),

    #[error("Document name is reserved: {0}")]
    ReservedName(String),

    #[error("Entry {entry_id} already exists in document {document}")]
    EntryExists { document: String, entry_id: String },

    #[error("Index operation failed: {0}")]
    Index(#[source] Box<Error>),

    #[error("Log operation on {document} failed: {source}")]
    Log {
        document: String,
        #[source]
        source: Box<Error>,
    },

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl Error {
    pub(crate) fn index(err: Error) -> Self {
        match err {
            Error::Index(_) => err,
            other => Error::Index(Box::new(other)),
        }
    }

    pub(crate) fn log(document: &str, err: Error) -> Self {
        match err {
            Error::Log { .. } => err,
            other => Error::Log {
                document: document.to_string(),
                source: Box::new(other),
            },
        }
    }

    /// Strips `Index` and `Log` wrappers down to the first underlying failure.
    pub fn root_cause(&self) -> &Error {
        match self {
            Error::Index(inner) => inner.root_cause(),
            Error::Log { source, .. } => source.root_cause(),
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_cause_unwraps_composites() {
        let err = Error::log("notes", Error::index(Error::Decryption));
        assert!(matches!(err.root_cause(), Error::Decryption));
        assert!(matches!(err, Error::Log { ref document, .. } if document == "notes"));
    }

    #[test]
    fn test_wrapping_is_not_nested_twice() {
        let err = Error::index(Error::index(Error::NotFound("a".into())));
        match err {
            Error::Index(inner) => assert!(matches!(*inner, Error::NotFound(_))),
            other => panic!("unexpected {other:?}"),
        }
    }
}
