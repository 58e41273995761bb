//! Import error types.
//!
//! An [`ImportError`] always names the vocabulary namespace that failed;
//! the [`ImportErrorKind`] underneath distinguishes fetch, I/O, parse, and
//! unsupported-serialization failures. Batch callers (bootstrap, bulk
//! refresh) log these and continue; request-path callers propagate them.

use crate::format::RdfFormat;
use rdfmap_core::LocationType;
use thiserror::Error;

/// Result type alias for import operations.
pub type Result<T> = std::result::Result<T, ImportError>;

/// Failure to import one vocabulary.
#[derive(Debug, Error)]
#[error("importing vocabulary <{namespace}>: {kind}")]
pub struct ImportError {
    /// Namespace of the vocabulary whose import failed.
    pub namespace: String,
    #[source]
    pub kind: ImportErrorKind,
}

impl ImportError {
    pub fn new(namespace: impl Into<String>, kind: ImportErrorKind) -> ImportError {
        ImportError {
            namespace: namespace.into(),
            kind,
        }
    }
}

/// The underlying cause of an [`ImportError`].
#[derive(Debug, Error)]
pub enum ImportErrorKind {
    /// Transport-level failure (connect, timeout, redirect cap, TLS).
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The remote answered with a non-success status.
    #[error("unexpected http status {status} from {url}")]
    Status { status: u16, url: String },

    /// Local file I/O failure.
    #[error("i/o failure: {0}")]
    Io(#[from] std::io::Error),

    /// The payload could not be parsed in the negotiated serialization.
    #[error("cannot parse {format} content: {message}")]
    Parse { format: RdfFormat, message: String },

    /// The serialization is representable in the catalog but has no
    /// in-process parser (JSON-LD, RDF/JSON, TriX, binary RDF).
    #[error("no parser available for {0} content")]
    Unsupported(LocationType),
}
