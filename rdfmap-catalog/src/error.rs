//! Catalog error types.

use thiserror::Error;

/// Result type alias for catalog operations.
pub type Result<T> = std::result::Result<T, CatalogError>;

/// Failure in catalog persistence or a managed import.
///
/// Prefix conflicts are deliberately absent: adding an already-registered
/// prefix keeps the existing entry and is not an error.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// I/O failure against the catalog file or its rotation siblings.
    #[error("catalog i/o: {0}")]
    Io(#[from] std::io::Error),

    /// The persisted catalog could not be (de)serialized.
    #[error("catalog serialization: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A refresh named a prefix with no catalog registration.
    #[error("unknown vocabulary prefix {0:?}")]
    UnknownPrefix(String),

    /// A managed import failed. Batch paths log and skip these.
    #[error(transparent)]
    Import(#[from] rdfmap_ingest::ImportError),

    /// The term index failed. Always fatal.
    #[error(transparent)]
    Index(#[from] rdfmap_search::IndexError),
}
