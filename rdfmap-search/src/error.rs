//! Index error types.

use thiserror::Error;

/// Result type alias for index operations.
pub type Result<T> = std::result::Result<T, IndexError>;

/// Failure against the persisted term index.
///
/// The format-incompatibility case on open is handled internally by
/// relocating the index directory; everything surfacing here is fatal to
/// the operation that hit it.
#[derive(Debug, Error)]
pub enum IndexError {
    /// A scoped delete or synchronize was called with an empty scope. An
    /// empty scope must never be widened to "all scopes".
    #[error("scope is required: refusing to address every scope")]
    ScopeRequired,

    /// The scope is not a valid project identifier.
    #[error("invalid project scope {0:?}: expected a decimal-digit id")]
    InvalidScope(String),

    /// Error from the embedded search engine.
    #[error("search engine error: {0}")]
    Engine(#[from] tantivy::TantivyError),

    /// I/O failure against the index directory.
    #[error("index i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// The single index writer's lock was poisoned by a panicking thread.
    #[error("index writer lock poisoned")]
    WriterPoisoned,
}
