//! Embedded full-text search over extracted vocabulary terms.
//!
//! This crate owns the persisted term index:
//!
//! - [`TermIndex`]: document add/delete/query/commit with per-scope
//!   isolation and delete-then-insert re-import
//! - prefix and qualified-name autocomplete semantics for the mapping
//!   editor (`foaf:na` matches `foaf:name`; `nam` matches it too via the
//!   local-part branch)
//! - commit-boundary visibility: searches read a snapshot that advances
//!   only at [`TermIndex::update`]
//! - format-incompatibility auto-recovery on open (the unreadable
//!   directory is moved aside, never deleted)
//!
//! # Example
//!
//! ```ignore
//! use rdfmap_search::TermIndex;
//!
//! let index = TermIndex::open(workdir.join("term-index").as_path())?;
//! index.add_terms("global", TermType::Class, &classes)?;
//! index.update()?;
//! let hits = index.search_classes("foaf:Per", "global")?;
//! ```

pub mod error;
pub mod index;
mod schema;

pub use error::{IndexError, Result};
pub use index::TermIndex;
