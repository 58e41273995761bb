//! Shared data model for the rdfmap vocabulary engine.
//!
//! This crate defines the types every other rdfmap crate speaks:
//!
//! - [`Term`] / [`TermType`] - an ontology class or property extracted from a
//!   vocabulary, with its IRI decomposed into prefix/namespace/local part
//! - [`Vocabulary`] / [`LocationType`] - a catalog registration describing
//!   where a vocabulary lives and how its source is serialized
//! - the scope contract ([`GLOBAL_SCOPE`], [`is_project_scope`]) separating
//!   per-project term sets from the shared baseline
//!
//! It carries no I/O; extraction, indexing, and persistence live in the
//! sibling crates.

pub mod scope;
pub mod term;
pub mod vocabulary;

pub use scope::{is_project_scope, GLOBAL_SCOPE};
pub use term::{Term, TermType};
pub use vocabulary::{LocationType, Vocabulary};
