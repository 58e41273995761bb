//! Vocabulary import for rdfmap: fetch, parse, and extract typed terms.
//!
//! The pipeline is:
//!
//! 1. [`fetch`] - a blocking HTTP GET with bounded timeouts, a bounded
//!    redirect count, and RDF content negotiation
//! 2. [`Dataset`] - the fetched (or uploaded) payload parsed into an
//!    in-memory statement list
//! 3. [`TermExtractor`] - two fixed graph queries over the dataset pulling
//!    class and property terms anchored to the requested namespace, with
//!    label/description fallback selection
//!
//! Extraction is all-or-nothing: a failure anywhere surfaces as an
//! [`ImportError`] carrying the namespace and the underlying cause, and
//! never yields partially populated term lists.

pub mod dataset;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod format;

pub use dataset::{Dataset, Literal, Node, Object, Statement};
pub use error::{ImportError, ImportErrorKind, Result};
pub use extract::{ExtractedTerms, TermExtractor, TermSource};
pub use fetch::HttpConfig;
pub use format::RdfFormat;
