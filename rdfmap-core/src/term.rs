//! Ontology terms: the unit stored in and returned from the term index.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Whether a term names a class or a property.
///
/// The index stores both kinds side by side and treats them identically
/// except for this tag, which every search filters on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TermType {
    Class,
    Property,
}

impl TermType {
    /// Stable string form used as the index filter value.
    pub fn as_str(&self) -> &'static str {
        match self {
            TermType::Class => "class",
            TermType::Property => "property",
        }
    }

    /// Inverse of [`TermType::as_str`].
    pub fn parse(s: &str) -> Option<TermType> {
        match s {
            "class" => Some(TermType::Class),
            "property" => Some(TermType::Property),
            _ => None,
        }
    }
}

impl fmt::Display for TermType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A class or property extracted from a vocabulary.
///
/// `iri` is the identity of the term within a `(scope, term_type)` pair.
/// `label` falls back to the IRI when the source supplies none, and
/// `local_part` is derived from the IRI (see [`local_part_of`]).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Term {
    pub iri: String,
    pub label: String,
    pub description: String,
    pub prefix: String,
    pub namespace: String,
    pub local_part: String,
    pub term_type: TermType,
}

impl Term {
    /// Build a term from extraction output, deriving `label` and
    /// `local_part` defaults.
    ///
    /// If `namespace` is non-empty it must be a literal string prefix of
    /// `iri`; a violation is logged (the local part may then be wrong) but
    /// is not fatal.
    pub fn new(
        iri: impl Into<String>,
        label: Option<String>,
        description: Option<String>,
        prefix: impl Into<String>,
        namespace: impl Into<String>,
        term_type: TermType,
    ) -> Term {
        let iri = iri.into();
        let namespace = namespace.into();
        if !namespace.is_empty() && !iri.starts_with(&namespace) {
            tracing::warn!(
                iri = %iri,
                namespace = %namespace,
                "term IRI does not start with its declared namespace; local part may be wrong"
            );
        }
        let label = label.unwrap_or_else(|| iri.clone());
        let local_part = local_part_of(&iri).to_string();
        Term {
            iri,
            label,
            description: description.unwrap_or_default(),
            prefix: prefix.into(),
            namespace,
            local_part,
            term_type,
        }
    }

    /// Compact `prefix:localPart` rendering used in log messages.
    pub fn qualified_name(&self) -> String {
        format!("{}:{}", self.prefix, self.local_part)
    }
}

/// Derive the local part of an IRI.
///
/// Splits after the first `#`; failing that, after the last `/`; failing
/// that, after the last `:`. An IRI with none of the three is its own
/// local part.
pub fn local_part_of(iri: &str) -> &str {
    if let Some(pos) = iri.find('#') {
        &iri[pos + 1..]
    } else if let Some(pos) = iri.rfind('/') {
        &iri[pos + 1..]
    } else if let Some(pos) = iri.rfind(':') {
        &iri[pos + 1..]
    } else {
        iri
    }
}
