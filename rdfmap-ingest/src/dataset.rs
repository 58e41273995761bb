//! An in-memory RDF dataset: the unit the extraction queries run over.
//!
//! Parsing goes through sophia's streaming parsers; each emitted triple or
//! quad is decoded from its N-Triples-style display form into a small owned
//! statement model. Named graphs are flattened: term extraction treats a
//! dataset as one bag of statements.

use crate::error::ImportErrorKind;
use crate::format::RdfFormat;
use rdfmap_core::LocationType;
use sophia::api::prelude::*;
use std::collections::HashSet;
use std::io::{BufReader, Cursor};
use std::path::Path;

/// Subject or object position node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Iri(String),
    Blank(String),
}

impl Node {
    /// The IRI of this node, if it is one.
    pub fn iri(&self) -> Option<&str> {
        match self {
            Node::Iri(iri) => Some(iri),
            Node::Blank(_) => None,
        }
    }
}

/// A literal object with optional language tag or datatype IRI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Literal {
    pub lexical: String,
    pub language: Option<String>,
    pub datatype: Option<String>,
}

/// Object position: a node or a literal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Object {
    Node(Node),
    Literal(Literal),
}

/// One parsed statement. Predicates are always IRIs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    pub subject: Node,
    pub predicate: String,
    pub object: Object,
}

/// A parsed RDF document.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    statements: Vec<Statement>,
}

impl Dataset {
    /// Parse a byte payload in the given serialization.
    pub fn parse_slice(bytes: &[u8], format: RdfFormat) -> Result<Dataset, ImportErrorKind> {
        let reader = BufReader::new(Cursor::new(bytes));
        let statements = match format {
            RdfFormat::Turtle => {
                collect_triples(sophia::turtle::parser::turtle::parse_bufread(reader), format)?
            }
            RdfFormat::NTriples => {
                collect_triples(sophia::turtle::parser::nt::parse_bufread(reader), format)?
            }
            RdfFormat::RdfXml => {
                collect_triples(sophia::xml::parser::parse_bufread(reader), format)?
            }
            RdfFormat::NQuads => {
                collect_quads(sophia::turtle::parser::nq::parse_bufread(reader), format)?
            }
            RdfFormat::TriG => {
                collect_quads(sophia::turtle::parser::trig::parse_bufread(reader), format)?
            }
        };
        Ok(Dataset { statements })
    }

    /// Parse a string payload in the given serialization.
    pub fn parse_str(text: &str, format: RdfFormat) -> Result<Dataset, ImportErrorKind> {
        Dataset::parse_slice(text.as_bytes(), format)
    }

    /// Parse a file, detecting the serialization from its extension via the
    /// fixed lookup table (unknown extensions default to RDF/XML).
    pub fn parse_file(path: &Path) -> Result<Dataset, ImportErrorKind> {
        let location_type = LocationType::for_path(&path.to_string_lossy());
        let format = RdfFormat::from_location_type(location_type)
            .ok_or(ImportErrorKind::Unsupported(location_type))?;
        let bytes = std::fs::read(path)?;
        Dataset::parse_slice(&bytes, format)
    }

    pub fn statements(&self) -> &[Statement] {
        &self.statements
    }

    pub fn len(&self) -> usize {
        self.statements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    /// Distinct subject IRIs (in first-seen order) carrying `predicate`
    /// with any of `object_iris` as the object.
    pub fn subjects_with(&self, predicate: &str, object_iris: &[&str]) -> Vec<&str> {
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        for stmt in &self.statements {
            if stmt.predicate != predicate {
                continue;
            }
            let Some(subject) = stmt.subject.iri() else {
                continue;
            };
            let Object::Node(Node::Iri(object)) = &stmt.object else {
                continue;
            };
            if object_iris.contains(&object.as_str()) && seen.insert(subject) {
                out.push(subject);
            }
        }
        out
    }

    /// All literal objects of `(subject_iri, predicate)` statements.
    pub fn literals<'a>(
        &'a self,
        subject_iri: &'a str,
        predicate: &'a str,
    ) -> impl Iterator<Item = &'a Literal> + 'a {
        self.statements.iter().filter_map(move |stmt| {
            match (&stmt.subject, &stmt.object) {
                (Node::Iri(subject), Object::Literal(lit))
                    if subject == subject_iri && stmt.predicate == predicate =>
                {
                    Some(lit)
                }
                _ => None,
            }
        })
    }

    /// First literal of `(subject, predicate)`, optionally restricted to a
    /// language tag (compared case-insensitively).
    pub fn first_literal<'a>(
        &'a self,
        subject_iri: &'a str,
        predicate: &'a str,
        language: Option<&str>,
    ) -> Option<&'a str> {
        self.literals(subject_iri, predicate)
            .find(|lit| match language {
                Some(lang) => lit
                    .language
                    .as_deref()
                    .is_some_and(|tag| tag.eq_ignore_ascii_case(lang)),
                None => true,
            })
            .map(|lit| lit.lexical.as_str())
    }
}

/// Decode failure for a single emitted term; aborts the parse.
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
struct TermDecodeError(String);

/// Render a term into its N-Triples display form for decoding.
fn term_to_nt<T: Term>(t: T) -> String {
    let mut buf = Vec::new();
    sophia::turtle::serializer::nt::write_term(&mut buf, t)
        .expect("writing N-Triples to an in-memory buffer cannot fail");
    String::from_utf8(buf).expect("N-Triples output is valid UTF-8")
}

fn collect_triples<TS>(mut source: TS, format: RdfFormat) -> Result<Vec<Statement>, ImportErrorKind>
where
    TS: TripleSource,
{
    let mut statements = Vec::new();
    source
        .try_for_each_triple(|t| -> std::result::Result<(), TermDecodeError> {
            if let Some(stmt) = decode_statement(
                &term_to_nt(t.s()),
                &term_to_nt(t.p()),
                &term_to_nt(t.o()),
            )? {
                statements.push(stmt);
            }
            Ok(())
        })
        .map_err(|e| ImportErrorKind::Parse {
            format,
            message: e.to_string(),
        })?;
    Ok(statements)
}

fn collect_quads<QS>(mut source: QS, format: RdfFormat) -> Result<Vec<Statement>, ImportErrorKind>
where
    QS: QuadSource,
{
    let mut statements = Vec::new();
    source
        .try_for_each_quad(|q| -> std::result::Result<(), TermDecodeError> {
            // Graph names are dropped: extraction queries span the dataset.
            if let Some(stmt) = decode_statement(
                &term_to_nt(q.s()),
                &term_to_nt(q.p()),
                &term_to_nt(q.o()),
            )? {
                statements.push(stmt);
            }
            Ok(())
        })
        .map_err(|e| ImportErrorKind::Parse {
            format,
            message: e.to_string(),
        })?;
    Ok(statements)
}

/// Decode one emitted triple; statements with non-IRI predicates are
/// skipped rather than rejected.
fn decode_statement(
    subject: &str,
    predicate: &str,
    object: &str,
) -> Result<Option<Statement>, TermDecodeError> {
    let subject = decode_node(subject)?;
    let Node::Iri(predicate) = decode_node(predicate)? else {
        return Ok(None);
    };
    let object = decode_object(object)?;
    Ok(Some(Statement {
        subject,
        predicate,
        object,
    }))
}

fn decode_node(display: &str) -> Result<Node, TermDecodeError> {
    match decode_object(display)? {
        Object::Node(node) => Ok(node),
        Object::Literal(_) => Err(TermDecodeError(format!(
            "expected IRI or blank node, got literal: {display}"
        ))),
    }
}

/// Decode a term from its N-Triples-style display form: `<iri>`,
/// `_:blank`, or `"lexical"` with an optional `@lang` / `^^<datatype>`
/// suffix.
fn decode_object(display: &str) -> Result<Object, TermDecodeError> {
    let s = display.trim();

    if let Some(iri) = s.strip_prefix('<').and_then(|t| t.strip_suffix('>')) {
        return Ok(Object::Node(Node::Iri(iri.to_string())));
    }

    if let Some(id) = s.strip_prefix("_:") {
        return Ok(Object::Node(Node::Blank(id.to_string())));
    }

    if s.starts_with('"') {
        let mut closing = None;
        let mut escaped = false;
        for (i, ch) in s.char_indices().skip(1) {
            if escaped {
                escaped = false;
                continue;
            }
            match ch {
                '\\' => escaped = true,
                '"' => {
                    closing = Some(i);
                    break;
                }
                _ => {}
            }
        }
        let Some(end) = closing else {
            return Err(TermDecodeError(format!(
                "literal missing closing quote: {s}"
            )));
        };

        let lexical = unescape_literal(&s[1..end]);
        let suffix = s[end + 1..].trim();

        let mut language = None;
        let mut datatype = None;
        if let Some(lang) = suffix.strip_prefix('@') {
            language = Some(lang.to_string());
        } else if let Some(dt) = suffix.strip_prefix("^^") {
            let dt = dt.trim();
            if let Some(iri) = dt.strip_prefix('<').and_then(|t| t.strip_suffix('>')) {
                datatype = Some(iri.to_string());
            } else if !dt.is_empty() {
                datatype = Some(dt.to_string());
            }
        }

        return Ok(Object::Literal(Literal {
            lexical,
            language,
            datatype,
        }));
    }

    Err(TermDecodeError(format!("unrecognized RDF term form: {s}")))
}

fn unescape_literal(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some('"') => out.push('"'),
            Some('\\') => out.push('\\'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_TTL: &str = r#"
@prefix rdfs: <http://www.w3.org/2000/01/rdf-schema#> .
@prefix owl: <http://www.w3.org/2002/07/owl#> .
@prefix ex: <http://example.org/vocab#> .

ex:Widget a owl:Class ;
    rdfs:label "Widget"@en ;
    rdfs:label "Widget (untagged)" ;
    rdfs:comment "A widget."@en .

ex:Gadget a rdfs:Class .
"#;

    #[test]
    fn parses_turtle_into_statements() {
        let ds = Dataset::parse_str(SAMPLE_TTL, RdfFormat::Turtle).unwrap();
        assert!(!ds.is_empty());
        let subjects = ds.subjects_with(
            "http://www.w3.org/1999/02/22-rdf-syntax-ns#type",
            &[
                "http://www.w3.org/2002/07/owl#Class",
                "http://www.w3.org/2000/01/rdf-schema#Class",
            ],
        );
        assert_eq!(
            subjects,
            vec![
                "http://example.org/vocab#Widget",
                "http://example.org/vocab#Gadget"
            ]
        );
    }

    #[test]
    fn first_literal_honors_language_preference() {
        let ds = Dataset::parse_str(SAMPLE_TTL, RdfFormat::Turtle).unwrap();
        let label = ds.first_literal(
            "http://example.org/vocab#Widget",
            "http://www.w3.org/2000/01/rdf-schema#label",
            Some("en"),
        );
        assert_eq!(label, Some("Widget"));

        // no french label, any-language fallback still finds one
        assert!(ds
            .first_literal(
                "http://example.org/vocab#Widget",
                "http://www.w3.org/2000/01/rdf-schema#label",
                Some("fr"),
            )
            .is_none());
        assert!(ds
            .first_literal(
                "http://example.org/vocab#Widget",
                "http://www.w3.org/2000/01/rdf-schema#label",
                None,
            )
            .is_some());
    }

    #[test]
    fn parses_ntriples() {
        let nt = r#"<http://ex.org/a> <http://ex.org/p> "hi\nthere" .
<http://ex.org/a> <http://ex.org/q> <http://ex.org/b> .
"#;
        let ds = Dataset::parse_str(nt, RdfFormat::NTriples).unwrap();
        assert_eq!(ds.len(), 2);
        let lit = ds.literals("http://ex.org/a", "http://ex.org/p").next().unwrap();
        assert_eq!(lit.lexical, "hi\nthere");
    }

    #[test]
    fn malformed_payload_is_a_parse_error() {
        let err = Dataset::parse_str("<<<< not rdf", RdfFormat::Turtle).unwrap_err();
        assert!(matches!(err, ImportErrorKind::Parse { .. }));
    }

    #[test]
    fn decode_object_forms() {
        assert_eq!(
            decode_object("<http://ex.org/x>").unwrap(),
            Object::Node(Node::Iri("http://ex.org/x".into()))
        );
        assert_eq!(
            decode_object("_:b0").unwrap(),
            Object::Node(Node::Blank("b0".into()))
        );
        match decode_object(r#""hello"@en"#).unwrap() {
            Object::Literal(lit) => {
                assert_eq!(lit.lexical, "hello");
                assert_eq!(lit.language.as_deref(), Some("en"));
            }
            other => panic!("expected literal, got {other:?}"),
        }
        match decode_object(r#""5"^^<http://www.w3.org/2001/XMLSchema#integer>"#).unwrap() {
            Object::Literal(lit) => {
                assert_eq!(lit.datatype.as_deref(), Some("http://www.w3.org/2001/XMLSchema#integer"));
            }
            other => panic!("expected literal, got {other:?}"),
        }
        assert!(decode_object("bogus").is_err());
    }
}
