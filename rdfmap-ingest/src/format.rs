//! The parseable RDF serializations and their negotiation tables.

use rdfmap_core::LocationType;
use std::fmt;

/// A serialization the in-process parser can read.
///
/// N3 input is handled by the Turtle parser (the subset vocabularies use
/// in practice is Turtle-compatible); serializations outside this enum are
/// owned by the upload collaborator and rejected here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RdfFormat {
    Turtle,
    NTriples,
    NQuads,
    TriG,
    RdfXml,
}

/// Accept header for best-effort content negotiation.
const ACCEPT: &str = "text/turtle, application/rdf+xml;q=0.9, \
     application/n-triples;q=0.8, application/trig;q=0.7, \
     application/n-quads;q=0.6, text/n3;q=0.5, */*;q=0.1";

/// Accept header for hosts that ignore negotiation and must be pinned to
/// strict RDF/XML.
const ACCEPT_STRICT: &str = "application/rdf+xml";

impl RdfFormat {
    /// Map a catalog serialization onto a parser, if one exists.
    pub fn from_location_type(location_type: LocationType) -> Option<RdfFormat> {
        match location_type {
            LocationType::Turtle | LocationType::N3 => Some(RdfFormat::Turtle),
            LocationType::NTriples => Some(RdfFormat::NTriples),
            LocationType::NQuads => Some(RdfFormat::NQuads),
            LocationType::TriG => Some(RdfFormat::TriG),
            LocationType::RdfXml => Some(RdfFormat::RdfXml),
            LocationType::None
            | LocationType::Url
            | LocationType::File
            | LocationType::JsonLd
            | LocationType::RdfJson
            | LocationType::TriX
            | LocationType::RdfThrift => None,
        }
    }

    /// Recognize a response content type, ignoring parameters.
    pub fn from_content_type(content_type: &str) -> Option<RdfFormat> {
        let mime = content_type
            .split(';')
            .next()
            .unwrap_or("")
            .trim()
            .to_ascii_lowercase();
        match mime.as_str() {
            "text/turtle" | "application/x-turtle" => Some(RdfFormat::Turtle),
            "text/n3" | "text/rdf+n3" => Some(RdfFormat::Turtle),
            "application/n-triples" | "text/plain" => Some(RdfFormat::NTriples),
            "application/n-quads" => Some(RdfFormat::NQuads),
            "application/trig" => Some(RdfFormat::TriG),
            "application/rdf+xml" | "application/xml" | "text/xml" => Some(RdfFormat::RdfXml),
            _ => None,
        }
    }

    /// The Accept header sent to remotes.
    pub fn accept_header(strict: bool) -> &'static str {
        if strict {
            ACCEPT_STRICT
        } else {
            ACCEPT
        }
    }
}

impl fmt::Display for RdfFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RdfFormat::Turtle => "Turtle",
            RdfFormat::NTriples => "N-Triples",
            RdfFormat::NQuads => "N-Quads",
            RdfFormat::TriG => "TriG",
            RdfFormat::RdfXml => "RDF/XML",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn n3_parses_with_the_turtle_parser() {
        assert_eq!(
            RdfFormat::from_location_type(LocationType::N3),
            Some(RdfFormat::Turtle)
        );
    }

    #[test]
    fn collaborator_owned_serializations_have_no_parser() {
        assert_eq!(RdfFormat::from_location_type(LocationType::JsonLd), None);
        assert_eq!(RdfFormat::from_location_type(LocationType::TriX), None);
        assert_eq!(RdfFormat::from_location_type(LocationType::RdfThrift), None);
    }

    #[test]
    fn content_type_parameters_are_ignored() {
        assert_eq!(
            RdfFormat::from_content_type("text/turtle; charset=utf-8"),
            Some(RdfFormat::Turtle)
        );
        assert_eq!(
            RdfFormat::from_content_type("Application/RDF+XML"),
            Some(RdfFormat::RdfXml)
        );
        assert_eq!(RdfFormat::from_content_type("text/html"), None);
    }
}
