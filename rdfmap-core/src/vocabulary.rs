//! Catalog registrations: where a vocabulary lives and how it is serialized.

use serde::{Deserialize, Serialize};
use std::fmt;

/// How a vocabulary's `location` should be interpreted.
///
/// `None` marks entries that need no fetch at all (the built-in XML
/// datatype namespace is the canonical example). The serialization
/// variants describe the payload behind a `File` upload or a concrete
/// dump; `Url` means best-effort content negotiation against a remote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LocationType {
    None,
    Url,
    File,
    RdfXml,
    Turtle,
    N3,
    NTriples,
    JsonLd,
    NQuads,
    RdfJson,
    TriG,
    TriX,
    RdfThrift,
}

impl LocationType {
    /// Fixed extension lookup table. Unrecognized extensions default to
    /// RDF/XML.
    pub fn from_extension(ext: &str) -> LocationType {
        match ext.to_ascii_lowercase().as_str() {
            "ttl" | "turtle" => LocationType::Turtle,
            "n3" => LocationType::N3,
            "nt" | "ntriples" => LocationType::NTriples,
            "jsonld" => LocationType::JsonLd,
            "nq" | "nquads" => LocationType::NQuads,
            "rj" => LocationType::RdfJson,
            "trig" => LocationType::TriG,
            "trix" => LocationType::TriX,
            "trdf" | "rt" => LocationType::RdfThrift,
            _ => LocationType::RdfXml,
        }
    }

    /// Look up the serialization for a file path by its extension.
    pub fn for_path(path: &str) -> LocationType {
        let ext = path.rsplit('.').next().unwrap_or("");
        LocationType::from_extension(ext)
    }
}

impl fmt::Display for LocationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LocationType::None => "NONE",
            LocationType::Url => "URL",
            LocationType::File => "FILE",
            LocationType::RdfXml => "RDF_XML",
            LocationType::Turtle => "TURTLE",
            LocationType::N3 => "N3",
            LocationType::NTriples => "N_TRIPLES",
            LocationType::JsonLd => "JSON_LD",
            LocationType::NQuads => "N_QUADS",
            LocationType::RdfJson => "RDF_JSON",
            LocationType::TriG => "TRI_G",
            LocationType::TriX => "TRI_X",
            LocationType::RdfThrift => "RDF_THRIFT",
        };
        f.write_str(name)
    }
}

/// A vocabulary registration in the catalog.
///
/// The catalog keys registrations by `prefix`; `location` is where the
/// vocabulary's terms were (or can be) loaded from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vocabulary {
    pub prefix: String,
    pub namespace: String,
    pub location: String,
    pub location_type: LocationType,
}

impl Vocabulary {
    /// A vocabulary fetched from its namespace URL.
    pub fn new(prefix: impl Into<String>, namespace: impl Into<String>) -> Vocabulary {
        let namespace = namespace.into();
        Vocabulary {
            prefix: prefix.into(),
            location: namespace.clone(),
            namespace,
            location_type: LocationType::Url,
        }
    }

    /// A built-in vocabulary with nothing to fetch.
    pub fn builtin(prefix: impl Into<String>, namespace: impl Into<String>) -> Vocabulary {
        Vocabulary {
            prefix: prefix.into(),
            namespace: namespace.into(),
            location: String::new(),
            location_type: LocationType::None,
        }
    }

    /// Override the location this vocabulary is loaded from.
    pub fn with_location(mut self, location: impl Into<String>, location_type: LocationType) -> Vocabulary {
        self.location = location.into();
        self.location_type = location_type;
        self
    }
}
