//! Term extraction: the two fixed graph queries over a vocabulary dataset.

use crate::dataset::Dataset;
use crate::error::{ImportError, ImportErrorKind, Result};
use crate::fetch::{build_client, fetch, HttpConfig};
use crate::format::RdfFormat;
use rdfmap_core::{LocationType, Term, TermType};
use rdfmap_vocab::{owl, rdf, rdfs, skos, xsd};

/// Object IRIs recognized as class typing.
const CLASS_TYPES: &[&str] = &[rdfs::CLASS, owl::CLASS];

/// Object IRIs recognized as property typing.
const PROPERTY_TYPES: &[&str] = &[
    rdf::PROPERTY,
    owl::OBJECT_PROPERTY,
    owl::DATATYPE_PROPERTY,
    owl::ANNOTATION_PROPERTY,
];

/// The two term lists one extraction produces.
///
/// Either both lists are fully populated or the extraction failed; callers
/// never observe a partial result.
#[derive(Debug, Clone, Default)]
pub struct ExtractedTerms {
    pub classes: Vec<Term>,
    pub properties: Vec<Term>,
}

impl ExtractedTerms {
    pub fn len(&self) -> usize {
        self.classes.len() + self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty() && self.properties.is_empty()
    }
}

/// Where a vocabulary's statements come from.
#[derive(Debug, Clone)]
pub enum TermSource {
    /// Fetch and parse the given URL.
    Remote(String),
    /// An already-parsed dataset (uploaded file or pre-fetched payload).
    Dataset(Dataset),
}

impl From<Dataset> for TermSource {
    fn from(dataset: Dataset) -> TermSource {
        TermSource::Dataset(dataset)
    }
}

/// Extracts class and property terms from vocabulary sources.
///
/// Stateless apart from its HTTP client; construct one and share it.
#[derive(Debug, Clone)]
pub struct TermExtractor {
    client: reqwest::blocking::Client,
}

impl TermExtractor {
    /// Build an extractor with default HTTP settings.
    pub fn new() -> std::result::Result<TermExtractor, reqwest::Error> {
        TermExtractor::with_config(HttpConfig::default())
    }

    /// Build an extractor with explicit HTTP settings.
    pub fn with_config(config: HttpConfig) -> std::result::Result<TermExtractor, reqwest::Error> {
        Ok(TermExtractor {
            client: build_client(&config)?,
        })
    }

    /// Pull the class and property terms of `namespace` out of `source`.
    ///
    /// Both result lists are deduplicated by IRI and anchored to the
    /// namespace: terms referenced from other ontologies never leak in.
    /// The XSD datatype namespace defines no searchable terms and yields
    /// empty lists without touching the source.
    pub fn extract(
        &self,
        prefix: &str,
        namespace: &str,
        source: &TermSource,
    ) -> Result<ExtractedTerms> {
        if namespace == xsd::NAMESPACE {
            tracing::debug!(prefix, "skipping extraction for built-in datatype namespace");
            return Ok(ExtractedTerms::default());
        }

        let fetched;
        let dataset = match source {
            TermSource::Dataset(dataset) => dataset,
            TermSource::Remote(url) => {
                fetched = self.fetch_dataset(namespace, url)?;
                &fetched
            }
        };

        let classes = collect_terms(dataset, prefix, namespace, CLASS_TYPES, TermType::Class);
        let properties =
            collect_terms(dataset, prefix, namespace, PROPERTY_TYPES, TermType::Property);
        tracing::debug!(
            prefix,
            namespace,
            classes = classes.len(),
            properties = properties.len(),
            "extracted vocabulary terms"
        );
        Ok(ExtractedTerms {
            classes,
            properties,
        })
    }

    fn fetch_dataset(&self, namespace: &str, url: &str) -> Result<Dataset> {
        // The SKOS host ignores content negotiation and would otherwise
        // hand back an HTML alternative; pin it to a strict RDF/XML parse.
        let strict = namespace == skos::NAMESPACE;
        let (body, content_type) =
            fetch(&self.client, url, strict).map_err(|kind| ImportError::new(namespace, kind))?;

        let format = if strict {
            RdfFormat::RdfXml
        } else {
            negotiated_format(namespace, content_type.as_deref(), url)?
        };

        Dataset::parse_slice(&body, format).map_err(|kind| ImportError::new(namespace, kind))
    }
}

/// Pick a parser for a fetched payload: response content type first, then
/// the URL's extension via the fixed lookup table (which defaults to
/// RDF/XML).
fn negotiated_format(
    namespace: &str,
    content_type: Option<&str>,
    url: &str,
) -> Result<RdfFormat> {
    if let Some(format) = content_type.and_then(RdfFormat::from_content_type) {
        return Ok(format);
    }
    let location_type = LocationType::for_path(url);
    RdfFormat::from_location_type(location_type)
        .ok_or_else(|| ImportError::new(namespace, ImportErrorKind::Unsupported(location_type)))
}

fn collect_terms(
    dataset: &Dataset,
    prefix: &str,
    namespace: &str,
    type_iris: &[&str],
    term_type: TermType,
) -> Vec<Term> {
    dataset
        .subjects_with(rdf::TYPE, type_iris)
        .into_iter()
        .filter(|iri| iri.starts_with(namespace))
        .map(|iri| {
            let label = pick_label(dataset, iri);
            let description = pick_description(dataset, iri);
            Term::new(iri, label, description, prefix, namespace, term_type)
        })
        .collect()
}

/// Label fallback order: `rdfs:label@en`, then any `rdfs:label`.
fn pick_label(dataset: &Dataset, iri: &str) -> Option<String> {
    dataset
        .first_literal(iri, rdfs::LABEL, Some("en"))
        .or_else(|| dataset.first_literal(iri, rdfs::LABEL, None))
        .map(str::to_string)
}

/// Description fallback order: `skos:definition@en`, any `skos:definition`,
/// `rdfs:comment@en`, any `rdfs:comment`.
fn pick_description(dataset: &Dataset, iri: &str) -> Option<String> {
    dataset
        .first_literal(iri, skos::DEFINITION, Some("en"))
        .or_else(|| dataset.first_literal(iri, skos::DEFINITION, None))
        .or_else(|| dataset.first_literal(iri, rdfs::COMMENT, Some("en")))
        .or_else(|| dataset.first_literal(iri, rdfs::COMMENT, None))
        .map(str::to_string)
}
