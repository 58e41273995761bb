//! The embedded predefined vocabulary baseline.
//!
//! When no persisted catalog exists, the catalog manager bootstraps the
//! shared global scope from this list. Entries without a fetch URL are
//! fetched from their namespace; entries marked `fetch: false` (the XSD
//! datatype namespace) are registered without any import.

/// One baseline entry: `(prefix, namespace[, fetch_url])`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BaselineEntry {
    pub prefix: &'static str,
    pub namespace: &'static str,
    /// Overrides the namespace as the fetch location when set.
    pub fetch_url: Option<&'static str>,
    /// False for built-in namespaces that define no searchable terms.
    pub fetch: bool,
}

impl BaselineEntry {
    /// The URL this entry's terms are imported from.
    pub fn location(&self) -> &'static str {
        self.fetch_url.unwrap_or(self.namespace)
    }
}

/// The predefined vocabularies indexed once per server instance.
pub const BASELINE: &[BaselineEntry] = &[
    BaselineEntry {
        prefix: "rdf",
        namespace: super::rdf::NAMESPACE,
        fetch_url: None,
        fetch: true,
    },
    BaselineEntry {
        prefix: "rdfs",
        namespace: super::rdfs::NAMESPACE,
        fetch_url: None,
        fetch: true,
    },
    BaselineEntry {
        prefix: "owl",
        namespace: super::owl::NAMESPACE,
        fetch_url: None,
        fetch: true,
    },
    BaselineEntry {
        prefix: "xsd",
        namespace: super::xsd::NAMESPACE,
        fetch_url: None,
        fetch: false,
    },
    BaselineEntry {
        prefix: "skos",
        namespace: super::skos::NAMESPACE,
        fetch_url: None,
        fetch: true,
    },
    BaselineEntry {
        prefix: "dcterms",
        namespace: super::dcterms::NAMESPACE,
        fetch_url: Some("https://www.dublincore.org/specifications/dublin-core/dcmi-terms/dublin_core_terms.ttl"),
        fetch: true,
    },
    BaselineEntry {
        prefix: "foaf",
        namespace: super::foaf::NAMESPACE,
        fetch_url: Some("http://xmlns.com/foaf/spec/index.rdf"),
        fetch: true,
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn baseline_prefixes_are_unique() {
        let mut seen = std::collections::HashSet::new();
        for entry in BASELINE {
            assert!(seen.insert(entry.prefix), "duplicate baseline prefix {}", entry.prefix);
        }
    }

    #[test]
    fn location_defaults_to_namespace() {
        let rdf = BASELINE.iter().find(|e| e.prefix == "rdf").unwrap();
        assert_eq!(rdf.location(), rdf.namespace);

        let foaf = BASELINE.iter().find(|e| e.prefix == "foaf").unwrap();
        assert_eq!(foaf.location(), "http://xmlns.com/foaf/spec/index.rdf");
    }

    #[test]
    fn xsd_is_the_only_non_fetched_entry() {
        let skipped: Vec<_> = BASELINE.iter().filter(|e| !e.fetch).collect();
        assert_eq!(skipped.len(), 1);
        assert_eq!(skipped[0].prefix, "xsd");
    }
}
