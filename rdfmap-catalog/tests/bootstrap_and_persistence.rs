//! End-to-end catalog manager behavior: baseline bootstrap against a live
//! (local) vocabulary host, resilience to failing entries, reload without
//! network, and crash-safe persistence.

use rdfmap_catalog::{CatalogManager, CATALOG_FILE};
use rdfmap_core::{Vocabulary, GLOBAL_SCOPE};
use rdfmap_ingest::TermExtractor;
use rdfmap_search::TermIndex;
use rdfmap_vocab::baseline::BaselineEntry;
use std::io::{Read, Write};
use std::net::TcpListener;
use std::path::Path;
use std::sync::Arc;

const GOOD_NS: &str = "http://example.org/good#";

const GOOD_TTL: &str = r#"
@prefix rdf: <http://www.w3.org/1999/02/22-rdf-syntax-ns#> .
@prefix rdfs: <http://www.w3.org/2000/01/rdf-schema#> .
@prefix owl: <http://www.w3.org/2002/07/owl#> .

<http://example.org/good#Widget> a owl:Class ;
    rdfs:label "Widget"@en ;
    rdfs:comment "A demonstration class."@en .

<http://example.org/good#partOf> a rdf:Property ;
    rdfs:label "part of"@en .
"#;

/// Serve `body` as text/turtle for every connection.
fn spawn_vocab_server(body: &'static str) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    std::thread::spawn(move || {
        for stream in listener.incoming() {
            let Ok(mut stream) = stream else { continue };
            std::thread::spawn(move || {
                let mut buf = [0u8; 4096];
                let mut request = Vec::new();
                loop {
                    match stream.read(&mut buf) {
                        Ok(0) => break,
                        Ok(n) => {
                            request.extend_from_slice(&buf[..n]);
                            if request.windows(4).any(|w| w == b"\r\n\r\n") {
                                break;
                            }
                        }
                        Err(_) => return,
                    }
                }
                let response = format!(
                    "HTTP/1.1 200 OK\r\nContent-Type: text/turtle\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    body.len(),
                    body
                );
                let _ = stream.write_all(response.as_bytes());
            });
        }
    });
    format!("http://{addr}/vocab.ttl")
}

/// A URL whose connection is refused: bind a port, then free it.
fn refused_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}/unreachable")
}

fn leak(s: String) -> &'static str {
    Box::leak(s.into_boxed_str())
}

fn open_manager(workdir: &Path, baseline: &[BaselineEntry]) -> (CatalogManager, Arc<TermIndex>) {
    let index = Arc::new(TermIndex::open(&workdir.join("term-index")).unwrap());
    let manager = CatalogManager::open_with_baseline(
        workdir,
        TermExtractor::new().unwrap(),
        index.clone(),
        baseline,
    )
    .unwrap();
    (manager, index)
}

fn catalog_prefixes(manager: &CatalogManager) -> Vec<String> {
    let mut prefixes = manager.catalog().prefixes();
    prefixes.sort();
    prefixes
}

#[test]
fn bootstrap_skips_failing_entries_and_indexes_the_rest() {
    let workdir = tempfile::tempdir().unwrap();
    let baseline = vec![
        BaselineEntry {
            prefix: "good",
            namespace: GOOD_NS,
            fetch_url: Some(leak(spawn_vocab_server(GOOD_TTL))),
            fetch: true,
        },
        BaselineEntry {
            prefix: "bad",
            namespace: "http://example.org/bad#",
            fetch_url: Some(leak(refused_url())),
            fetch: true,
        },
        BaselineEntry {
            prefix: "xsd",
            namespace: "http://www.w3.org/2001/XMLSchema#",
            fetch_url: None,
            fetch: false,
        },
    ];

    let (manager, index) = open_manager(workdir.path(), &baseline);

    // the unreachable entry is logged and skipped, nothing else aborts
    assert_eq!(catalog_prefixes(&manager), vec!["good", "xsd"]);

    // the reachable entry's terms are searchable under the global scope
    let classes = index.search_classes("wid", GLOBAL_SCOPE).unwrap();
    assert_eq!(classes.len(), 1);
    assert_eq!(classes[0].iri, "http://example.org/good#Widget");
    assert_eq!(classes[0].label, "Widget");
    let properties = index.search_properties("good:part", GLOBAL_SCOPE).unwrap();
    assert_eq!(properties.len(), 1);

    // the (partial) catalog was persisted
    let raw = std::fs::read_to_string(workdir.path().join(CATALOG_FILE)).unwrap();
    assert!(raw.contains("\"good\""));
    assert!(!raw.contains("\"bad\""));
}

#[test]
fn second_open_loads_from_disk_and_skips_the_network() {
    let workdir = tempfile::tempdir().unwrap();
    let baseline = vec![BaselineEntry {
        prefix: "good",
        namespace: GOOD_NS,
        fetch_url: Some(leak(spawn_vocab_server(GOOD_TTL))),
        fetch: true,
    }];
    {
        let (manager, _index) = open_manager(workdir.path(), &baseline);
        assert_eq!(catalog_prefixes(&manager), vec!["good"]);
    }

    // a baseline whose only entry is unreachable: if the second open tried
    // to bootstrap it would come up empty, so a populated catalog proves
    // the persisted file was adopted instead
    let offline_baseline = vec![BaselineEntry {
        prefix: "offline",
        namespace: "http://example.org/offline#",
        fetch_url: Some(leak(refused_url())),
        fetch: true,
    }];
    let (manager, _index) = open_manager(workdir.path(), &offline_baseline);
    assert_eq!(catalog_prefixes(&manager), vec!["good"]);

    let good = manager.catalog().get("good").unwrap();
    assert_eq!(good.namespace, GOOD_NS);
}

#[test]
fn completed_save_round_trips_the_registration_set() {
    let workdir = tempfile::tempdir().unwrap();
    {
        let (manager, _index) = open_manager(workdir.path(), &[]);
        manager
            .catalog()
            .add(Vocabulary::new("foaf", "http://xmlns.com/foaf/0.1/"));
        manager
            .catalog()
            .add(Vocabulary::new("skos", "http://www.w3.org/2004/02/skos/core#"));
        manager.save().unwrap();
    }

    let (manager, _index) = open_manager(workdir.path(), &[]);
    assert_eq!(catalog_prefixes(&manager), vec!["foaf", "skos"]);
    let foaf = manager.catalog().get("foaf").unwrap();
    assert_eq!(foaf.namespace, "http://xmlns.com/foaf/0.1/");
}

#[test]
fn crash_after_temp_write_leaves_the_previous_catalog_intact() {
    let workdir = tempfile::tempdir().unwrap();
    {
        let (manager, _index) = open_manager(workdir.path(), &[]);
        manager
            .catalog()
            .add(Vocabulary::new("foaf", "http://xmlns.com/foaf/0.1/"));
        manager.save().unwrap();
    }
    let canonical_before =
        std::fs::read_to_string(workdir.path().join(CATALOG_FILE)).unwrap();

    // crash simulation: a newer save wrote its temp file and died before
    // any rename
    std::fs::write(
        workdir.path().join("catalog.json.tmp"),
        "{\"half\": {\"namespace\": \"http://half.example/\"",
    )
    .unwrap();

    let (manager, _index) = open_manager(workdir.path(), &[]);
    assert_eq!(catalog_prefixes(&manager), vec!["foaf"]);
    let canonical_after =
        std::fs::read_to_string(workdir.path().join(CATALOG_FILE)).unwrap();
    assert_eq!(canonical_before, canonical_after, "canonical file must be untouched");
}

#[test]
fn crash_between_backup_and_canonical_rename_recovers_from_backup() {
    let workdir = tempfile::tempdir().unwrap();
    {
        let (manager, _index) = open_manager(workdir.path(), &[]);
        manager
            .catalog()
            .add(Vocabulary::new("foaf", "http://xmlns.com/foaf/0.1/"));
        manager.save().unwrap();
    }

    // crash simulation: the canonical file was rotated to the backup path
    // and the process died before the temp file was moved into place
    std::fs::rename(
        workdir.path().join(CATALOG_FILE),
        workdir.path().join("catalog.json.bak"),
    )
    .unwrap();
    std::fs::write(workdir.path().join("catalog.json.tmp"), "{}").unwrap();

    let (manager, _index) = open_manager(workdir.path(), &[]);
    assert_eq!(catalog_prefixes(&manager), vec!["foaf"]);
}

#[test]
fn refresh_replaces_terms_without_duplicating_them() {
    let workdir = tempfile::tempdir().unwrap();
    let baseline = vec![BaselineEntry {
        prefix: "good",
        namespace: GOOD_NS,
        fetch_url: Some(leak(spawn_vocab_server(GOOD_TTL))),
        fetch: true,
    }];
    let (manager, index) = open_manager(workdir.path(), &baseline);

    manager.refresh_vocabulary("good").unwrap();
    manager.refresh_vocabulary("good").unwrap();

    let classes = index.search_classes("", GLOBAL_SCOPE).unwrap();
    assert_eq!(classes.len(), 1, "refresh must not accumulate duplicates");

    // refreshing an unregistered prefix is an error
    assert!(manager.refresh_vocabulary("nope").is_err());
}
