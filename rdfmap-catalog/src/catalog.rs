//! The in-memory vocabulary catalog.

use rdfmap_core::Vocabulary;
use std::collections::HashSet;
use std::sync::{PoisonError, RwLock};

/// Insertion-ordered set of vocabulary registrations, unique by prefix.
///
/// Internally synchronized: concurrent inserts of one prefix produce one
/// entry, and the entry kept is the first writer's (first write wins on
/// content, not last).
#[derive(Debug, Default)]
pub struct Catalog {
    entries: RwLock<Vec<Vocabulary>>,
}

impl Catalog {
    pub fn new() -> Catalog {
        Catalog::default()
    }

    /// Register `vocabulary`. If its prefix is already present this is a
    /// no-op that keeps the existing entry; returns whether the entry was
    /// inserted.
    pub fn add(&self, vocabulary: Vocabulary) -> bool {
        let mut entries = self.write();
        if entries.iter().any(|v| v.prefix == vocabulary.prefix) {
            tracing::debug!(
                prefix = %vocabulary.prefix,
                "prefix already registered; keeping the existing entry"
            );
            return false;
        }
        entries.push(vocabulary);
        true
    }

    /// Remove and return the registration for `prefix`.
    pub fn remove(&self, prefix: &str) -> Option<Vocabulary> {
        let mut entries = self.write();
        let position = entries.iter().position(|v| v.prefix == prefix)?;
        Some(entries.remove(position))
    }

    pub fn get(&self, prefix: &str) -> Option<Vocabulary> {
        self.read().iter().find(|v| v.prefix == prefix).cloned()
    }

    pub fn contains(&self, prefix: &str) -> bool {
        self.read().iter().any(|v| v.prefix == prefix)
    }

    /// Snapshot of every registration, in insertion order.
    pub fn vocabularies(&self) -> Vec<Vocabulary> {
        self.read().clone()
    }

    /// Registered prefixes, in insertion order.
    pub fn prefixes(&self) -> Vec<String> {
        self.read().iter().map(|v| v.prefix.clone()).collect()
    }

    /// Registered prefixes as a set, for synchronize-style diffing.
    pub fn prefix_set(&self) -> HashSet<String> {
        self.read().iter().map(|v| v.prefix.clone()).collect()
    }

    /// Registered prefixes not present in `keep`.
    pub fn prefixes_except(&self, keep: &HashSet<String>) -> Vec<String> {
        self.read()
            .iter()
            .filter(|v| !keep.contains(&v.prefix))
            .map(|v| v.prefix.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Vec<Vocabulary>> {
        self.entries.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Vec<Vocabulary>> {
        self.entries.write().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_write_wins_on_prefix_conflict() {
        let catalog = Catalog::new();
        assert!(catalog.add(Vocabulary::new("foaf", "http://xmlns.com/foaf/0.1/")));
        assert!(!catalog.add(Vocabulary::new("foaf", "http://wrong.example/ns#")));

        let entries = catalog.vocabularies();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].namespace, "http://xmlns.com/foaf/0.1/");
    }

    #[test]
    fn preserves_insertion_order() {
        let catalog = Catalog::new();
        catalog.add(Vocabulary::new("b", "http://b.example/ns#"));
        catalog.add(Vocabulary::new("a", "http://a.example/ns#"));
        catalog.add(Vocabulary::new("c", "http://c.example/ns#"));
        assert_eq!(catalog.prefixes(), vec!["b", "a", "c"]);
    }

    #[test]
    fn remove_returns_the_entry() {
        let catalog = Catalog::new();
        catalog.add(Vocabulary::new("skos", "http://www.w3.org/2004/02/skos/core#"));
        let removed = catalog.remove("skos").unwrap();
        assert_eq!(removed.prefix, "skos");
        assert!(catalog.is_empty());
        assert!(catalog.remove("skos").is_none());
    }

    #[test]
    fn prefixes_except_diffs_against_a_keep_set() {
        let catalog = Catalog::new();
        for prefix in ["a", "b", "c"] {
            catalog.add(Vocabulary::new(prefix, format!("http://{prefix}.example/ns#")));
        }
        let keep: HashSet<String> = ["a", "c"].into_iter().map(String::from).collect();
        assert_eq!(catalog.prefixes_except(&keep), vec!["b"]);
    }

    #[test]
    fn concurrent_adds_of_one_prefix_keep_a_single_entry() {
        let catalog = std::sync::Arc::new(Catalog::new());
        let mut handles = Vec::new();
        for i in 0..8 {
            let catalog = catalog.clone();
            handles.push(std::thread::spawn(move || {
                catalog.add(Vocabulary::new("dup", format!("http://ns{i}.example/#")))
            }));
        }
        let inserted: usize = handles
            .into_iter()
            .map(|h| usize::from(h.join().unwrap()))
            .sum();
        assert_eq!(inserted, 1);
        assert_eq!(catalog.len(), 1);
    }
}
