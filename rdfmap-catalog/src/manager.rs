//! The catalog manager: baseline bootstrap and crash-safe persistence.

use crate::catalog::Catalog;
use crate::error::{CatalogError, Result};
use rdfmap_core::{LocationType, TermType, Vocabulary, GLOBAL_SCOPE};
use rdfmap_ingest::{TermExtractor, TermSource};
use rdfmap_search::TermIndex;
use rdfmap_vocab::baseline::{BaselineEntry, BASELINE};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

/// Canonical catalog file inside a working directory.
pub const CATALOG_FILE: &str = "catalog.json";
/// Staging file for the atomic write protocol.
const CATALOG_TMP: &str = "catalog.json.tmp";
/// Fixed backup path used mid-rotation.
const CATALOG_BACKUP: &str = "catalog.json.bak";

/// On-disk form of one catalog entry; the prefix is the surrounding map key.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredEntry {
    namespace: String,
    location: String,
    location_type: LocationType,
}

/// Owns the global vocabulary catalog of one working directory.
///
/// Construction loads the persisted catalog when one exists (no network),
/// and otherwise bootstraps it from the embedded baseline: every entry is
/// extracted, indexed under the global scope, and registered; a failing
/// entry is logged and skipped without aborting the rest.
pub struct CatalogManager {
    workdir: PathBuf,
    catalog: Catalog,
    extractor: TermExtractor,
    index: Arc<TermIndex>,
    /// Serializes the temp -> backup -> canonical rotation per directory.
    save_lock: Mutex<()>,
}

impl CatalogManager {
    /// Open the manager for `workdir`, bootstrapping from the embedded
    /// baseline when no catalog has been persisted yet.
    pub fn open(
        workdir: impl Into<PathBuf>,
        extractor: TermExtractor,
        index: Arc<TermIndex>,
    ) -> Result<CatalogManager> {
        CatalogManager::open_with_baseline(workdir, extractor, index, BASELINE)
    }

    /// Like [`CatalogManager::open`] with an explicit baseline list.
    pub fn open_with_baseline(
        workdir: impl Into<PathBuf>,
        extractor: TermExtractor,
        index: Arc<TermIndex>,
        baseline: &[BaselineEntry],
    ) -> Result<CatalogManager> {
        let workdir = workdir.into();
        fs::create_dir_all(&workdir)?;
        let manager = CatalogManager {
            workdir,
            catalog: Catalog::new(),
            extractor,
            index,
            save_lock: Mutex::new(()),
        };

        if let Some(entries) = manager.load_persisted()? {
            for vocabulary in entries {
                manager.catalog.add(vocabulary);
            }
            tracing::info!(
                count = manager.catalog.len(),
                "loaded persisted vocabulary catalog"
            );
            return Ok(manager);
        }

        manager.bootstrap(baseline)?;
        manager.save()?;
        Ok(manager)
    }

    /// The live global catalog registrations. This is the registry only,
    /// not the indexed term documents.
    pub fn predefined_vocabularies(&self) -> Vec<Vocabulary> {
        self.catalog.vocabularies()
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn workdir(&self) -> &Path {
        &self.workdir
    }

    /// Persist the catalog with the atomic rotation protocol: write a temp
    /// file, move any existing canonical file to the fixed backup path,
    /// move the temp file into place, then drop the backup. A crash at any
    /// point leaves the previous canonical file, the new canonical file,
    /// or the backup - never a truncated canonical file.
    pub fn save(&self) -> Result<()> {
        let _guard = self.save_lock.lock().unwrap_or_else(PoisonError::into_inner);

        let entries: BTreeMap<String, StoredEntry> = self
            .catalog
            .vocabularies()
            .into_iter()
            .map(
                |Vocabulary {
                     prefix,
                     namespace,
                     location,
                     location_type,
                 }| {
                    (
                        prefix,
                        StoredEntry {
                            namespace,
                            location,
                            location_type,
                        },
                    )
                },
            )
            .collect();
        let payload = serde_json::to_string_pretty(&entries)?;

        let tmp = self.workdir.join(CATALOG_TMP);
        let canonical = self.workdir.join(CATALOG_FILE);
        let backup = self.workdir.join(CATALOG_BACKUP);

        let mut file = File::create(&tmp)?;
        file.write_all(payload.as_bytes())?;
        file.sync_all()?;
        drop(file);

        if canonical.exists() {
            fs::rename(&canonical, &backup)?;
        }
        fs::rename(&tmp, &canonical)?;
        if backup.exists() {
            if let Err(err) = fs::remove_file(&backup) {
                tracing::debug!(error = %err, "could not remove catalog backup");
            }
        }

        tracing::debug!(
            path = %canonical.display(),
            entries = self.catalog.len(),
            "catalog persisted"
        );
        Ok(())
    }

    /// Re-import one registered vocabulary: extract first, then replace its
    /// indexed terms in the global scope.
    pub fn refresh_vocabulary(&self, prefix: &str) -> Result<()> {
        let vocabulary = self
            .catalog
            .get(prefix)
            .ok_or_else(|| CatalogError::UnknownPrefix(prefix.to_string()))?;
        if vocabulary.location_type == LocationType::None {
            tracing::debug!(prefix, "vocabulary has no fetchable source; nothing to refresh");
            return Ok(());
        }

        let source = TermSource::Remote(vocabulary.location.clone());
        let extracted = self
            .extractor
            .extract(prefix, &vocabulary.namespace, &source)?;

        self.index.delete_vocabulary_terms(prefix, GLOBAL_SCOPE)?;
        self.index
            .add_terms(GLOBAL_SCOPE, TermType::Class, &extracted.classes)?;
        self.index
            .add_terms(GLOBAL_SCOPE, TermType::Property, &extracted.properties)?;
        self.index.update()?;
        tracing::info!(prefix, terms = extracted.len(), "vocabulary refreshed");
        Ok(())
    }

    /// Refresh every registered vocabulary. Import failures are logged and
    /// skipped; index failures abort.
    pub fn refresh_all(&self) -> Result<()> {
        for prefix in self.catalog.prefixes() {
            match self.refresh_vocabulary(&prefix) {
                Ok(()) => {}
                Err(CatalogError::Import(err)) => {
                    tracing::warn!(prefix = %prefix, error = %err, "refresh failed; skipping");
                }
                Err(other) => return Err(other),
            }
        }
        Ok(())
    }

    /// Load the persisted catalog, recovering from the backup if a crash
    /// interrupted a rotation after the canonical file was moved aside.
    /// Returns `None` when nothing non-empty is persisted.
    fn load_persisted(&self) -> Result<Option<Vec<Vocabulary>>> {
        let canonical = self.workdir.join(CATALOG_FILE);
        let backup = self.workdir.join(CATALOG_BACKUP);
        let path = if canonical.exists() {
            canonical
        } else if backup.exists() {
            tracing::warn!(
                backup = %backup.display(),
                "canonical catalog file missing; recovering from rotation backup"
            );
            backup
        } else {
            return Ok(None);
        };

        let raw = fs::read_to_string(&path)?;
        if raw.trim().is_empty() {
            return Ok(None);
        }
        let entries: BTreeMap<String, StoredEntry> = serde_json::from_str(&raw)?;
        if entries.is_empty() {
            return Ok(None);
        }
        Ok(Some(
            entries
                .into_iter()
                .map(|(prefix, entry)| Vocabulary {
                    prefix,
                    namespace: entry.namespace,
                    location: entry.location,
                    location_type: entry.location_type,
                })
                .collect(),
        ))
    }

    /// First-start import of the embedded baseline. A failing entry must
    /// never abort the remaining entries.
    fn bootstrap(&self, baseline: &[BaselineEntry]) -> Result<()> {
        tracing::info!(entries = baseline.len(), "bootstrapping predefined vocabularies");
        for entry in baseline {
            let vocabulary = if entry.fetch {
                match self.import_baseline_entry(entry) {
                    Ok(()) => Vocabulary::new(entry.prefix, entry.namespace)
                        .with_location(entry.location(), LocationType::Url),
                    Err(CatalogError::Import(err)) => {
                        tracing::warn!(
                            prefix = entry.prefix,
                            error = %err,
                            "skipping baseline vocabulary"
                        );
                        continue;
                    }
                    Err(other) => return Err(other),
                }
            } else {
                Vocabulary::builtin(entry.prefix, entry.namespace)
            };
            self.catalog.add(vocabulary);
        }
        self.index.update()?;
        Ok(())
    }

    fn import_baseline_entry(&self, entry: &BaselineEntry) -> Result<()> {
        let source = TermSource::Remote(entry.location().to_string());
        let extracted = self
            .extractor
            .extract(entry.prefix, entry.namespace, &source)?;
        self.index
            .add_terms(GLOBAL_SCOPE, TermType::Class, &extracted.classes)?;
        self.index
            .add_terms(GLOBAL_SCOPE, TermType::Property, &extracted.properties)?;
        Ok(())
    }
}

impl std::fmt::Debug for CatalogManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogManager")
            .field("workdir", &self.workdir)
            .field("entries", &self.catalog.len())
            .finish()
    }
}
