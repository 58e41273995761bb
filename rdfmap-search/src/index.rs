//! The multi-tenant term index.
//!
//! One [`TermIndex`] owns one index directory. All mutation funnels through
//! its single writer; readers hold a snapshot that only advances at
//! [`TermIndex::update`], so concurrent searches never observe a
//! half-applied batch.

use crate::error::{IndexError, Result};
use crate::schema::{build_schema, register_tokenizers, TermFields};
use rdfmap_core::{is_project_scope, Term, TermType, GLOBAL_SCOPE};
use sha2::{Digest, Sha256};
use std::collections::{BTreeSet, HashSet};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};
use tantivy::collector::{DocSetCollector, TopDocs};
use tantivy::query::{BooleanQuery, Occur, Query, RegexQuery, TermQuery};
use tantivy::schema::{Field, IndexRecordOption, Value};
use tantivy::{
    Index, IndexReader, IndexWriter, ReloadPolicy, TantivyDocument, Term as TantivyTerm,
};

/// Writer heap before segments spill to disk.
const WRITER_HEAP_BYTES: usize = 50_000_000;

/// Cap on documents materialized by a single search.
const MAX_RESULTS: usize = 100_000;

/// Separator inside composite key terms. Not a valid scope or prefix byte.
const KEY_SEP: char = '\u{1f}';

/// Embedded full-text index of vocabulary terms, partitioned by scope.
pub struct TermIndex {
    reader: IndexReader,
    writer: Mutex<IndexWriter>,
    fields: TermFields,
    dirty: AtomicBool,
}

impl TermIndex {
    /// Open the term index in `dir`, creating it when absent.
    ///
    /// If a persisted index exists but its on-disk format belongs to an
    /// incompatible engine generation, the directory is moved aside to a
    /// fixed `<dir>-old` sibling (replacing any previous relocation) and a
    /// fresh empty index takes its place; startup continues. Any other I/O
    /// failure propagates.
    pub fn open(dir: &Path) -> Result<TermIndex> {
        let index = open_or_create(dir)?;
        register_tokenizers(&index);

        let fields = match TermFields::resolve(&index.schema()) {
            Some(fields) => fields,
            None => {
                return Err(IndexError::Io(std::io::Error::new(
                    std::io::ErrorKind::InvalidData,
                    "term index schema lost required fields after open",
                )))
            }
        };

        let reader: IndexReader = index
            .reader_builder()
            .reload_policy(ReloadPolicy::Manual)
            .try_into()?;
        let writer = index.writer(WRITER_HEAP_BYTES)?;

        Ok(TermIndex {
            reader,
            writer: Mutex::new(writer),
            fields,
            dirty: AtomicBool::new(false),
        })
    }

    /// Index `terms` under `(scope, term_type)`.
    ///
    /// Each term is delete-then-insert on its full identity tuple, so
    /// re-importing the same vocabulary never accumulates duplicates. Terms
    /// without an IRI are dropped with a warning.
    pub fn add_terms(&self, scope: &str, term_type: TermType, terms: &[Term]) -> Result<()> {
        if terms.is_empty() {
            return Ok(());
        }
        let writer = self.writer()?;
        let mut added = 0usize;
        for term in terms {
            if term.iri.is_empty() {
                tracing::warn!(
                    scope,
                    prefix = %term.prefix,
                    label = %term.label,
                    "dropping term without an IRI"
                );
                continue;
            }
            let key = identity_key(scope, term_type, term);
            writer.delete_term(TantivyTerm::from_field_text(self.fields.identity, &key));

            let mut doc = TantivyDocument::new();
            doc.add_text(self.fields.scope, scope);
            doc.add_text(self.fields.term_type, term_type.as_str());
            doc.add_text(self.fields.identity, &key);
            doc.add_text(
                self.fields.scope_prefix,
                &scope_prefix_key(scope, &term.prefix),
            );
            doc.add_text(self.fields.iri, &term.iri);
            doc.add_text(self.fields.prefix, &term.prefix);
            doc.add_text(self.fields.namespace, &term.namespace);
            doc.add_text(self.fields.local_part, &term.local_part);
            doc.add_text(self.fields.label, &term.label);
            doc.add_text(self.fields.description, &term.description);
            writer.add_document(doc)?;
            added += 1;
        }
        drop(writer);
        if added > 0 {
            self.dirty.store(true, Ordering::Release);
        }
        tracing::debug!(scope, term_type = %term_type, count = added, "indexed terms");
        Ok(())
    }

    /// Delete every class and property document of `(prefix, scope)`.
    pub fn delete_vocabulary_terms(&self, prefix: &str, scope: &str) -> Result<()> {
        if scope.is_empty() {
            return Err(IndexError::ScopeRequired);
        }
        let writer = self.writer()?;
        writer.delete_term(TantivyTerm::from_field_text(
            self.fields.scope_prefix,
            &scope_prefix_key(scope, prefix),
        ));
        drop(writer);
        self.dirty.store(true, Ordering::Release);
        tracing::debug!(scope, prefix, "deleted vocabulary terms");
        Ok(())
    }

    /// Ranked class terms matching `query` within `scope`.
    pub fn search_classes(&self, query: &str, scope: &str) -> Result<Vec<Term>> {
        self.search_terms(query, scope, TermType::Class)
    }

    /// Ranked property terms matching `query` within `scope`.
    pub fn search_properties(&self, query: &str, scope: &str) -> Result<Vec<Term>> {
        self.search_terms(query, scope, TermType::Property)
    }

    /// Copy every document indexed under the global scope into
    /// `project_id`'s scope.
    ///
    /// Runs through the same identity-keyed delete-then-insert path as
    /// [`TermIndex::add_terms`], so invoking it twice for one project
    /// cannot duplicate documents.
    pub fn add_predefined_vocabularies_to_project(&self, project_id: &str) -> Result<()> {
        if project_id.is_empty() {
            return Err(IndexError::ScopeRequired);
        }
        if !is_project_scope(project_id) {
            return Err(IndexError::InvalidScope(project_id.to_string()));
        }
        let (classes, properties) = self.scope_terms(GLOBAL_SCOPE)?;
        self.add_terms(project_id, TermType::Class, &classes)?;
        self.add_terms(project_id, TermType::Property, &properties)?;
        tracing::debug!(
            project = project_id,
            classes = classes.len(),
            properties = properties.len(),
            "copied predefined vocabularies into project scope"
        );
        Ok(())
    }

    /// Remove every term of `scope` whose prefix is not in `keep_prefixes`.
    ///
    /// Other scopes are untouched. The set of indexed prefixes is read from
    /// the committed snapshot.
    pub fn synchronize(&self, scope: &str, keep_prefixes: &HashSet<String>) -> Result<()> {
        let indexed = self.indexed_prefixes(scope)?;
        let stale: Vec<&String> = indexed
            .iter()
            .filter(|prefix| !keep_prefixes.contains(*prefix))
            .collect();
        if stale.is_empty() {
            return Ok(());
        }
        let writer = self.writer()?;
        for prefix in &stale {
            writer.delete_term(TantivyTerm::from_field_text(
                self.fields.scope_prefix,
                &scope_prefix_key(scope, prefix),
            ));
        }
        drop(writer);
        self.dirty.store(true, Ordering::Release);
        tracing::debug!(scope, removed = stale.len(), "synchronized scope");
        Ok(())
    }

    /// Distinct vocabulary prefixes with committed documents under `scope`.
    pub fn indexed_prefixes(&self, scope: &str) -> Result<BTreeSet<String>> {
        if scope.is_empty() {
            return Err(IndexError::ScopeRequired);
        }
        let searcher = self.reader.searcher();
        let scope_query = TermQuery::new(
            TantivyTerm::from_field_text(self.fields.scope, scope),
            IndexRecordOption::Basic,
        );
        let addresses = searcher.search(&scope_query, &DocSetCollector)?;
        let mut prefixes = BTreeSet::new();
        for address in addresses {
            let doc: TantivyDocument = searcher.doc(address)?;
            if let Some(prefix) = doc.get_first(self.fields.prefix).and_then(|v| v.as_str()) {
                prefixes.insert(prefix.to_string());
            }
        }
        Ok(prefixes)
    }

    /// Commit pending writes and refresh the read snapshot.
    ///
    /// A no-op when nothing is pending; otherwise visibility changes
    /// atomically at this commit boundary, never per document.
    pub fn update(&self) -> Result<()> {
        if !self.dirty.swap(false, Ordering::AcqRel) {
            return Ok(());
        }
        let result = self.commit_and_reload();
        if result.is_err() {
            self.dirty.store(true, Ordering::Release);
        }
        result
    }

    /// Number of documents visible to searches.
    pub fn visible_documents(&self) -> u64 {
        self.reader.searcher().num_docs()
    }

    fn commit_and_reload(&self) -> Result<()> {
        let mut writer = self.writer()?;
        writer.commit()?;
        drop(writer);
        self.reader.reload()?;
        Ok(())
    }

    fn writer(&self) -> Result<MutexGuard<'_, IndexWriter>> {
        self.writer.lock().map_err(|_| IndexError::WriterPoisoned)
    }

    fn search_terms(&self, query: &str, scope: &str, term_type: TermType) -> Result<Vec<Term>> {
        let searcher = self.reader.searcher();

        let mut clauses: Vec<(Occur, Box<dyn Query>)> = vec![
            (
                Occur::Must,
                Box::new(TermQuery::new(
                    TantivyTerm::from_field_text(self.fields.scope, scope),
                    IndexRecordOption::Basic,
                )),
            ),
            (
                Occur::Must,
                Box::new(TermQuery::new(
                    TantivyTerm::from_field_text(self.fields.term_type, term_type.as_str()),
                    IndexRecordOption::Basic,
                )),
            ),
        ];
        if let Some(text_clause) = self.text_clause(query)? {
            clauses.push((Occur::Must, text_clause));
        }

        let top_docs = searcher.search(
            &BooleanQuery::new(clauses),
            &TopDocs::with_limit(MAX_RESULTS),
        )?;
        let mut results = Vec::with_capacity(top_docs.len());
        for (_score, address) in top_docs {
            let doc: TantivyDocument = searcher.doc(address)?;
            if let Some(term) = self.term_from_doc(&doc) {
                results.push(term);
            }
        }
        Ok(results)
    }

    /// Text restriction for a query; `None` for a blank query, which lists
    /// everything in `(scope, term_type)`.
    fn text_clause(&self, query: &str) -> Result<Option<Box<dyn Query>>> {
        let trimmed = query.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }
        let clause = match trimmed.split_once(':') {
            Some((prefix, local)) => self.qualified_clause(prefix, local)?,
            None => self.unqualified_clause(trimmed)?,
        };
        Ok(Some(clause))
    }

    /// `p:l` - `p` must equal the term's prefix exactly; the tokens of a
    /// non-empty `l` each prefix-match the local part, OR'd together.
    fn qualified_clause(&self, prefix: &str, local: &str) -> Result<Box<dyn Query>> {
        let mut clauses: Vec<(Occur, Box<dyn Query>)> = vec![(
            Occur::Must,
            Box::new(TermQuery::new(
                TantivyTerm::from_field_text(self.fields.prefix, &prefix.to_lowercase()),
                IndexRecordOption::Basic,
            )),
        )];
        let tokens: Vec<String> = local.split_whitespace().map(str::to_lowercase).collect();
        if !tokens.is_empty() {
            let mut local_clauses: Vec<(Occur, Box<dyn Query>)> = Vec::new();
            for token in &tokens {
                local_clauses.push((
                    Occur::Should,
                    prefix_query(self.fields.local_part, token)?,
                ));
            }
            clauses.push((Occur::Must, Box::new(BooleanQuery::new(local_clauses))));
        }
        Ok(Box::new(BooleanQuery::new(clauses)))
    }

    /// Unqualified text: the whole query prefix-matches the vocabulary
    /// prefix, or any whitespace token prefix-matches a token of the local
    /// part, description, or label.
    fn unqualified_clause(&self, query: &str) -> Result<Box<dyn Query>> {
        let mut clauses: Vec<(Occur, Box<dyn Query>)> = vec![(
            Occur::Should,
            prefix_query(self.fields.prefix, &query.to_lowercase())?,
        )];
        for token in query.split_whitespace() {
            let token = token.to_lowercase();
            for field in [
                self.fields.local_part,
                self.fields.description,
                self.fields.label,
            ] {
                clauses.push((Occur::Should, prefix_query(field, &token)?));
            }
        }
        Ok(Box::new(BooleanQuery::new(clauses)))
    }

    /// All committed terms under `scope`, split by kind.
    fn scope_terms(&self, scope: &str) -> Result<(Vec<Term>, Vec<Term>)> {
        let searcher = self.reader.searcher();
        let scope_query = TermQuery::new(
            TantivyTerm::from_field_text(self.fields.scope, scope),
            IndexRecordOption::Basic,
        );
        let addresses = searcher.search(&scope_query, &DocSetCollector)?;
        let mut classes = Vec::new();
        let mut properties = Vec::new();
        for address in addresses {
            let doc: TantivyDocument = searcher.doc(address)?;
            if let Some(term) = self.term_from_doc(&doc) {
                match term.term_type {
                    TermType::Class => classes.push(term),
                    TermType::Property => properties.push(term),
                }
            }
        }
        Ok((classes, properties))
    }

    fn term_from_doc(&self, doc: &TantivyDocument) -> Option<Term> {
        let text = |field: Field| {
            doc.get_first(field)
                .and_then(|value| value.as_str())
                .unwrap_or("")
                .to_string()
        };
        let iri = doc.get_first(self.fields.iri)?.as_str()?.to_string();
        let term_type = TermType::parse(
            doc.get_first(self.fields.term_type)
                .and_then(|value| value.as_str())
                .unwrap_or(""),
        )?;
        Some(Term {
            iri,
            label: text(self.fields.label),
            description: text(self.fields.description),
            prefix: text(self.fields.prefix),
            namespace: text(self.fields.namespace),
            local_part: text(self.fields.local_part),
            term_type,
        })
    }
}

impl std::fmt::Debug for TermIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TermIndex")
            .field("visible_documents", &self.visible_documents())
            .field("dirty", &self.dirty.load(Ordering::Acquire))
            .finish()
    }
}

fn open_or_create(dir: &Path) -> Result<Index> {
    if dir.join("meta.json").exists() {
        match Index::open_in_dir(dir) {
            Ok(index) => {
                if TermFields::resolve(&index.schema()).is_some() {
                    return Ok(index);
                }
                relocate_incompatible(dir, "schema belongs to a different engine generation")?;
            }
            Err(err) if is_format_incompatibility(&err) => {
                relocate_incompatible(dir, &err.to_string())?;
            }
            Err(err) => return Err(err.into()),
        }
    } else {
        std::fs::create_dir_all(dir)?;
    }
    Ok(Index::create_in_dir(dir, build_schema())?)
}

/// Move an unreadable index directory to the fixed `<dir>-old` sibling,
/// replacing any earlier relocation, and leave an empty `dir` behind.
fn relocate_incompatible(dir: &Path, reason: &str) -> Result<()> {
    let name = dir
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "term-index".to_string());
    let old = dir.with_file_name(format!("{name}-old"));
    if old.exists() {
        std::fs::remove_dir_all(&old)?;
    }
    std::fs::rename(dir, &old)?;
    std::fs::create_dir_all(dir)?;
    tracing::warn!(
        index_dir = %dir.display(),
        relocated_to = %old.display(),
        reason,
        "term index unreadable by this engine; starting fresh"
    );
    Ok(())
}

/// Whether an open failure means "this index was written by an
/// incompatible engine" rather than a plain I/O problem.
fn is_format_incompatibility(err: &tantivy::TantivyError) -> bool {
    let message = err.to_string().to_lowercase();
    message.contains("incompatible")
        || message.contains("footer")
        || message.contains("corrupt")
        || message.contains("schema")
        || message.contains("meta.json")
        || message.contains("deserialize")
}

/// Raw delete key for one `(scope, term_type, term)` document: a digest of
/// the full identity tuple.
fn identity_key(scope: &str, term_type: TermType, term: &Term) -> String {
    let mut hasher = Sha256::new();
    for part in [
        scope,
        term_type.as_str(),
        term.iri.as_str(),
        term.label.as_str(),
        term.description.as_str(),
        term.prefix.as_str(),
        term.namespace.as_str(),
        term.local_part.as_str(),
    ] {
        hasher.update(part.as_bytes());
        hasher.update([0x1f]);
    }
    hex::encode(hasher.finalize())
}

fn scope_prefix_key(scope: &str, prefix: &str) -> String {
    format!("{scope}{KEY_SEP}{prefix}")
}

fn prefix_query(field: Field, token: &str) -> Result<Box<dyn Query>> {
    let pattern = format!("{}.*", escape_regex(token));
    Ok(Box::new(RegexQuery::from_pattern(&pattern, field)?))
}

/// Escape regex metacharacters so a token matches literally.
fn escape_regex(token: &str) -> String {
    let mut out = String::with_capacity(token.len() + 4);
    for c in token.chars() {
        if matches!(
            c,
            '.' | '+' | '*' | '?' | '(' | ')' | '[' | ']' | '{' | '}' | '|' | '^' | '$' | '\\'
        ) {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

// Tiny hex encoder; not worth a crate dependency.
mod hex {
    pub fn encode(bytes: impl AsRef<[u8]>) -> String {
        bytes.as_ref().iter().map(|b| format!("{b:02x}")).collect()
    }
}
