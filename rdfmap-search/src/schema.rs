//! Index schema for term documents.
//!
//! Two field families:
//!
//! - exact fields (`scope`, `term_type`, `identity`, `scope_prefix`, `iri`)
//!   are raw terms used for filtering and writer-side deletes;
//! - match fields (`prefix`, `local_part`, `label`, `description`) back the
//!   autocomplete grammar. `prefix` and `local_part` index as one lowercased
//!   token so both exact equality and prefix matching work; `label` and
//!   `description` are word-tokenized.
//!
//! Stored values keep the original casing, so search results round-trip the
//! extracted term verbatim.

use tantivy::schema::{
    Field, IndexRecordOption, Schema, TextFieldIndexing, TextOptions, STORED, STRING,
};
use tantivy::tokenizer::{LowerCaser, RawTokenizer, TextAnalyzer};
use tantivy::Index;

/// Tokenizer producing a single lowercased token per value.
pub(crate) const TOKENIZER_EXACT_LOWER: &str = "exact_lc";

/// Resolved handles for every field of the term schema.
#[derive(Debug, Clone, Copy)]
pub(crate) struct TermFields {
    pub scope: Field,
    pub term_type: Field,
    pub identity: Field,
    pub scope_prefix: Field,
    pub iri: Field,
    pub prefix: Field,
    pub namespace: Field,
    pub local_part: Field,
    pub label: Field,
    pub description: Field,
}

impl TermFields {
    /// Resolve the handles against a loaded schema. `None` means the
    /// on-disk schema belongs to a different engine generation.
    pub(crate) fn resolve(schema: &Schema) -> Option<TermFields> {
        Some(TermFields {
            scope: schema.get_field("scope").ok()?,
            term_type: schema.get_field("term_type").ok()?,
            identity: schema.get_field("identity").ok()?,
            scope_prefix: schema.get_field("scope_prefix").ok()?,
            iri: schema.get_field("iri").ok()?,
            prefix: schema.get_field("prefix").ok()?,
            namespace: schema.get_field("namespace").ok()?,
            local_part: schema.get_field("local_part").ok()?,
            label: schema.get_field("label").ok()?,
            description: schema.get_field("description").ok()?,
        })
    }
}

/// Build the term document schema.
pub(crate) fn build_schema() -> Schema {
    let mut builder = Schema::builder();

    let exact_lower = TextOptions::default()
        .set_indexing_options(
            TextFieldIndexing::default()
                .set_tokenizer(TOKENIZER_EXACT_LOWER)
                .set_index_option(IndexRecordOption::Basic),
        )
        .set_stored();
    let word_text = TextOptions::default()
        .set_indexing_options(
            TextFieldIndexing::default()
                .set_tokenizer("default")
                .set_index_option(IndexRecordOption::WithFreqsAndPositions),
        )
        .set_stored();

    builder.add_text_field("scope", STRING);
    builder.add_text_field("term_type", STRING | STORED);
    builder.add_text_field("identity", STRING);
    builder.add_text_field("scope_prefix", STRING);
    builder.add_text_field("iri", STRING | STORED);
    builder.add_text_field("prefix", exact_lower.clone());
    builder.add_text_field("namespace", STORED);
    builder.add_text_field("local_part", exact_lower);
    builder.add_text_field("label", word_text.clone());
    builder.add_text_field("description", word_text);

    builder.build()
}

/// Register the custom analyzers on a freshly opened or created index.
pub(crate) fn register_tokenizers(index: &Index) {
    let exact_lower = TextAnalyzer::builder(RawTokenizer::default())
        .filter(LowerCaser)
        .build();
    index
        .tokenizers()
        .register(TOKENIZER_EXACT_LOWER, exact_lower);
}
