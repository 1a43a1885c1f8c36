//! The producer seam: documents and their extracted occurrence indexes.

use cindex_common::Result;

/// A parsed per-file document handed over by the upload producer.
///
/// The core never parses the producer's wire format. It only needs two pure
/// views of a document: its canonical serialized bytes (hashed for
/// deduplication, compressed for storage) and, for precise indexes, its
/// inverted occurrence index.
pub trait DocumentPayload {
    /// Returns the canonical serialized bytes of this document. The content
    /// hash is computed over exactly these bytes, so the encoding must be
    /// deterministic.
    fn encode(&self) -> Result<Vec<u8>>;

    /// Extracts the per-symbol occurrence index of this document: one entry
    /// per symbol name with at least one occurrence, each range list a flat
    /// multiple-of-four sequence of `(start_line, start_char, end_line,
    /// end_char)` integers, conventionally sorted by start line.
    fn occurrence_index(&self) -> Vec<OccurrenceIndexEntry>;
}

/// One symbol's classified occurrence ranges within a single document.
#[derive(Debug, Clone, Default)]
pub struct OccurrenceIndexEntry {
    pub symbol_name: String,
    pub definition_ranges: Vec<i32>,
    pub reference_ranges: Vec<i32>,
    pub implementation_ranges: Vec<i32>,
    pub type_definition_ranges: Vec<i32>,
}
