//! Row shapes emitted to the backing store.

use crate::hash::ContentHash;

pub type UploadId = u64;
pub type DocumentId = u64;
pub type DocumentLookupId = u64;
pub type SymbolNameId = u64;

/// One deduplicated document row. The payload is the zstd-compressed
/// serialized document; raw bytes are never persisted.
#[derive(Debug, Clone)]
pub struct DocumentRow {
    pub content_hash: ContentHash,
    pub raw_size: u64,
    pub payload: Vec<u8>,
}

/// One `(upload, path)` pair. Multiple lookups may reference the same
/// document row when file contents collide.
#[derive(Debug, Clone)]
pub struct DocumentLookupRow {
    pub upload_id: UploadId,
    pub path: String,
    pub document_id: DocumentId,
}

/// One node of the shared symbol-name dictionary. The full symbol name is
/// the concatenation of `name_segment` values walking from the node to its
/// root (a node with `parent_id = None`).
#[derive(Debug, Clone)]
pub struct SymbolNameRow {
    pub id: SymbolNameId,
    pub name_segment: String,
    pub parent_id: Option<SymbolNameId>,
}

/// One `(document, symbol)` pair with its four range-codec blobs.
#[derive(Debug, Clone)]
pub struct SymbolOccurrenceRow {
    pub document_lookup_id: DocumentLookupId,
    pub symbol_id: SymbolNameId,
    pub definition_ranges: Vec<u8>,
    pub reference_ranges: Vec<u8>,
    pub implementation_ranges: Vec<u8>,
    pub type_definition_ranges: Vec<u8>,
}
