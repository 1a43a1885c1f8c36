//! The relational-store seam consumed by the writer.

pub mod memory;

use cindex_common::Result;

use crate::hash::ContentHash;
use crate::rows::{
    DocumentId, DocumentLookupId, DocumentLookupRow, DocumentRow, SymbolNameRow,
    SymbolOccurrenceRow, UploadId,
};

pub use memory::InMemoryStore;

/// Storage collaborator for one index upload.
///
/// Implementations are expected to sit on top of a relational store with
/// "insert, ignore duplicates" bulk semantics and a staging-then-copy-down
/// area for symbol rows: `stage_*` accumulates permanent-looking rows in a
/// per-connection temporary area, and `commit_*` copies them into durable
/// tables tagged with the upload id. The writer performs no retries and no
/// partial-failure compensation; any error aborts the surrounding upload
/// transaction.
pub trait IndexStore {
    /// Bulk-inserts document rows keyed by content hash, skipping rows whose
    /// hash already exists (in this batch or previously). Returns the ids of
    /// the newly inserted rows in input order; the result may therefore be
    /// shorter than `rows`.
    fn insert_documents(&mut self, rows: Vec<DocumentRow>) -> Result<Vec<DocumentId>>;

    /// Resolves document ids for the given distinct content hashes. Hashes
    /// unknown to the store are absent from the result.
    fn resolve_documents(
        &mut self,
        hashes: &[ContentHash],
    ) -> Result<Vec<(ContentHash, DocumentId)>>;

    /// Inserts one lookup row per `(upload, path)` pair, returning ids in
    /// input order.
    fn insert_document_lookups(
        &mut self,
        rows: Vec<DocumentLookupRow>,
    ) -> Result<Vec<DocumentLookupId>>;

    /// Stages symbol-name dictionary rows for a later commit.
    fn stage_symbol_names(&mut self, rows: Vec<SymbolNameRow>) -> Result<()>;

    /// Stages symbol-occurrence rows for a later commit.
    fn stage_symbol_occurrences(&mut self, rows: Vec<SymbolOccurrenceRow>) -> Result<()>;

    /// Copies all staged symbol-name rows into permanent storage tagged with
    /// `upload_id`, returning the number of rows moved.
    fn commit_symbol_names(&mut self, upload_id: UploadId) -> Result<u64>;

    /// Copies all staged symbol-occurrence rows into permanent storage
    /// tagged with `upload_id`, returning the number of rows moved.
    fn commit_symbol_occurrences(&mut self, upload_id: UploadId) -> Result<u64>;
}
