//! In-memory reference implementation of [`IndexStore`].

use ahash::AHashMap;
use cindex_common::Result;

use crate::hash::ContentHash;
use crate::rows::{
    DocumentId, DocumentLookupId, DocumentLookupRow, DocumentRow, SymbolNameRow,
    SymbolOccurrenceRow, UploadId,
};
use crate::store::IndexStore;

/// Append-only in-memory tables with hash-keyed document dedup.
///
/// Mirrors the contract a relational implementation provides: ids are
/// 1-based and dense per table, and symbol rows pass through a staging area
/// until committed. Used by the integration tests and by embedders that want
/// an index without a database.
#[derive(Default)]
pub struct InMemoryStore {
    documents: Vec<DocumentRow>,
    ids_by_hash: AHashMap<ContentHash, DocumentId>,
    lookups: Vec<DocumentLookupRow>,
    staged_names: Vec<SymbolNameRow>,
    staged_occurrences: Vec<SymbolOccurrenceRow>,
    names: Vec<(UploadId, SymbolNameRow)>,
    occurrences: Vec<(UploadId, SymbolOccurrenceRow)>,
}

impl InMemoryStore {
    pub fn new() -> InMemoryStore {
        Default::default()
    }

    pub fn documents(&self) -> &[DocumentRow] {
        &self.documents
    }

    pub fn lookups(&self) -> &[DocumentLookupRow] {
        &self.lookups
    }

    pub fn staged_names(&self) -> &[SymbolNameRow] {
        &self.staged_names
    }

    pub fn staged_occurrences(&self) -> &[SymbolOccurrenceRow] {
        &self.staged_occurrences
    }

    /// Committed symbol-name rows written for `upload_id`.
    pub fn names(&self, upload_id: UploadId) -> Vec<&SymbolNameRow> {
        self.names
            .iter()
            .filter(|(upload, _)| *upload == upload_id)
            .map(|(_, row)| row)
            .collect()
    }

    /// Committed symbol-occurrence rows written for `upload_id`.
    pub fn occurrences(&self, upload_id: UploadId) -> Vec<&SymbolOccurrenceRow> {
        self.occurrences
            .iter()
            .filter(|(upload, _)| *upload == upload_id)
            .map(|(_, row)| row)
            .collect()
    }
}

impl IndexStore for InMemoryStore {
    fn insert_documents(&mut self, rows: Vec<DocumentRow>) -> Result<Vec<DocumentId>> {
        let mut inserted = Vec::new();
        for row in rows {
            if self.ids_by_hash.contains_key(&row.content_hash) {
                continue;
            }
            let id = self.documents.len() as DocumentId + 1;
            self.ids_by_hash.insert(row.content_hash, id);
            self.documents.push(row);
            inserted.push(id);
        }
        Ok(inserted)
    }

    fn resolve_documents(
        &mut self,
        hashes: &[ContentHash],
    ) -> Result<Vec<(ContentHash, DocumentId)>> {
        Ok(hashes
            .iter()
            .filter_map(|hash| self.ids_by_hash.get(hash).map(|&id| (*hash, id)))
            .collect())
    }

    fn insert_document_lookups(
        &mut self,
        rows: Vec<DocumentLookupRow>,
    ) -> Result<Vec<DocumentLookupId>> {
        let first = self.lookups.len() as DocumentLookupId + 1;
        let ids = (first..first + rows.len() as DocumentLookupId).collect();
        self.lookups.extend(rows);
        Ok(ids)
    }

    fn stage_symbol_names(&mut self, rows: Vec<SymbolNameRow>) -> Result<()> {
        self.staged_names.extend(rows);
        Ok(())
    }

    fn stage_symbol_occurrences(&mut self, rows: Vec<SymbolOccurrenceRow>) -> Result<()> {
        self.staged_occurrences.extend(rows);
        Ok(())
    }

    fn commit_symbol_names(&mut self, upload_id: UploadId) -> Result<u64> {
        let moved = self.staged_names.len() as u64;
        self.names
            .extend(self.staged_names.drain(..).map(|row| (upload_id, row)));
        Ok(moved)
    }

    fn commit_symbol_occurrences(&mut self, upload_id: UploadId) -> Result<u64> {
        let moved = self.staged_occurrences.len() as u64;
        self.occurrences
            .extend(self.staged_occurrences.drain(..).map(|row| (upload_id, row)));
        Ok(moved)
    }
}
