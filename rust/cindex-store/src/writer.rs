//! Buffering, deduplicating document writer.

use ahash::{AHashMap, AHashSet};
use std::collections::BTreeSet;

use cindex_common::{Result, error::Error, verify_data};
use cindex_ranges::encode_ranges;
use cindex_symbols::build_trie;

use crate::cancel::CancellationToken;
use crate::document::{DocumentPayload, OccurrenceIndexEntry};
use crate::hash::ContentHash;
use crate::rows::{
    DocumentId, DocumentLookupId, DocumentLookupRow, DocumentRow, SymbolNameRow,
    SymbolOccurrenceRow, UploadId,
};
use crate::store::IndexStore;

/// Compression level for persisted document payloads; the zstd default,
/// chosen for write throughput over ratio.
const PAYLOAD_COMPRESSION_LEVEL: i32 = 3;

/// Buffering ceilings for one writer. The bounds exist to cap peak memory
/// and per-statement row counts, not for correctness.
#[derive(Debug, Clone, Copy)]
pub struct WriterOptions {
    /// Implicit flush threshold on buffered document count.
    pub max_buffered_documents: usize,
    /// Implicit flush threshold on buffered raw (uncompressed) bytes.
    pub max_buffered_bytes: usize,
}

impl Default for WriterOptions {
    fn default() -> WriterOptions {
        WriterOptions {
            max_buffered_documents: 256,
            max_buffered_bytes: 32 * 1024 * 1024,
        }
    }
}

/// Whether an upload carries precise symbol data.
///
/// Syntactic indexes skip all symbol-dictionary work: fuzzy matching against
/// the dictionary structure is not supported for them, so only document and
/// lookup rows are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexMode {
    Precise,
    SyntacticOnly,
}

/// Configuration for one [`SymbolWriter`].
#[derive(Debug, Clone)]
pub struct WriterParams {
    pub upload_id: UploadId,
    pub mode: IndexMode,
    pub options: WriterOptions,
    pub cancellation: CancellationToken,
}

impl WriterParams {
    pub fn new(upload_id: UploadId, mode: IndexMode) -> WriterParams {
        WriterParams {
            upload_id,
            mode,
            options: Default::default(),
            cancellation: Default::default(),
        }
    }
}

/// Synchronous, single-upload writer that buffers documents and emits
/// deduplicated rows to a backing [`IndexStore`].
///
/// The writer owns the symbol-identifier cursor for its upload: every trie
/// build starts at the cursor and stores the returned next id back, so
/// identifiers never collide across flushes of one writer instance.
/// Independent writers (independent uploads) own independent cursors.
pub struct SymbolWriter<S, D> {
    store: S,
    params: WriterParams,
    buffer: Vec<BufferedDocument<D>>,
    buffered_bytes: usize,
    next_symbol_id: u64,
    occurrence_count: u64,
}

struct BufferedDocument<D> {
    path: String,
    document: D,
    raw_size: u64,
    payload: Vec<u8>,
    content_hash: ContentHash,
}

impl<S, D> SymbolWriter<S, D>
where
    S: IndexStore,
    D: DocumentPayload,
{
    pub fn new(store: S, params: WriterParams) -> SymbolWriter<S, D> {
        SymbolWriter {
            store,
            params,
            buffer: Vec::new(),
            buffered_bytes: 0,
            next_symbol_id: 0,
            occurrence_count: 0,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Serializes, compresses and hashes `document`, then buffers it.
    ///
    /// Triggers an implicit flush (and therefore storage I/O) once the
    /// buffer reaches either of the configured ceilings.
    pub fn insert_document(&mut self, path: impl Into<String>, document: D) -> Result<()> {
        let bytes = document.encode()?;
        let payload = zstd::bulk::compress(&bytes, PAYLOAD_COMPRESSION_LEVEL)
            .map_err(|e| Error::io("compress document payload", e))?;
        let content_hash = ContentHash::of(&bytes);
        self.buffered_bytes += bytes.len();
        self.buffer.push(BufferedDocument {
            path: path.into(),
            document,
            raw_size: bytes.len() as u64,
            payload,
            content_hash,
        });

        if self.buffer.len() >= self.params.options.max_buffered_documents
            || self.buffered_bytes >= self.params.options.max_buffered_bytes
        {
            self.flush_batch()?;
        }
        Ok(())
    }

    /// Flushes any remaining buffered documents, then (precise mode only)
    /// moves staged symbol rows into permanent storage: name rows first,
    /// occurrence rows second. Returns the total number of symbol-occurrence
    /// rows written across the writer's lifetime.
    pub fn flush(&mut self) -> Result<u64> {
        self.flush_batch()?;
        if self.params.mode == IndexMode::Precise {
            self.params.cancellation.check("commit symbol names")?;
            self.store.commit_symbol_names(self.params.upload_id)?;
            self.params.cancellation.check("commit symbol occurrences")?;
            self.store.commit_symbol_occurrences(self.params.upload_id)?;
        }
        Ok(self.occurrence_count)
    }

    fn flush_batch(&mut self) -> Result<()> {
        if self.buffer.is_empty() {
            return Ok(());
        }
        let batch = std::mem::take(&mut self.buffer);
        self.buffered_bytes = 0;

        let document_ids = self.write_documents(&batch)?;
        let lookup_ids = self.write_lookups(&batch, &document_ids)?;

        if self.params.mode == IndexMode::SyntacticOnly {
            log::debug!(
                "flushed {} syntactic documents for upload {}",
                batch.len(),
                self.params.upload_id
            );
            return Ok(());
        }
        self.write_symbols(&batch, &lookup_ids)
    }

    /// Inserts the batch's document rows with insert-new-only semantics and
    /// resolves one document id per buffered document, in batch order.
    fn write_documents(&mut self, batch: &[BufferedDocument<D>]) -> Result<Vec<DocumentId>> {
        self.params.cancellation.check("insert documents")?;
        let rows: Vec<DocumentRow> = batch
            .iter()
            .map(|doc| DocumentRow {
                content_hash: doc.content_hash,
                raw_size: doc.raw_size,
                payload: doc.payload.clone(),
            })
            .collect();
        let inserted_ids = self.store.insert_documents(rows)?;

        let ids_by_hash: AHashMap<ContentHash, DocumentId> = if inserted_ids.len() == batch.len() {
            // Nothing collided, in this batch or previously; the returned
            // ids line up with the batch.
            batch
                .iter()
                .map(|doc| doc.content_hash)
                .zip(inserted_ids)
                .collect()
        } else {
            // Some hash already existed. Re-resolve the full distinct-hash
            // set; the store must account for every one of them.
            let mut seen = AHashSet::new();
            let distinct_hashes: Vec<ContentHash> = batch
                .iter()
                .map(|doc| doc.content_hash)
                .filter(|hash| seen.insert(*hash))
                .collect();
            self.params.cancellation.check("resolve documents")?;
            let resolved = self.store.resolve_documents(&distinct_hashes)?;
            if resolved.len() != distinct_hashes.len() {
                return Err(Error::reconciliation(distinct_hashes.len(), resolved.len()));
            }
            resolved.into_iter().collect()
        };

        batch
            .iter()
            .map(|doc| {
                ids_by_hash
                    .get(&doc.content_hash)
                    .copied()
                    .ok_or_else(|| Error::reconciliation(batch.len(), ids_by_hash.len()))
            })
            .collect()
    }

    fn write_lookups(
        &mut self,
        batch: &[BufferedDocument<D>],
        document_ids: &[DocumentId],
    ) -> Result<Vec<DocumentLookupId>> {
        self.params.cancellation.check("insert document lookups")?;
        let rows: Vec<DocumentLookupRow> = batch
            .iter()
            .zip(document_ids)
            .map(|(doc, &document_id)| DocumentLookupRow {
                upload_id: self.params.upload_id,
                path: doc.path.clone(),
                document_id,
            })
            .collect();
        let lookup_ids = self.store.insert_document_lookups(rows)?;
        verify_data!(document_lookups, lookup_ids.len() == batch.len());
        Ok(lookup_ids)
    }

    /// Builds the batch's symbol dictionary from the writer's identifier
    /// cursor, stages its rows, then stages one occurrence row per
    /// `(document, symbol)` pair with the ranges encoded.
    fn write_symbols(
        &mut self,
        batch: &[BufferedDocument<D>],
        lookup_ids: &[DocumentLookupId],
    ) -> Result<()> {
        let indexes: Vec<(DocumentLookupId, Vec<OccurrenceIndexEntry>)> = batch
            .iter()
            .zip(lookup_ids)
            .map(|(doc, &lookup_id)| (lookup_id, doc.document.occurrence_index()))
            .collect();

        let symbol_names: BTreeSet<&str> = indexes
            .iter()
            .flat_map(|(_, entries)| entries.iter().map(|entry| entry.symbol_name.as_str()))
            .collect();

        let (trie, next_symbol_id) = build_trie(&symbol_names, self.next_symbol_id);
        self.next_symbol_id = next_symbol_id;

        let mut name_rows = Vec::with_capacity(trie.len());
        trie.traverse(|id, parent_id, segment| {
            name_rows.push(SymbolNameRow {
                id,
                name_segment: segment.to_string(),
                parent_id,
            });
            Ok(())
        })?;
        self.params.cancellation.check("stage symbol names")?;
        self.store.stage_symbol_names(name_rows)?;

        let mut occurrence_rows = Vec::new();
        for (lookup_id, entries) in &indexes {
            for entry in entries {
                let symbol_id = trie.search(&entry.symbol_name).ok_or_else(|| {
                    Error::trie_consistency(format!(
                        "symbol {:?} missing from freshly built dictionary",
                        entry.symbol_name
                    ))
                })?;
                occurrence_rows.push(SymbolOccurrenceRow {
                    document_lookup_id: *lookup_id,
                    symbol_id,
                    definition_ranges: encode_ranges(&entry.definition_ranges)?,
                    reference_ranges: encode_ranges(&entry.reference_ranges)?,
                    implementation_ranges: encode_ranges(&entry.implementation_ranges)?,
                    type_definition_ranges: encode_ranges(&entry.type_definition_ranges)?,
                });
            }
        }
        self.occurrence_count += occurrence_rows.len() as u64;
        self.params.cancellation.check("stage symbol occurrences")?;
        self.store.stage_symbol_occurrences(occurrence_rows)?;

        log::debug!(
            "flushed {} documents, {} symbols for upload {}",
            batch.len(),
            symbol_names.len(),
            self.params.upload_id
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use cindex_common::{Result, error::ErrorKind};

    use super::{IndexMode, SymbolWriter, WriterParams};
    use crate::document::{DocumentPayload, OccurrenceIndexEntry};
    use crate::hash::ContentHash;
    use crate::rows::{DocumentId, DocumentRow};
    use crate::store::{IndexStore, InMemoryStore};

    struct StubDocument {
        text: String,
        symbols: Vec<&'static str>,
    }

    impl StubDocument {
        fn new(text: impl Into<String>, symbols: &[&'static str]) -> StubDocument {
            StubDocument {
                text: text.into(),
                symbols: symbols.to_vec(),
            }
        }
    }

    impl DocumentPayload for StubDocument {
        fn encode(&self) -> Result<Vec<u8>> {
            Ok(self.text.as_bytes().to_vec())
        }

        fn occurrence_index(&self) -> Vec<OccurrenceIndexEntry> {
            self.symbols
                .iter()
                .map(|name| OccurrenceIndexEntry {
                    symbol_name: name.to_string(),
                    definition_ranges: vec![0, 0, 0, 5],
                    reference_ranges: vec![3, 4, 3, 9, 7, 4, 7, 9],
                    ..Default::default()
                })
                .collect()
        }
    }

    fn precise_writer(
        upload_id: u64,
    ) -> SymbolWriter<InMemoryStore, StubDocument> {
        SymbolWriter::new(
            InMemoryStore::new(),
            WriterParams::new(upload_id, IndexMode::Precise),
        )
    }

    #[test]
    fn test_identical_documents_collapse() {
        let mut writer = precise_writer(1);
        writer
            .insert_document("a.go", StubDocument::new("package main", &["main"]))
            .unwrap();
        writer
            .insert_document("b.go", StubDocument::new("package main", &["main"]))
            .unwrap();
        writer.flush().unwrap();

        let store = writer.into_store();
        assert_eq!(store.documents().len(), 1);
        assert_eq!(store.lookups().len(), 2);
        assert_eq!(store.lookups()[0].document_id, store.lookups()[1].document_id);
    }

    #[test]
    fn test_batch_boundary_triggers_one_implicit_flush() {
        let mut writer = precise_writer(1);
        for i in 0..300 {
            writer
                .insert_document(
                    format!("file{i}.go"),
                    StubDocument::new(format!("document {i}"), &["sym"]),
                )
                .unwrap();
            // Exactly one implicit flush before the explicit one.
            let flushed = writer.store().lookups().len();
            assert_eq!(flushed, if i < 255 { 0 } else { 256 });
        }
        writer.flush().unwrap();
        assert_eq!(writer.store().lookups().len(), 300);
        assert_eq!(writer.store().documents().len(), 300);
    }

    #[test]
    fn test_byte_ceiling_triggers_flush() {
        let mut writer: SymbolWriter<InMemoryStore, StubDocument> = SymbolWriter::new(
            InMemoryStore::new(),
            WriterParams {
                options: super::WriterOptions {
                    max_buffered_documents: 1000,
                    max_buffered_bytes: 16,
                },
                ..WriterParams::new(1, IndexMode::Precise)
            },
        );
        writer
            .insert_document("a.go", StubDocument::new("0123456789abcdef", &["a"]))
            .unwrap();
        assert_eq!(writer.store().lookups().len(), 1);
    }

    #[test]
    fn test_syntactic_mode_skips_symbol_work() {
        let mut writer: SymbolWriter<InMemoryStore, StubDocument> = SymbolWriter::new(
            InMemoryStore::new(),
            WriterParams::new(1, IndexMode::SyntacticOnly),
        );
        writer
            .insert_document("a.go", StubDocument::new("package main", &["main"]))
            .unwrap();
        let written = writer.flush().unwrap();
        assert_eq!(written, 0);

        let store = writer.into_store();
        assert_eq!(store.lookups().len(), 1);
        assert!(store.staged_names().is_empty());
        assert!(store.names(1).is_empty());
        assert!(store.occurrences(1).is_empty());
    }

    #[test]
    fn test_symbol_ids_continue_across_flushes() {
        let mut writer = precise_writer(1);
        writer
            .insert_document("a.go", StubDocument::new("one", &["alpha", "beta"]))
            .unwrap();
        writer.flush().unwrap();
        writer
            .insert_document("b.go", StubDocument::new("two", &["gamma"]))
            .unwrap();
        writer.flush().unwrap();

        let store = writer.into_store();
        let mut ids: Vec<u64> = store.names(1).iter().map(|row| row.id).collect();
        let total = ids.len();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), total, "identifier reuse across flushes");
    }

    #[test]
    fn test_cancellation_aborts_flush() {
        let params = WriterParams::new(1, IndexMode::Precise);
        let token = params.cancellation.clone();
        let mut writer: SymbolWriter<InMemoryStore, StubDocument> =
            SymbolWriter::new(InMemoryStore::new(), params);
        writer
            .insert_document("a.go", StubDocument::new("package main", &["main"]))
            .unwrap();
        token.cancel();
        let err = writer.flush().unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::Cancelled { .. }));
        assert!(writer.store().lookups().is_empty());
    }

    /// A store that accepts no documents and resolves no hashes, forcing the
    /// dedup reconciliation path to come up short.
    #[derive(Default)]
    struct AmnesiacStore(InMemoryStore);

    impl IndexStore for AmnesiacStore {
        fn insert_documents(&mut self, _rows: Vec<DocumentRow>) -> Result<Vec<DocumentId>> {
            Ok(Vec::new())
        }

        fn resolve_documents(
            &mut self,
            _hashes: &[ContentHash],
        ) -> Result<Vec<(ContentHash, DocumentId)>> {
            Ok(Vec::new())
        }

        fn insert_document_lookups(
            &mut self,
            rows: Vec<crate::rows::DocumentLookupRow>,
        ) -> Result<Vec<crate::rows::DocumentLookupId>> {
            self.0.insert_document_lookups(rows)
        }

        fn stage_symbol_names(&mut self, rows: Vec<crate::rows::SymbolNameRow>) -> Result<()> {
            self.0.stage_symbol_names(rows)
        }

        fn stage_symbol_occurrences(
            &mut self,
            rows: Vec<crate::rows::SymbolOccurrenceRow>,
        ) -> Result<()> {
            self.0.stage_symbol_occurrences(rows)
        }

        fn commit_symbol_names(&mut self, upload_id: u64) -> Result<u64> {
            self.0.commit_symbol_names(upload_id)
        }

        fn commit_symbol_occurrences(&mut self, upload_id: u64) -> Result<u64> {
            self.0.commit_symbol_occurrences(upload_id)
        }
    }

    #[test]
    fn test_unresolvable_hashes_fail_reconciliation() {
        let mut writer: SymbolWriter<AmnesiacStore, StubDocument> = SymbolWriter::new(
            AmnesiacStore::default(),
            WriterParams::new(1, IndexMode::Precise),
        );
        writer
            .insert_document("a.go", StubDocument::new("package main", &["main"]))
            .unwrap();
        let err = writer.flush().unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::Reconciliation { .. }));
    }
}
