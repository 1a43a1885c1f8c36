//! Batched, deduplicating writer for code-intelligence index uploads.
//!
//! The writer consumes per-file documents from an external producer, buffers
//! them up to a payload/row ceiling, and on each flush deduplicates the batch
//! by content hash, builds a shared symbol-name dictionary over the batch
//! (see `cindex-symbols`), compresses each symbol's occurrence ranges (see
//! `cindex-ranges`) and emits rows to a backing [`store::IndexStore`].
//!
//! The core is synchronous and owns no shared state: callers needing
//! throughput run one writer per upload. Every failure is fail-fast and
//! surfaces to the caller, which owns transaction rollback for the upload.

pub mod cancel;
pub mod document;
pub mod hash;
pub mod rows;
pub mod store;
pub mod writer;

pub use cancel::CancellationToken;
pub use document::{DocumentPayload, OccurrenceIndexEntry};
pub use hash::ContentHash;
pub use store::IndexStore;
pub use writer::{IndexMode, SymbolWriter, WriterOptions, WriterParams};
