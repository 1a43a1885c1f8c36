//! Columnar delta/run-length codec for source-range quadruples.
//!
//! An occurrence index stores, per symbol, flat sequences of
//! `(start_line, start_char, end_line, end_char)` quadruples. These sequences
//! are highly regular: consecutive occurrences tend to sit on nearby lines,
//! span a single line, and have similar widths. The codec exploits this by
//! transposing the quads into four delta-encoded columns and compressing the
//! resulting zero runs, shrinking the common case to a few bytes per
//! occurrence.

pub mod codec;
pub mod varint;

pub use codec::{decode_ranges, encode_ranges};
