//! Shared symbol-name dictionary built as a three-stage prefix trie.
//!
//! Symbol names within one index batch share long prefixes (package paths,
//! type qualifiers), so storing each name as a row of its own wastes space.
//! This crate builds a prefix dictionary over a batch's distinct names and
//! assigns every dictionary node a stable integer identifier, letting the
//! store persist each name as a chain of short segments.
//!
//! Construction runs through three distinct immutable representations:
//!
//! 1. [`rune::RuneTrie`] — a plain one-edge-per-character trie.
//! 2. [`compressed::CompressedTrie`] — single-child chains collapsed into
//!    multi-character edges, balanced against per-node identifier stability.
//! 3. [`frozen::FrozenTrie`] — pre-order sequential identifiers assigned from
//!    a caller-supplied cursor, so successive builds within one writer chain
//!    onto a single monotonically increasing identifier space.

pub mod compressed;
pub mod frozen;
pub mod rune;

pub use frozen::FrozenTrie;

use compressed::CompressedTrie;
use rune::RuneTrie;

/// Builds a frozen symbol dictionary over `values`, assigning node
/// identifiers sequentially from `start_id`.
///
/// Returns the trie together with the first identifier *not* assigned, which
/// the caller must feed into its next build to keep identifier spaces
/// disjoint across batches.
pub fn build_trie<I, S>(values: I, start_id: u64) -> (FrozenTrie, u64)
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut rune_trie = RuneTrie::default();
    for value in values {
        rune_trie.insert(value.as_ref());
    }
    FrozenTrie::freeze(&CompressedTrie::from_rune(&rune_trie), start_id)
}
