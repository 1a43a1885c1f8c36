//! Stage one: a plain one-edge-per-character trie.

use std::collections::BTreeMap;

/// A standard character trie over a set of symbol names.
///
/// Child edges are kept in a `BTreeMap` so later stages observe a
/// deterministic order, making frozen identifier assignment reproducible for
/// a given input set.
#[derive(Debug, Default)]
pub struct RuneTrie {
    pub(crate) root: RuneNode,
}

#[derive(Debug, Default)]
pub(crate) struct RuneNode {
    /// Whether some inserted value ends at this node.
    pub(crate) terminal: bool,
    pub(crate) children: BTreeMap<char, RuneNode>,
}

impl RuneTrie {
    /// Inserts one value, creating a node per character along its path.
    ///
    /// The root is virtual and owns no character, so the empty string is
    /// ignored: it has no node to terminate at.
    pub fn insert(&mut self, value: &str) {
        if value.is_empty() {
            return;
        }
        let mut node = &mut self.root;
        for ch in value.chars() {
            node = node.children.entry(ch).or_default();
        }
        node.terminal = true;
    }
}
