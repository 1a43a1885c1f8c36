//! Stage three: stable identifier assignment over the compressed trie.

use cindex_common::Result;

use crate::compressed::{CompressedNode, CompressedTrie};

/// An immutable symbol dictionary whose nodes carry sequential identifiers.
///
/// Identifiers are assigned in pre-order starting at the `start_id` handed
/// to [`FrozenTrie::freeze`], so a parent's identifier is always smaller
/// than any of its descendants'. The full name of a node is the
/// concatenation of edge segments from a root down to it.
pub struct FrozenTrie {
    roots: Vec<FrozenNode>,
}

struct FrozenNode {
    id: u64,
    segment: String,
    /// Whether this node terminates one of the dictionary's values. Only
    /// terminal nodes are addressable through [`FrozenTrie::search`].
    terminal: bool,
    children: Vec<FrozenNode>,
}

impl FrozenTrie {
    /// Assigns pre-order identifiers starting at `start_id` and returns the
    /// frozen trie together with the first unassigned identifier.
    pub fn freeze(trie: &CompressedTrie, start_id: u64) -> (FrozenTrie, u64) {
        let mut next_id = start_id;
        let roots = trie
            .children
            .iter()
            .map(|(segment, node)| freeze_node(segment, node, &mut next_id))
            .collect();
        (FrozenTrie { roots }, next_id)
    }

    /// Looks up the identifier of `value`.
    ///
    /// The walk descends along the unique child edge whose fragment prefixes
    /// the remaining query suffix; the lookup succeeds only when the query
    /// is exhausted exactly at a terminal node.
    pub fn search(&self, value: &str) -> Option<u64> {
        let mut nodes = &self.roots;
        let mut rest = value;
        'descend: while !rest.is_empty() {
            for node in nodes {
                if let Some(stripped) = rest.strip_prefix(node.segment.as_str()) {
                    if stripped.is_empty() {
                        return node.terminal.then_some(node.id);
                    }
                    rest = stripped;
                    nodes = &node.children;
                    continue 'descend;
                }
            }
            return None;
        }
        None
    }

    /// Visits every node exactly once in pre-order, parents strictly before
    /// children, supplying `(id, parent_id, segment)`.
    ///
    /// The visit order and payload are sufficient to reconstruct every
    /// original input value by concatenating segments from a root down.
    pub fn traverse<F>(&self, mut visit: F) -> Result<()>
    where
        F: FnMut(u64, Option<u64>, &str) -> Result<()>,
    {
        for node in &self.roots {
            traverse_node(node, None, &mut visit)?;
        }
        Ok(())
    }

    /// Returns the number of dictionary nodes.
    pub fn len(&self) -> usize {
        fn count(node: &FrozenNode) -> usize {
            1 + node.children.iter().map(count).sum::<usize>()
        }
        self.roots.iter().map(count).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }
}

fn freeze_node(segment: &str, node: &CompressedNode, next_id: &mut u64) -> FrozenNode {
    let id = *next_id;
    *next_id += 1;
    FrozenNode {
        id,
        segment: segment.to_string(),
        terminal: node.terminal,
        children: node
            .children
            .iter()
            .map(|(child_segment, child)| freeze_node(child_segment, child, next_id))
            .collect(),
    }
}

fn traverse_node<F>(node: &FrozenNode, parent_id: Option<u64>, visit: &mut F) -> Result<()>
where
    F: FnMut(u64, Option<u64>, &str) -> Result<()>,
{
    visit(node.id, parent_id, &node.segment)?;
    for child in &node.children {
        traverse_node(child, Some(node.id), visit)?;
    }
    Ok(())
}
