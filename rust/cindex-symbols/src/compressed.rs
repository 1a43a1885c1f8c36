//! Stage two: single-child chains collapsed into multi-character edges.

use std::collections::BTreeMap;

use crate::rune::{RuneNode, RuneTrie};

/// Shared prefixes shorter than this are pushed down and duplicated onto
/// each child edge instead of getting a node of their own. The duplicated
/// text costs less than the extra dictionary row would save.
pub(crate) const MAX_INLINED_PREFIX: usize = 16;

/// A radix-style trie whose edges carry multi-character fragments.
///
/// Compression collapses every run of single-child nodes, with two
/// exceptions. A node that terminates a value is never folded into its
/// children, even with exactly one child, so that every stored value keeps
/// an individually addressable node once frozen. And a shared prefix shorter
/// than [`MAX_INLINED_PREFIX`] characters is inlined onto its children's
/// edges rather than materialized, trading text duplication for fewer nodes.
#[derive(Debug)]
pub struct CompressedTrie {
    pub(crate) children: BTreeMap<String, CompressedNode>,
}

#[derive(Debug)]
pub(crate) struct CompressedNode {
    pub(crate) terminal: bool,
    pub(crate) children: BTreeMap<String, CompressedNode>,
}

impl CompressedTrie {
    /// Compresses a character trie into its radix form.
    pub fn from_rune(trie: &RuneTrie) -> CompressedTrie {
        CompressedTrie {
            children: compress_children(&trie.root),
        }
    }
}

fn compress_children(node: &RuneNode) -> BTreeMap<String, CompressedNode> {
    let mut edges = BTreeMap::new();
    for (ch, child) in &node.children {
        let mut segment = String::from(*ch);
        let mut tail = child;
        while !tail.terminal && tail.children.len() == 1 {
            let (next_ch, next) = tail
                .children
                .iter()
                .next()
                .expect("single-child chain must have a child");
            segment.push(*next_ch);
            tail = next;
        }

        let grandchildren = compress_children(tail);
        if !tail.terminal
            && !grandchildren.is_empty()
            && segment.chars().count() < MAX_INLINED_PREFIX
        {
            for (edge, sub) in grandchildren {
                edges.insert(format!("{segment}{edge}"), sub);
            }
        } else {
            edges.insert(
                segment,
                CompressedNode {
                    terminal: tail.terminal,
                    children: grandchildren,
                },
            );
        }
    }
    edges
}

#[cfg(test)]
mod tests {
    use super::CompressedTrie;
    use crate::rune::RuneTrie;

    fn compress(values: &[&str]) -> CompressedTrie {
        let mut trie = RuneTrie::default();
        for value in values {
            trie.insert(value);
        }
        CompressedTrie::from_rune(&trie)
    }

    #[test]
    fn test_short_shared_prefix_is_inlined() {
        // "prefix" is shared but short, so no node is allocated for it;
        // each child edge carries the duplicated prefix instead.
        let trie = compress(&["prefixalpha", "prefixbeta"]);
        let edges: Vec<&String> = trie.children.keys().collect();
        assert_eq!(edges, ["prefixalpha", "prefixbeta"]);
    }

    #[test]
    fn test_long_shared_prefix_is_materialized() {
        let prefix = "com.example.service.";
        assert!(prefix.len() >= super::MAX_INLINED_PREFIX);
        let a = format!("{prefix}Alpha");
        let b = format!("{prefix}Beta");
        let trie = compress(&[&a, &b]);

        assert_eq!(trie.children.len(), 1);
        let (edge, node) = trie.children.iter().next().unwrap();
        assert_eq!(edge, prefix);
        assert!(!node.terminal);
        let edges: Vec<&String> = node.children.keys().collect();
        assert_eq!(edges, ["Alpha", "Beta"]);
    }

    #[test]
    fn test_terminal_node_survives_compression() {
        // "main" terminates a value, so it keeps a node of its own even
        // though it has exactly one child.
        let trie = compress(&["main", "mainloop"]);
        assert_eq!(trie.children.len(), 1);
        let (edge, node) = trie.children.iter().next().unwrap();
        assert_eq!(edge, "main");
        assert!(node.terminal);
        let edges: Vec<&String> = node.children.keys().collect();
        assert_eq!(edges, ["loop"]);
    }

    #[test]
    fn test_single_value_collapses_to_one_edge() {
        let trie = compress(&["deduplicate"]);
        assert_eq!(trie.children.len(), 1);
        let (edge, node) = trie.children.iter().next().unwrap();
        assert_eq!(edge, "deduplicate");
        assert!(node.terminal);
        assert!(node.children.is_empty());
    }
}
