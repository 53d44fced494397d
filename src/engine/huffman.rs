use std::cmp::Ordering;
use std::collections::BinaryHeap;

use tracing::debug;

use crate::engine::frequency::FrequencyTable;

/// Index of a node inside a [`HuffmanTree`] arena
pub type NodeId = usize;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HuffmanNode {
    pub weight: u64,
    pub symbol: Option<u8>,
    pub left: Option<NodeId>,
    pub right: Option<NodeId>,
}

impl HuffmanNode {
    fn leaf(symbol: u8, weight: u64) -> Self {
        Self {
            weight,
            symbol: Some(symbol),
            left: None,
            right: None,
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.left.is_none() && self.right.is_none()
    }
}

/// Pending subtree in the merge queue. Ordered so that `BinaryHeap` pops
/// the lowest weight first and, among equal weights, the earliest insert.
#[derive(Debug, PartialEq, Eq)]
struct HeapEntry {
    weight: u64,
    seq: u64,
    id: NodeId,
}

impl PartialOrd for HeapEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for HeapEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse for min-heap
        other
            .weight
            .cmp(&self.weight)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Binary prefix tree stored as an arena; children are arena indices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HuffmanTree {
    nodes: Vec<HuffmanNode>,
    root: NodeId,
}

impl HuffmanTree {
    /// Builds the optimal tree for `freq`, or `None` when nothing was counted.
    ///
    /// Leaves enter the merge queue sorted by weight, then by byte value read
    /// as a signed 8-bit integer. Equal weights leave the queue in insertion
    /// order and merged nodes are inserted behind every existing node of the
    /// same weight, so the resulting shape is fully deterministic. The first
    /// node extracted becomes the left child.
    pub fn build(freq: &FrequencyTable) -> Option<Self> {
        let mut candidates: Vec<(u64, u8)> = freq.present().map(|(b, c)| (c, b)).collect();
        candidates.sort_by_key(|&(weight, byte)| (weight, byte as i8));

        if let &[(weight, byte)] = candidates.as_slice() {
            // A lone symbol still needs one edge so every byte costs one bit
            let mut tree = Self::with_root();
            let leaf = tree.attach_left(tree.root);
            tree.nodes[leaf] = HuffmanNode::leaf(byte, weight);
            tree.nodes[tree.root].weight = weight;
            debug!("Built single-symbol tree for byte {:#04x}", byte);
            return Some(tree);
        }

        let mut tree = Self {
            nodes: Vec::with_capacity(candidates.len() * 2),
            root: 0,
        };
        let mut heap = BinaryHeap::with_capacity(candidates.len());
        let mut seq = 0u64;

        for (weight, byte) in candidates {
            let id = tree.push(HuffmanNode::leaf(byte, weight));
            heap.push(HeapEntry { weight, seq, id });
            seq += 1;
        }

        loop {
            let first = heap.pop()?;
            let Some(second) = heap.pop() else {
                tree.root = first.id;
                break;
            };

            let weight = first.weight + second.weight;
            let id = tree.push(HuffmanNode {
                weight,
                symbol: None,
                left: Some(first.id),
                right: Some(second.id),
            });
            heap.push(HeapEntry { weight, seq, id });
            seq += 1;
        }

        debug!(
            "Built tree: {} nodes, {} leaves, depth {}",
            tree.node_count(),
            tree.leaf_count(),
            tree.depth()
        );
        Some(tree)
    }

    /// A tree holding only an empty root, to be grown by the deserializer.
    pub(crate) fn with_root() -> Self {
        Self {
            nodes: vec![HuffmanNode::default()],
            root: 0,
        }
    }

    pub(crate) fn attach_left(&mut self, parent: NodeId) -> NodeId {
        let id = self.push(HuffmanNode::default());
        self.nodes[parent].left = Some(id);
        id
    }

    pub(crate) fn attach_right(&mut self, parent: NodeId) -> NodeId {
        let id = self.push(HuffmanNode::default());
        self.nodes[parent].right = Some(id);
        id
    }

    pub(crate) fn set_symbol(&mut self, id: NodeId, symbol: u8) {
        self.nodes[id].symbol = Some(symbol);
    }

    fn push(&mut self, node: HuffmanNode) -> NodeId {
        self.nodes.push(node);
        self.nodes.len() - 1
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn node(&self, id: NodeId) -> &HuffmanNode {
        &self.nodes[id]
    }

    /// Child reached by following `bit` (`false` = left, `true` = right).
    #[inline]
    pub fn child(&self, id: NodeId, bit: bool) -> Option<NodeId> {
        let node = &self.nodes[id];
        if bit { node.right } else { node.left }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn leaf_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_leaf()).count()
    }

    /// Longest root-to-leaf path in edges
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut stack = vec![(self.root, 0usize)];

        while let Some((id, depth)) = stack.pop() {
            let node = &self.nodes[id];
            if node.is_leaf() {
                deepest = deepest.max(depth);
            }
            for child in [node.left, node.right].into_iter().flatten() {
                stack.push((child, depth + 1));
            }
        }

        deepest
    }
}
