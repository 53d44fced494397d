//! Compact tree serialization.
//!
//! Shape: every node emits `0` before each child it descends into and a
//! closing `1` after its children, so a leaf is a lone `1`. The root's
//! closing bit carries no information and is dropped. Letters: leaf bytes in
//! the same left-before-right visiting order.
//!
//! Both directions use an explicit stack so a maximally skewed tree cannot
//! exhaust the call stack.

use tracing::warn;

use crate::engine::huffman::{HuffmanTree, NodeId};
use crate::protocol::error::CodecError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerializedTree {
    pub shape: Vec<bool>,
    pub letters: Vec<u8>,
}

enum Emit {
    Enter(NodeId),
    Bit(bool),
}

pub fn serialize(tree: &HuffmanTree) -> SerializedTree {
    let mut shape = Vec::with_capacity(tree.node_count() * 2);
    let mut letters = Vec::new();
    let mut stack = vec![Emit::Enter(tree.root())];

    while let Some(step) = stack.pop() {
        match step {
            Emit::Bit(bit) => shape.push(bit),
            Emit::Enter(id) => {
                let node = tree.node(id);
                if node.is_leaf() {
                    letters.extend(node.symbol);
                }

                stack.push(Emit::Bit(true));
                if let Some(right) = node.right {
                    stack.push(Emit::Enter(right));
                    stack.push(Emit::Bit(false));
                }
                if let Some(left) = node.left {
                    stack.push(Emit::Enter(left));
                    stack.push(Emit::Bit(false));
                }
            }
        }
    }

    // Root terminator
    shape.pop();

    SerializedTree { shape, letters }
}

/// Read position in the shape bits and letter list
struct ShapeCursor<'a> {
    bits: &'a [bool],
    bit_pos: usize,
    letters: &'a [u8],
    letter_pos: usize,
}

impl<'a> ShapeCursor<'a> {
    fn next_bit(&mut self) -> Result<bool, CodecError> {
        let bit = self
            .bits
            .get(self.bit_pos)
            .copied()
            .ok_or(CodecError::CorruptTree("shape bits exhausted"))?;
        self.bit_pos += 1;
        Ok(bit)
    }

    fn peek_bit(&self) -> Option<bool> {
        self.bits.get(self.bit_pos).copied()
    }

    fn next_letter(&mut self) -> Result<u8, CodecError> {
        let letter = self
            .letters
            .get(self.letter_pos)
            .copied()
            .ok_or(CodecError::CorruptTree("letters exhausted"))?;
        self.letter_pos += 1;
        Ok(letter)
    }
}

enum Rebuild {
    Enter(NodeId),
    AfterLeft(NodeId),
    Close(NodeId),
}

/// Rebuilds the tree described by `shape` and `letters`.
pub fn deserialize(shape: &[bool], letters: &[u8]) -> Result<HuffmanTree, CodecError> {
    let mut tree = HuffmanTree::with_root();
    let root = tree.root();
    let mut cursor = ShapeCursor {
        bits: shape,
        bit_pos: 0,
        letters,
        letter_pos: 0,
    };
    let mut stack = vec![Rebuild::Enter(root)];

    while let Some(step) = stack.pop() {
        match step {
            Rebuild::Enter(id) => {
                if cursor.next_bit()? {
                    let letter = cursor.next_letter()?;
                    tree.set_symbol(id, letter);
                } else {
                    let left = tree.attach_left(id);
                    stack.push(Rebuild::AfterLeft(id));
                    stack.push(Rebuild::Enter(left));
                }
            }
            Rebuild::AfterLeft(id) => {
                stack.push(Rebuild::Close(id));
                if cursor.peek_bit() == Some(false) {
                    cursor.bit_pos += 1;
                    let right = tree.attach_right(id);
                    stack.push(Rebuild::Enter(right));
                }
            }
            Rebuild::Close(id) => {
                if id != root && !cursor.next_bit()? {
                    warn!("Node {} closed by a 0 bit at shape position {}", id, cursor.bit_pos - 1);
                    return Err(CodecError::CorruptTree("node not terminated"));
                }
            }
        }
    }

    if cursor.bit_pos != shape.len() {
        warn!("Tree complete after {} of {} shape bits", cursor.bit_pos, shape.len());
        return Err(CodecError::CorruptTree("unused shape bits"));
    }
    if cursor.letter_pos != letters.len() {
        warn!("Tree used {} of {} letters", cursor.letter_pos, letters.len());
        return Err(CodecError::CorruptTree("unused letters"));
    }

    Ok(tree)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::frequency::FrequencyTable;

    fn bits(s: &str) -> Vec<bool> {
        s.chars().map(|c| c == '1').collect()
    }

    fn tree_for(data: &[u8]) -> HuffmanTree {
        HuffmanTree::build(&FrequencyTable::from_bytes(data)).unwrap()
    }

    #[test]
    fn single_symbol_shape() {
        let ser = serialize(&tree_for(b"QQQQQQQQ"));
        assert_eq!(ser.shape, bits("01"));
        assert_eq!(ser.letters, b"Q".to_vec());
    }

    #[test]
    fn three_symbol_shape() {
        // root(c, (a, b))
        let ser = serialize(&tree_for(b"abcc"));
        assert_eq!(ser.shape, bits("01001011"));
        assert_eq!(ser.letters, b"cab".to_vec());
    }

    #[test]
    fn rebuild_matches_original_shape() {
        for data in [&b"QQQQ"[..], b"abcc", b"abracadabra", b"mississippi river"] {
            let tree = tree_for(data);
            let ser = serialize(&tree);
            let rebuilt = deserialize(&ser.shape, &ser.letters).unwrap();
            assert_eq!(serialize(&rebuilt), ser);
            assert_eq!(rebuilt.leaf_count(), tree.leaf_count());
            assert_eq!(rebuilt.depth(), tree.depth());
        }
    }

    #[test]
    fn full_alphabet_fits_ceiling() {
        let data: Vec<u8> = (0..=255u8).collect();
        let ser = serialize(&tree_for(&data));
        assert_eq!(ser.shape.len(), 1020);
        assert_eq!(ser.letters.len(), 256);
    }

    #[test]
    fn skewed_tree_survives() {
        // Fibonacci-like weights give a maximally deep tree
        let mut data = Vec::new();
        let (mut a, mut b) = (1usize, 1usize);
        for byte in 0..20u8 {
            data.extend(std::iter::repeat(byte).take(a));
            let next = a + b;
            a = b;
            b = next;
        }
        let tree = tree_for(&data);
        assert_eq!(tree.depth(), 19);
        let ser = serialize(&tree);
        let rebuilt = deserialize(&ser.shape, &ser.letters).unwrap();
        assert_eq!(rebuilt.depth(), 19);
    }

    #[test]
    fn letters_exhausted() {
        let err = deserialize(&bits("01001011"), b"ca").unwrap_err();
        assert!(matches!(err, CodecError::CorruptTree("letters exhausted")));
    }

    #[test]
    fn shape_exhausted() {
        let err = deserialize(&bits("0100"), b"cab").unwrap_err();
        assert!(matches!(err, CodecError::CorruptTree("shape bits exhausted")));
    }

    #[test]
    fn unused_letters_rejected() {
        let err = deserialize(&bits("01"), b"QR").unwrap_err();
        assert!(matches!(err, CodecError::CorruptTree("unused letters")));
    }

    #[test]
    fn unused_shape_bits_rejected() {
        let err = deserialize(&bits("0101"), b"Q").unwrap_err();
        assert!(matches!(err, CodecError::CorruptTree(_)));
    }

    #[test]
    fn unterminated_inner_node_rejected() {
        // root -> left internal (leaf, leaf) whose closing bit is a 0
        let err = deserialize(&bits("00101000"), b"xyz").unwrap_err();
        assert!(matches!(err, CodecError::CorruptTree(_)));
    }
}
