use crate::engine::frequency::FrequencyTable;
use crate::engine::huffman::HuffmanTree;

/// Root-to-leaf bit path for every byte present in a tree
#[derive(Debug, Clone)]
pub struct CodeTable {
    codes: Vec<Option<Vec<bool>>>,
}

impl CodeTable {
    /// Walks `tree` depth-first, `false` for a left edge and `true` for a
    /// right edge. A leaf sitting at the root gets an empty code.
    pub fn from_tree(tree: &HuffmanTree) -> Self {
        let mut codes = vec![None; 256];
        let mut stack = vec![(tree.root(), Vec::new())];

        while let Some((id, path)) = stack.pop() {
            let node = tree.node(id);
            if node.is_leaf() {
                if let Some(symbol) = node.symbol {
                    codes[symbol as usize] = Some(path);
                }
                continue;
            }

            if let Some(right) = node.right {
                let mut code = path.clone();
                code.push(true);
                stack.push((right, code));
            }
            if let Some(left) = node.left {
                let mut code = path;
                code.push(false);
                stack.push((left, code));
            }
        }

        Self { codes }
    }

    pub fn get(&self, byte: u8) -> Option<&[bool]> {
        self.codes[byte as usize].as_deref()
    }

    /// Payload size in bits for a source with these counts. Bytes without a
    /// code contribute nothing.
    pub fn encoded_bit_len(&self, freq: &FrequencyTable) -> u64 {
        freq.present()
            .filter_map(|(byte, count)| self.get(byte).map(|code| count * code.len() as u64))
            .sum()
    }
}
