use std::io::{BufReader, Read, Write};

use serde::Serialize;
use tracing::{debug, warn};

use crate::engine::{
    config::EngineConfig,
    huffman::{HuffmanTree, NodeId},
    tree_codec,
};
use crate::protocol::{error::CodecError, header::StreamHeader};
use crate::utils::{
    bits::byte_bits,
    io::{at_eof, read_chunk},
};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DecompressionStats {
    pub input_bytes: u64,
    pub output_bytes: u64,
    pub payload_bits: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalkState {
    AtRoot,
    Descending(NodeId),
}

/// Walks the tree one payload bit at a time, emitting a byte at every leaf.
#[derive(Debug)]
pub struct PayloadWalker<'t> {
    tree: &'t HuffmanTree,
    state: WalkState,
    declared_bits: u64,
    consumed_bits: u64,
    bytes_read: u64,
    emitted: u64,
}

impl<'t> PayloadWalker<'t> {
    pub fn new(tree: &'t HuffmanTree, declared_bits: u64) -> Self {
        Self {
            tree,
            state: WalkState::AtRoot,
            declared_bits,
            consumed_bits: 0,
            bytes_read: 0,
            emitted: 0,
        }
    }

    pub fn state(&self) -> WalkState {
        self.state
    }

    /// Consumes one payload byte. Bits past the declared length are padding
    /// and never walked; a byte the declared length cannot account for fails.
    pub fn feed(&mut self, byte: u8, out: &mut Vec<u8>) -> Result<(), CodecError> {
        self.bytes_read += 1;
        if self.bytes_read * 8 >= self.declared_bits + 8 {
            warn!(
                "Payload byte {} exceeds declared length of {} bits",
                self.bytes_read, self.declared_bits
            );
            return Err(self.length_mismatch());
        }

        for bit in byte_bits(byte) {
            if self.consumed_bits == self.declared_bits {
                break;
            }
            self.step(bit, out)?;
            self.consumed_bits += 1;
        }
        Ok(())
    }

    fn step(&mut self, bit: bool, out: &mut Vec<u8>) -> Result<(), CodecError> {
        let at = match self.state {
            WalkState::AtRoot => self.tree.root(),
            WalkState::Descending(id) => id,
        };

        let Some(next) = self.tree.child(at, bit) else {
            warn!("Payload bit {} has no child at node {}", self.consumed_bits, at);
            return Err(CodecError::CorruptTree("payload leaves the tree"));
        };

        let node = self.tree.node(next);
        if node.is_leaf() {
            let symbol = node
                .symbol
                .ok_or(CodecError::CorruptTree("leaf without letter"))?;
            out.push(symbol);
            self.emitted += 1;
            self.state = WalkState::AtRoot;
        } else {
            self.state = WalkState::Descending(next);
        }
        Ok(())
    }

    /// Checks the payload ended exactly on the declared length, at a symbol
    /// boundary. Returns the number of decoded bytes.
    pub fn finish(&self) -> Result<u64, CodecError> {
        if self.consumed_bits < self.declared_bits {
            warn!(
                "Payload ended after {} of {} declared bits",
                self.consumed_bits, self.declared_bits
            );
            return Err(self.length_mismatch());
        }
        if self.state != WalkState::AtRoot {
            warn!("Payload ended inside a code");
            return Err(CodecError::CorruptTree("payload ends inside a code"));
        }
        Ok(self.emitted)
    }

    fn length_mismatch(&self) -> CodecError {
        CodecError::LengthMismatch {
            declared_bits: self.declared_bits,
            bytes_read: self.bytes_read,
        }
    }
}

/// Decodes a stream produced by [`compress`](crate::engine::compressor::compress).
/// An empty source decodes to nothing. On error, whatever was already
/// written to `output` must be discarded.
pub fn decompress<R, W>(
    input: R,
    output: &mut W,
    config: &EngineConfig,
) -> Result<DecompressionStats, CodecError>
where
    R: Read,
    W: Write,
{
    let mut reader = BufReader::with_capacity(config.chunk_size(), input);
    if at_eof(&mut reader)? {
        debug!("Empty input, nothing to decode");
        return Ok(DecompressionStats::default());
    }

    let header = StreamHeader::read_from(&mut reader)?;
    let tree = tree_codec::deserialize(&header.tree.shape, &header.tree.letters)?;
    debug!(
        "Tree rebuilt: {} leaves, depth {}, {} payload bits",
        tree.leaf_count(),
        tree.depth(),
        header.total_bits
    );

    let mut walker = PayloadWalker::new(&tree, header.total_bits as u64);
    let mut buf = vec![0u8; config.chunk_size()];
    let mut decoded = Vec::with_capacity(config.chunk_size() * 2);

    loop {
        let n = read_chunk(&mut reader, &mut buf)?;
        if n == 0 {
            break;
        }
        for &byte in &buf[..n] {
            walker.feed(byte, &mut decoded)?;
        }
        output.write_all(&decoded)?;
        decoded.clear();
    }

    let output_bytes = walker.finish()?;
    Ok(DecompressionStats {
        input_bytes: header.encoded_len() as u64 + walker.bytes_read,
        output_bytes,
        payload_bits: header.total_bits as u64,
    })
}

pub fn decompress_bytes(data: &[u8]) -> Result<Vec<u8>, CodecError> {
    let mut out = Vec::new();
    decompress(data, &mut out, &EngineConfig::default())?;
    Ok(out)
}
