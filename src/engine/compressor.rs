use std::io::{Cursor, Read, Seek, SeekFrom, Write};

use serde::Serialize;
use tracing::debug;

use crate::engine::{
    codes::CodeTable,
    config::EngineConfig,
    frequency::FrequencyTable,
    huffman::HuffmanTree,
    tree_codec,
};
use crate::protocol::{
    constants::{pad_bits, MAX_PAYLOAD_BITS},
    error::CodecError,
    header::StreamHeader,
};
use crate::utils::{
    bits::{BitPacker, FlushMode},
    io::read_chunk,
};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CompressionStats {
    pub input_bytes: u64,
    pub output_bytes: u64,
    pub header_bytes: u64,
    pub distinct_symbols: usize,
    pub payload_bits: u64,
    pub pad_bits: u8,
}

impl CompressionStats {
    /// Output size over input size; 0 for empty input
    pub fn ratio(&self) -> f64 {
        if self.input_bytes > 0 {
            self.output_bytes as f64 / self.input_bytes as f64
        } else {
            0.0
        }
    }
}

/// Encodes `input` into `output` in two passes over the source: one to count
/// byte frequencies, one to emit codes. `input` is rewound to where it was
/// when the call started. An empty source writes nothing.
pub fn compress<R, W>(
    input: &mut R,
    output: &mut W,
    config: &EngineConfig,
) -> Result<CompressionStats, CodecError>
where
    R: Read + Seek,
    W: Write,
{
    let start = input.stream_position()?;
    let freq = FrequencyTable::from_reader(input, config.chunk_size())?;

    let Some(tree) = HuffmanTree::build(&freq) else {
        debug!("Empty input, nothing to encode");
        return Ok(CompressionStats::default());
    };

    let codes = CodeTable::from_tree(&tree);
    let payload_bits = codes.encoded_bit_len(&freq);
    if payload_bits > MAX_PAYLOAD_BITS {
        return Err(CodecError::InputTooLarge(payload_bits));
    }

    let header = StreamHeader {
        tree: tree_codec::serialize(&tree),
        total_bits: payload_bits as u32,
    };
    let header_bytes = header.write_to(output)?;
    debug!(
        "Header written: {} shape bits, {} letters, {} payload bits",
        header.tree.shape.len(),
        header.tree.letters.len(),
        payload_bits
    );

    input.seek(SeekFrom::Start(start))?;

    let mut buf = vec![0u8; config.chunk_size()];
    let mut packer = BitPacker::with_capacity(config.chunk_size());
    let mut payload_bytes = 0usize;

    loop {
        let n = read_chunk(input, &mut buf)?;
        if n == 0 {
            break;
        }
        for &byte in &buf[..n] {
            let code = codes.get(byte).ok_or(CodecError::InputChanged)?;
            packer.push_bits(code);
        }
        payload_bytes += packer.flush_to(output, FlushMode::Partial)?;
    }
    payload_bytes += packer.flush_to(output, FlushMode::Final)?;

    if packer.total_bits() != payload_bits {
        return Err(CodecError::InputChanged);
    }

    let stats = CompressionStats {
        input_bytes: freq.total(),
        output_bytes: (header_bytes + payload_bytes) as u64,
        header_bytes: header_bytes as u64,
        distinct_symbols: freq.distinct(),
        payload_bits,
        pad_bits: pad_bits(payload_bits),
    };
    debug!("Encoded {} bytes into {} bytes", stats.input_bytes, stats.output_bytes);
    Ok(stats)
}

/// Encodes a source that cannot seek by holding all of it in memory.
pub fn compress_buffered<R, W>(
    input: &mut R,
    output: &mut W,
    config: &EngineConfig,
) -> Result<CompressionStats, CodecError>
where
    R: Read,
    W: Write,
{
    let mut data = Vec::new();
    input.read_to_end(&mut data)?;
    compress(&mut Cursor::new(data), output, config)
}

pub fn compress_bytes(data: &[u8]) -> Result<Vec<u8>, CodecError> {
    let mut out = Vec::new();
    compress(&mut Cursor::new(data), &mut out, &EngineConfig::default())?;
    Ok(out)
}
