use std::io::{self, Read, Write};

use serde::Serialize;
use tracing::warn;

use crate::engine::tree_codec::{self, SerializedTree};
use crate::protocol::constants::{
    pad_bits, LETTER_COUNT_SIZE, MAX_LETTERS, MAX_SHAPE_BITS, SHAPE_COUNT_SIZE, TOTAL_BITS_SIZE,
};
use crate::protocol::error::CodecError;
use crate::utils::bits::{unpack_bits, BitPacker};
use crate::utils::io::{read_exact, read_u16_le, read_u32_le};

/// Everything that precedes the payload in a stream:
///
/// ```text
/// u16 shapeBitCount | shape bytes | u16 letterCount | letters | u32 totalBitLength
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamHeader {
    pub tree: SerializedTree,
    pub total_bits: u32,
}

/// Human/JSON view of a header, used by `inspect`
#[derive(Debug, Clone, Serialize)]
pub struct HeaderSummary {
    pub shape_bits: usize,
    pub letter_count: usize,
    pub letters_hex: String,
    pub payload_bits: u32,
    pub pad_bits: u8,
    pub payload_bytes: u64,
    pub header_bytes: usize,
    pub leaf_count: usize,
    pub tree_depth: usize,
}

fn truncated(what: &'static str) -> impl FnOnce(io::Error) -> CodecError {
    move |e| {
        if e.kind() == io::ErrorKind::UnexpectedEof {
            warn!("Stream ended inside the {}", what);
            CodecError::CorruptHeader(what)
        } else {
            CodecError::Io(e)
        }
    }
}

impl StreamHeader {
    pub fn shape_bytes(&self) -> usize {
        self.tree.shape.len().div_ceil(8)
    }

    pub fn encoded_len(&self) -> usize {
        SHAPE_COUNT_SIZE
            + self.shape_bytes()
            + LETTER_COUNT_SIZE
            + self.tree.letters.len()
            + TOTAL_BITS_SIZE
    }

    pub fn pad_bits(&self) -> u8 {
        pad_bits(self.total_bits as u64)
    }

    /// Bytes the payload must occupy for the declared bit length
    pub fn payload_bytes(&self) -> u64 {
        (self.total_bits as u64).div_ceil(8)
    }

    pub fn encode(&self) -> Result<Vec<u8>, CodecError> {
        let shape_count = u16::try_from(self.tree.shape.len())
            .ok()
            .filter(|&n| n > 0 && n <= MAX_SHAPE_BITS)
            .ok_or(CodecError::CorruptHeader("shape bit count out of range"))?;
        let letter_count = u16::try_from(self.tree.letters.len())
            .ok()
            .filter(|&n| n <= MAX_LETTERS)
            .ok_or(CodecError::CorruptHeader("letter count out of range"))?;

        let mut packer = BitPacker::with_capacity(self.shape_bytes());
        packer.push_bits(&self.tree.shape);

        let mut buf = Vec::with_capacity(self.encoded_len());
        buf.extend_from_slice(&shape_count.to_le_bytes());
        buf.extend(packer.into_bytes());
        buf.extend_from_slice(&letter_count.to_le_bytes());
        buf.extend_from_slice(&self.tree.letters);
        buf.extend_from_slice(&self.total_bits.to_le_bytes());
        Ok(buf)
    }

    /// Writes the header and returns its length in bytes.
    pub fn write_to<W: Write>(&self, out: &mut W) -> Result<usize, CodecError> {
        let buf = self.encode()?;
        out.write_all(&buf)?;
        Ok(buf.len())
    }

    /// Reads and validates a header. Does not rebuild the tree.
    pub fn read_from<R: Read>(reader: &mut R) -> Result<Self, CodecError> {
        let shape_count = read_u16_le(reader).map_err(truncated("shape bit count"))?;
        if shape_count == 0 || shape_count > MAX_SHAPE_BITS {
            warn!("Shape bit count {} outside 1..={}", shape_count, MAX_SHAPE_BITS);
            return Err(CodecError::CorruptHeader("shape bit count out of range"));
        }

        let shape_bytes = read_exact(reader, (shape_count as usize).div_ceil(8))
            .map_err(truncated("shape bits"))?;
        let shape = unpack_bits(&shape_bytes, shape_count as usize)
            .ok_or(CodecError::CorruptHeader("shape bits shorter than declared"))?;

        let letter_count = read_u16_le(reader).map_err(truncated("letter count"))?;
        if letter_count > MAX_LETTERS {
            warn!("Letter count {} exceeds {}", letter_count, MAX_LETTERS);
            return Err(CodecError::CorruptHeader("letter count out of range"));
        }

        let letters = read_exact(reader, letter_count as usize).map_err(truncated("letters"))?;
        let total_bits = read_u32_le(reader).map_err(truncated("payload bit length"))?;

        Ok(Self {
            tree: SerializedTree { shape, letters },
            total_bits,
        })
    }

    pub fn summary(&self) -> Result<HeaderSummary, CodecError> {
        let tree = tree_codec::deserialize(&self.tree.shape, &self.tree.letters)?;

        Ok(HeaderSummary {
            shape_bits: self.tree.shape.len(),
            letter_count: self.tree.letters.len(),
            letters_hex: hex::encode(&self.tree.letters),
            payload_bits: self.total_bits,
            pad_bits: self.pad_bits(),
            payload_bytes: self.payload_bytes(),
            header_bytes: self.encoded_len(),
            leaf_count: tree.leaf_count(),
            tree_depth: tree.depth(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn bits(s: &str) -> Vec<bool> {
        s.chars().map(|c| c == '1').collect()
    }

    fn sample() -> StreamHeader {
        StreamHeader {
            tree: SerializedTree {
                shape: bits("01001011"),
                letters: b"cab".to_vec(),
            },
            total_bits: 6,
        }
    }

    #[test]
    fn layout_is_little_endian() {
        let buf = sample().encode().unwrap();
        assert_eq!(
            buf,
            vec![8, 0, 0b0100_1011, 3, 0, b'c', b'a', b'b', 6, 0, 0, 0]
        );
        assert_eq!(sample().encoded_len(), buf.len());
    }

    #[test]
    fn reads_back_what_was_written() {
        let header = sample();
        let mut buf = Vec::new();
        let written = header.write_to(&mut buf).unwrap();
        assert_eq!(written, 12);

        let read = StreamHeader::read_from(&mut Cursor::new(buf)).unwrap();
        assert_eq!(read, header);
    }

    #[test]
    fn zero_shape_count_rejected() {
        let buf = vec![0u8, 0, 0, 0];
        let err = StreamHeader::read_from(&mut Cursor::new(buf)).unwrap_err();
        assert!(matches!(err, CodecError::CorruptHeader(_)));
    }

    #[test]
    fn oversized_shape_count_rejected() {
        let mut buf = 1025u16.to_le_bytes().to_vec();
        buf.extend(vec![0u8; 200]);
        let err = StreamHeader::read_from(&mut Cursor::new(buf)).unwrap_err();
        assert!(matches!(err, CodecError::CorruptHeader("shape bit count out of range")));
    }

    #[test]
    fn oversized_letter_count_rejected() {
        let mut buf = vec![2u8, 0, 0b0100_0000];
        buf.extend_from_slice(&257u16.to_le_bytes());
        buf.extend(vec![0u8; 300]);
        let err = StreamHeader::read_from(&mut Cursor::new(buf)).unwrap_err();
        assert!(matches!(err, CodecError::CorruptHeader("letter count out of range")));
    }

    #[test]
    fn truncation_is_corrupt_header() {
        let buf = sample().encode().unwrap();
        for cut in 1..buf.len() {
            let err = StreamHeader::read_from(&mut Cursor::new(&buf[..cut])).unwrap_err();
            assert!(matches!(err, CodecError::CorruptHeader(_)), "cut at {}", cut);
        }
    }

    #[test]
    fn summary_describes_tree() {
        let summary = sample().summary().unwrap();
        assert_eq!(summary.letters_hex, "636162");
        assert_eq!(summary.leaf_count, 3);
        assert_eq!(summary.tree_depth, 2);
        assert_eq!(summary.pad_bits, 2);
        assert_eq!(summary.payload_bytes, 1);
    }
}
