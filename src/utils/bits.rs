use std::io::{self, Write};

use crate::protocol::constants::pad_bits;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlushMode {
    /// Write whole bytes only, keep the residual bits buffered
    Partial,
    /// Write everything, zero-padding the last byte
    Final,
}

/// MSB-first bit accumulator that drains whole bytes to a sink
#[derive(Debug, Default)]
pub struct BitPacker {
    bytes: Vec<u8>,
    current: u8,
    filled: u8,
    total_bits: u64,
}

impl BitPacker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(bytes: usize) -> Self {
        Self {
            bytes: Vec::with_capacity(bytes),
            ..Self::default()
        }
    }

    #[inline]
    pub fn push_bit(&mut self, bit: bool) {
        self.current = (self.current << 1) | bit as u8;
        self.filled += 1;
        self.total_bits += 1;

        if self.filled == 8 {
            self.bytes.push(self.current);
            self.current = 0;
            self.filled = 0;
        }
    }

    pub fn push_bits(&mut self, bits: &[bool]) {
        for &bit in bits {
            self.push_bit(bit);
        }
    }

    /// Bits appended since construction, flushed or not
    pub fn total_bits(&self) -> u64 {
        self.total_bits
    }

    pub fn pad_bits(&self) -> u8 {
        pad_bits(self.total_bits)
    }

    /// Writes packed bytes to `out` and returns how many were written.
    pub fn flush_to<W: Write>(&mut self, out: &mut W, mode: FlushMode) -> io::Result<usize> {
        if mode == FlushMode::Final {
            self.seal_last_byte();
        }

        let written = self.bytes.len();
        if written > 0 {
            out.write_all(&self.bytes)?;
            self.bytes.clear();
        }
        Ok(written)
    }

    /// Final flush into memory
    pub fn into_bytes(mut self) -> Vec<u8> {
        self.seal_last_byte();
        self.bytes
    }

    fn seal_last_byte(&mut self) {
        if self.filled > 0 {
            self.bytes.push(self.current << (8 - self.filled));
            self.current = 0;
            self.filled = 0;
        }
    }
}

/// Bits of `byte`, most significant first
#[inline]
pub fn byte_bits(byte: u8) -> impl Iterator<Item = bool> {
    (0..8).rev().map(move |shift| (byte >> shift) & 1 == 1)
}

/// Unpacks the first `bit_count` bits of `bytes`. Returns `None` if the
/// bytes hold fewer bits than requested.
pub fn unpack_bits(bytes: &[u8], bit_count: usize) -> Option<Vec<bool>> {
    if bytes.len().checked_mul(8)? < bit_count {
        return None;
    }

    Some(
        bytes
            .iter()
            .flat_map(|&b| byte_bits(b))
            .take(bit_count)
            .collect(),
    )
}
