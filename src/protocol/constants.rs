//! Wire constants for the huffpack stream format

/// Width of the `shapeBitCount` field
pub const SHAPE_COUNT_SIZE: usize = 2;

/// Width of the `letterCount` field
pub const LETTER_COUNT_SIZE: usize = 2;

/// Width of the `totalBitLength` field
pub const TOTAL_BITS_SIZE: usize = 4;

/// Upper bound on serialized shape bits. 256 leaves need 1020.
pub const MAX_SHAPE_BITS: u16 = 1024;

/// One leaf per possible byte value
pub const MAX_LETTERS: u16 = 256;

/// Largest payload a stream can declare
pub const MAX_PAYLOAD_BITS: u64 = u32::MAX as u64;

/// Zero bits appended to round `bit_len` up to a byte boundary.
pub fn pad_bits(bit_len: u64) -> u8 {
    ((8 - bit_len % 8) % 8) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pad_bits_rounds_to_byte() {
        assert_eq!(pad_bits(0), 0);
        assert_eq!(pad_bits(1), 7);
        assert_eq!(pad_bits(8), 0);
        assert_eq!(pad_bits(41), 7);
        assert_eq!(pad_bits(15), 1);
    }
}
