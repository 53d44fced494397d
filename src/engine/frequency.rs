use std::io::{self, Read};

use crate::utils::io::read_chunk;

/// Occurrence count per byte value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrequencyTable {
    counts: [u64; 256],
}

impl Default for FrequencyTable {
    fn default() -> Self {
        Self { counts: [0; 256] }
    }
}

impl FrequencyTable {
    pub fn from_bytes(data: &[u8]) -> Self {
        let mut table = Self::default();
        table.update(data);
        table
    }

    /// Consumes `reader` to end of stream, `chunk_size` bytes at a time.
    pub fn from_reader<R: Read>(reader: &mut R, chunk_size: usize) -> io::Result<Self> {
        let mut table = Self::default();
        let mut buf = vec![0u8; chunk_size.max(1)];

        loop {
            let n = read_chunk(reader, &mut buf)?;
            if n == 0 {
                break;
            }
            table.update(&buf[..n]);
        }

        Ok(table)
    }

    pub fn update(&mut self, data: &[u8]) {
        for &byte in data {
            self.counts[byte as usize] += 1;
        }
    }

    #[cfg(test)]
    fn count(&self, byte: u8) -> u64 {
        self.counts[byte as usize]
    }

    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.iter().all(|&c| c == 0)
    }

    /// Number of byte values that occur at least once
    pub fn distinct(&self) -> usize {
        self.counts.iter().filter(|&&c| c > 0).count()
    }

    /// `(byte, count)` for every present byte, ascending by byte value
    pub fn present(&self) -> impl Iterator<Item = (u8, u64)> + '_ {
        self.counts
            .iter()
            .enumerate()
            .filter(|(_, &c)| c > 0)
            .map(|(b, &c)| (b as u8, c))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn counts_every_byte() {
        let table = FrequencyTable::from_bytes(b"abracadabra");
        assert_eq!(table.count(b'a'), 5);
        assert_eq!(table.count(b'b'), 2);
        assert_eq!(table.count(b'r'), 2);
        assert_eq!(table.count(b'c'), 1);
        assert_eq!(table.count(b'z'), 0);
        assert_eq!(table.total(), 11);
        assert_eq!(table.distinct(), 5);
    }

    #[test]
    fn reader_matches_slice_across_chunks() {
        let data: Vec<u8> = (0..1000u32).map(|i| (i * 7 % 251) as u8).collect();
        let from_reader = FrequencyTable::from_reader(&mut Cursor::new(&data), 3).unwrap();
        assert_eq!(from_reader, FrequencyTable::from_bytes(&data));
    }

    #[test]
    fn empty_source_is_empty_table() {
        let table = FrequencyTable::from_reader(&mut Cursor::new(Vec::<u8>::new()), 16).unwrap();
        assert!(table.is_empty());
        assert_eq!(table.present().count(), 0);
    }

    #[test]
    fn present_is_ascending() {
        let table = FrequencyTable::from_bytes(&[0xFF, 0x00, 0x80, 0x00]);
        let present: Vec<_> = table.present().collect();
        assert_eq!(present, vec![(0x00, 2), (0x80, 1), (0xFF, 1)]);
    }
}
