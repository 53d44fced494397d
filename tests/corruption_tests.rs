//! Damaged and forged streams must fail instead of decoding garbage

use proptest::prelude::*;

use huffpack::{compress_bytes, decompress_bytes, CodecError};

fn assert_corrupt(stream: &[u8]) {
    match decompress_bytes(stream) {
        Err(e) => assert!(e.is_corruption(), "unexpected error kind: {}", e),
        Ok(out) => panic!("decoded {} bytes from a corrupt stream", out.len()),
    }
}

#[test]
fn stray_byte_after_forty_one_a() {
    let mut encoded = compress_bytes(&[b'a'; 41]).unwrap();
    encoded.push(b'a');
    assert_corrupt(&encoded);
}

#[test]
fn stray_byte_after_text() {
    let mut encoded = compress_bytes(b"some perfectly ordinary text").unwrap();
    encoded.push(0);
    let err = decompress_bytes(&encoded).unwrap_err();
    assert!(matches!(err, CodecError::LengthMismatch { .. }));
}

#[test]
fn zero_shape_count() {
    let mut encoded = compress_bytes(b"hello").unwrap();
    encoded[0] = 0;
    encoded[1] = 0;
    assert!(matches!(decompress_bytes(&encoded), Err(CodecError::CorruptHeader(_))));
}

#[test]
fn shape_count_above_ceiling() {
    let mut encoded = compress_bytes(b"hello").unwrap();
    encoded[..2].copy_from_slice(&1025u16.to_le_bytes());
    encoded.extend(vec![0u8; 256]);
    assert!(matches!(decompress_bytes(&encoded), Err(CodecError::CorruptHeader(_))));
}

#[test]
fn letter_count_above_256() {
    // "QQQQ": shape count 2, one shape byte, then the letter count at offset 3
    let mut encoded = compress_bytes(b"QQQQ").unwrap();
    encoded[3..5].copy_from_slice(&257u16.to_le_bytes());
    encoded.extend(vec![0u8; 300]);
    assert!(matches!(decompress_bytes(&encoded), Err(CodecError::CorruptHeader(_))));
}

#[test]
fn truncated_header() {
    let encoded = compress_bytes(b"truncate me").unwrap();
    assert!(matches!(decompress_bytes(&encoded[..3]), Err(CodecError::CorruptHeader(_))));
}

#[test]
fn truncated_payload() {
    let data = b"the payload loses its last byte".repeat(4);
    let encoded = compress_bytes(&data).unwrap();
    let err = decompress_bytes(&encoded[..encoded.len() - 1]).unwrap_err();
    assert!(matches!(err, CodecError::LengthMismatch { .. }));
}

#[test]
fn inflated_bit_length() {
    // Single-symbol stream: total bit length sits at offset 6..10
    let mut encoded = compress_bytes(b"QQQQQQQQ").unwrap();
    encoded[6..10].copy_from_slice(&1000u32.to_le_bytes());
    assert_corrupt(&encoded);
}

#[test]
fn payload_bit_walks_off_single_symbol_tree() {
    let mut encoded = compress_bytes(b"QQQQQQQQ").unwrap();
    let last = encoded.len() - 1;
    encoded[last] = 0b0001_0000;
    assert!(matches!(decompress_bytes(&encoded), Err(CodecError::CorruptTree(_))));
}

#[test]
fn missing_letter() {
    // "abcc" declares 3 letters; claim 2 and drop one
    let mut encoded = compress_bytes(b"abcc").unwrap();
    encoded[3] = 2;
    encoded.remove(7);
    assert!(matches!(decompress_bytes(&encoded), Err(CodecError::CorruptTree(_))));
}

proptest! {
    #[test]
    fn prop_trailing_byte_always_fails(
        data in prop::collection::vec(any::<u8>(), 1..1024),
        extra in any::<u8>(),
    ) {
        let mut encoded = compress_bytes(&data).unwrap();
        encoded.push(extra);
        let result = decompress_bytes(&encoded);
        prop_assert!(
            matches!(result, Err(CodecError::LengthMismatch { .. })),
            "expected a length mismatch, got {:?}",
            result
        );
    }

    #[test]
    fn prop_truncation_never_succeeds(
        data in prop::collection::vec(any::<u8>(), 1..512),
        cut in any::<prop::sample::Index>(),
    ) {
        let encoded = compress_bytes(&data).unwrap();
        let keep = 1 + cut.index(encoded.len() - 1);
        let result = decompress_bytes(&encoded[..keep]);
        prop_assert!(
            matches!(result, Err(ref e) if e.is_corruption()),
            "expected a corruption error, got {:?}",
            result
        );
    }
}
