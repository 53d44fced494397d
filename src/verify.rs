use serde::Serialize;
use tracing::info;

use crate::engine::{compress, config::EngineConfig, decompress, hash::sha256_hex};
use crate::protocol::error::CodecError;

/// Result of encoding a buffer and decoding it again
#[derive(Debug, Clone, Serialize)]
pub struct RoundTripReport {
    pub input_bytes: u64,
    pub encoded_bytes: u64,
    pub decoded_bytes: u64,
    pub input_sha256: String,
    pub decoded_sha256: String,
    pub ratio: f64,
    pub verified: bool,
}

pub fn verify_round_trip(data: &[u8], config: &EngineConfig) -> Result<RoundTripReport, CodecError> {
    let mut encoded = Vec::new();
    let stats = compress(&mut std::io::Cursor::new(data), &mut encoded, config)?;

    let mut decoded = Vec::with_capacity(data.len());
    decompress(&encoded[..], &mut decoded, config)?;

    let input_sha256 = sha256_hex(data);
    let decoded_sha256 = sha256_hex(&decoded);
    let verified = input_sha256 == decoded_sha256 && decoded.len() == data.len();
    info!("Round trip of {} bytes verified: {}", data.len(), verified);

    Ok(RoundTripReport {
        input_bytes: data.len() as u64,
        encoded_bytes: encoded.len() as u64,
        decoded_bytes: decoded.len() as u64,
        input_sha256,
        decoded_sha256,
        ratio: stats.ratio(),
        verified,
    })
}
